//! Chain/contract descriptor: the deployed token's address and ABI.

use std::path::Path;
use std::str::FromStr;

use alloy_primitives::Address;
use chain_eth::{abi, address, erc20, units};
use serde::Deserialize;

use crate::error::{ConfigError, SessionError};

/// Decimal places assumed when the descriptor does not state them.
pub const DEFAULT_DECIMALS: u8 = 18;

/// One ABI parameter.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AbiInput {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// One ABI entry. Only functions are used; events and errors are kept but
/// ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AbiEntry {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub inputs: Vec<AbiInput>,
}

impl AbiEntry {
    fn is_function(&self, name: &str) -> bool {
        self.kind == "function" && self.name.as_deref() == Some(name)
    }

    /// Canonical signature, e.g. `transfer(address,uint256)`.
    pub fn signature(&self) -> String {
        let types: Vec<&str> = self.inputs.iter().map(|i| i.kind.as_str()).collect();
        format!("{}({})", self.name.as_deref().unwrap_or_default(), types.join(","))
    }
}

/// On-disk layout of the descriptor file.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DescriptorFile {
    usdt_fuji_abi: Vec<AbiEntry>,
    usdt_fuji_address: String,
    #[serde(default)]
    usdt_fuji_decimals: Option<u8>,
}

/// A deployed ERC-20 token contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractDescriptor {
    pub address: Address,
    pub abi: Vec<AbiEntry>,
    pub decimals: u8,
}

impl ContractDescriptor {
    /// Loads and validates a descriptor file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::DescriptorIo {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Parses `{ "usdtFujiAbi": [...], "usdtFujiAddress": "0x..." }`.
    ///
    /// The address must be well-formed and the ABI must declare `transfer`
    /// and `balanceOf`.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let file: DescriptorFile = serde_json::from_str(text)?;

        if !address::validate_address(&file.usdt_fuji_address)
            .map_err(|e| ConfigError::DescriptorInvalid(e.to_string()))?
        {
            return Err(ConfigError::DescriptorInvalid(format!(
                "address {} fails its EIP-55 checksum",
                file.usdt_fuji_address
            )));
        }
        let address = Address::from_str(&file.usdt_fuji_address)
            .map_err(|e| ConfigError::DescriptorInvalid(e.to_string()))?;

        let descriptor = Self {
            address,
            abi: file.usdt_fuji_abi,
            decimals: file.usdt_fuji_decimals.unwrap_or(DEFAULT_DECIMALS),
        };

        for (name, expected) in [
            ("transfer", erc20::TRANSFER_SELECTOR),
            ("balanceOf", erc20::BALANCE_OF_SELECTOR),
        ] {
            let entry = descriptor.function(name).ok_or_else(|| {
                ConfigError::DescriptorInvalid(format!("ABI does not declare {name}"))
            })?;
            let declared = abi::selector(&entry.signature());
            if declared != expected {
                return Err(ConfigError::DescriptorInvalid(format!(
                    "ABI declares {} (selector 0x{}), expected selector 0x{}",
                    entry.signature(),
                    hex::encode(declared),
                    hex::encode(expected)
                )));
            }
        }

        Ok(descriptor)
    }

    /// Looks up a function entry by name.
    pub fn function(&self, name: &str) -> Option<&AbiEntry> {
        self.abi.iter().find(|e| e.is_function(name))
    }

    /// Encodes calldata for `function` with string arguments.
    ///
    /// `transfer` takes `[recipient, amount]` where amount is a decimal
    /// token quantity scaled by [`Self::decimals`]; `balanceOf` takes
    /// `[owner]`.
    pub fn encode_call(&self, function: &str, args: &[String]) -> Result<Vec<u8>, SessionError> {
        let entry = self
            .function(function)
            .ok_or_else(|| SessionError::UnknownFunction(function.to_string()))?;

        if entry.inputs.len() != args.len() {
            return Err(SessionError::InvalidArguments(format!(
                "{} takes {} arguments, got {}",
                entry.signature(),
                entry.inputs.len(),
                args.len()
            )));
        }

        let invalid = |e: chain_eth::error::EthError| SessionError::InvalidArguments(e.to_string());
        match function {
            "transfer" => {
                let amount = units::parse_units(&args[1], self.decimals).map_err(invalid)?;
                erc20::encode_transfer(args[0].trim(), amount).map_err(invalid)
            }
            "balanceOf" => erc20::encode_balance_of(args[0].trim()).map_err(invalid),
            other => Err(SessionError::UnknownFunction(other.to_string())),
        }
    }
}
