//! Startup configuration.
//!
//! Raw values come from CLI flags or the environment; [`AppConfig::from_raw`]
//! validates all of them before any session is constructed.

use std::time::Duration;

use chain_eth::chains::{self, EvmChain};
use secrecy::SecretBox;
use zeroize::Zeroize;

use crate::error::ConfigError;

/// Chain used when none is configured.
pub const DEFAULT_CHAIN_ID: u64 = chains::AVALANCHE_FUJI.chain_id;

const DEFAULT_RECEIPT_POLL_MS: u64 = 2_000;
const DEFAULT_RECEIPT_TIMEOUT_SECS: u64 = 180;

/// Unvalidated configuration values.
#[derive(Debug, Default, Clone)]
pub struct RawConfig {
    pub project_id: Option<String>,
    pub chain_id: Option<u64>,
    pub rpc_url: Option<String>,
    pub private_key: Option<String>,
    pub receipt_poll_ms: Option<u64>,
    pub receipt_timeout_secs: Option<u64>,
}

/// Application metadata announced to the wallet endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppMetadata {
    pub name: String,
    pub description: String,
    pub url: String,
    pub icons: Vec<String>,
}

impl Default for AppMetadata {
    fn default() -> Self {
        Self {
            name: "Testing".into(),
            description: "AppKit Example".into(),
            url: "https://reown.com/appkit".into(),
            icons: vec!["https://assets.reown.com/reown-profile-pic.png".into()],
        }
    }
}

/// Validated configuration.
pub struct AppConfig {
    pub project_id: String,
    pub chain: &'static EvmChain,
    pub rpc_url: String,
    /// Key for the local signer; `None` uses the endpoint's own accounts.
    pub private_key: Option<SecretBox<[u8; 32]>>,
    pub metadata: AppMetadata,
    pub receipt_poll_interval: Duration,
    pub receipt_timeout: Duration,
}

impl AppConfig {
    /// Validates raw values. A missing or blank project id is an error.
    pub fn from_raw(raw: RawConfig) -> Result<Self, ConfigError> {
        let project_id = raw
            .project_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .ok_or(ConfigError::MissingProjectId)?;

        let chain_id = raw.chain_id.unwrap_or(DEFAULT_CHAIN_ID);
        let chain = chains::get_chain(chain_id).ok_or(ConfigError::UnsupportedChain(chain_id))?;

        let rpc_url = match raw.rpc_url.map(|u| u.trim().to_string()) {
            Some(url) if !url.is_empty() => {
                if !url.starts_with("http://") && !url.starts_with("https://") {
                    return Err(ConfigError::InvalidValue {
                        key: "RPC_URL",
                        reason: format!("'{url}' is not an http(s) url"),
                    });
                }
                url
            }
            _ => chain.rpc_url.to_string(),
        };

        let private_key = match raw.private_key {
            Some(mut hex_key) => {
                let parsed = parse_private_key(&hex_key);
                hex_key.zeroize();
                Some(parsed?)
            }
            None => None,
        };

        let poll_ms = raw.receipt_poll_ms.unwrap_or(DEFAULT_RECEIPT_POLL_MS);
        if poll_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "RECEIPT_POLL_MS",
                reason: "must be greater than zero".into(),
            });
        }
        let timeout_secs = raw.receipt_timeout_secs.unwrap_or(DEFAULT_RECEIPT_TIMEOUT_SECS);

        Ok(Self {
            project_id,
            chain,
            rpc_url,
            private_key,
            metadata: AppMetadata::default(),
            receipt_poll_interval: Duration::from_millis(poll_ms),
            receipt_timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// User agent sent with every RPC request.
    pub fn user_agent(&self) -> String {
        format!(
            "{}/{} (project {}; {})",
            self.metadata.name,
            env!("CARGO_PKG_VERSION"),
            self.project_id,
            self.metadata.url
        )
    }
}

fn parse_private_key(hex_key: &str) -> Result<SecretBox<[u8; 32]>, ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidValue {
        key: "WALLET_PRIVATE_KEY",
        reason: reason.to_string(),
    };

    let digits = hex_key.trim();
    let digits = digits.strip_prefix("0x").unwrap_or(digits);
    if digits.len() != 64 {
        return Err(invalid("expected 64 hex characters"));
    }

    let mut bytes = hex::decode(digits).map_err(|_| invalid("not valid hex"))?;
    let mut key = Box::new([0u8; 32]);
    key.copy_from_slice(&bytes);
    bytes.zeroize();

    Ok(SecretBox::new(key))
}
