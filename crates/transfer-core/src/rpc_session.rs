//! [`WalletSession`] backed by an Ethereum JSON-RPC endpoint.
//!
//! Two signing modes are supported: the endpoint's own unlocked account
//! (`eth_accounts` + `eth_sendTransaction`, as exposed by wallet bridges and
//! dev nodes), or a local key supplied through configuration that signs
//! EIP-1559 transactions before `eth_sendRawTransaction`.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::{Address, B256};
use async_trait::async_trait;
use chain_eth::address::address_from_private_key;
use chain_eth::rpc::{parse_u64_quantity, RpcClient};
use chain_eth::transaction::{self, FeeParams};
use secrecy::{ExposeSecret, SecretBox};
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::error::SessionError;
use crate::session::{ContractCall, DisconnectedSession, Receipt, WalletSession};

/// Headroom added on top of `eth_estimateGas`, in percent.
const GAS_LIMIT_MARGIN_PCT: u64 = 20;

enum Signer {
    /// The endpoint signs with its own account.
    Endpoint(Option<Address>),
    /// Transactions are signed locally.
    Local {
        key: SecretBox<[u8; 32]>,
        account: Address,
    },
}

pub struct RpcSession {
    client: RpcClient,
    chain_id: u64,
    signer: Signer,
    poll_interval: Duration,
    receipt_timeout: Duration,
}

impl RpcSession {
    /// Connects to the configured endpoint, checks it serves the configured
    /// chain and resolves the connected account.
    ///
    /// Takes the key out of `config` so only the session holds it.
    pub async fn connect(config: &mut AppConfig) -> Result<Self, SessionError> {
        let client = RpcClient::new(&config.rpc_url, &config.user_agent())?;

        let expected = config.chain.chain_id;
        let actual = client.chain_id().await?;
        if actual != expected {
            return Err(SessionError::WrongChain { expected, actual });
        }

        let signer = match config.private_key.take() {
            Some(key) => {
                let address = address_from_private_key(key.expose_secret())?;
                let account = parse_address(&address)?;
                Signer::Local { key, account }
            }
            None => {
                let accounts = client.accounts().await?;
                let account = accounts.first().map(|a| parse_address(a)).transpose()?;
                Signer::Endpoint(account)
            }
        };

        match signer_account(&signer) {
            Some(account) => info!(%account, chain = config.chain.name, "wallet session connected"),
            None => info!(chain = config.chain.name, "no wallet account available"),
        }

        Ok(Self {
            client,
            chain_id: expected,
            signer,
            poll_interval: config.receipt_poll_interval,
            receipt_timeout: config.receipt_timeout,
        })
    }

    async fn fee_params(&self, from: &str, to: &str, data: &[u8]) -> Result<FeeParams, SessionError> {
        let gas_price = self.client.gas_price().await?;
        // Not every endpoint implements eth_maxPriorityFeePerGas.
        let priority = match self.client.max_priority_fee_per_gas().await {
            Ok(fee) => fee,
            Err(e) => {
                debug!(error = %e, "falling back to gas price for priority fee");
                gas_price
            }
        };
        let estimate = self.client.estimate_gas(from, to, data).await?;

        Ok(FeeParams {
            max_priority_fee_per_gas: priority,
            max_fee_per_gas: gas_price.saturating_mul(2).saturating_add(priority),
            gas_limit: with_gas_margin(estimate),
        })
    }

    async fn poll_receipt(&self, tx_hash: B256) -> Result<Receipt, SessionError> {
        let hash = tx_hash.to_string();

        loop {
            match self.client.transaction_receipt(&hash).await {
                Ok(Some(receipt)) if receipt.is_success() => {
                    let block_number = receipt
                        .block_number
                        .as_deref()
                        .map(parse_u64_quantity)
                        .transpose()?;
                    return Ok(Receipt { tx_hash, block_number });
                }
                Ok(Some(_)) => return Err(SessionError::Reverted(tx_hash)),
                Ok(None) => debug!(tx = %hash, "receipt not available yet"),
                // Keep watching; the caller's timeout bounds the wait.
                Err(e) => warn!(tx = %hash, error = %e, "receipt lookup failed"),
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

/// Connects a session for the shell. An unreachable or misbehaving endpoint
/// yields a [`DisconnectedSession`] so the page still renders; only a chain
/// mismatch is returned as an error.
pub async fn open_session(config: &mut AppConfig) -> Result<Arc<dyn WalletSession>, SessionError> {
    match RpcSession::connect(config).await {
        Ok(session) => Ok(Arc::new(session)),
        Err(e @ SessionError::WrongChain { .. }) => Err(e),
        Err(e) => {
            warn!(rpc = %config.rpc_url, error = %e, "wallet endpoint unavailable");
            Ok(Arc::new(DisconnectedSession))
        }
    }
}

#[async_trait]
impl WalletSession for RpcSession {
    fn account(&self) -> Option<Address> {
        signer_account(&self.signer)
    }

    async fn write_contract(&self, call: &ContractCall) -> Result<B256, SessionError> {
        let from = self.account().ok_or(SessionError::NotConnected)?;
        let data = call.calldata()?;
        let to = call.contract.address.to_checksum(None);
        let from = from.to_checksum(None);

        let hash = match &self.signer {
            Signer::Endpoint(_) => self.client.send_transaction(&from, &to, &data).await?,
            Signer::Local { key, .. } => {
                let nonce = self.client.transaction_count(&from).await?;
                let fees = self.fee_params(&from, &to, &data).await?;
                let tx = transaction::build_contract_call(self.chain_id, nonce, &to, data, fees)?;
                let signed = transaction::sign_transaction(&tx, key.expose_secret())?;

                let broadcast = self.client.send_raw_transaction(&signed.raw_tx).await?;
                if !broadcast.eq_ignore_ascii_case(&signed.tx_hash) {
                    debug!(local = %signed.tx_hash, remote = %broadcast, "endpoint reported a different hash");
                }
                broadcast
            }
        };

        parse_hash(&hash)
    }

    async fn read_contract(&self, call: &ContractCall) -> Result<Vec<u8>, SessionError> {
        let data = call.calldata()?;
        let to = call.contract.address.to_checksum(None);
        Ok(self.client.call(&to, &data).await?)
    }

    async fn wait_for_receipt(&self, tx_hash: B256) -> Result<Receipt, SessionError> {
        tokio::time::timeout(self.receipt_timeout, self.poll_receipt(tx_hash))
            .await
            .map_err(|_| SessionError::ReceiptTimeout(tx_hash))?
    }
}

/// `estimate` plus [`GAS_LIMIT_MARGIN_PCT`] percent, saturating.
fn with_gas_margin(estimate: u64) -> u64 {
    estimate.saturating_add(estimate.saturating_mul(GAS_LIMIT_MARGIN_PCT) / 100)
}

fn signer_account(signer: &Signer) -> Option<Address> {
    match signer {
        Signer::Endpoint(account) => *account,
        Signer::Local { account, .. } => Some(*account),
    }
}

fn parse_address(raw: &str) -> Result<Address, SessionError> {
    Address::from_str(raw).map_err(|e| {
        SessionError::Chain(chain_eth::error::EthError::InvalidAddress(format!("{raw}: {e}")))
    })
}

fn parse_hash(raw: &str) -> Result<B256, SessionError> {
    B256::from_str(raw).map_err(|e| {
        SessionError::Chain(chain_eth::error::EthError::EncodingError(format!(
            "invalid transaction hash {raw}: {e}"
        )))
    })
}
