//! Async Ethereum JSON-RPC client over HTTP.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use crate::error::EthError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

/// The subset of `eth_getTransactionReceipt` this client reads.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub transaction_hash: String,
    #[serde(default)]
    pub block_number: Option<String>,
    /// `0x1` on success, `0x0` on revert.
    #[serde(default)]
    pub status: Option<String>,
}

impl TransactionReceipt {
    /// Whether the transaction executed without reverting.
    pub fn is_success(&self) -> bool {
        matches!(self.status.as_deref(), Some("0x1") | Some("0x01"))
    }
}

/// A JSON-RPC endpoint.
pub struct RpcClient {
    http: reqwest::Client,
    url: String,
    next_id: AtomicU64,
}

impl RpcClient {
    /// Creates a client for `url`, identifying itself with `user_agent`.
    pub fn new(url: &str, user_agent: &str) -> Result<Self, EthError> {
        let http = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            url: url.to_string(),
            next_id: AtomicU64::new(1),
        })
    }

    /// Sends one JSON-RPC request and deserializes its `result`.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<T, EthError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        debug!(id, method, "rpc request");

        let body = RpcRequest {
            jsonrpc: "2.0",
            id,
            method,
            params,
        };

        let response: RpcResponse = self
            .http
            .post(&self.url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        decode_response(response)
    }

    pub async fn chain_id(&self) -> Result<u64, EthError> {
        let raw: String = self.request("eth_chainId", json!([])).await?;
        parse_u64_quantity(&raw)
    }

    /// Accounts managed by the node or wallet behind the endpoint.
    pub async fn accounts(&self) -> Result<Vec<String>, EthError> {
        self.request("eth_accounts", json!([])).await
    }

    /// Executes a read-only call against the latest block.
    pub async fn call(&self, to: &str, data: &[u8]) -> Result<Vec<u8>, EthError> {
        let raw: String = self
            .request(
                "eth_call",
                json!([{ "to": to, "data": encode_bytes(data) }, "latest"]),
            )
            .await?;
        decode_bytes(&raw)
    }

    pub async fn transaction_count(&self, address: &str) -> Result<u64, EthError> {
        let raw: String = self
            .request("eth_getTransactionCount", json!([address, "pending"]))
            .await?;
        parse_u64_quantity(&raw)
    }

    pub async fn gas_price(&self) -> Result<u128, EthError> {
        let raw: String = self.request("eth_gasPrice", json!([])).await?;
        parse_quantity(&raw)
    }

    pub async fn max_priority_fee_per_gas(&self) -> Result<u128, EthError> {
        let raw: String = self.request("eth_maxPriorityFeePerGas", json!([])).await?;
        parse_quantity(&raw)
    }

    pub async fn estimate_gas(&self, from: &str, to: &str, data: &[u8]) -> Result<u64, EthError> {
        let raw: String = self
            .request(
                "eth_estimateGas",
                json!([{ "from": from, "to": to, "data": encode_bytes(data) }]),
            )
            .await?;
        parse_u64_quantity(&raw)
    }

    /// Broadcasts a locally signed transaction and returns its hash.
    pub async fn send_raw_transaction(&self, raw_tx: &[u8]) -> Result<String, EthError> {
        self.request("eth_sendRawTransaction", json!([encode_bytes(raw_tx)]))
            .await
    }

    /// Asks the endpoint to sign and broadcast with its own account `from`.
    pub async fn send_transaction(
        &self,
        from: &str,
        to: &str,
        data: &[u8],
    ) -> Result<String, EthError> {
        self.request(
            "eth_sendTransaction",
            json!([{ "from": from, "to": to, "data": encode_bytes(data) }]),
        )
        .await
    }

    /// Returns the receipt, or `None` while the transaction is not yet mined.
    pub async fn transaction_receipt(
        &self,
        tx_hash: &str,
    ) -> Result<Option<TransactionReceipt>, EthError> {
        self.request("eth_getTransactionReceipt", json!([tx_hash]))
            .await
    }
}

fn decode_response<T: DeserializeOwned>(response: RpcResponse) -> Result<T, EthError> {
    if let Some(err) = response.error {
        return Err(EthError::Rpc {
            code: err.code,
            message: err.message,
        });
    }

    serde_json::from_value(response.result.unwrap_or(Value::Null))
        .map_err(|e| EthError::EncodingError(format!("unexpected rpc result: {e}")))
}

/// Parses a hex quantity such as `0x1a`.
fn parse_quantity(raw: &str) -> Result<u128, EthError> {
    let digits = raw
        .strip_prefix("0x")
        .ok_or_else(|| EthError::EncodingError(format!("quantity '{raw}' missing 0x")))?;
    if digits.is_empty() {
        return Ok(0);
    }
    u128::from_str_radix(digits, 16)
        .map_err(|e| EthError::EncodingError(format!("invalid quantity '{raw}': {e}")))
}

/// Parses a hex quantity that must fit in a `u64`, such as a nonce or a
/// block number.
pub fn parse_u64_quantity(raw: &str) -> Result<u64, EthError> {
    u64::try_from(parse_quantity(raw)?)
        .map_err(|_| EthError::EncodingError(format!("quantity '{raw}' does not fit in u64")))
}

fn encode_bytes(data: &[u8]) -> String {
    format!("0x{}", hex::encode(data))
}

fn decode_bytes(raw: &str) -> Result<Vec<u8>, EthError> {
    let digits = raw.strip_prefix("0x").unwrap_or(raw);
    hex::decode(digits).map_err(|e| EthError::EncodingError(format!("invalid hex data: {e}")))
}
