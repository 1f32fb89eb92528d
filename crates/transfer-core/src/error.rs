use alloy_primitives::B256;
use chain_eth::error::EthError;
use thiserror::Error;

/// Configuration and contract descriptor errors. All of these abort startup
/// before a session is built.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("PROJECT_ID is not set")]
    MissingProjectId,

    #[error("invalid value for {key}: {reason}")]
    InvalidValue { key: &'static str, reason: String },

    #[error("unsupported chain: {0}")]
    UnsupportedChain(u64),

    #[error("cannot read contract descriptor {path}: {source}")]
    DescriptorIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed contract descriptor: {0}")]
    DescriptorFormat(#[from] serde_json::Error),

    #[error("invalid contract descriptor: {0}")]
    DescriptorInvalid(String),
}

/// Failures surfaced by a wallet session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no wallet connected")]
    NotConnected,

    #[error("connected to chain {actual}, expected {expected}")]
    WrongChain { expected: u64, actual: u64 },

    #[error("invalid call arguments: {0}")]
    InvalidArguments(String),

    #[error("function '{0}' is not declared in the contract ABI")]
    UnknownFunction(String),

    #[error("transaction {0} reverted")]
    Reverted(B256),

    #[error("no receipt for {0} before timeout")]
    ReceiptTimeout(B256),

    #[error("chain client error: {0}")]
    Chain(#[from] EthError),
}

/// A form field left empty.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("please fill out the '{0}' field")]
pub struct FormError(pub &'static str);

/// Top-level error of the `token-transfer` binary.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Form(#[from] FormError),
}
