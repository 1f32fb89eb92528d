use std::sync::Arc;

use alloy_primitives::{Address, B256};
use async_trait::async_trait;

use crate::contract::ContractDescriptor;
use crate::error::SessionError;

/// A contract function invocation with loosely typed string arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractCall {
    pub contract: Arc<ContractDescriptor>,
    pub function: String,
    pub args: Vec<String>,
}

impl ContractCall {
    pub fn new(contract: Arc<ContractDescriptor>, function: &str, args: Vec<String>) -> Self {
        Self {
            contract,
            function: function.to_string(),
            args,
        }
    }

    /// ABI-encoded calldata for this call.
    pub fn calldata(&self) -> Result<Vec<u8>, SessionError> {
        self.contract.encode_call(&self.function, &self.args)
    }
}

/// A mined transaction as observed by the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub tx_hash: B256,
    pub block_number: Option<u64>,
}

/// Connection between the client and a user-controlled signing account.
///
/// Implementations own account management, signing, broadcasting and
/// receipt watching; callers only see these four primitives.
#[async_trait]
pub trait WalletSession: Send + Sync {
    /// The connected account, or `None` when no wallet is attached.
    fn account(&self) -> Option<Address>;

    /// Signs and broadcasts a state-changing call, returning its hash.
    ///
    /// Fails with [`SessionError::NotConnected`] when no account is attached.
    async fn write_contract(&self, call: &ContractCall) -> Result<B256, SessionError>;

    /// Executes a read-only call and returns the raw return data.
    async fn read_contract(&self, call: &ContractCall) -> Result<Vec<u8>, SessionError>;

    /// Resolves once the transaction is mined successfully. Reverts and
    /// timeouts are errors.
    async fn wait_for_receipt(&self, tx_hash: B256) -> Result<Receipt, SessionError>;
}

/// Session used when no wallet endpoint could be reached. Reads and writes
/// fail with [`SessionError::NotConnected`].
#[derive(Debug, Default, Clone, Copy)]
pub struct DisconnectedSession;

#[async_trait]
impl WalletSession for DisconnectedSession {
    fn account(&self) -> Option<Address> {
        None
    }

    async fn write_contract(&self, _call: &ContractCall) -> Result<B256, SessionError> {
        Err(SessionError::NotConnected)
    }

    async fn read_contract(&self, _call: &ContractCall) -> Result<Vec<u8>, SessionError> {
        Err(SessionError::NotConnected)
    }

    async fn wait_for_receipt(&self, _tx_hash: B256) -> Result<Receipt, SessionError> {
        Err(SessionError::NotConnected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::tests::descriptor;

    #[tokio::test]
    async fn disconnected_session_refuses_everything() {
        let session = DisconnectedSession;
        let call = ContractCall::new(
            Arc::new(descriptor()),
            "balanceOf",
            vec!["0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf".to_string()],
        );

        assert!(session.account().is_none());
        assert!(matches!(
            session.write_contract(&call).await,
            Err(SessionError::NotConnected)
        ));
        assert!(matches!(
            session.read_contract(&call).await,
            Err(SessionError::NotConnected)
        ));
        assert!(matches!(
            session.wait_for_receipt(B256::ZERO).await,
            Err(SessionError::NotConnected)
        ));
    }
}
