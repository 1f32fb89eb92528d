use std::fmt;
use std::sync::Arc;

use alloy_primitives::U256;
use chain_eth::{abi, units};
use tracing::{debug, warn};

use crate::contract::ContractDescriptor;
use crate::session::{ContractCall, WalletSession};

/// A token balance in raw units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Balance {
    pub raw: U256,
    pub decimals: u8,
}

impl fmt::Display for Balance {
    /// `raw / 10^decimals` as an exact decimal, e.g. `50` or `0.05`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&units::format_units(self.raw, self.decimals))
    }
}

/// Reads the connected account's balance of the descriptor's token.
///
/// Returns `None` when no account is connected or the read fails.
pub async fn read_balance(
    session: &dyn WalletSession,
    contract: &Arc<ContractDescriptor>,
) -> Option<Balance> {
    let account = session.account()?;
    let call = ContractCall::new(
        Arc::clone(contract),
        "balanceOf",
        vec![account.to_checksum(None)],
    );

    let data = match session.read_contract(&call).await {
        Ok(data) => data,
        Err(e) => {
            warn!(%account, error = %e, "balance read failed");
            return None;
        }
    };

    match abi::decode_uint256(&data) {
        Ok(raw) => {
            debug!(%account, %raw, "balance read");
            Some(Balance {
                raw,
                decimals: contract.decimals,
            })
        }
        Err(e) => {
            warn!(%account, error = %e, "balance result could not be decoded");
            None
        }
    }
}
