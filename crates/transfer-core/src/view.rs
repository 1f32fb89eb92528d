//! Text rendering of the transfer page.

use std::fmt;

use alloy_primitives::Address;
use chain_eth::address::short_address;

use crate::balance::Balance;
use crate::error::FormError;
use crate::transfer::{TransferRequest, TransferState};

pub const ADDRESS_PLACEHOLDER: &str = "0xA0Cf…251e";
pub const VALUE_PLACEHOLDER: &str = "0.05";

/// The two form fields as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferForm {
    pub address: String,
    pub value: String,
}

impl TransferForm {
    pub fn new(address: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            value: value.into(),
        }
    }

    /// Builds a request. Both fields are required; their contents are not
    /// otherwise checked.
    pub fn submit(&self) -> Result<TransferRequest, FormError> {
        if self.address.trim().is_empty() {
            return Err(FormError("address"));
        }
        if self.value.trim().is_empty() {
            return Err(FormError("value"));
        }
        Ok(TransferRequest {
            recipient: self.address.clone(),
            amount: self.value.clone(),
        })
    }
}

/// Everything the page shows.
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub account: Option<Address>,
    pub balance: Option<Balance>,
    pub form: TransferForm,
    pub state: TransferState,
}

impl Page {
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(9);

        lines.push(match self.account {
            Some(account) => format!("[ {} ]", short_address(&account.to_checksum(None))),
            None => "[ Connect Wallet ]".to_string(),
        });
        lines.push("Empezando".to_string());
        lines.push(field("address", &self.form.address, ADDRESS_PLACEHOLDER));
        lines.push(field("value", &self.form.value, VALUE_PLACEHOLDER));
        lines.push(balance_line(self.balance.as_ref()));

        lines.push(if self.state.is_pending() {
            "[ Confirming... ] (disabled)".to_string()
        } else {
            "[ Send ]".to_string()
        });

        if self.state.is_confirming() {
            lines.push("Waiting for confirmation...".to_string());
        }
        if self.state.is_confirmed() {
            lines.push("Transaction confirmed.".to_string());
        }
        if let Some(hash) = self.state.hash() {
            lines.push(format!("Transaction Hash: {hash}"));
        }
        if self.state.is_failed() {
            lines.push("Transaction failed.".to_string());
        }

        lines
    }

    /// Whether the submit control accepts input.
    pub fn submit_enabled(&self) -> bool {
        !self.state.is_pending()
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.lines() {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

/// Empty when no balance data is present. A zero balance is still data.
pub fn balance_line(balance: Option<&Balance>) -> String {
    match balance {
        Some(balance) => format!("Tu balance es de: {balance}"),
        None => String::new(),
    }
}

fn field(name: &str, value: &str, placeholder: &str) -> String {
    if value.is_empty() {
        format!("{name}: <{placeholder}>")
    } else {
        format!("{name}: {value}")
    }
}
