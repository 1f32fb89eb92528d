//! Wallet-backed ERC-20 transfer client.
//!
//! A [`session::WalletSession`] supplies the connected account and the
//! contract read/write primitives. On top of it, [`balance`] reads the
//! account's token balance, [`submitter`] issues `transfer` calls and tracks
//! the resulting transaction through the [`transfer`] state machine, and
//! [`view`] renders the page shown to the user.

pub mod balance;
pub mod config;
pub mod contract;
pub mod error;
pub mod rpc_session;
pub mod session;
pub mod submitter;
pub mod transfer;
pub mod view;
