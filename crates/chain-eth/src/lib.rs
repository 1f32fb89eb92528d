//! EVM chain support for the token transfer client.
//!
//! This crate provides:
//! - Address validation with EIP-55 checksums, and address derivation from
//!   secp256k1 keys for the local signer
//! - Minimal ABI encoding for ERC-20 `transfer` and `balanceOf`
//! - Decimal unit parsing and formatting for token amounts
//! - The supported EVM network table
//! - EIP-1559 contract-call transaction building and signing
//! - An async JSON-RPC client for reads, broadcasts and receipt lookups

pub mod abi;
pub mod address;
pub mod chains;
pub mod erc20;
pub mod error;
pub mod rpc;
pub mod transaction;
pub mod units;
