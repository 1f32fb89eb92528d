use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::SecretKey;
use sha3::{Digest, Keccak256};

use crate::error::EthError;

/// Derives the EIP-55 checksummed address controlled by a secp256k1 private key.
///
/// Used by the local signer to report its connected account.
pub fn address_from_private_key(private_key: &[u8; 32]) -> Result<String, EthError> {
    let secret = SecretKey::from_bytes(private_key.into())
        .map_err(|e| EthError::InvalidPrivateKey(e.to_string()))?;
    let uncompressed = secret.public_key().to_encoded_point(false);

    let mut key_65 = [0u8; 65];
    key_65.copy_from_slice(uncompressed.as_bytes());
    pubkey_to_eth_address(&key_65)
}

/// Derives an EIP-55 checksummed address from an uncompressed secp256k1
/// public key (65 bytes, starting with 0x04).
///
/// The address is the last 20 bytes of Keccak-256 over the 64-byte key body.
pub fn pubkey_to_eth_address(uncompressed_pubkey: &[u8; 65]) -> Result<String, EthError> {
    if uncompressed_pubkey[0] != 0x04 {
        return Err(EthError::InvalidPublicKey(
            "uncompressed key must start with 0x04".into(),
        ));
    }

    let hash = Keccak256::digest(&uncompressed_pubkey[1..]);
    checksum_address(&format!("0x{}", hex::encode(&hash[12..])))
}

/// Parses a 0x-prefixed hex address into its 20 raw bytes.
///
/// Case is not checked here; use [`validate_address`] for EIP-55 checks.
pub fn parse_address(address: &str) -> Result<[u8; 20], EthError> {
    let hex_part = strip_hex_prefix(address)?;
    check_hex_body(hex_part)?;

    let bytes = hex::decode(hex_part)
        .map_err(|e| EthError::InvalidAddress(format!("invalid hex: {e}")))?;

    let mut addr = [0u8; 20];
    addr.copy_from_slice(&bytes);
    Ok(addr)
}

/// Validates an address string.
///
/// Returns `Ok(true)` for well-formed all-lowercase or all-uppercase
/// addresses, and for mixed-case addresses whose EIP-55 checksum matches.
/// A well-formed address with a wrong checksum returns `Ok(false)`.
pub fn validate_address(address: &str) -> Result<bool, EthError> {
    let hex_part = strip_hex_prefix(address)?;
    check_hex_body(hex_part)?;

    let is_all_lower = hex_part.chars().all(|c| !c.is_ascii_uppercase());
    let is_all_upper = hex_part.chars().all(|c| !c.is_ascii_lowercase());
    if is_all_lower || is_all_upper {
        return Ok(true);
    }

    let checksummed = checksum_address(address)?;
    Ok(checksummed[2..] == *hex_part)
}

/// Applies EIP-55 mixed-case checksum encoding to an address.
pub fn checksum_address(address: &str) -> Result<String, EthError> {
    let hex_part = strip_hex_prefix(address)?.to_lowercase();
    check_hex_body(&hex_part)?;

    let hash = Keccak256::digest(hex_part.as_bytes());

    let mut checksummed = String::with_capacity(42);
    checksummed.push_str("0x");

    for (i, c) in hex_part.chars().enumerate() {
        let byte = hash[i / 2];
        let nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0x0f };
        if c.is_ascii_alphabetic() && nibble >= 8 {
            checksummed.push(c.to_ascii_uppercase());
        } else {
            checksummed.push(c);
        }
    }

    Ok(checksummed)
}

/// Abbreviates an address for display, e.g. `0x5aAe…eAed`.
pub fn short_address(address: &str) -> String {
    if address.len() <= 10 {
        return address.to_string();
    }
    format!("{}…{}", &address[..6], &address[address.len() - 4..])
}

fn strip_hex_prefix(address: &str) -> Result<&str, EthError> {
    address
        .strip_prefix("0x")
        .or_else(|| address.strip_prefix("0X"))
        .ok_or_else(|| EthError::InvalidAddress("address must start with 0x".into()))
}

fn check_hex_body(hex_part: &str) -> Result<(), EthError> {
    if hex_part.len() != 40 {
        return Err(EthError::InvalidAddress(format!(
            "expected 40 hex characters, got {}",
            hex_part.len()
        )));
    }

    if !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(EthError::InvalidAddress(
            "address contains non-hex characters".into(),
        ));
    }

    Ok(())
}
