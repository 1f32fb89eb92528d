//! Conversion between decimal token quantities and raw integer units.

use alloy_primitives::U256;

use crate::error::EthError;

/// Parses a decimal quantity such as `"0.05"` into raw units scaled by
/// `10^decimals`.
///
/// Rejects empty input, signs, exponents, and more fractional digits than
/// the token supports.
pub fn parse_units(amount: &str, decimals: u8) -> Result<U256, EthError> {
    let amount = amount.trim();
    if amount.is_empty() {
        return Err(EthError::InvalidAmount("amount is empty".into()));
    }

    let (whole, fraction) = match amount.split_once('.') {
        Some((w, f)) => (w, f),
        None => (amount, ""),
    };

    if whole.is_empty() && fraction.is_empty() {
        return Err(EthError::InvalidAmount(format!("'{amount}' has no digits")));
    }
    if !whole.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit()) {
        return Err(EthError::InvalidAmount(format!(
            "'{amount}' is not a decimal number"
        )));
    }
    if fraction.len() > decimals as usize {
        return Err(EthError::InvalidAmount(format!(
            "'{amount}' has more than {decimals} fractional digits"
        )));
    }

    let mut digits = String::with_capacity(whole.len() + decimals as usize);
    digits.push_str(whole);
    digits.push_str(fraction);
    for _ in fraction.len()..decimals as usize {
        digits.push('0');
    }

    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        return Ok(U256::ZERO);
    }

    U256::from_str_radix(digits, 10)
        .map_err(|e| EthError::InvalidAmount(format!("'{amount}' does not fit in uint256: {e}")))
}

/// Formats raw units as a decimal quantity, trimming trailing zeros.
///
/// `50_000_000_000_000_000_000` with 18 decimals formats as `"50"`.
pub fn format_units(raw: U256, decimals: u8) -> String {
    let scale = U256::from(10u64).pow(U256::from(decimals));
    let (whole, remainder) = raw.div_rem(scale);

    if remainder.is_zero() {
        return whole.to_string();
    }

    let fraction = format!("{:0>width$}", remainder.to_string(), width = decimals as usize);
    format!("{whole}.{}", fraction.trim_end_matches('0'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ether(n: u64) -> U256 {
        U256::from(n) * U256::from(10u64).pow(U256::from(18u64))
    }

    #[test]
    fn parse_whole_amount() {
        assert_eq!(parse_units("10", 18).unwrap(), ether(10));
    }

    #[test]
    fn parse_fractional_amount() {
        assert_eq!(
            parse_units("0.05", 18).unwrap(),
            U256::from(50_000_000_000_000_000u64)
        );
    }

    #[test]
    fn parse_leading_dot() {
        assert_eq!(parse_units(".5", 6).unwrap(), U256::from(500_000u64));
    }

    #[test]
    fn parse_zero() {
        assert_eq!(parse_units("0.000", 18).unwrap(), U256::ZERO);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(parse_units("", 18).is_err());
        assert!(parse_units(".", 18).is_err());
        assert!(parse_units("-1", 18).is_err());
        assert!(parse_units("1e18", 18).is_err());
        assert!(parse_units("1.2.3", 18).is_err());
    }

    #[test]
    fn parse_rejects_excess_precision() {
        assert!(parse_units("0.0000001", 6).is_err());
    }

    #[test]
    fn format_whole_balance() {
        assert_eq!(format_units(ether(50), 18), "50");
        assert_eq!(format_units(ether(10), 18), "10");
    }

    #[test]
    fn format_fractional_balance() {
        assert_eq!(format_units(U256::from(50_000_000_000_000_000u64), 18), "0.05");
        assert_eq!(format_units(U256::from(1_500_000u64), 6), "1.5");
    }

    #[test]
    fn format_zero() {
        assert_eq!(format_units(U256::ZERO, 18), "0");
    }
}
