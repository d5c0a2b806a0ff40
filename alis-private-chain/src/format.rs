use alloy_primitives::U256;

use crate::ChainError;

/// Returns true if the given string is an hexadecimal string with `0x` prefix, false otherwise.
pub fn is_hexadecimal_with_prefix(input: &str) -> bool {
    match input.strip_prefix("0x") {
        Some(digits) => !digits.is_empty() && digits.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

/// Returns the nonce following `nonce_hex`, as `0x` prefixed hex without padding.
pub fn increment_transaction_count(nonce_hex: &str) -> Result<String, ChainError> {
    let nonce = parse_hex_u64(nonce_hex, "nonce")?;
    let next = nonce
        .checked_add(1)
        .ok_or_else(|| ChainError::Validation("nonce is invalid".to_string()))?;

    Ok(format!("{:#x}", next))
}

/// Parses a `0x` prefixed hex quantity.
pub fn parse_hex_u64(input: &str, field: &str) -> Result<u64, ChainError> {
    if !is_hexadecimal_with_prefix(input) {
        return Err(ChainError::Validation(format!("{} is invalid", field)));
    }

    u64::from_str_radix(&input[2..], 16)
        .map_err(|_e| ChainError::Validation(format!("{} is invalid", field)))
}

/// Parses a `0x` prefixed hex amount.
pub fn parse_hex_u256(input: &str, field: &str) -> Result<U256, ChainError> {
    if !is_hexadecimal_with_prefix(input) {
        return Err(ChainError::Validation(format!("{} is invalid", field)));
    }

    U256::from_str_radix(&input[2..], 16)
        .map_err(|_e| ChainError::Validation(format!("{} is invalid", field)))
}

/// Encodes `value` as a 32 bytes ABI word, 64 hex digits without prefix.
pub fn to_abi_word(value: U256) -> String {
    hex::encode(value.to_be_bytes::<32>())
}

/// Decodes an hex string, with or without `0x` prefix.
pub fn decode_hex(input: &str, field: &str) -> Result<Vec<u8>, ChainError> {
    let s = input.strip_prefix("0x").unwrap_or(input);
    hex::decode(s).map_err(|_e| ChainError::Validation(format!("{} is invalid", field)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_increment_transaction_count() {
        assert_eq!(increment_transaction_count("0x0").unwrap(), "0x1");
        assert_eq!(increment_transaction_count("0xf").unwrap(), "0x10");
        assert_eq!(increment_transaction_count("0x00ff").unwrap(), "0x100");
    }

    #[test]
    fn test_increment_transaction_count_invalid() {
        assert!(increment_transaction_count("15").is_err());
        assert!(increment_transaction_count("0x").is_err());
        assert!(increment_transaction_count("0xffffffffffffffff").is_err());
    }

    #[test]
    fn test_is_hexadecimal_with_prefix() {
        assert!(is_hexadecimal_with_prefix("0x123"));
        assert!(!is_hexadecimal_with_prefix("0x"));
        assert!(!is_hexadecimal_with_prefix("1234"));
        assert!(!is_hexadecimal_with_prefix("0xzz"));
    }

    #[test]
    fn test_parse_hex_u256() {
        let word = "0x0000000000000000000000000000000000000000000000000de0b6b3a7640000";
        assert_eq!(
            parse_hex_u256(word, "value").unwrap(),
            U256::from(10u64).pow(U256::from(18u64))
        );
        assert!(parse_hex_u256("0x", "value").is_err());
    }

    #[test]
    fn test_to_abi_word() {
        let word = to_abi_word(U256::from(255u64));
        assert_eq!(word.len(), 64);
        assert_eq!(
            word,
            "00000000000000000000000000000000000000000000000000000000000000ff"
        );
        assert_eq!(
            parse_hex_u256(&format!("0x{}", word), "value").unwrap(),
            U256::from(255u64)
        );
        assert_eq!(to_abi_word(U256::MAX), "f".repeat(64));
    }
}
