use alloy_primitives::U256;
use aws_sdk_dynamodb::types::AttributeValue;
use std::collections::HashMap;
use std::str::FromStr;

use crate::ProviderError;

/// Returns the `i64` value for the given attribute, `ProviderError` if data is missing or invalid data value.
pub fn attr_to_i64(
    data: &HashMap<String, AttributeValue>,
    attr: &str,
) -> Result<i64, ProviderError> {
    if let Some(a) = data.get(attr) {
        let n = a.as_n().map_err(|_e| {
            ProviderError::DataValueError(format!("Expecting N for attribute {}", attr))
        })?;

        Ok(n.parse::<i64>().map_err(|_e| {
            ProviderError::DataValueError(format!("Expecting i64 for attribute {}", attr))
        })?)
    } else {
        Err(ProviderError::MissingDataError(format!(
            "No data found for attr {}",
            attr
        )))
    }
}

/// Returns the `U256` amount stored as a decimal number for the given attribute.
pub fn attr_to_u256(
    data: &HashMap<String, AttributeValue>,
    attr: &str,
) -> Result<U256, ProviderError> {
    match attr_to_opt_u256(data, attr)? {
        Some(v) => Ok(v),
        None => Err(ProviderError::MissingDataError(format!(
            "No data found for attr {}",
            attr
        ))),
    }
}

/// Returns the `U256` amount for the given attribute, or None if not found.
pub fn attr_to_opt_u256(
    data: &HashMap<String, AttributeValue>,
    attr: &str,
) -> Result<Option<U256>, ProviderError> {
    if let Some(a) = data.get(attr) {
        let n = a.as_n().map_err(|_e| {
            ProviderError::DataValueError(format!("Expecting N for attribute {}", attr))
        })?;

        // Decimal-only: U256::from_str would also accept 0x prefixed values.
        if n.is_empty() || !n.chars().all(|c| c.is_ascii_digit()) {
            return Err(ProviderError::DataValueError(format!(
                "Expecting integer amount for attribute {}",
                attr
            )));
        }

        Ok(Some(U256::from_str(n).map_err(|_e| {
            ProviderError::DataValueError(format!("Expecting u256 for attribute {}", attr))
        })?))
    } else {
        Ok(None)
    }
}

/// Returns the `String` value for the given attribute, `ProviderError` if data is missing or invalid data value.
pub fn attr_to_str(
    data: &HashMap<String, AttributeValue>,
    attr: &str,
) -> Result<String, ProviderError> {
    if let Some(a) = data.get(attr) {
        let s = a.as_s().map_err(|_e| {
            ProviderError::DataValueError(format!("Expecting S for attribute {}", attr))
        })?;

        Ok(s.to_string())
    } else {
        Err(ProviderError::MissingDataError(format!(
            "No data found for attr {}",
            attr
        )))
    }
}

/// Returns the `String` value for the given attribute, or None if not found.
/// A stored NULL is read as None, as burn hashes are written as NULL until known.
pub fn attr_to_opt_str(
    data: &HashMap<String, AttributeValue>,
    attr: &str,
) -> Result<Option<String>, ProviderError> {
    match data.get(attr) {
        None | Some(AttributeValue::Null(_)) => Ok(None),
        Some(a) => {
            let s = a.as_s().map_err(|_e| {
                ProviderError::DataValueError(format!("Expecting S for attribute {}", attr))
            })?;

            Ok(Some(s.to_string()))
        }
    }
}

/// Returns the `HashMap` stored under `Data` in the given item.
pub fn attr_to_map(
    data: &HashMap<String, AttributeValue>,
    attr: &str,
) -> Result<HashMap<String, AttributeValue>, ProviderError> {
    if let Some(a) = data.get(attr) {
        Ok(a.as_m()
            .map_err(|_e| {
                ProviderError::DataValueError(format!("Expecting M for attribute {}", attr))
            })?
            .clone())
    } else {
        Err(ProviderError::MissingDataError(format!(
            "No data found for attr {}",
            attr
        )))
    }
}

/// Returns an optional string as `S`, or `NULL` when absent.
pub fn opt_str_to_attr(value: &Option<String>) -> AttributeValue {
    match value {
        Some(v) => AttributeValue::S(v.clone()),
        None => AttributeValue::Null(true),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attr_to_u256() {
        let mut data = HashMap::new();
        data.insert(
            "Price".to_string(),
            AttributeValue::N("1000000000000000000".to_string()),
        );

        let v = attr_to_u256(&data, "Price").unwrap();
        assert_eq!(v, U256::from(10u64).pow(U256::from(18u64)));
    }

    #[test]
    fn test_attr_to_u256_rejects_hex_and_fraction() {
        let mut data = HashMap::new();
        data.insert("Price".to_string(), AttributeValue::N("0x10".to_string()));
        assert!(attr_to_u256(&data, "Price").is_err());

        data.insert("Price".to_string(), AttributeValue::N("1.5".to_string()));
        assert!(attr_to_u256(&data, "Price").is_err());
    }

    #[test]
    fn test_attr_to_opt_str_null() {
        let mut data = HashMap::new();
        data.insert("BurnTransaction".to_string(), AttributeValue::Null(true));

        assert_eq!(attr_to_opt_str(&data, "BurnTransaction").unwrap(), None);
        assert_eq!(attr_to_opt_str(&data, "Missing").unwrap(), None);
    }

    #[test]
    fn test_attr_to_str_missing() {
        let data = HashMap::new();
        match attr_to_str(&data, "ArticleId") {
            Err(ProviderError::MissingDataError(s)) => {
                assert_eq!(s, "No data found for attr ArticleId")
            }
            _ => panic!("expected MissingDataError"),
        }
    }
}
