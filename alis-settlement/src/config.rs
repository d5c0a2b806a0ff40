use alloy_primitives::U256;
use chrono::{FixedOffset, Offset, Utc};
use serde::Deserialize;

use crate::limits::AmountRange;
use crate::SettlementError;

fn default_price_min() -> String {
    "1000000000000000000".to_owned()
}

fn default_price_max() -> String {
    "10000000000000000000000".to_owned()
}

fn default_tip_min() -> String {
    "10".to_owned()
}

fn default_tip_max() -> String {
    "1000000000000000000000000".to_owned()
}

fn default_token_send_daily_limit() -> String {
    "10000000000000000000000".to_owned()
}

fn default_timezone_offset_hours() -> i32 {
    9
}

/// Settlement settings, read from `ALIS_` prefixed environment variables.
/// Amounts are decimal strings in the smallest token unit.
#[derive(Deserialize, Debug, Clone)]
pub struct SettlementConfig {
    pub table_name: String,
    pub cognito_user_pool_id: String,
    #[serde(default = "default_price_min")]
    pub price_min: String,
    #[serde(default = "default_price_max")]
    pub price_max: String,
    #[serde(default = "default_tip_min")]
    pub tip_min: String,
    #[serde(default = "default_tip_max")]
    pub tip_max: String,
    #[serde(default = "default_token_send_daily_limit")]
    pub token_send_daily_limit: String,
    /// Offset of the calendar used for daily aggregates.
    #[serde(default = "default_timezone_offset_hours")]
    pub timezone_offset_hours: i32,
}

/// Parsed numeric settings shared by the workflows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limits {
    pub price: AmountRange,
    pub tip: AmountRange,
    pub token_send_daily_limit: U256,
    pub timezone: FixedOffset,
}

fn parse_amount(value: &str, name: &str) -> Result<U256, SettlementError> {
    U256::from_str_radix(value, 10)
        .map_err(|e| SettlementError::Internal(format!("Invalid {}: {}", name, e)))
}

impl SettlementConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::prefixed("ALIS_").from_env::<SettlementConfig>()
    }

    pub fn limits(&self) -> Result<Limits, SettlementError> {
        let timezone = FixedOffset::east_opt(self.timezone_offset_hours * 3600).ok_or_else(|| {
            SettlementError::Internal(format!(
                "Invalid timezone_offset_hours: {}",
                self.timezone_offset_hours
            ))
        })?;

        Ok(Limits {
            price: AmountRange::new(
                parse_amount(&self.price_min, "price_min")?,
                parse_amount(&self.price_max, "price_max")?,
            ),
            tip: AmountRange::new(
                parse_amount(&self.tip_min, "tip_min")?,
                parse_amount(&self.tip_max, "tip_max")?,
            ),
            token_send_daily_limit: parse_amount(
                &self.token_send_daily_limit,
                "token_send_daily_limit",
            )?,
            timezone,
        })
    }
}

impl Default for Limits {
    fn default() -> Self {
        let ten = U256::from(10u64);
        Limits {
            price: AmountRange::new(ten.pow(U256::from(18u64)), ten.pow(U256::from(22u64))),
            tip: AmountRange::new(ten, ten.pow(U256::from(24u64))),
            token_send_daily_limit: ten.pow(U256::from(22u64)),
            timezone: FixedOffset::east_opt(9 * 3600).unwrap_or_else(|| Utc.fix()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(extra: &[(&str, &str)]) -> Vec<(String, String)> {
        let mut v = vec![
            ("TABLE_NAME".to_string(), "alis-settlement".to_string()),
            (
                "COGNITO_USER_POOL_ID".to_string(),
                "ap-northeast-1_xxxx".to_string(),
            ),
        ];
        for (k, val) in extra {
            v.push((k.to_string(), val.to_string()));
        }
        v
    }

    #[test]
    fn defaults_match_limits_default() {
        let config: SettlementConfig = envy::from_iter(vars(&[])).unwrap();
        assert_eq!(config.limits().unwrap(), Limits::default());
    }

    #[test]
    fn overridden_daily_limit() {
        let config: SettlementConfig =
            envy::from_iter(vars(&[("TOKEN_SEND_DAILY_LIMIT", "5000")])).unwrap();
        assert_eq!(
            config.limits().unwrap().token_send_daily_limit,
            U256::from(5000u64)
        );
    }

    #[test]
    fn invalid_amount() {
        let config: SettlementConfig = envy::from_iter(vars(&[("PRICE_MIN", "0x10")])).unwrap();
        match config.limits() {
            Err(SettlementError::Internal(s)) => assert!(s.starts_with("Invalid price_min")),
            _ => panic!("expected Internal"),
        }
    }

    #[test]
    fn invalid_timezone() {
        let config: SettlementConfig =
            envy::from_iter(vars(&[("TIMEZONE_OFFSET_HOURS", "30")])).unwrap();
        assert!(config.limits().is_err());
    }
}
