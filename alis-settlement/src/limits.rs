//! Amount bounds and the token send daily limit.
use alis_dynamodb::providers::AlisTokenSendProvider;
use alloy_primitives::U256;
use chrono::{DateTime, FixedOffset, Utc};
use tracing::info;

use crate::SettlementError;

/// Inclusive range of accepted amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmountRange {
    pub min: U256,
    pub max: U256,
}

impl AmountRange {
    pub fn new(min: U256, max: U256) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: U256) -> bool {
        value >= self.min && value <= self.max
    }

    /// Fails with `{field} is invalid` when `value` is out of range.
    pub fn check(&self, value: U256, field: &str) -> Result<(), SettlementError> {
        if !self.contains(value) {
            return Err(SettlementError::Validation(format!("{} is invalid", field)));
        }
        Ok(())
    }
}

/// Burnt part of a transfer, 10% rounded down.
pub fn burn_value(value: U256) -> U256 {
    value / U256::from(10u64)
}

/// Seller part of a purchase, 90% rounded down.
pub fn seller_value(price: U256) -> U256 {
    let ten = U256::from(10u64);
    let nine = U256::from(9u64);
    price / ten * nine + price % ten * nine / ten
}

/// Current time in the reporting timezone.
pub fn now(timezone: &FixedOffset) -> DateTime<FixedOffset> {
    Utc::now().with_timezone(timezone)
}

/// `YYYY-MM-DD` of `time`.
pub fn target_date(time: &DateTime<FixedOffset>) -> String {
    time.format("%Y-%m-%d").to_string()
}

/// Ledger sort key, microseconds since epoch.
pub fn sort_key(time: &DateTime<FixedOffset>) -> i64 {
    time.timestamp_micros()
}

/// Rejects `send_value` if the sends of the day still counted (`doing` or `done`)
/// plus `send_value` exceed `daily_limit`.
pub async fn ensure_within_daily_limit<C, P>(
    client: &C,
    provider: &P,
    user_id: &str,
    target_date: &str,
    send_value: U256,
    daily_limit: U256,
) -> Result<(), SettlementError>
where
    C: Sync,
    P: AlisTokenSendProvider<Client = C> + Sync,
{
    let sends = provider
        .get_token_sends_by_date(client, user_id, target_date)
        .await?;

    let sent = sends
        .iter()
        .filter(|s| s.is_counted())
        .fold(U256::ZERO, |acc, s| acc.saturating_add(s.send_value));

    let total = sent.saturating_add(send_value);
    if total > daily_limit {
        info!(
            "Daily limit reached for {} on {}: {} already sent",
            user_id, target_date, sent
        );
        return Err(SettlementError::Validation(format!(
            "Token send value exceeds the daily limit of {}",
            daily_limit
        )));
    }

    Ok(())
}
