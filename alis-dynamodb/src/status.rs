use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ProviderError;

/// Locally resolved status of an on-chain settlement.
///
/// `Doing` is both the initial status and the status kept when the
/// confirmation could not be observed in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettlementStatus {
    Doing,
    Done,
    Fail,
}

impl SettlementStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SettlementStatus::Doing => "doing",
            SettlementStatus::Done => "done",
            SettlementStatus::Fail => "fail",
        }
    }

    /// `Done` and `Fail` are terminal, `Doing` may still move.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SettlementStatus::Doing)
    }
}

impl fmt::Display for SettlementStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SettlementStatus {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "doing" => Ok(SettlementStatus::Doing),
            "done" => Ok(SettlementStatus::Done),
            "fail" => Ok(SettlementStatus::Fail),
            _ => Err(ProviderError::DataValueError(format!(
                "Unknown settlement status {}",
                s
            ))),
        }
    }
}
