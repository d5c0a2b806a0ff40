use alloy_primitives::U256;
use aws_sdk_dynamodb::types::AttributeValue;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{convert, ProviderError, SettlementStatus};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSendKey {
    pub user_id: String,
    pub target_date: String,
    pub sort_key: i64,
}

/// The transactions submitted for a token send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSendTransaction {
    InitApprove,
    Approve,
    Relay,
}

impl TokenSendTransaction {
    pub fn attr_name(&self) -> &'static str {
        match self {
            TokenSendTransaction::InitApprove => "InitApproveTransaction",
            TokenSendTransaction::Approve => "ApproveTransaction",
            TokenSendTransaction::Relay => "RelayTransaction",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenSendData {
    pub user_id: String,
    pub send_value: U256,
    pub init_approve_transaction: Option<String>,
    pub approve_transaction: Option<String>,
    pub relay_transaction: Option<String>,
    pub send_status: SettlementStatus,
    pub target_date: String,
    pub sort_key: i64,
    pub created_at: i64,
}

impl TokenSendData {
    pub fn key(&self) -> TokenSendKey {
        TokenSendKey {
            user_id: self.user_id.clone(),
            target_date: self.target_date.clone(),
            sort_key: self.sort_key,
        }
    }

    /// Whether this record counts against the daily limit.
    pub fn is_counted(&self) -> bool {
        matches!(
            self.send_status,
            SettlementStatus::Doing | SettlementStatus::Done
        )
    }
}

impl TryFrom<HashMap<String, AttributeValue>> for TokenSendData {
    type Error = ProviderError;

    fn try_from(data: HashMap<String, AttributeValue>) -> Result<Self, Self::Error> {
        Ok(TokenSendData {
            user_id: convert::attr_to_str(&data, "UserId")?,
            send_value: convert::attr_to_u256(&data, "SendValue")?,
            init_approve_transaction: convert::attr_to_opt_str(&data, "InitApproveTransaction")?,
            approve_transaction: convert::attr_to_opt_str(&data, "ApproveTransaction")?,
            relay_transaction: convert::attr_to_opt_str(&data, "RelayTransaction")?,
            send_status: convert::attr_to_str(&data, "SendStatus")?.parse()?,
            target_date: convert::attr_to_str(&data, "TargetDate")?,
            sort_key: convert::attr_to_i64(&data, "SortKey")?,
            created_at: convert::attr_to_i64(&data, "CreatedAt")?,
        })
    }
}

impl From<&TokenSendData> for HashMap<String, AttributeValue> {
    fn from(data: &TokenSendData) -> Self {
        let mut map = HashMap::new();
        map.insert("UserId".to_string(), AttributeValue::S(data.user_id.clone()));
        map.insert(
            "SendValue".to_string(),
            AttributeValue::N(data.send_value.to_string()),
        );
        map.insert(
            "InitApproveTransaction".to_string(),
            convert::opt_str_to_attr(&data.init_approve_transaction),
        );
        map.insert(
            "ApproveTransaction".to_string(),
            convert::opt_str_to_attr(&data.approve_transaction),
        );
        map.insert(
            "RelayTransaction".to_string(),
            convert::opt_str_to_attr(&data.relay_transaction),
        );
        map.insert(
            "SendStatus".to_string(),
            AttributeValue::S(data.send_status.to_string()),
        );
        map.insert(
            "TargetDate".to_string(),
            AttributeValue::S(data.target_date.clone()),
        );
        map.insert(
            "SortKey".to_string(),
            AttributeValue::N(data.sort_key.to_string()),
        );
        map.insert(
            "CreatedAt".to_string(),
            AttributeValue::N(data.created_at.to_string()),
        );
        map
    }
}
