use alloy_primitives::U256;
use aws_sdk_dynamodb::types::AttributeValue;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{convert, ProviderError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TipKey {
    pub from_user_id: String,
    pub sort_key: i64,
}

/// A tip attempt from a reader to an article author.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TipData {
    pub from_user_id: String,
    pub to_user_id: String,
    pub article_id: String,
    pub article_title: String,
    pub tip_value: U256,
    pub transaction: Option<String>,
    pub burn_transaction: Option<String>,
    pub uncompleted: bool,
    /// Calendar date (YYYY-MM-DD) used for aggregate reporting.
    pub target_date: String,
    pub sort_key: i64,
    pub created_at: i64,
}

impl TipData {
    pub fn key(&self) -> TipKey {
        TipKey {
            from_user_id: self.from_user_id.clone(),
            sort_key: self.sort_key,
        }
    }
}

impl TryFrom<HashMap<String, AttributeValue>> for TipData {
    type Error = ProviderError;

    fn try_from(data: HashMap<String, AttributeValue>) -> Result<Self, Self::Error> {
        let uncompleted = match data.get("Uncompleted") {
            Some(_) => convert::attr_to_i64(&data, "Uncompleted")? == 1,
            None => false,
        };

        Ok(TipData {
            from_user_id: convert::attr_to_str(&data, "FromUserId")?,
            to_user_id: convert::attr_to_str(&data, "ToUserId")?,
            article_id: convert::attr_to_str(&data, "ArticleId")?,
            article_title: convert::attr_to_opt_str(&data, "ArticleTitle")?.unwrap_or_default(),
            tip_value: convert::attr_to_u256(&data, "TipValue")?,
            transaction: convert::attr_to_opt_str(&data, "Transaction")?,
            burn_transaction: convert::attr_to_opt_str(&data, "BurnTransaction")?,
            uncompleted,
            target_date: convert::attr_to_str(&data, "TargetDate")?,
            sort_key: convert::attr_to_i64(&data, "SortKey")?,
            created_at: convert::attr_to_i64(&data, "CreatedAt")?,
        })
    }
}

impl From<&TipData> for HashMap<String, AttributeValue> {
    fn from(data: &TipData) -> Self {
        let mut map = HashMap::new();
        map.insert(
            "FromUserId".to_string(),
            AttributeValue::S(data.from_user_id.clone()),
        );
        map.insert(
            "ToUserId".to_string(),
            AttributeValue::S(data.to_user_id.clone()),
        );
        map.insert(
            "ArticleId".to_string(),
            AttributeValue::S(data.article_id.clone()),
        );
        map.insert(
            "ArticleTitle".to_string(),
            AttributeValue::S(data.article_title.clone()),
        );
        map.insert(
            "TipValue".to_string(),
            AttributeValue::N(data.tip_value.to_string()),
        );
        map.insert(
            "Transaction".to_string(),
            convert::opt_str_to_attr(&data.transaction),
        );
        map.insert(
            "BurnTransaction".to_string(),
            convert::opt_str_to_attr(&data.burn_transaction),
        );
        if data.uncompleted {
            map.insert("Uncompleted".to_string(), AttributeValue::N("1".to_string()));
        }
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
