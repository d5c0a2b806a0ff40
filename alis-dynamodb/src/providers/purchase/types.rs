use alloy_primitives::U256;
use aws_sdk_dynamodb::types::AttributeValue;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{convert, ProviderError, SettlementStatus};

/// Identifies a purchase record and its lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseKey {
    pub article_id: String,
    pub buyer_user_id: String,
    pub sort_key: i64,
}

/// A purchase attempt of an article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseData {
    pub article_id: String,
    pub buyer_user_id: String,
    pub seller_user_id: String,
    pub article_title: String,
    pub price: U256,
    pub status: SettlementStatus,
    pub transaction: Option<String>,
    pub burn_transaction: Option<String>,
    pub history_created_at: i64,
    pub sort_key: i64,
    pub created_at: i64,
}

impl PurchaseData {
    pub fn key(&self) -> PurchaseKey {
        PurchaseKey {
            article_id: self.article_id.clone(),
            buyer_user_id: self.buyer_user_id.clone(),
            sort_key: self.sort_key,
        }
    }
}

impl TryFrom<HashMap<String, AttributeValue>> for PurchaseData {
    type Error = ProviderError;

    fn try_from(data: HashMap<String, AttributeValue>) -> Result<Self, Self::Error> {
        Ok(PurchaseData {
            article_id: convert::attr_to_str(&data, "ArticleId")?,
            buyer_user_id: convert::attr_to_str(&data, "BuyerUserId")?,
            seller_user_id: convert::attr_to_str(&data, "SellerUserId")?,
            article_title: convert::attr_to_opt_str(&data, "ArticleTitle")?.unwrap_or_default(),
            price: convert::attr_to_u256(&data, "Price")?,
            status: convert::attr_to_str(&data, "Status")?.parse()?,
            transaction: convert::attr_to_opt_str(&data, "Transaction")?,
            burn_transaction: convert::attr_to_opt_str(&data, "BurnTransaction")?,
            history_created_at: convert::attr_to_i64(&data, "HistoryCreatedAt")?,
            sort_key: convert::attr_to_i64(&data, "SortKey")?,
            created_at: convert::attr_to_i64(&data, "CreatedAt")?,
        })
    }
}

impl From<&PurchaseData> for HashMap<String, AttributeValue> {
    fn from(data: &PurchaseData) -> Self {
        let mut map = HashMap::new();
        map.insert(
            "ArticleId".to_string(),
            AttributeValue::S(data.article_id.clone()),
        );
        map.insert(
            "BuyerUserId".to_string(),
            AttributeValue::S(data.buyer_user_id.clone()),
        );
        map.insert(
            "SellerUserId".to_string(),
            AttributeValue::S(data.seller_user_id.clone()),
        );
        map.insert(
            "ArticleTitle".to_string(),
            AttributeValue::S(data.article_title.clone()),
        );
        map.insert("Price".to_string(), AttributeValue::N(data.price.to_string()));
        map.insert(
            "Status".to_string(),
            AttributeValue::S(data.status.to_string()),
        );
        map.insert(
            "Transaction".to_string(),
            convert::opt_str_to_attr(&data.transaction),
        );
        map.insert(
            "BurnTransaction".to_string(),
            convert::opt_str_to_attr(&data.burn_transaction),
        );
        map.insert(
            "HistoryCreatedAt".to_string(),
            AttributeValue::N(data.history_created_at.to_string()),
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
