use alloy_primitives::U256;
use aws_sdk_dynamodb::types::AttributeValue;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationType {
    /// Sent to the author when an article has been bought.
    ArticlePurchased,
    /// Sent to the buyer when the purchase is done.
    Purchase,
    /// Sent to the buyer when the purchase failed.
    PurchaseError,
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotificationType::ArticlePurchased => write!(f, "purchased"),
            NotificationType::Purchase => write!(f, "purchase"),
            NotificationType::PurchaseError => write!(f, "purchase_error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationData {
    pub notification_id: String,
    pub user_id: String,
    pub acted_user_id: String,
    pub article_id: String,
    pub article_title: String,
    pub notification_type: NotificationType,
    pub price: Option<U256>,
    pub sort_key: i64,
    pub created_at: i64,
}

impl NotificationData {
    /// Deterministic id, so a retried write lands on the same item.
    pub fn build_id(
        notification_type: NotificationType,
        user_id: &str,
        acted_user_id: &str,
        article_id: &str,
        event_sort_key: i64,
    ) -> String {
        format!(
            "{}-{}-{}-{}-{}",
            notification_type, user_id, acted_user_id, article_id, event_sort_key
        )
    }
}

impl From<&NotificationData> for HashMap<String, AttributeValue> {
    fn from(data: &NotificationData) -> Self {
        let mut map = HashMap::new();
        map.insert(
            "NotificationId".to_string(),
            AttributeValue::S(data.notification_id.clone()),
        );
        map.insert("UserId".to_string(), AttributeValue::S(data.user_id.clone()));
        map.insert(
            "ActedUserId".to_string(),
            AttributeValue::S(data.acted_user_id.clone()),
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
            "Type".to_string(),
            AttributeValue::S(data.notification_type.to_string()),
        );
        if let Some(price) = data.price {
            map.insert("Price".to_string(), AttributeValue::N(price.to_string()));
        }
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
