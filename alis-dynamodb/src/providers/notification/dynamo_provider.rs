use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client as DynamoClient;
use std::collections::HashMap;

use super::{AlisNotificationProvider, NotificationData};
use crate::{EntityType, ProviderError};

/// DynamoDB provider for notifications and unread flags.
pub struct DynamoDbNotificationProvider {
    table_name: String,
    key_prefix: String,
}

impl DynamoDbNotificationProvider {
    pub fn new(table_name: &str) -> Self {
        DynamoDbNotificationProvider {
            table_name: table_name.to_string(),
            key_prefix: "NOTIFICATION".to_string(),
        }
    }

    fn get_pk(&self, user_id: &str) -> String {
        format!("{}#{}", self.key_prefix, user_id)
    }

    fn get_sk(&self, notification_id: &str) -> String {
        format!("{}#{}", self.key_prefix, notification_id)
    }
}

#[async_trait]
impl AlisNotificationProvider for DynamoDbNotificationProvider {
    type Client = DynamoClient;

    async fn put_notification(
        &self,
        client: &Self::Client,
        notification: &NotificationData,
    ) -> Result<(), ProviderError> {
        client
            .put_item()
            .table_name(self.table_name.clone())
            .item(
                "PK",
                AttributeValue::S(self.get_pk(&notification.user_id)),
            )
            .item(
                "SK",
                AttributeValue::S(self.get_sk(&notification.notification_id)),
            )
            .item("Type", AttributeValue::S(EntityType::Notification.to_string()))
            .item("Data", AttributeValue::M(notification.into()))
            .send()
            .await
            .map_err(|e| ProviderError::DatabaseError(e.to_string()))?;

        Ok(())
    }

    async fn set_unread(&self, client: &Self::Client, user_id: &str) -> Result<(), ProviderError> {
        let mut data = HashMap::new();
        data.insert("UserId".to_string(), AttributeValue::S(user_id.to_string()));
        data.insert("Unread".to_string(), AttributeValue::Bool(true));

        client
            .put_item()
            .table_name(self.table_name.clone())
            .item(
                "PK",
                AttributeValue::S(format!("UNREAD_NOTIFICATION#{}", user_id)),
            )
            .item("SK", AttributeValue::S("UNREAD_NOTIFICATION".to_string()))
            .item(
                "Type",
                AttributeValue::S(EntityType::UnreadNotification.to_string()),
            )
            .item("Data", AttributeValue::M(data))
            .send()
            .await
            .map_err(|e| ProviderError::DatabaseError(e.to_string()))?;

        Ok(())
    }
}
