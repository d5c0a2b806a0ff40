//! Notification module.
//!
pub mod types;
pub use types::*;

mod dynamo_provider;
pub use dynamo_provider::DynamoDbNotificationProvider;

use async_trait::async_trait;
#[cfg(any(test, feature = "mock"))]
use mockall::automock;

#[cfg(any(test, feature = "mock"))]
use crate::MockedClient;
use crate::ProviderError;

#[cfg_attr(any(test, feature = "mock"), automock(type Client=MockedClient;))]
#[async_trait]
pub trait AlisNotificationProvider {
    type Client;

    /// Writes the notification. Writing the same `notification_id` twice
    /// overwrites the first item.
    async fn put_notification(
        &self,
        client: &Self::Client,
        notification: &NotificationData,
    ) -> Result<(), ProviderError>;

    async fn set_unread(&self, client: &Self::Client, user_id: &str) -> Result<(), ProviderError>;
}
