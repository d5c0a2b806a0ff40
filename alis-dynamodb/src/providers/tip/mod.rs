//! Tip module.
//!
pub mod types;
pub use types::*;

mod dynamo_provider;
pub use dynamo_provider::DynamoDbTipProvider;

use async_trait::async_trait;
#[cfg(any(test, feature = "mock"))]
use mockall::automock;

#[cfg(any(test, feature = "mock"))]
use crate::MockedClient;
use crate::ProviderError;

#[cfg_attr(any(test, feature = "mock"), automock(type Client=MockedClient;))]
#[async_trait]
pub trait AlisTipProvider {
    type Client;

    async fn create_tip(&self, client: &Self::Client, tip: &TipData) -> Result<(), ProviderError>;

    async fn update_transaction(
        &self,
        client: &Self::Client,
        key: &TipKey,
        transaction: &str,
    ) -> Result<(), ProviderError>;

    async fn update_burn_transaction(
        &self,
        client: &Self::Client,
        key: &TipKey,
        burn_transaction: &str,
    ) -> Result<(), ProviderError>;

    /// Removes the `uncompleted` marker once the outcome is known.
    async fn complete_tip(&self, client: &Self::Client, key: &TipKey)
        -> Result<(), ProviderError>;
}
