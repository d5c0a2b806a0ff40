//! Purchase module.
//!
//! A purchase attempt is stored as a record plus a lock item keyed by
//! (article, buyer). The lock mirrors the record status so that a new
//! attempt is only allowed when every previous attempt failed.
pub mod types;
pub use types::*;

mod dynamo_provider;
pub use dynamo_provider::DynamoDbPurchaseProvider;

use async_trait::async_trait;
#[cfg(any(test, feature = "mock"))]
use mockall::automock;

#[cfg(any(test, feature = "mock"))]
use crate::MockedClient;
use crate::{ProviderError, SettlementStatus};

#[cfg_attr(any(test, feature = "mock"), automock(type Client=MockedClient;))]
#[async_trait]
pub trait AlisPurchaseProvider {
    type Client;

    /// Creates the lock and the record atomically.
    /// Returns `ProviderError::ConditionalCheckFailed` when a `doing` or `done`
    /// lock already exists for the buyer and the article.
    async fn create_purchase(
        &self,
        client: &Self::Client,
        purchase: &PurchaseData,
    ) -> Result<(), ProviderError>;

    async fn update_transaction(
        &self,
        client: &Self::Client,
        key: &PurchaseKey,
        transaction: &str,
    ) -> Result<(), ProviderError>;

    /// Updates the status of both the record and the lock.
    async fn update_status(
        &self,
        client: &Self::Client,
        key: &PurchaseKey,
        status: SettlementStatus,
    ) -> Result<(), ProviderError>;

    async fn update_burn_transaction(
        &self,
        client: &Self::Client,
        key: &PurchaseKey,
        burn_transaction: &str,
    ) -> Result<(), ProviderError>;
}
