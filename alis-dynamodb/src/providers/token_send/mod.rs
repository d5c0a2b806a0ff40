//! Token send module.
//!
//! Records of tokens sent from the private chain to the public chain
//! through the bridge contract.
pub mod types;
pub use types::*;

mod dynamo_provider;
pub use dynamo_provider::DynamoDbTokenSendProvider;

use async_trait::async_trait;
#[cfg(any(test, feature = "mock"))]
use mockall::automock;

#[cfg(any(test, feature = "mock"))]
use crate::MockedClient;
use crate::{ProviderError, SettlementStatus};

#[cfg_attr(any(test, feature = "mock"), automock(type Client=MockedClient;))]
#[async_trait]
pub trait AlisTokenSendProvider {
    type Client;

    async fn create_token_send(
        &self,
        client: &Self::Client,
        token_send: &TokenSendData,
    ) -> Result<(), ProviderError>;

    async fn update_transaction(
        &self,
        client: &Self::Client,
        key: &TokenSendKey,
        kind: TokenSendTransaction,
        transaction: &str,
    ) -> Result<(), ProviderError>;

    async fn update_status(
        &self,
        client: &Self::Client,
        key: &TokenSendKey,
        status: SettlementStatus,
    ) -> Result<(), ProviderError>;

    /// Returns every record of the user for the given date, following pagination.
    async fn get_token_sends_by_date(
        &self,
        client: &Self::Client,
        user_id: &str,
        target_date: &str,
    ) -> Result<Vec<TokenSendData>, ProviderError>;
}
