//! This crate contains all the common types to work with the DynamoDB
//! ledger of the ALIS settlement lambdas.
//!
pub mod providers;
pub mod status;
pub use status::SettlementStatus;

pub(crate) mod convert;

use aws_config::meta::region::RegionProviderChain;
use aws_config::BehaviorVersion;
pub use aws_sdk_dynamodb::Client;
use std::fmt;

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum EntityType {
    Purchase,
    PurchaseLock,
    Tip,
    TokenSend,
    Notification,
    UnreadNotification,
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityType::Purchase => write!(f, "Purchase"),
            EntityType::PurchaseLock => write!(f, "PurchaseLock"),
            EntityType::Tip => write!(f, "Tip"),
            EntityType::TokenSend => write!(f, "TokenSend"),
            EntityType::Notification => write!(f, "Notification"),
            EntityType::UnreadNotification => write!(f, "UnreadNotification"),
        }
    }
}

/// Generic errors for providers.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Missing data error: {0}")]
    MissingDataError(String),
    #[error("Data value error: {0}")]
    DataValueError(String),
    #[error("Conditional check failed: {0}")]
    ConditionalCheckFailed(String),
}

/// Returns a newly initialized DynamoClient.
pub async fn init_aws_dynamo_client() -> Client {
    let region_provider = RegionProviderChain::default_provider().or_else("ap-northeast-1");
    let config = aws_config::defaults(BehaviorVersion::latest())
        .region(region_provider)
        .load()
        .await;
    Client::new(&config)
}

/// A default provider type, mostly used for mocking.
#[cfg(any(test, feature = "mock"))]
#[derive(Debug, Default)]
pub struct MockedClient;
