//! Article module.
//!
//! Articles are owned by the article lambdas, settlement only reads them.
pub mod types;
pub use types::*;

mod dynamo_provider;
pub use dynamo_provider::DynamoDbArticleProvider;

use async_trait::async_trait;
#[cfg(any(test, feature = "mock"))]
use mockall::automock;

#[cfg(any(test, feature = "mock"))]
use crate::MockedClient;
use crate::ProviderError;

/// Read access to articles and their price history.
#[cfg_attr(any(test, feature = "mock"), automock(type Client=MockedClient;))]
#[async_trait]
pub trait AlisArticleProvider {
    type Client;

    async fn get_article_info(
        &self,
        client: &Self::Client,
        article_id: &str,
    ) -> Result<Option<ArticleInfo>, ProviderError>;

    /// Returns the most recent history entry which carries a price.
    async fn get_latest_price_history(
        &self,
        client: &Self::Client,
        article_id: &str,
    ) -> Result<Option<ArticlePriceHistory>, ProviderError>;
}
