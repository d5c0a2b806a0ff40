use alloy_primitives::U256;
use aws_sdk_dynamodb::types::AttributeValue;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{convert, ProviderError};

pub const ARTICLE_STATUS_PUBLIC: &str = "public";

/// Data of an article, as needed by the settlement workflows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArticleInfo {
    pub article_id: String,
    pub user_id: String,
    pub title: String,
    pub status: String,
    pub price: Option<U256>,
}

impl ArticleInfo {
    pub fn is_public(&self) -> bool {
        self.status == ARTICLE_STATUS_PUBLIC
    }
}

/// A priced version of an article.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArticlePriceHistory {
    pub article_id: String,
    pub price: U256,
    pub created_at: i64,
}

impl TryFrom<HashMap<String, AttributeValue>> for ArticleInfo {
    type Error = ProviderError;

    fn try_from(data: HashMap<String, AttributeValue>) -> Result<Self, Self::Error> {
        Ok(ArticleInfo {
            article_id: convert::attr_to_str(&data, "ArticleId")?,
            user_id: convert::attr_to_str(&data, "UserId")?,
            title: convert::attr_to_opt_str(&data, "Title")?.unwrap_or_default(),
            status: convert::attr_to_str(&data, "Status")?,
            price: convert::attr_to_opt_u256(&data, "Price")?,
        })
    }
}

impl ArticlePriceHistory {
    /// Returns `None` for history entries saved without a price.
    pub fn from_map(data: &HashMap<String, AttributeValue>) -> Result<Option<Self>, ProviderError> {
        let price = match convert::attr_to_opt_u256(data, "Price")? {
            Some(p) => p,
            None => return Ok(None),
        };

        Ok(Some(ArticlePriceHistory {
            article_id: convert::attr_to_str(data, "ArticleId")?,
            price,
            created_at: convert::attr_to_i64(data, "CreatedAt")?,
        }))
    }
}
