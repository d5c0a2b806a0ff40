use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client as DynamoClient;
use std::collections::HashMap;

use super::{AlisArticleProvider, ArticleInfo, ArticlePriceHistory};
use crate::{convert, ProviderError};

/// DynamoDB provider for articles.
pub struct DynamoDbArticleProvider {
    table_name: String,
    key_prefix: String,
}

impl DynamoDbArticleProvider {
    pub fn new(table_name: &str) -> Self {
        DynamoDbArticleProvider {
            table_name: table_name.to_string(),
            key_prefix: "ARTICLE".to_string(),
        }
    }

    fn get_pk(&self, article_id: &str) -> String {
        format!("{}#{}", self.key_prefix, article_id)
    }
}

#[async_trait]
impl AlisArticleProvider for DynamoDbArticleProvider {
    type Client = DynamoClient;

    async fn get_article_info(
        &self,
        client: &Self::Client,
        article_id: &str,
    ) -> Result<Option<ArticleInfo>, ProviderError> {
        let mut key = HashMap::new();
        key.insert("PK".to_string(), AttributeValue::S(self.get_pk(article_id)));
        key.insert("SK".to_string(), AttributeValue::S("INFO".to_string()));

        let req = client
            .get_item()
            .table_name(&self.table_name)
            .set_key(Some(key))
            .send()
            .await
            .map_err(|e| ProviderError::DatabaseError(format!("{:?}", e)))?;

        if let Some(item) = &req.item {
            let data = convert::attr_to_map(item, "Data")?;
            Ok(Some(data.try_into()?))
        } else {
            Ok(None)
        }
    }

    async fn get_latest_price_history(
        &self,
        client: &Self::Client,
        article_id: &str,
    ) -> Result<Option<ArticlePriceHistory>, ProviderError> {
        let mut values = HashMap::new();
        values.insert(
            ":article".to_string(),
            AttributeValue::S(self.get_pk(article_id)),
        );
        values.insert(
            ":history".to_string(),
            AttributeValue::S("HISTORY#".to_string()),
        );

        let mut exclusive_start_key = None;

        loop {
            let req = client
                .query()
                .table_name(&self.table_name)
                .set_key_condition_expression(Some(
                    "PK = :article AND begins_with(SK, :history)".to_string(),
                ))
                .set_expression_attribute_values(Some(values.clone()))
                .scan_index_forward(false)
                .set_exclusive_start_key(exclusive_start_key)
                .send()
                .await
                .map_err(|e| ProviderError::DatabaseError(format!("{:?}", e)))?;

            if let Some(items) = &req.items {
                for i in items {
                    let data = convert::attr_to_map(i, "Data")?;
                    if let Some(history) = ArticlePriceHistory::from_map(&data)? {
                        return Ok(Some(history));
                    }
                }
            }

            match req.last_evaluated_key {
                Some(lek) => exclusive_start_key = Some(lek),
                None => return Ok(None),
            }
        }
    }
}
