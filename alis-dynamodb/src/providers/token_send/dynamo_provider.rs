use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client as DynamoClient;
use std::collections::HashMap;
use tracing::debug;

use super::{AlisTokenSendProvider, TokenSendData, TokenSendKey, TokenSendTransaction};
use crate::{convert, EntityType, ProviderError, SettlementStatus};

/// DynamoDB provider for token sends.
pub struct DynamoDbTokenSendProvider {
    table_name: String,
    key_prefix: String,
}

impl DynamoDbTokenSendProvider {
    pub fn new(table_name: &str) -> Self {
        DynamoDbTokenSendProvider {
            table_name: table_name.to_string(),
            key_prefix: "TOKEN_SEND".to_string(),
        }
    }

    fn get_pk(&self, user_id: &str) -> String {
        format!("{}#{}", self.key_prefix, user_id)
    }

    fn get_sk_prefix(&self, target_date: &str) -> String {
        format!("{}#{}#", self.key_prefix, target_date)
    }

    fn get_sk(&self, target_date: &str, sort_key: i64) -> String {
        format!("{}{:020}", self.get_sk_prefix(target_date), sort_key)
    }

    async fn set_data_attr(
        &self,
        client: &DynamoClient,
        key: &TokenSendKey,
        attr: &str,
        value: AttributeValue,
    ) -> Result<(), ProviderError> {
        client
            .update_item()
            .table_name(self.table_name.clone())
            .key("PK", AttributeValue::S(self.get_pk(&key.user_id)))
            .key(
                "SK",
                AttributeValue::S(self.get_sk(&key.target_date, key.sort_key)),
            )
            .update_expression("SET #data.#attr = :value")
            .expression_attribute_names("#data", "Data")
            .expression_attribute_names("#attr", attr)
            .expression_attribute_values(":value", value)
            .send()
            .await
            .map_err(|e| ProviderError::DatabaseError(e.to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl AlisTokenSendProvider for DynamoDbTokenSendProvider {
    type Client = DynamoClient;

    async fn create_token_send(
        &self,
        client: &Self::Client,
        token_send: &TokenSendData,
    ) -> Result<(), ProviderError> {
        client
            .put_item()
            .table_name(self.table_name.clone())
            .item("PK", AttributeValue::S(self.get_pk(&token_send.user_id)))
            .item(
                "SK",
                AttributeValue::S(self.get_sk(&token_send.target_date, token_send.sort_key)),
            )
            .item("Type", AttributeValue::S(EntityType::TokenSend.to_string()))
            .item("Data", AttributeValue::M(token_send.into()))
            .condition_expression("attribute_not_exists(PK)")
            .send()
            .await
            .map_err(|e| ProviderError::DatabaseError(e.to_string()))?;

        Ok(())
    }

    async fn update_transaction(
        &self,
        client: &Self::Client,
        key: &TokenSendKey,
        kind: TokenSendTransaction,
        transaction: &str,
    ) -> Result<(), ProviderError> {
        self.set_data_attr(
            client,
            key,
            kind.attr_name(),
            AttributeValue::S(transaction.to_string()),
        )
        .await
    }

    async fn update_status(
        &self,
        client: &Self::Client,
        key: &TokenSendKey,
        status: SettlementStatus,
    ) -> Result<(), ProviderError> {
        self.set_data_attr(
            client,
            key,
            "SendStatus",
            AttributeValue::S(status.to_string()),
        )
        .await
    }

    async fn get_token_sends_by_date(
        &self,
        client: &Self::Client,
        user_id: &str,
        target_date: &str,
    ) -> Result<Vec<TokenSendData>, ProviderError> {
        let mut values = HashMap::new();
        values.insert(":user".to_string(), AttributeValue::S(self.get_pk(user_id)));
        values.insert(
            ":date".to_string(),
            AttributeValue::S(self.get_sk_prefix(target_date)),
        );

        let mut res = vec![];
        let mut exclusive_start_key = None;

        loop {
            let req = client
                .query()
                .table_name(&self.table_name)
                .set_key_condition_expression(Some(
                    "PK = :user AND begins_with(SK, :date)".to_string(),
                ))
                .set_expression_attribute_values(Some(values.clone()))
                .set_exclusive_start_key(exclusive_start_key)
                .consistent_read(true)
                .send()
                .await
                .map_err(|e| ProviderError::DatabaseError(format!("{:?}", e)))?;

            if let Some(items) = &req.items {
                for i in items {
                    let data = convert::attr_to_map(i, "Data")?;
                    res.push(data.try_into()?);
                }
            }

            match req.last_evaluated_key {
                Some(lek) => exclusive_start_key = Some(lek),
                None => break,
            }
        }

        debug!(
            "{} token sends found for {} on {}",
            res.len(),
            user_id,
            target_date
        );

        Ok(res)
    }
}
