use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client as DynamoClient;

use super::{AlisTipProvider, TipData, TipKey};
use crate::{EntityType, ProviderError};

/// DynamoDB provider for tips.
pub struct DynamoDbTipProvider {
    table_name: String,
    key_prefix: String,
}

impl DynamoDbTipProvider {
    pub fn new(table_name: &str) -> Self {
        DynamoDbTipProvider {
            table_name: table_name.to_string(),
            key_prefix: "TIP".to_string(),
        }
    }

    fn get_pk(&self, from_user_id: &str) -> String {
        format!("{}#{}", self.key_prefix, from_user_id)
    }

    fn get_sk(&self, sort_key: i64) -> String {
        format!("{}#{:020}", self.key_prefix, sort_key)
    }

    async fn set_data_attr(
        &self,
        client: &DynamoClient,
        key: &TipKey,
        attr: &str,
        value: AttributeValue,
    ) -> Result<(), ProviderError> {
        client
            .update_item()
            .table_name(self.table_name.clone())
            .key("PK", AttributeValue::S(self.get_pk(&key.from_user_id)))
            .key("SK", AttributeValue::S(self.get_sk(key.sort_key)))
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
impl AlisTipProvider for DynamoDbTipProvider {
    type Client = DynamoClient;

    async fn create_tip(&self, client: &Self::Client, tip: &TipData) -> Result<(), ProviderError> {
        client
            .put_item()
            .table_name(self.table_name.clone())
            .item("PK", AttributeValue::S(self.get_pk(&tip.from_user_id)))
            .item("SK", AttributeValue::S(self.get_sk(tip.sort_key)))
            .item("Type", AttributeValue::S(EntityType::Tip.to_string()))
            .item(
                "GSI1PK",
                AttributeValue::S(format!("TIP_DATE#{}", tip.target_date)),
            )
            .item(
                "GSI1SK",
                AttributeValue::S(format!("{}#{}", tip.from_user_id, tip.sort_key)),
            )
            .item("Data", AttributeValue::M(tip.into()))
            .condition_expression("attribute_not_exists(PK)")
            .send()
            .await
            .map_err(|e| ProviderError::DatabaseError(e.to_string()))?;

        Ok(())
    }

    async fn update_transaction(
        &self,
        client: &Self::Client,
        key: &TipKey,
        transaction: &str,
    ) -> Result<(), ProviderError> {
        self.set_data_attr(
            client,
            key,
            "Transaction",
            AttributeValue::S(transaction.to_string()),
        )
        .await
    }

    async fn update_burn_transaction(
        &self,
        client: &Self::Client,
        key: &TipKey,
        burn_transaction: &str,
    ) -> Result<(), ProviderError> {
        self.set_data_attr(
            client,
            key,
            "BurnTransaction",
            AttributeValue::S(burn_transaction.to_string()),
        )
        .await
    }

    async fn complete_tip(
        &self,
        client: &Self::Client,
        key: &TipKey,
    ) -> Result<(), ProviderError> {
        client
            .update_item()
            .table_name(self.table_name.clone())
            .key("PK", AttributeValue::S(self.get_pk(&key.from_user_id)))
            .key("SK", AttributeValue::S(self.get_sk(key.sort_key)))
            .update_expression("REMOVE #data.#uncompleted")
            .expression_attribute_names("#data", "Data")
            .expression_attribute_names("#uncompleted", "Uncompleted")
            .send()
            .await
            .map_err(|e| ProviderError::DatabaseError(e.to_string()))?;

        Ok(())
    }
}
