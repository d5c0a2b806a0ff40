use async_trait::async_trait;
use aws_sdk_dynamodb::operation::transact_write_items::TransactWriteItemsError;
use aws_sdk_dynamodb::types::{AttributeValue, Put, TransactWriteItem, Update};
use aws_sdk_dynamodb::Client as DynamoClient;
use std::collections::HashMap;
use tracing::debug;

use super::{AlisPurchaseProvider, PurchaseData, PurchaseKey};
use crate::{EntityType, ProviderError, SettlementStatus};

/// DynamoDB provider for purchases.
pub struct DynamoDbPurchaseProvider {
    table_name: String,
    key_prefix: String,
}

impl DynamoDbPurchaseProvider {
    pub fn new(table_name: &str) -> Self {
        DynamoDbPurchaseProvider {
            table_name: table_name.to_string(),
            key_prefix: "PURCHASE".to_string(),
        }
    }

    fn get_pk(&self, article_id: &str) -> String {
        format!("{}#{}", self.key_prefix, article_id)
    }

    fn get_sk(&self, sort_key: i64) -> String {
        format!("{}#{:020}", self.key_prefix, sort_key)
    }

    fn get_lock_sk(&self, buyer_user_id: &str) -> String {
        format!("LOCK#{}", buyer_user_id)
    }

    fn update_data_attr(
        &self,
        pk: String,
        sk: String,
        attr: &str,
        value: AttributeValue,
    ) -> Result<TransactWriteItem, ProviderError> {
        let update = Update::builder()
            .table_name(self.table_name.clone())
            .key("PK", AttributeValue::S(pk))
            .key("SK", AttributeValue::S(sk))
            .update_expression("SET #data.#attr = :value")
            .expression_attribute_names("#data", "Data")
            .expression_attribute_names("#attr", attr)
            .expression_attribute_values(":value", value)
            .build()
            .map_err(|e| ProviderError::DatabaseError(e.to_string()))?;

        Ok(TransactWriteItem::builder().update(update).build())
    }

    async fn update_record_attr(
        &self,
        client: &DynamoClient,
        key: &PurchaseKey,
        attr: &str,
        value: AttributeValue,
    ) -> Result<(), ProviderError> {
        client
            .update_item()
            .table_name(self.table_name.clone())
            .key("PK", AttributeValue::S(self.get_pk(&key.article_id)))
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
impl AlisPurchaseProvider for DynamoDbPurchaseProvider {
    type Client = DynamoClient;

    async fn create_purchase(
        &self,
        client: &Self::Client,
        purchase: &PurchaseData,
    ) -> Result<(), ProviderError> {
        let pk = self.get_pk(&purchase.article_id);

        let mut lock_data = HashMap::new();
        lock_data.insert(
            "ArticleId".to_string(),
            AttributeValue::S(purchase.article_id.clone()),
        );
        lock_data.insert(
            "BuyerUserId".to_string(),
            AttributeValue::S(purchase.buyer_user_id.clone()),
        );
        lock_data.insert(
            "Status".to_string(),
            AttributeValue::S(SettlementStatus::Doing.to_string()),
        );
        lock_data.insert(
            "SortKey".to_string(),
            AttributeValue::N(purchase.sort_key.to_string()),
        );

        let lock = Put::builder()
            .table_name(self.table_name.clone())
            .item("PK", AttributeValue::S(pk.clone()))
            .item("SK", AttributeValue::S(self.get_lock_sk(&purchase.buyer_user_id)))
            .item("Type", AttributeValue::S(EntityType::PurchaseLock.to_string()))
            .item("Data", AttributeValue::M(lock_data))
            .condition_expression("attribute_not_exists(PK) OR #data.#status = :fail")
            .expression_attribute_names("#data", "Data")
            .expression_attribute_names("#status", "Status")
            .expression_attribute_values(
                ":fail",
                AttributeValue::S(SettlementStatus::Fail.to_string()),
            )
            .build()
            .map_err(|e| ProviderError::DatabaseError(e.to_string()))?;

        let record = Put::builder()
            .table_name(self.table_name.clone())
            .item("PK", AttributeValue::S(pk))
            .item("SK", AttributeValue::S(self.get_sk(purchase.sort_key)))
            .item("Type", AttributeValue::S(EntityType::Purchase.to_string()))
            .item(
                "GSI1PK",
                AttributeValue::S(format!("USER#{}", purchase.buyer_user_id)),
            )
            .item(
                "GSI1SK",
                AttributeValue::S(format!(
                    "{}#{}",
                    self.get_pk(&purchase.article_id),
                    purchase.sort_key
                )),
            )
            .item("Data", AttributeValue::M(purchase.into()))
            .build()
            .map_err(|e| ProviderError::DatabaseError(e.to_string()))?;

        let output = client
            .transact_write_items()
            .transact_items(TransactWriteItem::builder().put(lock).build())
            .transact_items(TransactWriteItem::builder().put(record).build())
            .send()
            .await;

        match output {
            Ok(_) => {
                debug!(
                    "Purchase created for article {} by {}",
                    purchase.article_id, purchase.buyer_user_id
                );
                Ok(())
            }
            Err(e) => {
                let service_error = e.into_service_error();
                if let TransactWriteItemsError::TransactionCanceledException(ex) = &service_error
                {
                    if ex
                        .cancellation_reasons()
                        .iter()
                        .any(|r| r.code() == Some("ConditionalCheckFailed"))
                    {
                        return Err(ProviderError::ConditionalCheckFailed(format!(
                            "Purchase lock exists for article {} and user {}",
                            purchase.article_id, purchase.buyer_user_id
                        )));
                    }
                }

                Err(ProviderError::DatabaseError(service_error.to_string()))
            }
        }
    }

    async fn update_transaction(
        &self,
        client: &Self::Client,
        key: &PurchaseKey,
        transaction: &str,
    ) -> Result<(), ProviderError> {
        self.update_record_attr(
            client,
            key,
            "Transaction",
            AttributeValue::S(transaction.to_string()),
        )
        .await
    }

    async fn update_status(
        &self,
        client: &Self::Client,
        key: &PurchaseKey,
        status: SettlementStatus,
    ) -> Result<(), ProviderError> {
        let record = self.update_data_attr(
            self.get_pk(&key.article_id),
            self.get_sk(key.sort_key),
            "Status",
            AttributeValue::S(status.to_string()),
        )?;
        let lock = self.update_data_attr(
            self.get_pk(&key.article_id),
            self.get_lock_sk(&key.buyer_user_id),
            "Status",
            AttributeValue::S(status.to_string()),
        )?;

        client
            .transact_write_items()
            .transact_items(record)
            .transact_items(lock)
            .send()
            .await
            .map_err(|e| ProviderError::DatabaseError(e.into_service_error().to_string()))?;

        Ok(())
    }

    async fn update_burn_transaction(
        &self,
        client: &Self::Client,
        key: &PurchaseKey,
        burn_transaction: &str,
    ) -> Result<(), ProviderError> {
        self.update_record_attr(
            client,
            key,
            "BurnTransaction",
            AttributeValue::S(burn_transaction.to_string()),
        )
        .await
    }
}
