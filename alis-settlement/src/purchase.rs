//! Article purchase.
//!
//! The buyer pays the seller with a transfer signed by the gateway managed
//! key of the buyer, 90% of the price goes to the seller and the remaining
//! 10% is burnt once the transfer is mined.
use alis_dynamodb::providers::purchase::{PurchaseData, PurchaseKey};
use alis_dynamodb::providers::{AlisArticleProvider, AlisNotificationProvider, AlisPurchaseProvider};
use alis_dynamodb::{ProviderError, SettlementStatus};
use alis_private_chain::format::increment_transaction_count;
use alis_private_chain::{GatewayTransport, PollSettings, PrivateChainClient, ReceiptOutcome};
use alloy_primitives::U256;
use tracing::{error, info, warn};

use crate::limits::{burn_value, now, seller_value, sort_key};
use crate::notification::notify_purchase_result;
use crate::{CallerClaims, IdentityProvider, Limits, SettlementError, BURN_ADDRESS};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseRequest {
    pub article_id: String,
    pub price: U256,
}

pub struct PurchaseWorkflow<A, P, N, T, I> {
    pub articles: A,
    pub purchases: P,
    pub notifications: N,
    pub chain: PrivateChainClient<T>,
    pub identity: I,
    pub limits: Limits,
    pub poll: PollSettings,
}

/// Maps the receipt of the purchase transfer to the purchase status.
/// Only a rejected transfer is a failure, anything uncertain stays `doing`.
fn purchase_status(outcome: &ReceiptOutcome) -> SettlementStatus {
    match outcome {
        ReceiptOutcome::Confirmed => SettlementStatus::Done,
        ReceiptOutcome::Rejected(_) => SettlementStatus::Fail,
        ReceiptOutcome::Pending
        | ReceiptOutcome::Malformed(_)
        | ReceiptOutcome::TransportFailure(_) => SettlementStatus::Doing,
    }
}

impl<A, P, N, T, I> PurchaseWorkflow<A, P, N, T, I>
where
    T: GatewayTransport + Sync,
    I: IdentityProvider + Sync,
{
    /// Purchases an article for the caller and returns the resulting status.
    pub async fn run<C>(
        &self,
        client: &C,
        caller: &CallerClaims,
        request: &PurchaseRequest,
    ) -> Result<SettlementStatus, SettlementError>
    where
        C: Sync,
        A: AlisArticleProvider<Client = C> + Sync,
        P: AlisPurchaseProvider<Client = C> + Sync,
        N: AlisNotificationProvider<Client = C> + Sync,
    {
        caller.ensure_verified()?;
        self.limits.price.check(request.price, "price")?;

        let article = match self.articles.get_article_info(client, &request.article_id).await? {
            Some(a) if a.is_public() => a,
            _ => {
                return Err(SettlementError::NotFound(format!(
                    "Article {} not found",
                    request.article_id
                )))
            }
        };

        if article.user_id == caller.user_id {
            return Err(SettlementError::Validation(
                "Can not purchase own article".to_string(),
            ));
        }

        let history = self
            .articles
            .get_latest_price_history(client, &request.article_id)
            .await?
            .ok_or_else(|| {
                SettlementError::NotFound(format!(
                    "Price history of article {} not found",
                    request.article_id
                ))
            })?;

        if history.price != request.price {
            return Err(SettlementError::Validation("price is invalid".to_string()));
        }

        let buyer_address = caller.require_private_eth_address()?;

        let time = now(&self.limits.timezone);
        let mut purchase = PurchaseData {
            article_id: article.article_id.clone(),
            buyer_user_id: caller.user_id.clone(),
            seller_user_id: article.user_id.clone(),
            article_title: article.title.clone(),
            price: request.price,
            status: SettlementStatus::Doing,
            transaction: None,
            burn_transaction: None,
            history_created_at: history.created_at,
            sort_key: sort_key(&time),
            created_at: time.timestamp(),
        };

        match self.purchases.create_purchase(client, &purchase).await {
            Ok(()) => (),
            Err(ProviderError::ConditionalCheckFailed(s)) => {
                info!("{}", s);
                return Err(SettlementError::AlreadyPurchased);
            }
            Err(e) => return Err(e.into()),
        }
        let key = purchase.key();

        let (transaction, nonce) = match self.submit_transfer(buyer_address, &purchase).await {
            Ok(r) => r,
            Err(e) => {
                error!(
                    "Purchase of {} by {} could not be submitted: {}",
                    purchase.article_id, purchase.buyer_user_id, e
                );
                self.purchases
                    .update_status(client, &key, SettlementStatus::Fail)
                    .await?;
                notify_purchase_result(
                    client,
                    &self.notifications,
                    &purchase,
                    SettlementStatus::Fail,
                    &now(&self.limits.timezone),
                )
                .await;
                return Ok(SettlementStatus::Fail);
            }
        };

        self.purchases
            .update_transaction(client, &key, &transaction)
            .await?;
        purchase.transaction = Some(transaction.clone());

        let outcome = self.chain.wait_for_receipt(&transaction, &self.poll).await;
        let status = purchase_status(&outcome);
        if status == SettlementStatus::Doing {
            warn!("Purchase transaction {} is unresolved: {:?}", transaction, outcome);
        }

        self.purchases.update_status(client, &key, status).await?;
        purchase.status = status;

        if status == SettlementStatus::Done {
            self.burn(client, buyer_address, &key, &purchase, &nonce).await;
        }

        notify_purchase_result(
            client,
            &self.notifications,
            &purchase,
            status,
            &now(&self.limits.timezone),
        )
        .await;

        info!(
            "Purchase of {} by {} resolved as {}",
            purchase.article_id, purchase.buyer_user_id, status
        );

        Ok(status)
    }

    /// Sends the seller share, returns the transaction hash and the nonce used.
    async fn submit_transfer(
        &self,
        buyer_address: &str,
        purchase: &PurchaseData,
    ) -> Result<(String, String), SettlementError> {
        let seller_address = self
            .identity
            .get_private_eth_address(&purchase.seller_user_id)
            .await?
            .ok_or_else(|| {
                SettlementError::NotFound(format!(
                    "private_eth_address of {} not found",
                    purchase.seller_user_id
                ))
            })?;

        let nonce = self.chain.get_transaction_count(buyer_address).await?;
        
        let transaction = self
            .chain
            .send_tip(
                buyer_address,
                &seller_address,
                seller_value(purchase.price),
                &nonce,
            )
            .await?;

        Ok((transaction, nonce))
    }

    /// Burns the remaining 10%. A failed burn never changes the purchase status.
    async fn burn<C>(
        &self,
        client: &C,
        buyer_address: &str,
        key: &PurchaseKey,
        purchase: &PurchaseData,
        nonce: &str,
    ) where
        C: Sync,
        P: AlisPurchaseProvider<Client = C> + Sync,
    {
        let burn_nonce = match increment_transaction_count(nonce) {
            Ok(n) => n,
            Err(e) => {
                warn!("Burn of purchase {:?} skipped: {}", key, e);
                return;
            }
        };

        let burn_transaction = match self
            .chain
            .send_tip(
                buyer_address,
                BURN_ADDRESS,
                burn_value(purchase.price),
                &burn_nonce,
            )
            .await
        {
            Ok(t) => t,
            Err(e) => {
                warn!("Burn of purchase {:?} failed: {}", key, e);
                return;
            }
        };

        if let Err(e) = self
            .purchases
            .update_burn_transaction(client, key, &burn_transaction)
            .await
        {
            warn!(
                "Burn transaction {} of purchase {:?} not recorded: {}",
                burn_transaction, key, e
            );
        }
    }
}
