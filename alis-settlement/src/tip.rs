//! Tip of an article author.
//!
//! The caller signs two token transfers: the tip itself to the author and a
//! burn of a tenth of the tip. Both are validated before anything is written,
//! then relayed in order. The burn is only relayed once the tip is mined.
use alis_dynamodb::providers::tip::TipData;
use alis_dynamodb::providers::{AlisArticleProvider, AlisTipProvider};
use alis_private_chain::format::increment_transaction_count;
use alis_private_chain::{
    GatewayTransport, PollSettings, PrivateChainClient, ReceiptOutcome, TargetContract,
    TransactionValidator,
};
use alloy_primitives::U256;
use serde::Serialize;
use tracing::{info, warn};

use crate::limits::{burn_value, now, sort_key, target_date};
use crate::{CallerClaims, IdentityProvider, Limits, SettlementError, BURN_ADDRESS};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TipRequest {
    pub article_id: String,
    pub tip_value: U256,
    pub tip_signed_transaction: String,
    pub burn_signed_transaction: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TipResult {
    pub transaction: String,
    pub burn_transaction: Option<String>,
}

pub struct TipWorkflow<A, P, T, I> {
    pub articles: A,
    pub tips: P,
    pub chain: PrivateChainClient<T>,
    pub validator: TransactionValidator,
    pub identity: I,
    pub limits: Limits,
    pub poll: PollSettings,
}

impl<A, P, T, I> TipWorkflow<A, P, T, I>
where
    T: GatewayTransport + Sync,
    I: IdentityProvider + Sync,
{
    pub async fn run<C>(
        &self,
        client: &C,
        caller: &CallerClaims,
        request: &TipRequest,
    ) -> Result<TipResult, SettlementError>
    where
        C: Sync,
        A: AlisArticleProvider<Client = C> + Sync,
        P: AlisTipProvider<Client = C> + Sync,
    {
        caller.ensure_verified()?;
        self.limits.tip.check(request.tip_value, "tip_value")?;

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
            return Err(SettlementError::Validation("Can not tip to myself".to_string()));
        }

        let from_address = caller.require_private_eth_address()?;
        let to_address = self
            .identity
            .get_private_eth_address(&article.user_id)
            .await?
            .ok_or_else(|| {
                SettlementError::NotFound(format!(
                    "private_eth_address of {} not found",
                    article.user_id
                ))
            })?;

        let burn = burn_value(request.tip_value);
        self.validate_transactions(from_address, &to_address, request, burn)
            .await?;

        let required = request.tip_value + burn;
        let balance = self.chain.get_balance(from_address).await?;
        if balance < required {
            return Err(SettlementError::Validation(format!(
                "Required at least {} but balance is {}",
                required, balance
            )));
        }

        let time = now(&self.limits.timezone);
        let tip = TipData {
            from_user_id: caller.user_id.clone(),
            to_user_id: article.user_id.clone(),
            article_id: article.article_id.clone(),
            article_title: article.title.clone(),
            tip_value: request.tip_value,
            transaction: None,
            burn_transaction: None,
            uncompleted: true,
            target_date: target_date(&time),
            sort_key: sort_key(&time),
            created_at: time.timestamp(),
        };
        self.tips.create_tip(client, &tip).await?;
        let key = tip.key();

        let transaction = self
            .chain
            .send_raw_transaction(&request.tip_signed_transaction)
            .await?;
        self.tips.update_transaction(client, &key, &transaction).await?;

        let burn_transaction = match self.chain.wait_for_receipt(&transaction, &self.poll).await {
            ReceiptOutcome::Confirmed => {
                match self
                    .chain
                    .send_raw_transaction(&request.burn_signed_transaction)
                    .await
                {
                    Ok(hash) => {
                        self.tips.update_burn_transaction(client, &key, &hash).await?;
                        Some(hash)
                    }
                    Err(e) => {
                        warn!("Burn of tip {} failed: {}", transaction, e);
                        None
                    }
                }
            }
            outcome => {
                warn!("Tip transaction {} is unresolved: {:?}", transaction, outcome);
                None
            }
        };

        self.tips.complete_tip(client, &key).await?;

        info!(
            "Tip of {} from {} to {}: {} / {:?}",
            request.tip_value, tip.from_user_id, tip.to_user_id, transaction, burn_transaction
        );

        Ok(TipResult {
            transaction,
            burn_transaction,
        })
    }

    /// Both transactions are signed by the caller with consecutive nonces,
    /// the tip goes to the author and the burn to the burn address.
    async fn validate_transactions(
        &self,
        from_address: &str,
        to_address: &str,
        request: &TipRequest,
        burn: U256,
    ) -> Result<(), SettlementError> {
        let nonce = self.chain.get_transaction_count(from_address).await?;
        let burn_nonce = increment_transaction_count(&nonce)?;

        let tip_data = self.validator.get_data_from_raw_transaction(
            &request.tip_signed_transaction,
            &nonce,
            TargetContract::Token,
        )?;
        self.validator
            .validate_raw_transaction_signature(&request.tip_signed_transaction, from_address)?;
        if self.validator.validate_erc20_transfer_data(&tip_data, to_address)? != request.tip_value
        {
            return Err(SettlementError::Validation("tip_value is invalid".to_string()));
        }

        let burn_data = self.validator.get_data_from_raw_transaction(
            &request.burn_signed_transaction,
            &burn_nonce,
            TargetContract::Token,
        )?;
        self.validator
            .validate_raw_transaction_signature(&request.burn_signed_transaction, from_address)?;
        if self.validator.validate_erc20_transfer_data(&burn_data, BURN_ADDRESS)? != burn {
            return Err(SettlementError::Validation("burn_value is invalid".to_string()));
        }

        Ok(())
    }
}
