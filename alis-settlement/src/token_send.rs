//! Token send from the private chain to the public chain through the bridge.
//!
//! The caller signs an approval of the bridge contract and a relay call,
//! plus an approval reset when a previous allowance is still pending.
//! Sends are capped per user and per day.
use alis_dynamodb::providers::token_send::{TokenSendData, TokenSendKey, TokenSendTransaction};
use alis_dynamodb::providers::AlisTokenSendProvider;
use alis_dynamodb::SettlementStatus;
use alis_private_chain::abi::{max_token_amount, one_token};
use alis_private_chain::format::{increment_transaction_count, parse_hex_u256};
use alis_private_chain::{
    GatewayTransport, PollSettings, PrivateChainClient, ReceiptOutcome, TargetContract,
    TransactionValidator,
};
use alloy_primitives::U256;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::limits::{ensure_within_daily_limit, now, sort_key, target_date, AmountRange};
use crate::{CallerClaims, IdentityProvider, Limits, SettlementError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSendRequest {
    pub send_value: U256,
    pub init_approve_signed_transaction: Option<String>,
    pub approve_signed_transaction: String,
    pub relay_signed_transaction: String,
    pub access_token: String,
    pub pin_code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenSendResult {
    pub is_completed: bool,
    pub status: SettlementStatus,
}

pub struct TokenSendWorkflow<P, T, I> {
    pub token_sends: P,
    pub chain: PrivateChainClient<T>,
    pub validator: TransactionValidator,
    pub identity: I,
    pub limits: Limits,
    pub poll: PollSettings,
}

/// Raw transactions to relay, in order.
struct SendPlan<'a> {
    init_approve: Option<&'a str>,
    approve: &'a str,
    relay: &'a str,
}

impl<P, T, I> TokenSendWorkflow<P, T, I>
where
    T: GatewayTransport + Sync,
    I: IdentityProvider + Sync,
{
    pub async fn run<C>(
        &self,
        client: &C,
        caller: &CallerClaims,
        request: &TokenSendRequest,
    ) -> Result<TokenSendResult, SettlementError>
    where
        C: Sync,
        P: AlisTokenSendProvider<Client = C> + Sync,
    {
        caller.ensure_verified()?;
        let address = caller.require_private_eth_address()?;

        self.identity
            .verify_pin(&request.access_token, &request.pin_code)
            .await?;

        AmountRange::new(one_token(), max_token_amount()).check(request.send_value, "send_value")?;

        let plan = self.validate_transactions(address, request).await?;

        let time = now(&self.limits.timezone);
        let date = target_date(&time);
        ensure_within_daily_limit(
            client,
            &self.token_sends,
            &caller.user_id,
            &date,
            request.send_value,
            self.limits.token_send_daily_limit,
        )
        .await?;

        let token_send = TokenSendData {
            user_id: caller.user_id.clone(),
            send_value: request.send_value,
            init_approve_transaction: None,
            approve_transaction: None,
            relay_transaction: None,
            send_status: SettlementStatus::Doing,
            target_date: date,
            sort_key: sort_key(&time),
            created_at: time.timestamp(),
        };
        self.token_sends
            .create_token_send(client, &token_send)
            .await?;
        let key = token_send.key();

        let relay_transaction = match self.submit(client, &key, &plan).await {
            Ok(t) => t,
            Err(e) => {
                error!("Token send of {} failed: {}", caller.user_id, e);
                self.token_sends
                    .update_status(client, &key, SettlementStatus::Fail)
                    .await?;
                return Err(e);
            }
        };

        let status = match self
            .chain
            .wait_for_receipt(&relay_transaction, &self.poll)
            .await
        {
            ReceiptOutcome::Confirmed => SettlementStatus::Done,
            ReceiptOutcome::Pending => SettlementStatus::Doing,
            ReceiptOutcome::Rejected(message) => {
                warn!("Relay {} rejected: {}", relay_transaction, message);
                SettlementStatus::Fail
            }
            ReceiptOutcome::Malformed(message) => {
                self.token_sends
                    .update_status(client, &key, SettlementStatus::Fail)
                    .await?;
                return Err(SettlementError::Receipt(message));
            }
            ReceiptOutcome::TransportFailure(message) => {
                self.token_sends
                    .update_status(client, &key, SettlementStatus::Fail)
                    .await?;
                return Err(SettlementError::Upstream(message));
            }
        };

        self.token_sends.update_status(client, &key, status).await?;

        info!(
            "Token send of {} by {} resolved as {}",
            request.send_value, caller.user_id, status
        );

        Ok(TokenSendResult {
            is_completed: status == SettlementStatus::Done,
            status,
        })
    }

    /// Relays the transactions in nonce order, records each hash and
    /// returns the hash of the relay.
    async fn submit<C>(
        &self,
        client: &C,
        key: &TokenSendKey,
        plan: &SendPlan<'_>,
    ) -> Result<String, SettlementError>
    where
        C: Sync,
        P: AlisTokenSendProvider<Client = C> + Sync,
    {
        let steps = plan
            .init_approve
            .map(|raw| (TokenSendTransaction::InitApprove, raw))
            .into_iter()
            .chain([
                (TokenSendTransaction::Approve, plan.approve),
                (TokenSendTransaction::Relay, plan.relay),
            ]);

        let mut last = String::new();
        for (kind, raw) in steps {
            let hash = self.chain.send_raw_transaction(raw).await?;
            self.token_sends
                .update_transaction(client, key, kind, &hash)
                .await?;
            last = hash;
        }

        Ok(last)
    }

    async fn validate_transactions<'a>(
        &self,
        address: &str,
        request: &'a TokenSendRequest,
    ) -> Result<SendPlan<'a>, SettlementError> {
        let nonce = self.chain.get_transaction_count(address).await?;
        let allowance = parse_hex_u256(&self.chain.get_allowance(address).await?, "allowance")?;

        // A pending allowance must be reset to zero before approving again.
        let (init_approve, approve_nonce) = if allowance.is_zero() {
            (None, nonce)
        } else {
            let raw = request
                .init_approve_signed_transaction
                .as_deref()
                .ok_or_else(|| {
                    SettlementError::Validation(
                        "init_approve_signed_transaction is required".to_string(),
                    )
                })?;

            let data =
                self.validator
                    .get_data_from_raw_transaction(raw, &nonce, TargetContract::Token)?;
            self.validator
                .validate_raw_transaction_signature(raw, address)?;
            if !self.validator.validate_erc20_approve_data(&data)?.is_zero() {
                return Err(SettlementError::Validation(
                    "init_approve_signed_transaction is invalid".to_string(),
                ));
            }

            (Some(raw), increment_transaction_count(&nonce)?)
        };

        let approve_data = self.validator.get_data_from_raw_transaction(
            &request.approve_signed_transaction,
            &approve_nonce,
            TargetContract::Token,
        )?;
        self.validator
            .validate_raw_transaction_signature(&request.approve_signed_transaction, address)?;
        let approve_value = self.validator.validate_erc20_approve_data(&approve_data)?;

        let relay_nonce = increment_transaction_count(&approve_nonce)?;
        let relay_data = self.validator.get_data_from_raw_transaction(
            &request.relay_signed_transaction,
            &relay_nonce,
            TargetContract::Bridge,
        )?;
        self.validator
            .validate_raw_transaction_signature(&request.relay_signed_transaction, address)?;
        let relay_value = self.validator.validate_erc20_relay_data(&relay_data)?;

        if approve_value != relay_value {
            return Err(SettlementError::Validation(
                "approve and relay values do not match".to_string(),
            ));
        }
        if relay_value != request.send_value {
            return Err(SettlementError::Validation("send_value is invalid".to_string()));
        }

        Ok(SendPlan {
            init_approve,
            approve: &request.approve_signed_transaction,
            relay: &request.relay_signed_transaction,
        })
    }
}
