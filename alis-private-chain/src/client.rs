use alloy_primitives::U256;
use serde_json::{json, Value};
use tracing::{error, info};

use crate::envelope::{result_to_string, GatewayResponse};
use crate::format::{parse_hex_u256, parse_hex_u64, to_abi_word};
use crate::transport::{Endpoint, GatewayTransport};
use crate::ChainError;

/// High level access to the private chain gateway.
pub struct PrivateChainClient<T> {
    transport: T,
    bridge_address: String,
}

impl<T: GatewayTransport + Sync> PrivateChainClient<T> {
    pub fn new(transport: T, bridge_address: &str) -> Self {
        Self {
            transport,
            bridge_address: bridge_address.to_string(),
        }
    }

    /// Posts the payload and returns the unwrapped `result`.
    /// Any non 200 status or error envelope is a `ChainError::SendTransaction`.
    pub async fn send_transaction(
        &self,
        endpoint: Endpoint,
        payload: &Value,
    ) -> Result<Value, ChainError> {
        let reply = self.transport.post(endpoint, payload).await?;

        if reply.status != 200 {
            error!("{} failed with status {}: {}", endpoint, reply.status, reply.body);
            return Err(ChainError::SendTransaction(format!(
                "{} returned status {}",
                endpoint, reply.status
            )));
        }

        match GatewayResponse::from_body(&reply.body)? {
            GatewayResponse::Result(result) => Ok(result),
            GatewayResponse::Error(message) => {
                error!("{} returned an error: {}", endpoint, message);
                Err(ChainError::SendTransaction(message))
            }
        }
    }

    /// Relays a transaction signed by the user, returns the transaction hash.
    pub async fn send_raw_transaction(&self, raw_transaction: &str) -> Result<String, ChainError> {
        let result = self
            .send_transaction(
                Endpoint::SendRawTransaction,
                &json!({ "raw_transaction": raw_transaction }),
            )
            .await?;
        let hash = result_to_string(&result)?;
        info!("Raw transaction relayed: {}", hash);
        Ok(hash)
    }

    /// Transfers `value` from `from` to `to`, signed by the gateway managed key of `from`.
    pub async fn send_tip(
        &self,
        from: &str,
        to: &str,
        value: U256,
        nonce_hex: &str,
    ) -> Result<String, ChainError> {
        let result = self
            .send_transaction(
                Endpoint::WalletTip,
                &json!({
                    "from_user_eoa": from,
                    "to_user_eoa": to,
                    "tipValue": to_abi_word(value),
                    "nonce": nonce_hex,
                }),
            )
            .await?;
        let hash = result_to_string(&result)?;
        info!("Tip transaction sent from {} to {}: {}", from, to, hash);
        Ok(hash)
    }

    pub async fn get_balance(&self, address: &str) -> Result<U256, ChainError> {
        let result = self
            .send_transaction(
                Endpoint::WalletBalance,
                &json!({ "private_eth_address": address }),
            )
            .await?;
        parse_hex_u256(&result_to_string(&result)?, "balance")
    }

    /// Returns the nonce to be used by the next transaction of `address`.
    pub async fn get_transaction_count(&self, address: &str) -> Result<String, ChainError> {
        let result = self
            .send_transaction(
                Endpoint::GetTransactionCount,
                &json!({ "from_user_eoa": address }),
            )
            .await?;
        let nonce = result_to_string(&result)?;
        // Normalized so nonces compare as numbers.
        Ok(format!("{:#x}", parse_hex_u64(&nonce, "nonce")?))
    }

    /// Returns the amount `owner` allows the bridge contract to spend.
    pub async fn get_allowance(&self, owner: &str) -> Result<String, ChainError> {
        let result = self
            .send_transaction(
                Endpoint::WalletAllowance,
                &json!({
                    "from_user_eoa": owner,
                    "owner_eoa": owner,
                    "spender_eoa": self.bridge_address,
                }),
            )
            .await?;
        result_to_string(&result)
    }

    /// Returns the raw receipt envelope. Only transport issues are errors here,
    /// interpreting the envelope is the poller job.
    pub async fn get_receipt(&self, transaction_hash: &str) -> Result<GatewayResponse, ChainError> {
        let reply = self
            .transport
            .post(
                Endpoint::TransactionReceipt,
                &json!({ "transaction_hash": transaction_hash }),
            )
            .await?;

        if reply.status != 200 {
            return Err(ChainError::Transport(format!(
                "{} returned status {}",
                Endpoint::TransactionReceipt,
                reply.status
            )));
        }

        GatewayResponse::from_body(&reply.body)
    }
}
