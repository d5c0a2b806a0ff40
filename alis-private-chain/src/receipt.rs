//! Transaction confirmation polling.
//!
//! A transaction hash is looked up a bounded number of times, sleeping a
//! fixed interval before each lookup. The private chain reports a mined
//! transaction as a receipt whose logs all have `type == "mined"`.
use serde_json::Value;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::client::PrivateChainClient;
use crate::envelope::GatewayResponse;
use crate::transport::GatewayTransport;
use crate::ChainError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollSettings {
    pub max_attempts: u32,
    pub interval: Duration,
}

/// Result of waiting for a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReceiptOutcome {
    /// Every log of the receipt is mined.
    Confirmed,
    /// The gateway answered with an error envelope.
    Rejected(String),
    /// Attempts are exhausted and nothing was mined yet. The transaction
    /// may still be mined later.
    Pending,
    /// The receipt has logs that are not mined.
    Malformed(String),
    /// The gateway could not be reached or answered garbage.
    TransportFailure(String),
}

/// Interpretation of a single receipt lookup.
#[derive(Debug, PartialEq, Eq)]
enum ReceiptState {
    Pending,
    Mined,
}

fn check_receipt(result: &Value) -> Result<ReceiptState, ChainError> {
    let logs = match result.get("logs").and_then(|l| l.as_array()) {
        Some(logs) if !logs.is_empty() => logs,
        _ => return Ok(ReceiptState::Pending),
    };

    for log in logs {
        match log.get("type").and_then(|t| t.as_str()) {
            Some("mined") => continue,
            other => {
                return Err(ChainError::Receipt(format!(
                    "Unexpected log type: {}",
                    other.unwrap_or("none")
                )))
            }
        }
    }

    Ok(ReceiptState::Mined)
}

impl<T: GatewayTransport + Sync> PrivateChainClient<T> {
    /// Waits for `transaction_hash` to be mined.
    ///
    /// Never returns an error: every outcome, including transport
    /// failures, is a `ReceiptOutcome` the caller has to branch on.
    pub async fn wait_for_receipt(
        &self,
        transaction_hash: &str,
        settings: &PollSettings,
    ) -> ReceiptOutcome {
        for attempt in 1..=settings.max_attempts {
            sleep(settings.interval).await;

            let response = match self.get_receipt(transaction_hash).await {
                Ok(r) => r,
                Err(e) => {
                    warn!("Receipt lookup of {} failed: {}", transaction_hash, e);
                    return ReceiptOutcome::TransportFailure(e.to_string());
                }
            };

            match response {
                GatewayResponse::Error(message) => {
                    warn!("Transaction {} rejected: {}", transaction_hash, message);
                    return ReceiptOutcome::Rejected(message);
                }
                GatewayResponse::Result(result) => match check_receipt(&result) {
                    Ok(ReceiptState::Mined) => {
                        info!(
                            "Transaction {} mined after {} attempt(s)",
                            transaction_hash, attempt
                        );
                        return ReceiptOutcome::Confirmed;
                    }
                    Ok(ReceiptState::Pending) => continue,
                    Err(e) => {
                        warn!("Transaction {} receipt: {}", transaction_hash, e);
                        return ReceiptOutcome::Malformed(e.to_string());
                    }
                },
            }
        }

        warn!(
            "Transaction {} still pending after {} attempts",
            transaction_hash, settings.max_attempts
        );
        ReceiptOutcome::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{Endpoint, GatewayReply, MockGatewayTransport};
    use serde_json::json;

    const BRIDGE: &str = "0x2222222222222222222222222222222222222222";

    fn settings() -> PollSettings {
        PollSettings {
            max_attempts: 5,
            interval: Duration::ZERO,
        }
    }

    fn reply(body: &str) -> Result<GatewayReply, ChainError> {
        Ok(GatewayReply {
            status: 200,
            body: body.to_string(),
        })
    }

    #[test]
    fn test_check_receipt() {
        assert_eq!(check_receipt(&Value::Null).unwrap(), ReceiptState::Pending);
        assert_eq!(
            check_receipt(&json!({"logs": []})).unwrap(),
            ReceiptState::Pending
        );
        assert_eq!(
            check_receipt(&json!({"logs": [{"type": "mined"}, {"type": "mined"}]})).unwrap(),
            ReceiptState::Mined
        );
        assert!(matches!(
            check_receipt(&json!({"logs": [{"type": "mined"}, {"type": "pending"}]})),
            Err(ChainError::Receipt(_))
        ));
    }

    #[tokio::test]
    async fn confirmed_on_third_attempt() {
        let mut transport = MockGatewayTransport::new();
        let mut calls = 0;
        transport
            .expect_post()
            .withf(|e, _| *e == Endpoint::TransactionReceipt)
            .times(3)
            .returning(move |_, _| {
                calls += 1;
                if calls < 3 {
                    reply(r#"{"result": null}"#)
                } else {
                    reply(r#"{"result": {"logs": [{"type": "mined"}]}}"#)
                }
            });

        let client = PrivateChainClient::new(transport, BRIDGE);
        assert_eq!(
            client.wait_for_receipt("0x1", &settings()).await,
            ReceiptOutcome::Confirmed
        );
    }

    #[tokio::test]
    async fn pending_after_max_attempts() {
        let mut transport = MockGatewayTransport::new();
        transport
            .expect_post()
            .times(5)
            .returning(|_, _| reply(r#"{"result": {"logs": []}}"#));

        let client = PrivateChainClient::new(transport, BRIDGE);
        assert_eq!(
            client.wait_for_receipt("0x1", &settings()).await,
            ReceiptOutcome::Pending
        );
    }

    #[tokio::test]
    async fn error_envelope_stops_polling() {
        let mut transport = MockGatewayTransport::new();
        transport
            .expect_post()
            .times(1)
            .returning(|_, _| reply(r#"{"error": "reverted"}"#));

        let client = PrivateChainClient::new(transport, BRIDGE);
        assert_eq!(
            client.wait_for_receipt("0x1", &settings()).await,
            ReceiptOutcome::Rejected("reverted".to_string())
        );
    }

    #[tokio::test]
    async fn unexpected_log_type_is_not_retried() {
        let mut transport = MockGatewayTransport::new();
        transport
            .expect_post()
            .times(1)
            .returning(|_, _| reply(r#"{"result": {"logs": [{"type": "removed"}]}}"#));

        let client = PrivateChainClient::new(transport, BRIDGE);
        assert!(matches!(
            client.wait_for_receipt("0x1", &settings()).await,
            ReceiptOutcome::Malformed(_)
        ));
    }

    #[tokio::test]
    async fn transport_failure() {
        let mut transport = MockGatewayTransport::new();
        transport
            .expect_post()
            .times(1)
            .returning(|_, _| Err(ChainError::Transport("timeout".to_string())));

        let client = PrivateChainClient::new(transport, BRIDGE);
        assert_eq!(
            client.wait_for_receipt("0x1", &settings()).await,
            ReceiptOutcome::TransportFailure("Transport error: timeout".to_string())
        );
    }
}
