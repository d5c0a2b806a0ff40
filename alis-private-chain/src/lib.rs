//! Client for the ALIS private chain gateway.
//!
//! The gateway is an API Gateway stage in front of the private chain nodes.
//! Every call is a SigV4 signed JSON `POST` answering with either
//! `{"result": ...}` or `{"error": ...}`.
//!
//! Signed transactions coming from users are never trusted: they are decoded
//! and every field is checked against what the operation expects before
//! being relayed.
pub mod abi;
pub mod client;
pub mod config;
pub mod envelope;
pub mod format;
pub mod receipt;
#[cfg(any(test, feature = "mock"))]
pub mod testing;
pub mod transaction;
pub mod transport;

pub use client::PrivateChainClient;
pub use config::ChainConfig;
pub use envelope::GatewayResponse;
pub use receipt::{PollSettings, ReceiptOutcome};
pub use transaction::{validate_message_signature, TargetContract, TransactionValidator};
pub use transport::{Endpoint, GatewayReply, GatewayTransport, SignedHttpTransport};

#[cfg(any(test, feature = "mock"))]
pub use transport::MockGatewayTransport;

/// Errors raised while talking to the private chain.
#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    /// The gateway refused a call (non 200 status or error envelope).
    #[error("Send transaction error: {0}")]
    SendTransaction(String),
    /// A user supplied value does not match what is expected.
    #[error("{0}")]
    Validation(String),
    /// A message signature does not recover to the expected address.
    #[error("Invalid signature: {0}")]
    InvalidSignature(String),
    /// The gateway answered with a receipt we can't interpret.
    #[error("Receipt error: {0}")]
    Receipt(String),
    #[error("Signing error: {0}")]
    Signing(String),
    #[error("Transport error: {0}")]
    Transport(String),
}
