//! Settlement workflows moving ALIS tokens on the private chain.
//!
//! Each workflow persists a ledger row before anything is submitted to the
//! chain, then polls the chain and writes back what it observed. The ledger
//! is therefore a best effort mirror of the chain: a row left in `doing`
//! means the outcome was still unknown when the request returned.
pub mod config;
pub mod error;
pub mod identity;
pub mod limits;
pub mod notification;
pub mod purchase;
pub mod tip;
pub mod token_send;

pub use config::{Limits, SettlementConfig};
pub use error::SettlementError;
pub use identity::{CallerClaims, CognitoIdentityProvider, IdentityProvider, PinVerificationError};
pub use purchase::{PurchaseRequest, PurchaseWorkflow};
pub use tip::{TipRequest, TipResult, TipWorkflow};
pub use token_send::{TokenSendRequest, TokenSendResult, TokenSendWorkflow};

#[cfg(any(test, feature = "mock"))]
pub use identity::MockIdentityProvider;

/// Address tokens are transferred to in order to burn them.
pub const BURN_ADDRESS: &str = "0x0000000000000000000000000000000000000000";
