use alis_dynamodb::ProviderError;
use alis_private_chain::ChainError;

use crate::identity::PinVerificationError;

/// Errors returned by the settlement workflows.
///
/// Every variant maps to one HTTP status code, see [`SettlementError::status_code`].
#[derive(Debug, thiserror::Error)]
pub enum SettlementError {
    /// User input rejected before or while validating the signed transactions.
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("Already purchased")]
    AlreadyPurchased,
    /// The chain gateway refused or failed a submission.
    #[error("{0}")]
    Upstream(String),
    /// The chain gateway answered a receipt that can't be interpreted.
    #[error("{0}")]
    Receipt(String),
    #[error("{0}")]
    Internal(String),
}

impl SettlementError {
    pub fn status_code(&self) -> u16 {
        match self {
            SettlementError::Validation(_)
            | SettlementError::AlreadyPurchased
            | SettlementError::Receipt(_) => 400,
            SettlementError::Forbidden(_) => 403,
            SettlementError::NotFound(_) => 404,
            SettlementError::Upstream(_) | SettlementError::Internal(_) => 500,
        }
    }
}

impl From<ProviderError> for SettlementError {
    fn from(e: ProviderError) -> Self {
        SettlementError::Internal(e.to_string())
    }
}

impl From<ChainError> for SettlementError {
    fn from(e: ChainError) -> Self {
        match e {
            ChainError::Validation(s) => SettlementError::Validation(s),
            ChainError::InvalidSignature(_) => {
                SettlementError::Validation("signature is invalid".to_string())
            }
            ChainError::Receipt(s) => SettlementError::Receipt(s),
            ChainError::SendTransaction(_) | ChainError::Signing(_) | ChainError::Transport(_) => {
                SettlementError::Upstream(e.to_string())
            }
        }
    }
}

impl From<PinVerificationError> for SettlementError {
    fn from(e: PinVerificationError) -> Self {
        match e {
            PinVerificationError::Other(s) => SettlementError::Internal(s),
            _ => SettlementError::Validation(e.to_string()),
        }
    }
}
