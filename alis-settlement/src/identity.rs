//! Identity provider seam: user chain addresses and PIN re-authentication.
use async_trait::async_trait;
use aws_config::meta::region::RegionProviderChain;
use aws_config::BehaviorVersion;
use aws_sdk_cognitoidentityprovider::operation::admin_get_user::AdminGetUserError;
use aws_sdk_cognitoidentityprovider::operation::verify_user_attribute::VerifyUserAttributeError;
use aws_sdk_cognitoidentityprovider::Client as CognitoClient;
#[cfg(any(test, feature = "mock"))]
use mockall::automock;
use tracing::{error, warn};

use crate::SettlementError;

const PRIVATE_ETH_ADDRESS_ATTR: &str = "custom:private_eth_address";

/// Claims of the authenticated caller, as given by the API authorizer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallerClaims {
    pub user_id: String,
    pub phone_number_verified: bool,
    pub email_verified: bool,
    pub private_eth_address: Option<String>,
}

impl CallerClaims {
    /// Token moving operations are only allowed to fully verified users.
    pub fn ensure_verified(&self) -> Result<(), SettlementError> {
        if !self.phone_number_verified || !self.email_verified {
            return Err(SettlementError::Forbidden(
                "phone_number and email must be verified".to_string(),
            ));
        }
        Ok(())
    }

    pub fn require_private_eth_address(&self) -> Result<&str, SettlementError> {
        self.private_eth_address
            .as_deref()
            .ok_or_else(|| SettlementError::NotFound("private_eth_address not found".to_string()))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PinVerificationError {
    #[error("Invalid access token")]
    InvalidAccessToken,
    #[error("Invalid pin code")]
    CodeMismatch,
    #[error("Pin code has expired")]
    CodeExpired,
    #[error("Too many attempts, retry later")]
    LimitExceeded,
    #[error("{0}")]
    Other(String),
}

#[cfg_attr(any(test, feature = "mock"), automock)]
#[async_trait]
pub trait IdentityProvider {
    /// Returns the registered private chain address of `user_id`, if any.
    async fn get_private_eth_address(&self, user_id: &str)
        -> Result<Option<String>, SettlementError>;

    /// Verifies the one time `pin_code` sent to the phone of the access token owner.
    async fn verify_pin(
        &self,
        access_token: &str,
        pin_code: &str,
    ) -> Result<(), PinVerificationError>;
}

/// Cognito user pool backed identity provider.
pub struct CognitoIdentityProvider {
    client: CognitoClient,
    user_pool_id: String,
}

impl CognitoIdentityProvider {
    pub async fn new(user_pool_id: &str) -> Self {
        let region_provider = RegionProviderChain::default_provider().or_else("ap-northeast-1");
        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(region_provider)
            .load()
            .await;

        Self {
            client: CognitoClient::new(&config),
            user_pool_id: user_pool_id.to_string(),
        }
    }
}

#[async_trait]
impl IdentityProvider for CognitoIdentityProvider {
    async fn get_private_eth_address(
        &self,
        user_id: &str,
    ) -> Result<Option<String>, SettlementError> {
        let output = self
            .client
            .admin_get_user()
            .user_pool_id(&self.user_pool_id)
            .username(user_id)
            .send()
            .await;

        match output {
            Ok(user) => Ok(user
                .user_attributes()
                .iter()
                .find(|a| a.name() == PRIVATE_ETH_ADDRESS_ATTR)
                .and_then(|a| a.value())
                .map(|v| v.to_string())),
            Err(e) => match e.into_service_error() {
                AdminGetUserError::UserNotFoundException(_) => {
                    warn!("User {} not found", user_id);
                    Ok(None)
                }
                other => {
                    error!("AdminGetUser failed for {}: {}", user_id, other);
                    Err(SettlementError::Internal(other.to_string()))
                }
            },
        }
    }

    async fn verify_pin(
        &self,
        access_token: &str,
        pin_code: &str,
    ) -> Result<(), PinVerificationError> {
        let output = self
            .client
            .verify_user_attribute()
            .access_token(access_token)
            .attribute_name("phone_number")
            .code(pin_code)
            .send()
            .await;

        match output {
            Ok(_) => Ok(()),
            Err(e) => Err(match e.into_service_error() {
                VerifyUserAttributeError::NotAuthorizedException(_) => {
                    PinVerificationError::InvalidAccessToken
                }
                VerifyUserAttributeError::CodeMismatchException(_) => {
                    PinVerificationError::CodeMismatch
                }
                VerifyUserAttributeError::ExpiredCodeException(_) => {
                    PinVerificationError::CodeExpired
                }
                VerifyUserAttributeError::LimitExceededException(_) => {
                    PinVerificationError::LimitExceeded
                }
                other => {
                    error!("VerifyUserAttribute failed: {}", other);
                    PinVerificationError::Other(other.to_string())
                }
            }),
        }
    }
}
