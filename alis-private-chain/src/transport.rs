use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_credential_types::provider::{ProvideCredentials, SharedCredentialsProvider};
use aws_sigv4::http_request::{sign, SignableBody, SignableRequest, SigningParams, SigningSettings};
use aws_sigv4::sign::v4;
use aws_smithy_runtime_api::client::identity::Identity;
#[cfg(any(test, feature = "mock"))]
use mockall::automock;
use serde_json::Value;
use std::fmt;
use std::time::SystemTime;
use tracing::debug;

use crate::{ChainConfig, ChainError};

/// Gateway endpoints used by the settlement workflows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// Transfer signed by the gateway managed key of the sender.
    WalletTip,
    WalletBalance,
    WalletAllowance,
    GetTransactionCount,
    SendRawTransaction,
    TransactionReceipt,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::WalletTip => "wallet/tip",
            Endpoint::WalletBalance => "wallet/balance",
            Endpoint::WalletAllowance => "wallet/allowance",
            Endpoint::GetTransactionCount => "eth/get_transaction_count",
            Endpoint::SendRawTransaction => "eth/send_raw_transaction",
            Endpoint::TransactionReceipt => "transaction/receipt",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path())
    }
}

/// Raw HTTP answer of the gateway.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayReply {
    pub status: u16,
    pub body: String,
}

/// Sends JSON payloads to the gateway.
/// Mainly done for mocking purposes, the client logic lives in `PrivateChainClient`.
#[cfg_attr(any(test, feature = "mock"), automock)]
#[async_trait]
pub trait GatewayTransport {
    async fn post(&self, endpoint: Endpoint, payload: &Value) -> Result<GatewayReply, ChainError>;
}

/// HTTP transport signing every request with SigV4 for `execute-api`.
pub struct SignedHttpTransport {
    http: reqwest::Client,
    base_url: String,
    region: String,
    credentials: SharedCredentialsProvider,
}

impl SignedHttpTransport {
    pub async fn from_config(config: &ChainConfig) -> Result<Self, ChainError> {
        let sdk_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
        let credentials = sdk_config
            .credentials_provider()
            .ok_or_else(|| ChainError::Signing("No AWS credentials provider".to_string()))?;

        Ok(Self {
            http: reqwest::Client::new(),
            base_url: config.base_url(),
            region: config.private_chain_region.clone(),
            credentials,
        })
    }

    fn signed_headers(
        &self,
        identity: &Identity,
        url: &str,
        body: &[u8],
    ) -> Result<Vec<(String, String)>, ChainError> {
        let signing_params: SigningParams<'_> = v4::SigningParams::builder()
            .identity(identity)
            .region(&self.region)
            .name("execute-api")
            .time(SystemTime::now())
            .settings(SigningSettings::default())
            .build()
            .map_err(|e| ChainError::Signing(e.to_string()))?
            .into();

        let signable_request = SignableRequest::new(
            "POST",
            url,
            std::iter::once(("content-type", "application/json")),
            SignableBody::Bytes(body),
        )
        .map_err(|e| ChainError::Signing(e.to_string()))?;

        let (instructions, _signature) = sign(signable_request, &signing_params)
            .map_err(|e| ChainError::Signing(e.to_string()))?
            .into_parts();

        Ok(instructions
            .headers()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect())
    }
}

#[async_trait]
impl GatewayTransport for SignedHttpTransport {
    async fn post(&self, endpoint: Endpoint, payload: &Value) -> Result<GatewayReply, ChainError> {
        let url = format!("{}/{}", self.base_url, endpoint.path());
        let body =
            serde_json::to_vec(payload).map_err(|e| ChainError::Transport(e.to_string()))?;

        let credentials = self
            .credentials
            .provide_credentials()
            .await
            .map_err(|e| ChainError::Signing(e.to_string()))?;
        let identity: Identity = credentials.into();

        let mut request = self
            .http
            .post(&url)
            .header("content-type", "application/json");
        for (name, value) in self.signed_headers(&identity, &url, &body)? {
            request = request.header(name, value);
        }

        let rsp = request
            .body(body)
            .send()
            .await
            .map_err(|e| ChainError::Transport(e.to_string()))?;

        let status = rsp.status().as_u16();
        let body = rsp
            .text()
            .await
            .map_err(|e| ChainError::Transport(e.to_string()))?;

        debug!("{} answered {}", endpoint, status);

        Ok(GatewayReply { status, body })
    }
}
