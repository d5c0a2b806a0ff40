//! A Lambda function to send tokens from the private chain to the public
//! chain through the bridge.
//!
//! To work, this lambda expects the following path:
//!     `../me/wallet/token/send`
//!
//! The caller re-authenticates with the PIN code sent to its phone number,
//! `access_token` being its Cognito access token.
//!
use alis_dynamodb::init_aws_dynamo_client;
use alis_dynamodb::providers::{AlisTokenSendProvider, DynamoDbTokenSendProvider};
use alis_private_chain::{
    ChainConfig, GatewayTransport, PrivateChainClient, SignedHttpTransport, TransactionValidator,
};
use alis_settlement::{
    CognitoIdentityProvider, IdentityProvider, SettlementConfig, TokenSendRequest,
    TokenSendWorkflow,
};
use lambda_http::{run, service_fn, Body, Error, Request, Response};
use lambda_http_common::{self as common, LambdaHttpError, RequestInfo};
use serde::Deserialize;
use tracing::info;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};

/// A struct to bundle all init required by the lambda.
struct Ctx<C, W> {
    client: C,
    workflow: W,
}

#[derive(Deserialize)]
struct TokenSendBody {
    send_value: String,
    #[serde(default)]
    init_approve_signed_transaction: Option<String>,
    approve_signed_transaction: String,
    relay_signed_transaction: String,
    access_token: String,
    pin_code: String,
}

async fn function_handler<C, P, T, I>(
    ctx: &Ctx<C, TokenSendWorkflow<P, T, I>>,
    event: Request,
) -> Result<Response<Body>, Error>
where
    C: Sync,
    P: AlisTokenSendProvider<Client = C> + Sync,
    T: GatewayTransport + Sync,
    I: IdentityProvider + Sync,
{
    let caller = match common::caller_claims(&event) {
        Ok(c) => c,
        Err(e) => return e.try_into(),
    };

    let request = match get_request(&event) {
        Ok(r) => r,
        Err(e) => return e.try_into(),
    };

    let http = RequestInfo::from_event(&event);
    info!(
        "{} {} from {}: {} sends {}",
        http.http_method, http.http_path, http.source_ip, caller.user_id, request.send_value
    );

    match ctx.workflow.run(&ctx.client, &caller, &request).await {
        Ok(result) => common::ok_body_rsp(&result),
        Err(e) => common::settlement_error_rsp(&e),
    }
}

fn require_non_empty(value: &str, param_name: &str) -> Result<(), LambdaHttpError> {
    if value.is_empty() {
        return Err(LambdaHttpError::ParamMissing(format!(
            "Param {param_name} is missing"
        )));
    }
    Ok(())
}

fn get_request(event: &Request) -> Result<TokenSendRequest, LambdaHttpError> {
    let body: TokenSendBody = common::json_body(event)?;

    let send_value = common::decimal_amount(&body.send_value, "send_value")?;
    if let Some(init) = &body.init_approve_signed_transaction {
        common::require_hex(init, "init_approve_signed_transaction")?;
    }
    common::require_hex(&body.approve_signed_transaction, "approve_signed_transaction")?;
    common::require_hex(&body.relay_signed_transaction, "relay_signed_transaction")?;
    require_non_empty(&body.access_token, "access_token")?;
    require_non_empty(&body.pin_code, "pin_code")?;

    Ok(TokenSendRequest {
        send_value,
        init_approve_signed_transaction: body.init_approve_signed_transaction,
        approve_signed_transaction: body.approve_signed_transaction,
        relay_signed_transaction: body.relay_signed_transaction,
        access_token: body.access_token,
        pin_code: body.pin_code,
    })
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        // disable printing the name of the module in every log line.
        .with_target(false)
        // disabling time is handy because CloudWatch will add the ingestion time.
        .without_time()
        .init();

    let chain_config = ChainConfig::from_env()?;
    let settlement_config = SettlementConfig::from_env()?;

    let ctx = Ctx {
        client: init_aws_dynamo_client().await,
        workflow: TokenSendWorkflow {
            token_sends: DynamoDbTokenSendProvider::new(&settlement_config.table_name),
            chain: PrivateChainClient::new(
                SignedHttpTransport::from_config(&chain_config).await?,
                &chain_config.bridge_contract_address,
            ),
            validator: TransactionValidator::from_config(&chain_config)?,
            identity: CognitoIdentityProvider::new(&settlement_config.cognito_user_pool_id).await,
            limits: settlement_config.limits()?,
            poll: chain_config.poll_settings(),
        },
    };

    run(service_fn(|event: Request| async {
        function_handler(&ctx, event).await
    }))
    .await
}
