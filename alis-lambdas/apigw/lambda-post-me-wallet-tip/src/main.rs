//! A Lambda function to tip the author of an article.
//!
//! To work, this lambda expects the following path:
//!     `../me/wallet/tip`
//!
//! with a JSON body carrying the article id, the tip value as a decimal
//! string and the two transfers signed by the caller: the tip and the burn.
//!
use alis_dynamodb::init_aws_dynamo_client;
use alis_dynamodb::providers::{
    AlisArticleProvider, AlisTipProvider, DynamoDbArticleProvider, DynamoDbTipProvider,
};
use alis_private_chain::{
    ChainConfig, GatewayTransport, PrivateChainClient, SignedHttpTransport, TransactionValidator,
};
use alis_settlement::{
    CognitoIdentityProvider, IdentityProvider, SettlementConfig, TipRequest, TipWorkflow,
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
struct TipBody {
    article_id: String,
    tip_value: String,
    tip_signed_transaction: String,
    burn_signed_transaction: String,
}

async fn function_handler<C, A, P, T, I>(
    ctx: &Ctx<C, TipWorkflow<A, P, T, I>>,
    event: Request,
) -> Result<Response<Body>, Error>
where
    C: Sync,
    A: AlisArticleProvider<Client = C> + Sync,
    P: AlisTipProvider<Client = C> + Sync,
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
        "{} {} from {}: {} tips {} on {}",
        http.http_method,
        http.http_path,
        http.source_ip,
        caller.user_id,
        request.tip_value,
        request.article_id
    );

    match ctx.workflow.run(&ctx.client, &caller, &request).await {
        Ok(result) => common::ok_body_rsp(&result),
        Err(e) => common::settlement_error_rsp(&e),
    }
}

fn get_request(event: &Request) -> Result<TipRequest, LambdaHttpError> {
    let body: TipBody = common::json_body(event)?;

    if body.article_id.is_empty() {
        return Err(LambdaHttpError::ParamMissing(
            "Param article_id is missing".to_string(),
        ));
    }

    let tip_value = common::decimal_amount(&body.tip_value, "tip_value")?;
    common::require_hex(&body.tip_signed_transaction, "tip_signed_transaction")?;
    common::require_hex(&body.burn_signed_transaction, "burn_signed_transaction")?;

    Ok(TipRequest {
        article_id: body.article_id,
        tip_value,
        tip_signed_transaction: body.tip_signed_transaction,
        burn_signed_transaction: body.burn_signed_transaction,
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
    let table_name = &settlement_config.table_name;

    let ctx = Ctx {
        client: init_aws_dynamo_client().await,
        workflow: TipWorkflow {
            articles: DynamoDbArticleProvider::new(table_name),
            tips: DynamoDbTipProvider::new(table_name),
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

#[cfg(test)]
mod tests {
    use super::*;
    use alis_dynamodb::providers::article::{
        ArticleInfo, MockAlisArticleProvider, ARTICLE_STATUS_PUBLIC,
    };
    use alis_dynamodb::providers::tip::MockAlisTipProvider;
    use alis_dynamodb::MockedClient;
    use alis_private_chain::testing::TestWallet;
    use alis_private_chain::{ChainError, Endpoint, GatewayReply, MockGatewayTransport, PollSettings};
    use alis_settlement::{Limits, MockIdentityProvider, BURN_ADDRESS};
    use alloy_primitives::U256;
    use lambda_http_common::lambda_context::request_with_claims;
    use serde_json::json;
    use std::time::Duration;

    const TOKEN: &str = "0x1111111111111111111111111111111111111111";
    const BRIDGE: &str = "0x2222222222222222222222222222222222222222";
    const AUTHOR_ADDRESS: &str = "0x5555555555555555555555555555555555555555";

    type MockCtx = Ctx<
        MockedClient,
        TipWorkflow<
            MockAlisArticleProvider,
            MockAlisTipProvider,
            MockGatewayTransport,
            MockIdentityProvider,
        >,
    >;

    fn get_mock_ctx(transport: MockGatewayTransport) -> MockCtx {
        Ctx {
            client: MockedClient,
            workflow: TipWorkflow {
                articles: MockAlisArticleProvider::default(),
                tips: MockAlisTipProvider::default(),
                chain: PrivateChainClient::new(transport, BRIDGE),
                validator: TransactionValidator::new(
                    TOKEN.parse().unwrap(),
                    BRIDGE.parse().unwrap(),
                    None,
                ),
                identity: MockIdentityProvider::default(),
                limits: Limits::default(),
                poll: PollSettings {
                    max_attempts: 3,
                    interval: Duration::ZERO,
                },
            },
        }
    }

    fn request(wallet: &TestWallet, body: serde_json::Value) -> Request {
        request_with_claims(
            &body.to_string(),
            json!({
                "cognito:username": "alice",
                "phone_number_verified": "true",
                "email_verified": "true",
                "custom:private_eth_address": wallet.address(),
            }),
        )
    }

    fn tip_body(wallet: &TestWallet, tip: u64, burn: u64) -> serde_json::Value {
        json!({
            "article_id": "article1",
            "tip_value": tip.to_string(),
            "tip_signed_transaction": wallet.transfer(3, TOKEN, AUTHOR_ADDRESS, U256::from(tip)),
            "burn_signed_transaction": wallet.transfer(4, TOKEN, BURN_ADDRESS, U256::from(burn)),
        })
    }

    fn body_text(rsp: &Response<Body>) -> &str {
        match rsp.body() {
            Body::Text(t) => t,
            _ => panic!("Body is expected to be a string"),
        }
    }

    fn reply(body: &str) -> Result<GatewayReply, ChainError> {
        Ok(GatewayReply {
            status: 200,
            body: body.to_string(),
        })
    }

    fn expect_article_and_author(ctx: &mut MockCtx) {
        ctx.workflow
            .articles
            .expect_get_article_info()
            .returning(|_, id| {
                Ok(Some(ArticleInfo {
                    article_id: id.to_string(),
                    user_id: "author".to_string(),
                    title: "title".to_string(),
                    status: ARTICLE_STATUS_PUBLIC.to_string(),
                    price: None,
                }))
            });
        ctx.workflow
            .identity
            .expect_get_private_eth_address()
            .returning(|_| Ok(Some(AUTHOR_ADDRESS.to_string())));
    }

    fn nonce_and_balance(transport: &mut MockGatewayTransport, balance: &'static str) {
        transport
            .expect_post()
            .withf(|e, _| *e == Endpoint::GetTransactionCount)
            .returning(|_, _| reply(r#"{"result": "0x3"}"#));
        transport
            .expect_post()
            .withf(|e, _| *e == Endpoint::WalletBalance)
            .returning(move |_, _| reply(&format!(r#"{{"result": "{}"}}"#, balance)));
    }

    #[tokio::test]
    async fn request_ok() {
        let wallet = TestWallet::default();

        let mut transport = MockGatewayTransport::new();
        nonce_and_balance(&mut transport, "0xffff");
        transport
            .expect_post()
            .withf(|e, _| *e == Endpoint::SendRawTransaction)
            .times(2)
            .returning(|_, p| {
                let raw = p["raw_transaction"].as_str().unwrap_or_default();
                reply(&format!(r#"{{"result": "0x{}"}}"#, &raw[raw.len() - 8..]))
            });
        transport
            .expect_post()
            .withf(|e, _| *e == Endpoint::TransactionReceipt)
            .times(1)
            .returning(|_, _| reply(r#"{"result": {"logs": [{"type": "mined"}]}}"#));

        let mut ctx = get_mock_ctx(transport);
        expect_article_and_author(&mut ctx);
        let tips = &mut ctx.workflow.tips;
        tips.expect_create_tip().times(1).returning(|_, _| Ok(()));
        tips.expect_update_transaction()
            .times(1)
            .returning(|_, _, _| Ok(()));
        tips.expect_update_burn_transaction()
            .times(1)
            .returning(|_, _, _| Ok(()));
        tips.expect_complete_tip().times(1).returning(|_, _| Ok(()));

        let rsp = function_handler(&ctx, request(&wallet, tip_body(&wallet, 1000, 100)))
            .await
            .expect("failed to handle request");

        assert_eq!(rsp.status(), 200);
        let body: serde_json::Value = serde_json::from_str(body_text(&rsp)).unwrap();
        assert!(body["transaction"].as_str().unwrap().starts_with("0x"));
        assert!(body["burn_transaction"].as_str().unwrap().starts_with("0x"));
    }

    #[tokio::test]
    async fn wrong_burn_value() {
        let wallet = TestWallet::default();

        let mut transport = MockGatewayTransport::new();
        nonce_and_balance(&mut transport, "0xffff");

        let mut ctx = get_mock_ctx(transport);
        expect_article_and_author(&mut ctx);
        ctx.workflow.tips.expect_create_tip().times(0);

        let rsp = function_handler(&ctx, request(&wallet, tip_body(&wallet, 1000, 101)))
            .await
            .expect("failed to handle request");

        assert_eq!(rsp.status(), 400);
        assert_eq!(body_text(&rsp), "burn_value is invalid");
    }

    #[tokio::test]
    async fn tip_value_below_minimum() {
        let wallet = TestWallet::default();
        let ctx = get_mock_ctx(MockGatewayTransport::new());

        let rsp = function_handler(&ctx, request(&wallet, tip_body(&wallet, 9, 0)))
            .await
            .expect("failed to handle request");

        assert_eq!(rsp.status(), 400);
        assert_eq!(body_text(&rsp), "tip_value is invalid");
    }

    #[tokio::test]
    async fn signed_transaction_not_hex() {
        let wallet = TestWallet::default();
        let ctx = get_mock_ctx(MockGatewayTransport::new());

        let mut body = tip_body(&wallet, 1000, 100);
        body["burn_signed_transaction"] = json!("burn");

        let rsp = function_handler(&ctx, request(&wallet, body))
            .await
            .expect("failed to handle request");

        assert_eq!(rsp.status(), 400);
        assert_eq!(
            body_text(&rsp),
            "Param burn_signed_transaction is expected to be hexadecimal string"
        );
    }

    #[tokio::test]
    async fn gateway_down_is_internal_error() {
        let wallet = TestWallet::default();

        let mut transport = MockGatewayTransport::new();
        transport
            .expect_post()
            .withf(|e, _| *e == Endpoint::GetTransactionCount)
            .returning(|_, _| {
                Ok(GatewayReply {
                    status: 502,
                    body: "Bad Gateway".to_string(),
                })
            });

        let mut ctx = get_mock_ctx(transport);
        expect_article_and_author(&mut ctx);

        let rsp = function_handler(&ctx, request(&wallet, tip_body(&wallet, 1000, 100)))
            .await
            .expect("failed to handle request");

        assert_eq!(rsp.status(), 500);
        assert_eq!(body_text(&rsp), "Internal server error");
    }
}
