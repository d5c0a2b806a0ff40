//! A Lambda function to purchase an article.
//!
//! To work, this lambda expects the following path:
//!     `../me/articles/{article_id}/purchase`
//!
//! with a JSON body `{"price": "<decimal amount>"}`, the price of the
//! latest priced version of the article.
//!
//! Answers `{"status": "doing" | "done" | "fail"}`.
//!
use alis_dynamodb::providers::{
    AlisArticleProvider, AlisNotificationProvider, AlisPurchaseProvider, DynamoDbArticleProvider,
    DynamoDbNotificationProvider, DynamoDbPurchaseProvider,
};
use alis_dynamodb::{init_aws_dynamo_client, SettlementStatus};
use alis_private_chain::{ChainConfig, GatewayTransport, PrivateChainClient, SignedHttpTransport};
use alis_settlement::{
    CognitoIdentityProvider, IdentityProvider, PurchaseRequest, PurchaseWorkflow, SettlementConfig,
};
use lambda_http::{run, service_fn, Body, Error, Request, Response};
use lambda_http_common::{self as common, LambdaHttpError, RequestInfo};
use serde::{Deserialize, Serialize};
use tracing::info;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};

/// A struct to bundle all init required by the lambda.
struct Ctx<C, W> {
    client: C,
    workflow: W,
}

#[derive(Deserialize)]
struct PurchaseBody {
    price: String,
}

#[derive(Serialize)]
struct PurchaseResponse {
    status: SettlementStatus,
}

async fn function_handler<C, A, P, N, T, I>(
    ctx: &Ctx<C, PurchaseWorkflow<A, P, N, T, I>>,
    event: Request,
) -> Result<Response<Body>, Error>
where
    C: Sync,
    A: AlisArticleProvider<Client = C> + Sync,
    P: AlisPurchaseProvider<Client = C> + Sync,
    N: AlisNotificationProvider<Client = C> + Sync,
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
        "{} {} from {}: {} purchases {}",
        http.http_method, http.http_path, http.source_ip, caller.user_id, request.article_id
    );

    match ctx.workflow.run(&ctx.client, &caller, &request).await {
        Ok(status) => common::ok_body_rsp(&PurchaseResponse { status }),
        Err(e) => common::settlement_error_rsp(&e),
    }
}

fn get_request(event: &Request) -> Result<PurchaseRequest, LambdaHttpError> {
    let article_id = common::require_path_param(event, "article_id")?;
    let body: PurchaseBody = common::json_body(event)?;
    let price = common::decimal_amount(&body.price, "price")?;

    Ok(PurchaseRequest { article_id, price })
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
        workflow: PurchaseWorkflow {
            articles: DynamoDbArticleProvider::new(table_name),
            purchases: DynamoDbPurchaseProvider::new(table_name),
            notifications: DynamoDbNotificationProvider::new(table_name),
            chain: PrivateChainClient::new(
                SignedHttpTransport::from_config(&chain_config).await?,
                &chain_config.bridge_contract_address,
            ),
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
        ArticleInfo, ArticlePriceHistory, MockAlisArticleProvider, ARTICLE_STATUS_PUBLIC,
    };
    use alis_dynamodb::providers::notification::MockAlisNotificationProvider;
    use alis_dynamodb::providers::purchase::MockAlisPurchaseProvider;
    use alis_dynamodb::{MockedClient, ProviderError};
    use alis_private_chain::{Endpoint, GatewayReply, MockGatewayTransport, PollSettings};
    use alis_settlement::{Limits, MockIdentityProvider};
    use lambda_http::RequestExt;
    use lambda_http_common::lambda_context::request_with_claims;
    use serde_json::json;
    use std::collections::HashMap;
    use std::time::Duration;

    const BRIDGE: &str = "0x2222222222222222222222222222222222222222";
    const PRICE: &str = "1000000000000000000";

    type MockCtx = Ctx<
        MockedClient,
        PurchaseWorkflow<
            MockAlisArticleProvider,
            MockAlisPurchaseProvider,
            MockAlisNotificationProvider,
            MockGatewayTransport,
            MockIdentityProvider,
        >,
    >;

    fn get_mock_ctx() -> MockCtx {
        Ctx {
            client: MockedClient,
            workflow: PurchaseWorkflow {
                articles: MockAlisArticleProvider::default(),
                purchases: MockAlisPurchaseProvider::default(),
                notifications: MockAlisNotificationProvider::default(),
                chain: PrivateChainClient::new(MockGatewayTransport::new(), BRIDGE),
                identity: MockIdentityProvider::default(),
                limits: Limits::default(),
                poll: PollSettings {
                    max_attempts: 5,
                    interval: Duration::ZERO,
                },
            },
        }
    }

    fn request(body: &str, verified: bool) -> Request {
        let mut params = HashMap::new();
        params.insert("article_id".to_string(), "article1".to_string());

        request_with_claims(
            body,
            json!({
                "cognito:username": "buyer",
                "phone_number_verified": verified.to_string(),
                "email_verified": "true",
                "custom:private_eth_address": "0x4444444444444444444444444444444444444444",
            }),
        )
        .with_path_parameters(params)
    }

    fn body_text(rsp: &Response<Body>) -> &str {
        match rsp.body() {
            Body::Text(t) => t,
            _ => panic!("Body is expected to be a string"),
        }
    }

    fn reply(body: &str) -> Result<GatewayReply, alis_private_chain::ChainError> {
        Ok(GatewayReply {
            status: 200,
            body: body.to_string(),
        })
    }

    fn expect_article(ctx: &mut MockCtx) {
        ctx.workflow
            .articles
            .expect_get_article_info()
            .returning(|_, id| {
                Ok(Some(ArticleInfo {
                    article_id: id.to_string(),
                    user_id: "seller".to_string(),
                    title: "title".to_string(),
                    status: ARTICLE_STATUS_PUBLIC.to_string(),
                    price: None,
                }))
            });
        ctx.workflow
            .articles
            .expect_get_latest_price_history()
            .returning(|_, id| {
                Ok(Some(ArticlePriceHistory {
                    article_id: id.to_string(),
                    price: common::decimal_amount(PRICE, "price").unwrap(),
                    created_at: 1,
                }))
            });
    }

    #[tokio::test]
    async fn request_ok() {
        let mut ctx = get_mock_ctx();
        expect_article(&mut ctx);

        ctx.workflow
            .identity
            .expect_get_private_eth_address()
            .returning(|_| Ok(Some("0x5555555555555555555555555555555555555555".to_string())));

        let purchases = &mut ctx.workflow.purchases;
        purchases.expect_create_purchase().times(1).returning(|_, _| Ok(()));
        purchases
            .expect_update_transaction()
            .times(1)
            .returning(|_, _, _| Ok(()));
        purchases
            .expect_update_status()
            .withf(|_, _, s| *s == SettlementStatus::Done)
            .times(1)
            .returning(|_, _, _| Ok(()));
        purchases
            .expect_update_burn_transaction()
            .times(1)
            .returning(|_, _, _| Ok(()));

        ctx.workflow
            .notifications
            .expect_put_notification()
            .times(2)
            .returning(|_, _| Ok(()));
        ctx.workflow
            .notifications
            .expect_set_unread()
            .times(2)
            .returning(|_, _| Ok(()));

        let mut transport = MockGatewayTransport::new();
        transport
            .expect_post()
            .withf(|e, _| *e == Endpoint::GetTransactionCount)
            .returning(|_, _| reply(r#"{"result": "0x0"}"#));
        transport
            .expect_post()
            .withf(|e, _| *e == Endpoint::WalletTip)
            .times(2)
            .returning(|_, _| reply(r#"{"result": "0x01"}"#));
        transport
            .expect_post()
            .withf(|e, _| *e == Endpoint::TransactionReceipt)
            .returning(|_, _| reply(r#"{"result": {"logs": [{"type": "mined"}]}}"#));
        ctx.workflow.chain = PrivateChainClient::new(transport, BRIDGE);

        let rsp = function_handler(&ctx, request(&format!(r#"{{"price": "{PRICE}"}}"#), true))
            .await
            .expect("failed to handle request");

        assert_eq!(rsp.status(), 200);
        assert_eq!(body_text(&rsp), r#"{"status":"done"}"#);
    }

    #[tokio::test]
    async fn already_purchased() {
        let mut ctx = get_mock_ctx();
        expect_article(&mut ctx);
        ctx.workflow
            .purchases
            .expect_create_purchase()
            .returning(|_, _| Err(ProviderError::ConditionalCheckFailed("lock".to_string())));

        let rsp = function_handler(&ctx, request(&format!(r#"{{"price": "{PRICE}"}}"#), true))
            .await
            .expect("failed to handle request");

        assert_eq!(rsp.status(), 400);
        assert_eq!(body_text(&rsp), "Already purchased");
    }

    #[tokio::test]
    async fn unverified_phone() {
        // No setup, as the lambda will return an error before any dynamodb stuff.
        let rsp = function_handler(
            &get_mock_ctx(),
            request(&format!(r#"{{"price": "{PRICE}"}}"#), false),
        )
        .await
        .expect("failed to handle request");

        assert_eq!(rsp.status(), 403);
    }

    #[tokio::test]
    async fn bad_price() {
        let rsp = function_handler(&get_mock_ctx(), request(r#"{"price": "1e18"}"#, true))
            .await
            .expect("failed to handle request");

        assert_eq!(rsp.status(), 400);
        assert_eq!(
            body_text(&rsp),
            "Param price is expected to be a decimal string"
        );
    }

    #[tokio::test]
    async fn missing_body() {
        let rsp = function_handler(&get_mock_ctx(), request("", true))
            .await
            .expect("failed to handle request");

        assert_eq!(rsp.status(), 400);
        assert!(body_text(&rsp).starts_with("Invalid request body"));
    }

    #[tokio::test]
    async fn unknown_article() {
        let mut ctx = get_mock_ctx();
        ctx.workflow
            .articles
            .expect_get_article_info()
            .returning(|_, _| Ok(None));

        let rsp = function_handler(&ctx, request(&format!(r#"{{"price": "{PRICE}"}}"#), true))
            .await
            .expect("failed to handle request");

        assert_eq!(rsp.status(), 404);
        assert_eq!(body_text(&rsp), "Article article1 not found");
    }
}
