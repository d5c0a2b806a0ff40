//! Caller information carried by the API Gateway request context.
//!
//! Requests are authorized by a Cognito user pool authorizer, the token
//! claims are found under `authorizer.claims`. Cognito renders booleans
//! as strings.
use alis_settlement::CallerClaims;
use lambda_http::{request::RequestContext, Request, RequestExt};
use serde_json::Value;
use std::collections::HashMap;

use crate::LambdaHttpError;

/// HTTP information used to tag the logs of a request.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RequestInfo {
    pub http_method: String,
    pub http_path: String,
    pub source_ip: String,
}

impl RequestInfo {
    pub fn from_event(event: &Request) -> Self {
        match event.request_context_ref() {
            Some(RequestContext::ApiGatewayV1(c)) => RequestInfo {
                http_method: c.http_method.as_str().to_string(),
                http_path: c.path.clone().unwrap_or_default(),
                source_ip: c.identity.source_ip.clone().unwrap_or_default(),
            },
            _ => RequestInfo::default(),
        }
    }
}

fn claim_bool(claims: &Value, name: &str) -> bool {
    match claims.get(name) {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s == "true",
        _ => false,
    }
}

/// Extracts the caller claims from the authorizer fields of the request context.
pub fn claims_from_authorizer(
    authorizer: &HashMap<String, Value>,
) -> Result<CallerClaims, LambdaHttpError> {
    let claims = authorizer
        .get("claims")
        .ok_or_else(|| LambdaHttpError::MissingClaims("Claims are missing".to_string()))?;

    let user_id = claims
        .get("cognito:username")
        .and_then(|v| v.as_str())
        .ok_or_else(|| LambdaHttpError::MissingClaims("cognito:username is missing".to_string()))?;

    Ok(CallerClaims {
        user_id: user_id.to_string(),
        phone_number_verified: claim_bool(claims, "phone_number_verified"),
        email_verified: claim_bool(claims, "email_verified"),
        private_eth_address: claims
            .get("custom:private_eth_address")
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string()),
    })
}

/// Extracts the caller claims of the request.
pub fn caller_claims(event: &Request) -> Result<CallerClaims, LambdaHttpError> {
    match event.request_context_ref() {
        Some(RequestContext::ApiGatewayV1(c)) => claims_from_authorizer(&c.authorizer.fields),
        _ => Err(LambdaHttpError::MissingClaims(
            "Request is not authorized".to_string(),
        )),
    }
}

/// Builds a request as given by API Gateway with a Cognito authorizer.
#[cfg(any(test, feature = "mock"))]
pub fn request_with_claims(body: &str, claims: Value) -> Request {
    use lambda_http::aws_lambda_events::apigw::ApiGatewayProxyRequestContext;
    use lambda_http::Body;

    let mut context = ApiGatewayProxyRequestContext::default();
    context
        .authorizer
        .fields
        .insert("claims".to_string(), claims);

    Request::new(Body::from(body.to_string()))
        .with_request_context(RequestContext::ApiGatewayV1(context))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lambda_http::aws_lambda_events::apigw::ApiGatewayProxyRequest;
    use lambda_http::Body;
    use serde_json::json;

    fn fields(authorizer: Value) -> HashMap<String, Value> {
        serde_json::from_value(authorizer).unwrap()
    }

    #[test]
    fn string_booleans() {
        let claims = claims_from_authorizer(&fields(json!({
            "claims": {
                "cognito:username": "alice",
                "phone_number_verified": "true",
                "email_verified": "false",
                "custom:private_eth_address": "0x4444444444444444444444444444444444444444",
            }
        })))
        .unwrap();

        assert_eq!(claims.user_id, "alice");
        assert!(claims.phone_number_verified);
        assert!(!claims.email_verified);
        assert_eq!(
            claims.private_eth_address.as_deref(),
            Some("0x4444444444444444444444444444444444444444")
        );
    }

    #[test]
    fn missing_username() {
        match claims_from_authorizer(&fields(json!({"claims": {"email_verified": "true"}}))) {
            Err(LambdaHttpError::MissingClaims(s)) => {
                assert_eq!(s, "cognito:username is missing")
            }
            _ => panic!("expected MissingClaims"),
        }
    }

    #[test]
    fn claims_from_request_context() {
        let req = request_with_claims(
            "{}",
            json!({
                "cognito:username": "bob",
                "phone_number_verified": true,
                "email_verified": true,
            }),
        );

        let claims = caller_claims(&req).unwrap();
        assert_eq!(claims.user_id, "bob");
        assert!(claims.phone_number_verified && claims.email_verified);
        assert_eq!(claims.private_eth_address, None);
    }

    #[test]
    fn claims_from_api_gateway_event() {
        let event: ApiGatewayProxyRequest = serde_json::from_value(json!({
            "resource": "/me/wallet/tip",
            "path": "/me/wallet/tip",
            "httpMethod": "POST",
            "headers": {"content-type": "application/json"},
            "multiValueHeaders": {"content-type": ["application/json"]},
            "queryStringParameters": null,
            "multiValueQueryStringParameters": null,
            "pathParameters": null,
            "stageVariables": null,
            "requestContext": {
                "accountId": "123456789012",
                "resourceId": "abc123",
                "stage": "production",
                "requestId": "c6af9ac6-7b61-11e6-9a41-93e8deadbeef",
                "identity": {"sourceIp": "203.0.113.7", "userAgent": "curl/8.0"},
                "resourcePath": "/me/wallet/tip",
                "path": "/production/me/wallet/tip",
                "httpMethod": "POST",
                "requestTimeEpoch": 1704067200000u64,
                "apiId": "1234567890",
                "authorizer": {
                    "claims": {
                        "sub": "7f3e1c2a-0000-4000-8000-000000000000",
                        "cognito:username": "alice",
                        "phone_number_verified": "true",
                        "email_verified": "true",
                        "custom:private_eth_address": "0x4444444444444444444444444444444444444444",
                    }
                }
            },
            "body": "{}",
            "isBase64Encoded": false
        }))
        .unwrap();

        let req = Request::new(Body::from("{}"))
            .with_request_context(RequestContext::ApiGatewayV1(event.request_context));

        let claims = caller_claims(&req).unwrap();
        assert_eq!(claims.user_id, "alice");
        assert!(claims.phone_number_verified && claims.email_verified);
        assert_eq!(
            claims.private_eth_address.as_deref(),
            Some("0x4444444444444444444444444444444444444444")
        );

        let info = RequestInfo::from_event(&req);
        assert_eq!(info.http_method, "POST");
        assert_eq!(info.source_ip, "203.0.113.7");
    }

    #[test]
    fn no_request_context() {
        assert!(caller_claims(&Request::default()).is_err());
    }
}
