pub mod params;
pub use params::*;

pub mod lambda_context;
pub use lambda_context::{caller_claims, claims_from_authorizer, RequestInfo};

use alis_settlement::SettlementError;
use lambda_http::{http::header, Body, Error, Response};
use serde::Serialize;
use tracing::error;

/// Generic errors for http parsing.
#[derive(Debug, thiserror::Error)]
pub enum LambdaHttpError {
    #[error("Bad param")]
    ParamParsing(String),
    #[error("Missing param")]
    ParamMissing(String),
    #[error("Missing claims")]
    MissingClaims(String),
}

impl TryFrom<LambdaHttpError> for Response<Body> {
    type Error = Error;

    fn try_from(e: LambdaHttpError) -> Result<Self, Self::Error> {
        match e {
            LambdaHttpError::ParamParsing(s) => bad_request_rsp(&s),
            LambdaHttpError::ParamMissing(s) => bad_request_rsp(&s),
            LambdaHttpError::MissingClaims(s) => forbidden_rsp(&s),
        }
    }
}

/// Returns a `Response` with OK status and the given body serialized as a JSON.
pub fn ok_body_rsp<T: Serialize>(body: &T) -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(200)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")
        .header(header::ACCESS_CONTROL_ALLOW_METHODS, "POST, OPTIONS")
        .header(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            "Content-Type, Authorization",
        )
        .body(serde_json::to_string(&body)?.into())
        .map_err(Box::new)?)
}

fn text_rsp(status: u16, message: &str) -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "text/plain")
        .body(message.into())
        .map_err(Box::new)?)
}

/// Returns a `Reponse` with BAD_REQUEST status and the given message as body.
pub fn bad_request_rsp(message: &str) -> Result<Response<Body>, Error> {
    text_rsp(400, message)
}

/// Returns a `Reponse` with FORBIDDEN status and the given message as body.
pub fn forbidden_rsp(message: &str) -> Result<Response<Body>, Error> {
    text_rsp(403, message)
}

/// Returns a `Response` with NOT_FOUND status and the given message as body.
pub fn not_found_rsp(message: &str) -> Result<Response<Body>, Error> {
    text_rsp(404, message)
}

/// Returns a `Reponse` with INTERNAL_SERVER_ERROR status and the given message as body.
pub fn internal_server_error_rsp(message: &str) -> Result<Response<Body>, Error> {
    text_rsp(500, message)
}

/// Renders a workflow error with its status code.
/// Details of server side errors are logged, not returned.
pub fn settlement_error_rsp(e: &SettlementError) -> Result<Response<Body>, Error> {
    match e.status_code() {
        400 => bad_request_rsp(&e.to_string()),
        403 => forbidden_rsp(&e.to_string()),
        404 => not_found_rsp(&e.to_string()),
        _ => {
            error!("Settlement error: {}", e);
            internal_server_error_rsp("Internal server error")
        }
    }
}
