use alloy_primitives::U256;
use lambda_http::{Request, RequestExt};
use serde::de::DeserializeOwned;

use crate::LambdaHttpError;

/// Returns the value of a path parameter, if any.
pub fn path_param(event: &Request, param_name: &str) -> Option<String> {
    event
        .path_parameters_ref()
        .and_then(|params| params.first(param_name))
        .map(|v| v.to_string())
}

/// Returns the value of a path parameter. Returns an error if the parameter is not found.
pub fn require_path_param(event: &Request, param_name: &str) -> Result<String, LambdaHttpError> {
    path_param(event, param_name).ok_or_else(|| {
        LambdaHttpError::ParamMissing(format!("Param {param_name} is missing"))
    })
}

/// Deserializes the JSON body of the request.
pub fn json_body<T: DeserializeOwned>(event: &Request) -> Result<T, LambdaHttpError> {
    serde_json::from_slice(event.body().as_ref())
        .map_err(|e| LambdaHttpError::ParamParsing(format!("Invalid request body: {e}")))
}

/// Parses an amount given as a decimal string.
pub fn decimal_amount(value: &str, param_name: &str) -> Result<U256, LambdaHttpError> {
    if value.is_empty() || !value.chars().all(|c| c.is_ascii_digit()) {
        return Err(LambdaHttpError::ParamParsing(format!(
            "Param {param_name} is expected to be a decimal string"
        )));
    }

    U256::from_str_radix(value, 10).map_err(|_e| {
        LambdaHttpError::ParamParsing(format!("Param {param_name} out of range decimal value"))
    })
}

/// Checks a `0x` prefixed hex string, as signed transactions are.
pub fn require_hex(value: &str, param_name: &str) -> Result<(), LambdaHttpError> {
    let valid = value.len() > 2
        && value.starts_with("0x")
        && value[2..].chars().all(|c| c.is_ascii_hexdigit());

    if !valid {
        return Err(LambdaHttpError::ParamParsing(format!(
            "Param {param_name} is expected to be hexadecimal string"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lambda_http::Body;
    use serde::Deserialize;
    use std::collections::HashMap;

    #[derive(Deserialize)]
    struct PriceBody {
        price: String,
    }

    #[test]
    fn test_require_path_param() {
        let mut params = HashMap::new();
        params.insert("article_id".to_string(), "abc".to_string());
        let req = Request::default().with_path_parameters(params);

        assert_eq!(require_path_param(&req, "article_id").unwrap(), "abc");
        match require_path_param(&req, "other") {
            Err(LambdaHttpError::ParamMissing(s)) => assert_eq!(s, "Param other is missing"),
            _ => panic!("expected ParamMissing"),
        }
    }

    #[test]
    fn test_json_body() {
        let req = Request::new(Body::from(r#"{"price": "100"}"#));
        let body: PriceBody = json_body(&req).unwrap();
        assert_eq!(body.price, "100");

        let req = Request::new(Body::from("not json"));
        assert!(json_body::<PriceBody>(&req).is_err());
    }

    #[test]
    fn test_decimal_amount() {
        assert_eq!(
            decimal_amount("1000000000000000000", "price").unwrap(),
            U256::from(10u64).pow(U256::from(18u64))
        );
        assert!(decimal_amount("0x10", "price").is_err());
        assert!(decimal_amount("", "price").is_err());
        assert!(decimal_amount("-1", "price").is_err());

        let too_big = "9".repeat(100);
        match decimal_amount(&too_big, "price") {
            Err(LambdaHttpError::ParamParsing(s)) => {
                assert_eq!(s, "Param price out of range decimal value")
            }
            _ => panic!("expected ParamParsing"),
        }
    }

    #[test]
    fn test_require_hex() {
        assert!(require_hex("0xf86b", "tx").is_ok());
        assert!(require_hex("0x", "tx").is_err());
        assert!(require_hex("f86b", "tx").is_err());
        assert!(require_hex("0xzz", "tx").is_err());
    }
}
