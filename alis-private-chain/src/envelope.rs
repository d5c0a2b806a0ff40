use serde_json::Value;

use crate::ChainError;

/// The body of a gateway answer, decoded once at the client boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayResponse {
    /// `{"result": ...}`. An absent result is decoded as `Value::Null`.
    Result(Value),
    /// `{"error": ...}`.
    Error(String),
}

impl GatewayResponse {
    pub fn from_body(body: &str) -> Result<Self, ChainError> {
        let value: Value = serde_json::from_str(body)
            .map_err(|e| ChainError::Transport(format!("Invalid gateway body: {}", e)))?;

        if let Some(error) = value.get("error") {
            let message = match error {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            return Ok(GatewayResponse::Error(message));
        }

        Ok(GatewayResponse::Result(
            value.get("result").cloned().unwrap_or(Value::Null),
        ))
    }
}

/// Returns the result as a string, without any literal quoting left by the gateway.
pub fn result_to_string(result: &Value) -> Result<String, ChainError> {
    match result {
        Value::String(s) => Ok(s.trim_matches('"').to_string()),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(ChainError::SendTransaction(format!(
            "Unexpected result: {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn error_envelope() {
        let rsp = GatewayResponse::from_body(r#"{"error": "nonce too low"}"#).unwrap();
        assert_eq!(rsp, GatewayResponse::Error("nonce too low".to_string()));

        let rsp = GatewayResponse::from_body(r#"{"error": {"code": -32000}}"#).unwrap();
        assert_eq!(rsp, GatewayResponse::Error(r#"{"code":-32000}"#.to_string()));
    }

    #[test]
    fn result_envelope() {
        let rsp = GatewayResponse::from_body(r#"{"result": "0x10"}"#).unwrap();
        assert_eq!(rsp, GatewayResponse::Result(json!("0x10")));

        let rsp = GatewayResponse::from_body("{}").unwrap();
        assert_eq!(rsp, GatewayResponse::Result(Value::Null));
    }

    #[test]
    fn invalid_body() {
        assert!(matches!(
            GatewayResponse::from_body("<html>"),
            Err(ChainError::Transport(_))
        ));
    }

    #[test]
    fn quoted_result() {
        assert_eq!(result_to_string(&json!("\"0xabc\"")).unwrap(), "0xabc");
        assert_eq!(result_to_string(&json!("0xabc")).unwrap(), "0xabc");
        assert!(result_to_string(&json!({"a": 1})).is_err());
    }
}
