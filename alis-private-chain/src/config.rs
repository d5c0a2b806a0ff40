use serde::Deserialize;
use std::time::Duration;

use crate::receipt::PollSettings;

const STAGE: &str = "production";
const REGION: &str = "ap-northeast-1";
const RECEIPT_MAX_ATTEMPTS: u32 = 5;
const RECEIPT_INTERVAL_MS: u64 = 1000;

fn default_stage() -> String {
    STAGE.to_owned()
}

fn default_region() -> String {
    REGION.to_owned()
}

fn default_receipt_max_attempts() -> u32 {
    RECEIPT_MAX_ATTEMPTS
}

fn default_receipt_interval_ms() -> u64 {
    RECEIPT_INTERVAL_MS
}

/// Private chain settings, read from `ALIS_` prefixed environment variables.
#[derive(Deserialize, Debug, Clone)]
pub struct ChainConfig {
    pub private_chain_execute_api_host: String,
    #[serde(default = "default_stage")]
    pub private_chain_stage: String,
    #[serde(default = "default_region")]
    pub private_chain_region: String,
    pub token_contract_address: String,
    pub bridge_contract_address: String,
    /// `None` for pre EIP-155 transactions (`v` is 27 or 28).
    #[serde(default)]
    pub private_chain_id: Option<u64>,
    #[serde(default = "default_receipt_max_attempts")]
    pub receipt_max_attempts: u32,
    #[serde(default = "default_receipt_interval_ms")]
    pub receipt_interval_ms: u64,
}

impl ChainConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::prefixed("ALIS_").from_env::<ChainConfig>()
    }

    pub fn base_url(&self) -> String {
        format!(
            "https://{}/{}",
            self.private_chain_execute_api_host, self.private_chain_stage
        )
    }

    pub fn poll_settings(&self) -> PollSettings {
        PollSettings {
            max_attempts: self.receipt_max_attempts,
            interval: Duration::from_millis(self.receipt_interval_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_applied() {
        let vars = vec![
            (
                "PRIVATE_CHAIN_EXECUTE_API_HOST".to_string(),
                "gateway.example.com".to_string(),
            ),
            (
                "TOKEN_CONTRACT_ADDRESS".to_string(),
                "0x1111111111111111111111111111111111111111".to_string(),
            ),
            (
                "BRIDGE_CONTRACT_ADDRESS".to_string(),
                "0x2222222222222222222222222222222222222222".to_string(),
            ),
        ];

        let config: ChainConfig = envy::from_iter(vars).unwrap();
        assert_eq!(config.base_url(), "https://gateway.example.com/production");
        assert_eq!(config.private_chain_id, None);

        let poll = config.poll_settings();
        assert_eq!(poll.max_attempts, 5);
        assert_eq!(poll.interval, Duration::from_secs(1));
    }
}
