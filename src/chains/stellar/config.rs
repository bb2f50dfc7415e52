use crate::config::ConfigError;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

pub const TESTNET_HORIZON_URL: &str = "https://horizon-testnet.stellar.org";
pub const MAINNET_HORIZON_URL: &str = "https://horizon.stellar.org";
pub const TESTNET_PASSPHRASE: &str = "Test SDF Network ; September 2015";
pub const MAINNET_PASSPHRASE: &str = "Public Global Stellar Network ; September 2015";

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;
const DEFAULT_TRANSACTION_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StellarNetwork {
    Testnet,
    Mainnet,
}

impl StellarNetwork {
    pub fn horizon_url(&self) -> &'static str {
        match self {
            StellarNetwork::Testnet => TESTNET_HORIZON_URL,
            StellarNetwork::Mainnet => MAINNET_HORIZON_URL,
        }
    }

    /// Passphrase hashed into every transaction signature payload. A signature
    /// made for one network is rejected by the other.
    pub fn network_passphrase(&self) -> &'static str {
        match self {
            StellarNetwork::Testnet => TESTNET_PASSPHRASE,
            StellarNetwork::Mainnet => MAINNET_PASSPHRASE,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "testnet" | "test" => Some(StellarNetwork::Testnet),
            "mainnet" | "public" | "pubnet" => Some(StellarNetwork::Mainnet),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StellarConfig {
    pub network: StellarNetwork,
    pub horizon_url_override: Option<String>,
    pub request_timeout: Duration,
    /// Upper bound of the validity window stamped on every envelope.
    pub transaction_timeout: Duration,
}

impl Default for StellarConfig {
    fn default() -> Self {
        Self {
            network: StellarNetwork::Testnet,
            horizon_url_override: None,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            transaction_timeout: Duration::from_secs(DEFAULT_TRANSACTION_TIMEOUT_SECS),
        }
    }
}

impl StellarConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let raw_network = env::var("STELLAR_NETWORK").unwrap_or_else(|_| "testnet".to_string());
        let network = StellarNetwork::parse(&raw_network)
            .ok_or_else(|| ConfigError::InvalidValue(format!("STELLAR_NETWORK={}", raw_network)))?;

        let horizon_url_override = env::var("STELLAR_HORIZON_URL")
            .ok()
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty());

        let request_timeout = env::var("STELLAR_REQUEST_TIMEOUT")
            .unwrap_or_else(|_| DEFAULT_REQUEST_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidValue("STELLAR_REQUEST_TIMEOUT".to_string()))?;

        let transaction_timeout = env::var("STELLAR_TX_TIMEOUT")
            .unwrap_or_else(|_| DEFAULT_TRANSACTION_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidValue("STELLAR_TX_TIMEOUT".to_string()))?;

        let config = Self {
            network,
            horizon_url_override,
            request_timeout: Duration::from_secs(request_timeout),
            transaction_timeout: Duration::from_secs(transaction_timeout),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(url) = &self.horizon_url_override {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ConfigError::InvalidValue(
                    "STELLAR_HORIZON_URL must be a valid URL".to_string(),
                ));
            }
        }

        if self.request_timeout.is_zero() {
            return Err(ConfigError::InvalidValue(
                "STELLAR_REQUEST_TIMEOUT".to_string(),
            ));
        }

        if self.transaction_timeout.is_zero() {
            return Err(ConfigError::InvalidValue("STELLAR_TX_TIMEOUT".to_string()));
        }

        Ok(())
    }

    pub fn horizon_url(&self) -> &str {
        self.horizon_url_override
            .as_deref()
            .unwrap_or_else(|| self.network.horizon_url())
    }
}
