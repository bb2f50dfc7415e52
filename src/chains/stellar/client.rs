use crate::chains::stellar::{
    config::StellarConfig,
    errors::{StellarError, StellarResult},
    payment::SignedEnvelope,
    types::{is_valid_stellar_address, AccountSnapshot, HealthStatus, HorizonAccount},
};
use crate::chains::traits::{LedgerClient, SubmissionResult};
use crate::logging::mask_wallet_address;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

/// Network minimum per-operation fee, used when fee stats are unusable.
pub const MIN_BASE_FEE_STROOPS: u32 = 100;

/// Horizon-backed ledger client.
#[derive(Debug, Clone)]
pub struct StellarClient {
    http_client: Client,
    config: StellarConfig,
}

#[derive(Debug, Deserialize)]
struct FeeStatsResponse {
    last_ledger_base_fee: String,
}

impl StellarClient {
    pub fn new(config: StellarConfig) -> StellarResult<Self> {
        config
            .validate()
            .map_err(|e| StellarError::config_error(e.to_string()))?;

        let http_client = Client::builder()
            .timeout(config.request_timeout)
            .pool_max_idle_per_host(20)
            .user_agent(concat!("stellar-admin-wallet/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                StellarError::config_error(format!("Failed to create HTTP client: {}", e))
            })?;

        info!(
            "Stellar client initialized for {:?} network with URL: {}",
            config.network,
            config.horizon_url()
        );

        Ok(Self {
            http_client,
            config,
        })
    }

    pub async fn get_account(&self, address: &str) -> StellarResult<AccountSnapshot> {
        if !is_valid_stellar_address(address) {
            return Err(StellarError::invalid_address(address));
        }

        debug!(
            "Fetching account details for address: {}",
            mask_wallet_address(address)
        );

        let url = format!("{}/accounts/{}", self.config.horizon_url(), address);
        let response = self.read(&url, || StellarError::account_not_found(address)).await?;

        let account: HorizonAccount = response
            .json()
            .await
            .map_err(|e| StellarError::serialization_error(format!("JSON parsing error: {}", e)))?;

        let snapshot = AccountSnapshot::try_from(account)?;
        debug!(
            sequence = snapshot.sequence,
            balances = snapshot.balances.len(),
            "Fetched account {}",
            mask_wallet_address(address)
        );
        Ok(snapshot)
    }

    pub async fn get_base_fee(&self) -> StellarResult<u32> {
        let url = format!("{}/fee_stats", self.config.horizon_url());
        debug!("Fetching fee stats from Horizon: {}", url);

        let response = self
            .read(&url, || StellarError::network_error("fee_stats endpoint not found"))
            .await?;

        let fee_stats: FeeStatsResponse = response
            .json()
            .await
            .map_err(|e| StellarError::serialization_error(format!("JSON parsing error: {}", e)))?;

        let base_fee = match fee_stats.last_ledger_base_fee.parse::<u32>() {
            Ok(fee) if fee > 0 => fee,
            _ => {
                warn!(
                    reported = %fee_stats.last_ledger_base_fee,
                    "Unusable base fee from Horizon, using network minimum"
                );
                MIN_BASE_FEE_STROOPS
            }
        };

        debug!("Fetched base fee from Horizon: {} stroops", base_fee);
        Ok(base_fee)
    }

    pub async fn submit_transaction_xdr(&self, xdr_base64: &str) -> StellarResult<JsonValue> {
        let url = format!("{}/transactions", self.config.horizon_url());

        // From here on the envelope may reach the network, so every transport
        // failure leaves the outcome unknown.
        let response = timeout(
            self.config.request_timeout,
            self.http_client
                .post(&url)
                .header(
                    reqwest::header::CONTENT_TYPE,
                    "application/x-www-form-urlencoded",
                )
                .body(format!("tx={}", encode_form_component(xdr_base64)))
                .send(),
        )
        .await
        .map_err(|_| {
            StellarError::submission_status_unknown(format!(
                "no response from Horizon within {} seconds",
                self.config.request_timeout.as_secs()
            ))
        })?
        .map_err(|e| StellarError::submission_status_unknown(format!("Horizon submit error: {}", e)))?;

        let status = response.status();
        let body = response.text().await;

        if status.is_server_error() {
            return Err(StellarError::submission_status_unknown(format!(
                "Horizon returned status {} for submission",
                status
            )));
        }

        let body = body.map_err(|e| {
            StellarError::submission_status_unknown(format!("Horizon submit read error: {}", e))
        })?;

        if !status.is_success() {
            let problem = serde_json::from_str::<JsonValue>(&body)
                .unwrap_or_else(|_| serde_json::json!({ "status": status.as_u16(), "detail": body }));
            return Err(StellarError::transaction_rejected(status.as_u16(), problem));
        }

        serde_json::from_str::<JsonValue>(&body).map_err(|e| {
            StellarError::submission_status_unknown(format!(
                "Horizon accepted the request but its response was unreadable: {}",
                e
            ))
        })
    }

    pub async fn check_health(&self) -> HealthStatus {
        let start_time = Instant::now();
        let horizon_url = self.config.horizon_url();

        debug!(
            "Performing health check for Stellar Horizon at: {}",
            horizon_url
        );

        let health_timeout = std::cmp::max(self.config.request_timeout, Duration::from_secs(15));

        let result = timeout(
            health_timeout,
            self.http_client.get(format!("{}/", horizon_url)).send(),
        )
        .await;

        let response_time_ms = start_time.elapsed().as_millis() as u64;

        let error_message = match result {
            Ok(Ok(response)) if response.status().is_success() => None,
            Ok(Ok(response)) => Some(format!("HTTP status: {}", response.status())),
            Ok(Err(e)) => Some(format!("Request failed: {}", e)),
            Err(_) => Some(format!(
                "Request timed out after {} seconds",
                health_timeout.as_secs()
            )),
        };

        match &error_message {
            None => info!(
                "Stellar Horizon health check passed - Response time: {}ms",
                response_time_ms
            ),
            Some(message) => error!("Stellar Horizon health check failed: {}", message),
        }

        HealthStatus {
            is_healthy: error_message.is_none(),
            horizon_url: horizon_url.to_string(),
            response_time_ms,
            last_check: chrono::Utc::now().to_rfc3339(),
            error_message,
        }
    }

    async fn read<F>(&self, url: &str, not_found: F) -> StellarResult<reqwest::Response>
    where
        F: FnOnce() -> StellarError,
    {
        let response = timeout(self.config.request_timeout, self.http_client.get(url).send())
            .await
            .map_err(|_| StellarError::timeout_error(self.config.request_timeout.as_secs()))?
            .map_err(|e| {
                if e.is_timeout() {
                    StellarError::timeout_error(self.config.request_timeout.as_secs())
                } else {
                    StellarError::network_error(format!("Horizon API error: {}", e))
                }
            })?;

        match response.status() {
            status if status.is_success() => Ok(response),
            StatusCode::NOT_FOUND => Err(not_found()),
            StatusCode::TOO_MANY_REQUESTS => Err(StellarError::RateLimitError),
            status => Err(StellarError::network_error(format!(
                "Horizon API error: status {}",
                status
            ))),
        }
    }
}

#[async_trait]
impl LedgerClient for StellarClient {
    async fn load_account(&self, address: &str) -> StellarResult<AccountSnapshot> {
        self.get_account(address).await
    }

    async fn fetch_base_fee(&self) -> StellarResult<u32> {
        self.get_base_fee().await
    }

    async fn submit(&self, envelope: &SignedEnvelope) -> StellarResult<SubmissionResult> {
        let xdr = envelope.to_xdr_base64()?;
        info!(
            tx_hash = %envelope.hash_hex(),
            sequence = envelope.payment.sequence,
            "Submitting transaction to Horizon"
        );
        self.submit_transaction_xdr(&xdr).await
    }

    async fn health_check(&self) -> StellarResult<HealthStatus> {
        Ok(self.check_health().await)
    }
}

fn encode_form_component(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    for &b in input.as_bytes() {
        if b.is_ascii_alphanumeric() || b"-_.~".contains(&b) {
            output.push(char::from(b));
        } else {
            output.push('%');
            output.push(hex_char((b >> 4) & 0x0F));
            output.push(hex_char(b & 0x0F));
        }
    }
    output
}

fn hex_char(nibble: u8) -> char {
    match nibble {
        0..=9 => (b'0' + nibble) as char,
        10..=15 => (b'A' + nibble - 10) as char,
        _ => '0',
    }
}
