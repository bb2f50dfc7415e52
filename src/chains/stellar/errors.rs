use serde_json::Value as JsonValue;
use thiserror::Error;

pub type StellarResult<T> = Result<T, StellarError>;

#[derive(Debug, Error)]
pub enum StellarError {
    #[error("Account not found: {address}")]
    AccountNotFound { address: String },

    #[error("Invalid Stellar address: {address}")]
    InvalidAddress { address: String },

    #[error("Network error: {message}")]
    NetworkError { message: String },

    #[error("Rate limit exceeded. Please try again later")]
    RateLimitError,

    #[error("Timeout error: operation timed out after {seconds} seconds")]
    TimeoutError { seconds: u64 },

    #[error("Transaction rejected by network (status {status}): {reason}")]
    TransactionRejected {
        status: u16,
        reason: String,
        problem: JsonValue,
    },

    /// The submission may or may not have been applied by the network.
    #[error("Transaction submission status unknown: {message}")]
    SubmissionStatusUnknown { message: String },

    #[error("Serialization error: {message}")]
    SerializationError { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Signing error: {message}")]
    SigningError { message: String },
}

impl StellarError {
    pub fn account_not_found(address: impl Into<String>) -> Self {
        Self::AccountNotFound {
            address: address.into(),
        }
    }

    pub fn invalid_address(address: impl Into<String>) -> Self {
        Self::InvalidAddress {
            address: address.into(),
        }
    }

    pub fn network_error(message: impl Into<String>) -> Self {
        Self::NetworkError {
            message: message.into(),
        }
    }

    pub fn timeout_error(seconds: u64) -> Self {
        Self::TimeoutError { seconds }
    }

    /// Builds a rejection from the Horizon problem document, pulling the
    /// transaction and operation result codes into the message.
    pub fn transaction_rejected(status: u16, problem: JsonValue) -> Self {
        let reason = rejection_reason(&problem);
        Self::TransactionRejected {
            status,
            reason,
            problem,
        }
    }

    pub fn submission_status_unknown(message: impl Into<String>) -> Self {
        Self::SubmissionStatusUnknown {
            message: message.into(),
        }
    }

    pub fn serialization_error(message: impl Into<String>) -> Self {
        Self::SerializationError {
            message: message.into(),
        }
    }

    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    pub fn signing_error(message: impl Into<String>) -> Self {
        Self::SigningError {
            message: message.into(),
        }
    }
}

fn rejection_reason(problem: &JsonValue) -> String {
    let codes = problem.get("extras").and_then(|e| e.get("result_codes"));

    let mut parts = Vec::new();
    if let Some(tx_code) = codes
        .and_then(|c| c.get("transaction"))
        .and_then(|v| v.as_str())
    {
        parts.push(tx_code.to_string());
    }
    if let Some(op_codes) = codes
        .and_then(|c| c.get("operations"))
        .and_then(|v| v.as_array())
    {
        parts.extend(op_codes.iter().filter_map(|v| v.as_str()).map(str::to_string));
    }

    if !parts.is_empty() {
        return parts.join(", ");
    }

    problem
        .get("title")
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| "unknown rejection".to_string())
}
