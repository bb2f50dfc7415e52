//! Handler-boundary error type for the admin wallet gateway
//!
//! Every failure a request can end in is one `AppError` variant. Each variant
//! carries a fixed HTTP status, a stable machine-readable code and a
//! retryability hint, and renders as a JSON body of the form
//! `{"error": "...", "code": "...", "retryable": bool, "details": ...}`.

use crate::chains::stellar::errors::StellarError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Machine-readable error codes for programmatic handling
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ErrorCode {
    #[serde(rename = "VALIDATION_ERROR")]
    ValidationError,
    #[serde(rename = "CONFIGURATION_ERROR")]
    ConfigurationError,
    #[serde(rename = "ACCOUNT_NOT_FOUND")]
    AccountNotFound,
    #[serde(rename = "NETWORK_ERROR")]
    NetworkError,
    #[serde(rename = "TRANSACTION_REJECTED")]
    TransactionRejected,
    #[serde(rename = "SUBMISSION_STATUS_UNKNOWN")]
    SubmissionStatusUnknown,
    #[serde(rename = "PROTOCOL_ERROR")]
    ProtocolError,
    #[serde(rename = "METHOD_NOT_ALLOWED")]
    MethodNotAllowed,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Bad caller input. Never retried automatically.
    #[error("{0}")]
    Validation(String),

    /// Missing or malformed deployment secrets.
    #[error("{0}")]
    Configuration(String),

    #[error("{0}")]
    NotFound(String),

    /// Read-path connectivity failure. Nothing was submitted.
    #[error("{0}")]
    Network(String),

    /// The ledger refused the transaction; `problem` is its document as received.
    #[error("{message}")]
    Rejected { message: String, problem: JsonValue },

    /// A submission was attempted and its outcome is unknown.
    #[error("{0}")]
    SubmissionStatusUnknown(String),

    /// The ledger answered with something this service cannot interpret.
    #[error("{0}")]
    Protocol(String),

    #[error("Method not allowed")]
    MethodNotAllowed,
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::Configuration(_)
            | AppError::NotFound(_)
            | AppError::Network(_)
            | AppError::Rejected { .. }
            | AppError::SubmissionStatusUnknown(_)
            | AppError::Protocol(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> ErrorCode {
        match self {
            AppError::Validation(_) => ErrorCode::ValidationError,
            AppError::Configuration(_) => ErrorCode::ConfigurationError,
            AppError::NotFound(_) => ErrorCode::AccountNotFound,
            AppError::Network(_) => ErrorCode::NetworkError,
            AppError::Rejected { .. } => ErrorCode::TransactionRejected,
            AppError::SubmissionStatusUnknown(_) => ErrorCode::SubmissionStatusUnknown,
            AppError::Protocol(_) => ErrorCode::ProtocolError,
            AppError::MethodNotAllowed => ErrorCode::MethodNotAllowed,
        }
    }

    /// Whether repeating the request with fresh ledger state is safe.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::Rejected { .. } | AppError::Network(_))
    }
}

/// Standardized error body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: ErrorCode,
    pub retryable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<JsonValue>,
}

impl ErrorResponse {
    pub fn from_app_error(error: &AppError) -> Self {
        let details = match error {
            AppError::Rejected { problem, .. } => Some(problem.clone()),
            _ => None,
        };

        Self {
            error: error.to_string(),
            code: error.error_code(),
            retryable: error.is_retryable(),
            details,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(
                error = %self,
                code = ?self.error_code(),
                status = status.as_u16(),
                "Server error occurred"
            );
        } else {
            tracing::warn!(
                error = %self,
                code = ?self.error_code(),
                status = status.as_u16(),
                "Client error occurred"
            );
        }

        (status, Json(ErrorResponse::from_app_error(&self))).into_response()
    }
}

/// Read-path mapping. The payment service classifies submit failures itself.
impl From<StellarError> for AppError {
    fn from(err: StellarError) -> Self {
        match err {
            StellarError::AccountNotFound { address } => {
                AppError::NotFound(format!("Account not found: {}", address))
            }
            StellarError::InvalidAddress { address } => {
                AppError::Validation(format!("Invalid destination address: {}", address))
            }
            e @ (StellarError::NetworkError { .. }
            | StellarError::RateLimitError
            | StellarError::TimeoutError { .. }) => AppError::Network(e.to_string()),
            StellarError::TransactionRejected {
                reason, problem, ..
            } => AppError::Rejected {
                message: format!("Transaction rejected: {}", reason),
                problem,
            },
            e @ StellarError::SubmissionStatusUnknown { .. } => {
                AppError::SubmissionStatusUnknown(e.to_string())
            }
            e @ StellarError::SerializationError { .. } => AppError::Protocol(e.to_string()),
            e @ (StellarError::ConfigError { .. } | StellarError::SigningError { .. }) => {
                AppError::Configuration(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::Validation("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::MethodNotAllowed.status_code(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(
            AppError::NotFound("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::SubmissionStatusUnknown("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_rejected_and_unknown_are_distinguishable() {
        let rejected = AppError::from(StellarError::transaction_rejected(
            400,
            json!({"extras": {"result_codes": {"transaction": "tx_bad_seq"}}}),
        ));
        let unknown = AppError::from(StellarError::submission_status_unknown("timed out"));

        assert_eq!(rejected.error_code(), ErrorCode::TransactionRejected);
        assert_eq!(unknown.error_code(), ErrorCode::SubmissionStatusUnknown);
        assert!(rejected.is_retryable());
        assert!(!unknown.is_retryable());
    }

    #[test]
    fn test_rejection_details_are_passed_through() {
        let problem = json!({"title": "Transaction Failed", "status": 400});
        let err = AppError::Rejected {
            message: "Transaction rejected: Transaction Failed".into(),
            problem: problem.clone(),
        };
        let body = serde_json::to_value(ErrorResponse::from_app_error(&err)).unwrap();

        assert_eq!(body["code"], "TRANSACTION_REJECTED");
        assert_eq!(body["details"], problem);
    }

    #[test]
    fn test_method_not_allowed_body() {
        let body = serde_json::to_value(ErrorResponse::from_app_error(&AppError::MethodNotAllowed))
            .unwrap();
        assert_eq!(body["error"], "Method not allowed");
        assert!(body.get("details").is_none());
    }

    #[test]
    fn test_stellar_error_mapping() {
        assert!(matches!(
            AppError::from(StellarError::account_not_found("GABC")),
            AppError::NotFound(_)
        ));
        assert!(matches!(
            AppError::from(StellarError::timeout_error(15)),
            AppError::Network(_)
        ));
        assert!(matches!(
            AppError::from(StellarError::serialization_error("bad")),
            AppError::Protocol(_)
        ));
    }
}
