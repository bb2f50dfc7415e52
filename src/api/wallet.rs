use crate::chains::stellar::payment::{IntentError, PaymentIntent};
use crate::error::AppError;
use crate::health::HealthChecker;
use crate::services::AdminWalletService;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct WalletState {
    pub service: Arc<AdminWalletService>,
    pub health_checker: HealthChecker,
}

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub balance: String,
}

#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    pub result: JsonValue,
}

/// `GET /` and `POST /` on the admin wallet, plus `/health`.
pub fn router(state: WalletState) -> Router {
    Router::new()
        .route(
            "/",
            get(get_balance)
                .post(send_payment)
                .head(method_not_allowed)
                .fallback(method_not_allowed),
        )
        .route("/health", get(health))
        .with_state(state)
}

pub async fn get_balance(
    State(state): State<WalletState>,
) -> Result<Json<BalanceResponse>, AppError> {
    info!("Admin balance requested");
    let balance = state.service.get_balance().await?;
    Ok(Json(BalanceResponse { balance }))
}

pub async fn send_payment(
    State(state): State<WalletState>,
    body: Bytes,
) -> Result<Json<PaymentResponse>, AppError> {
    let intent = parse_payment_body(&body)?;
    info!(amount = %intent.amount, "Admin payment requested");

    let result = state.service.send_payment(intent).await?;
    Ok(Json(PaymentResponse { result }))
}

pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

pub async fn health(State(state): State<WalletState>) -> Response {
    let status = state.health_checker.check_health().await;
    let code = if status.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (code, Json(status)).into_response()
}

/// Decodes `{"destination": "...", "amount": "..."}`. Only the amount may
/// also be a JSON number. No network access happens here.
fn parse_payment_body(body: &[u8]) -> Result<PaymentIntent, AppError> {
    let value: JsonValue = serde_json::from_slice(body)
        .map_err(|_| AppError::Validation("Invalid JSON body".to_string()))?;

    let fields = value.as_object().ok_or_else(invalid_body)?;

    let destination = string_field(fields.get("destination"))?;
    let amount = amount_field(fields.get("amount"))?;

    let (destination, amount) = match (destination, amount) {
        (Some(d), Some(a)) => (d, a),
        _ => return Err(missing_fields()),
    };

    PaymentIntent::new(&destination, &amount).map_err(|e| match e {
        IntentError::MissingField => missing_fields(),
        IntentError::InvalidAmount(reason) => {
            AppError::Validation(format!("Invalid amount: {}", reason))
        }
    })
}

fn string_field(value: Option<&JsonValue>) -> Result<Option<String>, AppError> {
    match value {
        None | Some(JsonValue::Null) => Ok(None),
        Some(JsonValue::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(invalid_body()),
    }
}

fn amount_field(value: Option<&JsonValue>) -> Result<Option<String>, AppError> {
    match value {
        Some(JsonValue::Number(n)) => Ok(Some(n.to_string())),
        other => string_field(other),
    }
}

fn invalid_body() -> AppError {
    AppError::Validation("Invalid request body".to_string())
}

fn missing_fields() -> AppError {
    AppError::Validation("Missing destination or amount".to_string())
}
