use crate::chains::stellar::{
    config::StellarNetwork,
    errors::StellarError,
    keys::AdminKeypair,
    payment::{PaymentEnvelope, PaymentIntent},
};
use crate::chains::traits::{LedgerClient, SubmissionResult};
use crate::config::AdminConfig;
use crate::error::AppError;
use crate::logging::mask_wallet_address;
use serde_json::json;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};

/// Balance queries and payments for the single configured admin account.
///
/// Holds no mutable state. Every payment re-reads the account sequence, so
/// concurrent payments race on the ledger and the loser comes back rejected
/// with `tx_bad_seq`.
pub struct AdminWalletService {
    ledger: Arc<dyn LedgerClient>,
    admin: AdminConfig,
    network: StellarNetwork,
    transaction_timeout: Duration,
}

impl AdminWalletService {
    pub fn new(
        ledger: Arc<dyn LedgerClient>,
        admin: AdminConfig,
        network: StellarNetwork,
        transaction_timeout: Duration,
    ) -> Self {
        Self {
            ledger,
            admin,
            network,
            transaction_timeout,
        }
    }

    /// Native balance of the admin account, exactly as the ledger reports it.
    pub async fn get_balance(&self) -> Result<String, AppError> {
        let address = self.balance_address()?;
        debug!(
            address = %mask_wallet_address(&address),
            "Loading admin account balance"
        );

        let snapshot = self.ledger.load_account(&address).await?;
        let balance = snapshot
            .native_balance()
            .map_err(|e| AppError::Protocol(e.to_string()))?;

        Ok(balance.to_string())
    }

    /// Builds, signs and submits one native payment. Never retries.
    pub async fn send_payment(&self, intent: PaymentIntent) -> Result<SubmissionResult, AppError> {
        let keypair = self.signing_keypair()?;
        let source = keypair.public_address().to_string();

        let snapshot = self.ledger.load_account(&source).await?;
        let base_fee = self.ledger.fetch_base_fee().await?;

        let envelope = PaymentEnvelope::native_payment(
            &snapshot,
            base_fee,
            &intent,
            self.transaction_timeout,
            unix_now(),
        )
        .map_err(|e| match e {
            StellarError::InvalidAddress { address } => invalid_destination(&address),
            other => AppError::from(other),
        })?;

        info!(
            source = %mask_wallet_address(&source),
            destination = %mask_wallet_address(&intent.destination),
            amount = %intent.amount,
            sequence = envelope.sequence,
            fee = envelope.fee,
            "Submitting admin payment"
        );

        let signed = envelope.sign(&keypair, self.network)?;
        let tx_hash = signed.hash_hex();

        match self.ledger.submit(&signed).await {
            Ok(result) => {
                info!(tx_hash = %tx_hash, "Admin payment accepted");
                Ok(result)
            }
            Err(StellarError::TransactionRejected {
                status,
                reason,
                problem,
            }) => {
                warn!(tx_hash = %tx_hash, status, reason = %reason, "Admin payment rejected");
                Err(AppError::Rejected {
                    message: format!("Transaction rejected: {}", reason),
                    problem,
                })
            }
            // Encoding failed before the request was sent.
            Err(e @ StellarError::SerializationError { .. }) => {
                warn!(tx_hash = %tx_hash, error = %e, "Admin payment not submitted");
                Err(AppError::Protocol(format!(
                    "Transaction {} was not submitted: {}",
                    tx_hash, e
                )))
            }
            // Past this point the envelope may be on the ledger.
            Err(e) => {
                warn!(tx_hash = %tx_hash, error = %e, "Admin payment outcome unknown");
                Err(AppError::SubmissionStatusUnknown(format!(
                    "Submission status unknown for transaction {}: {}",
                    tx_hash, e
                )))
            }
        }
    }

    fn balance_address(&self) -> Result<String, AppError> {
        if let Some(address) = self.admin.public_address() {
            return Ok(address.to_string());
        }
        match &self.admin.secret {
            Some(_) => Ok(self.signing_keypair()?.public_address().to_string()),
            None => Err(AppError::Configuration(
                "Admin account address is not configured".to_string(),
            )),
        }
    }

    fn signing_keypair(&self) -> Result<AdminKeypair, AppError> {
        let secret = self.admin.secret.as_ref().ok_or_else(|| {
            AppError::Configuration("Admin secret key is not configured".to_string())
        })?;
        AdminKeypair::from_secret(secret)
            .map_err(|_| AppError::Configuration("Admin secret key is malformed".to_string()))
    }
}

/// The ledger cannot decode the destination, so the payment is refused the
/// way the network would refuse it. Nothing is signed or submitted.
fn invalid_destination(address: &str) -> AppError {
    warn!(
        destination = %mask_wallet_address(address),
        "Admin payment refused: destination is not a valid account"
    );
    AppError::Rejected {
        message: "Transaction rejected: invalid destination".to_string(),
        problem: json!({
            "title": "Invalid Destination",
            "detail": "invalid destination",
        }),
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
