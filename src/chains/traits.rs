use crate::chains::stellar::errors::StellarResult;
use crate::chains::stellar::payment::SignedEnvelope;
use crate::chains::stellar::types::{AccountSnapshot, HealthStatus};
use async_trait::async_trait;
use serde_json::Value as JsonValue;

/// Network response for an accepted transaction, passed through untouched.
pub type SubmissionResult = JsonValue;

/// Everything the wallet service needs from the remote ledger. Implementations
/// do I/O only; no retries, no interpretation of rejections.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Fresh read of the account; never served from a cache.
    async fn load_account(&self, address: &str) -> StellarResult<AccountSnapshot>;

    /// Current per-operation base fee in stroops.
    async fn fetch_base_fee(&self) -> StellarResult<u32>;

    /// Submits a signed envelope once.
    ///
    /// `TransactionRejected` means the network refused it and nothing was applied.
    /// `SubmissionStatusUnknown` means it may have been applied; callers must not
    /// blindly resubmit. `SerializationError` means nothing was sent.
    async fn submit(&self, envelope: &SignedEnvelope) -> StellarResult<SubmissionResult>;

    async fn health_check(&self) -> StellarResult<HealthStatus>;
}
