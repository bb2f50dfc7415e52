//! Services module for business logic

pub mod admin_wallet;

pub use admin_wallet::AdminWalletService;
