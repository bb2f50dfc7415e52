pub mod client;
pub mod config;
pub mod errors;
pub mod keys;
pub mod payment;
pub mod types;
