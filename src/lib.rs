//! HTTP gateway to a single Stellar admin account: balance queries and
//! signed native payments.

pub mod api;
pub mod chains;
pub mod config;
pub mod error;
pub mod health;
pub mod logging;
pub mod middleware;
pub mod services;
