//! Health check module
//! Reports reachability of the ledger API the gateway depends on

use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{error, info};

use crate::chains::traits::LedgerClient;

const CHECK_TIMEOUT: Duration = Duration::from_secs(20);

/// Health status response
#[derive(Debug, Serialize, Clone)]
pub struct HealthStatus {
    pub status: HealthState,
    pub checks: HashMap<String, ComponentHealth>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub enum HealthState {
    Healthy,
    Unhealthy,
}

/// Individual component health status
#[derive(Debug, Serialize, Clone)]
pub struct ComponentHealth {
    pub status: ComponentState,
    pub response_time_ms: Option<u64>,
    pub details: Option<String>,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub enum ComponentState {
    Up,
    Down,
}

impl HealthStatus {
    pub fn new() -> Self {
        Self {
            status: HealthState::Healthy,
            checks: HashMap::new(),
            timestamp: chrono::Utc::now(),
        }
    }

    pub fn is_healthy(&self) -> bool {
        matches!(self.status, HealthState::Healthy)
    }
}

impl Default for HealthStatus {
    fn default() -> Self {
        Self::new()
    }
}

impl ComponentHealth {
    pub fn up(response_time_ms: Option<u64>) -> Self {
        Self {
            status: ComponentState::Up,
            response_time_ms,
            details: None,
        }
    }

    pub fn down(details: Option<String>) -> Self {
        Self {
            status: ComponentState::Down,
            response_time_ms: None,
            details,
        }
    }
}

#[derive(Clone)]
pub struct HealthChecker {
    ledger: Arc<dyn LedgerClient>,
}

impl HealthChecker {
    pub fn new(ledger: Arc<dyn LedgerClient>) -> Self {
        Self { ledger }
    }

    pub async fn check_health(&self) -> HealthStatus {
        let mut health_status = HealthStatus::new();

        let component = match timeout(CHECK_TIMEOUT, self.ledger.health_check()).await {
            Ok(Ok(status)) if status.is_healthy => {
                info!("Horizon health check: OK ({}ms)", status.response_time_ms);
                ComponentHealth::up(Some(status.response_time_ms))
            }
            Ok(Ok(status)) => {
                error!(
                    "Horizon health check failed: {}",
                    status.error_message.as_deref().unwrap_or("unknown error")
                );
                ComponentHealth::down(status.error_message)
            }
            Ok(Err(e)) => {
                error!("Horizon health check failed: {}", e);
                ComponentHealth::down(Some(e.to_string()))
            }
            Err(_) => {
                error!("Horizon health check timed out");
                ComponentHealth::down(Some("Timeout".to_string()))
            }
        };

        if component.status == ComponentState::Down {
            health_status.status = HealthState::Unhealthy;
        }
        health_status
            .checks
            .insert("stellar_horizon".to_string(), component);

        health_status
    }
}
