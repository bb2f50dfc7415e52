use stellar_admin_wallet::api::wallet::{router, WalletState};
use stellar_admin_wallet::chains::stellar::client::StellarClient;
use stellar_admin_wallet::chains::stellar::keys::AdminKeypair;
use stellar_admin_wallet::chains::traits::LedgerClient;
use stellar_admin_wallet::config::AppConfig;
use stellar_admin_wallet::health::HealthChecker;
use stellar_admin_wallet::logging::{init_tracing, mask_wallet_address};
use stellar_admin_wallet::middleware::logging::{request_logging_middleware, UuidRequestId};
use stellar_admin_wallet::services::AdminWalletService;

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tracing::{error, info, warn};

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    init_tracing(&config.logging);

    config.validate().map_err(|e| {
        error!("Invalid configuration: {}", e);
        e
    })?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        network = ?config.stellar.network,
        horizon_url = %config.stellar.horizon_url(),
        "Starting Stellar admin wallet gateway"
    );

    match (&config.admin.public_address, &config.admin.secret) {
        (Some(public), Some(secret)) => {
            let keypair = AdminKeypair::from_secret(secret)?;
            if keypair.public_address() != public {
                warn!(
                    configured = %mask_wallet_address(public),
                    derived = %mask_wallet_address(keypair.public_address()),
                    "ADMIN_STELLAR_PUBLIC does not match the secret key; payments are signed by the derived account"
                );
            }
        }
        (None, None) => warn!("No admin credentials configured; wallet requests will fail"),
        (None, Some(_)) => info!("Admin address derived from the configured secret key"),
        (Some(_), None) => warn!("ADMIN_STELLAR_SECRET not set; payments are disabled"),
    }

    let stellar_client = StellarClient::new(config.stellar.clone()).map_err(|e| {
        error!("Failed to initialize Stellar client: {}", e);
        e
    })?;

    let health_status = stellar_client.check_health().await;
    if health_status.is_healthy {
        info!(
            response_time_ms = health_status.response_time_ms,
            "Stellar Horizon is reachable"
        );
    } else {
        warn!(
            error = health_status.error_message.as_deref().unwrap_or("unknown error"),
            "Stellar Horizon is not reachable at startup"
        );
    }

    let ledger: Arc<dyn LedgerClient> = Arc::new(stellar_client);
    let service = AdminWalletService::new(
        ledger.clone(),
        config.admin.clone(),
        config.stellar.network,
        config.stellar.transaction_timeout,
    );

    let app = router(WalletState {
        service: Arc::new(service),
        health_checker: HealthChecker::new(ledger),
    })
    .layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
            .layer(axum::middleware::from_fn(request_logging_middleware))
            .layer(PropagateRequestIdLayer::x_request_id()),
    );

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
        error!("Failed to bind to address {}: {}", addr, e);
        e
    })?;

    info!(address = %addr, "Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");

    Ok(())
}
