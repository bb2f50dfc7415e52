//! Tracing setup and log-safe formatting helpers

use crate::config::{LogFormat, LoggingConfig};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Installs the global subscriber. `RUST_LOG` takes precedence over `LOG_LEVEL`.
pub fn init_tracing(config: &LoggingConfig) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "{},hyper=warn,reqwest=warn,tower_http=info",
            config.level.to_lowercase()
        ))
    });

    let registry = tracing_subscriber::registry().with(env_filter);

    let result = match config.format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_target(true),
            )
            .try_init(),
        LogFormat::Plain => registry
            .with(fmt::layer().with_target(true).with_thread_ids(false))
            .try_init(),
    };

    // A second init (tests, embedding) keeps the existing subscriber.
    if let Err(e) = result {
        eprintln!("tracing subscriber already initialized: {}", e);
    }
}

/// Shortens a wallet address to its first and last four characters.
pub fn mask_wallet_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }

    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}
