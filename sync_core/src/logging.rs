//! Logging utilities for connector-wide output to stdout.
//!

// Re-exports for convenience
pub use tracing::metadata::LevelFilter;
pub use tracing::{debug, error, info, warn};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{util::SubscriberInitExt, Layer};

/// Filter used when `RUST_LOG` is unset. Covers the framework and the
/// connector.
const DEFAULT_DIRECTIVES: &str = "sync_core=debug,sync_azure_devops=debug";

/// Set up basic logging. Calling this more than once keeps the first
/// subscriber.
pub fn setup(level: Option<LevelFilter>) {
    // The user can specify a log level via an env var
    // (such as for testing).
    let env = std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_DIRECTIVES.into());
    let mut logging_layers = vec![tracing_subscriber::EnvFilter::new(env).boxed()];

    // The input level overrides any env vars.
    let layer = tracing_subscriber::fmt::layer()
        .with_filter(level.unwrap_or(LevelFilter::INFO))
        .boxed();
    logging_layers.push(layer);

    if tracing_subscriber::registry()
        .with(logging_layers)
        .try_init()
        .is_err()
    {
        debug!("logging already set up");
        return;
    }

    debug!("logging set up");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setup_twice_does_not_panic() {
        setup(Some(LevelFilter::DEBUG));
        setup(None);
    }

    #[test]
    fn default_filter_keeps_framework_errors() {
        let filter = tracing_subscriber::EnvFilter::new(DEFAULT_DIRECTIVES);
        let subscriber = tracing_subscriber::registry().with(filter);
        tracing::subscriber::with_default(subscriber, || {
            assert!(tracing::enabled!(
                target: "sync_core::connectors::collect",
                tracing::Level::ERROR
            ));
            assert!(tracing::enabled!(
                target: "sync_azure_devops::rest",
                tracing::Level::DEBUG
            ));
            assert!(!tracing::enabled!(target: "hyper::proto", tracing::Level::DEBUG));
        });
    }
}
