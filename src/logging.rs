use std::env;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Logs to stderr so listings on stdout stay machine readable.
pub fn init_logger() {
    let filter = env::var("TRACING_LEVEL").unwrap_or_else(|_| "info".to_string());

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time(),
        )
        .with(EnvFilter::new(filter))
        .init();
}
