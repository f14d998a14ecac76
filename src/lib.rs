pub mod config;
pub mod device;
pub mod errors;
pub mod executor;
pub mod perception;

/// Install the global tracing subscriber.
///
/// Loads `.env` first so `RUST_LOG` can live there. Output goes to stderr;
/// stdout is reserved for JSON results.
pub fn init_tracing(default_level: &str) {
    // Load .env file if present (ignore error if not found)
    let _ = dotenvy::dotenv();

    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .try_init();
}
