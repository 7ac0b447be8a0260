use tracing_subscriber::{fmt, EnvFilter};

/// Console logging, used when the file log cannot be opened.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).try_init();
}
