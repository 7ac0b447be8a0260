use thiserror::Error;

pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("invalid proxy server: {0}")]
    InvalidProxy(String),
    #[error("invalid allowlist: {0}")]
    InvalidAllowlist(String),
    #[error("autostart error: {0}")]
    Autostart(String),
    #[error("window host error: {0}")]
    Host(String),
    #[error("no window")]
    NoWindow,
}
