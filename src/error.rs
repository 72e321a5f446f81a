use thiserror::Error;

/// Failures of the snapshot store.
///
/// Read-side failures never escape `Clicker::load`; they are logged and turned
/// into a fresh game. Write-side failures are returned to the caller.
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("snapshot io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("snapshot encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
    #[error("snapshot version {saved} is older than the minimum compatible {min}")]
    Incompatible { saved: u32, min: u32 },
    #[error("snapshot rejected: {0}")]
    Invalid(String),
}

/// Failures reading a config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),
}
