use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures of the watch pipeline.
///
/// Only `Configuration` is fatal, and only to the watcher being started.
/// The per-item variants are logged and the item is skipped; a
/// `Resolution` failure is turned into an error-bearing result instead.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    Configuration(String),
    #[error("Cannot get a reliable tag for image reference {0}")]
    UnresolvableImageReference(String),
    #[error("No registry provider found for image {0}")]
    ProviderUnavailable(String),
    #[error("Resolution failed: {0}")]
    Resolution(String),
    #[error("Store error: {0}")]
    Store(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
