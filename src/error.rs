//! Application-wide error types.

use thiserror::Error;

use crate::embeddings::ProviderError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),

    #[error("logger error: {0}")]
    Logger(String),

    /// A record could not be turned into fragments. Fatal at build time:
    /// skipping it would desynchronize fragment and embedding indices.
    #[error("data integrity error: {0}")]
    DataIntegrity(String),

    #[error("record store error: {0}")]
    Store(String),

    #[error("embedding provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
