//! Crate-wide error types.

use thiserror::Error;

use crate::auth::AuthError;
use crate::gateway::GatewayError;
use crate::session::StoreError;

/// Crate-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Crate-wide error type.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Credential store error: {0}")]
    Store(#[from] StoreError),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Whether the caller has to log in again before retrying.
    pub fn requires_relogin(&self) -> bool {
        match self {
            Self::Gateway(e) => e.requires_relogin(),
            Self::Auth(AuthError::Gateway(e)) => e.requires_relogin(),
            Self::Auth(AuthError::InvalidCredentials(_)) => true,
            _ => false,
        }
    }
}
