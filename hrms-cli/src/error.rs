use hrms_client::{AuthError, GatewayError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Client(#[from] hrms_client::Error),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not logged in. Run `hrms login` first.")]
    NotLoggedIn,
}

impl CliError {
    /// The stored session is gone and the user has to log in again.
    pub fn requires_relogin(&self) -> bool {
        match self {
            Self::NotLoggedIn => true,
            Self::Gateway(e) | Self::Auth(AuthError::Gateway(e)) => e.requires_relogin(),
            Self::Client(e) => e.requires_relogin(),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, CliError>;
