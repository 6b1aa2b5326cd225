//! Gateway error types.

use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;

use crate::session::SessionEndReason;

/// Longest backend message carried in [`GatewayError::Rejected`].
const MAX_MESSAGE_LEN: usize = 512;

/// Errors surfaced by [`Gateway::send`](super::Gateway::send).
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Network or connection failure.
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A 401 that was not recovered: the request was already retried, or it
    /// targeted a credential exchange route.
    #[error("Authentication expired for {path}")]
    AuthenticationExpired { path: String },

    /// The refresh episode failed - re-login required.
    #[error("Session ended: {0}")]
    SessionEnded(SessionEndReason),

    /// Any other non-success status, passed through unchanged.
    #[error("Request rejected with {status}: {message}")]
    Rejected { status: StatusCode, message: String },

    /// A success body that did not match the expected shape.
    #[error("Failed to decode response from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl GatewayError {
    /// HTTP status behind this error, if one was received.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::AuthenticationExpired { .. } => Some(StatusCode::UNAUTHORIZED),
            Self::Rejected { status, .. } => Some(*status),
            Self::Transport(e) => e.status(),
            _ => None,
        }
    }

    /// Check if this error requires manual re-login.
    pub fn requires_relogin(&self) -> bool {
        matches!(
            self,
            Self::SessionEnded(_) | Self::AuthenticationExpired { .. }
        )
    }

    #[inline]
    pub fn is_session_ended(&self) -> bool {
        matches!(self, Self::SessionEnded(_))
    }
}

/// Errors from one refresh exchange. Every variant ends the session.
#[derive(Debug, Error)]
pub enum RefreshError {
    #[error("No refresh token available")]
    MissingRefreshToken,

    #[error("Refresh rejected with {status}")]
    Rejected { status: StatusCode },

    #[error("Malformed refresh response: {0}")]
    Malformed(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Refresh timed out after {0:?}")]
    TimedOut(Duration),

    #[error("Invalid refresh endpoint: {0}")]
    Endpoint(#[from] url::ParseError),
}

/// Extract a human-readable message from an error body.
///
/// Prefers the JSON `message` (or `error`) field the backend uses, falling
/// back to the raw text.
pub(crate) fn rejection_message(body: &[u8]) -> String {
    let from_json = serde_json::from_slice::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            ["message", "error"]
                .iter()
                .find_map(|key| v.get(key).and_then(|m| m.as_str()).map(str::to_string))
        });

    let mut message =
        from_json.unwrap_or_else(|| String::from_utf8_lossy(body).trim().to_string());
    if message.len() > MAX_MESSAGE_LEN {
        let mut cut = MAX_MESSAGE_LEN;
        while !message.is_char_boundary(cut) {
            cut -= 1;
        }
        message.truncate(cut);
    }
    message
}
