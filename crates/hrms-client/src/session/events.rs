//! Session lifecycle events.

use std::fmt;

/// Why a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEndReason {
    /// The refresh exchange failed; the user has to log in again.
    RefreshFailed(String),
    /// The user logged out.
    LoggedOut,
}

impl fmt::Display for SessionEndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RefreshFailed(error) => write!(f, "session refresh failed: {error}"),
            Self::LoggedOut => f.write_str("logged out"),
        }
    }
}

/// Events broadcast by the [`Session`](super::Session).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A login stored a new credential.
    Established { generation: u64 },
    /// A refresh episode replaced the credential.
    Refreshed { generation: u64 },
    /// The credential was cleared.
    Ended { reason: SessionEndReason },
}

impl SessionEvent {
    /// Get a description of the event for logging.
    pub fn description(&self) -> String {
        match self {
            Self::Established { generation } => format!("Session established (gen {generation})"),
            Self::Refreshed { generation } => format!("Session refreshed (gen {generation})"),
            Self::Ended { reason } => format!("Session ended: {reason}"),
        }
    }
}
