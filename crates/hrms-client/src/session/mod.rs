//! Session state.
//!
//! Holds the one "current" [`Credential`], persists it through a
//! [`CredentialStore`] and tells the rest of the application when the session
//! ends.

mod credential;
mod events;
mod state;
mod store;

pub use credential::{Credential, TokenClaims};
pub use events::{SessionEndReason, SessionEvent};
pub use state::{Session, SessionEndedCallback};
pub use store::{CredentialStore, FileCredentialStore, MemoryCredentialStore, StoreError};
