//! The process-wide session: current credential, generation counter, events.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use super::credential::Credential;
use super::events::{SessionEndReason, SessionEvent};
use super::store::{CredentialStore, MemoryCredentialStore, StoreError};

/// Default channel capacity for session events.
const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Callback run when the session ends.
pub type SessionEndedCallback = Arc<dyn Fn(&SessionEndReason) + Send + Sync>;

#[derive(Default)]
struct Slot {
    credential: Option<Credential>,
    /// Bumped on every change of `credential`, including clears.
    generation: u64,
    /// Why the last session ended; cleared when a credential is installed.
    ended: Option<SessionEndReason>,
}

/// Owner of the current [`Credential`].
///
/// Reads are synchronous and cheap; writes swap the in-memory credential first
/// and then persist it, so a reader never observes a credential older than the
/// last completed swap.
pub struct Session {
    slot: RwLock<Slot>,
    store: Arc<dyn CredentialStore>,
    events: broadcast::Sender<SessionEvent>,
    end_callbacks: Mutex<Vec<SessionEndedCallback>>,
}

impl Session {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        let (events, _) = broadcast::channel(DEFAULT_CHANNEL_CAPACITY);
        Self {
            slot: RwLock::new(Slot::default()),
            store,
            events,
            end_callbacks: Mutex::new(Vec::new()),
        }
    }

    /// Session that is forgotten when the process exits.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryCredentialStore::new()))
    }

    /// Load a previously persisted credential into memory.
    ///
    /// Returns whether a credential was found.
    pub async fn restore(&self) -> Result<bool, StoreError> {
        let Some(credential) = self.store.load().await? else {
            return Ok(false);
        };
        let mut slot = self.slot.write();
        slot.credential = Some(credential);
        slot.generation += 1;
        slot.ended = None;
        debug!(generation = slot.generation, "Restored persisted session");
        Ok(true)
    }

    pub fn current_credential(&self) -> Option<Credential> {
        self.slot.read().credential.clone()
    }

    pub fn generation(&self) -> u64 {
        self.slot.read().generation
    }

    /// Generation and credential read together.
    pub(crate) fn snapshot(&self) -> (u64, Option<Credential>) {
        let slot = self.slot.read();
        (slot.generation, slot.credential.clone())
    }

    /// Why the session last ended, while no credential has replaced it.
    pub fn end_reason(&self) -> Option<SessionEndReason> {
        self.slot.read().ended.clone()
    }

    /// Whether requests can be expected to authenticate: the access token is
    /// still valid, or a refresh token is available to renew it.
    pub fn is_authenticated(&self) -> bool {
        self.slot
            .read()
            .credential
            .as_ref()
            .is_some_and(|c| !c.is_expired() || c.has_refresh_token())
    }

    /// Register a callback run every time the session ends.
    pub fn on_session_ended<F>(&self, callback: F)
    where
        F: Fn(&SessionEndReason) + Send + Sync + 'static,
    {
        self.end_callbacks.lock().push(Arc::new(callback));
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Install a credential obtained by logging in.
    pub async fn establish(&self, credential: Credential) -> u64 {
        let generation = self.swap(Some(credential.clone()), None);
        self.persist(&credential).await;
        self.emit(SessionEvent::Established { generation });
        generation
    }

    /// Install a credential obtained by a refresh episode.
    pub(crate) async fn replace(&self, credential: Credential) -> u64 {
        let generation = self.swap(Some(credential.clone()), None);
        self.persist(&credential).await;
        self.emit(SessionEvent::Refreshed { generation });
        generation
    }

    /// Clear the credential everywhere and notify listeners.
    pub async fn end(&self, reason: SessionEndReason) {
        let generation = self.swap(None, Some(reason.clone()));
        info!(generation, %reason, "Session ended");

        if let Err(e) = self.store.clear().await {
            warn!(error = %e, "Failed to clear persisted credential (non-fatal)");
        }

        self.emit(SessionEvent::Ended {
            reason: reason.clone(),
        });

        // Run callbacks outside the lock so they may register new ones.
        let callbacks: Vec<_> = self.end_callbacks.lock().clone();
        for callback in callbacks {
            callback(&reason);
        }
    }

    /// Drop in-memory state and callbacks without touching the store.
    pub fn teardown(&self) {
        self.swap(None, None);
        self.end_callbacks.lock().clear();
    }

    fn swap(&self, credential: Option<Credential>, ended: Option<SessionEndReason>) -> u64 {
        let mut slot = self.slot.write();
        slot.credential = credential;
        slot.generation += 1;
        slot.ended = ended;
        slot.generation
    }

    async fn persist(&self, credential: &Credential) {
        if let Err(e) = self.store.save(credential).await {
            warn!(error = %e, "Failed to persist credential (non-fatal)");
        }
    }

    fn emit(&self, event: SessionEvent) {
        debug!(event = %event.description(), "Session event");
        // Ignore errors - just means no subscribers currently
        let _ = self.events.send(event);
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::in_memory()
    }
}
