//! Single-flight refresh coordination.
//!
//! At most one refresh episode exists at a time. The first request to see a
//! 401 starts it; every request that sees a 401 while it runs is queued behind
//! it. When the exchange resolves, the session is updated first and the queue
//! is then drained in arrival order, so no waiter can retry with the old
//! credential.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::oneshot;
use tracing::{debug, error, info, warn};

use super::error::RefreshError;
use super::exchange::RefreshExchange;
use crate::session::{Credential, Session, SessionEndReason};

/// How an episode concluded, as seen by each waiter.
#[derive(Debug, Clone)]
pub(crate) enum EpisodeOutcome {
    Refreshed(Credential),
    Failed(SessionEndReason),
}

struct Episode {
    id: u64,
    waiters: VecDeque<oneshot::Sender<EpisodeOutcome>>,
}

/// Counters over the lifetime of a gateway.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshStats {
    /// Episodes started, i.e. refresh exchanges issued.
    pub started: u64,
    pub succeeded: u64,
    pub failed: u64,
    /// Requests that joined an episode someone else started.
    pub joined: u64,
}

#[derive(Default)]
struct Counters {
    started: AtomicU64,
    succeeded: AtomicU64,
    failed: AtomicU64,
    joined: AtomicU64,
}

/// A queued continuation waiting for the in-flight episode.
pub(crate) struct Waiter {
    episode: u64,
    rx: oneshot::Receiver<EpisodeOutcome>,
}

impl Waiter {
    /// A waiter whose outcome is already known.
    fn ready(episode: u64, outcome: EpisodeOutcome) -> Self {
        let (tx, rx) = oneshot::channel();
        let _ = tx.send(outcome);
        Self { episode, rx }
    }

    pub(crate) async fn outcome(self) -> EpisodeOutcome {
        self.rx.await.unwrap_or_else(|_| {
            warn!(episode = self.episode, "Refresh episode dropped its waiters");
            EpisodeOutcome::Failed(SessionEndReason::RefreshFailed(
                "refresh episode aborted".to_string(),
            ))
        })
    }
}

pub(crate) struct RefreshCoordinator {
    slot: Mutex<Option<Episode>>,
    next_id: AtomicU64,
    counters: Counters,
}

impl RefreshCoordinator {
    pub(crate) fn new() -> Self {
        Self {
            slot: Mutex::new(None),
            next_id: AtomicU64::new(1),
            counters: Counters::default(),
        }
    }

    /// Queue behind the in-flight episode, starting one if none is running.
    ///
    /// `sent_generation` is the session generation the failed request was
    /// sent with. With no episode in flight, a session that has moved past it
    /// resolves the waiter at once: a rotated credential is handed back for
    /// the retry, and a cleared session fails without ending it again.
    ///
    /// The start-or-enqueue decision and the episode teardown take the same
    /// lock, so every caller is served by exactly one episode.
    pub(crate) fn join(
        self: &Arc<Self>,
        session: &Arc<Session>,
        exchange: &Arc<dyn RefreshExchange>,
        timeout: Duration,
        sent_generation: u64,
    ) -> Waiter {
        let (tx, rx) = oneshot::channel();

        let (episode, started) = {
            let mut slot = self.slot.lock();
            match slot.as_mut() {
                Some(episode) => {
                    episode.waiters.push_back(tx);
                    (episode.id, false)
                }
                None => {
                    // `drive` swaps the credential before `finish` takes this
                    // lock, so a completed episode is already visible here.
                    let (generation, credential) = session.snapshot();
                    match credential {
                        Some(credential) if generation != sent_generation => {
                            debug!(
                                sent_generation,
                                generation,
                                "Credential rotated since dispatch; skipping refresh"
                            );
                            return Waiter::ready(0, EpisodeOutcome::Refreshed(credential));
                        }
                        None => {
                            let reason = session.end_reason().unwrap_or_else(|| {
                                SessionEndReason::RefreshFailed("no active session".to_string())
                            });
                            debug!(%reason, "No session to refresh");
                            return Waiter::ready(0, EpisodeOutcome::Failed(reason));
                        }
                        Some(_) => {}
                    }

                    let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                    *slot = Some(Episode {
                        id,
                        waiters: VecDeque::from([tx]),
                    });
                    (id, true)
                }
            }
        };

        if started {
            self.counters.started.fetch_add(1, Ordering::Relaxed);
            tokio::spawn(Arc::clone(self).drive(
                episode,
                Arc::clone(session),
                Arc::clone(exchange),
                timeout,
            ));
        } else {
            self.counters.joined.fetch_add(1, Ordering::Relaxed);
            debug!(episode, "Joined in-flight refresh episode");
        }

        Waiter { episode, rx }
    }

    pub(crate) fn stats(&self) -> RefreshStats {
        RefreshStats {
            started: self.counters.started.load(Ordering::Relaxed),
            succeeded: self.counters.succeeded.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
            joined: self.counters.joined.load(Ordering::Relaxed),
        }
    }

    /// Whether an episode is currently in flight.
    pub(crate) fn in_flight(&self) -> bool {
        self.slot.lock().is_some()
    }

    /// Run the exchange on its own task so a cancelled initiator cannot strand
    /// the queue.
    async fn drive(
        self: Arc<Self>,
        id: u64,
        session: Arc<Session>,
        exchange: Arc<dyn RefreshExchange>,
        timeout: Duration,
    ) {
        let guard = FinishGuard {
            coordinator: Arc::clone(&self),
            id,
            armed: true,
        };

        info!(episode = id, "Starting session refresh");
        let current = session.current_credential();
        let result = match tokio::time::timeout(timeout, exchange.refresh(current.as_ref())).await
        {
            Ok(result) => result,
            Err(_) => Err(RefreshError::TimedOut(timeout)),
        };

        let outcome = match result {
            Ok(credential) => {
                let generation = session.replace(credential.clone()).await;
                self.counters.succeeded.fetch_add(1, Ordering::Relaxed);
                info!(
                    episode = id,
                    generation,
                    expires_at = ?credential.expires_at,
                    "Session refresh successful"
                );
                EpisodeOutcome::Refreshed(credential)
            }
            Err(e) => {
                self.counters.failed.fetch_add(1, Ordering::Relaxed);
                error!(episode = id, error = %e, "Session refresh failed - re-login required");
                let reason = SessionEndReason::RefreshFailed(e.to_string());
                session.end(reason.clone()).await;
                EpisodeOutcome::Failed(reason)
            }
        };

        guard.complete(outcome);
    }

    /// Tear the episode down and release its waiters in FIFO order.
    fn finish(&self, id: u64, outcome: EpisodeOutcome) {
        let episode = self.slot.lock().take();
        let Some(episode) = episode else {
            warn!(episode = id, "Refresh episode already torn down");
            return;
        };
        debug_assert_eq!(episode.id, id, "only the running episode can finish");

        let waiters = episode.waiters.len();
        for tx in episode.waiters {
            // A waiter whose request was cancelled has dropped its receiver.
            let _ = tx.send(outcome.clone());
        }
        debug!(episode = id, waiters, "Released refresh waiters");
    }
}

/// Finishes the episode as failed if the driving task unwinds or is cancelled
/// before completing it.
struct FinishGuard {
    coordinator: Arc<RefreshCoordinator>,
    id: u64,
    armed: bool,
}

impl FinishGuard {
    fn complete(mut self, outcome: EpisodeOutcome) {
        self.armed = false;
        self.coordinator.finish(self.id, outcome);
    }
}

impl Drop for FinishGuard {
    fn drop(&mut self) {
        if self.armed {
            self.coordinator.counters.failed.fetch_add(1, Ordering::Relaxed);
            self.coordinator.finish(
                self.id,
                EpisodeOutcome::Failed(SessionEndReason::RefreshFailed(
                    "refresh episode aborted".to_string(),
                )),
            );
        }
    }
}
