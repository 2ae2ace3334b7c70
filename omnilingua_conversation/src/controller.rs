//! Turn controller: one user submission at a time.
//!
//! A submission appends the user turn, calls the gateway, then appends
//! either the reply or a synthetic error turn. While that runs the
//! controller is busy and further submissions are dropped, not queued.
//! The exchange runs on its own task, so it finishes even if the caller
//! stops waiting.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use omnilingua_core::Turn;
use omnilingua_core::util::ERROR_REPLY;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, warn};

use crate::gateway::SessionGateway;
use crate::store::ConversationStore;

/// Why a submission was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Nothing but whitespace
    Empty,
    /// Another submission is still in flight
    Busy,
}

/// Result of [`TurnController::submit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The exchange ran; `reply` is the appended model or error turn.
    Completed { reply: Turn },
    /// Nothing was appended.
    Ignored(IgnoreReason),
}

impl SubmitOutcome {
    #[must_use]
    pub const fn is_accepted(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}

/// What the presentation layer renders.
#[derive(Debug, Clone)]
pub struct ConversationSnapshot {
    pub turns: Vec<Turn>,
    pub busy: bool,
}

/// Holds the busy flag for the lifetime of a submission.
///
/// Dropping the guard clears the flag, so every exit path of a submission
/// releases it.
struct BusyGuard {
    flag: Arc<AtomicBool>,
}

impl BusyGuard {
    fn try_acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self {
                flag: Arc::clone(flag),
            })
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Orchestrates submissions against a [`SessionGateway`] and a
/// [`ConversationStore`].
///
/// Share it behind an `Arc` to submit from several tasks; at most one
/// submission is ever in flight.
pub struct TurnController<G> {
    gateway: Arc<Mutex<G>>,
    store: Arc<RwLock<ConversationStore>>,
    busy: Arc<AtomicBool>,
}

impl<G> TurnController<G>
where
    G: SessionGateway + 'static,
{
    pub fn new(gateway: G, store: ConversationStore) -> Self {
        Self {
            gateway: Arc::new(Mutex::new(gateway)),
            store: Arc::new(RwLock::new(store)),
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Submit raw user input.
    ///
    /// Blank input, or input arriving while another submission is in
    /// flight, is ignored without touching the conversation. Otherwise the
    /// conversation grows by exactly two turns: the user turn, then the
    /// reply or an error turn.
    ///
    /// Once accepted, the exchange runs on its own task: dropping the
    /// returned future does not stop the reply turn from being appended,
    /// and the controller stays busy until it is.
    pub async fn submit(&self, raw_input: &str) -> SubmitOutcome {
        let text = raw_input.trim();
        if text.is_empty() {
            debug!("Ignoring blank submission");
            return SubmitOutcome::Ignored(IgnoreReason::Empty);
        }

        // Acceptance and the user turn are published under one write lock so
        // a snapshot never sees one without the other.
        let busy = {
            let mut store = self.store.write().await;
            let Some(busy) = BusyGuard::try_acquire(&self.busy) else {
                debug!("Ignoring submission while busy");
                return SubmitOutcome::Ignored(IgnoreReason::Busy);
            };
            store.append(Turn::user(text));
            busy
        };

        info!("Submitting turn ({} chars)", text.chars().count());
        let exchange = tokio::spawn(run_exchange(
            Arc::clone(&self.gateway),
            Arc::clone(&self.store),
            text.to_string(),
            busy,
        ));

        match exchange.await {
            Ok(reply) => SubmitOutcome::Completed { reply },
            Err(e) => {
                error!("Exchange task failed: {e}");
                SubmitOutcome::Completed {
                    reply: Turn::error(ERROR_REPLY),
                }
            }
        }
    }

    /// Start over: drop the remote session and reset the conversation to
    /// the welcome turn. Returns `false` without doing anything while a
    /// submission is in flight.
    pub async fn reset(&self) -> bool {
        let mut store = self.store.write().await;
        let Some(_busy) = BusyGuard::try_acquire(&self.busy) else {
            debug!("Ignoring reset while busy");
            return false;
        };
        self.gateway.lock().await.reset();
        store.initialize();
        info!("Conversation reset");
        true
    }

    /// Consistent view of the turns and the busy flag.
    pub async fn snapshot(&self) -> ConversationSnapshot {
        let store = self.store.read().await;
        ConversationSnapshot {
            turns: store.turns().to_vec(),
            busy: self.is_busy(),
        }
    }

    /// Number of turns in the conversation.
    pub async fn turn_count(&self) -> usize {
        self.store.read().await.len()
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Call the gateway and append the reply, then release `busy`.
///
/// The gateway call gets its own task so a panic inside it still ends in an
/// error turn.
async fn run_exchange<G>(
    gateway: Arc<Mutex<G>>,
    store: Arc<RwLock<ConversationStore>>,
    text: String,
    busy: BusyGuard,
) -> Turn
where
    G: SessionGateway + 'static,
{
    let call = tokio::spawn(async move { gateway.lock().await.send(&text).await });

    let reply = match call.await {
        Ok(Ok(reply)) => Turn::model(reply),
        Ok(Err(e)) => {
            warn!("Turn failed, appending error turn: {e}");
            Turn::error(ERROR_REPLY)
        }
        Err(e) => {
            error!("Gateway task failed, appending error turn: {e}");
            Turn::error(ERROR_REPLY)
        }
    };

    let mut store = store.write().await;
    store.append(reply.clone());
    drop(busy);
    drop(store);

    reply
}
