//! Optimistic action controller for feed engagement mutations.
//!
//! One controller instance coordinates every user-triggered mutation
//! (bookmark toggle, source/tag block, hide, pin, downvote): it applies the
//! local state change immediately, dispatches the remote call through an
//! [`ActionGateway`], surfaces a single-slot undoable notification, and
//! reconciles when the call settles. The view layer owns nothing; it renders
//! the event feed from [`ActionController::subscribe_events`] and forwards
//! `undo`/`dismiss` gestures back in.

use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use shared::{
    domain::{Action, ActionKind, ActionState, TargetId},
    protocol::ActionOutcome,
};
use thiserror::Error;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, warn};
use uuid::Uuid;

pub mod gateway;
pub mod menu;

pub use gateway::{ActionGateway, HttpActionGateway, MissingActionGateway};

/// How long a dispatched action stays undoable; also the notification's
/// auto-dismiss timeout.
pub const DEFAULT_UNDO_WINDOW: Duration = Duration::from_secs(10);

const EVENT_CHANNEL_CAPACITY: usize = 256;
const FAILURE_MESSAGE: &str = "Something went wrong, please try again";

/// Pending-set key: kinds on the same target never block each other, but the
/// same `(target, kind)` admits at most one in-flight cycle.
pub type ActionKey = (TargetId, ActionKind);

#[derive(Debug, Error)]
pub enum ActionError {
    #[error("{kind:?} already in flight for {target:?}")]
    DuplicateInFlight { target: TargetId, kind: ActionKind },
    #[error("remote rejected {kind:?} for {target:?}: {reason}")]
    RemoteRejected {
        target: TargetId,
        kind: ActionKind,
        reason: String,
    },
    #[error("undo window elapsed for {kind:?} on {target:?}")]
    UndoExpired { target: TargetId, kind: ActionKind },
}

/// Toast shown while a cycle is live. `undo` carries the cycle's key only
/// when the action declared itself reversible; reversion itself stays
/// available internally regardless.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRecord {
    pub id: Uuid,
    pub message: String,
    pub undo: Option<ActionKey>,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub enum ControllerEvent {
    StateChanged {
        target: TargetId,
        kind: ActionKind,
        state: ActionState,
    },
    NotificationChanged(Option<NotificationRecord>),
    /// Surfaced for logging; the user-facing contract is the reverted
    /// `StateChanged` plus the failure notification.
    ActionFailed {
        target: TargetId,
        kind: ActionKind,
        reason: String,
    },
}

struct InFlightCycle {
    action: Action,
    ticket: u64,
    undo_deadline: Instant,
}

struct SettledCycle {
    action: Action,
    undo_deadline: Instant,
}

struct ControllerState {
    pending: HashMap<ActionKey, InFlightCycle>,
    settled: HashMap<ActionKey, SettledCycle>,
    notification: Option<NotificationRecord>,
    next_ticket: u64,
}

impl ControllerState {
    fn prune_expired(&mut self, now: Instant) {
        self.settled.retain(|_, cycle| cycle.undo_deadline > now);
    }
}

pub struct ActionController {
    gateway: Arc<dyn ActionGateway>,
    inner: Mutex<ControllerState>,
    events: broadcast::Sender<ControllerEvent>,
    undo_window: Duration,
}

impl ActionController {
    pub fn new(gateway: Arc<dyn ActionGateway>) -> Arc<Self> {
        Self::new_with_undo_window(gateway, DEFAULT_UNDO_WINDOW)
    }

    pub fn new_with_undo_window(
        gateway: Arc<dyn ActionGateway>,
        undo_window: Duration,
    ) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Arc::new(Self {
            gateway,
            inner: Mutex::new(ControllerState {
                pending: HashMap::new(),
                settled: HashMap::new(),
                notification: None,
                next_ticket: 0,
            }),
            events,
            undo_window,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ControllerEvent> {
        self.events.subscribe()
    }

    pub async fn is_pending(&self, target: &TargetId, kind: ActionKind) -> bool {
        let state = self.inner.lock().await;
        state.pending.contains_key(&(target.clone(), kind))
    }

    pub async fn current_notification(&self) -> Option<NotificationRecord> {
        let state = self.inner.lock().await;
        state.notification.clone()
    }

    /// Applies `action` optimistically and dispatches it through the gateway.
    ///
    /// Emits the optimistic state and the notification before returning; the
    /// gateway call settles on a spawned task and is attempted exactly once.
    /// Fails with [`ActionError::DuplicateInFlight`] when the same
    /// `(target, kind)` is already pending, leaving the live cycle untouched.
    pub async fn dispatch(self: &Arc<Self>, action: Action) -> Result<(), ActionError> {
        let key: ActionKey = (action.target.clone(), action.kind);
        let (record, ticket) = {
            let mut state = self.inner.lock().await;
            let now = Instant::now();
            state.prune_expired(now);

            if state.pending.contains_key(&key) {
                return Err(ActionError::DuplicateInFlight {
                    target: action.target.clone(),
                    kind: action.kind,
                });
            }

            let ticket = state.next_ticket;
            state.next_ticket += 1;
            // A fresh cycle supersedes any still-undoable settled one.
            state.settled.remove(&key);
            state.pending.insert(
                key.clone(),
                InFlightCycle {
                    action: action.clone(),
                    ticket,
                    undo_deadline: now + self.undo_window,
                },
            );

            let record = NotificationRecord {
                id: Uuid::new_v4(),
                message: action.message.clone(),
                undo: action.reversible.then(|| key.clone()),
                timeout: self.undo_window,
            };
            state.notification = Some(record.clone());

            let _ = self.events.send(ControllerEvent::StateChanged {
                target: action.target.clone(),
                kind: action.kind,
                state: action.next.clone(),
            });
            let _ = self
                .events
                .send(ControllerEvent::NotificationChanged(Some(record.clone())));
            (record, ticket)
        };

        self.spawn_auto_dismiss(record.id, record.timeout);

        let controller = Arc::clone(self);
        tokio::spawn(async move {
            let outcome = controller.gateway.apply(&action).await;
            controller.settle(key, ticket, action, outcome).await;
        });

        Ok(())
    }

    /// Reverts a live cycle: restores `previous`, dismisses the cycle's
    /// notification, drops the pending entry (so a late settlement is
    /// discarded), and issues a best-effort compensating call. Once the undo
    /// window has elapsed this is a no-op failing with
    /// [`ActionError::UndoExpired`].
    pub async fn undo(
        self: &Arc<Self>,
        target: &TargetId,
        kind: ActionKind,
    ) -> Result<(), ActionError> {
        let key: ActionKey = (target.clone(), kind);
        let expired = || ActionError::UndoExpired {
            target: target.clone(),
            kind,
        };

        let action = {
            let mut state = self.inner.lock().await;
            let now = Instant::now();

            let action = if let Some(cycle) = state.pending.get(&key) {
                if now > cycle.undo_deadline {
                    return Err(expired());
                }
                state.pending.remove(&key).map(|cycle| cycle.action)
            } else if let Some(cycle) = state.settled.get(&key) {
                if now > cycle.undo_deadline {
                    state.settled.remove(&key);
                    return Err(expired());
                }
                state.settled.remove(&key).map(|cycle| cycle.action)
            } else {
                None
            };
            let Some(action) = action else {
                return Err(expired());
            };

            let _ = self.events.send(ControllerEvent::StateChanged {
                target: action.target.clone(),
                kind: action.kind,
                state: action.previous.clone(),
            });
            if state
                .notification
                .as_ref()
                .is_some_and(|record| record.undo.as_ref() == Some(&key))
            {
                state.notification = None;
                let _ = self.events.send(ControllerEvent::NotificationChanged(None));
            }
            action
        };

        // The remote call may already be on the wire; it cannot be unsent.
        // Compensate with the inverse mutation and log if that also fails.
        let gateway = Arc::clone(&self.gateway);
        let inverse = action.inverse();
        tokio::spawn(async move {
            if let Err(err) = gateway.apply(&inverse).await {
                warn!(
                    kind = ?inverse.kind,
                    target = ?inverse.target,
                    "compensating call after undo failed: {err}"
                );
            }
        });

        Ok(())
    }

    /// Clears the notification slot without touching applied state.
    /// Idempotent: dismissing an empty slot does nothing.
    pub async fn dismiss(&self) {
        let mut state = self.inner.lock().await;
        if state.notification.take().is_some() {
            let _ = self.events.send(ControllerEvent::NotificationChanged(None));
        }
    }

    async fn settle(
        self: &Arc<Self>,
        key: ActionKey,
        ticket: u64,
        action: Action,
        outcome: anyhow::Result<ActionOutcome>,
    ) {
        let mut state = self.inner.lock().await;

        let live = state
            .pending
            .get(&key)
            .is_some_and(|cycle| cycle.ticket == ticket);
        if !live {
            // Undone (or superseded) while the call was in flight; the
            // response must not be reapplied.
            debug!(kind = ?action.kind, target = ?action.target, "discarding late settlement");
            return;
        }
        let Some(cycle) = state.pending.remove(&key) else {
            return;
        };

        match outcome {
            Ok(outcome) => {
                if let Some(canonical) = outcome.canonical {
                    if canonical != action.next {
                        // Server wins on conflict.
                        let _ = self.events.send(ControllerEvent::StateChanged {
                            target: action.target.clone(),
                            kind: action.kind,
                            state: canonical,
                        });
                    }
                }
                state.settled.insert(
                    key,
                    SettledCycle {
                        action,
                        undo_deadline: cycle.undo_deadline,
                    },
                );
            }
            Err(err) => {
                warn!(
                    kind = ?action.kind,
                    target = ?action.target,
                    "remote rejected action: {err}"
                );
                let _ = self.events.send(ControllerEvent::StateChanged {
                    target: action.target.clone(),
                    kind: action.kind,
                    state: action.previous.clone(),
                });

                let record = NotificationRecord {
                    id: Uuid::new_v4(),
                    message: FAILURE_MESSAGE.to_string(),
                    undo: None,
                    timeout: self.undo_window,
                };
                state.notification = Some(record.clone());
                let _ = self
                    .events
                    .send(ControllerEvent::NotificationChanged(Some(record.clone())));
                self.spawn_auto_dismiss(record.id, record.timeout);
                let _ = self.events.send(ControllerEvent::ActionFailed {
                    target: action.target.clone(),
                    kind: action.kind,
                    reason: err.to_string(),
                });
            }
        }
    }

    fn spawn_auto_dismiss(self: &Arc<Self>, id: Uuid, timeout: Duration) {
        let controller = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            let mut state = controller.inner.lock().await;
            if state
                .notification
                .as_ref()
                .is_some_and(|record| record.id == id)
            {
                state.notification = None;
                let _ = controller
                    .events
                    .send(ControllerEvent::NotificationChanged(None));
            }
        });
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
