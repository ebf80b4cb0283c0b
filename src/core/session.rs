//! Locally cached session state
//!
//! A [`SessionStore`] task is the single owner of session state. It drains the
//! auth backend's notification channel and republishes the latest state on a
//! `tokio::sync::watch` channel. Readers hold a [`SessionContext`] and take
//! snapshots; they never write.
//!
//! The cached state trails the backend: an accessor call returns before the
//! notification it triggers has been applied.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{broadcast, watch};
use tokio_stream::wrappers::WatchStream;
use tracing::{debug, info, warn};

use crate::core::backend::AuthBackend;
use crate::core::events::{AuthEvent, AuthEventEnvelope};
use crate::core::identity::User;

/// Last-known session state
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(tag = "status", content = "user", rename_all = "snake_case")]
pub enum SessionState {
    /// No notification received yet
    #[default]
    Unknown,
    SignedOut,
    SignedIn(User),
}

impl SessionState {
    pub fn from_event(event: &AuthEvent) -> Self {
        match event.user() {
            Some(user) => SessionState::SignedIn(user.clone()),
            None => SessionState::SignedOut,
        }
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            SessionState::SignedIn(user) => Some(user),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::SignedIn(_))
    }
}

/// Spawns the task that owns session state
pub struct SessionStore;

impl SessionStore {
    /// Start applying notifications from `events`
    ///
    /// State stays [`SessionState::Unknown`] until the first event arrives.
    pub fn spawn(events: broadcast::Receiver<AuthEventEnvelope>) -> SessionContext {
        let (tx, rx) = watch::channel(SessionState::Unknown);
        tokio::spawn(Self::run(events, tx, None));
        SessionContext { rx }
    }

    /// Subscribe to `auth` and seed state from its current user
    ///
    /// Mirrors the backend's behaviour of delivering the current state to new
    /// listeners: the seed is applied by the store task, so callers still
    /// observe `Unknown` until it lands.
    pub fn connect(auth: Arc<dyn AuthBackend>) -> SessionContext {
        let events = auth.subscribe();
        let (tx, rx) = watch::channel(SessionState::Unknown);
        tokio::spawn(Self::run(events, tx, Some(auth)));
        SessionContext { rx }
    }

    async fn run(
        mut events: broadcast::Receiver<AuthEventEnvelope>,
        tx: watch::Sender<SessionState>,
        seed: Option<Arc<dyn AuthBackend>>,
    ) {
        if let Some(auth) = seed {
            let initial = match auth.current_user().await {
                Some(user) => SessionState::SignedIn(user),
                None => SessionState::SignedOut,
            };
            // A notification may already have landed; it is newer than the seed.
            tx.send_if_modified(|state| {
                if *state == SessionState::Unknown {
                    *state = initial;
                    true
                } else {
                    false
                }
            });
        }

        loop {
            match events.recv().await {
                Ok(envelope) => {
                    let state = SessionState::from_event(&envelope.event);
                    info!(
                        action = envelope.event.action(),
                        uid = state.user().map(|u| u.uid.as_str()),
                        "session state changed"
                    );
                    tx.send_replace(state);
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "session store lagged behind auth notifications");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    debug!("auth notification channel closed, session store stopping");
                    break;
                }
            }
        }
    }
}

/// Read handle on the session store
///
/// Clone freely and pass to whatever needs the current session.
#[derive(Debug, Clone)]
pub struct SessionContext {
    rx: watch::Receiver<SessionState>,
}

impl SessionContext {
    /// A context pinned to `state`, not backed by any store
    pub fn fixed(state: SessionState) -> Self {
        let (_tx, rx) = watch::channel(state);
        Self { rx }
    }

    /// Copy of the last-known state
    pub fn snapshot(&self) -> SessionState {
        self.rx.borrow().clone()
    }

    pub fn current_user(&self) -> Option<User> {
        self.rx.borrow().user().cloned()
    }

    pub fn is_authenticated(&self) -> bool {
        self.rx.borrow().is_authenticated()
    }

    /// Wait for the next state change. Returns `false` once the store has stopped.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }

    /// Wait until the state satisfies `predicate`, returning that state
    ///
    /// Returns `None` if the store stops first.
    pub async fn wait_for(
        &mut self,
        predicate: impl FnMut(&SessionState) -> bool,
    ) -> Option<SessionState> {
        self.rx.wait_for(predicate).await.ok().map(|state| state.clone())
    }

    /// Stream of states, starting with the current one
    pub fn stream(&self) -> WatchStream<SessionState> {
        WatchStream::new(self.rx.clone())
    }
}
