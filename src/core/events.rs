//! Auth state notifications
//!
//! Auth backends announce every session transition on an [`AuthEventBus`],
//! built on `tokio::sync::broadcast`. The session store is the usual
//! subscriber; nothing else writes session state.
//!
//! ```text
//! AuthBackend::sign_in ──┐
//! AuthBackend::sign_out ─┼──▶ AuthEventBus::publish() ──▶ broadcast ──▶ SessionStore task
//! AuthBackend::popup ────┘                                          ──▶ other subscribers
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! let bus = AuthEventBus::new(64);
//! let mut rx = bus.subscribe();
//!
//! bus.publish(AuthEvent::SignedOut);
//!
//! if let Ok(envelope) = rx.recv().await {
//!     println!("{} at {}", envelope.event.action(), envelope.timestamp);
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::core::identity::User;

/// A session transition reported by the auth backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum AuthEvent {
    /// An existing account signed in (password or federated)
    SignedIn { user: User },
    /// A new account was created and is now signed in
    SignedUp { user: User },
    /// The active session ended
    SignedOut,
}

impl AuthEvent {
    pub fn action(&self) -> &str {
        match self {
            AuthEvent::SignedIn { .. } => "signed_in",
            AuthEvent::SignedUp { .. } => "signed_up",
            AuthEvent::SignedOut => "signed_out",
        }
    }

    /// The user holding the session after this event, if any
    pub fn user(&self) -> Option<&User> {
        match self {
            AuthEvent::SignedIn { user } | AuthEvent::SignedUp { user } => Some(user),
            AuthEvent::SignedOut => None,
        }
    }
}

/// Envelope wrapping an auth event with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthEventEnvelope {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub event: AuthEvent,
}

impl AuthEventEnvelope {
    pub fn new(event: AuthEvent) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            event,
        }
    }
}

/// Broadcast channel for auth notifications
///
/// Cheap to clone; all clones share one channel.
#[derive(Debug, Clone)]
pub struct AuthEventBus {
    sender: broadcast::Sender<AuthEventEnvelope>,
}

impl AuthEventBus {
    /// Create a bus buffering up to `capacity` events per lagging receiver
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event, returning how many receivers will see it
    ///
    /// Never fails: with no subscribers the event is dropped.
    pub fn publish(&self, event: AuthEvent) -> usize {
        let envelope = AuthEventEnvelope::new(event);
        self.sender.send(envelope).unwrap_or(0)
    }

    /// Subscribe to future events. Past events are not replayed.
    pub fn subscribe(&self) -> broadcast::Receiver<AuthEventEnvelope> {
        self.sender.subscribe()
    }

    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for AuthEventBus {
    fn default() -> Self {
        Self::new(64)
    }
}
