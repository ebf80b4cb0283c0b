//! Backend traits for authentication and document storage
//!
//! Accessors only ever talk to these traits. A hosted backend client plugs in
//! by implementing them; the crate ships in-memory implementations under
//! [`crate::storage`].

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::core::document::{Document, Record};
use crate::core::error::{AuthError, StoreError};
use crate::core::events::AuthEventEnvelope;
use crate::core::identity::{FederatedProvider, User};
use crate::core::query::QuerySpec;

/// Authentication service of the backend
///
/// Implementations publish every session transition on their notification
/// channel. Callers must not assume the notification has been delivered when
/// a method returns.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// Sign in an existing email/password account
    async fn sign_in_with_email_and_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<User, AuthError>;

    /// Register an email/password account and sign it in
    async fn create_user_with_email_and_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<User, AuthError>;

    /// End the current session
    async fn sign_out(&self) -> Result<(), AuthError>;

    /// Complete a federated sign-in handshake through a popup
    async fn sign_in_with_popup(&self, provider: &FederatedProvider) -> Result<User, AuthError>;

    /// User holding the session right now, if any
    async fn current_user(&self) -> Option<User>;

    /// Subscribe to session notifications
    fn subscribe(&self) -> broadcast::Receiver<AuthEventEnvelope>;
}

/// Document store of the backend
///
/// Collections are named groups of schemaless records. Identifiers are
/// generated by the store on [`add`](DocumentStore::add).
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a record under a generated id, returning the id
    async fn add(&self, collection: &str, data: Record) -> Result<String, StoreError>;

    /// Fetch one document; `Ok(None)` when it does not exist
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError>;

    /// Fetch every document of a collection
    async fn list(&self, collection: &str) -> Result<Vec<Document>, StoreError>;

    /// Merge `data` into an existing document
    ///
    /// Keys may be dotted field paths. Fails with `not-found` when the
    /// document does not exist.
    async fn update(&self, collection: &str, id: &str, data: Record) -> Result<(), StoreError>;

    /// Remove a document; succeeds when it is already gone
    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError>;

    /// Run a query once and return every match
    async fn run_query(
        &self,
        collection: &str,
        query: &QuerySpec,
    ) -> Result<Vec<Document>, StoreError>;
}

/// Shared handle on both backend services
///
/// Cheap to clone; accessors and the session store are built from it.
#[derive(Clone)]
pub struct BackendClient {
    auth: Arc<dyn AuthBackend>,
    store: Arc<dyn DocumentStore>,
}

impl BackendClient {
    pub fn new(auth: Arc<dyn AuthBackend>, store: Arc<dyn DocumentStore>) -> Self {
        Self { auth, store }
    }

    /// A client backed by the in-memory services, scoped to `config`'s project
    #[cfg(feature = "in-memory")]
    pub fn in_memory(config: &crate::config::BackendConfig) -> Self {
        use crate::storage::{InMemoryAuthBackend, InMemoryDocumentStore};

        tracing::info!(project_id = %config.project_id, "initializing in-memory backend");
        Self::new(
            Arc::new(InMemoryAuthBackend::new()),
            Arc::new(InMemoryDocumentStore::new(&config.project_id)),
        )
    }

    pub fn auth(&self) -> Arc<dyn AuthBackend> {
        Arc::clone(&self.auth)
    }

    pub fn store(&self) -> Arc<dyn DocumentStore> {
        Arc::clone(&self.store)
    }

    pub fn sessions(&self) -> crate::accessors::SessionAccessor {
        crate::accessors::SessionAccessor::new(self.auth())
    }

    pub fn documents(&self) -> crate::accessors::DocumentAccessor {
        crate::accessors::DocumentAccessor::new(self.store())
    }

    /// Start a session store fed by this client's auth notifications
    pub fn connect_session(&self) -> crate::core::session::SessionContext {
        crate::core::session::SessionStore::connect(self.auth())
    }
}
