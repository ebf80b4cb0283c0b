//! # rhye
//!
//! Typed client-side accessors over a hosted authentication + document
//! database backend.
//!
//! ## Features
//!
//! - **Session accessor**: email/password sign-in and sign-up, sign-out,
//!   federated popup sign-in
//! - **Document accessor**: create/read/list/update/delete plus
//!   filter/sort/limit queries over named collections
//! - **Route guard**: last-known session plus a protected-route flag, also as
//!   an axum extractor
//! - **Uniform results**: every accessor returns an [`OperationResult`]; backend
//!   errors never escape
//! - **Session store**: auth notifications flow over a channel into a single
//!   owner; readers take snapshots
//! - **Pluggable backend**: implement [`AuthBackend`] and [`DocumentStore`], or
//!   use the bundled in-memory backend
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use rhye::prelude::*;
//!
//! let config = AppConfig::from_yaml_file("rhye.yaml")?;
//! let client = BackendClient::in_memory(&config.backend);
//! let session = client.connect_session();
//!
//! let signed_in = client.sessions().sign_in("ada@example.com", "secret-pw").await;
//!
//! let documents = client.documents();
//! let created = documents.create("items", &json!({"name": "x"})).await;
//! let item = documents.read("items", created.id().unwrap()).await;
//!
//! let done = documents
//!     .query(
//!         "tasks",
//!         &QuerySpec::new()
//!             .where_eq("status", "done")
//!             .order_by("createdAt", SortDirection::Desc)
//!             .limit(2),
//!     )
//!     .await;
//!
//! let guard = RouteGuard::from_config(&config.routes);
//! let layout = guard.load("/game/42", &session);
//! ```
//!
//! [`OperationResult`]: core::result::OperationResult
//! [`AuthBackend`]: core::backend::AuthBackend
//! [`DocumentStore`]: core::backend::DocumentStore

pub mod accessors;
pub mod config;
pub mod core;
pub mod routes;
pub mod storage;
pub mod telemetry;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Backend Seams ===
    pub use crate::core::backend::{AuthBackend, BackendClient, DocumentStore};

    // === Core Types ===
    pub use crate::core::{
        document::{Document, Record},
        error::{AuthError, AuthErrorCode, ConfigError, StoreError, StoreErrorCode},
        events::{AuthEvent, AuthEventBus, AuthEventEnvelope},
        identity::{FederatedProvider, User},
        query::{FilterCondition, FilterOp, QuerySpec, SortDirection, SortOption},
        result::OperationResult,
        session::{SessionContext, SessionState, SessionStore},
    };

    // === Accessors ===
    pub use crate::accessors::{DOCUMENT_NOT_FOUND, DocumentAccessor, SessionAccessor};

    // === Routes ===
    pub use crate::routes::{LayoutData, RouteContext, RouteGuard, RouteState};

    // === Storage ===
    #[cfg(feature = "in-memory")]
    pub use crate::storage::{InMemoryAuthBackend, InMemoryDocumentStore};

    // === Config ===
    pub use crate::config::{AppConfig, BackendConfig, RouteConfig};

    // === External dependencies ===
    pub use async_trait::async_trait;
    pub use serde::{Deserialize, Serialize};
    pub use serde_json::{Value, json};
}
