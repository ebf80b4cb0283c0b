//! Core module containing the backend seams and the types accessors exchange

pub mod backend;
pub mod document;
pub mod error;
pub mod events;
pub mod identity;
pub mod query;
pub mod result;
pub mod session;

pub use backend::{AuthBackend, BackendClient, DocumentStore};
pub use document::{Document, Record};
pub use error::{AuthError, AuthErrorCode, ConfigError, StoreError, StoreErrorCode};
pub use events::{AuthEvent, AuthEventBus, AuthEventEnvelope};
pub use identity::{FederatedProvider, User, UserMetadata};
pub use query::{FilterCondition, FilterOp, QueryConstraint, QuerySpec, SortDirection, SortOption};
pub use result::OperationResult;
pub use session::{SessionContext, SessionState, SessionStore};
