//! Caller-facing accessors over the backend traits
//!
//! Every method forwards to the backend once and returns an
//! [`OperationResult`](crate::core::result::OperationResult). Backend errors
//! never propagate past these types.

pub mod documents;
pub mod session;

pub use documents::{DOCUMENT_NOT_FOUND, DocumentAccessor};
pub use session::SessionAccessor;
