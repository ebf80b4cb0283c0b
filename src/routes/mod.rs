//! Route loading: session snapshot plus protected-route flag
//!
//! The guard only reports. Redirecting or rejecting unauthenticated requests
//! to protected routes is left to the caller.

pub mod extractor;
pub mod guard;

pub use extractor::{RouteContext, RouteState};
pub use guard::{DEFAULT_PROTECTED_ROUTES, LayoutData, RouteGuard};
