//! Axum extractor for layout data

use std::convert::Infallible;

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;

use crate::core::session::SessionContext;
use crate::routes::guard::{LayoutData, RouteGuard};

/// Router state sufficient for [`RouteContext`]
///
/// Any state works as long as both parts can be pulled out with `FromRef`.
#[derive(Debug, Clone, FromRef)]
pub struct RouteState {
    pub guard: RouteGuard,
    pub session: SessionContext,
}

/// Layout data for the current request
///
/// ```rust,ignore
/// async fn page(RouteContext(layout): RouteContext) -> Json<LayoutData> {
///     Json(layout)
/// }
///
/// let app = Router::new()
///     .route("/{*path}", get(page))
///     .with_state(RouteState { guard: RouteGuard::default(), session });
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RouteContext(pub LayoutData);

impl<S> FromRequestParts<S> for RouteContext
where
    S: Send + Sync,
    RouteGuard: FromRef<S>,
    SessionContext: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let guard = RouteGuard::from_ref(state);
        let session = SessionContext::from_ref(state);
        Ok(RouteContext(guard.load_uri(&parts.uri, &session)))
    }
}
