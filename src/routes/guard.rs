//! Protected-route detection

use axum::http::Uri;
use serde::Serialize;

use crate::config::RouteConfig;
use crate::core::identity::User;
use crate::core::session::SessionContext;

/// Path prefixes guarded when no configuration says otherwise
pub const DEFAULT_PROTECTED_ROUTES: &[&str] = &["/game", "/profile"];

/// What a page layout receives for a request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutData {
    /// Last-known user; may lag the backend
    pub user: Option<User>,
    pub is_protected_route: bool,
}

/// Flags request paths that need an authenticated session
#[derive(Debug, Clone, PartialEq)]
pub struct RouteGuard {
    protected_prefixes: Vec<String>,
}

impl RouteGuard {
    pub fn new<I, S>(protected_prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            protected_prefixes: protected_prefixes.into_iter().map(Into::into).collect(),
        }
    }

    pub fn from_config(config: &RouteConfig) -> Self {
        Self::new(config.protected_routes.iter().cloned())
    }

    pub fn protected_prefixes(&self) -> &[String] {
        &self.protected_prefixes
    }

    /// Plain string-prefix test: `/gamer` falls under `/game` too
    pub fn is_protected(&self, path: &str) -> bool {
        self.protected_prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
    }

    /// Build layout data for `path` from the session's current snapshot
    pub fn load(&self, path: &str, session: &SessionContext) -> LayoutData {
        LayoutData {
            user: session.current_user(),
            is_protected_route: self.is_protected(path),
        }
    }

    /// [`load`](Self::load) for a full request URI; query and fragment are ignored
    pub fn load_uri(&self, uri: &Uri, session: &SessionContext) -> LayoutData {
        self.load(uri.path(), session)
    }
}

impl Default for RouteGuard {
    fn default() -> Self {
        Self::new(DEFAULT_PROTECTED_ROUTES.iter().copied())
    }
}
