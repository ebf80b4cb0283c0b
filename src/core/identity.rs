//! User identity records and federated providers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Provider id reported for email/password accounts
pub const PASSWORD_PROVIDER_ID: &str = "password";

/// Identity of an authenticated user, as reported by the auth backend
///
/// Opaque to this crate beyond serialization: accessors hand it back to the
/// caller untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Backend-assigned unique id
    pub uid: String,

    pub email: Option<String>,

    pub display_name: Option<String>,

    pub photo_url: Option<String>,

    pub email_verified: bool,

    /// `"password"` or the federated provider id (e.g. `"google.com"`)
    pub provider_id: String,

    pub metadata: UserMetadata,
}

/// Account timestamps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserMetadata {
    pub creation_time: DateTime<Utc>,
    pub last_sign_in_time: DateTime<Utc>,
}

impl UserMetadata {
    pub fn now() -> Self {
        let now = Utc::now();
        Self {
            creation_time: now,
            last_sign_in_time: now,
        }
    }
}

impl User {
    /// Create a user record for a freshly registered account
    pub fn new(
        uid: impl Into<String>,
        email: Option<String>,
        provider_id: impl Into<String>,
    ) -> Self {
        Self {
            uid: uid.into(),
            email,
            display_name: None,
            photo_url: None,
            email_verified: false,
            provider_id: provider_id.into(),
            metadata: UserMetadata::now(),
        }
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    /// Record a successful sign-in
    pub fn touch(&mut self) {
        self.metadata.last_sign_in_time = Utc::now();
    }
}

/// Identity providers available for popup sign-in
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FederatedProvider {
    Google,
    GitHub,
    Microsoft,
    Apple,
    /// Any other OIDC/OAuth provider, by provider id
    Custom(String),
}

impl FederatedProvider {
    pub fn provider_id(&self) -> &str {
        match self {
            FederatedProvider::Google => "google.com",
            FederatedProvider::GitHub => "github.com",
            FederatedProvider::Microsoft => "microsoft.com",
            FederatedProvider::Apple => "apple.com",
            FederatedProvider::Custom(id) => id,
        }
    }
}

impl fmt::Display for FederatedProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.provider_id())
    }
}
