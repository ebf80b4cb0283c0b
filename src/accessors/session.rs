//! Sign-in, sign-up and sign-out

use std::sync::Arc;

use tracing::debug;

use crate::core::backend::AuthBackend;
use crate::core::identity::{FederatedProvider, User};
use crate::core::result::OperationResult;

/// Session operations against the auth backend
///
/// Credentials are forwarded as-is; all validation happens in the backend.
/// A successful call does not update cached session state directly: that
/// happens when the backend's notification reaches the session store.
#[derive(Clone)]
pub struct SessionAccessor {
    auth: Arc<dyn AuthBackend>,
}

impl SessionAccessor {
    pub fn new(auth: Arc<dyn AuthBackend>) -> Self {
        Self { auth }
    }

    /// Sign in with email and password
    pub async fn sign_in(&self, email: &str, password: &str) -> OperationResult<User> {
        debug!("signing in with email and password");
        let result = self
            .auth
            .sign_in_with_email_and_password(email, password)
            .await
            .map(OperationResult::ok);
        OperationResult::capture("sign_in", result)
    }

    /// Create an email/password account; the new user is signed in
    pub async fn sign_up(&self, email: &str, password: &str) -> OperationResult<User> {
        debug!("creating account with email and password");
        let result = self
            .auth
            .create_user_with_email_and_password(email, password)
            .await
            .map(OperationResult::ok);
        OperationResult::capture("sign_up", result)
    }

    pub async fn sign_out(&self) -> OperationResult<()> {
        debug!("signing out");
        let result = self.auth.sign_out().await.map(|()| OperationResult::empty());
        OperationResult::capture("sign_out", result)
    }

    /// Sign in through a federated provider's popup flow
    pub async fn sign_in_with_provider(
        &self,
        provider: &FederatedProvider,
    ) -> OperationResult<User> {
        debug!(provider = %provider, "signing in with federated provider");
        let result = self
            .auth
            .sign_in_with_popup(provider)
            .await
            .map(OperationResult::ok);
        OperationResult::capture("sign_in_with_provider", result)
    }

    pub async fn sign_in_with_google(&self) -> OperationResult<User> {
        self.sign_in_with_provider(&FederatedProvider::Google).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::AuthError;
    use crate::storage::InMemoryAuthBackend;

    fn accessor() -> (InMemoryAuthBackend, SessionAccessor) {
        let backend = InMemoryAuthBackend::new();
        let accessor = SessionAccessor::new(Arc::new(backend.clone()));
        (backend, accessor)
    }

    #[tokio::test]
    async fn test_sign_up_then_sign_in() {
        let (_, sessions) = accessor();

        let created = sessions.sign_up("ada@test.com", "secret-pw").await;
        assert!(created.is_success());
        assert_eq!(
            created.data().unwrap().email.as_deref(),
            Some("ada@test.com")
        );

        let signed_in = sessions.sign_in("ada@test.com", "secret-pw").await;
        assert_eq!(
            signed_in.data().map(|u| u.uid.clone()),
            created.data().map(|u| u.uid.clone())
        );
    }

    #[tokio::test]
    async fn test_rejected_credentials_become_failure() {
        let (_, sessions) = accessor();
        sessions.sign_up("ada@test.com", "secret-pw").await;

        let result = sessions.sign_in("ada@test.com", "wrong").await;
        assert!(result.is_failure());
        assert!(result.data().is_none());
        assert!(result.error().unwrap().contains("auth/invalid-credential"));

        let result = sessions.sign_in("nobody@test.com", "secret-pw").await;
        assert!(!result.error().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sign_up_failures_pass_backend_message() {
        let (_, sessions) = accessor();

        let result = sessions.sign_up("not-an-email", "secret-pw").await;
        assert!(result.error().unwrap().contains("auth/invalid-email"));

        let result = sessions.sign_up("ada@test.com", "123").await;
        assert!(result.error().unwrap().contains("auth/weak-password"));
    }

    #[tokio::test]
    async fn test_sign_out() {
        let (backend, sessions) = accessor();
        sessions.sign_up("ada@test.com", "secret-pw").await;

        let result = sessions.sign_out().await;
        assert_eq!(result, OperationResult::empty());
        assert!(backend.current_user().await.is_none());
    }

    #[tokio::test]
    async fn test_sign_out_failure() {
        let (backend, sessions) = accessor();
        backend.fail_next(AuthError::network_request_failed());

        let result = sessions.sign_out().await;
        assert!(result.error().unwrap().contains("auth/network-request-failed"));
    }

    #[tokio::test]
    async fn test_google_popup() {
        let (backend, sessions) = accessor();

        let cancelled = sessions.sign_in_with_google().await;
        assert!(cancelled.error().unwrap().contains("auth/popup-closed-by-user"));

        backend.register_federated_identity(&FederatedProvider::Google, "ada@gmail.com", "Ada");
        let result = sessions.sign_in_with_google().await;
        let user = result.data().unwrap();
        assert_eq!(user.provider_id, "google.com");
        assert_eq!(user.display_name.as_deref(), Some("Ada"));
    }
}
