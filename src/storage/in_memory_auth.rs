//! In-memory implementation of AuthBackend for testing and development

use crate::core::backend::AuthBackend;
use crate::core::error::AuthError;
use crate::core::events::{AuthEvent, AuthEventBus, AuthEventEnvelope};
use crate::core::identity::{FederatedProvider, PASSWORD_PROVIDER_ID, User};
use argon2::password_hash::{PasswordHash, SaltString};
use argon2::{Algorithm, Argon2, Params, PasswordHasher, PasswordVerifier, Version};
use async_trait::async_trait;
use regex::Regex;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, LazyLock, Mutex, RwLock};
use tokio::sync::broadcast;
use uuid::Uuid;

const MIN_PASSWORD_LENGTH: usize = 6;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

struct Account {
    user: User,
    password_hash: String,
}

/// In-memory auth backend
///
/// Email/password accounts are keyed by lowercased email with argon2-hashed
/// passwords. Popup sign-in succeeds only for identities registered with
/// [`register_federated_identity`](Self::register_federated_identity);
/// anything else behaves as if the user closed the popup.
///
/// Every session change is published on the backend's [`AuthEventBus`].
#[derive(Clone)]
pub struct InMemoryAuthBackend {
    accounts: Arc<RwLock<HashMap<String, Account>>>,
    federated: Arc<RwLock<HashMap<String, User>>>,
    current: Arc<RwLock<Option<User>>>,
    events: AuthEventBus,
    faults: Arc<Mutex<VecDeque<AuthError>>>,
}

impl InMemoryAuthBackend {
    pub fn new() -> Self {
        Self {
            accounts: Arc::new(RwLock::new(HashMap::new())),
            federated: Arc::new(RwLock::new(HashMap::new())),
            current: Arc::new(RwLock::new(None)),
            events: AuthEventBus::default(),
            faults: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    /// Make the next operation fail with `error`
    pub fn fail_next(&self, error: AuthError) {
        if let Ok(mut faults) = self.faults.lock() {
            faults.push_back(error);
        }
    }

    /// Register the identity a popup for `provider` will complete with
    pub fn register_federated_identity(
        &self,
        provider: &FederatedProvider,
        email: &str,
        display_name: &str,
    ) -> User {
        let mut user = User::new(
            Uuid::new_v4().simple().to_string(),
            Some(email.to_string()),
            provider.provider_id(),
        )
        .with_display_name(display_name);
        user.email_verified = true;

        if let Ok(mut federated) = self.federated.write() {
            federated.insert(provider.provider_id().to_string(), user.clone());
        }
        user
    }

    /// Bus the backend publishes session changes on
    pub fn events(&self) -> &AuthEventBus {
        &self.events
    }

    fn take_fault(&self) -> Result<(), AuthError> {
        let mut faults = self
            .faults
            .lock()
            .map_err(|e| AuthError::internal(format!("Failed to acquire fault lock: {}", e)))?;
        match faults.pop_front() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    /// Replace the session user and announce the change
    ///
    /// `announce` sees the previous user. The event is published before the
    /// write guard drops, so notification order matches write order.
    fn switch_session(
        &self,
        user: Option<User>,
        announce: impl FnOnce(Option<&User>) -> Option<AuthEvent>,
    ) -> Result<(), AuthError> {
        let mut current = self
            .current
            .write()
            .map_err(|e| AuthError::internal(format!("Failed to acquire write lock: {}", e)))?;
        let previous = std::mem::replace(&mut *current, user);
        if let Some(event) = announce(previous.as_ref()) {
            self.events.publish(event);
        }
        Ok(())
    }
}

impl Default for InMemoryAuthBackend {
    fn default() -> Self {
        Self::new()
    }
}

// Light parameters: this backend exists for tests and local development.
fn hasher() -> Result<Argon2<'static>, AuthError> {
    let params = Params::new(1024, 1, 1, None)
        .map_err(|e| AuthError::internal(format!("Invalid hashing parameters: {}", e)))?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt_bytes: [u8; 16] = rand::random();
    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|e| AuthError::internal(format!("Failed to encode salt: {}", e)))?;
    let hash = hasher()?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::internal(format!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}

fn verify_password(hash: &str, password: &str) -> bool {
    let Ok(argon2) = hasher() else {
        return false;
    };
    PasswordHash::new(hash)
        .and_then(|parsed| argon2.verify_password(password.as_bytes(), &parsed))
        .is_ok()
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[async_trait]
impl AuthBackend for InMemoryAuthBackend {
    async fn sign_in_with_email_and_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<User, AuthError> {
        self.take_fault()?;

        let user = {
            let mut accounts = self
                .accounts
                .write()
                .map_err(|e| AuthError::internal(format!("Failed to acquire write lock: {}", e)))?;
            let account = accounts
                .get_mut(&normalize_email(email))
                .filter(|account| verify_password(&account.password_hash, password))
                .ok_or_else(AuthError::invalid_credential)?;
            account.user.touch();
            account.user.clone()
        };

        self.switch_session(Some(user.clone()), |_| {
            Some(AuthEvent::SignedIn { user: user.clone() })
        })?;
        Ok(user)
    }

    async fn create_user_with_email_and_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<User, AuthError> {
        self.take_fault()?;

        let key = normalize_email(email);
        if !EMAIL_PATTERN.is_match(&key) {
            return Err(AuthError::invalid_email());
        }
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AuthError::weak_password());
        }

        let user = {
            let mut accounts = self
                .accounts
                .write()
                .map_err(|e| AuthError::internal(format!("Failed to acquire write lock: {}", e)))?;
            if accounts.contains_key(&key) {
                return Err(AuthError::email_already_in_use());
            }
            let user = User::new(
                Uuid::new_v4().simple().to_string(),
                Some(key.clone()),
                PASSWORD_PROVIDER_ID,
            );
            accounts.insert(
                key,
                Account {
                    user: user.clone(),
                    password_hash: hash_password(password)?,
                },
            );
            user
        };

        self.switch_session(Some(user.clone()), |_| {
            Some(AuthEvent::SignedUp { user: user.clone() })
        })?;
        Ok(user)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.take_fault()?;

        // Only an actual transition is announced.
        self.switch_session(None, |previous| previous.map(|_| AuthEvent::SignedOut))
    }

    async fn sign_in_with_popup(&self, provider: &FederatedProvider) -> Result<User, AuthError> {
        self.take_fault()?;

        let mut user = {
            let federated = self
                .federated
                .read()
                .map_err(|e| AuthError::internal(format!("Failed to acquire read lock: {}", e)))?;
            federated
                .get(provider.provider_id())
                .cloned()
                .ok_or_else(AuthError::popup_closed_by_user)?
        };
        user.touch();

        self.switch_session(Some(user.clone()), |_| {
            Some(AuthEvent::SignedIn { user: user.clone() })
        })?;
        Ok(user)
    }

    async fn current_user(&self) -> Option<User> {
        self.current.read().ok().and_then(|current| current.clone())
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEventEnvelope> {
        self.events.subscribe()
    }
}
