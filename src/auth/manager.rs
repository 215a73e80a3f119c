//! Authentication Manager

use super::{AuthResult, Clock, RegistrationRequest, SystemClock, User};
use super::types::{
    MSG_ACCOUNT_CREATED, MSG_CREATE_FAILED, MSG_DUPLICATE_EMAIL, MSG_INVALID_CREDENTIALS,
    MSG_LOGIN_FAILED, MSG_LOGIN_OK,
};
use crate::config::AuthConfig;
use crate::export::ExportArtifact;
use crate::storage::StoreHandle;
use crate::Result;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Account registry and session pointer on top of a key-value store.
///
/// The whole user list lives under one key and is rewritten on every change.
/// Two managers sharing a backend can therefore overwrite each other's
/// changes: the last full-list write wins.
pub struct AuthManager {
    store: StoreHandle,
    users_key: String,
    current_user_key: String,
    clock: Arc<dyn Clock>,
    last_issued_id: AtomicI64,
}

impl AuthManager {
    /// Create a manager over `store` and make sure the user list exists
    pub fn new(store: StoreHandle, config: &AuthConfig) -> Self {
        Self::with_clock(store, config, Arc::new(SystemClock))
    }

    /// Same as `new` with an explicit time source
    pub fn with_clock(store: StoreHandle, config: &AuthConfig, clock: Arc<dyn Clock>) -> Self {
        let manager = Self {
            store,
            users_key: config.users_key.clone(),
            current_user_key: config.current_user_key.clone(),
            clock,
            last_issued_id: AtomicI64::new(0),
        };
        manager.ensure_initialized();
        manager
    }

    /// Write an empty user list if none is stored yet
    pub fn ensure_initialized(&self) {
        match self.store.get(&self.users_key) {
            Ok(Some(raw)) if !raw.is_empty() => {}
            Ok(_) => {
                if let Err(e) = self.store.set(&self.users_key, "[]") {
                    error!("Error initializing user storage: {}", e);
                } else {
                    debug!("Initialized empty user list under '{}'", self.users_key);
                }
            }
            Err(e) => error!("Error reading user storage during initialization: {}", e),
        }
    }

    /// All registered users in insertion order.
    ///
    /// Unreadable or malformed data yields an empty list.
    pub fn list_users(&self) -> Vec<User> {
        let raw = match self.store.get(&self.users_key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                error!("Error reading users data: {}", e);
                return Vec::new();
            }
        };

        match serde_json::from_str::<Option<Vec<User>>>(&raw) {
            Ok(users) => users.unwrap_or_default(),
            Err(e) => {
                error!("Error parsing users data: {}", e);
                Vec::new()
            }
        }
    }

    /// Replace the stored user list. Returns `false` if the write failed.
    pub fn save_users(&self, users: &[User]) -> bool {
        let serialized = match serde_json::to_string(users) {
            Ok(serialized) => serialized,
            Err(e) => {
                error!("Error serializing users data: {}", e);
                return false;
            }
        };

        match self.store.set(&self.users_key, &serialized) {
            Ok(()) => true,
            Err(e) => {
                error!("Error saving users data: {}", e);
                false
            }
        }
    }

    /// Create a new account unless the email is already taken
    pub fn register(&self, request: RegistrationRequest) -> AuthResult {
        let mut users = self.list_users();

        if users.iter().any(|u| u.email == request.email) {
            info!("Registration rejected, email '{}' already registered", request.email);
            return AuthResult::failed(MSG_DUPLICATE_EMAIL);
        }

        let now = self.clock.now();
        let user = User {
            id: self.next_id(&users),
            first_name: request.first_name,
            last_name: request.last_name,
            email: request.email,
            password: request.password,
            phone: request.phone,
            created_at: now,
            last_login: None,
        };

        users.push(user.clone());

        if self.save_users(&users) {
            info!("Registered user '{}' with id {}", user.email, user.id);
            AuthResult::succeeded(MSG_ACCOUNT_CREATED, user)
        } else {
            AuthResult::failed(MSG_CREATE_FAILED)
        }
    }

    /// Check credentials, stamp `last_login` and open a session.
    ///
    /// Unknown email and wrong password produce the same failure. If the
    /// session cannot be written the login fails with a generic message.
    pub fn login(&self, email: &str, password: &str) -> AuthResult {
        let mut users = self.list_users();

        let Some(index) = users
            .iter()
            .position(|u| u.email == email && credentials_match(&u.password, password))
        else {
            warn!("Failed login attempt for '{}'", email);
            return AuthResult::failed(MSG_INVALID_CREDENTIALS);
        };

        users[index].last_login = Some(self.clock.now());
        if !self.save_users(&users) {
            warn!("Login for '{}' proceeds without a persisted last-login time", email);
        }

        let user = users.swap_remove(index);
        let snapshot = match serde_json::to_string(&user) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                error!("Error serializing current user: {}", e);
                return AuthResult::failed(MSG_LOGIN_FAILED);
            }
        };

        // no session means no login
        if let Err(e) = self.store.set(&self.current_user_key, &snapshot) {
            error!("Error saving current user: {}", e);
            return AuthResult::failed(MSG_LOGIN_FAILED);
        }

        info!("Successful login for '{}'", user.email);
        AuthResult::succeeded(MSG_LOGIN_OK, user)
    }

    /// Snapshot of the logged-in user taken at login time
    pub fn current_user(&self) -> Option<User> {
        let raw = match self.store.get(&self.current_user_key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                error!("Error getting current user: {}", e);
                return None;
            }
        };

        match serde_json::from_str::<Option<User>>(&raw) {
            Ok(user) => user,
            Err(e) => {
                error!("Error getting current user: {}", e);
                None
            }
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.current_user().is_some()
    }

    /// Drop the session pointer. Always reports success.
    pub fn logout(&self) -> bool {
        if let Err(e) = self.store.remove(&self.current_user_key) {
            error!("Error removing current user: {}", e);
        } else {
            debug!("Session cleared");
        }
        true
    }

    /// Dump every stored user, passwords included, as a downloadable file
    pub fn export_all(&self) -> Result<ExportArtifact> {
        let users = self.list_users();
        let artifact = ExportArtifact::from_users(&users)?;
        info!("Exported {} users", users.len());
        Ok(artifact)
    }

    /// Wipe every key in the backing store, then recreate the empty user list
    pub fn clear_all(&self) -> bool {
        let cleared = match self.store.clear() {
            Ok(()) => {
                warn!("All stored data cleared from {} storage", self.store.backend_name());
                true
            }
            Err(e) => {
                error!("Error clearing storage: {}", e);
                false
            }
        };
        self.ensure_initialized();
        cleared
    }

    /// Millisecond timestamp id, kept unique against `existing` and earlier ids
    fn next_id(&self, existing: &[User]) -> String {
        let now = self.clock.now().timestamp_millis();
        let mut candidate = now.max(self.last_issued_id.load(Ordering::SeqCst) + 1);

        while existing.iter().any(|u| u.id == candidate.to_string()) {
            candidate += 1;
        }

        self.last_issued_id.fetch_max(candidate, Ordering::SeqCst);
        candidate.to_string()
    }
}

/// Exact string equality, evaluated in time independent of where the inputs differ
fn credentials_match(stored: &str, supplied: &str) -> bool {
    if stored.len() != supplied.len() {
        return false;
    }

    let mut result = 0u8;
    for (a, b) in stored.bytes().zip(supplied.bytes()) {
        result |= a ^ b;
    }

    result == 0
}
