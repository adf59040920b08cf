//! Registered users and the active session.
//!
//! The user collection and the session pointer live in memory behind a lock
//! and are mirrored to device storage after every mutation. In-memory state is
//! authoritative for the running process; storage is authoritative across
//! restarts.

use std::sync::Arc;

use entities::{NewUser, ProfileUpdate, User};
use kv_store::{load_json, save_json, KeyValueStore};
use serde::Serialize;
use tokio::sync::RwLock;

use crate::{AuthError, AuthResult};

/// Storage key of the registered-users collection.
pub const STORAGE_KEY_USERS: &str = "users_storage_key";

/// Storage key of the active-user record.
pub const STORAGE_KEY_CURRENT_USER: &str = "current_user";

#[derive(Debug, Default)]
struct AuthState {
    users: Vec<User>,
    current: Option<User>,
}

/// Owns the registered-user collection and the active-user pointer.
pub struct AuthStore {
    storage: Arc<dyn KeyValueStore>,
    state: RwLock<AuthState>,
}

impl AuthStore {
    /// Creates an empty store. Call [`AuthStore::load`] to restore persisted state.
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            storage,
            state: RwLock::new(AuthState::default()),
        }
    }

    /// Restores the user collection and session from storage.
    ///
    /// Unreadable records are logged and treated as an empty collection and
    /// no active user.
    pub async fn load(&self) {
        let users = match load_json::<Vec<User>>(self.storage.as_ref(), STORAGE_KEY_USERS).await {
            Ok(users) => users.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load users, starting empty");
                Vec::new()
            }
        };

        let current =
            match load_json::<User>(self.storage.as_ref(), STORAGE_KEY_CURRENT_USER).await {
                Ok(current) => current,
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to load current user, starting signed out");
                    None
                }
            };

        tracing::debug!(
            users = users.len(),
            user_id = current.as_ref().map(|u| u.id.as_str()),
            "Loaded auth state"
        );

        let mut state = self.state.write().await;
        state.users = users;
        state.current = current;
    }

    /// Registers a new user and signs them in.
    ///
    /// Returns `Ok(false)` if the email is already registered, ignoring case,
    /// or if the candidate carries an identifier another user already has.
    pub async fn register(&self, candidate: NewUser) -> AuthResult<bool> {
        let user = candidate.into_user();

        let users = {
            let mut state = self.state.write().await;
            if state.users.iter().any(|u| u.has_email(&user.email)) {
                tracing::debug!(email = %user.email, "Registration rejected, email in use");
                return Ok(false);
            }
            if state.users.iter().any(|u| u.id == user.id) {
                tracing::debug!(user_id = %user.id, "Registration rejected, identifier in use");
                return Ok(false);
            }
            state.users.push(user.clone());
            state.current = Some(user.clone());
            state.users.clone()
        };

        tracing::info!(user_id = %user.id, "Registered user");

        let saved_users = self.persist(STORAGE_KEY_USERS, &users).await;
        let saved_current = self.persist(STORAGE_KEY_CURRENT_USER, &user).await;
        saved_users.and(saved_current)?;
        Ok(true)
    }

    /// Signs in with an email (any case) and the exact password.
    ///
    /// Returns `Ok(false)` on invalid credentials.
    pub async fn login(&self, email: &str, password: &str) -> AuthResult<bool> {
        let found = {
            let mut state = self.state.write().await;
            let found = state
                .users
                .iter()
                .find(|u| u.has_email(email) && u.password == password)
                .cloned();
            match found {
                Some(user) => {
                    state.current = Some(user.clone());
                    user
                }
                None => {
                    tracing::debug!(email, "Login rejected");
                    return Ok(false);
                }
            }
        };

        tracing::info!(user_id = %found.id, "User signed in");

        self.persist(STORAGE_KEY_CURRENT_USER, &found).await?;
        Ok(true)
    }

    /// Signs out the active user, if any.
    pub async fn logout(&self) -> AuthResult<()> {
        let previous = self.state.write().await.current.take();

        if let Some(user) = previous {
            tracing::info!(user_id = %user.id, "User signed out");
        }

        if let Err(e) = self.storage.remove_item(STORAGE_KEY_CURRENT_USER).await {
            tracing::error!(key = STORAGE_KEY_CURRENT_USER, error = %e, "Failed to clear session");
            return Err(e.into());
        }
        Ok(())
    }

    /// Merges `update` into the active user and its collection entry.
    ///
    /// Returns `Ok(false)` if nobody is signed in, or if the update would give
    /// the user an email already registered to someone else.
    pub async fn update_profile(&self, update: ProfileUpdate) -> AuthResult<bool> {
        let (current, users) = {
            let mut state = self.state.write().await;
            let AuthState { users, current } = &mut *state;
            let Some(current) = current.as_mut() else {
                tracing::debug!("Profile update rejected, nobody signed in");
                return Ok(false);
            };

            if let Some(email) = &update.email {
                if users.iter().any(|u| u.id != current.id && u.has_email(email)) {
                    tracing::debug!(user_id = %current.id, "Profile update rejected, email in use");
                    return Ok(false);
                }
            }

            current.apply(&update);
            if let Some(entry) = users.iter_mut().find(|u| u.id == current.id) {
                entry.apply(&update);
            }
            (current.clone(), users.clone())
        };

        tracing::info!(user_id = %current.id, "Updated profile");

        let saved_current = self.persist(STORAGE_KEY_CURRENT_USER, &current).await;
        let saved_users = self.persist(STORAGE_KEY_USERS, &users).await;
        saved_current.and(saved_users)?;
        Ok(true)
    }

    /// Returns the active user.
    pub async fn current_user(&self) -> Option<User> {
        self.state.read().await.current.clone()
    }

    /// Returns the active user's identifier.
    pub async fn active_identity(&self) -> Option<String> {
        let state = self.state.read().await;
        state.current.as_ref().map(|u| u.id.clone())
    }

    /// Returns every registered user.
    pub async fn users(&self) -> Vec<User> {
        self.state.read().await.users.clone()
    }

    async fn persist<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> AuthResult<()> {
        save_json(self.storage.as_ref(), key, value).await.map_err(|e| {
            tracing::error!(key, error = %e, "Failed to persist auth state");
            AuthError::from(e)
        })
    }
}
