use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use chrono::Utc;

use crate::errors::{AppError, AppResult};
use crate::models::User;

// In-memory credential store. Ids are monotonic and never reused for the
// lifetime of the process.
pub struct UserStore {
    users: Arc<RwLock<Vec<User>>>,
    next_id: Arc<AtomicU64>,
}

impl UserStore {
    pub fn new() -> Self {
        Self {
            users: Arc::new(RwLock::new(Vec::new())),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    // The uniqueness check runs under the same write lock as the insert, so
    // two concurrent registrations of one name cannot both win.
    pub fn create(&self, username: &str, password_hash: &str) -> AppResult<User> {
        let mut users = self.users.write().expect("user store lock poisoned");

        if users.iter().any(|u| u.username == username) {
            return Err(AppError::Conflict("Username already exists".to_string()));
        }

        let user = User {
            id: format!("user_{}", self.next_id.fetch_add(1, Ordering::Relaxed)),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };
        users.push(user.clone());
        Ok(user)
    }

    // Lookup is case-sensitive: "Alice" and "alice" are distinct users.
    pub fn find_by_username(&self, username: &str) -> Option<User> {
        self.users
            .read()
            .expect("user store lock poisoned")
            .iter()
            .find(|u| u.username == username)
            .cloned()
    }

    pub fn find_by_id(&self, id: &str) -> Option<User> {
        self.users
            .read()
            .expect("user store lock poisoned")
            .iter()
            .find(|u| u.id == id)
            .cloned()
    }
}

impl Default for UserStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for UserStore {
    fn clone(&self) -> Self {
        Self {
            users: self.users.clone(),
            next_id: self.next_id.clone(),
        }
    }
}
