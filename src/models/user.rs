use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone)]
pub struct User {
    pub id: String,
    pub username: String,
    pub password_hash: String,  // We store hashed passwords, not plain text
    pub created_at: DateTime<Utc>,
}

// The projection of a user that may leave the server: responses and token
// claims carry this, never the hash.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct UserSummary {
    pub id: String,
    pub username: String,
}

impl User {
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id.clone(),
            username: self.username.clone(),
        }
    }
}
