use bcrypt::{hash, verify};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;
use crate::errors::{AppError, AppResult};
use crate::models::UserSummary;

// Session tokens are valid for seven days from issuance.
const TOKEN_TTL_DAYS: i64 = 7;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    id: String,
    username: String,
    exp: i64,
}

// Password hashing and stateless session tokens. Cheap to clone; handlers
// reach it through the shared application state.
pub struct AuthService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    bcrypt_cost: u32,
    dummy_hash: String,
}

impl AuthService {
    pub fn new(config: &AuthConfig) -> AppResult<Self> {
        Ok(Self {
            encoding_key: EncodingKey::from_secret(config.token_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.token_secret.as_bytes()),
            bcrypt_cost: config.bcrypt_cost,
            // Hashed once at the configured cost so burned verifications
            // take as long as real ones.
            dummy_hash: hash("no such password", config.bcrypt_cost)?,
        })
    }

    pub fn hash_password(&self, password: &str) -> AppResult<String> {
        Ok(hash(password, self.bcrypt_cost)?)
    }

    // False for a wrong password and for an unparseable stored hash.
    pub fn verify_password(&self, password: &str, password_hash: &str) -> bool {
        verify(password, password_hash).unwrap_or(false)
    }

    // Burn one verification against the throwaway hash. Login calls this
    // when the username is unknown so response timing does not reveal which
    // usernames exist.
    pub fn verify_dummy(&self, password: &str) {
        let _ = verify(password, &self.dummy_hash);
    }

    pub fn issue_token(&self, user: &UserSummary) -> AppResult<String> {
        let claims = Claims {
            id: user.id.clone(),
            username: user.username.clone(),
            exp: (Utc::now() + Duration::days(TOKEN_TTL_DAYS)).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Token signing failed: {}", e)))
    }

    // Fails closed: any parse, signature, or expiry problem yields None.
    pub fn validate_token(&self, token: &str) -> Option<UserSummary> {
        decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .ok()
            .map(|data| UserSummary {
                id: data.claims.id,
                username: data.claims.username,
            })
    }
}

impl Clone for AuthService {
    fn clone(&self) -> Self {
        Self {
            encoding_key: self.encoding_key.clone(),
            decoding_key: self.decoding_key.clone(),
            bcrypt_cost: self.bcrypt_cost,
            dummy_hash: self.dummy_hash.clone(),
        }
    }
}
