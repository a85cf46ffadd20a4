//! # tl-auth-simple
//!
//! Argon2-based implementation of `AuthProvider`.
//! Handles password hashing and signed session tokens.

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use sha2::{Digest, Sha256};
use tl_core::error::{AppError, Result};
use tl_core::traits::AuthProvider;
use uuid::Uuid;

pub struct SimpleAuthProvider {
    /// Secret mixed into every session signature
    session_secret: String,
}

impl SimpleAuthProvider {
    /// Accepts a secret string (e.g., from an environment variable)
    pub fn new(secret: &str) -> Self {
        Self {
            session_secret: secret.to_string(),
        }
    }

    /// A provider with a secret that only lives as long as the process.
    /// Sessions do not survive a restart.
    pub fn ephemeral() -> Result<Self> {
        let mut bytes = [0u8; 32];
        getrandom::getrandom(&mut bytes)
            .map_err(|e| AppError::Internal(format!("no randomness available: {e}")))?;
        Ok(Self::new(&URL_SAFE_NO_PAD.encode(bytes)))
    }

    fn sign(&self, user_id: &Uuid) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.session_secret.as_bytes());
        hasher.update(user_id.as_bytes());
        URL_SAFE_NO_PAD.encode(hasher.finalize())
    }
}

/// Compares without returning early on the first mismatch.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[async_trait]
impl AuthProvider for SimpleAuthProvider {
    fn hash_password(&self, password: &str) -> Result<String> {
        let mut salt_bytes = [0u8; 16];
        getrandom::getrandom(&mut salt_bytes)
            .map_err(|e| AppError::Internal(format!("no randomness available: {e}")))?;
        let salt = SaltString::encode_b64(&salt_bytes)
            .map_err(|e| AppError::Internal(format!("bad salt: {e}")))?;

        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AppError::Internal(format!("password hashing failed: {e}")))
    }

    /// Verifies if a provided password matches a stored Argon2 hash.
    async fn verify_password(&self, password: &str, hash: &str) -> bool {
        let parsed_hash = match PasswordHash::new(hash) {
            Ok(p) => p,
            Err(_) => return false,
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }

    /// Token format: `<uuid>.<base64url(sha256(secret || uuid bytes))>`
    fn issue_session(&self, user_id: Uuid) -> String {
        format!("{}.{}", user_id, self.sign(&user_id))
    }

    fn resolve_session(&self, token: &str) -> Option<Uuid> {
        let (id, signature) = token.split_once('.')?;
        let user_id = Uuid::parse_str(id).ok()?;
        if constant_time_eq(self.sign(&user_id).as_bytes(), signature.as_bytes()) {
            Some(user_id)
        } else {
            log::warn!("rejected session token with a bad signature");
            None
        }
    }
}
