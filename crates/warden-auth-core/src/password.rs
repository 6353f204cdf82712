//! Password hashing (bcrypt)
//!
//! bcrypt embeds the salt and cost in the hash string, so a stored hash is
//! self-describing and old hashes keep verifying after the cost is raised.
//!
//! bcrypt only reads the first 72 bytes of its input. Longer passwords are
//! refused at hashing time instead of being silently truncated.

use crate::AuthError;

/// Lowest cost bcrypt accepts
pub const MIN_PASSWORD_COST: u32 = 4;

/// Highest cost bcrypt accepts
pub const MAX_PASSWORD_COST: u32 = 31;

/// Longest password, in bytes, that bcrypt hashes without truncation
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Salted, adaptive password hasher
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    /// Create a hasher with the given bcrypt cost
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    /// The configured cost factor
    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash a plaintext password.
    ///
    /// # Errors
    /// `PasswordTooLong` past [`MAX_PASSWORD_BYTES`]; `HashingFailed` if the
    /// salt cannot be drawn or the cost is out of range.
    pub fn hash(&self, plaintext: &str) -> Result<String, AuthError> {
        if plaintext.len() > MAX_PASSWORD_BYTES {
            return Err(AuthError::PasswordTooLong);
        }
        bcrypt::hash(plaintext, self.cost).map_err(|e| {
            tracing::error!("Password hashing failed: {}", e);
            AuthError::HashingFailed(e.to_string())
        })
    }

    /// Verify a plaintext password against a stored hash.
    ///
    /// Returns `Ok(false)` on mismatch, and for any password too long to
    /// have been hashed.
    ///
    /// # Errors
    /// `Internal` only when `hash` is not a structurally valid bcrypt hash.
    pub fn verify(&self, hash: &str, plaintext: &str) -> Result<bool, AuthError> {
        if plaintext.len() > MAX_PASSWORD_BYTES {
            return Ok(false);
        }
        bcrypt::verify(plaintext, hash).map_err(|e| {
            tracing::error!("Stored password hash is malformed: {}", e);
            AuthError::Internal("malformed password hash".to_string())
        })
    }

    /// [`hash`](Self::hash) on the blocking thread pool
    pub async fn hash_async(&self, plaintext: String) -> Result<String, AuthError> {
        let hasher = *self;
        tokio::task::spawn_blocking(move || hasher.hash(&plaintext))
            .await
            .map_err(|e| AuthError::Internal(format!("hashing task failed: {e}")))?
    }

    /// [`verify`](Self::verify) on the blocking thread pool
    pub async fn verify_async(&self, hash: String, plaintext: String) -> Result<bool, AuthError> {
        let hasher = *self;
        tokio::task::spawn_blocking(move || hasher.verify(&hash, &plaintext))
            .await
            .map_err(|e| AuthError::Internal(format!("verification task failed: {e}")))?
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(crate::AuthConfig::DEFAULT_PASSWORD_COST)
    }
}
