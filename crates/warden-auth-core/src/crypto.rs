//! Cryptographic utilities for secure operations
//!
//! This module provides security-critical primitives that must be implemented
//! correctly to prevent timing attacks and other side-channel vulnerabilities.

use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::AuthError;

/// Refresh token entropy in bytes (256 bits, 64 hex chars)
pub const REFRESH_TOKEN_BYTES: usize = 32;

/// Generate `len` bytes from the OS CSPRNG, hex-encoded.
///
/// # Errors
/// Returns `AuthError::Internal` if the OS cannot supply randomness. There is
/// no fallback source.
pub fn random_hex(len: usize) -> Result<String, AuthError> {
    let mut bytes = vec![0u8; len];
    OsRng.try_fill_bytes(&mut bytes).map_err(|e| {
        tracing::error!("OS random source failed: {}", e);
        AuthError::Internal("random source unavailable".to_string())
    })?;
    Ok(hex::encode(bytes))
}

/// Constant-time byte slice comparison.
///
/// Returns `false` immediately if lengths differ (length is not secret);
/// otherwise the comparison time does not depend on the contents.
#[inline]
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}

/// Constant-time string comparison.
#[inline]
pub fn constant_time_str_eq(a: &str, b: &str) -> bool {
    constant_time_eq(a.as_bytes(), b.as_bytes())
}

/// Short, non-reversible identifier for a token, safe to put in logs.
///
/// First 12 hex chars of SHA-256.
pub fn token_fingerprint(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    let mut digest = hex::encode(hasher.finalize());
    digest.truncate(12);
    digest
}
