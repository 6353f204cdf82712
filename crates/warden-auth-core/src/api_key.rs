//! Preshared API key check for trusted server-to-server callers

use crate::crypto::constant_time_str_eq;

/// Validates keys against a single preshared secret
#[derive(Clone)]
pub struct ApiKeyValidator {
    expected: Option<String>,
}

impl ApiKeyValidator {
    /// `None` (or an empty key) rejects everything
    pub fn new(expected: Option<String>) -> Self {
        Self {
            expected: expected.filter(|key| !key.is_empty()),
        }
    }

    /// Whether a key is configured at all
    pub fn is_configured(&self) -> bool {
        self.expected.is_some()
    }

    /// Exact, constant-time match against the configured key
    pub fn validate(&self, presented: &str) -> bool {
        match &self.expected {
            Some(expected) => validate_api_key(presented, expected),
            None => false,
        }
    }
}

impl std::fmt::Debug for ApiKeyValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeyValidator")
            .field("configured", &self.is_configured())
            .finish()
    }
}

/// Compare `presented` to `expected` in constant time.
///
/// An empty expected key never matches.
pub fn validate_api_key(presented: &str, expected: &str) -> bool {
    !expected.is_empty() && constant_time_str_eq(presented, expected)
}
