//! Authentication wire types

use serde::{Deserialize, Serialize};

use crate::UserProfile;

/// Credentials submitted to login and registration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    /// Requested access token lifetime. Zero or absent means the default;
    /// values above the configured ceiling are clamped.
    #[serde(default)]
    pub expires_in_seconds: Option<u64>,
}

/// Login response: the profile plus both tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub user: UserProfile,
    /// Signed access token
    pub token: String,
    /// Opaque refresh token
    pub refresh_token: String,
    /// Access token lifetime in seconds
    pub expires_in: u64,
}

/// Refresh response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshResponse {
    /// New access token
    pub token: String,
    /// Access token lifetime in seconds
    pub expires_in: u64,
    /// Replacement refresh token (only when rotation is enabled)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_request_ttl_is_optional() {
        let req: LoginRequest =
            serde_json::from_str(r#"{"email":"a@b.com","password":"secret123"}"#).unwrap();
        assert_eq!(req.expires_in_seconds, None);

        let req: LoginRequest = serde_json::from_str(
            r#"{"email":"a@b.com","password":"secret123","expires_in_seconds":60}"#,
        )
        .unwrap();
        assert_eq!(req.expires_in_seconds, Some(60));
    }

    #[test]
    fn test_refresh_response_omits_absent_refresh_token() {
        let resp = RefreshResponse {
            token: "t".to_string(),
            expires_in: 3600,
            refresh_token: None,
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert!(json.get("refresh_token").is_none());
    }
}
