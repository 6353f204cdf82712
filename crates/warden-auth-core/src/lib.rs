//! Warden Auth Core - Authentication business logic
//!
//! Password hashing, signed access tokens, refresh token lifecycle,
//! credential extraction and the session manager that composes them.

pub mod api_key;
pub mod bearer;
pub mod config;
pub mod crypto;
pub mod error;
pub mod password;
pub mod refresh;
pub mod session;
pub mod token;

pub use api_key::{validate_api_key, ApiKeyValidator};
pub use bearer::{
    bearer_from_headers, credential_from_headers, extract_bearer, extract_credential,
    API_KEY_SCHEME, BEARER_SCHEME,
};
pub use config::AuthConfig;
pub use error::AuthError;
pub use password::{PasswordHasher, MAX_PASSWORD_BYTES};
pub use refresh::RefreshTokenStore;
pub use session::{LoginOutcome, RefreshOutcome, SessionManager};
pub use token::{AccessClaims, TokenRejection, TokenSigner};
