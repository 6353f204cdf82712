//! Auth errors

use thiserror::Error;

/// Authentication errors
///
/// Variants stay distinct for logging and metrics. What reaches a client is
/// [`AuthError::public_message`], which is uniform per failure class.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Unknown email or wrong password
    #[error("invalid credentials")]
    InvalidCredentials,

    /// No credential header present
    #[error("missing credential")]
    MissingCredential,

    /// Credential header present but not in the expected scheme
    #[error("malformed credential")]
    MalformedCredential,

    /// Invalid token (malformed, bad signature, unknown, etc.)
    #[error("invalid token")]
    InvalidToken,

    /// Token has expired
    #[error("token expired")]
    TokenExpired,

    /// Refresh token has been revoked
    #[error("token revoked")]
    TokenRevoked,

    /// Preshared API key missing or wrong
    #[error("invalid API key")]
    InvalidApiKey,

    /// Email already registered
    #[error("email already registered")]
    EmailTaken,

    /// Password longer than bcrypt can hash without truncating
    #[error("password too long")]
    PasswordTooLong,

    /// User not found
    #[error("user not found")]
    UserNotFound,

    /// Persistence collaborator failed
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// Hashing primitive failed (e.g. no entropy for a salt). Never degraded around.
    #[error("password hashing failed: {0}")]
    HashingFailed(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidCredentials
            | Self::MissingCredential
            | Self::MalformedCredential
            | Self::InvalidToken
            | Self::TokenExpired
            | Self::TokenRevoked
            | Self::InvalidApiKey => 401,
            Self::PasswordTooLong => 400,
            Self::UserNotFound => 404,
            Self::EmailTaken => 409,
            Self::StoreUnavailable(_)
            | Self::HashingFailed(_)
            | Self::Configuration(_)
            | Self::Internal(_) => 500,
        }
    }

    /// Get error code for logs
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::MissingCredential => "MISSING_CREDENTIAL",
            Self::MalformedCredential => "MALFORMED_CREDENTIAL",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::TokenRevoked => "TOKEN_REVOKED",
            Self::InvalidApiKey => "INVALID_API_KEY",
            Self::EmailTaken => "EMAIL_TAKEN",
            Self::PasswordTooLong => "PASSWORD_TOO_LONG",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::StoreUnavailable(_) => "STORE_UNAVAILABLE",
            Self::HashingFailed(_) => "HASHING_FAILED",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Error code safe to show a client.
    ///
    /// All token failures share one code, so a caller cannot tell a
    /// malformed token from an expired or revoked one.
    pub fn public_code(&self) -> &'static str {
        match self {
            Self::InvalidToken | Self::TokenExpired | Self::TokenRevoked => "INVALID_TOKEN",
            Self::MissingCredential | Self::MalformedCredential => "UNAUTHORIZED",
            Self::StoreUnavailable(_)
            | Self::HashingFailed(_)
            | Self::Configuration(_)
            | Self::Internal(_) => "INTERNAL_ERROR",
            other => other.error_code(),
        }
    }

    /// Message safe to show a client
    pub fn public_message(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "incorrect email or password",
            Self::MissingCredential | Self::MalformedCredential => "authentication required",
            Self::InvalidToken | Self::TokenExpired | Self::TokenRevoked => {
                "invalid or expired token"
            }
            Self::InvalidApiKey => "invalid API key",
            Self::EmailTaken => "email already registered",
            Self::PasswordTooLong => "password must be at most 72 bytes",
            Self::UserNotFound => "user not found",
            Self::StoreUnavailable(_)
            | Self::HashingFailed(_)
            | Self::Configuration(_)
            | Self::Internal(_) => "internal error",
        }
    }

    /// Whether this is a credential failure (401-class) rather than a server fault
    pub fn is_credential_failure(&self) -> bool {
        self.status_code() == 401
    }
}

impl From<warden_db::DbError> for AuthError {
    fn from(err: warden_db::DbError) -> Self {
        tracing::error!("Database error: {}", err);
        Self::StoreUnavailable(err.to_string())
    }
}
