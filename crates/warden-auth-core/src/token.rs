//! Signed access tokens (HS256 JWT)
//!
//! Access tokens are stateless. Validity is decided by the signature and the
//! claim checks alone; nothing is stored server side.

use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;
use warden_types::UserId;

use crate::crypto::constant_time_str_eq;
use crate::{AuthConfig, AuthError};

/// The only algorithm accepted. The `alg` header is never consulted.
pub const ACCESS_TOKEN_ALGORITHM: Algorithm = Algorithm::HS256;

/// Claims carried by an access token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Issuer
    pub iss: String,
    /// Subject (user id)
    pub sub: String,
    /// Audience, always `[sub]`
    pub aud: Vec<String>,
    /// Expiration (seconds since epoch)
    pub exp: i64,
    /// Not before (seconds since epoch)
    pub nbf: i64,
    /// Issued at (seconds since epoch)
    pub iat: i64,
    /// Token id
    pub jti: String,
}

impl AccessClaims {
    /// Parse the subject as a user id
    pub fn user_id(&self) -> Option<UserId> {
        UserId::parse(&self.sub).ok()
    }
}

/// Why a token was refused.
///
/// Kept for debug logging only. Callers always see [`AuthError::InvalidToken`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenRejection {
    #[error("token is not a well-formed JWT")]
    Malformed,

    #[error("signature does not verify")]
    BadSignature,

    #[error("algorithm is not HS256")]
    WrongAlgorithm,

    #[error("token has expired")]
    Expired,

    #[error("token is not yet valid")]
    NotYetValid,

    #[error("issuer does not match")]
    WrongIssuer,

    #[error("required claim missing: {0}")]
    MissingClaim(String),

    #[error("subject is not a user id")]
    InvalidSubject,

    #[error("audience does not contain the subject")]
    AudienceMismatch,
}

impl From<jsonwebtoken::errors::Error> for TokenRejection {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::InvalidSignature => Self::BadSignature,
            ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => Self::WrongAlgorithm,
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::ImmatureSignature => Self::NotYetValid,
            ErrorKind::InvalidIssuer => Self::WrongIssuer,
            ErrorKind::MissingRequiredClaim(claim) => Self::MissingClaim(claim.clone()),
            _ => Self::Malformed,
        }
    }
}

/// Issues and validates access tokens.
///
/// Constructed once from [`AuthConfig`] and shared. The keys are derived up
/// front so per-request work is a single HMAC.
#[derive(Clone)]
pub struct TokenSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
    default_ttl: Duration,
    max_ttl: Duration,
}

impl TokenSigner {
    /// Build a signer from config
    pub fn new(config: &AuthConfig) -> Self {
        let secret = config.signing_secret.as_bytes();

        let mut validation = Validation::new(ACCESS_TOKEN_ALGORITHM);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.set_issuer(&[config.issuer.as_str()]);
        // aud is per-user; checked against sub after decoding
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp", "nbf", "iss", "sub", "aud"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            issuer: config.issuer.clone(),
            default_ttl: config.access_token_ttl,
            max_ttl: config.access_token_max_ttl,
        }
    }

    /// Issue a token for `user_id` valid for `ttl` from now.
    ///
    /// A zero `ttl` means the default lifetime; anything above the ceiling is
    /// clamped.
    pub fn issue(&self, user_id: UserId, ttl: Duration) -> Result<String, AuthError> {
        self.issue_at(user_id, Utc::now(), ttl)
    }

    /// Issue a token as if the current time were `now`
    pub fn issue_at(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<String, AuthError> {
        let claims = self.claims_at(user_id, now, ttl);
        encode(&Header::new(ACCESS_TOKEN_ALGORITHM), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to sign access token: {}", e);
            AuthError::Internal("failed to sign access token".to_string())
        })
    }

    /// Build the claim set for a token issued at `now`
    pub fn claims_at(&self, user_id: UserId, now: DateTime<Utc>, ttl: Duration) -> AccessClaims {
        let ttl = self.effective_ttl(ttl);
        let iat = now.timestamp();
        let exp = iat.saturating_add(i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX));
        let sub = user_id.to_string();

        AccessClaims {
            iss: self.issuer.clone(),
            aud: vec![sub.clone()],
            sub,
            exp,
            nbf: iat,
            iat,
            jti: Uuid::new_v4().to_string(),
        }
    }

    /// Lifetime actually used for a requested `ttl`
    pub fn effective_ttl(&self, ttl: Duration) -> Duration {
        if ttl.is_zero() {
            self.default_ttl
        } else {
            ttl.min(self.max_ttl)
        }
    }

    /// Decode and check a token, keeping the rejection reason.
    pub fn inspect(&self, token: &str) -> Result<AccessClaims, TokenRejection> {
        let data = decode::<AccessClaims>(token, &self.decoding_key, &self.validation)?;
        let claims = data.claims;

        if claims.user_id().is_none() {
            return Err(TokenRejection::InvalidSubject);
        }

        let audience_ok = claims
            .aud
            .iter()
            .any(|aud| constant_time_str_eq(aud, &claims.sub));
        if !audience_ok {
            return Err(TokenRejection::AudienceMismatch);
        }

        Ok(claims)
    }

    /// Validate a token and return its subject.
    ///
    /// Every failure is [`AuthError::InvalidToken`]; the reason is logged at
    /// debug level.
    pub fn validate(&self, token: &str) -> Result<UserId, AuthError> {
        let claims = self.inspect(token).map_err(|reason| {
            tracing::debug!(reason = %reason, "Access token rejected");
            AuthError::InvalidToken
        })?;

        claims.user_id().ok_or(AuthError::InvalidToken)
    }
}

impl std::fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSigner")
            .field("issuer", &self.issuer)
            .field("default_ttl", &self.default_ttl)
            .field("max_ttl", &self.max_ttl)
            .finish_non_exhaustive()
    }
}
