//! Credential extraction from the `Authorization` header

use http::header::AUTHORIZATION;
use http::HeaderMap;

use crate::AuthError;

/// Scheme for access and refresh tokens
pub const BEARER_SCHEME: &str = "Bearer";

/// Scheme for the preshared webhook key
pub const API_KEY_SCHEME: &str = "ApiKey";

/// Extract the token from a `Bearer <value>` header value
pub fn extract_bearer(header: Option<&str>) -> Result<&str, AuthError> {
    extract_credential(header, BEARER_SCHEME)
}

/// Extract the value from `<scheme> <value>`.
///
/// The scheme is case-sensitive and followed by exactly one space. The value
/// must be non-empty and contain no whitespace.
///
/// # Errors
/// `MissingCredential` when the header is absent or empty,
/// `MalformedCredential` for anything else that does not match.
pub fn extract_credential<'a>(header: Option<&'a str>, scheme: &str) -> Result<&'a str, AuthError> {
    let header = match header {
        Some(h) if !h.is_empty() => h,
        _ => return Err(AuthError::MissingCredential),
    };

    let value = header
        .strip_prefix(scheme)
        .and_then(|rest| rest.strip_prefix(' '))
        .ok_or(AuthError::MalformedCredential)?;

    if value.is_empty() || value.contains(char::is_whitespace) {
        return Err(AuthError::MalformedCredential);
    }

    Ok(value)
}

/// Pull the credential for `scheme` out of request headers.
///
/// A header value that is not visible ASCII is malformed.
pub fn credential_from_headers<'a>(
    headers: &'a HeaderMap,
    scheme: &str,
) -> Result<&'a str, AuthError> {
    let header = headers
        .get(AUTHORIZATION)
        .map(|value| value.to_str().map_err(|_| AuthError::MalformedCredential))
        .transpose()?;
    extract_credential(header, scheme)
}

/// Bearer token from request headers
pub fn bearer_from_headers(headers: &HeaderMap) -> Result<&str, AuthError> {
    credential_from_headers(headers, BEARER_SCHEME)
}
