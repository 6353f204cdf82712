//! Property-based tests for passwords, access tokens and bearer parsing
//!
//! These tests verify:
//! - Hash/verify agrees for every password and rejects every other one
//! - Issued tokens validate back to their subject
//! - Arbitrary input never panics the token or header parsers
//! - Signature or header tampering is always detected

mod common;

use std::time::Duration;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use common::{test_config, TEST_SECRET};
use proptest::prelude::*;
use warden_auth_core::{
    extract_bearer, extract_credential, AuthConfig, AuthError, PasswordHasher, TokenSigner,
    API_KEY_SCHEME, MAX_PASSWORD_BYTES,
};
use warden_types::UserId;

fn signer() -> TokenSigner {
    TokenSigner::new(&test_config())
}

// ============================================================================
// Strategies
// ============================================================================

/// ASCII passwords up to bcrypt's 72-byte input limit
fn arb_password() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9!@#$%^&*()_+=-]{0,72}"
}

/// Passwords past the limit, split at the 72nd byte
fn arb_overlong_password() -> impl Strategy<Value = (String, String)> {
    ("[a-zA-Z0-9]{72}", "[a-zA-Z0-9]{1,32}")
}

fn arb_user_id() -> impl Strategy<Value = UserId> {
    any::<[u8; 16]>().prop_map(|bytes| UserId(uuid::Uuid::from_bytes(bytes)))
}

/// Credential values: visible ASCII without whitespace
fn arb_credential_value() -> impl Strategy<Value = String> {
    "[!-~]{1,128}"
}

fn arb_malformed_token() -> impl Strategy<Value = String> {
    prop_oneof![
        // Refresh-token shaped
        "[0-9a-f]{64}",
        // Three segments of junk
        "[a-zA-Z0-9_-]{1,40}\\.[a-zA-Z0-9_-]{1,40}\\.[a-zA-Z0-9_-]{0,40}",
        // Wrong segment counts
        "[a-zA-Z0-9_-]{1,40}\\.[a-zA-Z0-9_-]{1,40}",
        "([a-zA-Z0-9_-]{1,10}\\.){3,5}[a-zA-Z0-9_-]{1,10}",
        Just(String::new()),
        Just("..".to_string()),
        // Valid base64 segments that are not JSON
        (any::<[u8; 24]>(), any::<[u8; 24]>()).prop_map(|(h, p)| {
            format!("{}.{}.sig", URL_SAFE_NO_PAD.encode(h), URL_SAFE_NO_PAD.encode(p))
        }),
        any::<String>(),
    ]
}

// ============================================================================
// Passwords
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn password_roundtrip(password in arb_password()) {
        let hasher = PasswordHasher::new(4);
        let hash = hasher.hash(&password).unwrap();
        prop_assert!(hasher.verify(&hash, &password).unwrap());
    }

    #[test]
    fn password_mismatch(a in arb_password(), b in arb_password()) {
        prop_assume!(a != b);
        let hasher = PasswordHasher::new(4);
        let hash = hasher.hash(&a).unwrap();
        prop_assert!(!hasher.verify(&hash, &b).unwrap());
    }

    #[test]
    fn overlong_password_never_matches_its_prefix((prefix, tail) in arb_overlong_password()) {
        let hasher = PasswordHasher::new(4);
        let long = format!("{prefix}{tail}");
        prop_assert!(long.len() > MAX_PASSWORD_BYTES);
        prop_assert!(matches!(hasher.hash(&long), Err(AuthError::PasswordTooLong)));

        let hash = hasher.hash(&prefix).unwrap();
        prop_assert!(!hasher.verify(&hash, &long).unwrap());
        prop_assert!(hasher.verify(&hash, &prefix).unwrap());
    }
}

// ============================================================================
// Access tokens
// ============================================================================

proptest! {
    #[test]
    fn issued_token_validates_to_subject(user_id in arb_user_id(), secs in 1u64..=3600) {
        let signer = signer();
        let token = signer.issue(user_id, Duration::from_secs(secs)).unwrap();
        prop_assert_eq!(signer.validate(&token).unwrap(), user_id);
    }

    #[test]
    fn ttl_never_exceeds_ceiling(user_id in arb_user_id(), secs in 0u64..=1_000_000) {
        let signer = signer();
        let token = signer.issue(user_id, Duration::from_secs(secs)).unwrap();
        let claims = signer.inspect(&token).unwrap();
        prop_assert!(claims.exp - claims.iat <= 3600);
        prop_assert!(claims.exp - claims.iat >= 1);
    }

    #[test]
    fn other_secret_never_validates(user_id in arb_user_id(), suffix in "[a-z0-9]{1,16}") {
        let token = signer().issue(user_id, Duration::from_secs(60)).unwrap();
        let other = TokenSigner::new(
            &AuthConfig::try_new(format!("{TEST_SECRET}{suffix}")).unwrap(),
        );
        prop_assert!(matches!(other.validate(&token), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn malformed_tokens_never_panic(token in arb_malformed_token()) {
        prop_assert!(matches!(signer().validate(&token), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn flipped_signature_byte_rejected(user_id in arb_user_id(), index in any::<prop::sample::Index>()) {
        let signer = signer();
        let token = signer.issue(user_id, Duration::from_secs(60)).unwrap();
        let parts: Vec<&str> = token.split('.').collect();

        let mut sig = URL_SAFE_NO_PAD.decode(parts[2]).unwrap();
        let i = index.index(sig.len());
        sig[i] ^= 0x01;
        let forged = format!("{}.{}.{}", parts[0], parts[1], URL_SAFE_NO_PAD.encode(sig));

        prop_assert!(signer.validate(&forged).is_err());
    }

    #[test]
    fn foreign_alg_header_rejected(
        user_id in arb_user_id(),
        alg in prop_oneof![
            Just("none"), Just("HS384"), Just("HS512"), Just("RS256"), Just("ES256"), Just("hs256")
        ],
    ) {
        let signer = signer();
        let token = signer.issue(user_id, Duration::from_secs(60)).unwrap();
        let parts: Vec<&str> = token.split('.').collect();
        let header = URL_SAFE_NO_PAD.encode(format!(r#"{{"alg":"{alg}","typ":"JWT"}}"#));
        let forged = format!("{}.{}.{}", header, parts[1], parts[2]);

        prop_assert!(signer.validate(&forged).is_err());
    }
}

// ============================================================================
// Bearer extraction
// ============================================================================

proptest! {
    #[test]
    fn bearer_roundtrip(value in arb_credential_value()) {
        let header = format!("Bearer {value}");
        prop_assert_eq!(extract_bearer(Some(&header)).unwrap(), value.as_str());
    }

    #[test]
    fn api_key_roundtrip(value in arb_credential_value()) {
        let header = format!("ApiKey {value}");
        prop_assert_eq!(extract_credential(Some(&header), API_KEY_SCHEME).unwrap(), value.as_str());
    }

    #[test]
    fn extraction_never_panics_and_never_yields_empty(header in any::<String>()) {
        if let Ok(value) = extract_bearer(Some(&header)) {
            prop_assert!(!value.is_empty());
            prop_assert!(!value.contains(char::is_whitespace));
            prop_assert!(header.starts_with("Bearer "));
        }
    }

    #[test]
    fn other_schemes_rejected(scheme in "[A-Za-z]{1,10}", value in arb_credential_value()) {
        prop_assume!(scheme != "Bearer");
        let header = format!("{scheme} {value}");
        prop_assert!(matches!(
            extract_bearer(Some(&header)),
            Err(AuthError::MalformedCredential)
        ));
    }
}
