//! Common test utilities for warden-auth-core integration tests

pub mod mock_repos;

use std::sync::Arc;

pub use mock_repos::{
    LockstepRefreshTokenRepository, MockRefreshTokenRepository, MockUserRepository,
};
use warden_auth_core::{AuthConfig, SessionManager};

#[allow(dead_code)]
pub const TEST_SECRET: &str = "integration-test-signing-secret-0123456789";

#[allow(dead_code)]
pub type TestManager = SessionManager<MockUserRepository, MockRefreshTokenRepository>;

/// Config with the cheapest bcrypt cost
#[allow(dead_code)]
pub fn test_config() -> AuthConfig {
    AuthConfig::try_new(TEST_SECRET)
        .unwrap()
        .with_password_cost(4)
}

/// Session manager over fresh mocks, returning the mocks for inspection
#[allow(dead_code)]
pub fn manager_with(
    config: AuthConfig,
) -> (TestManager, MockUserRepository, MockRefreshTokenRepository) {
    let users = MockUserRepository::new();
    let tokens = MockRefreshTokenRepository::new();
    let manager =
        SessionManager::new(config, Arc::new(users.clone()), Arc::new(tokens.clone())).unwrap();
    (manager, users, tokens)
}

#[allow(dead_code)]
pub fn manager() -> (TestManager, MockUserRepository, MockRefreshTokenRepository) {
    manager_with(test_config())
}
