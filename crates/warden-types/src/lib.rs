//! Warden Types - Shared domain types
//!
//! This crate contains domain types used across Warden crates:
//! - User identity and the public profile projection
//! - Refresh token records and their lifecycle state
//! - Login / refresh wire types

pub mod auth;
pub mod session;
pub mod user;

pub use auth::*;
pub use session::*;
pub use user::*;
