//! HTTP handlers

mod auth;
mod health;
mod users;
mod webhook;

pub use auth::{login, refresh, revoke};
pub use health::{health, ready};
pub use users::{me, register};
pub use webhook::upgrade;
