//! Database engine for Warden
//!
//! This crate orchestrates the lower layers:
//! - Database: catalog, access resolver and session table behind one handle
//! - RunLifecycle: actor-gated run transitions, file attachment, grant/revoke
//! - EngineConfig: thresholds and file policy, loaded from TOML
//! - TokenRegistry: credential-for-token exchange with expiry

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod authn;
pub mod config;
pub mod database;
pub mod lifecycle;

pub use authn::{Authentication, Authenticator, SessionToken, TokenRegistry, TOKEN_BYTES};
pub use config::{EngineConfig, DEFAULT_READ_LEVEL, DEFAULT_TOKEN_TTL_HOURS, DEFAULT_WRITE_LEVEL};
pub use database::{Database, DatabaseBuilder, StandardLevels, STANDARD_LEVELS};
pub use lifecycle::RunLifecycle;
