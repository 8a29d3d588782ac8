//! Convenient imports for Warden.
//!
//! This module re-exports the most commonly used types so you can get started
//! with a single import:
//!
//! ```ignore
//! use warden::prelude::*;
//!
//! let db = Warden::ephemeral(FileAccessPolicy::AnyRun)?;
//! let levels = db.levels.seed_standard()?;
//! ```

// Main entry point
pub use crate::database::{Warden, WardenBuilder};

// Error handling
pub use crate::error::{Error, Result};

// Handles
pub use crate::primitives::{Access, Files, Grants, Groups, Levels, Runs, Sessions, Users};

// Core types
pub use crate::types::{
    AccessLevel, AccessLevelId, File, FileId, GrantId, Group, GroupId, PermissionGrant, Principal,
    Run, RunId, RunStatus, User, UserId,
};

// Resolution and configuration
pub use crate::types::{Authentication, EngineConfig, FileAccessPolicy, Resolution};

// Re-export serde_json for convenience
pub use serde_json::json;
