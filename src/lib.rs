//! # Warden
//!
//! Embedded authorization store for multi-tenant run tracking.
//!
//! Warden tracks users, groups, computational runs, the files attached to
//! them and permission grants, and answers "may this user act on this run
//! (or file), and at what level?".
//!
//! ## Quick Start
//!
//! ```ignore
//! use warden::prelude::*;
//!
//! let db = Warden::ephemeral(FileAccessPolicy::AnyRun)?;
//! let levels = db.levels.seed_standard()?;
//!
//! let ada = db.users.create("Ada", "lab", "cred-ada")?;
//! let bob = db.users.create("Bob", "lab", "cred-bob")?;
//! let run = db.runs.create(ada.id, json!({}))?;
//!
//! // Bob may not touch Ada's run until granted
//! assert!(db.runs.start_as(bob.id, run.id).is_err());
//! db.grants.grant(run.id, levels.write.id, Principal::User(bob.id))?;
//! db.runs.start_as(bob.id, run.id)?;
//! ```
//!
//! ## Resolution
//!
//! 1. The run's owner holds the strongest defined level
//! 2. Otherwise the strongest grant naming the user or one of their groups wins
//! 3. Ties between equally strong grants go to the lowest grant id
//! 4. No grant means denied
//!
//! ## Handles
//!
//! - [`Users`], [`Groups`] - provisioning and membership
//! - [`Runs`] - runs and their forward-only lifecycle
//! - [`Files`] - files and attachment to runs
//! - [`Levels`], [`Grants`] - the privilege scale and who holds what
//! - [`Access`] - resolution and checks
//! - [`Sessions`] - credential-for-token exchange

#![warn(missing_docs)]

mod database;
mod error;
mod primitives;
mod types;

pub mod prelude;

// Re-export main entry points
pub use database::{DatabaseMetrics, Warden, WardenBuilder};
pub use error::{Error, Result, PUBLIC_NOT_FOUND};

// Re-export handles
pub use primitives::{Access, Files, Grants, Groups, Levels, Runs, Sessions, Users};

// Re-export types
pub use types::*;
