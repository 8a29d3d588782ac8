//! Storage layer for Warden
//!
//! This crate implements the catalog backend with:
//! - Catalog: DashMap tables for every entity, invariant checks on each mutation
//! - GrantTable: grants sharded by run, whole-row inserts and removals
//! - Per-run mutation locks, and a catalog barrier that snapshots take exclusively
//! - CatalogReader: lookups without mutations
//! - JSON snapshots with atomic replace

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod catalog;
pub mod grants;
pub mod reader;
pub mod snapshot;

pub use catalog::{Catalog, CatalogStats};
pub use grants::{GrantShard, GrantTable};
pub use reader::CatalogReader;
pub use snapshot::{CatalogSnapshot, SNAPSHOT_FILE, SNAPSHOT_FORMAT_VERSION};
