//! Catalog snapshots
//!
//! A snapshot is the whole catalog serialized as one JSON document. Loading
//! replays every row through the catalog's own mutation path, so a snapshot
//! that violates an invariant (dangling owner, duplicate grant, ...) is
//! rejected rather than silently accepted.
//!
//! Writes go to a temporary file in the same directory and are renamed into
//! place, so a crash mid-write leaves the previous snapshot intact.

use crate::catalog::Catalog;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tracing::{debug, info};
use warden_core::{
    AccessLevel, File, FileRun, Group, Membership, PermissionGrant, Run, User, WardenError,
    WardenResult,
};

/// Snapshot file name inside a data directory
pub const SNAPSHOT_FILE: &str = "catalog.json";

/// Current snapshot format
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

/// Serialized form of a [`Catalog`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    /// Format version
    pub format_version: u32,
    /// Users
    pub users: Vec<User>,
    /// Groups
    pub groups: Vec<Group>,
    /// Memberships
    pub memberships: Vec<Membership>,
    /// Access level definitions
    pub access_levels: Vec<AccessLevel>,
    /// Files
    pub files: Vec<File>,
    /// Runs
    pub runs: Vec<Run>,
    /// File attachments
    pub file_runs: Vec<FileRun>,
    /// Grants
    pub grants: Vec<PermissionGrant>,
}

impl Catalog {
    /// Capture the current contents
    ///
    /// Mutations wait while the capture runs, so every captured row's
    /// references are captured too.
    pub fn snapshot(&self) -> CatalogSnapshot {
        let _quiet = self.quiesce();
        CatalogSnapshot {
            format_version: SNAPSHOT_FORMAT_VERSION,
            users: self.all_users(),
            groups: self.all_groups(),
            memberships: self.memberships(),
            access_levels: self.access_levels(),
            files: self.all_files(),
            runs: self.all_runs(),
            file_runs: self.file_runs(),
            grants: self.all_grants(),
        }
    }

    /// Rebuild a catalog from a snapshot
    ///
    /// Rows are inserted in dependency order (users before the files and runs
    /// they own, runs before their grants).
    pub fn from_snapshot(snapshot: CatalogSnapshot) -> WardenResult<Catalog> {
        if snapshot.format_version != SNAPSHOT_FORMAT_VERSION {
            return Err(WardenError::Serialization {
                message: format!(
                    "unsupported snapshot format {} (expected {})",
                    snapshot.format_version, SNAPSHOT_FORMAT_VERSION
                ),
            });
        }

        let catalog = Catalog::new();
        for user in snapshot.users {
            catalog.create_user(user)?;
        }
        for group in snapshot.groups {
            catalog.create_group(group)?;
        }
        for m in snapshot.memberships {
            catalog.add_membership(m.user, m.group)?;
        }
        for level in snapshot.access_levels {
            catalog.create_access_level(level)?;
        }
        for file in snapshot.files {
            catalog.create_file(file)?;
        }
        for run in snapshot.runs {
            catalog.insert_run(run)?;
        }
        for fr in snapshot.file_runs {
            catalog.attach_file_to_run(fr.file, fr.run)?;
        }
        for grant in snapshot.grants {
            catalog.grant_permission(grant)?;
        }
        Ok(catalog)
    }

    /// Write a snapshot into `dir`, replacing any previous one
    pub fn save_to(&self, dir: &Path) -> WardenResult<()> {
        fs::create_dir_all(dir)?;
        let snapshot = self.snapshot();
        let target = dir.join(SNAPSHOT_FILE);
        let tmp = dir.join(format!("{}.tmp", SNAPSHOT_FILE));

        {
            let mut writer = BufWriter::new(fs::File::create(&tmp)?);
            serde_json::to_writer_pretty(&mut writer, &snapshot)?;
            writer.flush()?;
            writer.get_ref().sync_all()?;
        }
        fs::rename(&tmp, &target)?;

        info!(
            path = %target.display(),
            runs = snapshot.runs.len(),
            grants = snapshot.grants.len(),
            "wrote catalog snapshot"
        );
        Ok(())
    }

    /// Load the snapshot in `dir`, or `None` if there is none yet
    pub fn load_from(dir: &Path) -> WardenResult<Option<Catalog>> {
        let path = dir.join(SNAPSHOT_FILE);
        if !path.exists() {
            debug!("No snapshot found in {}", dir.display());
            return Ok(None);
        }
        let reader = BufReader::new(fs::File::open(&path)?);
        let snapshot: CatalogSnapshot = serde_json::from_reader(reader)?;
        let catalog = Catalog::from_snapshot(snapshot)?;
        info!(path = %path.display(), "loaded catalog snapshot");
        Ok(Some(catalog))
    }
}
