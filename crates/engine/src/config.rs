//! Engine configuration
//!
//! Loaded from TOML:
//!
//! ```toml
//! file_access = "any_run"     # required: "any_run" | "all_runs"
//! read_level = "read"
//! write_level = "write"
//! admin_level = "admin"       # optional; defaults to the maximum defined level
//! token_ttl_hours = 24
//! ```
//!
//! Thresholds name access levels in the catalog by description and are
//! looked up on every check, so they follow the levels actually defined.
//! When several levels share a description the weakest of them applies.

use serde::{Deserialize, Serialize};
use std::path::Path;
use warden_core::{WardenError, WardenResult};
use warden_security::FileAccessPolicy;

/// Default level required to read a run
pub const DEFAULT_READ_LEVEL: &str = "read";
/// Default level required to change a run
pub const DEFAULT_WRITE_LEVEL: &str = "write";
/// Default session lifetime
pub const DEFAULT_TOKEN_TTL_HOURS: u32 = 24;

fn default_read_level() -> String {
    DEFAULT_READ_LEVEL.to_string()
}

fn default_write_level() -> String {
    DEFAULT_WRITE_LEVEL.to_string()
}

fn default_token_ttl_hours() -> u32 {
    DEFAULT_TOKEN_TTL_HOURS
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// How file access follows from run access. Has no default.
    #[serde(default)]
    pub file_access: Option<FileAccessPolicy>,
    /// Level needed to read a run, its files and its grants
    #[serde(default = "default_read_level")]
    pub read_level: String,
    /// Level needed to transition a run or attach files to it
    #[serde(default = "default_write_level")]
    pub write_level: String,
    /// Level needed to grant and revoke on a run; the maximum defined level when unset
    #[serde(default)]
    pub admin_level: Option<String>,
    /// Lifetime of issued session tokens
    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            file_access: None,
            read_level: default_read_level(),
            write_level: default_write_level(),
            admin_level: None,
            token_ttl_hours: DEFAULT_TOKEN_TTL_HOURS,
        }
    }
}

impl EngineConfig {
    /// Default thresholds with the given file policy
    pub fn new(file_access: FileAccessPolicy) -> Self {
        EngineConfig {
            file_access: Some(file_access),
            ..Self::default()
        }
    }

    /// Parse a TOML document
    pub fn from_toml_str(s: &str) -> WardenResult<Self> {
        toml::from_str(s).map_err(|e| WardenError::config(e.to_string()))
    }

    /// Load a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> WardenResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        toml::from_str(&contents)
            .map_err(|e| WardenError::config(format!("{}: {}", path.display(), e)))
    }

    /// Set the file policy
    pub fn file_access(mut self, policy: FileAccessPolicy) -> Self {
        self.file_access = Some(policy);
        self
    }

    /// Name the level required for reads
    pub fn read_level(mut self, description: impl Into<String>) -> Self {
        self.read_level = description.into();
        self
    }

    /// Name the level required for transitions and attachments
    pub fn write_level(mut self, description: impl Into<String>) -> Self {
        self.write_level = description.into();
        self
    }

    /// Name the level required for granting and revoking
    pub fn admin_level(mut self, description: impl Into<String>) -> Self {
        self.admin_level = Some(description.into());
        self
    }

    /// Set the session lifetime
    pub fn token_ttl_hours(mut self, hours: u32) -> Self {
        self.token_ttl_hours = hours;
        self
    }

    /// Check the configuration and return the file policy
    ///
    /// Fails with `InvalidArgument` when no file policy was chosen, and with
    /// `Config` for a blank level name or a zero token lifetime.
    pub fn validate(&self) -> WardenResult<FileAccessPolicy> {
        let policy = self.file_access.ok_or_else(|| {
            WardenError::invalid_argument("file_access policy must be configured explicitly")
        })?;
        let names = [
            ("read_level", Some(&self.read_level)),
            ("write_level", Some(&self.write_level)),
            ("admin_level", self.admin_level.as_ref()),
        ];
        for (key, name) in names {
            if name.map_or(false, |n| n.trim().is_empty()) {
                return Err(WardenError::config(format!("{} must name an access level", key)));
            }
        }
        if self.token_ttl_hours == 0 {
            return Err(WardenError::config("token_ttl_hours must be positive"));
        }
        Ok(policy)
    }
}
