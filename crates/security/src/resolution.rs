//! Resolution outcomes

use serde::{Deserialize, Serialize};
use warden_core::{AccessLevel, GrantId, GroupId};

/// Why a principal holds its effective level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "via", rename_all = "snake_case")]
pub enum AccessSource {
    /// The principal owns the run
    Owner,
    /// A grant naming the principal directly
    Direct {
        /// The winning grant
        grant: GrantId,
    },
    /// A grant naming one of the principal's groups
    Group {
        /// The group the grant targets
        group: GroupId,
        /// The winning grant
        grant: GrantId,
    },
}

impl AccessSource {
    /// The grant that decided the resolution, if any
    pub fn grant(&self) -> Option<GrantId> {
        match self {
            AccessSource::Owner => None,
            AccessSource::Direct { grant } | AccessSource::Group { grant, .. } => Some(*grant),
        }
    }
}

/// The level a principal holds on a run, and where it comes from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectiveAccess {
    /// Effective level
    pub level: AccessLevel,
    /// Source of the level
    pub source: AccessSource,
}

/// Result of resolving a principal's access to a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Resolution {
    /// The principal holds at least `level`
    Granted(EffectiveAccess),
    /// No ownership and no applicable grant
    Denied,
}

impl Resolution {
    /// Check if access was denied
    pub fn is_denied(&self) -> bool {
        matches!(self, Resolution::Denied)
    }

    /// Check if access was granted
    pub fn is_granted(&self) -> bool {
        !self.is_denied()
    }

    /// Effective level, if granted
    pub fn level(&self) -> Option<&AccessLevel> {
        match self {
            Resolution::Granted(access) => Some(&access.level),
            Resolution::Denied => None,
        }
    }

    /// Effective level value, if granted
    pub fn level_value(&self) -> Option<i64> {
        self.level().map(|l| l.level_value)
    }

    /// Source of the effective level, if granted
    pub fn source(&self) -> Option<AccessSource> {
        match self {
            Resolution::Granted(access) => Some(access.source),
            Resolution::Denied => None,
        }
    }

    /// Check if the resolved level reaches `min_value`
    ///
    /// A denial never satisfies any threshold.
    pub fn satisfies(&self, min_value: i64) -> bool {
        self.level_value().map_or(false, |v| v >= min_value)
    }

    /// Convert into the effective access, if granted
    pub fn into_granted(self) -> Option<EffectiveAccess> {
        match self {
            Resolution::Granted(access) => Some(access),
            Resolution::Denied => None,
        }
    }
}
