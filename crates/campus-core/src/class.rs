//! Class entity snapshot as seen by the cache layer.
//!
//! The cache never interprets business fields of a class record (capacity,
//! status, schedule and so on). The only thing it reads is the dimension
//! fields used to scope invalidation: school, level, teacher. Controllers
//! build a [`ClassSnapshot`] from the full record after each committed
//! mutation and hand it to the cache's invalidation entry points.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Minimal projection of a class record for cache invalidation.
///
/// For updates, controllers pass two snapshots: the state before the write
/// and the state after, so the cache can detect cross-dimension moves
/// (e.g. a class reassigned from teacher 10 to teacher 20).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassSnapshot {
    /// Entity id (primary key in the data store)
    pub id: String,
    /// Owning school, if assigned
    #[serde(default)]
    pub school_id: Option<String>,
    /// Grade/level label, if assigned
    #[serde(default)]
    pub level: Option<String>,
    /// Assigned teacher, if any
    #[serde(default)]
    pub teacher_id: Option<String>,
}

impl ClassSnapshot {
    /// Create a snapshot with no dimension values.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            school_id: None,
            level: None,
            teacher_id: None,
        }
    }

    /// Set the school dimension.
    pub fn with_school(mut self, school_id: impl Into<String>) -> Self {
        self.school_id = Some(school_id.into());
        self
    }

    /// Set the level dimension.
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = Some(level.into());
        self
    }

    /// Set the teacher dimension.
    pub fn with_teacher(mut self, teacher_id: impl Into<String>) -> Self {
        self.teacher_id = Some(teacher_id.into());
        self
    }

    /// Validate the snapshot before it crosses into the cache layer.
    ///
    /// Ids end up embedded in cache keys, so an empty id or one containing
    /// the key separator would corrupt the key namespace.
    pub fn validate(&self) -> Result<()> {
        if self.id.is_empty() {
            return Err(CoreError::invalid_id("(empty)"));
        }
        if self.id.contains(':') || self.id.contains('*') {
            return Err(CoreError::invalid_id(&self.id));
        }
        Ok(())
    }
}
