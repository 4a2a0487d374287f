//! Upgrades the stored employee roster to the current record shape.
//!
//! The passes are pure functions over `&[EmployeeRecord]`; [`run_migration`]
//! is the bootstrap entry point that reads the roster from a [`Store`],
//! applies the passes in a fixed order and writes the result back.
//!
//! [`Store`]: crate::store::Store

use chrono::{DateTime, Utc};
use derive_more::Display;
use serde::Serialize;

use crate::model::RosterEntry;
use crate::store::StoreError;

mod attendance;
mod document;
mod runner;
mod time_summary;

pub use attendance::{backfill_entry, migrate_attendance};
pub use document::UsersDocument;
pub use runner::run_migration;
pub use time_summary::migrate_time_summary;

pub(crate) use attendance::migrate_record_attendance;
pub(crate) use time_summary::migrate_record_time_summary;

/// Store key holding the roster.
pub const USERS_KEY: &str = "usersData";
/// Write-ahead copy of a migrated roster, present only while a write-back is
/// in flight or after one was interrupted.
pub const STAGING_KEY: &str = "usersData_staging";

#[derive(Debug, Clone, Copy, Default)]
pub struct MigrationOptions {
    /// Compute the upgrade and report it without writing anything.
    pub dry_run: bool,
}

#[derive(Debug, Display)]
pub enum MigrationError {
    #[display(fmt = "failed to read users data: {}", _0)]
    Read(StoreError),
    #[display(fmt = "stored users data could not be parsed: {}", _0)]
    Deserialize(serde_json::Error),
    #[display(fmt = "failed to serialize migrated users data: {}", _0)]
    Serialize(serde_json::Error),
    #[display(fmt = "failed to write migrated users data: {}", _0)]
    Write(StoreError),
}

impl std::error::Error for MigrationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MigrationError::Read(e) | MigrationError::Write(e) => Some(e),
            MigrationError::Deserialize(e) | MigrationError::Serialize(e) => Some(e),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MigrationStats {
    pub records: usize,
    pub records_with_attendance: usize,
    pub check_events_backfilled: usize,
    pub summaries_added: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct MigrationReport {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub stats: MigrationStats,
    /// False when the stored roster was already in the current shape.
    pub changed: bool,
    pub dry_run: bool,
    /// True when an interrupted write-back was found and finished first.
    pub recovered_staging: bool,
    #[serde(skip)]
    pub records: Vec<RosterEntry>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", content = "report", rename_all = "snake_case")]
pub enum MigrationOutcome {
    Migrated(MigrationReport),
    /// Nothing stored under [`USERS_KEY`]; nothing was written.
    NoData,
    /// The stored value is not a JSON array and was left as found.
    NotASequence,
}

impl MigrationOutcome {
    pub fn status(&self) -> &'static str {
        match self {
            MigrationOutcome::Migrated(_) => "migrated",
            MigrationOutcome::NoData => "no_data",
            MigrationOutcome::NotASequence => "not_a_sequence",
        }
    }

    /// The upgraded roster, if a migration ran.
    pub fn records(&self) -> Option<&[RosterEntry]> {
        match self {
            MigrationOutcome::Migrated(report) => Some(&report.records),
            _ => None,
        }
    }
}
