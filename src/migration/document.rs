use serde_json::Value;
use tracing::warn;

use crate::model::{EmployeeRecord, RosterEntry};

use super::{MigrationStats, migrate_record_attendance, migrate_record_time_summary};

/// The value stored under `usersData`, checked at the store boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum UsersDocument {
    /// A JSON array. Elements that are not record objects are kept in place.
    Records(Vec<RosterEntry>),
    /// Anything that is not a JSON array. Kept verbatim.
    Other(Value),
}

impl UsersDocument {
    /// Fails only on text that is not JSON at all.
    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        Self::from_value(serde_json::from_str(raw)?)
    }

    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        match value {
            Value::Array(_) => Ok(UsersDocument::Records(serde_json::from_value(value)?)),
            other => Ok(UsersDocument::Other(other)),
        }
    }

    /// Record objects of the roster, skipping anything else.
    pub fn employees(&self) -> impl Iterator<Item = &EmployeeRecord> {
        let entries: &[RosterEntry] = match self {
            UsersDocument::Records(entries) => entries,
            UsersDocument::Other(_) => &[],
        };
        entries.iter().filter_map(RosterEntry::as_typed)
    }

    /// Runs the attendance pass, then the time summary pass, over a roster.
    /// Non-array documents are returned unchanged with a warning, since they
    /// point at a writer bug rather than old data.
    pub fn migrate(&self) -> UsersDocument {
        self.migrate_counted(&mut MigrationStats::default())
    }

    pub fn migrate_counted(&self, stats: &mut MigrationStats) -> UsersDocument {
        match self {
            UsersDocument::Records(entries) => {
                stats.records = entries.len();
                let upgraded = entries
                    .iter()
                    .map(|entry| {
                        entry.map_typed(|record| {
                            let record = migrate_record_attendance(record, stats);
                            migrate_record_time_summary(&record, stats)
                        })
                    })
                    .collect();
                UsersDocument::Records(upgraded)
            }
            UsersDocument::Other(value) => {
                warn!(
                    kind = json_kind(value),
                    "users data is not an array, leaving it unchanged"
                );
                UsersDocument::Other(value.clone())
            }
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
