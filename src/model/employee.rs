use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::attendance::AttendanceEntry;
use super::role::Role;
use super::shaped::Shaped;
use super::slot::Slot;

/// One employee as the dashboard stores it under `usersData`.
///
/// Only the fields the migration and the read API look at are pulled out,
/// all as raw JSON; `name`, `email` and everything else stay in `extra`
/// exactly as stored. `id` may be a number or a string depending on which
/// screen created the record (CSV import writes strings).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeRecord {
    #[serde(default, skip_serializing_if = "Slot::is_absent")]
    pub id: Slot<Value>,
    #[serde(default, skip_serializing_if = "Slot::is_absent")]
    pub role: Slot<Value>,
    #[serde(default, skip_serializing_if = "Slot::is_absent")]
    pub department: Slot<Value>,
    #[serde(default, skip_serializing_if = "Slot::is_absent")]
    pub attendance_records: Slot<Shaped<Vec<Shaped<AttendanceEntry>>>>,
    #[serde(default, skip_serializing_if = "Slot::is_absent")]
    pub time_summary: Slot<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An element of the stored roster: a record object, or anything else kept
/// in place.
pub type RosterEntry = Shaped<EmployeeRecord>;

impl EmployeeRecord {
    /// The record id as text, so `7` and `"7"` address the same employee.
    pub fn id_text(&self) -> Option<String> {
        match self.id.as_present()? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn typed_role(&self) -> Option<Role> {
        self.role
            .as_present()
            .and_then(Value::as_str)
            .and_then(Role::from_name)
    }

    pub fn department_name(&self) -> Option<&str> {
        self.department.as_present().and_then(Value::as_str)
    }

    /// Stored attendance entries; empty when the field is missing or is not
    /// an array.
    pub fn attendance(&self) -> &[Shaped<AttendanceEntry>] {
        self.attendance_records
            .as_present()
            .and_then(Shaped::as_typed)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}
