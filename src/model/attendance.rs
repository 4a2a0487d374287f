use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::shaped::Shaped;
use super::slot::Slot;

/// Address written into check events recorded before addresses were captured.
pub const DEFAULT_ADDRESS: &str = "ในพื้นที่อนุญาต";
/// Distance written into check events recorded before distances were captured.
pub const DEFAULT_DISTANCE: &str = "-";

/// One calendar day of attendance. `date` and anything else the dashboard
/// stores on the entry live in `extra`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceEntry {
    #[serde(default, skip_serializing_if = "Slot::is_absent")]
    pub check_in: Slot<Shaped<CheckEvent>>,
    #[serde(default, skip_serializing_if = "Slot::is_absent")]
    pub check_out: Slot<Shaped<CheckEvent>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A clock-in or clock-out. `time`, `status`, `location`, `photo` and `gps`
/// are carried in `extra` with whatever type they were stored as.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckEvent {
    #[serde(default, skip_serializing_if = "Slot::is_absent")]
    pub address: Slot<Value>,
    #[serde(default, skip_serializing_if = "Slot::is_absent")]
    pub distance: Slot<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Missing, null, or the empty string.
pub fn is_blank(slot: &Slot<Value>) -> bool {
    match slot {
        Slot::Absent | Slot::Null | Slot::Present(Value::Null) => true,
        Slot::Present(Value::String(s)) => s.is_empty(),
        Slot::Present(_) => false,
    }
}

impl CheckEvent {
    pub fn needs_backfill(&self) -> bool {
        is_blank(&self.address) || is_blank(&self.distance)
    }

    /// Copy of this event with blank `address`/`distance` set to their defaults.
    pub fn with_defaults(&self) -> CheckEvent {
        let mut event = self.clone();
        if is_blank(&event.address) {
            event.address = Slot::Present(Value::from(DEFAULT_ADDRESS));
        }
        if is_blank(&event.distance) {
            event.distance = Slot::Present(Value::from(DEFAULT_DISTANCE));
        }
        event
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_fields_survive_a_round_trip() {
        let raw = json!({
            "date": "2024-03-01",
            "note": "wfh",
            "checkIn": { "time": 800, "status": { "code": 1 }, "device": { "os": "android" } }
        });
        let entry: AttendanceEntry = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(entry.extra.get("note"), Some(&json!("wfh")));
        assert!(entry.check_in.as_present().and_then(Shaped::as_typed).is_some());
        assert_eq!(serde_json::to_value(&entry).unwrap(), raw);
    }

    #[test]
    fn non_object_check_event_is_kept() {
        let raw = json!({ "checkIn": "08:00", "checkOut": null });
        let entry: AttendanceEntry = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(entry.check_in, Slot::Present(Shaped::Opaque(json!("08:00"))));
        assert_eq!(serde_json::to_value(&entry).unwrap(), raw);
    }

    #[test]
    fn blank_covers_missing_null_and_empty_strings() {
        assert!(is_blank(&Slot::Absent));
        assert!(is_blank(&Slot::Null));
        assert!(is_blank(&Slot::Present(json!(""))));
        assert!(!is_blank(&Slot::Present(json!(" "))));
        assert!(!is_blank(&Slot::Present(json!("Bangkok"))));
        assert!(!is_blank(&Slot::Present(json!(0))));
    }

    #[test]
    fn defaults_only_fill_blank_fields() {
        let event = CheckEvent {
            address: Slot::Present(json!("Head office")),
            ..Default::default()
        };
        let filled = event.with_defaults();
        assert_eq!(filled.address, Slot::Present(json!("Head office")));
        assert_eq!(filled.distance, Slot::Present(json!(DEFAULT_DISTANCE)));
    }
}
