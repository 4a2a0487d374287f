use crate::model::{AttendanceEntry, CheckEvent, EmployeeRecord, Shaped, Slot};

use super::MigrationStats;

/// Fills `address` and `distance` on every clock-in/out that lacks them.
///
/// Records without an `attendanceRecords` array come back unchanged, and an
/// entry without a `checkIn` or `checkOut` keeps that side missing.
pub fn migrate_attendance(records: &[EmployeeRecord]) -> Vec<EmployeeRecord> {
    let mut stats = MigrationStats::default();
    records
        .iter()
        .map(|record| migrate_record_attendance(record, &mut stats))
        .collect()
}

pub(crate) fn migrate_record_attendance(
    record: &EmployeeRecord,
    stats: &mut MigrationStats,
) -> EmployeeRecord {
    let Slot::Present(Shaped::Typed(entries)) = &record.attendance_records else {
        return record.clone();
    };
    stats.records_with_attendance += 1;
    let entries = entries
        .iter()
        .map(|entry| {
            entry.map_typed(|entry| {
                stats.check_events_backfilled += pending_events(entry);
                backfill_entry(entry)
            })
        })
        .collect();
    EmployeeRecord {
        attendance_records: Slot::Present(Shaped::Typed(entries)),
        ..record.clone()
    }
}

/// Copy of `entry` with defaults applied to whichever check events it has.
pub fn backfill_entry(entry: &AttendanceEntry) -> AttendanceEntry {
    let fill = |side: &Shaped<CheckEvent>| side.map_typed(CheckEvent::with_defaults);
    AttendanceEntry {
        check_in: entry.check_in.as_ref().map(fill),
        check_out: entry.check_out.as_ref().map(fill),
        ..entry.clone()
    }
}

fn pending_events(entry: &AttendanceEntry) -> usize {
    [&entry.check_in, &entry.check_out]
        .into_iter()
        .filter_map(|side| side.as_present().and_then(Shaped::as_typed))
        .filter(|event| event.needs_backfill())
        .count()
}
