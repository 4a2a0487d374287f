use crate::model::{EmployeeRecord, Slot, default_time_summary, summary_is_set};

use super::MigrationStats;

/// Attaches the default time summary to records stored without one. A stored
/// summary is kept as is, whatever its shape, and is never merged with the
/// defaults.
pub fn migrate_time_summary(records: &[EmployeeRecord]) -> Vec<EmployeeRecord> {
    let mut stats = MigrationStats::default();
    records
        .iter()
        .map(|record| migrate_record_time_summary(record, &mut stats))
        .collect()
}

pub(crate) fn migrate_record_time_summary(
    record: &EmployeeRecord,
    stats: &mut MigrationStats,
) -> EmployeeRecord {
    match &record.time_summary {
        Slot::Present(summary) if summary_is_set(summary) => record.clone(),
        _ => {
            stats.summaries_added += 1;
            EmployeeRecord {
                time_summary: Slot::Present(default_time_summary()),
                ..record.clone()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn records(raw: serde_json::Value) -> Vec<EmployeeRecord> {
        serde_json::from_value(raw).unwrap()
    }

    #[test]
    fn missing_summary_gets_defaults() {
        let input = records(json!([{ "id": 1, "name": "A" }]));

        let out = serde_json::to_value(migrate_time_summary(&input)).unwrap();

        assert_eq!(out[0]["timeSummary"]["totalWorkDays"], json!(250));
        assert_eq!(out[0]["timeSummary"]["avgCheckIn"], json!("08:00"));
        assert_eq!(out[0]["name"], json!("A"));
    }

    #[test]
    fn null_summary_gets_defaults() {
        let input = records(json!([{ "id": 1, "timeSummary": null }]));

        let out = migrate_time_summary(&input);

        assert_eq!(out[0].time_summary, Slot::Present(default_time_summary()));
    }

    #[test]
    fn existing_summary_is_not_merged() {
        let input = records(json!([
            { "id": 2, "timeSummary": { "totalWorkDays": 10 } },
            { "id": 3, "timeSummary": { "totalWorkDays": "250" } },
            { "id": 4, "timeSummary": "n/a" }
        ]));
        let mut stats = MigrationStats::default();

        let out: Vec<_> = input
            .iter()
            .map(|r| migrate_record_time_summary(r, &mut stats))
            .collect();
        let out = serde_json::to_value(out).unwrap();

        assert_eq!(out[0]["timeSummary"], json!({ "totalWorkDays": 10 }));
        assert_eq!(out[1]["timeSummary"], json!({ "totalWorkDays": "250" }));
        assert_eq!(out[2]["timeSummary"], json!("n/a"));
        assert_eq!(stats.summaries_added, 0);
    }
}
