use chrono::Utc;
use serde_json::Value;
use tracing::{debug, info, info_span, warn};
use uuid::Uuid;

use crate::store::Store;

use super::document::UsersDocument;
use super::{
    MigrationError, MigrationOptions, MigrationOutcome, MigrationReport, MigrationStats,
    STAGING_KEY, USERS_KEY,
};

/// Reads the roster from `store`, upgrades it and writes it back.
///
/// Called once at startup before anything reads attendance data. Failures are
/// returned, never panicked on; a failure before the write-back leaves the
/// store exactly as found.
///
/// The write-back goes through [`STAGING_KEY`]: the migrated roster is
/// written there first, then to [`USERS_KEY`], then the staging copy is
/// removed. A staging copy found at the start of a run belongs to an
/// interrupted write-back: it is promoted before anything else happens if it
/// parses as a roster, and dropped otherwise.
pub fn run_migration(
    store: &dyn Store,
    options: MigrationOptions,
) -> Result<MigrationOutcome, MigrationError> {
    let run_id = Uuid::new_v4().to_string();
    let span = info_span!("migration", run_id = %run_id, dry_run = options.dry_run);
    let _enter = span.enter();
    let started_at = Utc::now();

    let mut recovered_staging = false;
    let raw = match store.get(STAGING_KEY).map_err(MigrationError::Read)? {
        Some(staged) if is_complete_roster(&staged) => {
            warn!("found an interrupted write-back, promoting the staged roster");
            if !options.dry_run {
                store.set(USERS_KEY, &staged).map_err(MigrationError::Write)?;
                store.remove(STAGING_KEY).map_err(MigrationError::Write)?;
            }
            recovered_staging = true;
            Some(staged)
        }
        Some(_) => {
            warn!("discarding an unreadable staged roster, migrating the stored one");
            if !options.dry_run {
                store.remove(STAGING_KEY).map_err(MigrationError::Write)?;
            }
            store.get(USERS_KEY).map_err(MigrationError::Read)?
        }
        None => store.get(USERS_KEY).map_err(MigrationError::Read)?,
    };

    let Some(raw) = raw else {
        info!("no users data stored, nothing to migrate");
        return Ok(MigrationOutcome::NoData);
    };

    let stored: Value = serde_json::from_str(&raw).map_err(MigrationError::Deserialize)?;
    let document =
        UsersDocument::from_value(stored.clone()).map_err(MigrationError::Deserialize)?;
    let mut stats = MigrationStats::default();
    let UsersDocument::Records(upgraded) = document.migrate_counted(&mut stats) else {
        return Ok(MigrationOutcome::NotASequence);
    };

    let upgraded_value = serde_json::to_value(&upgraded).map_err(MigrationError::Serialize)?;
    let changed = upgraded_value != stored;

    if !changed {
        debug!("users data already current, skipping write-back");
    } else if options.dry_run {
        info!("dry run, not writing migrated users data");
    } else {
        let serialized =
            serde_json::to_string(&upgraded_value).map_err(MigrationError::Serialize)?;
        write_back(store, &serialized)?;
    }

    info!(
        records = stats.records,
        records_with_attendance = stats.records_with_attendance,
        check_events_backfilled = stats.check_events_backfilled,
        summaries_added = stats.summaries_added,
        changed,
        "users data migration finished"
    );

    Ok(MigrationOutcome::Migrated(MigrationReport {
        run_id,
        started_at,
        finished_at: Utc::now(),
        stats,
        changed,
        dry_run: options.dry_run,
        recovered_staging,
        records: upgraded,
    }))
}

/// Only this process writes the staging key, and always a JSON array, so
/// anything else there is a torn write.
fn is_complete_roster(staged: &str) -> bool {
    matches!(UsersDocument::parse(staged), Ok(UsersDocument::Records(_)))
}

fn write_back(store: &dyn Store, serialized: &str) -> Result<(), MigrationError> {
    store
        .set(STAGING_KEY, serialized)
        .map_err(MigrationError::Write)?;
    store
        .set(USERS_KEY, serialized)
        .map_err(MigrationError::Write)?;
    store.remove(STAGING_KEY).map_err(MigrationError::Write)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::json;

    fn stored_json(store: &MemoryStore, key: &str) -> Option<Value> {
        store
            .get(key)
            .unwrap()
            .map(|raw| serde_json::from_str(&raw).unwrap())
    }

    fn legacy_roster() -> String {
        json!([
            {
                "id": 1,
                "name": "A",
                "attendanceRecords": [{ "date": "2024-02-01", "checkIn": { "time": "08:10" } }]
            },
            { "id": 2, "attendanceRecords": [], "timeSummary": { "totalWorkDays": 10 } }
        ])
        .to_string()
    }

    #[test]
    fn absent_roster_is_a_no_op() {
        let store = MemoryStore::new();

        let outcome = run_migration(&store, MigrationOptions::default()).unwrap();

        assert!(matches!(outcome, MigrationOutcome::NoData));
        assert_eq!(store.get(USERS_KEY).unwrap(), None);
        assert_eq!(store.get(STAGING_KEY).unwrap(), None);
    }

    #[test]
    fn migrates_and_writes_back() {
        let store = MemoryStore::with_entry(USERS_KEY, &legacy_roster());

        let outcome = run_migration(&store, MigrationOptions::default()).unwrap();

        let MigrationOutcome::Migrated(report) = outcome else {
            panic!("expected a migration");
        };
        assert!(report.changed);
        assert_eq!(
            report.stats,
            MigrationStats {
                records: 2,
                records_with_attendance: 2,
                check_events_backfilled: 1,
                summaries_added: 1,
            }
        );
        let stored = stored_json(&store, USERS_KEY).unwrap();
        assert_eq!(
            stored[0]["attendanceRecords"][0]["checkIn"]["address"],
            json!("ในพื้นที่อนุญาต")
        );
        assert_eq!(stored[0]["timeSummary"]["totalHours"], json!("2,000 ชม."));
        assert_eq!(stored[1]["timeSummary"], json!({ "totalWorkDays": 10 }));
        assert_eq!(store.get(STAGING_KEY).unwrap(), None);
        assert_eq!(serde_json::to_value(&report.records).unwrap(), stored);
    }

    #[test]
    fn second_run_changes_nothing() {
        let store = MemoryStore::with_entry(USERS_KEY, &legacy_roster());
        run_migration(&store, MigrationOptions::default()).unwrap();
        let after_first = store.get(USERS_KEY).unwrap();

        let outcome = run_migration(&store, MigrationOptions::default()).unwrap();

        let MigrationOutcome::Migrated(report) = outcome else {
            panic!("expected a migration");
        };
        assert!(!report.changed);
        assert_eq!(store.get(USERS_KEY).unwrap(), after_first);
    }

    #[test]
    fn invalid_json_leaves_store_untouched() {
        let store = MemoryStore::with_entry(USERS_KEY, "[{\"id\": 1,");

        let result = run_migration(&store, MigrationOptions::default());

        assert!(matches!(result, Err(MigrationError::Deserialize(_))));
        assert_eq!(store.get(USERS_KEY).unwrap().as_deref(), Some("[{\"id\": 1,"));
    }

    #[test]
    fn non_array_roster_is_left_as_found() {
        let store = MemoryStore::with_entry(USERS_KEY, r#"{"id": 1}"#);

        let outcome = run_migration(&store, MigrationOptions::default()).unwrap();

        assert!(matches!(outcome, MigrationOutcome::NotASequence));
        assert_eq!(store.get(USERS_KEY).unwrap().as_deref(), Some(r#"{"id": 1}"#));
    }

    #[test]
    fn failed_write_is_reported() {
        let store = MemoryStore::with_entry(USERS_KEY, &legacy_roster());
        store.fail_writes_to(STAGING_KEY);

        let result = run_migration(&store, MigrationOptions::default());

        assert!(matches!(result, Err(MigrationError::Write(_))));
        assert_eq!(store.get(USERS_KEY).unwrap(), Some(legacy_roster()));
    }

    #[test]
    fn dry_run_writes_nothing() {
        let store = MemoryStore::with_entry(USERS_KEY, &legacy_roster());

        let outcome = run_migration(&store, MigrationOptions { dry_run: true }).unwrap();

        let MigrationOutcome::Migrated(report) = outcome else {
            panic!("expected a migration");
        };
        assert!(report.changed && report.dry_run);
        let first = report.records[0].as_typed().unwrap();
        assert!(first.time_summary.is_present());
        assert_eq!(store.get(USERS_KEY).unwrap(), Some(legacy_roster()));
    }

    #[test]
    fn interrupted_write_back_is_promoted() {
        let staged = json!([{ "id": 9, "timeSummary": { "late": 0 } }]).to_string();
        let store = MemoryStore::with_entry(USERS_KEY, "[{\"id\": 9");
        store.set(STAGING_KEY, &staged).unwrap();

        let outcome = run_migration(&store, MigrationOptions::default()).unwrap();

        let MigrationOutcome::Migrated(report) = outcome else {
            panic!("expected a migration");
        };
        assert!(report.recovered_staging);
        assert!(!report.changed);
        assert_eq!(store.get(USERS_KEY).unwrap(), Some(staged));
        assert_eq!(store.get(STAGING_KEY).unwrap(), None);
    }

    #[test]
    fn corrupt_staging_does_not_replace_a_good_roster() {
        let store = MemoryStore::with_entry(USERS_KEY, r#"[{"id": 1}]"#);
        store
            .set(STAGING_KEY, r#"[{"id": 1, "attendanceRec"#)
            .unwrap();

        let outcome = run_migration(&store, MigrationOptions::default()).unwrap();

        let MigrationOutcome::Migrated(report) = outcome else {
            panic!("expected a migration");
        };
        assert!(!report.recovered_staging);
        let stored = stored_json(&store, USERS_KEY).unwrap();
        assert_eq!(stored[0]["id"], json!(1));
        assert_eq!(stored[0]["timeSummary"]["totalWorkDays"], json!(250));
        assert_eq!(store.get(STAGING_KEY).unwrap(), None);
    }

    #[test]
    fn mistyped_fields_do_not_block_other_records() {
        let roster = json!([
            { "id": 1, "attendanceRecords": [{ "checkIn": { "time": "08:10" } }] },
            { "id": 2, "timeSummary": "n/a" },
            { "id": 3, "timeSummary": { "totalWorkDays": "250" } },
            {
                "id": 4,
                "name": 42,
                "attendanceRecords": [{ "checkIn": { "time": 800, "status": { "code": 2 } } }]
            }
        ]);
        let store = MemoryStore::with_entry(USERS_KEY, &roster.to_string());

        run_migration(&store, MigrationOptions::default()).unwrap();

        let stored = stored_json(&store, USERS_KEY).unwrap();
        assert_eq!(
            stored[0]["attendanceRecords"][0]["checkIn"]["address"],
            json!("ในพื้นที่อนุญาต")
        );
        assert_eq!(stored[1]["timeSummary"], json!("n/a"));
        assert_eq!(stored[2]["timeSummary"], json!({ "totalWorkDays": "250" }));
        let check_in = &stored[3]["attendanceRecords"][0]["checkIn"];
        assert_eq!(stored[3]["name"], json!(42));
        assert_eq!(check_in["time"], json!(800));
        assert_eq!(check_in["status"], json!({ "code": 2 }));
        assert_eq!(check_in["distance"], json!("-"));
    }

    #[test]
    fn non_object_elements_are_written_back_in_place() {
        let roster = json!([{ "id": 1, "attendanceRecords": [{ "checkIn": {} }] }, 42]);
        let store = MemoryStore::with_entry(USERS_KEY, &roster.to_string());

        let outcome = run_migration(&store, MigrationOptions::default()).unwrap();

        assert_eq!(outcome.records().map(<[_]>::len), Some(2));
        let stored = stored_json(&store, USERS_KEY).unwrap();
        assert_eq!(stored[1], json!(42));
        assert_eq!(
            stored[0]["attendanceRecords"][0]["checkIn"]["distance"],
            json!("-")
        );
    }

    #[test]
    fn whitespace_address_is_kept() {
        let roster = json!([{
            "id": 1,
            "timeSummary": {},
            "attendanceRecords": [{ "checkIn": { "address": " ", "distance": "12 m" } }]
        }]);
        let store = MemoryStore::with_entry(USERS_KEY, &roster.to_string());

        let outcome = run_migration(&store, MigrationOptions::default()).unwrap();

        let MigrationOutcome::Migrated(report) = outcome else {
            panic!("expected a migration");
        };
        assert!(!report.changed);
        assert_eq!(stored_json(&store, USERS_KEY).unwrap(), roster);
    }
}
