use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tracing::{debug, warn};

use crate::migration::{MigrationError, USERS_KEY, UsersDocument};
use crate::model::EmployeeRecord;
use crate::store::Store;

/// Parsed roster shared by the read endpoints.
///
/// Entries expire after a short TTL so edits made to the store by other
/// writers show up without a restart; a migration run invalidates eagerly.
pub struct RecordCache {
    roster: Cache<&'static str, Arc<Vec<EmployeeRecord>>>,
}

impl RecordCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            roster: Cache::builder().max_capacity(1).time_to_live(ttl).build(),
        }
    }

    /// Returns the cached roster or reads it from `store`.
    ///
    /// A missing or non-array document reads as an empty roster; array
    /// elements that are not record objects are skipped.
    pub async fn load(&self, store: &dyn Store) -> Result<Arc<Vec<EmployeeRecord>>, MigrationError> {
        if let Some(records) = self.roster.get(USERS_KEY).await {
            return Ok(records);
        }

        let records = match store.get(USERS_KEY).map_err(MigrationError::Read)? {
            None => Vec::new(),
            Some(raw) => {
                let document = UsersDocument::parse(&raw).map_err(MigrationError::Deserialize)?;
                if let UsersDocument::Other(_) = document {
                    warn!("users data is not an array, serving an empty roster");
                }
                document.employees().cloned().collect()
            }
        };
        debug!(records = records.len(), "Loaded roster into cache");

        let records = Arc::new(records);
        self.roster.insert(USERS_KEY, records.clone()).await;
        Ok(records)
    }

    pub async fn invalidate(&self) {
        self.roster.invalidate(USERS_KEY).await;
    }
}
