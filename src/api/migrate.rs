use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use tracing::{error, info, instrument};
use utoipa::{IntoParams, ToSchema};

use crate::config::Config;
use crate::migration::{MigrationOptions, run_migration};
use crate::store::Store;
use crate::utils::record_cache::RecordCache;

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct MigrateQuery {
    /// Report what would change without writing (defaults to `MIGRATION_DRY_RUN`)
    #[schema(example = true)]
    pub dry_run: Option<bool>,
}

/// Re-run the users data migration
///
/// The migration is idempotent, so running it on an already current store
/// only reports `changed: false`.
#[utoipa::path(
    post,
    path = "/api/migrate",
    params(MigrateQuery),
    responses(
        (status = 200, description = "Migration finished", body = Object, example = json!({
            "status": "migrated",
            "report": {
                "run_id": "0f5b8f4e-5c4a-4a4f-9a53-6a1d7a2f0c11",
                "started_at": "2026-01-05T01:00:00Z",
                "finished_at": "2026-01-05T01:00:00Z",
                "stats": {
                    "records": 120,
                    "records_with_attendance": 118,
                    "check_events_backfilled": 5120,
                    "summaries_added": 3
                },
                "changed": true,
                "dry_run": false,
                "recovered_staging": false
            }
        })),
        (status = 500, description = "Stored data could not be read, parsed or written")
    ),
    tag = "Migration"
)]
#[instrument(name = "api_migrate", skip_all)]
pub async fn trigger_migration(
    store: web::Data<dyn Store>,
    cache: web::Data<RecordCache>,
    config: web::Data<Config>,
    query: web::Query<MigrateQuery>,
) -> actix_web::Result<impl Responder> {
    let options = MigrationOptions {
        dry_run: query.dry_run.unwrap_or(config.migration_dry_run),
    };

    // Store writes hit the filesystem; keep them off the worker thread.
    let store = store.into_inner();
    let outcome = web::block(move || run_migration(store.as_ref(), options))
        .await
        .map_err(|e| {
            error!(error = %e, "Migration task was cancelled");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?
        .map_err(|e| {
            error!(error = %e, "Migration failed");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    info!(status = outcome.status(), "Migration requested via API");
    cache.invalidate().await;

    Ok(HttpResponse::Ok().json(outcome))
}
