use std::sync::Arc;
use std::time::Duration;

use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};
use dotenvy::dotenv;

use hrm_migrator::config::Config;
use hrm_migrator::docs::ApiDoc;
use hrm_migrator::migration::{MigrationOptions, MigrationOutcome, run_migration};
use hrm_migrator::routes;
use hrm_migrator::store::{FileStore, Store};
use hrm_migrator::utils::record_cache::RecordCache;
use tracing::{error, info};
use tracing_appender::rolling;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[get("/")]
async fn index() -> impl Responder {
    "HRM attendance store"
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "migrator.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(config.log_level)
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!(store = %config.store_path.display(), "Server starting...");

    let store: Arc<dyn Store> = Arc::new(FileStore::open(&config.store_path)?);

    // Must finish before anything serves attendance data.
    let options = MigrationOptions {
        dry_run: config.migration_dry_run,
    };
    match run_migration(store.as_ref(), options) {
        Ok(MigrationOutcome::Migrated(report)) => info!(
            run_id = %report.run_id,
            records = report.stats.records,
            changed = report.changed,
            "Bootstrap migration complete"
        ),
        Ok(outcome) => info!(status = outcome.status(), "Bootstrap migration skipped"),
        Err(e) => error!(error = %e, "Bootstrap migration failed, serving stored data as is"),
    }

    let server_addr = config.server_addr.clone();
    let config_data = config.clone();
    let store_data: Data<dyn Store> = Data::from(store);
    let cache = Data::new(RecordCache::new(Duration::from_secs(
        config.record_cache_ttl_secs,
    )));

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(store_data.clone())
            .app_data(cache.clone())
            .app_data(Data::new(config.clone()))
            .service(index)
            .configure(|cfg| routes::configure(cfg, config_data.clone()))
    })
    .bind(server_addr)?
    .run()
    .await?;

    Ok(())
}
