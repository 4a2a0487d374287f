use crate::{
    api::{migrate, users},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::web;
use std::sync::Arc;

// Helper to build per-route limiter
fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = (60_000 / requests_per_min as u64).max(1);
    // Period and burst are both non-zero here, so the builder always succeeds.
    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .unwrap_or_default();
    Governor::new(&cfg)
}

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    let read_limiter = Arc::new(build_limiter(config.rate_read_per_min));
    let migrate_limiter = Arc::new(build_limiter(config.rate_migrate_per_min));

    cfg.service(
        web::scope(&config.api_prefix)
            .service(
                web::scope("/users")
                    .wrap(read_limiter)
                    // /users
                    .service(web::resource("").route(web::get().to(users::list_users)))
                    // /users/{id}
                    .service(web::resource("/{id}").route(web::get().to(users::get_user)))
                    // /users/{id}/attendance
                    .service(
                        web::resource("/{id}/attendance")
                            .route(web::get().to(users::get_attendance)),
                    )
                    // /users/{id}/summary
                    .service(
                        web::resource("/{id}/summary").route(web::get().to(users::get_summary)),
                    ),
            )
            .service(
                web::resource("/migrate")
                    .wrap(migrate_limiter)
                    .route(web::post().to(migrate::trigger_migration)),
            ),
    );
}

// BOOT
//  ├─ open store (STORE_PATH)
//  ├─ run_migration (usersData, staged through usersData_staging)
//  └─ serve

// READ
//  └─ GET /users... served from the record cache

// POST /migrate
//  └─ re-runs the migration, then drops the record cache
