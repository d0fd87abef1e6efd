#[macro_use]
extern crate rocket;

use std::sync::Arc;

use rocket::serde::json::Json;
use serde_json::{json, Value};

mod ai;
mod auth;
mod bridges;
mod config;
mod db;
mod geo;
mod jobs;
mod models;
mod routes;
mod store;
mod sync;

use config::Config;
use geo::GeoReader;
use jobs::JobQueue;
use store::legacy::{Legacy, LegacyStore};
use store::sqlite::SqliteStore;
use store::Store;

#[catch(404)]
fn not_found() -> Json<Value> {
    Json(json!({"success": false, "error": "Not found"}))
}

#[catch(401)]
fn unauthorized() -> Json<Value> {
    Json(json!({"success": false, "error": "Unauthorized"}))
}

#[catch(403)]
fn forbidden() -> Json<Value> {
    Json(json!({"success": false, "error": "Forbidden"}))
}

#[catch(500)]
fn server_error() -> Json<Value> {
    Json(json!({"success": false, "error": "Internal server error"}))
}

/// Connect to the legacy document store, tolerating absence: old
/// comment/like data is read-mostly and the rest of the API works
/// without it.
fn init_legacy(config: &Config) -> Option<LegacyStore> {
    let uri = config.mongodb_uri.as_deref()?;
    match LegacyStore::new(uri, &config.mongodb_db) {
        Ok(store) => match store.test_connection().and_then(|_| store.ensure_indexes()) {
            Ok(()) => {
                log::info!("Legacy document store connected");
                Some(store)
            }
            Err(e) => {
                log::warn!("Legacy document store unavailable: {}", e);
                None
            }
        },
        Err(e) => {
            log::warn!("Legacy document store init failed: {}", e);
            None
        }
    }
}

#[launch]
fn rocket() -> _ {
    dotenv::dotenv().ok();
    env_logger::init();

    let config = Arc::new(Config::from_env());

    // Boot check — the database directory must exist and be writable
    if let Some(parent) = std::path::Path::new(&config.database_path).parent() {
        std::fs::create_dir_all(parent).expect("Failed to create database directory");
    }

    let pool = db::init_pool(&config.database_path).expect("Failed to initialize database pool");
    db::run_migrations(&pool).expect("Failed to run database migrations");

    let store: Arc<dyn Store> = Arc::new(SqliteStore::new(pool));
    let legacy = Legacy(init_legacy(&config));
    let geo = GeoReader::open(config.geoip_db_path.as_deref());
    let queue = JobQueue::start(
        config.job_workers,
        config.job_queue_capacity,
        Arc::clone(&store),
        Arc::clone(&config),
    );

    if config.admin_token.is_empty() {
        log::warn!("ADMIN_TOKEN not set — the admin API will reject every request");
    }

    rocket::build()
        .manage(store)
        .manage(config)
        .manage(legacy)
        .manage(geo)
        .manage(queue)
        .mount("/api", routes::api::routes())
        .mount("/api", routes::proxy::routes())
        .mount("/admin/api", routes::admin_api::routes())
        .register("/", catchers![not_found, unauthorized, forbidden, server_error])
}
