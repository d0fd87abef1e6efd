use std::sync::Arc;

use rocket::serde::json::Json;
use rocket::State;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::bridges::{anilist, jellyfin, qiita};
use crate::config::Config;

// ── AniList GraphQL proxy ──────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AniListQuery {
    pub query: String,
    pub variables: Option<Value>,
}

#[post("/anilist", format = "json", data = "<form>")]
pub fn anilist_query(form: Json<AniListQuery>) -> Json<Value> {
    match anilist::query(&form.query, form.variables.as_ref()) {
        Ok(resp) => Json(resp),
        Err(e) => Json(json!({"success": false, "error": e})),
    }
}

// ── Jellyfin ───────────────────────────────────────────

#[get("/jellyfin/latest?<limit>")]
pub fn jellyfin_latest(config: &State<Arc<Config>>, limit: Option<u32>) -> Json<Value> {
    let (base_url, api_key) = match (
        config.jellyfin_url.as_deref(),
        config.jellyfin_api_key.as_deref(),
    ) {
        (Some(u), Some(k)) => (u, k),
        _ => return Json(json!({"success": false, "error": "Jellyfin not configured"})),
    };

    match jellyfin::latest_items(base_url, api_key, limit.unwrap_or(12).min(50)) {
        Ok(items) => Json(json!({"success": true, "items": items})),
        Err(e) => Json(json!({"success": false, "error": e})),
    }
}

// ── Qiita ──────────────────────────────────────────────

#[get("/qiita/articles?<per_page>")]
pub fn qiita_articles(config: &State<Arc<Config>>, per_page: Option<u32>) -> Json<Value> {
    let user = match config.qiita_user.as_deref() {
        Some(u) => u,
        None => return Json(json!({"success": false, "error": "Qiita user not configured"})),
    };

    match qiita::user_articles(user, per_page.unwrap_or(20).min(100)) {
        Ok(items) => Json(json!({"success": true, "articles": items})),
        Err(e) => Json(json!({"success": false, "error": e})),
    }
}

pub fn routes() -> Vec<rocket::Route> {
    routes![anilist_query, jellyfin_latest, qiita_articles]
}
