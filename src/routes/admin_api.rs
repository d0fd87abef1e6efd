use std::sync::Arc;

use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use rocket::State;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::AdminToken;
use crate::bridges::google;
use crate::config::Config;
use crate::jobs::{Job, JobQueue, SubmitError};
use crate::store::Store;

// ── Dashboard ──────────────────────────────────────────

#[get("/stats")]
pub fn stats(_admin: AdminToken, store: &State<Arc<dyn Store>>) -> Json<Value> {
    Json(json!({
        "posts": store.post_count(None),
        "users": store.user_count(),
        "comments": store.comment_count(),
        "visitors": store.fingerprint_count(),
    }))
}

// ── Comment moderation ─────────────────────────────────

#[get("/comments?<page>")]
pub fn comments_list(
    _admin: AdminToken,
    store: &State<Arc<dyn Store>>,
    page: Option<i64>,
) -> Json<Value> {
    let per_page = 20i64;
    let current_page = page.unwrap_or(1).max(1);
    let offset = (current_page - 1) * per_page;

    Json(json!({
        "comments": store.comment_list(per_page, offset),
        "page": current_page,
        "total": store.comment_count(),
    }))
}

#[delete("/comments/<id>")]
pub fn comment_delete(_admin: AdminToken, store: &State<Arc<dyn Store>>, id: i64) -> Json<Value> {
    match store.comment_delete(id) {
        Ok(()) => Json(json!({"success": true})),
        Err(e) => Json(json!({"success": false, "error": e})),
    }
}

// ── Admin replies ──────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ReplyForm {
    pub reply: String,
}

#[put("/comments/<id>/reply", format = "json", data = "<form>")]
pub fn reply_upsert(
    _admin: AdminToken,
    store: &State<Arc<dyn Store>>,
    id: i64,
    form: Json<ReplyForm>,
) -> Json<Value> {
    if form.reply.trim().is_empty() {
        return Json(json!({"success": false, "error": "Reply is required"}));
    }
    if store.comment_find_by_id(id).is_none() {
        return Json(json!({"success": false, "error": "Comment not found"}));
    }

    match store.reply_upsert(id, &form.reply) {
        Ok(()) => Json(json!({"success": true})),
        Err(e) => Json(json!({"success": false, "error": e})),
    }
}

#[delete("/comments/<id>/reply")]
pub fn reply_delete(_admin: AdminToken, store: &State<Arc<dyn Store>>, id: i64) -> Json<Value> {
    match store.reply_delete(id) {
        Ok(()) => Json(json!({"success": true})),
        Err(e) => Json(json!({"success": false, "error": e})),
    }
}

// ── Post content ───────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct PostBodyForm {
    pub body: String,
}

/// The sync job only knows URL triples; body text is filled in here after
/// the row exists.
#[put("/posts/<id>/body", format = "json", data = "<form>")]
pub fn post_set_body(
    _admin: AdminToken,
    store: &State<Arc<dyn Store>>,
    id: i64,
    form: Json<PostBodyForm>,
) -> Json<Value> {
    if store.post_find_by_id(id).is_none() {
        return Json(json!({"success": false, "error": "Post not found"}));
    }
    match store.post_set_body(id, &form.body) {
        Ok(()) => Json(json!({"success": true})),
        Err(e) => Json(json!({"success": false, "error": e})),
    }
}

#[delete("/posts/<id>")]
pub fn post_delete(_admin: AdminToken, store: &State<Arc<dyn Store>>, id: i64) -> Json<Value> {
    match store.post_delete(id) {
        Ok(()) => Json(json!({"success": true})),
        Err(e) => Json(json!({"success": false, "error": e})),
    }
}

#[delete("/users/<id>")]
pub fn user_delete(_admin: AdminToken, store: &State<Arc<dyn Store>>, id: i64) -> Json<Value> {
    match store.user_delete(id) {
        Ok(()) => Json(json!({"success": true})),
        Err(e) => Json(json!({"success": false, "error": e})),
    }
}

// ── Post sync ──────────────────────────────────────────

#[post("/sync")]
pub fn sync_posts(
    _admin: AdminToken,
    store: &State<Arc<dyn Store>>,
    config: &State<Arc<Config>>,
) -> Json<Value> {
    match crate::sync::run(&***store, &config.site_url, &config.sitemap_url) {
        Ok(count) => Json(json!({"success": true, "upserted": count})),
        Err(e) => Json(json!({"success": false, "error": e})),
    }
}

// ── Job submission ─────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SummarizeForm {
    pub post_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct TranslateForm {
    pub post_id: i64,
    pub lang: String,
}

#[derive(Debug, Deserialize)]
pub struct DrawForm {
    pub prompt: String,
}

#[post("/jobs/summarize", format = "json", data = "<form>")]
pub fn job_summarize(
    _admin: AdminToken,
    queue: &State<JobQueue>,
    form: Json<SummarizeForm>,
) -> Custom<Json<Value>> {
    submit(queue, Job::Summarize { post_id: form.post_id })
}

#[post("/jobs/translate", format = "json", data = "<form>")]
pub fn job_translate(
    _admin: AdminToken,
    queue: &State<JobQueue>,
    form: Json<TranslateForm>,
) -> Custom<Json<Value>> {
    submit(
        queue,
        Job::Translate {
            post_id: form.post_id,
            lang: form.lang.clone(),
        },
    )
}

#[post("/jobs/draw", format = "json", data = "<form>")]
pub fn job_draw(
    _admin: AdminToken,
    queue: &State<JobQueue>,
    form: Json<DrawForm>,
) -> Custom<Json<Value>> {
    submit(queue, Job::Draw { prompt: form.prompt.clone() })
}

fn submit(queue: &JobQueue, job: Job) -> Custom<Json<Value>> {
    match queue.submit(job) {
        Ok(()) => Custom(Status::Accepted, Json(json!({"success": true, "queued": true}))),
        Err(SubmitError::QueueFull) => Custom(
            Status::ServiceUnavailable,
            Json(json!({"success": false, "error": "Job queue is full"})),
        ),
        Err(SubmitError::Closed) => Custom(
            Status::InternalServerError,
            Json(json!({"success": false, "error": "Job queue is not running"})),
        ),
    }
}

// ── Google bridges ─────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct IndexingForm {
    pub url: String,
}

#[post("/indexing", format = "json", data = "<form>")]
pub fn indexing_notify(
    _admin: AdminToken,
    config: &State<Arc<Config>>,
    form: Json<IndexingForm>,
) -> Json<Value> {
    let token = match config.google_indexing_token.as_deref() {
        Some(t) => t,
        None => {
            return Json(json!({"success": false, "error": "Indexing API not configured"}))
        }
    };

    match google::indexing_notify(token, &form.url) {
        Ok(resp) => Json(json!({"success": true, "response": resp})),
        Err(e) => Json(json!({"success": false, "error": e})),
    }
}

#[get("/analytics?<start>&<end>")]
pub fn analytics_report(
    _admin: AdminToken,
    config: &State<Arc<Config>>,
    start: Option<String>,
    end: Option<String>,
) -> Json<Value> {
    let (token, property_id) = match (config.ga_token.as_deref(), config.ga_property_id.as_deref())
    {
        (Some(t), Some(p)) => (t, p),
        _ => return Json(json!({"success": false, "error": "Analytics API not configured"})),
    };

    let start = start.unwrap_or_else(|| "7daysAgo".to_string());
    let end = end.unwrap_or_else(|| "today".to_string());

    match google::analytics_report(token, property_id, &start, &end) {
        Ok(resp) => Json(json!({"success": true, "report": resp})),
        Err(e) => Json(json!({"success": false, "error": e})),
    }
}

pub fn routes() -> Vec<rocket::Route> {
    routes![
        stats,
        comments_list,
        comment_delete,
        reply_upsert,
        reply_delete,
        post_set_body,
        post_delete,
        user_delete,
        sync_posts,
        job_summarize,
        job_translate,
        job_draw,
        indexing_notify,
        analytics_report,
    ]
}
