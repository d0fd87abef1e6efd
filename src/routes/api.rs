use std::sync::Arc;

use rocket::serde::json::Json;
use rocket::State;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::auth::{self, ClientIp, RequestMeta};
use crate::config::Config;
use crate::geo::GeoReader;
use crate::models::comment::CommentForm;
use crate::models::fingerprint;
use crate::store::legacy::Legacy;
use crate::store::Store;

// ── Posts ──────────────────────────────────────────────

#[get("/posts?<classification>&<page>")]
pub fn posts_list(
    store: &State<Arc<dyn Store>>,
    classification: Option<String>,
    page: Option<i64>,
) -> Json<Value> {
    let per_page = 20i64;
    let current_page = page.unwrap_or(1).max(1);
    let offset = (current_page - 1) * per_page;

    let posts = store.post_list(classification.as_deref(), per_page, offset);
    let total = store.post_count(classification.as_deref());

    Json(json!({
        "posts": posts,
        "page": current_page,
        "total": total,
    }))
}

// rank 2: lets the static /posts/<id>/translations/<lang> route match first
#[get("/posts/<classification>/<category>/<slug>", rank = 2)]
pub fn post_fetch(
    store: &State<Arc<dyn Store>>,
    classification: &str,
    category: &str,
    slug: &str,
) -> Json<Value> {
    match store.post_find_by_triple(classification, category, slug) {
        Some(post) => {
            let comments = store.comment_for_post(post.id);
            let likes = store.like_count(post.id);
            Json(json!({
                "success": true,
                "post": post,
                "comments": comments,
                "likes": likes,
            }))
        }
        None => Json(json!({"success": false, "error": "Post not found"})),
    }
}

#[get("/posts/<id>/comments")]
pub fn post_comments(store: &State<Arc<dyn Store>>, id: i64) -> Json<Value> {
    Json(json!({"comments": store.comment_for_post(id)}))
}

#[get("/posts/<id>/translations/<lang>")]
pub fn post_translation(store: &State<Arc<dyn Store>>, id: i64, lang: &str) -> Json<Value> {
    match store.post_translation_get(id, lang) {
        Some(body) => Json(json!({"success": true, "lang": lang, "body": body})),
        None => Json(json!({"success": false, "error": "Translation not found"})),
    }
}

// ── Comments ───────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CommentSubmit {
    pub post_id: i64,
    pub user_id: i64,
    pub content: String,
}

#[post("/comments", format = "json", data = "<form>")]
pub fn comment_submit(
    store: &State<Arc<dyn Store>>,
    config: &State<Arc<Config>>,
    form: Json<CommentSubmit>,
) -> Json<Value> {
    if form.content.trim().is_empty() {
        return Json(json!({"success": false, "error": "Content is required"}));
    }
    if store.post_find_by_id(form.post_id).is_none() {
        return Json(json!({"success": false, "error": "Post not found"}));
    }

    let comment_form = CommentForm {
        post_id: form.post_id,
        user_id: form.user_id,
        content: form.content.clone(),
    };

    match store.comment_create(&comment_form) {
        Ok(id) => {
            // Best-effort admin notification; a webhook failure never
            // fails the comment
            if let Some(ref webhook) = config.discord_webhook_url {
                let message = format!("New comment on post {}: {}", form.post_id, form.content);
                if let Err(e) = crate::bridges::discord::notify(webhook, &message) {
                    log::warn!("Discord notification failed: {}", e);
                }
            }
            Json(json!({"success": true, "id": id}))
        }
        Err(e) => Json(json!({"success": false, "error": e})),
    }
}

#[derive(Debug, Deserialize)]
pub struct CommentEdit {
    pub content: String,
}

/// Owner edit. The caller (frontend session layer) is responsible for
/// checking that the requester owns the comment.
#[put("/comments/<id>", format = "json", data = "<form>")]
pub fn comment_edit(
    store: &State<Arc<dyn Store>>,
    id: i64,
    form: Json<CommentEdit>,
) -> Json<Value> {
    if form.content.trim().is_empty() {
        return Json(json!({"success": false, "error": "Content is required"}));
    }
    if store.comment_find_by_id(id).is_none() {
        return Json(json!({"success": false, "error": "Comment not found"}));
    }

    match store.comment_update_content(id, &form.content) {
        Ok(()) => Json(json!({"success": true})),
        Err(e) => Json(json!({"success": false, "error": e})),
    }
}

#[delete("/comments/<id>")]
pub fn comment_delete(store: &State<Arc<dyn Store>>, id: i64) -> Json<Value> {
    match store.comment_delete(id) {
        Ok(()) => Json(json!({"success": true})),
        Err(e) => Json(json!({"success": false, "error": e})),
    }
}

// ── Users ──────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct UserUpsert {
    pub email: String,
    pub auth_provider: String,
    pub username: String,
    pub photo: Option<String>,
}

#[post("/users", format = "json", data = "<form>")]
pub fn user_upsert(store: &State<Arc<dyn Store>>, form: Json<UserUpsert>) -> Json<Value> {
    if form.email.trim().is_empty() {
        return Json(json!({"success": false, "error": "Email is required"}));
    }

    match store.user_upsert(
        &form.email,
        &form.auth_provider,
        &form.username,
        form.photo.as_deref(),
    ) {
        Ok(id) => Json(json!({"success": true, "id": id})),
        Err(e) => Json(json!({"success": false, "error": e})),
    }
}

// ── Likes ──────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct LikeResponse {
    pub liked: bool,
    pub count: i64,
}

#[derive(Debug, Deserialize)]
pub struct LikeForm {
    pub post_id: i64,
    pub user_id: i64,
}

#[post("/likes", format = "json", data = "<form>")]
pub fn like_add(store: &State<Arc<dyn Store>>, form: Json<LikeForm>) -> Json<Value> {
    match store.like_add(form.post_id, form.user_id) {
        Ok(()) => Json(json!(LikeResponse {
            liked: true,
            count: store.like_count(form.post_id),
        })),
        Err(e) => Json(json!({"success": false, "error": e})),
    }
}

#[delete("/likes", format = "json", data = "<form>")]
pub fn like_remove(store: &State<Arc<dyn Store>>, form: Json<LikeForm>) -> Json<Value> {
    match store.like_remove(form.post_id, form.user_id) {
        Ok(()) => Json(json!(LikeResponse {
            liked: false,
            count: store.like_count(form.post_id),
        })),
        Err(e) => Json(json!({"success": false, "error": e})),
    }
}

#[get("/likes/<post_id>?<user_id>")]
pub fn like_status(
    store: &State<Arc<dyn Store>>,
    post_id: i64,
    user_id: Option<i64>,
) -> Json<LikeResponse> {
    Json(LikeResponse {
        liked: user_id
            .map(|uid| store.like_exists(post_id, uid))
            .unwrap_or(false),
        count: store.like_count(post_id),
    })
}

// ── Visitor fingerprints ───────────────────────────────

#[derive(Debug, Deserialize)]
pub struct FingerprintSubmit {
    pub fingerprint: String,
}

#[post("/visitors", format = "json", data = "<form>")]
pub fn visitor_record(
    store: &State<Arc<dyn Store>>,
    geo: &State<GeoReader>,
    client_ip: ClientIp,
    meta: RequestMeta,
    form: Json<FingerprintSubmit>,
) -> Json<Value> {
    if form.fingerprint.trim().is_empty() {
        return Json(json!({"success": false, "error": "Fingerprint is required"}));
    }

    let ua = meta.user_agent.as_deref().unwrap_or("");
    let is_bot = fingerprint::detect_bot(ua);

    // GeoIP first, CF-IPCountry header second
    let country = geo
        .country(&client_ip.0)
        .or_else(|| meta.cf_country.clone());

    // Only the hash of the IP is persisted
    let ip_hash = auth::hash_ip(&client_ip.0);

    match store.fingerprint_upsert(
        &form.fingerprint,
        meta.user_agent.as_deref(),
        Some(&ip_hash),
        country.as_deref(),
        is_bot,
    ) {
        Ok(()) => {
            let visit_count = store
                .fingerprint_find(&form.fingerprint)
                .map(|v| v.visit_count)
                .unwrap_or(1);
            Json(json!({"success": true, "is_bot": is_bot, "visit_count": visit_count}))
        }
        Err(e) => Json(json!({"success": false, "error": e})),
    }
}

// ── Legacy comments/likes (document store) ─────────────

#[get("/legacy/comments?<path>")]
pub fn legacy_comments(legacy: &State<Legacy>, path: &str) -> Json<Value> {
    let store = match legacy.0.as_ref() {
        Some(s) => s,
        None => return Json(json!({"success": false, "error": "Legacy store not configured"})),
    };
    let path_hash = auth::hash_path(path);
    Json(json!({"comments": store.comments_for_path(&path_hash)}))
}

#[derive(Debug, Deserialize)]
pub struct LegacyCommentSubmit {
    pub path: String,
    pub name: String,
    pub body: String,
}

#[post("/legacy/comments", format = "json", data = "<form>")]
pub fn legacy_comment_add(legacy: &State<Legacy>, form: Json<LegacyCommentSubmit>) -> Json<Value> {
    let store = match legacy.0.as_ref() {
        Some(s) => s,
        None => return Json(json!({"success": false, "error": "Legacy store not configured"})),
    };
    if form.body.trim().is_empty() {
        return Json(json!({"success": false, "error": "Body is required"}));
    }

    let path_hash = auth::hash_path(&form.path);
    match store.comment_add(&path_hash, &form.name, &form.body) {
        Ok(()) => Json(json!({"success": true})),
        Err(e) => Json(json!({"success": false, "error": e})),
    }
}

#[derive(Debug, Deserialize)]
pub struct LegacyLikeSubmit {
    pub path: String,
    pub fingerprint: String,
}

#[post("/legacy/likes", format = "json", data = "<form>")]
pub fn legacy_like_add(legacy: &State<Legacy>, form: Json<LegacyLikeSubmit>) -> Json<Value> {
    let store = match legacy.0.as_ref() {
        Some(s) => s,
        None => return Json(json!({"success": false, "error": "Legacy store not configured"})),
    };

    let path_hash = auth::hash_path(&form.path);
    match store.like_add(&path_hash, &form.fingerprint) {
        Ok(()) => Json(json!({"success": true, "count": store.like_count(&path_hash)})),
        Err(e) => Json(json!({"success": false, "error": e})),
    }
}

#[get("/legacy/likes?<path>")]
pub fn legacy_like_count(legacy: &State<Legacy>, path: &str) -> Json<Value> {
    let store = match legacy.0.as_ref() {
        Some(s) => s,
        None => return Json(json!({"success": false, "error": "Legacy store not configured"})),
    };
    let path_hash = auth::hash_path(path);
    Json(json!({"count": store.like_count(&path_hash)}))
}

pub fn routes() -> Vec<rocket::Route> {
    routes![
        posts_list,
        post_fetch,
        post_comments,
        post_translation,
        comment_submit,
        comment_edit,
        comment_delete,
        user_upsert,
        like_add,
        like_remove,
        like_status,
        visitor_record,
        legacy_comments,
        legacy_comment_add,
        legacy_like_add,
        legacy_like_count,
    ]
}
