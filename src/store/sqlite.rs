use rusqlite::params;

use crate::db::DbPool;
use crate::models::comment::{Comment, CommentForm};
use crate::models::fingerprint::VisitorFingerprint;
use crate::models::post::Post;
use crate::models::user::User;

use super::Store;

/// SQLite-backed implementation of the Store trait.
/// Wraps the r2d2 connection pool and delegates to model methods.
pub struct SqliteStore {
    pub pool: DbPool,
}

impl SqliteStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl Store for SqliteStore {
    // ── Lifecycle ───────────────────────────────────────────────────

    fn run_migrations(&self) -> Result<(), String> {
        crate::db::run_migrations(&self.pool).map_err(|e| e.to_string())
    }

    // ── Posts ───────────────────────────────────────────────────────

    fn post_find_by_id(&self, id: i64) -> Option<Post> {
        Post::find_by_id(&self.pool, id)
    }

    fn post_find_by_triple(
        &self,
        classification: &str,
        category: &str,
        slug: &str,
    ) -> Option<Post> {
        Post::find_by_triple(&self.pool, classification, category, slug)
    }

    fn post_list(&self, classification: Option<&str>, limit: i64, offset: i64) -> Vec<Post> {
        Post::list(&self.pool, classification, limit, offset)
    }

    fn post_count(&self, classification: Option<&str>) -> i64 {
        Post::count(&self.pool, classification)
    }

    fn post_upsert(&self, classification: &str, category: &str, slug: &str) -> Result<(), String> {
        Post::upsert(&self.pool, classification, category, slug)
    }

    fn post_set_body(&self, id: i64, body: &str) -> Result<(), String> {
        Post::set_body(&self.pool, id, body)
    }

    fn post_set_summary(&self, id: i64, summary: &str) -> Result<(), String> {
        Post::set_summary(&self.pool, id, summary)
    }

    fn post_translation_upsert(&self, post_id: i64, lang: &str, body: &str) -> Result<(), String> {
        Post::translation_upsert(&self.pool, post_id, lang, body)
    }

    fn post_translation_get(&self, post_id: i64, lang: &str) -> Option<String> {
        Post::translation_get(&self.pool, post_id, lang)
    }

    fn post_delete(&self, id: i64) -> Result<(), String> {
        Post::delete(&self.pool, id)
    }

    // ── Users ───────────────────────────────────────────────────────

    fn user_find_by_id(&self, id: i64) -> Option<User> {
        User::find_by_id(&self.pool, id)
    }

    fn user_find_by_email(&self, email: &str) -> Option<User> {
        User::find_by_email(&self.pool, email)
    }

    fn user_count(&self) -> i64 {
        User::count(&self.pool)
    }

    fn user_upsert(
        &self,
        email: &str,
        auth_provider: &str,
        username: &str,
        photo: Option<&str>,
    ) -> Result<i64, String> {
        User::upsert(&self.pool, email, auth_provider, username, photo)
    }

    fn user_delete(&self, id: i64) -> Result<(), String> {
        User::delete(&self.pool, id)
    }

    // ── Comments ────────────────────────────────────────────────────

    fn comment_find_by_id(&self, id: i64) -> Option<Comment> {
        Comment::find_by_id(&self.pool, id)
    }

    fn comment_list(&self, limit: i64, offset: i64) -> Vec<Comment> {
        Comment::list(&self.pool, limit, offset)
    }

    fn comment_for_post(&self, post_id: i64) -> Vec<Comment> {
        Comment::for_post(&self.pool, post_id)
    }

    fn comment_count(&self) -> i64 {
        Comment::count(&self.pool)
    }

    fn comment_create(&self, form: &CommentForm) -> Result<i64, String> {
        Comment::create(&self.pool, form)
    }

    fn comment_update_content(&self, id: i64, content: &str) -> Result<(), String> {
        Comment::update_content(&self.pool, id, content)
    }

    fn comment_delete(&self, id: i64) -> Result<(), String> {
        Comment::delete(&self.pool, id)
    }

    fn reply_upsert(&self, id: i64, reply: &str) -> Result<(), String> {
        Comment::reply_upsert(&self.pool, id, reply)
    }

    fn reply_delete(&self, id: i64) -> Result<(), String> {
        Comment::reply_delete(&self.pool, id)
    }

    // ── Likes ───────────────────────────────────────────────────────

    fn like_exists(&self, post_id: i64, user_id: i64) -> bool {
        let conn = match self.pool.get() {
            Ok(c) => c,
            Err(_) => return false,
        };
        conn.query_row(
            "SELECT COUNT(*) FROM likes WHERE post_id = ?1 AND user_id = ?2",
            params![post_id, user_id],
            |row| row.get::<_, i64>(0),
        )
        .map(|c| c > 0)
        .unwrap_or(false)
    }

    fn like_add(&self, post_id: i64, user_id: i64) -> Result<(), String> {
        let conn = self.pool.get().map_err(|e| e.to_string())?;
        // Conflict on the (post_id, user_id) key is ignored, so a repeat
        // add from the same user is a no-op.
        conn.execute(
            "INSERT OR IGNORE INTO likes (post_id, user_id) VALUES (?1, ?2)",
            params![post_id, user_id],
        )
        .map_err(|e| e.to_string())?;
        Ok(())
    }

    fn like_remove(&self, post_id: i64, user_id: i64) -> Result<(), String> {
        let conn = self.pool.get().map_err(|e| e.to_string())?;
        conn.execute(
            "DELETE FROM likes WHERE post_id = ?1 AND user_id = ?2",
            params![post_id, user_id],
        )
        .map_err(|e| e.to_string())?;
        Ok(())
    }

    fn like_count(&self, post_id: i64) -> i64 {
        let conn = match self.pool.get() {
            Ok(c) => c,
            Err(_) => return 0,
        };
        conn.query_row(
            "SELECT COUNT(*) FROM likes WHERE post_id = ?1",
            params![post_id],
            |row| row.get(0),
        )
        .unwrap_or(0)
    }

    // ── Visitor fingerprints ────────────────────────────────────────

    fn fingerprint_find(&self, fingerprint: &str) -> Option<VisitorFingerprint> {
        VisitorFingerprint::find(&self.pool, fingerprint)
    }

    fn fingerprint_count(&self) -> i64 {
        VisitorFingerprint::count(&self.pool)
    }

    fn fingerprint_upsert(
        &self,
        fingerprint: &str,
        user_agent: Option<&str>,
        ip_address: Option<&str>,
        country: Option<&str>,
        is_bot: bool,
    ) -> Result<(), String> {
        VisitorFingerprint::upsert(&self.pool, fingerprint, user_agent, ip_address, country, is_bot)
    }
}
