use crate::models::comment::{Comment, CommentForm};
use crate::models::fingerprint::VisitorFingerprint;
use crate::models::post::Post;
use crate::models::user::User;

pub mod legacy;
pub mod sqlite;

/// Unified data-access trait for current content. Every relational database
/// operation goes through here; route handlers see only this surface.
/// Legacy comment/like data lives behind `legacy::LegacyStore` instead.
pub trait Store: Send + Sync {
    // ── Lifecycle ───────────────────────────────────────────────────
    fn run_migrations(&self) -> Result<(), String>;

    // ── Posts ───────────────────────────────────────────────────────
    fn post_find_by_id(&self, id: i64) -> Option<Post>;
    fn post_find_by_triple(
        &self,
        classification: &str,
        category: &str,
        slug: &str,
    ) -> Option<Post>;
    fn post_list(&self, classification: Option<&str>, limit: i64, offset: i64) -> Vec<Post>;
    fn post_count(&self, classification: Option<&str>) -> i64;
    fn post_upsert(&self, classification: &str, category: &str, slug: &str) -> Result<(), String>;
    fn post_set_body(&self, id: i64, body: &str) -> Result<(), String>;
    fn post_set_summary(&self, id: i64, summary: &str) -> Result<(), String>;
    fn post_translation_upsert(&self, post_id: i64, lang: &str, body: &str) -> Result<(), String>;
    fn post_translation_get(&self, post_id: i64, lang: &str) -> Option<String>;
    fn post_delete(&self, id: i64) -> Result<(), String>;

    // ── Users ───────────────────────────────────────────────────────
    fn user_find_by_id(&self, id: i64) -> Option<User>;
    fn user_find_by_email(&self, email: &str) -> Option<User>;
    fn user_count(&self) -> i64;
    fn user_upsert(
        &self,
        email: &str,
        auth_provider: &str,
        username: &str,
        photo: Option<&str>,
    ) -> Result<i64, String>;
    fn user_delete(&self, id: i64) -> Result<(), String>;

    // ── Comments ────────────────────────────────────────────────────
    fn comment_find_by_id(&self, id: i64) -> Option<Comment>;
    fn comment_list(&self, limit: i64, offset: i64) -> Vec<Comment>;
    fn comment_for_post(&self, post_id: i64) -> Vec<Comment>;
    fn comment_count(&self) -> i64;
    fn comment_create(&self, form: &CommentForm) -> Result<i64, String>;
    fn comment_update_content(&self, id: i64, content: &str) -> Result<(), String>;
    fn comment_delete(&self, id: i64) -> Result<(), String>;

    // ── Admin replies (keyed by comment id, separate from the owner) ─
    fn reply_upsert(&self, id: i64, reply: &str) -> Result<(), String>;
    fn reply_delete(&self, id: i64) -> Result<(), String>;

    // ── Likes ───────────────────────────────────────────────────────
    fn like_exists(&self, post_id: i64, user_id: i64) -> bool;
    fn like_add(&self, post_id: i64, user_id: i64) -> Result<(), String>;
    fn like_remove(&self, post_id: i64, user_id: i64) -> Result<(), String>;
    fn like_count(&self, post_id: i64) -> i64;

    // ── Visitor fingerprints ────────────────────────────────────────
    fn fingerprint_find(&self, fingerprint: &str) -> Option<VisitorFingerprint>;
    fn fingerprint_count(&self) -> i64;
    fn fingerprint_upsert(
        &self,
        fingerprint: &str,
        user_agent: Option<&str>,
        ip_address: Option<&str>,
        country: Option<&str>,
        is_bot: bool,
    ) -> Result<(), String>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::sqlite::SqliteStore;

    /// Create a fresh in-memory SqliteStore with migrations applied.
    fn test_store() -> SqliteStore {
        let pool = crate::db::init_pool_memory().expect("Failed to create in-memory pool");
        let store = SqliteStore::new(pool);
        store.run_migrations().expect("migrations failed");
        store
    }

    fn seed_post(s: &SqliteStore) -> i64 {
        s.post_upsert("blogs", "tech", "hello-world").unwrap();
        s.post_find_by_triple("blogs", "tech", "hello-world")
            .unwrap()
            .id
    }

    fn seed_user(s: &SqliteStore, email: &str) -> i64 {
        s.user_upsert(email, "github", "someone", None).unwrap()
    }

    // ── Posts ───────────────────────────────────────────────────────

    #[test]
    fn test_post_upsert_idempotent() {
        let s = test_store();
        s.post_upsert("blogs", "tech", "first").unwrap();
        s.post_upsert("blogs", "tech", "first").unwrap();
        assert_eq!(s.post_count(None), 1);

        // A different slug in the same category is a new row
        s.post_upsert("blogs", "tech", "second").unwrap();
        assert_eq!(s.post_count(None), 2);

        // Same slug under a different classification is also a new row
        s.post_upsert("notes", "tech", "first").unwrap();
        assert_eq!(s.post_count(None), 3);
    }

    #[test]
    fn test_post_find_and_list() {
        let s = test_store();
        let id = seed_post(&s);

        let post = s.post_find_by_id(id).unwrap();
        assert_eq!(post.classification, "blogs");
        assert_eq!(post.category, "tech");
        assert_eq!(post.slug, "hello-world");

        s.post_upsert("notes", "life", "other").unwrap();
        assert_eq!(s.post_list(None, 10, 0).len(), 2);
        assert_eq!(s.post_list(Some("blogs"), 10, 0).len(), 1);
        assert_eq!(s.post_count(Some("notes")), 1);
    }

    #[test]
    fn test_post_body_and_summary() {
        let s = test_store();
        let id = seed_post(&s);

        s.post_set_body(id, "full text").unwrap();
        s.post_set_summary(id, "short").unwrap();
        let post = s.post_find_by_id(id).unwrap();
        assert_eq!(post.body, "full text");
        assert_eq!(post.summary.as_deref(), Some("short"));
    }

    #[test]
    fn test_post_translation_upsert() {
        let s = test_store();
        let id = seed_post(&s);

        s.post_translation_upsert(id, "en", "hello").unwrap();
        s.post_translation_upsert(id, "en", "hello again").unwrap();
        assert_eq!(s.post_translation_get(id, "en").as_deref(), Some("hello again"));
        assert!(s.post_translation_get(id, "fr").is_none());
    }

    #[test]
    fn test_post_delete_cascades() {
        let s = test_store();
        let pid = seed_post(&s);
        let uid = seed_user(&s, "a@example.com");
        s.comment_create(&CommentForm {
            post_id: pid,
            user_id: uid,
            content: "hi".to_string(),
        })
        .unwrap();
        s.like_add(pid, uid).unwrap();

        s.post_delete(pid).unwrap();
        assert!(s.post_find_by_id(pid).is_none());
        assert_eq!(s.comment_for_post(pid).len(), 0);
        assert_eq!(s.like_count(pid), 0);
    }

    // ── Users ───────────────────────────────────────────────────────

    #[test]
    fn test_user_upsert_on_email() {
        let s = test_store();
        let id1 = s
            .user_upsert("u@example.com", "github", "old-name", None)
            .unwrap();
        let id2 = s
            .user_upsert("u@example.com", "google", "new-name", Some("/p.png"))
            .unwrap();
        assert_eq!(id1, id2);
        assert_eq!(s.user_count(), 1);

        let u = s.user_find_by_id(id1).unwrap();
        assert_eq!(u.auth_provider, "google");
        assert_eq!(u.username, "new-name");
        assert_eq!(u.photo.as_deref(), Some("/p.png"));

        let u2 = s.user_find_by_email("u@example.com").unwrap();
        assert_eq!(u2.id, id1);
    }

    #[test]
    fn test_user_delete_cascades() {
        let s = test_store();
        let pid = seed_post(&s);
        let uid = seed_user(&s, "gone@example.com");
        s.comment_create(&CommentForm {
            post_id: pid,
            user_id: uid,
            content: "bye".to_string(),
        })
        .unwrap();
        s.like_add(pid, uid).unwrap();

        s.user_delete(uid).unwrap();
        assert!(s.user_find_by_id(uid).is_none());
        assert_eq!(s.comment_for_post(pid).len(), 0);
        assert_eq!(s.like_count(pid), 0);
    }

    // ── Likes ───────────────────────────────────────────────────────

    #[test]
    fn test_like_add_is_idempotent() {
        let s = test_store();
        let pid = seed_post(&s);
        let uid = seed_user(&s, "liker@example.com");

        s.like_add(pid, uid).unwrap();
        s.like_add(pid, uid).unwrap();
        assert_eq!(s.like_count(pid), 1);
        assert!(s.like_exists(pid, uid));
    }

    #[test]
    fn test_like_remove_absent_is_ok() {
        let s = test_store();
        let pid = seed_post(&s);
        let uid = seed_user(&s, "x@example.com");

        // Removing a like that was never added must not error
        s.like_remove(pid, uid).unwrap();
        assert_eq!(s.like_count(pid), 0);
    }

    #[test]
    fn test_like_toggle_cycle() {
        let s = test_store();
        let pid = seed_post(&s);
        let uid = seed_user(&s, "t@example.com");

        s.like_add(pid, uid).unwrap();
        assert_eq!(s.like_count(pid), 1);
        s.like_remove(pid, uid).unwrap();
        assert_eq!(s.like_count(pid), 0);
        assert!(!s.like_exists(pid, uid));
    }

    // ── Comments ────────────────────────────────────────────────────

    #[test]
    fn test_comment_crud() {
        let s = test_store();
        let pid = seed_post(&s);
        let uid = seed_user(&s, "c@example.com");

        let cid = s
            .comment_create(&CommentForm {
                post_id: pid,
                user_id: uid,
                content: "first!".to_string(),
            })
            .unwrap();
        assert!(cid > 0);
        assert_eq!(s.comment_count(), 1);

        s.comment_update_content(cid, "edited").unwrap();
        let c = s.comment_find_by_id(cid).unwrap();
        assert_eq!(c.content, "edited");
        assert!(c.reply.is_none());

        s.comment_delete(cid).unwrap();
        assert!(s.comment_find_by_id(cid).is_none());
        // A fetch of the post's comments never returns the deleted id
        assert!(s.comment_for_post(pid).iter().all(|c| c.id != cid));
    }

    #[test]
    fn test_comment_requires_existing_post_and_user() {
        let s = test_store();
        // Foreign keys are enforced on pooled connections, so a comment
        // pointing at rows that do not exist is rejected
        let result = s.comment_create(&CommentForm {
            post_id: 9999,
            user_id: 9999,
            content: "orphan".to_string(),
        });
        assert!(result.is_err());
        assert_eq!(s.comment_count(), 0);
    }

    #[test]
    fn test_reply_lifecycle() {
        let s = test_store();
        let pid = seed_post(&s);
        let uid = seed_user(&s, "r@example.com");
        let cid = s
            .comment_create(&CommentForm {
                post_id: pid,
                user_id: uid,
                content: "question?".to_string(),
            })
            .unwrap();

        s.reply_upsert(cid, "answer").unwrap();
        let c = s.comment_find_by_id(cid).unwrap();
        assert_eq!(c.reply.as_deref(), Some("answer"));
        assert!(c.replied_at.is_some());

        // Upserting again overwrites the previous reply
        s.reply_upsert(cid, "better answer").unwrap();
        let c = s.comment_find_by_id(cid).unwrap();
        assert_eq!(c.reply.as_deref(), Some("better answer"));

        s.reply_delete(cid).unwrap();
        let c = s.comment_find_by_id(cid).unwrap();
        assert!(c.reply.is_none());
        assert!(c.replied_at.is_none());
    }

    // ── Visitor fingerprints ────────────────────────────────────────

    #[test]
    fn test_fingerprint_upsert_increments() {
        let s = test_store();
        s.fingerprint_upsert("fp-1", Some("Mozilla/5.0"), Some("1.2.3.4"), Some("JP"), false)
            .unwrap();
        let v = s.fingerprint_find("fp-1").unwrap();
        assert_eq!(v.visit_count, 1);
        assert!(!v.is_bot);

        s.fingerprint_upsert("fp-1", Some("Mozilla/5.0"), Some("5.6.7.8"), Some("US"), false)
            .unwrap();
        let v = s.fingerprint_find("fp-1").unwrap();
        assert_eq!(v.visit_count, 2);
        assert_eq!(v.ip_address.as_deref(), Some("5.6.7.8"));
        assert_eq!(v.country.as_deref(), Some("US"));
        assert!(v.last_visited_at >= v.first_visited_at);

        s.fingerprint_upsert("fp-1", Some("curl/8.0"), Some("5.6.7.8"), Some("US"), true)
            .unwrap();
        let v = s.fingerprint_find("fp-1").unwrap();
        assert_eq!(v.visit_count, 3);
        assert!(v.is_bot);

        assert_eq!(s.fingerprint_count(), 1);
    }

    #[test]
    fn test_fingerprint_distinct_rows() {
        let s = test_store();
        s.fingerprint_upsert("fp-a", None, None, None, false).unwrap();
        s.fingerprint_upsert("fp-b", None, None, None, false).unwrap();
        assert_eq!(s.fingerprint_count(), 2);
        assert_eq!(s.fingerprint_find("fp-a").unwrap().visit_count, 1);
    }
}
