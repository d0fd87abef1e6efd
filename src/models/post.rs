use chrono::NaiveDateTime;
use rusqlite::{params, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbPool;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Post {
    pub id: i64,
    pub classification: String,
    pub category: String,
    pub slug: String,
    pub body: String,
    pub summary: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Post {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Post {
            id: row.get("id")?,
            classification: row.get("classification")?,
            category: row.get("category")?,
            slug: row.get("slug")?,
            body: row.get("body")?,
            summary: row.get("summary")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    pub fn find_by_id(pool: &DbPool, id: i64) -> Option<Self> {
        let conn = pool.get().ok()?;
        conn.query_row("SELECT * FROM posts WHERE id = ?1", params![id], Self::from_row)
            .ok()
    }

    pub fn find_by_triple(
        pool: &DbPool,
        classification: &str,
        category: &str,
        slug: &str,
    ) -> Option<Self> {
        let conn = pool.get().ok()?;
        conn.query_row(
            "SELECT * FROM posts WHERE classification = ?1 AND category = ?2 AND slug = ?3",
            params![classification, category, slug],
            Self::from_row,
        )
        .ok()
    }

    pub fn list(
        pool: &DbPool,
        classification: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Vec<Self> {
        let conn = match pool.get() {
            Ok(c) => c,
            Err(_) => return vec![],
        };

        let (sql, params_vec): (String, Vec<Box<dyn rusqlite::types::ToSql>>) =
            match classification {
                Some(c) => (
                    "SELECT * FROM posts WHERE classification = ?1 ORDER BY created_at DESC LIMIT ?2 OFFSET ?3"
                        .to_string(),
                    vec![Box::new(c.to_string()), Box::new(limit), Box::new(offset)],
                ),
                None => (
                    "SELECT * FROM posts ORDER BY created_at DESC LIMIT ?1 OFFSET ?2".to_string(),
                    vec![Box::new(limit), Box::new(offset)],
                ),
            };

        let mut stmt = match conn.prepare(&sql) {
            Ok(s) => s,
            Err(_) => return vec![],
        };

        let params_refs: Vec<&dyn rusqlite::types::ToSql> =
            params_vec.iter().map(|p| p.as_ref()).collect();

        stmt.query_map(params_refs.as_slice(), Self::from_row)
            .map(|rows| rows.filter_map(|r| r.ok()).collect())
            .unwrap_or_default()
    }

    pub fn count(pool: &DbPool, classification: Option<&str>) -> i64 {
        let conn = match pool.get() {
            Ok(c) => c,
            Err(_) => return 0,
        };

        match classification {
            Some(c) => conn
                .query_row(
                    "SELECT COUNT(*) FROM posts WHERE classification = ?1",
                    params![c],
                    |row| row.get(0),
                )
                .unwrap_or(0),
            None => conn
                .query_row("SELECT COUNT(*) FROM posts", [], |row| row.get(0))
                .unwrap_or(0),
        }
    }

    /// Insert-or-update keyed on the (classification, category, slug) natural
    /// key. Re-running with the same triple touches updated_at and never
    /// creates a second row.
    pub fn upsert(
        pool: &DbPool,
        classification: &str,
        category: &str,
        slug: &str,
    ) -> Result<(), String> {
        let conn = pool.get().map_err(|e| e.to_string())?;
        conn.execute(
            "INSERT INTO posts (classification, category, slug)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(classification, category, slug)
             DO UPDATE SET updated_at = CURRENT_TIMESTAMP",
            params![classification, category, slug],
        )
        .map_err(|e| e.to_string())?;
        Ok(())
    }

    pub fn set_body(pool: &DbPool, id: i64, body: &str) -> Result<(), String> {
        let conn = pool.get().map_err(|e| e.to_string())?;
        conn.execute(
            "UPDATE posts SET body = ?1, updated_at = CURRENT_TIMESTAMP WHERE id = ?2",
            params![body, id],
        )
        .map_err(|e| e.to_string())?;
        Ok(())
    }

    pub fn set_summary(pool: &DbPool, id: i64, summary: &str) -> Result<(), String> {
        let conn = pool.get().map_err(|e| e.to_string())?;
        conn.execute(
            "UPDATE posts SET summary = ?1, updated_at = CURRENT_TIMESTAMP WHERE id = ?2",
            params![summary, id],
        )
        .map_err(|e| e.to_string())?;
        Ok(())
    }

    pub fn translation_upsert(
        pool: &DbPool,
        post_id: i64,
        lang: &str,
        body: &str,
    ) -> Result<(), String> {
        let conn = pool.get().map_err(|e| e.to_string())?;
        conn.execute(
            "INSERT INTO post_translations (post_id, lang, body)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(post_id, lang)
             DO UPDATE SET body = excluded.body, updated_at = CURRENT_TIMESTAMP",
            params![post_id, lang, body],
        )
        .map_err(|e| e.to_string())?;
        Ok(())
    }

    pub fn translation_get(pool: &DbPool, post_id: i64, lang: &str) -> Option<String> {
        let conn = pool.get().ok()?;
        conn.query_row(
            "SELECT body FROM post_translations WHERE post_id = ?1 AND lang = ?2",
            params![post_id, lang],
            |row| row.get(0),
        )
        .ok()
    }

    pub fn delete(pool: &DbPool, id: i64) -> Result<(), String> {
        let conn = pool.get().map_err(|e| e.to_string())?;
        conn.execute("DELETE FROM post_translations WHERE post_id = ?1", params![id])
            .map_err(|e| e.to_string())?;
        conn.execute("DELETE FROM comments WHERE post_id = ?1", params![id])
            .map_err(|e| e.to_string())?;
        conn.execute("DELETE FROM likes WHERE post_id = ?1", params![id])
            .map_err(|e| e.to_string())?;
        conn.execute("DELETE FROM posts WHERE id = ?1", params![id])
            .map_err(|e| e.to_string())?;
        Ok(())
    }
}
