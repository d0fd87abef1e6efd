use chrono::NaiveDateTime;
use rusqlite::{params, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbPool;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub auth_provider: String,
    pub username: String,
    pub photo: Option<String>,
    pub created_at: NaiveDateTime,
}

impl User {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(User {
            id: row.get("id")?,
            email: row.get("email")?,
            auth_provider: row.get("auth_provider")?,
            username: row.get("username")?,
            photo: row.get("photo")?,
            created_at: row.get("created_at")?,
        })
    }

    pub fn find_by_id(pool: &DbPool, id: i64) -> Option<Self> {
        let conn = pool.get().ok()?;
        conn.query_row("SELECT * FROM users WHERE id = ?1", params![id], Self::from_row)
            .ok()
    }

    pub fn find_by_email(pool: &DbPool, email: &str) -> Option<Self> {
        let conn = pool.get().ok()?;
        conn.query_row(
            "SELECT * FROM users WHERE email = ?1",
            params![email],
            Self::from_row,
        )
        .ok()
    }

    pub fn count(pool: &DbPool) -> i64 {
        let conn = match pool.get() {
            Ok(c) => c,
            Err(_) => return 0,
        };
        conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
            .unwrap_or(0)
    }

    /// Insert-or-update keyed on email. OAuth sign-ins hit this on every
    /// login; username/photo are refreshed from the provider each time.
    /// Returns the row id.
    pub fn upsert(
        pool: &DbPool,
        email: &str,
        auth_provider: &str,
        username: &str,
        photo: Option<&str>,
    ) -> Result<i64, String> {
        let conn = pool.get().map_err(|e| e.to_string())?;
        conn.execute(
            "INSERT INTO users (email, auth_provider, username, photo)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(email)
             DO UPDATE SET auth_provider = excluded.auth_provider,
                           username = excluded.username,
                           photo = excluded.photo",
            params![email, auth_provider, username, photo],
        )
        .map_err(|e| e.to_string())?;

        conn.query_row(
            "SELECT id FROM users WHERE email = ?1",
            params![email],
            |row| row.get(0),
        )
        .map_err(|e| e.to_string())
    }

    pub fn delete(pool: &DbPool, id: i64) -> Result<(), String> {
        let conn = pool.get().map_err(|e| e.to_string())?;
        conn.execute("DELETE FROM comments WHERE user_id = ?1", params![id])
            .map_err(|e| e.to_string())?;
        conn.execute("DELETE FROM likes WHERE user_id = ?1", params![id])
            .map_err(|e| e.to_string())?;
        conn.execute("DELETE FROM users WHERE id = ?1", params![id])
            .map_err(|e| e.to_string())?;
        Ok(())
    }
}
