use chrono::NaiveDateTime;
use rusqlite::{params, Row};
use serde::{Deserialize, Serialize};
use woothee::parser::Parser;

use crate::db::DbPool;

/// User-agent substrings that mark a visitor as a bot even when the
/// woothee parser fails to classify it. Checked case-insensitively.
const BOT_SUBSTRINGS: &[&str] = &[
    "bot", "crawler", "spider", "slurp", "curl", "wget", "python-requests",
    "headlesschrome", "phantomjs", "lighthouse", "facebookexternalhit",
];

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct VisitorFingerprint {
    pub fingerprint: String,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
    pub country: Option<String>,
    pub is_bot: bool,
    pub visit_count: i64,
    pub first_visited_at: NaiveDateTime,
    pub last_visited_at: NaiveDateTime,
}

/// Static user-agent classification, evaluated once per request.
/// No learning, no adaptive signal.
pub fn detect_bot(user_agent: &str) -> bool {
    if user_agent.trim().is_empty() {
        return true;
    }

    if let Some(result) = Parser::new().parse(user_agent) {
        if result.category == "crawler" {
            return true;
        }
    }

    let lower = user_agent.to_lowercase();
    BOT_SUBSTRINGS.iter().any(|s| lower.contains(s))
}

impl VisitorFingerprint {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(VisitorFingerprint {
            fingerprint: row.get("fingerprint")?,
            user_agent: row.get("user_agent")?,
            ip_address: row.get("ip_address")?,
            country: row.get("country")?,
            is_bot: row.get::<_, i64>("is_bot")? != 0,
            visit_count: row.get("visit_count")?,
            first_visited_at: row.get("first_visited_at")?,
            last_visited_at: row.get("last_visited_at")?,
        })
    }

    pub fn find(pool: &DbPool, fingerprint: &str) -> Option<Self> {
        let conn = pool.get().ok()?;
        conn.query_row(
            "SELECT * FROM visitor_fingerprint WHERE fingerprint = ?1",
            params![fingerprint],
            Self::from_row,
        )
        .ok()
    }

    pub fn count(pool: &DbPool) -> i64 {
        let conn = match pool.get() {
            Ok(c) => c,
            Err(_) => return 0,
        };
        conn.query_row("SELECT COUNT(*) FROM visitor_fingerprint", [], |row| row.get(0))
            .unwrap_or(0)
    }

    /// Insert a new visitor row or, on conflict, bump the visit counter,
    /// refresh last-visit time and the mutable metadata fields. The counter
    /// increments rather than replacing state, so repeat visits accumulate.
    pub fn upsert(
        pool: &DbPool,
        fingerprint: &str,
        user_agent: Option<&str>,
        ip_address: Option<&str>,
        country: Option<&str>,
        is_bot: bool,
    ) -> Result<(), String> {
        let conn = pool.get().map_err(|e| e.to_string())?;
        conn.execute(
            "INSERT INTO visitor_fingerprint
                 (fingerprint, user_agent, ip_address, country, is_bot)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(fingerprint)
             DO UPDATE SET visit_count = visit_count + 1,
                           last_visited_at = CURRENT_TIMESTAMP,
                           user_agent = excluded.user_agent,
                           ip_address = excluded.ip_address,
                           country = excluded.country,
                           is_bot = excluded.is_bot",
            params![fingerprint, user_agent, ip_address, country, is_bot as i64],
        )
        .map_err(|e| e.to_string())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_bot_crawlers() {
        assert!(detect_bot("Mozilla/5.0 (compatible; Googlebot/2.1; +http://www.google.com/bot.html)"));
        assert!(detect_bot("curl/8.4.0"));
        assert!(detect_bot("python-requests/2.31.0"));
        assert!(detect_bot("Mozilla/5.0 (compatible; Bingbot/2.0)"));
    }

    #[test]
    fn test_detect_bot_empty_ua() {
        assert!(detect_bot(""));
        assert!(detect_bot("   "));
    }

    #[test]
    fn test_detect_bot_browsers_pass() {
        assert!(!detect_bot(
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
             (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
        ));
        assert!(!detect_bot(
            "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 \
             (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1"
        ));
    }
}
