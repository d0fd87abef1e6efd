//! Thin forwards to third-party APIs. Each bridge translates request and
//! response shapes only; there is no business logic here and no retry —
//! a failure surfaces as a generic error string.

pub mod anilist;
pub mod discord;
pub mod google;
pub mod jellyfin;
pub mod qiita;

/// Shared blocking client constructor: explicit timeout, nothing else.
pub(crate) fn http_client() -> Result<reqwest::blocking::Client, String> {
    reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .build()
        .map_err(|e| format!("HTTP client error: {}", e))
}
