use rocket::http::Status;
use rocket::request::{FromRequest, Outcome, Request};
use rocket::State;
use sha2::{Digest, Sha256};
use std::sync::Arc;

use crate::config::Config;

// ── Client IP request guard ──

/// Extracts the real client IP from the request.
/// Checks headers in priority order:
///   1. CF-Connecting-IP (Cloudflare)
///   2. True-Client-IP (Cloudflare Enterprise / Akamai)
///   3. X-Real-IP (nginx proxy_set_header)
///   4. X-Forwarded-For (first IP in the chain = original client)
///   5. Rocket's client_ip() (socket peer address)
pub struct ClientIp(pub String);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for ClientIp {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let headers = request.headers();

        for header in ["CF-Connecting-IP", "True-Client-IP", "X-Real-IP"] {
            if let Some(ip) = headers.get_one(header) {
                let ip = ip.trim();
                if !ip.is_empty() {
                    return Outcome::Success(ClientIp(ip.to_string()));
                }
            }
        }

        // X-Forwarded-For: client, proxy1, proxy2 — take the first (leftmost)
        if let Some(forwarded) = headers.get_one("X-Forwarded-For") {
            if let Some(ip) = forwarded.split(',').next() {
                let ip = ip.trim();
                if !ip.is_empty() {
                    return Outcome::Success(ClientIp(ip.to_string()));
                }
            }
        }

        let ip = request
            .client_ip()
            .map(|ip| ip.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        Outcome::Success(ClientIp(ip))
    }
}

// ── Request metadata guard ──

/// Header-derived metadata for visitor tracking: the raw user agent and the
/// country Cloudflare resolved, when present.
pub struct RequestMeta {
    pub user_agent: Option<String>,
    pub cf_country: Option<String>,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for RequestMeta {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let headers = request.headers();
        let user_agent = headers.get_one("User-Agent").map(|s| s.to_string());
        let cf_country = headers
            .get_one("CF-IPCountry")
            .map(|s| s.trim().to_uppercase())
            .filter(|s| !s.is_empty() && s != "XX");
        Outcome::Success(RequestMeta {
            user_agent,
            cf_country,
        })
    }
}

// ── Admin authorization guard ──

/// Guard for admin-only endpoints. All route-level authorization goes through
/// this single capability; handlers never inspect tokens themselves.
/// Expects `Authorization: Bearer <ADMIN_TOKEN>`.
pub struct AdminToken;

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AdminToken {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let config = match request.guard::<&State<Arc<Config>>>().await.succeeded() {
            Some(c) => c,
            None => return Outcome::Error((Status::InternalServerError, ())),
        };

        if config.admin_token.is_empty() {
            // No token configured: admin surface is disabled outright
            return Outcome::Error((Status::Forbidden, ()));
        }

        let supplied = request
            .headers()
            .get_one("Authorization")
            .and_then(|h| h.strip_prefix("Bearer "))
            .unwrap_or("");

        if token_matches(supplied, &config.admin_token) {
            Outcome::Success(AdminToken)
        } else {
            Outcome::Error((Status::Unauthorized, ()))
        }
    }
}

/// Compare hashes instead of raw strings so the comparison cost does not
/// depend on how much of the token matched.
fn token_matches(supplied: &str, expected: &str) -> bool {
    sha256_hex(supplied) == sha256_hex(expected)
}

// ── Hash utilities ──

pub fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

pub fn hash_ip(ip: &str) -> String {
    sha256_hex(ip)
}

/// Content-path hash used to address legacy comment/like documents.
pub fn hash_path(path: &str) -> String {
    sha256_hex(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_matches() {
        assert!(token_matches("secret", "secret"));
        assert!(!token_matches("secret", "other"));
        assert!(!token_matches("", "secret"));
    }

    #[test]
    fn test_hash_path_stable() {
        let a = hash_path("/blogs/tech/first-post");
        let b = hash_path("/blogs/tech/first-post");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert_ne!(a, hash_path("/blogs/tech/other-post"));
    }
}
