use chrono::Utc;
use mongodb::bson::{doc, Document};
use mongodb::options::ClientOptions;
use mongodb::sync::{Client, Database};
use serde::Serialize;

/// Document store holding comment/like data for content that predates the
/// relational schema. Old rows are addressed by a content-path hash
/// (sha256 of the canonical path), not a relational foreign key.
pub struct LegacyStore {
    db: Database,
}

/// Managed-state wrapper: the legacy store is optional and routes answer
/// with a configuration error when it is absent.
pub struct Legacy(pub Option<LegacyStore>);

#[derive(Debug, Serialize, Clone)]
pub struct LegacyComment {
    pub path_hash: String,
    pub name: String,
    pub body: String,
    pub created_at: String,
}

impl LegacyStore {
    pub fn new(uri: &str, db_name: &str) -> Result<Self, String> {
        let client_options = ClientOptions::parse(uri).map_err(|e| e.to_string())?;
        let client = Client::with_options(client_options).map_err(|e| e.to_string())?;
        let db = client.database(db_name);
        Ok(Self { db })
    }

    /// Test connectivity by pinging the server.
    pub fn test_connection(&self) -> Result<(), String> {
        self.db
            .run_command(doc! { "ping": 1 }, None)
            .map_err(|e| format!("MongoDB connection test failed: {}", e))?;
        Ok(())
    }

    /// Create the indexes the legacy collections rely on. One like per
    /// (path_hash, fingerprint) pair, enforced by a unique index.
    pub fn ensure_indexes(&self) -> Result<(), String> {
        use mongodb::IndexModel;

        let comments = self.db.collection::<Document>("legacy_comments");
        comments
            .create_index(
                IndexModel::builder().keys(doc! { "path_hash": 1 }).build(),
                None,
            )
            .map_err(|e| e.to_string())?;

        let likes = self.db.collection::<Document>("legacy_likes");
        likes
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "path_hash": 1, "fingerprint": 1 })
                    .options(
                        mongodb::options::IndexOptions::builder()
                            .unique(true)
                            .build(),
                    )
                    .build(),
                None,
            )
            .map_err(|e| e.to_string())?;

        Ok(())
    }

    // ── Comments ────────────────────────────────────────────────────

    pub fn comments_for_path(&self, path_hash: &str) -> Vec<LegacyComment> {
        let coll = self.db.collection::<Document>("legacy_comments");
        let cursor = match coll.find(doc! { "path_hash": path_hash }, None) {
            Ok(c) => c,
            Err(_) => return vec![],
        };

        cursor
            .filter_map(|r| r.ok())
            .map(|d| LegacyComment {
                path_hash: d.get_str("path_hash").unwrap_or_default().to_string(),
                name: d.get_str("name").unwrap_or_default().to_string(),
                body: d.get_str("body").unwrap_or_default().to_string(),
                created_at: d.get_str("created_at").unwrap_or_default().to_string(),
            })
            .collect()
    }

    pub fn comment_add(&self, path_hash: &str, name: &str, body: &str) -> Result<(), String> {
        let coll = self.db.collection::<Document>("legacy_comments");
        let now = Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();
        coll.insert_one(
            doc! {
                "path_hash": path_hash,
                "name": name,
                "body": body,
                "created_at": now,
            },
            None,
        )
        .map_err(|e| e.to_string())?;
        Ok(())
    }

    // ── Likes ───────────────────────────────────────────────────────

    /// Idempotent: $setOnInsert under the unique (path_hash, fingerprint)
    /// index means a repeat like from the same visitor changes nothing.
    pub fn like_add(&self, path_hash: &str, fingerprint: &str) -> Result<(), String> {
        let coll = self.db.collection::<Document>("legacy_likes");
        let filter = doc! { "path_hash": path_hash, "fingerprint": fingerprint };
        let update = doc! {
            "$setOnInsert": { "path_hash": path_hash, "fingerprint": fingerprint }
        };
        let opts = mongodb::options::UpdateOptions::builder()
            .upsert(true)
            .build();
        coll.update_one(filter, update, opts)
            .map_err(|e| e.to_string())?;
        Ok(())
    }

    pub fn like_count(&self, path_hash: &str) -> i64 {
        let coll = self.db.collection::<Document>("legacy_likes");
        coll.count_documents(doc! { "path_hash": path_hash }, None)
            .map(|c| c as i64)
            .unwrap_or(0)
    }
}
