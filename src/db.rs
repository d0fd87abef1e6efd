use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

pub type DbPool = Pool<SqliteConnectionManager>;

/// `PRAGMA foreign_keys` is per-connection in SQLite, so it has to run on
/// every connection the pool hands out, not just the first one.
#[derive(Debug)]
struct ConnectionSetup;

impl r2d2::CustomizeConnection<rusqlite::Connection, rusqlite::Error> for ConnectionSetup {
    fn on_acquire(&self, conn: &mut rusqlite::Connection) -> Result<(), rusqlite::Error> {
        conn.execute_batch("PRAGMA foreign_keys=ON;")
    }
}

pub fn init_pool(path: &str) -> Result<DbPool, Box<dyn std::error::Error>> {
    let manager = SqliteConnectionManager::file(path);
    let pool = Pool::builder()
        .max_size(10)
        .connection_customizer(Box::new(ConnectionSetup))
        .build(manager)?;

    // Enable WAL mode for better concurrent read performance. WAL is a
    // database-level setting and persists, so once is enough.
    let conn = pool.get()?;
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;

    Ok(pool)
}

pub fn init_pool_memory() -> Result<DbPool, Box<dyn std::error::Error>> {
    let manager = SqliteConnectionManager::memory();
    let pool = Pool::builder()
        .max_size(1)
        .connection_customizer(Box::new(ConnectionSetup))
        .build(manager)?;
    Ok(pool)
}

pub fn run_migrations(pool: &DbPool) -> Result<(), Box<dyn std::error::Error>> {
    let conn = pool.get()?;

    conn.execute_batch(
        "
        -- Posts, synced from the generated sitemap. The natural key is the
        -- (classification, category, slug) triple parsed from the URL path.
        CREATE TABLE IF NOT EXISTS posts (
            id INTEGER PRIMARY KEY,
            classification TEXT NOT NULL,
            category TEXT NOT NULL,
            slug TEXT NOT NULL,
            body TEXT NOT NULL DEFAULT '',
            summary TEXT,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            updated_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            UNIQUE(classification, category, slug)
        );

        -- Machine translations of post bodies, filled by the job queue
        CREATE TABLE IF NOT EXISTS post_translations (
            post_id INTEGER NOT NULL,
            lang TEXT NOT NULL,
            body TEXT NOT NULL,
            updated_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            UNIQUE(post_id, lang),
            FOREIGN KEY (post_id) REFERENCES posts(id)
        );

        -- Users arriving via OAuth providers; keyed by email
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY,
            email TEXT UNIQUE NOT NULL,
            auth_provider TEXT NOT NULL,
            username TEXT NOT NULL,
            photo TEXT,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );

        -- Comments; reply/replied_at are written only by the admin reply path
        CREATE TABLE IF NOT EXISTS comments (
            id INTEGER PRIMARY KEY,
            post_id INTEGER NOT NULL,
            user_id INTEGER NOT NULL,
            content TEXT NOT NULL,
            reply TEXT,
            replied_at DATETIME,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            updated_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            FOREIGN KEY (post_id) REFERENCES posts(id),
            FOREIGN KEY (user_id) REFERENCES users(id)
        );

        CREATE INDEX IF NOT EXISTS idx_comments_post ON comments(post_id);

        -- Likes: one per (post, user), enforced by the unique constraint
        CREATE TABLE IF NOT EXISTS likes (
            post_id INTEGER NOT NULL,
            user_id INTEGER NOT NULL,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            UNIQUE(post_id, user_id),
            FOREIGN KEY (post_id) REFERENCES posts(id)
        );

        -- Anonymous visitor tracking; visit_count increments on repeat visits
        CREATE TABLE IF NOT EXISTS visitor_fingerprint (
            fingerprint TEXT PRIMARY KEY,
            user_agent TEXT,
            ip_address TEXT,
            country TEXT,
            is_bot INTEGER NOT NULL DEFAULT 0,
            visit_count INTEGER NOT NULL DEFAULT 1,
            first_visited_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            last_visited_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );

        CREATE INDEX IF NOT EXISTS idx_visitors_last ON visitor_fingerprint(last_visited_at);
        ",
    )?;

    Ok(())
}
