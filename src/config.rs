use std::env;

/// Runtime configuration, read once at boot from the environment
/// (a local `.env` file is honored in development).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: String,
    pub site_url: String,
    pub sitemap_url: String,
    pub admin_token: String,

    pub mongodb_uri: Option<String>,
    pub mongodb_db: String,

    pub geoip_db_path: Option<String>,

    pub job_workers: usize,
    pub job_queue_capacity: usize,

    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub discord_webhook_url: Option<String>,
    pub jellyfin_url: Option<String>,
    pub jellyfin_api_key: Option<String>,
    pub qiita_user: Option<String>,
    pub google_indexing_token: Option<String>,
    pub ga_property_id: Option<String>,
    pub ga_token: Option<String>,
}

fn get_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn get_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn get_usize(key: &str, default: usize) -> usize {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Self {
        let site_url = get_or("SITE_URL", "http://localhost:8000");
        let sitemap_url =
            get_opt("SITEMAP_URL").unwrap_or_else(|| format!("{}/sitemap.xml", site_url));

        Config {
            database_path: get_or("DATABASE_PATH", "data/engawa.db"),
            site_url,
            sitemap_url,
            admin_token: get_or("ADMIN_TOKEN", ""),

            mongodb_uri: get_opt("MONGODB_URI"),
            mongodb_db: get_or("MONGODB_DB", "engawa_legacy"),

            geoip_db_path: get_opt("GEOIP_DB_PATH"),

            job_workers: get_usize("JOB_WORKERS", 2),
            job_queue_capacity: get_usize("JOB_QUEUE_CAPACITY", 16),

            openai_api_key: get_opt("OPENAI_API_KEY"),
            openai_model: get_or("OPENAI_MODEL", "gpt-4o-mini"),
            discord_webhook_url: get_opt("DISCORD_WEBHOOK_URL"),
            jellyfin_url: get_opt("JELLYFIN_URL"),
            jellyfin_api_key: get_opt("JELLYFIN_API_KEY"),
            qiita_user: get_opt("QIITA_USER"),
            google_indexing_token: get_opt("GOOGLE_INDEXING_TOKEN"),
            ga_property_id: get_opt("GA_PROPERTY_ID"),
            ga_token: get_opt("GA_TOKEN"),
        }
    }
}
