use quick_xml::events::Event;
use quick_xml::Reader;
use url::Url;

use crate::store::Store;

/// A (classification, category, slug) triple parsed from a canonical post URL.
pub type PostTriple = (String, String, String);

/// Pull every `<loc>` URL out of a sitemap.xml document.
pub fn parse_sitemap(xml_content: &str) -> Vec<String> {
    let mut reader = Reader::from_str(xml_content);
    reader.config_mut().trim_text(true);

    let mut urls = Vec::new();
    let mut buf = Vec::new();
    let mut in_loc = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                in_loc = e.name().as_ref() == b"loc";
            }
            Ok(Event::Text(ref e)) => {
                if in_loc {
                    let text = e.unescape().unwrap_or_default().to_string();
                    if !text.is_empty() {
                        urls.push(text);
                    }
                }
            }
            // Some generators wrap <loc> values in CDATA
            Ok(Event::CData(ref e)) => {
                if in_loc {
                    let text = String::from_utf8_lossy(e).trim().to_string();
                    if !text.is_empty() {
                        urls.push(text);
                    }
                }
            }
            Ok(Event::End(_)) => in_loc = false,
            Ok(Event::Eof) => break,
            Err(e) => {
                log::warn!("Sitemap parse error, stopping: {}", e);
                break;
            }
            _ => {}
        }
        buf.clear();
    }

    urls
}

/// Extract the (classification, category, slug) triple from a canonical post
/// URL by positional path-segment parsing relative to the site. URLs on a
/// foreign host, and URLs with fewer than three path segments (index pages,
/// tag pages, the homepage), yield None and are skipped by the sync job
/// rather than failing it.
pub fn extract_triple(site: &Url, url_str: &str) -> Option<PostTriple> {
    let url = Url::parse(url_str).ok()?;
    if url.host_str() != site.host_str() {
        return None;
    }
    let segments: Vec<&str> = url
        .path_segments()?
        .filter(|s| !s.is_empty())
        .collect();

    if segments.len() < 3 {
        return None;
    }

    Some((
        segments[0].to_string(),
        segments[1].to_string(),
        segments[2].to_string(),
    ))
}

/// Upsert one post row per valid triple in `urls`. Returns the count of
/// upserted rows. Idempotent: re-running with the same list produces no
/// duplicates because the conflict target is the natural key.
pub fn upsert_from_urls(store: &dyn Store, site: &Url, urls: &[String]) -> Result<usize, String> {
    let mut upserted = 0usize;

    for url in urls {
        match extract_triple(site, url) {
            Some((classification, category, slug)) => {
                store.post_upsert(&classification, &category, &slug)?;
                upserted += 1;
            }
            None => {
                log::debug!("[sync] Skipping non-post URL: {}", url);
            }
        }
    }

    Ok(upserted)
}

/// Fetch the generated sitemap and sync the posts table from it. The only
/// multi-step batch operation in the system.
pub fn run(store: &dyn Store, site_url: &str, sitemap_url: &str) -> Result<usize, String> {
    let site = Url::parse(site_url).map_err(|e| format!("Invalid site URL: {}", e))?;

    let client = reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .build()
        .map_err(|e| format!("HTTP client error: {}", e))?;

    let resp = client
        .get(sitemap_url)
        .send()
        .map_err(|e| format!("Sitemap fetch failed: {}", e))?;

    if !resp.status().is_success() {
        return Err(format!("Sitemap fetch returned {}", resp.status()));
    }

    let xml = resp
        .text()
        .map_err(|e| format!("Sitemap body read failed: {}", e))?;

    let urls = parse_sitemap(&xml);
    let count = upsert_from_urls(store, &site, &urls)?;
    log::info!("[sync] Upserted {} posts from {} sitemap URLs", count, urls.len());
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::sqlite::SqliteStore;
    use crate::store::Store;

    fn test_store() -> SqliteStore {
        let pool = crate::db::init_pool_memory().expect("pool");
        let store = SqliteStore::new(pool);
        store.run_migrations().expect("migrations failed");
        store
    }

    fn site() -> Url {
        Url::parse("https://example.com").unwrap()
    }

    const SITEMAP: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url><loc>https://example.com/</loc></url>
  <url><loc>https://example.com/blogs</loc></url>
  <url><loc>https://example.com/blogs/tech/first-post</loc></url>
  <url><loc>https://example.com/blogs/tech/second-post</loc></url>
  <url><loc>https://example.com/notes/life/a-note</loc></url>
  <url><loc>https://ads.example.org/blogs/tech/injected</loc></url>
</urlset>"#;

    #[test]
    fn test_parse_sitemap_locs() {
        let urls = parse_sitemap(SITEMAP);
        assert_eq!(urls.len(), 6);
        assert_eq!(urls[0], "https://example.com/");
        assert_eq!(urls[2], "https://example.com/blogs/tech/first-post");
    }

    #[test]
    fn test_parse_sitemap_cdata_locs() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset>
  <url><loc><![CDATA[https://example.com/blogs/tech/first-post]]></loc></url>
</urlset>"#;
        let urls = parse_sitemap(xml);
        assert_eq!(urls, vec!["https://example.com/blogs/tech/first-post"]);
    }

    #[test]
    fn test_extract_triple() {
        assert_eq!(
            extract_triple(&site(), "https://example.com/blogs/tech/first-post"),
            Some(("blogs".to_string(), "tech".to_string(), "first-post".to_string()))
        );
        // Trailing slash does not produce a phantom segment
        assert_eq!(
            extract_triple(&site(), "https://example.com/blogs/tech/first-post/"),
            Some(("blogs".to_string(), "tech".to_string(), "first-post".to_string()))
        );
    }

    #[test]
    fn test_extract_triple_malformed() {
        assert!(extract_triple(&site(), "https://example.com/").is_none());
        assert!(extract_triple(&site(), "https://example.com/blogs").is_none());
        assert!(extract_triple(&site(), "https://example.com/blogs/tech").is_none());
        assert!(extract_triple(&site(), "not a url").is_none());
    }

    #[test]
    fn test_extract_triple_foreign_host() {
        // A well-formed path on the wrong host is not a post
        assert!(extract_triple(&site(), "https://ads.example.org/blogs/tech/injected").is_none());
        assert!(extract_triple(&site(), "https://example.com.evil.net/blogs/tech/x").is_none());
    }

    #[test]
    fn test_upsert_counts_valid_only() {
        let s = test_store();
        let urls = parse_sitemap(SITEMAP);
        // 3 post URLs; the homepage, the index page and the foreign-host URL
        // are skipped — count is exactly 3
        let count = upsert_from_urls(&s, &site(), &urls).unwrap();
        assert_eq!(count, 3);
        assert_eq!(s.post_count(None), 3);
        assert!(s.post_find_by_triple("blogs", "tech", "injected").is_none());
    }

    #[test]
    fn test_rerun_is_idempotent() {
        let s = test_store();
        let urls = parse_sitemap(SITEMAP);
        upsert_from_urls(&s, &site(), &urls).unwrap();
        let count = upsert_from_urls(&s, &site(), &urls).unwrap();
        assert_eq!(count, 3);
        assert_eq!(s.post_count(None), 3);
    }
}
