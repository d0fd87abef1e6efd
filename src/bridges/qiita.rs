use serde_json::Value;

/// Fetch a user's public Qiita articles and translate the response to a
/// slim item list: title, url, likes, created_at.
pub fn user_articles(user: &str, per_page: u32) -> Result<Value, String> {
    let url = format!(
        "https://qiita.com/api/v2/users/{}/items?per_page={}",
        user, per_page
    );

    let client = super::http_client()?;
    let resp = client
        .get(&url)
        .header("Accept", "application/json")
        .send()
        .map_err(|e| format!("Qiita request failed: {}", e))?;

    if !resp.status().is_success() {
        let status = resp.status();
        let text = resp.text().unwrap_or_default();
        return Err(format!("Qiita returned {}: {}", status, text));
    }

    let items = resp
        .json::<Value>()
        .map_err(|e| format!("Qiita response parse failed: {}", e))?;

    Ok(slim_articles(&items))
}

fn slim_articles(items: &Value) -> Value {
    let slim: Vec<Value> = items
        .as_array()
        .map(|arr| {
            arr.iter()
                .map(|item| {
                    serde_json::json!({
                        "title": item["title"],
                        "url": item["url"],
                        "likes": item["likes_count"],
                        "created_at": item["created_at"],
                    })
                })
                .collect()
        })
        .unwrap_or_default();
    Value::Array(slim)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_slim_articles_shape() {
        let raw = json!([
            {"title": "A", "url": "https://qiita.com/a", "likes_count": 5,
             "created_at": "2024-01-01T00:00:00+09:00", "rendered_body": "<p>...</p>"}
        ]);
        let slim = slim_articles(&raw);
        assert_eq!(slim[0]["title"], "A");
        assert_eq!(slim[0]["likes"], 5);
        assert!(slim[0].get("rendered_body").is_none());
    }
}
