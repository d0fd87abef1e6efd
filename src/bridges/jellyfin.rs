use serde_json::Value;

/// Fetch the latest media items from a Jellyfin server and slim the
/// response down to what the frontend renders.
pub fn latest_items(base_url: &str, api_key: &str, limit: u32) -> Result<Value, String> {
    let url = format!(
        "{}/Items/Latest?limit={}",
        base_url.trim_end_matches('/'),
        limit
    );

    let client = super::http_client()?;
    let resp = client
        .get(&url)
        .header("X-Emby-Token", api_key)
        .send()
        .map_err(|e| format!("Jellyfin request failed: {}", e))?;

    if !resp.status().is_success() {
        let status = resp.status();
        let text = resp.text().unwrap_or_default();
        return Err(format!("Jellyfin returned {}: {}", status, text));
    }

    let items = resp
        .json::<Value>()
        .map_err(|e| format!("Jellyfin response parse failed: {}", e))?;

    Ok(slim_items(&items))
}

/// Keep only the fields the frontend needs: name, type, id, production year.
fn slim_items(items: &Value) -> Value {
    let slim: Vec<Value> = items
        .as_array()
        .map(|arr| {
            arr.iter()
                .map(|item| {
                    serde_json::json!({
                        "id": item["Id"],
                        "name": item["Name"],
                        "type": item["Type"],
                        "year": item["ProductionYear"],
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
    fn test_slim_items_shape() {
        let raw = json!([
            {"Id": "abc", "Name": "Movie", "Type": "Movie", "ProductionYear": 2021, "Etag": "x"},
            {"Id": "def", "Name": "Show", "Type": "Series"}
        ]);
        let slim = slim_items(&raw);
        assert_eq!(slim[0]["id"], "abc");
        assert_eq!(slim[0]["year"], 2021);
        assert!(slim[0].get("Etag").is_none());
        assert_eq!(slim[1]["name"], "Show");
    }

    #[test]
    fn test_slim_items_non_array() {
        assert_eq!(slim_items(&json!({"err": 1})), json!([]));
    }
}
