use serde_json::{json, Value};

const ANILIST_ENDPOINT: &str = "https://graphql.anilist.co";

/// Forward a GraphQL query to AniList and hand back the raw response body.
pub fn query(query: &str, variables: Option<&Value>) -> Result<Value, String> {
    let payload = json!({
        "query": query,
        "variables": variables.cloned().unwrap_or_else(|| json!({})),
    });

    let client = super::http_client()?;
    let resp = client
        .post(ANILIST_ENDPOINT)
        .header("Content-Type", "application/json")
        .header("Accept", "application/json")
        .json(&payload)
        .send()
        .map_err(|e| format!("AniList request failed: {}", e))?;

    if !resp.status().is_success() {
        let status = resp.status();
        let text = resp.text().unwrap_or_default();
        return Err(format!("AniList returned {}: {}", status, text));
    }

    resp.json::<Value>()
        .map_err(|e| format!("AniList response parse failed: {}", e))
}
