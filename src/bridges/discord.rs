use serde_json::json;

/// Post a message to a Discord webhook. Used to notify the admin when a new
/// comment lands; best-effort, the caller logs failures and moves on.
pub fn notify(webhook_url: &str, content: &str) -> Result<(), String> {
    // Discord caps message content at 2000 characters
    let content: String = content.chars().take(2000).collect();

    let payload = json!({ "content": content });

    let client = super::http_client()?;
    let resp = client
        .post(webhook_url)
        .header("Content-Type", "application/json")
        .json(&payload)
        .send()
        .map_err(|e| format!("Discord webhook failed: {}", e))?;

    if !resp.status().is_success() {
        let status = resp.status();
        let text = resp.text().unwrap_or_default();
        return Err(format!("Discord returned {}: {}", status, text));
    }

    Ok(())
}
