use serde_json::{json, Value};

/// Notify the Google Indexing API that a URL was updated.
pub fn indexing_notify(token: &str, url: &str) -> Result<Value, String> {
    let payload = json!({
        "url": url,
        "type": "URL_UPDATED",
    });

    let client = super::http_client()?;
    let resp = client
        .post("https://indexing.googleapis.com/v3/urlNotifications:publish")
        .header("Authorization", format!("Bearer {}", token))
        .header("Content-Type", "application/json")
        .json(&payload)
        .send()
        .map_err(|e| format!("Indexing API request failed: {}", e))?;

    if !resp.status().is_success() {
        let status = resp.status();
        let text = resp.text().unwrap_or_default();
        return Err(format!("Indexing API returned {}: {}", status, text));
    }

    resp.json::<Value>()
        .map_err(|e| format!("Indexing API response parse failed: {}", e))
}

/// Run a GA4 Data API page-view report for the given date range and forward
/// the response as-is. Shape translation happens on the request side only.
pub fn analytics_report(
    token: &str,
    property_id: &str,
    start_date: &str,
    end_date: &str,
) -> Result<Value, String> {
    let url = format!(
        "https://analyticsdata.googleapis.com/v1beta/properties/{}:runReport",
        property_id
    );

    let payload = json!({
        "dateRanges": [{"startDate": start_date, "endDate": end_date}],
        "dimensions": [{"name": "pagePath"}],
        "metrics": [{"name": "screenPageViews"}],
    });

    let client = super::http_client()?;
    let resp = client
        .post(&url)
        .header("Authorization", format!("Bearer {}", token))
        .header("Content-Type", "application/json")
        .json(&payload)
        .send()
        .map_err(|e| format!("Analytics API request failed: {}", e))?;

    if !resp.status().is_success() {
        let status = resp.status();
        let text = resp.text().unwrap_or_default();
        return Err(format!("Analytics API returned {}: {}", status, text));
    }

    resp.json::<Value>()
        .map_err(|e| format!("Analytics API response parse failed: {}", e))
}
