use serde_json::{json, Value};

use crate::config::Config;

#[derive(Debug)]
pub struct AiError(pub String);

impl std::fmt::Display for AiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Summarize a post body into a few sentences.
pub fn summarize(config: &Config, body: &str) -> Result<String, AiError> {
    chat(
        config,
        "You summarize blog posts. Reply with a plain-text summary of at most three sentences.",
        body,
    )
}

/// Translate a post body into the given language (BCP 47 code).
pub fn translate(config: &Config, body: &str, lang: &str) -> Result<String, AiError> {
    let system = format!(
        "You translate blog posts. Translate the user's text into {}. Reply with the translation only.",
        lang
    );
    chat(config, &system, body)
}

/// Generate an image for a prompt. Returns the hosted image URL.
pub fn draw(config: &Config, prompt: &str) -> Result<String, AiError> {
    let api_key = config
        .openai_api_key
        .as_deref()
        .ok_or_else(|| AiError("OpenAI API key not configured".into()))?;

    let payload = json!({
        "model": "dall-e-3",
        "prompt": prompt,
        "n": 1,
        "size": "1024x1024"
    });

    let response = post_json(
        "https://api.openai.com/v1/images/generations",
        api_key,
        &payload,
    )?;

    response["data"][0]["url"]
        .as_str()
        .map(|s| s.to_string())
        .ok_or_else(|| AiError("No image URL in OpenAI response".into()))
}

// ── OpenAI chat completion ────────────────────────────

fn chat(config: &Config, system: &str, prompt: &str) -> Result<String, AiError> {
    let api_key = config
        .openai_api_key
        .as_deref()
        .ok_or_else(|| AiError("OpenAI API key not configured".into()))?;

    let payload = json!({
        "model": config.openai_model,
        "messages": [
            {"role": "system", "content": system},
            {"role": "user", "content": prompt}
        ]
    });

    let response = post_json("https://api.openai.com/v1/chat/completions", api_key, &payload)?;

    response["choices"][0]["message"]["content"]
        .as_str()
        .map(|s| s.trim().to_string())
        .ok_or_else(|| AiError("No content in OpenAI response".into()))
}

fn post_json(endpoint: &str, api_key: &str, payload: &Value) -> Result<Value, AiError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(60))
        .build()
        .map_err(|e| AiError(format!("HTTP client error: {}", e)))?;

    let resp = client
        .post(endpoint)
        .header("Authorization", format!("Bearer {}", api_key))
        .header("Content-Type", "application/json")
        .json(payload)
        .send()
        .map_err(|e| AiError(format!("OpenAI request failed: {}", e)))?;

    if !resp.status().is_success() {
        let status = resp.status();
        let text = resp.text().unwrap_or_default();
        return Err(AiError(format!("OpenAI returned {}: {}", status, text)));
    }

    resp.json::<Value>()
        .map_err(|e| AiError(format!("OpenAI response parse failed: {}", e)))
}
