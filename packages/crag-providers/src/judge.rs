use std::time::Duration;

use color_eyre::{Result, eyre};
use reqwest::Client;
use serde_json::Value;

/// Sends one user prompt to an OpenAI-compatible chat endpoint and returns the reply text.
///
/// A reply without content is returned as an empty string. Retries are the caller's concern;
/// wrap the call in [`crate::BackoffPolicy::retry`].
pub async fn generate(cfg: &crag_config::LlmProviderConfig, prompt: &str) -> Result<String> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = serde_json::json!({
		"model": cfg.model,
		"temperature": cfg.temperature,
		"messages": [{ "role": "user", "content": prompt }],
	});
	let res = client
		.post(url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_chat_content(&json)
}

fn parse_chat_content(json: &Value) -> Result<String> {
	let choice = json
		.get("choices")
		.and_then(|v| v.as_array())
		.and_then(|arr| arr.first())
		.ok_or_else(|| eyre::eyre!("Judge response is missing choices."))?;
	let content = choice
		.get("message")
		.and_then(|msg| msg.get("content"))
		.and_then(|c| c.as_str())
		.unwrap_or_default();

	Ok(content.trim().to_string())
}
