use std::time::Duration;

use color_eyre::{Result, eyre};
use reqwest::Client;
use serde_json::{Map, Value};

use crag_config::{SearchFields, SearchProviderConfig};
use crag_domain::document::Document;

const FALLBACK_RESULTS_KEY: &str = "data";

pub async fn search(
	cfg: &SearchProviderConfig,
	keyword: &str,
	page: u32,
	row_count: u32,
) -> Result<Vec<Document>> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let res = client
		.get(url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.query(&[
			("query", keyword.to_string()),
			("page", page.to_string()),
			("row_count", row_count.to_string()),
		])
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_search_response(&json, &cfg.fields, cfg.source_url_template.as_deref())
}

fn parse_search_response(
	json: &Value,
	fields: &SearchFields,
	source_url_template: Option<&str>,
) -> Result<Vec<Document>> {
	let records = json
		.get(fields.results.as_str())
		.or_else(|| json.get(FALLBACK_RESULTS_KEY))
		.and_then(|v| v.as_array())
		.ok_or_else(|| eyre::eyre!("Search response is missing results array."))?;
	let mut out = Vec::with_capacity(records.len());

	for record in records {
		let Some(object) = record.as_object() else { continue };

		out.push(parse_record(object, fields, source_url_template));
	}

	Ok(out)
}

fn parse_record(
	object: &Map<String, Value>,
	fields: &SearchFields,
	source_url_template: Option<&str>,
) -> Document {
	let id = object.get(fields.id.as_str()).and_then(scalar_text);
	let title = object.get(fields.title.as_str()).and_then(scalar_text).unwrap_or_default();
	let abstract_text =
		object.get(fields.abstract_text.as_str()).and_then(scalar_text).unwrap_or_default();
	let metadata: Map<String, Value> = object
		.iter()
		.filter(|(key, _)| {
			let key = key.as_str();

			key != fields.id && key != fields.title && key != fields.abstract_text
		})
		.map(|(key, value)| (key.clone(), value.clone()))
		.collect();
	let mut doc = Document::new(id.as_deref(), title, abstract_text).with_metadata(metadata);

	if let Some(template) = source_url_template
		&& !doc.has_hashed_id()
	{
		let source = template.replace("{id}", &doc.id);

		doc = doc.with_source(source);
	}

	doc
}

fn scalar_text(value: &Value) -> Option<String> {
	match value {
		Value::String(text) => Some(text.trim().to_string()),
		Value::Number(number) => Some(number.to_string()),
		_ => None,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn maps_configured_fields_and_keeps_the_rest_as_metadata() {
		let json = serde_json::json!({
			"results": [
				{ "CN": "NART001", "title": " Graph learning ", "abstract": "About graphs.", "year": 2021 },
				"not an object",
				{ "title": "No id here", "abstract": "Hashed." }
			]
		});
		let docs = parse_search_response(
			&json,
			&SearchFields::default(),
			Some("https://example.org/articles/{id}"),
		)
		.expect("parse failed");

		assert_eq!(docs.len(), 2);
		assert_eq!(docs[0].id, "NART001");
		assert_eq!(docs[0].title, "Graph learning");
		assert_eq!(docs[0].source.as_deref(), Some("https://example.org/articles/NART001"));
		assert_eq!(docs[0].metadata.get("year"), Some(&serde_json::json!(2021)));
		assert!(docs[1].has_hashed_id());
		assert!(docs[1].source.is_none());
	}

	#[test]
	fn falls_back_to_data_key() {
		let json = serde_json::json!({ "data": [{ "CN": 42, "title": "T", "abstract": "A" }] });
		let docs =
			parse_search_response(&json, &SearchFields::default(), None).expect("parse failed");

		assert_eq!(docs[0].id, "42");
	}

	#[test]
	fn missing_results_is_an_error() {
		let json = serde_json::json!({ "message": "rate limited" });

		assert!(parse_search_response(&json, &SearchFields::default(), None).is_err());
	}
}
