use std::{collections::HashMap, sync::Mutex};

use color_eyre::eyre;

use crate::{BoxFuture, Judge, SearchBackend};
use crag_config::{Config, LlmProviderConfig, SearchProviderConfig};
use crag_domain::document::Document;

const BASE_CONFIG: &str = r#"
[service]
http_bind = "127.0.0.1:0"
log_level = "info"

[providers.search]
provider_id = "test"
api_base = "http://127.0.0.1:1"
api_key = "test-key"
path = "/search"
timeout_ms = 1000

[providers.judge]
provider_id = "test"
api_base = "http://127.0.0.1:1"
api_key = "test-key"
path = "/chat/completions"
model = "test"
temperature = 0.0
timeout_ms = 1000
retry_delay_ms = 0
"#;

pub fn config() -> Config {
	config_with("")
}

/// The base config followed by `extra`, which may add whole tables.
pub fn config_with(extra: &str) -> Config {
	toml::from_str(&format!("{BASE_CONFIG}\n{extra}")).expect("Test config must parse.")
}

pub fn doc(id: &str, title: &str) -> Document {
	Document::new(Some(id), title, format!("{title} is described at length in this abstract."))
}

/// Replies to the first marker contained in the prompt. `None` replies fail the call.
#[derive(Default)]
pub struct ScriptedJudge {
	replies: Vec<(String, Option<String>)>,
	pub prompts: Mutex<Vec<String>>,
}
impl ScriptedJudge {
	pub fn reply(mut self, marker: &str, reply: &str) -> Self {
		self.replies.push((marker.to_string(), Some(reply.to_string())));

		self
	}

	pub fn fail(mut self, marker: &str) -> Self {
		self.replies.push((marker.to_string(), None));

		self
	}

	pub fn prompts_containing(&self, marker: &str) -> usize {
		self.prompts
			.lock()
			.expect("Prompt log poisoned.")
			.iter()
			.filter(|prompt| prompt.contains(marker))
			.count()
	}
}

impl Judge for ScriptedJudge {
	fn generate<'a>(
		&'a self,
		_cfg: &'a LlmProviderConfig,
		prompt: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<String>> {
		self.prompts.lock().expect("Prompt log poisoned.").push(prompt.to_string());

		let reply = self
			.replies
			.iter()
			.find(|(marker, _)| prompt.contains(marker.as_str()))
			.map(|(_, reply)| reply.clone());

		Box::pin(async move {
			match reply {
				Some(Some(reply)) => Ok(reply),
				_ => Err(eyre::eyre!("Judge unavailable.")),
			}
		})
	}
}

/// Fixed hits per lowercased keyword; unknown keywords return nothing.
#[derive(Default)]
pub struct ScriptedBackend {
	hits: HashMap<String, Vec<Document>>,
	pub calls: Mutex<Vec<(String, u32)>>,
}
impl ScriptedBackend {
	pub fn hits(mut self, keyword: &str, docs: Vec<Document>) -> Self {
		self.hits.insert(keyword.to_lowercase(), docs);

		self
	}

	pub fn keywords(&self) -> Vec<String> {
		self.calls.lock().expect("Call log poisoned.").iter().map(|(kw, _)| kw.clone()).collect()
	}
}

impl SearchBackend for ScriptedBackend {
	fn search<'a>(
		&'a self,
		_cfg: &'a SearchProviderConfig,
		keyword: &'a str,
		_page: u32,
		row_count: u32,
	) -> BoxFuture<'a, color_eyre::Result<Vec<Document>>> {
		self.calls.lock().expect("Call log poisoned.").push((keyword.to_string(), row_count));

		let docs = self.hits.get(&keyword.to_lowercase()).cloned().unwrap_or_default();

		Box::pin(async move { Ok(docs) })
	}
}
