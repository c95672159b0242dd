use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const HASH_ID_PREFIX: &str = "hash:";
const HASH_ID_HEX_LEN: usize = 32;

/// A search hit. `id` is the backend's external id, or a content hash of title and abstract
/// when the backend did not supply one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Document {
	pub id: String,
	pub title: String,
	#[serde(rename = "abstract")]
	pub abstract_text: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub source: Option<String>,
	#[serde(default, skip_serializing_if = "Map::is_empty")]
	pub metadata: Map<String, Value>,
}
impl Document {
	pub fn new(
		id: Option<&str>,
		title: impl Into<String>,
		abstract_text: impl Into<String>,
	) -> Self {
		let title = title.into();
		let abstract_text = abstract_text.into();
		let id = match id.map(str::trim).filter(|id| !id.is_empty()) {
			Some(id) => id.to_string(),
			None => content_hash_id(&title, &abstract_text),
		};

		Self { id, title, abstract_text, source: None, metadata: Map::new() }
	}

	pub fn with_source(mut self, source: impl Into<String>) -> Self {
		self.source = Some(source.into());

		self
	}

	pub fn with_metadata(mut self, metadata: Map<String, Value>) -> Self {
		self.metadata = metadata;

		self
	}

	/// Title and abstract joined the way every similarity signal reads a document.
	pub fn text(&self) -> String {
		format!("{} {}", self.title, self.abstract_text)
	}

	pub fn has_hashed_id(&self) -> bool {
		self.id.starts_with(HASH_ID_PREFIX)
	}
}

pub fn content_hash_id(title: &str, abstract_text: &str) -> String {
	let mut hasher = blake3::Hasher::new();

	hasher.update(title.trim().as_bytes());
	hasher.update(b"\n");
	hasher.update(abstract_text.trim().as_bytes());

	let hex = hasher.finalize().to_hex();

	format!("{HASH_ID_PREFIX}{}", &hex.as_str()[..HASH_ID_HEX_LEN])
}
