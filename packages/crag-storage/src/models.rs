use serde_json::Value;
use time::OffsetDateTime;
use uuid::Uuid;

use crag_domain::document::Document;

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct DocumentRecord {
	pub doc_id: String,
	pub title: String,
	#[sqlx(rename = "abstract")]
	pub abstract_text: String,
	pub source: Option<String>,
	pub metadata: Value,
}
impl From<&Document> for DocumentRecord {
	fn from(doc: &Document) -> Self {
		Self {
			doc_id: doc.id.clone(),
			title: doc.title.clone(),
			abstract_text: doc.abstract_text.clone(),
			source: doc.source.clone(),
			metadata: Value::Object(doc.metadata.clone()),
		}
	}
}

/// One append-only row per pipeline run.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SearchHistoryRecord {
	pub history_id: Uuid,
	pub search_id: String,
	pub run_id: Uuid,
	pub query: String,
	pub method: String,
	pub keywords: Value,
	pub rounds: i32,
	pub result_count: i32,
	pub elapsed_seconds: f32,
	pub success: bool,
	pub error_message: Option<String>,
	pub created_at: OffsetDateTime,
}
