use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{BoxFuture, MetadataStore, Result};
use crag_domain::document::Document;
use crag_storage::{
	db::Db,
	models::{DocumentRecord, SearchHistoryRecord},
	queries,
};

const SEARCH_ID_HEX_LEN: usize = 32;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SearchRecord {
	pub search_id: String,
	pub run_id: Uuid,
	pub query: String,
	pub method: String,
	pub keywords: Vec<String>,
	pub rounds: u32,
	pub result_count: usize,
	pub elapsed_seconds: f64,
	pub success: bool,
	pub error_message: Option<String>,
	#[serde(with = "time::serde::rfc3339")]
	pub created_at: OffsetDateTime,
}

/// Stable identifier for "this query, searched this way, with these keywords".
pub fn search_id(query: &str, method: &str, keywords: &[String]) -> String {
	let mut hasher = blake3::Hasher::new();

	hasher.update(query.trim().as_bytes());
	hasher.update(b"|");
	hasher.update(method.as_bytes());
	hasher.update(b"|");
	hasher.update(keywords.join(",").as_bytes());

	hasher.finalize().to_hex().as_str()[..SEARCH_ID_HEX_LEN].to_string()
}

impl MetadataStore for Db {
	fn upsert_documents<'a>(&'a self, docs: &'a [Document]) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			let records: Vec<DocumentRecord> = docs.iter().map(DocumentRecord::from).collect();

			queries::upsert_documents(self, &records).await?;

			Ok(())
		})
	}

	fn record_search<'a>(&'a self, record: &'a SearchRecord) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			let row = SearchHistoryRecord {
				history_id: Uuid::new_v4(),
				search_id: record.search_id.clone(),
				run_id: record.run_id,
				query: record.query.clone(),
				method: record.method.clone(),
				keywords: serde_json::json!(record.keywords),
				rounds: i32::try_from(record.rounds).unwrap_or(i32::MAX),
				result_count: i32::try_from(record.result_count).unwrap_or(i32::MAX),
				elapsed_seconds: record.elapsed_seconds as f32,
				success: record.success,
				error_message: record.error_message.clone(),
				created_at: record.created_at,
			};

			queries::insert_search_history(&self.pool, &row).await?;

			Ok(())
		})
	}
}
