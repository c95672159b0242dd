pub mod assemble;
pub mod corrective;
pub mod hybrid;
pub mod keywords;
pub mod pipeline;
pub mod quality;
pub mod rerank;
pub mod search;
pub mod store;

mod error;
#[cfg(test)]
mod test_support;

pub use error::{Error, Result};
pub use pipeline::{PipelineOutput, RetrievalPipeline, SearchMethod};
pub use quality::QualityAssessment;
pub use rerank::RankedResult;
pub use search::{SearchPhase, SearchRound};
pub use store::SearchRecord;

use std::{future::Future, pin::Pin, sync::Arc};

use crag_config::{LlmProviderConfig, SearchProviderConfig};
use crag_domain::{
	document::Document,
	morph::{HangulNounAnalyzer, MorphAnalyzer},
};
use crag_providers::{BackoffPolicy, judge, search as search_provider};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait SearchBackend
where
	Self: Send + Sync,
{
	fn search<'a>(
		&'a self,
		cfg: &'a SearchProviderConfig,
		keyword: &'a str,
		page: u32,
		row_count: u32,
	) -> BoxFuture<'a, color_eyre::Result<Vec<Document>>>;
}

pub trait Judge
where
	Self: Send + Sync,
{
	fn generate<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		prompt: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<String>>;
}

/// Optional semantic index. Documents go in after keyword search; similar ones come back out.
pub trait VectorIndex
where
	Self: Send + Sync,
{
	fn upsert<'a>(&'a self, docs: &'a [Document]) -> BoxFuture<'a, Result<()>>;

	fn query<'a>(
		&'a self,
		text: &'a str,
		k: usize,
		threshold: f32,
	) -> BoxFuture<'a, Result<Vec<(Document, f32)>>>;
}

/// Long-lived document cache with idempotent upserts and an append-only search log.
pub trait MetadataStore
where
	Self: Send + Sync,
{
	fn upsert_documents<'a>(&'a self, docs: &'a [Document]) -> BoxFuture<'a, Result<()>>;

	fn record_search<'a>(&'a self, record: &'a SearchRecord) -> BoxFuture<'a, Result<()>>;
}

#[derive(Clone)]
pub struct Collaborators {
	pub search: Arc<dyn SearchBackend>,
	pub judge: Arc<dyn Judge>,
	pub morph: Arc<dyn MorphAnalyzer>,
	pub vector: Option<Arc<dyn VectorIndex>>,
	pub store: Option<Arc<dyn MetadataStore>>,
}
impl Collaborators {
	pub fn new(search: Arc<dyn SearchBackend>, judge: Arc<dyn Judge>) -> Self {
		Self { search, judge, morph: Arc::new(HangulNounAnalyzer), vector: None, store: None }
	}

	pub fn with_morph(mut self, morph: Arc<dyn MorphAnalyzer>) -> Self {
		self.morph = morph;

		self
	}

	pub fn with_vector(mut self, vector: Arc<dyn VectorIndex>) -> Self {
		self.vector = Some(vector);

		self
	}

	pub fn with_store(mut self, store: Arc<dyn MetadataStore>) -> Self {
		self.store = Some(store);

		self
	}
}
impl Default for Collaborators {
	fn default() -> Self {
		let provider = Arc::new(DefaultProviders);

		Self::new(provider.clone(), provider)
	}
}

struct DefaultProviders;

impl SearchBackend for DefaultProviders {
	fn search<'a>(
		&'a self,
		cfg: &'a SearchProviderConfig,
		keyword: &'a str,
		page: u32,
		row_count: u32,
	) -> BoxFuture<'a, color_eyre::Result<Vec<Document>>> {
		Box::pin(search_provider::search(cfg, keyword, page, row_count))
	}
}

impl Judge for DefaultProviders {
	fn generate<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		prompt: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<String>> {
		Box::pin(judge::generate(cfg, prompt))
	}
}

/// One judge call under the retry policy.
pub(crate) async fn ask_judge(
	judge: &dyn Judge,
	cfg: &LlmProviderConfig,
	backoff: &BackoffPolicy,
	label: &str,
	prompt: &str,
) -> color_eyre::Result<String> {
	backoff.retry(label, |_| judge.generate(cfg, prompt)).await
}
