use std::sync::Arc;

use crag_service::{Collaborators, RetrievalPipeline};
use crag_storage::db::Db;

#[derive(Clone)]
pub struct AppState {
	pub pipeline: Arc<RetrievalPipeline>,
}
impl AppState {
	/// Default HTTP collaborators, plus the Postgres store when `[storage.postgres]` is set.
	pub async fn new(config: crag_config::Config) -> color_eyre::Result<Self> {
		let mut collaborators = Collaborators::default();

		if let Some(postgres) = config.storage.postgres.as_ref() {
			let db = Db::connect(postgres).await?;

			db.ensure_schema().await?;

			collaborators = collaborators.with_store(Arc::new(db));
		} else {
			tracing::info!("No metadata store configured; results will not be persisted.");
		}

		let pipeline = RetrievalPipeline::new(config, collaborators)?;

		Ok(Self::from_pipeline(pipeline))
	}

	pub fn from_pipeline(pipeline: RetrievalPipeline) -> Self {
		Self { pipeline: Arc::new(pipeline) }
	}
}
