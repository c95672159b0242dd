use std::{
	collections::HashSet,
	time::{Duration, Instant},
};

use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
	Collaborators, Error, Result,
	assemble::ResultAssembler,
	corrective::CorrectiveSearchLoop,
	hybrid,
	keywords::KeywordStrategy,
	quality::{QualityAssessment, QualityEvaluator},
	rerank::{RankedResult, Reranker},
	search::{SearchOrchestrator, SearchPhase, SearchRound},
	store::{self, SearchRecord},
};
use crag_config::Config;
use crag_domain::{
	document::Document,
	keyword::{KeywordSet, UsedKeywords},
	script::QueryLanguage,
};
use crag_providers::{BackoffPolicy, Pacer};

const NO_RESULTS_MESSAGE: &str = "No documents found.";

/// How candidates are gathered. Resolved once from `search.method`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMethod {
	Keyword,
	/// Keyword search supplemented by the vector index.
	Hybrid,
}
impl SearchMethod {
	pub fn parse(raw: &str) -> Result<Self> {
		match raw.trim() {
			"keyword" => Ok(Self::Keyword),
			"hybrid" => Ok(Self::Hybrid),
			other => Err(Error::InvalidRequest {
				message: format!("Unknown search method {other:?}; expected keyword or hybrid."),
			}),
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Keyword => "keyword",
			Self::Hybrid => "hybrid",
		}
	}
}

/// The ranked list for one question plus how it was produced. `results` always holds exactly
/// `target_count` entries.
#[derive(Clone, Debug, Serialize)]
pub struct PipelineOutput {
	pub run_id: Uuid,
	pub query: String,
	pub target_count: usize,
	pub results: Vec<RankedResult>,
	pub method: SearchMethod,
	pub language: QueryLanguage,
	pub keywords: KeywordSet,
	pub rounds_used: u32,
	pub rounds: Vec<SearchRound>,
	pub search_phase: SearchPhase,
	pub failed_requests: usize,
	pub corrective_attempts: u32,
	pub corrected: bool,
	pub corrective_keywords: Vec<KeywordSet>,
	/// Composite judge score of the set that was ranked. `None` when quality evaluation is off.
	pub final_quality_score: Option<f32>,
	pub quality_issues: Option<String>,
	pub emergency_used: bool,
	pub placeholders: usize,
	pub elapsed_seconds: f64,
}

pub struct RetrievalPipeline {
	cfg: Config,
	collaborators: Collaborators,
	method: SearchMethod,
	backoff: BackoffPolicy,
	request_delay: Duration,
}
impl RetrievalPipeline {
	pub fn new(cfg: Config, collaborators: Collaborators) -> Result<Self> {
		let method = SearchMethod::parse(&cfg.search.method)?;

		if method == SearchMethod::Hybrid && collaborators.vector.is_none() {
			tracing::warn!(
				"Hybrid search configured without a vector index; using keyword search."
			);
		}

		let backoff = BackoffPolicy::from_judge_config(&cfg.providers.judge);
		let request_delay = Duration::from_millis(cfg.search.request_delay_ms);

		Ok(Self { cfg, collaborators, method, backoff, request_delay })
	}

	pub fn with_backoff(mut self, backoff: BackoffPolicy) -> Self {
		self.backoff = backoff;

		self
	}

	pub fn with_request_delay(mut self, delay: Duration) -> Self {
		self.request_delay = delay;

		self
	}

	pub fn config(&self) -> &Config {
		&self.cfg
	}

	pub fn method(&self) -> SearchMethod {
		self.method
	}

	/// Never fails. Backend and judge failures degrade into emergency results and placeholders.
	pub async fn retrieve_and_rank(&self, query: &str, target_count: usize) -> PipelineOutput {
		let started = Instant::now();
		let run_id = Uuid::new_v4();
		let cfg = &self.cfg;
		let collaborators = &self.collaborators;
		let pacer = Pacer::new(self.request_delay);
		let orchestrator = SearchOrchestrator::new(cfg, collaborators.search.as_ref(), &pacer);
		let evaluator = QualityEvaluator::new(cfg, collaborators.judge.as_ref(), &self.backoff);

		tracing::info!(%run_id, target_count, method = self.method.as_str(), "Retrieval started.");

		let extraction = KeywordStrategy::new(
			cfg,
			collaborators.judge.as_ref(),
			collaborators.morph.as_ref(),
			&self.backoff,
		)
		.derive(query)
		.await;
		let mut used = UsedKeywords::new();

		used.record(&extraction.keywords);

		let outcome =
			orchestrator.search(query, &extraction.keywords, target_count, &mut used).await;
		let rounds_used = outcome.rounds_used();
		let failed_requests = outcome.failed_requests();
		let mut to_persist = outcome.documents.clone();
		let mut documents = match (self.method, collaborators.vector.as_deref()) {
			(SearchMethod::Hybrid, Some(index)) => {
				let hybrid_cfg = &cfg.search.hybrid;

				hybrid::supplement(index, hybrid_cfg, query, outcome.documents, target_count).await
			},
			_ => outcome.documents,
		};
		let mut assessment: Option<QualityAssessment> = None;
		let mut corrective_attempts = 0;
		let mut corrected = false;
		let mut corrective_keywords = Vec::new();

		if cfg.quality.enabled {
			let first = evaluator.evaluate(query, &documents).await;

			if cfg.corrective.enabled && !first.passes(cfg.quality.threshold) {
				let corrective = CorrectiveSearchLoop::new(
					cfg,
					collaborators.judge.as_ref(),
					&self.backoff,
					&orchestrator,
					&evaluator,
				);
				let result =
					corrective.correct(query, documents, first, &mut used, target_count).await;

				if result.corrected {
					to_persist.extend(result.documents.iter().cloned());
				}

				documents = result.documents;
				corrective_attempts = result.attempts;
				corrected = result.corrected;
				corrective_keywords = result.keyword_sets;
				assessment = Some(result.assessment);
			} else {
				assessment = Some(first);
			}
		}

		let reranking = Reranker::new(&cfg.ranking).rank(documents, query, target_count);
		let assembly =
			ResultAssembler::new(cfg, &orchestrator).assemble(query, reranking, target_count).await;

		to_persist.extend(
			assembly
				.results
				.iter()
				.filter(|result| !result.placeholder)
				.map(|result| result.document.clone()),
		);

		let output = PipelineOutput {
			run_id,
			query: query.to_string(),
			target_count,
			results: assembly.results,
			method: self.method,
			language: extraction.language,
			keywords: extraction.keywords,
			rounds_used,
			rounds: outcome.rounds,
			search_phase: outcome.phase,
			failed_requests,
			corrective_attempts,
			corrected,
			corrective_keywords,
			final_quality_score: assessment.as_ref().map(|assessment| assessment.composite),
			quality_issues: assessment.map(|assessment| assessment.issues),
			emergency_used: outcome.emergency.is_some() || assembly.emergency.is_some(),
			placeholders: assembly.placeholders,
			elapsed_seconds: started.elapsed().as_secs_f64(),
		};

		tracing::info!(
			%run_id,
			rounds = output.rounds_used,
			corrective_attempts = output.corrective_attempts,
			corrected = output.corrected,
			final_quality_score = ?output.final_quality_score,
			placeholders = output.placeholders,
			elapsed_seconds = output.elapsed_seconds,
			"Retrieval finished."
		);

		self.persist(&output, to_persist).await;

		output
	}

	async fn persist(&self, output: &PipelineOutput, docs: Vec<Document>) {
		let Some(metadata) = self.collaborators.store.as_ref() else {
			return;
		};
		let mut seen = HashSet::new();
		let docs: Vec<Document> =
			docs.into_iter().filter(|doc| seen.insert(doc.id.clone())).collect();

		if let Err(err) = metadata.upsert_documents(&docs).await {
			tracing::warn!(error = %err, docs = docs.len(), "Document upsert failed.");
		}

		let result_count = output.target_count - output.placeholders;
		let success = result_count > 0;
		let record = SearchRecord {
			search_id: store::search_id(
				&output.query,
				output.method.as_str(),
				&output.keywords.terms,
			),
			run_id: output.run_id,
			query: output.query.clone(),
			method: output.method.as_str().to_string(),
			keywords: output.keywords.terms.clone(),
			rounds: output.rounds_used,
			result_count,
			elapsed_seconds: output.elapsed_seconds,
			success,
			error_message: (!success).then(|| NO_RESULTS_MESSAGE.to_string()),
			created_at: OffsetDateTime::now_utc(),
		};

		if let Err(err) = metadata.record_search(&record).await {
			tracing::warn!(error = %err, "Search history write failed.");
		}
	}
}
