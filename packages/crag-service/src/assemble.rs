use std::collections::HashSet;

use crate::{
	rerank::{self, RankedResult, Reranker, Reranking},
	search::{EmergencyReport, SearchOrchestrator},
};
use crag_config::{Config, Output};
use crag_domain::document::Document;

const PLACEHOLDER_ID_PREFIX: &str = "placeholder-";

#[derive(Debug)]
pub struct Assembly {
	/// Exactly the requested number of entries, ranked 1..=n.
	pub results: Vec<RankedResult>,
	pub emergency: Option<EmergencyReport>,
	pub placeholders: usize,
}

/// Brings a ranked list to exactly `target` entries: emergency search first, then placeholders.
pub struct ResultAssembler<'a> {
	cfg: &'a Config,
	orchestrator: &'a SearchOrchestrator<'a>,
}
impl<'a> ResultAssembler<'a> {
	pub fn new(cfg: &'a Config, orchestrator: &'a SearchOrchestrator<'a>) -> Self {
		Self { cfg, orchestrator }
	}

	/// Tops up from the unexamined reserve before searching again. Documents the diversity
	/// filter rejected never come back.
	pub async fn assemble(&self, query: &str, reranking: Reranking, target: usize) -> Assembly {
		let Reranking { results: mut ranked, rejected_ids, reserve } = reranking;
		let mut emergency = None;
		let shortfall = target.saturating_sub(ranked.len());

		if shortfall > 0 && !reserve.is_empty() {
			let taken = reserve.len().min(shortfall);

			tracing::info!(taken, reserve = reserve.len(), "Filling results from reserve.");

			ranked.extend(reserve.into_iter().take(shortfall));
		}
		if ranked.len() < target {
			let mut accepted = self.orchestrator.accepted_set();

			for result in &ranked {
				accepted.seed(result.document.clone());
			}
			for id in &rejected_ids {
				accepted.exclude(id);
			}

			let report = self.orchestrator.emergency(query, &mut accepted, target).await;
			let added: Vec<Document> = accepted.into_docs().split_off(ranked.len());

			ranked.extend(Reranker::new(&self.cfg.ranking).score_late(added, query));

			emergency = Some(report);
		}

		rerank::sort_by_score(&mut ranked, |result| result.score);
		ranked.truncate(target);

		let placeholders = target - ranked.len();

		if placeholders > 0 {
			tracing::warn!(
				placeholders,
				target,
				"Padding results with placeholders after emergency search."
			);

			pad_placeholders(&mut ranked, target, &self.cfg.output);
		}

		for (idx, result) in ranked.iter_mut().enumerate() {
			result.rank = idx as u32 + 1;
		}

		Assembly { results: ranked, emergency, placeholders }
	}
}

/// Appends placeholders with ids that collide with nothing already in `results`.
pub fn pad_placeholders(results: &mut Vec<RankedResult>, target: usize, cfg: &Output) {
	let taken: HashSet<String> = results.iter().map(|result| result.document.id.clone()).collect();
	let mut next = 1_usize;

	while results.len() < target {
		let id = format!("{PLACEHOLDER_ID_PREFIX}{next}");

		next += 1;

		if taken.contains(&id) {
			continue;
		}

		results.push(RankedResult {
			rank: 0,
			score: 0.0,
			kept_by_diversity: false,
			placeholder: true,
			document: Document::new(
				Some(id.as_str()),
				cfg.placeholder_title.as_str(),
				cfg.placeholder_abstract.as_str(),
			)
			.with_source(cfg.placeholder_source.as_str()),
		});
	}
}
