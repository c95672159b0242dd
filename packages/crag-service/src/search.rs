pub mod emergency;
pub mod filter;
pub mod pool;

use serde::Serialize;

use crate::SearchBackend;
use crag_config::Config;
use crag_domain::{
	document::Document,
	keyword::{KeywordSet, UsedKeywords},
};
use crag_providers::Pacer;
use filter::{AcceptedSet, Offer};
use pool::KeywordPool;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchPhase {
	Searching,
	Evaluating,
	Escalating,
	Done,
	Exhausted,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SearchRound {
	pub index: u32,
	pub keywords: Vec<String>,
	pub raw_count: usize,
	/// Documents this round added to the accepted set.
	pub unique_count: usize,
	pub duplicates: usize,
	pub rejected: usize,
	pub failed_requests: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct EmergencyReport {
	pub terms: Vec<String>,
	pub added: usize,
	pub failed_requests: usize,
}

#[derive(Debug)]
pub struct SearchOutcome {
	pub documents: Vec<Document>,
	pub rounds: Vec<SearchRound>,
	pub phase: SearchPhase,
	pub emergency: Option<EmergencyReport>,
}
impl SearchOutcome {
	pub fn rounds_used(&self) -> u32 {
		self.rounds.len() as u32
	}

	pub fn failed_requests(&self) -> usize {
		self.rounds.iter().map(|round| round.failed_requests).sum::<usize>()
			+ self.emergency.as_ref().map(|report| report.failed_requests).unwrap_or(0)
	}
}

/// Issues keyword searches round by round until enough unique documents pass the round filter.
pub struct SearchOrchestrator<'a> {
	cfg: &'a Config,
	backend: &'a dyn SearchBackend,
	pacer: &'a Pacer,
}
impl<'a> SearchOrchestrator<'a> {
	pub fn new(cfg: &'a Config, backend: &'a dyn SearchBackend, pacer: &'a Pacer) -> Self {
		Self { cfg, backend, pacer }
	}

	pub fn accepted_set(&self) -> AcceptedSet {
		AcceptedSet::from_config(&self.cfg.search.filter)
	}

	/// Escalating search with emergency recovery. Every issued term is recorded in `used`.
	pub async fn search(
		&self,
		query: &str,
		keywords: &KeywordSet,
		target: usize,
		used: &mut UsedKeywords,
	) -> SearchOutcome {
		let search_cfg = &self.cfg.search;
		let pool = KeywordPool::build(query, keywords, &search_cfg.expansion_terms);
		let per_round = search_cfg.keywords_per_round as usize;
		let mut accepted = self.accepted_set();
		let mut rounds = Vec::new();
		let mut index = 0_u32;
		let mut phase = SearchPhase::Searching;

		loop {
			phase = match phase {
				SearchPhase::Searching => {
					let terms = pool.round(index, per_round);

					if terms.is_empty() {
						SearchPhase::Exhausted
					} else {
						for term in terms {
							used.record_term(term);
						}

						rounds.push(
							self.run_round(index, terms, search_cfg.page_size, &mut accepted).await,
						);

						SearchPhase::Evaluating
					}
				},
				SearchPhase::Evaluating =>
					if accepted.len() >= target {
						SearchPhase::Done
					} else if index + 1 < search_cfg.max_rounds {
						SearchPhase::Escalating
					} else {
						SearchPhase::Exhausted
					},
				SearchPhase::Escalating => {
					index += 1;

					SearchPhase::Searching
				},
				SearchPhase::Done | SearchPhase::Exhausted => break,
			};
		}

		let emergency = if accepted.len() < target {
			let report = self.emergency(query, &mut accepted, target).await;

			for term in &report.terms {
				used.record_term(term);
			}

			Some(report)
		} else {
			None
		};

		tracing::info!(
			rounds = rounds.len(),
			accepted = accepted.len(),
			target,
			phase = ?phase,
			emergency = emergency.is_some(),
			"Keyword search finished."
		);

		SearchOutcome { documents: accepted.into_docs(), rounds, phase, emergency }
	}

	/// One round over exactly `keywords`, without escalation or emergency recovery.
	pub async fn search_once(&self, keywords: &KeywordSet, target: usize) -> SearchOutcome {
		let mut accepted = self.accepted_set();
		let round = self
			.run_round(keywords.round, &keywords.terms, self.cfg.search.page_size, &mut accepted)
			.await;
		let phase =
			if accepted.len() >= target { SearchPhase::Done } else { SearchPhase::Exhausted };

		SearchOutcome {
			documents: accepted.into_docs(),
			rounds: vec![round],
			phase,
			emergency: None,
		}
	}

	/// Generic domain terms, then the query's words, until `accepted` holds `target` documents.
	pub async fn emergency(
		&self,
		query: &str,
		accepted: &mut AcceptedSet,
		target: usize,
	) -> EmergencyReport {
		let before = accepted.len();
		let mut report = EmergencyReport::default();

		'stages: for stage in emergency::emergency_stages(&self.cfg.search, query) {
			for term in &stage.terms {
				if accepted.len() >= target {
					break 'stages;
				}

				report.terms.push(term.clone());

				match self.fetch(term, stage.page_size).await {
					Ok(docs) =>
						for doc in docs {
							accepted.offer(doc);
						},
					Err(_) => report.failed_requests += 1,
				}
			}
		}

		report.added = accepted.len() - before;

		tracing::info!(
			requests = report.terms.len(),
			added = report.added,
			accepted = accepted.len(),
			target,
			"Emergency search finished."
		);

		report
	}

	async fn run_round(
		&self,
		index: u32,
		terms: &[String],
		page_size: u32,
		accepted: &mut AcceptedSet,
	) -> SearchRound {
		let mut round = SearchRound { index, keywords: terms.to_vec(), ..Default::default() };

		for term in terms {
			let Ok(docs) = self.fetch(term, page_size).await else {
				round.failed_requests += 1;

				continue;
			};

			round.raw_count += docs.len();

			for doc in docs {
				let id = doc.id.clone();

				match accepted.offer(doc) {
					Offer::Accepted => round.unique_count += 1,
					Offer::Duplicate => round.duplicates += 1,
					Offer::Rejected(reason) => {
						round.rejected += 1;

						tracing::debug!(
							doc_id = %id,
							reason = reason.as_str(),
							"Dropped search hit."
						);
					},
				}
			}
		}

		tracing::info!(
			round = index,
			keywords = terms.len(),
			raw = round.raw_count,
			accepted = round.unique_count,
			rejected = round.rejected,
			failed = round.failed_requests,
			total = accepted.len(),
			"Search round finished."
		);

		round
	}

	async fn fetch(&self, term: &str, page_size: u32) -> color_eyre::Result<Vec<Document>> {
		self.pacer.pace().await;

		match self.backend.search(&self.cfg.providers.search, term, 1, page_size).await {
			Ok(docs) => Ok(docs),
			Err(err) => {
				tracing::warn!(
					keyword = term,
					error = %err,
					"Search request failed; skipping keyword."
				);

				Err(err)
			},
		}
	}
}
