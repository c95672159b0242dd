pub mod diversity;
pub mod scoring;

use std::{cmp::Ordering, collections::HashSet};

use serde::Serialize;

use crag_config::Ranking;
use crag_domain::document::Document;
use scoring::{QueryProfile, ScoreBreakdown};

/// One output slot. Placeholders carry the configured filler text and score 0.0.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RankedResult {
	/// 1-based position in the final list.
	pub rank: u32,
	pub score: f32,
	pub kept_by_diversity: bool,
	pub placeholder: bool,
	#[serde(flatten)]
	pub document: Document,
}

#[derive(Debug, Default)]
pub struct Reranking {
	/// At most `top_k` entries, ranked 1..=n.
	pub results: Vec<RankedResult>,
	/// Candidates the diversity filter judged too close to a kept document.
	pub rejected_ids: HashSet<String>,
	/// Scored candidates outside the diversity window, best first.
	pub reserve: Vec<RankedResult>,
}

pub struct Reranker<'a> {
	cfg: &'a Ranking,
}
impl<'a> Reranker<'a> {
	pub fn new(cfg: &'a Ranking) -> Self {
		Self { cfg }
	}

	/// Scores, sorts (stable, descending) and diversity-filters `docs`, returning at most `top_k`.
	pub fn rerank(&self, docs: Vec<Document>, query: &str, top_k: usize) -> Vec<RankedResult> {
		self.rank(docs, query, top_k).results
	}

	/// Like [`Reranker::rerank`], but also hands back what the diversity filter dropped and the
	/// scored candidates it never examined.
	pub fn rank(&self, docs: Vec<Document>, query: &str, top_k: usize) -> Reranking {
		let profile = QueryProfile::new(query);
		let weights = &self.cfg.weights;
		let mut scored: Vec<(f32, Document)> = docs
			.into_iter()
			.map(|doc| (ScoreBreakdown::score(&profile, &doc, weights).composite(weights), doc))
			.collect();

		sort_by_score(&mut scored, |(score, _)| *score);

		let candidates = scored.len();
		let policy = &self.cfg.diversity;
		let mut kept = Vec::new();
		let mut rejected_ids = HashSet::new();
		let mut reserve = Vec::new();

		if policy.enabled {
			let window = top_k.saturating_mul(policy.candidate_window as usize);
			let refs: Vec<&Document> = scored.iter().map(|(_, doc)| doc).collect();
			let selection = diversity::select_diverse(&refs, top_k, window, policy.sim_threshold);
			let mut picks = selection.kept.into_iter().peekable();
			let mut drops = selection.rejected.into_iter().peekable();

			for (idx, (score, doc)) in scored.into_iter().enumerate() {
				if picks.next_if_eq(&idx).is_some() {
					kept.push((score, doc, true));
				} else if drops.next_if_eq(&idx).is_some() {
					rejected_ids.insert(doc.id);
				} else {
					reserve.push((score, doc, false));
				}
			}
		} else {
			let mut scored = scored.into_iter();

			kept.extend(scored.by_ref().take(top_k).map(|(score, doc)| (score, doc, false)));
			reserve.extend(scored.map(|(score, doc)| (score, doc, false)));
		}

		tracing::info!(
			candidates,
			kept = kept.len(),
			rejected = rejected_ids.len(),
			reserve = reserve.len(),
			top_k,
			"Documents reranked."
		);

		Reranking { results: ranked(kept), rejected_ids, reserve: ranked(reserve) }
	}

	/// Cheaper scoring for documents that join after ranking. Never marks diversity.
	pub fn score_late(&self, docs: Vec<Document>, query: &str) -> Vec<RankedResult> {
		let profile = QueryProfile::new(query);

		docs.into_iter()
			.map(|document| RankedResult {
				rank: 0,
				score: ScoreBreakdown::lightweight(&profile, &document, &self.cfg.weights)
					.composite(&self.cfg.weights),
				kept_by_diversity: false,
				placeholder: false,
				document,
			})
			.collect()
	}
}

fn ranked(entries: Vec<(f32, Document, bool)>) -> Vec<RankedResult> {
	entries
		.into_iter()
		.enumerate()
		.map(|(idx, (score, document, kept_by_diversity))| RankedResult {
			rank: idx as u32 + 1,
			score,
			kept_by_diversity,
			placeholder: false,
			document,
		})
		.collect()
}

/// Descending by score; NaN sorts last and ties keep input order.
pub fn sort_by_score<T>(items: &mut [T], score: impl Fn(&T) -> f32) {
	items.sort_by(|a, b| cmp_f32_desc(score(a), score(b)));
}

pub fn cmp_f32_desc(a: f32, b: f32) -> Ordering {
	match (a.is_nan(), b.is_nan()) {
		(true, true) => Ordering::Equal,
		(true, false) => Ordering::Greater,
		(false, true) => Ordering::Less,
		(false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
	}
}
