use crate::{
	Judge,
	quality::{QualityAssessment, QualityEvaluator},
	search::SearchOrchestrator,
};
use crag_config::Config;
use crag_domain::{
	document::Document,
	extract,
	keyword::{self, KeywordOrigin, KeywordSet, UsedKeywords},
	lexicon, script, terms,
};
use crag_providers::BackoffPolicy;

#[derive(Debug)]
pub struct CorrectiveOutcome {
	pub documents: Vec<Document>,
	pub attempts: u32,
	/// True when `documents` is a corrected set rather than the original.
	pub corrected: bool,
	/// The assessment that belongs to `documents`.
	pub assessment: QualityAssessment,
	pub keyword_sets: Vec<KeywordSet>,
}

/// Re-searches with fresh keywords while the judged quality stays below the threshold.
pub struct CorrectiveSearchLoop<'a> {
	cfg: &'a Config,
	judge: &'a dyn Judge,
	backoff: &'a BackoffPolicy,
	orchestrator: &'a SearchOrchestrator<'a>,
	evaluator: &'a QualityEvaluator<'a>,
}
impl<'a> CorrectiveSearchLoop<'a> {
	pub fn new(
		cfg: &'a Config,
		judge: &'a dyn Judge,
		backoff: &'a BackoffPolicy,
		orchestrator: &'a SearchOrchestrator<'a>,
		evaluator: &'a QualityEvaluator<'a>,
	) -> Self {
		Self { cfg, judge, backoff, orchestrator, evaluator }
	}

	/// Each attempt searches with a keyword set disjoint from everything in `used`. The first
	/// non-empty set that passes the threshold is returned; otherwise the original set is.
	pub async fn correct(
		&self,
		query: &str,
		original: Vec<Document>,
		original_assessment: QualityAssessment,
		used: &mut UsedKeywords,
		target: usize,
	) -> CorrectiveOutcome {
		let threshold = self.cfg.quality.threshold;
		let mut issues = original_assessment.issues.clone();
		let mut keyword_sets = Vec::new();
		let mut attempts = 0;

		for attempt in 1..=self.cfg.corrective.max_attempts {
			let Some(keywords) = self.alternative_keywords(query, &issues, used, attempt).await
			else {
				tracing::info!(attempt, "No unused keywords left for corrective search.");

				break;
			};

			used.record(&keywords);

			attempts = attempt;

			let outcome = self.orchestrator.search_once(&keywords, target).await;
			let assessment = self.evaluator.evaluate(query, &outcome.documents).await;

			tracing::info!(
				attempt,
				keywords = keywords.len(),
				documents = outcome.documents.len(),
				composite = assessment.composite,
				"Corrective attempt evaluated."
			);

			keyword_sets.push(keywords);

			if !outcome.documents.is_empty() && assessment.passes(threshold) {
				return CorrectiveOutcome {
					documents: outcome.documents,
					attempts,
					corrected: true,
					assessment,
					keyword_sets,
				};
			}

			issues = assessment.issues;
		}

		tracing::info!(attempts, "Corrective search kept the original documents.");

		CorrectiveOutcome {
			documents: original,
			attempts,
			corrected: false,
			assessment: original_assessment,
			keyword_sets,
		}
	}

	async fn alternative_keywords(
		&self,
		query: &str,
		issues: &str,
		used: &UsedKeywords,
		attempt: u32,
	) -> Option<KeywordSet> {
		let max = self.cfg.corrective.max_keywords as usize;
		let prompt = build_corrective_prompt(query, issues, used, max);
		let suggested = match crate::ask_judge(
			self.judge,
			&self.cfg.providers.judge,
			self.backoff,
			"corrective",
			&prompt,
		)
		.await
		{
			Ok(reply) => extract::parse_llm_keywords(&reply, max),
			Err(err) => {
				tracing::warn!(error = %err, "Corrective keyword suggestion failed.");

				Vec::new()
			},
		};
		let suggested_count = suggested.len();
		let mut candidates: Vec<String> =
			suggested.into_iter().filter(|term| !used.contains(term)).collect();

		if candidates.is_empty() || candidates.len() < suggested_count {
			candidates.extend(
				synonym_candidates(query)
					.into_iter()
					.chain(self.cfg.search.expansion_terms.iter().cloned())
					.filter(|term| !used.contains(term)),
			);
		}

		let terms = keyword::dedup_prefer_longer(candidates, max);

		(!terms.is_empty()).then(|| KeywordSet::new(terms, KeywordOrigin::Corrective, attempt))
	}
}

/// Alternate terminology for every synonym-table key present in the query.
pub fn synonym_candidates(query: &str) -> Vec<String> {
	let normalized = script::normalize_text(query).to_lowercase();
	let tokens = terms::word_tokens(&normalized);
	let mut out = Vec::new();

	for (key, synonyms) in lexicon::SYNONYMS {
		let present = if script::contains_primary_script(key) {
			normalized.contains(key)
		} else {
			tokens.iter().any(|token| token == key)
		};

		if present {
			out.extend(synonyms.iter().map(|term| (*term).to_string()));
		}
	}

	out
}

pub fn build_corrective_prompt(
	query: &str,
	issues: &str,
	used: &UsedKeywords,
	max_keywords: usize,
) -> String {
	let issues = if issues.trim().is_empty() { "none reported" } else { issues.trim() };

	format!(
		"Suggest alternative search keywords for the question below. The previous search \
results were judged insufficient.\n\n\
Question: {query}\n\
Problems with the previous results: {issues}\n\
Keywords already used (do not repeat any of them): {used}\n\n\
Return at most {max_keywords} new keywords, one per line, 1-3 words each. Prefer synonyms, \
the same idea in the other language (Korean or English), and alternate technical \
terminology. Do not number the lines or add explanations.",
		used = used.sorted().join(", "),
	)
}
