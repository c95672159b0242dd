use crate::Judge;
use crag_config::Config;
use crag_domain::{
	extract::{self, ExtractOptions, Extraction},
	keyword::{self, KeywordOrigin, KeywordSet},
	morph::MorphAnalyzer,
	script, terms,
};
use crag_providers::BackoffPolicy;

/// Turns a question into the first-round keyword set. Rule-based extraction always runs; the
/// judge's terms replace it when the judge is enabled and answers with something usable.
pub struct KeywordStrategy<'a> {
	cfg: &'a Config,
	judge: &'a dyn Judge,
	morph: &'a dyn MorphAnalyzer,
	backoff: &'a BackoffPolicy,
}
impl<'a> KeywordStrategy<'a> {
	pub fn new(
		cfg: &'a Config,
		judge: &'a dyn Judge,
		morph: &'a dyn MorphAnalyzer,
		backoff: &'a BackoffPolicy,
	) -> Self {
		Self { cfg, judge, morph, backoff }
	}

	pub async fn derive(&self, query: &str) -> Extraction {
		let rules = extract::extract_keywords(query, self.morph, &extract_options(self.cfg));

		if !self.cfg.keywords.llm_enabled || query.trim().is_empty() {
			return rules;
		}

		match self.llm_keywords(query).await {
			Some(keywords) => {
				tracing::info!(
					language = ?rules.language,
					keywords = keywords.len(),
					"Using judge-suggested keywords."
				);

				Extraction { language: rules.language, keywords }
			},
			None => {
				tracing::info!(
					language = ?rules.language,
					keywords = rules.keywords.len(),
					"Using rule-based keywords."
				);

				rules
			},
		}
	}

	async fn llm_keywords(&self, query: &str) -> Option<KeywordSet> {
		let prompt = build_keyword_prompt(query, self.cfg.keywords.llm_max_keywords);
		let reply = match crate::ask_judge(
			self.judge,
			&self.cfg.providers.judge,
			self.backoff,
			"keywords",
			&prompt,
		)
		.await
		{
			Ok(reply) => reply,
			Err(err) => {
				tracing::warn!(error = %err, "Keyword extraction by judge failed.");

				return None;
			},
		};
		let mut candidates =
			extract::parse_llm_keywords(&reply, self.cfg.keywords.llm_max_keywords as usize);

		if candidates.is_empty() {
			tracing::warn!("Judge returned no usable keywords.");

			return None;
		}

		candidates.extend(terms::special_terms(&script::normalize_text(query)));

		let terms =
			keyword::dedup_prefer_longer(candidates, self.cfg.keywords.max_keywords as usize);

		Some(KeywordSet::new(terms, KeywordOrigin::Llm, 0))
	}
}

pub fn extract_options(cfg: &Config) -> ExtractOptions {
	ExtractOptions {
		primary_script_ratio: cfg.keywords.primary_script_ratio,
		technical_min_len: cfg.keywords.technical_min_len as usize,
		max_keywords: cfg.keywords.max_keywords as usize,
	}
}

pub fn build_keyword_prompt(query: &str, max_keywords: u32) -> String {
	format!(
		"Extract search keywords for an academic search engine from the question below.\n\n\
Question: {query}\n\n\
Return at most {max_keywords} keywords, one per line. Each keyword is 1-3 words and is \
the kind of term that appears in paper titles or abstracts. Keep the question's language, \
and keep acronyms as written. Do not number the lines or add explanations."
	)
}
