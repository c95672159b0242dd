use std::collections::BTreeSet;

use serde::Serialize;

use crag_config::RankingWeights;
use crag_domain::{document::Document, lexicon, quality, script, similarity, taxonomy, terms};

const MAX_QUERY_KEYWORDS: usize = 10;
const MAX_CONCEPTS: usize = 5;
const MIN_KEYWORD_CHARS: usize = 3;
const MIN_CONCEPT_CHARS: usize = 6;

/// The parts of a question every document is scored against.
#[derive(Clone, Debug, PartialEq)]
pub struct QueryProfile {
	pub text: String,
	/// Stop-word free words of three or more characters.
	pub keywords: Vec<String>,
	/// Longer words that should show up in a matching title.
	pub concepts: BTreeSet<String>,
}
impl QueryProfile {
	pub fn new(query: &str) -> Self {
		let text = script::normalize_text(query);
		let concepts = concepts(&text);
		let mut keywords = Vec::new();

		for token in terms::word_tokens(&text) {
			if token.chars().count() >= MIN_KEYWORD_CHARS
				&& keywords.len() < MAX_QUERY_KEYWORDS
				&& !lexicon::is_stop_word(&token)
				&& !keywords.contains(&token)
			{
				keywords.push(token);
			}
		}

		Self { text, keywords, concepts }
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct ScoreBreakdown {
	pub lexical: f32,
	pub keyword: f32,
	pub title: f32,
	pub quality: f32,
	pub domain: f32,
}
impl ScoreBreakdown {
	pub fn score(profile: &QueryProfile, doc: &Document, weights: &RankingWeights) -> Self {
		Self {
			lexical: similarity::tfidf_cosine(&profile.text, &doc.text()),
			..Self::lightweight(profile, doc, weights)
		}
	}

	/// Every signal except lexical similarity, for documents added after ranking.
	pub fn lightweight(profile: &QueryProfile, doc: &Document, weights: &RankingWeights) -> Self {
		Self {
			lexical: 0.0,
			keyword: keyword_overlap(profile, doc, weights.keyword_title_share),
			title: title_concept_overlap(profile, &doc.title),
			quality: quality::document_quality(&doc.title, &doc.abstract_text),
			domain: taxonomy::domain_consistency(&profile.text, &doc.abstract_text),
		}
	}

	pub fn composite(&self, weights: &RankingWeights) -> f32 {
		weights.lexical * self.lexical
			+ weights.keyword * self.keyword
			+ weights.title * self.title
			+ weights.quality * self.quality
			+ weights.domain * self.domain
	}
}

/// Share of query keywords found in the title and in the abstract, blended by `title_share`.
pub fn keyword_overlap(profile: &QueryProfile, doc: &Document, title_share: f32) -> f32 {
	if profile.keywords.is_empty() {
		return 0.0;
	}

	let title = doc.title.to_lowercase();
	let abstract_text = doc.abstract_text.to_lowercase();
	let total = profile.keywords.len() as f32;
	let in_title = profile.keywords.iter().filter(|kw| title.contains(kw.as_str())).count();
	let in_abstract =
		profile.keywords.iter().filter(|kw| abstract_text.contains(kw.as_str())).count();

	title_share * (in_title as f32 / total) + (1.0 - title_share) * (in_abstract as f32 / total)
}

/// The first few long words of `text`, as a set.
pub fn concepts(text: &str) -> BTreeSet<String> {
	terms::word_tokens(text)
		.into_iter()
		.filter(|token| token.chars().count() >= MIN_CONCEPT_CHARS)
		.take(MAX_CONCEPTS)
		.collect()
}

/// Jaccard overlap of query concepts and title concepts.
pub fn title_concept_overlap(profile: &QueryProfile, title: &str) -> f32 {
	similarity::jaccard(&profile.concepts, &concepts(&script::normalize_text(title)))
}
