use crag_domain::{
	keyword::{self, KeywordSet},
	lexicon, script, terms,
};

/// Ordered, case-insensitively unique search terms consumed round by round.
#[derive(Clone, Debug, PartialEq)]
pub struct KeywordPool {
	terms: Vec<String>,
}
impl KeywordPool {
	/// Derived keywords, then query words, inflection variants, related terms and the generic
	/// expansion terms.
	pub fn build(query: &str, keywords: &KeywordSet, expansion_terms: &[String]) -> Self {
		let normalized = script::normalize_text(query);
		let query_words = terms::query_tokens(&normalized);
		let mut candidates: Vec<String> = keywords.terms.clone();

		candidates.extend(query_words.iter().cloned());

		for term in keywords.terms.iter().chain(&query_words) {
			candidates.extend(terms::inflection_variants(term));
		}
		for (key, related) in lexicon::RELATED_TERMS {
			if normalized.contains(key) {
				candidates.extend(related.iter().map(|term| (*term).to_string()));
			}
		}

		candidates.extend(expansion_terms.iter().cloned());

		Self { terms: keyword::dedup_prefer_longer(candidates, usize::MAX) }
	}

	/// Terms for round `index` (0-based). Empty once the pool is exhausted.
	pub fn round(&self, index: u32, per_round: usize) -> &[String] {
		let start = (index as usize).saturating_mul(per_round).min(self.terms.len());
		let end = start.saturating_add(per_round).min(self.terms.len());

		&self.terms[start..end]
	}

	pub fn len(&self) -> usize {
		self.terms.len()
	}

	pub fn is_empty(&self) -> bool {
		self.terms.is_empty()
	}

	pub fn terms(&self) -> &[String] {
		&self.terms
	}
}
