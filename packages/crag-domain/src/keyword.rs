use std::collections::HashSet;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeywordOrigin {
	/// Nouns extracted from a primary-script query.
	Primary,
	/// Stop-word filtered tokens of a secondary-script query.
	Basic,
	Llm,
	Corrective,
	Emergency,
}
impl KeywordOrigin {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Primary => "primary",
			Self::Basic => "basic",
			Self::Llm => "llm",
			Self::Corrective => "corrective",
			Self::Emergency => "emergency",
		}
	}
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KeywordSet {
	pub terms: Vec<String>,
	pub origin: KeywordOrigin,
	pub round: u32,
}
impl KeywordSet {
	pub fn new(terms: Vec<String>, origin: KeywordOrigin, round: u32) -> Self {
		Self { terms, origin, round }
	}

	pub fn is_empty(&self) -> bool {
		self.terms.is_empty()
	}

	pub fn len(&self) -> usize {
		self.terms.len()
	}

	pub fn normalized_terms(&self) -> impl Iterator<Item = String> + '_ {
		self.terms.iter().map(|term| normalize_term(term))
	}

	/// True when no term of this set appears in `used` (compared case-insensitively).
	pub fn is_disjoint_from(&self, used: &UsedKeywords) -> bool {
		self.normalized_terms().all(|term| !used.contains(&term))
	}
}

/// Every term issued for one query, across rounds and corrective attempts.
#[derive(Clone, Debug, Default)]
pub struct UsedKeywords {
	terms: HashSet<String>,
}
impl UsedKeywords {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn record(&mut self, set: &KeywordSet) {
		self.terms.extend(set.normalized_terms());
	}

	pub fn record_term(&mut self, term: &str) {
		self.terms.insert(normalize_term(term));
	}

	pub fn contains(&self, term: &str) -> bool {
		self.terms.contains(&normalize_term(term))
	}

	pub fn len(&self) -> usize {
		self.terms.len()
	}

	pub fn is_empty(&self) -> bool {
		self.terms.is_empty()
	}

	/// Normalized terms in lexical order.
	pub fn sorted(&self) -> Vec<&str> {
		let mut terms: Vec<&str> = self.terms.iter().map(String::as_str).collect();

		terms.sort_unstable();

		terms
	}
}

pub fn normalize_term(term: &str) -> String {
	term.trim().to_lowercase()
}

/// Case-insensitive dedup keeping first occurrences, then a length-preferring cut to `max`.
///
/// Order is preserved when nothing has to be dropped. Otherwise terms are ordered by descending
/// character length (stable, so earlier terms win ties) before truncating.
pub fn dedup_prefer_longer(terms: Vec<String>, max: usize) -> Vec<String> {
	let mut seen = HashSet::new();
	let mut out: Vec<String> = Vec::new();

	for term in terms {
		let trimmed = term.trim();

		if trimmed.is_empty() {
			continue;
		}
		if seen.insert(normalize_term(trimmed)) {
			out.push(trimmed.to_string());
		}
	}

	if out.len() > max {
		out.sort_by_key(|term| std::cmp::Reverse(term.chars().count()));
		out.truncate(max);
	}

	out
}
