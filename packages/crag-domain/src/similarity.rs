use std::collections::{BTreeMap, BTreeSet};

use crate::lexicon;

/// TF-IDF cosine similarity over the two-document corpus `{lhs, rhs}`.
///
/// Features are unigrams and bigrams of lowercased word tokens (two or more word characters,
/// English stop words removed). Idf is smoothed, `ln((1 + n) / (1 + df)) + 1`, and vectors are
/// L2-normalized, so the result is symmetric and lies in `0.0..=1.0`. Either side without
/// features scores 0.0.
pub fn tfidf_cosine(lhs: &str, rhs: &str) -> f32 {
	let lhs_terms = term_counts(lhs);
	let rhs_terms = term_counts(rhs);

	if lhs_terms.is_empty() || rhs_terms.is_empty() {
		return 0.0;
	}

	let vocabulary: BTreeSet<&str> =
		lhs_terms.keys().chain(rhs_terms.keys()).map(String::as_str).collect();
	let mut lhs_vec = Vec::with_capacity(vocabulary.len());
	let mut rhs_vec = Vec::with_capacity(vocabulary.len());

	for term in vocabulary {
		let lhs_tf = lhs_terms.get(term).copied().unwrap_or(0) as f64;
		let rhs_tf = rhs_terms.get(term).copied().unwrap_or(0) as f64;
		let df = (lhs_tf > 0.0) as u32 + (rhs_tf > 0.0) as u32;
		let idf = (3.0 / (1.0 + df as f64)).ln() + 1.0;

		lhs_vec.push(lhs_tf * idf);
		rhs_vec.push(rhs_tf * idf);
	}

	let dot: f64 = lhs_vec.iter().zip(&rhs_vec).map(|(a, b)| a * b).sum();
	let lhs_norm = lhs_vec.iter().map(|v| v * v).sum::<f64>().sqrt();
	let rhs_norm = rhs_vec.iter().map(|v| v * v).sum::<f64>().sqrt();

	if lhs_norm == 0.0 || rhs_norm == 0.0 {
		return 0.0;
	}

	((dot / (lhs_norm * rhs_norm)) as f32).clamp(0.0, 1.0)
}

/// Jaccard overlap of two term sets. Two empty sets score 0.0.
pub fn jaccard<T: Ord>(lhs: &BTreeSet<T>, rhs: &BTreeSet<T>) -> f32 {
	let union = lhs.union(rhs).count();

	if union == 0 {
		return 0.0;
	}

	lhs.intersection(rhs).count() as f32 / union as f32
}

fn term_counts(text: &str) -> BTreeMap<String, u32> {
	let tokens = similarity_tokens(text);
	let mut counts = BTreeMap::new();

	for token in &tokens {
		*counts.entry(token.clone()).or_insert(0) += 1;
	}
	for pair in tokens.windows(2) {
		*counts.entry(format!("{} {}", pair[0], pair[1])).or_insert(0) += 1;
	}

	counts
}

fn similarity_tokens(text: &str) -> Vec<String> {
	text.split(|ch: char| !(ch.is_alphanumeric() || ch == '_'))
		.filter(|token| token.chars().count() >= 2)
		.map(str::to_lowercase)
		.filter(|token| !lexicon::is_similarity_stop_word(token))
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn identical_text_scores_one() {
		let text = "Graph neural networks for molecule property prediction";

		assert!((tfidf_cosine(text, text) - 1.0).abs() < 1e-6);
	}

	#[test]
	fn disjoint_or_empty_text_scores_zero() {
		assert_eq!(tfidf_cosine("protein folding", "stock market volatility"), 0.0);
		assert_eq!(tfidf_cosine("", "anything at all"), 0.0);
		assert_eq!(tfidf_cosine("the of and", "the of and"), 0.0);
	}

	#[test]
	fn similarity_is_symmetric_and_bounded() {
		let a = "Attention mechanisms in transformer language models";
		let b = "Sparse attention for long context transformer models";
		let ab = tfidf_cosine(a, b);

		assert_eq!(ab, tfidf_cosine(b, a));
		assert!(ab > 0.0 && ab < 1.0, "similarity: {ab}");
	}

	#[test]
	fn jaccard_of_sets() {
		let lhs: BTreeSet<&str> = ["a", "b", "c"].into_iter().collect();
		let rhs: BTreeSet<&str> = ["b", "c", "d"].into_iter().collect();

		assert_eq!(jaccard(&lhs, &rhs), 0.5);
		assert_eq!(jaccard::<&str>(&BTreeSet::new(), &BTreeSet::new()), 0.0);
	}
}
