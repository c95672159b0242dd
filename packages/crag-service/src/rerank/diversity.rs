use crag_domain::{document::Document, similarity};

/// Indices into the candidate list, both in input order. Candidates in neither list were never
/// examined.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DiverseSelection {
	pub kept: Vec<usize>,
	pub rejected: Vec<usize>,
}

/// Greedy near-duplicate suppression over candidates already sorted by score.
///
/// Only the first `window` candidates are considered. A candidate is kept when its highest
/// lexical similarity to every kept document stays below `threshold`; selection stops at `top_k`.
pub fn select_diverse(
	docs: &[&Document],
	top_k: usize,
	window: usize,
	threshold: f32,
) -> DiverseSelection {
	let mut kept: Vec<usize> = Vec::new();
	let mut rejected: Vec<usize> = Vec::new();
	let mut kept_texts: Vec<String> = Vec::new();

	for (idx, doc) in docs.iter().enumerate().take(window) {
		if kept.len() >= top_k {
			break;
		}

		let text = doc.text();
		let nearest = max_similarity(&text, &kept_texts);

		if nearest.map(|sim| sim < threshold).unwrap_or(true) {
			kept.push(idx);
			kept_texts.push(text);
		} else {
			rejected.push(idx);

			tracing::debug!(
				doc_id = %doc.id,
				similarity = ?nearest,
				"Diversity filter dropped document."
			);
		}
	}

	DiverseSelection { kept, rejected }
}

fn max_similarity(text: &str, kept: &[String]) -> Option<f32> {
	kept.iter().map(|other| similarity::tfidf_cosine(text, other)).reduce(f32::max)
}
