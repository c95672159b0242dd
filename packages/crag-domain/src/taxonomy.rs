use std::collections::BTreeSet;

use crate::{lexicon, similarity, terms};

const UNCLASSIFIED_CONSISTENCY: f32 = 0.5;

/// Every taxonomy domain with at least one keyword present, keyed by name.
pub fn matched_domains(text: &str) -> BTreeSet<&'static str> {
	let tokens: BTreeSet<String> = terms::word_tokens(text).into_iter().collect();

	lexicon::DOMAINS
		.iter()
		.filter(|(_, keywords)| keywords.iter().any(|keyword| tokens.contains(*keyword)))
		.map(|(name, _)| *name)
		.collect()
}

/// The domain with the most keyword hits. Ties go to the domain listed first.
pub fn classify(text: &str) -> Option<&'static str> {
	let tokens = terms::word_tokens(text);
	let mut best: Option<(&'static str, usize)> = None;

	for &(name, keywords) in lexicon::DOMAINS {
		let hits = tokens.iter().filter(|token| keywords.contains(&token.as_str())).count();

		if hits == 0 {
			continue;
		}
		if best.map(|(_, best_hits)| hits > best_hits).unwrap_or(true) {
			best = Some((name, hits));
		}
	}

	best.map(|(name, _)| name)
}

/// 1.0 on equal primary domains, 0.5 when either side is unclassified, otherwise the overlap
/// of all matched domains.
pub fn domain_consistency(query: &str, text: &str) -> f32 {
	let (Some(query_domain), Some(text_domain)) = (classify(query), classify(text)) else {
		return UNCLASSIFIED_CONSISTENCY;
	};

	if query_domain == text_domain {
		return 1.0;
	}

	similarity::jaccard(&matched_domains(query), &matched_domains(text))
}
