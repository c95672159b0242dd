use crag_domain::{keyword, script, terms};

/// One emergency pass: the term list and the page size to request per term.
#[derive(Clone, Debug, PartialEq)]
pub struct EmergencyStage {
	pub terms: Vec<String>,
	pub page_size: u32,
}

/// Generic domain terms first, then the query's own words.
pub fn emergency_stages(cfg: &crag_config::Search, query: &str) -> [EmergencyStage; 2] {
	let generic = keyword::dedup_prefer_longer(cfg.emergency_keywords.clone(), usize::MAX);
	let tokens = terms::query_tokens(&script::normalize_text(query));
	let tokens = keyword::dedup_prefer_longer(tokens, usize::MAX);

	[
		EmergencyStage { terms: generic, page_size: cfg.emergency_page_size },
		EmergencyStage { terms: tokens, page_size: cfg.emergency_token_page_size },
	]
}
