use crate::{
	keyword::{self, KeywordOrigin, KeywordSet},
	lexicon,
	morph::MorphAnalyzer,
	script::{self, QueryLanguage},
	terms,
};

const LLM_TERM_MAX_CHARS: usize = 50;
const LLM_TERM_MIN_CHARS: usize = 2;

#[derive(Clone, Copy, Debug)]
pub struct ExtractOptions {
	pub primary_script_ratio: f32,
	pub technical_min_len: usize,
	pub max_keywords: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Extraction {
	pub language: QueryLanguage,
	pub keywords: KeywordSet,
}

/// Rule-based keyword derivation. Never fails; an unusable query yields an empty set.
pub fn extract_keywords(
	query: &str,
	analyzer: &dyn MorphAnalyzer,
	opts: &ExtractOptions,
) -> Extraction {
	let normalized = script::normalize_text(query);
	let language = script::detect_language(&normalized, opts.primary_script_ratio);
	let (mut candidates, origin) = match language {
		QueryLanguage::Primary => (primary_terms(&normalized, analyzer), KeywordOrigin::Primary),
		QueryLanguage::Secondary => (secondary_terms(&normalized, opts), KeywordOrigin::Basic),
	};

	candidates.extend(terms::special_terms(&normalized));

	let terms = keyword::dedup_prefer_longer(candidates, opts.max_keywords);

	Extraction { language, keywords: KeywordSet::new(terms, origin, 0) }
}

fn primary_terms(query: &str, analyzer: &dyn MorphAnalyzer) -> Vec<String> {
	let mut out = analyzer.nouns(query);

	for term in lexicon::TECHNICAL_TERMS {
		if script::contains_primary_script(term) && query.contains(term) {
			out.push((*term).to_string());
		}
	}

	out
}

fn secondary_terms(query: &str, opts: &ExtractOptions) -> Vec<String> {
	let tokens = terms::strip_stop_words(terms::word_tokens(query))
		.into_iter()
		.filter(|token| token.chars().count() > 1 && terms::has_alphabetic(token))
		.collect();

	terms::order_by_class(tokens, opts.technical_min_len)
}

/// Parses one term per line from a judge reply, dropping headings and list decoration.
pub fn parse_llm_keywords(reply: &str, max: usize) -> Vec<String> {
	let mut out = Vec::new();

	for line in reply.lines() {
		if out.len() >= max {
			break;
		}

		let line = line.trim();

		if line.is_empty() || line.starts_with('#') {
			continue;
		}

		let term = clean_llm_line(line);
		let chars = term.chars().count();

		if !(LLM_TERM_MIN_CHARS..=LLM_TERM_MAX_CHARS).contains(&chars) {
			continue;
		}
		if !terms::has_alphabetic(&term) {
			continue;
		}

		out.push(term);
	}

	keyword::dedup_prefer_longer(out, max)
}

fn clean_llm_line(line: &str) -> String {
	let mut rest = line.trim_start_matches(['*', '-', '•', ' ', '\t']);
	let digits = rest.chars().take_while(char::is_ascii_digit).count();

	if digits > 0 {
		let after = &rest[digits..];

		if let Some(stripped) = after.strip_prefix(['.', ')']) {
			rest = stripped;
		}
	}

	rest.replace(['*', '•'], "")
		.trim()
		.trim_matches(|ch: char| matches!(ch, '"' | '\'' | '`'))
		.trim()
		.to_string()
}
