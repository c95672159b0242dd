use std::sync::LazyLock;

use regex::Regex;

use crate::lexicon;

static ACRONYM_RE: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"\b[A-Z]{2,}\b").expect("Acronym pattern must compile."));
static HYPHENATED_RE: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"\b\w+(?:-\w+)+\b").expect("Hyphenated pattern must compile."));
static UNDERSCORED_RE: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"\b[^\W_]+_\w+\b").expect("Underscored pattern must compile."));

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TermClass {
	Technical,
	General,
}

/// Lowercased runs of alphanumeric characters.
pub fn word_tokens(text: &str) -> Vec<String> {
	text.split(|ch: char| !ch.is_alphanumeric())
		.filter(|token| !token.is_empty())
		.map(str::to_lowercase)
		.collect()
}

pub fn strip_stop_words(tokens: Vec<String>) -> Vec<String> {
	tokens.into_iter().filter(|token| !lexicon::is_stop_word(token)).collect()
}

/// Technical when longer than `min_len` characters or listed as a curated technical term.
pub fn classify_term(token: &str, min_len: usize) -> TermClass {
	if token.chars().count() > min_len || lexicon::is_technical_term(token) {
		TermClass::Technical
	} else {
		TermClass::General
	}
}

/// Technical terms first, each class keeping its input order.
pub fn order_by_class(tokens: Vec<String>, min_len: usize) -> Vec<String> {
	let (mut technical, general): (Vec<String>, Vec<String>) = tokens
		.into_iter()
		.partition(|token| classify_term(token, min_len) == TermClass::Technical);

	technical.extend(general);

	technical
}

/// Acronyms, hyphenated compounds and underscored identifiers, in that order, original casing.
pub fn special_terms(text: &str) -> Vec<String> {
	let mut out = Vec::new();

	for re in [&*ACRONYM_RE, &*HYPHENATED_RE, &*UNDERSCORED_RE] {
		for found in re.find_iter(text) {
			out.push(found.as_str().to_string());
		}
	}

	out
}

/// Whitespace-split query words with `?` and `.` removed, longer than two characters.
pub fn query_tokens(query: &str) -> Vec<String> {
	query
		.split_whitespace()
		.map(|word| word.replace(['?', '.'], ""))
		.filter(|word| word.chars().count() > 2)
		.collect()
}

/// Stems produced by stripping one common English suffix. Non-ASCII terms have no variants.
pub fn inflection_variants(term: &str) -> Vec<String> {
	if !term.is_ascii() || term.contains(char::is_whitespace) {
		return Vec::new();
	}

	let lower = term.to_ascii_lowercase();
	let mut out = Vec::new();

	if let Some(stem) = lower.strip_suffix("ing")
		&& stem.len() > 2
	{
		out.push(stem.to_string());
	}
	if let Some(stem) = lower.strip_suffix("ed")
		&& stem.len() > 2
	{
		out.push(stem.to_string());
	}
	if let Some(stem) = lower.strip_suffix('s')
		&& !stem.ends_with('s')
		&& stem.len() > 2
	{
		out.push(stem.to_string());
	}

	out
}

/// True when the term carries at least one letter of any script.
pub fn has_alphabetic(term: &str) -> bool {
	term.chars().any(char::is_alphabetic)
}
