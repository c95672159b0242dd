use crate::{lexicon, script};

/// Extracts salient nouns from primary-language text.
pub trait MorphAnalyzer: Send + Sync {
	fn nouns(&self, text: &str) -> Vec<String>;
}

/// Rule-based analyzer: Hangul runs with one trailing particle or copula removed.
#[derive(Clone, Copy, Debug, Default)]
pub struct HangulNounAnalyzer;
impl MorphAnalyzer for HangulNounAnalyzer {
	fn nouns(&self, text: &str) -> Vec<String> {
		let mut out = Vec::new();

		for run in hangul_runs(text) {
			let noun = strip_particle(&run);

			if noun.chars().count() <= 1 || lexicon::is_hangul_stop_noun(noun) {
				continue;
			}

			out.push(noun.to_string());
		}

		out
	}
}

fn hangul_runs(text: &str) -> Vec<String> {
	let mut runs = Vec::new();
	let mut current = String::new();

	for ch in text.chars() {
		if script::is_primary_script_char(ch) && ch.is_alphabetic() {
			current.push(ch);

			continue;
		}
		if !current.is_empty() {
			runs.push(std::mem::take(&mut current));
		}
	}

	if !current.is_empty() {
		runs.push(current);
	}

	runs
}

/// Removes the longest matching particle when at least two characters remain.
fn strip_particle(word: &str) -> &str {
	if lexicon::is_technical_term(word) {
		return word;
	}

	for particle in lexicon::HANGUL_PARTICLES {
		if let Some(stem) = word.strip_suffix(particle)
			&& stem.chars().count() >= 2
		{
			return stem;
		}
	}

	word
}
