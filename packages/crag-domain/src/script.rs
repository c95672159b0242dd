use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;
use unicode_script::{Script, UnicodeScript};

/// The script a query must be dominated by to take the morphological (primary) path.
pub const PRIMARY_SCRIPT: Script = Script::Hangul;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryLanguage {
	Primary,
	Secondary,
}

pub fn normalize_text(input: &str) -> String {
	input.nfkc().collect()
}

/// Primary-script characters divided by alphabetic characters. Zero when there are no letters.
pub fn primary_script_ratio(input: &str) -> f32 {
	let mut letters = 0usize;
	let mut primary = 0usize;

	for ch in input.chars() {
		if !ch.is_alphabetic() {
			continue;
		}

		letters += 1;

		if ch.script() == PRIMARY_SCRIPT {
			primary += 1;
		}
	}

	if letters == 0 {
		return 0.0;
	}

	primary as f32 / letters as f32
}

/// Ratios strictly above `threshold` are primary-language.
pub fn detect_language(input: &str, threshold: f32) -> QueryLanguage {
	if primary_script_ratio(&normalize_text(input)) > threshold {
		QueryLanguage::Primary
	} else {
		QueryLanguage::Secondary
	}
}

pub fn is_primary_script_char(ch: char) -> bool {
	ch.script() == PRIMARY_SCRIPT
}

pub fn contains_primary_script(input: &str) -> bool {
	input.chars().any(is_primary_script_char)
}
