use crate::{document::Document, lexicon};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoundRejectReason {
	TitleTooShort,
	AbstractTooShort,
	/// Question-shaped titles mark records that indexed a question as the paper title.
	InterrogativeTitle,
	BlockedTitleTerm,
}
impl RoundRejectReason {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::TitleTooShort => "title_too_short",
			Self::AbstractTooShort => "abstract_too_short",
			Self::InterrogativeTitle => "interrogative_title",
			Self::BlockedTitleTerm => "blocked_title_term",
		}
	}
}

/// Per-round acceptance rules for raw search hits.
#[derive(Clone, Debug, Default)]
pub struct RoundFilter {
	pub min_title_chars: usize,
	pub min_abstract_chars: usize,
	/// Lowercased; matched as substrings of the lowercased title.
	pub blocked_title_terms: Vec<String>,
}
impl RoundFilter {
	pub fn check(&self, doc: &Document) -> Result<(), RoundRejectReason> {
		let title = doc.title.trim();
		let abstract_text = doc.abstract_text.trim();

		if title.chars().count() < self.min_title_chars {
			return Err(RoundRejectReason::TitleTooShort);
		}
		if abstract_text.chars().count() < self.min_abstract_chars {
			return Err(RoundRejectReason::AbstractTooShort);
		}
		if is_interrogative_title(title) {
			return Err(RoundRejectReason::InterrogativeTitle);
		}

		let lowered = title.to_lowercase();

		if self.blocked_title_terms.iter().any(|term| lowered.contains(term.as_str())) {
			return Err(RoundRejectReason::BlockedTitleTerm);
		}

		Ok(())
	}

	pub fn accepts(&self, doc: &Document) -> bool {
		self.check(doc).is_ok()
	}
}

/// True when the first word of the title is a question word.
pub fn is_interrogative_title(title: &str) -> bool {
	title
		.split_whitespace()
		.next()
		.map(|word| {
			let word = word.trim_matches(|ch: char| !ch.is_alphanumeric()).to_lowercase();

			lexicon::is_interrogative(&word)
		})
		.unwrap_or(false)
}

/// Structural quality in `0.0..=1.0` from title length, abstract length and title shape.
pub fn document_quality(title: &str, abstract_text: &str) -> f32 {
	let title_len = title.trim().chars().count();
	let abstract_len = abstract_text.trim().chars().count();
	let mut score = 0.0_f32;

	if (10..=200).contains(&title_len) {
		score += 0.3;
	} else if title_len > 200 {
		score += 0.1;
	}

	if (50..=2_000).contains(&abstract_len) {
		score += 0.4;
	} else if abstract_len > 2_000 {
		score += 0.2;
	}

	if !is_interrogative_title(title) {
		score += 0.3;
	}

	score.min(1.0)
}
