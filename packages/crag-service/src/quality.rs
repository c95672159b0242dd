use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use unicode_segmentation::UnicodeSegmentation;

use crate::Judge;
use crag_config::{Config, Quality};
use crag_domain::document::Document;
use crag_providers::BackoffPolicy;

pub const NEUTRAL_SCORE: f32 = 5.0;
pub const MAX_SCORE: f32 = 10.0;
pub const ISSUE_NO_RESULTS: &str = "no results";
pub const ISSUE_EVALUATION_ERROR: &str = "evaluation error";

static COMPOSITE_RE: LazyLock<Regex> =
	LazyLock::new(|| score_pattern("composite").expect("Composite pattern must compile."));
static RELEVANCE_RE: LazyLock<Regex> =
	LazyLock::new(|| score_pattern("relevance").expect("Relevance pattern must compile."));
static QUALITY_RE: LazyLock<Regex> =
	LazyLock::new(|| score_pattern("quality").expect("Quality pattern must compile."));
static SUFFICIENCY_RE: LazyLock<Regex> =
	LazyLock::new(|| score_pattern("sufficiency").expect("Sufficiency pattern must compile."));
static ISSUES_RE: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"(?im)^[\s*\-]*issues?[\s*]*[:：]\s*(.+?)\s*$")
		.expect("Issues pattern must compile.")
});

/// A judged result set. `composite` is on a 0-10 scale and is always present.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct QualityAssessment {
	pub relevance: Option<f32>,
	pub quality: Option<f32>,
	pub sufficiency: Option<f32>,
	pub composite: f32,
	pub issues: String,
}
impl QualityAssessment {
	pub fn no_results() -> Self {
		Self::bare(0.0, ISSUE_NO_RESULTS)
	}

	pub fn neutral() -> Self {
		Self::bare(NEUTRAL_SCORE, ISSUE_EVALUATION_ERROR)
	}

	fn bare(composite: f32, issues: &str) -> Self {
		Self {
			relevance: None,
			quality: None,
			sufficiency: None,
			composite,
			issues: issues.to_string(),
		}
	}

	/// `threshold` is a fraction of the 0-10 scale.
	pub fn passes(&self, threshold: f32) -> bool {
		self.composite >= threshold * MAX_SCORE
	}
}

pub struct QualityEvaluator<'a> {
	cfg: &'a Config,
	judge: &'a dyn Judge,
	backoff: &'a BackoffPolicy,
}
impl<'a> QualityEvaluator<'a> {
	pub fn new(cfg: &'a Config, judge: &'a dyn Judge, backoff: &'a BackoffPolicy) -> Self {
		Self { cfg, judge, backoff }
	}

	/// Never fails: no documents score 0.0, an unusable judge reply scores 5.0.
	pub async fn evaluate(&self, query: &str, docs: &[Document]) -> QualityAssessment {
		if docs.is_empty() {
			return QualityAssessment::no_results();
		}

		let prompt = build_quality_prompt(query, docs, &self.cfg.quality);
		let assessment = match crate::ask_judge(
			self.judge,
			&self.cfg.providers.judge,
			self.backoff,
			"quality",
			&prompt,
		)
		.await
		{
			Ok(reply) => parse_assessment(&reply).unwrap_or_else(|| {
				tracing::warn!(
					reply_chars = reply.chars().count(),
					"Quality reply had no composite score."
				);

				QualityAssessment::neutral()
			}),
			Err(err) => {
				tracing::warn!(error = %err, "Quality evaluation failed.");

				QualityAssessment::neutral()
			},
		};

		tracing::info!(
			docs = docs.len(),
			composite = assessment.composite,
			issues = %assessment.issues,
			"Result set evaluated."
		);

		assessment
	}
}

pub fn build_quality_prompt(query: &str, docs: &[Document], cfg: &Quality) -> String {
	let mut sample = String::new();

	for (idx, doc) in docs.iter().take(cfg.sample_docs as usize).enumerate() {
		sample.push_str(&format!(
			"{}. {}\n   {}\n",
			idx + 1,
			doc.title.trim(),
			truncate_graphemes(doc.abstract_text.trim(), cfg.abstract_chars as usize)
		));
	}

	format!(
		"Evaluate the search results for the question below.\n\n\
Question: {query}\n\n\
Results ({total} documents, first {shown} shown):\n{sample}\n\
Score each criterion from 0 to 10 and answer using exactly these lines:\n\
relevance: <score>\n\
quality: <score>\n\
sufficiency: <score>\n\
composite: <score>\n\
issues: <one sentence describing what is missing or wrong>",
		total = docs.len(),
		shown = docs.len().min(cfg.sample_docs as usize),
	)
}

pub fn parse_assessment(reply: &str) -> Option<QualityAssessment> {
	let composite = capture_score(&COMPOSITE_RE, reply)?;
	let issues = ISSUES_RE
		.captures(reply)
		.and_then(|caps| caps.get(1))
		.map(|m| m.as_str().to_string())
		.unwrap_or_default();

	Some(QualityAssessment {
		relevance: capture_score(&RELEVANCE_RE, reply),
		quality: capture_score(&QUALITY_RE, reply),
		sufficiency: capture_score(&SUFFICIENCY_RE, reply),
		composite,
		issues,
	})
}

/// `label`, any decoration up to a `:`, `：` or `=` separator, then the score. Digits in the
/// decoration, such as a `(0-10)` scale note, are never read as the score. A trailing `/10` is
/// dropped.
fn score_pattern(label: &str) -> Result<Regex, regex::Error> {
	Regex::new(&format!(
		r"(?i){label}[^:：=\n]{{0,40}}[:：=][\s*_]*([0-9]+(?:\.[0-9]+)?)(?:\s*/\s*10)?"
	))
}

fn capture_score(re: &Regex, reply: &str) -> Option<f32> {
	let raw = re.captures(reply)?.get(1)?.as_str();
	let value: f32 = raw.parse().ok()?;

	value.is_finite().then(|| value.clamp(0.0, MAX_SCORE))
}

fn truncate_graphemes(text: &str, max: usize) -> String {
	let mut graphemes = text.graphemes(true);
	let head: String = graphemes.by_ref().take(max).collect();

	if graphemes.next().is_some() { format!("{head}...") } else { head }
}
