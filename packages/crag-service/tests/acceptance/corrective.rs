use std::{collections::HashSet, sync::Arc};

use super::{FakeBackend, FakeJudge, SUGGEST_MARKER, collaborators, corpus, pipeline, test_config};
use crag_domain::keyword;

#[tokio::test]
async fn every_corrective_attempt_uses_unseen_keywords() {
	let cfg = test_config(
		"[keywords]\nllm_enabled = false\n\n[corrective]\nenabled = true\nmax_attempts = 2\n",
	);
	let backend = Arc::new(FakeBackend::default().hits("security", vec![corpus()[0].clone()]));
	let judge = Arc::new(
		FakeJudge::default()
			.suggestion("security\ndeep learning")
			.suggestion("deep learning\nrobustness"),
	);
	let output = pipeline(cfg, collaborators(&backend, &judge))
		.retrieve_and_rank("security of neural networks", 1)
		.await;

	assert_eq!(judge.prompts_containing(SUGGEST_MARKER), 2);
	assert_eq!(output.corrective_attempts, 2);
	assert_eq!(output.corrective_keywords.len(), 2);
	assert!(!output.corrected);
	assert_eq!(output.results[0].document.id, "P1");

	let mut seen: HashSet<String> = output
		.rounds
		.iter()
		.flat_map(|round| round.keywords.iter())
		.chain(output.keywords.terms.iter())
		.map(|term| keyword::normalize_term(term))
		.collect();

	for set in &output.corrective_keywords {
		assert!(!set.is_empty());

		for term in set.normalized_terms() {
			assert!(seen.insert(term.clone()), "{term} was reused");
		}
	}

	assert!(output.corrective_keywords[0].terms.contains(&"deep learning".to_string()));
	assert_eq!(output.corrective_keywords[1].terms, vec!["robustness"]);
}

#[tokio::test]
async fn passing_first_assessment_skips_correction() {
	let cfg = test_config("[keywords]\nllm_enabled = false\n");
	let backend = Arc::new(FakeBackend::default().hits("security", vec![corpus()[0].clone()]));
	let judge = Arc::new(FakeJudge::default().score("composite: 8.5\nissues: none"));
	let output = pipeline(cfg, collaborators(&backend, &judge))
		.retrieve_and_rank("security of neural networks", 1)
		.await;

	assert_eq!(judge.prompts_containing(SUGGEST_MARKER), 0);
	assert_eq!(output.corrective_attempts, 0);
	assert_eq!(output.final_quality_score, Some(8.5));
}

#[tokio::test]
async fn disabled_correction_reports_the_low_score() {
	let cfg = test_config("[keywords]\nllm_enabled = false\n\n[corrective]\nenabled = false\n");
	let backend = Arc::new(FakeBackend::default().hits("security", vec![corpus()[0].clone()]));
	let judge = Arc::new(FakeJudge::default());
	let output = pipeline(cfg, collaborators(&backend, &judge))
		.retrieve_and_rank("security of neural networks", 1)
		.await;

	assert_eq!(output.corrective_attempts, 0);
	assert_eq!(output.final_quality_score, Some(5.0));
	assert_eq!(output.quality_issues.as_deref(), Some("evaluation error"));
}
