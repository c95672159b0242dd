use std::{collections::HashSet, sync::Arc};

use super::{
	EVALUATE_MARKER, FakeBackend, FakeJudge, SUGGEST_MARKER, collaborators, corpus, doc, pipeline,
	test_config,
};
use crag_service::SearchPhase;

const NO_JUDGE: &str = "[keywords]\nllm_enabled = false\n\n[quality]\nenabled = false\n";

#[tokio::test]
async fn empty_backend_still_fills_every_slot() {
	let backend = Arc::new(FakeBackend::default());
	let judge = Arc::new(FakeJudge::default());
	let pipeline = pipeline(test_config(NO_JUDGE), collaborators(&backend, &judge));
	let output = pipeline.retrieve_and_rank("graph embeddings for citation analysis", 5).await;

	assert_eq!(output.results.len(), 5);
	assert_eq!(output.placeholders, 5);
	assert!(output.emergency_used);
	assert_eq!(output.search_phase, SearchPhase::Exhausted);
	assert!(output.results.iter().all(|result| result.placeholder));
	assert!(output.results.iter().all(|result| !result.document.title.trim().is_empty()));
	assert!(output.results.iter().all(|result| !result.document.abstract_text.trim().is_empty()));

	let calls = backend.calls();

	assert!(calls.iter().any(|keyword| keyword == "research"));
	assert!(calls.iter().any(|keyword| keyword == "citation"));
}

#[tokio::test]
async fn corrective_success_returns_the_corrected_set() {
	let cfg = test_config(
		"[keywords]\nllm_enabled = false\n\n[corrective]\nenabled = true\nmax_attempts = 1\n",
	);
	let original = doc(
		"O1",
		"Graph embeddings overview",
		"A broad overview of graph embeddings with little detail.",
	);
	let corpus = corpus();
	let backend = Arc::new(
		FakeBackend::default()
			.hits("graph", vec![original])
			.hits("representation learning", vec![corpus[1].clone(), corpus[2].clone()]),
	);
	let judge = Arc::new(
		FakeJudge::default()
			.score("relevance: 4\ncomposite: 4.0\nissues: too general")
			.suggestion("representation learning")
			.score("composite: 7.0\nissues: none"),
	);
	let output = pipeline(cfg, collaborators(&backend, &judge))
		.retrieve_and_rank("graph embeddings", 2)
		.await;
	let ids: HashSet<&str> =
		output.results.iter().map(|result| result.document.id.as_str()).collect();

	assert_eq!(judge.prompts_containing(SUGGEST_MARKER), 1);
	assert_eq!(judge.prompts_containing(EVALUATE_MARKER), 2);
	assert_eq!(output.corrective_attempts, 1);
	assert!(output.corrected);
	assert_eq!(output.final_quality_score, Some(7.0));
	assert_eq!(ids, HashSet::from(["P2", "P3"]));
}

#[tokio::test]
async fn corrective_failure_keeps_the_original_set() {
	let cfg = test_config(
		"[keywords]\nllm_enabled = false\n\n[corrective]\nenabled = true\nmax_attempts = 1\n",
	);
	let original = doc(
		"O1",
		"Graph embeddings overview",
		"A broad overview of graph embeddings with little detail.",
	);
	let backend = Arc::new(
		FakeBackend::default()
			.hits("graph", vec![original])
			.hits("representation learning", vec![corpus()[1].clone()]),
	);
	let judge = Arc::new(
		FakeJudge::default()
			.score("composite: 4.0\nissues: too general")
			.suggestion("representation learning")
			.score("composite: 5.5\nissues: still off-topic"),
	);
	let output = pipeline(cfg, collaborators(&backend, &judge))
		.retrieve_and_rank("graph embeddings", 1)
		.await;

	assert_eq!(output.corrective_attempts, 1);
	assert!(!output.corrected);
	assert_eq!(output.final_quality_score, Some(4.0));
	assert_eq!(output.quality_issues.as_deref(), Some("too general"));
	assert_eq!(output.results[0].document.id, "O1");
}

#[tokio::test]
async fn question_titled_short_abstract_hits_are_filtered() {
	let bad = doc("BAD", "What is retrieval augmentation", "too short.");
	let good = doc(
		"GOOD",
		"Retrieval augmentation for language models",
		"Retrieved passages ground generated answers in sources.",
	);
	let backend =
		Arc::new(FakeBackend::default().hits("retrieval", vec![bad.clone(), good.clone()]));
	let judge = Arc::new(FakeJudge::default());
	let output = pipeline(test_config(NO_JUDGE), collaborators(&backend, &judge))
		.retrieve_and_rank("retrieval augmentation", 1)
		.await;

	assert_eq!(output.rounds[0].rejected, 1);
	assert_eq!(output.results[0].document.id, "GOOD");
	assert!(output.results.iter().all(|result| result.document.id != "BAD"));
}

#[tokio::test]
async fn identical_ids_from_two_keywords_collapse() {
	let shared = doc(
		"D1",
		"Graph embeddings for citation networks",
		"Node embeddings learned from citation graphs predict missing links.",
	);
	let backend = Arc::new(
		FakeBackend::default()
			.hits("graph", vec![shared.clone()])
			.hits("embeddings", vec![shared.clone()]),
	);
	let judge = Arc::new(FakeJudge::default());
	let output = pipeline(test_config(NO_JUDGE), collaborators(&backend, &judge))
		.retrieve_and_rank("graph embeddings", 1)
		.await;
	let first = &output.rounds[0];

	assert_eq!(first.raw_count, 2);
	assert_eq!(first.unique_count, 1);
	assert_eq!(first.duplicates, 1);
	assert_eq!(output.results[0].document.id, "D1");
	assert_eq!(output.rounds_used, 1);
}
