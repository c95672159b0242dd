use std::{collections::HashSet, sync::Arc};

use super::{FakeBackend, FakeJudge, collaborators, corpus, doc, pipeline, test_config};
use crag_config::Ranking;
use crag_domain::similarity;
use crag_service::{PipelineOutput, rerank::Reranker};

const NO_JUDGE: &str = "[keywords]\nllm_enabled = false\n\n[quality]\nenabled = false\n";

async fn run(target: usize) -> PipelineOutput {
	let corpus = corpus();
	let backend = Arc::new(
		FakeBackend::default()
			.hits("graph", corpus[..3].to_vec())
			.hits("embeddings", corpus[2..5].to_vec()),
	);
	let judge = Arc::new(FakeJudge::default());

	pipeline(test_config(NO_JUDGE), collaborators(&backend, &judge))
		.retrieve_and_rank("graph embeddings", target)
		.await
}

#[tokio::test]
async fn output_size_always_matches_target() {
	for target in [0, 1, 3, 5, 9] {
		let output = run(target).await;

		assert_eq!(output.results.len(), target, "target {target}");
		assert_eq!(output.target_count, target);
		assert_eq!(
			output.results.iter().map(|result| result.rank).collect::<Vec<_>>(),
			(1..=target as u32).collect::<Vec<_>>()
		);
	}
}

#[tokio::test]
async fn output_ids_are_unique() {
	let output = run(9).await;
	let ids: HashSet<&str> =
		output.results.iter().map(|result| result.document.id.as_str()).collect();

	assert_eq!(ids.len(), output.results.len());
	assert_eq!(output.placeholders, 4);
}

#[tokio::test]
async fn scores_never_increase_down_the_list() {
	let output = run(9).await;

	for pair in output.results.windows(2) {
		assert!(pair[0].score >= pair[1].score, "{} < {}", pair[0].score, pair[1].score);
	}
}

#[test]
fn diversity_kept_documents_stay_below_threshold() {
	let ranking = Ranking::default();
	let mut docs = corpus();

	docs.push(doc(
		"P1-COPY",
		"Graph embeddings for citation networks",
		"Node embeddings learned from citation graphs predict missing links.",
	));
	docs.push(doc(
		"P1-NEAR",
		"Graph embeddings for citation networks revisited",
		"Node embeddings learned from citation graphs predict missing links.",
	));

	let ranked = Reranker::new(&ranking).rerank(docs, "graph embeddings citation", 10);
	let kept: Vec<_> = ranked.iter().filter(|result| result.kept_by_diversity).collect();

	assert_eq!(kept.len(), 8);

	for (idx, lhs) in kept.iter().enumerate() {
		for rhs in &kept[idx + 1..] {
			let sim = similarity::tfidf_cosine(&lhs.document.text(), &rhs.document.text());

			assert!(
				sim < ranking.diversity.sim_threshold,
				"{} and {} are too similar ({sim})",
				lhs.document.id,
				rhs.document.id
			);
		}
	}
}

#[test]
fn reranking_a_reranked_list_is_stable() {
	let ranking = Ranking::default();
	let reranker = Reranker::new(&ranking);
	let query = "graph embeddings for protein attention models";
	let first = reranker.rerank(corpus(), query, 6);
	let again = reranker.rerank(
		first.iter().map(|result| result.document.clone()).collect(),
		query,
		first.len(),
	);

	assert_eq!(
		first.iter().map(|result| &result.document.id).collect::<Vec<_>>(),
		again.iter().map(|result| &result.document.id).collect::<Vec<_>>()
	);
	assert_eq!(
		first.iter().map(|result| result.score).collect::<Vec<_>>(),
		again.iter().map(|result| result.score).collect::<Vec<_>>()
	);
}

#[tokio::test]
async fn failed_keywords_are_skipped() {
	let corpus = corpus();
	let backend = Arc::new(
		FakeBackend::default().failing("graph").hits("embeddings", corpus[..2].to_vec()),
	);
	let judge = Arc::new(FakeJudge::default());
	let output = pipeline(test_config(NO_JUDGE), collaborators(&backend, &judge))
		.retrieve_and_rank("graph embeddings", 2)
		.await;

	assert_eq!(output.rounds[0].failed_requests, 1);
	assert_eq!(output.failed_requests, 1);
	assert_eq!(output.placeholders, 0);
	assert!(backend.calls().iter().any(|keyword| keyword == "embeddings"));
}

#[tokio::test]
async fn distinct_candidates_past_the_diversity_window_beat_placeholders() {
	let mut hits: Vec<_> = (0..4)
		.map(|idx| {
			doc(
				&format!("DUP{idx}"),
				"Graph embeddings for citation networks",
				"Node embeddings learned from citation graphs predict missing links.",
			)
		})
		.collect();

	hits.push(doc(
		"DISTINCT",
		"Protein folding with contact maps",
		"Residue contact maps guide tertiary structure prediction for proteins.",
	));

	let backend = Arc::new(FakeBackend::default().hits("graph", hits));
	let judge = Arc::new(FakeJudge::default());
	let output = pipeline(test_config(NO_JUDGE), collaborators(&backend, &judge))
		.retrieve_and_rank("graph embeddings", 2)
		.await;
	let ids: Vec<&str> = output.results.iter().map(|result| result.document.id.as_str()).collect();

	assert_eq!(ids, vec!["DUP0", "DISTINCT"]);
	assert_eq!(output.placeholders, 0);
	assert!(!output.emergency_used);
}
