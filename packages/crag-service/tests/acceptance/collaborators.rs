use std::{collections::HashSet, sync::Arc};

use super::{
	FakeBackend, FakeJudge, FixedVectorIndex, RecordingStore, collaborators, corpus, doc, pipeline,
	test_config,
};
use crag_config::Postgres;
use crag_domain::keyword::KeywordOrigin;
use crag_service::{SearchMethod, store};
use crag_storage::{db::Db, queries};
use crag_testkit::TestDatabase;

const NO_JUDGE: &str = "[keywords]\nllm_enabled = false\n\n[quality]\nenabled = false\n";

#[tokio::test]
async fn accepted_documents_and_history_are_persisted() {
	let corpus = corpus();
	let backend = Arc::new(FakeBackend::default().hits("graph", corpus[..2].to_vec()));
	let judge = Arc::new(FakeJudge::default());
	let store = Arc::new(RecordingStore::default());
	let output = pipeline(
		test_config(NO_JUDGE),
		collaborators(&backend, &judge).with_store(store.clone()),
	)
	.retrieve_and_rank("graph embeddings", 3)
	.await;
	let records = store.records.lock().expect("Store poisoned.");
	let docs = store.docs.lock().expect("Store poisoned.");
	let doc_ids: HashSet<&str> = docs.iter().map(|doc| doc.id.as_str()).collect();

	assert_eq!(records.len(), 1);
	assert_eq!(records[0].query, "graph embeddings");
	assert_eq!(records[0].method, "keyword");
	assert_eq!(records[0].run_id, output.run_id);
	assert_eq!(records[0].result_count, 2);
	assert!(records[0].success);
	assert_eq!(doc_ids, HashSet::from(["P1", "P2"]));
	assert_eq!(docs.len(), 2);
}

#[tokio::test]
async fn store_failures_do_not_reach_the_caller() {
	let backend = Arc::new(FakeBackend::default().hits("graph", corpus()[..1].to_vec()));
	let judge = Arc::new(FakeJudge::default());
	let store = Arc::new(RecordingStore { fail: true, ..Default::default() });
	let output = pipeline(
		test_config(NO_JUDGE),
		collaborators(&backend, &judge).with_store(store.clone()),
	)
	.retrieve_and_rank("graph embeddings", 2)
	.await;

	assert_eq!(output.results.len(), 2);
	assert!(store.records.lock().expect("Store poisoned.").is_empty());
}

#[tokio::test]
async fn hybrid_puts_vector_hits_first() {
	let corpus = corpus();
	let cfg = test_config(&format!("{NO_JUDGE}\n[search]\nmethod = \"hybrid\"\n"));
	let backend = Arc::new(FakeBackend::default().hits("graph", corpus[..2].to_vec()));
	let judge = Arc::new(FakeJudge::default());
	let index = Arc::new(FixedVectorIndex::new(vec![
		(
			doc(
				"V1",
				"Knowledge graph completion benchmarks",
				"Link prediction models are compared on curated triples.",
			),
			0.9,
		),
		(corpus[7].clone(), 0.1),
	]));
	let pipeline = pipeline(cfg, collaborators(&backend, &judge).with_vector(index.clone()));
	let output = pipeline.retrieve_and_rank("graph embeddings", 3).await;
	let ids: HashSet<&str> =
		output.results.iter().map(|result| result.document.id.as_str()).collect();

	assert_eq!(pipeline.method(), SearchMethod::Hybrid);
	assert_eq!(ids, HashSet::from(["V1", "P1", "P2"]));
	assert_eq!(output.placeholders, 0);
	assert_eq!(*index.upserted.lock().expect("Index poisoned."), vec!["P1", "P2"]);
	assert_eq!(
		*index.queries.lock().expect("Index poisoned."),
		vec![("graph embeddings".to_string(), 1)]
	);
}

#[tokio::test]
async fn judge_keywords_drive_the_first_round() {
	let backend = Arc::new(FakeBackend::default());
	let judge = Arc::new(FakeJudge::default().keywords("citation graphs\nlink prediction"));
	let output =
		pipeline(test_config("[quality]\nenabled = false\n"), collaborators(&backend, &judge))
			.retrieve_and_rank("How are links predicted in citation graphs?", 1)
			.await;

	assert_eq!(output.keywords.origin, KeywordOrigin::Llm);
	assert_eq!(output.keywords.terms, vec!["citation graphs", "link prediction"]);
	assert_eq!(backend.calls()[..2], ["citation graphs", "link prediction"]);
}

#[tokio::test]
async fn primary_language_queries_use_morphology() {
	let corpus = corpus();
	let backend = Arc::new(FakeBackend::default().hits("트랜스포머", corpus[3..4].to_vec()));
	let judge = Arc::new(FakeJudge::default());
	let output = pipeline(test_config(NO_JUDGE), collaborators(&backend, &judge))
		.retrieve_and_rank("트랜스포머 모델의 원리는 무엇인가요?", 1)
		.await;

	assert_eq!(output.keywords.origin, KeywordOrigin::Primary);
	assert!(output.keywords.terms.contains(&"트랜스포머".to_string()));
	assert_eq!(output.results[0].document.id, "P4");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set CRAG_PG_DSN to run."]
async fn postgres_store_keeps_documents_and_history() {
	let Some(base_dsn) = crag_testkit::env_dsn() else {
		eprintln!("Skipping postgres_store_keeps_documents_and_history; set CRAG_PG_DSN to run.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let db = Db::connect(&Postgres { dsn: test_db.dsn().to_string(), pool_max_conns: 2 })
		.await
		.expect("Failed to connect to Postgres.");

	db.ensure_schema().await.expect("Failed to ensure schema.");

	let db = Arc::new(db);
	let backend = Arc::new(FakeBackend::default().hits("graph", corpus()[..2].to_vec()));
	let judge = Arc::new(FakeJudge::default());
	let cfg = test_config(NO_JUDGE);
	let pipeline = pipeline(cfg, collaborators(&backend, &judge).with_store(db.clone()));

	pipeline.retrieve_and_rank("graph embeddings", 2).await;

	let output = pipeline.retrieve_and_rank("graph embeddings", 2).await;
	let search_id = store::search_id(&output.query, "keyword", &output.keywords.terms);
	let history =
		queries::list_search_history(&db, &search_id).await.expect("Failed to list history.");
	let stored = queries::get_document(&db, "P1")
		.await
		.expect("Failed to load document.")
		.expect("Document should exist.");

	assert_eq!(history.len(), 2);
	assert!(history.iter().all(|row| row.success && row.result_count == 2));
	assert_eq!(stored.title, "Graph embeddings for citation networks");

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
