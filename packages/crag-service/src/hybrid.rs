use std::collections::HashSet;

use crate::VectorIndex;
use crag_config::SearchHybrid;
use crag_domain::document::Document;

/// Indexes the keyword documents, then puts semantically similar hits from the index in front of
/// them. Any index failure leaves the keyword documents untouched.
pub async fn supplement(
	index: &dyn VectorIndex,
	cfg: &SearchHybrid,
	query: &str,
	keyword_docs: Vec<Document>,
	target: usize,
) -> Vec<Document> {
	if let Err(err) = index.upsert(&keyword_docs).await {
		tracing::warn!(error = %err, "Vector index upsert failed; using keyword results only.");

		return keyword_docs;
	}

	let k = vector_share(target, cfg.vector_weight);

	if k == 0 {
		return keyword_docs;
	}

	let hits = match index.query(query, k, cfg.similarity_threshold).await {
		Ok(hits) => hits,
		Err(err) => {
			tracing::warn!(error = %err, "Vector query failed; using keyword results only.");

			return keyword_docs;
		},
	};
	let vector_hits = hits.len();
	let mut seen = HashSet::new();
	let mut merged = Vec::with_capacity(hits.len() + keyword_docs.len());

	for doc in hits
		.into_iter()
		.filter(|(_, similarity)| *similarity >= cfg.similarity_threshold)
		.map(|(doc, _)| doc)
		.chain(keyword_docs)
	{
		if seen.insert(doc.id.clone()) {
			merged.push(doc);
		}
	}

	tracing::info!(vector_hits, merged = merged.len(), k, "Hybrid search merged results.");

	merged
}

/// Slots the vector index may contribute for a given target.
pub fn vector_share(target: usize, vector_weight: f32) -> usize {
	(target as f32 * vector_weight).round().max(0.0) as usize
}
