use sqlx::PgExecutor;

use crate::{
	Error, Result,
	db::Db,
	models::{DocumentRecord, SearchHistoryRecord},
};

pub async fn upsert_document<'e, E>(executor: E, record: &DocumentRecord) -> Result<()>
where
	E: PgExecutor<'e>,
{
	sqlx::query(
		"\
INSERT INTO documents (doc_id, title, abstract, source, metadata)
VALUES ($1, $2, $3, $4, $5)
ON CONFLICT (doc_id) DO UPDATE
SET
	title = EXCLUDED.title,
	abstract = EXCLUDED.abstract,
	source = COALESCE(EXCLUDED.source, documents.source),
	metadata = documents.metadata || EXCLUDED.metadata,
	updated_at = now()",
	)
	.bind(record.doc_id.as_str())
	.bind(record.title.as_str())
	.bind(record.abstract_text.as_str())
	.bind(record.source.as_deref())
	.bind(&record.metadata)
	.execute(executor)
	.await?;

	Ok(())
}

/// Upserts a batch in one transaction so concurrent writers see all or none of it.
pub async fn upsert_documents(db: &Db, records: &[DocumentRecord]) -> Result<u64> {
	let mut tx = db.pool.begin().await?;

	for record in records {
		upsert_document(&mut *tx, record).await?;
	}

	tx.commit().await?;

	Ok(records.len() as u64)
}

pub async fn get_document(db: &Db, doc_id: &str) -> Result<Option<DocumentRecord>> {
	let record = sqlx::query_as::<_, DocumentRecord>(
		"SELECT doc_id, title, abstract, source, metadata FROM documents WHERE doc_id = $1",
	)
	.bind(doc_id)
	.fetch_optional(&db.pool)
	.await?;

	Ok(record)
}

pub async fn insert_search_history<'e, E>(executor: E, record: &SearchHistoryRecord) -> Result<()>
where
	E: PgExecutor<'e>,
{
	if record.search_id.trim().is_empty() {
		return Err(Error::InvalidArgument("search_id must be non-empty.".to_string()));
	}

	sqlx::query(
		"\
INSERT INTO search_history (
	history_id,
	search_id,
	run_id,
	query,
	method,
	keywords,
	rounds,
	result_count,
	elapsed_seconds,
	success,
	error_message,
	created_at
)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
	)
	.bind(record.history_id)
	.bind(record.search_id.as_str())
	.bind(record.run_id)
	.bind(record.query.as_str())
	.bind(record.method.as_str())
	.bind(&record.keywords)
	.bind(record.rounds)
	.bind(record.result_count)
	.bind(record.elapsed_seconds)
	.bind(record.success)
	.bind(record.error_message.as_deref())
	.bind(record.created_at)
	.execute(executor)
	.await?;

	Ok(())
}

pub async fn list_search_history(db: &Db, search_id: &str) -> Result<Vec<SearchHistoryRecord>> {
	let rows = sqlx::query_as::<_, SearchHistoryRecord>(
		"\
SELECT
	history_id,
	search_id,
	run_id,
	query,
	method,
	keywords,
	rounds,
	result_count,
	elapsed_seconds,
	success,
	error_message,
	created_at
FROM search_history
WHERE search_id = $1
ORDER BY created_at ASC",
	)
	.bind(search_id)
	.fetch_all(&db.pool)
	.await?;

	Ok(rows)
}
