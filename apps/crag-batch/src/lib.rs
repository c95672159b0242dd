use std::{
	fs,
	path::{Path, PathBuf},
	sync::Arc,
};

use clap::Parser;
use color_eyre::eyre;
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use crag_config::Config;
use crag_service::{Collaborators, PipelineOutput, RetrievalPipeline};
use crag_storage::db::Db;

#[derive(Debug, Parser)]
#[command(
	version = crag_cli::VERSION,
	rename_all = "kebab",
	styles = crag_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	#[arg(long, short = 'd', value_name = "FILE")]
	pub dataset: PathBuf,
	/// Writes the report here instead of stdout.
	#[arg(long, short = 'o', value_name = "FILE")]
	pub output: Option<PathBuf>,
	#[arg(long, value_name = "N")]
	pub target_count: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct Dataset {
	pub name: Option<String>,
	pub questions: Vec<Question>,
}

#[derive(Debug, Deserialize)]
pub struct Question {
	pub id: Option<String>,
	pub query: String,
}

#[derive(Debug, Serialize)]
pub struct BatchReport {
	pub dataset: DatasetInfo,
	pub settings: BatchSettings,
	pub summary: BatchSummary,
	pub results: Vec<BatchEntry>,
}

#[derive(Debug, Serialize)]
pub struct DatasetInfo {
	pub name: String,
	pub question_count: usize,
}

#[derive(Debug, Serialize)]
pub struct BatchSettings {
	pub target_count: usize,
	pub method: String,
}

#[derive(Debug, Default, PartialEq, Serialize)]
pub struct BatchSummary {
	/// Questions answered with at least one real document.
	pub answered: usize,
	pub placeholders: usize,
	pub corrected: usize,
	pub mean_quality_score: Option<f64>,
	pub elapsed_seconds_p50: f64,
	pub elapsed_seconds_p95: f64,
}

#[derive(Debug, Serialize)]
pub struct BatchEntry {
	pub id: String,
	pub query: String,
	pub output: PipelineOutput,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = crag_config::load(&args.config)?;
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

	let dataset = load_dataset(&args.dataset)?;
	let target_count = args.target_count.unwrap_or(config.search.target_count as usize);
	let pipeline = build_pipeline(config).await?;
	let report = run_batch(&pipeline, &dataset, target_count).await;
	let json = serde_json::to_string_pretty(&report)?;

	match &args.output {
		Some(path) => {
			fs::write(path, json)?;

			tracing::info!(path = %path.display(), "Batch report written.");
		},
		None => println!("{json}"),
	}

	Ok(())
}

pub fn load_dataset(path: &Path) -> color_eyre::Result<Dataset> {
	let raw = fs::read_to_string(path)?;
	let dataset: Dataset = serde_json::from_str(&raw)?;

	if dataset.questions.is_empty() {
		return Err(eyre::eyre!("Dataset must include at least one question."));
	}
	if let Some(index) = dataset.questions.iter().position(|q| q.query.trim().is_empty()) {
		return Err(eyre::eyre!("Question {} has an empty query.", question_id(&dataset, index)));
	}

	Ok(dataset)
}

async fn build_pipeline(config: Config) -> color_eyre::Result<RetrievalPipeline> {
	let mut collaborators = Collaborators::default();

	if let Some(postgres) = config.storage.postgres.as_ref() {
		let db = Db::connect(postgres).await?;

		db.ensure_schema().await?;

		collaborators = collaborators.with_store(Arc::new(db));
	}

	Ok(RetrievalPipeline::new(config, collaborators)?)
}

/// Runs every question in order, one at a time.
pub async fn run_batch(
	pipeline: &RetrievalPipeline,
	dataset: &Dataset,
	target_count: usize,
) -> BatchReport {
	let mut results = Vec::with_capacity(dataset.questions.len());

	for (index, question) in dataset.questions.iter().enumerate() {
		let id = question_id(dataset, index);

		tracing::info!(id = %id, index, total = dataset.questions.len(), "Processing question.");

		let output = pipeline.retrieve_and_rank(&question.query, target_count).await;

		results.push(BatchEntry { id, query: question.query.clone(), output });
	}

	BatchReport {
		dataset: DatasetInfo {
			name: dataset.name.clone().unwrap_or_else(|| "batch".to_string()),
			question_count: results.len(),
		},
		settings: BatchSettings {
			target_count,
			method: pipeline.method().as_str().to_string(),
		},
		summary: summarize(&results),
		results,
	}
}

fn question_id(dataset: &Dataset, index: usize) -> String {
	dataset.questions[index]
		.id
		.as_deref()
		.map(str::trim)
		.filter(|id| !id.is_empty())
		.map(str::to_string)
		.unwrap_or_else(|| format!("q{}", index + 1))
}

fn summarize(entries: &[BatchEntry]) -> BatchSummary {
	let scores: Vec<f64> = entries
		.iter()
		.filter_map(|entry| entry.output.final_quality_score)
		.map(f64::from)
		.collect();
	let mut elapsed: Vec<f64> = entries.iter().map(|entry| entry.output.elapsed_seconds).collect();

	elapsed.sort_by(|a, b| a.total_cmp(b));

	BatchSummary {
		answered: entries
			.iter()
			.filter(|entry| entry.output.placeholders < entry.output.target_count)
			.count(),
		placeholders: entries.iter().map(|entry| entry.output.placeholders).sum(),
		corrected: entries.iter().filter(|entry| entry.output.corrected).count(),
		mean_quality_score: (!scores.is_empty())
			.then(|| scores.iter().sum::<f64>() / scores.len() as f64),
		elapsed_seconds_p50: percentile(&elapsed, 0.50),
		elapsed_seconds_p95: percentile(&elapsed, 0.95),
	}
}

fn percentile(values: &[f64], percentile: f64) -> f64 {
	if values.is_empty() {
		return 0.0;
	}

	let clamped = percentile.clamp(0.0, 1.0);
	let pos = clamped * (values.len() as f64 - 1.0);
	let lower = pos.floor() as usize;
	let upper = pos.ceil() as usize;

	if lower == upper {
		values[lower]
	} else {
		let weight = pos - lower as f64;

		values[lower] * (1.0 - weight) + values[upper] * weight
	}
}
