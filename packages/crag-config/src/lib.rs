mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Config, Corrective, Keywords, LlmProviderConfig, Output, Postgres, Providers, Quality, Ranking,
	RankingDiversity, RankingWeights, Search, SearchFields, SearchFilter, SearchHybrid,
	SearchProviderConfig, Service, Storage,
};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if cfg.providers.search.api_base.trim().is_empty() {
		return Err(Error::Validation {
			message: "providers.search.api_base must be non-empty.".to_string(),
		});
	}

	let needs_judge = cfg.keywords.llm_enabled || cfg.quality.enabled || cfg.corrective.enabled;

	if needs_judge && cfg.providers.judge.api_key.trim().is_empty() {
		return Err(Error::Validation {
			message: "Provider judge api_key must be non-empty.".to_string(),
		});
	}
	if cfg.providers.judge.max_attempts == 0 {
		return Err(Error::Validation {
			message: "providers.judge.max_attempts must be greater than zero.".to_string(),
		});
	}
	if let Some(postgres) = cfg.storage.postgres.as_ref()
		&& postgres.pool_max_conns == 0
	{
		return Err(Error::Validation {
			message: "storage.postgres.pool_max_conns must be greater than zero.".to_string(),
		});
	}

	validate_keywords(cfg)?;
	validate_search(cfg)?;
	validate_quality(cfg)?;
	validate_ranking(cfg)?;

	Ok(())
}

fn validate_keywords(cfg: &Config) -> Result<()> {
	if cfg.keywords.max_keywords == 0 {
		return Err(Error::Validation {
			message: "keywords.max_keywords must be greater than zero.".to_string(),
		});
	}
	if cfg.keywords.llm_max_keywords == 0 {
		return Err(Error::Validation {
			message: "keywords.llm_max_keywords must be greater than zero.".to_string(),
		});
	}

	require_unit_interval("keywords.primary_script_ratio", cfg.keywords.primary_script_ratio)
}

fn validate_search(cfg: &Config) -> Result<()> {
	let search = &cfg.search;

	if !matches!(search.method.as_str(), "keyword" | "hybrid") {
		return Err(Error::Validation {
			message: "search.method must be one of keyword or hybrid.".to_string(),
		});
	}

	for (label, value) in [
		("search.target_count", search.target_count),
		("search.page_size", search.page_size),
		("search.max_rounds", search.max_rounds),
		("search.keywords_per_round", search.keywords_per_round),
		("search.emergency_page_size", search.emergency_page_size),
		("search.emergency_token_page_size", search.emergency_token_page_size),
		("corrective.max_attempts", cfg.corrective.max_attempts),
		("corrective.max_keywords", cfg.corrective.max_keywords),
	] {
		if value == 0 {
			return Err(Error::Validation {
				message: format!("{label} must be greater than zero."),
			});
		}
	}

	if search.emergency_keywords.iter().all(|keyword| keyword.trim().is_empty()) {
		return Err(Error::Validation {
			message: "search.emergency_keywords must contain at least one keyword.".to_string(),
		});
	}

	require_unit_interval("search.hybrid.keyword_weight", search.hybrid.keyword_weight)?;
	require_unit_interval("search.hybrid.vector_weight", search.hybrid.vector_weight)?;
	require_unit_interval("search.hybrid.similarity_threshold", search.hybrid.similarity_threshold)
}

fn validate_quality(cfg: &Config) -> Result<()> {
	if cfg.quality.sample_docs == 0 {
		return Err(Error::Validation {
			message: "quality.sample_docs must be greater than zero.".to_string(),
		});
	}

	require_unit_interval("quality.threshold", cfg.quality.threshold)
}

fn validate_ranking(cfg: &Config) -> Result<()> {
	let weights = &cfg.ranking.weights;
	let mut total = 0.0_f32;

	for (label, value) in [
		("ranking.weights.lexical", weights.lexical),
		("ranking.weights.keyword", weights.keyword),
		("ranking.weights.title", weights.title),
		("ranking.weights.quality", weights.quality),
		("ranking.weights.domain", weights.domain),
	] {
		if !value.is_finite() {
			return Err(Error::Validation {
				message: format!("{label} must be a finite number."),
			});
		}
		if value < 0.0 {
			return Err(Error::Validation { message: format!("{label} must be zero or greater.") });
		}

		total += value;
	}

	if total <= 0.0 {
		return Err(Error::Validation {
			message: "ranking.weights must not all be zero.".to_string(),
		});
	}

	require_unit_interval("ranking.weights.keyword_title_share", weights.keyword_title_share)?;
	require_unit_interval("ranking.diversity.sim_threshold", cfg.ranking.diversity.sim_threshold)?;

	if cfg.ranking.diversity.candidate_window == 0 {
		return Err(Error::Validation {
			message: "ranking.diversity.candidate_window must be greater than zero.".to_string(),
		});
	}

	Ok(())
}

fn require_unit_interval(label: &str, value: f32) -> Result<()> {
	if !value.is_finite() {
		return Err(Error::Validation { message: format!("{label} must be a finite number.") });
	}
	if !(0.0..=1.0).contains(&value) {
		return Err(Error::Validation {
			message: format!("{label} must be in the range 0.0-1.0."),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	if cfg
		.providers
		.search
		.source_url_template
		.as_deref()
		.map(|template| template.trim().is_empty())
		.unwrap_or(false)
	{
		cfg.providers.search.source_url_template = None;
	}
	if cfg.storage.postgres.as_ref().map(|pg| pg.dsn.trim().is_empty()).unwrap_or(false) {
		cfg.storage.postgres = None;
	}

	cfg.search.emergency_keywords.retain(|keyword| !keyword.trim().is_empty());
	cfg.search.filter.blocked_title_terms = cfg
		.search
		.filter
		.blocked_title_terms
		.iter()
		.map(|term| term.trim().to_lowercase())
		.filter(|term| !term.is_empty())
		.collect();
}
