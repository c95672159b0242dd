use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	#[serde(default)]
	pub storage: Storage,
	pub providers: Providers,
	#[serde(default)]
	pub keywords: Keywords,
	#[serde(default)]
	pub search: Search,
	#[serde(default)]
	pub quality: Quality,
	#[serde(default)]
	pub corrective: Corrective,
	#[serde(default)]
	pub ranking: Ranking,
	#[serde(default)]
	pub output: Output,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct Storage {
	/// Optional. Without it, documents and search history are not persisted.
	pub postgres: Option<Postgres>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

#[derive(Debug, Deserialize)]
pub struct Providers {
	pub search: SearchProviderConfig,
	pub judge: LlmProviderConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
	#[serde(default)]
	pub fields: SearchFields,
	/// Optional. `{id}` is replaced with the document id.
	pub source_url_template: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchFields {
	pub results: String,
	pub id: String,
	pub title: String,
	pub abstract_text: String,
}
impl Default for SearchFields {
	fn default() -> Self {
		Self {
			results: "results".to_string(),
			id: "CN".to_string(),
			title: "title".to_string(),
			abstract_text: "abstract".to_string(),
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub temperature: f32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
	#[serde(default = "default_judge_max_attempts")]
	pub max_attempts: u32,
	#[serde(default = "default_judge_retry_delay_ms")]
	pub retry_delay_ms: u64,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Keywords {
	pub max_keywords: u32,
	pub llm_enabled: bool,
	pub llm_max_keywords: u32,
	/// Share of alphabetic characters in the primary script above which a query is treated
	/// as primary-language.
	pub primary_script_ratio: f32,
	/// Secondary-language tokens longer than this are classified as technical.
	pub technical_min_len: u32,
}
impl Default for Keywords {
	fn default() -> Self {
		Self {
			max_keywords: 8,
			llm_enabled: true,
			llm_max_keywords: 5,
			primary_script_ratio: 0.3,
			technical_min_len: 6,
		}
	}
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Search {
	pub method: String,
	pub target_count: u32,
	pub page_size: u32,
	pub max_rounds: u32,
	pub keywords_per_round: u32,
	pub request_delay_ms: u64,
	pub expansion_terms: Vec<String>,
	pub emergency_keywords: Vec<String>,
	pub emergency_page_size: u32,
	pub emergency_token_page_size: u32,
	pub filter: SearchFilter,
	pub hybrid: SearchHybrid,
}
impl Default for Search {
	fn default() -> Self {
		Self {
			method: "keyword".to_string(),
			target_count: 50,
			page_size: 50,
			max_rounds: 3,
			keywords_per_round: 15,
			request_delay_ms: 300,
			expansion_terms: [
				"research",
				"analysis",
				"method",
				"result",
				"system",
				"technology",
				"development",
				"evaluation",
				"management",
				"optimization",
			]
			.into_iter()
			.map(str::to_string)
			.collect(),
			emergency_keywords: [
				"research",
				"analysis",
				"method",
				"system",
				"technology",
				"development",
			]
			.into_iter()
			.map(str::to_string)
			.collect(),
			emergency_page_size: 20,
			emergency_token_page_size: 10,
			filter: SearchFilter::default(),
			hybrid: SearchHybrid::default(),
		}
	}
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SearchFilter {
	pub min_title_chars: u32,
	pub min_abstract_chars: u32,
	/// Titles containing any of these terms are dropped. Empty unless configured.
	pub blocked_title_terms: Vec<String>,
}
impl Default for SearchFilter {
	fn default() -> Self {
		Self { min_title_chars: 10, min_abstract_chars: 20, blocked_title_terms: Vec::new() }
	}
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SearchHybrid {
	pub keyword_weight: f32,
	pub vector_weight: f32,
	pub similarity_threshold: f32,
}
impl Default for SearchHybrid {
	fn default() -> Self {
		Self { keyword_weight: 0.6, vector_weight: 0.4, similarity_threshold: 0.3 }
	}
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Quality {
	pub enabled: bool,
	/// Fraction of the 0-10 composite scale a result set must reach.
	pub threshold: f32,
	pub sample_docs: u32,
	pub abstract_chars: u32,
}
impl Default for Quality {
	fn default() -> Self {
		Self { enabled: true, threshold: 0.7, sample_docs: 3, abstract_chars: 200 }
	}
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Corrective {
	pub enabled: bool,
	pub max_attempts: u32,
	pub max_keywords: u32,
}
impl Default for Corrective {
	fn default() -> Self {
		Self { enabled: true, max_attempts: 2, max_keywords: 8 }
	}
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Ranking {
	pub weights: RankingWeights,
	pub diversity: RankingDiversity,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RankingWeights {
	pub lexical: f32,
	pub keyword: f32,
	pub title: f32,
	pub quality: f32,
	pub domain: f32,
	pub keyword_title_share: f32,
}
impl Default for RankingWeights {
	fn default() -> Self {
		Self {
			lexical: 0.30,
			keyword: 0.25,
			title: 0.20,
			quality: 0.15,
			domain: 0.10,
			keyword_title_share: 0.7,
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RankingDiversity {
	pub enabled: bool,
	pub sim_threshold: f32,
	/// Candidates considered by the filter, as a multiple of top_k.
	pub candidate_window: u32,
}
impl Default for RankingDiversity {
	fn default() -> Self {
		Self { enabled: true, sim_threshold: 0.8, candidate_window: 2 }
	}
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Output {
	pub placeholder_title: String,
	pub placeholder_abstract: String,
	pub placeholder_source: String,
}
impl Default for Output {
	fn default() -> Self {
		Self {
			placeholder_title: "Research Document".to_string(),
			placeholder_abstract: "This document contains relevant research information."
				.to_string(),
			placeholder_source: "unavailable".to_string(),
		}
	}
}

fn default_judge_max_attempts() -> u32 {
	3
}

fn default_judge_retry_delay_ms() -> u64 {
	2_000
}
