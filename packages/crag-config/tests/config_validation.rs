use std::{
	env, fs,
	path::PathBuf,
	sync::atomic::{AtomicU64, Ordering},
	time::{SystemTime, UNIX_EPOCH},
};

use toml::Value;

use crag_config::{Config, Error};

const SAMPLE_CONFIG_TEMPLATE_TOML: &str = include_str!("fixtures/sample_config.template.toml");

fn sample_toml_with(section: &str, key: &str, value: Value) -> String {
	let mut root: Value =
		toml::from_str(SAMPLE_CONFIG_TEMPLATE_TOML).expect("Failed to parse template config.");
	let mut table = root.as_table_mut().expect("Template config must be a table.");

	for part in section.split('.') {
		table = table
			.get_mut(part)
			.and_then(Value::as_table_mut)
			.unwrap_or_else(|| panic!("Template config must include [{section}]."));
	}

	table.insert(key.to_string(), value);

	toml::to_string(&root).expect("Failed to render template config.")
}

fn write_temp_config(payload: String) -> PathBuf {
	static COUNTER: AtomicU64 = AtomicU64::new(0);

	let nanos = SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.expect("System time must be valid.")
		.as_nanos();
	let ordinal = COUNTER.fetch_add(1, Ordering::SeqCst);
	let pid = std::process::id();
	let mut path = env::temp_dir();

	path.push(format!("crag_config_test_{nanos}_{pid}_{ordinal}.toml"));

	fs::write(&path, payload).expect("Failed to write test config.");

	path
}

fn load_payload(payload: String) -> crag_config::Result<Config> {
	let path = write_temp_config(payload);
	let result = crag_config::load(&path);

	fs::remove_file(&path).expect("Failed to remove test config.");

	result
}

fn expect_validation_message(payload: String, expected: &str) {
	let err = load_payload(payload).expect_err("Expected validation error.");
	let message = err.to_string();

	assert!(matches!(err, Error::Validation { .. }), "Unexpected error kind: {err:?}");
	assert!(message.contains(expected), "Unexpected error message: {message}");
}

#[test]
fn sample_config_loads() {
	let cfg = load_payload(SAMPLE_CONFIG_TEMPLATE_TOML.to_string())
		.expect("Sample config should load.");

	assert_eq!(cfg.search.target_count, 50);
	assert_eq!(cfg.providers.search.fields.id, "CN");
	assert!(cfg.storage.postgres.is_some());
}

#[test]
fn omitted_sections_fall_back_to_observed_defaults() {
	let payload = r#"
[service]
http_bind = "127.0.0.1:8080"
log_level = "info"

[providers.search]
provider_id = "scienceon"
api_base    = "https://search.example.com"
api_key     = "k"
path        = "/articles"
timeout_ms  = 1000

[providers.judge]
provider_id = "openai"
api_base    = "https://api.openai.com"
api_key     = "k"
path        = "/v1/chat/completions"
model       = "m"
temperature = 0.0
timeout_ms  = 1000
"#;
	let cfg: Config = toml::from_str(payload).expect("Failed to parse minimal config.");

	crag_config::validate(&cfg).expect("Minimal config should validate.");

	assert_eq!(cfg.keywords.primary_script_ratio, 0.3);
	assert_eq!(cfg.keywords.technical_min_len, 6);
	assert_eq!(cfg.search.max_rounds, 3);
	assert_eq!(cfg.search.keywords_per_round, 15);
	assert_eq!(cfg.quality.threshold, 0.7);
	assert_eq!(cfg.corrective.max_attempts, 2);
	assert_eq!(cfg.ranking.diversity.sim_threshold, 0.8);
	assert_eq!(cfg.providers.judge.max_attempts, 3);
	assert!(cfg.storage.postgres.is_none());
	assert!(cfg.search.filter.blocked_title_terms.is_empty());
}

#[test]
fn search_method_must_be_known() {
	expect_validation_message(
		sample_toml_with("search", "method", Value::String("graph".to_string())),
		"search.method must be one of keyword or hybrid.",
	);
}

#[test]
fn target_count_must_be_positive() {
	expect_validation_message(
		sample_toml_with("search", "target_count", Value::Integer(0)),
		"search.target_count must be greater than zero.",
	);
}

#[test]
fn quality_threshold_must_be_unit_interval() {
	expect_validation_message(
		sample_toml_with("quality", "threshold", Value::Float(7.0)),
		"quality.threshold must be in the range 0.0-1.0.",
	);
}

#[test]
fn diversity_threshold_must_be_unit_interval() {
	expect_validation_message(
		sample_toml_with("ranking.diversity", "sim_threshold", Value::Float(1.5)),
		"ranking.diversity.sim_threshold must be in the range 0.0-1.0.",
	);
}

#[test]
fn ranking_weights_must_be_non_negative() {
	expect_validation_message(
		sample_toml_with("ranking.weights", "lexical", Value::Float(-0.1)),
		"ranking.weights.lexical must be zero or greater.",
	);
}

#[test]
fn ranking_weights_must_not_all_be_zero() {
	let mut payload = SAMPLE_CONFIG_TEMPLATE_TOML.to_string();

	for key in ["lexical", "keyword", "title", "quality", "domain"] {
		let mut root: Value = toml::from_str(&payload).expect("Failed to parse config.");
		let weights = root
			.get_mut("ranking")
			.and_then(|ranking| ranking.get_mut("weights"))
			.and_then(Value::as_table_mut)
			.expect("Template config must include [ranking.weights].");

		weights.insert(key.to_string(), Value::Float(0.0));

		payload = toml::to_string(&root).expect("Failed to render config.");
	}

	expect_validation_message(payload, "ranking.weights must not all be zero.");
}

#[test]
fn emergency_keywords_must_not_be_blank() {
	expect_validation_message(
		sample_toml_with(
			"search",
			"emergency_keywords",
			Value::Array(vec![Value::String("  ".to_string())]),
		),
		"search.emergency_keywords must contain at least one keyword.",
	);
}

#[test]
fn judge_key_required_when_judge_is_used() {
	expect_validation_message(
		sample_toml_with("providers.judge", "api_key", Value::String(" ".to_string())),
		"Provider judge api_key must be non-empty.",
	);
}

#[test]
fn blank_dsn_disables_postgres() {
	let cfg = load_payload(sample_toml_with(
		"storage.postgres",
		"dsn",
		Value::String("   ".to_string()),
	))
	.expect("Config should load.");

	assert!(cfg.storage.postgres.is_none());
}

#[test]
fn blocked_title_terms_are_normalized() {
	let cfg = load_payload(sample_toml_with(
		"search.filter",
		"blocked_title_terms",
		Value::Array(vec![
			Value::String(" Economics ".to_string()),
			Value::String("".to_string()),
		]),
	))
	.expect("Config should load.");

	assert_eq!(cfg.search.filter.blocked_title_terms, vec!["economics".to_string()]);
}

#[test]
fn missing_file_is_a_read_error() {
	let err = crag_config::load(std::path::Path::new("/nonexistent/crag.toml"))
		.expect_err("Expected read error.");

	assert!(matches!(err, Error::ReadConfig { .. }));
}
