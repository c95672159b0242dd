use axum::{
	Json, Router,
	extract::State,
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::{Deserialize, Serialize};

use crate::state::AppState;
use crag_service::PipelineOutput;

pub const MAX_TARGET_COUNT: usize = 1_000;

#[derive(Debug, Deserialize)]
pub struct RetrieveRequest {
	pub query: String,
	/// Falls back to `search.target_count`.
	pub target_count: Option<usize>,
}

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/retrieve", post(retrieve))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn retrieve(
	State(state): State<AppState>,
	Json(payload): Json<RetrieveRequest>,
) -> Result<Json<PipelineOutput>, ApiError> {
	let query = payload.query.trim();

	if query.is_empty() {
		return Err(json_error(
			StatusCode::BAD_REQUEST,
			"invalid_request",
			"query must be non-empty.",
			Some(vec!["$.query".to_string()]),
		));
	}

	let target_count = payload
		.target_count
		.unwrap_or(state.pipeline.config().search.target_count as usize);

	if target_count > MAX_TARGET_COUNT {
		return Err(json_error(
			StatusCode::BAD_REQUEST,
			"invalid_request",
			format!("target_count must be at most {MAX_TARGET_COUNT}."),
			Some(vec!["$.target_count".to_string()]),
		));
	}

	tracing::debug!(target_count, "Retrieve request accepted.");

	Ok(Json(state.pipeline.retrieve_and_rank(query, target_count).await))
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}
impl ApiError {
	fn new(
		status: StatusCode,
		error_code: impl Into<String>,
		message: impl Into<String>,
		fields: Option<Vec<String>>,
	) -> Self {
		Self { status, error_code: error_code.into(), message: message.into(), fields }
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body =
			ErrorBody { error_code: self.error_code, message: self.message, fields: self.fields };

		(self.status, Json(body)).into_response()
	}
}

pub fn json_error(
	status: StatusCode,
	code: &str,
	message: impl Into<String>,
	fields: Option<Vec<String>>,
) -> ApiError {
	ApiError::new(status, code, message, fields)
}
