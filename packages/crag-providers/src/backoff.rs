use std::{
	future::Future,
	sync::atomic::{AtomicBool, Ordering},
	time::Duration,
};

use color_eyre::{Result, eyre};

/// Retry budget for one external call: up to `max_attempts` tries with a fixed pause between them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BackoffPolicy {
	pub max_attempts: u32,
	pub delay: Duration,
}
impl BackoffPolicy {
	pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
		Self { max_attempts, delay }
	}

	/// A single attempt and no sleeping.
	pub fn none() -> Self {
		Self::fixed(1, Duration::ZERO)
	}

	pub fn from_judge_config(cfg: &crag_config::LlmProviderConfig) -> Self {
		Self::fixed(cfg.max_attempts, Duration::from_millis(cfg.retry_delay_ms))
	}

	pub async fn retry<T, F, Fut>(&self, label: &str, mut op: F) -> Result<T>
	where
		F: FnMut(u32) -> Fut,
		Fut: Future<Output = Result<T>>,
	{
		let attempts = self.max_attempts.max(1);
		let mut last_err = None;

		for attempt in 1..=attempts {
			match op(attempt).await {
				Ok(value) => return Ok(value),
				Err(err) => {
					tracing::warn!(
						label,
						attempt,
						max_attempts = attempts,
						error = %err,
						"External call failed."
					);

					last_err = Some(err);

					if attempt < attempts {
						sleep_unless_zero(self.delay).await;
					}
				},
			}
		}

		Err(last_err.unwrap_or_else(|| eyre::eyre!("{label} made no attempts.")))
	}
}

/// Fixed spacing between consecutive requests to one backend. The first request is not delayed.
#[derive(Debug)]
pub struct Pacer {
	delay: Duration,
	started: AtomicBool,
}
impl Pacer {
	pub fn new(delay: Duration) -> Self {
		Self { delay, started: AtomicBool::new(false) }
	}

	pub fn none() -> Self {
		Self::new(Duration::ZERO)
	}

	pub async fn pace(&self) {
		if self.started.swap(true, Ordering::SeqCst) {
			sleep_unless_zero(self.delay).await;
		}
	}
}

async fn sleep_unless_zero(delay: Duration) {
	if !delay.is_zero() {
		tokio::time::sleep(delay).await;
	}
}
