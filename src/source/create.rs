use std::time::Duration;

use crate::{
	client::{Client, ClientError},
	config::{PollConfig, RetryOn},
	dto::{CreationResult, SourceConfigCreate, ValidationError},
	job::{WatchError, watch_job},
};

#[derive(thiserror::Error, Debug)]
pub enum CreateSourceError {
	#[error("not attempting to create source, validation failed")]
	Validation(#[source] ValidationError),

	#[error("not attempting to create source, failed to serialize it")]
	Serialization(#[source] serde_json::Error),

	/// The payload is kept for diagnostics.
	#[error("failed to submit source: {payload}")]
	Submission {
		payload: String,
		#[source]
		source: ClientError,
	},

	/// A watcher failure which is not retried under the current policy.
	#[error("source creation job {job_id} failed")]
	Job {
		job_id: String,
		#[source]
		source: WatchError,
	},

	#[error("timeout exceeded for source creation. job id: {job_id}")]
	TimeoutExceeded {
		job_id: String,
		#[source]
		source: WatchError,
	},
}

impl RetryOn {
	fn should_retry(&self, error: &WatchError) -> bool {
		match self {
			RetryOn::AnyError => true,
			RetryOn::ConnectionTestFailed => error.is_connection_test_failure(),
		}
	}
}

/// Create a source and wait for its creation job to finish.
///
/// A failed job is resubmitted (yielding a new job) as allowed by
/// [`PollConfig::retry_on`], until `timeout` has passed since the first
/// submission. A failed submission itself is never retried.
pub async fn create_source<C: Client + ?Sized>(
	client: &C,
	source: &SourceConfigCreate,
	timeout: Duration,
	config: &PollConfig,
) -> Result<CreationResult, CreateSourceError> {
	source.validate().map_err(CreateSourceError::Validation)?;
	let payload =
		serde_json::to_vec(source).map_err(CreateSourceError::Serialization)?;

	let mut result = CreationResult::default();
	let started_at = tokio::time::Instant::now();

	loop {
		result.job_id = client.create_source(&payload).await.map_err(|e| {
			CreateSourceError::Submission {
				payload: String::from_utf8_lossy(&payload).into_owned(),
				source: e,
			}
		})?;

		log::info!("📤 Submitted source {:?}, job {}", source.name, result.job_id);

		let error = match watch_job(client, &result.job_id, config).await {
			Ok(source_id) => {
				log::info!(
					"🎉 Created source {} ({:?}) with job {}",
					source_id,
					source.name,
					result.job_id
				);

				result.source_id = source_id;
				return Ok(result);
			}

			Err(error) => error,
		};

		if !config.retry_on.should_retry(&error) {
			return Err(CreateSourceError::Job {
				job_id: result.job_id,
				source: error,
			});
		}

		if started_at.elapsed() > timeout {
			return Err(CreateSourceError::TimeoutExceeded {
				job_id: result.job_id,
				source: error,
			});
		}

		log::warn!(
			"🔁 Job {} failed, resubmitting in {:?}: {}",
			result.job_id,
			config.retry_interval,
			error
		);

		tokio::time::sleep(config.retry_interval).await;
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{
		client::mock::{MockClient, completed_job, job},
		dto::SourceCredentials,
		job::JobFailure,
	};

	const SOURCE_ID: &str = "3f1a6a0e-8d9c-4b57-9e3a-1b2c3d4e5f60";

	fn request() -> SourceConfigCreate {
		SourceConfigCreate {
			name: "postgres-prod".to_string(),
			source_type: "postgresql".to_string(),
			collector_id: "8b3c1f2e-5d6a-4e7b-9c0d-1e2f3a4b5c6d".to_string(),
			credentials: Some(SourceCredentials {
				credentials: "0a1b2c3d-4e5f-4a6b-8c7d-9e0f1a2b3c4d".to_string(),
			}),
			configuration: serde_json::Map::new(),
		}
	}

	fn connection_test_failed() -> crate::dto::Job {
		job("Failed", "Test connection failed: password authentication failed")
	}

	#[tokio::test(start_paused = true)]
	async fn invalid_request_makes_no_calls() {
		let client = MockClient::new().with_fallback_job(completed_job(SOURCE_ID));

		let mut source = request();
		source.collector_id = "not-a-collector".to_string();

		let error = create_source(
			&client,
			&source,
			Duration::from_secs(10),
			&PollConfig::default(),
		)
		.await
		.unwrap_err();

		assert!(matches!(
			error,
			CreateSourceError::Validation(ValidationError::InvalidCollectorId(_))
		));
		assert!(client.calls().is_empty());
	}

	#[tokio::test(start_paused = true)]
	async fn creates_on_first_attempt() {
		let client = MockClient::new().with_jobs([
			job("queued for completion", ""),
			job("complete", ""),
			completed_job(SOURCE_ID),
		]);

		let result = create_source(
			&client,
			&request(),
			Duration::from_secs(10),
			&PollConfig::default(),
		)
		.await
		.unwrap();

		assert_eq!(
			result,
			CreationResult {
				source_id: SOURCE_ID.to_string(),
				job_id: "job-1".to_string(),
			}
		);

		assert_eq!(client.submissions(), 1);
	}

	#[tokio::test(start_paused = true)]
	async fn submitted_payload_is_the_request() {
		let client = MockClient::new()
			.with_jobs([job("complete", ""), completed_job(SOURCE_ID)]);

		create_source(
			&client,
			&request(),
			Duration::from_secs(10),
			&PollConfig::default(),
		)
		.await
		.unwrap();

		let crate::client::mock::Call::CreateSource(payload) = &client.calls()[0]
		else {
			panic!("expected a submission first");
		};

		let submitted: SourceConfigCreate = serde_json::from_slice(payload).unwrap();
		assert_eq!(submitted, request());
	}

	#[tokio::test(start_paused = true)]
	async fn retries_until_connection_test_passes() {
		let client = MockClient::new().with_jobs([
			connection_test_failed(),
			job("testing connection to source", ""),
			connection_test_failed(),
			job("complete", ""),
			completed_job(SOURCE_ID),
		]);

		let result = create_source(
			&client,
			&request(),
			Duration::from_secs(60),
			&PollConfig::default(),
		)
		.await
		.unwrap();

		assert_eq!(result.source_id, SOURCE_ID);
		assert_eq!(result.job_id, "job-3");
		assert_eq!(client.submissions(), 3);
	}

	#[tokio::test(start_paused = true)]
	async fn connection_test_failures_time_out() {
		let client = MockClient::new().with_fallback_job(connection_test_failed());

		let started = tokio::time::Instant::now();
		let error = create_source(
			&client,
			&request(),
			Duration::from_secs(10),
			&PollConfig::default(),
		)
		.await
		.unwrap_err();

		// Attempts at 0s, 5s and 10s are within the deadline, the one at 15s is not.
		assert_eq!(client.submissions(), 4);
		assert_eq!(started.elapsed(), Duration::from_secs(15));

		let CreateSourceError::TimeoutExceeded { job_id, source } = &error else {
			panic!("expected a timeout, got {:?}", error);
		};

		assert_eq!(job_id, "job-4");
		assert!(source.is_connection_test_failure());
		assert_eq!(
			error.to_string(),
			"timeout exceeded for source creation. job id: job-4"
		);
	}

	#[tokio::test(start_paused = true)]
	async fn any_error_is_retried_by_default() {
		let client = MockClient::new()
			.with_jobs([job("failed", "collector offline")])
			.with_fallback_job(completed_job(SOURCE_ID));

		let result = create_source(
			&client,
			&request(),
			Duration::from_secs(10),
			&PollConfig::default(),
		)
		.await
		.unwrap();

		assert_eq!(result.job_id, "job-2");
		assert_eq!(client.submissions(), 2);
	}

	#[tokio::test(start_paused = true)]
	async fn fatal_job_failure_is_not_retried_when_configured() {
		let client = MockClient::new()
			.with_jobs([job("failed", "collector offline")])
			.with_fallback_job(completed_job(SOURCE_ID));

		let config = PollConfig {
			retry_on: RetryOn::ConnectionTestFailed,
			..Default::default()
		};

		let error =
			create_source(&client, &request(), Duration::from_secs(10), &config)
				.await
				.unwrap_err();

		assert_eq!(client.submissions(), 1);
		assert!(matches!(
			error,
			CreateSourceError::Job {
				ref job_id,
				source: WatchError::Job(JobFailure::Failed { .. }),
			} if job_id == "job-1"
		));
	}

	#[tokio::test(start_paused = true)]
	async fn unrecognized_status_is_not_retried_when_configured() {
		let client = MockClient::new()
			.with_jobs([job("banana", "ripe")])
			.with_fallback_job(completed_job(SOURCE_ID));

		let config = PollConfig {
			retry_on: RetryOn::ConnectionTestFailed,
			..Default::default()
		};

		let error =
			create_source(&client, &request(), Duration::from_secs(10), &config)
				.await
				.unwrap_err();

		assert_eq!(client.submissions(), 1);
		assert!(matches!(
			error,
			CreateSourceError::Job {
				ref job_id,
				source: WatchError::Job(JobFailure::UnrecognizedStatus { .. }),
			} if job_id == "job-1"
		));
	}

	#[tokio::test(start_paused = true)]
	async fn connection_test_failure_is_retried_when_configured() {
		let client = MockClient::new()
			.with_jobs([connection_test_failed()])
			.with_fallback_job(completed_job(SOURCE_ID));

		let config = PollConfig {
			retry_on: RetryOn::ConnectionTestFailed,
			..Default::default()
		};

		let result =
			create_source(&client, &request(), Duration::from_secs(10), &config)
				.await
				.unwrap();

		assert_eq!(result.job_id, "job-2");
	}

	#[tokio::test(start_paused = true)]
	async fn submission_failure_is_fatal() {
		let client = MockClient::new().with_create_error("connection refused");

		let error = create_source(
			&client,
			&request(),
			Duration::from_secs(10),
			&PollConfig::default(),
		)
		.await
		.unwrap_err();

		assert_eq!(client.submissions(), 1);
		assert_eq!(client.job_fetches(), 0);

		let CreateSourceError::Submission { payload, source } = &error else {
			panic!("expected a submission error, got {:?}", error);
		};

		assert!(payload.contains("postgres-prod"));
		assert!(matches!(source, ClientError::Transport(_)));
	}
}
