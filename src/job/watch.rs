use std::time::Duration;

use super::status::{JobFailure, JobState, classify};
use crate::{
	client::{Client, ClientError},
	config::PollConfig,
	dto::JobResult,
	util::is_uuid,
};

#[derive(thiserror::Error, Debug)]
pub enum WatchError {
	#[error("failed to get job {job_id}")]
	GetJob {
		job_id: String,
		#[source]
		source: ClientError,
	},

	#[error(transparent)]
	Job(#[from] JobFailure),

	/// The job completed, but its result is not a created source.
	#[error("job {job_id} completed with an unexpected result: {result}")]
	UnexpectedResult { job_id: String, result: String },

	#[error("job {job_id} completed with a non-uuid source id {id:?}")]
	InvalidSourceId { job_id: String, id: String },

	#[error("job {job_id} did not finish within {timeout:?}")]
	WatchTimeout { job_id: String, timeout: Duration },
}

impl WatchError {
	pub fn is_connection_test_failure(&self) -> bool {
		matches!(self, Self::Job(failure) if failure.is_connection_test_failure())
	}

	/// Whether the job succeeded but no source ID could be taken from it.
	pub fn is_extraction(&self) -> bool {
		matches!(
			self,
			Self::UnexpectedResult { .. } | Self::InvalidSourceId { .. }
		)
	}
}

/// Poll a source creation job until it finishes,
/// then return the ID of the created source.
///
/// Unless [`PollConfig::watch_timeout`] is set, this never returns
/// while the job stays pending. Fetch errors are not retried.
pub async fn watch_job<C: Client + ?Sized>(
	client: &C,
	job_id: &str,
	config: &PollConfig,
) -> Result<String, WatchError> {
	let poll = poll_job(client, job_id, config.poll_interval);

	match config.watch_timeout {
		Some(timeout) => tokio::time::timeout(timeout, poll).await.map_err(|_| {
			WatchError::WatchTimeout {
				job_id: job_id.to_string(),
				timeout,
			}
		})?,
		None => poll.await,
	}
}

async fn poll_job<C: Client + ?Sized>(
	client: &C,
	job_id: &str,
	interval: Duration,
) -> Result<String, WatchError> {
	loop {
		let job =
			client
				.get_job(job_id)
				.await
				.map_err(|source| WatchError::GetJob {
					job_id: job_id.to_string(),
					source,
				})?;

		match classify(&job) {
			JobState::Pending => {
				log::debug!("⏳ Job {} is {:?}: {}", job_id, job.status, job.message);
				tokio::time::sleep(interval).await;
			}

			JobState::Complete => {
				log::debug!("🏁 Job {} is complete", job_id);
				return get_source_id(client, job_id).await;
			}

			JobState::Failed(failure) => return Err(failure.into()),
		}
	}
}

/// Re-fetch a completed job and take the created source ID from its result.
async fn get_source_id<C: Client + ?Sized>(
	client: &C,
	job_id: &str,
) -> Result<String, WatchError> {
	let job =
		client
			.get_job(job_id)
			.await
			.map_err(|source| WatchError::GetJob {
				job_id: job_id.to_string(),
				source,
			})?;

	match job.result {
		JobResult::Source { id } if is_uuid(&id) => Ok(id),

		JobResult::Source { id } => Err(WatchError::InvalidSourceId {
			job_id: job_id.to_string(),
			id,
		}),

		result => Err(WatchError::UnexpectedResult {
			job_id: job_id.to_string(),
			result: result.to_string(),
		}),
	}
}
