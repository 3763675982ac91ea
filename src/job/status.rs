use crate::dto::Job;

const STATUS_COMPLETE: &str = "complete";
const STATUS_FAILED: &str = "failed";

/// Statuses of a job which is still being worked on.
const PENDING_STATUSES: [&str; 3] = [
	"in progress",
	"testing connection to source",
	"queued for completion",
];

/// A failed job carrying this in its message (any case)
/// failed to connect to the monitored system.
const CONNECTION_TEST_FAILED: &str = "test connection failed";

#[derive(Debug, Clone, PartialEq)]
pub enum JobState {
	Pending,
	Complete,
	Failed(JobFailure),
}

impl JobState {
	pub fn is_terminal(&self) -> bool {
		!matches!(self, Self::Pending)
	}
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum JobFailure {
	/// Usually transient: the collector could not reach the source yet.
	#[error("job {job_id} failed to test connection to source: {message}")]
	ConnectionTestFailed { job_id: String, message: String },

	#[error(
		"job {job_id} failed. status: {status} message: {message}{}",
		format_result(.result)
	)]
	Failed {
		job_id: String,
		status: String,
		message: String,
		result: Option<String>,
	},

	#[error(
		"job {job_id} has unrecognized status {status:?}. message: {message}{}",
		format_result(.result)
	)]
	UnrecognizedStatus {
		job_id: String,
		status: String,
		message: String,
		result: Option<String>,
	},
}

impl JobFailure {
	pub fn is_connection_test_failure(&self) -> bool {
		matches!(self, Self::ConnectionTestFailed { .. })
	}

	pub fn job_id(&self) -> &str {
		match self {
			Self::ConnectionTestFailed { job_id, .. }
			| Self::Failed { job_id, .. }
			| Self::UnrecognizedStatus { job_id, .. } => job_id,
		}
	}
}

fn format_result(result: &Option<String>) -> String {
	match result {
		Some(result) => format!(" result: {}", result),
		None => String::new(),
	}
}

/// Classify a job by its status, case-insensitively.
pub fn classify(job: &Job) -> JobState {
	let status = job.status.to_lowercase();

	if status == STATUS_COMPLETE {
		return JobState::Complete;
	}

	if PENDING_STATUSES.contains(&status.as_str()) {
		return JobState::Pending;
	}

	let result = job.result.as_text().map(str::to_string);

	if status == STATUS_FAILED {
		if job.message.to_lowercase().contains(CONNECTION_TEST_FAILED) {
			JobState::Failed(JobFailure::ConnectionTestFailed {
				job_id: job.id.clone(),
				message: job.message.clone(),
			})
		} else {
			JobState::Failed(JobFailure::Failed {
				job_id: job.id.clone(),
				status: job.status.clone(),
				message: job.message.clone(),
				result,
			})
		}
	} else {
		JobState::Failed(JobFailure::UnrecognizedStatus {
			job_id: job.id.clone(),
			status: job.status.clone(),
			message: job.message.clone(),
			result,
		})
	}
}
