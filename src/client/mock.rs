use std::{
	collections::{HashMap, VecDeque},
	sync::Mutex,
};

use super::{Client, ClientError, DeleteFailure};
use crate::dto::{Job, JobResult, SourceConfigGet};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
	CreateSource(Vec<u8>),
	GetSource(String),
	DeleteSource(String),
	GetJob(String),
}

/// A scripted [`Client`] recording every call made to it.
///
/// `get_job` pops scripted responses in order, then keeps serving the
/// fallback job, if any. The requested job ID is stamped onto every job.
#[derive(Default)]
pub struct MockClient {
	jobs: Mutex<VecDeque<Result<Job, ClientError>>>,
	fallback_job: Option<Job>,
	create_error: Option<String>,
	sources: HashMap<String, SourceConfigGet>,
	delete_failure: Option<(Vec<u8>, String)>,
	calls: Mutex<Vec<Call>>,
}

pub fn job(status: &str, message: &str) -> Job {
	Job {
		id: String::new(),
		status: status.to_string(),
		message: message.to_string(),
		result: JobResult::None,
	}
}

pub fn completed_job(source_id: &str) -> Job {
	Job {
		result: JobResult::Source {
			id: source_id.to_string(),
		},
		..job("Complete", "")
	}
}

impl MockClient {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_jobs(self, jobs: impl IntoIterator<Item = Job>) -> Self {
		self.jobs.lock().unwrap().extend(jobs.into_iter().map(Ok));
		self
	}

	pub fn with_job_error(self, error: ClientError) -> Self {
		self.jobs.lock().unwrap().push_back(Err(error));
		self
	}

	pub fn with_fallback_job(mut self, job: Job) -> Self {
		self.fallback_job = Some(job);
		self
	}

	pub fn with_create_error(mut self, message: &str) -> Self {
		self.create_error = Some(message.to_string());
		self
	}

	pub fn with_source(mut self, source: SourceConfigGet) -> Self {
		self.sources.insert(source.id.clone(), source);
		self
	}

	pub fn with_delete_failure(mut self, body: &[u8], message: &str) -> Self {
		self.delete_failure = Some((body.to_vec(), message.to_string()));
		self
	}

	pub fn calls(&self) -> Vec<Call> {
		self.calls.lock().unwrap().clone()
	}

	pub fn count(&self, filter: impl Fn(&Call) -> bool) -> usize {
		self.calls.lock().unwrap().iter().filter(|c| filter(c)).count()
	}

	pub fn submissions(&self) -> usize {
		self.count(|c| matches!(c, Call::CreateSource(_)))
	}

	pub fn job_fetches(&self) -> usize {
		self.count(|c| matches!(c, Call::GetJob(_)))
	}

	fn record(&self, call: Call) {
		self.calls.lock().unwrap().push(call);
	}
}

#[async_trait::async_trait]
impl Client for MockClient {
	async fn create_source(&self, payload: &[u8]) -> Result<String, ClientError> {
		self.record(Call::CreateSource(payload.to_vec()));

		if let Some(message) = &self.create_error {
			return Err(ClientError::Transport(message.clone()));
		}

		Ok(format!("job-{}", self.submissions()))
	}

	async fn get_source(&self, id: &str) -> Result<SourceConfigGet, ClientError> {
		self.record(Call::GetSource(id.to_string()));

		self.sources.get(id).cloned().ok_or_else(|| ClientError::Http {
			status: 404,
			body: format!("source {} not found", id),
		})
	}

	async fn delete_source(&self, id: &str) -> Result<Vec<u8>, DeleteFailure> {
		self.record(Call::DeleteSource(id.to_string()));

		match &self.delete_failure {
			Some((body, message)) => Err(DeleteFailure {
				body: body.clone(),
				error: ClientError::Transport(message.clone()),
			}),
			None => Ok(b"{}".to_vec()),
		}
	}

	async fn get_job(&self, job_id: &str) -> Result<Job, ClientError> {
		self.record(Call::GetJob(job_id.to_string()));

		let next = self.jobs.lock().unwrap().pop_front();

		let job = match next {
			Some(result) => result?,
			None => self.fallback_job.clone().ok_or_else(|| ClientError::Http {
				status: 404,
				body: format!("job {} not found", job_id),
			})?,
		};

		Ok(Job {
			id: job_id.to_string(),
			..job
		})
	}
}
