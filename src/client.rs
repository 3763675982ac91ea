use crate::{
	config::ConfigError,
	dto::{Job, SourceConfigGet},
};

pub mod http;

#[cfg(test)]
pub mod mock;

pub use http::HttpClient;

#[derive(thiserror::Error, Debug)]
pub enum ClientError {
	#[error("invalid client configuration")]
	Config(#[from] ConfigError),

	/// The remote side rejected the credential during the connection test.
	#[error("connection test failed: {0}")]
	Connection(String),

	#[error("HTTP {status}: {body}")]
	Http { status: u16, body: String },

	#[error("transport error: {0}")]
	Transport(String),

	#[error("failed to decode response: {0}")]
	Decode(String),

	/// An ID which would not address a single resource.
	#[error("invalid resource id {0:?}")]
	InvalidId(String),
}

/// A failed `DELETE`, along with whatever body the remote side sent.
#[derive(thiserror::Error, Debug)]
#[error("delete request failed")]
pub struct DeleteFailure {
	pub body: Vec<u8>,

	#[source]
	pub error: ClientError,
}

/// The remote source API. Implementations perform one network call per
/// method and never retry, retrying is up to the callers.
#[async_trait::async_trait]
pub trait Client: Send + Sync {
	/// Submit a source creation payload, returning the ID of the job
	/// which would create it.
	async fn create_source(&self, payload: &[u8]) -> Result<String, ClientError>;

	async fn get_source(&self, id: &str) -> Result<SourceConfigGet, ClientError>;

	/// Returns the raw response body.
	async fn delete_source(&self, id: &str) -> Result<Vec<u8>, DeleteFailure>;

	async fn get_job(&self, job_id: &str) -> Result<Job, ClientError>;
}

#[cfg(test)]
mod tests {
	use std::error::Error as _;

	use super::*;

	#[test]
	fn delete_failure_reports_client_error_once() {
		let failure = DeleteFailure {
			body: b"busy".to_vec(),
			error: ClientError::Transport("connection reset".to_string()),
		};

		assert_eq!(failure.to_string(), "delete request failed");
		assert_eq!(
			failure.source().map(|e| e.to_string()),
			Some("transport error: connection reset".to_string())
		);
	}
}
