use serde::{Deserialize, Serialize};

use crate::util::is_uuid;

/// A remote job record, as returned by `GET /jobs/{id}`.
/// Jobs are never mutated locally, only re-fetched.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Job {
	pub id: String,

	/// Free-text status, compared case-insensitively.
	#[serde(default)]
	pub status: String,

	#[serde(default)]
	pub message: String,

	#[serde(default)]
	pub result: JobResult,
}

/// The untyped `result` payload of a job, sorted by shape.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(from = "serde_json::Value", into = "serde_json::Value")]
pub enum JobResult {
	/// Absent or `null`.
	#[default]
	None,

	/// A plain string, usually an error description.
	Text(String),

	/// An object with a string `id` field,
	/// which is what a source creation job yields.
	Source { id: String },

	/// Anything else.
	Unexpected(serde_json::Value),
}

impl JobResult {
	pub fn as_text(&self) -> Option<&str> {
		match self {
			Self::Text(text) => Some(text),
			_ => None,
		}
	}
}

impl From<serde_json::Value> for JobResult {
	fn from(value: serde_json::Value) -> Self {
		match value {
			serde_json::Value::Null => Self::None,
			serde_json::Value::String(text) => Self::Text(text),
			serde_json::Value::Object(ref map) => match map.get("id") {
				Some(serde_json::Value::String(id)) => Self::Source { id: id.clone() },
				_ => Self::Unexpected(value),
			},
			value => Self::Unexpected(value),
		}
	}
}

impl From<JobResult> for serde_json::Value {
	fn from(value: JobResult) -> Self {
		match value {
			JobResult::None => serde_json::Value::Null,
			JobResult::Text(text) => serde_json::Value::String(text),
			JobResult::Source { id } => serde_json::json!({ "id": id }),
			JobResult::Unexpected(value) => value,
		}
	}
}

impl std::fmt::Display for JobResult {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", serde_json::Value::from(self.clone()))
	}
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SourceCredentials {
	/// ID of a credential stored on the remote side.
	pub credentials: String,
}

/// A request to create a source, submitted as JSON to `POST /sources`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SourceConfigCreate {
	pub name: String,
	pub source_type: String,
	pub collector_id: String,

	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub credentials: Option<SourceCredentials>,

	/// Source-type specific settings, passed through untouched.
	#[serde(default)]
	pub configuration: serde_json::Map<String, serde_json::Value>,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
	#[error("source name must not be empty")]
	EmptyName,

	#[error("source type must not be empty")]
	EmptySourceType,

	#[error("collector id {0:?} is not a uuid")]
	InvalidCollectorId(String),

	#[error("credential id {0:?} is not a uuid")]
	InvalidCredentialId(String),
}

impl SourceConfigCreate {
	pub fn validate(&self) -> Result<(), ValidationError> {
		if self.name.trim().is_empty() {
			return Err(ValidationError::EmptyName);
		}

		if self.source_type.trim().is_empty() {
			return Err(ValidationError::EmptySourceType);
		}

		if !is_uuid(&self.collector_id) {
			return Err(ValidationError::InvalidCollectorId(
				self.collector_id.clone(),
			));
		}

		if let Some(credentials) = &self.credentials {
			if !is_uuid(&credentials.credentials) {
				return Err(ValidationError::InvalidCredentialId(
					credentials.credentials.clone(),
				));
			}
		}

		Ok(())
	}
}

/// A source as read back from `GET /sources/{id}`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct SourceConfigGet {
	pub id: String,

	#[serde(default)]
	pub name: Option<String>,

	/// Kept untyped, its shape differs between API revisions.
	#[serde(default)]
	pub source_type: serde_json::Value,

	#[serde(default)]
	pub collector_id: Option<String>,

	#[serde(default)]
	pub status: Option<String>,

	#[serde(default)]
	pub configuration: serde_json::Value,
}

/// Outcome of a source creation: the created source
/// and the (last) job used to create it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct CreationResult {
	/// Empty until the job is resolved.
	pub source_id: String,
	pub job_id: String,
}
