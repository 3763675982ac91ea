use std::time::Duration;

use reqwest::{
	Url,
	header::{CONTENT_TYPE, HeaderMap, HeaderValue},
};
use serde::{Deserialize, de::DeserializeOwned};

use super::{Client, ClientError, DeleteFailure};
use crate::{
	config::{Config, ConfigError, check_api_key},
	dto::{Job, SourceConfigGet},
};

const API_KEY_HEADER: &str = "x-bindplane-api-key";
const USER_AGENT: &str = concat!("bindplane-source/", env!("CARGO_PKG_VERSION"));

#[derive(Deserialize, Debug)]
struct CreateSourceResponse {
	job_id: String,
}

impl From<reqwest::Error> for ClientError {
	fn from(error: reqwest::Error) -> Self {
		if error.is_decode() {
			ClientError::Decode(error.to_string())
		} else {
			ClientError::Transport(error.to_string())
		}
	}
}

/// [`Client`] over the BindPlane public HTTP API.
#[derive(Debug, Clone)]
pub struct HttpClient {
	base_url: String,

	/// `base_url` parsed, guaranteed to be able to hold path segments.
	base: Url,

	http_client: reqwest::Client,
}

impl HttpClient {
	/// Build a client and make sure the remote side accepts the API key.
	pub async fn new(config: &Config) -> Result<Self, ClientError> {
		let client =
			Self::unverified(&config.base_url, &config.api_key, config.request_timeout)?;

		client.test_connection().await?;
		log::debug!("🔑 API key accepted by {}", client.base_url);

		Ok(client)
	}

	/// Build a client without talking to the remote side.
	/// Only the shape of `api_key` is checked.
	pub fn unverified(
		base_url: &str,
		api_key: &str,
		timeout: Duration,
	) -> Result<Self, ClientError> {
		check_api_key(api_key)?;

		let mut api_key_value = HeaderValue::from_str(api_key)
			.map_err(|_| ConfigError::InvalidApiKey)?;
		api_key_value.set_sensitive(true);

		let mut headers = HeaderMap::new();
		headers.insert(API_KEY_HEADER, api_key_value);

		let http_client = reqwest::Client::builder()
			.timeout(timeout)
			.user_agent(USER_AGENT)
			.default_headers(headers)
			.build()?;

		let base_url = base_url.trim_end_matches('/').to_string();

		let base = Url::parse(&base_url)
			.ok()
			.filter(|url| !url.cannot_be_a_base())
			.ok_or_else(|| ConfigError::InvalidBaseUrl(base_url.clone()))?;

		Ok(Self {
			base_url,
			base,
			http_client,
		})
	}

	pub fn base_url(&self) -> &str {
		&self.base_url
	}

	/// `{base_url}/{segments...}`, each segment percent-encoded on its own,
	/// so that an ID can never reach outside of its collection.
	fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
		if let Some(segment) =
			segments.iter().find(|s| matches!(**s, "" | "." | ".."))
		{
			return Err(ClientError::InvalidId(segment.to_string()));
		}

		let mut url = self.base.clone();

		url
			.path_segments_mut()
			.map_err(|_| ConfigError::InvalidBaseUrl(self.base_url.clone()))?
			.pop_if_empty()
			.extend(segments);

		Ok(url)
	}

	/// Any authenticated call would do, listing collectors is the cheapest one.
	pub async fn test_connection(&self) -> Result<(), ClientError> {
		let url = self.endpoint(&["collectors"])?;
		log::debug!("GET {}", url);

		let response = self
			.http_client
			.get(url)
			.send()
			.await
			.map_err(|e| ClientError::Connection(e.to_string()))?;

		let status = response.status();

		if status.is_success() {
			Ok(())
		} else {
			let body = response.text().await.unwrap_or_default();

			Err(ClientError::Connection(format!(
				"{} rejected the API key (HTTP {}): {}",
				self.base_url,
				status.as_u16(),
				body
			)))
		}
	}

	async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, ClientError> {
		log::debug!("GET {}", url);
		let response = self.http_client.get(url).send().await?;
		Self::handle_response(response).await
	}

	async fn handle_response<T: DeserializeOwned>(
		response: reqwest::Response,
	) -> Result<T, ClientError> {
		let status = response.status();
		let body = response.text().await?;

		if !status.is_success() {
			return Err(ClientError::Http {
				status: status.as_u16(),
				body,
			});
		}

		serde_json::from_str(&body).map_err(|e| ClientError::Decode(e.to_string()))
	}
}

#[async_trait::async_trait]
impl Client for HttpClient {
	async fn create_source(&self, payload: &[u8]) -> Result<String, ClientError> {
		let url = self.endpoint(&["sources"])?;
		log::debug!("POST {}", url);

		let response = self
			.http_client
			.post(url)
			.header(CONTENT_TYPE, "application/json")
			.body(payload.to_vec())
			.send()
			.await?;

		let response: CreateSourceResponse = Self::handle_response(response).await?;
		Ok(response.job_id)
	}

	async fn get_source(&self, id: &str) -> Result<SourceConfigGet, ClientError> {
		self.get(self.endpoint(&["sources", id])?).await
	}

	async fn delete_source(&self, id: &str) -> Result<Vec<u8>, DeleteFailure> {
		let url = self.endpoint(&["sources", id]).map_err(|e| DeleteFailure {
			body: Vec::new(),
			error: e,
		})?;
		log::debug!("DELETE {}", url);

		let response =
			self
				.http_client
				.delete(url)
				.send()
				.await
				.map_err(|e| DeleteFailure {
					body: Vec::new(),
					error: e.into(),
				})?;

		let status = response.status();

		let body = response
			.bytes()
			.await
			.map_err(|e| DeleteFailure {
				body: Vec::new(),
				error: e.into(),
			})?
			.to_vec();

		if status.is_success() {
			Ok(body)
		} else {
			Err(DeleteFailure {
				error: ClientError::Http {
					status: status.as_u16(),
					body: String::from_utf8_lossy(&body).into_owned(),
				},
				body,
			})
		}
	}

	async fn get_job(&self, job_id: &str) -> Result<Job, ClientError> {
		self.get(self.endpoint(&["jobs", job_id])?).await
	}
}
