use std::{path::PathBuf, time::Duration};

use serde::{Deserialize, Serialize};

use crate::util::{format_secret, format_secret_option, is_uuid};

// The default config lookup path is `{config_dir}/bindplane-source/config.json5`.
const PROJECT_QUALIFIER: &str = "com";
const PROJECT_ORG: &str = "bluemedora";
const PROJECT_NAME: &str = "bindplane-source";
const DEFAULT_CONFIG_FILE_NAME: &str = "config.json5";

pub const API_KEY_ENV: &str = "BINDPLANE_API_KEY";
pub const DEFAULT_BASE_URL: &str =
	"https://public-api.bindplane.bluemedora.com/v1";

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;
const DEFAULT_RETRY_INTERVAL_SECS: u64 = 5;
const DEFAULT_CREATE_TIMEOUT_SECS: u64 = 600;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
	#[error("API key is not set")]
	MissingApiKey,

	#[error("API key is not a valid uuid")]
	InvalidApiKey,

	#[error("base url {0:?} can not hold API paths")]
	InvalidBaseUrl(String),

	#[error("poll interval must be greater than zero")]
	ZeroPollInterval,
}

/// Check that an API key is present and UUID-shaped.
/// Only the shape is checked, not whether the remote side accepts it.
pub fn check_api_key(api_key: &str) -> Result<(), ConfigError> {
	if api_key.is_empty() {
		return Err(ConfigError::MissingApiKey);
	}

	if !is_uuid(api_key) {
		return Err(ConfigError::InvalidApiKey);
	}

	Ok(())
}

/// Which watcher failures make the creation loop resubmit.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum RetryOn {
	/// Resubmit on every watcher error.
	#[default]
	AnyError,

	/// Resubmit only when the remote side failed its connection test,
	/// any other failure is returned right away.
	ConnectionTestFailed,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct UserPollConfig {
	pub interval_secs: Option<u64>,
	pub retry_interval_secs: Option<u64>,

	/// Bounds a single job watch. Unbounded if unset.
	pub watch_timeout_secs: Option<u64>,

	pub retry_on: Option<RetryOn>,
	pub create_timeout_secs: Option<u64>,
}

#[derive(Serialize, Deserialize, Clone, derive_more::Debug, Default)]
pub struct UserConfig {
	/// Falls back to the [`API_KEY_ENV`] environment variable.
	#[debug("{}", format_secret_option(api_key))]
	pub api_key: Option<String>,

	/// An optional API base URL, otherwise [`DEFAULT_BASE_URL`].
	pub base_url: Option<String>,

	pub request_timeout_secs: Option<u64>,
	pub poll: Option<UserPollConfig>,
}

impl UserConfig {
	pub fn from_json5(source: &str) -> Result<Self, json5::Error> {
		json5::from_str(source)
	}
}

/// Timing and retry policy of the job watcher and the creation loop.
#[derive(Clone, Debug, PartialEq)]
pub struct PollConfig {
	/// Delay between two job fetches while the job is pending.
	pub poll_interval: Duration,

	/// Delay before resubmitting a failed creation.
	pub retry_interval: Duration,

	/// If set, a single job watch gives up after this long.
	pub watch_timeout: Option<Duration>,

	pub retry_on: RetryOn,

	/// Overall creation deadline used when the caller has none.
	pub create_timeout: Duration,
}

impl Default for PollConfig {
	fn default() -> Self {
		Self {
			poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
			retry_interval: Duration::from_secs(DEFAULT_RETRY_INTERVAL_SECS),
			watch_timeout: None,
			retry_on: RetryOn::default(),
			create_timeout: Duration::from_secs(DEFAULT_CREATE_TIMEOUT_SECS),
		}
	}
}

impl TryFrom<Option<&UserPollConfig>> for PollConfig {
	type Error = ConfigError;

	fn try_from(value: Option<&UserPollConfig>) -> Result<Self, Self::Error> {
		let default = PollConfig::default();

		let Some(value) = value else {
			return Ok(default);
		};

		let poll_interval = value
			.interval_secs
			.map(Duration::from_secs)
			.unwrap_or(default.poll_interval);

		if poll_interval.is_zero() {
			return Err(ConfigError::ZeroPollInterval);
		}

		Ok(Self {
			poll_interval,
			retry_interval: value
				.retry_interval_secs
				.map(Duration::from_secs)
				.unwrap_or(default.retry_interval),
			watch_timeout: value.watch_timeout_secs.map(Duration::from_secs),
			retry_on: value.retry_on.unwrap_or(default.retry_on),
			create_timeout: value
				.create_timeout_secs
				.map(Duration::from_secs)
				.unwrap_or(default.create_timeout),
		})
	}
}

#[derive(Clone, derive_more::Debug)]
pub struct Config {
	#[debug("{}", format_secret(api_key))]
	pub api_key: String,

	pub base_url: String,
	pub request_timeout: Duration,
	pub poll: PollConfig,
}

impl Config {
	/// Resolve the final config. The API key is taken from
	/// the config file first, then from `env_api_key`.
	pub fn new(
		user_config: Option<&UserConfig>,
		env_api_key: Option<String>,
	) -> Result<Self, ConfigError> {
		let api_key = user_config
			.and_then(|c| c.api_key.clone())
			.or(env_api_key)
			.unwrap_or_default();

		check_api_key(&api_key)?;

		let base_url = user_config
			.and_then(|c| c.base_url.clone())
			.unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
			.trim_end_matches('/')
			.to_string();

		let request_timeout = Duration::from_secs(
			user_config
				.and_then(|c| c.request_timeout_secs)
				.unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
		);

		let poll =
			PollConfig::try_from(user_config.and_then(|c| c.poll.as_ref()))?;

		Ok(Self {
			api_key,
			base_url,
			request_timeout,
			poll,
		})
	}
}

/// Platform-specific default config file path, if there is a home directory.
pub fn default_config_path() -> Option<PathBuf> {
	directories::ProjectDirs::from(PROJECT_QUALIFIER, PROJECT_ORG, PROJECT_NAME)
		.map(|dirs| dirs.config_dir().join(DEFAULT_CONFIG_FILE_NAME))
}
