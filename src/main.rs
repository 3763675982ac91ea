use std::{path::PathBuf, time::Duration};

use bindplane_source::{
	Client as _, Config, HttpClient, SourceConfigCreate, UserConfig,
	config::{API_KEY_ENV, default_config_path},
	job::{classify, watch_job},
	source::{create_source, delete_source, read_source},
	util::format_secret_option,
};
use clap::Parser as _;
use eyre::WrapErr as _;

mod logger;

#[derive(clap::Parser, derive_more::Debug)]
#[command(version, about, long_about = None)]
struct Args {
	/// Path to configuration file (`.json`, `.json5` or `.jsonc`),
	/// otherwise a platform-specific default, if it exists.
	#[arg(long, short)]
	config: Option<PathBuf>,

	/// API key, overriding both the config file and `BINDPLANE_API_KEY`.
	#[arg(long)]
	#[debug("{}", format_secret_option(api_key))]
	api_key: Option<String>,

	#[command(subcommand)]
	command: Command,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
	/// Create a source from a JSON file and wait until it is created.
	Create {
		/// Path to the source creation request (JSON).
		#[arg(long, short)]
		payload: PathBuf,

		/// Overall creation deadline in seconds.
		#[arg(long, short)]
		timeout: Option<u64>,
	},

	/// Print a source.
	Read { id: String },

	/// Delete a source.
	Delete { id: String },

	/// Print a job and its classified state.
	Job { job_id: String },

	/// Wait for a source creation job and print the created source ID.
	Watch { job_id: String },
}

async fn load_user_config(path: Option<PathBuf>) -> eyre::Result<UserConfig> {
	let path = path.or_else(|| default_config_path().filter(|p| p.exists()));

	let Some(path) = path else {
		return Ok(UserConfig::default());
	};

	log::debug!("Reading config from {}", path.display());

	let config_string = tokio::fs::read_to_string(&path)
		.await
		.wrap_err_with(|| format!("failed to read {}", path.display()))?;

	UserConfig::from_json5(&config_string)
		.wrap_err_with(|| format!("failed to parse {}", path.display()))
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
	let _logger = logger::setup_logger()?;

	let args = Args::parse();
	log::debug!("{:?}", args);

	let mut user_config = load_user_config(args.config).await?;

	if args.api_key.is_some() {
		user_config.api_key = args.api_key;
	}

	let config = Config::new(Some(&user_config), std::env::var(API_KEY_ENV).ok())?;
	log::debug!("{:?}", config);

	let client = HttpClient::new(&config).await?;

	match args.command {
		Command::Create { payload, timeout } => {
			let payload_string = tokio::fs::read_to_string(&payload)
				.await
				.wrap_err_with(|| format!("failed to read {}", payload.display()))?;

			let source: SourceConfigCreate = serde_json::from_str(&payload_string)
				.wrap_err_with(|| format!("failed to parse {}", payload.display()))?;

			let timeout = timeout
				.map(Duration::from_secs)
				.unwrap_or(config.poll.create_timeout);

			let result =
				create_source(&client, &source, timeout, &config.poll).await?;

			println!("{}", serde_json::to_string_pretty(&result)?);
		}

		Command::Read { id } => {
			let source = read_source(&client, &id).await?;
			println!("{}", serde_json::to_string_pretty(&source)?);
		}

		Command::Delete { id } => {
			delete_source(&client, &id).await?;
		}

		Command::Job { job_id } => {
			let job = client.get_job(&job_id).await?;
			log::info!("📋 Job {} is {:?}", job_id, classify(&job));
			println!("{}", serde_json::to_string_pretty(&job)?);
		}

		Command::Watch { job_id } => {
			let source_id = watch_job(&client, &job_id, &config.poll).await?;
			println!("{}", source_id);
		}
	}

	Ok(())
}
