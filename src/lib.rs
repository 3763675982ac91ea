//! Create, read and delete BindPlane sources through the job-based API.
//!
//! Creating a source is asynchronous on the remote side: a submission
//! yields a job, which [`job::watch_job`] polls until it finishes and
//! which [`source::create_source`] resubmits when it fails.

pub mod client;
pub mod config;
pub mod dto;
pub mod job;
pub mod source;
pub mod util;

pub use client::{Client, ClientError, HttpClient};
pub use config::{Config, PollConfig, RetryOn, UserConfig};
pub use dto::{CreationResult, Job, JobResult, SourceConfigCreate, SourceConfigGet};
