use crate::client::{Client, ClientError};

#[derive(thiserror::Error, Debug)]
#[error("failed to delete source {id}: {body}")]
pub struct DeleteSourceError {
	pub id: String,

	/// Raw response body, lossily decoded.
	pub body: String,

	#[source]
	pub source: ClientError,
}

pub async fn delete_source<C: Client + ?Sized>(
	client: &C,
	id: &str,
) -> Result<(), DeleteSourceError> {
	match client.delete_source(id).await {
		Ok(_) => {
			log::info!("🗑️ Deleted source {}", id);
			Ok(())
		}

		Err(failure) => Err(DeleteSourceError {
			id: id.to_string(),
			body: String::from_utf8_lossy(&failure.body).into_owned(),
			source: failure.error,
		}),
	}
}
