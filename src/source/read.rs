use crate::{
	client::{Client, ClientError},
	dto::SourceConfigGet,
};

/// Get a single source. Errors are returned as-is.
pub async fn read_source<C: Client + ?Sized>(
	client: &C,
	id: &str,
) -> Result<SourceConfigGet, ClientError> {
	client.get_source(id).await
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::client::mock::{Call, MockClient};

	const SOURCE_ID: &str = "3f1a6a0e-8d9c-4b57-9e3a-1b2c3d4e5f60";

	#[tokio::test]
	async fn read_existing_source() {
		let client = MockClient::new().with_source(SourceConfigGet {
			id: SOURCE_ID.to_string(),
			name: Some("mysql-prod".to_string()),
			..Default::default()
		});

		let source = read_source(&client, SOURCE_ID).await.unwrap();
		assert_eq!(source.name.as_deref(), Some("mysql-prod"));
	}

	#[tokio::test]
	async fn read_failure_is_not_retried() {
		let client = MockClient::new();

		let error = read_source(&client, SOURCE_ID).await.unwrap_err();

		assert!(matches!(error, ClientError::Http { status: 404, .. }));
		assert_eq!(client.calls(), vec![Call::GetSource(SOURCE_ID.to_string())]);
	}
}
