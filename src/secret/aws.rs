//! AWS Secrets Manager [`SecretStore`] backend.

// crates.io
use aws_config::{BehaviorVersion, Region, timeout::TimeoutConfig};
use aws_sdk_secretsmanager::{Client as SecretsManagerClient, error::DisplayErrorContext};
// self
use crate::{
	_prelude::*,
	auth::Credential,
	secret::{SecretError, SecretFuture, SecretStore, parse_credential},
};

/// Secret store backed by AWS Secrets Manager.
///
/// Region resolution follows the SDK's default chain (environment, profile, instance metadata)
/// unless an explicit region is supplied. Every operation is bounded by the provided timeout so a
/// hung secret fetch cannot stall an invocation indefinitely.
#[derive(Clone, Debug)]
pub struct AwsSecretStore {
	client: SecretsManagerClient,
}
impl AwsSecretStore {
	/// Loads the ambient AWS configuration and connects a Secrets Manager client.
	pub async fn connect(region: Option<String>, operation_timeout: StdDuration) -> Self {
		let timeouts = TimeoutConfig::builder().operation_timeout(operation_timeout).build();
		let mut loader = aws_config::defaults(BehaviorVersion::latest()).timeout_config(timeouts);

		if let Some(region) = region {
			loader = loader.region(Region::new(region));
		}

		let sdk_config = loader.load().await;

		Self::with_client(SecretsManagerClient::new(&sdk_config))
	}

	/// Wraps an existing Secrets Manager client.
	pub fn with_client(client: SecretsManagerClient) -> Self {
		Self { client }
	}
}
impl SecretStore for AwsSecretStore {
	fn fetch<'a>(&'a self, secret_name: &'a str) -> SecretFuture<'a, Credential> {
		Box::pin(async move {
			let output = self
				.client
				.get_secret_value()
				.secret_id(secret_name)
				.send()
				.await
				.map_err(|err| {
					let not_found = err
						.as_service_error()
						.map(|service| service.is_resource_not_found_exception())
						.unwrap_or(false);

					if not_found {
						SecretError::NotFound { name: secret_name.to_owned() }
					} else {
						SecretError::Backend {
							name: secret_name.to_owned(),
							reason: DisplayErrorContext(&err).to_string(),
						}
					}
				})?;
			let blob = output.secret_string().ok_or_else(|| SecretError::Malformed {
				name: secret_name.to_owned(),
				reason: "secret holds no string payload".into(),
			})?;

			parse_credential(secret_name, blob)
		})
	}
}
