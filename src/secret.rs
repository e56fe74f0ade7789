//! Secret-store contracts and built-in backends for credential retrieval.

#[cfg(feature = "aws")] pub mod aws;
pub mod memory;

#[cfg(feature = "aws")] pub use aws::AwsSecretStore;
pub use memory::StaticSecretStore;

// self
use crate::{_prelude::*, auth::Credential};

/// Boxed future returned by [`SecretStore`] implementations.
pub type SecretFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, SecretError>> + 'a + Send>>;

/// Read-only client for the secret-storage service.
///
/// Fetches the structured credential for a logical secret name on every cache miss. This layer
/// performs no retries; retry policy, if any, belongs to the orchestrator.
pub trait SecretStore
where
	Self: Send + Sync,
{
	/// Fetches and parses the named credential blob.
	fn fetch<'a>(&'a self, secret_name: &'a str) -> SecretFuture<'a, Credential>;
}

/// Error type produced by [`SecretStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum SecretError {
	/// The secret service has no entry under the requested name.
	#[error("Secret `{name}` was not found.")]
	NotFound {
		/// Logical secret name.
		name: String,
	},
	/// The secret exists but its payload is not a usable credential blob.
	#[error("Secret `{name}` is malformed: {reason}.")]
	Malformed {
		/// Logical secret name.
		name: String,
		/// Which field or shape check failed.
		reason: String,
	},
	/// The call to the secret service failed or timed out.
	#[error("Secret service call for `{name}` failed: {reason}.")]
	Backend {
		/// Logical secret name.
		name: String,
		/// Backend-reported failure summary.
		reason: String,
	},
}

/// Parses a secret blob into a [`Credential`], requiring both credential fields.
pub(crate) fn parse_credential(name: &str, blob: &str) -> Result<Credential, SecretError> {
	let mut deserializer = serde_json::Deserializer::from_str(blob);

	serde_path_to_error::deserialize(&mut deserializer).map_err(|err| SecretError::Malformed {
		name: name.to_owned(),
		reason: format!("{} at `{}`", err.inner(), err.path()),
	})
}
