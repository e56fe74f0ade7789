//! In-process [`SecretStore`] implementation for local development and tests.

// self
use crate::{
	_prelude::*,
	auth::Credential,
	secret::{SecretError, SecretFuture, SecretStore, parse_credential},
};

/// Thread-safe name → blob map standing in for a real secret service.
#[derive(Clone, Debug, Default)]
pub struct StaticSecretStore(Arc<RwLock<HashMap<String, String>>>);
impl StaticSecretStore {
	/// Inserts or replaces a secret blob under the provided name.
	pub fn insert(&self, name: impl Into<String>, blob: impl Into<String>) {
		self.0.write().insert(name.into(), blob.into());
	}

	/// Removes the named secret, if present.
	pub fn remove(&self, name: &str) {
		self.0.write().remove(name);
	}
}
impl SecretStore for StaticSecretStore {
	fn fetch<'a>(&'a self, secret_name: &'a str) -> SecretFuture<'a, Credential> {
		let blob = self.0.read().get(secret_name).cloned();

		Box::pin(async move {
			let blob =
				blob.ok_or_else(|| SecretError::NotFound { name: secret_name.to_owned() })?;

			parse_credential(secret_name, &blob)
		})
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[tokio::test]
	async fn fetches_seeded_credentials() {
		let store = StaticSecretStore::default();

		store.insert("lab/credentials", r#"{"client_id":"abc","secret":"xyz"}"#);

		let credential = store
			.fetch("lab/credentials")
			.await
			.expect("Seeded secret should be retrievable.");

		assert_eq!(credential.client_id, "abc");
		assert_eq!(credential.client_secret.expose(), "xyz");
	}

	#[tokio::test]
	async fn missing_names_report_not_found() {
		let store = StaticSecretStore::default();
		let err = store
			.fetch("lab/credentials")
			.await
			.expect_err("Unseeded secret should be absent.");

		assert_eq!(err, SecretError::NotFound { name: "lab/credentials".into() });
	}
}
