//! Credential-aware lookup bridge—exchange a stored client secret for short-lived bearer tokens
//! and proxy keyed record lookups behind one typed facade.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod bridge;
pub mod cache;
pub mod config;
pub mod error;
pub mod http;
pub mod issuer;
pub mod lookup;
pub mod obs;
pub mod secret;
pub mod surface;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience helpers for integration tests; enabled via `cfg(test)` or the `test` crate
	//! feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		bridge::Bridge,
		cache::{TokenCache, memory::MemoryTokenCache},
		config::BridgeConfig,
		http::BridgeHttpClient,
		secret::{SecretStore, memory::StaticSecretStore},
	};

	/// Builds a reqwest-backed HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_http_client() -> BridgeHttpClient {
		// Both the `ring` and `aws-lc-rs` rustls providers are linked into the test binaries
		// (reqwest pulls `ring`, the AWS SDK and httpmock pull `aws-lc-rs`), so rustls cannot
		// auto-select one for httpmock's TLS server. Pin the process-wide default explicitly.
		let _ = rustls::crypto::ring::default_provider().install_default();

		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure reqwest client for tests.");

		BridgeHttpClient::with_client(client)
	}

	/// Constructs a [`Bridge`] backed by an in-process secret store seeded with `secret_blob`, a
	/// fresh memory token cache, and the insecure test transport.
	pub fn build_test_bridge(
		config: BridgeConfig,
		secret_blob: &str,
	) -> (Bridge, Arc<StaticSecretStore>, Arc<MemoryTokenCache>) {
		let store_backend = Arc::new(StaticSecretStore::default());

		store_backend.insert(&config.secret_name, secret_blob);

		let store: Arc<dyn SecretStore> = store_backend.clone();
		let cache_backend = Arc::new(MemoryTokenCache::new(config.safety_buffer));
		let cache: Arc<dyn TokenCache> = cache_backend.clone();
		let bridge =
			Bridge::with_http_client(config, store, test_http_client()).with_token_cache(cache);

		(bridge, store_backend, cache_backend)
	}
}

mod _prelude {
	pub use std::{
		collections::HashMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
		time::Duration as StdDuration,
	};

	pub use parking_lot::{Mutex, RwLock};
	pub use reqwest::Client as ReqwestClient;
	pub use serde::Deserialize;
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use reqwest;
pub use url;
// The self dev-dependency only exists so integration tests see the `test` feature.
#[cfg(test)] use {httpmock as _, lookup_bridge as _};
