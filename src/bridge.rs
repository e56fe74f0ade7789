//! High-level resolve orchestration tying cache, secret store, issuer, and lookup together.
//!
//! Each invocation walks a fixed sequence: check the token cache, populate it on a miss
//! (credential fetch + token issuance, at most once per invocation), then perform the downstream
//! lookup with a bounded retry budget for unavailability failures. The cache is only written
//! after a complete successful token response, so a cancelled invocation never publishes partial
//! state. Concurrent invocations may duplicate the population sequence; the cache optimizes, it
//! does not deduplicate.

mod metrics;

pub use metrics::ResolveMetrics;

// self
use crate::{
	_prelude::*,
	auth::{CachedToken, RecordKey},
	cache::{TokenCache, memory::MemoryTokenCache},
	config::BridgeConfig,
	http::BridgeHttpClient,
	issuer::{ClientCredentialsIssuer, TokenIssuer},
	lookup::{LookupClient, LookupRecord, RecordLookup},
	obs::{self, StageKind, StageOutcome, StageSpan},
	secret::SecretStore,
};

/// Coordinates the credential/token lifecycle around downstream record lookups.
///
/// The bridge owns handles to all four collaborators so the resolve flow can focus on
/// sequencing and error classification. Components sit behind trait objects, which keeps the
/// seams injectable for tests and alternative backends.
#[derive(Clone)]
pub struct Bridge {
	secret_name: String,
	lookup_retry_limit: u32,
	secret_store: Arc<dyn SecretStore>,
	cache: Arc<dyn TokenCache>,
	issuer: Arc<dyn TokenIssuer>,
	lookup: Arc<dyn RecordLookup>,
	metrics: Arc<ResolveMetrics>,
}
impl Bridge {
	/// Creates a bridge that provisions its own HTTP transport from the configuration.
	pub fn new(config: BridgeConfig, secret_store: Arc<dyn SecretStore>) -> Result<Self> {
		let http = BridgeHttpClient::with_timeout(config.request_timeout)?;

		Ok(Self::with_http_client(config, secret_store, http))
	}

	/// Creates a bridge that reuses the caller-provided HTTP transport.
	pub fn with_http_client(
		config: BridgeConfig,
		secret_store: Arc<dyn SecretStore>,
		http: BridgeHttpClient,
	) -> Self {
		let issuer = ClientCredentialsIssuer::new(config.token_endpoint, http.clone());
		let lookup = LookupClient::new(config.lookup_endpoint, http);

		Self {
			secret_name: config.secret_name,
			lookup_retry_limit: config.lookup_retry_limit,
			secret_store,
			cache: Arc::new(MemoryTokenCache::new(config.safety_buffer)),
			issuer: Arc::new(issuer),
			lookup: Arc::new(lookup),
			metrics: Default::default(),
		}
	}

	/// Replaces the token cache; the default is a fresh [`MemoryTokenCache`].
	pub fn with_token_cache(mut self, cache: Arc<dyn TokenCache>) -> Self {
		self.cache = cache;

		self
	}

	/// Replaces the token issuer.
	pub fn with_issuer(mut self, issuer: Arc<dyn TokenIssuer>) -> Self {
		self.issuer = issuer;

		self
	}

	/// Replaces the lookup client.
	pub fn with_lookup(mut self, lookup: Arc<dyn RecordLookup>) -> Self {
		self.lookup = lookup;

		self
	}

	/// Returns the process-local resolve counters.
	pub fn metrics(&self) -> &ResolveMetrics {
		&self.metrics
	}

	/// Resolves `key` into a downstream record.
	pub async fn resolve(&self, key: &RecordKey) -> Result<LookupRecord> {
		self.resolve_with_correlation(key, None).await
	}

	/// Resolves `key`, forwarding the caller's correlation identifier downstream.
	pub async fn resolve_with_correlation(
		&self,
		key: &RecordKey,
		correlation_id: Option<&str>,
	) -> Result<LookupRecord> {
		const KIND: StageKind = StageKind::Resolve;

		let span = StageSpan::new(KIND, "resolve");

		obs::record_stage_outcome(KIND, StageOutcome::Attempt);
		self.metrics.record_attempt();

		let result = span.instrument(self.resolve_inner(key, correlation_id)).await;

		match &result {
			Ok(_) => {
				obs::record_stage_outcome(KIND, StageOutcome::Success);
				self.metrics.record_success();
			},
			Err(_) => {
				obs::record_stage_outcome(KIND, StageOutcome::Failure);
				self.metrics.record_failure();
			},
		}

		result
	}

	async fn resolve_inner(
		&self,
		key: &RecordKey,
		correlation_id: Option<&str>,
	) -> Result<LookupRecord> {
		let token = match self.cache.fresh(OffsetDateTime::now_utc()) {
			Some(token) => {
				self.metrics.record_cache_hit();

				token
			},
			None => {
				self.metrics.record_cache_miss();

				self.populate_token().await?
			},
		};
		let mut attempt = 0_u32;

		loop {
			obs::record_stage_outcome(StageKind::Lookup, StageOutcome::Attempt);

			match self.lookup.lookup(&token.access_token, key, correlation_id).await {
				Ok(record) => {
					obs::record_stage_outcome(StageKind::Lookup, StageOutcome::Success);

					return Ok(record);
				},
				Err(err) => {
					obs::record_stage_outcome(StageKind::Lookup, StageOutcome::Failure);

					if !err.is_retryable() || attempt >= self.lookup_retry_limit {
						return Err(err);
					}
					// Downstream rejected the token itself; drop the cached copy so the next
					// invocation reissues. This invocation replays the token it already holds,
					// since cache population runs at most once per invocation.
					if matches!(err, Error::UpstreamUnavailable { status: Some(401), .. }) {
						self.cache.invalidate();
					}

					attempt += 1;
					self.metrics.record_lookup_retry();

					#[cfg(feature = "tracing")]
					tracing::warn!(
						key = %key,
						attempt,
						limit = self.lookup_retry_limit,
						error = %err,
						"retrying lookup after upstream unavailability"
					);
				},
			}
		}
	}

	/// Fetches the credential and issues a fresh token, publishing it to the cache only after the
	/// issuance completed successfully.
	async fn populate_token(&self) -> Result<CachedToken> {
		obs::record_stage_outcome(StageKind::CredentialFetch, StageOutcome::Attempt);

		let credential = match self.secret_store.fetch(&self.secret_name).await {
			Ok(credential) => {
				obs::record_stage_outcome(StageKind::CredentialFetch, StageOutcome::Success);

				credential
			},
			Err(err) => {
				obs::record_stage_outcome(StageKind::CredentialFetch, StageOutcome::Failure);

				return Err(err.into());
			},
		};

		obs::record_stage_outcome(StageKind::TokenIssue, StageOutcome::Attempt);

		match self.issuer.issue(&credential).await {
			Ok(token) => {
				obs::record_stage_outcome(StageKind::TokenIssue, StageOutcome::Success);
				self.cache.store(token.clone());

				Ok(token)
			},
			Err(err) => {
				obs::record_stage_outcome(StageKind::TokenIssue, StageOutcome::Failure);

				Err(err)
			},
		}
	}
}
impl Debug for Bridge {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Bridge")
			.field("secret_name", &self.secret_name)
			.field("lookup_retry_limit", &self.lookup_retry_limit)
			.finish()
	}
}
