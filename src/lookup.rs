//! Bearer-authenticated record lookups against the downstream service.
//!
//! Response classification follows a fixed taxonomy: 404 means the key is unknown (not
//! transient), other 4xx means the request shape was rejected, and only 5xx, timeouts, and 401
//! token rejections (which the orchestrator additionally treats as grounds to drop the cached
//! token) are surfaced as retryable unavailability. A 2xx body is parsed into a typed record and
//! must echo the requested key back; a mismatch is a fatal integrity failure.

// crates.io
use reqwest::StatusCode;
use serde::Serialize;
// self
use crate::{
	_prelude::*,
	auth::{RecordKey, SecretValue},
	http::BridgeHttpClient,
};

const HEADER_IDENTIFIER: &str = "Identifier";
const HEADER_CORRELATION_ID: &str = "correlation-id";
const CORRELATION_FALLBACK: &str = "not-provided";
const REASON_SNIPPET_LEN: usize = 256;

/// Boxed future returned by [`RecordLookup`] implementations.
pub type LookupFuture<'a> = Pin<Box<dyn Future<Output = Result<LookupRecord>> + 'a + Send>>;

/// Client that resolves a key into a downstream record using a bearer token.
pub trait RecordLookup
where
	Self: Send + Sync,
{
	/// Fetches the record for `key`, authenticating with `token` and forwarding the caller's
	/// correlation identifier when present.
	fn lookup<'a>(
		&'a self,
		token: &'a SecretValue,
		key: &'a RecordKey,
		correlation_id: Option<&'a str>,
	) -> LookupFuture<'a>;
}

/// Downstream record keyed by the requested identifier.
///
/// Beyond the echoed identifier the attributes are opaque to the bridge and pass through to the
/// caller untouched.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LookupRecord {
	/// Key echoed back by the lookup service; checked against the request.
	pub identifier: String,
	/// Remaining record attributes, passed through as-is.
	#[serde(flatten)]
	pub attributes: serde_json::Map<String, serde_json::Value>,
}

/// [`RecordLookup`] implementation speaking HTTP to the configured lookup endpoint.
#[derive(Clone, Debug)]
pub struct LookupClient {
	endpoint: Url,
	http: BridgeHttpClient,
}
impl LookupClient {
	/// Creates a client for the provided lookup endpoint and transport.
	pub fn new(endpoint: Url, http: BridgeHttpClient) -> Self {
		Self { endpoint, http }
	}

	async fn fetch_record(
		&self,
		token: &SecretValue,
		key: &RecordKey,
		correlation_id: Option<&str>,
	) -> Result<LookupRecord> {
		let response = self
			.http
			.inner()
			.get(self.endpoint.clone())
			.bearer_auth(token.expose())
			.header(HEADER_IDENTIFIER, key.as_ref())
			.header(HEADER_CORRELATION_ID, correlation_id.unwrap_or(CORRELATION_FALLBACK))
			.send()
			.await
			.map_err(map_send_error)?;
		let status = response.status();
		let body = response.bytes().await.map_err(map_send_error)?;

		classify_response(key, status, &body)
	}
}
impl RecordLookup for LookupClient {
	fn lookup<'a>(
		&'a self,
		token: &'a SecretValue,
		key: &'a RecordKey,
		correlation_id: Option<&'a str>,
	) -> LookupFuture<'a> {
		Box::pin(self.fetch_record(token, key, correlation_id))
	}
}

fn map_send_error(err: reqwest::Error) -> Error {
	if err.is_timeout() {
		return Error::UpstreamUnavailable {
			status: None,
			reason: "lookup request timed out".into(),
		};
	}

	Error::UpstreamUnavailable {
		status: err.status().map(|code| code.as_u16()),
		reason: format!("lookup transport failure: {err}"),
	}
}

fn classify_response(key: &RecordKey, status: StatusCode, body: &[u8]) -> Result<LookupRecord> {
	if status.is_success() {
		return parse_record(key, body);
	}
	if status == StatusCode::NOT_FOUND {
		return Err(Error::NotFound { key: key.to_string() });
	}
	if status == StatusCode::UNAUTHORIZED {
		// The token itself was rejected; retryable so the orchestrator can drop the cache entry.
		return Err(Error::UpstreamUnavailable {
			status: Some(status.as_u16()),
			reason: "lookup service rejected the bearer token".into(),
		});
	}
	if status.is_client_error() {
		return Err(Error::ClientRequest {
			status: status.as_u16(),
			reason: body_snippet(body),
		});
	}

	Err(Error::UpstreamUnavailable {
		status: Some(status.as_u16()),
		reason: body_snippet(body),
	})
}

fn parse_record(key: &RecordKey, body: &[u8]) -> Result<LookupRecord> {
	let mut deserializer = serde_json::Deserializer::from_slice(body);
	let record: LookupRecord =
		serde_path_to_error::deserialize(&mut deserializer).map_err(|err| {
			Error::ContractViolation {
				key: key.to_string(),
				reason: format!("unparseable record body: {} at `{}`", err.inner(), err.path()),
			}
		})?;

	if record.identifier != key.as_ref() {
		#[cfg(feature = "tracing")]
		tracing::error!(
			key = %key,
			returned = %record.identifier,
			"lookup response failed the key round-trip check"
		);

		return Err(Error::ContractViolation {
			key: key.to_string(),
			reason: format!("response identifier `{}` does not match the request", record.identifier),
		});
	}

	Ok(record)
}

fn body_snippet(body: &[u8]) -> String {
	let text = String::from_utf8_lossy(body);
	let trimmed = text.trim();

	if trimmed.is_empty() {
		return "empty response body".into();
	}

	trimmed.chars().take(REASON_SNIPPET_LEN).collect()
}
