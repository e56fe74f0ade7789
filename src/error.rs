//! Bridge-level error types shared across the secret, issuance, and lookup layers.

// self
use crate::_prelude::*;

/// Bridge-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Canonical bridge error exposed by public APIs.
///
/// Only [`Error::UpstreamUnavailable`] is eligible for the orchestrator's bounded retry; every
/// other variant terminates the invocation immediately. Display strings carry operation context
/// and upstream status codes but never credential or token material.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Credential could not be retrieved from the secret store.
	#[error("{0}")]
	SecretRetrieval(
		#[from]
		#[source]
		crate::secret::SecretError,
	),
	/// Authorization server rejected the client-credentials grant, or the token request never
	/// completed.
	#[error("Token request failed{}: {reason}.", fmt_status(.status))]
	Authentication {
		/// HTTP status returned by the token endpoint, when one was received.
		status: Option<u16>,
		/// Summary of the rejection.
		reason: String,
	},
	/// Token endpoint answered successfully but without the fields the bridge requires.
	#[error("Token endpoint returned an unusable response: {reason}.")]
	TokenFormat {
		/// What was missing or malformed.
		reason: String,
	},
	/// Downstream service does not know the requested key.
	#[error("No record found for key `{key}`.")]
	NotFound {
		/// Key the lookup service reported as unknown.
		key: String,
	},
	/// Downstream service rejected the request shape.
	#[error("Lookup request was rejected with status {status}: {reason}.")]
	ClientRequest {
		/// HTTP status returned by the lookup service.
		status: u16,
		/// Summary of the rejection.
		reason: String,
	},
	/// Downstream response failed an integrity check; indicates a service defect, not a caller
	/// mistake.
	#[error("Lookup response for key `{key}` violated the service contract: {reason}.")]
	ContractViolation {
		/// Key the record was requested for.
		key: String,
		/// Which check failed.
		reason: String,
	},
	/// Downstream service is unreachable or failing; the only retryable kind.
	#[error("Lookup service unavailable{}: {reason}.", fmt_status(.status))]
	UpstreamUnavailable {
		/// HTTP status returned by the lookup service, absent on timeout/connect failures.
		status: Option<u16>,
		/// Summary of the failure.
		reason: String,
	},
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
}
impl Error {
	/// Returns `true` when the orchestrator may retry the failed operation.
	pub fn is_retryable(&self) -> bool {
		matches!(self, Self::UpstreamUnavailable { .. })
	}
}

/// Configuration and validation failures raised by the bridge.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: reqwest::Error,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// A configured endpoint cannot be parsed as a URL.
	#[error("The {endpoint} endpoint is not a valid URL.")]
	InvalidEndpoint {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Endpoints must use HTTPS.
	#[error("The {endpoint} endpoint must be HTTPS: {url}.")]
	InsecureEndpoint {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// A required environment variable is not set.
	#[error("Environment variable `{name}` is required but not set.")]
	MissingEnv {
		/// Variable name.
		name: &'static str,
	},
	/// An environment variable holds an unusable value.
	#[error("Environment variable `{name}` is invalid: {reason}.")]
	InvalidEnv {
		/// Variable name.
		name: &'static str,
		/// Why the value was rejected.
		reason: String,
	},
	/// The request timeout must be non-zero so no network call can hang forever.
	#[error("The request timeout must be greater than zero.")]
	ZeroTimeout,
}
impl From<reqwest::Error> for ConfigError {
	fn from(e: reqwest::Error) -> Self {
		Self::HttpClientBuild { source: e }
	}
}

fn fmt_status(status: &Option<u16>) -> String {
	status.map(|code| format!(" (status {code})")).unwrap_or_default()
}
