//! OAuth client-credentials token issuance against the configured authorization server.

// crates.io
use oauth2::{
	ClientId, ClientSecret, EndpointNotSet, EndpointSet, HttpClientError, RequestTokenError,
	TokenResponse, TokenUrl,
	basic::{BasicClient, BasicRequestTokenError},
};
// self
use crate::{
	_prelude::*,
	auth::{CachedToken, Credential, SecretValue},
	error::ConfigError,
	http::{BridgeHttpClient, ResponseMetadata, ResponseMetadataSlot},
};

type ConfiguredTokenClient =
	BasicClient<EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

/// Boxed future returned by [`TokenIssuer`] implementations.
pub type IssueFuture<'a> = Pin<Box<dyn Future<Output = Result<CachedToken>> + 'a + Send>>;

/// Client that exchanges a credential for a short-lived bearer token.
///
/// A single issuance failure propagates immediately; credentials are assumed stable, so a blind
/// retry here would only mask real misconfiguration.
pub trait TokenIssuer
where
	Self: Send + Sync,
{
	/// Performs one client-credentials grant and returns the issued token with its expiry.
	fn issue<'a>(&'a self, credential: &'a Credential) -> IssueFuture<'a>;
}

/// [`TokenIssuer`] speaking the standard client-credentials grant over HTTP Basic client auth.
#[derive(Clone, Debug)]
pub struct ClientCredentialsIssuer {
	token_endpoint: Url,
	http: BridgeHttpClient,
}
impl ClientCredentialsIssuer {
	/// Creates an issuer for the provided token endpoint and transport.
	pub fn new(token_endpoint: Url, http: BridgeHttpClient) -> Self {
		Self { token_endpoint, http }
	}

	fn oauth_client(&self, credential: &Credential) -> Result<ConfiguredTokenClient> {
		let token_url = TokenUrl::new(self.token_endpoint.to_string())
			.map_err(|source| ConfigError::InvalidEndpoint { endpoint: "token", source })?;
		let client = BasicClient::new(ClientId::new(credential.client_id.clone()))
			.set_client_secret(ClientSecret::new(credential.client_secret.expose().to_owned()))
			.set_token_uri(token_url);

		Ok(client)
	}
}
impl TokenIssuer for ClientCredentialsIssuer {
	fn issue<'a>(&'a self, credential: &'a Credential) -> IssueFuture<'a> {
		Box::pin(async move {
			let oauth_client = self.oauth_client(credential)?;
			let slot = ResponseMetadataSlot::default();
			let handle = self.http.instrumented(slot.clone());
			let response = oauth_client
				.exchange_client_credentials()
				.request_async(&handle)
				.await
				.map_err(|err| map_issue_error(slot.take(), err))?;
			let expires_in = response
				.expires_in()
				.ok_or_else(|| Error::TokenFormat {
					reason: "response is missing expires_in".into(),
				})?
				.as_secs();
			let expires_in = i64::try_from(expires_in).map_err(|_| Error::TokenFormat {
				reason: "expires_in exceeds the supported range".into(),
			})?;

			if expires_in <= 0 {
				return Err(Error::TokenFormat { reason: "expires_in must be positive".into() });
			}

			Ok(CachedToken::new(
				SecretValue::new(response.access_token().secret().to_owned()),
				OffsetDateTime::now_utc(),
				Duration::seconds(expires_in),
			))
		})
	}
}

fn map_issue_error(
	meta: Option<ResponseMetadata>,
	err: BasicRequestTokenError<HttpClientError<reqwest::Error>>,
) -> Error {
	let status = meta.and_then(|meta| meta.status);

	match err {
		RequestTokenError::ServerResponse(response) => {
			let reason = match response.error_description() {
				Some(description) => description.clone(),
				None => response.error().as_ref().to_owned(),
			};

			Error::Authentication {
				status,
				reason: format!("token endpoint returned an OAuth error: {reason}"),
			}
		},
		RequestTokenError::Request(error) => map_issue_transport_error(status, error),
		RequestTokenError::Parse(error, _body) => Error::TokenFormat {
			reason: format!("malformed JSON at `{}`: {}", error.path(), error.inner()),
		},
		RequestTokenError::Other(message) => Error::Authentication {
			status,
			reason: format!("token endpoint returned an unexpected response: {message}"),
		},
	}
}

fn map_issue_transport_error(
	status: Option<u16>,
	err: HttpClientError<reqwest::Error>,
) -> Error {
	match err {
		HttpClientError::Reqwest(inner) if inner.is_timeout() => Error::Authentication {
			status: None,
			reason: "request timed out while calling the token endpoint".into(),
		},
		HttpClientError::Reqwest(inner) => Error::Authentication {
			status: inner.status().map(|code| code.as_u16()).or(status),
			reason: format!("transport failure while calling the token endpoint: {inner}"),
		},
		HttpClientError::Http(inner) => ConfigError::from(inner).into(),
		HttpClientError::Io(inner) => Error::Authentication {
			status: None,
			reason: format!("I/O failure while calling the token endpoint: {inner}"),
		},
		HttpClientError::Other(message) => Error::Authentication {
			status,
			reason: format!("HTTP client error while calling the token endpoint: {message}"),
		},
		_ => Error::Authentication {
			status,
			reason: "unknown transport failure while calling the token endpoint".into(),
		},
	}
}
