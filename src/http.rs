//! Shared HTTP transport for the issuer and lookup clients.
//!
//! [`BridgeHttpClient`] wraps one [`ReqwestClient`] so both outbound clients share timeouts and
//! TLS configuration. [`ResponseMetadataSlot`] carries the HTTP status observed during an OAuth
//! token exchange back to the error-mapping layer, since the `oauth2` crate's error values do not
//! expose it on their own.

// crates.io
use oauth2::{AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse};
use reqwest::redirect::Policy;
// self
use crate::{_prelude::*, error::ConfigError};

/// One [`ReqwestClient`] shared by the issuer and lookup clients so timeouts and TLS settings
/// are configured in a single place.
///
/// Neither token requests nor lookups follow redirects: token endpoints return results directly
/// per OAuth 2.0 guidance, and a redirected lookup would silently rewrite the record source.
#[derive(Clone, Debug)]
pub struct BridgeHttpClient(ReqwestClient);
impl BridgeHttpClient {
	/// Builds a client whose every request is bounded by `timeout`.
	pub fn with_timeout(timeout: StdDuration) -> Result<Self, ConfigError> {
		let client =
			ReqwestClient::builder().timeout(timeout).redirect(Policy::none()).build()?;

		Ok(Self(client))
	}

	/// Wraps an existing [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Returns the underlying reqwest handle for plain requests.
	pub fn inner(&self) -> &ReqwestClient {
		&self.0
	}

	/// Builds an instrumented handle for the `oauth2` exchange that records the response status.
	pub(crate) fn instrumented(&self, slot: ResponseMetadataSlot) -> InstrumentedHandle {
		InstrumentedHandle::new(self.0.clone(), slot)
	}
}
impl AsRef<ReqwestClient> for BridgeHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}

/// Captures metadata from the most recent token-endpoint response for error mapping.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct ResponseMetadata {
	/// HTTP status code returned by the token endpoint, if available.
	pub status: Option<u16>,
}

/// Hand-off cell carrying [`ResponseMetadata`] from the transport to the error-mapping layer.
///
/// A fresh slot is created per token request and drained immediately after the exchange resolves,
/// so metadata from a prior attempt can never leak into a new invocation.
#[derive(Clone, Debug, Default)]
pub(crate) struct ResponseMetadataSlot(Arc<Mutex<Option<ResponseMetadata>>>);
impl ResponseMetadataSlot {
	/// Publishes metadata for the in-flight request.
	pub fn store(&self, meta: ResponseMetadata) {
		*self.0.lock() = Some(meta);
	}

	/// Drains the captured metadata, if any.
	pub fn take(&self) -> Option<ResponseMetadata> {
		self.0.lock().take()
	}
}

/// [`AsyncHttpClient`] adapter that records the response status while executing the exchange.
#[derive(Clone)]
pub(crate) struct InstrumentedHandle {
	client: ReqwestClient,
	slot: ResponseMetadataSlot,
}
impl InstrumentedHandle {
	fn new(client: ReqwestClient, slot: ResponseMetadataSlot) -> Self {
		Self { client, slot }
	}
}
impl<'c> AsyncHttpClient<'c> for InstrumentedHandle {
	type Error = HttpClientError<reqwest::Error>;
	type Future =
		Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'c + Send + Sync>>;

	fn call(&'c self, request: HttpRequest) -> Self::Future {
		let client = self.client.clone();
		let slot = self.slot.clone();

		Box::pin(async move {
			slot.take();

			let outbound = request.try_into().map_err(Box::new)?;
			let response = client.execute(outbound).await.map_err(Box::new)?;
			let status = response.status();
			let headers = response.headers().to_owned();

			slot.store(ResponseMetadata { status: Some(status.as_u16()) });

			let body = response.bytes().await.map_err(Box::new)?.to_vec();
			let mut mapped = HttpResponse::new(body);

			*mapped.status_mut() = status;
			*mapped.headers_mut() = headers;

			Ok(mapped)
		})
	}
}
