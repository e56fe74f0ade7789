//! Domain types shared across the bridge: redacted secrets, credentials, keys, cached tokens.

// std
use std::{borrow::Borrow, ops::Deref};
// self
use crate::_prelude::*;

const KEY_MAX_LEN: usize = 256;

/// Redacted wrapper keeping secret material (client secrets, bearer tokens) out of logs.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct SecretValue(String);
impl SecretValue {
	/// Wraps a raw secret string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}
}
impl AsRef<str> for SecretValue {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for SecretValue {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("SecretValue").field(&"<redacted>").finish()
	}
}
impl Display for SecretValue {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Client credential retrieved from the secret store.
///
/// Deserialized from the stored secret blob (`{"client_id": ..., "secret": ...}`). Lives for a
/// single issuance call; the bridge never caches or persists it.
#[derive(Clone, Debug, Deserialize)]
pub struct Credential {
	/// OAuth client identifier.
	pub client_id: String,
	/// Confidential client secret.
	#[serde(rename = "secret")]
	pub client_secret: SecretValue,
}

/// Error returned when record key validation fails.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum KeyError {
	/// The key was empty.
	#[error("Record key cannot be empty.")]
	Empty,
	/// The key contains whitespace characters.
	#[error("Record key contains whitespace.")]
	ContainsWhitespace,
	/// The key exceeded the allowed character count.
	#[error("Record key exceeds {max} characters.")]
	TooLong {
		/// Maximum permitted character count.
		max: usize,
	},
}

/// Validated identifier used to request a downstream record.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordKey(String);
impl RecordKey {
	/// Creates a new key after validation.
	pub fn new(value: impl AsRef<str>) -> Result<Self, KeyError> {
		let view = value.as_ref();

		if view.is_empty() {
			return Err(KeyError::Empty);
		}
		if view.chars().any(char::is_whitespace) {
			return Err(KeyError::ContainsWhitespace);
		}
		if view.len() > KEY_MAX_LEN {
			return Err(KeyError::TooLong { max: KEY_MAX_LEN });
		}

		Ok(Self(view.to_owned()))
	}
}
impl Deref for RecordKey {
	type Target = str;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
impl AsRef<str> for RecordKey {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl Borrow<str> for RecordKey {
	fn borrow(&self) -> &str {
		&self.0
	}
}
impl From<RecordKey> for String {
	fn from(value: RecordKey) -> Self {
		value.0
	}
}
impl Debug for RecordKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "RecordKey({})", self.0)
	}
}
impl Display for RecordKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}
impl FromStr for RecordKey {
	type Err = KeyError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::new(s)
	}
}

/// Bearer token plus its absolute expiry instant, as held by the token cache.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CachedToken {
	/// Bearer token value; never logged.
	pub access_token: SecretValue,
	/// Instant the token was issued at.
	pub issued_at: OffsetDateTime,
	/// Expiry instant derived from `issued_at` plus the issuer's `expires_in`.
	pub expires_at: OffsetDateTime,
}
impl CachedToken {
	/// Builds a token whose expiry is `issued_at + expires_in`.
	pub fn new(access_token: SecretValue, issued_at: OffsetDateTime, expires_in: Duration) -> Self {
		Self { access_token, issued_at, expires_at: issued_at + expires_in }
	}

	/// Returns `true` while the token is comfortably ahead of expiry.
	///
	/// The safety buffer absorbs clock skew and in-flight request latency: a token inside the
	/// buffer window is already unusable even though its stated expiry has not passed.
	pub fn is_fresh_at(&self, instant: OffsetDateTime, safety_buffer: Duration) -> bool {
		instant < self.expires_at - safety_buffer
	}
}
