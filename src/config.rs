//! Environment-provided bridge configuration.

// self
use crate::{_prelude::*, cache::DEFAULT_SAFETY_BUFFER, error::ConfigError};

/// Environment variable naming the logical secret that stores the client credential.
pub const ENV_SECRET_NAME: &str = "SECRET_NAME";
/// Environment variable naming the authorization-server domain.
pub const ENV_AUTH_DOMAIN: &str = "AUTH_DOMAIN";
/// Environment variable holding the downstream lookup URL.
pub const ENV_LOOKUP_API_URL: &str = "LOOKUP_API_URL";
/// Environment variable selecting the secret-store region.
pub const ENV_AWS_REGION: &str = "AWS_REGION";
/// Environment variable overriding the token safety buffer, in seconds.
pub const ENV_TOKEN_SAFETY_BUFFER_SECS: &str = "TOKEN_SAFETY_BUFFER_SECS";
/// Environment variable overriding the bounded lookup retry count.
pub const ENV_LOOKUP_RETRY_LIMIT: &str = "LOOKUP_RETRY_LIMIT";
/// Environment variable overriding the outbound request timeout, in seconds.
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "REQUEST_TIMEOUT_SECS";

const DEFAULT_LOOKUP_RETRY_LIMIT: u32 = 1;
const DEFAULT_REQUEST_TIMEOUT: StdDuration = StdDuration::from_secs(10);
const TOKEN_ENDPOINT_PATH: &str = "/oauth2/token";

/// Validated bridge configuration.
#[derive(Clone, Debug)]
pub struct BridgeConfig {
	/// Logical name of the stored client credential.
	pub secret_name: String,
	/// Authorization-server token endpoint.
	pub token_endpoint: Url,
	/// Downstream lookup endpoint.
	pub lookup_endpoint: Url,
	/// Secret-store region override; the SDK's default chain applies when absent.
	pub aws_region: Option<String>,
	/// Margin subtracted from token expiry before the cache treats an entry as unusable.
	pub safety_buffer: Duration,
	/// Maximum number of lookup retries after the initial attempt.
	pub lookup_retry_limit: u32,
	/// Upper bound applied to every outbound network call.
	pub request_timeout: StdDuration,
}
impl BridgeConfig {
	/// Returns a builder seeded with the three required settings.
	pub fn builder(
		secret_name: impl Into<String>,
		token_endpoint: Url,
		lookup_endpoint: Url,
	) -> BridgeConfigBuilder {
		BridgeConfigBuilder {
			secret_name: secret_name.into(),
			token_endpoint,
			lookup_endpoint,
			aws_region: None,
			safety_buffer: DEFAULT_SAFETY_BUFFER,
			lookup_retry_limit: DEFAULT_LOOKUP_RETRY_LIMIT,
			request_timeout: DEFAULT_REQUEST_TIMEOUT,
		}
	}

	/// Loads the configuration from process environment variables.
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_env_with(|name| std::env::var(name).ok())
	}

	/// Loads the configuration from an injectable variable source.
	pub fn from_env_with<F>(fetch: F) -> Result<Self, ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let secret_name = require(&fetch, ENV_SECRET_NAME)?;
		let auth_domain = require(&fetch, ENV_AUTH_DOMAIN)?;
		let token_endpoint = Url::parse(&format!("https://{auth_domain}{TOKEN_ENDPOINT_PATH}"))
			.map_err(|source| ConfigError::InvalidEnv {
				name: ENV_AUTH_DOMAIN,
				reason: source.to_string(),
			})?;
		let lookup_endpoint = Url::parse(&require(&fetch, ENV_LOOKUP_API_URL)?).map_err(
			|source| ConfigError::InvalidEnv {
				name: ENV_LOOKUP_API_URL,
				reason: source.to_string(),
			},
		)?;
		let mut builder = Self::builder(secret_name, token_endpoint, lookup_endpoint);

		if let Some(region) = fetch(ENV_AWS_REGION) {
			builder = builder.aws_region(region);
		}
		if let Some(secs) = parse_u64(&fetch, ENV_TOKEN_SAFETY_BUFFER_SECS)? {
			builder = builder.safety_buffer(Duration::seconds(secs as i64));
		}
		if let Some(limit) = parse_u64(&fetch, ENV_LOOKUP_RETRY_LIMIT)? {
			let limit = u32::try_from(limit).map_err(|_| ConfigError::InvalidEnv {
				name: ENV_LOOKUP_RETRY_LIMIT,
				reason: "value exceeds the supported range".into(),
			})?;

			builder = builder.lookup_retry_limit(limit);
		}
		if let Some(secs) = parse_u64(&fetch, ENV_REQUEST_TIMEOUT_SECS)? {
			builder = builder.request_timeout(StdDuration::from_secs(secs));
		}

		builder.build()
	}
}

/// Builder for [`BridgeConfig`] values.
#[derive(Clone, Debug)]
pub struct BridgeConfigBuilder {
	/// Logical name of the stored client credential.
	pub secret_name: String,
	/// Authorization-server token endpoint.
	pub token_endpoint: Url,
	/// Downstream lookup endpoint.
	pub lookup_endpoint: Url,
	/// Secret-store region override.
	pub aws_region: Option<String>,
	/// Token safety buffer.
	pub safety_buffer: Duration,
	/// Bounded lookup retry count.
	pub lookup_retry_limit: u32,
	/// Outbound request timeout.
	pub request_timeout: StdDuration,
}
impl BridgeConfigBuilder {
	/// Sets the secret-store region.
	pub fn aws_region(mut self, region: impl Into<String>) -> Self {
		self.aws_region = Some(region.into());

		self
	}

	/// Overrides the token safety buffer; negative values clamp to zero.
	pub fn safety_buffer(mut self, buffer: Duration) -> Self {
		self.safety_buffer = if buffer.is_negative() { Duration::ZERO } else { buffer };

		self
	}

	/// Overrides the bounded lookup retry count.
	pub fn lookup_retry_limit(mut self, limit: u32) -> Self {
		self.lookup_retry_limit = limit;

		self
	}

	/// Overrides the outbound request timeout.
	pub fn request_timeout(mut self, timeout: StdDuration) -> Self {
		self.request_timeout = timeout;

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<BridgeConfig, ConfigError> {
		validate_endpoint("token", &self.token_endpoint)?;
		validate_endpoint("lookup", &self.lookup_endpoint)?;

		if self.request_timeout.is_zero() {
			return Err(ConfigError::ZeroTimeout);
		}

		Ok(BridgeConfig {
			secret_name: self.secret_name,
			token_endpoint: self.token_endpoint,
			lookup_endpoint: self.lookup_endpoint,
			aws_region: self.aws_region,
			safety_buffer: self.safety_buffer,
			lookup_retry_limit: self.lookup_retry_limit,
			request_timeout: self.request_timeout,
		})
	}
}

fn validate_endpoint(name: &'static str, url: &Url) -> Result<(), ConfigError> {
	if url.scheme() != "https" {
		Err(ConfigError::InsecureEndpoint { endpoint: name, url: url.to_string() })
	} else {
		Ok(())
	}
}

fn require<F>(fetch: &F, name: &'static str) -> Result<String, ConfigError>
where
	F: Fn(&str) -> Option<String>,
{
	fetch(name).filter(|value| !value.is_empty()).ok_or(ConfigError::MissingEnv { name })
}

fn parse_u64<F>(fetch: &F, name: &'static str) -> Result<Option<u64>, ConfigError>
where
	F: Fn(&str) -> Option<String>,
{
	match fetch(name) {
		Some(raw) => raw
			.parse::<u64>()
			.map(Some)
			.map_err(|err| ConfigError::InvalidEnv { name, reason: err.to_string() }),
		None => Ok(None),
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn env_fixture(name: &str) -> Option<String> {
		match name {
			ENV_SECRET_NAME => Some("consumer/lookup/credentials".into()),
			ENV_AUTH_DOMAIN => Some("auth.example.com".into()),
			ENV_LOOKUP_API_URL => Some("https://lookup.example.com/records".into()),
			_ => None,
		}
	}

	#[test]
	fn builder_applies_documented_defaults() {
		let config = BridgeConfig::builder(
			"consumer/lookup/credentials",
			Url::parse("https://auth.example.com/oauth2/token").expect("Fixture URL."),
			Url::parse("https://lookup.example.com/records").expect("Fixture URL."),
		)
		.build()
		.expect("Defaults should validate.");

		assert_eq!(config.safety_buffer, Duration::seconds(60));
		assert_eq!(config.lookup_retry_limit, 1);
		assert_eq!(config.request_timeout, StdDuration::from_secs(10));
		assert_eq!(config.aws_region, None);
	}

	#[test]
	fn insecure_endpoints_are_rejected() {
		let result = BridgeConfig::builder(
			"consumer/lookup/credentials",
			Url::parse("http://auth.example.com/oauth2/token").expect("Fixture URL."),
			Url::parse("https://lookup.example.com/records").expect("Fixture URL."),
		)
		.build();

		assert!(matches!(result, Err(ConfigError::InsecureEndpoint { endpoint: "token", .. })));
	}

	#[test]
	fn zero_timeout_is_rejected() {
		let result = BridgeConfig::builder(
			"consumer/lookup/credentials",
			Url::parse("https://auth.example.com/oauth2/token").expect("Fixture URL."),
			Url::parse("https://lookup.example.com/records").expect("Fixture URL."),
		)
		.request_timeout(StdDuration::ZERO)
		.build();

		assert!(matches!(result, Err(ConfigError::ZeroTimeout)));
	}

	#[test]
	fn from_env_builds_the_token_endpoint_from_the_domain() {
		let config = BridgeConfig::from_env_with(env_fixture)
			.expect("Complete environment should load.");

		assert_eq!(
			config.token_endpoint.as_str(),
			"https://auth.example.com/oauth2/token"
		);
		assert_eq!(config.secret_name, "consumer/lookup/credentials");
	}

	#[test]
	fn from_env_reports_the_missing_variable() {
		let result =
			BridgeConfig::from_env_with(|name| env_fixture(name).filter(|_| name != ENV_AUTH_DOMAIN));

		assert!(matches!(result, Err(ConfigError::MissingEnv { name: ENV_AUTH_DOMAIN })));
	}

	#[test]
	fn from_env_applies_overrides() {
		let config = BridgeConfig::from_env_with(|name| match name {
			ENV_TOKEN_SAFETY_BUFFER_SECS => Some("90".into()),
			ENV_LOOKUP_RETRY_LIMIT => Some("2".into()),
			ENV_REQUEST_TIMEOUT_SECS => Some("5".into()),
			ENV_AWS_REGION => Some("eu-west-2".into()),
			_ => env_fixture(name),
		})
		.expect("Environment with overrides should load.");

		assert_eq!(config.safety_buffer, Duration::seconds(90));
		assert_eq!(config.lookup_retry_limit, 2);
		assert_eq!(config.request_timeout, StdDuration::from_secs(5));
		assert_eq!(config.aws_region.as_deref(), Some("eu-west-2"));
	}

	#[test]
	fn from_env_rejects_unparseable_numbers() {
		let result = BridgeConfig::from_env_with(|name| match name {
			ENV_LOOKUP_RETRY_LIMIT => Some("many".into()),
			_ => env_fixture(name),
		});

		assert!(matches!(
			result,
			Err(ConfigError::InvalidEnv { name: ENV_LOOKUP_RETRY_LIMIT, .. })
		));
	}
}
