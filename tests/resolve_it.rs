// crates.io
use httpmock::prelude::*;
// self
use lookup_bridge::{
	_preludet::*,
	auth::{CachedToken, RecordKey, SecretValue},
	cache::TokenCache,
	config::BridgeConfig,
	error::Error,
	surface::{self, BridgeReply},
};

const SECRET_BLOB: &str = r#"{"client_id":"abc","secret":"xyz"}"#;
const KEY: &str = "123e4567-e89b-12d3-a456-426614174000";
const UNKNOWN_KEY: &str = "00000000-0000-0000-0000-000000000000";
const TOKEN_BODY: &str =
	"{\"access_token\":\"T1\",\"token_type\":\"bearer\",\"expires_in\":3600}";

fn build_config(server: &MockServer, retry_limit: u32) -> BridgeConfig {
	BridgeConfig::builder(
		"consumer/lookup/credentials",
		Url::parse(&server.url("/oauth2/token")).expect("Mock token endpoint should parse."),
		Url::parse(&server.url("/record")).expect("Mock lookup endpoint should parse."),
	)
	.lookup_retry_limit(retry_limit)
	.build()
	.expect("Test configuration should validate.")
}

fn record_key(value: &str) -> RecordKey {
	RecordKey::new(value).expect("Test key should be valid.")
}

fn cached_token(value: &str, expires_in_secs: i64) -> CachedToken {
	CachedToken::new(
		SecretValue::new(value),
		OffsetDateTime::now_utc(),
		Duration::seconds(expires_in_secs),
	)
}

#[tokio::test]
async fn full_sequence_resolves_and_reuses_the_cached_token() {
	let server = MockServer::start_async().await;
	let (bridge, _store, _cache) = build_test_bridge(build_config(&server, 1), SECRET_BLOB);
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth2/token").header_exists("authorization");
			then.status(200).header("content-type", "application/json").body(TOKEN_BODY);
		})
		.await;
	let lookup_mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/record")
				.header("authorization", "Bearer T1")
				.header("identifier", KEY)
				.header("correlation-id", "not-provided");
			then.status(200)
				.header("content-type", "application/json")
				.body(format!("{{\"identifier\":\"{KEY}\",\"nino\":\"AB123456C\"}}"));
		})
		.await;
	let first = bridge
		.resolve(&record_key(KEY))
		.await
		.expect("Initial resolve should succeed end to end.");

	assert_eq!(first.identifier, KEY);
	assert_eq!(first.attributes["nino"], "AB123456C");

	let second = bridge
		.resolve(&record_key(KEY))
		.await
		.expect("Second resolve should be served from the cache.");

	assert_eq!(second.identifier, KEY);

	// Credential fetch + issuance happened once; both lookups went downstream.
	token_mock.assert_calls_async(1).await;
	lookup_mock.assert_calls_async(2).await;

	assert_eq!(bridge.metrics().cache_hits(), 1);
	assert_eq!(bridge.metrics().cache_misses(), 1);
}

#[tokio::test]
async fn expired_cache_entry_triggers_reissuance() {
	let server = MockServer::start_async().await;
	let (bridge, _store, cache) = build_test_bridge(build_config(&server, 1), SECRET_BLOB);
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth2/token");
			then.status(200).header("content-type", "application/json").body(TOKEN_BODY);
		})
		.await;
	let _lookup_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/record");
			then.status(200)
				.header("content-type", "application/json")
				.body(format!("{{\"identifier\":\"{KEY}\"}}"));
		})
		.await;

	// 50 s of lifetime sits inside the 60 s safety buffer: immediately unusable.
	cache.store(cached_token("stale-token", 50));

	bridge
		.resolve(&record_key(KEY))
		.await
		.expect("Resolve should succeed with a fresh token.");

	token_mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn downstream_404_terminates_without_retry() {
	let server = MockServer::start_async().await;
	let (bridge, _store, _cache) = build_test_bridge(build_config(&server, 2), SECRET_BLOB);
	let _token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth2/token");
			then.status(200).header("content-type", "application/json").body(TOKEN_BODY);
		})
		.await;
	let lookup_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/record").header("identifier", UNKNOWN_KEY);
			then.status(404);
		})
		.await;
	let err = bridge
		.resolve(&record_key(UNKNOWN_KEY))
		.await
		.expect_err("Unknown key should terminate with NotFound.");

	assert!(matches!(err, Error::NotFound { ref key } if key.as_str() == UNKNOWN_KEY));

	lookup_mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn upstream_5xx_exhausts_the_bounded_retry_budget() {
	let server = MockServer::start_async().await;
	let (bridge, _store, _cache) = build_test_bridge(build_config(&server, 1), SECRET_BLOB);
	let _token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth2/token");
			then.status(200).header("content-type", "application/json").body(TOKEN_BODY);
		})
		.await;
	let lookup_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/record");
			then.status(503);
		})
		.await;
	let err = bridge
		.resolve(&record_key(KEY))
		.await
		.expect_err("Persistent 503 should exhaust the retry budget.");

	assert!(matches!(err, Error::UpstreamUnavailable { status: Some(503), .. }));

	// One initial attempt plus exactly one retry.
	lookup_mock.assert_calls_async(2).await;

	assert_eq!(bridge.metrics().lookup_retries(), 1);
}

#[tokio::test]
async fn token_rejection_drops_the_cache_entry() {
	let server = MockServer::start_async().await;
	let (bridge, _store, cache) = build_test_bridge(build_config(&server, 1), SECRET_BLOB);
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth2/token");
			then.status(200).header("content-type", "application/json").body(TOKEN_BODY);
		})
		.await;
	let lookup_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/record");
			then.status(401);
		})
		.await;
	let err = bridge
		.resolve(&record_key(KEY))
		.await
		.expect_err("Persistent 401 should terminate after the bounded retry.");

	assert!(matches!(err, Error::UpstreamUnavailable { status: Some(401), .. }));

	// The invocation replayed its already-issued token once, without reissuing.
	token_mock.assert_calls_async(1).await;
	lookup_mock.assert_calls_async(2).await;

	assert_eq!(cache.fresh(OffsetDateTime::now_utc()), None);
}

#[tokio::test]
async fn authorization_server_rejection_is_fatal() {
	let server = MockServer::start_async().await;
	let (bridge, _store, _cache) = build_test_bridge(build_config(&server, 2), SECRET_BLOB);
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth2/token");
			then.status(400)
				.header("content-type", "application/json")
				.body("{\"error\":\"invalid_client\"}");
		})
		.await;
	let lookup_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/record");
			then.status(200).body("{}");
		})
		.await;
	let err = bridge
		.resolve(&record_key(KEY))
		.await
		.expect_err("Issuance rejection should be fatal.");

	assert!(matches!(err, Error::Authentication { status: Some(400), .. }));

	token_mock.assert_calls_async(1).await;
	lookup_mock.assert_calls_async(0).await;
}

#[tokio::test]
async fn missing_secret_fails_before_any_network_call() {
	let server = MockServer::start_async().await;
	let (bridge, store, _cache) = build_test_bridge(build_config(&server, 1), SECRET_BLOB);
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth2/token");
			then.status(200).header("content-type", "application/json").body(TOKEN_BODY);
		})
		.await;

	store.remove("consumer/lookup/credentials");

	let err = bridge
		.resolve(&record_key(KEY))
		.await
		.expect_err("Missing secret should terminate the invocation.");

	assert!(matches!(err, Error::SecretRetrieval(_)));

	token_mock.assert_calls_async(0).await;
}

#[tokio::test]
async fn key_mismatch_is_a_fatal_contract_violation() {
	let server = MockServer::start_async().await;
	let (bridge, _store, _cache) = build_test_bridge(build_config(&server, 2), SECRET_BLOB);
	let _token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth2/token");
			then.status(200).header("content-type", "application/json").body(TOKEN_BODY);
		})
		.await;
	let lookup_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/record");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"identifier\":\"someone-else\"}");
		})
		.await;
	let err = bridge
		.resolve(&record_key(KEY))
		.await
		.expect_err("Identifier mismatch should be fatal.");

	assert!(matches!(err, Error::ContractViolation { .. }));

	lookup_mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn surface_shapes_the_reply_table() {
	let server = MockServer::start_async().await;
	let (bridge, _store, _cache) = build_test_bridge(build_config(&server, 1), SECRET_BLOB);
	let _token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth2/token");
			then.status(200).header("content-type", "application/json").body(TOKEN_BODY);
		})
		.await;
	let _lookup_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/record").header("identifier", KEY);
			then.status(200)
				.header("content-type", "application/json")
				.body(format!("{{\"identifier\":\"{KEY}\",\"nino\":\"AB123456C\"}}"));
		})
		.await;
	let _missing_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/record").header("identifier", UNKNOWN_KEY);
			then.status(404);
		})
		.await;
	let ok = surface::handle(&bridge, KEY, Some("corr-1")).await;

	assert_eq!(ok.status, 200);
	assert_eq!(ok.body["nino"], "AB123456C");

	let missing = surface::handle(&bridge, UNKNOWN_KEY, None).await;

	assert_eq!(missing.status, 404);
	assert_eq!(missing.body["error"], format!("{UNKNOWN_KEY} not found"));

	let malformed = surface::handle(&bridge, "two words", None).await;

	assert_eq!(malformed, BridgeReply::invalid_key());
}
