//! Inbound boundary: maps resolve outcomes to HTTP-style replies for the hosting runtime.
//!
//! The hosting entry point itself (function runtime, gateway) lives outside this crate; it only
//! needs to deserialize the caller's key, call [`handle`], and write the returned status + JSON
//! body. Error bodies are `{"error": "<description>"}` and never contain credential or token
//! material.

// crates.io
use serde_json::{Value, json};
// self
use crate::{_prelude::*, auth::RecordKey, bridge::Bridge, lookup::LookupRecord};

/// Status code and JSON body to be written by the hosting runtime.
#[derive(Clone, Debug, PartialEq)]
pub struct BridgeReply {
	/// HTTP-style status code.
	pub status: u16,
	/// JSON body.
	pub body: Value,
}
impl BridgeReply {
	/// Builds the success reply carrying the record's fields.
	pub fn ok(record: &LookupRecord) -> Self {
		let body = serde_json::to_value(record)
			.unwrap_or_else(|_| json!({ "identifier": record.identifier }));

		Self { status: 200, body }
	}

	/// Builds the reply for a rejected input key.
	pub fn invalid_key() -> Self {
		Self { status: 400, body: json!({ "error": "Invalid key format" }) }
	}

	/// Maps a resolve error onto the reply table.
	pub fn from_error(err: &Error) -> Self {
		let status = match err {
			Error::NotFound { .. } => 404,
			Error::ClientRequest { .. } => 400,
			// Upstream answered with a failure: bad gateway. No answer at all: unavailable.
			Error::UpstreamUnavailable { status: Some(_), .. } => 502,
			Error::UpstreamUnavailable { status: None, .. } => 503,
			Error::SecretRetrieval(_)
			| Error::Authentication { .. }
			| Error::TokenFormat { .. }
			| Error::ContractViolation { .. }
			| Error::Config(_) => 500,
		};
		let body = match err {
			Error::NotFound { key } => json!({ "error": format!("{key} not found") }),
			_ => json!({ "error": err.to_string() }),
		};

		Self { status, body }
	}
}

/// Handles one inbound invocation: validates the raw key, resolves it, and shapes the reply.
pub async fn handle(bridge: &Bridge, raw_key: &str, correlation_id: Option<&str>) -> BridgeReply {
	let key = match RecordKey::new(raw_key) {
		Ok(key) => key,
		Err(_) => return BridgeReply::invalid_key(),
	};

	match bridge.resolve_with_correlation(&key, correlation_id).await {
		Ok(record) => BridgeReply::ok(&record),
		Err(err) => BridgeReply::from_error(&err),
	}
}
