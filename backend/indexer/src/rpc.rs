//! Soroban RPC client — polls `getEvents` and decodes FundMe events.
//!
//! ## Resilience
//!
//! * Exponential back-off is applied when the RPC returns an error or rate-limit
//!   response, up to [`MAX_BACKOFF_SECS`] seconds.
//! * Transient network errors (connection reset, timeout) are retried silently.
//!
//! ## Decoding
//!
//! Topics and data arrive as XDR rendered to JSON. Depending on the RPC
//! version a scalar is either bare (`"funded"`, `5000`), tagged
//! (`{"type":"symbol","value":"funded"}`, `{"i128":"5000"}`) or, for
//! 128-bit integers, split into `{"hi":…,"lo":…}`. Struct data is either a
//! flat object or a `{"map":[{"key":…,"val":…}]}` list. All of these are
//! accepted.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::errors::{IndexerError, Result};
use crate::events::{EventKind, FundMeEvent};

const MAX_BACKOFF_SECS: u64 = 60;
const INITIAL_BACKOFF_SECS: u64 = 2;

// ─────────────────────────────────────────────────────────
// JSON-RPC response shapes
// ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RpcResponse {
    pub result: Option<EventsResult>,
    pub error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct EventsResult {
    pub events: Vec<RawEvent>,
    pub cursor: Option<String>,
    #[serde(rename = "latestLedger")]
    pub latest_ledger: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RawEvent {
    /// XDR-encoded topic list
    pub topic: Vec<String>,
    /// XDR-encoded event value / data
    pub value: Value,
    #[serde(rename = "contractId")]
    pub contract_id: Option<String>,
    #[serde(rename = "txHash")]
    pub tx_hash: Option<String>,
    pub id: Option<String>,
    pub ledger: Option<u64>,
    #[serde(rename = "ledgerClosedAt")]
    pub ledger_closed_at: Option<String>,
    #[serde(rename = "inSuccessfulContractCall")]
    pub in_successful_contract_call: Option<bool>,
    #[serde(rename = "pagingToken")]
    pub paging_token: Option<String>,
}

// ─────────────────────────────────────────────────────────
// Public API
// ─────────────────────────────────────────────────────────

/// Fetch a page of events from the RPC.
///
/// * `start_ledger` — the ledger sequence to scan from (inclusive).
/// * `cursor`       — optional opaque pagination cursor from a previous response.
/// * `limit`        — maximum number of events to return.
///
/// Returns `(events, next_cursor, latest_ledger)`.
pub async fn fetch_events(
    client: &Client,
    rpc_url: &str,
    contract_id: &str,
    start_ledger: u32,
    cursor: Option<&str>,
    limit: u32,
) -> Result<(Vec<RawEvent>, Option<String>, Option<u64>)> {
    let mut backoff = INITIAL_BACKOFF_SECS;

    loop {
        let params = build_params(contract_id, start_ledger, cursor, limit);

        let response = client
            .post(rpc_url)
            .json(&json!({
                "jsonrpc": "2.0",
                "id": 1,
                "method": "getEvents",
                "params": params,
            }))
            .send()
            .await;

        match response {
            Err(e) => {
                warn!("RPC request failed (will retry in {backoff}s): {e}");
            }
            Ok(resp) if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS => {
                warn!("Rate-limited by RPC (will retry in {backoff}s)");
            }
            Ok(resp) => {
                let body: RpcResponse = resp.json().await?;

                if let Some(err) = body.error {
                    if is_hard_error(err.code) {
                        return Err(IndexerError::Rpc {
                            code: err.code,
                            message: err.message,
                        });
                    }
                    warn!(
                        "RPC soft error (will retry in {backoff}s): {} {}",
                        err.code, err.message
                    );
                } else {
                    let result = body.result.ok_or_else(|| {
                        IndexerError::EventParse("Empty result from getEvents".to_string())
                    })?;

                    debug!(
                        "Fetched {} events (latest_ledger={:?})",
                        result.events.len(),
                        result.latest_ledger
                    );

                    return Ok((result.events, result.cursor, result.latest_ledger));
                }
            }
        }

        tokio::time::sleep(Duration::from_secs(backoff)).await;
        backoff = next_backoff(backoff);
    }
}

/// Invalid request / unknown method / invalid params never succeed on retry.
fn is_hard_error(code: i64) -> bool {
    matches!(code, -32600 | -32601 | -32602)
}

fn next_backoff(current: u64) -> u64 {
    (current * 2).min(MAX_BACKOFF_SECS)
}

fn build_params(contract_id: &str, start_ledger: u32, cursor: Option<&str>, limit: u32) -> Value {
    let mut params = json!({
        "filters": [
            {
                "type": "contract",
                "contractIds": [contract_id]
            }
        ],
        "pagination": {
            "limit": limit
        }
    });

    if let Some(cur) = cursor {
        params["pagination"]["cursor"] = json!(cur);
    } else {
        params["startLedger"] = json!(start_ledger);
    }

    params
}

// ─────────────────────────────────────────────────────────
// Event decoding
// ─────────────────────────────────────────────────────────

/// Decode a list of raw RPC events into [`FundMeEvent`] structs.
///
/// Events from reverted calls are dropped: a failed `fund` or withdrawal
/// changed nothing on-chain.
pub fn decode_events(raw: &[RawEvent], contract_id: &str) -> Vec<FundMeEvent> {
    raw.iter()
        .filter(|e| e.in_successful_contract_call != Some(false))
        .filter_map(|e| decode_single(e, contract_id))
        .collect()
}

fn decode_single(raw: &RawEvent, contract_id: &str) -> Option<FundMeEvent> {
    // Extract leading topic symbol to determine event type.
    let first_topic = raw.topic.first()?;
    let kind = EventKind::from_topic(&parse_topic(first_topic));

    let ledger = raw.ledger.unwrap_or(0) as i64;
    let timestamp = raw
        .ledger_closed_at
        .as_deref()
        .and_then(parse_iso_to_unix)
        .unwrap_or(0);

    // The second topic is the funder (`funded`) or the owner (`withdrawn`).
    let topic_actor = raw.topic.get(1).map(|t| parse_topic(t));
    let (data_actor, amount) = decode_data(&raw.value, kind);
    let actor = data_actor.or(topic_actor);

    let event_id = raw
        .id
        .clone()
        .or_else(|| raw.paging_token.clone())
        .unwrap_or_else(|| {
            format!(
                "{ledger}-{}-{}-{}",
                raw.tx_hash.as_deref().unwrap_or(""),
                kind.as_str(),
                actor.as_deref().unwrap_or("")
            )
        });

    Some(FundMeEvent {
        event_id,
        event_type: kind.as_str().to_string(),
        actor,
        amount,
        ledger,
        timestamp,
        contract_id: raw
            .contract_id
            .clone()
            .unwrap_or_else(|| contract_id.to_string()),
        tx_hash: raw.tx_hash.clone(),
    })
}

/// Pull `(actor, amount)` out of the event data.
fn decode_data(value: &Value, kind: EventKind) -> (Option<String>, Option<String>) {
    match kind {
        EventKind::Funded => (
            extract_field(value, &["funder", "address"]),
            extract_field(value, &["amount"]),
        ),
        EventKind::Withdrawn => (
            extract_field(value, &["owner", "address"]),
            extract_field(value, &["amount"]),
        ),
        EventKind::Unknown => (None, None),
    }
}

fn extract_field(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| lookup_field(value, key).and_then(scalar))
}

/// Find `key` in either a flat object or an XDR-JSON `map` entry list.
fn lookup_field<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    if let Some(v) = value.get(key) {
        return Some(v);
    }
    value
        .get("map")
        .and_then(Value::as_array)?
        .iter()
        .find(|entry| entry.get("key").and_then(scalar).as_deref() == Some(key))
        .and_then(|entry| entry.get("val"))
}

/// Render a bare or tagged scalar as a string.
fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Object(map) => {
            if let Some(inner) = map.get("value") {
                return scalar(inner);
            }
            if let (Some(hi), Some(lo)) = (map.get("hi"), map.get("lo")) {
                return join_i128_parts(hi, lo);
            }
            if map.len() == 1 {
                return map.values().next().and_then(scalar);
            }
            None
        }
        _ => None,
    }
}

/// Reassemble an `i128` from its signed high and unsigned low 64-bit halves.
fn join_i128_parts(hi: &Value, lo: &Value) -> Option<String> {
    let hi = hi
        .as_i64()
        .or_else(|| hi.as_str().and_then(|s| s.parse().ok()))?;
    let lo = lo
        .as_u64()
        .or_else(|| lo.as_str().and_then(|s| s.parse().ok()))?;
    Some((((hi as i128) << 64) | lo as i128).to_string())
}

/// Extract a topic scalar (symbol, address, number) from its JSON rendering.
/// Falls back to the raw string when the topic is not JSON.
fn parse_topic(raw: &str) -> String {
    serde_json::from_str::<Value>(raw)
        .ok()
        .as_ref()
        .and_then(scalar)
        .unwrap_or_else(|| raw.to_string())
}

/// Parse an ISO-8601 timestamp string into a Unix epoch (seconds).
fn parse_iso_to_unix(s: &str) -> Option<i64> {
    chrono::DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.timestamp())
}

// ─────────────────────────────────────────────────────────
// Unit tests
// ─────────────────────────────────────────────────────────
