use std::collections::HashMap;

use serde_json::{json, Value};
use tracing::warn;

/// JSON-RPC/SSE MCP tool caller plus plain REST GET. Every failure — network,
/// HTTP status, JSON parse — is swallowed and surfaces as an empty `Value`:
/// syncers rely on the empty-result signal, never on an exception.
pub struct ToolClient {
    http: reqwest::Client,
    servers: HashMap<String, String>,
}

impl ToolClient {
    pub fn new(servers: HashMap<String, String>) -> Self {
        let http = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .build()
        .expect("reqwest client build");
        ToolClient { http, servers }
    }

    /// Call an MCP tool via JSON-RPC `tools/call`. Transparently unwraps
    /// both a direct JSON response and an `event-stream` framing, and the
    /// double-encoded `result.content[0].text` shape.
    pub async fn call_tool(&self, server: &str, tool_name: &str, arguments: Value) -> Value {
        let Some(base) = self.servers.get(server) else {
            warn!(server = %server, "unknown MCP server");
            return Value::Object(Default::default());
        };
        let url = format!("{}/mcp", base.trim_end_matches('/'));
        let body = json!({
                "jsonrpc": "2.0",
                "id": 1,
                "method": "tools/call",
                "params": {"name": tool_name, "arguments": arguments},
        });

        let response = self
        .http
        .post(&url)
        .header("Accept", "application/json, text/event-stream")
        .json(&body)
        .send()
        .await;

        let raw = match response {
            Ok(resp) => match resp.text().await {
                Ok(text) => text,
                Err(err) => {
                    warn!(server = %server, tool = %tool_name, error = %err, "MCP response body read failed");
                    return Value::Object(Default::default());
                }
            },
            Err(err) => {
                warn!(server = %server, tool = %tool_name, error = %err, "MCP call failed");
                return Value::Object(Default::default());
            }
        };

        unwrap_mcp_envelope(&raw).unwrap_or_else(|| {
                warn!(server = %server, tool = %tool_name, "MCP response had no usable payload");
                Value::Object(Default::default())
        })
    }

    /// Plain `GET` against a fully-qualified base URL + path, returning the
    /// parsed JSON body or an empty object on any failure.
    pub async fn call_rest(&self, base_url: &str, path: &str) -> Value {
        let url = format!("{base_url}{path}");
        let response = self.http.get(&url).header("Accept", "application/json").send().await;
        match response {
            Ok(resp) => match resp.json::<Value>().await {
                Ok(value) => value,
                Err(err) => {
                    warn!(url = %url, error = %err, "REST response parse failed");
                    Value::Object(Default::default())
                }
            },
            Err(err) => {
                warn!(url = %url, error = %err, "REST call failed");
                Value::Object(Default::default())
            }
        }
    }
}

/// One `data: {json}` SSE frame, or a bare JSON body. Returns `None` only
/// when nothing in the payload parses at all.
fn unwrap_mcp_envelope(raw: &str) -> Option<Value> {
    for line in raw.lines() {
        if let Some(data) = line.strip_prefix("data: ") {
            if let Ok(envelope) = serde_json::from_str::<Value>(data) {
                return Some(unwrap_result_content(envelope));
            }
        }
    }
    serde_json::from_str::<Value>(raw).map(unwrap_result_content).ok()
}

/// `result.content[0].text` may itself be a JSON string to re-parse, or a
/// literal string to wrap; otherwise fall through to `result` itself.
fn unwrap_result_content(envelope: Value) -> Value {
    let Some(result) = envelope.get("result") else {
        return Value::Object(Default::default());
    };
    let Some(content) = result.get("content").and_then(Value::as_array) else {
        return result.clone();
    };
    let Some(text) = content.first().and_then(|c| c.get("text")).and_then(Value::as_str) else {
        return result.clone();
    };
    let trimmed = text.trim_start();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        serde_json::from_str(text).unwrap_or_else(|_| json!({"text": text}))
    } else {
        json!({"text": text})
    }
}

/// Extract a list from an MCP tool response regardless of which top-level
/// key it was nested under.
pub fn extract_list(response: &Value, keys: &[&str]) -> Vec<Value> {
    match response {
        Value::Array(items) => items.clone(),
        Value::Object(map) => {
            if let Some(Value::Array(items)) = map.get("result") {
                return items.clone();
            }
            for key in keys {
                if let Some(Value::Array(items)) = map.get(*key) {
                    return items.clone();
                }
            }
            Vec::new()
        }
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unwraps_sse_framed_json_text() {
        let raw = "event: message\ndata: {\"result\":{\"content\":[{\"text\":\"{\\\"alerts\\\":[1,2]}\"}]}}\n";
        let value = unwrap_mcp_envelope(raw).unwrap();
        assert_eq!(value, json!({"alerts": [1, 2]}));
    }

    #[test]
    fn unwraps_plain_json_literal_text() {
        let raw = r#"{"result":{"content":[{"text":"pong"}]}}"#;
        let value = unwrap_mcp_envelope(raw).unwrap();
        assert_eq!(value, json!({"text": "pong"}));
    }

    #[test]
    fn garbage_yields_none() {
        assert!(unwrap_mcp_envelope("not json at all").is_none());
    }

    #[test]
    fn extract_list_finds_named_key() {
        let response = json!({"alerts": [{"id": 1}]});
        assert_eq!(extract_list(&response, &["alerts"]), vec![json!({"id": 1})]);
    }
}
