use std::collections::HashMap;

use serde_json::Value;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct TrueNasInstance {
    pub url: String,
    pub api_key: String,
}

/// Multi-instance TrueNAS SCALE API client, Bearer-token auth per instance.
pub struct TrueNasClient {
    http: reqwest::Client,
    instances: HashMap<String, TrueNasInstance>,
}

impl TrueNasClient {
    pub fn new(instances: HashMap<String, TrueNasInstance>) -> Self {
        let mut ready = HashMap::new();
        for (name, instance) in instances {
            if instance.url.is_empty() || instance.api_key.is_empty() {
                warn!(instance = %name, "truenas instance has incomplete credentials, skipping");
                continue;
            }
            info!(instance = %name, url = %instance.url, "truenas client ready");
            ready.insert(name, instance);
        }
        let http = reqwest::Client::builder()
            .danger_accept_invalid_certs(true)
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("reqwest client build");
        TrueNasClient { http, instances: ready }
    }

    pub fn instances(&self) -> Vec<String> {
        self.instances.keys().cloned().collect()
    }

    async fn get(&self, instance: &str, path: &str) -> Value {
        let Some(cfg) = self.instances.get(instance) else { return Value::Null };
        let url = format!("{}/api/v2.0{}", cfg.url.trim_end_matches('/'), path);
        let result = self
            .http
            .get(&url)
            .bearer_auth(&cfg.api_key)
            .send()
            .await;
        match result {
            Ok(resp) => match resp.error_for_status() {
                Ok(resp) => resp.json::<Value>().await.unwrap_or(Value::Null),
                Err(err) => {
                    warn!(instance = %instance, path = %path, error = %err, "truenas request returned error status");
                    Value::Null
                }
            },
            Err(err) => {
                warn!(instance = %instance, path = %path, error = %err, "truenas request failed");
                Value::Null
            }
        }
    }

    pub async fn list_pools(&self, instance: &str) -> Vec<Value> {
        as_list(self.get(instance, "/pool").await)
    }

    pub async fn list_datasets(&self, instance: &str) -> Vec<Value> {
        as_list(self.get(instance, "/pool/dataset").await)
    }

    pub async fn list_nfs_shares(&self, instance: &str) -> Vec<Value> {
        as_list(self.get(instance, "/sharing/nfs").await)
    }

    pub async fn list_smb_shares(&self, instance: &str) -> Vec<Value> {
        as_list(self.get(instance, "/sharing/smb").await)
    }

    pub async fn list_alerts(&self, instance: &str) -> Vec<Value> {
        as_list(self.get(instance, "/alert/list").await)
    }

    pub async fn list_apps(&self, instance: &str) -> Vec<Value> {
        as_list(self.get(instance, "/app").await)
    }
}

fn as_list(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        _ => Vec::new(),
    }
}

/// TrueNAS numeric attributes sometimes arrive as `{parsed, rawvalue}`
/// rather than a raw number; unwrap whichever shape shows up.
pub fn unwrap_nested_numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::Object(map) => map
            .get("parsed")
            .and_then(Value::as_f64)
            .or_else(|| map.get("rawvalue").and_then(Value::as_str).and_then(|s| s.parse().ok())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unwraps_plain_number() {
        assert_eq!(unwrap_nested_numeric(&json!(42.0)), Some(42.0));
    }

    #[test]
    fn unwraps_parsed_rawvalue_shape() {
        assert_eq!(unwrap_nested_numeric(&json!({"parsed": 12.5, "rawvalue": "12.5"})), Some(12.5));
    }

    #[test]
    fn unknown_shape_yields_none() {
        assert_eq!(unwrap_nested_numeric(&json!("garbage")), None);
    }
}
