use std::collections::HashMap;

use serde_json::Value;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct ProxmoxHost {
    pub url: String,
    pub token_id: String,
    pub token_secret: String,
}

/// Multi-host Proxmox API client. Each standalone host (the homelab runs
/// unclustered PVE hosts) has its own token. TLS verification is disabled —
/// homelab hosts carry self-signed certificates.
pub struct ProxmoxClient {
    http: reqwest::Client,
    hosts: HashMap<String, ProxmoxHost>,
}

impl ProxmoxClient {
    pub fn new(hosts: HashMap<String, ProxmoxHost>) -> Self {
        let mut ready = HashMap::new();
        for (name, host) in hosts {
            if host.url.is_empty() || host.token_id.is_empty() || host.token_secret.is_empty() {
                warn!(host = %name, "proxmox host has incomplete credentials, skipping");
                continue;
            }
            info!(host = %name, url = %host.url, "proxmox host ready");
            ready.insert(name, host);
        }
        let http = reqwest::Client::builder()
            .danger_accept_invalid_certs(true)
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("reqwest client build");
        ProxmoxClient { http, hosts: ready }
    }

    pub fn hosts(&self) -> Vec<String> {
        self.hosts.keys().cloned().collect()
    }

    async fn get(&self, host: &str, path: &str) -> Value {
        let Some(cfg) = self.hosts.get(host) else { return Value::Null };
        let url = format!("{}/api2/json{}", cfg.url.trim_end_matches('/'), path);
        let auth = format!("PVEAPIToken={}={}", cfg.token_id, cfg.token_secret);
        let result = self
            .http
            .get(&url)
            .header("Authorization", auth)
            .send()
            .await;
        match result {
            Ok(resp) => match resp.error_for_status() {
                Ok(resp) => match resp.json::<Value>().await {
                    Ok(body) => body.get("data").cloned().unwrap_or(Value::Null),
                    Err(err) => {
                        warn!(host = %host, path = %path, error = %err, "proxmox response parse failed");
                        Value::Null
                    }
                },
                Err(err) => {
                    warn!(host = %host, path = %path, error = %err, "proxmox request returned error status");
                    Value::Null
                }
            },
            Err(err) => {
                warn!(host = %host, path = %path, error = %err, "proxmox request failed");
                Value::Null
            }
        }
    }

    pub async fn list_nodes(&self, host: &str) -> Vec<Value> {
        as_list(self.get(host, "/nodes").await)
    }

    pub async fn list_vms(&self, host: &str, node: &str) -> Vec<Value> {
        as_list(self.get(host, &format!("/nodes/{node}/qemu")).await)
    }

    pub async fn list_containers(&self, host: &str, node: &str) -> Vec<Value> {
        as_list(self.get(host, &format!("/nodes/{node}/lxc")).await)
    }

    pub async fn vm_network_interfaces(&self, host: &str, node: &str, vmid: i64) -> Vec<Value> {
        let data = self
            .get(host, &format!("/nodes/{node}/qemu/{vmid}/agent/network-get-interfaces"))
            .await;
        match data {
            Value::Object(ref map) => map.get("result").cloned().map(as_list).unwrap_or_default(),
            Value::Array(_) => as_list(data),
            _ => Vec::new(),
        }
    }

    pub async fn container_config(&self, host: &str, node: &str, vmid: i64) -> Value {
        self.get(host, &format!("/nodes/{node}/lxc/{vmid}/config")).await
    }
}

fn as_list(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        Value::Null => Vec::new(),
        other => vec![other],
    }
}

/// Extract the first non-loopback IPv4 address from QEMU guest-agent
/// `network-get-interfaces` output.
pub fn extract_vm_ip(interfaces: &[Value]) -> String {
    for iface in interfaces {
        let name = iface.get("name").and_then(Value::as_str).unwrap_or("");
        if name == "lo" || name == "lo0" {
            continue;
        }
        let Some(addrs) = iface.get("ip-addresses").and_then(Value::as_array) else { continue };
        for addr in addrs {
            if addr.get("ip-address-type").and_then(Value::as_str) == Some("ipv4") {
                if let Some(ip) = addr.get("ip-address").and_then(Value::as_str) {
                    if !ip.is_empty() && !ip.starts_with("127.") {
                        return ip.to_string();
                    }
                }
            }
        }
    }
    String::new()
}

/// Extract an IPv4 address from an LXC container config's `netN=` fields
/// (format: `name=eth0,bridge=vmbr0,ip=10.10.0.100/24,...`).
pub fn extract_lxc_ip(config: &Value) -> String {
    for key in ["net0", "net1", "net2"] {
        let Some(net_str) = config.get(key).and_then(Value::as_str) else { continue };
        if net_str.is_empty() {
            continue;
        }
        if let Some(pos) = net_str.find("ip=") {
            let rest = &net_str[pos + 3..];
            let ip: String = rest
                .chars()
                .take_while(|c| c.is_ascii_digit() || *c == '.')
                .collect();
            if ip.split('.').count() == 4 {
                return ip;
            }
        }
    }
    String::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_first_non_loopback_ipv4() {
        let interfaces = vec![
            json!({"name": "lo", "ip-addresses": [{"ip-address-type": "ipv4", "ip-address": "127.0.0.1"}]}),
            json!({"name": "eth0", "ip-addresses": [
                {"ip-address-type": "ipv6", "ip-address": "fe80::1"},
                {"ip-address-type": "ipv4", "ip-address": "10.10.0.50"},
            ]}),
        ];
        assert_eq!(extract_vm_ip(&interfaces), "10.10.0.50");
    }

    #[test]
    fn extracts_lxc_ip_from_net_field() {
        let cfg = json!({"net0": "name=eth0,bridge=vmbr0,ip=10.10.0.100/24,gw=10.10.0.1"});
        assert_eq!(extract_lxc_ip(&cfg), "10.10.0.100");
    }

    #[test]
    fn missing_ip_yields_empty_string() {
        let cfg = json!({"net0": "name=eth0,bridge=vmbr0,ip=dhcp"});
        assert_eq!(extract_lxc_ip(&cfg), "");
    }
}
