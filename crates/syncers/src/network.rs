//! UniFi access points/switches, DNS topology (AdGuard/Unbound/Cloudflare),
//! Caddy reverse proxies, and OPNsense DHCP leases. Cross-source
//! linking that spans more than one syncer's own nodes (ReverseProxy target
//! resolution, CNAME chains, DNS->Ingress) belongs to the linker crate, not
//! here — this module only writes the nodes and edges a single source knows
//! about on its own.

use serde_json::{json, Value};
use source_clients::ToolClient;
use tracing::info;
use util::config::{dhcp_network_map, manufacturer_device_type, DNS_NOISE_PATTERNS};

use crate::Result;

fn unifi_label(device_type: &str) -> &'static str {
    let t = device_type.to_lowercase();
    if t.contains("uap") || t.contains("ap") {
        "AccessPoint"
    } else if t.contains("usw") || t.contains("sw") {
        "Switch"
    } else {
        "NetworkDevice"
    }
}

pub async fn sync_unifi_devices(graph: &graph_store::GraphStore, mcp: &ToolClient) -> Result<i64> {
    info!("syncing unifi devices");
    let response = mcp.call_tool("infrastructure", "unifi_list_devices", json!({})).await;
    let devices = source_clients::extract_list(&response, &["devices", "result"]);
    if devices.is_empty() {
        info!("no unifi devices returned, skipping");
        return Ok(0);
    }

    let mut count = 0i64;
    for device in &devices {
        let Some(mac) = device.get("mac").and_then(Value::as_str) else { continue };
        let device_type = device.get("type").and_then(Value::as_str).unwrap_or("");
        let label = unifi_label(device_type);
        let name = device.get("name").and_then(Value::as_str).unwrap_or(mac);
        let ip = device.get("ip").and_then(Value::as_str).unwrap_or("");
        let model = device.get("model").and_then(Value::as_str).unwrap_or("");
        let state = device.get("state").and_then(Value::as_i64).unwrap_or(0);
        let status = if state == 1 { "online" } else { "offline" };

        graph
        .write(
            &format!(
                "MERGE (d:{label} {{mac: $mac}})
                SET d.name = $name,
                d.ip = $ip,
                d.model = $model,
                d.status = $status,
                d.last_seen = datetime(),
                d.source = 'unifi',
                d._sync_status = 'active'
                WITH d
                MATCH (n:Network {{name: 'prod'}})
                MERGE (d)-[:CONNECTED_TO]->(n)"
            ),
            vec![
                ("mac", json!(mac)),
                ("name", json!(name)),
                ("ip", json!(ip)),
                ("model", json!(model)),
                ("status", json!(status)),
            ],
        )
        .await?;
        count += 1;
    }

    let clients_response = mcp.call_tool("infrastructure", "unifi_list_clients", json!({})).await;
    let clients = source_clients::extract_list(&clients_response, &["clients", "result"]);
    for client in &clients {
        let Some(mac) = client.get("mac").and_then(Value::as_str) else { continue };
        let Some(ap_mac) = client.get("ap_mac").and_then(Value::as_str) else { continue };
        let signal = client.get("signal").and_then(Value::as_i64).unwrap_or(0);
        let channel = client.get("channel").and_then(Value::as_i64).unwrap_or(0);

        graph
        .write(
            "MATCH (ap:AccessPoint {mac: $ap_mac})
            MATCH (d) WHERE d.mac = $mac AND NOT d:AccessPoint
            MERGE (d)-[r:CONNECTED_VIA]->(ap)
            SET r.signal = $signal, r.channel = $channel",
            vec![
                ("ap_mac", json!(ap_mac)),
                ("mac", json!(mac)),
                ("signal", json!(signal)),
                ("channel", json!(channel)),
            ],
        )
        .await?;
    }

    info!(count, clients = clients.len(), "unifi sync complete");
    Ok(count)
}

fn is_dns_noise(name: &str) -> bool {
    let lower = name.to_lowercase();
    DNS_NOISE_PATTERNS.iter().any(|p| lower.contains(p))
}

async fn sync_dns_source(
    graph: &graph_store::GraphStore,
    mcp: &ToolClient,
    tool: &str,
    record_type: &str,
) -> Result<i64> {
    let response = mcp.call_tool("infrastructure", tool, json!({})).await;
    let records = source_clients::extract_list(&response, &["records", "result"]);
    if records.is_empty() {
        return Ok(0);
    }

    let mut count = 0i64;
    for record in &records {
        let Some(domain) = record.get("domain").or_else(|| record.get("name")).and_then(Value::as_str) else {
            continue;
        };
        if is_dns_noise(domain) {
            continue;
        }
        let answer = record.get("answer").or_else(|| record.get("target")).and_then(Value::as_str).unwrap_or("");

        graph
        .write(
            "MERGE (r:DNSRecord {domain: $domain})
            SET r.answer = $answer,
            r.record_type = $record_type,
            r.last_seen = datetime(),
            r.source = 'internal_dns',
            r._sync_status = 'active'",
            vec![
                ("domain", json!(domain)),
                ("answer", json!(answer)),
                ("record_type", json!(record_type)),
            ],
        )
        .await?;
        count += 1;

        if answer.chars().next().map(|c| c.is_ascii_digit()).unwrap_or(false) {
            graph
            .write(
                "MATCH (r:DNSRecord {domain: $domain})
                MATCH (h:Host {ip: $answer})
                MERGE (r)-[:RESOLVES_TO]->(h)",
                vec![("domain", json!(domain)), ("answer", json!(answer))],
            )
            .await?;
        } else {
            let subdomain = domain.split('.').next().unwrap_or("");
            if subdomain.len() > 3 {
                graph
                .write(
                    "MATCH (r:DNSRecord {domain: $domain})
                    MATCH (s:Service) WHERE s.name = $subdomain
                    MERGE (r)-[:RESOLVES_TO]->(s)",
                    vec![("domain", json!(domain)), ("subdomain", json!(subdomain))],
                )
                .await?;
            }
        }
    }
    Ok(count)
}

pub async fn sync_dns_topology(graph: &graph_store::GraphStore, mcp: &ToolClient) -> Result<i64> {
    info!("syncing dns topology");
    let rewrites = sync_dns_source(graph, mcp, "adguard_list_rewrites", "rewrite").await.unwrap_or(0);
    let overrides = sync_dns_source(graph, mcp, "unbound_list_overrides", "override").await.unwrap_or(0);
    let total = rewrites + overrides;
    info!(rewrites, overrides, "dns topology sync complete");
    Ok(total)
}

pub async fn sync_caddy_proxies(graph: &graph_store::GraphStore, mcp: &ToolClient) -> Result<i64> {
    info!("syncing caddy reverse proxies");
    let routes_response = mcp.call_tool("infrastructure", "caddy_list_routes", json!({})).await;
    let routes = source_clients::extract_list(&routes_response, &["routes", "result"]);
    let handles_response = mcp.call_tool("infrastructure", "caddy_list_handles", json!({})).await;
    let handles = source_clients::extract_list(&handles_response, &["handles", "result"]);

    if routes.is_empty() {
        info!("no caddy routes returned, skipping");
        return Ok(0);
    }

    let mut count = 0i64;
    for route in &routes {
        let Some(domain) = route.get("domain").or_else(|| route.get("host")).and_then(Value::as_str) else {
            continue;
        };
        let Some(handle_id) = route.get("reverse").and_then(Value::as_str) else { continue };
        let Some(handle) = handles.iter().find(|h| h.get("uuid").and_then(Value::as_str) == Some(handle_id)) else {
            continue;
        };

        let upstream_ip = handle.get("upstream_ip").and_then(Value::as_str).unwrap_or("");
        let upstream_port = handle.get("upstream_port").and_then(Value::as_i64).unwrap_or(0);
        let upstream_tls = handle.get("upstream_tls").and_then(Value::as_bool).unwrap_or(false);
        if upstream_ip.is_empty() {
            continue;
        }

        graph
        .write(
            "MERGE (p:ReverseProxy {domain: $domain})
            SET p.upstream_ip = $upstream_ip,
            p.upstream_port = $upstream_port,
            p.upstream_tls = $upstream_tls,
            p.last_seen = datetime(),
            p.source = 'caddy',
            p._sync_status = 'active'
            WITH p
            MATCH (d:DNSRecord {domain: $domain})
            MERGE (d)-[:ROUTES_THROUGH]->(p)",
            vec![
                ("domain", json!(domain)),
                ("upstream_ip", json!(upstream_ip)),
                ("upstream_port", json!(upstream_port)),
                ("upstream_tls", json!(upstream_tls)),
            ],
        )
        .await?;
        count += 1;
    }

    info!(count, "caddy proxy sync complete (target linking deferred to the cross-source linker)");
    Ok(count)
}

pub async fn sync_dhcp_devices(graph: &graph_store::GraphStore, mcp: &ToolClient) -> Result<i64> {
    info!("syncing opnsense dhcp leases");
    let response = mcp.call_tool("infrastructure", "opnsense_list_leases", json!({})).await;
    let leases = source_clients::extract_list(&response, &["leases", "result"]);
    if leases.is_empty() {
        info!("no dhcp leases returned, skipping");
        return Ok(0);
    }

    let manufacturer_map = manufacturer_device_type();
    let network_map = dhcp_network_map();
    let mut count = 0i64;

    for lease in &leases {
        let Some(ip) = lease.get("address").or_else(|| lease.get("ip")).and_then(Value::as_str) else { continue };
        let Some(mac) = lease.get("mac").and_then(Value::as_str) else { continue };
        let manufacturer = lease.get("manufacturer").and_then(Value::as_str).unwrap_or("");
        let iface_descr = lease.get("if_descr").or_else(|| lease.get("interface")).and_then(Value::as_str).unwrap_or("");
        let hostname = lease.get("hostname").and_then(Value::as_str).unwrap_or("");

        // Phase (a): enrich an existing Host at this IP, if any.
        graph
        .write(
            "MATCH (h:Host {ip: $ip})
            SET h.mac = $mac, h.manufacturer = $manufacturer",
            vec![
                ("ip", json!(ip)),
                ("mac", json!(mac)),
                ("manufacturer", json!(manufacturer)),
            ],
        )
        .await?;

        // Phase (b): always create the Device node regardless of whether a
        // Host also exists at this IP, then link it to both its Network and
        // (if present) the Host sharing its IP.
        let manufacturer_lower = manufacturer.to_lowercase();
        let device_type = manufacturer_map
        .iter()
        .find(|(vendor, _)| manufacturer_lower.contains(*vendor))
        .map(|(_, kind)| *kind)
        .unwrap_or("unknown");
        let network_name = network_map.get(iface_descr).copied().unwrap_or("prod");

        graph
        .write(
            "MERGE (d:Device {mac: $mac})
            SET d.ip = $ip,
            d.hostname = $hostname,
            d.manufacturer = $manufacturer,
            d.device_type = $device_type,
            d.last_seen = datetime(),
            d.source = 'opnsense_dhcp',
            d._sync_status = 'active'
            WITH d
            MATCH (n:Network {name: $network_name})
            MERGE (d)-[:ON_NETWORK]->(n)
            WITH d
            OPTIONAL MATCH (h:Host {ip: $ip})
            FOREACH (_ IN CASE WHEN h IS NULL THEN [] ELSE [1] END |
                MERGE (d)-[:NETWORK_INTERFACE_FOR]->(h)
            )",
            vec![
                ("mac", json!(mac)),
                ("ip", json!(ip)),
                ("hostname", json!(hostname)),
                ("manufacturer", json!(manufacturer)),
                ("device_type", json!(device_type)),
                ("network_name", json!(network_name)),
            ],
        )
        .await?;
        count += 1;
    }

    info!(count, leases = leases.len(), "dhcp sync complete");
    Ok(count)
}

pub async fn sync_cloudflare_dns(graph: &graph_store::GraphStore, mcp: &ToolClient) -> Result<i64> {
    info!("syncing cloudflare dns");
    let zones_response = mcp.call_tool("infrastructure", "cloudflare_list_zones", json!({})).await;
    let zones = source_clients::extract_list(&zones_response, &["zones", "result"]);
    if zones.is_empty() {
        info!("no cloudflare zones returned (auth likely broken), skipping");
        return Ok(0);
    }

    let tunnels_response = mcp.call_tool("infrastructure", "cloudflare_list_tunnels", json!({})).await;
    let tunnels = source_clients::extract_list(&tunnels_response, &["tunnels", "result"]);
    for tunnel in &tunnels {
        let Some(tunnel_id) = tunnel.get("id").and_then(Value::as_str) else { continue };
        let name = tunnel.get("name").and_then(Value::as_str).unwrap_or(tunnel_id);
        graph
        .write(
            "MERGE (t:CloudflareTunnel {tunnel_id: $tunnel_id})
            SET t.name = $name,
            t.last_seen = datetime(),
            t.source = 'cloudflare',
            t._sync_status = 'active'",
            vec![("tunnel_id", json!(tunnel_id)), ("name", json!(name))],
        )
        .await?;
    }

    let mut count = 0i64;
    for zone in &zones {
        let Some(zone_id) = zone.get("id").and_then(Value::as_str) else { continue };
        let records_response = mcp
        .call_tool("infrastructure", "cloudflare_list_dns_records", json!({"zone_id": zone_id}))
        .await;
        let records = source_clients::extract_list(&records_response, &["records", "result"]);

        for record in &records {
            let Some(name) = record.get("name").and_then(Value::as_str) else { continue };
            if is_dns_noise(name) {
                continue;
            }
            let record_type = record.get("type").and_then(Value::as_str).unwrap_or("");
            let content = record.get("content").and_then(Value::as_str).unwrap_or("");
            let proxied = record.get("proxied").and_then(Value::as_bool).unwrap_or(false);

            graph
            .write(
                "MERGE (r:DNSRecord {domain: $name})
                SET r.answer = $content,
                r.record_type = $record_type,
                r.proxied = $proxied,
                r.last_seen = datetime(),
                r.source = 'cloudflare',
                r._sync_status = 'active'",
                vec![
                    ("name", json!(name)),
                    ("content", json!(content)),
                    ("record_type", json!(record_type)),
                    ("proxied", json!(proxied)),
                ],
            )
            .await?;
            count += 1;
        }
    }

    // CNAME->tunnel, CNAME chain, and DNS->Ingress linking all reach across
    // to nodes other syncers own and so belong to the cross-source linker,
    // not here — see linker::dns.
    info!(count, zones = zones.len(), tunnels = tunnels.len(), "cloudflare dns sync complete");
    Ok(count)
}
