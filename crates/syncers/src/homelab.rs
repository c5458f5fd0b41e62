//! Home Assistant areas/entities, Tasmota smart devices, and ArgoCD
//! applications. HA and Tasmota both arrive over the `home` MCP
//! server; ArgoCD over `infrastructure`.

use serde_json::{json, Value};
use source_clients::ToolClient;
use tracing::info;
use util::config::{HA_SYNC_DOMAINS, SENSOR_DEVICE_CLASSES};

use crate::Result;

pub async fn sync_ha_areas(graph: &graph_store::GraphStore, mcp: &ToolClient) -> Result<i64> {
    info!("syncing home assistant areas");
    let response = mcp.call_tool("home", "list_entities", json!({})).await;
    let entities = source_clients::extract_list(&response, &["entities", "result"]);
    if entities.is_empty() {
        info!("home-mcp unavailable or empty, skipping area sync");
        return Ok(0);
    }

    let mut count = 0i64;
    for entity in &entities {
        let attributes = entity.get("attributes").cloned().unwrap_or_default();
        let area = entity
        .get("area")
        .or_else(|| entity.get("area_id"))
        .and_then(Value::as_str)
        .unwrap_or("");
        let ip = attributes
        .get("ip")
        .or_else(|| attributes.get("ip_address"))
        .and_then(Value::as_str)
        .unwrap_or("");
        if area.is_empty() || ip.is_empty() {
            continue;
        }

        let rows = graph
        .query(
            "MATCH (h:Host {ip: $ip})
            SET h.location = $area
            WITH h
            MERGE (loc:Location {name: $area})
            MERGE (h)-[:LOCATED_IN]->(loc)
            RETURN h.ip AS ip",
            vec![("ip", json!(ip)), ("area", json!(area))],
        )
        .await?;
        if !rows.is_empty() {
            count += 1;
        }
    }

    info!(count, "home assistant area sync complete");
    Ok(count)
}

pub async fn sync_ha_entities(graph: &graph_store::GraphStore, mcp: &ToolClient) -> Result<i64> {
    info!("syncing home assistant entities");
    let response = mcp.call_tool("home", "list_entities", json!({})).await;
    let entities = source_clients::extract_list(&response, &["entities", "result"]);
    if entities.is_empty() {
        info!("home-mcp unavailable or empty, skipping entity sync");
        return Ok(0);
    }

    let mut rows = Vec::new();
    for entity in &entities {
        let Some(entity_id) = entity.get("entity_id").and_then(Value::as_str) else { continue };
        let domain = entity_id.split('.').next().unwrap_or("");
        if !HA_SYNC_DOMAINS.contains(&domain) {
            continue;
        }

        let attributes = entity.get("attributes").cloned().unwrap_or_default();
        if domain == "sensor" {
            let device_class = attributes.get("device_class").and_then(Value::as_str).unwrap_or("");
            if !SENSOR_DEVICE_CLASSES.contains(&device_class) {
                continue;
            }
        }

        let friendly_name = attributes.get("friendly_name").and_then(Value::as_str).unwrap_or(entity_id);
        let state = entity.get("state").and_then(Value::as_str).unwrap_or("unknown");

        rows.push(json!({
                    "entity_id": entity_id,
                    "domain": domain,
                    "friendly_name": friendly_name,
                    "state": state,
                    "device_class": attributes.get("device_class").and_then(Value::as_str).unwrap_or(""),
                    "unit": attributes.get("unit_of_measurement").and_then(Value::as_str).unwrap_or(""),
        }));
    }

    if rows.is_empty() {
        info!("no ha entities matched the sync domain allowlist");
        return Ok(0);
    }

    graph
    .batch_merge(
        "MERGE (e:HAEntity {entity_id: row.entity_id})
        SET e.domain = row.domain,
        e.friendly_name = row.friendly_name,
        e.state = row.state,
        e.device_class = row.device_class,
        e.unit = row.unit,
        e.source = 'home_assistant',
        e.last_seen = datetime(),
        e._sync_status = 'active'",
        rows.clone(),
    )
    .await?;

    graph
    .write(
        "MATCH (s:Service)
        WHERE s.name = 'home-assistant' OR s.name = 'homeassistant'
        WITH s LIMIT 1
        MATCH (e:HAEntity)
        WHERE e._sync_status = 'active'
        MERGE (e)-[:CONTROLLED_BY]->(s)",
        vec![],
    )
    .await?;

    info!(count = rows.len(), "home assistant entity sync complete");
    Ok(rows.len() as i64)
}

fn nested_str<'a>(status: &'a Value, key: &str) -> &'a str {
    status.get(key).and_then(Value::as_str).unwrap_or("")
}

pub async fn sync_tasmota_devices(graph: &graph_store::GraphStore, mcp: &ToolClient) -> Result<i64> {
    info!("syncing tasmota devices");
    let response = mcp.call_tool("home", "tasmota_status_all", json!({})).await;
    let devices = source_clients::extract_list(&response, &["devices", "result"]);
    if devices.is_empty() {
        info!("home-mcp unavailable or empty, skipping tasmota sync");
        return Ok(0);
    }

    let mut rows = Vec::new();
    for device in &devices {
        let Some(ip) = device.get("ip").and_then(Value::as_str) else { continue };

        let raw_status = device.get("status").cloned().unwrap_or_default();
        let status = raw_status.get("Status").or_else(|| device.get("Status")).cloned().unwrap_or_default();
        let status_prm = raw_status.get("StatusPRM").or_else(|| device.get("StatusPRM")).cloned().unwrap_or_default();
        let status_fwr = raw_status.get("StatusFWR").or_else(|| device.get("StatusFWR")).cloned().unwrap_or_default();
        let status_net = raw_status.get("StatusNET").or_else(|| device.get("StatusNET")).cloned().unwrap_or_default();

        let mut name = device.get("name").and_then(Value::as_str).unwrap_or("").to_string();
        if name.is_empty() {
            name = nested_str(&status, "DeviceName").to_string();
        }
        if name.is_empty() {
            if let Some(friendly) = status.get("FriendlyName") {
                name = match friendly {
                    Value::Array(list) => list.first().and_then(Value::as_str).unwrap_or("").to_string(),
                    Value::String(s) => s.clone(),
                    _ => String::new(),
                };
            }
        }
        if name.is_empty() {
            name = format!("tasmota-{ip}");
        }

        let mac = {
            let raw = nested_str(&status_net, "Mac");
            let raw = if raw.is_empty() { device.get("mac").and_then(Value::as_str).unwrap_or("") } else { raw };
            raw.to_lowercase()
        };

        let firmware = {
            let v = nested_str(&status_fwr, "Version");
            if v.is_empty() { device.get("firmware").and_then(Value::as_str).unwrap_or("") } else { v }
        };
        let hardware = {
            let v = nested_str(&status_fwr, "Hardware");
            if v.is_empty() { device.get("hardware").and_then(Value::as_str).unwrap_or("") } else { v }
        };
        let uptime = {
            let v = status_prm.get("Uptime").and_then(Value::as_str).unwrap_or("");
            if v.is_empty() { device.get("uptime").and_then(Value::as_str).unwrap_or("") } else { v }
        };
        let power = device.get("power").or_else(|| status.get("Power")).map(|v| v.to_string()).unwrap_or_default();

        rows.push(json!({
                    "ip": ip,
                    "name": name,
                    "mac": mac,
                    "firmware": firmware,
                    "hardware": hardware,
                    "uptime": uptime,
                    "power": power,
        }));
    }

    if rows.is_empty() {
        info!("no valid tasmota devices after parsing");
        return Ok(0);
    }

    graph
    .batch_merge(
        "MERGE (t:TasmotaDevice {ip: row.ip})
        SET t.name = row.name,
        t.mac = row.mac,
        t.firmware = row.firmware,
        t.hardware = row.hardware,
        t.uptime = row.uptime,
        t.power = row.power,
        t.source = 'tasmota',
        t.last_seen = datetime(),
        t._sync_status = 'active'",
        rows.clone(),
    )
    .await?;

    graph
    .write(
        "MATCH (t:TasmotaDevice)
        WHERE t._sync_status = 'active'
        MATCH (n:Network {name: 'prod'})
        MERGE (t)-[:ON_NETWORK]->(n)",
        vec![],
    )
    .await?;

    graph
    .write(
        "MATCH (t:TasmotaDevice)
        WHERE t._sync_status = 'active' AND t.mac <> ''
        MATCH (e:HAEntity)
        WHERE e.entity_id CONTAINS replace(t.mac, ':', '')
        OR e.entity_id CONTAINS replace(t.mac, ':', '_')
        MERGE (t)-[:EXPOSES]->(e)",
        vec![],
    )
    .await?;

    graph
    .write(
        "MATCH (t:TasmotaDevice)
        WHERE t._sync_status = 'active'
        AND NOT (t)-[:EXPOSES]->()
        AND t.name <> ''
        WITH t, toLower(replace(replace(t.name, ' ', '_'), '-', '_')) AS norm_name
        MATCH (e:HAEntity)
        WHERE toLower(e.entity_id) CONTAINS norm_name
        OR toLower(e.friendly_name) CONTAINS toLower(t.name)
        WITH t, e LIMIT 3
        MERGE (t)-[r:EXPOSES]->(e)
        SET r.confidence = 'low', r.match_type = 'name_fuzzy'",
        vec![],
    )
    .await?;

    info!(count = rows.len(), "tasmota device sync complete");
    Ok(rows.len() as i64)
}

fn app_status(health: &str, sync_status: &str) -> String {
    if health == "Healthy" && sync_status == "Synced" {
        "healthy".to_string()
    } else if health == "Degraded" {
        "degraded".to_string()
    } else if sync_status == "OutOfSync" {
        "out-of-sync".to_string()
    } else if health == "Missing" {
        "unhealthy".to_string()
    } else if health.is_empty() {
        "unknown".to_string()
    } else {
        health.to_lowercase()
    }
}

/// ArgoCD's well-known in-cluster API server address, used by the local
/// ("agentic") Argo instance for apps targeting its own cluster.
const IN_CLUSTER_API: &str = "https://kubernetes.default.svc";

/// `destination_server` is authoritative when present (ArgoCD always sets
/// it); path/repo substrings are only a fallback for apps synced from an
/// older manifest shape that omitted it.
fn target_cluster(destination_server: &str, path: &str, repo: &str) -> &'static str {
    if destination_server == IN_CLUSTER_API {
        return "agentic";
    }
    if destination_server.contains("monit") || path.contains("monit") || repo.contains("monit") {
        "monit"
    } else if destination_server.contains("agentic") || path.contains("agentic") || repo.contains("agentic") {
        "agentic"
    } else {
        "prod"
    }
}

/// The namespace an app deploys into, read off the tail of its sync path
/// (ArgoCD repos in this homelab are laid out `<cluster>/<namespace>/<app>`).
fn derived_namespace(path: &str) -> String {
    let segments: Vec<&str> = path.trim_end_matches('/').split('/').filter(|s| !s.is_empty()).collect();
    if segments.len() >= 2 {
        segments[segments.len() - 2].to_string()
    } else {
        String::new()
    }
}

const UMBRELLA_SUFFIXES: &[&str] = &["-apps", "-applications"];
const UMBRELLA_ALLOWLIST: &[&str] = &["root", "app-of-apps", "bootstrap"];

fn is_umbrella(name: &str) -> bool {
    UMBRELLA_SUFFIXES.iter().any(|suffix| name.ends_with(suffix)) || UMBRELLA_ALLOWLIST.contains(&name)
}

pub async fn sync_argocd_apps(graph: &graph_store::GraphStore, mcp: &ToolClient) -> Result<i64> {
    info!("syncing argocd applications");
    let response = mcp.call_tool("infrastructure", "argocd_get_applications", json!({})).await;
    let apps = source_clients::extract_list(&response, &["applications", "result"]);

    let mut rows = Vec::new();
    for app in &apps {
        let Some(name) = app.get("name").and_then(Value::as_str) else { continue };
        let project = app.get("project").and_then(Value::as_str).unwrap_or("default");
        let sync_status = app.get("sync_status").and_then(Value::as_str).unwrap_or("unknown");
        let health = app.get("health").and_then(Value::as_str).unwrap_or("unknown");
        let repo = app.get("repo").and_then(Value::as_str).unwrap_or("");
        let path = app.get("path").and_then(Value::as_str).unwrap_or("");
        let destination_server = app.get("destination_server").and_then(Value::as_str).unwrap_or("");

        rows.push(json!({
                    "name": name,
                    "project": project,
                    "sync_status": sync_status,
                    "health": health,
                    "repo": repo,
                    "path": path,
                    "target_cluster": target_cluster(destination_server, path, repo),
                    "derived_namespace": derived_namespace(path),
                    "is_umbrella": is_umbrella(name),
                    "status": app_status(health, sync_status),
        }));
    }

    if rows.is_empty() {
        info!("no argocd applications returned, skipping");
        return Ok(0);
    }
    let count = rows.len() as i64;

    // Service linking (5-strategy, confidence-scored) is the cross-source
    // linker's job — it runs once every syncer, including this one, has
    // finished, so Service/Deployment nodes from other clusters already exist.
    graph
    .batch_merge(
        "MERGE (a:ArgoApp {name: row.name})
        SET a.project = row.project,
        a.sync_status = row.sync_status,
        a.health = row.health,
        a.repo = row.repo,
        a.path = row.path,
        a.target_cluster = row.target_cluster,
        a.derived_namespace = row.derived_namespace,
        a.is_umbrella = row.is_umbrella,
        a.status = row.status,
        a.last_seen = datetime(),
        a.source = 'argocd',
        a._sync_status = 'active'",
        rows,
    )
    .await?;

    info!(count, "argocd sync complete");
    Ok(count)
}
