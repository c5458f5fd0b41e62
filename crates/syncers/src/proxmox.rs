//! Proxmox sync: walk every configured host's nodes, then each
//! node's QEMU VMs and LXC containers. IP extraction differs by guest type
//! — QEMU needs a live guest-agent call, LXC is parsed straight out of the
//! container's `netN=` config string.

use serde_json::{json, Value};
use source_clients::ProxmoxClient;
use tracing::info;

use crate::Result;

fn as_f64(value: &Value, default: f64) -> f64 {
    value.as_f64().unwrap_or(default)
}

fn as_i64(value: &Value, default: i64) -> i64 {
    value.as_i64().unwrap_or(default)
}

fn gb(bytes: f64) -> f64 {
    (bytes / 1024f64.powi(3) * 100.0).round() / 100.0
}

pub async fn sync_vms(graph: &graph_store::GraphStore, proxmox: &ProxmoxClient) -> Result<i64> {
    info!("syncing proxmox VMs and containers");
    let mut rows = Vec::new();

    for host in proxmox.hosts() {
        for node in proxmox.list_nodes(&host).await {
            let Some(node_name) = node.get("node").and_then(Value::as_str) else { continue };

            for vm in proxmox.list_vms(&host, node_name).await {
                let Some(vmid) = vm.get("vmid").and_then(Value::as_i64) else { continue };
                let status = vm.get("status").and_then(Value::as_str).unwrap_or("unknown");

                let ip = if status == "running" {
                    let interfaces = proxmox.vm_network_interfaces(&host, node_name, vmid).await;
                    source_clients::extract_vm_ip(&interfaces)
                } else {
                    String::new()
                };

                rows.push(build_row(&vm, vmid, node_name, "qemu", &ip));
            }

            for ct in proxmox.list_containers(&host, node_name).await {
                let Some(vmid) = ct.get("vmid").and_then(Value::as_i64) else { continue };
                let status = ct.get("status").and_then(Value::as_str).unwrap_or("unknown");

                let ip = if status == "running" {
                    let config = proxmox.container_config(&host, node_name, vmid).await;
                    source_clients::extract_lxc_ip(&config)
                } else {
                    String::new()
                };

                rows.push(build_row(&ct, vmid, node_name, "lxc", &ip));
            }
        }
    }

    if rows.is_empty() {
        info!("no proxmox guests returned");
        return Ok(0);
    }

    graph
    .batch_merge(
        "MERGE (v:VM {vmid: row.vmid})
        SET v.name = row.name,
        v.status = row.status,
        v.node = row.node,
        v.type = row.type,
        v.ip = row.ip,
        v.cpu_percent = row.cpu_percent,
        v.cpus = row.cpus,
        v.memory_used_gb = row.memory_used_gb,
        v.memory_total_gb = row.memory_total_gb,
        v.memory_percent = row.memory_percent,
        v.uptime_days = row.uptime_days,
        v.netin_gb = row.netin_gb,
        v.netout_gb = row.netout_gb,
        v.disk_max_gb = row.disk_max_gb,
        v.last_seen = datetime(),
        v.source = 'proxmox',
        v._sync_status = 'active'
        WITH v, row
        MERGE (h:Host {hostname: row.node})
        SET h.type = 'hypervisor'
        MERGE (h)-[:HOSTS]->(v)
        WITH v, row
        MERGE (p:ProxmoxNode {name: row.node})
        MERGE (v)-[:RUNS_ON]->(p)",
        rows.clone(),
    )
    .await?;

    let ids: Vec<Value> = rows.iter().map(|r| r["vmid"].clone()).collect();
    lifecycle::mark_active(graph, "VM", ids, "vmid").await?;

    info!(count = rows.len(), "synced proxmox guests");
    Ok(rows.len() as i64)
}

fn build_row(guest: &Value, vmid: i64, node: &str, guest_type: &str, ip: &str) -> Value {
    let name = guest
    .get("name")
    .and_then(Value::as_str)
    .map(str::to_string)
    .unwrap_or_else(|| format!("vm-{vmid}"));
    let status = guest.get("status").and_then(Value::as_str).unwrap_or("unknown");

    let cpu_percent = (as_f64(guest.get("cpu").unwrap_or(&json!(0.0)), 0.0) * 100.0 * 10.0).round() / 10.0;
    let cpus = guest
    .get("maxcpu")
    .or_else(|| guest.get("cpus"))
    .map(|v| as_i64(v, 0))
    .unwrap_or(0);
    let mem_used = as_f64(guest.get("mem").unwrap_or(&json!(0)), 0.0);
    let mem_total = as_f64(guest.get("maxmem").unwrap_or(&json!(0)), 0.0);
    let memory_percent = if mem_total > 0.0 { (mem_used / mem_total * 100.0 * 10.0).round() / 10.0 } else { 0.0 };
    let uptime_days = (as_f64(guest.get("uptime").unwrap_or(&json!(0)), 0.0) / 86400.0 * 100.0).round() / 100.0;
    let netin_gb = gb(as_f64(guest.get("netin").unwrap_or(&json!(0)), 0.0));
    let netout_gb = gb(as_f64(guest.get("netout").unwrap_or(&json!(0)), 0.0));
    let disk_max_gb = gb(as_f64(guest.get("maxdisk").unwrap_or(&json!(0)), 0.0));

    json!({
            "vmid": vmid.to_string(),
            "name": name,
            "status": status,
            "node": node,
            "type": guest_type,
            "ip": ip,
            "cpu_percent": cpu_percent,
            "cpus": cpus,
            "memory_used_gb": gb(mem_used),
            "memory_total_gb": gb(mem_total),
            "memory_percent": memory_percent,
            "uptime_days": uptime_days,
            "netin_gb": netin_gb,
            "netout_gb": netout_gb,
            "disk_max_gb": disk_max_gb,
    })
}
