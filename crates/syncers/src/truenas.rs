//! TrueNAS sync: pools (aggregated from vdev topology), datasets,
//! NFS/SMB shares, alerts, apps — once per configured instance. Identity is
//! `(name, instance)` rather than bare `name`, since two instances can
//! legitimately have a pool called the same thing.

use serde_json::{json, Value};
use source_clients::{unwrap_nested_numeric, TrueNasClient};
use tracing::info;

use crate::Result;

const VDEV_GROUPS: &[&str] = &["data", "cache", "log", "spare", "special", "dedup"];

fn gb(bytes: f64) -> f64 {
    (bytes / 1024f64.powi(3) * 100.0).round() / 100.0
}

fn nested_num(value: Option<&Value>) -> f64 {
    value.and_then(unwrap_nested_numeric).unwrap_or(0.0)
}

pub async fn sync_storage(graph: &graph_store::GraphStore, truenas: &TrueNasClient) -> Result<i64> {
    info!("syncing truenas storage");
    let mut pool_count = 0i64;

    for instance in truenas.instances() {
        let pools = truenas.list_pools(&instance).await;

        for pool in &pools {
            let Some(name) = pool.get("name").and_then(Value::as_str) else { continue };

            let mut pool_size = 0f64;
            let mut pool_used = 0f64;
            if let Some(topology) = pool.get("topology").and_then(Value::as_object) {
                for group in VDEV_GROUPS {
                    let Some(vdevs) = topology.get(*group).and_then(Value::as_array) else { continue };
                    for vdev in vdevs {
                        let Some(stats) = vdev.get("stats") else { continue };
                        pool_size += stats.get("size").and_then(Value::as_f64).unwrap_or(0.0);
                        pool_used += stats.get("allocated").and_then(Value::as_f64).unwrap_or(0.0);
                    }
                }
            }
            if pool_size == 0.0 {
                pool_size = nested_num(pool.get("size"));
            }
            if pool_used == 0.0 {
                pool_used = nested_num(pool.get("used"));
            }

            let raw_status = pool.get("status").and_then(Value::as_str).unwrap_or("unknown").to_lowercase();
            let status = match raw_status.as_str() {
                "online" => "healthy",
                "degraded" => "degraded",
                "faulted" => "unhealthy",
                other => other,
            };

            graph
            .write(
                "MERGE (p:StoragePool {name: $name, instance: $instance})
                SET p.status = $status,
                p.size = $size,
                p.used = $used,
                p.size_gb = $size_gb,
                p.used_gb = $used_gb,
                p.last_seen = datetime(),
                p.source = 'truenas',
                p._sync_status = 'active'",
                vec![
                    ("name", json!(name)),
                    ("instance", json!(instance)),
                    ("status", json!(status)),
                    ("size", json!(pool_size)),
                    ("used", json!(pool_used)),
                    ("size_gb", json!(gb(pool_size))),
                    ("used_gb", json!(gb(pool_used))),
                ],
            )
            .await?;
            pool_count += 1;
        }

        let datasets = truenas.list_datasets(&instance).await;
        for dataset in &datasets {
            let Some(name) = dataset.get("name").and_then(Value::as_str) else { continue };
            let pool_name = name.split('/').next().unwrap_or(name);

            let used = nested_num(dataset.get("used"));
            let available = nested_num(dataset.get("available"));
            let status = if available > 0.0 { "online" } else { "full" };

            graph
            .write(
                "MERGE (d:Dataset {name: $name, instance: $instance})
                SET d.mountpoint = $mountpoint,
                d.used = $used,
                d.available = $available,
                d.used_gb = $used_gb,
                d.available_gb = $available_gb,
                d.status = $status,
                d.last_seen = datetime(),
                d.source = 'truenas',
                d._sync_status = 'active'
                WITH d
                MATCH (p:StoragePool {name: $pool_name, instance: $instance})
                MERGE (p)-[:CONTAINS]->(d)",
                vec![
                    ("name", json!(name)),
                    ("instance", json!(instance)),
                    ("pool_name", json!(pool_name)),
                    ("mountpoint", json!(dataset.get("mountpoint").and_then(Value::as_str).unwrap_or(""))),
                    ("used", json!(used)),
                    ("available", json!(available)),
                    ("used_gb", json!(gb(used))),
                    ("available_gb", json!(gb(available))),
                    ("status", json!(status)),
                ],
            )
            .await?;
        }

        let mut shares = truenas.list_nfs_shares(&instance).await;
        shares.extend(truenas.list_smb_shares(&instance).await);
        for share in &shares {
            let path = share.get("path").and_then(Value::as_str).unwrap_or("");
            if path.is_empty() {
                continue;
            }
            let name = share
            .get("name")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| path.rsplit('/').next().unwrap_or("unknown"));
            let enabled = share.get("enabled").and_then(Value::as_bool).unwrap_or(true);
            let share_type = share.get("type").and_then(Value::as_str).unwrap_or("nfs");

            graph
            .write(
                "MERGE (s:Share {path: $path, instance: $instance})
                SET s.name = $name,
                s.type = $type,
                s.enabled = $enabled,
                s.status = $status,
                s.last_seen = datetime(),
                s.source = 'truenas',
                s._sync_status = 'active'",
                vec![
                    ("path", json!(path)),
                    ("instance", json!(instance)),
                    ("name", json!(name)),
                    ("type", json!(share_type)),
                    ("enabled", json!(enabled)),
                    ("status", json!(if enabled { "online" } else { "offline" })),
                ],
            )
            .await?;
        }

        for alert in truenas.list_alerts(&instance).await {
            let Some(alert_id) = alert.get("uuid").or_else(|| alert.get("id")).and_then(Value::as_str) else {
                continue;
            };
            let level = alert.get("level").and_then(Value::as_str).unwrap_or("info");
            let message = alert.get("formatted").or_else(|| alert.get("text")).and_then(Value::as_str).unwrap_or("");
            let dismissed = alert.get("dismissed").and_then(Value::as_bool).unwrap_or(false);

            graph
            .write(
                "MERGE (a:StorageAlert {alert_id: $alert_id, instance: $instance})
                SET a.level = $level,
                a.message = $message,
                a.dismissed = $dismissed,
                a.last_seen = datetime(),
                a.source = 'truenas',
                a._sync_status = 'active'",
                vec![
                    ("alert_id", json!(alert_id)),
                    ("instance", json!(instance)),
                    ("level", json!(level)),
                    ("message", json!(message)),
                    ("dismissed", json!(dismissed)),
                ],
            )
            .await?;
        }

        for app in truenas.list_apps(&instance).await {
            let Some(name) = app.get("name").and_then(Value::as_str) else { continue };
            let state = app.get("state").and_then(Value::as_str).unwrap_or("unknown");

            graph
            .write(
                "MERGE (a:App {name: $name, instance: $instance})
                SET a.state = $state,
                a.last_seen = datetime(),
                a.source = 'truenas',
                a._sync_status = 'active'",
                vec![("name", json!(name)), ("instance", json!(instance)), ("state", json!(state))],
            )
            .await?;
        }

        info!(
            instance = %instance,
            pools = pools.len(),
            datasets = datasets.len(),
            shares = shares.len(),
            "synced truenas instance",
        );
    }

    info!(pool_count, "truenas sync complete");
    Ok(pool_count)
}
