//! One-shot discovery sync cycle: mark every managed node stale, run every
//! source syncer in `SYNC_ORDER`, link cross-source edges, dedup, then sweep
//! and prune orphans. Invoked by an external scheduler (cron, a Kubernetes
//! CronJob); this binary runs exactly one cycle and exits.

use std::collections::HashMap;

use anyhow::Context;
use graph_store::GraphStore;
use source_clients::{KubeClient, ProxmoxClient, ProxmoxHost, ToolClient, TrueNasClient, TrueNasInstance};
use tracing::{error, info};
use util::Config;

/// Every managed-label syncer, run strictly in `SYNC_ORDER`: nodes that a
/// later syncer references as an edge target must already exist. The
/// cross-source linker, deduplicator, sweep and orphan GC all run once,
/// after every syncer above has finished.
async fn run_cycle(
    graph: &GraphStore,
    kube: &KubeClient,
    proxmox: &ProxmoxClient,
    truenas: &TrueNasClient,
    mcp: &ToolClient,
    gatus_url: &str,
    knowledge_base_url: &str,
) -> HashMap<String, i64> {
    let mut counts = HashMap::new();

    macro_rules! run {
        ($name:expr, $fut:expr) => {
            match $fut.await {
                Ok(n) => {
                    info!(syncer = $name, count = n, "syncer complete");
                    counts.insert($name.to_string(), n as i64);
                }
                Err(err) => {
                    error!(syncer = $name, error = %err, "syncer failed, recording zero count");
                    counts.insert($name.to_string(), 0);
                }
            }
        };
    }

    run!("proxmox", syncers::proxmox::sync_vms(graph, proxmox));
    run!("unifi", syncers::network::sync_unifi_devices(graph, mcp));
    run!("truenas", syncers::truenas::sync_storage(graph, truenas));
    run!("k8s_nodes", syncers::k8s::sync_nodes(graph, kube));

    let deploy_status = match syncers::k8s::sync_deployments(graph, kube).await {
        Ok((n, status)) => {
            info!(syncer = "k8s_deployments", count = n, "syncer complete");
            counts.insert("k8s_deployments".to_string(), n);
            status
        }
        Err(err) => {
            error!(syncer = "k8s_deployments", error = %err, "syncer failed, recording zero count");
            counts.insert("k8s_deployments".to_string(), 0);
            syncers::k8s::DeployStatusMap::new()
        }
    };

    run!("k8s_statefulsets", syncers::k8s::sync_statefulsets(graph, kube));
    run!("k8s_daemonsets", syncers::k8s::sync_daemonsets(graph, kube));
    run!("k8s_services", syncers::k8s::sync_services(graph, kube, &deploy_status));
    run!("k8s_pods", syncers::k8s::sync_pods(graph, kube));
    run!("k8s_ingresses", syncers::k8s::sync_ingresses(graph, kube));
    run!("k8s_pvcs", syncers::k8s::sync_pvcs(graph, kube));
    run!("runbooks", syncers::knowledge::sync_runbooks(graph, mcp, knowledge_base_url));
    run!("coroot_services", syncers::observability::sync_coroot_services(graph, mcp));
    run!("coroot_map", syncers::observability::sync_coroot_service_map(graph, mcp));
    run!("gatus", syncers::observability::sync_gatus_health(graph, mcp, gatus_url));
    run!("ha_areas", syncers::homelab::sync_ha_areas(graph, mcp));
    run!("ha_entities", syncers::homelab::sync_ha_entities(graph, mcp));
    run!("tasmota", syncers::homelab::sync_tasmota_devices(graph, mcp));
    run!("argocd", syncers::homelab::sync_argocd_apps(graph, mcp));
    run!("dns", syncers::network::sync_dns_topology(graph, mcp));
    run!("cloudflare_dns", syncers::network::sync_cloudflare_dns(graph, mcp));
    run!("caddy", syncers::network::sync_caddy_proxies(graph, mcp));
    run!("dhcp", syncers::network::sync_dhcp_devices(graph, mcp));
    run!("keep", syncers::observability::sync_keep_alerts(graph, mcp));
    run!("grafana", syncers::observability::sync_grafana_dashboards(graph, mcp));

    match linker::run_all(graph).await {
        Ok(link_counts) => {
            info!(counts = ?link_counts, "cross-source linker complete");
            counts.insert("linker_total".to_string(), link_counts.total());
        }
        Err(err) => {
            error!(error = %err, "cross-source linker failed, recording zero count");
            counts.insert("linker_total".to_string(), 0);
        }
    }

    match dedup::dedup_network_nodes(graph).await {
        Ok(n) => {
            info!(count = n, "dedup complete");
            counts.insert("dedup".to_string(), n);
        }
        Err(err) => {
            error!(error = %err, "dedup failed, recording zero count");
            counts.insert("dedup".to_string(), 0);
        }
    }

    match lifecycle::sweep_stale(graph, lifecycle::MANAGED_LABELS).await {
        Ok(n) => {
            info!(count = n, "swept stale nodes");
            counts.insert("swept_stale".to_string(), n);
        }
        Err(err) => {
            error!(error = %err, "sweep_stale failed, recording zero count");
            counts.insert("swept_stale".to_string(), 0);
        }
    }

    match lifecycle::mark_orphans(graph).await {
        Ok(n) => {
            info!(count = n, "marked orphans");
            counts.insert("marked_orphans".to_string(), n);
        }
        Err(err) => {
            error!(error = %err, "mark_orphans failed, recording zero count");
            counts.insert("marked_orphans".to_string(), 0);
        }
    }

    match lifecycle::sweep_aged_orphans(graph).await {
        Ok(n) => {
            info!(count = n, "swept aged orphans");
            counts.insert("swept_aged_orphans".to_string(), n);
        }
        Err(err) => {
            error!(error = %err, "sweep_aged_orphans failed, recording zero count");
            counts.insert("swept_aged_orphans".to_string(), 0);
        }
    }

    counts
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    util::telemetry::init();

    let config = Config::from_env().context("failed to load configuration")?;
    let started = std::time::Instant::now();

    let graph = GraphStore::connect(&config.neo4j_uri, &config.neo4j_user, &config.neo4j_password)
    .await
    .context("failed to connect to graph store")?;

    if !graph.verify().await {
        anyhow::bail!("graph store failed liveness check, aborting cycle before any syncer runs");
    }

    lifecycle::mark_all_stale(&graph, lifecycle::MANAGED_LABELS)
    .await
    .context("failed to mark managed labels stale")?;

    let kube = KubeClient::new(&config.kubeconfigs).await;

    let proxmox_hosts: HashMap<String, ProxmoxHost> = config
    .proxmox_hosts
    .iter()
    .map(|(name, host)| {
            (
                name.clone(),
                ProxmoxHost {
                    url: host.url.clone(),
                    token_id: host.token_id.clone(),
                    token_secret: host.token_secret.clone(),
                },
            )
    })
    .collect();
    let proxmox = ProxmoxClient::new(proxmox_hosts);

    let truenas_instances: HashMap<String, TrueNasInstance> = config
    .truenas_instances
    .iter()
    .map(|(name, instance)| {
            (
                name.clone(),
                TrueNasInstance { url: instance.url.clone(), api_key: instance.api_key.clone() },
            )
    })
    .collect();
    let truenas = TrueNasClient::new(truenas_instances);

    let mcp = ToolClient::new(config.mcp_servers.clone());
    let gatus_url = config.gatus_url.clone().unwrap_or_default();
    let knowledge_base_url = config.mcp_servers.get("knowledge").cloned().unwrap_or_default();

    let counts =
    run_cycle(&graph, &kube, &proxmox, &truenas, &mcp, &gatus_url, &knowledge_base_url).await;

    info!(
        counts = ?counts,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "sync cycle complete"
    );

    graph.close();

    Ok(())
}
