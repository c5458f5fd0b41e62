//! Kubernetes sync: nodes, workloads, services, pods, ingresses, PVCs.
//!
//! Ownership resolution for pods is the one subtlety worth keeping: a pod
//! owned by a ReplicaSet must be attributed to the Deployment that owns the
//! ReplicaSet, not the ReplicaSet itself. We pre-fetch every ReplicaSet in
//! the cluster once per cycle into `(name, namespace) -> (kind, name)` so the
//! pod loop only ever does an in-memory lookup.

use std::collections::HashMap;

use serde_json::{json, Value};
use source_clients::KubeClient;
use tracing::info;

use crate::Result;

/// `cluster` name -> canonical graph `Network` name, matching the original's
/// `monit` cluster mapping to the `monitoring` network.
fn network_name(cluster: &str) -> &str {
    match cluster {
        "monit" => "monitoring",
        other => other,
    }
}

type RsOwnerMap = HashMap<(String, String), (String, String)>;

async fn build_rs_owner_map(kube: &KubeClient, cluster: &str) -> RsOwnerMap {
    let mut map = RsOwnerMap::new();
    for rs in kube.list_replicasets_all(cluster).await {
        let Some(name) = rs.metadata.name else { continue };
        let Some(namespace) = rs.metadata.namespace else { continue };
        let Some(owners) = rs.metadata.owner_references else { continue };
        for owner in owners {
            if owner.kind == "Deployment" || owner.kind == "StatefulSet" {
                map.insert((name.clone(), namespace.clone()), (owner.kind, owner.name));
                break;
            }
        }
    }
    map
}

/// Resolve a pod's ultimate owner via the pre-built ReplicaSet map. Direct
/// owners of kind StatefulSet/DaemonSet/Job are used as-is.
fn resolve_owner(
    rs_map: &RsOwnerMap,
    namespace: &str,
    owner_refs: &Option<Vec<k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference>>,
) -> Option<(String, String)> {
    let owners = owner_refs.as_ref()?;
    for owner in owners {
        if owner.kind == "ReplicaSet" {
            if let Some(found) = rs_map.get(&(owner.name.clone(), namespace.to_string())) {
                return Some(found.clone());
            }
        } else if matches!(owner.kind.as_str(), "StatefulSet" | "DaemonSet" | "Job") {
            return Some((owner.kind.clone(), owner.name.clone()));
        }
    }
    None
}

pub async fn sync_nodes(graph: &graph_store::GraphStore, kube: &KubeClient) -> Result<i64> {
    info!("syncing kubernetes nodes (multi-cluster)");
    let mut total = 0i64;

    for cluster in kube.clusters() {
        let nodes = kube.list_nodes(&cluster).await;
        let mut rows = Vec::new();

        for node in nodes {
            let Some(hostname) = node.metadata.name else { continue };

            let mut conditions = Vec::new();
            let mut k8s_ready = false;
            if let Some(status) = &node.status {
                if let Some(conds) = &status.conditions {
                    for cond in conds {
                        conditions.push(format!("{}={}", cond.type_, cond.status));
                        if cond.type_ == "Ready" {
                            k8s_ready = cond.status == "True";
                        }
                    }
                }
            }

            let (k8s_version, k8s_os) = node
                .status
                .as_ref()
                .and_then(|s| s.node_info.as_ref())
                .map(|info| (info.kubelet_version.clone(), info.os_image.clone()))
                .unwrap_or_else(|| ("unknown".to_string(), "unknown".to_string()));

            let internal_ip = node
                .status
                .as_ref()
                .and_then(|s| s.addresses.as_ref())
                .and_then(|addrs| addrs.iter().find(|a| a.type_ == "InternalIP"))
                .map(|a| a.address.clone())
                .unwrap_or_default();

            let lower = hostname.to_lowercase();
            let k8s_role = if ["control", "master", "cp"].iter().any(|kw| lower.contains(kw)) {
                "control-plane"
            } else {
                "worker"
            };

            rows.push(json!({
                "hostname": hostname,
                "k8s_version": k8s_version,
                "k8s_os": k8s_os,
                "k8s_ready": k8s_ready,
                "k8s_conditions": conditions.join(", "),
                "k8s_role": k8s_role,
                "cluster": cluster,
                "status": if k8s_ready { "healthy" } else { "unhealthy" },
                "network": network_name(&cluster),
                "internal_ip": internal_ip,
            }));
        }

        if !rows.is_empty() {
            graph
                .batch_merge(
                    "MERGE (h:Host {hostname: row.hostname})
                     SET h.k8s_version = row.k8s_version,
                         h.k8s_os = row.k8s_os,
                         h.k8s_ready = row.k8s_ready,
                         h.k8s_conditions = row.k8s_conditions,
                         h.k8s_role = row.k8s_role,
                         h.cluster = row.cluster,
                         h.status = row.status,
                         h.internal_ip = row.internal_ip,
                         h.last_seen = datetime(),
                         h._sync_status = 'active'
                     WITH h, row
                     MERGE (n:Network {name: row.network})
                     MERGE (h)-[:CONNECTED_TO]->(n)",
                    rows.clone(),
                )
                .await?;

            let ids: Vec<Value> = rows.iter().map(|r| r["hostname"].clone()).collect();
            lifecycle::mark_active(graph, "Host", ids, "hostname").await?;
        }

        info!(cluster = %cluster, count = rows.len(), "synced nodes");
        total += rows.len() as i64;
    }

    info!(total, "kubernetes node sync complete");
    Ok(total)
}

/// `(name, namespace, cluster)` -> deployment health, threaded into the
/// Services syncer so a Service backed by a Deployment inherits its status.
pub struct DeployStatus {
    pub status: String,
    pub replicas: i32,
    pub ready: i32,
}

pub type DeployStatusMap = HashMap<(String, String, String), DeployStatus>;

fn workload_status(replicas: i32, ready: i32) -> &'static str {
    if replicas == 0 {
        "scaled-down"
    } else if ready >= replicas {
        "healthy"
    } else if ready > 0 {
        "degraded"
    } else {
        "unhealthy"
    }
}

pub async fn sync_deployments(
    graph: &graph_store::GraphStore,
    kube: &KubeClient,
) -> Result<(i64, DeployStatusMap)> {
    info!("syncing kubernetes deployments (multi-cluster)");
    let mut deploy_status = DeployStatusMap::new();
    let mut total = 0i64;

    for cluster in kube.clusters() {
        let deploys = kube.list_deployments_all(&cluster).await;
        let mut rows = Vec::new();

        for d in deploys {
            let (Some(name), Some(namespace)) = (d.metadata.name, d.metadata.namespace) else {
                continue;
            };

            let replicas = d.spec.as_ref().and_then(|s| s.replicas).unwrap_or(0);
            let ready = d.status.as_ref().and_then(|s| s.ready_replicas).unwrap_or(0);
            let available = d.status.as_ref().and_then(|s| s.available_replicas).unwrap_or(0);
            let status = workload_status(replicas, ready);

            let selector = d
                .spec
                .as_ref()
                .and_then(|s| s.selector.match_labels.as_ref())
                .map(|labels| format!("{labels:?}"))
                .unwrap_or_default();

            deploy_status.insert(
                (name.clone(), namespace.clone(), cluster.clone()),
                DeployStatus { status: status.to_string(), replicas, ready },
            );

            rows.push(json!({
                "name": name,
                "namespace": namespace,
                "cluster": cluster,
                "replicas": replicas,
                "ready": ready,
                "available": available,
                "status": status,
                "selector": selector,
            }));
        }

        if !rows.is_empty() {
            graph
                .batch_merge(
                    "MERGE (dep:Deployment {name: row.name, namespace: row.namespace, cluster: row.cluster})
                     SET dep.replicas = row.replicas,
                         dep.ready_replicas = row.ready,
                         dep.available_replicas = row.available,
                         dep.status = row.status,
                         dep.selector = row.selector,
                         dep.last_seen = datetime(),
                         dep.source = 'kubernetes',
                         dep._sync_status = 'active'",
                    rows.clone(),
                )
                .await?;

            graph
                .batch_merge(
                    "MATCH (s:Service {name: row.name, namespace: row.namespace, cluster: row.cluster})
                     MATCH (dep:Deployment {name: row.name, namespace: row.namespace, cluster: row.cluster})
                     MERGE (s)-[:BACKED_BY]->(dep)",
                    rows.clone(),
                )
                .await?;
        }

        info!(cluster = %cluster, count = rows.len(), "synced deployments");
        total += rows.len() as i64;
    }

    info!(total, "kubernetes deployment sync complete");
    Ok((total, deploy_status))
}

pub async fn sync_statefulsets(graph: &graph_store::GraphStore, kube: &KubeClient) -> Result<i64> {
    info!("syncing kubernetes statefulsets (multi-cluster)");
    let mut total = 0i64;

    for cluster in kube.clusters() {
        let sets = kube.list_statefulsets_all(&cluster).await;
        let mut rows = Vec::new();

        for sts in sets {
            let (Some(name), Some(namespace)) = (sts.metadata.name, sts.metadata.namespace) else {
                continue;
            };
            let replicas = sts.spec.as_ref().and_then(|s| s.replicas).unwrap_or(0);
            let ready = sts.status.as_ref().and_then(|s| s.ready_replicas).unwrap_or(0);
            let status = workload_status(replicas, ready);
            let selector = sts
                .spec
                .as_ref()
                .and_then(|s| s.selector.match_labels.as_ref())
                .map(|labels| format!("{labels:?}"))
                .unwrap_or_default();
            let service_name =
                sts.spec.as_ref().map(|s| s.service_name.clone()).unwrap_or_default();

            rows.push(json!({
                "name": name,
                "namespace": namespace,
                "cluster": cluster,
                "replicas": replicas,
                "ready": ready,
                "status": status,
                "selector": selector,
                "service_name": service_name,
            }));
        }

        if !rows.is_empty() {
            graph
                .batch_merge(
                    "MERGE (sts:StatefulSet {name: row.name, namespace: row.namespace, cluster: row.cluster})
                     SET sts.replicas = row.replicas,
                         sts.ready_replicas = row.ready,
                         sts.status = row.status,
                         sts.selector = row.selector,
                         sts.service_name = row.service_name,
                         sts.last_seen = datetime(),
                         sts.source = 'kubernetes',
                         sts._sync_status = 'active'",
                    rows.clone(),
                )
                .await?;

            let headless: Vec<Value> =
                rows.iter().filter(|r| !r["service_name"].as_str().unwrap_or_default().is_empty()).cloned().collect();
            if !headless.is_empty() {
                graph
                    .batch_merge(
                        "MATCH (s:Service {namespace: row.namespace, cluster: row.cluster})
                         WHERE s.name = row.service_name
                         MATCH (sts:StatefulSet {name: row.name, namespace: row.namespace, cluster: row.cluster})
                         MERGE (s)-[:BACKED_BY]->(sts)",
                        headless,
                    )
                    .await?;
            }
        }

        info!(cluster = %cluster, count = rows.len(), "synced statefulsets");
        total += rows.len() as i64;
    }

    info!(total, "kubernetes statefulset sync complete");
    Ok(total)
}

pub async fn sync_daemonsets(graph: &graph_store::GraphStore, kube: &KubeClient) -> Result<i64> {
    info!("syncing kubernetes daemonsets (multi-cluster)");
    let mut total = 0i64;

    for cluster in kube.clusters() {
        let sets = kube.list_daemonsets_all(&cluster).await;
        let mut rows = Vec::new();

        for ds in sets {
            let (Some(name), Some(namespace)) = (ds.metadata.name, ds.metadata.namespace) else {
                continue;
            };
            let desired = ds.status.as_ref().map(|s| s.desired_number_scheduled).unwrap_or(0);
            let ready = ds.status.as_ref().map(|s| s.number_ready).unwrap_or(0);
            let available = ds.status.as_ref().and_then(|s| s.number_available).unwrap_or(0);
            let status = workload_status(desired, ready);
            let selector = ds
                .spec
                .as_ref()
                .and_then(|s| s.selector.match_labels.as_ref())
                .map(|labels| format!("{labels:?}"))
                .unwrap_or_default();

            rows.push(json!({
                "name": name,
                "namespace": namespace,
                "cluster": cluster,
                "desired": desired,
                "ready": ready,
                "available": available,
                "status": status,
                "selector": selector,
            }));
        }

        if !rows.is_empty() {
            graph
                .batch_merge(
                    "MERGE (ds:DaemonSet {name: row.name, namespace: row.namespace, cluster: row.cluster})
                     SET ds.desired = row.desired,
                         ds.ready = row.ready,
                         ds.available = row.available,
                         ds.status = row.status,
                         ds.selector = row.selector,
                         ds.last_seen = datetime(),
                         ds.source = 'kubernetes',
                         ds._sync_status = 'active'",
                    rows.clone(),
                )
                .await?;
        }

        info!(cluster = %cluster, count = rows.len(), "synced daemonsets");
        total += rows.len() as i64;
    }

    info!(total, "kubernetes daemonset sync complete");
    Ok(total)
}

pub async fn sync_services(
    graph: &graph_store::GraphStore,
    kube: &KubeClient,
    deploy_status: &DeployStatusMap,
) -> Result<i64> {
    info!("syncing kubernetes services (multi-cluster)");
    let mut total = 0i64;

    for cluster in kube.clusters() {
        let services = kube.list_services_all(&cluster).await;
        let mut rows = Vec::new();

        for svc in services {
            let (Some(name), Some(namespace)) = (svc.metadata.name, svc.metadata.namespace) else {
                continue;
            };

            let spec = svc.spec.unwrap_or_default();
            let svc_type = spec.type_.clone().unwrap_or_else(|| "ClusterIP".to_string());
            let cluster_ip = spec.cluster_ip.clone().unwrap_or_default();

            let ports = spec.ports.unwrap_or_default();
            let ports_str = ports
                .iter()
                .map(|p| {
                    let target = p.target_port.as_ref().map(|t| format!("{t:?}")).unwrap_or_default();
                    let mut part = format!("{}:{target}", p.port);
                    if let Some(np) = p.node_port {
                        part.push_str(&format!(" (NP:{np})"));
                    }
                    part
                })
                .collect::<Vec<_>>()
                .join(", ");

            let key = (name.clone(), namespace.clone(), cluster.clone());
            let (status, replicas_str) = match deploy_status.get(&key) {
                Some(d) => (d.status.clone(), format!("{}/{}", d.ready, d.replicas)),
                None => {
                    let s = if matches!(svc_type.as_str(), "ClusterIP" | "NodePort" | "LoadBalancer") {
                        "active"
                    } else {
                        "unknown"
                    };
                    (s.to_string(), String::new())
                }
            };

            let selector = spec.selector.clone().unwrap_or_default();
            let is_bridge = svc_type == "ClusterIP" && selector.is_empty();

            rows.push(json!({
                "name": name,
                "namespace": namespace,
                "cluster": cluster,
                "service_type": svc_type,
                "cluster_ip": cluster_ip,
                "ports": ports_str,
                "status": status,
                "replicas": replicas_str,
                "is_bridge": is_bridge,
                "selector": format!("{selector:?}"),
            }));
        }

        if !rows.is_empty() {
            graph
                .batch_merge(
                    "MERGE (s:Service {name: row.name, namespace: row.namespace, cluster: row.cluster})
                     SET s.service_type = row.service_type,
                         s.cluster_ip = row.cluster_ip,
                         s.ports = row.ports,
                         s.status = row.status,
                         s.replicas = row.replicas,
                         s.is_bridge = row.is_bridge,
                         s.selector = row.selector,
                         s.last_seen = datetime(),
                         s.source = 'kubernetes',
                         s._sync_status = 'active'",
                    rows.clone(),
                )
                .await?;
        }

        info!(cluster = %cluster, count = rows.len(), "synced services");
        total += rows.len() as i64;
    }

    info!(total, "kubernetes service sync complete");
    Ok(total)
}

pub async fn sync_pods(graph: &graph_store::GraphStore, kube: &KubeClient) -> Result<i64> {
    info!("syncing kubernetes pods (multi-cluster)");
    let mut total = 0i64;

    for cluster in kube.clusters() {
        let rs_map = build_rs_owner_map(kube, &cluster).await;
        info!(cluster = %cluster, entries = rs_map.len(), "built replicaset owner map");

        let pods = kube.list_pods_all(&cluster).await;

        let mut pod_rows = Vec::new();
        let mut deploy_owners = Vec::new();
        let mut sts_owners = Vec::new();
        let mut ds_owners = Vec::new();
        let mut schedule_rows = Vec::new();

        for pod in pods {
            let (Some(name), Some(namespace)) = (pod.metadata.name.clone(), pod.metadata.namespace.clone())
            else {
                continue;
            };

            let phase = pod.status.as_ref().and_then(|s| s.phase.clone()).unwrap_or_else(|| "Unknown".to_string());
            if phase == "Succeeded" {
                continue;
            }

            let (ready, restart_count) = pod
                .status
                .as_ref()
                .and_then(|s| s.container_statuses.as_ref())
                .map(|statuses| {
                    let ready = statuses.iter().all(|cs| cs.ready);
                    let restarts: i32 = statuses.iter().map(|cs| cs.restart_count).sum();
                    (ready, restarts)
                })
                .unwrap_or((false, 0));

            let pod_status = match (phase.as_str(), ready) {
                ("Running", true) => "healthy".to_string(),
                ("Running", false) => "degraded".to_string(),
                ("Failed", _) | ("Unknown", _) => "unhealthy".to_string(),
                _ => phase.to_lowercase(),
            };

            let labels = pod.metadata.labels.clone().unwrap_or_default();

            pod_rows.push(json!({
                "name": name,
                "namespace": namespace,
                "cluster": cluster,
                "phase": phase,
                "status": pod_status,
                "ready": ready,
                "restart_count": restart_count,
                "labels": format!("{labels:?}"),
            }));

            if let Some((owner_kind, owner_name)) =
                resolve_owner(&rs_map, &namespace, &pod.metadata.owner_references)
            {
                let row = json!({
                    "pod_name": name,
                    "pod_ns": namespace,
                    "cluster": cluster,
                    "owner_name": owner_name,
                });
                match owner_kind.as_str() {
                    "Deployment" => deploy_owners.push(row),
                    "StatefulSet" => sts_owners.push(row),
                    "DaemonSet" => ds_owners.push(row),
                    _ => {}
                }
            }

            if let Some(node_name) = pod.spec.as_ref().and_then(|s| s.node_name.clone()) {
                schedule_rows.push(json!({
                    "pod_name": name,
                    "pod_ns": namespace,
                    "cluster": cluster,
                    "node_name": node_name,
                }));
            }
        }

        if !pod_rows.is_empty() {
            graph
                .batch_merge(
                    "MERGE (p:Pod {name: row.name, namespace: row.namespace, cluster: row.cluster})
                     SET p.phase = row.phase,
                         p.status = row.status,
                         p.ready = row.ready,
                         p.restart_count = row.restart_count,
                         p.labels = row.labels,
                         p.last_seen = datetime(),
                         p.source = 'kubernetes',
                         p._sync_status = 'active'",
                    pod_rows.clone(),
                )
                .await?;
        }

        if !deploy_owners.is_empty() {
            graph
                .batch_merge(
                    "MATCH (p:Pod {name: row.pod_name, namespace: row.pod_ns, cluster: row.cluster})
                     MATCH (d:Deployment {name: row.owner_name, namespace: row.pod_ns, cluster: row.cluster})
                     MERGE (p)-[:BELONGS_TO]->(d)",
                    deploy_owners.clone(),
                )
                .await?;
        }
        if !sts_owners.is_empty() {
            graph
                .batch_merge(
                    "MATCH (p:Pod {name: row.pod_name, namespace: row.pod_ns, cluster: row.cluster})
                     MATCH (sts:StatefulSet {name: row.owner_name, namespace: row.pod_ns, cluster: row.cluster})
                     MERGE (p)-[:BELONGS_TO]->(sts)",
                    sts_owners.clone(),
                )
                .await?;
        }
        if !ds_owners.is_empty() {
            graph
                .batch_merge(
                    "MATCH (p:Pod {name: row.pod_name, namespace: row.pod_ns, cluster: row.cluster})
                     MATCH (ds:DaemonSet {name: row.owner_name, namespace: row.pod_ns, cluster: row.cluster})
                     MERGE (p)-[:BELONGS_TO]->(ds)",
                    ds_owners.clone(),
                )
                .await?;
        }
        if !schedule_rows.is_empty() {
            graph
                .batch_merge(
                    "MATCH (p:Pod {name: row.pod_name, namespace: row.pod_ns, cluster: row.cluster})
                     MATCH (h:Host {hostname: row.node_name})
                     MERGE (p)-[:SCHEDULED_ON]->(h)",
                    schedule_rows.clone(),
                )
                .await?;
        }

        info!(
            cluster = %cluster,
            pods = pod_rows.len(),
            deploy = deploy_owners.len(),
            sts = sts_owners.len(),
            ds = ds_owners.len(),
            scheduled = schedule_rows.len(),
            "synced pods",
        );
        total += pod_rows.len() as i64;
    }

    info!(total, "kubernetes pod sync complete");
    Ok(total)
}

pub async fn sync_ingresses(graph: &graph_store::GraphStore, kube: &KubeClient) -> Result<i64> {
    info!("syncing kubernetes ingresses (multi-cluster)");
    let mut total = 0i64;

    for cluster in kube.clusters() {
        let ingresses = kube.list_ingresses_all(&cluster).await;
        let mut count = 0i64;

        for ing in ingresses {
            let (Some(name), Some(namespace)) = (ing.metadata.name, ing.metadata.namespace) else {
                continue;
            };
            let spec = ing.spec.unwrap_or_default();
            let ingress_class = spec.ingress_class_name.clone().unwrap_or_default();
            let has_tls = spec.tls.as_ref().map(|t| !t.is_empty()).unwrap_or(false);

            let mut all_hosts = Vec::new();
            let mut all_paths = Vec::new();
            let mut backend_services: Vec<String> = Vec::new();

            for rule in spec.rules.unwrap_or_default() {
                let host = rule.host.clone().unwrap_or_else(|| "*".to_string());
                all_hosts.push(host.clone());
                if let Some(http) = rule.http {
                    for p in http.paths {
                        let path = p.path.clone().unwrap_or_else(|| "/".to_string());
                        let mut svc_name = String::new();
                        let mut port = String::new();
                        if let Some(svc) = p.backend.service {
                            svc_name = svc.name.clone();
                            if let Some(p) = svc.port {
                                port = p
                                    .number
                                    .map(|n| n.to_string())
                                    .or_else(|| p.name.clone())
                                    .unwrap_or_default();
                            }
                        }
                        if !svc_name.is_empty() {
                            all_paths.push(format!("{host}{path} -> {svc_name}:{port}"));
                            backend_services.push(svc_name);
                        } else {
                            all_paths.push(format!("{host}{path}"));
                        }
                    }
                }
            }

            let ing_status = if backend_services.is_empty() { "inactive" } else { "active" };

            graph
                .write(
                    "MERGE (i:Ingress {name: $name, namespace: $namespace, cluster: $cluster})
                     SET i.ingress_class = $ingress_class,
                         i.hosts = $hosts,
                         i.paths = $paths,
                         i.tls = $tls,
                         i.status = $status,
                         i.last_seen = datetime(),
                         i.source = 'kubernetes',
                         i._sync_status = 'active'",
                    vec![
                        ("name", json!(name)),
                        ("namespace", json!(namespace)),
                        ("cluster", json!(cluster)),
                        ("ingress_class", json!(ingress_class)),
                        ("hosts", json!(all_hosts.join(", "))),
                        ("paths", json!(all_paths.join("; "))),
                        ("tls", json!(has_tls)),
                        ("status", json!(ing_status)),
                    ],
                )
                .await?;
            count += 1;

            for svc_name in backend_services {
                graph
                    .write(
                        "MATCH (i:Ingress {name: $ing_name, namespace: $namespace, cluster: $cluster})
                         MATCH (s:Service {name: $svc_name, namespace: $namespace, cluster: $cluster})
                         MERGE (i)-[:ROUTES_TO]->(s)",
                        vec![
                            ("ing_name", json!(name)),
                            ("svc_name", json!(svc_name)),
                            ("namespace", json!(namespace)),
                            ("cluster", json!(cluster)),
                        ],
                    )
                    .await?;
            }
        }

        info!(cluster = %cluster, count, "synced ingresses");
        total += count;
    }

    info!(total, "kubernetes ingress sync complete");
    Ok(total)
}

pub async fn sync_pvcs(graph: &graph_store::GraphStore, kube: &KubeClient) -> Result<i64> {
    info!("syncing kubernetes pvcs (multi-cluster)");
    let mut total = 0i64;

    for cluster in kube.clusters() {
        let pvcs = kube.list_pvcs_all(&cluster).await;
        let mut rows = Vec::new();

        for pvc in pvcs {
            let (Some(name), Some(namespace)) = (pvc.metadata.name, pvc.metadata.namespace) else {
                continue;
            };
            let phase = pvc
                .status
                .as_ref()
                .and_then(|s| s.phase.clone())
                .unwrap_or_else(|| "unknown".to_string())
                .to_lowercase();
            let capacity = pvc
                .status
                .as_ref()
                .and_then(|s| s.capacity.as_ref())
                .and_then(|c| c.get("storage"))
                .map(|q| q.0.clone())
                .unwrap_or_default();
            let storage_class =
                pvc.spec.as_ref().and_then(|s| s.storage_class_name.clone()).unwrap_or_default();
            let volume_name = pvc.spec.as_ref().and_then(|s| s.volume_name.clone()).unwrap_or_default();
            let pvc_status = match phase.as_str() {
                "bound" => "healthy",
                "pending" => "pending",
                "lost" => "unhealthy",
                other => other,
            };

            rows.push(json!({
                "name": name,
                "namespace": namespace,
                "cluster": cluster,
                "status": pvc_status,
                "capacity": capacity,
                "storage_class": storage_class,
                "volume_name": volume_name,
            }));
        }

        if !rows.is_empty() {
            graph
                .batch_merge(
                    "MERGE (pvc:PersistentVolumeClaim {name: row.name, namespace: row.namespace, cluster: row.cluster})
                     SET pvc.status = row.status,
                         pvc.capacity = row.capacity,
                         pvc.storage_class = row.storage_class,
                         pvc.volume_name = row.volume_name,
                         pvc.last_seen = datetime(),
                         pvc.source = 'kubernetes',
                         pvc._sync_status = 'active'",
                    rows.clone(),
                )
                .await?;

            graph
                .batch_merge(
                    "MATCH (pvc:PersistentVolumeClaim {name: row.name, namespace: row.namespace, cluster: row.cluster})
                     MATCH (s:Service {namespace: row.namespace, cluster: row.cluster})
                     WHERE row.name STARTS WITH s.name AND size(s.name) > 2
                     WITH pvc, s ORDER BY size(s.name) DESC LIMIT 1
                     MERGE (pvc)-[:CLAIMED_BY]->(s)",
                    rows.clone(),
                )
                .await?;
        }

        info!(cluster = %cluster, count = rows.len(), "synced pvcs");
        total += rows.len() as i64;
    }

    info!(total, "kubernetes pvc sync complete");
    Ok(total)
}

/// Exposed so `discovery_sync` can log total clusters alongside per-syncer
/// counts without importing `source_clients` directly everywhere.
pub fn cluster_count(kube: &KubeClient) -> usize {
    kube.clusters().len()
}
