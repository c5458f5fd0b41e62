use std::collections::HashMap;
use std::path::PathBuf;

use k8s_openapi::api::apps::v1::{DaemonSet, Deployment, ReplicaSet, StatefulSet};
use k8s_openapi::api::core::v1::{Node, PersistentVolumeClaim, Pod, Service};
use k8s_openapi::api::networking::v1::Ingress;
use kube::api::{Api, ListParams};
use tracing::{error, info, warn};

/// Multi-cluster Kubernetes API client. One `kube::Client` per named
/// cluster; a cluster whose kubeconfig path is `None` uses the in-cluster
/// service account instead of a file.
pub struct KubeClient {
    clients: HashMap<String, kube::Client>,
}

impl KubeClient {
    /// Build a client per configured cluster. A cluster that fails to
    /// initialise (missing file, bad kubeconfig) is skipped, not fatal —
    /// the syncer that depends on it will simply see it absent from
    /// `clusters()`.
    pub async fn new(kubeconfigs: &HashMap<String, Option<PathBuf>>) -> Self {
        let mut clients = HashMap::new();
        for (cluster, path) in kubeconfigs {
            let result = match path {
                None => kube::Client::try_default().await.map_err(|e| e.to_string()),
                Some(p) if p.exists() => Self::client_from_path(p).await,
                Some(p) => {
                    warn!(cluster = %cluster, path = %p.display(), "kubeconfig not found, skipping");
                    continue;
                }
            };
            match result {
                Ok(client) => {
                    info!(cluster = %cluster, "kube client ready");
                    clients.insert(cluster.clone(), client);
                }
                Err(err) => error!(cluster = %cluster, error = %err, "failed to create kube client"),
            }
        }
        KubeClient { clients }
    }

    async fn client_from_path(path: &PathBuf) -> Result<kube::Client, String> {
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| e.to_string())?;
        let kubeconfig: kube::config::Kubeconfig =
            serde_yaml::from_str(&raw).map_err(|e| e.to_string())?;
        let config = kube::Config::from_custom_kubeconfig(kubeconfig, &Default::default())
            .await
            .map_err(|e| e.to_string())?;
        kube::Client::try_from(config).map_err(|e| e.to_string())
    }

    /// Names of clusters whose client initialised successfully.
    pub fn clusters(&self) -> Vec<String> {
        self.clients.keys().cloned().collect()
    }

    pub async fn list_nodes(&self, cluster: &str) -> Vec<Node> {
        let Some(client) = self.clients.get(cluster) else { return Vec::new() };
        let api: Api<Node> = Api::all(client.clone());
        list_or_empty(api, cluster, "Node").await
    }

    pub async fn list_pods_all(&self, cluster: &str) -> Vec<Pod> {
        let Some(client) = self.clients.get(cluster) else { return Vec::new() };
        let api: Api<Pod> = Api::all(client.clone());
        list_or_empty(api, cluster, "Pod").await
    }

    pub async fn list_services_all(&self, cluster: &str) -> Vec<Service> {
        let Some(client) = self.clients.get(cluster) else { return Vec::new() };
        let api: Api<Service> = Api::all(client.clone());
        list_or_empty(api, cluster, "Service").await
    }

    pub async fn list_deployments_all(&self, cluster: &str) -> Vec<Deployment> {
        let Some(client) = self.clients.get(cluster) else { return Vec::new() };
        let api: Api<Deployment> = Api::all(client.clone());
        list_or_empty(api, cluster, "Deployment").await
    }

    pub async fn list_statefulsets_all(&self, cluster: &str) -> Vec<StatefulSet> {
        let Some(client) = self.clients.get(cluster) else { return Vec::new() };
        let api: Api<StatefulSet> = Api::all(client.clone());
        list_or_empty(api, cluster, "StatefulSet").await
    }

    pub async fn list_daemonsets_all(&self, cluster: &str) -> Vec<DaemonSet> {
        let Some(client) = self.clients.get(cluster) else { return Vec::new() };
        let api: Api<DaemonSet> = Api::all(client.clone());
        list_or_empty(api, cluster, "DaemonSet").await
    }

    pub async fn list_replicasets_all(&self, cluster: &str) -> Vec<ReplicaSet> {
        let Some(client) = self.clients.get(cluster) else { return Vec::new() };
        let api: Api<ReplicaSet> = Api::all(client.clone());
        list_or_empty(api, cluster, "ReplicaSet").await
    }

    pub async fn list_ingresses_all(&self, cluster: &str) -> Vec<Ingress> {
        let Some(client) = self.clients.get(cluster) else { return Vec::new() };
        let api: Api<Ingress> = Api::all(client.clone());
        list_or_empty(api, cluster, "Ingress").await
    }

    pub async fn list_pvcs_all(&self, cluster: &str) -> Vec<PersistentVolumeClaim> {
        let Some(client) = self.clients.get(cluster) else { return Vec::new() };
        let api: Api<PersistentVolumeClaim> = Api::all(client.clone());
        list_or_empty(api, cluster, "PersistentVolumeClaim").await
    }
}

async fn list_or_empty<K>(api: Api<K>, cluster: &str, kind: &str) -> Vec<K>
where
    K: Clone + std::fmt::Debug + for<'de> serde::Deserialize<'de>,
{
    match api.list(&ListParams::default()).await {
        Ok(list) => list.items,
        Err(err) => {
            warn!(cluster = %cluster, kind, error = %err, "kube list failed");
            Vec::new()
        }
    }
}
