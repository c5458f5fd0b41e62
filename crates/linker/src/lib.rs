//! Cross-source linking passes: edges whose endpoints come from two
//! different syncers. Runs once per cycle, after every syncer has finished,
//! so every endpoint a pass might need already exists in the graph.

mod argocd;
mod dns;
mod service_pod;

pub use graph_store::GraphError;

use graph_store::GraphStore;
use tracing::info;

#[derive(Debug, Default, Clone, Copy)]
pub struct LinkCounts {
    pub service_pod: i64,
    pub argocd_service: i64,
    pub dns_reverse_proxy: i64,
    pub reverse_proxy_target: i64,
    pub cloudflare_tunnel: i64,
    pub cname_chain: i64,
    pub dns_ingress: i64,
}

impl LinkCounts {
    pub fn total(&self) -> i64 {
        self.service_pod
        + self.argocd_service
        + self.dns_reverse_proxy
        + self.reverse_proxy_target
        + self.cloudflare_tunnel
        + self.cname_chain
        + self.dns_ingress
    }
}

/// Run every linking pass in the order. No pass depends on
/// another having run first within this call — the ordering matters only
/// relative to the syncers, not internally — but running DNS->ReverseProxy
/// before ReverseProxy->target keeps the log output readable.
pub async fn run_all(graph: &GraphStore) -> Result<LinkCounts, GraphError> {
    let service_pod = service_pod::link_services_to_pods(graph).await?;
    let argocd_service = argocd::link_argo_apps_to_services(graph).await?;
    let dns_reverse_proxy = dns::link_dns_to_reverse_proxies(graph).await?;
    let reverse_proxy_target = dns::link_reverse_proxy_targets(graph).await?;
    let cloudflare_tunnel = dns::link_cname_to_tunnels(graph).await?;
    let cname_chain = dns::link_cname_chains(graph).await?;
    let dns_ingress = dns::link_dns_to_ingresses(graph).await?;

    let counts = LinkCounts {
        service_pod,
        argocd_service,
        dns_reverse_proxy,
        reverse_proxy_target,
        cloudflare_tunnel,
        cname_chain,
        dns_ingress,
    };
    info!(total = counts.total(), ?counts, "cross-source linking complete");
    Ok(counts)
}
