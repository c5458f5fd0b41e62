//! DNS-rooted linking passes: DNSRecord -> ReverseProxy,
//! ReverseProxy -> its upstream target, DNSRecord(CNAME) -> CloudflareTunnel,
//! CNAME chain resolution, and DNSRecord -> Ingress.

use graph_store::{GraphError, GraphStore};
use tracing::info;

/// DNSRecord -> ReverseProxy by exact domain equality.
pub async fn link_dns_to_reverse_proxies(graph: &GraphStore) -> Result<i64, GraphError> {
    let rows = graph
    .write(
        "MATCH (d:DNSRecord)
        MATCH (p:ReverseProxy {domain: d.domain})
        MERGE (d)-[:ROUTES_THROUGH]->(p)
        RETURN d.domain AS domain",
        vec![],
    )
    .await?;
    let count = rows.len() as i64;
    info!(count, "dns->reverse-proxy linking complete");
    Ok(count)
}

/// ReverseProxy -> Host/VM/NAS/ProxmoxNode/Device by upstream IP, preferring
/// the first label in priority order so a proxy never points at more than
/// one kind of target.
pub async fn link_reverse_proxy_targets(graph: &GraphStore) -> Result<i64, GraphError> {
    let rows = graph
    .write(
        "MATCH (p:ReverseProxy)
        WHERE NOT (p)-[:PROXIES_TO]->() AND p.upstream_ip <> ''
        MATCH (target)
        WHERE (target:Host AND target.ip = p.upstream_ip)
        OR (target:VM AND target.ip = p.upstream_ip)
        OR (target:NAS AND target.ip = p.upstream_ip)
        OR (target:ProxmoxNode AND target.ip = p.upstream_ip)
        OR (target:Device AND target.ip = p.upstream_ip)
        WITH p, target,
        CASE
        WHEN target:Host THEN 0
        WHEN target:VM THEN 1
        WHEN target:NAS THEN 2
        WHEN target:ProxmoxNode THEN 3
        ELSE 4
        END AS priority
        ORDER BY priority
        WITH p, collect(target)[0] AS chosen
        MERGE (p)-[:PROXIES_TO]->(chosen)
        RETURN p.domain AS domain",
        vec![],
    )
    .await?;
    let count = rows.len() as i64;
    info!(count, "reverse-proxy->target linking complete");
    Ok(count)
}

/// DNSRecord(CNAME) -> CloudflareTunnel iff the answer is a `cfargotunnel.com`
/// hostname containing the tunnel's id.
pub async fn link_cname_to_tunnels(graph: &GraphStore) -> Result<i64, GraphError> {
    let rows = graph
    .write(
        "MATCH (r:DNSRecord {record_type: 'CNAME'})
        WHERE r.answer CONTAINS 'cfargotunnel.com'
        MATCH (t:CloudflareTunnel)
        WHERE r.answer CONTAINS t.tunnel_id
        MERGE (r)-[:POINTS_TO]->(t)
        RETURN r.domain AS domain",
        vec![],
    )
    .await?;
    let count = rows.len() as i64;
    info!(count, "cname->tunnel linking complete");
    Ok(count)
}

/// DNSRecord(CNAME) -> DNSRecord chain resolution, for CNAMEs whose answer
/// is itself a known domain rather than a tunnel or raw IP.
pub async fn link_cname_chains(graph: &GraphStore) -> Result<i64, GraphError> {
    let rows = graph
    .write(
        "MATCH (r:DNSRecord {record_type: 'CNAME'})
        MATCH (target:DNSRecord {domain: r.answer})
        WHERE r <> target
        MERGE (r)-[:RESOLVES_TO]->(target)
        RETURN r.domain AS domain",
        vec![],
    )
    .await?;
    let count = rows.len() as i64;
    info!(count, "cname chain linking complete");
    Ok(count)
}

/// DNSRecord -> Ingress by hostname equality, independent of record type —
/// both plain A records and CNAMEs route through an Ingress the same way.
pub async fn link_dns_to_ingresses(graph: &GraphStore) -> Result<i64, GraphError> {
    let rows = graph
    .write(
        "MATCH (d:DNSRecord)
        MATCH (i:Ingress)
        WHERE d.domain IN split(i.hosts, ', ')
        MERGE (d)-[:ROUTES_TO]->(i)
        RETURN d.domain AS domain",
        vec![],
    )
    .await?;
    let count = rows.len() as i64;
    info!(count, "dns->ingress linking complete");
    Ok(count)
}
