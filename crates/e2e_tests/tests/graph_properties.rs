//! Live-Neo4j integration tests for the sync/lifecycle properties. Each test spins its own container via
//! [`e2e_tests::GraphTestEnv`]; `#[serial]` keeps them from piling up too
//! many containers on one machine at once.

use e2e_tests::{GraphTestEnv, Seed};
use serial_test::serial;

fn init_logging() {
    let _ = tracing_subscriber::fmt().with_env_filter("info,e2e_tests=debug").try_init();
}

/// After a full mark/sweep cycle, no managed node is left `stale`.
#[tokio::test]
#[ignore = "requires a local Docker daemon to run the Neo4j test container"]
#[serial]
async fn post_cycle_leaves_no_stale_nodes() {
    init_logging();
    let env = GraphTestEnv::new("post_cycle_leaves_no_stale_nodes").await.unwrap();
    let seed = Seed::new(&env.graph);

    seed.host("alive-host", true).await.unwrap();
    seed.host("dead-host", false).await.unwrap();

    let pruned = lifecycle::sweep_stale(&env.graph, &["Host"]).await.unwrap();
    assert_eq!(pruned, 1);

    let remaining = seed.node_count("Host").await.unwrap();
    assert_eq!(remaining, 1);
}

/// `batch_merge` is idempotent — running the same rows twice leaves the
/// node count unchanged.
#[tokio::test]
#[ignore = "requires a local Docker daemon to run the Neo4j test container"]
#[serial]
async fn batch_merge_is_idempotent() {
    init_logging();
    let env = GraphTestEnv::new("batch_merge_is_idempotent").await.unwrap();
    let seed = Seed::new(&env.graph);

    let tail = "MERGE (h:Host {hostname: row.hostname}) SET h._sync_status = 'active'";
    let rows = vec![e2e_tests::row([("hostname", serde_json::json!("repeat-host"))])];

    env.graph.batch_merge(tail, rows.clone()).await.unwrap();
    env.graph.batch_merge(tail, rows).await.unwrap();

    assert_eq!(seed.node_count("Host").await.unwrap(), 1);
}

/// Bare-vs-enriched `Network` dedup collapses to exactly one node
/// per name, and running dedup twice is a no-op (idempotent).
#[tokio::test]
#[ignore = "requires a local Docker daemon to run the Neo4j test container"]
#[serial]
async fn network_dedup_collapses_to_one_node_and_is_idempotent() {
    init_logging();
    let env = GraphTestEnv::new("network_dedup").await.unwrap();
    let seed = Seed::new(&env.graph);

    seed.bare_network("prod").await.unwrap();
    seed.enriched_network("prod", "10.0.0.0/24").await.unwrap();
    seed.connect("Host", "some-host", "CONNECTED_TO", "Network", "prod").await.unwrap();
    seed.host("some-host", true).await.unwrap();

    let first_pass = dedup::dedup_network_nodes(&env.graph).await.unwrap();
    assert_eq!(first_pass, 1, "exactly one bare duplicate should be repointed and removed");
    assert_eq!(seed.node_count("Network").await.unwrap(), 1);

    let second_pass = dedup::dedup_network_nodes(&env.graph).await.unwrap();
    assert_eq!(second_pass, 0, "dedup must be a no-op on an already-deduped graph");
}

/// Protected labels are never orphan-pruned even with zero relationships.
#[tokio::test]
#[ignore = "requires a local Docker daemon to run the Neo4j test container"]
#[serial]
async fn protected_labels_are_never_orphan_pruned() {
    init_logging();
    let env = GraphTestEnv::new("protected_labels").await.unwrap();
    let seed = Seed::new(&env.graph);

    seed.bare_node("Network", "isolated-protected-network").await.unwrap();
    lifecycle::mark_orphans(&env.graph).await.unwrap();
    seed.set_orphan_since_days_ago("Network", "isolated-protected-network", 9999).await.unwrap();

    lifecycle::sweep_aged_orphans(&env.graph).await.unwrap();

    assert_eq!(seed.node_count("Network").await.unwrap(), 1, "Network is a protected label");
}

/// A node with a non-empty `description` is never marked orphaned, even
/// with zero relationships.
#[tokio::test]
#[ignore = "requires a local Docker daemon to run the Neo4j test container"]
#[serial]
async fn described_nodes_are_never_orphaned() {
    init_logging();
    let env = GraphTestEnv::new("described_nodes").await.unwrap();
    let seed = Seed::new(&env.graph);

    seed.described_node("Pod", "hand-annotated-pod", "manually kept around for a demo").await.unwrap();
    let marked = lifecycle::mark_orphans(&env.graph).await.unwrap();
    assert_eq!(marked, 0, "a described node must be protected before orphan marking runs");

    let rows = env
    .graph
    .query("MATCH (n:Pod {name: 'hand-annotated-pod'}) RETURN n.orphan_since AS orphan_since", vec![])
    .await
    .unwrap();
    let orphan_since: Option<String> = rows.first().and_then(|r| r.get_opt("orphan_since"));
    assert!(orphan_since.is_none());
}

/// An orphan younger than its grace tier survives a sweep; past it, it
/// is pruned.
#[tokio::test]
#[ignore = "requires a local Docker daemon to run the Neo4j test container"]
#[serial]
async fn orphan_grace_tier_governs_pruning() {
    init_logging();
    let env = GraphTestEnv::new("orphan_grace_tier").await.unwrap();
    let seed = Seed::new(&env.graph);

    seed.bare_node("Pod", "young-orphan-pod").await.unwrap();
    seed.bare_node("Pod", "old-orphan-pod").await.unwrap();
    lifecycle::mark_orphans(&env.graph).await.unwrap();

    seed.set_orphan_since_days_ago("Pod", "young-orphan-pod", 0).await.unwrap();
    seed.set_orphan_since_days_ago("Pod", "old-orphan-pod", 365).await.unwrap();

    lifecycle::sweep_aged_orphans(&env.graph).await.unwrap();

    assert_eq!(seed.node_count("Pod").await.unwrap(), 1, "only the node past its grace tier is pruned");
}

/// A Pod resolves to its owning Deployment via the two-hop
/// ReplicaSet lookup and lands a `BELONGS_TO` edge.
#[tokio::test]
#[ignore = "requires a local Docker daemon to run the Neo4j test container"]
#[serial]
async fn pod_belongs_to_resolved_deployment() {
    init_logging();
    let env = GraphTestEnv::new("pod_belongs_to_deployment").await.unwrap();
    let seed = Seed::new(&env.graph);

    seed.replicaset_owned_pod("web-7f9c-abcde", "default", "web", "node-1").await.unwrap();

    let rows = env
    .graph
    .query(
        "MATCH (p:Pod {name: 'web-7f9c-abcde'})-[:BELONGS_TO]->(d:Deployment {name: 'web'}) RETURN count(p) AS c",
        vec![],
    )
    .await
    .unwrap();
    let count: i64 = rows.first().and_then(|r| r.get_opt("c")).unwrap_or(0);
    assert_eq!(count, 1);
}

/// An Ingress with a named backend Service gets exactly one `ROUTES_TO`
/// edge and is marked `active`.
#[tokio::test]
#[ignore = "requires a local Docker daemon to run the Neo4j test container"]
#[serial]
async fn ingress_routes_to_backend_service() {
    init_logging();
    let env = GraphTestEnv::new("ingress_routes_to_service").await.unwrap();
    let seed = Seed::new(&env.graph);

    seed.ingress_with_backend("web-ingress", "default", "web-svc").await.unwrap();

    let rows = env
    .graph
    .query(
        "MATCH (i:Ingress {name: 'web-ingress'}) RETURN i.status AS status",
        vec![],
    )
    .await
    .unwrap();
    let status: Option<String> = rows.first().and_then(|r| r.get_opt("status"));
    assert_eq!(status.as_deref(), Some("active"));

    let rows = env
    .graph
    .query(
        "MATCH (:Ingress {name: 'web-ingress'})-[:ROUTES_TO]->(s:Service {name: 'web-svc'}) RETURN count(s) AS c",
        vec![],
    )
    .await
    .unwrap();
    let count: i64 = rows.first().and_then(|r| r.get_opt("c")).unwrap_or(0);
    assert_eq!(count, 1);
}

/// `sweep_stale` against a label with no matching nodes at all is a
/// harmless no-op, not an error.
#[tokio::test]
#[ignore = "requires a local Docker daemon to run the Neo4j test container"]
#[serial]
async fn sweeping_an_empty_label_is_a_no_op() {
    init_logging();
    let env = GraphTestEnv::new("sweep_empty_label").await.unwrap();
    let pruned = lifecycle::sweep_stale(&env.graph, &["Dataset"]).await.unwrap();
    assert_eq!(pruned, 0);
}

/// `mark_active` with an empty id list performs no write and does not
/// error.
#[tokio::test]
#[ignore = "requires a local Docker daemon to run the Neo4j test container"]
#[serial]
async fn mark_active_with_empty_ids_is_a_no_op() {
    init_logging();
    let env = GraphTestEnv::new("mark_active_empty").await.unwrap();
    lifecycle::mark_active(&env.graph, "Host", vec![], "hostname").await.unwrap();
}

/// Re-running `mark_orphans` on an already-orphaned, already-protected
/// graph changes nothing further (stable fixed point).
#[tokio::test]
#[ignore = "requires a local Docker daemon to run the Neo4j test container"]
#[serial]
async fn mark_orphans_reaches_a_stable_fixed_point() {
    init_logging();
    let env = GraphTestEnv::new("mark_orphans_fixed_point").await.unwrap();
    let seed = Seed::new(&env.graph);

    seed.bare_node("Pod", "solo-pod").await.unwrap();
    let first = lifecycle::mark_orphans(&env.graph).await.unwrap();
    assert_eq!(first, 1);

    let second = lifecycle::mark_orphans(&env.graph).await.unwrap();
    assert_eq!(second, 0, "a node already marked orphaned should not be marked again");
}

/// A Service whose selector is a subset of a Pod's labels
/// (same namespace+cluster) gets a `SELECTS` edge from the cross-source
/// linker.
#[tokio::test]
#[ignore = "requires a local Docker daemon to run the Neo4j test container"]
#[serial]
async fn service_selects_matching_pod() {
    init_logging();
    let env = GraphTestEnv::new("service_selects_pod").await.unwrap();
    let seed = Seed::new(&env.graph);

    seed.service_selecting_pod("web-svc", "web-7f9c-abcde", "default", "prod", "app", "web")
    .await
    .unwrap();

    let counts = linker::run_all(&env.graph).await.unwrap();
    assert_eq!(counts.service_pod, 1);

    let rows = env
    .graph
    .query(
        "MATCH (:Service {name: 'web-svc'})-[:SELECTS]->(:Pod {name: 'web-7f9c-abcde'}) RETURN count(*) AS c",
        vec![],
    )
    .await
    .unwrap();
    let count: i64 = rows.first().and_then(|r| r.get_opt("c")).unwrap_or(0);
    assert_eq!(count, 1);
}

/// Verifies the graph store's own liveness probe, used by
/// `discovery_sync`'s one fatal-startup-failure path.
#[tokio::test]
#[ignore = "requires a local Docker daemon to run the Neo4j test container"]
#[serial]
async fn graph_store_verify_reports_liveness() {
    init_logging();
    let env = GraphTestEnv::new("graph_store_verify").await.unwrap();
    assert!(env.graph.verify().await);
}
