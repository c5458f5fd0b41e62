//! Deduplicates bare/enriched `Network` nodes.
//!
//! Multiple syncers `MERGE (:Network {name: $name})` as a bare reference
//! target; only the network-discovery-equivalent syncer sets `cidr`. This
//! collapses the bare copy into the enriched one once both exist.
//!
//! Ported from `graph.lifecycle.dedup_network_nodes`, generalized to
//! repoint every edge incident on the bare node, not just `CONNECTED_TO`
//! as the original Python did. Plain Cypher has no way to create a
//! relationship of a dynamic type without APOC (absent from this stack),
//! so the relationship kinds named in the graph's data model are
//! enumerated explicitly instead.

use graph_store::{GraphError, GraphStore};
use tracing::info;

/// Every relationship kind the data model defines, dedup repoints all of them.
const RELATIONSHIP_TYPES: &[&str] = &[
    "CONNECTED_TO",
    "CONNECTED_VIA",
    "HOSTS",
    "RUNS_ON",
    "MAPS_TO",
    "SCHEDULED_ON",
    "BELONGS_TO",
    "BACKED_BY",
    "SELECTS",
    "ROUTES_TO",
    "PROXIES_TO",
    "ROUTES_THROUGH",
    "RESOLVES_TO",
    "POINTS_TO",
    "CONTAINS",
    "CLAIMED_BY",
    "DEPLOYS",
    "DEPENDS_ON",
    "MONITORS",
    "VISUALIZES",
    "AFFECTS",
    "ON_NETWORK",
    "LOCATED_IN",
    "NETWORK_INTERFACE_FOR",
    "EXPOSES",
    "CONTROLLED_BY",
    "RESOLVES",
    "TROUBLESHOOTS",
    "APPLIES_TO",
];

/// Collapses every `(bare, enriched)` `Network` pair sharing a `name`, then
/// deletes bare nodes left with zero relationships. Idempotent: a second run
/// finds no bare/enriched pairs left to collapse (R2).
pub async fn dedup_network_nodes(graph: &GraphStore) -> Result<i64, GraphError> {
    for rel in RELATIONSHIP_TYPES {
        graph
        .write(
            &format!(
                "MATCH (bare:Network), (enriched:Network) \
                WHERE bare.name = enriched.name \
                AND enriched.cidr IS NOT NULL AND bare.cidr IS NULL \
                WITH bare, enriched \
                MATCH (source)-[r:{rel}]->(bare) \
                MERGE (source)-[:{rel}]->(enriched) \
                DELETE r"
            ),
            vec![],
        )
        .await?;

        graph
        .write(
            &format!(
                "MATCH (bare:Network), (enriched:Network) \
                WHERE bare.name = enriched.name \
                AND enriched.cidr IS NOT NULL AND bare.cidr IS NULL \
                WITH bare, enriched \
                MATCH (bare)-[r:{rel}]->(target) \
                MERGE (enriched)-[:{rel}]->(target) \
                DELETE r"
            ),
            vec![],
        )
        .await?;
    }

    let rows = graph
    .query(
        "MATCH (bare:Network) \
        WHERE bare.cidr IS NULL AND NOT (bare)-[]-() \
        DETACH DELETE bare \
        RETURN count(bare) AS deleted",
        vec![],
    )
    .await?;
    let deleted: i64 = rows.first().and_then(|r| r.get_opt("deleted")).unwrap_or(0);
    info!(deleted, "deduplicated bare Network nodes");
    Ok(deleted)
}
