//! Mark & sweep lifecycle management and the tiered orphan-pruning GC.
//!
//! This is a near-direct port of the Python `graph.lifecycle` module's
//! `mark_all_stale` / `mark_active` / `sweep_stale` / `mark_orphans` /
//! `sweep_aged_orphans` functions onto `graph_store::GraphStore`.

mod constants;
mod orphans;

pub use constants::{GRACE_TIERS, MANAGED_LABELS, PROTECTED_LABELS};
pub use orphans::OrphanStats;

use graph_store::{GraphError, GraphStore};
use serde_json::Value;
use tracing::info;

/// Phase 1: mark every node of every managed label stale before a cycle's syncers run.
pub async fn mark_all_stale(graph: &GraphStore, labels: &[&str]) -> Result<(), GraphError> {
    for label in labels {
        graph
            .write(&format!("MATCH (n:{label}) SET n._sync_status = 'stale'"), vec![])
            .await?;
    }
    info!(labels = labels.len(), "marked all managed labels stale");
    Ok(())
}

/// Phase 2: called by a syncer after a successful `batch_merge` to flip survivors back to active.
pub async fn mark_active(
    graph: &GraphStore,
    label: &str,
    ids: Vec<Value>,
    id_field: &str,
) -> Result<(), GraphError> {
    if ids.is_empty() {
        return Ok(());
    }
    let cypher = format!(
        "UNWIND $ids AS id \
         MATCH (n:{label} {{{id_field}: id}}) \
         SET n._sync_status = 'active', n.last_seen = datetime()"
    );
    graph.write(&cypher, vec![("ids", Value::Array(ids))]).await?;
    Ok(())
}

/// Phase 3: detach-delete every node still `stale` after the cycle's syncers ran.
pub async fn sweep_stale(graph: &GraphStore, labels: &[&str]) -> Result<i64, GraphError> {
    let mut total = 0i64;
    for label in labels {
        let rows = graph
            .query(
                &format!(
                    "MATCH (n:{label} {{_sync_status: 'stale'}}) \
                     DETACH DELETE n \
                     RETURN count(n) AS deleted"
                ),
                vec![],
            )
            .await?;
        let deleted: i64 = rows.first().and_then(|r| r.get_opt("deleted")).unwrap_or(0);
        if deleted > 0 {
            info!(label = %label, deleted, "swept stale nodes");
            total += deleted;
        }
    }
    info!(total, "sweep complete");
    Ok(total)
}

/// Protect manually-enriched nodes, then mark newly-orphaned nodes and clear
/// the orphan flag on any that regained a relationship.
pub async fn mark_orphans(graph: &GraphStore) -> Result<i64, GraphError> {
    graph
        .write(
            "MATCH (n) \
             WHERE (n.description IS NOT NULL AND n.description <> '') \
                OR (n.notes IS NOT NULL AND n.notes <> '') \
                OR (n.owner IS NOT NULL AND n.owner <> '') \
             SET n._protected = true",
            vec![],
        )
        .await?;

    let protected_clause = PROTECTED_LABELS
        .iter()
        .map(|label| format!("NOT n:{label}"))
        .collect::<Vec<_>>()
        .join(" AND ");

    let rows = graph
        .query(
            &format!(
                "MATCH (n) \
                 WHERE NOT (n)-[]-() \
                   AND n._sync_status = 'active' \
                   AND n.orphan_since IS NULL \
                   AND NOT coalesce(n._protected, false) \
                   AND {protected_clause} \
                 SET n.orphan_since = datetime() \
                 RETURN count(n) AS marked"
            ),
            vec![],
        )
        .await?;
    let marked: i64 = rows.first().and_then(|r| r.get_opt("marked")).unwrap_or(0);
    if marked > 0 {
        info!(marked, "marked new orphan nodes");
    }

    let rows = graph
        .write(
            "MATCH (n) \
             WHERE n.orphan_since IS NOT NULL AND (n)-[]-() \
             SET n.orphan_since = NULL \
             RETURN count(n) AS cleared",
            vec![],
        )
        .await?;
    let cleared: i64 = rows.first().and_then(|r| r.get_opt("cleared")).unwrap_or(0);
    if cleared > 0 {
        info!(cleared, "cleared orphan status for reconnected nodes");
    }

    Ok(marked)
}

/// Delete every orphan past its label's grace tier. Protected labels are
/// skipped even if somehow present in the result set (defense in depth —
/// `mark_orphans` never flags them in the first place).
pub async fn sweep_aged_orphans(graph: &GraphStore) -> Result<i64, GraphError> {
    let rows = graph
        .query(
            "MATCH (n) \
             WHERE n.orphan_since IS NOT NULL \
             RETURN DISTINCT labels(n)[0] AS label, count(n) AS count",
            vec![],
        )
        .await?;

    let mut total = 0i64;
    for row in &rows {
        let label: Option<String> = row.get_opt("label");
        let Some(label) = label else { continue };
        if PROTECTED_LABELS.contains(&label.as_str()) {
            continue;
        }

        let grace_days = constants::grace_days(&label);
        let delete_rows = graph
            .query(
                &format!(
                    "MATCH (n:{label}) \
                     WHERE n.orphan_since IS NOT NULL \
                       AND n.orphan_since < datetime() - duration({{days: {grace_days}}}) \
                       AND NOT coalesce(n._protected, false) \
                     DETACH DELETE n \
                     RETURN count(n) AS pruned"
                ),
                vec![],
            )
            .await?;
        let pruned: i64 = delete_rows.first().and_then(|r| r.get_opt("pruned")).unwrap_or(0);
        if pruned > 0 {
            info!(label = %label, pruned, grace_days, "pruned aged orphans");
            total += pruned;
        }
    }

    if total > 0 {
        info!(total, "orphan lifecycle pruned aged orphans");
    }
    Ok(total)
}

/// Statistics on current orphans, bucketed by age, for the orchestrator's
/// end-of-cycle log line.
pub async fn orphan_stats(graph: &GraphStore) -> Result<OrphanStats, GraphError> {
    let rows = graph
        .query(
            "MATCH (n) \
             WHERE n.orphan_since IS NOT NULL \
             WITH labels(n)[0] AS label, \
                  CASE \
                    WHEN n.orphan_since > datetime() - duration({days: 1}) THEN '<1d' \
                    WHEN n.orphan_since > datetime() - duration({days: 7}) THEN '1-7d' \
                    WHEN n.orphan_since > datetime() - duration({days: 14}) THEN '7-14d' \
                    WHEN n.orphan_since > datetime() - duration({days: 30}) THEN '14-30d' \
                    ELSE '>30d' \
                  END AS age_bucket, \
                  count(*) AS count \
             RETURN label, age_bucket, count \
             ORDER BY label, age_bucket",
            vec![],
        )
        .await?;

    let mut stats = OrphanStats::default();
    for row in &rows {
        let label: String = row.get("label").unwrap_or_default();
        let bucket: String = row.get("age_bucket").unwrap_or_default();
        let count: i64 = row.get_opt("count").unwrap_or(0);
        stats.entry(label).or_default().insert(bucket, count);
    }
    Ok(stats)
}
