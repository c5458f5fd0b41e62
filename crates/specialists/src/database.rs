use std::time::Instant;

use serde_json::json;

use crate::alert::Alert;
use crate::context::SpecialistContext;
use crate::finding::{truncate_evidence, SpecialistFinding};
use crate::llm::gemini_analyze;

pub const AGENT: &str = "database";

const SYSTEM_PROMPT: &str = "You are a database specialist investigating an alert for storage \
pool or backing-dataset issues. Respond with JSON {status: PASS|WARN|FAIL, issue, \
    recommendation}.";

/// Storage-pool evidence is only worth gathering when the alert actually
/// mentions a data store; otherwise this specialist has nothing useful to
/// say and defers via a PASS from the LLM on empty evidence.
pub async fn investigate(ctx: &SpecialistContext, alert: &Alert) -> SpecialistFinding {
    let start = Instant::now();
    let mut tools_used = Vec::new();

    let relevant = alert.labels_match(&["db", "database", "postgres", "mysql", "redis", "sql"])
    || alert.name_matches(&["db", "database", "postgres", "mysql", "redis", "sql"]);

    let (pools, alerts) = if relevant {
        tools_used.push("truenas_list_pools".to_string());
        tools_used.push("truenas_get_alerts".to_string());
        (
            ctx.tools.call_tool("infrastructure", "truenas_list_pools", json!({})).await,
            ctx.tools.call_tool("infrastructure", "truenas_get_alerts", json!({})).await,
        )
    } else {
        (serde_json::Value::Null, serde_json::Value::Null)
    };

    let evidence = truncate_evidence(format!("pools={pools}\nstorage_alerts={alerts}"));

    match gemini_analyze(&ctx.http, ctx.api_key.as_deref(), &ctx.model, SYSTEM_PROMPT, alert, &evidence).await {
        Ok(analysis) => SpecialistFinding {
            agent: AGENT.to_string(),
            status: analysis.status,
            issue: Some(analysis.issue),
            evidence: Some(evidence),
            recommendation: analysis.recommendation,
            tools_used,
            latency_ms: start.elapsed().as_millis() as u64,
        },
        Err(err) => SpecialistFinding::error(AGENT, err, tools_used, start.elapsed().as_millis() as u64),
    }
}
