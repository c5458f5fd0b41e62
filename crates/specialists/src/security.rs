use std::time::Instant;

use serde_json::json;

use crate::alert::Alert;
use crate::context::SpecialistContext;
use crate::finding::{truncate_evidence, SpecialistFinding};
use crate::llm::gemini_analyze;

pub const AGENT: &str = "security";

const SYSTEM_PROMPT: &str = "You are a security specialist investigating an alert for signs of \
unauthorized access, misconfigured secrets, or RBAC issues. Respond with JSON \
{status: PASS|WARN|FAIL, issue, recommendation}.";

/// Events always; secret listing only when the alert looks auth/RBAC-related
/// — secret enumeration is the most sensitive tool call in the pool, so it
/// stays gated on relevance.
pub async fn investigate(ctx: &SpecialistContext, alert: &Alert) -> SpecialistFinding {
    let start = Instant::now();
    let mut tools_used = Vec::new();
    let namespace = alert.label("namespace").unwrap_or("default");

    let events = ctx
    .tools
    .call_tool("observability", "kubectl_get_events", json!({"namespace": namespace}))
    .await;
    tools_used.push("kubectl_get_events".to_string());

    let secrets = if alert.name_matches(&["auth", "secret", "rbac", "permission", "forbidden"]) {
        tools_used.push("list_secrets".to_string());
        ctx.tools.call_tool("observability", "list_secrets", json!({"namespace": namespace})).await
    } else {
        serde_json::Value::Null
    };

    let evidence = truncate_evidence(format!("events={events}\nsecrets={secrets}"));

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
