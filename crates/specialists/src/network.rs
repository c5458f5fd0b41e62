use std::time::Instant;

use serde_json::json;

use crate::alert::Alert;
use crate::context::SpecialistContext;
use crate::finding::{truncate_evidence, SpecialistFinding};
use crate::llm::gemini_analyze;

pub const AGENT: &str = "network";

const SYSTEM_PROMPT: &str = "You are a network specialist investigating connectivity and DNS \
alerts. Respond with JSON {status: PASS|WARN|FAIL, issue, recommendation}.";

/// DNS rewrites plus the Kubernetes service list — the two things that
/// determine whether traffic can reach a destination.
pub async fn investigate(ctx: &SpecialistContext, alert: &Alert) -> SpecialistFinding {
    let start = Instant::now();
    let mut tools_used = Vec::new();
    let namespace = alert.label("namespace").unwrap_or("default");

    let rewrites = ctx.tools.call_tool("infrastructure", "adguard_get_rewrites", json!({})).await;
    tools_used.push("adguard_get_rewrites".to_string());

    let services = ctx
    .tools
    .call_tool("observability", "kubectl_get_services", json!({"namespace": namespace}))
    .await;
    tools_used.push("kubectl_get_services".to_string());

    let evidence = truncate_evidence(format!("dns_rewrites={rewrites}\nservices={services}"));

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
