use std::time::Instant;

use serde_json::json;

use crate::alert::Alert;
use crate::context::SpecialistContext;
use crate::finding::{truncate_evidence, SpecialistFinding};
use crate::llm::gemini_analyze;

pub const AGENT: &str = "sre";

const SYSTEM_PROMPT: &str = "You are an SRE specialist assessing reliability signals for an \
alert: metrics, dependency anomalies, and synthetic-monitor state. Respond with JSON \
{status: PASS|WARN|FAIL, issue, recommendation}.";

/// SRE always pulls the full reliability picture — metrics, Coroot anomaly
/// detection, and Gatus failures — since reliability triage has no cheap
/// subset to skip.
pub async fn investigate(ctx: &SpecialistContext, alert: &Alert) -> SpecialistFinding {
    let start = Instant::now();
    let mut tools_used = Vec::new();
    let service = alert.label("service").unwrap_or(&alert.name).to_string();

    let metrics = ctx
    .tools
    .call_tool("observability", "query_metrics", json!({"service": service}))
    .await;
    tools_used.push("query_metrics".to_string());

    let anomalies = ctx
    .tools
    .call_tool("observability", "coroot_get_anomalies", json!({"service": service}))
    .await;
    tools_used.push("coroot_get_anomalies".to_string());

    let failing = ctx.tools.call_tool("observability", "gatus_get_failing", json!({})).await;
    tools_used.push("gatus_get_failing".to_string());

    let evidence = truncate_evidence(format!("metrics={metrics}\nanomalies={anomalies}\nfailing_monitors={failing}"));

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
