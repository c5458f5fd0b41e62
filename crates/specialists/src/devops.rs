use std::time::Instant;

use serde_json::json;

use crate::alert::Alert;
use crate::context::SpecialistContext;
use crate::finding::{truncate_evidence, SpecialistFinding};
use crate::llm::gemini_analyze;

pub const AGENT: &str = "devops";

const SYSTEM_PROMPT: &str = "You are a DevOps specialist investigating a Kubernetes alert. \
Assess pod and deployment health from the evidence and respond with JSON \
{status: PASS|WARN|FAIL, issue, recommendation}.";

/// Pods and recent events always; logs only when the alert name suggests a
/// crash or OOM, to keep the common case cheap.
pub async fn investigate(ctx: &SpecialistContext, alert: &Alert) -> SpecialistFinding {
    let start = Instant::now();
    let mut tools_used = Vec::new();
    let namespace = alert.label("namespace").unwrap_or("default");

    let pods = ctx
    .tools
    .call_tool("observability", "kubectl_get_pods", json!({"namespace": namespace}))
    .await;
    tools_used.push("kubectl_get_pods".to_string());

    let events = ctx
    .tools
    .call_tool("observability", "kubectl_get_events", json!({"namespace": namespace}))
    .await;
    tools_used.push("kubectl_get_events".to_string());

    let logs = if alert.name_matches(&["crash", "oom"]) {
        tools_used.push("kubectl_logs".to_string());
        ctx.tools
        .call_tool("observability", "kubectl_logs", json!({"namespace": namespace, "tail_lines": 200}))
        .await
    } else {
        serde_json::Value::Null
    };

    let evidence = truncate_evidence(format!("pods={pods}\nevents={events}\nlogs={logs}"));

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
