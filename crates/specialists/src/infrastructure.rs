use std::time::Instant;

use serde_json::json;

use crate::alert::Alert;
use crate::context::SpecialistContext;
use crate::finding::{truncate_evidence, SpecialistFinding};
use crate::llm::gemini_analyze;

pub const AGENT: &str = "infrastructure";

const SYSTEM_PROMPT: &str = "You are an infrastructure specialist investigating the physical \
and virtualization layer: NAS, hypervisor hosts, and uptime monitors. Respond with JSON \
{status: PASS|WARN|FAIL, issue, recommendation}.";

/// Routes to exactly one of TrueNAS, Proxmox, or Gatus based on which
/// platform the alert's labels name — the three backing systems rarely
/// overlap, so there's no reason to call all three.
pub async fn investigate(ctx: &SpecialistContext, alert: &Alert) -> SpecialistFinding {
    let start = Instant::now();
    let mut tools_used = Vec::new();

    let evidence = if alert.labels_match(&["nas", "truenas", "storage", "pool", "dataset"]) {
        tools_used.push("truenas_get_all_alerts".to_string());
        let alerts = ctx.tools.call_tool("infrastructure", "truenas_get_all_alerts", json!({})).await;
        format!("truenas_alerts={alerts}")
    } else if alert.labels_match(&["proxmox", "pve", "vm", "hypervisor", "node"]) {
        tools_used.push("proxmox_list_vms".to_string());
        tools_used.push("proxmox_list_containers".to_string());
        let vms = ctx.tools.call_tool("infrastructure", "proxmox_list_vms", json!({})).await;
        let containers = ctx.tools.call_tool("infrastructure", "proxmox_list_containers", json!({})).await;
        format!("proxmox_vms={vms}\nproxmox_containers={containers}")
    } else {
        tools_used.push("gatus_get_failing".to_string());
        let failing = ctx.tools.call_tool("infrastructure", "gatus_get_failing", json!({})).await;
        format!("failing_monitors={failing}")
    };
    let evidence = truncate_evidence(evidence);

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
