//! Triage-pipeline fallback behavior: no live infrastructure
//! required, since these exercise pure in-process fallback logic.

use std::collections::HashMap;

use pretty_assertions::assert_eq;
use specialists::{Alert, SpecialistFinding};
use synthesis::{domain_weights, rule_based_synthesis, synthesize};

fn sample_alert() -> Alert {
    Alert {
        name: "PodCrashLooping".to_string(),
        severity: "critical".to_string(),
        labels: HashMap::from([("namespace".to_string(), "default".to_string())]),
        description: Some("web-7f9c-abcde restarted 6 times in 10 minutes".to_string()),
    }
}

/// When no LLM API key is configured, `synthesize` falls back to the
/// deterministic rule-based engine and still returns a verdict — the
/// caller never sees an error from a missing/unavailable LLM.
#[tokio::test]
async fn synthesize_without_api_key_falls_back_to_rule_based() {
    let http = reqwest::Client::new();
    let alert = sample_alert();
    let weights = domain_weights();

    let findings = vec![SpecialistFinding {
            agent: "security".to_string(),
            status: "FAIL".to_string(),
            issue: Some("RBAC binding grants cluster-admin to a service account".to_string()),
            evidence: Some("rolebinding/web-sa-admin".to_string()),
            recommendation: Some("scope the binding to the namespace".to_string()),
            tools_used: vec!["kubectl_get_rolebindings".to_string()],
            latency_ms: 42,
    }];

    let via_synthesize = synthesize(&http, None, "irrelevant-model", &findings, &alert, &weights).await;
    let via_rule_based = rule_based_synthesis(&findings, &alert, &weights);

    // Full-struct comparison (not just the verdict field) — with no API
    // key, `synthesize` must take the exact same path as calling the
    // rule-based synthesizer directly, down to the synthesis text.
    assert_eq!(via_synthesize, via_rule_based);
    assert_eq!(via_synthesize.verdict, "ACTIONABLE");
    assert!(via_synthesize.confidence >= 0.7);
}

/// Zero specialist findings short-circuits to `{UNKNOWN, 0.3, "no findings"}`
/// rather than reaching synthesis at all.
#[tokio::test]
async fn empty_findings_short_circuit_to_unknown_before_synthesis() {
    let findings: Vec<SpecialistFinding> = Vec::new();

    let result = if findings.is_empty() {
        synthesis::SynthesisResult::no_findings()
    } else {
        unreachable!("this branch must not run when findings is empty")
    };

    assert_eq!(result.verdict, "UNKNOWN");
    assert_eq!(result.confidence, 0.3);
}

/// An all-PASS finding set is a confident false positive, never
/// actionable.
#[tokio::test]
async fn all_pass_findings_synthesize_to_false_positive() {
    let alert = sample_alert();
    let weights = domain_weights();

    let findings: Vec<SpecialistFinding> = specialists::SPECIALISTS
    .iter()
    .map(|agent| SpecialistFinding {
            agent: agent.to_string(),
            status: "PASS".to_string(),
            issue: None,
            evidence: None,
            recommendation: None,
            tools_used: vec![],
            latency_ms: 10,
    })
    .collect();

    let result = rule_based_synthesis(&findings, &alert, &weights);
    assert_eq!(result.verdict, "FALSE_POSITIVE");
}
