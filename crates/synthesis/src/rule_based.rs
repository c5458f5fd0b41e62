use std::collections::HashMap;

use specialists::{Alert, SpecialistFinding};

use crate::result::SynthesisResult;
use crate::weights::DEFAULT_WEIGHT;

fn severity(status: &str) -> f64 {
    match status {
        "FAIL" => 3.0,
        "ERROR" => 2.0,
        "WARN" => 1.0,
        "PASS" => 0.0,
        _ => 1.0,
    }
}

/// The deterministic fallback synthesis, used whenever the LLM is
/// disabled or a synthesis call errors. Mirrors the weighted-score formula
/// exactly: no LLM involvement, no randomness.
pub fn rule_based_synthesis(
    findings: &[SpecialistFinding],
    alert: &Alert,
    weights: &HashMap<&str, f64>,
) -> SynthesisResult {
    if findings.is_empty() {
        return SynthesisResult::no_findings();
    }

    let mut weighted_score = 0.0;
    let mut total_weight = 0.0;
    let mut issues = Vec::new();
    let mut recommendations = Vec::new();
    let mut fail_count = 0;
    let mut error_count = 0;

    for finding in findings {
        let weight = weights.get(finding.agent.as_str()).copied().unwrap_or(DEFAULT_WEIGHT);
        let sev = severity(&finding.status);
        weighted_score += weight * sev;
        total_weight += weight;

        match finding.status.as_str() {
            "FAIL" => fail_count += 1,
            "ERROR" => error_count += 1,
            _ => {}
        }

        if let Some(issue) = &finding.issue {
            if matches!(finding.status.as_str(), "FAIL" | "WARN" | "ERROR") {
                issues.push(format!("{}: {issue}", finding.agent));
            }
        }
        if let Some(rec) = &finding.recommendation {
            recommendations.push(rec.clone());
        }
    }

    let normalized_score = if total_weight > 0.0 { weighted_score / total_weight } else { 0.0 };

    let (verdict, confidence) = if fail_count > 0 || normalized_score >= 2.0 {
        ("ACTIONABLE", (0.7 + normalized_score * 0.1).min(0.95))
    } else if error_count > 0 || normalized_score >= 1.0 {
        ("UNKNOWN", 0.5 + normalized_score * 0.1)
    } else {
        ("FALSE_POSITIVE", (0.8 - normalized_score * 0.2).max(0.4))
    };

    let synthesis = if !issues.is_empty() {
        issues.into_iter().take(3).collect::<Vec<_>>().join("; ")
    } else {
        format!("Alert '{}' investigated by {} specialists. No critical issues found.", alert.name, findings.len())
    };

    SynthesisResult {
        verdict: verdict.to_string(),
        confidence: (confidence * 100.0).round() / 100.0,
        synthesis,
        suggested_action: recommendations.into_iter().next(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn finding(agent: &str, status: &str) -> SpecialistFinding {
        SpecialistFinding {
            agent: agent.to_string(),
            status: status.to_string(),
            issue: Some(format!("{agent} issue")),
            evidence: None,
            recommendation: None,
            tools_used: vec![],
            latency_ms: 0,
        }
    }

    fn alert() -> Alert {
        Alert { name: "PodCrashLooping".to_string(), severity: "critical".to_string(), labels: HashMap::new(), description: None }
    }

    #[test]
    fn a_single_fail_is_always_actionable() {
        let weights = HashMap::from([("devops", 0.85)]);
        let result = rule_based_synthesis(&[finding("devops", "FAIL")], &alert(), &weights);
        assert_eq!(result.verdict, "ACTIONABLE");
    }

    #[test]
    fn all_pass_is_false_positive() {
        let weights = HashMap::from([("devops", 0.85), ("network", 0.55)]);
        let findings = vec![finding("devops", "PASS"), finding("network", "PASS")];
        let result = rule_based_synthesis(&findings, &alert(), &weights);
        assert_eq!(result.verdict, "FALSE_POSITIVE");
    }

    #[test]
    fn unweighted_agent_falls_back_to_default_weight() {
        let weights = HashMap::new();
        let result = rule_based_synthesis(&[finding("unknown_agent", "WARN")], &alert(), &weights);
        // weighted_score = 0.5 * 1 / 0.5 = 1.0 -> UNKNOWN tier
        assert_eq!(result.verdict, "UNKNOWN");
    }

    #[test]
    fn empty_findings_yields_unknown() {
        let result = rule_based_synthesis(&[], &alert(), &HashMap::new());
        assert_eq!(result.verdict, "UNKNOWN");
        assert_eq!(result.confidence, 0.3);
    }
}
