use std::collections::HashMap;

use std::borrow::Cow;

use serde::Deserialize;
use serde_json::json;
use specialists::{Alert, SpecialistFinding};
use tracing::warn;

use crate::rule_based::rule_based_synthesis;
use crate::result::SynthesisResult;
use crate::weights::DEFAULT_WEIGHT;

const OPENROUTER_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

const SYSTEM_PROMPT: &str = "You are synthesizing findings from multiple specialist agents.

Weight the findings by domain authority (security > devops > sre > network > database > infrastructure).
Determine the overall verdict and recommended action.

Output JSON with:
- verdict: ACTIONABLE (needs fix), UNKNOWN (needs investigation), FALSE_POSITIVE (no action)
- confidence: 0.0-1.0
- synthesis: Brief explanation of the root cause
- suggested_action: Specific command or action to take (if actionable)";

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}
#[derive(Deserialize)]
struct Choice {
    message: Message,
}
#[derive(Deserialize)]
struct Message {
    content: String,
}

#[derive(Deserialize)]
struct SynthesisPayload {
    verdict: Option<String>,
    confidence: Option<f64>,
    synthesis: Option<String>,
    suggested_action: Option<String>,
}

fn format_finding(finding: &SpecialistFinding, weights: &HashMap<&str, f64>) -> String {
    let weight = weights.get(finding.agent.as_str()).copied().unwrap_or(DEFAULT_WEIGHT);
    let evidence: Cow<str> = match &finding.evidence {
        Some(e) => Cow::Owned(e.chars().take(200).collect()),
        None => Cow::Borrowed("None"),
    };
    format!(
        "**{}** (weight: {weight}):\nStatus: {}\nIssue: {}\nEvidence: {evidence}\nRecommendation: {}",
        finding.agent.to_uppercase(),
        finding.status,
        finding.issue.as_deref().unwrap_or("None"),
        finding.recommendation.as_deref().unwrap_or("None"),
    )
}

/// Synthesize via the LLM, falling back to the rule-based path on any
/// error — a missing API key, a timeout, a malformed response all degrade
/// the same way.
pub async fn synthesize(
    http: &reqwest::Client,
    api_key: Option<&str>,
    model: &str,
    findings: &[SpecialistFinding],
    alert: &Alert,
    weights: &HashMap<&str, f64>,
) -> SynthesisResult {
    if findings.is_empty() {
        return SynthesisResult::no_findings();
    }

    let Some(api_key) = api_key else {
        return rule_based_synthesis(findings, alert, weights);
    };

    match call_llm(http, api_key, model, findings, alert, weights).await {
        Ok(result) => result,
        Err(err) => {
            warn!(error = %err, "LLM synthesis failed, using rule-based");
            rule_based_synthesis(findings, alert, weights)
        }
    }
}

async fn call_llm(
    http: &reqwest::Client,
    api_key: &str,
    model: &str,
    findings: &[SpecialistFinding],
    alert: &Alert,
    weights: &HashMap<&str, f64>,
) -> Result<SynthesisResult, reqwest::Error> {
    let findings_text =
    findings.iter().map(|f| format_finding(f, weights)).collect::<Vec<_>>().join("\n\n");
    let user_message = format!(
        "\nAlert: {} ({})\n\nSpecialist findings:\n{findings_text}\n\nSynthesize these findings into a final verdict and action.\n",
        alert.name, alert.severity,
    );

    let response = http
    .post(OPENROUTER_URL)
    .bearer_auth(api_key)
    .header("HTTP-Referer", "https://kernow.io")
    .header("X-Title", "Homelab Triage")
    .json(&json!({
                "model": model,
                "messages": [
                    {"role": "system", "content": SYSTEM_PROMPT},
                    {"role": "user", "content": user_message},
                ],
                "response_format": {"type": "json_object"},
                "max_tokens": 500,
                "temperature": 0.2,
    }))
    .send()
    .await?
    .error_for_status()?;

    let body: ChatResponse = response.json().await?;
    let content = body.choices.into_iter().next().map(|c| c.message.content).unwrap_or_default();
    let parsed: SynthesisPayload = serde_json::from_str(&content).unwrap_or(SynthesisPayload {
            verdict: None,
            confidence: None,
            synthesis: None,
            suggested_action: None,
    });

    Ok(SynthesisResult {
            verdict: parsed.verdict.unwrap_or_else(|| "UNKNOWN".to_string()),
            confidence: parsed.confidence.unwrap_or(0.5),
            synthesis: parsed.synthesis.unwrap_or_else(|| "Analysis complete".to_string()),
            suggested_action: parsed.suggested_action,
    })
}
