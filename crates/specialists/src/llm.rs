//! Gemini-via-OpenRouter client shared by every specialist.

use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use crate::alert::Alert;

const OPENROUTER_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

#[derive(Debug, Clone)]
pub struct Analysis {
    pub status: String,
    pub issue: String,
    pub recommendation: Option<String>,
}

#[derive(thiserror::Error, Debug)]
pub enum LlmError {
    #[error("openrouter request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("openrouter returned no choices")]
    NoChoices,
}

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

#[derive(Deserialize, Default)]
struct AnalysisPayload {
    status: Option<String>,
    issue: Option<String>,
    recommendation: Option<String>,
}

/// Analyze one alert with a specialist's system prompt and gathered
/// evidence. Returns a default `WARN` analysis (never an error) when no
/// API key is configured, matching the "degrade, don't fail" posture the
/// rest of the pipeline assumes.
pub async fn gemini_analyze(
    http: &reqwest::Client,
    api_key: Option<&str>,
    model: &str,
    system_prompt: &str,
    alert: &Alert,
    evidence: &str,
) -> Result<Analysis, LlmError> {
    let Some(api_key) = api_key else {
        warn!("no OpenRouter API key configured, returning default analysis");
        return Ok(Analysis {
                status: "WARN".to_string(),
                issue: format!("Alert: {}", alert.name),
                recommendation: Some("Manual investigation required".to_string()),
        });
    };

    let user_message = format!(
        "\nAlert: {}\nSeverity: {}\nLabels: {}\nDescription: {}\n\n\
        Evidence from investigation:\n{evidence}\n\n\
        Analyze this alert and provide your assessment.\n",
        alert.name,
        alert.severity,
        serde_json::to_string(&alert.labels).unwrap_or_default(),
        alert.description.as_deref().unwrap_or("N/A"),
    );

    let response = http
    .post(OPENROUTER_URL)
    .bearer_auth(api_key)
    .header("HTTP-Referer", "https://kernow.io")
    .header("X-Title", "Homelab Triage")
    .json(&json!({
                "model": model,
                "messages": [
                    {"role": "system", "content": system_prompt},
                    {"role": "user", "content": user_message},
                ],
                "response_format": {"type": "json_object"},
                "max_tokens": 500,
                "temperature": 0.3,
    }))
    .send()
    .await?
    .error_for_status()?;

    let body: ChatResponse = response.json().await?;
    let content = body.choices.into_iter().next().ok_or(LlmError::NoChoices)?.message.content;
    let parsed: AnalysisPayload = serde_json::from_str(&content).unwrap_or_default();

    Ok(Analysis {
            status: parsed.status.unwrap_or_else(|| "WARN".to_string()),
            issue: parsed.issue.unwrap_or_else(|| content.chars().take(200).collect()),
            recommendation: parsed.recommendation,
    })
}
