use serde::Serialize;

/// The triage pipeline's final output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SynthesisResult {
    pub verdict: String,
    pub confidence: f64,
    pub synthesis: String,
    pub suggested_action: Option<String>,
}

impl SynthesisResult {
    pub fn no_findings() -> Self {
        SynthesisResult {
            verdict: "UNKNOWN".to_string(),
            confidence: 0.3,
            synthesis: "no findings".to_string(),
            suggested_action: None,
        }
    }
}
