/// A specialist's verdict on one alert. `status` is one of
/// `PASS`/`WARN`/`FAIL`/`ERROR` — `ERROR` only ever comes from the
/// never-propagate fallback in [`SpecialistFinding::error`].
#[derive(Debug, Clone)]
pub struct SpecialistFinding {
    pub agent: String,
    pub status: String,
    pub issue: Option<String>,
    pub evidence: Option<String>,
    pub recommendation: Option<String>,
    pub tools_used: Vec<String>,
    pub latency_ms: u64,
}

impl SpecialistFinding {
    pub fn error(agent: &str, err: impl std::fmt::Display, tools_used: Vec<String>, latency_ms: u64) -> Self {
        SpecialistFinding {
            agent: agent.to_string(),
            status: "ERROR".to_string(),
            issue: Some(err.to_string()),
            evidence: None,
            recommendation: None,
            tools_used,
            latency_ms,
        }
    }
}

/// Evidence strings are capped at 1000 chars before they reach the LLM or
/// the finding output.
pub fn truncate_evidence(evidence: String) -> String {
    if evidence.chars().count() > 1000 {
        evidence.chars().take(1000).collect()
    } else {
        evidence
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_long_evidence() {
        let long = "x".repeat(2000);
        assert_eq!(truncate_evidence(long).chars().count(), 1000);
    }

    #[test]
    fn leaves_short_evidence_untouched() {
        assert_eq!(truncate_evidence("short".to_string()), "short");
    }
}
