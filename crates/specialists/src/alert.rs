use std::collections::HashMap;

use serde::Deserialize;

/// The triage input: an alert as received from the alerting system.
#[derive(Debug, Clone, Deserialize)]
pub struct Alert {
    pub name: String,
    pub severity: String,
    pub labels: HashMap<String, String>,
    pub description: Option<String>,
}

impl Alert {
    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels.get(key).map(String::as_str)
    }

    /// True if any label value contains one of `needles` (case-insensitive).
    pub fn labels_match(&self, needles: &[&str]) -> bool {
        self.labels
        .values()
        .any(|v| { let v = v.to_lowercase(); needles.iter().any(|n| v.contains(n)) })
    }

    pub fn name_matches(&self, needles: &[&str]) -> bool {
        let name = self.name.to_lowercase();
        needles.iter().any(|n| name.contains(n))
    }
}
