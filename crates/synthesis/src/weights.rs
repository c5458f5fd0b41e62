use std::collections::HashMap;

/// Domain authority weights for synthesis: security > devops > sre
/// > network > database > infrastructure. An agent absent from this map
/// (there shouldn't be one, given the fixed roster) falls back to 0.5.
pub fn domain_weights() -> HashMap<&'static str, f64> {
    HashMap::from([
            ("security", 1.0),
            ("devops", 0.85),
            ("sre", 0.7),
            ("network", 0.55),
            ("database", 0.45),
            ("infrastructure", 0.35),
    ])
}

pub const DEFAULT_WEIGHT: f64 = 0.5;
