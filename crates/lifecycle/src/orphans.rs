use std::collections::HashMap;

/// `label -> age_bucket -> count`, as produced by `orphan_stats`.
pub type OrphanStats = HashMap<String, HashMap<String, i64>>;
