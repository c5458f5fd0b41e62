//! Fuses specialist findings into one verdict: LLM-primary, with a
//! deterministic weighted-score fallback that never needs the network.

mod llm_synthesis;
mod result;
mod rule_based;
mod weights;

pub use llm_synthesis::synthesize;
pub use result::SynthesisResult;
pub use rule_based::rule_based_synthesis;
pub use weights::domain_weights;
