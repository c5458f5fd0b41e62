//! The six domain specialists that investigate an alert concurrently.
//! Each owns a disjoint tool palette and never propagates an error — a
//! failure becomes an `ERROR`-status finding instead.

mod alert;
mod context;
mod database;
mod devops;
mod finding;
mod infrastructure;
mod llm;
mod network;
mod security;
mod sre;

pub use alert::Alert;
pub use context::SpecialistContext;
pub use finding::SpecialistFinding;
pub use llm::{gemini_analyze, Analysis, LlmError};

/// The fixed specialist roster, in the authority order used for synthesis
/// weighting: security > devops > sre > network > database >
/// infrastructure.
pub const SPECIALISTS: &[&str] =
&[security::AGENT, devops::AGENT, sre::AGENT, network::AGENT, database::AGENT, infrastructure::AGENT];

/// Run all six specialists concurrently and join before returning — no
/// specialist may observe another's output.
pub async fn investigate_all(ctx: &SpecialistContext, alert: &Alert) -> Vec<SpecialistFinding> {
    let (security, devops, sre, network, database, infrastructure) = tokio::join!(
        security::investigate(ctx, alert),
        devops::investigate(ctx, alert),
        sre::investigate(ctx, alert),
        network::investigate(ctx, alert),
        database::investigate(ctx, alert),
        infrastructure::investigate(ctx, alert),
    );
    vec![security, devops, sre, network, database, infrastructure]
}
