use actix_web::{post, web::Data, web::Json, HttpResponse, Responder};
use specialists::Alert;
use synthesis::{domain_weights, synthesize};
use tracing::info;

use crate::state::AppState;

/// `POST /triage`: fan the alert out to all six specialists,
/// join, and synthesize a verdict. Never returns a 5xx on account of the
/// LLM being unavailable — synthesis falls back to the rule-based engine.
#[post("/triage")]
pub async fn triage(state: Data<AppState>, alert: Json<Alert>) -> impl Responder {
    let started = std::time::Instant::now();
    state.requests_total.inc();

    let alert = alert.into_inner();
    let findings = specialists::investigate_all(&state.ctx, &alert).await;

    let result = if findings.is_empty() {
        synthesis::SynthesisResult::no_findings()
    } else {
        let weights = domain_weights();
        synthesize(
            &state.ctx.http,
            state.ctx.api_key.as_deref(),
            &state.ctx.model,
            &findings,
            &alert,
            &weights,
        )
        .await
    };

    let elapsed = started.elapsed();
    state.triage_duration.observe(elapsed.as_secs_f64());
    info!(
        alert = %alert.name,
        verdict = %result.verdict,
        confidence = result.confidence,
        elapsed_ms = elapsed.as_millis() as u64,
        "triage complete"
    );

    HttpResponse::Ok().json(result)
}
