use prometheus::{Histogram, HistogramOpts, IntCounter, Registry};
use specialists::SpecialistContext;

/// Shared application state: the specialist context every handler borrows,
/// plus the Prometheus registry backing `/metrics`.
pub struct AppState {
    pub ctx: SpecialistContext,
    pub registry: Registry,
    pub requests_total: IntCounter,
    pub triage_duration: Histogram,
}

impl AppState {
    pub fn new(ctx: SpecialistContext) -> anyhow::Result<Self> {
        let registry = Registry::new();

        let requests_total =
            IntCounter::new("triage_requests_total", "Total number of /triage requests handled")?;
        registry.register(Box::new(requests_total.clone()))?;

        let triage_duration = Histogram::with_opts(HistogramOpts::new(
            "triage_duration_seconds",
            "Wall-clock time spent handling a /triage request",
        ))?;
        registry.register(Box::new(triage_duration.clone()))?;

        Ok(AppState { ctx, registry, requests_total, triage_duration })
    }
}
