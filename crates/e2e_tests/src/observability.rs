//! Phase-timed test observability: tracks nodes and edges written per
//! phase of a scenario, the graph-shaped equivalent of resource-creation
//! counters.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{info, span, Level, Span};

#[derive(Debug, Clone, Default)]
pub struct TestMetrics {
    pub test_name: String,
    pub phase_timings: HashMap<String, Duration>,
    pub nodes_written: HashMap<String, i64>,
}

pub struct TestObserver {
    metrics: TestMetrics,
    phase_start_times: HashMap<String, DateTime<Utc>>,
    span: Span,
}

impl TestObserver {
    pub fn new(test_name: &str) -> Self {
        let span = span!(Level::INFO, "test_execution", test_name = test_name);
        info!(test_name, "starting test observability");
        TestObserver {
            metrics: TestMetrics { test_name: test_name.to_string(), ..Default::default() },
            phase_start_times: HashMap::new(),
            span,
        }
    }

    pub fn start_phase(&mut self, phase: &str) {
        let _enter = self.span.enter();
        self.phase_start_times.insert(phase.to_string(), Utc::now());
        info!(test_name = self.metrics.test_name, phase, "starting phase");
    }

    pub fn end_phase(&mut self, phase: &str) {
        let _enter = self.span.enter();
        if let Some(start) = self.phase_start_times.remove(phase) {
            let duration = Duration::from_millis((Utc::now() - start).num_milliseconds().max(0) as u64);
            self.metrics.phase_timings.insert(phase.to_string(), duration);
            info!(
                test_name = self.metrics.test_name,
                phase,
                duration_ms = duration.as_millis() as u64,
                "completed phase"
            );
        }
    }

    pub fn record_nodes_written(&mut self, label: &str, count: i64) {
        *self.metrics.nodes_written.entry(label.to_string()).or_insert(0) += count;
    }

    pub fn finish(self) -> TestMetrics {
        self.metrics
    }
}
