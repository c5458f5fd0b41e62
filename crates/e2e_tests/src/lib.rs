//! Integration test harness for the discovery/triage engine.
//!
//! Exercises `graph_store`/`lifecycle`/`linker`/`dedup` against a real,
//! disposable Neo4j container rather than a mocked Bolt connection:
//! prefer real infrastructure in slow, `#[serial]`-guarded tests over
//! brittle protocol fakes.

mod observability;
mod seed;
mod waiting;

pub use observability::{TestMetrics, TestObserver};
pub use waiting::{BackoffConfig, SmartWaiter};

use std::collections::HashMap;

use graph_store::GraphStore;
use testcontainers::clients::Cli;
use testcontainers::core::WaitFor;
use testcontainers::images::generic::GenericImage;
use testcontainers::Container;

const NEO4J_PASSWORD: &str = "e2e-test-password";

/// One disposable Neo4j instance plus the `GraphStore` handle wrapping it.
/// Each test that calls [`GraphTestEnv::new`] gets its own container, so
/// tests never interleave state even when `#[serial]` is relaxed — but we
/// keep `#[serial]` anyway, since running many Neo4j containers
/// concurrently on a dev machine or CI runner is resource-heavy rather
/// than unsafe.
pub struct GraphTestEnv {
    // testcontainers::Container borrows its client for its lifetime; we
    // leak one `Cli` per process so the container can outlive the function
    // that created it without a self-referential struct.
    _container: Container<'static, GenericImage>,
    pub graph: GraphStore,
}

impl GraphTestEnv {
    pub async fn new(name: &str) -> anyhow::Result<Self> {
        let docker: &'static Cli = Box::leak(Box::new(Cli::default()));

        let image = GenericImage::new("neo4j", "5.20")
        .with_env_var("NEO4J_AUTH", format!("neo4j/{NEO4J_PASSWORD}"))
        .with_env_var("NEO4J_dbms_memory_pagecache_size", "64m")
        .with_wait_for(WaitFor::message_on_stdout("Bolt enabled on"));

        let container = docker.run(image);
        let port = container.get_host_port_ipv4(7687);
        let uri = format!("bolt://127.0.0.1:{port}");

        tracing::info!(test_name = name, uri = %uri, "starting graph test environment");

        // The container reports its Bolt listener ready before it actually
        // accepts connections; retry the initial connect rather than
        // failing the whole test on a cold-start race.
        let waiter = SmartWaiter::with_config(&format!("{name}: neo4j connect"), BackoffConfig::fast());
        let graph = waiter
        .wait_for(|| {
                let uri = uri.clone();
                async move {
                    match GraphStore::connect(&uri, "neo4j", NEO4J_PASSWORD).await {
                        Ok(store) => {
                            if store.verify().await {
                                Ok(Some(store))
                            } else {
                                Ok(None)
                            }
                        }
                        Err(err) => Err(err.to_string()),
                    }
                }
        })
        .await
        .map_err(|err| anyhow::anyhow!("graph store never became ready: {err}"))?;

        Ok(GraphTestEnv { _container: container, graph })
    }
}

/// Direct Cypher fixtures for scenario setup — bypassing the syncers
/// entirely so a test can construct exactly the graph shape a property
/// needs without standing up fake Kubernetes/Proxmox/TrueNAS servers.
pub use seed::Seed;

/// Row helper: build a `serde_json::Value` map from `(&str, impl Into<Value>)` pairs.
pub fn row(pairs: impl IntoIterator<Item = (&'static str, serde_json::Value)>) -> serde_json::Value {
    let map: HashMap<&'static str, serde_json::Value> = pairs.into_iter().collect();
    serde_json::to_value(map).expect("row map always serializes")
}
