//! HTTP front door for the alert-triage pipeline: exposes
//! `POST /triage`, `GET /health`, `GET /metrics` on an `actix-web` server.
//! Unlike `discovery_sync`, this binary runs continuously, one process per
//! deployment, fielding triage requests as alerts fire.

mod handlers;
mod server;
mod state;

use std::sync::Arc;

use anyhow::Context;
use source_clients::ToolClient;
use specialists::SpecialistContext;
use state::AppState;
use util::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    util::telemetry::init();

    let config = Config::from_env().context("failed to load configuration")?;

    let tools = ToolClient::new(config.mcp_servers.clone());
    let ctx = SpecialistContext::new(tools, config.openrouter_api_key.clone(), config.specialist_model.clone());

    let state = Arc::new(AppState::new(ctx).context("failed to build triage service state")?);

    server::start_server(state).await
}
