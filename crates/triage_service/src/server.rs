use std::sync::Arc;

use actix_web::{middleware, web::Data, App, HttpServer};
use anyhow::Result;

use crate::handlers::{health, metrics, triage};
use crate::state::AppState;

/// Configure and start the HTTP server.
pub async fn start_server(state: Arc<AppState>) -> Result<()> {
    let server = HttpServer::new(move || {
        App::new()
            .app_data(Data::from(state.clone()))
            .wrap(middleware::Logger::default().exclude("/health"))
            .service(health::health)
            .service(metrics::metrics)
            .service(triage::triage)
    })
    .bind("0.0.0.0:8080")?
    .shutdown_timeout(5);

    server.run().await?;
    Ok(())
}
