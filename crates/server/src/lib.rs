//! CourseRec HTTP server
//!
//! Actix-web REST API over the similarity engine.

pub mod error;
pub mod routes;
pub mod state;
pub mod types;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use courserec_common::{AppConfig, Result};
use std::sync::Arc;
use tracing::info;
use tracing_actix_web::TracingLogger;

pub use state::AppState;

/// Load the corpus, build the engine and serve until shutdown
pub async fn start_server(config: AppConfig) -> Result<()> {
    let bind_addr = config.server_bind_address();
    let state = Arc::new(AppState::new(config)?);

    info!(
        "Serving {} courses on http://{}",
        state.engine.corpus().len(),
        bind_addr
    );

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(Arc::clone(&state)))
            .wrap(TracingLogger::default())
            .wrap(Cors::permissive())
            .configure(routes::configure)
    })
    .bind(&bind_addr)?
    .run()
    .await?;

    info!("Server stopped");
    Ok(())
}
