//! Application state, route registration, and the server loop.

use std::io;
use std::sync::Arc;

use actix_web::{middleware, web, App, HttpServer};
use nodes::PipelineExecutor;

use crate::error::ApiError;
use crate::handlers;

/// Shared, read-only application state.
pub struct AppState {
    pub executor: Arc<PipelineExecutor>,
}

impl AppState {
    pub fn new(executor: Arc<PipelineExecutor>) -> Self {
        Self { executor }
    }
}

/// Registers the routes and the JSON error handler.
///
/// The caller provides `web::Data<AppState>`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| ApiError::BadRequest(err.to_string()).into()),
    )
    .route("/analyze", web::post().to(handlers::analyze))
    .route("/health", web::get().to(handlers::health));
}

/// Binds `host:port` and serves until the process is stopped.
pub async fn run_server(executor: Arc<PipelineExecutor>, host: &str, port: u16) -> io::Result<()> {
    let state = web::Data::new(AppState::new(executor));

    tracing::info!(%host, port, "starting HTTP server");

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(middleware::Logger::new("%r %s %Dms"))
            .configure(configure)
    })
    .bind((host, port))?
    .run()
    .await
}
