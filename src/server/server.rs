use std::error::Error;
use std::sync::Arc;
use axum::{Router, routing::{get, post}};
use tokio::net::TcpListener;
use tracing::info;

use crate::summarizer::SummarizerEngine;
use super::routes;

/// API server for handling summarization requests
pub struct ApiServer {
    engine: Arc<SummarizerEngine>,
    host: String,
    port: u16,
}

impl ApiServer {
    pub fn new(engine: Arc<SummarizerEngine>, host: String, port: u16) -> Self {
        info!("Creating new API server on {}:{}", host, port);
        Self { engine, host, port }
    }

    pub async fn start(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        let app_state = Arc::clone(&self.engine);

        let app = Router::new()
            .route("/", get(routes::index))
            .route("/health", get(routes::health_check))
            .route("/api/v1/model", get(routes::model_info))
            .route("/api/v1/summarize", post(routes::summarize))
            .with_state(app_state);

        info!("Starting server on {}:{}", self.host, self.port);
        let listener = TcpListener::bind((self.host.as_str(), self.port)).await?;

        info!("Server started successfully\n");
        axum::serve(listener, app).await?;
        Ok(())
    }
}
