use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse},
};
use std::sync::Arc;
use tracing::{error, info};

use crate::session::{self, SessionState, EMPTY_SUMMARY_MESSAGE, VALIDATION_WARNING};
use crate::summarizer::{BundleInfo, Summarize, SummarizerEngine};
use super::page;
use super::types::{ApiResponse, SummarizeData, SummarizeRequest};

/// Serves the summarizer page.
pub async fn index() -> Html<String> {
    Html(page::render_index())
}

/// Returns a health check response
pub async fn health_check() -> &'static str {
    info!("Health check endpoint called");
    "Text summarizer is running!"
}

/// Returns metadata about the loaded model checkpoint.
pub async fn model_info(State(engine): State<Arc<SummarizerEngine>>) -> impl IntoResponse {
    info!("Model info endpoint called");
    let info: BundleInfo = engine.info().clone();
    Json(ApiResponse {
        status: "success".to_string(),
        data: Some(info),
        message: None,
    })
}

/// Runs one summarization request through the session flow.
///
/// Inference is CPU-bound and holds the model lock, so it runs on the
/// blocking pool rather than on the async runtime threads.
pub async fn summarize(
    State(engine): State<Arc<SummarizerEngine>>,
    Json(request): Json<SummarizeRequest>,
) -> impl IntoResponse {
    info!("Summarize endpoint called ({} bytes of input)", request.text.len());

    let outcome = tokio::task::spawn_blocking(move || {
        let mut observe = |state: &SessionState| {
            info!("Session state: {}", state.label());
        };
        session::submit(&request.text, engine.as_ref() as &dyn Summarize, &mut observe)
    })
    .await;

    let state = match outcome {
        Ok(state) => state,
        Err(e) => {
            error!("Summarization task panicked or was cancelled: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<SummarizeData> {
                    status: "error".to_string(),
                    data: None,
                    message: Some(format!("Summarization task failed: {}", e)),
                }),
            );
        }
    };

    match state {
        SessionState::Success(summary) => (
            StatusCode::OK,
            Json(ApiResponse {
                status: "success".to_string(),
                data: Some(SummarizeData { summary }),
                message: None,
            }),
        ),
        SessionState::Idle => (
            StatusCode::OK,
            Json(ApiResponse {
                status: "warning".to_string(),
                data: None,
                message: Some(VALIDATION_WARNING.to_string()),
            }),
        ),
        SessionState::EmptyResult => (
            StatusCode::OK,
            Json(ApiResponse {
                status: "empty".to_string(),
                data: None,
                message: Some(EMPTY_SUMMARY_MESSAGE.to_string()),
            }),
        ),
        SessionState::Error(message) => {
            error!("Summarization failed: {}", message);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse {
                    status: "error".to_string(),
                    data: None,
                    message: Some(message),
                }),
            )
        }
        // Transient states are never the final result of submit.
        SessionState::Validating | SessionState::Running => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse {
                status: "error".to_string(),
                data: None,
                message: Some("Summarization ended in an unexpected state".to_string()),
            }),
        ),
    }
}
