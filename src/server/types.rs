use serde::{Deserialize, Serialize};

/// Request for summary generation
#[derive(Deserialize, Serialize, Clone)]
pub struct SummarizeRequest {
    pub text: String,
}

/// Payload returned on a successful summarization
#[derive(Serialize, Deserialize)]
pub struct SummarizeData {
    pub summary: String,
}

/// Generic API response wrapper.
///
/// `status` is one of "success", "warning", "empty", or "error";
/// anything other than "success" carries a user-facing `message`.
#[derive(Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: String,
    pub data: Option<T>,
    pub message: Option<String>,
}
