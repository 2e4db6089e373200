//! HTTP surface of the summarizer: the single-page UI plus a small
//! JSON API that the page and the terminal client both talk to.

pub mod page;
pub mod routes;
pub mod server;
pub mod types;

pub use server::ApiServer;
pub use types::{ApiResponse, SummarizeData, SummarizeRequest};
