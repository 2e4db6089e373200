pub mod chat;
pub mod config;
pub mod hub;
pub mod server;
pub mod session;
pub mod summarizer;
