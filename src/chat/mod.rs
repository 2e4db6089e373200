mod chat;
mod display;

pub use chat::chat_loop;
