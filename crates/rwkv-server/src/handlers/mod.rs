//! HTTP request handlers.

pub mod chat;
pub mod health;

pub use chat::handle_chat_completion;
pub use health::handle_root;
