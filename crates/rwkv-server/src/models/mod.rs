//! Request/response types.

pub mod chat;

pub use chat::{ChatCompletionRequest, ChatCompletionResponse};
