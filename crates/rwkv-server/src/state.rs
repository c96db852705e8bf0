//! Application state and configuration.

use crate::session_manager::SessionManager;
use rwkv_chat::ChatConfig;
use rwkv_engine::RwkvEngine;
use rwkv_tokenizer::Tokenizer;
use std::sync::Arc;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Shared evaluation backend, loaded once at startup.
    pub engine: Arc<dyn RwkvEngine>,
    /// Shared tokenizer, loaded once at startup.
    pub tokenizer: Arc<dyn Tokenizer>,
    /// Server configuration.
    pub config: ServerConfig,
    /// Concurrency limiter for generations.
    pub sessions: Arc<SessionManager>,
}

/// Server configuration parameters.
#[derive(Clone)]
pub struct ServerConfig {
    /// Per-turn generation defaults; requests may override max length,
    /// temperature, and top-p.
    pub chat: ChatConfig,
    /// Maximum concurrent chat sessions.
    pub max_concurrent_sessions: usize,
}
