//! # rwkv-server
//!
//! Minimal HTTP API for the rwkv-chat stack.
//!
//! Exposes one chat-turn endpoint plus a liveness placeholder, with
//! permissive CORS. Each request runs an independent generation against the
//! process-wide engine/tokenizer pair; a semaphore-backed session manager
//! caps concurrent generations (cap 1 serializes backend access).

pub mod error;
pub mod handlers;
pub mod models;
pub mod server;
pub mod session_manager;
pub mod state;

pub use error::ServerError;
pub use server::{create_router, run_server};
pub use session_manager::SessionManager;
pub use state::{AppState, ServerConfig};
