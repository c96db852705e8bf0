//! # rwkv-chat
//!
//! One turn of a question/answer dialogue against an RWKV-style evaluation
//! backend: prompt priming plus a constrained sampling loop with repetition
//! penalties and stop conditions.
//!
//! The heavy lifting (model evaluation, tokenization, sampling math) lives
//! behind the `rwkv-engine`, `rwkv-tokenizer`, and `rwkv-sampling` seams;
//! this crate owns the per-turn control flow and state.

pub mod config;
pub mod generate;
pub mod prompt;

pub use config::ChatConfig;
pub use generate::{chat_turn, generate, prime, ChatError, PrimedPrompt};
pub use prompt::DialogueTurn;
