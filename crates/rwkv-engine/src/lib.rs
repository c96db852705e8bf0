//! # rwkv-engine
//!
//! The "narrow waist" of the rwkv-chat stack. Defines the core [`RwkvEngine`]
//! trait and associated types that the chat loop and server depend on.
//! Implementations can wrap an FFI backend (rwkv.cpp style) or a pure-Rust
//! one without changing application code.
//!
//! ## Design Notes
//!
//! ### Interior Mutability
//! `RwkvEngine::evaluate` takes `&self` (not `&mut self`) so one loaded model
//! can be shared across sessions behind an `Arc`. Backends that need mutable
//! scratch buffers are responsible for their own synchronization.
//!
//! ### Opaque State
//! RWKV is recurrent: each evaluation consumes a prior state and yields a
//! replacement. [`ModelState`] is backend-defined and never inspected by
//! callers; it is threaded through evaluation calls by value.
//!
//! ### Token Type
//! `TokenId` is aliased as `i32` for FFI compatibility, though token IDs are
//! logically non-negative.

pub type Result<T> = std::result::Result<T, EngineError>;

/// Token ID type (i32 for FFI compat; logically non-negative).
pub type TokenId = i32;

/// Top-level error type for all engine operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Model loading failed: {0}")]
    ModelLoad(String),
    #[error("Evaluation failed: {0}")]
    Evaluation(String),
    #[error("Invalid model state: {0}")]
    InvalidState(String),
}

/// Opaque recurrent state carried between evaluation calls.
///
/// Contents are backend-defined. Callers thread it through [`RwkvEngine::evaluate`]
/// and must never assume anything about the layout.
#[derive(Debug, Clone, Default)]
pub struct ModelState(Vec<f32>);

impl ModelState {
    /// Wrap a backend-produced raw buffer.
    pub fn from_raw(data: Vec<f32>) -> Self {
        Self(data)
    }

    /// Borrow the raw buffer (backend use only).
    pub fn as_raw(&self) -> &[f32] {
        &self.0
    }

    /// Unwrap into the raw buffer (backend use only).
    pub fn into_raw(self) -> Vec<f32> {
        self.0
    }
}

/// Result of one evaluation call: fresh logits and a replacement state.
#[derive(Debug, Clone)]
pub struct Evaluation {
    /// Unnormalized per-token scores, indexed by token ID, length == vocab size.
    pub logits: Vec<f32>,
    /// Replacement for the prior state. The prior is dead after this call.
    pub state: ModelState,
}

/// The model-evaluation service — everything else plugs into this.
///
/// The chat loop depends on *engine behavior*, not implementation details.
/// Swap FFI/mock backends without changing application code.
pub trait RwkvEngine: Send + Sync {
    /// Evaluate a token sequence against an optional prior state.
    ///
    /// `None` means a fresh sequence (prompt priming). Returns logits over
    /// the full vocabulary and the replacement state.
    fn evaluate(&self, tokens: &[TokenId], prior: Option<&ModelState>) -> Result<Evaluation>;

    /// Size of the vocabulary the logits are indexed by.
    fn vocab_size(&self) -> usize;

    /// Backend/system metadata string, for startup diagnostics only.
    fn system_info(&self) -> String;
}

/// Deterministic reference backend for tests and the demo server.
///
/// Produces logits by hashing the token stream: the same prefix always
/// yields the same distribution, and the recurrent state is the running
/// hash. No pretense of being a language model.
pub struct MockEngine {
    vocab_size: usize,
    seed: u64,
}

impl MockEngine {
    pub fn new() -> Self {
        Self::with_vocab_size(256)
    }

    pub fn with_vocab_size(vocab_size: usize) -> Self {
        Self {
            vocab_size,
            seed: 0x9E37_79B9_7F4A_7C15,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = if seed == 0 { 1 } else { seed };
        self
    }

    fn unpack_state(state: &ModelState) -> Result<u64> {
        let raw = state.as_raw();
        if raw.len() != 2 {
            return Err(EngineError::InvalidState(format!(
                "expected 2 elements, got {}",
                raw.len()
            )));
        }
        Ok(((raw[0].to_bits() as u64) << 32) | raw[1].to_bits() as u64)
    }

    fn pack_state(h: u64) -> ModelState {
        ModelState::from_raw(vec![
            f32::from_bits((h >> 32) as u32),
            f32::from_bits(h as u32),
        ])
    }

    fn mix(mut h: u64, token: TokenId) -> u64 {
        h ^= token as u64 ^ 0xFF51_AFD7_ED55_8CCD;
        h = h.wrapping_mul(0xC4CE_B9FE_1A85_EC53);
        h ^= h >> 33;
        if h == 0 {
            1
        } else {
            h
        }
    }
}

impl Default for MockEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl RwkvEngine for MockEngine {
    fn evaluate(&self, tokens: &[TokenId], prior: Option<&ModelState>) -> Result<Evaluation> {
        if tokens.is_empty() {
            return Err(EngineError::Evaluation("empty token sequence".to_string()));
        }

        let mut h = match prior {
            Some(state) => Self::unpack_state(state)?,
            None => self.seed,
        };
        for &token in tokens {
            h = Self::mix(h, token);
        }

        // xorshift stream keyed on the running hash
        let mut s = h;
        let logits = (0..self.vocab_size)
            .map(|_| {
                s ^= s << 13;
                s ^= s >> 7;
                s ^= s << 17;
                (s >> 40) as f32 / (1u64 << 24) as f32 * 10.0 - 5.0
            })
            .collect();

        Ok(Evaluation {
            logits,
            state: Self::pack_state(h),
        })
    }

    fn vocab_size(&self) -> usize {
        self.vocab_size
    }

    fn system_info(&self) -> String {
        format!("mock backend (vocab_size={}, seed={:#x})", self.vocab_size, self.seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    // f32 equality is unreliable for opaque state buffers (bit patterns may
    // be NaN); compare raw bits instead.
    fn state_bits(state: &ModelState) -> Vec<u32> {
        state.as_raw().iter().map(|f| f.to_bits()).collect()
    }

    #[test]
    fn mock_is_deterministic() {
        let engine = MockEngine::new();
        let a = engine.evaluate(&[1, 2, 3], None).unwrap();
        let b = engine.evaluate(&[1, 2, 3], None).unwrap();
        assert_eq!(a.logits, b.logits);
        assert_eq!(state_bits(&a.state), state_bits(&b.state));
    }

    #[test]
    fn state_threading_matches_full_sequence() {
        // Evaluating [a, b] in one call must equal evaluating [a] then [b]
        // against the returned state.
        let engine = MockEngine::new();
        let full = engine.evaluate(&[10, 20], None).unwrap();
        let first = engine.evaluate(&[10], None).unwrap();
        let second = engine.evaluate(&[20], Some(&first.state)).unwrap();
        assert_eq!(full.logits, second.logits);
        assert_eq!(state_bits(&full.state), state_bits(&second.state));
    }

    #[test]
    fn different_prefixes_give_different_logits() {
        let engine = MockEngine::new();
        let a = engine.evaluate(&[1], None).unwrap();
        let b = engine.evaluate(&[2], None).unwrap();
        assert_ne!(a.logits, b.logits);
    }

    #[test]
    fn empty_sequence_is_an_error() {
        let engine = MockEngine::new();
        assert!(matches!(
            engine.evaluate(&[], None),
            Err(EngineError::Evaluation(_))
        ));
    }

    #[test]
    fn malformed_state_is_an_error() {
        let engine = MockEngine::new();
        let bogus = ModelState::from_raw(vec![0.0; 7]);
        assert!(matches!(
            engine.evaluate(&[1], Some(&bogus)),
            Err(EngineError::InvalidState(_))
        ));
    }

    #[test]
    fn usable_as_trait_object() {
        let engine: Arc<dyn RwkvEngine> = Arc::new(MockEngine::new());
        assert_eq!(engine.vocab_size(), 256);
        let eval = engine.evaluate(&[0], None).unwrap();
        assert_eq!(eval.logits.len(), 256);
        assert!(!engine.system_info().is_empty());
    }
}
