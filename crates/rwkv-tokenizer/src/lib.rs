//! # rwkv-tokenizer
//!
//! Tokenization seam for the rwkv-chat stack.
//!
//! This crate provides:
//! - A `Tokenizer` trait for pluggable tokenization backends
//! - A reference byte-level tokenizer for testing and demos
//!
//! Decoding may land in the middle of a multi-byte character when tokens are
//! produced one at a time; implementations signal this with
//! [`REPLACEMENT_CHARACTER`] rather than an error, and callers buffer tokens
//! until the fragment completes.

use rwkv_engine::TokenId;

/// Emitted by `decode` in place of bytes that do not (yet) form a valid
/// character.
pub const REPLACEMENT_CHARACTER: char = '\u{FFFD}';

/// Error type for tokenization operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenizerError {
    #[error("Invalid token ID: {0}")]
    InvalidToken(TokenId),
    #[error("Encoding error: {0}")]
    EncodingError(String),
}

pub type TokenizerResult<T> = std::result::Result<T, TokenizerError>;

/// Core tokenizer trait. Implementations can be swapped without changing
/// application code.
pub trait Tokenizer: Send + Sync {
    /// Encode text into a sequence of token IDs.
    fn encode(&self, text: &str) -> TokenizerResult<Vec<TokenId>>;

    /// Decode a sequence of tokens into text.
    ///
    /// An incomplete trailing character decodes to [`REPLACEMENT_CHARACTER`],
    /// not an error.
    fn decode(&self, tokens: &[TokenId]) -> TokenizerResult<String>;

    /// Get vocabulary size.
    fn vocab_size(&self) -> usize;
}

/// Reference byte-level tokenizer: one token per UTF-8 byte.
///
/// - Bidirectional (encode/decode)
/// - Deterministic, no vocabulary file
/// - Splitting a multi-byte character across decode calls yields the
///   replacement character, exercising the buffering path real BPE
///   tokenizers hit
pub struct ByteTokenizer;

impl ByteTokenizer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ByteTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tokenizer for ByteTokenizer {
    fn encode(&self, text: &str) -> TokenizerResult<Vec<TokenId>> {
        Ok(text.bytes().map(TokenId::from).collect())
    }

    fn decode(&self, tokens: &[TokenId]) -> TokenizerResult<String> {
        let mut bytes = Vec::with_capacity(tokens.len());
        for &id in tokens {
            let byte = u8::try_from(id).map_err(|_| TokenizerError::InvalidToken(id))?;
            bytes.push(byte);
        }
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn vocab_size(&self) -> usize {
        256
    }
}
