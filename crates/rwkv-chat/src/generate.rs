//! Prompt priming and the constrained sampling loop.

use std::collections::HashMap;

use rwkv_engine::{EngineError, ModelState, RwkvEngine, TokenId};
use rwkv_sampling::{apply_repeat_penalties, Sampler, SamplingError};
use rwkv_tokenizer::{Tokenizer, TokenizerError, REPLACEMENT_CHARACTER};

use crate::config::ChatConfig;
use crate::prompt::DialogueTurn;

/// Errors from one chat turn.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),
    #[error("tokenizer error: {0}")]
    Tokenizer(#[from] TokenizerError),
    #[error("sampling error: {0}")]
    Sampling(#[from] SamplingError),
    #[error("user input must not be empty")]
    EmptyInput,
}

/// Output of the priming phase: the evaluation results for the dialogue
/// prompt, ready to be handed to [`generate`].
#[derive(Debug)]
pub struct PrimedPrompt {
    /// Logits after evaluating the priming text, end-of-line already biased.
    pub logits: Vec<f32>,
    /// Opaque state after the priming evaluation.
    pub state: ModelState,
    /// Token ledger so far (the encoded prompt).
    pub processed_tokens: Vec<TokenId>,
}

/// Build the `"Q: <message>\n\nA:"` priming text, evaluate it against an
/// empty prior state, and suppress an immediate end-of-line.
pub fn prime(
    engine: &dyn RwkvEngine,
    tokenizer: &dyn Tokenizer,
    config: &ChatConfig,
    user_message: &str,
) -> Result<PrimedPrompt, ChatError> {
    if user_message.is_empty() {
        return Err(ChatError::EmptyInput);
    }

    let turn = DialogueTurn::user(config, user_message);
    let priming_text = turn.priming_text(config);
    tracing::debug!(prompt = %priming_text, "priming chat turn");

    let processed_tokens = tokenizer.encode(&priming_text)?;
    let eval = engine.evaluate(&processed_tokens, None)?;

    let mut logits = eval.logits;
    // Suppress a newline straight after "A:".
    if let Some(logit) = logits.get_mut(config.end_of_line_token as usize) {
        *logit += config.newline_logit_bias;
    }

    Ok(PrimedPrompt {
        logits,
        state: eval.state,
        processed_tokens,
    })
}

/// Run the sampling loop until a stop condition fires.
///
/// Per iteration: subtract presence/frequency penalties for every token
/// generated this turn, sample, then either stop (end-of-text) or evaluate
/// the new token and decode it. Decoded text is buffered across replacement-
/// character fragments so the result never carries a half-decoded character.
/// A second stop fires once the post-prompt text contains the turn boundary;
/// the length cap bounds everything else.
pub fn generate(
    engine: &dyn RwkvEngine,
    tokenizer: &dyn Tokenizer,
    config: &ChatConfig,
    sampler: &mut Sampler,
    primed: PrimedPrompt,
) -> Result<String, ChatError> {
    let PrimedPrompt {
        mut logits,
        mut state,
        mut processed_tokens,
    } = primed;

    let start_index = processed_tokens.len();
    let mut token_counts: HashMap<TokenId, u32> = HashMap::new();
    let mut accumulated_tokens: Vec<TokenId> = Vec::new();
    let mut result = String::new();

    for _ in 0..config.max_generation_length {
        apply_repeat_penalties(
            &mut logits,
            token_counts.iter().map(|(&t, &c)| (t as usize, c)),
            config.presence_penalty,
            config.frequency_penalty,
        );

        let token = sampler.sample(&logits)? as TokenId;

        if token == config.end_of_text_token {
            break;
        }

        *token_counts.entry(token).or_insert(0) += 1;

        let eval = engine.evaluate(&[token], Some(&state))?;
        logits = eval.logits;
        state = eval.state;
        processed_tokens.push(token);

        // Buffer until the tokens decode to something displayable.
        accumulated_tokens.push(token);
        let decoded = tokenizer.decode(&accumulated_tokens)?;
        if !decoded.contains(REPLACEMENT_CHARACTER) {
            tracing::trace!(piece = %decoded, "decoded fragment");
            result.push_str(&decoded);
            accumulated_tokens.clear();
        }

        let generated = tokenizer.decode(&processed_tokens[start_index..])?;
        if generated.contains(&config.turn_boundary) {
            break;
        }
    }

    // A fragment still buffered here never completed a character; it is
    // dropped rather than flushed.
    Ok(result)
}

/// One full chat turn: prime the prompt, then generate the reply.
pub fn chat_turn(
    engine: &dyn RwkvEngine,
    tokenizer: &dyn Tokenizer,
    config: &ChatConfig,
    sampler: &mut Sampler,
    user_input: &str,
) -> Result<String, ChatError> {
    let primed = prime(engine, tokenizer, config, user_input)?;
    generate(engine, tokenizer, config, sampler, primed)
}
