//! Chat turn configuration.

use rwkv_engine::TokenId;

/// Per-turn generation settings.
///
/// The dialogue labels and the turn boundary are product conventions, not
/// algorithmic requirements; they live here rather than as literals in the
/// loop. Sentinel token IDs are model-specific (187/0 for the RWKV world
/// vocabulary).
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Label for the human side of the dialogue.
    pub user_label: String,
    /// Label for the bot side of the dialogue.
    pub bot_label: String,
    /// Separator printed after each label.
    pub separator: String,
    /// Text marking the end of a turn; also the generation stop heuristic.
    pub turn_boundary: String,

    /// Hard cap on sampled tokens per turn.
    pub max_generation_length: usize,
    /// Sampling temperature; higher = more random.
    pub temperature: f32,
    /// Nucleus-sampling cumulative-probability cutoff.
    pub top_p: f32,
    /// Flat logit subtraction for any token already generated this turn.
    pub presence_penalty: f32,
    /// Additional subtraction per prior occurrence this turn.
    pub frequency_penalty: f32,

    /// Token whose logit is suppressed right after priming.
    pub end_of_line_token: TokenId,
    /// Token that terminates generation when sampled.
    pub end_of_text_token: TokenId,
    /// Bias added to the end-of-line logit after priming (practically -inf).
    pub newline_logit_bias: f32,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            user_label: "Q".to_string(),
            bot_label: "A".to_string(),
            separator: ":".to_string(),
            turn_boundary: "\n\n".to_string(),
            max_generation_length: 500,
            temperature: 0.8,
            top_p: 0.5,
            presence_penalty: 0.2,
            frequency_penalty: 0.2,
            end_of_line_token: 187,
            end_of_text_token: 0,
            newline_logit_bias: -1e9,
        }
    }
}
