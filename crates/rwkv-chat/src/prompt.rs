//! Dialogue-turn prompt construction.

use crate::config::ChatConfig;

/// One party's contribution to the dialogue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogueTurn {
    pub speaker_label: String,
    pub separator: String,
    pub message: String,
}

impl DialogueTurn {
    /// Build the user turn from raw request input, normalizing escaped
    /// newlines and trimming surrounding whitespace.
    pub fn user(config: &ChatConfig, raw_message: &str) -> Self {
        Self {
            speaker_label: config.user_label.clone(),
            separator: config.separator.clone(),
            message: normalize_message(raw_message),
        }
    }

    /// Priming text for this turn followed by the opening of the bot's
    /// reply: `"<label><sep> <message><boundary><bot_label><sep>"`.
    pub fn priming_text(&self, config: &ChatConfig) -> String {
        format!(
            "{}{} {}{}{}{}",
            self.speaker_label,
            self.separator,
            self.message,
            config.turn_boundary,
            config.bot_label,
            config.separator,
        )
    }
}

/// Turn literally-written `\n` sequences into real newlines, then trim.
pub fn normalize_message(raw: &str) -> String {
    raw.replace("\\n", "\n").trim().to_string()
}
