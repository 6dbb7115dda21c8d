use serde::{Deserialize, Serialize};

/// How a chat body is compared against a command trigger
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// The body only has to start with the trigger, so `!hidden` runs `!hi`
    #[default]
    Prefix,
    /// The trigger must be followed by whitespace or the end of the body
    Exact,
}

/// Matches chat bodies against command triggers
#[derive(Debug, Clone)]
pub struct CommandParser {
    /// The prefix used for commands (e.g., "!")
    pub prefix: String,
    pub mode: MatchMode,
}

impl CommandParser {
    pub fn new(prefix: String, mode: MatchMode) -> Self {
        Self { prefix, mode }
    }

    /// Create a command parser with the default "!" prefix
    pub fn with_default_prefix(mode: MatchMode) -> Self {
        Self::new("!".to_string(), mode)
    }

    /// Check if a message is a command
    pub fn is_command(&self, body: &str) -> bool {
        body.starts_with(&self.prefix)
    }

    /// Does `body` invoke `trigger` (given without the prefix)?
    /// Both sides are expected to be lower-case already.
    pub fn matches(&self, trigger: &str, body: &str) -> bool {
        let rest = match body
            .strip_prefix(&self.prefix)
            .and_then(|b| b.strip_prefix(trigger))
        {
            Some(rest) => rest,
            None => return false,
        };

        match self.mode {
            MatchMode::Prefix => true,
            MatchMode::Exact => rest.is_empty() || rest.starts_with(char::is_whitespace),
        }
    }

    /// `trigger` with the prefix in front, as shown to chatters
    pub fn display(&self, trigger: &str) -> String {
        format!("{}{}", self.prefix, trigger)
    }
}

impl Default for CommandParser {
    fn default() -> Self {
        Self::with_default_prefix(MatchMode::default())
    }
}
