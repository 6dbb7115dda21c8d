use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::backend::commands::{Command, MatchMode};
use crate::backend::twitch::{Result, DEFAULT_CEILING};

const SETTINGS_FILE: &str = "config.toml";

/// Who to log in as and where to chat. Fixed for the life of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub nick: String,
    pub token: String,
    /// Always lower-case with a leading `#`
    pub channel: String,
}

impl SessionConfig {
    pub fn new(nick: &str, token: &str, channel: &str) -> Self {
        Self {
            nick: nick.to_string(),
            token: token.to_string(),
            channel: normalize_channel(channel),
        }
    }
}

fn normalize_channel(channel: &str) -> String {
    format!("#{}", channel.trim_start_matches('#').to_lowercase())
}

/// Optional tuning read from `config.toml`. Never written back.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Sent to the channel right after joining; `{nick}` is replaced
    pub greeting: String,
    /// Lines allowed per 30 seconds (100 only if the bot moderates the channel)
    pub rate_limit: u32,
    pub match_mode: MatchMode,
    /// Seconds without any inbound line before the connection counts as dead; 0 disables
    pub read_timeout_secs: u64,
    /// Extra commands, checked after the built-in ones
    pub commands: Vec<Command>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            greeting: "Hi, my name is {nick}! I am a simple Twitch robot. \
                       Type !help for a list of commands I understand :-)"
                .to_string(),
            rate_limit: DEFAULT_CEILING,
            match_mode: MatchMode::Prefix,
            // Twitch pings roughly every five minutes
            read_timeout_secs: 360,
            commands: Vec::new(),
        }
    }
}

impl Settings {
    fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let settings: Settings = toml::from_str(content)?;
        Ok(settings)
    }

    pub fn read_timeout(&self) -> Option<Duration> {
        (self.read_timeout_secs > 0).then(|| Duration::from_secs(self.read_timeout_secs))
    }
}

/// Load `config.toml` from the project root, falling back to defaults
/// when there is no such file or it can not be parsed.
pub fn load_settings() -> Settings {
    let project_root = match project_root::get_project_root() {
        Ok(root) => root,
        Err(e) => {
            log::debug!("No project root found, using default settings: {}", e);
            return Settings::default();
        }
    };
    let settings_path = project_root.join(SETTINGS_FILE);

    if !settings_path.exists() {
        return Settings::default();
    }

    match Settings::from_file(&settings_path) {
        Ok(settings) => {
            log::info!("Loaded settings from {}", settings_path.display());
            settings
        }
        Err(e) => {
            log::error!("Failed to load {}: {}", settings_path.display(), e);
            Settings::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_normalized() {
        assert_eq!(SessionConfig::new("Bot", "oauth:X", "XBox").channel, "#xbox");
        assert_eq!(SessionConfig::new("Bot", "oauth:X", "#XBox").channel, "#xbox");
    }

    #[test]
    fn test_config_keeps_nick_and_token_as_given() {
        let config = SessionConfig::new("Robin", "oauth:ABC", "xbox");
        assert_eq!(config.nick, "Robin");
        assert_eq!(config.token, "oauth:ABC");
    }

    #[test]
    fn test_empty_settings_are_defaults() {
        assert_eq!(Settings::from_toml("").unwrap(), Settings::default());
        assert_eq!(
            Settings::default().read_timeout(),
            Some(Duration::from_secs(360))
        );
    }

    #[test]
    fn test_settings_from_toml() {
        let settings = Settings::from_toml(
            r#"
            greeting = "hello chat"
            rate_limit = 100
            match_mode = "exact"
            read_timeout_secs = 0

            [[commands]]
            trigger = "discord"
            response = "@{user} https://example.invalid"
            "#,
        )
        .unwrap();

        assert_eq!(settings.greeting, "hello chat");
        assert_eq!(settings.rate_limit, 100);
        assert_eq!(settings.match_mode, MatchMode::Exact);
        assert_eq!(settings.read_timeout(), None);
        assert_eq!(settings.commands.len(), 1);
        assert_eq!(settings.commands[0].trigger, "discord");
    }

    #[test]
    fn test_invalid_settings() {
        let err = Settings::from_toml("rate_limit = \"many\"").unwrap_err();
        assert!(err.to_string().starts_with("Configuration error"));
    }
}
