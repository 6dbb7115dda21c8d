use std::fmt;

/// Errors that can occur during Twitch IRC operations
#[derive(Debug)]
pub enum TwitchError {
    /// The server name could not be resolved to any address
    ResolveError(String),

    /// Socket creation or TCP connect failed
    ConnectError(String),

    /// Read or write failure on an established connection
    IoError(String),

    /// Settings file could not be read or parsed
    ConfigError(String),
}

impl fmt::Display for TwitchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TwitchError::ResolveError(msg) => write!(f, "Resolve error: {}", msg),
            TwitchError::ConnectError(msg) => write!(f, "Connect error: {}", msg),
            TwitchError::IoError(msg) => write!(f, "I/O error: {}", msg),
            TwitchError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for TwitchError {}

impl From<std::io::Error> for TwitchError {
    fn from(err: std::io::Error) -> Self {
        TwitchError::IoError(err.to_string())
    }
}

impl From<toml::de::Error> for TwitchError {
    fn from(err: toml::de::Error) -> Self {
        TwitchError::ConfigError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TwitchError>;
