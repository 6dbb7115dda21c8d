use chrono::{DateTime, Local};

/// `asctime`-style layout used for the uptime reply
const UPTIME_FORMAT: &str = "%a %b %e %H:%M:%S %Y";

/// Context provided to command execution
#[derive(Debug, Clone)]
pub struct CommandContext {
    /// Display name of the chatter who sent the command
    pub display_name: String,
    /// The bot's own nick, as given on the command line
    pub bot_nick: String,
    /// When the session started
    pub started_at: DateTime<Local>,
}

impl CommandContext {
    pub fn new(display_name: String, bot_nick: String, started_at: DateTime<Local>) -> Self {
        Self {
            display_name,
            bot_nick,
            started_at,
        }
    }

    /// Session start time, human readable
    pub fn uptime(&self) -> String {
        self.started_at.format(UPTIME_FORMAT).to_string()
    }

    /// Replace placeholders in a reply template with context values
    pub fn replace_placeholders(&self, template: &str, commands: &str) -> String {
        template
            .replace("{user}", &self.display_name)
            .replace("{nick}", &self.bot_nick)
            .replace("{uptime}", &self.uptime())
            .replace("{commands}", commands)
    }
}
