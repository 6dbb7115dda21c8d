use serde::{Deserialize, Serialize};

/// A command definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    /// The command trigger (without the ! prefix)
    pub trigger: String,
    /// Description of what the command does
    #[serde(default)]
    pub description: String,
    /// Reply template; see [`super::CommandContext::replace_placeholders`]
    pub response: String,
    /// Whether the command is enabled
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl Command {
    /// Create a new command
    pub fn new(trigger: &str, description: &str, response: &str) -> Self {
        Self {
            trigger: trigger.to_lowercase(),
            description: description.to_string(),
            response: response.to_string(),
            enabled: true,
        }
    }

    /// Builder method to set enabled state
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// Ordered set of commands. Earlier entries win when several match.
#[derive(Debug, Clone, Default)]
pub struct CommandRegistry {
    commands: Vec<Command>,
}

impl CommandRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// `!hi`, `!help` and `!uptime`, in that priority order
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Command::new(
            "hi",
            "Say hello",
            "@{user} Hi, my name is {nick}! I am a simple Twitch robot. \
             Type !help for a list of commands I understand :-)",
        ));
        registry.register(Command::new(
            "help",
            "List known commands",
            "@{user} Here are the commands I understand: {commands}",
        ));
        registry.register(Command::new(
            "uptime",
            "Show when the bot started",
            "@{user} I've been up since {uptime}",
        ));
        registry
    }

    /// Register a command. Re-registering a trigger replaces it in place,
    /// keeping its priority.
    pub fn register(&mut self, mut command: Command) {
        command.trigger = command.trigger.to_lowercase();

        match self.commands.iter_mut().find(|c| c.trigger == command.trigger) {
            Some(existing) => *existing = command,
            None => self.commands.push(command),
        }
    }

    /// Unregister a command
    pub fn unregister(&mut self, trigger: &str) -> Option<Command> {
        let index = self.commands.iter().position(|c| c.trigger == trigger)?;
        Some(self.commands.remove(index))
    }

    /// Get a command by trigger
    pub fn get(&self, trigger: &str) -> Option<&Command> {
        self.commands.iter().find(|c| c.trigger == trigger)
    }

    /// All commands in priority order
    pub fn list(&self) -> &[Command] {
        &self.commands
    }

    /// Enabled commands in priority order
    pub fn enabled(&self) -> impl Iterator<Item = &Command> {
        self.commands.iter().filter(|c| c.enabled)
    }

    /// Get the number of registered commands
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl Extend<Command> for CommandRegistry {
    fn extend<I: IntoIterator<Item = Command>>(&mut self, iter: I) {
        for command in iter {
            self.register(command);
        }
    }
}
