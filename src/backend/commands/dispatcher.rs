use chrono::{DateTime, Local};

use super::{CommandContext, CommandParser, CommandRegistry};

/// Picks the reply for a chat body
#[derive(Debug, Clone)]
pub struct CommandDispatcher {
    registry: CommandRegistry,
    parser: CommandParser,
    bot_nick: String,
    started_at: DateTime<Local>,
}

impl CommandDispatcher {
    pub fn new(
        registry: CommandRegistry,
        parser: CommandParser,
        bot_nick: String,
        started_at: DateTime<Local>,
    ) -> Self {
        Self {
            registry,
            parser,
            bot_nick,
            started_at,
        }
    }

    /// Reply text for `body`, or `None` when nothing matches.
    ///
    /// `body` must already be lower-cased. The first enabled command in
    /// registry order wins.
    pub fn dispatch(&self, display_name: &str, body: &str) -> Option<String> {
        if !self.parser.is_command(body) {
            return None;
        }

        let command = self
            .registry
            .enabled()
            .find(|c| self.parser.matches(&c.trigger, body))?;

        log::debug!("{} invoked {}", display_name, self.parser.display(&command.trigger));

        let context = CommandContext::new(
            display_name.to_string(),
            self.bot_nick.clone(),
            self.started_at,
        );
        Some(context.replace_placeholders(&command.response, &self.command_list()))
    }

    fn command_list(&self) -> String {
        self.registry
            .enabled()
            .map(|c| {
                let trigger = self.parser.display(&c.trigger);
                if c.description.is_empty() {
                    trigger
                } else {
                    format!("{} ({})", trigger, c.description)
                }
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::commands::{Command, MatchMode};
    use chrono::TimeZone;

    fn dispatcher(mode: MatchMode) -> CommandDispatcher {
        let started_at = Local.with_ymd_and_hms(2017, 2, 22, 18, 30, 0).unwrap();
        CommandDispatcher::new(
            CommandRegistry::with_builtins(),
            CommandParser::with_default_prefix(mode),
            "CBot".to_string(),
            started_at,
        )
    }

    #[test]
    fn test_hi() {
        let reply = dispatcher(MatchMode::Prefix).dispatch("Foo", "!hi").unwrap();
        assert!(reply.starts_with("@Foo Hi, my name is CBot!"));
    }

    #[test]
    fn test_help_lists_commands() {
        let reply = dispatcher(MatchMode::Prefix).dispatch("Foo", "!help").unwrap();
        assert_eq!(
            reply,
            "@Foo Here are the commands I understand: !hi (Say hello), \
             !help (List known commands), !uptime (Show when the bot started)"
        );
    }

    #[test]
    fn test_help_skips_empty_descriptions() {
        let mut registry = CommandRegistry::new();
        registry.register(Command::new("help", "", "{commands}"));
        registry.register(Command::new("lurk", "Go quiet", "bye"));
        let dispatcher = CommandDispatcher::new(
            registry,
            CommandParser::default(),
            "CBot".to_string(),
            Local::now(),
        );

        assert_eq!(
            dispatcher.dispatch("Foo", "!help").as_deref(),
            Some("!help, !lurk (Go quiet)")
        );
    }

    #[test]
    fn test_uptime_contains_start_time() {
        let dispatcher = dispatcher(MatchMode::Prefix);
        for _ in 0..3 {
            let reply = dispatcher.dispatch("Foo", "!uptime").unwrap();
            assert_eq!(reply, "@Foo I've been up since Wed Feb 22 18:30:00 2017");
        }
    }

    #[test]
    fn test_no_match() {
        let dispatcher = dispatcher(MatchMode::Prefix);
        assert_eq!(dispatcher.dispatch("Foo", "!unknown"), None);
        assert_eq!(dispatcher.dispatch("Foo", "hello"), None);
        assert_eq!(dispatcher.dispatch("Foo", " "), None);
        assert_eq!(dispatcher.dispatch("", ""), None);
    }

    #[test]
    fn test_case_normalized_by_caller() {
        let dispatcher = dispatcher(MatchMode::Prefix);
        let body = "!UpTiMe".to_lowercase();
        assert!(dispatcher.dispatch("Foo", &body).is_some());
    }

    #[test]
    fn test_prefix_quirk_and_exact_mode() {
        let reply = dispatcher(MatchMode::Prefix).dispatch("Foo", "!hidden").unwrap();
        assert!(reply.contains("Hi, my name is"));

        assert_eq!(dispatcher(MatchMode::Exact).dispatch("Foo", "!hidden"), None);
        assert!(dispatcher(MatchMode::Exact).dispatch("Foo", "!hi bot").is_some());
    }

    #[test]
    fn test_priority_and_disabled_commands() {
        let mut registry = CommandRegistry::with_builtins();
        registry.register(Command::new("h", "", "short"));
        registry.register(Command::new("uptime", "", "hidden").with_enabled(false));
        let dispatcher = CommandDispatcher::new(
            registry,
            CommandParser::default(),
            "CBot".to_string(),
            Local::now(),
        );

        // `!hi` is registered before `!h`
        assert!(dispatcher.dispatch("Foo", "!hi").unwrap().contains("Hi, my name"));
        assert_eq!(dispatcher.dispatch("Foo", "!hx").as_deref(), Some("short"));
        assert_eq!(dispatcher.dispatch("Foo", "!uptime"), None);
    }
}
