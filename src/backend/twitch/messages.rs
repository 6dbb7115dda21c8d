/// One IRCv3 message tag.
///
/// `value` is unescaped; `value_start` is the byte offset of the escaped
/// value inside [`IrcLine::raw`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub key: String,
    pub value: String,
    value_start: usize,
}

/// A tokenized server line:
/// `[@tags ][:prefix ]COMMAND[ params...][ :trailing]`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IrcLine {
    /// The line without its CR/LF terminator
    pub raw: String,
    pub tags: Vec<Tag>,
    pub prefix: Option<String>,
    pub command: String,
    pub params: Vec<String>,
    pub trailing: Option<String>,
}

/// Display name and chat body of a user line. Either may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatLine {
    pub display_name: String,
    pub body: String,
}

impl ChatLine {
    /// True when the line came from a chatter and both parts were found
    pub fn is_user_message(&self) -> bool {
        !self.display_name.is_empty() && !self.body.is_empty()
    }
}

impl IrcLine {
    /// Tokenize a raw line. Never fails: missing parts stay empty.
    pub fn parse(raw: &str) -> Self {
        let line = raw.trim_end_matches(['\r', '\n']);
        let mut parsed = IrcLine {
            raw: line.to_string(),
            ..Default::default()
        };

        let mut rest = line;

        if let Some(tagged) = line.strip_prefix('@') {
            let end = tagged.find(' ').unwrap_or(tagged.len());
            parsed.tags = parse_tags(&tagged[..end], 1);
            rest = &tagged[end..];
        }

        rest = rest.trim_start_matches(' ');
        if let Some(prefixed) = rest.strip_prefix(':') {
            let end = prefixed.find(' ').unwrap_or(prefixed.len());
            parsed.prefix = Some(prefixed[..end].to_string());
            rest = &prefixed[end..];
        }

        rest = rest.trim_start_matches(' ');
        let end = rest.find(' ').unwrap_or(rest.len());
        parsed.command = rest[..end].to_string();
        rest = &rest[end..];

        loop {
            rest = rest.trim_start_matches(' ');
            if rest.is_empty() {
                break;
            }
            if let Some(trailing) = rest.strip_prefix(':') {
                parsed.trailing = Some(trailing.to_string());
                break;
            }
            let end = rest.find(' ').unwrap_or(rest.len());
            parsed.params.push(rest[..end].to_string());
            rest = &rest[end..];
        }

        parsed
    }

    /// Last value for `key`, mirroring how a repeated tag overrides earlier ones
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.last_tag(key).map(|t| t.value.as_str())
    }

    fn last_tag(&self, key: &str) -> Option<&Tag> {
        self.tags.iter().rev().find(|t| t.key == key)
    }

    /// The sender's presentation name.
    ///
    /// Falls back from `display-name` to the text between `user-type=`
    /// and the next `!` (the nick part of the prefix). Empty when
    /// neither is usable.
    pub fn display_name(&self) -> String {
        if let Some(name) = self.tag("display-name").filter(|n| !n.is_empty()) {
            return name.to_string();
        }

        // Users without a display name
        if let Some(user_type) = self.last_tag("user-type") {
            let tail = &self.raw[user_type.value_start..];
            if let Some(stop) = tail.find('!').filter(|stop| *stop > 0) {
                return tail[..stop].to_string();
            }
        }

        String::new()
    }

    /// The chat text addressed to `channel`.
    ///
    /// Only lines with a `user-type` tag are chat lines. A chat line that
    /// has no `<channel> :text` part, or an empty text, yields a single
    /// space so callers can tell it apart from a non-chat line, which
    /// yields "".
    pub fn message_body(&self, channel: &str) -> String {
        if self.last_tag("user-type").is_none() {
            return String::new();
        }

        match (self.params.last(), &self.trailing) {
            (Some(target), Some(text))
                if !text.is_empty() && target.eq_ignore_ascii_case(channel) =>
            {
                text.clone()
            }
            _ => " ".to_string(),
        }
    }

    pub fn chat(&self, channel: &str) -> ChatLine {
        ChatLine {
            display_name: self.display_name(),
            body: self.message_body(channel),
        }
    }
}

pub fn display_name(raw: &str) -> String {
    IrcLine::parse(raw).display_name()
}

pub fn message_body(raw: &str, channel: &str) -> String {
    IrcLine::parse(raw).message_body(channel)
}

/// Split a tag section (without the leading `@`) into tags.
/// `base` is the section's byte offset in the raw line.
fn parse_tags(section: &str, base: usize) -> Vec<Tag> {
    let mut tags = Vec::new();
    let mut pos = base;

    for item in section.split(';') {
        if !item.is_empty() {
            let (key, value, value_start) = match item.find('=') {
                Some(eq) => (&item[..eq], &item[eq + 1..], pos + eq + 1),
                None => (item, "", pos + item.len()),
            };
            tags.push(Tag {
                key: key.to_string(),
                value: unescape_tag_value(value),
                value_start,
            });
        }
        pos += item.len() + 1;
    }

    tags
}

/// Undo IRCv3 tag value escaping (`\:` `\s` `\\` `\r` `\n`)
fn unescape_tag_value(value: &str) -> String {
    let mut unescaped = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            unescaped.push(c);
            continue;
        }
        match chars.next() {
            Some(':') => unescaped.push(';'),
            Some('s') => unescaped.push(' '),
            Some('\\') => unescaped.push('\\'),
            Some('r') => unescaped.push('\r'),
            Some('n') => unescaped.push('\n'),
            Some(other) => unescaped.push(other),
            None => break,
        }
    }
    unescaped
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRIVMSG: &str = "@badge-info=;badges=moderator/1;color=#1E90FF;display-name=Foo;emotes=;\
        id=abc;mod=1;room-id=1;subscriber=0;tmi-sent-ts=1;turbo=0;user-id=2;user-type=mod \
        :foo!foo@foo.tmi.twitch.tv PRIVMSG #channel :hello world\r\n";

    #[test]
    fn test_parse_privmsg() {
        let line = IrcLine::parse(PRIVMSG);
        assert_eq!(line.command, "PRIVMSG");
        assert_eq!(line.prefix.as_deref(), Some("foo!foo@foo.tmi.twitch.tv"));
        assert_eq!(line.params, vec!["#channel".to_string()]);
        assert_eq!(line.trailing.as_deref(), Some("hello world"));
        assert_eq!(line.tag("color"), Some("#1E90FF"));
        assert_eq!(line.tag("emotes"), Some(""));
        assert!(!line.raw.ends_with('\n'));
    }

    #[test]
    fn test_display_name_from_tag() {
        assert_eq!(display_name(PRIVMSG), "Foo");
    }

    #[test]
    fn test_display_name_falls_back_to_user_type() {
        let raw = "@badges=;user-type=mod :foo!foo@foo.tmi.twitch.tv PRIVMSG #channel :hi";
        assert_eq!(display_name(raw), "mod :foo");
    }

    #[test]
    fn test_empty_display_name_tag_falls_back() {
        let raw = "@display-name=;user-type= :bar!bar@bar.tmi.twitch.tv PRIVMSG #channel :yo";
        assert_eq!(display_name(raw), " :bar");
    }

    #[test]
    fn test_display_name_missing() {
        assert_eq!(display_name(""), "");
        assert_eq!(display_name("PING :tmi.twitch.tv"), "");
        assert_eq!(display_name(":tmi.twitch.tv 001 bot :Welcome, GLHF!"), "");
    }

    #[test]
    fn test_user_type_fallback_needs_a_nick() {
        assert_eq!(display_name("@user-type= :tmi.twitch.tv USERSTATE #c"), "");
        assert_eq!(display_name("@user-type=!x :a PRIVMSG #c :hi"), "");
    }

    #[test]
    fn test_last_display_name_wins() {
        let raw = "@display-name=Old;display-name=New;user-type= :x!x@x PRIVMSG #c :a";
        assert_eq!(display_name(raw), "New");
    }

    #[test]
    fn test_chat_text_cannot_spoof_tags() {
        let raw = "@display-name=Real;user-type= :r!r@r PRIVMSG #channel :display-name=Fake;";
        assert_eq!(display_name(raw), "Real");
    }

    #[test]
    fn test_message_body() {
        assert_eq!(message_body(PRIVMSG, "#channel"), "hello world");
    }

    #[test]
    fn test_message_body_keeps_colons_in_text() {
        let raw = "@user-type= :a!a@a PRIVMSG #channel :see #channel :this";
        assert_eq!(message_body(raw, "#channel"), "see #channel :this");
    }

    #[test]
    fn test_message_body_requires_user_type() {
        assert_eq!(message_body(":a!a@a PRIVMSG #channel :hello", "#channel"), "");
        assert_eq!(message_body("PING :tmi.twitch.tv", "#channel"), "");
        assert_eq!(message_body("", "#channel"), "");
    }

    #[test]
    fn test_user_line_without_channel_is_a_space() {
        let raw = "@badges=;display-name=Foo;user-type= :tmi.twitch.tv USERSTATE #channel";
        assert_eq!(message_body(raw, "#channel"), " ");
        assert_eq!(message_body(PRIVMSG, "#other"), " ");
    }

    #[test]
    fn test_empty_chat_text_is_a_space() {
        let raw = "@display-name=Foo;user-type= :foo!foo@foo PRIVMSG #channel :";
        assert_eq!(message_body(raw, "#channel"), " ");
    }

    #[test]
    fn test_chat_line() {
        let chat = IrcLine::parse(PRIVMSG).chat("#channel");
        assert!(chat.is_user_message());
        assert_eq!(chat.display_name, "Foo");

        let ping = IrcLine::parse("PING :tmi.twitch.tv").chat("#channel");
        assert!(!ping.is_user_message());
        assert_eq!(ping, ChatLine::default());
    }

    #[test]
    fn test_parse_untagged_numeric() {
        let line = IrcLine::parse(":tmi.twitch.tv 001 bot :Welcome, GLHF!\r\n");
        assert!(line.tags.is_empty());
        assert_eq!(line.command, "001");
        assert_eq!(line.params, vec!["bot".to_string()]);
        assert_eq!(line.trailing.as_deref(), Some("Welcome, GLHF!"));
    }

    #[test]
    fn test_unescape_tag_value() {
        let line = IrcLine::parse("@system-msg=a\\sb\\:c\\\\d :tmi.twitch.tv USERNOTICE #c");
        assert_eq!(line.tag("system-msg"), Some("a b;c\\d"));
        assert_eq!(unescape_tag_value("trailing\\"), "trailing");
    }
}
