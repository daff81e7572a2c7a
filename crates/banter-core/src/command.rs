//! The closed set of chat commands.
//!
//! Commands are parsed into explicit variants and dispatched with a
//! match — the command surface is statically enumerable, and nothing a
//! user types is ever treated as code.

/// A recognized chat command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Forget the conversation so far.
    Restart,
    /// Flip the content filter for this chat.
    ToggleFilter,
}

impl Command {
    /// Parse a command from the start of a message.
    ///
    /// Commands are `/name`, optionally suffixed `@botname` the way
    /// group chats address a specific bot. Anything unrecognized is
    /// plain dialogue text.
    pub fn parse(text: &str) -> Option<Command> {
        let first = text.trim().split_whitespace().next()?;
        let name = first.strip_prefix('/')?;
        let name = name.split('@').next().unwrap_or(name);
        match name {
            "start" | "restart" => Some(Command::Restart),
            "filter" => Some(Command::ToggleFilter),
            _ => None,
        }
    }
}

/// Strip a leading mention of the bot so addressed messages read as
/// plain text ("/banterbot how are you" → "how are you").
pub fn strip_mention<'a>(text: &'a str, bot_name: &str) -> &'a str {
    if bot_name.is_empty() {
        return text;
    }
    for prefix in [format!("/{bot_name}"), format!("@{bot_name}")] {
        if let Some(rest) = text.strip_prefix(prefix.as_str()) {
            return rest.trim_start();
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_restart() {
        assert_eq!(Command::parse("/restart"), Some(Command::Restart));
        assert_eq!(Command::parse("/start"), Some(Command::Restart));
        assert_eq!(Command::parse("  /restart  "), Some(Command::Restart));
    }

    #[test]
    fn parses_filter_toggle() {
        assert_eq!(Command::parse("/filter"), Some(Command::ToggleFilter));
    }

    #[test]
    fn parses_bot_suffixed_commands() {
        assert_eq!(Command::parse("/restart@banterbot"), Some(Command::Restart));
        assert_eq!(
            Command::parse("/filter@banterbot"),
            Some(Command::ToggleFilter)
        );
    }

    #[test]
    fn plain_text_is_not_a_command() {
        assert_eq!(Command::parse("hello"), None);
        assert_eq!(Command::parse("restart please"), None);
        assert_eq!(Command::parse(""), None);
    }

    #[test]
    fn unknown_slash_words_are_not_commands() {
        assert_eq!(Command::parse("/unknown"), None);
        assert_eq!(Command::parse("/ restart"), None);
    }

    #[test]
    fn command_must_lead_the_message() {
        assert_eq!(Command::parse("please /restart"), None);
    }

    #[test]
    fn strips_slash_mention() {
        assert_eq!(strip_mention("/banterbot how are you", "banterbot"), "how are you");
    }

    #[test]
    fn strips_at_mention() {
        assert_eq!(strip_mention("@banterbot hi", "banterbot"), "hi");
    }

    #[test]
    fn leaves_unaddressed_text_alone() {
        assert_eq!(strip_mention("just chatting", "banterbot"), "just chatting");
        assert_eq!(strip_mention("@someone else", "banterbot"), "@someone else");
    }

    #[test]
    fn empty_bot_name_is_a_noop() {
        assert_eq!(strip_mention("@banterbot hi", ""), "@banterbot hi");
    }
}
