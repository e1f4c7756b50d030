//! Slash command parsing for the chat application.
//!
//! This module handles parsing of special commands that start with `/`,
//! allowing users to manage pending photos and inspect the client without
//! sending anything to the backend.

/// A parsed chat command.
///
/// These commands control the chat session and are not sent to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    /// Queue a photo from disk for the next message.
    Attach(String),

    /// Drop a queued photo by its 1-based position.
    Detach(usize),

    /// List the queued photos.
    ListPhotos,

    /// Drop every queued photo.
    ClearPhotos,

    /// Probe the backend's health endpoint.
    Health,

    /// Show connection diagnostics.
    Diagnostics,

    /// Show the session identifier.
    Session,

    /// Display help information.
    Help,

    /// Exit the chat application.
    Quit,

    /// Report a parsing error back to the caller.
    Invalid(String),
}

/// Parses user input for slash commands.
///
/// Returns `Some(ChatCommand)` if the input is a valid command,
/// or `None` if it should be treated as a regular message.
///
/// # Examples
///
/// ```
/// # use webhook_chat::chat::parse_command;
/// assert!(parse_command("/quit").is_some());
/// assert!(parse_command("/attach tattoo.jpg").is_some());
/// assert!(parse_command("How much is a small tattoo?").is_none());
/// ```
pub fn parse_command(input: &str) -> Option<ChatCommand> {
    let input = input.trim();

    if !input.starts_with('/') {
        return None;
    }

    let mut parts = input[1..].splitn(2, ' ');
    let command = parts.next()?.to_lowercase();
    let argument = parts.next().map(|s| s.trim()).filter(|s| !s.is_empty());

    let result = match command.as_str() {
        "attach" | "photo" => match argument {
            Some(path) => ChatCommand::Attach(path.to_string()),
            None => ChatCommand::Invalid("/attach requires a file path".to_string()),
        },
        "detach" => match argument.map(str::parse::<usize>) {
            Some(Ok(index)) if index > 0 => ChatCommand::Detach(index),
            Some(_) => ChatCommand::Invalid("/detach expects a photo number from /photos".to_string()),
            None => ChatCommand::Invalid("/detach requires a photo number".to_string()),
        },
        "photos" => ChatCommand::ListPhotos,
        "clear" => ChatCommand::ClearPhotos,
        "health" | "ping" => ChatCommand::Health,
        "diag" | "diagnostics" => ChatCommand::Diagnostics,
        "session" => ChatCommand::Session,
        "help" | "?" => ChatCommand::Help,
        "quit" | "exit" | "q" => ChatCommand::Quit,
        _ => ChatCommand::Invalid(format!("Unknown command: /{}", command)),
    };

    Some(result)
}

/// Returns help text describing available commands.
pub fn help_text() -> &'static str {
    r#"Available commands:
  /attach <path>         Queue a photo for the next message
  /detach <n>            Remove queued photo number n
  /photos                List queued photos
  /clear                 Remove all queued photos
  /health                Check that the chat backend is up
  /diag                  Show connection diagnostics
  /session               Show the session identifier
  /help                  Show this help message
  /quit                  Exit the chat"#
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_quit_commands() {
        assert_eq!(parse_command("/quit"), Some(ChatCommand::Quit));
        assert_eq!(parse_command("/exit"), Some(ChatCommand::Quit));
        assert_eq!(parse_command("/q"), Some(ChatCommand::Quit));
        assert_eq!(parse_command("  /quit  "), Some(ChatCommand::Quit));
    }

    #[test]
    fn parse_attach() {
        assert_eq!(
            parse_command("/attach ./arm sketch.png"),
            Some(ChatCommand::Attach("./arm sketch.png".to_string()))
        );
        assert_eq!(
            parse_command("/attach"),
            Some(ChatCommand::Invalid(
                "/attach requires a file path".to_string()
            ))
        );
    }

    #[test]
    fn parse_detach() {
        assert_eq!(parse_command("/detach 2"), Some(ChatCommand::Detach(2)));
        assert!(matches!(
            parse_command("/detach 0"),
            Some(ChatCommand::Invalid(msg)) if msg.contains("expects")
        ));
        assert!(matches!(
            parse_command("/detach two"),
            Some(ChatCommand::Invalid(msg)) if msg.contains("expects")
        ));
        assert!(matches!(
            parse_command("/detach"),
            Some(ChatCommand::Invalid(msg)) if msg.contains("requires")
        ));
    }

    #[test]
    fn parse_photo_listing() {
        assert_eq!(parse_command("/photos"), Some(ChatCommand::ListPhotos));
        assert_eq!(parse_command("/CLEAR"), Some(ChatCommand::ClearPhotos));
    }

    #[test]
    fn parse_inspection_commands() {
        assert_eq!(parse_command("/health"), Some(ChatCommand::Health));
        assert_eq!(parse_command("/diag"), Some(ChatCommand::Diagnostics));
        assert_eq!(parse_command("/session"), Some(ChatCommand::Session));
        assert_eq!(parse_command("/?"), Some(ChatCommand::Help));
    }

    #[test]
    fn unknown_command() {
        assert_eq!(
            parse_command("/model gpt"),
            Some(ChatCommand::Invalid("Unknown command: /model".to_string()))
        );
    }

    #[test]
    fn non_commands() {
        assert_eq!(parse_command("שלום"), None);
        assert_eq!(parse_command(""), None);
        assert_eq!(parse_command("  "), None);
    }

    #[test]
    fn help_text_not_empty() {
        let help = help_text();
        assert!(help.contains("/quit"));
        assert!(help.contains("/attach"));
        assert!(help.contains("/diag"));
    }
}
