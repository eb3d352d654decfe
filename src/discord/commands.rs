//! Prefix command parsing.

/// A recognised bot command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command<'a> {
    /// Create a roster board from the comma-separated arguments.
    Roster(&'a str),
    Ping,
    Status,
    Unknown(&'a str),
}

pub const UNKNOWN_COMMAND_REPLY: &str =
    "Befehl nicht gefunden. Nutze `!help` um verfügbare Befehle zu sehen.";

/// Parse `content` as a prefix command. Returns `None` for plain messages.
pub fn parse_command<'a>(content: &'a str, prefix: &str, roster_name: &str) -> Option<Command<'a>> {
    let rest = content.trim_start().strip_prefix(prefix)?;
    let (word, args) = match rest.find(char::is_whitespace) {
        Some(idx) => (&rest[..idx], rest[idx..].trim()),
        None => (rest, ""),
    };
    if word.is_empty() {
        return None;
    }

    Some(if word == roster_name {
        Command::Roster(args)
    } else {
        match word {
            "ping" => Command::Ping,
            "status" => Command::Status,
            other => Command::Unknown(other),
        }
    })
}

pub fn pong_reply(latency_ms: Option<u128>) -> String {
    match latency_ms {
        Some(ms) => format!("Pong! Latenz: {}ms", ms),
        None => "Pong!".to_string(),
    }
}
