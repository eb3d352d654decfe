//! Name lists as typed in a roster command.

use super::model::{Status, PLACEHOLDER};
use super::parser::{header_category, split_status_suffix};

/// Why a name token was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Ends in a status marker and would be misread as a status.
    MarkerSuffix,
    /// Looks like a category header.
    HeaderShaped,
    /// Contains a line break or the placeholder character.
    Unrenderable,
}

/// Check that a trimmed token renders and parses back unchanged.
pub fn validate_name(name: &str) -> Result<(), Rejection> {
    if name.contains('\n') || name.contains('\r') || name.contains(PLACEHOLDER) {
        return Err(Rejection::Unrenderable);
    }
    if split_status_suffix(name).is_some() || Status::from_marker(name).is_some() {
        return Err(Rejection::MarkerSuffix);
    }
    if header_category(name).is_some() {
        return Err(Rejection::HeaderShaped);
    }
    Ok(())
}

/// Split a comma-delimited list, trimming tokens and dropping empty or
/// invalid ones.
pub fn split_names(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .filter(|t| match validate_name(t) {
            Ok(()) => true,
            Err(reason) => {
                tracing::warn!("Dropping name '{}': {:?}", t, reason);
                false
            }
        })
        .map(str::to_string)
        .collect()
}

/// Text after `command` if `content` starts with it as a whole word.
pub fn command_args<'a>(content: &'a str, command: &str) -> Option<&'a str> {
    let rest = content.trim_start().strip_prefix(command)?;
    match rest.chars().next() {
        None => Some(""),
        Some(c) if c.is_whitespace() => Some(rest.trim()),
        Some(_) => None,
    }
}

/// Requested names from an edited command message. Content without the
/// command prefix is read as a bare name list.
pub fn requested_names(content: &str, command: &str) -> Vec<String> {
    let args = command_args(content, command).unwrap_or(content);
    split_names(args)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_commas_and_trims() {
        assert_eq!(
            split_names(" Felix Westfield, Mirella Sterling ,, John Paul Jones ,"),
            vec!["Felix Westfield", "Mirella Sterling", "John Paul Jones"]
        );
        assert!(split_names(" , ,").is_empty());
    }

    #[test]
    fn rejects_marker_collisions() {
        assert_eq!(validate_name("Bob ✅"), Err(Rejection::MarkerSuffix));
        assert_eq!(validate_name("❌"), Err(Rejection::MarkerSuffix));
        assert_eq!(validate_name("__**Arzt**__"), Err(Rejection::HeaderShaped));
        assert_eq!(validate_name("a\u{200b}"), Err(Rejection::Unrenderable));
        assert!(validate_name("Bob✅").is_ok());
        assert_eq!(split_names("Alice, Bob ❌, Carol"), vec!["Alice", "Carol"]);
    }

    #[test]
    fn command_args_requires_word_boundary() {
        assert_eq!(command_args("!liste A, B", "!liste"), Some("A, B"));
        assert_eq!(command_args("!liste", "!liste"), Some(""));
        assert_eq!(command_args("!listen A", "!liste"), None);
        assert_eq!(command_args("hello", "!liste"), None);
    }

    #[test]
    fn requested_names_with_and_without_prefix() {
        assert_eq!(requested_names("!liste Alice, Carol", "!liste"), vec!["Alice", "Carol"]);
        assert_eq!(requested_names("Alice, Carol", "!liste"), vec!["Alice", "Carol"]);
        assert!(requested_names("!liste", "!liste").is_empty());
    }
}
