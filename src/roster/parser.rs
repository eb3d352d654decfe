//! Board parsing: reconstruct roster state from what a board displays.
//!
//! Three physical encodings are accepted and normalised to [`RosterEntry`]:
//! - categorized embeds: `__**Tier**__` header fields followed by `Name ✅` rows,
//! - legacy flat embeds whose rows keep the status in the field value (`❌ Status`),
//! - plain-text boards with one `Name ❌` line per row.
//!
//! Parsing never fails. A row that cannot be classified becomes a catch-all
//! entry with status absent.

use regex::Regex;
use std::sync::OnceLock;

use super::model::{
    BoardHeader, BoardMode, CategoryTiers, RosterBoard, RosterEntry, RowStyle, Status, Surface,
};
use super::render::{EmbedField, RenderedBoard};

fn header_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^__\*\*(.+)\*\*__$").expect("static header pattern"))
}

/// Category label if `field_name` is a header.
pub fn header_category(field_name: &str) -> Option<&str> {
    header_pattern()
        .captures(field_name.trim())
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Split a trailing ` ✅`/` ❌` off `label`.
pub fn split_status_suffix(label: &str) -> Option<(&str, Status)> {
    let (name, last) = label.trim().rsplit_once(' ')?;
    let status = Status::from_marker(last)?;
    Some((name.trim_end(), status))
}

/// Reconstruct a board from its rendered form.
pub fn parse(rendered: &RenderedBoard, tiers: &CategoryTiers) -> RosterBoard {
    match &rendered.embed {
        Some(embed) => {
            let mode = if embed.fields.iter().any(|f| header_category(&f.name).is_some()) {
                BoardMode::Categorized
            } else {
                BoardMode::Flat
            };
            let mut board = RosterBoard::new(
                BoardHeader {
                    title: embed.title.clone(),
                    description: embed.description.clone(),
                    color: embed.color,
                },
                mode,
            );

            let mut current: Option<String> = None;
            for field in &embed.fields {
                if let Some(label) = header_category(&field.name) {
                    current = tiers.classify(label);
                    continue;
                }
                let Some(mut entry) = parse_field(field) else {
                    continue;
                };
                if mode == BoardMode::Categorized {
                    entry.category = current.clone();
                }
                board.entries.push(entry);
            }
            board
        }
        None => {
            let mut board = RosterBoard::new(BoardHeader::default(), BoardMode::Flat);
            board.surface = Surface::Text;
            board.entries = rendered
                .content
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(|line| match split_status_suffix(line) {
                    Some((name, status)) => RosterEntry::new(name, None).with_status(status),
                    None => {
                        tracing::debug!("Unclassified board line '{}', defaulting to absent", line);
                        RosterEntry::new(line, None)
                    }
                })
                .collect();
            board
        }
    }
}

fn parse_field(field: &EmbedField) -> Option<RosterEntry> {
    let label = field.name.trim();
    if label.is_empty() {
        return None;
    }

    let (name, status, style) = if let Some((name, status)) = split_status_suffix(label) {
        (name, status, RowStyle::Suffix)
    } else if let Some((status, rest)) = legacy_value_status(&field.value) {
        (label, status, RowStyle::StatusValue(rest.to_string()))
    } else {
        tracing::debug!("Unclassified board field '{}', defaulting to absent", label);
        (label, Status::Absent, RowStyle::Suffix)
    };

    let mut entry = RosterEntry::new(name, None).with_status(status);
    entry.inline = field.inline;
    entry.style = style;
    Some(entry)
}

/// Status kept in the value of legacy rows, e.g. `❌ Status`, plus the text
/// after the marker.
fn legacy_value_status(value: &str) -> Option<(Status, &str)> {
    let value = value.trim_start();
    let first = value.split_whitespace().next()?;
    let status = Status::from_marker(first)?;
    Some((status, &value[first.len()..]))
}

/// Whether a message authored by the bot displays a roster board.
pub fn looks_like_board(rendered: &RenderedBoard, title: &str) -> bool {
    match &rendered.embed {
        Some(embed) => {
            embed.title.as_deref() == Some(title)
                || embed
                    .fields
                    .iter()
                    .any(|f| split_status_suffix(&f.name).is_some())
        }
        None => {
            let mut lines = rendered
                .content
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .peekable();
            lines.peek().is_some() && lines.all(|l| split_status_suffix(l).is_some())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::model::PLACEHOLDER;
    use crate::roster::render::{render, BoardEmbed};

    fn tiers() -> CategoryTiers {
        CategoryTiers::default()
    }

    fn field(name: &str, value: &str, inline: bool) -> EmbedField {
        EmbedField::new(name, value, inline)
    }

    fn embed(fields: Vec<EmbedField>) -> RenderedBoard {
        RenderedBoard::embed(BoardEmbed {
            title: Some("Dienstübersicht".to_string()),
            description: Some("Reagiere".to_string()),
            color: Some(7),
            fields,
        })
    }

    #[test]
    fn parses_categorized_board() {
        let rendered = embed(vec![
            field("__**Arzt**__", PLACEHOLDER, false),
            field("Anna ✅", PLACEHOLDER, true),
            field("Ben ❌", PLACEHOLDER, true),
            field("__**Andere**__", PLACEHOLDER, false),
            field("John Paul Jones ✅", PLACEHOLDER, true),
        ]);

        let board = parse(&rendered, &tiers());
        assert_eq!(board.mode, BoardMode::Categorized);
        assert_eq!(board.surface, Surface::Embed);
        assert_eq!(board.header.color, Some(7));
        assert_eq!(board.names(), vec!["Anna", "Ben", "John Paul Jones"]);
        assert_eq!(board.entries[0].status, Status::Present);
        assert_eq!(board.entries[0].category.as_deref(), Some("Arzt"));
        assert_eq!(board.entries[1].status, Status::Absent);
        assert_eq!(board.entries[2].category, None);
        assert_eq!(board.entries[2].status, Status::Present);
    }

    #[test]
    fn parses_legacy_flat_value_encoding() {
        let rendered = embed(vec![
            field("Felix", "❌ Status", false),
            field("Mira ✅", "❌ Status", false),
        ]);

        let board = parse(&rendered, &tiers());
        assert_eq!(board.mode, BoardMode::Flat);
        assert_eq!(board.names(), vec!["Felix", "Mira"]);
        assert_eq!(board.entries[0].status, Status::Absent);
        assert!(!board.entries[0].inline);
        assert_eq!(board.entries[0].style, RowStyle::legacy());
        // The name suffix wins over the value.
        assert_eq!(board.entries[1].status, Status::Present);
        assert_eq!(board.entries[1].style, RowStyle::Suffix);
    }

    #[test]
    fn unclassified_fields_fall_back_to_absent_catch_all() {
        let rendered = embed(vec![
            field("Stray row", "whatever", true),
            field("__**Arzt**__", PLACEHOLDER, false),
            field("Anna ✅", PLACEHOLDER, true),
        ]);

        let board = parse(&rendered, &tiers());
        assert_eq!(board.entries[0].name, "Stray row");
        assert_eq!(board.entries[0].status, Status::Absent);
        assert_eq!(board.entries[0].category, None);
        assert_eq!(board.entries[1].category.as_deref(), Some("Arzt"));
    }

    #[test]
    fn unknown_headers_collapse_into_catch_all() {
        let rendered = embed(vec![
            field("__**Gast**__", PLACEHOLDER, false),
            field("Gus ❌", PLACEHOLDER, true),
        ]);
        let board = parse(&rendered, &tiers());
        assert_eq!(board.mode, BoardMode::Categorized);
        assert_eq!(board.entries[0].category, None);
    }

    #[test]
    fn parses_text_board() {
        let board = parse(&RenderedBoard::text("Felix ✅\nTom ❌\n\nOdd"), &tiers());
        assert_eq!(board.surface, Surface::Text);
        assert_eq!(board.mode, BoardMode::Flat);
        assert_eq!(board.names(), vec!["Felix", "Tom", "Odd"]);
        assert_eq!(board.entries[0].status, Status::Present);
        assert_eq!(board.entries[2].status, Status::Absent);
    }

    #[test]
    fn render_parse_render_is_stable() {
        let categorized = embed(vec![
            field("__**Chefarzt**__", PLACEHOLDER, false),
            field("Carl ✅", PLACEHOLDER, true),
            field("__**Praktikant**__", PLACEHOLDER, false),
            field("Pia ❌", PLACEHOLDER, true),
            field("__**Andere**__", PLACEHOLDER, false),
            field("Zoe ❌", PLACEHOLDER, true),
            field("Zoe ✅", PLACEHOLDER, true),
        ]);
        let flat = embed(vec![
            field("Carl ✅", PLACEHOLDER, true),
            field("Pia ❌", PLACEHOLDER, false),
        ]);
        let legacy = embed(vec![
            field("Felix", "✅ Status", false),
            field("Tom", "❌ Status", false),
        ]);
        let text = RenderedBoard::text("Felix ✅\nTom ❌");

        for rendered in [categorized, flat, legacy, text] {
            let once = render(&parse(&rendered, &tiers()), &tiers());
            let twice = render(&parse(&once, &tiers()), &tiers());
            assert_eq!(once, twice);
            assert_eq!(once, rendered);
        }
    }

    #[test]
    fn header_detection() {
        assert_eq!(header_category("__**Arzt**__"), Some("Arzt"));
        assert_eq!(header_category("Arzt ✅"), None);
        assert_eq!(header_category("__**__"), None);
    }

    #[test]
    fn board_detection() {
        assert!(looks_like_board(&embed(vec![]), "Dienstübersicht"));
        let untitled = RenderedBoard::embed(BoardEmbed {
            fields: vec![field("Anna ✅", PLACEHOLDER, true)],
            ..Default::default()
        });
        assert!(looks_like_board(&untitled, "Dienstübersicht"));
        assert!(looks_like_board(&RenderedBoard::text("Felix ❌"), "x"));
        assert!(!looks_like_board(&RenderedBoard::text("hello there"), "x"));
        assert!(!looks_like_board(&RenderedBoard::text(""), "x"));
    }
}
