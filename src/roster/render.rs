//! Board rendering.
//!
//! A board renders either to an embed (one field per category header or row)
//! or to plain text (one `Name ✅` line per row). Header fields are wrapped in
//! `__**…**__` and rows carry the status marker as the last space-separated
//! token of the field name, so [`super::parser`] can invert the rendering.

use serde::{Deserialize, Serialize};

use super::model::{
    BoardMode, CategoryTiers, RosterBoard, RosterEntry, RowStyle, Surface, PLACEHOLDER,
};

/// One embed field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

impl EmbedField {
    pub fn new(name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            inline,
        }
    }
}

/// Embed payload of a board message.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BoardEmbed {
    pub title: Option<String>,
    pub description: Option<String>,
    pub color: Option<u32>,
    pub fields: Vec<EmbedField>,
}

/// What a board message displays.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RenderedBoard {
    pub content: String,
    pub embed: Option<BoardEmbed>,
}

impl RenderedBoard {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            embed: None,
        }
    }

    pub fn embed(embed: BoardEmbed) -> Self {
        Self {
            content: String::new(),
            embed: Some(embed),
        }
    }
}

/// Field name of a category header.
pub fn header_label(category: &str) -> String {
    format!("__**{}**__", category)
}

/// Field name (or text line) of an entry row.
pub fn row_label(entry: &RosterEntry) -> String {
    format!("{} {}", entry.name, entry.status.marker())
}

/// Render a board.
pub fn render(board: &RosterBoard, tiers: &CategoryTiers) -> RenderedBoard {
    match board.surface {
        Surface::Text => RenderedBoard::text(
            board
                .entries
                .iter()
                .map(row_label)
                .collect::<Vec<_>>()
                .join("\n"),
        ),
        Surface::Embed => {
            let fields = match board.mode {
                BoardMode::Flat => board.entries.iter().map(row_field).collect(),
                BoardMode::Categorized => categorized_fields(&board.entries, tiers),
            };
            RenderedBoard::embed(BoardEmbed {
                title: board.header.title.clone(),
                description: board.header.description.clone(),
                color: board.header.color,
                fields,
            })
        }
    }
}

/// Embed field of an entry row, in the encoding the row was read with.
pub fn row_field(entry: &RosterEntry) -> EmbedField {
    match &entry.style {
        RowStyle::Suffix => EmbedField::new(row_label(entry), PLACEHOLDER, entry.inline),
        RowStyle::StatusValue(rest) => EmbedField::new(
            entry.name.clone(),
            format!("{}{}", entry.status.marker(), rest),
            entry.inline,
        ),
    }
}

fn categorized_fields(entries: &[RosterEntry], tiers: &CategoryTiers) -> Vec<EmbedField> {
    let mut fields = Vec::with_capacity(entries.len() + tiers.tiers().len() + 1);

    let tier_labels = tiers.tiers().iter().map(|t| (t.as_str(), Some(t.as_str())));
    let groups = tier_labels.chain(std::iter::once((tiers.catch_all(), None)));

    for (label, key) in groups {
        let members: Vec<&RosterEntry> = entries
            .iter()
            .filter(|e| effective_category(e, tiers) == key)
            .collect();
        if members.is_empty() {
            continue;
        }
        fields.push(EmbedField::new(header_label(label), PLACEHOLDER, false));
        fields.extend(members.into_iter().map(row_field));
    }
    fields
}

/// Tier an entry renders under; unknown labels fall into the catch-all.
fn effective_category<'a>(entry: &'a RosterEntry, tiers: &CategoryTiers) -> Option<&'a str> {
    entry
        .category
        .as_deref()
        .filter(|c| tiers.tiers().iter().any(|t| t.as_str() == *c))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::model::{BoardHeader, Status};

    fn board(mode: BoardMode, entries: Vec<RosterEntry>) -> RosterBoard {
        let mut board = RosterBoard::new(
            BoardHeader {
                title: Some("Dienstübersicht".to_string()),
                description: None,
                color: Some(0x3498db),
            },
            mode,
        );
        board.entries = entries;
        board
    }

    fn names(rendered: &RenderedBoard) -> Vec<String> {
        rendered
            .embed
            .as_ref()
            .unwrap()
            .fields
            .iter()
            .map(|f| f.name.clone())
            .collect()
    }

    #[test]
    fn headers_follow_tier_order_and_skip_empty_tiers() {
        let tiers = CategoryTiers::default();
        let b = board(
            BoardMode::Categorized,
            vec![
                RosterEntry::new("Zoe", None),
                RosterEntry::new("Pia", Some("Praktikant".to_string())),
                RosterEntry::new("Carl", Some("Chefarzt".to_string())),
                RosterEntry::new("Anna", Some("Arzt".to_string())),
                RosterEntry::new("Ben", Some("Arzt".to_string())).with_status(Status::Present),
            ],
        );

        let rendered = render(&b, &tiers);
        assert_eq!(
            names(&rendered),
            vec![
                "__**Chefarzt**__",
                "Carl ❌",
                "__**Arzt**__",
                "Anna ❌",
                "Ben ✅",
                "__**Praktikant**__",
                "Pia ❌",
                "__**Andere**__",
                "Zoe ❌",
            ]
        );
        let embed = rendered.embed.unwrap();
        assert!(embed.fields.iter().all(|f| f.value == PLACEHOLDER));
        assert!(!embed.fields[0].inline);
        assert!(embed.fields[1].inline);
        assert_eq!(embed.title.as_deref(), Some("Dienstübersicht"));
    }

    #[test]
    fn unknown_category_renders_under_catch_all() {
        let tiers = CategoryTiers::default();
        let b = board(
            BoardMode::Categorized,
            vec![RosterEntry::new("Gus", Some("Gast".to_string()))],
        );
        assert_eq!(names(&render(&b, &tiers)), vec!["__**Andere**__", "Gus ❌"]);
    }

    #[test]
    fn flat_mode_has_no_headers() {
        let tiers = CategoryTiers::default();
        let b = board(
            BoardMode::Flat,
            vec![
                RosterEntry::new("Carl", Some("Chefarzt".to_string())),
                RosterEntry::new("Zoe", None),
            ],
        );
        assert_eq!(names(&render(&b, &tiers)), vec!["Carl ❌", "Zoe ❌"]);
    }

    #[test]
    fn text_surface_renders_lines() {
        let mut b = board(
            BoardMode::Flat,
            vec![
                RosterEntry::new("Felix", None).with_status(Status::Present),
                RosterEntry::new("Tom", None),
            ],
        );
        b.surface = Surface::Text;
        let rendered = render(&b, &CategoryTiers::default());
        assert!(rendered.embed.is_none());
        assert_eq!(rendered.content, "Felix ✅\nTom ❌");
    }

    #[test]
    fn legacy_rows_keep_status_in_value() {
        let mut entry = RosterEntry::new("Bob", None).with_status(Status::Present);
        entry.style = RowStyle::legacy();
        entry.inline = false;
        assert_eq!(row_field(&entry), EmbedField::new("Bob", "✅ Status", false));
    }
}
