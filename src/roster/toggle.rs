//! Reaction-driven status toggles.

use super::model::{CategoryTiers, RosterBoard, Status};
use super::parser::parse;
use super::render::RenderedBoard;

/// Set the reactor's rows to `status`. Only rows whose name equals
/// `display_name` exactly are touched; every matching row is updated.
///
/// Returns the updated board, or `None` when nothing changed.
pub fn toggle(mut board: RosterBoard, display_name: &str, status: Status) -> Option<RosterBoard> {
    match board.set_status(display_name, status) {
        0 => None,
        changed => {
            tracing::info!(
                "Status for {} changed to {} ({} row(s))",
                display_name,
                status,
                changed
            );
            Some(board)
        }
    }
}

/// Parse a live board and toggle the reactor's rows.
pub fn toggle_rendered(
    rendered: &RenderedBoard,
    display_name: &str,
    status: Status,
    tiers: &CategoryTiers,
) -> Option<RosterBoard> {
    toggle(parse(rendered, tiers), display_name, status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::model::PLACEHOLDER;
    use crate::roster::render::{render, BoardEmbed, EmbedField};

    fn rendered() -> RenderedBoard {
        RenderedBoard::embed(BoardEmbed {
            title: Some("Dienstübersicht".to_string()),
            description: None,
            color: None,
            fields: vec![
                EmbedField::new("__**Arzt**__", PLACEHOLDER, false),
                EmbedField::new("Anna ❌", PLACEHOLDER, true),
                EmbedField::new("Ben ✅", PLACEHOLDER, true),
                EmbedField::new("__**Andere**__", PLACEHOLDER, false),
                EmbedField::new("Anna ❌", PLACEHOLDER, true),
            ],
        })
    }

    #[test]
    fn updates_only_reactor_rows() {
        let tiers = CategoryTiers::default();
        let before = rendered();
        let board = toggle_rendered(&before, "Anna", Status::Present, &tiers).unwrap();
        let after = render(&board, &tiers);

        let before_fields = &before.embed.as_ref().unwrap().fields;
        let after_fields = &after.embed.as_ref().unwrap().fields;
        assert_eq!(before_fields.len(), after_fields.len());
        for (b, a) in before_fields.iter().zip(after_fields) {
            if b.name.starts_with("Anna") {
                assert_eq!(a.name, "Anna ✅");
            } else {
                assert_eq!(a, b);
            }
        }
    }

    #[test]
    fn legacy_rows_of_other_users_stay_verbatim() {
        let tiers = CategoryTiers::default();
        let before = RenderedBoard::embed(BoardEmbed {
            title: Some("Dienstübersicht".to_string()),
            description: None,
            color: None,
            fields: vec![
                EmbedField::new("Alice", "❌ Status", false),
                EmbedField::new("Bob", "❌ Status", false),
                EmbedField::new("Carol ✅", PLACEHOLDER, true),
            ],
        });

        let board = toggle_rendered(&before, "Alice", Status::Present, &tiers).unwrap();
        let after = render(&board, &tiers);
        let fields = &after.embed.as_ref().unwrap().fields;

        assert_eq!(fields[0], EmbedField::new("Alice", "✅ Status", false));
        assert_eq!(fields[1], before.embed.as_ref().unwrap().fields[1]);
        assert_eq!(fields[2], before.embed.as_ref().unwrap().fields[2]);
    }

    #[test]
    fn no_matching_row_is_noop() {
        let tiers = CategoryTiers::default();
        assert!(toggle_rendered(&rendered(), "anna", Status::Present, &tiers).is_none());
        assert!(toggle_rendered(&rendered(), "Zed", Status::Absent, &tiers).is_none());
    }

    #[test]
    fn same_status_is_noop() {
        let tiers = CategoryTiers::default();
        assert!(toggle_rendered(&rendered(), "Ben", Status::Present, &tiers).is_none());
    }
}
