//! Applying an edited name list to an existing board.

use super::diff::{diff, NameDiff};
use super::model::{BoardMode, CategoryTiers, RosterBoard, RosterEntry, RowStyle};
use super::resolver::{resolve, Identity};

/// Result of reconciling a board with a requested list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciliation {
    /// Requested names equal the board's names as a set.
    NoOp,
    Updated { board: RosterBoard, diff: NameDiff },
}

/// Diff the board's entries against `requested`.
pub fn plan(board: &RosterBoard, requested: &[String]) -> NameDiff {
    diff(&board.names(), requested)
}

/// Remove and append entries. Removals take every row with a removed name;
/// additions start absent in their resolved category. Retained rows keep
/// their status, category and position. On legacy flat boards new rows use
/// the legacy row style.
pub fn apply(
    board: &mut RosterBoard,
    changes: &NameDiff,
    members: &[Identity],
    tiers: &CategoryTiers,
) {
    let legacy = board.mode == BoardMode::Flat
        && board
            .entries
            .iter()
            .any(|e| matches!(e.style, RowStyle::StatusValue(_)));

    board
        .entries
        .retain(|e| !changes.to_remove.contains(&e.name));

    for name in &changes.to_add {
        let resolution = resolve(name, members, tiers);
        let mut entry = RosterEntry::new(name.clone(), resolution.category);
        if legacy {
            entry.style = RowStyle::legacy();
            entry.inline = false;
        }
        board.entries.push(entry);
    }
}

/// Reconcile `board` against `requested` in one pass.
pub fn reconcile(
    mut board: RosterBoard,
    requested: &[String],
    members: &[Identity],
    tiers: &CategoryTiers,
) -> Reconciliation {
    let changes = plan(&board, requested);
    if changes.is_noop() {
        return Reconciliation::NoOp;
    }
    apply(&mut board, &changes, members, tiers);
    Reconciliation::Updated {
        board,
        diff: changes,
    }
}
