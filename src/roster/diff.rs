//! Name-list diffing.

use std::collections::HashSet;

/// Symmetric difference between the names on a board and a requested list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NameDiff {
    /// Requested but not on the board, in requested order.
    pub to_add: Vec<String>,
    /// On the board but not requested, in board order.
    pub to_remove: Vec<String>,
}

impl NameDiff {
    pub fn is_noop(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }

    /// Names after applying the diff: retained names in board order, then
    /// additions.
    pub fn apply(&self, existing: &[String]) -> Vec<String> {
        existing
            .iter()
            .filter(|n| !self.to_remove.contains(n))
            .chain(self.to_add.iter())
            .cloned()
            .collect()
    }

    /// One-line summary for logs.
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if !self.to_add.is_empty() {
            parts.push(format!("added: {}", self.to_add.join(", ")));
        }
        if !self.to_remove.is_empty() {
            parts.push(format!("removed: {}", self.to_remove.join(", ")));
        }
        parts.join(" | ")
    }
}

/// Compute which names to add and remove. Both sides are compared as sets,
/// so duplicates and order changes alone never produce a diff.
pub fn diff(existing: &[String], requested: &[String]) -> NameDiff {
    let existing_set: HashSet<&str> = existing.iter().map(String::as_str).collect();
    let requested_set: HashSet<&str> = requested.iter().map(String::as_str).collect();

    let mut seen = HashSet::new();
    let to_add = requested
        .iter()
        .filter(|n| !existing_set.contains(n.as_str()))
        .filter(|n| seen.insert(n.as_str()))
        .cloned()
        .collect();

    let mut seen = HashSet::new();
    let to_remove = existing
        .iter()
        .filter(|n| !requested_set.contains(n.as_str()))
        .filter(|n| seen.insert(n.as_str()))
        .cloned()
        .collect();

    NameDiff { to_add, to_remove }
}
