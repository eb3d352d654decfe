//! Roster data model.

use serde::{Deserialize, Serialize};

/// Marker rendered after a name that is present.
pub const PRESENT_MARKER: &str = "✅";

/// Marker rendered after a name that is absent.
pub const ABSENT_MARKER: &str = "❌";

/// Zero-width space used as the value of header and row fields.
pub const PLACEHOLDER: &str = "\u{200b}";

/// Binary attendance status of one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Status {
    Present,
    #[default]
    Absent,
}

impl Status {
    pub const ALL: [Status; 2] = [Status::Present, Status::Absent];

    pub fn marker(self) -> &'static str {
        match self {
            Status::Present => PRESENT_MARKER,
            Status::Absent => ABSENT_MARKER,
        }
    }

    /// Map a reaction or suffix symbol back to a status.
    pub fn from_marker(symbol: &str) -> Option<Status> {
        match symbol {
            PRESENT_MARKER => Some(Status::Present),
            ABSENT_MARKER => Some(Status::Absent),
            _ => None,
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.marker())
    }
}

/// Where an embed row keeps its status.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RowStyle {
    /// `Name ✅` field name with a placeholder value.
    #[default]
    Suffix,
    /// Bare name with the marker leading the value, e.g. `❌ Status`.
    /// Holds the value text after the marker.
    StatusValue(String),
}

impl RowStyle {
    /// Style of rows written onto legacy flat boards.
    pub fn legacy() -> Self {
        RowStyle::StatusValue(" Status".to_string())
    }
}

/// One named row on a board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub name: String,
    pub status: Status,
    /// Tier label; `None` means the catch-all bucket.
    pub category: Option<String>,
    /// Whether the row renders inline next to its neighbours.
    pub inline: bool,
    #[serde(default)]
    pub style: RowStyle,
}

impl RosterEntry {
    pub fn new(name: impl Into<String>, category: Option<String>) -> Self {
        Self {
            name: name.into(),
            status: Status::Absent,
            category,
            inline: true,
            style: RowStyle::Suffix,
        }
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }
}

/// How entries are laid out on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoardMode {
    /// Entries grouped under tier headers.
    Categorized,
    /// One row per entry, no headers.
    Flat,
}

/// Physical message shape a board is rendered to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Surface {
    /// Rich embed with one field per header or row.
    Embed,
    /// Plain message content, one `Name ✅` line per row.
    Text,
}

/// Embed decoration carried through parse and re-render.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BoardHeader {
    pub title: Option<String>,
    pub description: Option<String>,
    pub color: Option<u32>,
}

/// Structured state of one roster board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterBoard {
    pub header: BoardHeader,
    pub entries: Vec<RosterEntry>,
    pub mode: BoardMode,
    pub surface: Surface,
}

impl RosterBoard {
    pub fn new(header: BoardHeader, mode: BoardMode) -> Self {
        Self {
            header,
            entries: Vec::new(),
            mode,
            surface: Surface::Embed,
        }
    }

    /// Entry names in board order.
    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.name.clone()).collect()
    }

    /// Set `status` on every entry named `name`. Returns how many rows changed.
    pub fn set_status(&mut self, name: &str, status: Status) -> usize {
        let mut changed = 0;
        for entry in self.entries.iter_mut().filter(|e| e.name == name) {
            if entry.status != status {
                entry.status = status;
                changed += 1;
            }
        }
        changed
    }
}

/// Fixed display priority of categories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTiers {
    tiers: Vec<String>,
    catch_all: String,
}

impl CategoryTiers {
    pub fn new(tiers: Vec<String>, catch_all: impl Into<String>) -> Self {
        Self {
            tiers,
            catch_all: catch_all.into(),
        }
    }

    /// Tier labels, highest priority first.
    pub fn tiers(&self) -> &[String] {
        &self.tiers
    }

    pub fn catch_all(&self) -> &str {
        &self.catch_all
    }

    /// Normalise a header label: known tiers keep their label, anything else
    /// (including the catch-all itself) becomes `None`.
    pub fn classify(&self, label: &str) -> Option<String> {
        self.tiers.iter().find(|t| t.as_str() == label).cloned()
    }
}

impl Default for CategoryTiers {
    fn default() -> Self {
        Self::new(
            ["Chefarzt", "Praxisleitung", "Arzt", "Ausbildung", "Praktikant"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            "Andere",
        )
    }
}
