//! Roster engine: attendance boards kept in sync with their command message
//! and with status reactions.
//!
//! Everything below `service` is pure and platform-neutral. The live board
//! message is the source of truth; state is re-derived by parsing it.

pub mod cache;
pub mod diff;
pub mod model;
pub mod names;
pub mod parser;
pub mod reconcile;
pub mod render;
pub mod resolver;
pub mod service;
pub mod toggle;

pub use cache::{RosterCache, TrackedBoard};
pub use diff::{diff, NameDiff};
pub use model::{
    BoardHeader, BoardMode, CategoryTiers, RosterBoard, RosterEntry, RowStyle, Status, Surface,
    ABSENT_MARKER, PLACEHOLDER, PRESENT_MARKER,
};
pub use parser::parse;
pub use render::{render, BoardEmbed, EmbedField, RenderedBoard};
pub use resolver::Identity;
pub use service::{
    CommandEvent, EditEvent, Effect, FetchedMessage, ReactionEvent, RosterService, Skip,
    Transport,
};
