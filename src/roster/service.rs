//! Event entry points of the roster engine.
//!
//! Handlers take a platform-neutral event, consult the cache, read the live
//! board through a [`Transport`], and return an [`Effect`] describing the single
//! write-back (if any). [`RosterService::execute`] performs it. A planned
//! write-back holds the board's lock until it is executed or dropped, so an
//! edit and a reaction on the same board cannot interleave.

use async_trait::async_trait;
use tokio::sync::OwnedMutexGuard;

use crate::config::Settings;
use crate::error::Result;

use super::cache::{RosterCache, TrackedBoard};
use super::model::{BoardHeader, BoardMode, CategoryTiers, RosterBoard, RosterEntry, Status};
use super::names::{requested_names, split_names};
use super::parser::{looks_like_board, parse};
use super::reconcile::{apply, plan};
use super::render::{render, RenderedBoard};
use super::resolver::{resolve, Identity};
use super::toggle::toggle;

/// A message read back from the channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedMessage {
    pub id: u64,
    pub author_id: u64,
    /// Message this one replies to.
    pub reply_to: Option<u64>,
    pub board: RenderedBoard,
}

/// Chat platform operations the roster engine needs.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Identity of the bot itself.
    fn bot_user_id(&self) -> u64;

    async fn fetch_message(&self, channel_id: u64, message_id: u64) -> Result<FetchedMessage>;

    /// Send a board as a reply to `reply_to`. Returns the new message id.
    async fn send_board(
        &self,
        channel_id: u64,
        reply_to: u64,
        board: &RenderedBoard,
    ) -> Result<u64>;

    async fn edit_board(&self, channel_id: u64, message_id: u64, board: &RenderedBoard)
        -> Result<()>;

    /// React with both status markers so users can click them.
    async fn add_status_markers(&self, channel_id: u64, message_id: u64) -> Result<()>;

    async fn send_text(&self, channel_id: u64, text: &str) -> Result<()>;

    async fn resolve_members(&self, guild_id: u64) -> Result<Vec<Identity>>;

    async fn display_name(&self, guild_id: Option<u64>, user_id: u64) -> Result<Option<String>>;
}

/// A roster command invocation, e.g. `!liste A, B`.
#[derive(Debug, Clone)]
pub struct CommandEvent {
    pub channel_id: u64,
    pub guild_id: Option<u64>,
    pub message_id: u64,
    pub author_id: u64,
    /// Text after the command.
    pub args: String,
}

/// A message was edited.
#[derive(Debug, Clone)]
pub struct EditEvent {
    pub channel_id: u64,
    pub guild_id: Option<u64>,
    pub message_id: u64,
    pub author_id: Option<u64>,
    /// New content, `None` when only embeds changed.
    pub content: Option<String>,
}

/// A reaction was added.
#[derive(Debug, Clone)]
pub struct ReactionEvent {
    pub channel_id: u64,
    pub guild_id: Option<u64>,
    pub message_id: u64,
    pub user_id: u64,
    /// Reactor's display name when the event carries it.
    pub display_name: Option<String>,
    /// Author of the reacted message when the event carries it.
    pub message_author_id: Option<u64>,
    pub emoji: String,
}

/// Why an event produced no write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Skip {
    UnknownBoard,
    OwnEvent,
    NoContent,
    EmptyRequest,
    NotStatusMarker,
    UnknownMember,
    NoChange,
}

/// Held board lock, released when the write-back completes or is dropped.
pub struct BoardLease {
    _guard: OwnedMutexGuard<()>,
}

impl BoardLease {
    fn new(guard: OwnedMutexGuard<()>) -> Self {
        Self { _guard: guard }
    }
}

impl std::fmt::Debug for BoardLease {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("BoardLease")
    }
}

/// A planned board update.
#[derive(Debug)]
pub struct WriteBack {
    pub channel_id: u64,
    pub board_message_id: u64,
    pub rendered: RenderedBoard,
    /// Names to remember in the cache after the write.
    pub names: Vec<String>,
    /// Human-readable change description for logs.
    pub summary: String,
    lease: BoardLease,
}

/// Side effect of handling one event.
#[derive(Debug)]
pub enum Effect {
    Skip(Skip),
    WriteBack(WriteBack),
}

impl Effect {
    pub fn is_write(&self) -> bool {
        matches!(self, Effect::WriteBack(_))
    }

    pub fn skip_reason(&self) -> Option<Skip> {
        match self {
            Effect::Skip(reason) => Some(*reason),
            Effect::WriteBack(_) => None,
        }
    }
}

/// Build a fresh categorized board with every name absent.
pub fn new_board(
    names: &[String],
    members: &[Identity],
    tiers: &CategoryTiers,
    header: BoardHeader,
) -> RosterBoard {
    let mut board = RosterBoard::new(header, BoardMode::Categorized);
    board.entries = names
        .iter()
        .map(|name| RosterEntry::new(name.clone(), resolve(name, members, tiers).category))
        .collect();
    board
}

/// Roster engine state owned by one chat worker.
pub struct RosterService {
    cache: RosterCache,
    tiers: CategoryTiers,
    command: String,
    header: BoardHeader,
}

impl RosterService {
    pub fn new(tiers: CategoryTiers, command: impl Into<String>, header: BoardHeader) -> Self {
        Self {
            cache: RosterCache::new(),
            tiers,
            command: command.into(),
            header,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        let roster = &settings.roster;
        Self::new(
            roster.category_tiers(),
            settings.discord.roster_command(),
            BoardHeader {
                title: Some(roster.title.clone()),
                description: Some(roster.description.clone()),
                color: Some(roster.color),
            },
        )
    }

    pub fn cache(&self) -> &RosterCache {
        &self.cache
    }

    pub fn tiers(&self) -> &CategoryTiers {
        &self.tiers
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    /// Create and track a new board. Returns the board message id, or `None`
    /// when the command carried no usable names.
    pub async fn create_board(
        &self,
        transport: &dyn Transport,
        event: CommandEvent,
    ) -> Result<Option<u64>> {
        let names = split_names(&event.args);
        if names.is_empty() {
            transport
                .send_text(
                    event.channel_id,
                    &format!(
                        "Bitte gib mindestens einen Namen an! Beispiel: `{} Felix Westfield, Mirella Sterling, John Paul Jones`",
                        self.command
                    ),
                )
                .await?;
            return Ok(None);
        }

        let members = self.members(transport, event.guild_id).await;
        let board = new_board(&names, &members, &self.tiers, self.header.clone());
        let rendered = render(&board, &self.tiers);

        let board_id = transport
            .send_board(event.channel_id, event.message_id, &rendered)
            .await?;
        if let Err(e) = transport.add_status_markers(event.channel_id, board_id).await {
            tracing::warn!("Failed to add status reactions to board {}: {}", board_id, e);
        }

        self.cache
            .insert(TrackedBoard {
                board_message_id: board_id,
                channel_id: event.channel_id,
                guild_id: event.guild_id,
                origin_message_id: Some(event.message_id),
                owner_id: Some(event.author_id),
                names: names.clone(),
            })
            .await;

        tracing::info!(
            "New roster board {} created by {} with {} names",
            board_id,
            event.author_id,
            names.len()
        );
        Ok(Some(board_id))
    }

    /// Plan the reconciliation of an edited command message.
    pub async fn handle_edit(&self, transport: &dyn Transport, event: EditEvent) -> Result<Effect> {
        let Some(tracked) = self.cache.find_by_origin(event.message_id).await else {
            return Ok(Effect::Skip(Skip::UnknownBoard));
        };
        if event.author_id == Some(transport.bot_user_id()) {
            return Ok(Effect::Skip(Skip::OwnEvent));
        }
        let Some(content) = event.content.as_deref() else {
            return Ok(Effect::Skip(Skip::NoContent));
        };

        let requested = requested_names(content, &self.command);
        if requested.is_empty() {
            tracing::debug!("Edit of {} has no names, leaving board as is", event.message_id);
            return Ok(Effect::Skip(Skip::EmptyRequest));
        }

        let lease = BoardLease::new(self.cache.lock_board(tracked.board_message_id).await);
        let fetched = transport
            .fetch_message(tracked.channel_id, tracked.board_message_id)
            .await?;
        let mut board = parse(&fetched.board, &self.tiers);
        let existing = board.names();

        let changes = plan(&board, &requested);
        if changes.is_noop() {
            self.cache
                .update_names(tracked.board_message_id, existing)
                .await;
            return Ok(Effect::Skip(Skip::NoChange));
        }

        let members = if changes.to_add.is_empty() {
            Vec::new()
        } else {
            self.members(transport, tracked.guild_id.or(event.guild_id))
                .await
        };
        apply(&mut board, &changes, &members, &self.tiers);

        Ok(Effect::WriteBack(WriteBack {
            channel_id: tracked.channel_id,
            board_message_id: tracked.board_message_id,
            rendered: render(&board, &self.tiers),
            names: changes.apply(&existing),
            summary: changes.summary(),
            lease,
        }))
    }

    /// Plan the status change triggered by a reaction.
    pub async fn handle_reaction(
        &self,
        transport: &dyn Transport,
        event: ReactionEvent,
    ) -> Result<Effect> {
        if event.user_id == transport.bot_user_id() {
            return Ok(Effect::Skip(Skip::OwnEvent));
        }
        let Some(status) = Status::from_marker(&event.emoji) else {
            return Ok(Effect::Skip(Skip::NotStatusMarker));
        };
        if !self.cache.contains(event.message_id).await && !self.adopt(transport, &event).await? {
            return Ok(Effect::Skip(Skip::UnknownBoard));
        }

        let display_name = match event.display_name.clone() {
            Some(name) => Some(name),
            None => transport.display_name(event.guild_id, event.user_id).await?,
        };
        let Some(display_name) = display_name else {
            return Ok(Effect::Skip(Skip::UnknownMember));
        };

        let lease = BoardLease::new(self.cache.lock_board(event.message_id).await);
        let fetched = transport
            .fetch_message(event.channel_id, event.message_id)
            .await?;
        let board = parse(&fetched.board, &self.tiers);
        let names = board.names();

        match toggle(board, &display_name, status) {
            None => {
                self.cache.update_names(event.message_id, names).await;
                Ok(Effect::Skip(Skip::NoChange))
            }
            Some(board) => Ok(Effect::WriteBack(WriteBack {
                channel_id: event.channel_id,
                board_message_id: event.message_id,
                rendered: render(&board, &self.tiers),
                names,
                summary: format!("{} -> {}", display_name, status),
                lease,
            })),
        }
    }

    /// Perform a planned effect. Returns whether a write happened.
    pub async fn execute(&self, transport: &dyn Transport, effect: Effect) -> Result<bool> {
        let write = match effect {
            Effect::Skip(reason) => {
                tracing::debug!("No board write: {:?}", reason);
                return Ok(false);
            }
            Effect::WriteBack(write) => write,
        };

        if let Err(e) = transport
            .edit_board(write.channel_id, write.board_message_id, &write.rendered)
            .await
        {
            tracing::error!("Failed to update board {}: {}", write.board_message_id, e);
            return Err(e);
        }
        self.cache
            .update_names(write.board_message_id, write.names)
            .await;
        tracing::info!("Board {} updated - {}", write.board_message_id, write.summary);
        drop(write.lease);
        Ok(true)
    }

    /// Handle an edit event end to end.
    pub async fn process_edit(&self, transport: &dyn Transport, event: EditEvent) -> Result<bool> {
        let effect = self.handle_edit(transport, event).await?;
        self.execute(transport, effect).await
    }

    /// Handle a reaction event end to end.
    pub async fn process_reaction(
        &self,
        transport: &dyn Transport,
        event: ReactionEvent,
    ) -> Result<bool> {
        let effect = self.handle_reaction(transport, event).await?;
        self.execute(transport, effect).await
    }

    /// Track an untracked bot message that displays a board.
    async fn adopt(&self, transport: &dyn Transport, event: &ReactionEvent) -> Result<bool> {
        if event
            .message_author_id
            .is_some_and(|author| author != transport.bot_user_id())
        {
            return Ok(false);
        }
        let fetched = transport
            .fetch_message(event.channel_id, event.message_id)
            .await?;
        let title = self.header.title.as_deref().unwrap_or_default();
        if fetched.author_id != transport.bot_user_id() || !looks_like_board(&fetched.board, title)
        {
            return Ok(false);
        }

        let names = parse(&fetched.board, &self.tiers).names();
        tracing::info!(
            "Rebuilt cache entry for board {} ({} names)",
            fetched.id,
            names.len()
        );
        self.cache
            .insert(TrackedBoard {
                board_message_id: fetched.id,
                channel_id: event.channel_id,
                guild_id: event.guild_id,
                origin_message_id: fetched.reply_to,
                owner_id: None,
                names,
            })
            .await;
        Ok(true)
    }

    async fn members(&self, transport: &dyn Transport, guild_id: Option<u64>) -> Vec<Identity> {
        let Some(guild_id) = guild_id else {
            return Vec::new();
        };
        match transport.resolve_members(guild_id).await {
            Ok(members) => members,
            Err(e) => {
                tracing::warn!("Member lookup for guild {} failed: {}", guild_id, e);
                Vec::new()
            }
        }
    }
}
