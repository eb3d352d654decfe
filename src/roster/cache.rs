//! Best-effort store of the boards a worker knows about.
//!
//! The rendered board is authoritative; this cache only maps message ids to
//! board metadata so edits can find their board. It is owned by one chat
//! worker and dropped with it.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

/// Metadata of one tracked board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedBoard {
    pub board_message_id: u64,
    pub channel_id: u64,
    pub guild_id: Option<u64>,
    /// Message that created the board, if known.
    pub origin_message_id: Option<u64>,
    pub owner_id: Option<u64>,
    /// Last known entry names.
    pub names: Vec<String>,
}

#[derive(Default)]
pub struct RosterCache {
    boards: RwLock<HashMap<u64, TrackedBoard>>,
    locks: Mutex<HashMap<u64, Arc<Mutex<()>>>>,
}

impl RosterCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, board: TrackedBoard) {
        let mut boards = self.boards.write().await;
        boards.insert(board.board_message_id, board);
    }

    pub async fn get(&self, board_message_id: u64) -> Option<TrackedBoard> {
        self.boards.read().await.get(&board_message_id).cloned()
    }

    pub async fn contains(&self, board_message_id: u64) -> bool {
        self.boards.read().await.contains_key(&board_message_id)
    }

    /// Board created by the command message `origin_message_id`.
    pub async fn find_by_origin(&self, origin_message_id: u64) -> Option<TrackedBoard> {
        self.boards
            .read()
            .await
            .values()
            .find(|b| b.origin_message_id == Some(origin_message_id))
            .cloned()
    }

    /// Replace the remembered names of a board. Returns false if untracked.
    pub async fn update_names(&self, board_message_id: u64, names: Vec<String>) -> bool {
        let mut boards = self.boards.write().await;
        match boards.get_mut(&board_message_id) {
            Some(board) => {
                board.names = names;
                true
            }
            None => false,
        }
    }

    pub async fn len(&self) -> usize {
        self.boards.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.boards.read().await.is_empty()
    }

    /// Serialize work on one board. Hold the guard across fetch, plan and
    /// write-back.
    pub async fn lock_board(&self, board_message_id: u64) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            // Unreferenced locks have no holder and no waiter.
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            locks
                .entry(board_message_id)
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }

    #[cfg(test)]
    async fn lock_count(&self) -> usize {
        self.locks.lock().await.len()
    }
}
