//! BoardStore - the authoritative backend the reconciler persists to
//!
//! Two implementations ship with the crate:
//! - [`HttpBoardStore`]: REST client for the real backend
//! - [`MemoryBoardStore`]: in-process store for tests and offline use

mod http;
mod memory;

pub use http::HttpBoardStore;
pub use memory::{MemoryBoardStore, StoreCall, CALL_LOG_LIMIT};

use crate::error::Result;
use crate::types::{BoardId, Card, CardId, CardPatch, List, ListId, NewCard};
use async_trait::async_trait;
use std::fmt;

/// Persistence contract relied on by the reconciler.
///
/// Every ordered result reflects the store's current authoritative order. Reorder
/// calls replace the stored order with exactly the given sequence.
#[async_trait]
pub trait BoardStore: Send + Sync {
    /// Lists of a board, in board order
    async fn list_lists(&self, board: &BoardId) -> Result<Vec<List>>;

    /// Cards of a list, in list order
    async fn list_cards(&self, list: &ListId) -> Result<Vec<Card>>;

    /// Partially update a card. Fails if the card, or a target list, does not exist.
    async fn update_card(&self, card: &CardId, patch: &CardPatch) -> Result<Card>;

    /// Replace the stored card order of a list
    async fn reorder_cards(&self, list: &ListId, order: &[CardId]) -> Result<()>;

    /// Replace the stored list order of a board
    async fn reorder_lists(&self, board: &BoardId, order: &[ListId]) -> Result<()>;

    /// Create a list at the end of the board
    async fn create_list(&self, board: &BoardId, title: &str) -> Result<List>;

    /// Create a card at the end of the list
    async fn create_card(&self, list: &ListId, card: &NewCard) -> Result<Card>;

    /// Archived cards of a board
    async fn list_archived_cards(&self, board: &BoardId) -> Result<Vec<Card>>;

    /// Permanently delete a card
    async fn delete_card(&self, card: &CardId) -> Result<()>;
}

/// Names each store operation, for logs, errors and failure injection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    ListLists,
    ListCards,
    UpdateCard,
    ReorderCards,
    ReorderLists,
    CreateList,
    CreateCard,
    ListArchivedCards,
    DeleteCard,
}

impl StoreOp {
    /// Human readable "verb noun" name
    pub fn name(&self) -> &'static str {
        match self {
            Self::ListLists => "list lists",
            Self::ListCards => "list cards",
            Self::UpdateCard => "update card",
            Self::ReorderCards => "reorder cards",
            Self::ReorderLists => "reorder lists",
            Self::CreateList => "create list",
            Self::CreateCard => "create card",
            Self::ListArchivedCards => "list archived cards",
            Self::DeleteCard => "delete card",
        }
    }
}

impl fmt::Display for StoreOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
