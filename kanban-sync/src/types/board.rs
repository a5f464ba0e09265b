//! Board-level types: Board, List

use super::ids::{BoardId, ListId};
use serde::{Deserialize, Serialize};

/// A kanban board. Its lists are fetched separately and ordered by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub id: BoardId,
    pub name: String,
}

impl Board {
    /// Create a new board with a fresh id
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: BoardId::new(),
            name: name.into(),
        }
    }
}

/// A column of cards. Position is implied by where it sits in the board's sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct List {
    pub id: ListId,
    pub title: String,
    pub board_id: BoardId,
}

impl List {
    /// Create a new list on the given board
    pub fn new(board_id: BoardId, title: impl Into<String>) -> Self {
        Self {
            id: ListId::new(),
            title: title.into(),
            board_id,
        }
    }
}
