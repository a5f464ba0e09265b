//! Ephemeral drag-and-drop context

use super::ids::{CardId, ListId};
use serde::Serialize;

/// What is currently being dragged. Card and list drags are mutually exclusive;
/// "nothing dragged" is `Option::None` on the owning state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum DragContext {
    Card {
        card_id: CardId,
        source_list_id: ListId,
    },
    List {
        list_id: ListId,
    },
}

impl DragContext {
    /// The dragged card, if this is a card drag
    pub fn card_id(&self) -> Option<&CardId> {
        match self {
            Self::Card { card_id, .. } => Some(card_id),
            Self::List { .. } => None,
        }
    }

    /// The dragged list, if this is a list drag
    pub fn list_id(&self) -> Option<&ListId> {
        match self {
            Self::List { list_id } => Some(list_id),
            Self::Card { .. } => None,
        }
    }
}
