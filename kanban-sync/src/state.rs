//! BoardState - the in-memory view of the active board
//!
//! Owned by the view layer and handed to the reconciler as a shared handle. It holds
//! no I/O: the reconciler computes, applies and persists; the state only stores.

use crate::order;
use crate::types::{BoardId, Card, CardId, DragContext, List, ListId};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Handle shared between the reconciler, the realtime listener and the view layer
pub type SharedBoardState = Arc<RwLock<BoardState>>;

/// Local, possibly optimistic, copy of one board's lists and cards
#[derive(Debug, Default)]
pub struct BoardState {
    active_board: Option<BoardId>,
    lists: Vec<List>,
    cards: HashMap<ListId, Vec<Card>>,
    drag: Option<DragContext>,
}

/// Result of applying a card drop locally
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardMove {
    pub card_id: CardId,
    pub source_list: ListId,
    pub target_list: ListId,
    pub source_order: Vec<CardId>,
    pub target_order: Vec<CardId>,
}

impl CardMove {
    /// True when the card changed lists
    pub fn is_cross_list(&self) -> bool {
        self.source_list != self.target_list
    }
}

impl BoardState {
    /// Create an empty state with no active board
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap into a shared handle
    pub fn shared(self) -> SharedBoardState {
        Arc::new(RwLock::new(self))
    }

    // =========================================================================
    // Active board
    // =========================================================================

    pub fn active_board(&self) -> Option<&BoardId> {
        self.active_board.as_ref()
    }

    pub fn is_active(&self, board: &BoardId) -> bool {
        self.active_board.as_ref() == Some(board)
    }

    /// Switch to another board. Everything held for the previous board is dropped.
    pub fn set_active(&mut self, board: BoardId) {
        self.clear();
        self.active_board = Some(board);
    }

    /// Forget the active board and all of its data
    pub fn clear(&mut self) {
        self.active_board = None;
        self.lists.clear();
        self.cards.clear();
        self.drag = None;
    }

    /// Replace lists and cards wholesale with authoritative data.
    ///
    /// Archived cards are dropped; they only appear in the archive view.
    pub fn replace(&mut self, lists: Vec<List>, cards: Vec<(ListId, Vec<Card>)>) {
        let mut by_list: HashMap<ListId, Vec<Card>> =
            lists.iter().map(|l| (l.id.clone(), Vec::new())).collect();
        for (list_id, list_cards) in cards {
            if let Some(slot) = by_list.get_mut(&list_id) {
                *slot = list_cards.into_iter().filter(|c| !c.archived).collect();
            }
        }
        self.lists = lists;
        self.cards = by_list;
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn lists(&self) -> &[List] {
        &self.lists
    }

    pub fn has_list(&self, list: &ListId) -> bool {
        self.lists.iter().any(|l| &l.id == list)
    }

    /// Cards of a list in display order. Unknown lists are empty.
    pub fn cards(&self, list: &ListId) -> &[Card] {
        self.cards.get(list).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Ordered list ids of the active board
    pub fn list_order(&self) -> Vec<ListId> {
        self.lists.iter().map(|l| l.id.clone()).collect()
    }

    /// Ordered card ids of a list, or `None` if the list is not on the board
    pub fn card_order(&self, list: &ListId) -> Option<Vec<CardId>> {
        if !self.has_list(list) {
            return None;
        }
        Some(self.cards(list).iter().map(|c| c.id.clone()).collect())
    }

    pub fn find_card(&self, card: &CardId) -> Option<&Card> {
        self.cards.values().flatten().find(|c| &c.id == card)
    }

    // =========================================================================
    // Drag context
    // =========================================================================

    pub fn drag(&self) -> Option<&DragContext> {
        self.drag.as_ref()
    }

    /// Start a drag. Any drag in progress, of either kind, is replaced.
    pub fn set_drag(&mut self, drag: DragContext) {
        self.drag = Some(drag);
    }

    /// Remove and return the drag context, leaving none behind
    pub fn take_drag(&mut self) -> Option<DragContext> {
        self.drag.take()
    }

    // =========================================================================
    // Local mutations
    // =========================================================================

    /// Apply a card drop. Returns `None` (and changes nothing) for a no-op drop.
    pub fn apply_card_move(
        &mut self,
        card: &CardId,
        source: &ListId,
        target: &ListId,
        before: Option<&CardId>,
    ) -> Option<CardMove> {
        let source_ids = self.card_order(source)?;

        if source == target {
            let next = order::move_within(&source_ids, card, before)?;
            if let Some(cards) = self.cards.get_mut(source) {
                sort_by_order(cards, &next);
            }
            return Some(CardMove {
                card_id: card.clone(),
                source_list: source.clone(),
                target_list: target.clone(),
                source_order: next.clone(),
                target_order: next,
            });
        }

        let target_ids = self.card_order(target)?;
        let (next_source, next_target) = order::transfer(&source_ids, &target_ids, card, before)?;

        let source_cards = self.cards.get_mut(source)?;
        let index = source_cards.iter().position(|c| &c.id == card)?;
        let mut moved = source_cards.remove(index);
        moved.list_id = target.clone();

        let target_cards = self.cards.entry(target.clone()).or_default();
        target_cards.push(moved);
        sort_by_order(target_cards, &next_target);

        Some(CardMove {
            card_id: card.clone(),
            source_list: source.clone(),
            target_list: target.clone(),
            source_order: next_source,
            target_order: next_target,
        })
    }

    /// Move a list into the slot of another. Returns the new board order.
    pub fn apply_list_move(&mut self, list: &ListId, target: &ListId) -> Option<Vec<ListId>> {
        let next = order::move_to_slot(&self.list_order(), list, target)?;
        self.lists
            .sort_by_key(|l| next.iter().position(|id| id == &l.id).unwrap_or(usize::MAX));
        Some(next)
    }

    /// Append a freshly created list
    pub fn push_list(&mut self, list: List) {
        self.cards.entry(list.id.clone()).or_default();
        self.lists.push(list);
    }

    /// Append a freshly created card to the end of its list
    pub fn push_card(&mut self, card: Card) -> bool {
        if card.archived || !self.has_list(&card.list_id) {
            return false;
        }
        self.cards.entry(card.list_id.clone()).or_default().push(card);
        true
    }

    /// Take a card off the board (archive)
    pub fn remove_card(&mut self, card: &CardId) -> Option<Card> {
        for cards in self.cards.values_mut() {
            if let Some(index) = cards.iter().position(|c| &c.id == card) {
                return Some(cards.remove(index));
            }
        }
        None
    }
}

fn sort_by_order(cards: &mut [Card], order: &[CardId]) {
    cards.sort_by_key(|c| order.iter().position(|id| id == &c.id).unwrap_or(usize::MAX));
}
