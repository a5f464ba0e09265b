//! In-process board store
//!
//! Behaves like the REST backend: it owns the authoritative order, rejects
//! references to missing entities, and (when attached to a channel) announces
//! every mutation. Every call is recorded and any operation can be made to fail
//! once, which is what the reconciler tests lean on.

use super::{BoardStore, StoreOp};
use crate::error::{Result, SyncError};
use crate::realtime::{BoardEvent, RealtimeChannel};
use crate::types::{Board, BoardId, Card, CardId, CardPatch, List, ListId, NewCard};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// HTTP-equivalent status used when a reorder names a foreign or duplicate id
const CONFLICT: u16 = 409;

/// Most recent calls kept for inspection; older ones are dropped
pub const CALL_LOG_LIMIT: usize = 1024;

/// A call received by the memory store, with its arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    ListLists(BoardId),
    ListCards(ListId),
    UpdateCard(CardId, CardPatch),
    ReorderCards(ListId, Vec<CardId>),
    ReorderLists(BoardId, Vec<ListId>),
    CreateList(BoardId, String),
    CreateCard(ListId, String),
    ListArchivedCards(BoardId),
    DeleteCard(CardId),
}

impl StoreCall {
    pub fn op(&self) -> StoreOp {
        match self {
            Self::ListLists(_) => StoreOp::ListLists,
            Self::ListCards(_) => StoreOp::ListCards,
            Self::UpdateCard(..) => StoreOp::UpdateCard,
            Self::ReorderCards(..) => StoreOp::ReorderCards,
            Self::ReorderLists(..) => StoreOp::ReorderLists,
            Self::CreateList(..) => StoreOp::CreateList,
            Self::CreateCard(..) => StoreOp::CreateCard,
            Self::ListArchivedCards(_) => StoreOp::ListArchivedCards,
            Self::DeleteCard(_) => StoreOp::DeleteCard,
        }
    }

    /// True for calls that change stored state
    pub fn is_mutation(&self) -> bool {
        !matches!(
            self,
            Self::ListLists(_) | Self::ListCards(_) | Self::ListArchivedCards(_)
        )
    }
}

#[derive(Default)]
struct Inner {
    boards: HashMap<BoardId, Board>,
    lists: HashMap<ListId, List>,
    cards: BTreeMap<CardId, Card>,
    list_order: HashMap<BoardId, Vec<ListId>>,
    /// Non-archived cards only
    card_order: HashMap<ListId, Vec<CardId>>,
    calls: VecDeque<StoreCall>,
    fail_next: HashSet<StoreOp>,
}

impl Inner {
    /// Record the call, then consume an injected failure for it if one is pending
    fn enter(&mut self, call: StoreCall) -> Result<()> {
        let op = call.op();
        if self.calls.len() == CALL_LOG_LIMIT {
            self.calls.pop_front();
        }
        self.calls.push_back(call);
        if self.fail_next.remove(&op) {
            debug!(operation = %op, "injected store failure");
            return Err(SyncError::Injected {
                operation: op.name().to_string(),
            });
        }
        Ok(())
    }

    fn list(&self, id: &ListId) -> Result<&List> {
        self.lists
            .get(id)
            .ok_or_else(|| SyncError::ListNotFound { id: id.to_string() })
    }

    fn board_of_card(&self, card: &Card) -> Option<BoardId> {
        self.lists.get(&card.list_id).map(|l| l.board_id.clone())
    }
}

/// Authoritative store kept in memory
#[derive(Default)]
pub struct MemoryBoardStore {
    inner: Mutex<Inner>,
    channel: Option<Arc<dyn RealtimeChannel>>,
}

impl MemoryBoardStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Announce every mutation on the given channel
    pub fn with_channel(mut self, channel: Arc<dyn RealtimeChannel>) -> Self {
        self.channel = Some(channel);
        self
    }

    // =========================================================================
    // Seeding (not recorded, not announced)
    // =========================================================================

    pub async fn insert_board(&self, board: Board) {
        let mut inner = self.inner.lock().await;
        inner.list_order.entry(board.id.clone()).or_default();
        inner.boards.insert(board.id.clone(), board);
    }

    /// Insert a list at the end of its board. The board must have been inserted.
    pub async fn insert_list(&self, list: List) -> Result<()> {
        let mut inner = self.inner.lock().await;
        let order = inner
            .list_order
            .get_mut(&list.board_id)
            .ok_or_else(|| SyncError::BoardNotFound {
                id: list.board_id.to_string(),
            })?;
        order.push(list.id.clone());
        inner.card_order.entry(list.id.clone()).or_default();
        inner.lists.insert(list.id.clone(), list);
        Ok(())
    }

    /// Insert a card at the end of its list. The list must have been inserted.
    pub async fn insert_card(&self, card: Card) -> Result<()> {
        let mut inner = self.inner.lock().await;
        inner.list(&card.list_id)?;
        if !card.archived {
            inner
                .card_order
                .entry(card.list_id.clone())
                .or_default()
                .push(card.id.clone());
        }
        inner.cards.insert(card.id.clone(), card);
        Ok(())
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    /// Make the next call of `op` fail
    pub async fn fail_next(&self, op: StoreOp) {
        self.inner.lock().await.fail_next.insert(op);
    }

    /// The last [`CALL_LOG_LIMIT`] calls received, oldest first
    pub async fn calls(&self) -> Vec<StoreCall> {
        self.inner.lock().await.calls.iter().cloned().collect()
    }

    /// Calls that changed stored state, oldest first
    pub async fn mutations(&self) -> Vec<StoreCall> {
        self.inner
            .lock()
            .await
            .calls
            .iter()
            .filter(|c| c.is_mutation())
            .cloned()
            .collect()
    }

    pub async fn clear_calls(&self) {
        self.inner.lock().await.calls.clear();
    }

    /// Stored card order of a list
    pub async fn card_order(&self, list: &ListId) -> Vec<CardId> {
        self.inner
            .lock()
            .await
            .card_order
            .get(list)
            .cloned()
            .unwrap_or_default()
    }

    /// Stored list order of a board
    pub async fn list_order(&self, board: &BoardId) -> Vec<ListId> {
        self.inner
            .lock()
            .await
            .list_order
            .get(board)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn card(&self, id: &CardId) -> Option<Card> {
        self.inner.lock().await.cards.get(id).cloned()
    }

    fn announce(&self, event: BoardEvent) {
        if let Some(ref channel) = self.channel {
            channel.publish(event);
        }
    }
}

/// Replace `stored` with exactly `order`.
///
/// `order` must be a permutation of `stored`: no foreign ids, no repeats, none left out.
fn replace_order<T: Clone + Eq + std::hash::Hash>(stored: &mut Vec<T>, order: &[T]) -> bool {
    if order.len() != stored.len() {
        return false;
    }
    let known: HashSet<&T> = stored.iter().collect();
    let mut seen = HashSet::new();
    if !order.iter().all(|id| known.contains(id) && seen.insert(id)) {
        return false;
    }
    *stored = order.to_vec();
    true
}

#[async_trait]
impl BoardStore for MemoryBoardStore {
    async fn list_lists(&self, board: &BoardId) -> Result<Vec<List>> {
        let mut inner = self.inner.lock().await;
        inner.enter(StoreCall::ListLists(board.clone()))?;

        let order = inner
            .list_order
            .get(board)
            .ok_or_else(|| SyncError::BoardNotFound { id: board.to_string() })?;
        Ok(order
            .iter()
            .filter_map(|id| inner.lists.get(id).cloned())
            .collect())
    }

    async fn list_cards(&self, list: &ListId) -> Result<Vec<Card>> {
        let mut inner = self.inner.lock().await;
        inner.enter(StoreCall::ListCards(list.clone()))?;
        inner.list(list)?;

        Ok(inner
            .card_order
            .get(list)
            .map(|order| {
                order
                    .iter()
                    .filter_map(|id| inner.cards.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn update_card(&self, card: &CardId, patch: &CardPatch) -> Result<Card> {
        let mut inner = self.inner.lock().await;
        inner.enter(StoreCall::UpdateCard(card.clone(), patch.clone()))?;

        let current = inner
            .cards
            .get(card)
            .cloned()
            .ok_or_else(|| SyncError::CardNotFound { id: card.to_string() })?;
        if let Some(ref target) = patch.list_id {
            inner.list(target)?;
        }

        let mut updated = current.clone();
        updated.apply(patch);

        let was_on_board = !current.archived;
        let is_on_board = !updated.archived;
        if was_on_board && (!is_on_board || updated.list_id != current.list_id) {
            if let Some(order) = inner.card_order.get_mut(&current.list_id) {
                order.retain(|id| id != card);
            }
        }
        if is_on_board && (!was_on_board || updated.list_id != current.list_id) {
            inner
                .card_order
                .entry(updated.list_id.clone())
                .or_default()
                .push(card.clone());
        }

        inner.cards.insert(card.clone(), updated.clone());
        let board = inner.board_of_card(&updated);
        drop(inner);

        if let Some(board) = board {
            self.announce(BoardEvent::cards_changed(board));
        }
        Ok(updated)
    }

    async fn reorder_cards(&self, list: &ListId, order: &[CardId]) -> Result<()> {
        let mut inner = self.inner.lock().await;
        inner.enter(StoreCall::ReorderCards(list.clone(), order.to_vec()))?;
        let board = inner.list(list)?.board_id.clone();

        let stored = inner.card_order.entry(list.clone()).or_default();
        if !replace_order(stored, order) {
            return Err(SyncError::rejected(StoreOp::ReorderCards.name(), CONFLICT));
        }
        drop(inner);

        self.announce(BoardEvent::cards_changed(board));
        Ok(())
    }

    async fn reorder_lists(&self, board: &BoardId, order: &[ListId]) -> Result<()> {
        let mut inner = self.inner.lock().await;
        inner.enter(StoreCall::ReorderLists(board.clone(), order.to_vec()))?;

        let stored = inner
            .list_order
            .get_mut(board)
            .ok_or_else(|| SyncError::BoardNotFound { id: board.to_string() })?;
        if !replace_order(stored, order) {
            return Err(SyncError::rejected(StoreOp::ReorderLists.name(), CONFLICT));
        }
        drop(inner);

        self.announce(BoardEvent::lists_changed(board.clone()));
        Ok(())
    }

    async fn create_list(&self, board: &BoardId, title: &str) -> Result<List> {
        let mut inner = self.inner.lock().await;
        inner.enter(StoreCall::CreateList(board.clone(), title.to_string()))?;

        let list = List::new(board.clone(), title);
        inner
            .list_order
            .get_mut(board)
            .ok_or_else(|| SyncError::BoardNotFound { id: board.to_string() })?
            .push(list.id.clone());
        inner.card_order.insert(list.id.clone(), Vec::new());
        inner.lists.insert(list.id.clone(), list.clone());
        drop(inner);

        self.announce(BoardEvent::lists_changed(board.clone()));
        Ok(list)
    }

    async fn create_card(&self, list: &ListId, card: &NewCard) -> Result<Card> {
        let mut inner = self.inner.lock().await;
        inner.enter(StoreCall::CreateCard(list.clone(), card.title.clone()))?;
        let board = inner.list(list)?.board_id.clone();

        let created = Card::from_new(list.clone(), card);
        inner
            .card_order
            .entry(list.clone())
            .or_default()
            .push(created.id.clone());
        inner.cards.insert(created.id.clone(), created.clone());
        drop(inner);

        self.announce(BoardEvent::cards_changed(board));
        Ok(created)
    }

    async fn list_archived_cards(&self, board: &BoardId) -> Result<Vec<Card>> {
        let mut inner = self.inner.lock().await;
        inner.enter(StoreCall::ListArchivedCards(board.clone()))?;
        if !inner.boards.contains_key(board) {
            return Err(SyncError::BoardNotFound { id: board.to_string() });
        }

        Ok(inner
            .cards
            .values()
            .filter(|c| c.archived && inner.board_of_card(c).as_ref() == Some(board))
            .cloned()
            .collect())
    }

    async fn delete_card(&self, card: &CardId) -> Result<()> {
        let mut inner = self.inner.lock().await;
        inner.enter(StoreCall::DeleteCard(card.clone()))?;

        let removed = inner
            .cards
            .remove(card)
            .ok_or_else(|| SyncError::CardNotFound { id: card.to_string() })?;
        if let Some(order) = inner.card_order.get_mut(&removed.list_id) {
            order.retain(|id| id != card);
        }
        let board = inner.board_of_card(&removed);
        drop(inner);

        if let Some(board) = board {
            self.announce(BoardEvent::cards_changed(board));
        }
        Ok(())
    }
}
