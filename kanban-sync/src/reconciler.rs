//! BoardReconciler - optimistic drag-and-drop over an authoritative store
//!
//! Every gesture follows the same shape:
//!
//! 1. Take the drag context out of the state (it never outlives the gesture).
//! 2. Compute and apply the next order locally, under the write lock, before any I/O.
//! 3. Persist with the store, with the lock released.
//! 4. On a fatal store failure, throw the local guess away and refetch the board.
//!
//! Nothing is retried and nothing is rolled back field by field: the fallback is
//! always a full refetch. Gestures never return errors to the caller.

use crate::error::{Result, SyncError};
use crate::realtime::BoardEvent;
use crate::state::{BoardState, SharedBoardState};
use crate::store::BoardStore;
use crate::types::{BoardId, Card, CardId, CardPatch, DragContext, List, ListId, NewCard};
use futures::future::try_join_all;
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

/// How a drop gesture settled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropOutcome {
    /// Nothing to do: no matching drag, a self-drop, or ids that are no longer on the board
    Ignored,
    /// The optimistic order was kept
    Committed,
    /// The store refused the move; local state was refetched
    Resynced,
}

/// Applies drag-and-drop gestures to a [`BoardState`] and persists them
pub struct BoardReconciler<S: ?Sized> {
    store: Arc<S>,
    state: SharedBoardState,
}

impl<S: ?Sized> Clone for BoardReconciler<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            state: Arc::clone(&self.state),
        }
    }
}

impl<S: BoardStore + ?Sized> BoardReconciler<S> {
    /// Create a reconciler with its own empty state
    pub fn new(store: Arc<S>) -> Self {
        Self::with_state(store, BoardState::new().shared())
    }

    /// Create a reconciler over a state owned by the caller
    pub fn with_state(store: Arc<S>, state: SharedBoardState) -> Self {
        Self { store, state }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// The shared state handle, for rendering
    pub fn state(&self) -> &SharedBoardState {
        &self.state
    }

    pub async fn active_board(&self) -> Option<BoardId> {
        self.state.read().await.active_board().cloned()
    }

    /// Current drag, for highlighting the dragged element
    pub async fn drag_context(&self) -> Option<DragContext> {
        self.state.read().await.drag().cloned()
    }

    /// Ordered list ids of the active board
    pub async fn list_order(&self) -> Vec<ListId> {
        self.state.read().await.list_order()
    }

    /// Ordered card ids of a list (empty if the list is unknown)
    pub async fn card_order(&self, list: &ListId) -> Vec<CardId> {
        self.state
            .read()
            .await
            .card_order(list)
            .unwrap_or_default()
    }

    // =========================================================================
    // Board lifecycle
    // =========================================================================

    /// Make `board` the active board and load it
    pub async fn open_board(&self, board: &BoardId) -> Result<()> {
        self.state.write().await.set_active(board.clone());
        info!(board = %board, "opened board");
        self.fetch_lists_and_cards(board).await
    }

    /// Forget the active board
    pub async fn close_board(&self) {
        let mut state = self.state.write().await;
        if let Some(board) = state.active_board() {
            info!(board = %board, "closed board");
        }
        state.clear();
    }

    /// Replace local lists and cards of `board` with the store's.
    ///
    /// Per-list card fetches run concurrently. If `board` stopped being the active
    /// board while the fetch was in flight, the result is discarded.
    #[instrument(skip(self), fields(board = %board))]
    pub async fn fetch_lists_and_cards(&self, board: &BoardId) -> Result<()> {
        let lists = self.store.list_lists(board).await?;
        let cards = try_join_all(lists.iter().map(|list| async move {
            let cards = self.store.list_cards(&list.id).await?;
            Ok::<_, SyncError>((list.id.clone(), cards))
        }))
        .await?;

        let mut state = self.state.write().await;
        if !state.is_active(board) {
            debug!("board no longer active, discarding fetched state");
            return Ok(());
        }
        debug!(lists = lists.len(), "replacing board state");
        state.replace(lists, cards);
        Ok(())
    }

    /// Refetch after a failure. Errors here are only logged; the next gesture or
    /// realtime event will try again.
    async fn resync(&self, board: &BoardId) {
        warn!(board = %board, "discarding local board state and refetching");
        if let Err(e) = self.fetch_lists_and_cards(board).await {
            error!(board = %board, error = %e, "resync failed");
        }
    }

    // =========================================================================
    // Drag gestures
    // =========================================================================

    /// Lift a card. Cancels any list drag.
    pub async fn begin_card_drag(&self, card_id: CardId, source_list_id: ListId) {
        debug!(card = %card_id, list = %source_list_id, "begin card drag");
        self.state.write().await.set_drag(DragContext::Card {
            card_id,
            source_list_id,
        });
    }

    /// Lift a list. Cancels any card drag.
    pub async fn begin_list_drag(&self, list_id: ListId) {
        debug!(list = %list_id, "begin list drag");
        self.state
            .write()
            .await
            .set_drag(DragContext::List { list_id });
    }

    /// Abandon the current drag without dropping
    pub async fn cancel_drag(&self) {
        self.state.write().await.take_drag();
    }

    /// Drop the dragged card on a list, before `target_card` or at the end.
    ///
    /// A cross-list move first reassigns the card's parent; if that fails the board
    /// is refetched and no order is saved. Order saves that fail afterwards are
    /// logged only.
    #[instrument(skip(self), fields(target_list = %target_list))]
    pub async fn drop_card_on_list(
        &self,
        target_list: &ListId,
        target_card: Option<&CardId>,
    ) -> DropOutcome {
        let (board, moved) = {
            let mut state = self.state.write().await;
            let Some(DragContext::Card {
                card_id,
                source_list_id,
            }) = state.take_drag()
            else {
                debug!("no card drag active");
                return DropOutcome::Ignored;
            };
            let Some(board) = state.active_board().cloned() else {
                debug!("no active board");
                return DropOutcome::Ignored;
            };
            match state.apply_card_move(&card_id, &source_list_id, target_list, target_card) {
                Some(moved) => (board, moved),
                None => {
                    debug!(card = %card_id, "drop is a no-op");
                    return DropOutcome::Ignored;
                }
            }
        };

        if moved.is_cross_list() {
            let patch = CardPatch::move_to(moved.target_list.clone());
            if let Err(e) = self.store.update_card(&moved.card_id, &patch).await {
                warn!(card = %moved.card_id, error = %e, "card reassignment failed");
                self.resync(&board).await;
                return DropOutcome::Resynced;
            }
        }

        self.save_card_order(&moved.target_list, &moved.target_order)
            .await;
        if moved.is_cross_list() {
            self.save_card_order(&moved.source_list, &moved.source_order)
                .await;
        }

        debug!(card = %moved.card_id, "card drop committed");
        DropOutcome::Committed
    }

    async fn save_card_order(&self, list: &ListId, order: &[CardId]) {
        if let Err(e) = self.store.reorder_cards(list, order).await {
            warn!(list = %list, error = %e, "failed to save card order");
        }
    }

    /// Drop the dragged list into the slot of `target_list`
    #[instrument(skip(self), fields(target_list = %target_list))]
    pub async fn drop_list_on_list(&self, target_list: &ListId) -> DropOutcome {
        let (board, order) = {
            let mut state = self.state.write().await;
            let Some(DragContext::List { list_id }) = state.take_drag() else {
                debug!("no list drag active");
                return DropOutcome::Ignored;
            };
            let Some(board) = state.active_board().cloned() else {
                debug!("no active board");
                return DropOutcome::Ignored;
            };
            if &list_id == target_list {
                debug!("list dropped on itself");
                return DropOutcome::Ignored;
            }
            match state.apply_list_move(&list_id, target_list) {
                Some(order) => (board, order),
                None => {
                    warn!(list = %list_id, "dragged or target list is not on the board");
                    return DropOutcome::Ignored;
                }
            }
        };

        match self.store.reorder_lists(&board, &order).await {
            Ok(()) => DropOutcome::Committed,
            Err(e) => {
                warn!(board = %board, error = %e, "failed to save list order");
                self.resync(&board).await;
                DropOutcome::Resynced
            }
        }
    }

    // =========================================================================
    // Explicit board edits
    // =========================================================================

    async fn require_active(&self) -> Result<BoardId> {
        self.active_board().await.ok_or(SyncError::NoActiveBoard)
    }

    /// Create a list at the end of the active board
    pub async fn create_list(&self, title: &str) -> Result<List> {
        let board = self.require_active().await?;
        let list = self.store.create_list(&board, title).await?;

        let mut state = self.state.write().await;
        if state.is_active(&board) && !state.has_list(&list.id) {
            state.push_list(list.clone());
        }
        Ok(list)
    }

    /// Create a card at the end of a list on the active board
    pub async fn create_card(&self, list: &ListId, card: &NewCard) -> Result<Card> {
        let board = self.require_active().await?;
        let created = self.store.create_card(list, card).await?;

        let mut state = self.state.write().await;
        if state.is_active(&board) && state.find_card(&created.id).is_none() {
            state.push_card(created.clone());
        }
        Ok(created)
    }

    /// Soft-delete a card: it leaves its list immediately and moves to the archive
    pub async fn archive_card(&self, card: &CardId) -> Result<()> {
        let board = self.require_active().await?;
        if self.state.write().await.remove_card(card).is_none() {
            return Err(SyncError::CardNotFound {
                id: card.to_string(),
            });
        }

        if let Err(e) = self.store.update_card(card, &CardPatch::archived(true)).await {
            warn!(card = %card, error = %e, "archive failed");
            self.resync(&board).await;
            return Err(e);
        }
        Ok(())
    }

    /// Cards archived on the active board
    pub async fn archived_cards(&self) -> Result<Vec<Card>> {
        let board = self.require_active().await?;
        self.store.list_archived_cards(&board).await
    }

    /// Bring an archived card back. The store decides where it reappears.
    ///
    /// The restore stands once the store accepts it; a failed refetch afterwards is
    /// only logged.
    pub async fn restore_card(&self, card: &CardId) -> Result<Card> {
        let board = self.require_active().await?;
        let restored = self
            .store
            .update_card(card, &CardPatch::archived(false))
            .await?;
        if let Err(e) = self.fetch_lists_and_cards(&board).await {
            error!(board = %board, card = %card, error = %e, "refetch after restore failed");
        }
        Ok(restored)
    }

    /// Permanently delete an archived card
    pub async fn delete_card(&self, card: &CardId) -> Result<()> {
        let archived = self.archived_cards().await?;
        if !archived.iter().any(|c| &c.id == card) {
            return Err(SyncError::CardNotArchived {
                id: card.to_string(),
            });
        }
        self.store.delete_card(card).await?;
        info!(card = %card, "card deleted");
        Ok(())
    }

    // =========================================================================
    // Realtime
    // =========================================================================

    /// React to a board mutation announced by any client, this one included
    pub async fn handle_event(&self, event: &BoardEvent) {
        let active = self.active_board().await;
        if active.as_ref() != Some(&event.board_id) {
            debug!(board = %event.board_id, "ignoring event for inactive board");
            return;
        }
        debug!(board = %event.board_id, kind = ?event.kind, "board changed remotely");
        if let Err(e) = self.fetch_lists_and_cards(&event.board_id).await {
            error!(board = %event.board_id, error = %e, "refetch after board event failed");
        }
    }
}

impl<S: BoardStore + ?Sized + 'static> BoardReconciler<S> {
    /// Feed a subscription into [`handle_event`](Self::handle_event) until the channel closes.
    ///
    /// A lagging receiver has missed events, so it triggers one refetch of the
    /// active board.
    pub fn spawn_listener(&self, mut events: broadcast::Receiver<BoardEvent>) -> JoinHandle<()> {
        let reconciler = self.clone();
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => reconciler.handle_event(&event).await,
                    Err(RecvError::Lagged(missed)) => {
                        warn!(missed, "realtime listener lagged");
                        if let Some(board) = reconciler.active_board().await {
                            reconciler.resync(&board).await;
                        }
                    }
                    Err(RecvError::Closed) => {
                        debug!("realtime channel closed");
                        break;
                    }
                }
            }
        })
    }
}
