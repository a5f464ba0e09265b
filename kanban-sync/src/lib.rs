//! Optimistic kanban board reconciler
//!
//! This crate keeps a local copy of one kanban board in step with an
//! authoritative backend. Drag-and-drop gestures are applied to the local copy at
//! once and persisted in the background; when the backend refuses a move, the
//! local copy is thrown away and refetched.
//!
//! ## Overview
//!
//! - **[`BoardState`]** - the explicit state store owned by the view layer
//! - **[`BoardReconciler`]** - turns gestures into local reorders plus store calls
//! - **[`BoardStore`]** - the backend seam ([`HttpBoardStore`], [`MemoryBoardStore`])
//! - **[`RealtimeChannel`]** - per-board mutation notices that trigger refetches
//! - **[`order`]** - the pure reordering rules
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use kanban_sync::{BoardReconciler, HttpBoardStore, SyncConfig, BoardId, CardId, ListId};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = SyncConfig::load(None)?;
//! let store = Arc::new(HttpBoardStore::new(&config)?);
//! let reconciler = BoardReconciler::new(store);
//!
//! reconciler.open_board(&BoardId::from("b1")).await?;
//!
//! // Drag card c1 out of "todo" and drop it in front of c7 in "doing"
//! reconciler.begin_card_drag(CardId::from("c1"), ListId::from("todo")).await;
//! reconciler
//!     .drop_card_on_list(&ListId::from("doing"), Some(&CardId::from("c7")))
//!     .await;
//! # Ok(())
//! # }
//! ```
//!
//! ## Consistency
//!
//! There is no lock serializing gestures: a second drop issued before the first
//! one's store calls settle may interleave with it. Realtime notices (including
//! the ones caused by this client) always converge the local copy to the store.

pub mod config;
mod error;
pub mod order;
pub mod realtime;
mod reconciler;
mod state;
pub mod store;
pub mod types;

pub use config::SyncConfig;
pub use error::{Result, SyncError};
pub use realtime::{BoardEvent, BoardEventKind, LocalChannel, RealtimeChannel};
pub use reconciler::{BoardReconciler, DropOutcome};
pub use state::{BoardState, CardMove, SharedBoardState};
pub use store::{BoardStore, HttpBoardStore, MemoryBoardStore, StoreCall, StoreOp};

// Re-export commonly used types
pub use types::{
    Attachment, Board, BoardId, Card, CardId, CardPatch, DragContext, LabelId, List, ListId,
    MemberId, NewCard,
};
