//! Realtime board notifications
//!
//! The backend announces every board mutation on a per-board channel. Subscribers
//! do not get a diff, only the board id and a coarse kind; they are expected to
//! refetch.

use crate::types::BoardId;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::trace;

/// What part of a board changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoardEventKind {
    ListsChanged,
    CardsChanged,
}

/// Notification that a board was mutated by some client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardEvent {
    pub board_id: BoardId,
    pub kind: BoardEventKind,
}

impl BoardEvent {
    pub fn lists_changed(board_id: BoardId) -> Self {
        Self {
            board_id,
            kind: BoardEventKind::ListsChanged,
        }
    }

    pub fn cards_changed(board_id: BoardId) -> Self {
        Self {
            board_id,
            kind: BoardEventKind::CardsChanged,
        }
    }
}

/// Publish/subscribe scoped per board
///
/// Multiple subscribers can be created per board; each receives every event
/// published for that board after it subscribed.
pub trait RealtimeChannel: Send + Sync {
    /// Subscribe to events for one board
    fn subscribe(&self, board: &BoardId) -> broadcast::Receiver<BoardEvent>;

    /// Publish an event, returning how many subscribers received it
    fn publish(&self, event: BoardEvent) -> usize;
}

/// In-process channel backed by one tokio broadcast sender per board
pub struct LocalChannel {
    senders: DashMap<BoardId, broadcast::Sender<BoardEvent>>,
    capacity: usize,
}

impl LocalChannel {
    /// Create a channel whose per-board buffers hold `capacity` events
    pub fn new(capacity: usize) -> Self {
        Self {
            senders: DashMap::new(),
            capacity: capacity.max(1),
        }
    }
}

impl Default for LocalChannel {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_REALTIME_CAPACITY)
    }
}

impl RealtimeChannel for LocalChannel {
    fn subscribe(&self, board: &BoardId) -> broadcast::Receiver<BoardEvent> {
        self.senders
            .entry(board.clone())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    fn publish(&self, event: BoardEvent) -> usize {
        let board = event.board_id.clone();
        let delivered = match self.senders.get(&board) {
            Some(sender) => sender.send(event).unwrap_or(0),
            None => 0,
        };
        if delivered == 0 {
            trace!(board = %board, "no subscribers for board event");
            // Forget boards nobody listens to any more
            self.senders
                .remove_if(&board, |_, sender| sender.receiver_count() == 0);
        }
        delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_events_are_scoped_per_board() {
        let channel = LocalChannel::new(8);
        let mut b1 = channel.subscribe(&BoardId::from("b1"));
        let mut b2 = channel.subscribe(&BoardId::from("b2"));

        assert_eq!(channel.publish(BoardEvent::cards_changed(BoardId::from("b1"))), 1);

        let event = b1.recv().await.unwrap();
        assert_eq!(event.board_id.as_str(), "b1");
        assert_eq!(event.kind, BoardEventKind::CardsChanged);
        assert!(b2.try_recv().is_err());
    }

    #[test]
    fn test_publish_without_subscribers() {
        let channel = LocalChannel::default();
        assert_eq!(channel.publish(BoardEvent::lists_changed(BoardId::from("b1"))), 0);
    }

    #[test]
    fn test_abandoned_board_is_forgotten() {
        let channel = LocalChannel::new(4);
        let board = BoardId::from("b1");
        drop(channel.subscribe(&board));
        assert_eq!(channel.senders.len(), 1);

        assert_eq!(channel.publish(BoardEvent::cards_changed(board.clone())), 0);
        assert!(channel.senders.is_empty());

        let mut again = channel.subscribe(&board);
        assert_eq!(channel.publish(BoardEvent::cards_changed(board)), 1);
        assert!(again.try_recv().is_ok());
    }

    #[tokio::test]
    async fn test_fan_out_to_every_subscriber() {
        let channel = LocalChannel::new(8);
        let board = BoardId::from("b1");
        let mut first = channel.subscribe(&board);
        let mut second = channel.subscribe(&board);

        assert_eq!(channel.publish(BoardEvent::lists_changed(board.clone())), 2);
        assert_eq!(first.recv().await.unwrap().kind, BoardEventKind::ListsChanged);
        assert_eq!(second.recv().await.unwrap().kind, BoardEventKind::ListsChanged);
    }

    #[test]
    fn test_event_wire_format() {
        let event = BoardEvent::lists_changed(BoardId::from("b1"));
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json, serde_json::json!({ "board_id": "b1", "kind": "lists_changed" }));
    }
}
