//! Core types for the board reconciler

mod board;
mod card;
mod drag;
mod ids;

pub use board::{Board, List};
pub use card::{Attachment, Card, CardPatch, NewCard};
pub use drag::DragContext;
pub use ids::{BoardId, CardId, LabelId, ListId, MemberId};
