//! Card types: Card, Attachment, CardPatch, NewCard

use super::ids::{CardId, LabelId, ListId, MemberId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single task on the board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub list_id: ListId,

    /// Staff member responsible for the card
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<MemberId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,

    #[serde(default)]
    pub labels: Vec<LabelId>,

    /// At most one file per card
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<Attachment>,

    /// Archived cards are kept out of every list ordering
    #[serde(default)]
    pub archived: bool,
}

impl Card {
    /// Create a new card in the given list
    pub fn new(list_id: ListId, title: impl Into<String>) -> Self {
        Self {
            id: CardId::new(),
            title: title.into(),
            description: String::new(),
            list_id,
            assignee: None,
            due_date: None,
            labels: Vec::new(),
            attachment: None,
            archived: false,
        }
    }

    /// Build a card from a creation payload
    pub fn from_new(list_id: ListId, new: &NewCard) -> Self {
        Self {
            id: CardId::new(),
            title: new.title.clone(),
            description: new.description.clone(),
            list_id,
            assignee: new.assignee.clone(),
            due_date: new.due_date,
            labels: new.labels.clone(),
            attachment: None,
            archived: false,
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Apply a partial update in place
    pub fn apply(&mut self, patch: &CardPatch) {
        if let Some(ref list_id) = patch.list_id {
            self.list_id = list_id.clone();
        }
        if let Some(ref title) = patch.title {
            self.title = title.clone();
        }
        if let Some(ref description) = patch.description {
            self.description = description.clone();
        }
        if let Some(archived) = patch.archived {
            self.archived = archived;
        }
    }
}

/// File attached to a card, stored by the backend and referenced by URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub url: String,
    /// MIME type as reported by the upload
    #[serde(rename = "type")]
    pub content_type: String,
    pub name: String,
}

/// Partial card update. Absent fields are left untouched by the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_id: Option<ListId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived: Option<bool>,
}

impl CardPatch {
    /// Reassign the card to another list
    pub fn move_to(list_id: ListId) -> Self {
        Self {
            list_id: Some(list_id),
            ..Self::default()
        }
    }

    /// Archive or restore the card
    pub fn archived(archived: bool) -> Self {
        Self {
            archived: Some(archived),
            ..Self::default()
        }
    }
}

/// Payload for creating a card
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCard {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<MemberId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub labels: Vec<LabelId>,
}

impl NewCard {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_assignee(mut self, assignee: impl Into<MemberId>) -> Self {
        self.assignee = Some(assignee.into());
        self
    }

    pub fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_only_serializes_set_fields() {
        let patch = CardPatch::move_to(ListId::from("l2"));
        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(json, serde_json::json!({ "list_id": "l2" }));
    }

    #[test]
    fn test_apply_patch() {
        let mut card = Card::new(ListId::from("l1"), "Write report");
        card.apply(&CardPatch::move_to(ListId::from("l2")));
        assert_eq!(card.list_id.as_str(), "l2");
        assert!(!card.archived);

        card.apply(&CardPatch::archived(true));
        assert!(card.archived);
        assert_eq!(card.title, "Write report");
    }

    #[test]
    fn test_card_defaults_on_read() {
        let json = r#"{"id": "c1", "title": "Call supplier", "list_id": "l1"}"#;
        let card: Card = serde_json::from_str(json).unwrap();
        assert!(card.labels.is_empty());
        assert!(card.attachment.is_none());
        assert!(!card.archived);
    }

    #[test]
    fn test_attachment_type_field() {
        let json = r#"{
            "id": "c1", "title": "Invoice", "list_id": "l1",
            "attachment": {"url": "https://files/x.pdf", "type": "application/pdf", "name": "x.pdf"},
            "due_date": "2024-03-01"
        }"#;
        let card: Card = serde_json::from_str(json).unwrap();
        let attachment = card.attachment.unwrap();
        assert_eq!(attachment.content_type, "application/pdf");
        assert_eq!(card.due_date, NaiveDate::from_ymd_opt(2024, 3, 1));
    }

    #[test]
    fn test_from_new() {
        let new = NewCard::new("Order stock")
            .with_description("200 units")
            .with_assignee("m1");
        let card = Card::from_new(ListId::from("l1"), &new);
        assert_eq!(card.title, "Order stock");
        assert_eq!(card.assignee, Some(MemberId::from("m1")));
        assert_eq!(card.list_id.as_str(), "l1");
    }
}
