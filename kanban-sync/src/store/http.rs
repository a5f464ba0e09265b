//! REST client for the board backend.
//!
//! Requests are sent once. A non-success status becomes [`SyncError::Rejected`],
//! anything below HTTP becomes [`SyncError::Transport`]; the reconciler treats
//! both the same way.

use super::{BoardStore, StoreOp};
use crate::config::SyncConfig;
use crate::error::{Result, SyncError};
use crate::types::{BoardId, Card, CardId, CardPatch, List, ListId, NewCard};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Serialize;
use tracing::{debug, instrument, warn};
use url::Url;

#[derive(Serialize)]
struct OrderBody<'a, T> {
    order: &'a [T],
}

#[derive(Serialize)]
struct TitleBody<'a> {
    title: &'a str,
}

/// Board store backed by the REST API
#[derive(Debug, Clone)]
pub struct HttpBoardStore {
    client: Client,
    base: Url,
    token: Option<String>,
}

impl HttpBoardStore {
    /// Build a client from configuration
    pub fn new(config: &SyncConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(&config.user_agent)
            .build()?;

        Ok(Self {
            client,
            base: Url::parse(&config.base_url)?,
            token: config.api_token.clone(),
        })
    }

    /// Shorthand for a store with default settings against `base_url`
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        Self::new(&SyncConfig {
            base_url: base_url.into(),
            ..SyncConfig::default()
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Append path segments to the base URL, percent-encoding each one
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| SyncError::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(&self, op: StoreOp, request: RequestBuilder) -> Result<Response> {
        let request = match self.token {
            Some(ref token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await.inspect_err(|e| {
            warn!(operation = %op, error = %e, "board store unreachable");
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(operation = %op, status = status.as_u16(), "board store rejected request");
            return Err(SyncError::rejected(op.name(), status.as_u16()));
        }
        debug!(operation = %op, status = status.as_u16(), "board store ok");
        Ok(response)
    }
}

#[async_trait]
impl BoardStore for HttpBoardStore {
    #[instrument(skip(self), fields(board = %board))]
    async fn list_lists(&self, board: &BoardId) -> Result<Vec<List>> {
        let url = self.endpoint(&["boards", board.as_str(), "lists"])?;
        let response = self.send(StoreOp::ListLists, self.client.get(url)).await?;
        Ok(response.json().await?)
    }

    #[instrument(skip(self), fields(list = %list))]
    async fn list_cards(&self, list: &ListId) -> Result<Vec<Card>> {
        let url = self.endpoint(&["lists", list.as_str(), "cards"])?;
        let response = self.send(StoreOp::ListCards, self.client.get(url)).await?;
        Ok(response.json().await?)
    }

    #[instrument(skip(self, patch), fields(card = %card))]
    async fn update_card(&self, card: &CardId, patch: &CardPatch) -> Result<Card> {
        let url = self.endpoint(&["cards", card.as_str()])?;
        let response = self
            .send(StoreOp::UpdateCard, self.client.patch(url).json(patch))
            .await?;
        Ok(response.json().await?)
    }

    #[instrument(skip(self, order), fields(list = %list, cards = order.len()))]
    async fn reorder_cards(&self, list: &ListId, order: &[CardId]) -> Result<()> {
        let url = self.endpoint(&["lists", list.as_str(), "cards", "order"])?;
        self.send(
            StoreOp::ReorderCards,
            self.client.put(url).json(&OrderBody { order }),
        )
        .await?;
        Ok(())
    }

    #[instrument(skip(self, order), fields(board = %board, lists = order.len()))]
    async fn reorder_lists(&self, board: &BoardId, order: &[ListId]) -> Result<()> {
        let url = self.endpoint(&["boards", board.as_str(), "lists", "order"])?;
        self.send(
            StoreOp::ReorderLists,
            self.client.put(url).json(&OrderBody { order }),
        )
        .await?;
        Ok(())
    }

    #[instrument(skip(self), fields(board = %board))]
    async fn create_list(&self, board: &BoardId, title: &str) -> Result<List> {
        let url = self.endpoint(&["boards", board.as_str(), "lists"])?;
        let response = self
            .send(
                StoreOp::CreateList,
                self.client.post(url).json(&TitleBody { title }),
            )
            .await?;
        Ok(response.json().await?)
    }

    #[instrument(skip(self, card), fields(list = %list))]
    async fn create_card(&self, list: &ListId, card: &NewCard) -> Result<Card> {
        let url = self.endpoint(&["lists", list.as_str(), "cards"])?;
        let response = self
            .send(StoreOp::CreateCard, self.client.post(url).json(card))
            .await?;
        Ok(response.json().await?)
    }

    #[instrument(skip(self), fields(board = %board))]
    async fn list_archived_cards(&self, board: &BoardId) -> Result<Vec<Card>> {
        let url = self.endpoint(&["boards", board.as_str(), "cards", "archived"])?;
        let response = self
            .send(StoreOp::ListArchivedCards, self.client.get(url))
            .await?;
        Ok(response.json().await?)
    }

    #[instrument(skip(self), fields(card = %card))]
    async fn delete_card(&self, card: &CardId) -> Result<()> {
        let url = self.endpoint(&["cards", card.as_str()])?;
        self.send(StoreOp::DeleteCard, self.client.delete(url)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_segments() {
        let store = HttpBoardStore::with_base_url("https://boards.example.com/api/").unwrap();
        let url = store.endpoint(&["lists", "l 1", "cards"]).unwrap();
        assert_eq!(url.as_str(), "https://boards.example.com/api/lists/l%201/cards");
    }

    #[test]
    fn test_endpoint_without_trailing_slash() {
        let store = HttpBoardStore::with_base_url("https://boards.example.com/api").unwrap();
        let url = store.endpoint(&["cards", "c1"]).unwrap();
        assert_eq!(url.as_str(), "https://boards.example.com/api/cards/c1");
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        assert!(HttpBoardStore::with_base_url("not a url").is_err());
    }
}
