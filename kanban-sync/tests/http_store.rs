//! REST board store against a mock backend

use kanban_sync::{
    BoardId, BoardReconciler, BoardStore, CardId, CardPatch, DropOutcome, HttpBoardStore, ListId,
    NewCard, SyncConfig, SyncError,
};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn store_for(server: &MockServer) -> HttpBoardStore {
    HttpBoardStore::with_base_url(format!("{}/api/", server.uri())).unwrap()
}

fn card_json(id: &str, list: &str) -> serde_json::Value {
    json!({ "id": id, "title": id.to_uppercase(), "list_id": list })
}

#[tokio::test]
async fn test_list_lists() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/boards/b1/lists"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "l1", "title": "To Do", "board_id": "b1" },
            { "id": "l2", "title": "Done", "board_id": "b1" }
        ])))
        .mount(&server)
        .await;

    let lists = store_for(&server)
        .list_lists(&BoardId::from("b1"))
        .await
        .unwrap();
    assert_eq!(lists.len(), 2);
    assert_eq!(lists[1].id.as_str(), "l2");
}

#[tokio::test]
async fn test_update_card_sends_patch() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/api/cards/c1"))
        .and(body_json(json!({ "list_id": "l2" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(card_json("c1", "l2")))
        .expect(1)
        .mount(&server)
        .await;

    let card = store_for(&server)
        .update_card(&CardId::from("c1"), &CardPatch::move_to(ListId::from("l2")))
        .await
        .unwrap();
    assert_eq!(card.list_id.as_str(), "l2");
}

#[tokio::test]
async fn test_reorder_bodies() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/lists/l1/cards/order"))
        .and(body_json(json!({ "order": ["c2", "c1"] })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/boards/b1/lists/order"))
        .and(body_json(json!({ "order": ["l2", "l1"] })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let store = store_for(&server);
    store
        .reorder_cards(&ListId::from("l1"), &[CardId::from("c2"), CardId::from("c1")])
        .await
        .unwrap();
    store
        .reorder_lists(&BoardId::from("b1"), &[ListId::from("l2"), ListId::from("l1")])
        .await
        .unwrap();
}

#[tokio::test]
async fn test_non_success_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/api/cards/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let result = store_for(&server)
        .update_card(&CardId::from("gone"), &CardPatch::archived(true))
        .await;
    match result {
        Err(SyncError::Rejected { operation, status }) => {
            assert_eq!(operation, "update card");
            assert_eq!(status, 404);
        }
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn test_transport_failure() {
    // Nothing listens on port 1
    let store = HttpBoardStore::with_base_url("http://127.0.0.1:1/api/").unwrap();
    let result = store.list_cards(&ListId::from("l1")).await;
    assert!(result.unwrap_err().is_transport());
}

#[tokio::test]
async fn test_bearer_token_is_sent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/boards/b1/lists"))
        .and(header("authorization", "Bearer s3cret"))
        .and(body_json(json!({ "title": "Review" })))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({ "id": "l9", "title": "Review", "board_id": "b1" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let store = HttpBoardStore::new(&SyncConfig {
        base_url: format!("{}/api/", server.uri()),
        api_token: Some("s3cret".into()),
        ..SyncConfig::default()
    })
    .unwrap();
    let list = store.create_list(&BoardId::from("b1"), "Review").await.unwrap();
    assert_eq!(list.id.as_str(), "l9");
}

#[tokio::test]
async fn test_create_card_archive_view_and_delete() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/lists/l1/cards"))
        .and(body_json(json!({ "title": "Pay rent", "description": "", "labels": [] })))
        .respond_with(ResponseTemplate::new(201).set_body_json(card_json("c5", "l1")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/boards/b1/cards/archived"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "c3", "title": "Old", "list_id": "l1", "archived": true }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/cards/c3"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let store = store_for(&server);
    let card = store
        .create_card(&ListId::from("l1"), &NewCard::new("Pay rent"))
        .await
        .unwrap();
    assert_eq!(card.id.as_str(), "c5");

    let archived = store
        .list_archived_cards(&BoardId::from("b1"))
        .await
        .unwrap();
    assert!(archived[0].archived);

    store.delete_card(&CardId::from("c3")).await.unwrap();
}

#[tokio::test]
async fn test_reconciler_over_http_resyncs_on_rejection() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/boards/b1/lists"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "l1", "title": "To Do", "board_id": "b1" },
            { "id": "l2", "title": "Doing", "board_id": "b1" }
        ])))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/lists/l1/cards"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([card_json("c1", "l1")])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/lists/l2/cards"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/api/cards/c1"))
        .respond_with(ResponseTemplate::new(409))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let reconciler = BoardReconciler::new(Arc::new(store_for(&server)));
    reconciler.open_board(&BoardId::from("b1")).await.unwrap();

    reconciler
        .begin_card_drag(CardId::from("c1"), ListId::from("l1"))
        .await;
    let outcome = reconciler.drop_card_on_list(&ListId::from("l2"), None).await;

    assert_eq!(outcome, DropOutcome::Resynced);
    assert_eq!(
        reconciler.card_order(&ListId::from("l1")).await,
        vec![CardId::from("c1")]
    );
    assert!(reconciler.card_order(&ListId::from("l2")).await.is_empty());
}
