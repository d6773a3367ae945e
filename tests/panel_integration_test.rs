//! End-to-end tests against a mock bot backend.
//!
//! Each test stands up an `httpmock` server and mounts real panel
//! components on it, exercising the full path from component call to wire
//! request and back into reconciled state.

use std::sync::Arc;
use std::time::Duration;

use httpmock::prelude::*;
use pretty_assertions::assert_eq;
use serde_json::json;

use botpanel::api::types::BotState;
use botpanel::api::ApiClient;
use botpanel::bus::EventBus;
use botpanel::panel::{
    EntryList, GreetingPanel, PollerState, StatusPoller, GENERIC_ERROR_MESSAGE,
    STATUS_ERROR_MESSAGE,
};

fn client_for(server: &MockServer) -> Arc<ApiClient> {
    Arc::new(ApiClient::new(server.base_url()))
}

fn mounted_list(server: &MockServer) -> EntryList {
    EntryList::new(client_for(server), Arc::new(EventBus::new()))
}

// -- status -----------------------------------------------------------------

#[tokio::test]
async fn concurrent_refreshes_collapse_into_one_request() {
    let server = MockServer::start_async().await;
    let status = server
        .mock_async(|when, then| {
            when.method(GET).path("/status");
            then.status(200)
                .delay(Duration::from_millis(100))
                .json_body(json!({"State": "Joined", "Started": "2024-01-01T00:00:00Z"}));
        })
        .await;

    let poller = StatusPoller::new(client_for(&server));
    let (first, second) = tokio::join!(poller.refresh(), poller.refresh());

    assert!(first != second, "exactly one refresh should win");
    status.assert_hits_async(1).await;

    match poller.state() {
        PollerState::Settled(snapshot) => {
            assert_eq!(snapshot.state, BotState::Joined);
            assert_eq!(
                snapshot.since.expect("joined bot has a start time").to_rfc3339(),
                "2024-01-01T00:00:00+00:00"
            );
        }
        other => panic!("expected settled state, got {other:?}"),
    }
}

#[tokio::test]
async fn stop_issues_delete_then_refreshes() {
    let server = MockServer::start_async().await;
    let stop = server
        .mock_async(|when, then| {
            when.method(DELETE).path("/status");
            then.status(200);
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/status");
            then.status(200).json_body(json!({"State": "notStarted"}));
        })
        .await;

    let poller = StatusPoller::new(client_for(&server));
    poller.stop().await;

    stop.assert_hits_async(1).await;
    match poller.state() {
        PollerState::Settled(snapshot) => {
            assert_eq!(snapshot.state, BotState::NotStarted);
            assert_eq!(snapshot.since, None);
        }
        other => panic!("expected settled state, got {other:?}"),
    }
}

#[tokio::test]
async fn failed_start_surfaces_the_status_error_message() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/status");
            then.status(500);
        })
        .await;

    let poller = StatusPoller::new(client_for(&server));
    poller.start().await;

    assert_eq!(
        poller.state(),
        PollerState::Failed(STATUS_ERROR_MESSAGE.to_string())
    );
}

// -- entry list -------------------------------------------------------------

#[tokio::test]
async fn load_replaces_entries_and_appends_the_blank_row() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/entries");
            then.status(200)
                .json_body(json!([{"name": "hi", "template": "hello!"}]));
        })
        .await;

    let list = mounted_list(&server);
    assert!(list.load().await.expect("load succeeds"));

    let entries = list.entries();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].key, "hi");
    assert_eq!(entries[0].value, "hello!");
    assert_eq!(entries[1].key, "");
    assert_eq!(entries[1].value, "");
}

#[tokio::test]
async fn failed_load_sets_the_generic_error_message() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/entries");
            then.status(500);
        })
        .await;

    let list = mounted_list(&server);
    assert!(list.load().await.is_err());
    assert_eq!(list.error(), Some(GENERIC_ERROR_MESSAGE.to_string()));
}

// -- entry editor -----------------------------------------------------------

#[tokio::test]
async fn rename_deletes_the_old_name_before_creating_the_new_one() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/entries");
            then.status(200)
                .json_body(json!([{"name": "hi", "template": "hello!"}]));
        })
        .await;
    let delete_old = server
        .mock_async(|when, then| {
            when.method(DELETE).path("/entries/hi");
            then.status(200);
        })
        .await;
    let put = server
        .mock_async(|when, then| {
            when.method(PUT).path("/entries");
            then.status(200)
                .json_body(json!({"name": "bye", "template": "later!"}));
        })
        .await;

    let list = mounted_list(&server);
    list.load().await.expect("load succeeds");

    let entry = list.entries()[0].clone();
    let mut editor = list.editor_for(&entry);

    assert!(editor.save("bye", "later!").await.expect("save succeeds"));
    delete_old.assert_hits_async(1).await;
    put.assert_hits_async(1).await;

    let entries = list.entries();
    assert_eq!(entries[0].key, "bye");
    assert_eq!(entries[0].value, "later!");
    assert!(!entries[0].deleted);

    // A second save under the established name must not delete again.
    assert!(editor.save("bye", "later!").await.expect("save succeeds"));
    delete_old.assert_hits_async(1).await;
    put.assert_hits_async(2).await;
}

#[tokio::test]
async fn declined_confirmation_sends_nothing() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/entries");
            then.status(200)
                .json_body(json!([{"name": "hi", "template": "hello!"}]));
        })
        .await;
    let delete = server
        .mock_async(|when, then| {
            when.method(DELETE).path("/entries/hi");
            then.status(200);
        })
        .await;

    let list = mounted_list(&server);
    list.load().await.expect("load succeeds");

    let entry = list.entries()[0].clone();
    let mut editor = list.editor_for(&entry);

    assert!(!editor.delete(&|_: &str| false).await.expect("decline is ok"));
    delete.assert_hits_async(0).await;
    assert_eq!(list.entries()[0].key, "hi");
}

#[tokio::test]
async fn confirmed_delete_marks_the_row_deleted() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/entries");
            then.status(200)
                .json_body(json!([{"name": "hi", "template": "hello!"}]));
        })
        .await;
    let delete = server
        .mock_async(|when, then| {
            when.method(DELETE).path("/entries/hi");
            then.status(200);
        })
        .await;

    let list = mounted_list(&server);
    list.load().await.expect("load succeeds");

    let entry = list.entries()[0].clone();
    let mut editor = list.editor_for(&entry);

    assert!(editor.delete(&|_: &str| true).await.expect("delete succeeds"));
    delete.assert_hits_async(1).await;
    assert!(editor.is_deleted());

    let entries = list.entries();
    assert_eq!(entries[0].key, "deleted");
    assert_eq!(entries[0].value, "deleted");
    assert!(entries[0].deleted);
}

// -- greetings --------------------------------------------------------------

#[tokio::test]
async fn greeting_save_round_trips_through_the_server_echo() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/templates");
            then.status(200).json_body(json!({
                "newUser": "hi",
                "returningUser": "wb",
                "consecutiveUser": "again",
                "greetTrolls": false
            }));
        })
        .await;
    let save = server
        .mock_async(|when, then| {
            when.method(POST).path("/templates").json_body(json!({
                "newUser": "howdy",
                "returningUser": "wb",
                "consecutiveUser": "again"
            }));
            then.status(200).json_body(json!({
                "newUser": "howdy",
                "returningUser": "wb",
                "consecutiveUser": "again",
                "greetTrolls": true
            }));
        })
        .await;

    let mut panel = GreetingPanel::new(client_for(&server));
    panel.load().await.expect("load succeeds");
    panel.set_new_user("howdy");
    assert!(!panel.is_saved());

    panel.save().await.expect("save succeeds");
    save.assert_hits_async(1).await;
    assert!(panel.is_saved());

    // The echo is authoritative, including fields the panel never sent.
    let templates = panel.templates().expect("loaded");
    assert_eq!(templates.new_user, "howdy");
    assert!(templates.greet_trolls);
}
