//! Ordering of overlapping load and save calls.
//!
//! Uses the split `begin_*` / `finish_*` API so answers can be delivered in any
//! order, the way a host running store calls as background tasks would see
//! them.

use std::sync::Arc;

use tabledit_lib::TableEditor;
use tabledit_lib::error::ApiError;
use tabledit_lib::error::Error;
use tabledit_lib::store::InMemoryTableStore;
use tabledit_lib::store::TableStore;

fn store() -> Arc<InMemoryTableStore> {
    let store = InMemoryTableStore::new();
    store.insert_json("slow", r#"[{"s": "old"}]"#).unwrap();
    store.insert_json("fast", r#"[{"f": "new"}]"#).unwrap();
    Arc::new(store)
}

#[tokio::test]
async fn test_later_load_wins_over_slower_earlier_load() {
    let store = store();
    let mut editor = TableEditor::new(store.clone());

    let first = editor.begin_load("slow").unwrap();
    let second = editor.begin_load("fast").unwrap();
    assert!(second.id() > first.id());

    let fast_rows = store.fetch_table(second.table()).await;
    let slow_rows = store.fetch_table(first.table()).await;

    editor.finish_load(second, fast_rows).unwrap();
    let err = editor.finish_load(first, slow_rows).unwrap_err();

    assert!(matches!(err, Error::Stale(_)));
    assert_eq!(editor.session().selected_table(), Some("fast"));
    assert_eq!(editor.session().headers(), ["f"]);
}

#[tokio::test]
async fn test_stale_failure_is_ignored_too() {
    let store = store();
    let mut editor = TableEditor::new(store.clone());

    let first = editor.begin_load("slow").unwrap();
    let second = editor.begin_load("fast").unwrap();
    let rows = store.fetch_table(second.table()).await;
    editor.finish_load(second, rows).unwrap();

    let err = editor
        .finish_load(first, Err(ApiError::http(502, "bad gateway")))
        .unwrap_err();

    assert!(matches!(err, Error::Stale(_)));
    assert_eq!(editor.session().selected_table(), Some("fast"));
}

#[tokio::test]
async fn test_second_save_is_refused_while_first_in_flight() {
    let store = store();
    let mut editor = TableEditor::new(store.clone());
    editor.load("slow").await.unwrap();
    editor.add_row();

    editor.request_save().unwrap();
    let ticket = editor.begin_save().unwrap();

    editor.request_save().unwrap();
    assert!(matches!(editor.begin_save(), Err(Error::Busy("save"))));
    assert!(matches!(editor.begin_load("fast"), Err(Error::Busy("save"))));

    let result = store.persist_table(ticket.request()).await;
    editor.finish_save(ticket, result).unwrap();

    assert!(!editor.session().is_dirty());
    assert!(!editor.requests().is_saving());
}

#[tokio::test]
async fn test_save_refused_while_loading() {
    let store = store();
    let mut editor = TableEditor::new(store.clone());
    editor.load("slow").await.unwrap();
    editor.add_row();

    let _load = editor.begin_load("fast").unwrap();
    editor.request_save().unwrap();

    assert!(matches!(editor.begin_save(), Err(Error::Busy("load"))));
    assert!(editor.session().is_dirty());
}

#[tokio::test]
async fn test_edit_during_save_keeps_session_dirty() {
    let store = store();
    let mut editor = TableEditor::new(store.clone());
    editor.load("slow").await.unwrap();
    editor.set_cell(0, "s", "first").unwrap();

    editor.request_save().unwrap();
    let ticket = editor.begin_save().unwrap();
    editor.set_cell(0, "s", "second").unwrap();

    let result = store.persist_table(ticket.request()).await;
    editor.finish_save(ticket, result).unwrap();

    assert!(editor.session().is_dirty());
    assert!(editor.exit_guard().should_intercept());
    assert_eq!(
        store.rows("slow").unwrap()[0].get("s"),
        Some(&serde_json::json!("first"))
    );
}

#[tokio::test]
async fn test_edit_during_load_holds_the_switch() {
    let store = store();
    let mut editor = TableEditor::new(store.clone());
    editor.load("slow").await.unwrap();

    let ticket = editor.request_switch("fast").unwrap().unwrap();
    editor.set_cell(0, "s", "precious").unwrap();

    let rows = store.fetch_table(ticket.table()).await;
    let err = editor.finish_load(ticket, rows).unwrap_err();

    assert!(matches!(err, Error::EditsPending(ref table) if table == "fast"));
    assert_eq!(editor.session().selected_table(), Some("slow"));
    assert_eq!(editor.session().cell(0, "s"), Some("precious"));
    assert!(editor.session().is_dirty());
    assert!(editor.navigation().is_prompt_open());
    assert_eq!(editor.navigation().pending_table(), Some("fast"));
    assert!(!editor.requests().is_loading());

    editor.confirm_navigate().await.unwrap();
    assert_eq!(editor.session().selected_table(), Some("fast"));
    assert!(!editor.session().is_dirty());
}

#[tokio::test]
async fn test_edit_after_confirmed_switch_is_not_discarded() {
    let store = store();
    let mut editor = TableEditor::new(store.clone());
    editor.load("slow").await.unwrap();
    editor.set_cell(0, "s", "first").unwrap();
    editor.request_switch("fast").unwrap();

    let ticket = editor.begin_confirm_navigate().unwrap();
    editor.set_cell(0, "s", "second").unwrap();

    let rows = store.fetch_table(ticket.table()).await;
    let err = editor.finish_load(ticket, rows).unwrap_err();

    assert!(matches!(err, Error::EditsPending(_)));
    assert_eq!(editor.session().cell(0, "s"), Some("second"));
    assert_eq!(editor.navigation().pending_table(), Some("fast"));
}

#[tokio::test]
async fn test_confirmed_switch_survives_save_in_flight() {
    let store = store();
    let mut editor = TableEditor::new(store.clone());
    editor.load("slow").await.unwrap();
    editor.add_row();

    editor.request_save().unwrap();
    let save = editor.begin_save().unwrap();
    editor.request_switch("fast").unwrap();

    assert!(matches!(editor.begin_confirm_navigate(), Err(Error::Busy("save"))));
    assert_eq!(editor.navigation().pending_table(), Some("fast"));
    assert!(editor.navigation().is_prompt_open());

    let result = store.persist_table(save.request()).await;
    editor.finish_save(save, result).unwrap();

    editor.confirm_navigate().await.unwrap();
    assert_eq!(editor.session().selected_table(), Some("fast"));
    assert!(!editor.navigation().is_prompt_open());
}
