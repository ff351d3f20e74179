//! Integration tests against a running table store.
//!
//! These tests need a real backend and are ignored by default. To run them,
//! create a `.env` file in the tabledit-lib directory with:
//!
//! ```env
//! TABLEDIT_FETCH_URL=http://localhost:8080/data
//! TABLEDIT_PERSIST_URL=http://localhost:8000/updateTable
//! TABLEDIT_TEST_TABLE=scratch
//! ```
//!
//! Then run: `cargo test -p tabledit-lib -- --ignored`

use std::env;

use tabledit_lib::TableEditor;
use tabledit_lib::store::HttpTableStore;
use tabledit_lib::store::StoreConfig;

fn load_env() -> Option<(StoreConfig, String)> {
    let _ = dotenvy::dotenv();

    let table = env::var("TABLEDIT_TEST_TABLE").ok()?;
    Some((StoreConfig::from_env(), table))
}

#[tokio::test]
#[ignore = "requires a running table store configured in .env"]
async fn test_load_and_save_unchanged() {
    let (config, table) = load_env().expect("Missing required environment variables. See module docs.");
    let store = HttpTableStore::from_config(&config).expect("invalid store config");
    let mut editor = TableEditor::new(store);

    editor.load(table.as_str()).await.expect("load failed");
    let rows = editor.session().row_count();
    println!("Loaded '{}': {} rows, headers {:?}", table, rows, editor.session().headers());

    editor.request_save().expect("headers should be valid after a fresh load");
    editor.confirm_save().await.expect("save failed");

    editor.reload().await.expect("reload failed");
    assert_eq!(editor.session().row_count(), rows);
}

#[tokio::test]
#[ignore = "requires a running table store configured in .env"]
async fn test_add_and_drop_column() {
    let (config, table) = load_env().expect("Missing required environment variables. See module docs.");
    let store = HttpTableStore::from_config(&config).expect("invalid store config");
    let mut editor = TableEditor::new(store);

    editor.load(table.as_str()).await.expect("load failed");
    let index = editor.session().column_count();
    editor.add_column();
    editor
        .rename_header_input(index, "tabledit_probe")
        .expect("column exists");
    editor.request_save().expect("valid headers");
    editor.confirm_save().await.expect("save failed");

    editor.reload().await.expect("reload failed");
    let position = editor
        .session()
        .headers()
        .iter()
        .position(|h| h == "tabledit_probe");

    if let Some(position) = position {
        editor.delete_column(position).expect("column exists");
        editor.request_save().expect("valid headers");
        editor.confirm_save().await.expect("cleanup save failed");
    } else {
        println!("Store did not keep the new column (table may have no rows)");
    }
}
