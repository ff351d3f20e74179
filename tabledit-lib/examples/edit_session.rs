//! Walk through an editing session against an HTTP table store.
//!
//! Run with: cargo run --example edit_session -- <table>
//!
//! Endpoints default to the local development servers and can be overridden
//! in a .env file:
//! - TABLEDIT_FETCH_URL
//! - TABLEDIT_PERSIST_URL
//! - TABLEDIT_TIMEOUT_SECS
//!
//! Logs are written to tabledit.log.

use std::env;
use std::fs::File;

use simplelog::{Config, LevelFilter, WriteLogger};
use tabledit_lib::SwitchOutcome;
use tabledit_lib::TableEditor;
use tabledit_lib::error::Error;
use tabledit_lib::error::header_message;
use tabledit_lib::store::HttpTableStore;
use tabledit_lib::store::StoreConfig;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();

    let log_file = File::create("tabledit.log")?;
    WriteLogger::init(LevelFilter::Debug, Config::default(), log_file)?;

    let table = env::args().nth(1).unwrap_or_else(|| "example".to_string());
    let config = StoreConfig::from_env();
    println!("Fetching from {}", config.fetch_url);

    let mut editor = TableEditor::new(HttpTableStore::from_config(&config)?);
    editor.load(table.as_str()).await?;
    print_table(&editor);

    println!("\nAdding a row and an unnamed column...");
    editor.add_row();
    let generated = editor.add_column();
    println!("New column is stored as '{}' until it is named", generated);

    match editor.request_save() {
        Err(Error::Validation(errors)) => {
            for (index, error) in errors.invalid() {
                println!("  column {}: {}", index, error);
            }
        }
        other => other?,
    }

    let index = editor.session().column_count() - 1;
    editor.rename_header_input(index, "notes")?;
    println!("Named it 'notes'");

    println!("\nTrying to switch tables with unsaved edits...");
    if editor.select_table("other").await? == SwitchOutcome::Held {
        println!(
            "Held: pending '{}', quit needs confirmation: {}",
            editor.navigation().pending_table().unwrap_or_default(),
            editor.exit_guard().should_intercept()
        );
        editor.cancel_navigate();
    }

    println!("\nSaving...");
    editor.request_save()?;
    let response = editor.confirm_save().await?;
    println!("Saved (HTTP {}): {}", response.status, response.body);
    println!("Dirty after save: {}", editor.session().is_dirty());

    Ok(())
}

fn print_table<S>(editor: &TableEditor<S>)
where
    S: tabledit_lib::store::TableStore,
{
    let session = editor.session();
    println!(
        "Table '{}': {} rows",
        session.selected_table().unwrap_or_default(),
        session.row_count()
    );
    for (header, error) in session.headers().iter().zip(session.header_errors()) {
        println!("  {:<20} {}", header, header_message(*error));
    }
}
