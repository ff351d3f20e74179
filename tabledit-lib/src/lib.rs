//! Table editing engine
//!
//! Editing state for a client-side table editor: which edits are pending,
//! which column headers are valid, when leaving the table must be confirmed,
//! and what is sent to the store on save.

pub mod error;
pub mod model;
pub mod navigation;
pub mod save;
pub mod session;
pub mod store;

mod editor;

pub use editor::*;
