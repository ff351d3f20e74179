//! Table models

mod row;
mod table;
mod table_serde;

pub use row::*;
pub use table::*;
pub use table_serde::*;
