//! tablepick: pick one row from a table drawn in the terminal.
//!
//! ```no_run
//! use tablepick::{SelectableTable, text_row};
//!
//! let mut table = SelectableTable::new();
//! table
//!     .set_headers(["ID", "Name"])
//!     .set_rows(vec![text_row(["1", "John"]), text_row(["2", "Jane"])]);
//! if let Some(row) = table.select()? {
//!     println!("picked {:?}", tablepick::row_texts(&row));
//! }
//! # Ok::<(), std::io::Error>(())
//! ```

pub mod core;
pub mod tui;

#[cfg(test)]
pub mod test_support;

pub use crate::core::key::{KeyEvent, decode};
pub use crate::core::messages::{EnglishText, MessageKey, TextProvider};
pub use crate::core::table::{Cell, Row, StyledCell, StylePair, row_texts, text_row};
pub use crate::tui::{Outcome, SelectableTable};
