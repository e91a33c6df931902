//! # Selection State
//!
//! The ordered rows plus the highlighted index. Out-of-range indices are
//! corrected, never reported: `clamp_to_bounds()` runs before every draw.
//!
//! ```text
//! index == -1          cancelled, no selection
//! 0 <= index < len     highlighted row
//! len == 0             no row to select; queries return None
//! ```

use crate::core::table::Row;

pub const CANCELLED: isize = -1;

#[derive(Debug, Clone, Default)]
pub struct SelectionState {
    rows: Vec<Row>,
    index: isize,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces all rows and resets the highlight to the first row.
    /// An empty list still stores 0; `selected_index()` and `current()`
    /// report nothing until a row exists.
    pub fn set_rows(&mut self, rows: Vec<Row>) {
        self.rows = rows;
        self.index = 0;
    }

    /// Appends a row without moving the highlight.
    pub fn add_row(&mut self, row: Row) {
        self.rows.push(row);
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Raw index, `-1` when cancelled.
    pub fn index(&self) -> isize {
        self.index
    }

    /// Sets the index as-is. The next `clamp_to_bounds()` corrects it.
    pub fn set_index(&mut self, index: isize) {
        self.index = index;
    }

    /// Returns true if the highlight moved.
    pub fn move_up(&mut self) -> bool {
        if self.index > 0 {
            self.index -= 1;
            true
        } else {
            false
        }
    }

    /// Returns true if the highlight moved.
    pub fn move_down(&mut self) -> bool {
        if self.index < self.last_index() {
            self.index += 1;
            true
        } else {
            false
        }
    }

    pub fn cancel(&mut self) {
        self.index = CANCELLED;
    }

    pub fn is_cancelled(&self) -> bool {
        self.index == CANCELLED
    }

    pub fn clamp_to_bounds(&mut self) {
        // An empty list clamps to -1: no non-negative index exists.
        if self.index < 0 {
            self.index = 0;
        }
        if self.index > self.last_index() {
            self.index = self.last_index();
        }
    }

    /// Index of the selected row, if it exists.
    pub fn selected_index(&self) -> Option<usize> {
        usize::try_from(self.index)
            .ok()
            .filter(|&i| i < self.rows.len())
    }

    pub fn current(&self) -> Option<&Row> {
        self.selected_index().and_then(|i| self.rows.get(i))
    }

    fn last_index(&self) -> isize {
        self.rows.len() as isize - 1
    }
}
