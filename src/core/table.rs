//! # Table Data Model
//!
//! Rows and cells as the selection engine sees them. The engine never looks
//! inside a cell; it only indexes rows and hands them to a renderer.
//!
//! ```text
//! Row = Vec<Cell>
//! Cell
//! ├── Text(String)           // plain value, spans one column
//! └── Styled(StyledCell)     // value + colspan + optional fg/bg
//! ```

use serde::{Deserialize, Serialize};

pub const DEFAULT_SELECTED_BACKGROUND: &str = "cyan";
pub const DEFAULT_SELECTED_FOREGROUND: &str = "black";

/// A cell that carries its own span and colors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledCell {
    pub text: String,
    pub colspan: usize,
    pub foreground: Option<String>,
    pub background: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Text(String),
    Styled(StyledCell),
}

pub type Row = Vec<Cell>;

impl Cell {
    /// An unstyled cell covering `colspan` columns.
    pub fn spanning(text: impl Into<String>, colspan: usize) -> Self {
        Cell::Styled(StyledCell {
            text: text.into(),
            colspan: colspan.max(1),
            foreground: None,
            background: None,
        })
    }

    pub fn text(&self) -> &str {
        match self {
            Cell::Text(text) => text,
            Cell::Styled(cell) => &cell.text,
        }
    }

    pub fn colspan(&self) -> usize {
        match self {
            Cell::Text(_) => 1,
            Cell::Styled(cell) => cell.colspan.max(1),
        }
    }

    /// Re-wraps the cell with the selection colors, keeping its span.
    pub fn highlighted(&self, style: &StylePair) -> Cell {
        Cell::Styled(StyledCell {
            text: self.text().to_string(),
            colspan: self.colspan(),
            foreground: Some(style.foreground.clone()),
            background: Some(style.background.clone()),
        })
    }
}

impl From<&str> for Cell {
    fn from(text: &str) -> Self {
        Cell::Text(text.to_string())
    }
}

impl From<String> for Cell {
    fn from(text: String) -> Self {
        Cell::Text(text)
    }
}

impl From<StyledCell> for Cell {
    fn from(cell: StyledCell) -> Self {
        Cell::Styled(cell)
    }
}

/// Builds a row of plain text cells.
pub fn text_row<I, S>(values: I) -> Row
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    values.into_iter().map(|v| Cell::Text(v.into())).collect()
}

/// Plain text values of a row, in order.
pub fn row_texts(row: &Row) -> Vec<&str> {
    row.iter().map(Cell::text).collect()
}

/// Background/foreground color names applied to the selected row.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct StylePair {
    pub background: String,
    pub foreground: String,
}

impl Default for StylePair {
    fn default() -> Self {
        Self {
            background: DEFAULT_SELECTED_BACKGROUND.to_string(),
            foreground: DEFAULT_SELECTED_FOREGROUND.to_string(),
        }
    }
}

/// Headers and rows handed to a single render call.
#[derive(Debug, Clone, Copy)]
pub struct TableSnapshot<'a> {
    /// Empty means no header line.
    pub headers: &'a [String],
    pub rows: &'a [Row],
}

/// Parses delimited text into rows, one per non-blank line.
pub fn rows_from_delimited(text: &str, delimiter: char) -> Vec<Row> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| text_row(line.split(delimiter).map(str::trim)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_style_pair() {
        let style = StylePair::default();
        assert_eq!(style.background, "cyan");
        assert_eq!(style.foreground, "black");
    }

    #[test]
    fn test_highlight_preserves_colspan() {
        let style = StylePair::default();
        let cell = Cell::spanning("+ Add New User", 4);
        let highlighted = cell.highlighted(&style);
        assert_eq!(highlighted.colspan(), 4);
        assert_eq!(highlighted.text(), "+ Add New User");
        match highlighted {
            Cell::Styled(styled) => {
                assert_eq!(styled.background.as_deref(), Some("cyan"));
                assert_eq!(styled.foreground.as_deref(), Some("black"));
            }
            Cell::Text(_) => panic!("expected a styled cell"),
        }
    }

    #[test]
    fn test_highlight_plain_cell_spans_one() {
        let style = StylePair {
            background: "red".to_string(),
            foreground: "white".to_string(),
        };
        let highlighted = Cell::from("John").highlighted(&style);
        assert_eq!(highlighted.colspan(), 1);
        assert_eq!(highlighted.text(), "John");
    }

    #[test]
    fn test_zero_colspan_is_one() {
        assert_eq!(Cell::spanning("x", 0).colspan(), 1);
    }

    #[test]
    fn test_rows_from_delimited() {
        let rows = rows_from_delimited("1, John\n\n2,Jane \n", ',');
        assert_eq!(rows.len(), 2);
        assert_eq!(row_texts(&rows[0]), vec!["1", "John"]);
        assert_eq!(row_texts(&rows[1]), vec!["2", "Jane"]);
    }

    #[test]
    fn test_text_row() {
        let row = text_row(["a", "b"]);
        assert_eq!(row, vec![Cell::from("a"), Cell::from("b")]);
    }
}
