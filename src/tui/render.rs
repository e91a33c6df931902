//! # Render Driver
//!
//! Turns selection state into screen output. Interactive frames clear the
//! screen, print the navigation hint and row counter, then hand the table
//! (with the selected row recolored) to the [`TableRenderer`]. The batch
//! variant skips all of that and draws the table as-is.

use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::terminal::{Clear, ClearType};
use std::io::{self, Write};

use crate::core::messages::{EnglishText, MessageKey, TextProvider};
use crate::core::table::{Row, StylePair, TableSnapshot};
use crate::tui::renderer::{BoxRenderer, TableRenderer, TableStyle};

pub struct RenderDriver {
    renderer: Box<dyn TableRenderer>,
    text: Box<dyn TextProvider>,
    table_style: TableStyle,
}

impl Default for RenderDriver {
    fn default() -> Self {
        Self {
            renderer: Box::new(BoxRenderer),
            text: Box::new(EnglishText),
            table_style: TableStyle::default(),
        }
    }
}

impl RenderDriver {
    pub fn set_renderer(&mut self, renderer: Box<dyn TableRenderer>) {
        self.renderer = renderer;
    }

    pub fn set_text_provider(&mut self, text: Box<dyn TextProvider>) {
        self.text = text;
    }

    pub fn set_table_style(&mut self, table_style: TableStyle) {
        self.table_style = table_style;
    }

    /// One interactive frame. Same arguments, same bytes.
    pub fn draw_full<W: Write>(
        &self,
        out: &mut W,
        table: TableSnapshot<'_>,
        index: usize,
        style: &StylePair,
    ) -> io::Result<()> {
        self.clear_screen(out)?;
        writeln!(out, "{}", self.text.text(MessageKey::Instructions))?;
        writeln!(
            out,
            "{}",
            self.text.row_indicator(index + 1, table.rows.len())
        )?;
        writeln!(out)?;

        let display_rows = highlight_row(table.rows, index, style);
        self.renderer.render(
            out,
            TableSnapshot {
                headers: table.headers,
                rows: &display_rows,
            },
            &self.table_style,
        )?;
        out.flush()
    }

    /// The table alone: no clear, no hint, no highlight.
    pub fn draw_once<W: Write>(&self, out: &mut W, table: TableSnapshot<'_>) -> io::Result<()> {
        self.renderer.render(out, table, &self.table_style)?;
        out.flush()
    }

    pub fn clear_screen<W: Write>(&self, out: &mut W) -> io::Result<()> {
        queue!(out, Clear(ClearType::All), MoveTo(0, 0))
    }

    pub fn cancellation_notice<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "{}", self.text.text(MessageKey::SelectionCancelled))?;
        out.flush()
    }
}

/// Copy of `rows` with every cell of row `index` recolored.
fn highlight_row(rows: &[Row], index: usize, style: &StylePair) -> Vec<Row> {
    rows.iter()
        .enumerate()
        .map(|(i, row)| {
            if i == index {
                row.iter().map(|cell| cell.highlighted(style)).collect()
            } else {
                row.clone()
            }
        })
        .collect()
}
