//! # Table Renderer
//!
//! Draws headers and rows as a bordered text table. The selection loop only
//! talks to the [`TableRenderer`] trait, so hosts can plug in their own
//! layout; [`BoxRenderer`] is the default.
//!
//! ```text
//! +----+--------------------+
//! | ID | Name               |
//! +----+--------------------+
//! | 1  | John               |
//! | + Add New User          |   ← colspan 2
//! +----+--------------------+
//! ```

use crossterm::style::{Color, Stylize, style};
use std::io::{self, Write};
use unicode_width::UnicodeWidthStr;

use crate::core::table::{Cell, TableSnapshot};

/// Border characters and cell padding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableStyle {
    pub horizontal: char,
    pub vertical: char,
    pub crossing: char,
    pub padding: usize,
}

impl Default for TableStyle {
    fn default() -> Self {
        Self {
            horizontal: '-',
            vertical: '|',
            crossing: '+',
            padding: 1,
        }
    }
}

impl TableStyle {
    /// Columns separated by whitespace only.
    pub fn borderless() -> Self {
        Self {
            horizontal: ' ',
            vertical: ' ',
            crossing: ' ',
            padding: 1,
        }
    }
}

pub trait TableRenderer {
    /// Writes the whole table once.
    fn render(
        &self,
        out: &mut dyn Write,
        table: TableSnapshot<'_>,
        style: &TableStyle,
    ) -> io::Result<()>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct BoxRenderer;

impl TableRenderer for BoxRenderer {
    fn render(
        &self,
        out: &mut dyn Write,
        table: TableSnapshot<'_>,
        style: &TableStyle,
    ) -> io::Result<()> {
        let widths = column_widths(table, style);
        if widths.is_empty() {
            return Ok(());
        }

        let border = border_line(&widths, style);
        writeln!(out, "{border}")?;
        if !table.headers.is_empty() {
            let header_cells: Vec<Cell> = table
                .headers
                .iter()
                .map(|h| Cell::Text(h.clone()))
                .collect();
            writeln!(out, "{}", row_line(&header_cells, &widths, style))?;
            writeln!(out, "{border}")?;
        }
        for row in table.rows {
            writeln!(out, "{}", row_line(row, &widths, style))?;
        }
        if !table.rows.is_empty() {
            writeln!(out, "{border}")?;
        }
        Ok(())
    }
}

/// Display width of a cell's text, newlines flattened.
fn text_width(text: &str) -> usize {
    UnicodeWidthStr::width(flatten(text).as_str())
}

fn flatten(text: &str) -> String {
    text.replace(['\r', '\n'], " ")
}

/// Width of the separator between two adjacent columns.
fn gap(style: &TableStyle) -> usize {
    style.padding * 2 + 1
}

fn column_count(table: TableSnapshot<'_>) -> usize {
    table
        .rows
        .iter()
        .map(|row| row.iter().map(Cell::colspan).sum::<usize>())
        .chain(std::iter::once(table.headers.len()))
        .max()
        .unwrap_or(0)
}

fn column_widths(table: TableSnapshot<'_>, style: &TableStyle) -> Vec<usize> {
    let columns = column_count(table);
    let mut widths = vec![0; columns];

    for (col, header) in table.headers.iter().enumerate() {
        widths[col] = widths[col].max(text_width(header));
    }

    let mut spanning = Vec::new();
    for row in table.rows {
        let mut col = 0;
        for cell in row {
            let span = cell.colspan().min(columns - col);
            if span == 1 {
                widths[col] = widths[col].max(text_width(cell.text()));
            } else {
                spanning.push((col, span, text_width(cell.text())));
            }
            col += span;
        }
    }

    // Widen the last spanned column when a spanning cell does not fit.
    for (col, span, width) in spanning {
        let available = spanned_width(&widths[col..col + span], style);
        if width > available {
            widths[col + span - 1] += width - available;
        }
    }

    widths
}

fn spanned_width(widths: &[usize], style: &TableStyle) -> usize {
    widths.iter().sum::<usize>() + widths.len().saturating_sub(1) * gap(style)
}

fn border_line(widths: &[usize], style: &TableStyle) -> String {
    let mut line = String::new();
    line.push(style.crossing);
    for width in widths {
        line.extend(std::iter::repeat_n(
            style.horizontal,
            width + style.padding * 2,
        ));
        line.push(style.crossing);
    }
    line
}

fn row_line(row: &[Cell], widths: &[usize], style: &TableStyle) -> String {
    let columns = widths.len();
    let pad = " ".repeat(style.padding);
    let mut line = String::new();
    line.push(style.vertical);

    let mut col = 0;
    for cell in row {
        if col >= columns {
            break;
        }
        let span = cell.colspan().min(columns - col);
        let inner = spanned_width(&widths[col..col + span], style);
        let text = flatten(cell.text());
        let fill = " ".repeat(inner.saturating_sub(text_width(&text)));
        let segment = format!("{pad}{text}{fill}{pad}");
        line.push_str(&paint(segment, cell));
        line.push(style.vertical);
        col += span;
    }

    // Short rows get empty cells
    while col < columns {
        line.push_str(&" ".repeat(widths[col] + style.padding * 2));
        line.push(style.vertical);
        col += 1;
    }
    line
}

fn paint(segment: String, cell: &Cell) -> String {
    let Cell::Styled(styled) = cell else {
        return segment;
    };
    let fg = styled.foreground.as_deref().and_then(parse_color);
    let bg = styled.background.as_deref().and_then(parse_color);
    if fg.is_none() && bg.is_none() {
        return segment;
    }

    let mut content = style(segment);
    if let Some(fg) = fg {
        content = content.with(fg);
    }
    if let Some(bg) = bg {
        content = content.on(bg);
    }
    content.to_string()
}

/// Console color names: `red` is the normal intensity, `bright-red` the
/// bright one, `default` resets. Also accepts `#rrggbb`.
pub fn parse_color(name: &str) -> Option<Color> {
    let name = name.trim().to_ascii_lowercase().replace('_', "-");

    if let Some(hex) = name.strip_prefix('#') {
        if hex.len() != 6 {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        return Some(Color::Rgb {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
        });
    }

    let color = match name.as_str() {
        "default" => Color::Reset,
        "black" => Color::Black,
        "red" => Color::DarkRed,
        "green" => Color::DarkGreen,
        "yellow" => Color::DarkYellow,
        "blue" => Color::DarkBlue,
        "magenta" => Color::DarkMagenta,
        "cyan" => Color::DarkCyan,
        "white" => Color::Grey,
        "gray" | "grey" | "bright-black" => Color::DarkGrey,
        "bright-red" => Color::Red,
        "bright-green" => Color::Green,
        "bright-yellow" => Color::Yellow,
        "bright-blue" => Color::Blue,
        "bright-magenta" => Color::Magenta,
        "bright-cyan" => Color::Cyan,
        "bright-white" => Color::White,
        // crossterm's own spelling, e.g. "dark_grey"
        other => return Color::try_from(other.replace('-', "_").as_str()).ok(),
    };
    Some(color)
}
