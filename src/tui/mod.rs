//! # TUI Adapter
//!
//! The terminal side of tablepick: raw mode, key reading, drawing, and the
//! interaction loop that ties them to [`SelectionState`].
//!
//! This is the only module that knows about crossterm, termios, or the
//! console API. Everything it decides with comes from `core`.
//!
//! ## Interaction Loop
//!
//! ```text
//!   Idle ──start──▶ Drawing ──drawn──▶ AwaitingKey
//!                      ▲                   │
//!                      └── Up/Down moved ──┤
//!                                          ├── Up/Down at bound, None ──▶ AwaitingKey
//!                                          ├── Enter ──▶ Terminated(index)
//!                                          └── Escape ─▶ Terminated(-1)
//! ```
//!
//! Raw mode is held by a guard for the whole loop. If it cannot be
//! acquired, the table is drawn once without interaction and the current
//! row stays available to the caller.

pub mod input;
pub mod render;
pub mod renderer;
pub mod terminal;

use log::{debug, info, warn};
use std::io::{self, Stdout, Write, stdout};
use std::time::Duration;

use crate::core::config::{DEFAULT_READ_BUFFER_SIZE, MIN_READ_BUFFER_SIZE, ResolvedConfig};
use crate::core::key::KeyEvent;
use crate::core::messages::TextProvider;
use crate::core::selection::{CANCELLED, SelectionState};
use crate::core::table::{Row, StylePair, TableSnapshot};
use crate::tui::input::{CancelToken, InputSource, KeyReader, ReadOutcome, StdinSource};
use crate::tui::render::RenderDriver;
use crate::tui::renderer::{TableRenderer, TableStyle, parse_color};
use crate::tui::terminal::TerminalMode;

/// How a `render()` call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The user pressed Enter on this row.
    Confirmed(usize),
    /// Escape, `q`, Ctrl+C, end of input, timeout, or an external cancel.
    Cancelled,
    /// Printed without interaction (batch mode, no raw mode, or no rows).
    Displayed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopState {
    Drawing,
    AwaitingKey,
    Terminated(Outcome),
}

/// A table the user picks one row from.
pub struct SelectableTable<W: Write = Stdout> {
    out: W,
    input: Box<dyn InputSource>,
    terminal: TerminalMode,
    driver: RenderDriver,
    headers: Vec<String>,
    selection: SelectionState,
    style: StylePair,
    interactive: bool,
    read_buffer_size: usize,
    timeout: Option<Duration>,
    cancel: Option<CancelToken>,
}

impl SelectableTable<Stdout> {
    /// Draws on stdout and reads keys from stdin.
    pub fn new() -> Self {
        Self::with_io(stdout(), StdinSource)
    }

    pub fn from_config(config: &ResolvedConfig) -> Self {
        let mut table = Self::new();
        table.apply_config(config);
        table
    }
}

impl Default for SelectableTable<Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> SelectableTable<W> {
    pub fn with_io(out: W, input: impl InputSource + 'static) -> Self {
        Self {
            out,
            input: Box::new(input),
            terminal: TerminalMode::for_platform(),
            driver: RenderDriver::default(),
            headers: Vec::new(),
            selection: SelectionState::new(),
            style: StylePair::default(),
            interactive: true,
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
            timeout: None,
            cancel: None,
        }
    }

    pub fn apply_config(&mut self, config: &ResolvedConfig) -> &mut Self {
        self.set_interactive(config.interactive)
            .set_selected_colors(&config.style.background, &config.style.foreground)
            .set_read_buffer_size(config.read_buffer_size)
            .set_timeout(config.timeout)
            .set_text_provider(Box::new(config.text_provider()))
    }

    // ========================================================================
    // Configuration
    // ========================================================================

    pub fn set_headers<I, S>(&mut self, headers: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.headers = headers.into_iter().map(Into::into).collect();
        self
    }

    /// Replaces the rows; the highlight goes back to the first row.
    pub fn set_rows(&mut self, rows: Vec<Row>) -> &mut Self {
        self.selection.set_rows(rows);
        self
    }

    pub fn add_row(&mut self, row: Row) -> &mut Self {
        self.selection.add_row(row);
        self
    }

    pub fn set_selected_colors(&mut self, background: &str, foreground: &str) -> &mut Self {
        self.set_selected_background(background)
            .set_selected_foreground(foreground)
    }

    pub fn set_selected_background(&mut self, color: &str) -> &mut Self {
        warn_unknown_color(color);
        self.style.background = color.to_string();
        self
    }

    pub fn set_selected_foreground(&mut self, color: &str) -> &mut Self {
        warn_unknown_color(color);
        self.style.foreground = color.to_string();
        self
    }

    /// `false` prints the table once and returns the current row.
    pub fn set_interactive(&mut self, interactive: bool) -> &mut Self {
        self.interactive = interactive;
        self
    }

    pub fn set_table_style(&mut self, table_style: TableStyle) -> &mut Self {
        self.driver.set_table_style(table_style);
        self
    }

    pub fn set_renderer(&mut self, renderer: Box<dyn TableRenderer>) -> &mut Self {
        self.driver.set_renderer(renderer);
        self
    }

    pub fn set_text_provider(&mut self, text: Box<dyn TextProvider>) -> &mut Self {
        self.driver.set_text_provider(text);
        self
    }

    pub fn set_terminal_mode(&mut self, terminal: TerminalMode) -> &mut Self {
        self.terminal = terminal;
        self
    }

    pub fn set_read_buffer_size(&mut self, size: usize) -> &mut Self {
        self.read_buffer_size = size.max(MIN_READ_BUFFER_SIZE);
        self
    }

    /// Cancels the selection after this long without a keypress.
    pub fn set_timeout(&mut self, timeout: Option<Duration>) -> &mut Self {
        self.timeout = timeout;
        self
    }

    pub fn set_cancel_token(&mut self, token: CancelToken) -> &mut Self {
        self.cancel = Some(token);
        self
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Row] {
        self.selection.rows()
    }

    pub fn style(&self) -> &StylePair {
        &self.style
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    /// `-1` after a cancel, or when there are no rows to select.
    pub fn selected_index(&self) -> isize {
        if self.selection.is_empty() {
            return CANCELLED;
        }
        self.selection.index()
    }

    pub fn selected_row(&self) -> Option<&Row> {
        self.selection.current()
    }

    pub fn into_output(self) -> W {
        self.out
    }

    // ========================================================================
    // Running
    // ========================================================================

    /// Runs the selection and returns the chosen row.
    pub fn select(&mut self) -> io::Result<Option<Row>> {
        self.render()?;
        Ok(self.selection.current().cloned())
    }

    /// Runs the selection and maps the chosen row through `on_confirm`.
    /// The callback is not called when nothing was selected.
    pub fn select_with<R, F>(&mut self, on_confirm: F) -> io::Result<Option<R>>
    where
        F: FnOnce(&Row, usize) -> R,
    {
        self.render()?;
        Ok(self
            .selection
            .selected_index()
            .zip(self.selection.current())
            .map(|(index, row)| on_confirm(row, index)))
    }

    /// Draws the table and, when interactive, runs the key loop.
    pub fn render(&mut self) -> io::Result<Outcome> {
        if !self.interactive {
            self.draw_once()?;
            return Ok(Outcome::Displayed);
        }
        if self.selection.is_empty() {
            debug!("No rows to select from, drawing once");
            self.draw_once()?;
            return Ok(Outcome::Displayed);
        }
        self.run_interactive()
    }

    fn draw_once(&mut self) -> io::Result<()> {
        let table = TableSnapshot {
            headers: &self.headers,
            rows: self.selection.rows(),
        };
        self.driver.draw_once(&mut self.out, table)
    }

    /// Clamps the index and draws one interactive frame.
    fn redraw(&mut self) -> io::Result<()> {
        redraw(
            &mut self.out,
            &self.driver,
            &self.headers,
            &mut self.selection,
            &self.style,
        )
    }

    fn run_interactive(&mut self) -> io::Result<Outcome> {
        let Self {
            out,
            input,
            terminal,
            driver,
            headers,
            selection,
            style,
            read_buffer_size,
            timeout,
            cancel,
            ..
        } = self;

        let Some(mut raw_mode) = terminal.acquire() else {
            let table = TableSnapshot {
                headers,
                rows: selection.rows(),
            };
            driver.draw_once(out, table)?;
            return Ok(Outcome::Displayed);
        };

        let mut keys = KeyReader::new(*read_buffer_size)
            .with_timeout(*timeout)
            .with_cancel(cancel.clone());

        let mut state = LoopState::Drawing;
        loop {
            state = match state {
                LoopState::Drawing => {
                    redraw(out, driver, headers, selection, style)?;
                    LoopState::AwaitingKey
                }
                LoopState::AwaitingKey => {
                    let key = match keys.next_key(&mut **input)? {
                        ReadOutcome::Key(key) => key,
                        other => {
                            info!("Selection interrupted: {:?}", other);
                            KeyEvent::Escape
                        }
                    };
                    debug!("Key: {:?} at row {}", key, selection.index());
                    match key {
                        KeyEvent::Up if selection.move_up() => LoopState::Drawing,
                        KeyEvent::Down if selection.move_down() => LoopState::Drawing,
                        KeyEvent::Enter => {
                            raw_mode.release();
                            driver.clear_screen(out)?;
                            out.flush()?;
                            LoopState::Terminated(Outcome::Confirmed(
                                selection.selected_index().unwrap_or(0),
                            ))
                        }
                        KeyEvent::Escape => {
                            raw_mode.release();
                            driver.clear_screen(out)?;
                            driver.cancellation_notice(out)?;
                            selection.cancel();
                            LoopState::Terminated(Outcome::Cancelled)
                        }
                        _ => LoopState::AwaitingKey,
                    }
                }
                LoopState::Terminated(outcome) => {
                    info!("Selection finished: {:?}", outcome);
                    return Ok(outcome);
                }
            };
        }
    }
}

fn redraw<W: Write>(
    out: &mut W,
    driver: &RenderDriver,
    headers: &[String],
    selection: &mut SelectionState,
    style: &StylePair,
) -> io::Result<()> {
    selection.clamp_to_bounds();
    let Some(index) = selection.selected_index() else {
        return Ok(());
    };
    driver.draw_full(
        out,
        TableSnapshot {
            headers,
            rows: selection.rows(),
        },
        index,
        style,
    )
}

fn warn_unknown_color(color: &str) {
    if parse_color(color).is_none() {
        warn!("Unknown color '{}', the selected row will not be colored", color);
    }
}
