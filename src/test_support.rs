//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::{self, Write};
use std::rc::Rc;
use std::time::Duration;

use crate::core::table::{Row, TableSnapshot};
use crate::tui::SelectableTable;
use crate::tui::input::InputSource;
use crate::tui::renderer::{TableRenderer, TableStyle};
use crate::tui::terminal::{HostManagedBackend, RawModeBackend, TerminalMode};

/// Input that hands out one scripted chunk per read, then end of input.
///
/// Polls report ready while chunks remain. Once the script runs out, a
/// poll waits out its timeout and reports nothing, like an idle terminal.
pub struct ScriptedInput {
    chunks: VecDeque<Vec<u8>>,
}

impl ScriptedInput {
    pub fn new<'a>(chunks: impl IntoIterator<Item = &'a [u8]>) -> Self {
        Self {
            chunks: chunks.into_iter().map(<[u8]>::to_vec).collect(),
        }
    }

    /// Never produces a byte; every poll waits out its timeout.
    pub fn silent() -> Self {
        Self {
            chunks: VecDeque::new(),
        }
    }
}

impl InputSource for ScriptedInput {
    fn read_chunk(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let Some(mut chunk) = self.chunks.pop_front() else {
            return Ok(0);
        };
        let n = chunk.len().min(buf.len());
        buf[..n].copy_from_slice(&chunk[..n]);
        if n < chunk.len() {
            self.chunks.push_front(chunk.split_off(n));
        }
        Ok(n)
    }

    fn poll_ready(&mut self, timeout: Duration) -> io::Result<bool> {
        if self.chunks.is_empty() {
            std::thread::sleep(timeout);
            return Ok(false);
        }
        Ok(true)
    }
}

/// Shared view of the calls a [`RecordingBackend`] received.
#[derive(Clone, Default)]
pub struct CallLog(Rc<RefCell<Vec<&'static str>>>);

impl CallLog {
    pub fn calls(&self) -> Vec<&'static str> {
        self.0.borrow().clone()
    }

    fn push(&self, call: &'static str) {
        self.0.borrow_mut().push(call);
    }
}

/// Raw-mode backend that records enable/disable instead of touching a tty.
#[derive(Default)]
pub struct RecordingBackend {
    log: CallLog,
    fail_enable: bool,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail_enable: true,
            ..Self::default()
        }
    }

    pub fn log(&self) -> CallLog {
        self.log.clone()
    }
}

impl RawModeBackend for RecordingBackend {
    fn name(&self) -> &str {
        "recording"
    }

    fn enable_raw(&mut self) -> io::Result<()> {
        self.log.push("enable");
        if self.fail_enable {
            return Err(io::Error::new(io::ErrorKind::Other, "not a terminal"));
        }
        Ok(())
    }

    fn disable_raw(&mut self) -> io::Result<()> {
        self.log.push("disable");
        Ok(())
    }
}

/// One table handed to a [`RecordingRenderer`].
#[derive(Debug, Clone)]
pub struct RenderCall {
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
}

/// Renderer that keeps a copy of every table instead of drawing it.
#[derive(Default)]
pub struct RecordingRenderer {
    calls: Rc<RefCell<Vec<RenderCall>>>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Rc<RefCell<Vec<RenderCall>>> {
        Rc::clone(&self.calls)
    }
}

impl TableRenderer for RecordingRenderer {
    fn render(
        &self,
        _out: &mut dyn Write,
        table: TableSnapshot<'_>,
        _style: &TableStyle,
    ) -> io::Result<()> {
        self.calls.borrow_mut().push(RenderCall {
            headers: table.headers.to_vec(),
            rows: table.rows.to_vec(),
        });
        Ok(())
    }
}

/// Interactive table writing into memory and reading `script` as one chunk.
pub fn scripted_table(script: &[u8]) -> SelectableTable<Vec<u8>> {
    let mut table = SelectableTable::with_io(Vec::new(), ScriptedInput::new([script]));
    table.set_terminal_mode(TerminalMode::with_backend(Box::new(HostManagedBackend)));
    table
}
