//! # Input Sources
//!
//! Byte streams the interaction loop reads keys from, plus the
//! cancellation hook checked between reads.
//!
//! `read_chunk` blocks until bytes arrive. `poll_ready` lets the loop wake
//! up periodically to notice a [`CancelToken`] or an idle timeout; sources
//! that cannot poll report "ready" and the loop simply blocks in the read.

use log::debug;
use std::io::{self, Read};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::core::key::{KeyEvent, decode, is_incomplete, key_len};

pub trait InputSource {
    /// Blocking read of up to `buf.len()` bytes. `Ok(0)` is end of input.
    fn read_chunk(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Waits up to `timeout` for input. `Ok(false)` means nothing arrived.
    fn poll_ready(&mut self, _timeout: Duration) -> io::Result<bool> {
        Ok(true)
    }
}

/// The process's standard input.
#[derive(Debug, Default)]
pub struct StdinSource;

impl InputSource for StdinSource {
    fn read_chunk(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        // Unbuffered: a buffered reader could swallow keys past this chunk
        #[cfg(unix)]
        {
            loop {
                match nix::unistd::read(nix::libc::STDIN_FILENO, buf) {
                    Ok(n) => return Ok(n),
                    Err(nix::errno::Errno::EINTR) => continue,
                    Err(e) => return Err(io::Error::new(io::ErrorKind::Other, e)),
                }
            }
        }
        #[cfg(windows)]
        {
            console::read(buf)
        }
        #[cfg(not(any(unix, windows)))]
        {
            io::stdin().read(buf)
        }
    }

    #[cfg(unix)]
    fn poll_ready(&mut self, timeout: Duration) -> io::Result<bool> {
        use nix::poll::{PollFd, PollFlags, poll};
        use std::os::fd::AsFd;

        let stdin = io::stdin();
        let borrowed_fd = stdin.as_fd();
        let mut fds = [PollFd::new(&borrowed_fd, PollFlags::POLLIN)];
        let timeout_ms = i32::try_from(timeout.as_millis()).unwrap_or(i32::MAX);
        match poll(&mut fds, timeout_ms) {
            Ok(n) => Ok(n > 0
                && fds[0]
                    .revents()
                    .is_some_and(|r| r.intersects(PollFlags::POLLIN | PollFlags::POLLHUP))),
            Err(nix::errno::Errno::EINTR) => Ok(false),
            Err(e) => Err(io::Error::new(io::ErrorKind::Other, e)),
        }
    }

    #[cfg(windows)]
    fn poll_ready(&mut self, timeout: Duration) -> io::Result<bool> {
        console::wait_for_key(timeout)
    }
}

/// Console stdin read and polled through the same input queue.
#[cfg(windows)]
mod console {
    use std::io;
    use std::time::{Duration, Instant};
    use windows_sys::Win32::Foundation::{
        ERROR_BROKEN_PIPE, HANDLE, INVALID_HANDLE_VALUE, WAIT_FAILED, WAIT_OBJECT_0,
    };
    use windows_sys::Win32::Storage::FileSystem::ReadFile;
    use windows_sys::Win32::System::Console::{
        GetStdHandle, INPUT_RECORD, KEY_EVENT, PeekConsoleInputW, ReadConsoleInputW,
        STD_INPUT_HANDLE,
    };
    use windows_sys::Win32::System::Threading::WaitForSingleObject;

    fn stdin_handle() -> io::Result<HANDLE> {
        let handle = unsafe { GetStdHandle(STD_INPUT_HANDLE) };
        if handle.is_null() || handle == INVALID_HANDLE_VALUE {
            return Err(io::Error::last_os_error());
        }
        Ok(handle)
    }

    pub fn read(buf: &mut [u8]) -> io::Result<usize> {
        let handle = stdin_handle()?;
        let len = u32::try_from(buf.len()).unwrap_or(u32::MAX);
        let mut read = 0u32;
        let ok = unsafe {
            ReadFile(
                handle,
                buf.as_mut_ptr(),
                len,
                &mut read,
                std::ptr::null_mut(),
            )
        };
        if ok == 0 {
            let err = io::Error::last_os_error();
            // Writer side of a pipe closed
            if err.raw_os_error() == Some(ERROR_BROKEN_PIPE as i32) {
                return Ok(0);
            }
            return Err(err);
        }
        Ok(read as usize)
    }

    /// Waits until a key press is at the front of the console queue.
    ///
    /// Key releases, focus and mouse records signal the handle but never
    /// produce bytes, so they are discarded here. Otherwise the read that
    /// follows would block past the caller's deadline.
    pub fn wait_for_key(timeout: Duration) -> io::Result<bool> {
        let handle = stdin_handle()?;
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let wait_ms = u32::try_from(remaining.as_millis()).unwrap_or(u32::MAX - 1);
            match unsafe { WaitForSingleObject(handle, wait_ms) } {
                WAIT_OBJECT_0 => {}
                WAIT_FAILED => return Err(io::Error::last_os_error()),
                _ => return Ok(false),
            }

            let mut record: INPUT_RECORD = unsafe { std::mem::zeroed() };
            let mut count = 0u32;
            if unsafe { PeekConsoleInputW(handle, &mut record, 1, &mut count) } == 0 {
                // Not a console (pipe or file); the read reports what it finds
                return Ok(true);
            }
            if count > 0 {
                if is_key_press(&record) {
                    return Ok(true);
                }
                unsafe { ReadConsoleInputW(handle, &mut record, 1, &mut count) };
            }
            if remaining.is_zero() {
                return Ok(false);
            }
        }
    }

    fn is_key_press(record: &INPUT_RECORD) -> bool {
        if record.EventType as u32 != KEY_EVENT as u32 {
            return false;
        }
        let key = unsafe { record.Event.KeyEvent };
        key.bKeyDown != 0 && unsafe { key.uChar.UnicodeChar } != 0
    }
}

/// Any reader as an input source: pipes, files, in-memory scripts.
pub struct ReaderSource<R> {
    reader: R,
}

impl<R: Read> ReaderSource<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: Read> InputSource for ReaderSource<R> {
    fn read_chunk(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        loop {
            match self.reader.read(buf) {
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                other => return other,
            }
        }
    }
}

/// Shared flag that aborts a running selection from outside the loop.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Why the loop stopped getting keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    Key(KeyEvent),
    EndOfInput,
    TimedOut,
    Aborted,
}

/// How often a cancellable read wakes up to check the token.
const POLL_TICK: Duration = Duration::from_millis(100);

/// How long to wait for the rest of a sequence cut by a full read.
const SEQUENCE_GRACE: Duration = Duration::from_millis(50);

/// Reads chunks from a source and yields one decoded key at a time.
///
/// Bytes left over after the first key in a chunk are kept for the next
/// call, so keys typed ahead or delivered together are not lost. When a
/// read fills the buffer and ends partway through a sequence, the tail is
/// held until the next read completes it.
pub struct KeyReader {
    buf: Vec<u8>,
    pending: Vec<u8>,
    last_read_full: bool,
    timeout: Option<Duration>,
    cancel: Option<CancelToken>,
}

impl KeyReader {
    pub fn new(read_buffer_size: usize) -> Self {
        Self {
            buf: vec![0; read_buffer_size.max(1)],
            pending: Vec::new(),
            last_read_full: false,
            timeout: None,
            cancel: None,
        }
    }

    /// Idle time after which `next_key` gives up.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_cancel(mut self, cancel: Option<CancelToken>) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn next_key(&mut self, input: &mut dyn InputSource) -> io::Result<ReadOutcome> {
        let deadline = self.timeout.map(|t| Instant::now() + t);
        loop {
            if let Some(key) = self.take_pending() {
                return Ok(ReadOutcome::Key(key));
            }

            // Held tail with nothing following it: decode it as it stands
            if !self.pending.is_empty() && !input.poll_ready(SEQUENCE_GRACE)? {
                return Ok(ReadOutcome::Key(self.flush_pending()));
            }

            if self.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
                return Ok(ReadOutcome::Aborted);
            }

            if self.pending.is_empty() && (self.timeout.is_some() || self.cancel.is_some()) {
                let wait = match deadline {
                    Some(deadline) => {
                        let now = Instant::now();
                        if now >= deadline {
                            return Ok(ReadOutcome::TimedOut);
                        }
                        (deadline - now).min(POLL_TICK)
                    }
                    None => POLL_TICK,
                };
                if !input.poll_ready(wait)? {
                    continue;
                }
            }

            let n = input.read_chunk(&mut self.buf)?;
            self.last_read_full = n == self.buf.len();
            if n == 0 {
                if !self.pending.is_empty() {
                    return Ok(ReadOutcome::Key(self.flush_pending()));
                }
                return Ok(ReadOutcome::EndOfInput);
            }
            debug!("Read {} bytes: {:02x?}", n, &self.buf[..n]);
            self.pending.extend_from_slice(&self.buf[..n]);
        }
    }

    fn take_pending(&mut self) -> Option<KeyEvent> {
        let len = key_len(&self.pending);
        if len == 0 {
            return None;
        }
        if len == self.pending.len() && self.last_read_full && is_incomplete(&self.pending) {
            debug!("Holding cut sequence {:02x?}", self.pending);
            return None;
        }
        let key = decode(&self.pending[..len]);
        self.pending.drain(..len);
        Some(key)
    }

    fn flush_pending(&mut self) -> KeyEvent {
        let key = decode(&self.pending);
        self.pending.clear();
        key
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedInput;
    use std::io::Cursor;

    fn keys_from(bytes: &[u8]) -> Vec<ReadOutcome> {
        let mut input = ReaderSource::new(Cursor::new(bytes.to_vec()));
        let mut reader = KeyReader::new(16);
        let mut out = Vec::new();
        loop {
            let outcome = reader.next_key(&mut input).unwrap();
            out.push(outcome);
            if !matches!(outcome, ReadOutcome::Key(_)) {
                return out;
            }
        }
    }

    #[test]
    fn test_single_chunk_with_several_keys() {
        assert_eq!(
            keys_from(b"\x1b[B\x1b[B\r"),
            vec![
                ReadOutcome::Key(KeyEvent::Down),
                ReadOutcome::Key(KeyEvent::Down),
                ReadOutcome::Key(KeyEvent::Enter),
                ReadOutcome::EndOfInput,
            ]
        );
    }

    #[test]
    fn test_noise_bytes_decode_to_none() {
        assert_eq!(
            keys_from(b"xy"),
            vec![
                ReadOutcome::Key(KeyEvent::None),
                ReadOutcome::Key(KeyEvent::None),
                ReadOutcome::EndOfInput,
            ]
        );
    }

    #[test]
    fn test_small_buffer_still_sees_whole_sequence() {
        let mut input = ReaderSource::new(Cursor::new(b"x\x1b[A".to_vec()));
        let mut reader = KeyReader::new(3);
        assert_eq!(
            reader.next_key(&mut input).unwrap(),
            ReadOutcome::Key(KeyEvent::None)
        );
        assert_eq!(
            reader.next_key(&mut input).unwrap(),
            ReadOutcome::Key(KeyEvent::Up)
        );
    }

    #[test]
    fn test_chunks_delivered_separately() {
        let mut input = ScriptedInput::new([&b"\x1b"[..], &b"[A"[..]]);
        let mut reader = KeyReader::new(16);
        // A lone ESC read is a real Escape keypress
        assert_eq!(
            reader.next_key(&mut input).unwrap(),
            ReadOutcome::Key(KeyEvent::Escape)
        );
        assert_eq!(
            reader.next_key(&mut input).unwrap(),
            ReadOutcome::Key(KeyEvent::Up)
        );
        assert_eq!(reader.next_key(&mut input).unwrap(), ReadOutcome::EndOfInput);
    }

    #[test]
    fn test_full_read_ending_in_escape_waits_for_rest() {
        let mut script = b"\x1b[B".repeat(6);
        script.push(b'\r');
        let outcomes = keys_from(&script);
        assert_eq!(outcomes.len(), 8);
        assert!(outcomes[..6].iter().all(|k| *k == ReadOutcome::Key(KeyEvent::Down)));
        assert_eq!(outcomes[6], ReadOutcome::Key(KeyEvent::Enter));
    }

    #[test]
    fn test_full_read_ending_in_csi_prefix_waits_for_final_byte() {
        let mut input = ScriptedInput::new([&b"q\x1b["[..], &b"A"[..]]);
        let mut reader = KeyReader::new(3);
        assert_eq!(
            reader.next_key(&mut input).unwrap(),
            ReadOutcome::Key(KeyEvent::Escape)
        );
        assert_eq!(
            reader.next_key(&mut input).unwrap(),
            ReadOutcome::Key(KeyEvent::Up)
        );
    }

    #[test]
    fn test_cut_legacy_triple_is_joined() {
        let mut input = ScriptedInput::new([&[0x00, 0xE0][..], &[0x50][..]]);
        let mut reader = KeyReader::new(2);
        assert_eq!(
            reader.next_key(&mut input).unwrap(),
            ReadOutcome::Key(KeyEvent::Down)
        );
    }

    #[test]
    fn test_held_escape_with_nothing_after_is_escape() {
        let mut input = ScriptedInput::new([&b"\x1b[B\x1b"[..]]);
        let mut reader = KeyReader::new(4);
        assert_eq!(
            reader.next_key(&mut input).unwrap(),
            ReadOutcome::Key(KeyEvent::Down)
        );
        assert_eq!(
            reader.next_key(&mut input).unwrap(),
            ReadOutcome::Key(KeyEvent::Escape)
        );
    }

    #[test]
    fn test_held_tail_decoded_at_end_of_input() {
        let mut input = ReaderSource::new(Cursor::new(b"\x1b[B\x1b".to_vec()));
        let mut reader = KeyReader::new(4);
        assert_eq!(
            reader.next_key(&mut input).unwrap(),
            ReadOutcome::Key(KeyEvent::Down)
        );
        assert_eq!(
            reader.next_key(&mut input).unwrap(),
            ReadOutcome::Key(KeyEvent::Escape)
        );
        assert_eq!(reader.next_key(&mut input).unwrap(), ReadOutcome::EndOfInput);
    }

    #[test]
    fn test_cancel_token_aborts() {
        let token = CancelToken::new();
        token.cancel();
        let mut input = ScriptedInput::silent();
        let mut reader = KeyReader::new(16).with_cancel(Some(token));
        assert_eq!(reader.next_key(&mut input).unwrap(), ReadOutcome::Aborted);
    }

    #[test]
    fn test_timeout_expires() {
        let mut input = ScriptedInput::silent();
        let mut reader = KeyReader::new(16).with_timeout(Some(Duration::from_millis(30)));
        assert_eq!(reader.next_key(&mut input).unwrap(), ReadOutcome::TimedOut);
    }

    #[test]
    fn test_pending_keys_served_before_timeout_check() {
        let mut input = ScriptedInput::new([&b"\x1b[B\r"[..]]);
        let mut reader = KeyReader::new(16).with_timeout(Some(Duration::from_secs(5)));
        assert_eq!(
            reader.next_key(&mut input).unwrap(),
            ReadOutcome::Key(KeyEvent::Down)
        );
        assert_eq!(
            reader.next_key(&mut input).unwrap(),
            ReadOutcome::Key(KeyEvent::Enter)
        );
    }

    #[test]
    fn test_cancel_token_is_shared() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!token.is_cancelled());
        clone.cancel();
        assert!(token.is_cancelled());
    }
}
