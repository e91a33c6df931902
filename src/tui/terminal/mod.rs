//! # Terminal Mode Controller
//!
//! Owns the switch between cooked and raw input for the length of one
//! interaction loop. The only way in is [`TerminalMode::acquire`], which
//! hands back a [`RawModeGuard`]; dropping the guard (normal return, `?`
//! early return, or panic unwind) restores the mode that was active before.
//!
//! Failures never escape this module. If raw mode cannot be set, `acquire`
//! returns `None` and the caller falls back to a single non-interactive draw.

use log::{debug, info, warn};
use std::io;

#[cfg(unix)]
mod unix;
#[cfg(windows)]
mod windows;

#[cfg(unix)]
pub use unix::TermiosBackend;
#[cfg(windows)]
pub use windows::ConsoleBackend;

/// A platform way of toggling raw input.
///
/// `enable_raw` saves whatever mode is current; `disable_raw` writes that
/// saved mode back verbatim and is a no-op when nothing was saved.
pub trait RawModeBackend {
    fn name(&self) -> &str;
    fn enable_raw(&mut self) -> io::Result<()>;
    fn disable_raw(&mut self) -> io::Result<()>;
}

/// For hosts that already drive the terminal themselves (or tests that
/// read from memory). Never touches the terminal.
#[derive(Debug, Default)]
pub struct HostManagedBackend;

impl RawModeBackend for HostManagedBackend {
    fn name(&self) -> &str {
        "host-managed"
    }

    fn enable_raw(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn disable_raw(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Backend for targets with no known raw-mode interface.
#[derive(Debug, Default)]
pub struct UnsupportedBackend;

impl RawModeBackend for UnsupportedBackend {
    fn name(&self) -> &str {
        "unsupported"
    }

    fn enable_raw(&mut self) -> io::Result<()> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "raw mode is not available on this platform",
        ))
    }

    fn disable_raw(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub struct TerminalMode {
    backend: Box<dyn RawModeBackend>,
}

impl TerminalMode {
    /// Picks the backend for the current platform.
    pub fn for_platform() -> Self {
        #[cfg(unix)]
        let backend: Box<dyn RawModeBackend> = Box::new(TermiosBackend::default());
        #[cfg(windows)]
        let backend: Box<dyn RawModeBackend> = Box::new(ConsoleBackend::default());
        #[cfg(not(any(unix, windows)))]
        let backend: Box<dyn RawModeBackend> = Box::new(UnsupportedBackend);

        Self::with_backend(backend)
    }

    pub fn with_backend(backend: Box<dyn RawModeBackend>) -> Self {
        Self { backend }
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Enters raw mode. `None` means the run must stay non-interactive.
    pub fn acquire(&mut self) -> Option<RawModeGuard<'_>> {
        match self.backend.enable_raw() {
            Ok(()) => {
                info!("Raw mode enabled ({})", self.backend.name());
                Some(RawModeGuard {
                    backend: self.backend.as_mut(),
                    released: false,
                })
            }
            Err(e) => {
                warn!(
                    "Raw mode unavailable ({}): {}; falling back to a single draw",
                    self.backend.name(),
                    e
                );
                // Undo any partial change the backend made before failing.
                if let Err(e) = self.backend.disable_raw() {
                    debug!("Nothing to undo after failed enable: {}", e);
                }
                None
            }
        }
    }
}

impl Default for TerminalMode {
    fn default() -> Self {
        Self::for_platform()
    }
}

/// Raw mode held for as long as this guard lives.
pub struct RawModeGuard<'a> {
    backend: &'a mut dyn RawModeBackend,
    released: bool,
}

impl RawModeGuard<'_> {
    /// Restores the previous mode. Safe to call more than once.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        match self.backend.disable_raw() {
            Ok(()) => info!("Raw mode restored ({})", self.backend.name()),
            Err(e) => warn!("Failed to restore terminal mode: {}", e),
        }
    }

    pub fn is_released(&self) -> bool {
        self.released
    }
}

impl Drop for RawModeGuard<'_> {
    fn drop(&mut self) {
        if !self.released {
            debug!("Raw mode guard dropped while held");
        }
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::RecordingBackend;

    #[test]
    fn test_acquire_and_release() {
        let backend = RecordingBackend::new();
        let log = backend.log();
        let mut mode = TerminalMode::with_backend(Box::new(backend));
        {
            let mut guard = mode.acquire().expect("raw mode");
            guard.release();
            guard.release();
            assert!(guard.is_released());
        }
        assert_eq!(log.calls(), vec!["enable", "disable"]);
    }

    #[test]
    fn test_drop_restores() {
        let backend = RecordingBackend::new();
        let log = backend.log();
        let mut mode = TerminalMode::with_backend(Box::new(backend));
        let guard = mode.acquire();
        assert!(guard.is_some());
        drop(guard);
        assert_eq!(log.calls(), vec!["enable", "disable"]);
    }

    #[test]
    fn test_panic_unwind_restores() {
        let backend = RecordingBackend::new();
        let log = backend.log();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let mut mode = TerminalMode::with_backend(Box::new(backend));
            let _guard = mode.acquire();
            panic!("loop blew up");
        }));
        assert!(result.is_err());
        assert_eq!(log.calls(), vec!["enable", "disable"]);
    }

    #[test]
    fn test_failed_enable_returns_none() {
        let backend = RecordingBackend::failing();
        let log = backend.log();
        let mut mode = TerminalMode::with_backend(Box::new(backend));
        assert!(mode.acquire().is_none());
        assert_eq!(log.calls(), vec!["enable", "disable"]);
    }

    #[test]
    fn test_unsupported_backend() {
        let mut mode = TerminalMode::with_backend(Box::new(UnsupportedBackend));
        assert!(mode.acquire().is_none());
        assert_eq!(mode.backend_name(), "unsupported");
    }

    #[test]
    fn test_host_managed_backend() {
        let mut mode = TerminalMode::with_backend(Box::new(HostManagedBackend));
        assert!(mode.acquire().is_some());
    }
}
