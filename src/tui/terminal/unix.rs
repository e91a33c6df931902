//! Raw mode through the termios line discipline on stdin.

use crossterm::tty::IsTty;
use nix::sys::termios::{self, LocalFlags, SetArg, SpecialCharacterIndices, Termios};
use std::io;

use super::RawModeBackend;

#[derive(Default)]
pub struct TermiosBackend {
    saved: Option<Termios>,
}

impl RawModeBackend for TermiosBackend {
    fn name(&self) -> &str {
        "termios"
    }

    fn enable_raw(&mut self) -> io::Result<()> {
        if !io::stdin().is_tty() {
            return Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "stdin is not a terminal",
            ));
        }

        let original =
            termios::tcgetattr(io::stdin()).map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

        let mut raw = original.clone();

        // No line buffering, no echo; Ctrl+C arrives as 0x03 instead of SIGINT
        raw.local_flags.remove(LocalFlags::ICANON);
        raw.local_flags.remove(LocalFlags::ECHO);
        raw.local_flags.remove(LocalFlags::ISIG);
        raw.local_flags.remove(LocalFlags::IEXTEN);

        // Block until at least one byte, no inter-byte timer
        raw.control_chars[SpecialCharacterIndices::VMIN as usize] = 1;
        raw.control_chars[SpecialCharacterIndices::VTIME as usize] = 0;

        termios::tcsetattr(io::stdin(), SetArg::TCSANOW, &raw)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

        self.saved = Some(original);
        Ok(())
    }

    fn disable_raw(&mut self) -> io::Result<()> {
        let Some(original) = self.saved.take() else {
            return Ok(());
        };
        termios::tcsetattr(io::stdin(), SetArg::TCSANOW, &original)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))
    }
}
