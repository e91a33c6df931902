//! Raw mode through the console input mode flags on the stdin handle.

use std::io;
use windows_sys::Win32::Foundation::{HANDLE, INVALID_HANDLE_VALUE};
use windows_sys::Win32::System::Console::{
    CONSOLE_MODE, ENABLE_ECHO_INPUT, ENABLE_LINE_INPUT, ENABLE_PROCESSED_INPUT,
    ENABLE_VIRTUAL_TERMINAL_INPUT, GetConsoleMode, GetStdHandle, STD_INPUT_HANDLE,
    SetConsoleMode,
};

use super::RawModeBackend;

#[derive(Default)]
pub struct ConsoleBackend {
    saved: Option<CONSOLE_MODE>,
}

fn stdin_handle() -> io::Result<HANDLE> {
    let handle = unsafe { GetStdHandle(STD_INPUT_HANDLE) };
    if handle.is_null() || handle == INVALID_HANDLE_VALUE {
        return Err(io::Error::last_os_error());
    }
    Ok(handle)
}

impl RawModeBackend for ConsoleBackend {
    fn name(&self) -> &str {
        "console"
    }

    fn enable_raw(&mut self) -> io::Result<()> {
        let handle = stdin_handle()?;

        let mut original: CONSOLE_MODE = 0;
        if unsafe { GetConsoleMode(handle, &mut original) } == 0 {
            // Redirected stdin or no console attached
            return Err(io::Error::last_os_error());
        }

        // Keys arrive one at a time, unechoed, Ctrl+C as 0x03, arrows as ESC [ x
        let raw = (original & !(ENABLE_LINE_INPUT | ENABLE_ECHO_INPUT | ENABLE_PROCESSED_INPUT))
            | ENABLE_VIRTUAL_TERMINAL_INPUT;
        if unsafe { SetConsoleMode(handle, raw) } == 0 {
            return Err(io::Error::last_os_error());
        }

        self.saved = Some(original);
        Ok(())
    }

    fn disable_raw(&mut self) -> io::Result<()> {
        let Some(original) = self.saved.take() else {
            return Ok(());
        };
        let handle = stdin_handle()?;
        if unsafe { SetConsoleMode(handle, original) } == 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }
}
