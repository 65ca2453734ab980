//! Windows console handling: console-mode raw input, virtual-terminal
//! output processing so ANSI escapes work, and `GetConsoleScreenBufferInfo`
//! for window size.

use std::io::{self, Read};

use winapi::shared::minwindef::DWORD;
use winapi::um::consoleapi::{GetConsoleMode, SetConsoleMode};
use winapi::um::handleapi::INVALID_HANDLE_VALUE;
use winapi::um::processenv::GetStdHandle;
use winapi::um::winbase::{STD_INPUT_HANDLE, STD_OUTPUT_HANDLE};
use winapi::um::wincon::{
    GetConsoleScreenBufferInfo, CONSOLE_SCREEN_BUFFER_INFO, ENABLE_ECHO_INPUT, ENABLE_LINE_INPUT,
    ENABLE_PROCESSED_INPUT, ENABLE_VIRTUAL_TERMINAL_PROCESSING,
};

use crate::error::{Error, Result};

/// The input and output console modes as they were before raw mode was
/// requested, restored on drop.
pub struct TermGuard {
    stdin_mode: DWORD,
    stdout_mode: DWORD,
}

impl Drop for TermGuard {
    fn drop(&mut self) {
        unsafe {
            let stdin = GetStdHandle(STD_INPUT_HANDLE);
            if stdin != INVALID_HANDLE_VALUE {
                SetConsoleMode(stdin, self.stdin_mode);
            }
            let stdout = GetStdHandle(STD_OUTPUT_HANDLE);
            if stdout != INVALID_HANDLE_VALUE {
                SetConsoleMode(stdout, self.stdout_mode);
            }
        }
    }
}

pub fn is_tty() -> bool {
    unsafe {
        let stdin = GetStdHandle(STD_INPUT_HANDLE);
        if stdin == INVALID_HANDLE_VALUE {
            return false;
        }
        let mut mode: DWORD = 0;
        GetConsoleMode(stdin, &mut mode) != 0
    }
}

/// Clears line/echo/signal processing on the input handle so keys arrive
/// one at a time, and requests `ENABLE_VIRTUAL_TERMINAL_PROCESSING` on
/// the output handle so the diff renderer's ANSI escapes are honoured.
pub fn enable_raw_mode() -> Result<TermGuard> {
    unsafe {
        let stdin = GetStdHandle(STD_INPUT_HANDLE);
        if stdin == INVALID_HANDLE_VALUE {
            return Err(Error::IoFailed(io::Error::last_os_error()));
        }
        let mut stdin_mode: DWORD = 0;
        if GetConsoleMode(stdin, &mut stdin_mode) == 0 {
            return Err(Error::IoFailed(io::Error::last_os_error()));
        }
        let raw_input_mode = stdin_mode & !(ENABLE_LINE_INPUT | ENABLE_ECHO_INPUT | ENABLE_PROCESSED_INPUT);
        if SetConsoleMode(stdin, raw_input_mode) == 0 {
            return Err(Error::IoFailed(io::Error::last_os_error()));
        }

        let stdout = GetStdHandle(STD_OUTPUT_HANDLE);
        if stdout == INVALID_HANDLE_VALUE {
            return Err(Error::IoFailed(io::Error::last_os_error()));
        }
        let mut stdout_mode: DWORD = 0;
        if GetConsoleMode(stdout, &mut stdout_mode) == 0 {
            return Err(Error::IoFailed(io::Error::last_os_error()));
        }
        let vt_mode = stdout_mode | ENABLE_VIRTUAL_TERMINAL_PROCESSING;
        if SetConsoleMode(stdout, vt_mode) == 0 {
            return Err(Error::IoFailed(io::Error::last_os_error()));
        }

        Ok(TermGuard { stdin_mode, stdout_mode })
    }
}

pub fn window_size() -> Result<(usize, usize)> {
    unsafe {
        let stdout = GetStdHandle(STD_OUTPUT_HANDLE);
        if stdout == INVALID_HANDLE_VALUE {
            return Err(Error::IoFailed(io::Error::last_os_error()));
        }
        let mut info: CONSOLE_SCREEN_BUFFER_INFO = std::mem::zeroed();
        if GetConsoleScreenBufferInfo(stdout, &mut info) == 0 {
            return Err(Error::IoFailed(io::Error::last_os_error()));
        }
        let width = (info.srWindow.Right - info.srWindow.Left + 1).max(0) as usize;
        let height = (info.srWindow.Bottom - info.srWindow.Top + 1).max(0) as usize;
        Ok((height, width))
    }
}

pub fn read_byte(r: &mut impl Read) -> Result<Option<u8>> {
    super::read_one_byte(r)
}
