//! POSIX terminal handling: `termios` raw mode, `TIOCGWINSZ` for window
//! size, `isatty` for the startup TTY check.

use std::io::{self, Read};
use std::mem::MaybeUninit;

use crate::error::{Error, Result};

/// The terminal's mode as it was before raw mode was requested, restored
/// on drop.
pub struct TermGuard {
    orig: libc::termios,
}

impl Drop for TermGuard {
    fn drop(&mut self) {
        unsafe {
            libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, &self.orig);
        }
    }
}

pub fn is_tty() -> bool {
    unsafe { libc::isatty(libc::STDIN_FILENO) != 0 }
}

/// Puts stdin into raw/no-echo mode: no line buffering, no signal
/// generation from control characters, one byte at a time with no
/// minimum wait. Mirrors the original's `cfmakeraw` + immediate
/// `tcsetattr`.
pub fn enable_raw_mode() -> Result<TermGuard> {
    unsafe {
        let mut orig = MaybeUninit::<libc::termios>::uninit();
        if libc::tcgetattr(libc::STDIN_FILENO, orig.as_mut_ptr()) != 0 {
            return Err(Error::IoFailed(io::Error::last_os_error()));
        }
        let orig = orig.assume_init();

        let mut raw = orig;
        libc::cfmakeraw(&mut raw);
        raw.c_cc[libc::VMIN] = 1;
        raw.c_cc[libc::VTIME] = 0;
        if libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, &raw) != 0 {
            return Err(Error::IoFailed(io::Error::last_os_error()));
        }
        Ok(TermGuard { orig })
    }
}

pub fn window_size() -> Result<(usize, usize)> {
    unsafe {
        let mut ws = MaybeUninit::<libc::winsize>::uninit();
        if libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, ws.as_mut_ptr()) != 0 {
            return Err(Error::IoFailed(io::Error::last_os_error()));
        }
        let ws = ws.assume_init();
        Ok((ws.ws_row as usize, ws.ws_col as usize))
    }
}

pub fn read_byte(r: &mut impl Read) -> Result<Option<u8>> {
    super::read_one_byte(r)
}
