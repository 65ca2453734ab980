//! The terminal driver (raw-mode acquisition, window-size queries,
//! byte-at-a-time key reads), split by platform the way the rest of the
//! crate's `cfg(unix)`/`cfg(windows)` dependencies already are.

#[cfg(unix)]
mod unix;
#[cfg(windows)]
mod windows;

#[cfg(unix)]
use unix as imp;
#[cfg(windows)]
use windows as imp;

use std::io::{self, Read};

use crate::error::{Error, Result};

/// Scoped raw-mode acquisition. The terminal's original mode is restored
/// when this value is dropped, so a bug anywhere in the dispatch loop
/// unwinds through one teardown path instead of leaving a shell in raw
/// mode behind it.
pub struct Terminal {
    guard: imp::TermGuard,
}

impl Terminal {
    /// Acquires raw mode on stdin/stdout. Fails if stdin is not a TTY —
    /// the editor refuses to run otherwise.
    pub fn acquire() -> Result<Self> {
        if !imp::is_tty() {
            return Err(Error::IoFailed(io::Error::new(io::ErrorKind::Other, "stdin is not a tty")));
        }
        Ok(Terminal { guard: imp::enable_raw_mode()? })
    }

    /// Current `(rows, cols)`. Queried once per frame; a changed result
    /// drives a forced hard clear in the composer.
    pub fn size(&self) -> Result<(usize, usize)> {
        imp::window_size()
    }

    /// Blocks for exactly one byte from stdin. `Ok(None)` means stdin hit
    /// EOF; a transient interrupt is retried internally, never surfaced.
    pub fn read_byte(&mut self) -> Result<Option<u8>> {
        let _ = &self.guard;
        imp::read_byte(&mut io::stdin())
    }
}

/// Reads one byte from `r`, retrying on `Interrupted`. Shared between
/// platforms since neither's "read a key" primitive is more than this
/// once raw mode is in effect.
fn read_one_byte(r: &mut impl Read) -> Result<Option<u8>> {
    let mut buf = [0u8; 1];
    loop {
        match r.read(&mut buf) {
            Ok(0) => return Ok(None),
            Ok(_) => return Ok(Some(buf[0])),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(Error::IoFailed(e)),
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn read_one_byte_returns_each_byte_in_order() {
        let mut cursor = io::Cursor::new(b"ab".to_vec());
        assert_eq!(read_one_byte(&mut cursor).unwrap(), Some(b'a'));
        assert_eq!(read_one_byte(&mut cursor).unwrap(), Some(b'b'));
        assert_eq!(read_one_byte(&mut cursor).unwrap(), None);
    }
}
