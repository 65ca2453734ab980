//! The key remapper: folds the two platform escape-sequence dialects
//! (POSIX CSI, Windows `0xE0`) and the DEL/BS/CR variants into one
//! logical key stream, so `dispatch.rs` never has to know which
//! platform produced a byte.

use crate::error::Result;

/// A single logical keypress. Everything that isn't a recognised
/// escape sequence passes through as the raw (already DEL/BS/CR
/// normalised) byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Byte(u8),
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    Delete,
}

/// Reads raw bytes via `read_byte` and resolves them into logical keys.
/// Holds exactly one byte of lookahead, needed because a bare `ESC` (not
/// followed by `[`) must be emitted as its own key without losing the
/// byte that follows it.
#[derive(Debug, Default)]
pub struct KeyRemapper {
    pending: Option<u8>,
}

impl KeyRemapper {
    pub fn new() -> Self {
        KeyRemapper { pending: None }
    }

    fn next_raw(&mut self, read_byte: &mut impl FnMut() -> Result<Option<u8>>) -> Result<Option<u8>> {
        if let Some(b) = self.pending.take() {
            return Ok(Some(b));
        }
        read_byte()
    }

    /// Blocks (via `read_byte`) until a full logical key is resolved, or
    /// returns `Ok(None)` at EOF.
    pub fn next_key(&mut self, read_byte: &mut impl FnMut() -> Result<Option<u8>>) -> Result<Option<Key>> {
        let Some(b) = self.next_raw(read_byte)? else { return Ok(None) };
        match b {
            0x1B => self.resolve_esc(read_byte),
            0xE0 => self.resolve_windows_prefix(read_byte),
            8 | 0x7F => Ok(Some(Key::Byte(0x08))),
            b'\r' => Ok(Some(Key::Byte(b'\n'))),
            b => Ok(Some(Key::Byte(b))),
        }
    }

    fn resolve_esc(&mut self, read_byte: &mut impl FnMut() -> Result<Option<u8>>) -> Result<Option<Key>> {
        let Some(b2) = self.next_raw(read_byte)? else { return Ok(Some(Key::Byte(0x1B))) };
        if b2 != b'[' {
            self.pending = Some(b2);
            return Ok(Some(Key::Byte(0x1B)));
        }
        let Some(b3) = self.next_raw(read_byte)? else { return Ok(Some(Key::Byte(b'['))) };
        match b3 {
            b'A' => Ok(Some(Key::Up)),
            b'B' => Ok(Some(Key::Down)),
            b'C' => Ok(Some(Key::Right)),
            b'D' => Ok(Some(Key::Left)),
            b'H' => Ok(Some(Key::Home)),
            b'F' => Ok(Some(Key::End)),
            b'3' => {
                let Some(b4) = self.next_raw(read_byte)? else { return Ok(Some(Key::Byte(b'3'))) };
                if b4 == b'~' {
                    Ok(Some(Key::Delete))
                } else {
                    self.pending = Some(b4);
                    Ok(Some(Key::Byte(b'3')))
                }
            }
            other => Ok(Some(Key::Byte(other))),
        }
    }

    fn resolve_windows_prefix(&mut self, read_byte: &mut impl FnMut() -> Result<Option<u8>>) -> Result<Option<Key>> {
        let Some(b2) = self.next_raw(read_byte)? else { return Ok(Some(Key::Byte(0xE0))) };
        match b2 {
            b'H' => Ok(Some(Key::Up)),
            b'P' => Ok(Some(Key::Down)),
            b'K' => Ok(Some(Key::Left)),
            b'M' => Ok(Some(Key::Right)),
            b'G' => Ok(Some(Key::Home)),
            b'O' => Ok(Some(Key::End)),
            b'S' => Ok(Some(Key::Delete)),
            other => Ok(Some(Key::Byte(other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(bytes: &'static [u8]) -> impl FnMut() -> Result<Option<u8>> {
        let mut i = 0;
        move || {
            let b = bytes.get(i).copied();
            i += 1;
            Ok(b)
        }
    }

    #[test]
    fn posix_arrow_sequences_resolve_to_logical_keys() {
        let mut remap = KeyRemapper::new();
        let mut read = feed(b"\x1b[A\x1b[D");
        assert_eq!(remap.next_key(&mut read).unwrap(), Some(Key::Up));
        assert_eq!(remap.next_key(&mut read).unwrap(), Some(Key::Left));
    }

    #[test]
    fn posix_delete_sequence_needs_the_tilde() {
        let mut remap = KeyRemapper::new();
        let mut read = feed(b"\x1b[3~");
        assert_eq!(remap.next_key(&mut read).unwrap(), Some(Key::Delete));
    }

    #[test]
    fn windows_prefix_resolves_to_logical_keys() {
        let mut remap = KeyRemapper::new();
        let mut read = feed(b"\xe0H\xe0S");
        assert_eq!(remap.next_key(&mut read).unwrap(), Some(Key::Up));
        assert_eq!(remap.next_key(&mut read).unwrap(), Some(Key::Delete));
    }

    #[test]
    fn bare_escape_is_not_swallowed_by_the_next_keystroke() {
        let mut remap = KeyRemapper::new();
        let mut read = feed(b"\x1bxq");
        assert_eq!(remap.next_key(&mut read).unwrap(), Some(Key::Byte(0x1B)));
        assert_eq!(remap.next_key(&mut read).unwrap(), Some(Key::Byte(b'x')));
        assert_eq!(remap.next_key(&mut read).unwrap(), Some(Key::Byte(b'q')));
    }

    #[test]
    fn del_and_backspace_both_normalise_to_backspace() {
        let mut remap = KeyRemapper::new();
        let mut read = feed(&[8, 0x7F]);
        assert_eq!(remap.next_key(&mut read).unwrap(), Some(Key::Byte(0x08)));
        assert_eq!(remap.next_key(&mut read).unwrap(), Some(Key::Byte(0x08)));
    }

    #[test]
    fn carriage_return_normalises_to_newline() {
        let mut remap = KeyRemapper::new();
        let mut read = feed(b"\r");
        assert_eq!(remap.next_key(&mut read).unwrap(), Some(Key::Byte(b'\n')));
    }
}
