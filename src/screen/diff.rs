//! The diff renderer: walks `next` against `current`, emitting only the
//! cursor moves and characters needed to bring the physical terminal up
//! to date, then swaps the two virtual screens.

use std::io::{self, Write};

use super::grid::ScreenPair;

/// ANSI escapes. Rows and columns in `MOVE_CURSOR` are 1-based.
const CLEAR_SCREEN: &[u8] = b"\x1b[2J";

fn move_cursor(out: &mut impl Write, row: usize, col: usize) -> io::Result<()> {
    write!(out, "\x1b[{};{}H", row + 1, col + 1)
}

/// Emits the minimal set of writes that turn the terminal's current
/// contents into `screen.next()`, positions the physical cursor at the
/// logical cursor, and swaps `next`/`current` so this frame becomes the
/// new baseline.
pub fn paint_diff(screen: &mut ScreenPair, out: &mut impl Write) -> io::Result<()> {
    let width = screen.width();
    if width == 0 {
        return Ok(());
    }
    let next = screen.next();
    let current = screen.current();
    let mut in_position = false;
    for (i, (&n, &c)) in next.iter().zip(current.iter()).enumerate() {
        if n != c {
            if !in_position {
                move_cursor(out, i / width, i % width)?;
                in_position = true;
            }
            out.write_all(&[n])?;
        } else {
            in_position = false;
        }
    }
    let (row, col) = screen.cursor();
    move_cursor(out, row, col)?;
    out.flush()?;
    screen.swap();
    Ok(())
}

/// Issues a physical clear-screen, used whenever the virtual current
/// screen was just hard-cleared (terminal resize, explicit redraw).
pub fn hard_clear(out: &mut impl Write) -> io::Result<()> {
    out.write_all(CLEAR_SCREEN)?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_changed_cells_are_repainted() {
        let mut screen = ScreenPair::new();
        screen.resize(2, 4, true);
        screen.next_mut().copy_from_slice(b"ab  cd  ");
        // "current" starts as all spaces from resize(.., true).
        let mut out = Vec::new();
        paint_diff(&mut screen, &mut out).unwrap();
        let rendered = String::from_utf8(out).unwrap();
        assert!(rendered.contains('a'));
        assert!(rendered.contains("\x1b[1;1H"));
    }

    #[test]
    fn unchanged_frame_only_moves_the_cursor() {
        let mut screen = ScreenPair::new();
        screen.resize(2, 4, true);
        let mut out = Vec::new();
        paint_diff(&mut screen, &mut out).unwrap();
        assert!(!out.is_empty());
        let mut out2 = Vec::new();
        paint_diff(&mut screen, &mut out2).unwrap();
        // No cell differs between next and current on the second pass,
        // so only the cursor-position escape should appear.
        assert_eq!(out2.iter().filter(|&&b| b == 0x1b).count(), 1);
    }
}
