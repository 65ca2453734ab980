//! The screen composer: lays the text area, status bar, and command-line
//! area out into the virtual `next` screen.

use crate::buffer::GapBuffer;

use super::grid::ScreenPair;
use super::paint::paint_byte;
use super::viewport::resolve_draw_start;

/// Everything the composer needs to know about the frame being built,
/// beyond the two buffers themselves.
pub struct ComposeState {
    pub tab_stop: usize,
    /// Whether the previous command failed (the status bar `!` flag).
    pub last_failed: bool,
    /// Whether the command-line mini-buffer currently owns the cursor.
    pub command_line_active: bool,
    /// A `Ctrl-l` centre request for the text area, consumed this frame.
    pub centre_requested: bool,
}

/// Paints one frame into `screen.next_mut()`, given the active text
/// buffer and the command-line mini-buffer. Resolves both buffers'
/// `draw_start` first, then paints text area / status bar / command
/// line top to bottom.
pub fn compose(
    screen: &mut ScreenPair,
    buffer: &mut GapBuffer,
    cmdline: &mut GapBuffer,
    state: &ComposeState,
) {
    let height = screen.height();
    let width = screen.width();
    if height == 0 || width == 0 {
        return;
    }
    let text_height = if height > 2 { height - 2 } else { 1 };

    resolve_draw_start(buffer, text_height, width, state.centre_requested);

    if height >= 3 {
        resolve_draw_start(cmdline, 1, width, false);
    }

    let mut cursor_row;
    let mut cursor_col;
    {
        let cells = screen.next_mut();
        let text_area_end = text_height * width;
        let mut v = 0;

        for &b in &buffer.text_before_cursor()[buffer.draw_start..] {
            if !paint_byte(cells, &mut v, text_area_end, width, state.tab_stop, b) {
                break;
            }
        }
        cursor_row = v / width;
        cursor_col = v % width;

        for &b in buffer.text_from_cursor() {
            if !paint_byte(cells, &mut v, text_area_end, width, state.tab_stop, b) {
                break;
            }
        }
        cells[v..text_area_end].fill(b' ');

        if height >= 2 {
            // Status bar, row `height - 2`.
            let mut sv = text_area_end;
            let status_end = sv + width;
            let fail_ch = if state.last_failed { b'!' } else { b' ' };
            let mod_ch = if buffer.modified { b'*' } else { b' ' };
            let mark_ch = if buffer.mark_set() { b'm' } else { b' ' };
            let filename = buffer
                .filename
                .as_ref()
                .map(|p| p.to_string_lossy().into_owned())
                .unwrap_or_default();
            let status = format!(
                "{} {} {} ({}, {}){}",
                fail_ch as char, mod_ch as char, filename, buffer.row, buffer.col, mark_ch as char
            );
            let status_bytes = status.as_bytes();
            let n = status_bytes.len().min(width);
            cells[sv..sv + n].copy_from_slice(&status_bytes[..n]);
            sv += n;
            cells[sv..status_end].fill(b' ');

            if height >= 3 {
                // Command-line area, row `height - 1`.
                let mut cv = status_end;
                let cmdline_end = cv + width;
                for &b in &cmdline.text_before_cursor()[cmdline.draw_start..] {
                    if !paint_byte(cells, &mut cv, cmdline_end, width, state.tab_stop, b) {
                        break;
                    }
                }
                let (cl_cursor_row, cl_cursor_col) =
                    ((cv - status_end) / width, (cv - status_end) % width);
                for &b in cmdline.text_from_cursor() {
                    if !paint_byte(cells, &mut cv, cmdline_end, width, state.tab_stop, b) {
                        break;
                    }
                }
                cells[cv..cmdline_end].fill(b' ');

                if state.command_line_active {
                    cursor_row = status_end / width + cl_cursor_row;
                    cursor_col = cl_cursor_col;
                }
            }
        }
    }

    screen.set_cursor(cursor_row, cursor_col);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make(text: &str) -> GapBuffer {
        let mut b = GapBuffer::new(0, 16).unwrap();
        for byte in text.bytes() {
            b.insert_char(byte, 1).unwrap();
        }
        b
    }

    #[test]
    fn composes_text_status_and_command_line_rows() {
        let mut screen = ScreenPair::new();
        screen.resize(5, 10, true);
        let mut buffer = make("hello\nworld\n");
        let mut cmdline = make("");
        let state = ComposeState {
            tab_stop: 4,
            last_failed: false,
            command_line_active: false,
            centre_requested: false,
        };
        compose(&mut screen, &mut buffer, &mut cmdline, &state);
        let next = screen.next();
        let row0 = std::str::from_utf8(&next[0..10]).unwrap();
        assert!(row0.starts_with("hello"));
    }

    #[test]
    fn status_bar_shows_modified_and_mark_flags() {
        let mut screen = ScreenPair::new();
        screen.resize(4, 20, true);
        let mut buffer = make("x");
        buffer.set_mark();
        let mut cmdline = make("");
        let state = ComposeState {
            tab_stop: 4,
            last_failed: true,
            command_line_active: false,
            centre_requested: false,
        };
        compose(&mut screen, &mut buffer, &mut cmdline, &state);
        let next = screen.next();
        let status_row = std::str::from_utf8(&next[20..40]).unwrap();
        assert!(status_row.starts_with("! *"));
        assert!(status_row.contains('m'));
    }
}
