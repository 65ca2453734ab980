//! The reverse-scan viewport resolver: chooses the byte offset screen
//! composition should start painting from, so the cursor stays visible
//! (and, on request, centred).

use crate::buffer::GapBuffer;

/// Re-derives `buffer.draw_start` for a text area `text_height` rows by
/// `width` columns. `centre` forces a re-centre even if the cursor is
/// already on screen (the `Ctrl-l` request).
///
/// `draw_start` always ends up either `0` or immediately after a `\n`,
/// except in the degenerate case of a zero-sized text area, where the
/// cursor position itself is used so it is trivially "on screen".
pub fn resolve_draw_start(buffer: &mut GapBuffer, text_height: usize, width: usize, centre: bool) {
    let ci = buffer.cursor();
    if ci == 0 {
        buffer.draw_start = 0;
        return;
    }
    if text_height == 0 || width == 0 {
        buffer.draw_start = ci;
        return;
    }

    let draw_start = buffer.draw_start;
    let ta = text_height * width;

    // Fast path: cursor is already inside the currently-drawn window and
    // no re-centre was requested.
    if !centre && draw_start <= ci && ci - draw_start < ta {
        return;
    }

    let centre = centre || ci < draw_start || ci - draw_start >= ta;
    let hth = (text_height / 2).max(1);
    let (target_rows, floor) = if centre { (hth, 0) } else { (text_height, draw_start.min(ci)) };

    buffer.draw_start = reverse_scan(buffer.text_before_cursor(), width, target_rows, floor);
}

/// Walks `text` (everything strictly left of the cursor) backward,
/// counting a row boundary at each `\n` or every `width` bytes scanned
/// without one (a soft wrap). Stops after `target_rows` boundaries or at
/// `floor`. Returns the byte just after the last `\n` seen, or `floor`
/// if none was seen (the floor is always a valid anchor: either `0` or
/// an already-established draw start).
fn reverse_scan(text: &[u8], width: usize, target_rows: usize, floor: usize) -> usize {
    let mut i = text.len();
    let mut rows = 0;
    let mut col = 0;
    let mut anchor = None;
    while i > floor && rows < target_rows {
        i -= 1;
        if text[i] == b'\n' {
            rows += 1;
            anchor = Some(i + 1);
            col = 0;
        } else {
            col += 1;
            if col == width {
                rows += 1;
                col = 0;
            }
        }
    }
    anchor.unwrap_or(floor)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buf_with(text: &str, cursor_at: usize) -> GapBuffer {
        let mut b = GapBuffer::new(0, 16).unwrap();
        for byte in text.bytes() {
            b.insert_char(byte, 1).unwrap();
        }
        b.start_of_buffer();
        b.move_right(cursor_at).unwrap();
        b
    }

    #[test]
    fn cursor_at_start_draws_from_zero() {
        let mut b = buf_with("hello\nworld\n", 0);
        resolve_draw_start(&mut b, 5, 10, false);
        assert_eq!(b.draw_start, 0);
    }

    #[test]
    fn keeps_draw_start_when_cursor_stays_in_view() {
        let mut b = buf_with("one\ntwo\nthree\n", 4);
        b.draw_start = 0;
        resolve_draw_start(&mut b, 5, 10, false);
        assert_eq!(b.draw_start, 0);
    }

    #[test]
    fn recentres_when_cursor_runs_off_screen() {
        let mut text = String::new();
        for i in 0..40 {
            text.push_str(&format!("line{i}\n"));
        }
        let cursor_at = text.len();
        let mut b = buf_with(&text, cursor_at);
        b.draw_start = 0;
        resolve_draw_start(&mut b, 5, 10, false);
        assert!(b.draw_start > 0);
        assert_eq!(b.text_before_cursor()[b.draw_start - 1], b'\n');
    }

    #[test]
    fn explicit_centre_request_is_honoured_even_on_screen() {
        let mut b = buf_with("one\ntwo\nthree\n", 4);
        b.draw_start = 0;
        resolve_draw_start(&mut b, 5, 10, true);
        assert_eq!(b.draw_start, 0);
    }
}
