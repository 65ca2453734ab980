//! The gap buffer: one contiguous allocation holding text split into a
//! left region, a gap, and a right region, plus a sentinel end-marker
//! byte. The cursor is always the boundary between the left region and
//! the gap.
//!
//! Byte indices, not pointers, are the state here (see the crate's design
//! notes on preferring indices): `gap_start`/`gap_end` are plain `usize`
//! offsets into `data`, which makes `grow_gap` a matter of copying two
//! slices into a bigger `Vec` rather than chasing pointers.

pub mod io;
pub mod replace;
pub mod search;

#[cfg(test)]
mod tests;

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::registers::PasteRegister;
use search::{quick_search, BadCharTable};

/// Non-writable end-of-buffer byte. Rendered as a visible glyph, never
/// written to disk, and cannot be deleted.
pub const SENTINEL: u8 = b'~';

/// The mark left by `set_mark`, recorded as a position in the buffer's
/// logical byte stream (not a raw array index). Because every mutating
/// primitive clears the mark, no edit can occur between `set_mark` and a
/// later read of it, so the logical position never needs updating while
/// it is live — only translating to a raw index at the point of use.
#[derive(Debug, Clone, Copy)]
struct Mark {
    logical: usize,
    row: usize,
}

/// One editable text buffer.
#[derive(Debug)]
pub struct GapBuffer {
    data: Vec<u8>,
    gap_start: usize,
    gap_end: usize,
    gap_increment: usize,

    /// Path this buffer will save to; `None` means "unnamed".
    pub filename: Option<PathBuf>,
    /// Byte offset chosen by the viewport resolver to start painting
    /// from. Always `<= gap_start` and either 0 or just after a `\n`.
    pub draw_start: usize,
    /// True since the last successful save to `filename`.
    pub modified: bool,
    /// 1-indexed row of the cursor.
    pub row: usize,
    /// 0-indexed column of the cursor, in memory (not screen cells).
    pub col: usize,

    mark: Option<Mark>,
}

impl GapBuffer {
    /// Creates an empty buffer whose gap is pre-sized for an insert of
    /// about `req` bytes without needing an immediate `grow_gap`.
    pub fn new(req: usize, gap_increment: usize) -> Result<Self> {
        let size = req.checked_add(gap_increment).ok_or(Error::Overflow)?;
        let mut data = vec![0u8; size];
        data[size - 1] = SENTINEL;
        Ok(GapBuffer {
            data,
            gap_start: 0,
            gap_end: size - 1,
            gap_increment,
            filename: None,
            draw_start: 0,
            modified: false,
            row: 1,
            col: 0,
            mark: None,
        })
    }

    pub fn mark_set(&self) -> bool {
        self.mark.is_some()
    }

    /// Byte offset of the cursor (equivalently, of the start of the gap).
    pub fn cursor(&self) -> usize {
        self.gap_start
    }

    pub fn sentinel_index(&self) -> usize {
        self.data.len() - 1
    }

    /// The bytes strictly left of the gap, i.e. everything before the
    /// cursor. Used by the viewport resolver's reverse scan, which never
    /// needs to look past the cursor to pick a `draw_start`.
    pub fn text_before_cursor(&self) -> &[u8] {
        &self.data[..self.gap_start]
    }

    /// The byte at the cursor position (the first byte right of the
    /// gap), used by the screen composer to resume painting after the
    /// gap. Returns the sentinel byte if the cursor is at the end.
    pub fn byte_at_cursor(&self) -> u8 {
        self.data[self.gap_end]
    }

    /// Bytes from the cursor up to (and including) the sentinel, used by
    /// the screen composer to paint the remainder of the buffer.
    pub fn text_from_cursor(&self) -> &[u8] {
        &self.data[self.gap_end..=self.sentinel_index()]
    }

    pub fn is_empty(&self) -> bool {
        self.gap_start == 0 && self.gap_end == self.sentinel_index()
    }

    fn right_len(&self) -> usize {
        self.sentinel_index() - self.gap_end
    }

    /// Raw, unchecked index into `mark`'s translation, for callers that
    /// already hold `Some(mark)`.
    fn mark_raw(&self, mark: Mark) -> usize {
        if mark.logical < self.gap_start {
            mark.logical
        } else {
            self.gap_end + (mark.logical - self.gap_start)
        }
    }

    /// Raw byte offset of the mark, satisfying `< gap_start` or `>=
    /// gap_end`, per the invariant that the mark never points into the
    /// gap.
    pub fn mark_index(&self) -> Option<usize> {
        self.mark.map(|m| self.mark_raw(m))
    }

    fn recompute_col(&mut self) {
        let mut i = self.gap_start;
        let mut col = 0;
        while i > 0 && self.data[i - 1] != b'\n' {
            i -= 1;
            col += 1;
        }
        self.col = col;
    }

    fn shift_left_raw(&mut self, n: usize) {
        if n == 0 {
            return;
        }
        let src = self.gap_start - n..self.gap_start;
        let newlines = self.data[src.clone()].iter().filter(|&&b| b == b'\n').count();
        self.data.copy_within(src, self.gap_end - n);
        self.gap_start -= n;
        self.gap_end -= n;
        self.row -= newlines;
        self.recompute_col();
    }

    fn shift_right_raw(&mut self, n: usize) {
        if n == 0 {
            return;
        }
        let src = self.gap_end..self.gap_end + n;
        let newlines = self.data[src.clone()].iter().filter(|&&b| b == b'\n').count();
        self.data.copy_within(src, self.gap_start);
        self.gap_start += n;
        self.gap_end += n;
        self.row += newlines;
        self.recompute_col();
    }

    /// Grows the gap so it can fit an insert of `req` bytes, if it can't
    /// already. Mirrors the original sizing policy: grow by whichever is
    /// larger of the current buffer size or the requested size plus one
    /// gap increment, so repeated inserts don't each trigger a
    /// reallocation.
    fn grow_gap(&mut self, req: usize) -> Result<()> {
        let gap_size = self.gap_end - self.gap_start;
        if req <= gap_size {
            return Ok(());
        }
        let rg = req.checked_add(self.gap_increment).ok_or(Error::Overflow)?;
        let min_increase = rg - gap_size;
        let current_size = self.data.len();
        let increase = current_size.max(min_increase);
        let target_size = current_size.checked_add(increase).ok_or(Error::Overflow)?;
        let mut new_data = vec![0u8; target_size];
        new_data[..self.gap_start].copy_from_slice(&self.data[..self.gap_start]);
        let new_gap_end = self.gap_end + increase;
        new_data[new_gap_end..].copy_from_slice(&self.data[self.gap_end..]);
        self.data = new_data;
        self.gap_end = new_gap_end;
        Ok(())
    }

    /// Writes `bytes` at the cursor, advancing it past them. Does not
    /// clear the mark or set `modified` itself — callers decide that,
    /// since `replace_region_from_file` needs a bare insert.
    fn insert_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.grow_gap(bytes.len())?;
        let n = bytes.len();
        self.data[self.gap_start..self.gap_start + n].copy_from_slice(bytes);
        let newlines = bytes.iter().filter(|&&b| b == b'\n').count();
        self.gap_start += n;
        self.row += newlines;
        self.recompute_col();
        Ok(())
    }

    // -- movement -----------------------------------------------------

    pub fn move_left(&mut self, mult: usize) -> Result<()> {
        let n = if mult == 0 { 1 } else { mult };
        if self.gap_start < n {
            return Err(Error::OutOfBounds);
        }
        self.shift_left_raw(n);
        Ok(())
    }

    pub fn move_right(&mut self, mult: usize) -> Result<()> {
        let n = if mult == 0 { 1 } else { mult };
        if self.right_len() < n {
            return Err(Error::OutOfBounds);
        }
        self.shift_right_raw(n);
        Ok(())
    }

    pub fn start_of_line(&mut self) {
        let n = self.col;
        self.shift_left_raw(n);
    }

    pub fn end_of_line(&mut self) {
        let sentinel = self.sentinel_index();
        let mut i = self.gap_end;
        let mut n = 0;
        while i < sentinel && self.data[i] != b'\n' {
            i += 1;
            n += 1;
        }
        self.shift_right_raw(n);
    }

    pub fn start_of_buffer(&mut self) {
        let n = self.gap_start;
        self.shift_left_raw(n);
    }

    pub fn end_of_buffer(&mut self) {
        let n = self.right_len();
        self.shift_right_raw(n);
    }

    pub fn up_line(&mut self, mult: usize) -> Result<()> {
        let mult = if mult == 0 { 1 } else { mult };
        let orig_col = self.col;
        let mut q = self.gap_start - orig_col;
        let mut remaining = mult;
        while remaining > 0 && q != 0 {
            q -= 1;
            if self.data[q] == b'\n' {
                remaining -= 1;
            }
        }
        if remaining > 0 {
            return Err(Error::OutOfBounds);
        }
        self.shift_left_raw(self.gap_start - q);
        let eol_col = self.col;
        if eol_col > orig_col {
            self.shift_left_raw(eol_col - orig_col);
        }
        Ok(())
    }

    pub fn down_line(&mut self, mult: usize) -> Result<()> {
        let mult = if mult == 0 { 1 } else { mult };
        let orig_col = self.col;
        let sentinel = self.sentinel_index();
        let mut q = self.gap_end;
        let mut remaining = mult;
        while remaining > 0 && q != sentinel {
            if self.data[q] == b'\n' {
                remaining -= 1;
            }
            q += 1;
        }
        if remaining > 0 {
            return Err(Error::OutOfBounds);
        }
        self.shift_right_raw(q - self.gap_end);
        let mut i = self.gap_end;
        let mut steps = 0;
        while steps < orig_col && i != sentinel && self.data[i] != b'\n' {
            i += 1;
            steps += 1;
        }
        self.shift_right_raw(steps);
        Ok(())
    }

    pub fn match_brace(&mut self) -> Result<()> {
        let sentinel = self.sentinel_index();
        if self.gap_end == sentinel {
            return Ok(());
        }
        let (open, close, forward) = match self.data[self.gap_end] {
            b'(' => (b'(', b')', true),
            b'<' => (b'<', b'>', true),
            b'[' => (b'[', b']', true),
            b'{' => (b'{', b'}', true),
            b')' => (b'(', b')', false),
            b'>' => (b'<', b'>', false),
            b']' => (b'[', b']', false),
            b'}' => (b'{', b'}', false),
            _ => return Ok(()),
        };
        if forward {
            let mut depth = 0i64;
            let mut i = self.gap_end;
            loop {
                if i == sentinel {
                    return Err(Error::NotFound);
                }
                let b = self.data[i];
                if b == open {
                    depth += 1;
                } else if b == close {
                    depth -= 1;
                    if depth == 0 {
                        self.shift_right_raw(i - self.gap_end);
                        return Ok(());
                    }
                }
                i += 1;
            }
        } else {
            if self.gap_start == 0 {
                return Err(Error::NotFound);
            }
            let mut depth = 0i64;
            let mut i = self.gap_start;
            loop {
                i -= 1;
                let b = self.data[i];
                if b == close {
                    depth += 1;
                } else if b == open {
                    depth -= 1;
                    if depth == 0 {
                        self.shift_left_raw(self.gap_start - i);
                        return Ok(());
                    }
                }
                if i == 0 {
                    return Err(Error::NotFound);
                }
            }
        }
    }

    // -- editing --------------------------------------------------------

    pub fn insert_char(&mut self, byte: u8, mult: usize) -> Result<()> {
        // Unlike the movement/deletion primitives, an explicit multiplier
        // of zero here means "insert nothing", not "insert once".
        if mult == 0 {
            return Ok(());
        }
        self.grow_gap(mult)?;
        self.data[self.gap_start..self.gap_start + mult].fill(byte);
        self.gap_start += mult;
        if byte == b'\n' {
            self.row += mult;
            self.col = 0;
        } else {
            self.col += mult;
        }
        self.mark = None;
        self.modified = true;
        Ok(())
    }

    pub fn delete_char(&mut self, mult: usize) -> Result<()> {
        let n = if mult == 0 { 1 } else { mult };
        if self.right_len() < n {
            return Err(Error::OutOfBounds);
        }
        self.gap_end += n;
        self.mark = None;
        self.modified = true;
        Ok(())
    }

    pub fn backspace(&mut self, mult: usize) -> Result<()> {
        let n = if mult == 0 { 1 } else { mult };
        if self.gap_start < n {
            return Err(Error::OutOfBounds);
        }
        let src = self.gap_start - n..self.gap_start;
        let newlines = self.data[src].iter().filter(|&&b| b == b'\n').count();
        self.gap_start -= n;
        self.row -= newlines;
        self.recompute_col();
        self.mark = None;
        self.modified = true;
        Ok(())
    }

    pub fn delete_buffer(&mut self) {
        self.gap_start = 0;
        self.gap_end = self.sentinel_index();
        self.row = 1;
        self.col = 0;
        self.mark = None;
        self.modified = true;
    }

    /// Deletes trailing whitespace/garbage at the end of the buffer, and
    /// every byte elsewhere that is not ASCII graph, space, tab, or
    /// newline. Preserves exactly the first `\n` found scanning backward
    /// from the end, so a single trailing newline survives.
    pub fn trim_clean(&mut self) {
        self.end_of_buffer();
        if self.gap_start == 0 {
            return;
        }
        let mut deleted = false;
        let mut newline_kept = false;
        self.shift_left_raw(1);
        // Trailing run at end-of-buffer only: stop at the first graphic
        // character instead of walking all the way to the start.
        while !is_ascii_graph(self.data[self.gap_end]) {
            let b = self.data[self.gap_end];
            if !newline_kept && b == b'\n' {
                newline_kept = true;
            } else {
                self.gap_end += 1;
                deleted = true;
            }
            if self.gap_start == 0 {
                break;
            }
            self.shift_left_raw(1);
        }
        let mut at_eol = false;
        loop {
            let b = self.data[self.gap_end];
            if b == b'\n' {
                at_eol = true;
            } else if is_ascii_graph(b) {
                at_eol = false;
            } else if at_eol {
                self.gap_end += 1;
                deleted = true;
            } else if b != b' ' && b != b'\t' {
                self.gap_end += 1;
                deleted = true;
            }
            if self.gap_start == 0 {
                break;
            }
            self.shift_left_raw(1);
        }
        self.row = 1;
        self.col = 0;
        if deleted {
            self.mark = None;
            self.modified = true;
        }
    }

    // -- search -----------------------------------------------------------

    /// Forward search for `pattern` using a retained bad-character
    /// `table`, over the text strictly after the cursor and before the
    /// sentinel. Moves the cursor to the match start on success.
    pub fn search(&mut self, pattern: &[u8], table: &BadCharTable) -> Result<()> {
        if pattern.is_empty() {
            return Err(Error::EmptyPattern);
        }
        let sentinel = self.sentinel_index();
        if self.gap_end + 1 >= sentinel {
            return Err(Error::NotFound);
        }
        let start = self.gap_end + 1;
        let haystack = &self.data[start..sentinel];
        match quick_search(haystack, pattern, table) {
            Some(offset) => self.move_right(start + offset - self.gap_end),
            None => Err(Error::NotFound),
        }
    }

    // -- mark / region ----------------------------------------------------

    pub fn set_mark(&mut self) {
        self.mark = Some(Mark { logical: self.gap_start, row: self.row });
    }

    pub fn clear_mark(&mut self) {
        self.mark = None;
    }

    /// Copies (and, if `delete`, removes) the region between the mark and
    /// the cursor into `register`. A no-op, mark-preserving success if
    /// the mark coincides exactly with the cursor.
    pub fn copy_region(&mut self, register: &mut PasteRegister, delete: bool) -> Result<()> {
        let mark = self.mark.ok_or(Error::NoRegion)?;
        let ci = self.gap_start;
        if mark.logical == ci {
            return Ok(());
        }
        if mark.logical < ci {
            let s = ci - mark.logical;
            let rows = self.row - mark.row;
            register.set(&self.data[mark.logical..ci], rows);
            if delete {
                self.gap_start -= s;
                self.row -= rows;
                self.recompute_col();
                self.modified = true;
            }
        } else {
            let s = mark.logical - ci;
            let rows = mark.row - self.row;
            register.set(&self.data[self.gap_end..self.gap_end + s], rows);
            if delete {
                self.gap_end += s;
                self.modified = true;
            }
        }
        self.mark = None;
        Ok(())
    }

    pub fn paste(&mut self, register: &PasteRegister, mult: usize) -> Result<()> {
        let mult = if mult == 0 { 1 } else { mult };
        if register.is_empty() {
            self.mark = None;
            return Ok(());
        }
        let total = register.bytes().len().checked_mul(mult).ok_or(Error::Overflow)?;
        self.grow_gap(total)?;
        for _ in 0..mult {
            let len = register.bytes().len();
            self.data[self.gap_start..self.gap_start + len].copy_from_slice(register.bytes());
            self.gap_start += len;
            self.row += register.rows();
        }
        self.recompute_col();
        self.mark = None;
        self.modified = true;
        Ok(())
    }

    pub fn cut_to_eol(&mut self, register: &mut PasteRegister) -> Result<()> {
        let sentinel = self.sentinel_index();
        if self.gap_end != sentinel && self.data[self.gap_end] == b'\n' {
            return self.delete_char(1);
        }
        self.set_mark();
        self.end_of_line();
        self.copy_region(register, true)
    }

    pub fn cut_to_sol(&mut self, register: &mut PasteRegister) -> Result<()> {
        self.set_mark();
        self.start_of_line();
        self.copy_region(register, true)
    }

    /// Writes exactly the bytes of the region between `mark` and the
    /// cursor to `path`, with no backup and without disturbing the mark.
    pub fn write_region(&self, path: &Path) -> Result<()> {
        let mark = self.mark.ok_or(Error::NoRegion)?;
        let ci = self.gap_start;
        let bytes: &[u8] = if mark.logical < ci {
            &self.data[mark.logical..ci]
        } else if mark.logical > ci {
            &self.data[self.gap_end..self.gap_end + (mark.logical - ci)]
        } else {
            &[]
        };
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// Strips embedded NUL bytes from the whole buffer's text, for use
    /// wherever gap-buffer content must become a NUL-terminated host
    /// string (a filename or search pattern typed on the command line).
    pub fn to_bytes_stripped(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.gap_start + self.right_len());
        out.extend(self.data[..self.gap_start].iter().copied().filter(|&b| b != 0));
        out.extend(self.data[self.gap_end..self.sentinel_index()].iter().copied().filter(|&b| b != 0));
        out
    }
}

fn is_ascii_graph(b: u8) -> bool {
    b.is_ascii_graphic()
}
