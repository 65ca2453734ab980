//! Region find-and-replace, and the transactional splice used to drop an
//! external regex substitutor's output back into the buffer.

use std::path::Path;

use super::search::{quick_search, BadCharTable};
use super::GapBuffer;
use crate::error::{Error, Result};

/// Splits a `<sep><find><sep><replace>` command-line request, where `sep`
/// is whatever byte starts the request. `replace` may be empty; `find`
/// may not.
pub fn parse_request(request: &[u8]) -> Result<(&[u8], &[u8])> {
    if request.is_empty() {
        return Err(Error::Malformed("empty replace request"));
    }
    let sep = request[0];
    let body = &request[1..];
    let split = body.iter().position(|&b| b == sep).ok_or(Error::Malformed("missing separator"))?;
    let find = &body[..split];
    let replace = &body[split + 1..];
    if find.is_empty() {
        return Err(Error::Malformed("empty find pattern"));
    }
    Ok((find, replace))
}

impl GapBuffer {
    /// Replaces every non-overlapping occurrence of `find` with `replace`
    /// within the marked region. Either every match is substituted or
    /// none are — achieved by counting matches and pre-reserving gap
    /// space before any byte is touched.
    pub fn replace_in_region(&mut self, request: &[u8]) -> Result<()> {
        let (find, replace) = parse_request(request)?;
        let mark = self.mark.ok_or(Error::NoRegion)?;
        let ci = self.gap_start;
        if mark.logical == ci {
            self.mark = None;
            return Ok(());
        }
        let (lo, hi) = if mark.logical < ci { (mark.logical, ci) } else { (ci, mark.logical) };
        let region_len = hi - lo;

        // Count matches against the region as it sits today, without
        // moving the cursor — so a failure below leaves the buffer
        // completely untouched.
        let region_view: &[u8] = if mark.logical < ci {
            &self.data[lo..hi]
        } else {
            &self.data[self.gap_end..self.gap_end + region_len]
        };
        let table = BadCharTable::build(find);
        let mut count = 0usize;
        let mut scanned = 0usize;
        while scanned + find.len() <= region_len {
            match quick_search(&region_view[scanned..], find, &table) {
                Some(off) => {
                    count += 1;
                    scanned += off + find.len();
                }
                None => break,
            }
        }
        if count == 0 {
            self.mark = None;
            return Ok(());
        }
        let growth_per_match = replace.len().saturating_sub(find.len());
        let growth = growth_per_match.checked_mul(count).ok_or(Error::Overflow)?;
        self.grow_gap(growth)?;

        // Only now do we touch the cursor: move it to the region start so
        // the whole region becomes a single contiguous right-of-gap span.
        if lo < ci {
            self.shift_left_raw(ci - lo);
        } else if lo > ci {
            self.shift_right_raw(lo - ci);
        }

        let mut remaining = region_len;
        for _ in 0..count {
            let window = &self.data[self.gap_end..self.gap_end + remaining];
            let off = quick_search(window, find, &table).expect("match re-scan after pre-count");
            self.shift_right_raw(off);
            self.gap_end += find.len();
            self.insert_bytes(replace)?;
            remaining -= off + find.len();
        }
        self.mark = None;
        self.modified = true;
        Ok(())
    }

    /// Reads `path` fully, then deletes the marked region and splices the
    /// file's content into its place, marking the new span as the
    /// region. Used both to apply an external regex substitutor's output
    /// and, symmetrically, to undo it by splicing the original input
    /// back in.
    pub fn replace_region_from_file(&mut self, path: &Path) -> Result<()> {
        let mark = self.mark.ok_or(Error::NoRegion)?;
        let content = std::fs::read(path)?;
        let ci = self.gap_start;
        if mark.logical < ci {
            // shift_left_raw already adjusts row/col; the region now sits
            // entirely to the right of the gap, ready to be dropped.
            self.shift_left_raw(ci - mark.logical);
            self.gap_end += ci - mark.logical;
        } else if mark.logical > ci {
            let s = mark.logical - ci;
            self.gap_end += s;
        }
        let start = self.gap_start;
        let start_row = self.row;
        self.insert_bytes(&content)?;
        self.mark = Some(super::Mark { logical: start, row: start_row });
        self.modified = true;
        Ok(())
    }
}
