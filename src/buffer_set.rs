//! The ordered collection of open buffers, with an "active" index.
//!
//! Mirrors the original's `struct tb` (text buffers): a growable array of
//! buffers plus the index of the one currently being edited. The set only
//! ever grows during a session — closing a buffer without saving simply
//! exits the editor, so there is no remove operation.

use std::path::{Path, PathBuf};

use crate::buffer::GapBuffer;
use crate::error::Result;

/// Ordered collection of [`GapBuffer`]s with an active index.
pub struct BufferSet {
    buffers: Vec<GapBuffer>,
    active: usize,
    gap_increment: usize,
}

impl BufferSet {
    /// Creates a set with no buffers yet. Use [`BufferSet::open`] to
    /// populate it; an editor session always has at least one buffer by
    /// the time the dispatch loop starts.
    pub fn new(gap_increment: usize) -> Self {
        BufferSet { buffers: Vec::new(), active: 0, gap_increment }
    }

    /// Opens `path` into a new buffer and makes it active. If the path
    /// exists and names a regular file its contents are loaded and the
    /// buffer starts unmodified; a nonexistent path becomes an empty
    /// buffer with that filename already set (so the first save writes
    /// to it without a rename prompt). A `None` path is an empty,
    /// unnamed buffer ("new").
    pub fn open(&mut self, path: Option<&Path>) -> Result<()> {
        let mut buf = GapBuffer::new(0, self.gap_increment)?;
        if let Some(path) = path {
            match buf.insert_file(path) {
                Ok(()) => {}
                Err(crate::error::Error::IoFailed(e))
                    if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e),
            }
            buf.filename = Some(PathBuf::from(path));
            buf.modified = false;
        }
        self.buffers.push(buf);
        self.active = self.buffers.len() - 1;
        Ok(())
    }

    pub fn active(&self) -> &GapBuffer {
        &self.buffers[self.active]
    }

    pub fn active_mut(&mut self) -> &mut GapBuffer {
        &mut self.buffers[self.active]
    }

    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    /// Switches to the previous buffer in the set. Fails (leaving the
    /// active index unchanged) if already at the first buffer.
    pub fn prev(&mut self) -> Result<()> {
        if self.active == 0 {
            return Err(crate::error::Error::OutOfBounds);
        }
        self.active -= 1;
        Ok(())
    }

    /// Switches to the next buffer in the set. Fails if already at the
    /// last buffer.
    pub fn next(&mut self) -> Result<()> {
        if self.active + 1 >= self.buffers.len() {
            return Err(crate::error::Error::OutOfBounds);
        }
        self.active += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_with_no_path_makes_an_empty_unnamed_buffer() {
        let mut set = BufferSet::new(16);
        set.open(None).unwrap();
        assert_eq!(set.len(), 1);
        assert!(set.active().filename.is_none());
        assert!(set.active().is_empty());
    }

    #[test]
    fn open_nonexistent_path_starts_empty_with_filename_set() {
        let mut set = BufferSet::new(16);
        let path = std::env::temp_dir().join("does-not-exist-spot-test.txt");
        let _ = std::fs::remove_file(&path);
        set.open(Some(&path)).unwrap();
        assert_eq!(set.active().filename.as_deref(), Some(path.as_path()));
        assert!(set.active().is_empty());
        assert!(!set.active().modified);
    }

    #[test]
    fn prev_and_next_traverse_bounds() {
        let mut set = BufferSet::new(16);
        set.open(None).unwrap();
        set.open(None).unwrap();
        assert!(set.prev().is_ok());
        assert!(set.prev().is_err());
        assert!(set.next().is_ok());
        assert!(set.next().is_err());
    }
}
