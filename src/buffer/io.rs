//! File I/O: loading a buffer from disk, and writing it back with an
//! optional atomic-rename backup.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use crate::error::{Error, Result};

use super::GapBuffer;

impl GapBuffer {
    /// Reads `path` entirely into the right-hand side of the gap, so the
    /// inserted text begins exactly at the cursor without moving it
    /// (matching the original: the file lands in `[c-size, c)`, then `c`
    /// is decremented). Fails if `path` does not name a regular file. A
    /// zero-length file is a pure no-op, matching the original's early
    /// return before the mark is touched.
    pub fn insert_file(&mut self, path: &Path) -> Result<()> {
        let meta = fs::metadata(path)?;
        if !meta.is_file() {
            return Err(Error::IoFailed(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "not a regular file",
            )));
        }
        let content = fs::read(path)?;
        if content.is_empty() {
            return Ok(());
        }
        self.grow_gap(content.len())?;
        let n = content.len();
        self.data[self.gap_end - n..self.gap_end].copy_from_slice(&content);
        self.gap_end -= n;
        self.mark = None;
        self.modified = true;
        Ok(())
    }

    /// Writes the buffer's text (everything but the sentinel) to `path`.
    /// If `make_backup` is set and `path` already exists as a regular
    /// file, it is first renamed to `path` with a trailing `~`, which is
    /// atomic on POSIX (`rename(2)`) and best-effort replace elsewhere.
    /// `path`'s permission bits are preserved across the rewrite on
    /// POSIX by re-applying them with `chmod` after the write.
    ///
    /// Clears `modified` only when `path` is the buffer's own filename,
    /// matching the C original's behavior of leaving `mod` set after a
    /// "write region to a different path" style save.
    pub fn write_buffer(&mut self, path: &Path, make_backup: bool) -> Result<()> {
        let existing_meta = fs::metadata(path).ok().filter(|m| m.is_file());

        if make_backup && existing_meta.is_some() {
            let backup = backup_path(path);
            match fs::rename(path, &backup) {
                Ok(()) => {}
                // Cross-device or otherwise non-atomic filesystems: fall
                // back to a copy-then-remove, best effort.
                Err(_) => {
                    fs::copy(path, &backup)?;
                    fs::remove_file(path)?;
                }
            }
        }

        let mut file = File::create(path)?;
        file.write_all(&self.data[..self.gap_start])?;
        file.write_all(&self.data[self.gap_end..self.sentinel_index()])?;
        file.sync_all()?;

        #[cfg(unix)]
        if let Some(meta) = existing_meta {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, fs::Permissions::from_mode(meta.permissions().mode()))?;
        }

        if self.filename.as_deref() == Some(path) {
            self.modified = false;
        }
        Ok(())
    }
}

/// Appends a trailing `~` to the last path component, matching the
/// original's backup naming (`path + "~"`, not a different extension).
fn backup_path(path: &Path) -> std::path::PathBuf {
    let mut s = path.as_os_str().to_os_string();
    s.push("~");
    std::path::PathBuf::from(s)
}
