//! # Configuration
//!
//! Compile-time tunables, collected in one place rather than scattered as
//! magic numbers through the buffer and screen modules. There is no
//! configuration file: the editor's behavior is meant to be the same on
//! every machine it runs on, and reading the defaults here should be
//! enough to understand what it does.

/// Tunable constants used by the buffer and rendering engine.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Extra bytes requested beyond what an insert needs when a buffer's
    /// gap must grow (added to the request before rounding up). Mirrors
    /// the original's `GAP` constant, whose sensible default is the
    /// platform's preferred I/O block size.
    pub gap_increment: usize,
    /// Width, in columns, a tab character expands to when painted onto
    /// the virtual screen.
    pub tab_stop: usize,
    /// Name of the external regex substitutor invoked for regex-region
    /// commands. Looked up on `PATH` like any other command.
    pub sed_command: String,
    /// Whether `Ctrl-x Ctrl-s` renames the existing file to `path~`
    /// before writing, preserving the pre-save content.
    pub make_backup: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gap_increment: default_gap_increment(),
            tab_stop: 4,
            sed_command: String::from("sed"),
            make_backup: true,
        }
    }
}

/// The original ties `GAP` to `BUFSIZ`, the platform's preferred I/O
/// block size; libc exposes the same constant on Unix. Elsewhere (and as
/// a safe fallback) a conservative 1024 bytes is used.
fn default_gap_increment() -> usize {
    #[cfg(unix)]
    {
        libc::BUFSIZ as usize
    }
    #[cfg(not(unix))]
    {
        1024
    }
}
