//! The double-buffered terminal renderer: a virtual screen pair, the
//! per-byte cell painter, the reverse-scan viewport resolver, the
//! composer that lays out text/status/command-line rows, and the diff
//! renderer that turns virtual screen changes into physical writes.

mod compose;
mod diff;
mod grid;
mod paint;
mod viewport;

pub use compose::{compose, ComposeState};
pub use diff::{hard_clear, paint_diff};
pub use grid::ScreenPair;
