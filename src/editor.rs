//! The top-level `Editor`: owns the buffer set, the registers, the
//! command-line mini-buffer, the virtual screen pair, and the terminal.
//! `run` is the blocking read/dispatch/render loop.

use std::io;
use std::path::Path;

use crate::buffer::GapBuffer;
use crate::buffer_set::BufferSet;
use crate::config::Config;
use crate::dispatch::{Ctx, Dispatcher};
use crate::error::{Error, Result};
use crate::keys::KeyRemapper;
use crate::registers::{PasteRegister, SearchRegister};
use crate::screen::{self, ComposeState, ScreenPair};
use crate::sys::Terminal;

/// The command-line mini-buffer is sized far smaller than a text
/// buffer's gap; a filename, search pattern, or sed script rarely
/// exceeds a couple of lines.
const CMDLINE_GAP: usize = 256;

pub struct Editor {
    terminal: Terminal,
    buffers: BufferSet,
    paste: PasteRegister,
    search: SearchRegister,
    cmdline: GapBuffer,
    screen: ScreenPair,
    dispatcher: Dispatcher,
    remapper: KeyRemapper,
    config: Config,
}

impl Editor {
    /// Acquires the terminal (raw mode; fails without a TTY on stdin)
    /// and opens one buffer per path, in order. With no paths, opens a
    /// single empty unnamed buffer.
    pub fn new(config: Config, paths: &[impl AsRef<Path>]) -> Result<Self> {
        let terminal = Terminal::acquire()?;

        let mut buffers = BufferSet::new(config.gap_increment);
        if paths.is_empty() {
            buffers.open(None)?;
        } else {
            for path in paths {
                buffers.open(Some(path.as_ref()))?;
            }
        }

        let cmdline = GapBuffer::new(0, CMDLINE_GAP)?;

        Ok(Editor {
            terminal,
            buffers,
            paste: PasteRegister::default(),
            search: SearchRegister::default(),
            cmdline,
            screen: ScreenPair::new(),
            dispatcher: Dispatcher::new(),
            remapper: KeyRemapper::new(),
            config,
        })
    }

    /// The blocking read/dispatch/render cycle (see the crate's design
    /// notes on single-threaded, cooperative scheduling). Returns once
    /// the user asks to quit, or the first fatal I/O error.
    pub fn run(&mut self) -> Result<()> {
        let mut stdout = io::stdout();
        let mut force_redraw = true;

        loop {
            let (height, width) = self.terminal.size()?;
            if self.screen.resize(height, width, force_redraw) {
                screen::hard_clear(&mut stdout).map_err(Error::IoFailed)?;
            }
            force_redraw = false;

            let state = ComposeState {
                tab_stop: self.config.tab_stop,
                last_failed: self.dispatcher.last_failed(),
                command_line_active: self.dispatcher.command_line_active(),
                centre_requested: self.dispatcher.take_centre_requested(),
            };
            screen::compose(&mut self.screen, self.buffers.active_mut(), &mut self.cmdline, &state);
            screen::paint_diff(&mut self.screen, &mut stdout).map_err(Error::IoFailed)?;

            let key = {
                let remapper = &mut self.remapper;
                let terminal = &mut self.terminal;
                remapper.next_key(&mut || terminal.read_byte())?
            };
            let Some(key) = key else { break };

            let mut ctx = Ctx {
                buffers: &mut self.buffers,
                paste: &mut self.paste,
                search: &mut self.search,
                cmdline: &mut self.cmdline,
                config: &self.config,
            };
            let outcome = self.dispatcher.handle_key(key, &mut ctx);
            if outcome.hard_redraw {
                force_redraw = true;
            }
            if outcome.quit {
                break;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cmdline_buffer_starts_empty() {
        // `Editor::new` requires a real TTY (it acquires raw mode), so
        // only the piece that doesn't is exercised here directly.
        let cmdline = GapBuffer::new(0, CMDLINE_GAP).unwrap();
        assert!(cmdline.is_empty());
    }
}
