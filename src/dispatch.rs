//! The command dispatch loop's state machine: multiplier accumulation,
//! the root / Ctrl-X / ESC prefix tables, insert-hex, and the
//! command-line sub-mode's commit behaviours.

use std::path::PathBuf;

use crate::buffer::GapBuffer;
use crate::buffer_set::BufferSet;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::keys::Key;
use crate::registers::{CommandLineOperation, PasteRegister, SearchRegister};
use crate::sed::{self, RegexRegionResult};

/// Everything the dispatcher needs beyond its own state, borrowed for
/// the duration of one `handle_key` call.
pub struct Ctx<'a> {
    pub buffers: &'a mut BufferSet,
    pub paste: &'a mut PasteRegister,
    pub search: &'a mut SearchRegister,
    pub cmdline: &'a mut GapBuffer,
    pub config: &'a Config,
}

/// What the dispatch loop did with one key, for the run loop driving it.
#[derive(Debug, Default, Clone, Copy)]
pub struct Outcome {
    pub quit: bool,
    pub hard_redraw: bool,
}

enum State {
    Root,
    Multiplier,
    CtrlX,
    Esc,
    InsertHex1,
    InsertHex2(u8),
    CommandLine(CommandLineOperation),
}

/// The dispatch loop's prefix/multiplier state machine plus the small
/// amount of cross-key memory it needs: the last command's pass/fail
/// flag, a pending `Ctrl-l` centre request, and the undo state for the
/// last applied regex-region.
pub struct Dispatcher {
    state: State,
    mult_digits: Option<usize>,
    pending_mult: Option<usize>,
    last_failed: bool,
    centre_requested: bool,
    last_regex: Option<RegexRegionResult>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Dispatcher {
            state: State::Root,
            mult_digits: None,
            pending_mult: None,
            last_failed: false,
            centre_requested: false,
            last_regex: None,
        }
    }

    pub fn last_failed(&self) -> bool {
        self.last_failed
    }

    /// Consumes the pending centre request, if any, so the composer
    /// only honours it for the one frame that follows `Ctrl-l`.
    pub fn take_centre_requested(&mut self) -> bool {
        std::mem::take(&mut self.centre_requested)
    }

    pub fn command_line_active(&self) -> bool {
        matches!(self.state, State::CommandLine(_))
    }

    fn take_mult(&mut self) -> usize {
        self.pending_mult.take().unwrap_or(1)
    }

    fn take_mult_raw(&mut self) -> Option<usize> {
        self.pending_mult.take()
    }

    fn fail_if_err<T>(&mut self, result: Result<T>) {
        if result.is_err() {
            self.last_failed = true;
        }
    }

    pub fn handle_key(&mut self, key: Key, ctx: &mut Ctx) -> Outcome {
        self.last_failed = false;
        match std::mem::replace(&mut self.state, State::Root) {
            State::Root => self.dispatch_root(key, ctx),
            State::Multiplier => self.dispatch_multiplier(key, ctx),
            State::CtrlX => self.dispatch_ctrl_x(key, ctx),
            State::Esc => self.dispatch_esc(key, ctx),
            State::InsertHex1 => self.dispatch_insert_hex1(key),
            State::InsertHex2(d1) => self.dispatch_insert_hex2(d1, key, ctx),
            State::CommandLine(op) => self.dispatch_command_line(op, key, ctx),
        }
    }

    fn dispatch_multiplier(&mut self, key: Key, ctx: &mut Ctx) -> Outcome {
        if let Key::Byte(b @ b'0'..=b'9') = key {
            let digit = (b - b'0') as usize;
            let acc = self.mult_digits.unwrap_or(0);
            match acc.checked_mul(10).and_then(|v| v.checked_add(digit)) {
                Some(v) => {
                    self.mult_digits = Some(v);
                    self.state = State::Multiplier;
                }
                None => {
                    self.mult_digits = None;
                    self.last_failed = true;
                }
            }
            Outcome::default()
        } else {
            self.pending_mult = Some(self.mult_digits.take().unwrap_or(1));
            self.dispatch_root(key, ctx)
        }
    }

    fn dispatch_root(&mut self, key: Key, ctx: &mut Ctx) -> Outcome {
        match key {
            Key::Byte(0x15) => {
                self.pending_mult = None;
                self.mult_digits = None;
                self.state = State::Multiplier;
            }
            Key::Byte(0x02) | Key::Left => {
                let mult = self.take_mult();
                self.fail_if_err(ctx.buffers.active_mut().move_left(mult));
            }
            Key::Byte(0x06) | Key::Right => {
                let mult = self.take_mult();
                self.fail_if_err(ctx.buffers.active_mut().move_right(mult));
            }
            Key::Byte(0x10) | Key::Up => {
                let mult = self.take_mult();
                self.fail_if_err(ctx.buffers.active_mut().up_line(mult));
            }
            Key::Byte(0x0E) | Key::Down => {
                let mult = self.take_mult();
                self.fail_if_err(ctx.buffers.active_mut().down_line(mult));
            }
            Key::Byte(0x01) | Key::Home => {
                self.pending_mult = None;
                ctx.buffers.active_mut().start_of_line();
            }
            Key::Byte(0x05) | Key::End => {
                self.pending_mult = None;
                ctx.buffers.active_mut().end_of_line();
            }
            Key::Byte(0x04) | Key::Delete => {
                let mult = self.take_mult();
                self.fail_if_err(ctx.buffers.active_mut().delete_char(mult));
            }
            Key::Byte(0x08) => {
                let mult = self.take_mult();
                self.fail_if_err(ctx.buffers.active_mut().backspace(mult));
            }
            Key::Byte(0x00) => {
                self.pending_mult = None;
                ctx.buffers.active_mut().set_mark();
            }
            Key::Byte(0x17) => {
                self.pending_mult = None;
                let result = ctx.buffers.active_mut().copy_region(ctx.paste, true);
                self.fail_if_err(result);
            }
            Key::Byte(0x19) => {
                let mult = self.take_mult();
                let result = ctx.buffers.active_mut().paste(ctx.paste, mult);
                self.fail_if_err(result);
            }
            Key::Byte(0x0B) => {
                let mult = self.take_mult_raw();
                let buf = ctx.buffers.active_mut();
                let result = if mult == Some(0) { buf.cut_to_sol(ctx.paste) } else { buf.cut_to_eol(ctx.paste) };
                self.fail_if_err(result);
            }
            Key::Byte(0x0C) => {
                self.pending_mult = None;
                self.centre_requested = true;
            }
            Key::Byte(0x13) => {
                self.pending_mult = None;
                ctx.cmdline.delete_buffer();
                self.state = State::CommandLine(CommandLineOperation::Search);
            }
            Key::Byte(0x07) => {
                self.pending_mult = None;
                let buf = ctx.buffers.active_mut();
                if buf.mark_set() {
                    buf.clear_mark();
                }
            }
            Key::Byte(0x14) => {
                self.pending_mult = None;
                ctx.buffers.active_mut().trim_clean();
            }
            Key::Byte(0x11) => {
                self.state = State::InsertHex1;
            }
            Key::Byte(0x18) => {
                self.state = State::CtrlX;
            }
            Key::Byte(0x1B) => {
                self.state = State::Esc;
            }
            Key::Byte(b) => {
                let mult = self.take_mult();
                self.fail_if_err(ctx.buffers.active_mut().insert_char(b, mult));
            }
        }
        Outcome::default()
    }

    fn dispatch_ctrl_x(&mut self, key: Key, ctx: &mut Ctx) -> Outcome {
        self.pending_mult = None;
        let mut outcome = Outcome::default();
        match key {
            Key::Byte(0x13) => {
                let result = {
                    let buf = ctx.buffers.active_mut();
                    match buf.filename.clone() {
                        Some(path) => buf.write_buffer(&path, ctx.config.make_backup),
                        None => Err(Error::Malformed("no filename set")),
                    }
                };
                self.fail_if_err(result);
            }
            Key::Byte(0x17) => {
                ctx.cmdline.delete_buffer();
                self.state = State::CommandLine(CommandLineOperation::Rename);
            }
            Key::Byte(b'i') => {
                ctx.cmdline.delete_buffer();
                self.state = State::CommandLine(CommandLineOperation::InsertFile);
            }
            Key::Byte(0x06) => {
                ctx.cmdline.delete_buffer();
                self.state = State::CommandLine(CommandLineOperation::NewBuffer);
            }
            Key::Byte(0x03) => {
                outcome.quit = true;
            }
            Key::Left => {
                let result = ctx.buffers.prev();
                self.fail_if_err(result);
            }
            Key::Right => {
                let result = ctx.buffers.next();
                self.fail_if_err(result);
            }
            _ => {
                self.last_failed = true;
            }
        }
        outcome
    }

    fn dispatch_esc(&mut self, key: Key, ctx: &mut Ctx) -> Outcome {
        self.pending_mult = None;
        match key {
            Key::Byte(b'<') => ctx.buffers.active_mut().start_of_buffer(),
            Key::Byte(b'>') => ctx.buffers.active_mut().end_of_buffer(),
            Key::Byte(b'/') => {
                let result = if ctx.search.is_empty() {
                    Err(Error::EmptyPattern)
                } else {
                    let pattern = ctx.search.pattern().to_vec();
                    let table = ctx.search.table().expect("non-empty pattern always has a table").clone();
                    ctx.buffers.active_mut().search(&pattern, &table)
                };
                self.fail_if_err(result);
            }
            Key::Byte(b'w') => {
                let result = ctx.buffers.active_mut().copy_region(ctx.paste, false);
                self.fail_if_err(result);
            }
            Key::Byte(b'=') => {
                let result = ctx.buffers.active_mut().match_brace();
                self.fail_if_err(result);
            }
            Key::Byte(b'-') => {
                return Outcome { quit: false, hard_redraw: true };
            }
            Key::Byte(b'x') => {
                ctx.cmdline.delete_buffer();
                self.state = State::CommandLine(CommandLineOperation::RegexRegion);
            }
            Key::Byte(b'X') => {
                let result = match self.last_regex.take() {
                    Some(regex_result) => ctx.buffers.active_mut().replace_region_from_file(&regex_result.input_path),
                    None => Err(Error::NotFound),
                };
                self.fail_if_err(result);
            }
            _ => {
                self.last_failed = true;
            }
        }
        Outcome::default()
    }

    fn dispatch_insert_hex1(&mut self, key: Key) -> Outcome {
        match key {
            Key::Byte(b) => match hex_digit(b) {
                Some(d) => self.state = State::InsertHex2(d),
                None => {
                    self.pending_mult = None;
                    self.last_failed = true;
                }
            },
            _ => {
                self.pending_mult = None;
                self.last_failed = true;
            }
        }
        Outcome::default()
    }

    fn dispatch_insert_hex2(&mut self, d1: u8, key: Key, ctx: &mut Ctx) -> Outcome {
        match key {
            Key::Byte(b) => match hex_digit(b) {
                Some(d2) => {
                    let byte = d1 * 16 + d2;
                    let mult = self.take_mult();
                    let result = ctx.buffers.active_mut().insert_char(byte, mult);
                    self.fail_if_err(result);
                }
                None => {
                    self.pending_mult = None;
                    self.last_failed = true;
                }
            },
            _ => {
                self.pending_mult = None;
                self.last_failed = true;
            }
        }
        Outcome::default()
    }

    fn dispatch_command_line(&mut self, op: CommandLineOperation, key: Key, ctx: &mut Ctx) -> Outcome {
        match key {
            Key::Byte(0x07) => {
                ctx.cmdline.delete_buffer();
            }
            Key::Byte(b'\n') => {
                let result = self.commit_command_line(op, ctx);
                ctx.cmdline.delete_buffer();
                self.last_failed = result.is_err();
                return Outcome::default();
            }
            Key::Byte(0x08) => {
                let result = ctx.cmdline.backspace(1);
                self.fail_if_err(result);
                self.state = State::CommandLine(op);
            }
            Key::Byte(0x04) | Key::Delete => {
                let result = ctx.cmdline.delete_char(1);
                self.fail_if_err(result);
                self.state = State::CommandLine(op);
            }
            Key::Left => {
                let result = ctx.cmdline.move_left(1);
                self.fail_if_err(result);
                self.state = State::CommandLine(op);
            }
            Key::Right => {
                let result = ctx.cmdline.move_right(1);
                self.fail_if_err(result);
                self.state = State::CommandLine(op);
            }
            Key::Byte(0x01) | Key::Home => {
                ctx.cmdline.start_of_line();
                self.state = State::CommandLine(op);
            }
            Key::Byte(0x05) | Key::End => {
                ctx.cmdline.end_of_line();
                self.state = State::CommandLine(op);
            }
            Key::Byte(b) => {
                let result = ctx.cmdline.insert_char(b, 1);
                self.fail_if_err(result);
                self.state = State::CommandLine(op);
            }
            _ => {
                self.state = State::CommandLine(op);
            }
        }
        Outcome::default()
    }

    fn commit_command_line(&mut self, op: CommandLineOperation, ctx: &mut Ctx) -> Result<()> {
        let content = ctx.cmdline.to_bytes_stripped();
        match op {
            CommandLineOperation::None => Ok(()),
            CommandLineOperation::Search => {
                if content.is_empty() {
                    return Err(Error::EmptyPattern);
                }
                ctx.search.set_pattern(&content);
                let pattern = ctx.search.pattern().to_vec();
                let table = ctx.search.table().expect("set_pattern always builds a table").clone();
                ctx.buffers.active_mut().search(&pattern, &table)
            }
            CommandLineOperation::Rename => {
                let path = bytes_to_path(&content)?;
                ctx.buffers.active_mut().filename = Some(path);
                Ok(())
            }
            CommandLineOperation::InsertFile => {
                let path = bytes_to_path(&content)?;
                ctx.buffers.active_mut().insert_file(&path)
            }
            CommandLineOperation::NewBuffer => {
                let path = bytes_to_path(&content)?;
                ctx.buffers.open(Some(&path))
            }
            CommandLineOperation::RegexRegion => {
                let result = sed::invoke(&ctx.config.sed_command, &content, |p| ctx.buffers.active().write_region(p))?;
                ctx.buffers.active_mut().replace_region_from_file(&result.output_path)?;
                self.last_regex = Some(result);
                Ok(())
            }
        }
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

fn hex_digit(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

fn bytes_to_path(bytes: &[u8]) -> Result<PathBuf> {
    if bytes.is_empty() {
        return Err(Error::Malformed("empty filename"));
    }
    #[cfg(unix)]
    {
        use std::os::unix::ffi::OsStrExt;
        Ok(PathBuf::from(std::ffi::OsStr::from_bytes(bytes)))
    }
    #[cfg(not(unix))]
    {
        let s = std::str::from_utf8(bytes).map_err(|_| Error::Malformed("filename is not valid UTF-8"))?;
        Ok(PathBuf::from(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registers::{PasteRegister, SearchRegister};

    fn ctx_parts() -> (BufferSet, PasteRegister, SearchRegister, GapBuffer, Config) {
        let mut buffers = BufferSet::new(64);
        buffers.open(None).unwrap();
        (buffers, PasteRegister::default(), SearchRegister::default(), GapBuffer::new(0, 64).unwrap(), Config::default())
    }

    #[test]
    fn typing_inserts_at_the_cursor() {
        let (mut buffers, mut paste, mut search, mut cmdline, config) = ctx_parts();
        let mut dispatcher = Dispatcher::new();
        let mut ctx = Ctx { buffers: &mut buffers, paste: &mut paste, search: &mut search, cmdline: &mut cmdline, config: &config };
        for &b in b"hi" {
            dispatcher.handle_key(Key::Byte(b), &mut ctx);
        }
        assert!(!dispatcher.last_failed());
        assert_eq!(ctx.buffers.active().text_before_cursor(), b"hi");
    }

    #[test]
    fn ctrl_u_digits_set_a_multiplier_for_the_next_command() {
        let (mut buffers, mut paste, mut search, mut cmdline, config) = ctx_parts();
        let mut dispatcher = Dispatcher::new();
        let mut ctx = Ctx { buffers: &mut buffers, paste: &mut paste, search: &mut search, cmdline: &mut cmdline, config: &config };
        dispatcher.handle_key(Key::Byte(0x15), &mut ctx);
        dispatcher.handle_key(Key::Byte(b'3'), &mut ctx);
        dispatcher.handle_key(Key::Byte(b'x'), &mut ctx);
        assert_eq!(ctx.buffers.active().text_before_cursor(), b"xxx");
    }

    #[test]
    fn ctrl_x_ctrl_c_requests_quit() {
        let (mut buffers, mut paste, mut search, mut cmdline, config) = ctx_parts();
        let mut dispatcher = Dispatcher::new();
        let mut ctx = Ctx { buffers: &mut buffers, paste: &mut paste, search: &mut search, cmdline: &mut cmdline, config: &config };
        dispatcher.handle_key(Key::Byte(0x18), &mut ctx);
        let outcome = dispatcher.handle_key(Key::Byte(0x03), &mut ctx);
        assert!(outcome.quit);
    }

    #[test]
    fn search_command_line_moves_the_cursor_to_the_match() {
        let (mut buffers, mut paste, mut search, mut cmdline, config) = ctx_parts();
        for &b in b"aXbXc" {
            buffers.active_mut().insert_char(b, 1).unwrap();
        }
        buffers.active_mut().start_of_buffer();
        let mut dispatcher = Dispatcher::new();
        let mut ctx = Ctx { buffers: &mut buffers, paste: &mut paste, search: &mut search, cmdline: &mut cmdline, config: &config };
        dispatcher.handle_key(Key::Byte(0x13), &mut ctx); // Ctrl-s
        dispatcher.handle_key(Key::Byte(b'X'), &mut ctx);
        dispatcher.handle_key(Key::Byte(b'\n'), &mut ctx);
        assert!(!dispatcher.last_failed());
        assert_eq!(ctx.buffers.active().cursor(), 1);
    }

    #[test]
    fn ctrl_g_unsets_the_mark_before_it_would_exit_command_line() {
        let (mut buffers, mut paste, mut search, mut cmdline, config) = ctx_parts();
        buffers.active_mut().set_mark();
        let mut dispatcher = Dispatcher::new();
        let mut ctx = Ctx { buffers: &mut buffers, paste: &mut paste, search: &mut search, cmdline: &mut cmdline, config: &config };
        dispatcher.handle_key(Key::Byte(0x07), &mut ctx);
        assert!(!ctx.buffers.active().mark_set());
    }
}
