//! Ambient diagnostic logging via `tracing`, written to a rotating file
//! under the OS temp directory. Purely a developer/support aid — there
//! is no key binding or CLI flag that lets the editor's user redirect or
//! enable it; it is always on, mirroring how small internal services in
//! this stack wire up `tracing-appender` once at startup.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::fmt::MakeWriter;

/// Wraps the non-blocking file writer so the editor can report, at
/// shutdown, whether anything was actually logged (per the "path is
/// reported on stderr only when at least one log record was emitted"
/// policy).
#[derive(Clone)]
struct TrackedMakeWriter {
    inner: NonBlocking,
    used: Arc<AtomicBool>,
}

struct TrackedWriter<'a> {
    inner: <NonBlocking as MakeWriter<'a>>::Writer,
    used: Arc<AtomicBool>,
}

impl<'a> std::io::Write for TrackedWriter<'a> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        if !buf.is_empty() {
            self.used.store(true, Ordering::Relaxed);
        }
        self.inner.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

impl<'a> MakeWriter<'a> for TrackedMakeWriter {
    type Writer = TrackedWriter<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        TrackedWriter { inner: self.inner.make_writer(), used: self.used.clone() }
    }
}

/// Handle returned by [`init`]; keep it alive for the process lifetime
/// (its `WorkerGuard` flushes the background writer thread on drop) and
/// call [`Logging::report_if_used`] once at shutdown.
pub struct Logging {
    _guard: WorkerGuard,
    used: Arc<AtomicBool>,
    path: PathBuf,
}

impl Logging {
    /// Prints the log file's path to stderr if at least one record was
    /// written during this run.
    pub fn report_if_used(&self) {
        if self.used.load(Ordering::Relaxed) {
            eprintln!("spot: diagnostics written to {}", self.path.display());
        }
    }
}

/// Installs the global `tracing` subscriber. Safe to call once per
/// process; a second call would panic on the global subscriber already
/// being set, which `main.rs` avoids by calling this exactly once.
pub fn init() -> Logging {
    let dir = std::env::temp_dir();
    let path = dir.join("spot.log");
    let file_appender = tracing_appender::rolling::never(&dir, "spot.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let used = Arc::new(AtomicBool::new(false));
    let writer = TrackedMakeWriter { inner: non_blocking, used: used.clone() };

    tracing_subscriber::fmt()
        .with_writer(writer)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    Logging { _guard: guard, used, path }
}
