//! `spot [file ...]` — opens one buffer per path, in order, or a single
//! empty unnamed buffer with no arguments. Exit code 0 on clean
//! shutdown, 1 on any fatal error.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use spot::{Config, Editor};

fn main() -> ExitCode {
    let logging = spot::logging::init();

    let paths: Vec<PathBuf> = std::env::args_os().skip(1).map(PathBuf::from).collect();

    let result = run(paths);

    logging.report_if_used();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            // Library code returns `spot::Error`; everything above this
            // boundary erases that into `anyhow::Error`, so recover it
            // here only to decide what `tracing` records.
            let fatal = err.downcast_ref::<spot::Error>().map(spot::Error::is_fatal).unwrap_or(true);
            tracing::error!(fatal, "{err:#}");
            eprintln!("spot: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(paths: Vec<PathBuf>) -> anyhow::Result<()> {
    let config = Config::default();
    let mut editor = Editor::new(config, &paths).context("failed to start editor")?;
    editor.run().context("editor exited with an error")?;
    Ok(())
}
