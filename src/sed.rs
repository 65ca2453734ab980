//! The external regex-substitutor invocation contract: temp-file
//! creation, argv construction, and exit-status/output handling for the
//! `ESC x` "regex on region" command. The substitutor binary itself
//! (a POSIX or Windows `sed`-equivalent) is out of scope — only the
//! contract for driving one.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{Error, Result};

/// Holds the temporary directory and the paths within it for as long as
/// an "undo last regex-region" (`ESC X`) might still need them. Dropping
/// this value removes the directory and everything in it.
pub struct RegexRegionResult {
    _dir: tempfile::TempDir,
    pub input_path: PathBuf,
    pub output_path: PathBuf,
}

/// Writes `script` and the region (via `write_region`) to fresh temp
/// files, invokes `sed_command <script> <input> 1> <output> 2> <err>`,
/// and returns the paths on success. Fails, per the editor's refusal
/// policy, if the binary cannot be launched, exits nonzero, or leaves an
/// empty output file — never falls back silently and never crashes.
pub fn invoke(sed_command: &str, script: &[u8], write_region: impl FnOnce(&Path) -> Result<()>) -> Result<RegexRegionResult> {
    let dir = tempfile::tempdir().map_err(Error::IoFailed)?;
    let script_path = dir.path().join("spot-script");
    let input_path = dir.path().join("spot-input");
    let output_path = dir.path().join("spot-output");
    let err_path = dir.path().join("spot-err");

    fs::write(&script_path, script).map_err(Error::IoFailed)?;
    write_region(&input_path)?;

    let stdout = File::create(&output_path).map_err(Error::IoFailed)?;
    let stderr = File::create(&err_path).map_err(Error::IoFailed)?;

    let status = Command::new(sed_command)
        .arg(&script_path)
        .arg(&input_path)
        .stdout(stdout)
        .stderr(stderr)
        .status()
        .map_err(|_| Error::SubprocessFailed("could not launch external substitutor"))?;

    if !status.success() {
        return Err(Error::SubprocessFailed("external substitutor exited nonzero"));
    }
    let meta = fs::metadata(&output_path).map_err(Error::IoFailed)?;
    if meta.len() == 0 {
        return Err(Error::SubprocessFailed("external substitutor produced no output"));
    }

    Ok(RegexRegionResult { _dir: dir, input_path, output_path })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_binary_fails_without_touching_the_buffer() {
        let result = invoke("spot-test-binary-does-not-exist", b"s/a/b/", |p| {
            fs::write(p, b"aaa").map_err(Error::IoFailed)
        });
        assert!(matches!(result, Err(Error::SubprocessFailed(_))));
    }

    #[test]
    fn region_write_failure_propagates_before_launching_anything() {
        let result = invoke("cat", b"script", |_| Err(Error::NoRegion));
        assert!(matches!(result, Err(Error::NoRegion)));
    }
}
