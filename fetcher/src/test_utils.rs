//! Shared test utilities for the fetcher crate.
//!
//! Available to unit tests and, through the `test-support` feature, to the
//! integration tests under `tests/`.

use crate::command::CommandExecutor;
use crate::error::{FetchError, Result};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::io::Write;
use std::path::Path;
use std::process::{ExitStatus, Output};

/// Creates an `ExitStatus` from an exit code (Unix implementation).
#[cfg(unix)]
#[must_use]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;

    ExitStatus::from_raw(code << 8)
}

/// Creates an `ExitStatus` from an exit code (Windows implementation).
#[cfg(windows)]
#[must_use]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;

    ExitStatus::from_raw(code as u32)
}

/// Creates a successful command `Output` with empty stdout and stderr.
#[must_use]
pub fn success_output() -> Output {
    Output {
        status: exit_status(0),
        stdout: Vec::new(),
        stderr: Vec::new(),
    }
}

/// Creates a failed command `Output` with exit code 1 and the given stderr.
#[must_use]
pub fn failure_output(stderr: &str) -> Output {
    failure_output_with_code(1, stderr)
}

/// Creates a failed command `Output` with the given exit code and stderr.
#[must_use]
pub fn failure_output_with_code(code: i32, stderr: &str) -> Output {
    Output {
        status: exit_status(code),
        stdout: Vec::new(),
        stderr: stderr.as_bytes().to_vec(),
    }
}

/// Side effect performed by a stubbed command before it returns.
pub type StubEffect = Box<dyn FnOnce() -> std::io::Result<()>>;

/// Represents an expected command invocation for testing.
pub struct ExpectedCall {
    /// The command to execute (e.g. "mvn").
    pub cmd: String,
    /// The arguments to pass to the command.
    pub args: Vec<String>,
    /// The result to return when this command is invoked.
    pub result: Result<Output>,
    /// Work done when the command runs, such as writing the fetched file.
    pub effect: Option<StubEffect>,
}

impl ExpectedCall {
    /// Creates an expected call without side effects.
    pub fn new<I, S>(cmd: &str, args: I, result: Result<Output>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            cmd: cmd.to_owned(),
            args: args.into_iter().map(Into::into).collect(),
            result,
            effect: None,
        }
    }

    /// Attaches a side effect run when the call is consumed.
    #[must_use]
    pub fn with_effect(mut self, effect: impl FnOnce() -> std::io::Result<()> + 'static) -> Self {
        self.effect = Some(Box::new(effect));
        self
    }
}

impl fmt::Debug for ExpectedCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpectedCall")
            .field("cmd", &self.cmd)
            .field("args", &self.args)
            .field("result", &self.result)
            .field("effect", &self.effect.is_some())
            .finish()
    }
}

/// A stub implementation of `CommandExecutor` for testing.
///
/// Records expected command invocations and returns predefined results,
/// allowing tests to verify command execution without side effects.
#[derive(Debug)]
pub struct StubExecutor {
    expected: RefCell<VecDeque<ExpectedCall>>,
}

impl StubExecutor {
    /// Creates a new `StubExecutor` with the given expected calls.
    #[must_use]
    pub fn new(expected: Vec<ExpectedCall>) -> Self {
        Self {
            expected: RefCell::new(expected.into()),
        }
    }

    /// Asserts that all expected command invocations have been consumed.
    ///
    /// # Panics
    ///
    /// Panics if there are remaining expected calls that were not invoked.
    pub fn assert_finished(&self) {
        assert!(
            self.expected.borrow().is_empty(),
            "expected no further command invocations"
        );
    }
}

impl CommandExecutor for StubExecutor {
    fn run(&self, cmd: &str, args: &[&str]) -> Result<Output> {
        let Some(call) = self.expected.borrow_mut().pop_front() else {
            return Err(FetchError::StubMismatch {
                message: format!("unexpected invocation: {cmd} {}", args.join(" ")),
            });
        };

        if call.cmd != cmd || call.args != args {
            return Err(FetchError::StubMismatch {
                message: format!(
                    "expected `{} {}`, got `{cmd} {}`",
                    call.cmd,
                    call.args.join(" "),
                    args.join(" ")
                ),
            });
        }

        if let Some(effect) = call.effect {
            effect()?;
        }
        call.result
    }
}

/// Writes a `.tar.gz` archive containing `entries` (path, contents) to `path`.
///
/// # Errors
///
/// Returns any I/O error from creating or writing the archive.
pub fn write_tar_gz(path: &Path, entries: &[(&str, &[u8])]) -> std::io::Result<()> {
    let file = std::fs::File::create(path)?;
    let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::fast());
    let encoder = append_tar_entries(encoder, entries)?;
    encoder.finish()?;
    Ok(())
}

/// Writes a `.tar.zst` archive containing `entries` (path, contents) to `path`.
///
/// # Errors
///
/// Returns any I/O error from creating or writing the archive.
pub fn write_tar_zst(path: &Path, entries: &[(&str, &[u8])]) -> std::io::Result<()> {
    let file = std::fs::File::create(path)?;
    let encoder = zstd::Encoder::new(file, 0)?;
    let encoder = append_tar_entries(encoder, entries)?;
    encoder.finish()?;
    Ok(())
}

fn append_tar_entries<W: Write>(writer: W, entries: &[(&str, &[u8])]) -> std::io::Result<W> {
    let mut builder = tar::Builder::new(writer);
    for (name, contents) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(contents.len() as u64);
        header.set_mode(0o644);
        header.set_entry_type(tar::EntryType::Regular);
        builder.append_data(&mut header, name, *contents)?;
    }
    builder.into_inner()
}

/// Writes a `.zip` archive containing `entries` (path, contents) to `path`.
///
/// # Errors
///
/// Returns any I/O or zip error from creating or writing the archive.
pub fn write_zip(path: &Path, entries: &[(&str, &[u8])]) -> std::io::Result<()> {
    let file = std::fs::File::create(path)?;
    let mut writer = zip::ZipWriter::new(file);
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Stored);
    for (name, contents) in entries {
        writer
            .start_file(*name, options)
            .map_err(std::io::Error::other)?;
        writer.write_all(contents)?;
    }
    writer.finish().map_err(std::io::Error::other)?;
    Ok(())
}
