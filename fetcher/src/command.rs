//! External command execution.
//!
//! The Maven fetcher and the `wget` HTTP backend shell out to their tools
//! through [`CommandExecutor`], so tests can substitute a stub and assert on
//! the exact command line without running anything.

use crate::error::{FetchError, Result};
use std::io::Read;
use std::process::{Child, Command, Output, Stdio};
use std::thread::JoinHandle;
use std::time::Duration;
use wait_timeout::ChildExt;

/// Abstraction for running external commands.
pub trait CommandExecutor {
    /// Runs a command with arguments and returns the captured output.
    ///
    /// # Errors
    ///
    /// Returns any I/O errors encountered while spawning or running the
    /// command, or [`FetchError::CommandTimeout`] when the command does not
    /// finish in time.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use thirdparty_fetch::command::{CommandExecutor, SystemCommandExecutor};
    ///
    /// let executor = SystemCommandExecutor::default();
    /// let output = executor.run("mvn", &["--version"])?;
    /// assert!(output.status.success());
    /// # Ok::<(), thirdparty_fetch::error::FetchError>(())
    /// ```
    fn run(&self, cmd: &str, args: &[&str]) -> Result<Output>;
}

/// Executes commands on the host system.
///
/// Without a timeout the command runs until it exits on its own. With one,
/// the child is killed once the timeout elapses.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandExecutor {
    timeout: Option<Duration>,
}

impl SystemCommandExecutor {
    /// Creates an executor that kills commands running longer than `timeout`.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    /// use thirdparty_fetch::command::SystemCommandExecutor;
    ///
    /// let executor = SystemCommandExecutor::with_timeout(Some(Duration::from_secs(60)));
    /// assert_eq!(executor.timeout(), Some(Duration::from_secs(60)));
    /// ```
    #[must_use]
    pub const fn with_timeout(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }

    /// Returns the configured timeout, if any.
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

impl CommandExecutor for SystemCommandExecutor {
    fn run(&self, cmd: &str, args: &[&str]) -> Result<Output> {
        log::debug!("running {cmd} {}", args.join(" "));
        let Some(timeout) = self.timeout else {
            return Command::new(cmd)
                .args(args)
                .output()
                .map_err(FetchError::from);
        };

        let child = Command::new(cmd)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;
        run_with_timeout(child, cmd, timeout)
    }
}

/// Waits for `child`, killing it once `timeout` elapses.
///
/// Both pipes are drained on helper threads so a chatty child cannot block
/// on a full pipe while we wait.
fn run_with_timeout(mut child: Child, cmd: &str, timeout: Duration) -> Result<Output> {
    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    match child.wait_timeout(timeout)? {
        Some(status) => Ok(Output {
            status,
            stdout: join_drain(stdout)?,
            stderr: join_drain(stderr)?,
        }),
        None => {
            if let Err(err) = child.kill() {
                log::warn!("failed to kill timed out {cmd}: {err}");
            }
            if let Err(err) = child.wait() {
                log::warn!("failed to reap timed out {cmd}: {err}");
            }
            Err(FetchError::CommandTimeout {
                command: cmd.to_owned(),
                seconds: timeout.as_secs(),
            })
        }
    }
}

fn drain<R>(pipe: Option<R>) -> Option<JoinHandle<std::io::Result<Vec<u8>>>>
where
    R: Read + Send + 'static,
{
    pipe.map(|mut reader| {
        std::thread::spawn(move || {
            let mut buf = Vec::new();
            reader.read_to_end(&mut buf)?;
            Ok(buf)
        })
    })
}

fn join_drain(handle: Option<JoinHandle<std::io::Result<Vec<u8>>>>) -> Result<Vec<u8>> {
    let Some(handle) = handle else {
        return Ok(Vec::new());
    };
    let bytes = handle
        .join()
        .map_err(|_| std::io::Error::other("pipe reader thread panicked"))??;
    Ok(bytes)
}

/// Renders the trimmed stderr of a failed command for error messages.
///
/// Falls back to stdout when stderr is empty, since Maven reports build
/// errors on stdout.
#[must_use]
pub fn failure_message(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let trimmed = stderr.trim();
    if !trimmed.is_empty() {
        return trimmed.to_owned();
    }
    String::from_utf8_lossy(&output.stdout).trim().to_owned()
}

/// Returns the shell-style status for a command that could not be started:
/// 127 when the program does not exist, 126 otherwise.
#[must_use]
pub fn spawn_failure_status(err: &std::io::Error) -> i32 {
    if err.kind() == std::io::ErrorKind::NotFound {
        127
    } else {
        126
    }
}

/// Returns the exit status of a finished command as a non-zero integer.
///
/// Commands terminated by a signal have no exit code; they are reported as
/// `128 + signal` on Unix, following shell convention.
#[must_use]
pub fn exit_status_code(output: &Output) -> i32 {
    if let Some(code) = output.status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = output.status.signal() {
            return 128 + signal;
        }
    }
    1
}
