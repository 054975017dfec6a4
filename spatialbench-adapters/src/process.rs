//! Subprocess Execution
//!
//! Runs one backend executable to completion with a wall-clock timeout.
//! Stdout and stderr are streamed line-by-line into the log as they arrive
//! (backends can run for minutes; buffering everything silently would make
//! hangs indistinguishable from slow queries) and captured for pattern
//! extraction afterwards.

use spatialbench_core::FailureKind;
use std::io::{BufRead, BufReader, Read};
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, warn};

/// Errors running a backend process to completion.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// The executable could not be started
    #[error("Failed to spawn {command}: {source}")]
    Spawn {
        /// Command line that failed to start
        command: String,
        /// Underlying OS error
        source: std::io::Error,
    },

    /// The process exited with a non-zero status
    #[error("Exited with status {code}: {tail}")]
    NonZeroExit {
        /// Exit code (-1 when killed by a signal)
        code: i32,
        /// Last few lines of stderr, or stdout when stderr was empty
        tail: String,
    },

    /// The process exceeded its wall-clock timeout and was killed
    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    /// Waiting on the process failed
    #[error("I/O error while capturing output: {0}")]
    Capture(#[from] std::io::Error),
}

impl ProcessError {
    /// Map a process error onto the outcome failure taxonomy.
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            ProcessError::Spawn { .. } => FailureKind::Spawn,
            ProcessError::NonZeroExit { .. } => FailureKind::NonZeroExit,
            ProcessError::Timeout(_) => FailureKind::Timeout,
            ProcessError::Capture(_) => FailureKind::Spawn,
        }
    }
}

/// Captured output of a completed process.
#[derive(Debug)]
pub struct ProcessOutput {
    /// Stdout, complete
    pub stdout: String,
    /// Stderr, complete
    pub stderr: String,
}

fn stream_lines<R: Read + Send + 'static>(
    source: R,
    label: String,
) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut captured = String::new();
        for line in BufReader::new(source).lines() {
            match line {
                Ok(line) => {
                    debug!(target: "backend", "{} {}", label, line);
                    captured.push_str(&line);
                    captured.push('\n');
                }
                Err(_) => break,
            }
        }
        captured
    })
}

/// Send SIGTERM to a process. Returns `Err` if the signal could not be delivered.
fn send_sigterm(pid: u32) -> Result<(), std::io::Error> {
    let ret = unsafe { libc::kill(pid as libc::pid_t, libc::SIGTERM) };
    if ret == -1 {
        Err(std::io::Error::last_os_error())
    } else {
        Ok(())
    }
}

fn is_alive(child: &mut Child) -> bool {
    matches!(child.try_wait(), Ok(None))
}

/// Timeout: send SIGTERM, give the process 500ms to exit, then SIGKILL.
fn terminate(child: &mut Child, timeout: Duration, label: &str) -> ProcessError {
    warn!("{} timed out after {:?}, terminating", label, timeout);
    let _ = send_sigterm(child.id());

    let grace_deadline = Instant::now() + Duration::from_millis(500);
    while Instant::now() < grace_deadline {
        if !is_alive(child) {
            break;
        }
        thread::sleep(Duration::from_millis(20));
    }

    if is_alive(child) {
        let _ = child.kill();
    }
    let _ = child.wait();

    ProcessError::Timeout(timeout)
}

/// Run `command` to completion, streaming its output under `label`.
///
/// Returns the captured output on a zero exit status. A non-zero exit carries
/// the tail of stderr (or stdout when stderr is empty) for diagnostics.
pub fn run_to_completion(
    mut command: Command,
    label: &str,
    timeout: Duration,
) -> Result<ProcessOutput, ProcessError> {
    let command_display = format!("{:?}", command);
    debug!("{} exec: {}", label, command_display);

    command.stdin(Stdio::null()).stdout(Stdio::piped()).stderr(Stdio::piped());

    let mut child = command.spawn().map_err(|source| ProcessError::Spawn {
        command: command_display,
        source,
    })?;

    // Reader threads drain the pipes while we poll for exit; a full pipe
    // buffer would otherwise deadlock a chatty backend against our wait.
    let stdout_thread = match child.stdout.take() {
        Some(out) => stream_lines(out, label.to_string()),
        None => thread::spawn(String::new),
    };
    let stderr_thread = match child.stderr.take() {
        Some(err) => stream_lines(err, format!("{} [stderr]", label)),
        None => thread::spawn(String::new),
    };

    let start = Instant::now();
    let status = loop {
        match child.try_wait()? {
            Some(status) => break status,
            None => {
                if start.elapsed() >= timeout {
                    let err = terminate(&mut child, timeout, label);
                    let _ = stdout_thread.join();
                    let _ = stderr_thread.join();
                    return Err(err);
                }
                thread::sleep(Duration::from_millis(25));
            }
        }
    };

    let stdout = stdout_thread.join().unwrap_or_default();
    let stderr = stderr_thread.join().unwrap_or_default();

    if !status.success() {
        let tail_source = if stderr.trim().is_empty() { &stdout } else { &stderr };
        let tail: String = tail_source
            .lines()
            .rev()
            .take(5)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect::<Vec<_>>()
            .join(" | ");
        return Err(ProcessError::NonZeroExit {
            code: status.code().unwrap_or(-1),
            tail,
        });
    }

    Ok(ProcessOutput { stdout, stderr })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_captures_stdout() {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg("echo hello; echo world");
        let out = run_to_completion(cmd, "[Test]", Duration::from_secs(5)).unwrap();
        assert_eq!(out.stdout, "hello\nworld\n");
    }

    #[test]
    fn test_nonzero_exit_carries_stderr_tail() {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg("echo oops >&2; exit 3");
        let err = run_to_completion(cmd, "[Test]", Duration::from_secs(5)).unwrap_err();
        match err {
            ProcessError::NonZeroExit { code, tail } => {
                assert_eq!(code, 3);
                assert!(tail.contains("oops"));
            }
            other => panic!("expected NonZeroExit, got {:?}", other),
        }
    }

    #[test]
    fn test_spawn_failure() {
        let cmd = Command::new("/nonexistent/binary");
        let err = run_to_completion(cmd, "[Test]", Duration::from_secs(5)).unwrap_err();
        assert_eq!(err.failure_kind(), FailureKind::Spawn);
    }

    #[test]
    fn test_timeout_kills_process() {
        let mut cmd = Command::new("sleep");
        cmd.arg("30");
        let start = Instant::now();
        let err = run_to_completion(cmd, "[Test]", Duration::from_millis(200)).unwrap_err();
        assert_eq!(err.failure_kind(), FailureKind::Timeout);
        assert!(start.elapsed() < Duration::from_secs(5));
    }
}
