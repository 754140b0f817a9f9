// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Runs metric scripts and reads a number from their output.

use crate::error::ExecutionError;
use flume::RecvTimeoutError;
use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// How long a script may run when no other limit is configured.
pub const DEFAULT_SCRIPT_TIMEOUT: Duration = Duration::from_secs(10);

const MAX_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Synchronously runs a script with no arguments and parses its stdout.
///
/// Stdin is closed, stdout is captured, and stderr is captured only to
/// explain a nonzero exit. With a timeout set, the deadline covers both the
/// script and anything it leaves holding its output open: past it, the
/// script's whole process group is killed and the run is reported as
/// [`ExecutionError::Timeout`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptExecutor {
    timeout: Option<Duration>,
}

impl ScriptExecutor {
    /// Creates an executor; `None` lets scripts run for as long as they like.
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }

    /// An executor that waits for scripts indefinitely.
    pub fn unbounded() -> Self {
        Self::new(None)
    }

    /// The execution deadline, if any.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Runs the script and parses its output as a base-10 integer.
    pub fn execute(&self, path: &Path) -> Result<i64, ExecutionError> {
        let output = self.run(path)?;
        output
            .parse::<i64>()
            .map_err(|source| ExecutionError::ParseInt {
                path: path.to_path_buf(),
                output,
                source,
            })
    }

    /// Runs the script and parses its output as a finite floating-point number.
    pub fn execute_float(&self, path: &Path) -> Result<f64, ExecutionError> {
        let output = self.run(path)?;
        parse_finite(path, output).map(|(value, _)| value)
    }

    /// Runs the script and truncates its numeric output toward zero.
    ///
    /// Values whose integer part does not fit an `i64` are rejected rather
    /// than clamped.
    pub fn execute_truncated(&self, path: &Path) -> Result<i64, ExecutionError> {
        let output = self.run(path)?;
        let (value, output) = parse_finite(path, output)?;
        let truncated = value.trunc();
        // 2^63 is exact in f64 while i64::MAX is not.
        if (i64::MIN as f64..-(i64::MIN as f64)).contains(&truncated) {
            Ok(truncated as i64)
        } else {
            Err(ExecutionError::OutOfRange {
                path: path.to_path_buf(),
                output,
            })
        }
    }

    /// Runs the script and returns its stdout with surrounding whitespace trimmed.
    pub fn run(&self, path: &Path) -> Result<String, ExecutionError> {
        let mut command = Command::new(path);
        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.process_group(0);
        }
        let mut child = command.spawn().map_err(|source| ExecutionError::Spawn {
            path: path.to_path_buf(),
            source,
        })?;
        log::trace!("Started {} (pid {})", path.display(), child.id());

        let deadline = self.timeout.map(|timeout| Instant::now() + timeout);
        let (tx, rx) = flume::bounded(2);
        drain(Pipe::Stdout, child.stdout.take(), tx.clone());
        drain(Pipe::Stderr, child.stderr.take(), tx);

        let status = match deadline {
            None => child.wait().map(Some),
            Some(deadline) => wait_until(&mut child, deadline),
        }
        .map_err(|source| ExecutionError::Wait {
            path: path.to_path_buf(),
            source,
        })?;
        let Some(status) = status else {
            return Err(self.timed_out(path));
        };

        // Background jobs of the script may still hold the pipes.
        let (mut stdout, mut stderr) = (None, None);
        while stdout.is_none() || stderr.is_none() {
            let received = match deadline {
                None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
                Some(deadline) => rx.recv_deadline(deadline),
            };
            match received {
                Ok((Pipe::Stdout, buf)) => stdout = Some(buf),
                Ok((Pipe::Stderr, buf)) => stderr = Some(buf),
                Err(RecvTimeoutError::Timeout) => {
                    kill_process_group(&mut child);
                    return Err(self.timed_out(path));
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        let stdout = stdout.unwrap_or_default();
        let stderr = stderr.unwrap_or_default();
        if !status.success() {
            return Err(ExecutionError::Exit {
                path: path.to_path_buf(),
                status,
                stderr: String::from_utf8_lossy(&stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&stdout).trim().to_string())
    }

    fn timed_out(&self, path: &Path) -> ExecutionError {
        ExecutionError::Timeout {
            path: path.to_path_buf(),
            timeout: self.timeout.unwrap_or_default(),
        }
    }
}

impl Default for ScriptExecutor {
    fn default() -> Self {
        Self::new(Some(DEFAULT_SCRIPT_TIMEOUT))
    }
}

fn parse_finite(path: &Path, output: String) -> Result<(f64, String), ExecutionError> {
    match output.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok((value, output)),
        _ => Err(ExecutionError::ParseFloat {
            path: path.to_path_buf(),
            output,
        }),
    }
}

#[derive(Debug, Clone, Copy)]
enum Pipe {
    Stdout,
    Stderr,
}

/// Reads `pipe` to the end on its own thread and sends the bytes to `tx`.
fn drain<R: Read + Send + 'static>(which: Pipe, pipe: Option<R>, tx: flume::Sender<(Pipe, Vec<u8>)>) {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            if let Err(e) = pipe.read_to_end(&mut buf) {
                log::debug!("Failed to read script {:?}: {}", which, e);
            }
        }
        // The receiver is gone once the run has timed out.
        let _ = tx.send((which, buf));
    });
}

/// Waits for the child until `deadline`; kills its process group and reaps
/// it past that. Returns `None` when the deadline was hit.
fn wait_until(child: &mut Child, deadline: Instant) -> std::io::Result<Option<ExitStatus>> {
    let mut poll = Duration::from_millis(1);

    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }

        let now = Instant::now();
        if now >= deadline {
            kill_process_group(child);
            child.wait()?;
            return Ok(None);
        }

        thread::sleep(poll.min(deadline - now));
        poll = (poll * 2).min(MAX_POLL_INTERVAL);
    }
}

/// Kills the script together with every process it started, which releases
/// the output pipes they inherited.
#[cfg(unix)]
fn kill_process_group(child: &mut Child) {
    let Ok(pgid) = libc::pid_t::try_from(child.id()) else {
        log::debug!("pid {} does not fit pid_t", child.id());
        return;
    };
    // SAFETY: kill(2) only takes integers. The script was spawned as the
    // leader of its own group, so `-pgid` addresses it and its descendants.
    if unsafe { libc::kill(-pgid, libc::SIGKILL) } != 0 {
        log::debug!(
            "Failed to kill process group {}: {}",
            pgid,
            std::io::Error::last_os_error()
        );
    }
}

#[cfg(not(unix))]
fn kill_process_group(child: &mut Child) {
    if let Err(e) = child.kill() {
        log::debug!("Failed to kill pid {}: {}", child.id(), e);
    }
}
