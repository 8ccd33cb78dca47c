//! # Process Launching
//!
//! Test invocations are shell command lines, so the [`ShellLauncher`] hands
//! them to the platform shell. The [`Launcher`] trait is the seam the rest of
//! the harness depends on; any closure with the right signature is a
//! launcher too.

use std::io::Read;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crate::errors::Crash;

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Captured result of one finished process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// `None` when the process was terminated by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// stdout followed by stderr, as written to the results log.
    pub fn combined(&self) -> String {
        format!("{}{}", self.stdout, self.stderr)
    }
}

/// Runs a command line to completion.
pub trait Launcher {
    /// Returns the captured output, or a [`Crash`] when the process could not
    /// be started or did not finish within `timeout`.
    fn launch(&self, command_line: &str, timeout: Option<Duration>) -> Result<ProcessOutput, Crash>;
}

impl<F> Launcher for F
where
    F: Fn(&str, Option<Duration>) -> Result<ProcessOutput, Crash>,
{
    fn launch(&self, command_line: &str, timeout: Option<Duration>) -> Result<ProcessOutput, Crash> {
        self(command_line, timeout)
    }
}

/// Runs command lines through `sh -c` (`cmd /C` on Windows).
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellLauncher;

impl ShellLauncher {
    fn command(command_line: &str) -> Command {
        #[cfg(windows)]
        {
            let mut cmd = Command::new("cmd");
            cmd.arg("/C").arg(command_line);
            cmd
        }
        #[cfg(not(windows))]
        {
            let mut cmd = Command::new("sh");
            cmd.arg("-c").arg(command_line);
            // Own process group, so a timeout can take down the whole pipeline.
            #[cfg(unix)]
            std::os::unix::process::CommandExt::process_group(&mut cmd, 0);
            cmd
        }
    }
}

impl Launcher for ShellLauncher {
    fn launch(&self, command_line: &str, timeout: Option<Duration>) -> Result<ProcessOutput, Crash> {
        let spawn_error = |message: String| Crash::Spawn {
            command: command_line.to_string(),
            message,
        };

        let mut child = Self::command(command_line)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| spawn_error(e.to_string()))?;
        tracing::debug!(pid = child.id(), "launched: {command_line}");

        // Drain both pipes concurrently so a chatty child never blocks on a full pipe.
        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);

        let status = match timeout {
            Some(limit) => wait_with_timeout(&mut child, limit).map_err(|e| spawn_error(e.to_string()))?,
            None => Some(child.wait().map_err(|e| spawn_error(e.to_string()))?),
        };

        let Some(status) = status else {
            // Drain threads are left detached: a surviving descendant may
            // still hold the pipes open.
            let seconds = timeout.map(|t| t.as_secs()).unwrap_or_default();
            tracing::warn!("killed after {seconds}s: {command_line}");
            return Err(Crash::Timeout {
                seconds,
                command: command_line.to_string(),
            });
        };

        let stdout = collect(stdout);
        let stderr = collect(stderr);

        Ok(ProcessOutput {
            code: status.code(),
            stdout,
            stderr,
        })
    }
}

/// Waits for `child`, killing it once `limit` has passed. `Ok(None)` means it was killed.
fn wait_with_timeout(child: &mut Child, limit: Duration) -> std::io::Result<Option<ExitStatus>> {
    let start = Instant::now();
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if start.elapsed() >= limit {
            kill_tree(child);
            let _ = child.wait();
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

/// Kills the child's process group on Unix, or just the child elsewhere.
fn kill_tree(child: &mut Child) {
    #[cfg(unix)]
    {
        let group = format!("-{}", child.id());
        let killed = Command::new("kill")
            .args(["-KILL", "--", &group])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false);
        if killed {
            return;
        }
        tracing::debug!(pid = child.id(), "could not signal process group, killing the shell only");
    }
    let _ = child.kill();
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    })
}

fn collect(handle: Option<thread::JoinHandle<String>>) -> String {
    handle
        .and_then(|h| h.join().ok())
        .unwrap_or_default()
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn captures_output_and_exit_code() {
        let out = ShellLauncher
            .launch("echo hello; echo oops >&2; exit 3", None)
            .unwrap();
        assert_eq!(out.code, Some(3));
        assert_eq!(out.stdout, "hello\n");
        assert_eq!(out.stderr, "oops\n");
        assert!(!out.success());
    }

    #[test]
    fn timeout_kills_the_process() {
        let started = Instant::now();
        let result = ShellLauncher.launch("exec sleep 5", Some(Duration::from_millis(200)));
        assert!(matches!(result, Err(Crash::Timeout { .. })));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[test]
    fn timeout_covers_commands_the_shell_forks() {
        let started = Instant::now();
        let result = ShellLauncher.launch("sleep 6; true", Some(Duration::from_millis(300)));
        assert!(matches!(result, Err(Crash::Timeout { .. })));
        assert!(started.elapsed() < Duration::from_secs(3));
    }

    #[test]
    fn timeout_covers_pipelines() {
        let started = Instant::now();
        let result = ShellLauncher.launch("echo start; sleep 6 | cat", Some(Duration::from_millis(300)));
        assert!(matches!(result, Err(Crash::Timeout { .. })));
        assert!(started.elapsed() < Duration::from_secs(3));
    }

    #[test]
    fn fast_commands_finish_before_the_timeout() {
        let out = ShellLauncher
            .launch("echo a && echo b", Some(Duration::from_secs(5)))
            .unwrap();
        assert!(out.success());
        assert_eq!(out.stdout, "a\nb\n");
    }

    #[test]
    fn closures_are_launchers() {
        let fake = |line: &str, _: Option<Duration>| -> Result<ProcessOutput, Crash> {
            Ok(ProcessOutput {
                code: Some(0),
                stdout: line.to_string(),
                stderr: String::new(),
            })
        };
        assert_eq!(fake.launch("abc", None).unwrap().stdout, "abc");
    }
}
