//! Bounded, synchronous process invocation.
//!
//! Provides a trait-based abstraction over running external commands so the
//! `which` fallback and the `joern --version` check can be tested without
//! spawning real processes.

use std::collections::HashMap;
use std::io::Read;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;

/// How often a running child is polled for completion
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Which pipe a reader thread drained
#[derive(Debug, Clone, Copy)]
enum Stream {
    Stdout,
    Stderr,
}

/// Errors from running an external command
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("{0} is not installed or not in PATH")]
    NotFound(String),

    #[error("failed to spawn {0}: {1}")]
    Spawn(String, String),

    #[error("{program} timed out after {}ms", .timeout.as_millis())]
    Timeout { program: String, timeout: Duration },

    #[error("{program} exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: String,
        stderr: String,
    },
}

/// Captured output of a successful command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Output with the given stdout and empty stderr
    pub fn stdout(stdout: &str) -> Self {
        Self {
            stdout: stdout.to_string(),
            stderr: String::new(),
        }
    }
}

/// Trait abstracting command execution for testability
pub trait CommandRunner: Send + Sync {
    /// Run `program` with `args`, capturing stdout and stderr.
    ///
    /// Succeeds only when the process exits with status zero before `timeout`.
    fn run(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<CommandOutput, CommandError>;
}

/// Real implementation spawning child processes
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemCommandRunner;

impl SystemCommandRunner {
    pub fn new() -> Self {
        Self
    }

    fn spawn_reader<R: Read + Send + 'static>(
        pipe: Option<R>,
        stream: Stream,
        tx: Sender<(Stream, String)>,
    ) {
        thread::spawn(move || {
            let mut buf = Vec::new();
            if let Some(mut pipe) = pipe {
                let _ = pipe.read_to_end(&mut buf);
            }
            let _ = tx.send((stream, String::from_utf8_lossy(&buf).to_string()));
        });
    }

    fn timeout_error(program: &str, timeout: Duration) -> CommandError {
        CommandError::Timeout {
            program: program.to_string(),
            timeout,
        }
    }

    fn wait_until(
        child: &mut Child,
        program: &str,
        timeout: Duration,
        deadline: Instant,
    ) -> Result<ExitStatus, CommandError> {
        loop {
            match child.try_wait() {
                Ok(Some(status)) => return Ok(status),
                Ok(None) if Instant::now() >= deadline => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(Self::timeout_error(program, timeout));
                }
                Ok(None) => thread::sleep(POLL_INTERVAL),
                Err(e) => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(CommandError::Spawn(program.to_string(), e.to_string()));
                }
            }
        }
    }

    /// Collect both pipe buffers before `deadline`.
    ///
    /// Descendants of the child may hold the pipes open after it exits; the
    /// readers are abandoned in that case.
    fn collect_output(
        rx: &Receiver<(Stream, String)>,
        program: &str,
        timeout: Duration,
        deadline: Instant,
    ) -> Result<CommandOutput, CommandError> {
        let mut output = CommandOutput::default();
        for _ in 0..2 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match rx.recv_timeout(remaining) {
                Ok((Stream::Stdout, text)) => output.stdout = text,
                Ok((Stream::Stderr, text)) => output.stderr = text,
                Err(RecvTimeoutError::Timeout) => {
                    tracing::debug!(program, "Output pipes still open at deadline");
                    return Err(Self::timeout_error(program, timeout));
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        Ok(output)
    }
}

impl CommandRunner for SystemCommandRunner {
    fn run(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<CommandOutput, CommandError> {
        tracing::debug!(program, ?args, ?timeout, "Running command");

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    CommandError::NotFound(program.to_string())
                } else {
                    CommandError::Spawn(program.to_string(), e.to_string())
                }
            })?;

        let deadline = Instant::now() + timeout;

        // Drain both pipes on their own threads so a chatty child cannot block
        let (tx, rx) = mpsc::channel();
        Self::spawn_reader(child.stdout.take(), Stream::Stdout, tx.clone());
        Self::spawn_reader(child.stderr.take(), Stream::Stderr, tx);

        let status = Self::wait_until(&mut child, program, timeout, deadline)?;
        let CommandOutput { stdout, stderr } =
            Self::collect_output(&rx, program, timeout, deadline)?;

        if !status.success() {
            return Err(CommandError::Failed {
                program: program.to_string(),
                status: status.to_string(),
                stderr: stderr.trim().to_string(),
            });
        }

        Ok(CommandOutput { stdout, stderr })
    }
}

/// A command invocation recorded by [`MockCommandRunner`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockCommand {
    pub program: String,
    pub args: Vec<String>,
    pub timeout: Duration,
}

/// Mock implementation for testing.
///
/// Responses are keyed by the full command line (`program arg1 arg2`).
/// Unscripted commands behave as if the program is not installed.
#[derive(Debug, Default, Clone)]
pub struct MockCommandRunner {
    responses: Arc<Mutex<HashMap<String, Result<CommandOutput, CommandError>>>>,
    /// Record of commands executed
    pub command_log: Arc<Mutex<Vec<MockCommand>>>,
}

impl MockCommandRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the result for a command line
    pub fn respond(&self, command_line: &str, result: Result<CommandOutput, CommandError>) {
        self.responses
            .lock()
            .unwrap()
            .insert(command_line.to_string(), result);
    }

    /// Script a successful command printing `stdout`
    pub fn respond_ok(&self, command_line: &str, stdout: &str) {
        self.respond(command_line, Ok(CommandOutput::stdout(stdout)));
    }

    /// Get the command log
    pub fn get_commands(&self) -> Vec<MockCommand> {
        self.command_log.lock().unwrap().clone()
    }
}

impl CommandRunner for MockCommandRunner {
    fn run(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<CommandOutput, CommandError> {
        self.command_log.lock().unwrap().push(MockCommand {
            program: program.to_string(),
            args: args.iter().map(ToString::to_string).collect(),
            timeout,
        });

        let mut command_line = program.to_string();
        for arg in args {
            command_line.push(' ');
            command_line.push_str(arg);
        }

        self.responses
            .lock()
            .unwrap()
            .get(&command_line)
            .cloned()
            .unwrap_or_else(|| Err(CommandError::NotFound(program.to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_unscripted_is_not_found() {
        let runner = MockCommandRunner::new();
        let result = runner.run("which", &["joern"], Duration::from_secs(5));
        assert_eq!(result, Err(CommandError::NotFound("which".to_string())));
    }

    #[test]
    fn test_mock_scripted_response_and_log() {
        let runner = MockCommandRunner::new();
        runner.respond_ok("which joern", "/usr/bin/joern\n");

        let output = runner
            .run("which", &["joern"], Duration::from_secs(5))
            .unwrap();
        assert_eq!(output.stdout, "/usr/bin/joern\n");

        let commands = runner.get_commands();
        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].program, "which");
        assert_eq!(commands[0].args, vec!["joern".to_string()]);
        assert_eq!(commands[0].timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_error_messages() {
        let err = CommandError::Timeout {
            program: "joern".to_string(),
            timeout: Duration::from_secs(5),
        };
        assert_eq!(err.to_string(), "joern timed out after 5000ms");

        let err = CommandError::NotFound("which".to_string());
        assert_eq!(err.to_string(), "which is not installed or not in PATH");
    }

    #[cfg(unix)]
    #[test]
    fn test_system_runner_missing_program() {
        let result = SystemCommandRunner::new().run(
            "bingo-definitely-not-a-real-program",
            &[],
            Duration::from_secs(1),
        );
        assert!(matches!(result, Err(CommandError::NotFound(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_system_runner_captures_stdout() {
        let output = SystemCommandRunner::new()
            .run("sh", &["-c", "echo joern-v2"], Duration::from_secs(5))
            .unwrap();
        assert_eq!(output.stdout.trim(), "joern-v2");
    }

    #[cfg(unix)]
    #[test]
    fn test_system_runner_non_zero_exit() {
        let result = SystemCommandRunner::new().run(
            "sh",
            &["-c", "echo broken >&2; exit 3"],
            Duration::from_secs(5),
        );
        match result {
            Err(CommandError::Failed { program, stderr, .. }) => {
                assert_eq!(program, "sh");
                assert_eq!(stderr, "broken");
            }
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_system_runner_times_out() {
        let started = Instant::now();
        let result = SystemCommandRunner::new().run("sleep", &["5"], Duration::from_millis(200));

        assert!(matches!(result, Err(CommandError::Timeout { .. })));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[cfg(unix)]
    #[test]
    fn test_system_runner_times_out_when_background_child_holds_pipes() {
        let started = Instant::now();
        let result = SystemCommandRunner::new().run(
            "sh",
            &["-c", "sleep 4 & echo v1"],
            Duration::from_millis(500),
        );

        assert!(
            matches!(result, Err(CommandError::Timeout { .. })),
            "expected Timeout, got {result:?}"
        );
        assert!(started.elapsed() < Duration::from_secs(2));
    }
}
