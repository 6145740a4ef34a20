//! Execution of the PCP tools.
//!
//! The client never talks the PCP wire protocol itself; it launches the
//! `pcp_*` executables shipped with pgpool-II and reads what they print.
//! [`CommandRunner`] is the seam between the two: [`SystemRunner`] spawns
//! real processes, [`FakeRunner`] replays scripted output in tests.
//!
//! # Example
//!
//! ```rust,no_run
//! use pcp_client::command::{CommandRunner, SystemRunner};
//!
//! # fn example() -> pcp_client::Result<()> {
//! let output = SystemRunner::new().run("pgpool", &["--version".to_string()], &[])?;
//! println!("{}", output.stderr_lossy());
//! # Ok(())
//! # }
//! ```

use crate::error::{PcpError, Result};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::trace;

/// The PCP tools this client knows how to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PcpProgram {
    /// `pcp_node_count`: number of backend nodes.
    NodeCount,
    /// `pcp_node_info`: detail for one backend node.
    NodeInfo,
    /// `pcp_proc_count`: pgpool child process identifiers.
    ProcCount,
    /// `pcp_proc_info`: per-connection detail of every child process.
    ProcInfo,
    /// `pcp_watchdog_info`: watchdog cluster and quorum state.
    WatchdogInfo,
}

impl PcpProgram {
    /// Executable file name of the tool.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NodeCount => "pcp_node_count",
            Self::NodeInfo => "pcp_node_info",
            Self::ProcCount => "pcp_proc_count",
            Self::ProcInfo => "pcp_proc_info",
            Self::WatchdogInfo => "pcp_watchdog_info",
        }
    }
}

impl fmt::Display for PcpProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Characters that are never allowed in arguments or environment values.
const FORBIDDEN_CHARS: &[char] = &[
    '\0', // Null byte
    '\n', // Newline (would also split a pcppass line)
    '\r', // Carriage return
];

/// Validate a value passed to a child process.
///
/// # Errors
///
/// Returns `InvalidArgument` if the value contains a forbidden character.
pub fn validate_argument(arg: &str, field_name: &str) -> Result<()> {
    if let Some(c) = arg.chars().find(|c| FORBIDDEN_CHARS.contains(c)) {
        return Err(PcpError::invalid_argument(
            field_name,
            format!("contains forbidden character {c:?}"),
        ));
    }
    Ok(())
}

/// Captured result of one child process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Standard output.
    pub stdout: Vec<u8>,
    /// Standard error.
    pub stderr: Vec<u8>,
    /// Exit status code (0 for success, -1 when killed by a signal).
    pub exit_code: i32,
}

impl CommandOutput {
    /// Output of a successful run that printed `stdout`.
    #[must_use]
    pub fn ok(stdout: impl Into<Vec<u8>>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: Vec::new(),
            exit_code: 0,
        }
    }

    /// Output of a failed run that printed `stderr`.
    #[must_use]
    pub fn failed(exit_code: i32, stderr: impl Into<Vec<u8>>) -> Self {
        Self {
            stdout: Vec::new(),
            stderr: stderr.into(),
            exit_code,
        }
    }

    /// Replace standard error.
    #[must_use]
    pub fn with_stderr(mut self, stderr: impl Into<Vec<u8>>) -> Self {
        self.stderr = stderr.into();
        self
    }

    /// Get stdout as a UTF-8 string, replacing invalid characters.
    #[must_use]
    pub fn stdout_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    /// Get stderr as a UTF-8 string, replacing invalid characters.
    #[must_use]
    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }

    /// Check if the command succeeded (exit code 0).
    #[must_use]
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Launches a program and captures its output.
///
/// Implementations must not interpret the exit code; a non-zero exit is
/// still `Ok` and is judged by the caller. `Err` is reserved for failures
/// to run the program at all.
pub trait CommandRunner: Send + Sync {
    /// Run `program` with `args`.
    ///
    /// An empty `env` inherits the parent environment; a non-empty one
    /// replaces it entirely.
    ///
    /// # Errors
    ///
    /// Returns an error if an argument is rejected or the program cannot
    /// be started.
    fn run(
        &self,
        program: &str,
        args: &[String],
        env: &[(String, String)],
    ) -> Result<CommandOutput>;
}

impl<R: CommandRunner + ?Sized> CommandRunner for Box<R> {
    fn run(
        &self,
        program: &str,
        args: &[String],
        env: &[(String, String)],
    ) -> Result<CommandOutput> {
        (**self).run(program, args, env)
    }
}

impl<R: CommandRunner + ?Sized> CommandRunner for &R {
    fn run(
        &self,
        program: &str,
        args: &[String],
        env: &[(String, String)],
    ) -> Result<CommandOutput> {
        (**self).run(program, args, env)
    }
}

/// Runs programs with [`std::process::Command`], blocking until exit.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl SystemRunner {
    /// Create a new system runner.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for SystemRunner {
    fn run(
        &self,
        program: &str,
        args: &[String],
        env: &[(String, String)],
    ) -> Result<CommandOutput> {
        for arg in args {
            validate_argument(arg, "argument")?;
        }
        for (key, value) in env {
            validate_argument(key, "env_key")?;
            validate_argument(value, "env_value")?;
        }

        let mut cmd = Command::new(program);
        cmd.args(args);
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        if !env.is_empty() {
            cmd.env_clear();
            cmd.envs(env.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        }

        let output = cmd
            .output()
            .map_err(|e| PcpError::launch_failed(program, e.to_string()))?;

        let exit_code = output.status.code().unwrap_or(-1);
        trace!(program, exit_code, "command finished");

        Ok(CommandOutput {
            stdout: output.stdout,
            stderr: output.stderr,
            exit_code,
        })
    }
}

/// One invocation seen by a [`FakeRunner`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    /// Program as passed to the runner (full path).
    pub program: String,
    /// Argument vector.
    pub args: Vec<String>,
    /// Explicit environment.
    pub env: Vec<(String, String)>,
}

impl RecordedCall {
    /// File name component of the program path.
    #[must_use]
    pub fn program_name(&self) -> &str {
        program_name(&self.program)
    }
}

fn program_name(program: &str) -> &str {
    Path::new(program)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(program)
}

/// A scripted runner for tests.
///
/// Responses are keyed by program file name, so `/usr/sbin/pcp_node_count`
/// and `pcp_node_count` share one script entry. Unscripted programs fail
/// to launch.
#[derive(Debug, Default)]
pub struct FakeRunner {
    responses: HashMap<String, CommandOutput>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl FakeRunner {
    /// Create a runner with no scripted programs.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Script `pgpool --version` to report `text` on stderr.
    #[must_use]
    pub fn with_version(self, text: &str) -> Self {
        self.respond("pgpool", CommandOutput::ok(Vec::new()).with_stderr(text))
    }

    /// Script the output of `program`.
    #[must_use]
    pub fn respond(mut self, program: &str, output: CommandOutput) -> Self {
        self.responses
            .insert(program_name(program).to_string(), output);
        self
    }

    /// Script a successful PCP tool run printing `stdout`.
    #[must_use]
    pub fn respond_pcp(self, program: PcpProgram, stdout: &str) -> Self {
        self.respond(program.as_str(), CommandOutput::ok(stdout))
    }

    /// All invocations so far, oldest first.
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    /// The most recent invocation of `program`, if any.
    #[must_use]
    pub fn last_call(&self, program: &str) -> Option<RecordedCall> {
        let wanted = program_name(program);
        self.calls
            .lock()
            .iter()
            .rev()
            .find(|call| call.program_name() == wanted)
            .cloned()
    }
}

impl CommandRunner for FakeRunner {
    fn run(
        &self,
        program: &str,
        args: &[String],
        env: &[(String, String)],
    ) -> Result<CommandOutput> {
        self.calls.lock().push(RecordedCall {
            program: program.to_string(),
            args: args.to_vec(),
            env: env.to_vec(),
        });

        self.responses
            .get(program_name(program))
            .cloned()
            .ok_or_else(|| PcpError::launch_failed(program, "No such file or directory"))
    }
}
