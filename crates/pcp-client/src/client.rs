//! The PCP client.
//!
//! [`PcpClient`] ties the pieces together. Building one validates the
//! options, asks `pgpool --version` which release is installed, picks the
//! matching [`CredentialStrategy`] and, for pgpool-II 3.5 and above without
//! a caller supplied pcppass file, writes a transient one. Every operation
//! then runs one PCP tool and decodes its output.

use crate::command::{CommandOutput, CommandRunner, PcpProgram, SystemRunner};
use crate::decode::{
    decode_node_count, decode_node_info, decode_proc_count, decode_proc_info,
    decode_watchdog_info,
};
use crate::error::{PcpError, Result};
use crate::models::{NodeInfo, ProcInfo, ProcInfoSummary, WatchdogInfo};
use crate::options::{PcpOptions, PcpPrograms};
use crate::passfile::PassFile;
use crate::strategy::CredentialStrategy;
use crate::version::Version;
use std::path::Path;
use tracing::{debug, info, warn};

/// Client for one pgpool-II instance.
///
/// A client is meant to be used from one thread at a time. The transient
/// pcppass file, if any, is removed by [`PcpClient::cleanup`] or when the
/// client is dropped.
#[derive(Debug)]
pub struct PcpClient<R: CommandRunner = SystemRunner> {
    runner: R,
    programs: PcpPrograms,
    version: Version,
    strategy: CredentialStrategy,
    pass_file: Option<PassFile>,
}

impl PcpClient<SystemRunner> {
    /// Build a client that launches the installed PCP tools.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for invalid options, a version error
    /// if the pgpool-II release cannot be determined, or an IO error if
    /// the transient pcppass file cannot be written.
    pub fn new(options: PcpOptions) -> Result<Self> {
        Self::with_runner(options, SystemRunner::new())
    }
}

impl<R: CommandRunner> PcpClient<R> {
    /// Build a client on top of a custom runner.
    ///
    /// # Errors
    ///
    /// Same as [`PcpClient::new`].
    pub fn with_runner(options: PcpOptions, runner: R) -> Result<Self> {
        options.validate()?;

        let version = probe_version(&runner, &options.programs.pgpool)?;

        let (strategy, pass_file) = if version.supports_pass_file() {
            let pass_file = match options.pass_file.as_deref() {
                Some(path) if !path.as_os_str().is_empty() => {
                    PassFile::Caller(path.to_path_buf())
                }
                _ => {
                    let password = options.password().ok_or_else(|| {
                        PcpError::invalid_config("PCP password must be specified")
                    })?;
                    PassFile::create(
                        &options.hostname,
                        options.port,
                        &options.username,
                        password,
                    )?
                }
            };
            let strategy = CredentialStrategy::pass_file(&options, pass_file.path());
            (strategy, Some(pass_file))
        } else {
            (CredentialStrategy::positional(&options)?, None)
        };

        info!(
            %version,
            strategy = strategy.name(),
            host = %options.hostname,
            port = options.port,
            "pcp client ready"
        );

        Ok(Self {
            runner,
            programs: options.programs,
            version,
            strategy,
            pass_file,
        })
    }

    /// The pgpool-II release found at construction.
    #[must_use]
    pub fn version(&self) -> Version {
        self.version
    }

    /// Whether the PCP tools read credentials from a pcppass file.
    #[must_use]
    pub fn supports_pass_file(&self) -> bool {
        self.version.supports_pass_file()
    }

    /// Whether the pcppass file in use was supplied by the caller.
    #[must_use]
    pub fn uses_caller_pass_file(&self) -> bool {
        self.pass_file.as_ref().is_some_and(PassFile::is_caller_owned)
    }

    /// Location of the pcppass file in use, if any.
    #[must_use]
    pub fn pass_file_path(&self) -> Option<&Path> {
        self.pass_file.as_ref().map(PassFile::path)
    }

    /// The invocation strategy chosen at construction.
    #[must_use]
    pub fn strategy(&self) -> &CredentialStrategy {
        &self.strategy
    }

    /// The underlying runner.
    #[must_use]
    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Number of backend nodes.
    ///
    /// # Errors
    ///
    /// Returns an error if the tool fails or prints something other than a
    /// number.
    pub fn node_count(&self) -> Result<u32> {
        let program = PcpProgram::NodeCount;
        let output = self.exec(program, &[])?;
        decode_node_count(&output.stdout_lossy())
            .map_err(|e| PcpError::decode(program.as_str(), e.to_string()))
    }

    /// Detail for backend node `node_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the tool fails or its output cannot be read.
    pub fn node_info(&self, node_id: u32) -> Result<NodeInfo> {
        let args = self.strategy.node_id_args(node_id);
        let output = self.exec(PcpProgram::NodeInfo, &args)?;
        decode_node_info(output.stdout.as_slice())
    }

    /// Per-process identifiers from `pcp_proc_count`, uninterpreted.
    ///
    /// # Errors
    ///
    /// Returns an error if the tool fails.
    pub fn proc_count(&self) -> Result<Vec<String>> {
        let output = self.exec(PcpProgram::ProcCount, &[])?;
        Ok(decode_proc_count(&output.stdout_lossy()))
    }

    /// Every connection slot of every pgpool child process.
    ///
    /// # Errors
    ///
    /// Returns an error if the tool fails or its output cannot be read.
    pub fn proc_info(&self) -> Result<Vec<ProcInfo>> {
        let output = self.exec(PcpProgram::ProcInfo, &["--all".to_string()])?;
        decode_proc_info(output.stdout.as_slice())
    }

    /// Connection slots per database, split by connection state.
    ///
    /// # Errors
    ///
    /// Same as [`PcpClient::proc_info`].
    pub fn proc_info_summary(&self) -> Result<ProcInfoSummary> {
        let procs = self.proc_info()?;
        Ok(ProcInfoSummary::summarize(&procs))
    }

    /// Watchdog cluster and quorum state.
    ///
    /// # Errors
    ///
    /// Returns an error if the tool fails or its output cannot be read.
    pub fn watchdog_info(&self) -> Result<WatchdogInfo> {
        let output = self.exec(PcpProgram::WatchdogInfo, &["-v".to_string()])?;
        decode_watchdog_info(output.stdout.as_slice())
    }

    /// Remove the transient pcppass file, if this client wrote one.
    ///
    /// A caller supplied file is left alone. Calling this more than once
    /// is harmless. Once a transient file is gone the client cannot run
    /// PCP tools any more; every operation returns a configuration error.
    ///
    /// # Errors
    ///
    /// Returns an IO error if the file cannot be removed.
    pub fn cleanup(&mut self) -> Result<()> {
        if self.uses_caller_pass_file() {
            return Ok(());
        }
        match self.pass_file.take() {
            Some(pass_file) => pass_file.remove(),
            None => Ok(()),
        }
    }

    fn exec(&self, program: PcpProgram, args: &[String]) -> Result<CommandOutput> {
        let pass_file_removed =
            matches!(self.strategy, CredentialStrategy::PassFile { .. }) && self.pass_file.is_none();
        if pass_file_removed {
            return Err(PcpError::invalid_config(
                "pcppass file was removed by cleanup; build a new client",
            ));
        }

        let path = self.programs.path_for(program);
        let path = path.to_string_lossy();
        let invocation = self.strategy.build(args);

        debug!(program = %path, args = %invocation, "running pcp tool");
        let output = self.runner.run(&path, &invocation.args, &invocation.env)?;

        if !output.success() {
            return Err(PcpError::command_failed(
                path,
                output.exit_code,
                &output.stderr_lossy(),
            ));
        }
        Ok(output)
    }
}

impl<R: CommandRunner> Drop for PcpClient<R> {
    fn drop(&mut self) {
        if let Err(e) = self.cleanup() {
            warn!(error = %e, "failed to remove transient pcppass file");
        }
    }
}

/// Run `pgpool --version` and parse the release it reports.
///
/// pgpool-II prints its banner on stderr; stdout is used when stderr is
/// empty.
fn probe_version<R: CommandRunner>(runner: &R, pgpool: &Path) -> Result<Version> {
    let program = pgpool.to_string_lossy();
    let output = runner
        .run(&program, &["--version".to_string()], &[])
        .map_err(|e| PcpError::version_probe(e.to_string()))?;

    if !output.success() {
        return Err(PcpError::version_probe(format!(
            "{program} exited with status {} ({})",
            output.exit_code,
            output.stderr_lossy().trim()
        )));
    }

    let stderr = output.stderr_lossy();
    let banner = if stderr.trim().is_empty() {
        output.stdout_lossy()
    } else {
        stderr
    };

    let version = Version::from_banner(&banner)?;
    debug!(%version, "detected pgpool-II version");
    Ok(version)
}
