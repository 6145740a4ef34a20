//! Subcommand execution.
//!
//! Every subcommand runs exactly one client operation and writes the
//! result in the selected format.

use std::io::Write;

use pcp_client::{CommandRunner, PcpClient};
use tracing::debug;

use crate::cli::{Commands, Format};
use crate::error::CliError;
use crate::output::{render, NodeCount, ProcCount, ProcList, VersionReport};

/// Runs subcommands against one client.
pub struct PcpCommand<'a, R: CommandRunner> {
    client: &'a PcpClient<R>,
}

impl<'a, R: CommandRunner> PcpCommand<'a, R> {
    /// Create a command executor for `client`.
    #[must_use]
    pub fn new(client: &'a PcpClient<R>) -> Self {
        Self { client }
    }

    /// Execute a subcommand.
    ///
    /// # Errors
    ///
    /// Returns an error if the PCP tool fails or output cannot be written.
    pub fn execute<W: Write>(
        &self,
        writer: &mut W,
        format: Format,
        command: &Commands,
    ) -> Result<(), CliError> {
        debug!(?command, "executing");

        match command {
            Commands::Version => {
                let report = VersionReport {
                    version: self.client.version().to_string(),
                    supports_pass_file: self.client.supports_pass_file(),
                    strategy: self.client.strategy().name().to_string(),
                };
                render(writer, format, &report)?;
            }
            Commands::NodeCount => {
                let count = NodeCount {
                    count: self.client.node_count()?,
                };
                render(writer, format, &count)?;
            }
            Commands::NodeInfo { id } => {
                let info = self.client.node_info(*id)?;
                render(writer, format, &info)?;
            }
            Commands::ProcCount => {
                let count = ProcCount {
                    processes: self.client.proc_count()?,
                };
                render(writer, format, &count)?;
            }
            Commands::ProcInfo => {
                let list = ProcList {
                    processes: self.client.proc_info()?,
                };
                render(writer, format, &list)?;
            }
            Commands::ProcSummary => {
                let summary = self.client.proc_info_summary()?;
                render(writer, format, &summary)?;
            }
            Commands::Watchdog => {
                let info = self.client.watchdog_info()?;
                render(writer, format, &info)?;
            }
        }
        Ok(())
    }
}
