//! Rendering of command results.
//!
//! Every result type has a fixed-width table rendering for terminals; JSON
//! output is the serde form of the same value.

use std::io::Write;

use pcp_client::{NodeInfo, ProcInfo, ProcInfoSummary, WatchdogInfo};
use serde::Serialize;

use crate::cli::Format;
use crate::error::CliError;

/// A result that can be printed as a table.
pub trait TableDisplay {
    /// Write the value as a human-readable table.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError>;
}

/// Print `value` to `writer` in `format`.
///
/// # Errors
///
/// Returns an error if JSON serialization or writing fails.
pub fn render<W, T>(writer: &mut W, format: Format, value: &T) -> Result<(), CliError>
where
    W: Write,
    T: Serialize + TableDisplay,
{
    match format {
        Format::Table => value.write_table(writer),
        Format::Json => {
            serde_json::to_writer_pretty(&mut *writer, value)
                .map_err(|e| CliError::Format(format!("cannot encode result as JSON: {e}")))?;
            writeln!(writer)?;
            Ok(())
        }
    }
}

/// Installed pgpool-II release and the invocation it implies.
#[derive(Debug, Clone, Serialize)]
pub struct VersionReport {
    /// pgpool-II release.
    pub version: String,
    /// Whether a pcppass file is used.
    pub supports_pass_file: bool,
    /// Invocation strategy name.
    pub strategy: String,
}

impl TableDisplay for VersionReport {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        writeln!(writer, "pgpool-II Version:  {}", self.version)?;
        writeln!(writer, "pcppass Support:    {}", yes_no(self.supports_pass_file))?;
        writeln!(writer, "Credentials:        {}", self.strategy)?;
        Ok(())
    }
}

/// Backend node count.
#[derive(Debug, Clone, Serialize)]
pub struct NodeCount {
    /// Number of backend nodes.
    pub count: u32,
}

impl TableDisplay for NodeCount {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        writeln!(writer, "Backend Nodes: {}", self.count)?;
        Ok(())
    }
}

/// Child process identifiers.
#[derive(Debug, Clone, Serialize)]
pub struct ProcCount {
    /// Identifiers as printed by `pcp_proc_count`.
    pub processes: Vec<String>,
}

impl TableDisplay for ProcCount {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        if self.processes.is_empty() {
            writeln!(writer, "No child processes")?;
            return Ok(());
        }
        for pid in &self.processes {
            writeln!(writer, "{pid}")?;
        }
        writeln!(writer)?;
        writeln!(writer, "Total: {} process(es)", self.processes.len())?;
        Ok(())
    }
}

/// Connection slot listing.
#[derive(Debug, Clone, Serialize)]
pub struct ProcList {
    /// Slots in output order.
    pub processes: Vec<ProcInfo>,
}

impl TableDisplay for ProcList {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        if self.processes.is_empty() {
            writeln!(writer, "No connection slots")?;
            return Ok(());
        }

        writeln!(writer, "{:<24}  {:<16}  {:<9}", "DATABASE", "USERNAME", "CONNECTED")?;
        writeln!(writer, "{}", "─".repeat(53))?;

        for proc_info in &self.processes {
            writeln!(
                writer,
                "{:<24}  {:<16}  {:<9}",
                truncate(&proc_info.database, 24),
                truncate(&proc_info.username, 16),
                yes_no(proc_info.connected)
            )?;
        }

        let connected = self.processes.iter().filter(|p| p.connected).count();
        writeln!(writer)?;
        writeln!(
            writer,
            "Total: {} slot(s), {connected} connected",
            self.processes.len()
        )?;
        Ok(())
    }
}

impl TableDisplay for NodeInfo {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        writeln!(writer, "Backend Node")?;
        writeln!(writer, "══════════════════════════════════")?;
        writeln!(writer, "Hostname:  {}", self.hostname)?;
        writeln!(writer, "Port:      {}", self.port)?;
        writeln!(writer, "Status:    {} ({})", self.status, self.status_code)?;
        writeln!(writer, "Weight:    {:.6}", self.weight)?;
        writeln!(writer, "Role:      {}", self.role)?;
        Ok(())
    }
}

impl TableDisplay for WatchdogInfo {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        writeln!(writer, "Watchdog Cluster")?;
        writeln!(writer, "══════════════════════════════════")?;
        writeln!(writer, "Total Nodes:         {}", self.total_nodes)?;
        writeln!(writer, "Remote Nodes:        {}", self.remote_nodes)?;
        writeln!(writer, "Alive Remote Nodes:  {}", self.alive_remote_nodes)?;
        writeln!(
            writer,
            "Quorum:              {} ({})",
            self.quorum(),
            self.quorum_state_code
        )?;
        writeln!(writer, "VIP Up Locally:      {}", yes_no(self.vip))?;
        Ok(())
    }
}

impl TableDisplay for ProcInfoSummary {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        let mut databases: Vec<&String> = self.active.keys().chain(self.inactive.keys()).collect();
        databases.sort();
        databases.dedup();

        if databases.is_empty() {
            writeln!(writer, "No connection slots")?;
            return Ok(());
        }

        writeln!(writer, "{:<24}  {:>8}  {:>8}", "DATABASE", "ACTIVE", "INACTIVE")?;
        writeln!(writer, "{}", "─".repeat(44))?;

        for database in databases {
            writeln!(
                writer,
                "{:<24}  {:>8}  {:>8}",
                truncate(database, 24),
                self.active_for(database),
                self.inactive_for(database)
            )?;
        }
        Ok(())
    }
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

/// Shorten `s` to at most `max_len` characters, marking the cut with `...`.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len > 3 {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{head}...")
    } else {
        s.chars().take(max_len).collect()
    }
}
