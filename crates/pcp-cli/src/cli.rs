//! Command-line argument parsing with clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use pcp_client::PcpOptions;
use pcp_client::options::{DEFAULT_BIN_DIR, DEFAULT_PGPOOL, DEFAULT_PORT, DEFAULT_TIMEOUT};

/// pcpctl - query a pgpool-II instance through its PCP tools.
#[derive(Parser, Debug, Clone)]
#[command(name = "pcpctl")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Host pgpool-II listens on for PCP.
    #[arg(short = 'H', long, env = "PCP_HOST", default_value = "localhost")]
    pub host: String,

    /// PCP port.
    #[arg(short, long, env = "PCP_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// PCP user.
    #[arg(short = 'U', long, env = "PCP_USER")]
    pub username: Option<String>,

    /// PCP password.
    #[arg(long, env = "PCP_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Existing pcppass file (mode 0600).
    #[arg(long, env = "PCP_PASS_FILE")]
    pub pass_file: Option<PathBuf>,

    /// Connection timeout in seconds, for pgpool-II releases before 3.5.
    #[arg(short, long, env = "PCP_TIMEOUT", default_value_t = DEFAULT_TIMEOUT)]
    pub timeout: u32,

    /// Directory holding the pcp_* tools.
    #[arg(long, env = "PCP_BIN_DIR", default_value = DEFAULT_BIN_DIR)]
    pub bin_dir: PathBuf,

    /// pgpool executable probed for the installed release.
    #[arg(long, env = "PGPOOL_BIN", default_value = DEFAULT_PGPOOL)]
    pub pgpool: PathBuf,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = Format::Table)]
    pub format: Format,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Client options described by the arguments.
    #[must_use]
    pub fn options(&self) -> PcpOptions {
        let mut options = PcpOptions::new(&self.host, self.username.clone().unwrap_or_default())
            .with_port(self.port)
            .with_timeout(self.timeout)
            .with_bin_dir(&self.bin_dir)
            .with_pgpool(&self.pgpool);
        options.password.clone_from(&self.password);
        options.pass_file.clone_from(&self.pass_file);
        options
    }
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Format {
    /// Human-readable table format.
    #[default]
    Table,
    /// JSON output for scripting.
    Json,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Show the pgpool-II release and how credentials are passed.
    Version,

    /// Number of backend nodes.
    NodeCount,

    /// Detail for one backend node.
    NodeInfo {
        /// Backend node id.
        id: u32,
    },

    /// Identifiers of the pgpool child processes.
    ProcCount,

    /// Connection slots of every child process.
    ProcInfo,

    /// Connection slots per database, active and idle.
    ProcSummary,

    /// Watchdog cluster and quorum state.
    Watchdog,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn cli_parses_node_info() {
        let cli = Cli::parse_from(["pcpctl", "node-info", "2"]);
        assert_eq!(cli.command, Commands::NodeInfo { id: 2 });
    }

    #[test]
    fn cli_rejects_negative_node_id() {
        assert!(Cli::try_parse_from(["pcpctl", "node-info", "-1"]).is_err());
    }

    #[test]
    fn cli_respects_format_flag() {
        let cli = Cli::parse_from(["pcpctl", "--format", "json", "watchdog"]);
        assert_eq!(cli.format, Format::Json);
        assert_eq!(cli.command, Commands::Watchdog);
    }

    #[test]
    fn cli_builds_options() {
        let cli = Cli::parse_from([
            "pcpctl",
            "-H",
            "db1",
            "-p",
            "9999",
            "-U",
            "pgpool",
            "--password",
            "secret",
            "--timeout",
            "3",
            "--bin-dir",
            "/opt/pgpool/bin",
            "proc-summary",
        ]);
        let options = cli.options();
        assert_eq!(options.hostname, "db1");
        assert_eq!(options.port, 9999);
        assert_eq!(options.username, "pgpool");
        assert_eq!(options.password(), Some("secret"));
        assert_eq!(options.timeout, 3);
        assert_eq!(options.programs.bin_dir, Path::new("/opt/pgpool/bin"));
        assert!(options.pass_file.is_none());
    }

    #[test]
    fn cli_passes_pass_file() {
        let cli = Cli::parse_from([
            "pcpctl",
            "-U",
            "pgpool",
            "--pass-file",
            "/etc/pgpool/pcppass",
            "node-count",
        ]);
        assert_eq!(
            cli.options().pass_file.as_deref(),
            Some(Path::new("/etc/pgpool/pcppass"))
        );
    }
}
