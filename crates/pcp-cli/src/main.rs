//! pcpctl binary entrypoint.

use std::io;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use pcp_cli::cli::Cli;
use pcp_cli::commands::PcpCommand;
use pcp_cli::CliError;
use pcp_client::PcpClient;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let mut client = PcpClient::new(cli.options())?;

    let result = {
        let mut stdout = io::stdout().lock();
        PcpCommand::new(&client).execute(&mut stdout, cli.format, &cli.command)
    };

    // The transient pcppass file goes away even when the command failed.
    let cleanup = client.cleanup();
    result?;
    cleanup?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pcp_cli::cli::{Commands, Format};

    #[test]
    fn cli_parses_node_count() {
        let cli = Cli::parse_from(["pcpctl", "node-count"]);
        assert_eq!(cli.command, Commands::NodeCount);
    }

    #[test]
    fn cli_respects_format_flag() {
        let cli = Cli::parse_from(["pcpctl", "-f", "json", "proc-info"]);
        assert_eq!(cli.format, Format::Json);
    }

    #[test]
    fn run_with_missing_pass_file_fails_before_probing() {
        let cli = Cli::parse_from([
            "pcpctl",
            "-U",
            "pgpool",
            "--pass-file",
            "/nonexistent/pcppass",
            "--pgpool",
            "/nonexistent/pgpool",
            "node-count",
        ]);
        let err = run(&cli).unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
    }

    #[test]
    fn run_without_pgpool_is_a_version_error() {
        let cli = Cli::parse_from([
            "pcpctl",
            "-U",
            "pgpool",
            "--password",
            "secret",
            "--pgpool",
            "/nonexistent/pgpool",
            "version",
        ]);
        let err = run(&cli).unwrap_err();
        assert!(matches!(err, CliError::Version(_)));
    }
}
