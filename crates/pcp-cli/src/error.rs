//! CLI error types.

use std::fmt;

use pcp_client::PcpError;

/// CLI-specific errors.
#[derive(Debug)]
pub enum CliError {
    /// Invalid configuration.
    Config(String),
    /// The pgpool-II release could not be determined.
    Version(String),
    /// A PCP tool failed.
    Command(String),
    /// PCP tool output could not be decoded.
    Decode(String),
    /// Output formatting error.
    Format(String),
    /// IO error.
    Io(std::io::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "configuration error: {msg}"),
            Self::Version(msg) => write!(f, "version error: {msg}"),
            Self::Command(msg) => write!(f, "command error: {msg}"),
            Self::Decode(msg) => write!(f, "decode error: {msg}"),
            Self::Format(msg) => write!(f, "format error: {msg}"),
            Self::Io(e) => write!(f, "IO error: {e}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<PcpError> for CliError {
    fn from(err: PcpError) -> Self {
        if err.is_configuration_error() {
            return Self::Config(err.to_string());
        }
        if err.is_version_error() {
            return Self::Version(err.to_string());
        }
        if err.is_command_error() {
            return Self::Command(err.to_string());
        }
        match err {
            PcpError::Io(e) => Self::Io(e),
            other => Self::Decode(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_error_display_config() {
        let err = CliError::Config("PCP hostname must be specified".into());
        assert_eq!(
            err.to_string(),
            "configuration error: PCP hostname must be specified"
        );
    }

    #[test]
    fn cli_error_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let cli_err = CliError::from(io_err);
        assert!(matches!(cli_err, CliError::Io(_)));
    }

    #[test]
    fn cli_error_from_pcp_error() {
        let err = CliError::from(PcpError::invalid_config("missing password"));
        assert!(matches!(err, CliError::Config(_)));

        let err = CliError::from(PcpError::EmptyVersion);
        assert!(matches!(err, CliError::Version(_)));

        let err = CliError::from(PcpError::command_failed("pcp_node_count", 1, "refused"));
        assert!(matches!(err, CliError::Command(ref msg) if msg.contains("refused")));

        let err = CliError::from(PcpError::decode("pcp_node_count", "not a number"));
        assert!(matches!(err, CliError::Decode(_)));

        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed");
        let err = CliError::from(PcpError::Io(io_err));
        assert!(matches!(err, CliError::Io(_)));
    }
}
