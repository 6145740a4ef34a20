//! Error types for PCP client operations.
//!
//! Errors fall into four groups: invalid configuration (raised before any
//! command runs), an undeterminable pgpool-II version (raised while the
//! client is being built), failed PCP commands, and output that could not
//! be decoded at all.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for PCP operations.
pub type Result<T> = std::result::Result<T, PcpError>;

/// Errors that can occur while driving the PCP tools.
#[derive(Debug, Error)]
pub enum PcpError {
    /// Client options are missing a required value or hold an invalid one.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the problem.
        message: String,
    },

    /// The caller supplied pcppass file does not exist.
    #[error("pcppass {} does not exist", path.display())]
    PassFileNotFound {
        /// Path that was checked.
        path: PathBuf,
    },

    /// The caller supplied pcppass path is not a regular file.
    #[error("pcppass {} must be a regular file", path.display())]
    PassFileNotRegular {
        /// Path that was checked.
        path: PathBuf,
    },

    /// The pcppass file is readable by someone other than its owner.
    #[error("unexpected file mode for '{}': {mode:o} (expected 600)", path.display())]
    PassFileMode {
        /// Path that was checked.
        path: PathBuf,
        /// Permission bits found on the file.
        mode: u32,
    },

    /// Running `pgpool --version` failed.
    #[error("error getting version information: {message}")]
    VersionProbe {
        /// Description of the failure.
        message: String,
    },

    /// The version probe produced no text at all.
    #[error("pgpool returned empty version information")]
    EmptyVersion,

    /// No `N.N.N` token could be found in the version probe output.
    #[error("can't extract pgpool version from string: {output}")]
    VersionNotFound {
        /// The probe output that was searched.
        output: String,
    },

    /// A version token was found but is not a valid semantic version.
    #[error("invalid pgpool version '{version}': {reason}")]
    InvalidVersion {
        /// The offending token.
        version: String,
        /// Why it was rejected.
        reason: String,
    },

    /// An argument or environment value cannot be passed to a child process.
    #[error("invalid argument for {field}: {reason}")]
    InvalidArgument {
        /// Which value was rejected.
        field: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The PCP tool could not be started.
    #[error("failed to launch {command}: {message}")]
    LaunchFailed {
        /// Program that failed to start.
        command: String,
        /// Underlying error text.
        message: String,
    },

    /// The PCP tool exited unsuccessfully.
    #[error("{command} exited with status {exit_code} ({stderr})")]
    CommandFailed {
        /// Program that was executed.
        command: String,
        /// Exit code, `-1` when terminated by a signal.
        exit_code: i32,
        /// Standard error, trimmed of surrounding whitespace.
        stderr: String,
    },

    /// Output that must be interpreted as a whole could not be.
    #[error("cannot decode {command} output: {message}")]
    Decode {
        /// Program whose output was rejected.
        command: String,
        /// Description of the problem.
        message: String,
    },

    /// IO error (pcppass file handling, output stream reads).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl PcpError {
    /// Creates an `InvalidConfig` error with a message.
    #[must_use]
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Creates a `VersionProbe` error with a message.
    #[must_use]
    pub fn version_probe(message: impl Into<String>) -> Self {
        Self::VersionProbe {
            message: message.into(),
        }
    }

    /// Creates an `InvalidVersion` error.
    #[must_use]
    pub fn invalid_version(version: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidVersion {
            version: version.into(),
            reason: reason.into(),
        }
    }

    /// Creates an `InvalidArgument` error.
    #[must_use]
    pub fn invalid_argument(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Creates a `LaunchFailed` error.
    #[must_use]
    pub fn launch_failed(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self::LaunchFailed {
            command: command.into(),
            message: message.into(),
        }
    }

    /// Creates a `CommandFailed` error. The diagnostic is trimmed.
    #[must_use]
    pub fn command_failed(command: impl Into<String>, exit_code: i32, stderr: &str) -> Self {
        Self::CommandFailed {
            command: command.into(),
            exit_code,
            stderr: stderr.trim().to_string(),
        }
    }

    /// Creates a `Decode` error.
    #[must_use]
    pub fn decode(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            command: command.into(),
            message: message.into(),
        }
    }

    /// Returns `true` if this error was raised by option validation.
    #[must_use]
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidConfig { .. }
                | Self::PassFileNotFound { .. }
                | Self::PassFileNotRegular { .. }
                | Self::PassFileMode { .. }
        )
    }

    /// Returns `true` if the pgpool-II version could not be determined.
    #[must_use]
    pub fn is_version_error(&self) -> bool {
        matches!(
            self,
            Self::VersionProbe { .. }
                | Self::EmptyVersion
                | Self::VersionNotFound { .. }
                | Self::InvalidVersion { .. }
        )
    }

    /// Returns `true` if a PCP command could not be run to completion.
    #[must_use]
    pub fn is_command_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidArgument { .. } | Self::LaunchFailed { .. } | Self::CommandFailed { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_config_display() {
        let err = PcpError::invalid_config("PCP hostname must be specified");
        assert_eq!(
            err.to_string(),
            "invalid configuration: PCP hostname must be specified"
        );
    }

    #[test]
    fn test_pass_file_mode_display() {
        let err = PcpError::PassFileMode {
            path: PathBuf::from("/etc/pcppass"),
            mode: 0o644,
        };
        assert_eq!(
            err.to_string(),
            "unexpected file mode for '/etc/pcppass': 644 (expected 600)"
        );
    }

    #[test]
    fn test_version_not_found_display() {
        let err = PcpError::VersionNotFound {
            output: "pgpool-II".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "can't extract pgpool version from string: pgpool-II"
        );
    }

    #[test]
    fn test_command_failed_trims_stderr() {
        let err = PcpError::command_failed(
            "/usr/sbin/pcp_node_count",
            1,
            "\n  ERROR: connection to socket failed  \n",
        );
        assert_eq!(
            err.to_string(),
            "/usr/sbin/pcp_node_count exited with status 1 (ERROR: connection to socket failed)"
        );
    }

    #[test]
    fn test_decode_display() {
        let err = PcpError::decode("pcp_node_count", "invalid digit found in string");
        assert_eq!(
            err.to_string(),
            "cannot decode pcp_node_count output: invalid digit found in string"
        );
    }

    #[test]
    fn test_io_error_from_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: PcpError = io_err.into();
        assert!(matches!(err, PcpError::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_is_configuration_error() {
        assert!(PcpError::invalid_config("test").is_configuration_error());
        assert!(
            PcpError::PassFileNotFound {
                path: PathBuf::from("/x")
            }
            .is_configuration_error()
        );
        assert!(
            PcpError::PassFileMode {
                path: PathBuf::from("/x"),
                mode: 0o644
            }
            .is_configuration_error()
        );

        assert!(!PcpError::EmptyVersion.is_configuration_error());
        assert!(!PcpError::command_failed("x", 1, "").is_configuration_error());
    }

    #[test]
    fn test_is_version_error() {
        assert!(PcpError::EmptyVersion.is_version_error());
        assert!(PcpError::version_probe("not found").is_version_error());
        assert!(PcpError::invalid_version("3.07.1", "leading zero").is_version_error());

        assert!(!PcpError::invalid_config("test").is_version_error());
    }

    #[test]
    fn test_is_command_error() {
        assert!(PcpError::command_failed("x", 2, "boom").is_command_error());
        assert!(PcpError::launch_failed("x", "no such file").is_command_error());

        assert!(!PcpError::decode("x", "y").is_command_error());
        assert!(!PcpError::EmptyVersion.is_command_error());
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PcpError>();
    }
}
