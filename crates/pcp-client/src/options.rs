//! Client configuration.
//!
//! [`PcpOptions`] holds everything needed to reach one pgpool-II instance
//! through its PCP tools. Values are checked by [`PcpOptions::validate`]
//! before any command is launched.

use crate::command::{validate_argument, PcpProgram};
use crate::error::{PcpError, Result};
use crate::passfile::validate_pass_file;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Default PCP listen port of pgpool-II.
pub const DEFAULT_PORT: u16 = 9898;

/// Default connection timeout handed to legacy PCP tools, in seconds.
pub const DEFAULT_TIMEOUT: u32 = 10;

/// Directory the pgpool-II packages install the PCP tools into.
pub const DEFAULT_BIN_DIR: &str = "/usr/sbin";

/// Executable probed for the pgpool-II version.
pub const DEFAULT_PGPOOL: &str = "pgpool";

/// Where the executables live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PcpPrograms {
    /// `pgpool` executable run with `--version`.
    #[serde(default = "default_pgpool")]
    pub pgpool: PathBuf,
    /// Directory holding the `pcp_*` tools.
    #[serde(default = "default_bin_dir")]
    pub bin_dir: PathBuf,
}

fn default_pgpool() -> PathBuf {
    PathBuf::from(DEFAULT_PGPOOL)
}

fn default_bin_dir() -> PathBuf {
    PathBuf::from(DEFAULT_BIN_DIR)
}

impl Default for PcpPrograms {
    fn default() -> Self {
        Self {
            pgpool: default_pgpool(),
            bin_dir: default_bin_dir(),
        }
    }
}

impl PcpPrograms {
    /// Full path of a PCP tool.
    #[must_use]
    pub fn path_for(&self, program: PcpProgram) -> PathBuf {
        self.bin_dir.join(program.as_str())
    }
}

/// Connection settings for the PCP tools.
///
/// Either `password` or a valid `pass_file` must be given. The password is
/// skipped when serializing and redacted from `Debug` output.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PcpOptions {
    /// Host pgpool-II listens on for PCP.
    pub hostname: String,

    /// PCP port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// PCP user.
    #[serde(default)]
    pub username: String,

    /// PCP password.
    #[serde(default, skip_serializing)]
    pub password: Option<String>,

    /// Existing pcppass file to use instead of writing one.
    #[serde(default)]
    pub pass_file: Option<PathBuf>,

    /// Connection timeout in seconds, only understood by tools predating
    /// pgpool-II 3.5.
    #[serde(default = "default_timeout")]
    pub timeout: u32,

    /// Executable locations.
    #[serde(default)]
    pub programs: PcpPrograms,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_timeout() -> u32 {
    DEFAULT_TIMEOUT
}

impl Default for PcpOptions {
    fn default() -> Self {
        Self {
            hostname: String::new(),
            port: DEFAULT_PORT,
            username: String::new(),
            password: None,
            pass_file: None,
            timeout: DEFAULT_TIMEOUT,
            programs: PcpPrograms::default(),
        }
    }
}

impl fmt::Debug for PcpOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PcpOptions")
            .field("hostname", &self.hostname)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("pass_file", &self.pass_file)
            .field("timeout", &self.timeout)
            .field("programs", &self.programs)
            .finish()
    }
}

impl PcpOptions {
    /// Create options for `hostname` and `username` with default port and
    /// timeout.
    #[must_use]
    pub fn new(hostname: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            username: username.into(),
            ..Self::default()
        }
    }

    /// Set the PCP port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the PCP password.
    #[must_use]
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Use an existing pcppass file.
    #[must_use]
    pub fn with_pass_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.pass_file = Some(path.into());
        self
    }

    /// Set the legacy connection timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: u32) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the directory holding the PCP tools.
    #[must_use]
    pub fn with_bin_dir(mut self, bin_dir: impl Into<PathBuf>) -> Self {
        self.programs.bin_dir = bin_dir.into();
        self
    }

    /// Set the `pgpool` executable used for the version probe.
    #[must_use]
    pub fn with_pgpool(mut self, pgpool: impl Into<PathBuf>) -> Self {
        self.programs.pgpool = pgpool.into();
        self
    }

    /// The password, if one is set and non-empty.
    #[must_use]
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref().filter(|p| !p.is_empty())
    }

    /// Check the options.
    ///
    /// A given `pass_file` must exist, be a regular file and have mode
    /// 0600; without one a non-empty password is required. Hostname,
    /// username and password must not contain NUL, CR or LF, since they
    /// end up in arguments or in a pcppass line.
    ///
    /// # Errors
    ///
    /// Returns a configuration error describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        if self.hostname.trim().is_empty() {
            return Err(PcpError::invalid_config("PCP hostname must be specified"));
        }
        if self.port == 0 {
            return Err(PcpError::invalid_config("PCP port must be specified"));
        }
        if self.username.trim().is_empty() {
            return Err(PcpError::invalid_config("PCP username must be specified"));
        }

        check_field(&self.hostname, "hostname")?;
        check_field(&self.username, "username")?;
        if let Some(password) = &self.password {
            check_field(password, "password")?;
        }

        match &self.pass_file {
            Some(path) if !path.as_os_str().is_empty() => validate_pass_file(path),
            _ if self.password().is_some() => Ok(()),
            _ => Err(PcpError::invalid_config(
                "PCP password or pcppass file (pgpool-II 3.5 and above) must be specified",
            )),
        }
    }
}

fn check_field(value: &str, name: &str) -> Result<()> {
    validate_argument(value, name).map_err(|e| PcpError::invalid_config(format!("PCP {e}")))
}
