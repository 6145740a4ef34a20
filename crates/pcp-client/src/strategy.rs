//! How credentials reach the PCP tools.
//!
//! pgpool-II 3.5 replaced the positional invocation of the PCP tools with
//! long options and a pcppass file. The two shapes are mutually exclusive,
//! so a client picks one [`CredentialStrategy`] when it is built and keeps
//! it for its whole lifetime:
//!
//! - [`CredentialStrategy::PassFile`]:
//!   `--username=U --host=H --port=P --no-password ARGS...`, with
//!   `PCPPASSFILE` pointing at the credentials file.
//! - [`CredentialStrategy::Positional`]:
//!   `FLAGS... TIMEOUT HOST PORT USER PASSWORD ARGS...`, where the caller's
//!   flag arguments are moved in front of the credential tuple. The legacy
//!   tools parse strictly by position, so the order matters.

use crate::error::{PcpError, Result};
use crate::options::PcpOptions;
use crate::passfile::PASS_FILE_ENV;
use std::fmt;
use std::path::PathBuf;

const REDACTED: &str = "********";

/// Arguments and environment for one PCP tool run.
#[derive(Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Argument vector, without the program.
    pub args: Vec<String>,
    /// Explicit environment; empty means inherit.
    pub env: Vec<(String, String)>,
    secret: Option<usize>,
}

impl Invocation {
    /// Arguments with the password replaced by a mask.
    #[must_use]
    pub fn redacted_args(&self) -> Vec<&str> {
        self.args
            .iter()
            .enumerate()
            .map(|(i, arg)| {
                if Some(i) == self.secret {
                    REDACTED
                } else {
                    arg.as_str()
                }
            })
            .collect()
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.redacted_args().join(" "))
    }
}

impl fmt::Debug for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Invocation")
            .field("args", &self.redacted_args())
            .field("env", &self.env)
            .finish()
    }
}

/// The invocation shape used for every PCP tool run of a client.
#[derive(Clone, PartialEq, Eq)]
pub enum CredentialStrategy {
    /// Long options, password read from a pcppass file.
    PassFile {
        /// PCP host.
        hostname: String,
        /// PCP port.
        port: u16,
        /// PCP user.
        username: String,
        /// pcppass file exported as `PCPPASSFILE`.
        path: PathBuf,
    },
    /// Legacy positional arguments, password on the command line.
    Positional {
        /// Connection timeout in seconds.
        timeout: u32,
        /// PCP host.
        hostname: String,
        /// PCP port.
        port: u16,
        /// PCP user.
        username: String,
        /// PCP password.
        password: String,
    },
}

impl fmt::Debug for CredentialStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PassFile {
                hostname,
                port,
                username,
                path,
            } => f
                .debug_struct("PassFile")
                .field("hostname", hostname)
                .field("port", port)
                .field("username", username)
                .field("path", path)
                .finish(),
            Self::Positional {
                timeout,
                hostname,
                port,
                username,
                ..
            } => f
                .debug_struct("Positional")
                .field("timeout", timeout)
                .field("hostname", hostname)
                .field("port", port)
                .field("username", username)
                .field("password", &REDACTED)
                .finish(),
        }
    }
}

impl CredentialStrategy {
    /// Use the pcppass file at `path`.
    #[must_use]
    pub fn pass_file(options: &PcpOptions, path: impl Into<PathBuf>) -> Self {
        Self::PassFile {
            hostname: options.hostname.clone(),
            port: options.port,
            username: options.username.clone(),
            path: path.into(),
        }
    }

    /// Pass the password positionally.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `options` carries no password.
    pub fn positional(options: &PcpOptions) -> Result<Self> {
        let password = options.password().ok_or_else(|| {
            PcpError::invalid_config(
                "PCP password must be specified for pgpool-II releases before 3.5",
            )
        })?;

        Ok(Self::Positional {
            timeout: options.timeout,
            hostname: options.hostname.clone(),
            port: options.port,
            username: options.username.clone(),
            password: password.to_string(),
        })
    }

    /// Short name for logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::PassFile { .. } => "pcppass",
            Self::Positional { .. } => "positional",
        }
    }

    /// Arguments selecting one backend node, in verbose mode.
    #[must_use]
    pub fn node_id_args(&self, node_id: u32) -> Vec<String> {
        match self {
            Self::PassFile { .. } => vec![format!("--node-id={node_id}"), "-v".to_string()],
            Self::Positional { .. } => vec![node_id.to_string(), "-v".to_string()],
        }
    }

    /// Build the full invocation for tool-specific `args`.
    #[must_use]
    pub fn build(&self, args: &[String]) -> Invocation {
        match self {
            Self::PassFile {
                hostname,
                port,
                username,
                path,
            } => {
                let mut full = vec![
                    format!("--username={username}"),
                    format!("--host={hostname}"),
                    format!("--port={port}"),
                    "--no-password".to_string(),
                ];
                full.extend(args.iter().cloned());
                Invocation {
                    args: full,
                    env: vec![(PASS_FILE_ENV.to_string(), path.display().to_string())],
                    secret: None,
                }
            }
            Self::Positional {
                timeout,
                hostname,
                port,
                username,
                password,
            } => {
                let (flags, operands): (Vec<&String>, Vec<&String>) =
                    args.iter().partition(|arg| arg.starts_with('-'));

                let mut full: Vec<String> = flags.into_iter().cloned().collect();
                full.extend([
                    timeout.to_string(),
                    hostname.clone(),
                    port.to_string(),
                    username.clone(),
                ]);
                let secret = full.len();
                full.push(password.clone());
                full.extend(operands.into_iter().cloned());

                Invocation {
                    args: full,
                    env: Vec::new(),
                    secret: Some(secret),
                }
            }
        }
    }
}
