//! pcppass credential files.
//!
//! From pgpool-II 3.5 on, the PCP tools read the password from a file
//! named by the `PCPPASSFILE` environment variable instead of taking it on
//! the command line. Each line of the file has the form
//! `hostname:port:username:password`, with `:` and `\` inside a field
//! escaped by a backslash.
//!
//! The file is either supplied by the caller, in which case it is checked
//! but never touched, or written by the client into the temp directory and
//! removed again when the client is cleaned up or dropped.

use crate::command::validate_argument;
use crate::error::{PcpError, Result};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::{Builder, TempPath};
use tracing::debug;

/// Environment variable the PCP tools read the pcppass location from.
pub const PASS_FILE_ENV: &str = "PCPPASSFILE";

/// Only permission bits accepted on a pcppass file.
pub const PASS_FILE_MODE: u32 = 0o600;

/// A pcppass file and who is responsible for removing it.
#[derive(Debug)]
pub enum PassFile {
    /// Supplied by the caller; never removed by the client.
    Caller(PathBuf),
    /// Written by the client; removed on [`PassFile::remove`] or drop.
    Owned(TempPath),
}

impl PassFile {
    /// Write a single-entry pcppass file into the temp directory.
    ///
    /// The file is created with mode 0600 before the secret is written.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if a field contains NUL, CR or LF, a
    /// configuration error if the temp directory path is not UTF-8, or an
    /// IO error if the file cannot be created or written.
    pub fn create(hostname: &str, port: u16, username: &str, password: &str) -> Result<Self> {
        validate_argument(hostname, "hostname")?;
        validate_argument(username, "username")?;
        validate_argument(password, "password")?;

        let mut file = Builder::new().prefix("pcppass").tempfile()?;
        require_utf8(file.path())?;
        restrict_permissions(file.as_file())?;

        file.write_all(pass_file_line(hostname, port, username, password).as_bytes())?;
        file.flush()?;

        let path = file.into_temp_path();
        debug!(path = %path.display(), "wrote transient pcppass file");
        Ok(Self::Owned(path))
    }

    /// Location of the file.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Caller(path) => path.as_path(),
            Self::Owned(path) => &**path,
        }
    }

    /// Whether the file belongs to the caller.
    #[must_use]
    pub fn is_caller_owned(&self) -> bool {
        matches!(self, Self::Caller(_))
    }

    /// Remove the file if the client created it.
    ///
    /// # Errors
    ///
    /// Returns an IO error if an owned file exists but cannot be removed.
    pub fn remove(self) -> Result<()> {
        match self {
            Self::Caller(_) => Ok(()),
            Self::Owned(path) => {
                let removed = path.display().to_string();
                path.close()?;
                debug!(path = %removed, "removed transient pcppass file");
                Ok(())
            }
        }
    }
}

/// Check a caller supplied pcppass file.
///
/// The path must be UTF-8 and name an existing regular file whose
/// permission bits are exactly 0600. Permission bits are only checked on
/// unix.
///
/// # Errors
///
/// Returns a configuration error for a non-UTF-8 path, `PassFileNotFound`,
/// `PassFileNotRegular` or `PassFileMode`, or an IO error if the file
/// metadata cannot be read.
pub fn validate_pass_file(path: &Path) -> Result<()> {
    require_utf8(path)?;

    let metadata = match fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(PcpError::PassFileNotFound {
                path: path.to_path_buf(),
            });
        }
        Err(e) => return Err(e.into()),
    };

    if !metadata.is_file() {
        return Err(PcpError::PassFileNotRegular {
            path: path.to_path_buf(),
        });
    }

    check_mode(path, &metadata)
}

/// `PCPPASSFILE` is exported as a string, so the path has to survive that
/// unchanged.
fn require_utf8(path: &Path) -> Result<()> {
    if path.to_str().is_none() {
        return Err(PcpError::invalid_config(format!(
            "pcppass path {} is not valid UTF-8",
            path.display()
        )));
    }
    Ok(())
}

#[cfg(unix)]
fn check_mode(path: &Path, metadata: &fs::Metadata) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mode = metadata.permissions().mode() & 0o7777;
    if mode != PASS_FILE_MODE {
        return Err(PcpError::PassFileMode {
            path: path.to_path_buf(),
            mode,
        });
    }
    Ok(())
}

#[cfg(not(unix))]
fn check_mode(_path: &Path, _metadata: &fs::Metadata) -> Result<()> {
    Ok(())
}

#[cfg(unix)]
fn restrict_permissions(file: &fs::File) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    file.set_permissions(fs::Permissions::from_mode(PASS_FILE_MODE))
}

#[cfg(not(unix))]
fn restrict_permissions(_file: &fs::File) -> io::Result<()> {
    Ok(())
}

/// Render one pcppass entry.
#[must_use]
pub fn pass_file_line(hostname: &str, port: u16, username: &str, password: &str) -> String {
    format!(
        "{}:{port}:{}:{}",
        escape_field(hostname),
        escape_field(username),
        escape_field(password)
    )
}

fn escape_field(field: &str) -> String {
    let mut escaped = String::with_capacity(field.len());
    for c in field.chars() {
        if matches!(c, ':' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
