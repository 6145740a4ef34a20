//! pgpool-II version detection.
//!
//! The invocation shape of the PCP tools changed in pgpool-II 3.5, which
//! introduced long options and the `PCPPASSFILE` credentials file. The
//! client learns which shape to use from the text printed by
//! `pgpool --version`, e.g. `pgpool-II version 4.2.3 (chichiriboshi)`.

use crate::error::{PcpError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// First `N.N.N` token in a version banner.
static VERSION_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([0-9]+\.[0-9]+\.[0-9]+)").unwrap_or_else(|_| unreachable!()));

/// First release whose PCP tools read credentials from a pcppass file.
pub const PASS_FILE_SINCE: Version = Version::new(3, 5, 0);

/// A `major.minor.patch` release number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Version {
    /// Major release.
    pub major: u64,
    /// Minor release.
    pub minor: u64,
    /// Patch release.
    pub patch: u64,
}

impl Version {
    /// Create a version from its components.
    #[must_use]
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Whether this release's PCP tools accept a pcppass file.
    #[must_use]
    pub fn supports_pass_file(&self) -> bool {
        *self >= PASS_FILE_SINCE
    }

    /// Resolve the version from the raw `pgpool --version` text.
    ///
    /// # Errors
    ///
    /// Returns `EmptyVersion` for blank text, `VersionNotFound` when no
    /// `N.N.N` token is present and `InvalidVersion` when the token does
    /// not parse.
    pub fn from_banner(text: &str) -> Result<Self> {
        let text = text.trim();
        if text.is_empty() {
            return Err(PcpError::EmptyVersion);
        }
        let token = extract_version(text).ok_or_else(|| PcpError::VersionNotFound {
            output: text.to_string(),
        })?;
        token.parse()
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for Version {
    type Err = PcpError;

    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.split('.');
        let (Some(major), Some(minor), Some(patch), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(PcpError::invalid_version(
                s,
                "expected three dot-separated components",
            ));
        };

        Ok(Self {
            major: parse_component(s, major)?,
            minor: parse_component(s, minor)?,
            patch: parse_component(s, patch)?,
        })
    }
}

fn parse_component(version: &str, part: &str) -> Result<u64> {
    if part.is_empty() {
        return Err(PcpError::invalid_version(version, "empty component"));
    }
    if part.len() > 1 && part.starts_with('0') {
        return Err(PcpError::invalid_version(
            version,
            format!("component '{part}' has a leading zero"),
        ));
    }
    part.parse()
        .map_err(|e| PcpError::invalid_version(version, format!("component '{part}': {e}")))
}

/// Extract the first `N.N.N` token from arbitrary text.
#[must_use]
pub fn extract_version(text: &str) -> Option<&str> {
    VERSION_REGEX
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}
