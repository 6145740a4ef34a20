//! Typed records decoded from PCP tool output.

use crate::status::QuorumState;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Detail for one backend node, from `pcp_node_info -v`.
///
/// Fields missing from the output keep their default values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeInfo {
    /// Backend hostname.
    pub hostname: String,
    /// Backend port.
    pub port: u16,
    /// Numeric backend status.
    pub status_code: i32,
    /// Description of `status_code`.
    pub status: String,
    /// Load-balancing weight.
    pub weight: f64,
    /// Replication role (`primary`, `standby`, ...).
    pub role: String,
}

/// Watchdog cluster state, from `pcp_watchdog_info -v`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchdogInfo {
    /// Nodes in the watchdog cluster, including this one.
    pub total_nodes: u32,
    /// Nodes other than this one.
    pub remote_nodes: u32,
    /// Quorum state label as printed.
    pub quorum_state: String,
    /// Numeric code of `quorum_state`, see [`QuorumState::code`].
    pub quorum_state_code: i32,
    /// Remote nodes currently alive.
    pub alive_remote_nodes: u32,
    /// Whether the delegate IP is up on the queried node.
    pub vip: bool,
}

impl Default for WatchdogInfo {
    fn default() -> Self {
        Self {
            total_nodes: 0,
            remote_nodes: 0,
            quorum_state: String::new(),
            quorum_state_code: QuorumState::Unknown.code(),
            alive_remote_nodes: 0,
            vip: false,
        }
    }
}

impl WatchdogInfo {
    /// The quorum state as an ordered enum.
    #[must_use]
    pub fn quorum(&self) -> QuorumState {
        QuorumState::from_code(self.quorum_state_code)
    }
}

/// One pgpool child process connection slot, from `pcp_proc_info --all`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcInfo {
    /// Database the slot is bound to.
    pub database: String,
    /// User the slot is bound to.
    pub username: String,
    /// Whether a frontend is currently connected.
    pub connected: bool,
}

/// Connection slots per database, split by connection state.
///
/// A database only appears in a map once at least one slot counted there.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcInfoSummary {
    /// Connected slots per database.
    pub active: BTreeMap<String, u64>,
    /// Idle slots per database.
    pub inactive: BTreeMap<String, u64>,
}

impl ProcInfoSummary {
    /// Create an empty summary.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one slot.
    pub fn add(&mut self, database: &str, active: bool) {
        let counts = if active {
            &mut self.active
        } else {
            &mut self.inactive
        };
        *counts.entry(database.to_string()).or_insert(0) += 1;
    }

    /// Fold a process listing into a summary.
    #[must_use]
    pub fn summarize(procs: &[ProcInfo]) -> Self {
        procs.iter().collect()
    }

    /// Connected slots for `database`.
    #[must_use]
    pub fn active_for(&self, database: &str) -> u64 {
        self.active.get(database).copied().unwrap_or(0)
    }

    /// Idle slots for `database`.
    #[must_use]
    pub fn inactive_for(&self, database: &str) -> u64 {
        self.inactive.get(database).copied().unwrap_or(0)
    }
}

impl<'a> FromIterator<&'a ProcInfo> for ProcInfoSummary {
    fn from_iter<I: IntoIterator<Item = &'a ProcInfo>>(iter: I) -> Self {
        let mut summary = Self::new();
        for proc_info in iter {
            summary.add(&proc_info.database, proc_info.connected);
        }
        summary
    }
}
