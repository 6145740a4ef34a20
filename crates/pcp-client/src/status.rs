//! Fixed code tables used by the PCP tools.
//!
//! `pcp_node_info` reports a numeric backend status and `pcp_watchdog_info`
//! a textual quorum state. Both are mapped through closed tables; values
//! outside them map to an explicit unknown entry instead of failing.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Label for a backend status code outside the known table.
pub const NODE_STATUS_UNKNOWN: &str = "Unknown node status";

/// Backend node status as reported by `pcp_node_info`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeStatus {
    /// Code 0: the node is being initialized.
    Initialization,
    /// Code 1: up, no connections have been made yet.
    Up,
    /// Code 2: up, connections are pooled.
    UpPooled,
    /// Code 3: down.
    Down,
    /// Any other code.
    Unknown(i32),
}

impl NodeStatus {
    /// Map a numeric status code.
    #[must_use]
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => Self::Initialization,
            1 => Self::Up,
            2 => Self::UpPooled,
            3 => Self::Down,
            other => Self::Unknown(other),
        }
    }

    /// The numeric status code.
    #[must_use]
    pub fn code(&self) -> i32 {
        match self {
            Self::Initialization => 0,
            Self::Up => 1,
            Self::UpPooled => 2,
            Self::Down => 3,
            Self::Unknown(code) => *code,
        }
    }

    /// Human readable description.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Initialization => "Initialization",
            Self::Up => "Node is up. No connections yet",
            Self::UpPooled => "Node is up. Connections are pooled",
            Self::Down => "Node is down",
            Self::Unknown(_) => NODE_STATUS_UNKNOWN,
        }
    }

    /// Whether the node accepts connections.
    #[must_use]
    pub fn is_up(&self) -> bool {
        matches!(self, Self::Up | Self::UpPooled)
    }
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Human readable description of a node status code.
#[must_use]
pub fn node_status_label(code: i32) -> &'static str {
    NodeStatus::from_code(code).label()
}

/// Watchdog quorum state, ordered from worst to best.
///
/// The numeric codes match the ones used by `pcp_watchdog_info` itself and
/// must not be reordered: consumers compare them against thresholds.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum QuorumState {
    /// `UNKNOWN` or any unrecognized label (-3).
    Unknown,
    /// `NO MASTER NODE` (-2).
    NoMasterNode,
    /// `QUORUM ABSENT` (-1).
    Absent,
    /// `QUORUM IS ON THE EDGE` (0).
    OnEdge,
    /// `QUORUM EXIST` (1).
    Exist,
}

impl QuorumState {
    /// Every state, in code order.
    pub const ALL: [Self; 5] = [
        Self::Unknown,
        Self::NoMasterNode,
        Self::Absent,
        Self::OnEdge,
        Self::Exist,
    ];

    /// Map a label as printed by `pcp_watchdog_info`. Matching is exact.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label {
            "NO MASTER NODE" => Self::NoMasterNode,
            "QUORUM ABSENT" => Self::Absent,
            "QUORUM IS ON THE EDGE" => Self::OnEdge,
            "QUORUM EXIST" => Self::Exist,
            _ => Self::Unknown,
        }
    }

    /// Map a numeric code; codes outside `-3..=1` are `Unknown`.
    #[must_use]
    pub fn from_code(code: i32) -> Self {
        match code {
            -2 => Self::NoMasterNode,
            -1 => Self::Absent,
            0 => Self::OnEdge,
            1 => Self::Exist,
            _ => Self::Unknown,
        }
    }

    /// Numeric code in `-3..=1`.
    #[must_use]
    pub fn code(&self) -> i32 {
        match self {
            Self::Unknown => -3,
            Self::NoMasterNode => -2,
            Self::Absent => -1,
            Self::OnEdge => 0,
            Self::Exist => 1,
        }
    }

    /// Label as printed by `pcp_watchdog_info`.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN",
            Self::NoMasterNode => "NO MASTER NODE",
            Self::Absent => "QUORUM ABSENT",
            Self::OnEdge => "QUORUM IS ON THE EDGE",
            Self::Exist => "QUORUM EXIST",
        }
    }
}

impl fmt::Display for QuorumState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Numeric code of a quorum label; unrecognized labels give -3.
#[must_use]
pub fn quorum_state_code(label: &str) -> i32 {
    QuorumState::from_label(label).code()
}
