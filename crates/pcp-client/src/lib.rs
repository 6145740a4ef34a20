//! Administrative client for pgpool-II.
//!
//! This crate drives the PCP command line tools shipped with pgpool-II
//! (`pcp_node_count`, `pcp_node_info`, `pcp_proc_count`, `pcp_proc_info`,
//! `pcp_watchdog_info`) and turns their text output into typed records.
//!
//! # Features
//!
//! - Detects the installed pgpool-II release and picks the matching
//!   invocation: pcppass file (3.5 and above) or positional password
//! - Writes and removes a transient pcppass file when the caller has none
//! - Best-effort decoding of node, watchdog and process output
//! - Pluggable [`CommandRunner`] for testing without pgpool-II installed
//!
//! # Example
//!
//! ```rust,no_run
//! use pcp_client::{PcpClient, PcpOptions};
//!
//! # fn example() -> pcp_client::Result<()> {
//! let options = PcpOptions::new("localhost", "pgpool").with_password("secret");
//! let mut client = PcpClient::new(options)?;
//!
//! for node_id in 0..client.node_count()? {
//!     let node = client.node_info(node_id)?;
//!     println!("{}:{} {}", node.hostname, node.port, node.status);
//! }
//!
//! client.cleanup()?;
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod client;
pub mod command;
pub mod decode;
pub mod error;
pub mod models;
pub mod options;
pub mod passfile;
pub mod status;
pub mod strategy;
pub mod version;

pub use client::PcpClient;
pub use command::{CommandOutput, CommandRunner, FakeRunner, PcpProgram, SystemRunner};
pub use error::{PcpError, Result};
pub use models::{NodeInfo, ProcInfo, ProcInfoSummary, WatchdogInfo};
pub use options::{PcpOptions, PcpPrograms};
pub use passfile::PassFile;
pub use status::{NodeStatus, QuorumState};
pub use strategy::{CredentialStrategy, Invocation};
pub use version::Version;
