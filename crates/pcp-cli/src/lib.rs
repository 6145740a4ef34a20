//! # pcp-cli
//!
//! `pcpctl`, a command-line front end for [`pcp_client`].
//!
//! Connection settings come from flags or `PCP_*` environment variables;
//! results are printed as a table or as JSON.
//!
//! ```text
//! ┌─────────┐   argv / env   ┌────────────┐   pcp_* tools   ┌───────────┐
//! │ pcpctl  │───────────────►│ pcp-client │────────────────►│ pgpool-II │
//! └─────────┘                └────────────┘                 └───────────┘
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod commands;
pub mod error;
pub mod output;

pub use cli::{Cli, Commands, Format};
pub use commands::PcpCommand;
pub use error::CliError;
pub use output::{render, TableDisplay};
