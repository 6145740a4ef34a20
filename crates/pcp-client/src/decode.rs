//! Decoders for PCP tool output.
//!
//! The verbose PCP output is a loose list of `Label : value` lines whose
//! exact labels and padding vary between pgpool-II releases. Decoding is
//! best effort: a field is recognized when its label text appears anywhere
//! in a line, a value that does not coerce to the field's type is skipped
//! (the field keeps its default) and decoding carries on with the next
//! line. Only a failure to read the stream itself is an error.
//!
//! Once a numeric value on a line fails to coerce, the remaining labels are
//! not checked against that line.

use crate::error::Result;
use crate::models::{NodeInfo, ProcInfo, WatchdogInfo};
use crate::status::{NodeStatus, QuorumState};
use once_cell::sync::Lazy;
use regex::Regex;
use std::io::BufRead;
use std::str::FromStr;
use tracing::trace;

/// `<label without colon>: <value>`
static VALUE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^:]+: (.*)$").unwrap_or_else(|_| unreachable!()));

/// Number of columns in a `pcp_proc_info` row.
pub const PROC_INFO_FIELDS: usize = 13;

/// Value of the only literal meaning "delegate IP is up".
const VIP_UP: &str = "YES";

/// Extract the value from a `Label: value` line.
///
/// Returns an empty string when the line does not have that shape.
#[must_use]
pub fn extract_value(line: &str) -> &str {
    VALUE_REGEX
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map_or("", |m| m.as_str())
}

/// Call `f` with every line of `reader`, trimmed of surrounding whitespace.
///
/// Invalid UTF-8 is replaced rather than rejected; only read errors stop
/// the scan.
fn for_each_line<R: BufRead>(mut reader: R, mut f: impl FnMut(&str)) -> Result<()> {
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            return Ok(());
        }
        let line = String::from_utf8_lossy(&buf);
        f(line.trim());
    }
}

/// Parse the value of a line, logging and returning `None` when it does
/// not coerce.
fn parse_value<T: FromStr>(line: &str, field: &str) -> Option<T> {
    let raw = extract_value(line);
    let parsed = raw.parse().ok();
    if parsed.is_none() {
        trace!(field, value = raw, "skipping unparsable field");
    }
    parsed
}

/// Decode the output of `pcp_node_info -v`.
///
/// # Errors
///
/// Returns an error only if reading `reader` fails.
pub fn decode_node_info<R: BufRead>(reader: R) -> Result<NodeInfo> {
    let mut info = NodeInfo::default();
    for_each_line(reader, |line| decode_node_line(&mut info, line))?;
    Ok(info)
}

fn decode_node_line(info: &mut NodeInfo, line: &str) {
    if line.contains("Hostname") {
        info.hostname = extract_value(line).to_string();
    }
    if line.contains("Port") {
        let Some(port) = parse_value(line, "port") else {
            return;
        };
        info.port = port;
    }
    if line.contains("Status") {
        let Some(code) = parse_value(line, "status") else {
            return;
        };
        info.status_code = code;
        info.status = NodeStatus::from_code(code).label().to_string();
    }
    if line.contains("Weight") {
        let Some(weight) = parse_value(line, "weight") else {
            return;
        };
        info.weight = weight;
    }
    if line.contains("Role") {
        info.role = extract_value(line).to_string();
    }
}

/// Decode the output of `pcp_watchdog_info -v`.
///
/// # Errors
///
/// Returns an error only if reading `reader` fails.
pub fn decode_watchdog_info<R: BufRead>(reader: R) -> Result<WatchdogInfo> {
    let mut info = WatchdogInfo::default();
    for_each_line(reader, |line| decode_watchdog_line(&mut info, line))?;
    Ok(info)
}

fn decode_watchdog_line(info: &mut WatchdogInfo, line: &str) {
    if line.contains("Total Nodes") {
        let Some(total) = parse_value(line, "total_nodes") else {
            return;
        };
        info.total_nodes = total;
    }
    if line.contains("Remote Nodes") {
        let Some(remote) = parse_value(line, "remote_nodes") else {
            return;
        };
        info.remote_nodes = remote;
    }
    if line.contains("Quorum state") {
        info.quorum_state = extract_value(line).to_string();
        info.quorum_state_code = QuorumState::from_label(&info.quorum_state).code();
    }
    if line.contains("Alive Remote Nodes") {
        let Some(alive) = parse_value(line, "alive_remote_nodes") else {
            return;
        };
        info.alive_remote_nodes = alive;
    }
    if line.contains("VIP up on local node") {
        info.vip = extract_value(line) == VIP_UP;
    }
}

/// Decode the output of `pcp_proc_info --all`.
///
/// Rows are kept in output order. Lines that do not split into exactly
/// [`PROC_INFO_FIELDS`] whitespace-separated fields are skipped.
///
/// # Errors
///
/// Returns an error only if reading `reader` fails.
pub fn decode_proc_info<R: BufRead>(reader: R) -> Result<Vec<ProcInfo>> {
    let mut procs = Vec::new();
    for_each_line(reader, |line| {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != PROC_INFO_FIELDS {
            if !line.is_empty() {
                trace!(fields = fields.len(), "skipping malformed proc row");
            }
            return;
        }
        procs.push(ProcInfo {
            database: fields[0].to_string(),
            username: fields[1].to_string(),
            connected: fields[12] == "1",
        });
    })?;
    Ok(procs)
}

/// Decode the output of `pcp_node_count`. Blank output means no nodes.
///
/// # Errors
///
/// Returns the integer parse error if the output is not a number.
pub fn decode_node_count(output: &str) -> std::result::Result<u32, std::num::ParseIntError> {
    let output = output.trim();
    if output.is_empty() {
        return Ok(0);
    }
    output.parse()
}

/// Decode the output of `pcp_proc_count` into its space separated tokens.
#[must_use]
pub fn decode_proc_count(output: &str) -> Vec<String> {
    output.split_whitespace().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Read};
    use test_case::test_case;

    const NODE_INFO: &str = "\
Hostname               : db1
Port                   : 5432
Status                 : 2
Weight                 : 0.500000
Status Name            : up
Role                   : primary
Replication Delay      : 0
Replication State      :
Last Status Change     : 2021-09-28 04:16:00
";

    const WATCHDOG_INFO: &str = "\
Watchdog Cluster Information
Total Nodes          : 3
Remote Nodes         : 2
Quorum state         : QUORUM EXIST
Alive Remote Nodes   : 2
VIP up on local node : YES
Master Node Name     : pgpool1:9999 Linux pgpool1
Master Host Name     : pgpool1

Watchdog Node Information
Node Name      : pgpool1:9999 Linux pgpool1
Host Name      : pgpool1
Delegate IP    : 10.0.0.100
Status         : 4
Status Name    : MASTER
";

    #[test_case("Hostname: db1", "db1" ; "simple")]
    #[test_case("Hostname               : db1", "db1" ; "padded label")]
    #[test_case("Last Status Change : 2021-09-28 04:16:00", "2021-09-28 04:16:00" ; "value with colons")]
    #[test_case("Replication State      :", "" ; "no value")]
    #[test_case("Watchdog Cluster Information", "" ; "no separator")]
    #[test_case(": value", "" ; "empty label")]
    #[test_case("", "" ; "empty line")]
    fn test_extract_value(line: &str, expected: &str) {
        assert_eq!(extract_value(line), expected);
    }

    #[test]
    fn test_decode_node_info_simple() {
        let input = "Hostname: db1\nPort: 5432\nStatus: 2\nWeight: 0.5\nRole: primary\n";
        let info = decode_node_info(input.as_bytes()).expect("decode");
        assert_eq!(
            info,
            NodeInfo {
                hostname: "db1".to_string(),
                port: 5432,
                status_code: 2,
                status: "Node is up. Connections are pooled".to_string(),
                weight: 0.5,
                role: "primary".to_string(),
            }
        );
    }

    #[test]
    fn test_decode_node_info_verbose_output() {
        let info = decode_node_info(NODE_INFO.as_bytes()).expect("decode");
        assert_eq!(info.hostname, "db1");
        assert_eq!(info.port, 5432);
        // "Status Name" and "Last Status Change" carry non-numeric values and are skipped
        assert_eq!(info.status_code, 2);
        assert_eq!(info.status, "Node is up. Connections are pooled");
        assert!((info.weight - 0.5).abs() < f64::EPSILON);
        assert_eq!(info.role, "primary");
    }

    #[test]
    fn test_decode_node_info_bad_field_keeps_default() {
        let input = "Hostname: db1\nPort: not-a-port\nStatus: 1\nWeight: heavy\nRole: standby\n";
        let info = decode_node_info(input.as_bytes()).expect("decode");
        assert_eq!(info.hostname, "db1");
        assert_eq!(info.port, 0);
        assert_eq!(info.status_code, 1);
        assert_eq!(info.status, "Node is up. No connections yet");
        assert!(info.weight.abs() < f64::EPSILON);
        assert_eq!(info.role, "standby");
    }

    #[test]
    fn test_decode_node_info_unknown_status() {
        let info = decode_node_info("Status: 7\n".as_bytes()).expect("decode");
        assert_eq!(info.status_code, 7);
        assert_eq!(info.status, "Unknown node status");
    }

    #[test]
    fn test_decode_node_info_without_trailing_newline() {
        let info = decode_node_info("Hostname: db1\nRole: primary".as_bytes()).expect("decode");
        assert_eq!(info.role, "primary");
    }

    #[test]
    fn test_decode_node_info_empty() {
        let info = decode_node_info(io::empty()).expect("decode");
        assert_eq!(info, NodeInfo::default());
    }

    #[test]
    fn test_decode_watchdog_info() {
        let info = decode_watchdog_info(WATCHDOG_INFO.as_bytes()).expect("decode");
        assert_eq!(info.total_nodes, 3);
        assert_eq!(info.remote_nodes, 2);
        assert_eq!(info.quorum_state, "QUORUM EXIST");
        assert_eq!(info.quorum_state_code, 1);
        assert_eq!(info.alive_remote_nodes, 2);
        assert!(info.vip);
    }

    #[test]
    fn test_decode_watchdog_alive_line_also_sets_remote_nodes() {
        let input = "Remote Nodes : 2\nAlive Remote Nodes : 1\n";
        let info = decode_watchdog_info(input.as_bytes()).expect("decode");
        assert_eq!(info.alive_remote_nodes, 1);
        assert_eq!(info.remote_nodes, 1);

        let input = "Alive Remote Nodes : 1\nRemote Nodes : 2\n";
        let info = decode_watchdog_info(input.as_bytes()).expect("decode");
        assert_eq!(info.alive_remote_nodes, 1);
        assert_eq!(info.remote_nodes, 2);
    }

    #[test_case("YES", true ; "upper case yes")]
    #[test_case("yes", false ; "lower case yes")]
    #[test_case("NO", false ; "no")]
    #[test_case("", false ; "empty")]
    fn test_decode_watchdog_vip(value: &str, expected: bool) {
        let input = format!("VIP up on local node : {value}\n");
        let info = decode_watchdog_info(input.as_bytes()).expect("decode");
        assert_eq!(info.vip, expected);
    }

    #[test]
    fn test_decode_watchdog_quorum_absent() {
        let info = decode_watchdog_info("Quorum state : QUORUM ABSENT\n".as_bytes())
            .expect("decode");
        assert_eq!(info.quorum_state_code, -1);
        assert_eq!(info.quorum(), QuorumState::Absent);
    }

    #[test]
    fn test_decode_watchdog_unrecognized_quorum() {
        let info = decode_watchdog_info("Quorum state : SPLIT BRAIN\n".as_bytes())
            .expect("decode");
        assert_eq!(info.quorum_state, "SPLIT BRAIN");
        assert_eq!(info.quorum_state_code, -3);
    }

    #[test]
    fn test_decode_watchdog_bad_count_keeps_default() {
        let input = "Total Nodes : many\nQuorum state : QUORUM EXIST\n";
        let info = decode_watchdog_info(input.as_bytes()).expect("decode");
        assert_eq!(info.total_nodes, 0);
        assert_eq!(info.quorum_state_code, 1);
    }

    fn proc_row(database: &str, connected: &str) -> String {
        format!(
            "{database} postgres 2021-09-28 04:16:00 1 3 0 2021-09-28 04:16:05 1 5678 1234 {connected}"
        )
    }

    #[test]
    fn test_proc_row_has_expected_width() {
        assert_eq!(
            proc_row("app", "1").split_whitespace().count(),
            PROC_INFO_FIELDS
        );
    }

    #[test]
    fn test_decode_proc_info() {
        let input = format!(
            "{}\n{}\n\nheader line\n{}\n",
            proc_row("app", "1"),
            proc_row("app", "0"),
            proc_row("reports", "1"),
        );
        let procs = decode_proc_info(input.as_bytes()).expect("decode");
        assert_eq!(procs.len(), 3);
        assert_eq!(procs[0].database, "app");
        assert_eq!(procs[0].username, "postgres");
        assert!(procs[0].connected);
        assert!(!procs[1].connected);
        assert_eq!(procs[2].database, "reports");
    }

    #[test_case("1", true ; "one")]
    #[test_case("0", false ; "zero")]
    #[test_case("yes", false ; "word")]
    #[test_case("01", false ; "padded one")]
    fn test_decode_proc_info_connected_flag(flag: &str, expected: bool) {
        let procs = decode_proc_info(proc_row("app", flag).as_bytes()).expect("decode");
        assert_eq!(procs.len(), 1);
        assert_eq!(procs[0].connected, expected);
    }

    #[test]
    fn test_decode_proc_info_skips_wrong_width() {
        let input = "a b c d e f g h i j k l\na b c d e f g h i j k l m n\n";
        let procs = decode_proc_info(input.as_bytes()).expect("decode");
        assert!(procs.is_empty());
    }

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"))
        }
    }

    #[test]
    fn test_decode_propagates_read_errors() {
        let err = decode_proc_info(io::BufReader::new(FailingReader)).unwrap_err();
        assert!(matches!(err, crate::PcpError::Io(_)));
        assert!(decode_node_info(io::BufReader::new(FailingReader)).is_err());
        assert!(decode_watchdog_info(io::BufReader::new(FailingReader)).is_err());
    }

    #[test_case("2\n", Some(2) ; "single integer")]
    #[test_case("  \n", Some(0) ; "blank")]
    #[test_case("", Some(0) ; "empty")]
    #[test_case("two\n", None ; "not a number")]
    fn test_decode_node_count(output: &str, expected: Option<u32>) {
        assert_eq!(decode_node_count(output).ok(), expected);
    }

    #[test]
    fn test_decode_proc_count() {
        assert_eq!(
            decode_proc_count("12345 12346 12347\n"),
            vec!["12345", "12346", "12347"]
        );
        assert!(decode_proc_count("\n").is_empty());
    }
}
