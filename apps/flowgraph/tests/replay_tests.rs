//! # Replay Tests
//!
//! End-to-end checks of script files through the CLI command layer.

use flowgraph::AppError;
use flowgraph::cli::{MAX_SCRIPT_FILE_SIZE, read_script, replay};
use flowgraph::config::{Config, GraphConfig};
use flowgraph_core::{GraphError, GraphEvent, GraphSnapshot};
use std::io::Write;

const PIPELINE: &str = r#"# two nodes and a connection
{"op": "addNode", "id": "read", "component": "fs/ReadFile"}
{"op": "addNode", "id": "print", "component": "core/Output"}

{"op": "addEdge", "from": {"node": "read", "port": "OUT"}, "to": {"node": "print", "port": "in"}}
{"op": "addInitial", "data": "README.md", "to": {"node": "read", "port": "in"}}
{"op": "addGroup", "name": "io", "nodes": ["read", "print"]}
"#;

fn script_file(text: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(text.as_bytes()).expect("write script");
    file
}

fn replay_to_string(text: &str, state: bool, json_mode: bool) -> (Result<usize, AppError>, String) {
    let mut out = Vec::new();
    let result = replay(text, &GraphConfig::default(), state, json_mode, &mut out);
    (result, String::from_utf8(out).expect("utf8 output"))
}

// =============================================================================
// FILE HANDLING
// =============================================================================

#[test]
fn reads_script_from_file() {
    let file = script_file(PIPELINE);
    let text = read_script(file.path()).expect("read");
    assert_eq!(text, PIPELINE);
}

#[test]
fn refuses_oversized_script() {
    let file = tempfile::NamedTempFile::new().expect("temp file");
    file.as_file()
        .set_len(MAX_SCRIPT_FILE_SIZE + 1)
        .expect("grow file");

    let err = read_script(file.path()).expect_err("must refuse");
    assert!(matches!(err, AppError::FileTooLarge { .. }));
}

#[test]
fn refuses_directory() {
    let dir = tempfile::tempdir().expect("temp dir");
    let err = read_script(dir.path()).expect_err("must refuse");
    assert!(matches!(err, AppError::Io(_)));
}

#[test]
fn loads_config_file() {
    let file = script_file("[graph]\nname = \"from-file\"\n\n[log]\nformat = \"json\"\n");
    let config = Config::load(Some(file.path())).expect("load");
    assert_eq!(config.graph.name, "from-file");
}

#[test]
fn missing_explicit_config_is_an_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let result = Config::load(Some(dir.path().join("absent.toml").as_path()));
    assert!(matches!(result, Err(AppError::Io(_))));
}

// =============================================================================
// REPLAY OUTPUT
// =============================================================================

#[test]
fn text_output_lists_events() {
    let (result, output) = replay_to_string(PIPELINE, false, false);

    assert_eq!(result.expect("replay"), 5);
    let lines: Vec<&str> = output.lines().collect();
    // five operations, each wrapped in an implicit transaction
    assert_eq!(lines.len(), 15);
    assert!(lines[0].starts_with("startTransaction "));
    assert!(lines[1].starts_with("addNode "));
    assert!(lines[1].contains("\"read\""));
    assert!(lines[7].starts_with("addEdge "));
    assert!(lines[7].contains("\"out\""));
    assert!(lines[10].starts_with("addInitial "));
    assert!(lines[13].starts_with("addGroup "));
}

#[test]
fn json_output_round_trips_events() {
    let (result, output) = replay_to_string(PIPELINE, false, true);
    result.expect("replay");

    let events: Vec<GraphEvent> = output
        .lines()
        .map(|l| serde_json::from_str(l).expect("event json"))
        .collect();

    assert_eq!(events.len(), 15);
    assert!(matches!(
        &events[1],
        GraphEvent::AddNode { node } if node.id == "read"
    ));
}

#[test]
fn json_state_is_final_snapshot() {
    let script = format!("{PIPELINE}{{\"op\": \"removeNode\", \"id\": \"read\"}}\n");
    let (result, output) = replay_to_string(&script, true, true);
    result.expect("replay");

    let last = output.lines().last().expect("state line");
    let snapshot: GraphSnapshot = serde_json::from_str(last).expect("snapshot json");

    assert_eq!(snapshot.nodes.len(), 1);
    assert!(snapshot.edges.is_empty());
    assert!(snapshot.initials.is_empty());
    assert_eq!(snapshot.groups[0].nodes, vec!["print".to_string()]);
}

#[test]
fn text_state_lists_entities() {
    let (result, output) = replay_to_string(PIPELINE, true, false);
    result.expect("replay");

    assert!(output.contains("Graph: Untitled"));
    assert!(output.contains("edge    read.out -> print.in"));
    assert!(output.contains("initial \"README.md\" -> read.in"));
    assert!(output.contains("group   io [read, print]"));
}

#[test]
fn explicit_transaction_groups_events() {
    let script = r#"{"op": "startTransaction", "id": "paste"}
{"op": "addNode", "id": "A", "component": "x"}
{"op": "addNode", "id": "B", "component": "x"}
{"op": "endTransaction", "id": "paste"}"#;
    let (result, output) = replay_to_string(script, false, false);

    assert_eq!(result.expect("replay"), 4);
    let names: Vec<&str> = output
        .lines()
        .filter_map(|l| l.split_whitespace().next())
        .collect();
    assert_eq!(
        names,
        vec!["startTransaction", "addNode", "addNode", "endTransaction"]
    );
}

#[test]
fn open_transaction_at_end_is_an_error() {
    let script = r#"{"op": "startTransaction", "id": "t"}
{"op": "addNode", "id": "A", "component": "x"}"#;
    let (result, output) = replay_to_string(script, true, false);

    let err = result.expect_err("must fail");
    assert!(matches!(
        err,
        AppError::UnterminatedTransaction { ref id } if id == "t"
    ));
    let names: Vec<&str> = output
        .lines()
        .filter_map(|l| l.split_whitespace().next())
        .collect();
    assert_eq!(names, vec!["startTransaction", "addNode"]);
    assert!(!output.contains("Graph:"));
}

#[test]
fn invalid_state_reports_line_and_keeps_prior_events() {
    let script = r#"{"op": "addNode", "id": "A", "component": "x"}
{"op": "renameGroup", "from": "missing", "to": "other"}"#;
    let (result, output) = replay_to_string(script, true, false);

    let err = result.expect_err("must fail");
    assert!(matches!(
        err,
        AppError::Graph {
            line: 2,
            source: GraphError::GroupNotFound(_)
        }
    ));
    assert_eq!(output.lines().count(), 3);
    assert!(!output.contains("Graph:"));
}
