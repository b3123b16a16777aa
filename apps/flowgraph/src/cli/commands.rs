//! CLI command implementations.

use crate::config::GraphConfig;
use crate::error::AppError;
use crate::script::{parse_script, run_script};
use flowgraph_core::{Endpoint, Graph, GraphEvent, GraphSnapshot};
use std::cell::RefCell;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::rc::Rc;

// =============================================================================
// FILE VALIDATION
// =============================================================================

/// Maximum script size (16 MB).
pub const MAX_SCRIPT_FILE_SIZE: u64 = 16 * 1024 * 1024;

/// Validate file size before reading.
fn validate_file_size(path: &Path, max_size: u64) -> Result<(), AppError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| AppError::Io(format!("Cannot read file metadata: {}", e)))?;

    if metadata.len() > max_size {
        return Err(AppError::FileTooLarge {
            size: metadata.len(),
            max: max_size,
        });
    }
    Ok(())
}

/// Resolve `path` to an existing regular file.
fn validate_file_path(path: &Path) -> Result<PathBuf, AppError> {
    let canonical = path
        .canonicalize()
        .map_err(|e| AppError::Io(format!("Invalid file path '{}': {}", path.display(), e)))?;

    if !canonical.is_file() {
        return Err(AppError::Io(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    Ok(canonical)
}

/// Read a script file after path and size checks.
pub fn read_script(path: &Path) -> Result<String, AppError> {
    let validated_path = validate_file_path(path)?;
    validate_file_size(&validated_path, MAX_SCRIPT_FILE_SIZE)?;
    Ok(std::fs::read_to_string(&validated_path)?)
}

// =============================================================================
// OUTPUT FORMATTING
// =============================================================================

/// One event as `<name> <arguments>`.
pub fn format_event(event: &GraphEvent) -> Result<String, AppError> {
    let mut args = serde_json::to_value(event)?;
    if let Some(fields) = args.as_object_mut() {
        fields.remove("event");
    }
    Ok(format!("{} {}", event.kind(), args))
}

fn format_endpoint(endpoint: &Endpoint) -> String {
    match endpoint.index {
        Some(index) => format!("{}.{}[{}]", endpoint.node, endpoint.port, index),
        None => format!("{}.{}", endpoint.node, endpoint.port),
    }
}

/// Human-readable listing of a graph.
pub fn format_snapshot(snapshot: &GraphSnapshot) -> String {
    let mut out = String::new();
    out.push_str(&format!("Graph: {}\n", snapshot.name));
    out.push_str("==================\n");
    out.push_str(&format!(
        "Nodes: {}  Edges: {}  Initials: {}  Groups: {}\n",
        snapshot.nodes.len(),
        snapshot.edges.len(),
        snapshot.initials.len(),
        snapshot.groups.len()
    ));

    for node in &snapshot.nodes {
        out.push_str(&format!("node    {} ({})\n", node.id, node.component));
    }
    for edge in &snapshot.edges {
        out.push_str(&format!(
            "edge    {} -> {}\n",
            format_endpoint(&edge.from),
            format_endpoint(&edge.to)
        ));
    }
    for initial in &snapshot.initials {
        out.push_str(&format!(
            "initial {} -> {}\n",
            initial.from.data,
            format_endpoint(&initial.to)
        ));
    }
    for (public, port) in &snapshot.inports {
        out.push_str(&format!("inport  {} -> {}.{}\n", public, port.process, port.port));
    }
    for (public, port) in &snapshot.outports {
        out.push_str(&format!("outport {} <- {}.{}\n", public, port.process, port.port));
    }
    for export in &snapshot.exports {
        out.push_str(&format!(
            "export  {} = {}.{}\n",
            export.public, export.process, export.port
        ));
    }
    for group in &snapshot.groups {
        out.push_str(&format!("group   {} [{}]\n", group.name, group.nodes.join(", ")));
    }
    out
}

// =============================================================================
// REPLAY COMMAND
// =============================================================================

/// Apply `text` to a fresh graph, writing events (and optionally the final
/// state) to `out`.
///
/// Events emitted before a failing line are still written. A script that
/// leaves a transaction open fails after its events are written.
pub fn replay(
    text: &str,
    graph_config: &GraphConfig,
    state: bool,
    json_mode: bool,
    out: &mut impl Write,
) -> Result<usize, AppError> {
    let script = parse_script(text)?;

    let mut graph = Graph::new(graph_config.name.clone(), graph_config.options());
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    graph.subscribe_all(move |event| sink.borrow_mut().push(event.clone()));

    let result = run_script(&mut graph, script);

    for event in events.borrow().iter() {
        if json_mode {
            writeln!(out, "{}", serde_json::to_string(event)?)?;
        } else {
            writeln!(out, "{}", format_event(event)?)?;
        }
    }

    let applied = result?;

    if let Some(id) = graph.transaction().id() {
        return Err(AppError::UnterminatedTransaction { id: id.to_string() });
    }

    if state {
        let snapshot = graph.snapshot();
        if json_mode {
            writeln!(out, "{}", serde_json::to_string(&snapshot)?)?;
        } else {
            writeln!(out)?;
            write!(out, "{}", format_snapshot(&snapshot))?;
        }
    }

    Ok(applied)
}

/// Replay a script file to stdout.
pub fn cmd_replay(
    file: &Path,
    graph_config: &GraphConfig,
    state: bool,
    json_mode: bool,
    quiet: bool,
) -> Result<(), AppError> {
    let text = read_script(file)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let applied = replay(&text, graph_config, state, json_mode, &mut out)?;

    if !quiet {
        tracing::info!(file = %file.display(), operations = applied, "replay complete");
    }
    Ok(())
}

// =============================================================================
// CHECK COMMAND
// =============================================================================

/// Parse a script file and report its operation count.
pub fn cmd_check(file: &Path, json_mode: bool) -> Result<(), AppError> {
    let text = read_script(file)?;
    let script = parse_script(&text)?;

    if json_mode {
        let output = serde_json::json!({
            "file": file.to_string_lossy(),
            "operations": script.len(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("Script OK: {} operations", script.len());
    Ok(())
}
