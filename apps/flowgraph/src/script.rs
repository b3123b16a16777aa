//! # Editing Scripts
//!
//! A script is a JSON Lines file. Every non-blank line not starting with `#`
//! is one graph operation:
//!
//! ```text
//! # build a pipeline
//! {"op": "addNode", "id": "read", "component": "fs/ReadFile"}
//! {"op": "addNode", "id": "print", "component": "core/Output"}
//! {"op": "addEdge", "from": {"node": "read", "port": "out"}, "to": {"node": "print", "port": "in"}}
//! {"op": "addInitial", "data": "README.md", "to": {"node": "read", "port": "in"}}
//! ```

use crate::error::AppError;
use flowgraph_core::{Endpoint, Graph, GraphError, Metadata};
use serde::Deserialize;
use serde_json::Value;

// =============================================================================
// OPERATIONS
// =============================================================================

/// One scripted graph operation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum ScriptOp {
    StartTransaction {
        id: String,
        #[serde(default)]
        metadata: Metadata,
    },
    EndTransaction {
        id: String,
        #[serde(default)]
        metadata: Metadata,
    },
    SetProperties {
        properties: Metadata,
    },

    AddNode {
        id: String,
        component: String,
        #[serde(default)]
        metadata: Metadata,
    },
    RemoveNode {
        id: String,
    },
    RenameNode {
        from: String,
        to: String,
    },
    SetNodeMetadata {
        id: String,
        metadata: Metadata,
    },

    /// Endpoint indexes are optional, so `addEdgeIndex` is the same shape.
    #[serde(alias = "addEdgeIndex")]
    AddEdge {
        from: Endpoint,
        to: Endpoint,
        #[serde(default)]
        metadata: Metadata,
    },
    /// Without `to`, every edge touching `from` is removed.
    RemoveEdge {
        from: Endpoint,
        #[serde(default)]
        to: Option<Endpoint>,
    },
    SetEdgeMetadata {
        from: Endpoint,
        to: Endpoint,
        metadata: Metadata,
    },

    #[serde(alias = "addInitialIndex")]
    AddInitial {
        data: Value,
        to: Endpoint,
        #[serde(default)]
        metadata: Metadata,
    },
    RemoveInitial {
        node: String,
        port: String,
    },

    AddInport {
        public: String,
        node: String,
        port: String,
        #[serde(default)]
        metadata: Metadata,
    },
    RemoveInport {
        public: String,
    },
    RenameInport {
        from: String,
        to: String,
    },
    SetInportMetadata {
        public: String,
        metadata: Metadata,
    },

    AddOutport {
        public: String,
        node: String,
        port: String,
        #[serde(default)]
        metadata: Metadata,
    },
    RemoveOutport {
        public: String,
    },
    RenameOutport {
        from: String,
        to: String,
    },
    SetOutportMetadata {
        public: String,
        metadata: Metadata,
    },

    AddExport {
        public: String,
        node: String,
        port: String,
        #[serde(default)]
        metadata: Option<Metadata>,
    },
    RemoveExport {
        public: String,
    },

    AddGroup {
        name: String,
        #[serde(default)]
        nodes: Vec<String>,
        #[serde(default)]
        metadata: Metadata,
    },
    RenameGroup {
        from: String,
        to: String,
    },
    RemoveGroup {
        name: String,
    },
    SetGroupMetadata {
        name: String,
        metadata: Metadata,
    },
}

impl ScriptOp {
    /// Apply this operation to `graph`.
    ///
    /// Operations that reference missing entities are no-ops; only invalid
    /// transaction or group states are errors.
    pub fn apply(self, graph: &mut Graph) -> Result<(), GraphError> {
        match self {
            Self::StartTransaction { id, metadata } => graph.start_transaction(id, metadata)?,
            Self::EndTransaction { id, metadata } => graph.end_transaction(id, metadata)?,
            Self::SetProperties { properties } => graph.set_properties(properties),

            Self::AddNode {
                id,
                component,
                metadata,
            } => {
                graph.add_node(id, component, metadata);
            }
            Self::RemoveNode { id } => graph.remove_node(&id),
            Self::RenameNode { from, to } => graph.rename_node(&from, &to),
            Self::SetNodeMetadata { id, metadata } => graph.set_node_metadata(&id, &metadata),

            Self::AddEdge { from, to, metadata } => {
                graph.add_edge_index(
                    &from.node, &from.port, from.index, &to.node, &to.port, to.index, metadata,
                );
            }
            Self::RemoveEdge { from, to } => graph.remove_edge(
                &from.node,
                &from.port,
                to.as_ref().map(|t| (t.node.as_str(), t.port.as_str())),
            ),
            Self::SetEdgeMetadata { from, to, metadata } => {
                graph.set_edge_metadata(&from.node, &from.port, &to.node, &to.port, &metadata);
            }

            Self::AddInitial { data, to, metadata } => {
                graph.add_initial_index(data, &to.node, &to.port, to.index, metadata);
            }
            Self::RemoveInitial { node, port } => graph.remove_initial(&node, &port),

            Self::AddInport {
                public,
                node,
                port,
                metadata,
            } => {
                graph.add_inport(&public, &node, &port, metadata);
            }
            Self::RemoveInport { public } => graph.remove_inport(&public),
            Self::RenameInport { from, to } => graph.rename_inport(&from, &to),
            Self::SetInportMetadata { public, metadata } => {
                graph.set_inport_metadata(&public, &metadata);
            }

            Self::AddOutport {
                public,
                node,
                port,
                metadata,
            } => {
                graph.add_outport(&public, &node, &port, metadata);
            }
            Self::RemoveOutport { public } => graph.remove_outport(&public),
            Self::RenameOutport { from, to } => graph.rename_outport(&from, &to),
            Self::SetOutportMetadata { public, metadata } => {
                graph.set_outport_metadata(&public, &metadata);
            }

            Self::AddExport {
                public,
                node,
                port,
                metadata,
            } => {
                graph.add_export(&public, &node, &port, metadata);
            }
            Self::RemoveExport { public } => graph.remove_export(&public),

            Self::AddGroup {
                name,
                nodes,
                metadata,
            } => {
                graph.add_group(name, nodes, metadata);
            }
            Self::RenameGroup { from, to } => graph.rename_group(&from, &to)?,
            Self::RemoveGroup { name } => graph.remove_group(&name),
            Self::SetGroupMetadata { name, metadata } => {
                graph.set_group_metadata(&name, &metadata);
            }
        }
        Ok(())
    }
}

// =============================================================================
// SCRIPT
// =============================================================================

/// A parsed operation with its 1-based source line.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptLine {
    pub line: usize,
    pub op: ScriptOp,
}

/// Parse a whole script.
///
/// Fails on the first malformed line.
pub fn parse_script(text: &str) -> Result<Vec<ScriptLine>, AppError> {
    let mut ops = Vec::new();

    for (i, raw) in text.lines().enumerate() {
        let line = i + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let op = serde_json::from_str(trimmed).map_err(|e| AppError::Parse {
            line,
            message: e.to_string(),
        })?;
        ops.push(ScriptLine { line, op });
    }

    Ok(ops)
}

/// Apply parsed operations in order, stopping at the first error.
pub fn run_script(graph: &mut Graph, script: Vec<ScriptLine>) -> Result<usize, AppError> {
    let mut applied = 0;
    for ScriptLine { line, op } in script {
        tracing::debug!(line, op = ?op, "applying");
        op.apply(graph)
            .map_err(|source| AppError::Graph { line, source })?;
        applied += 1;
    }
    Ok(applied)
}
