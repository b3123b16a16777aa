//! # Core Type Definitions
//!
//! This module contains the records stored by the flow graph model:
//! - Endpoints and connections (`Endpoint`, `Edge`, `Initial`)
//! - Processing units (`Node`)
//! - Graph-level public ports (`Export`, `PublicPort`)
//! - Organizational tagging (`Group`)
//! - Error types (`GraphError`)
//!
//! Every record is plain data. Events carry owned clones of these records,
//! so consumers always see the state as it was when the event fired.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

// =============================================================================
// METADATA
// =============================================================================

/// Free-form metadata attached to graph entities.
///
/// Ordered by key so snapshots compare and print deterministically.
pub type Metadata = BTreeMap<String, serde_json::Value>;

// =============================================================================
// NODE
// =============================================================================

/// A processing unit in the flow graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique identifier within the graph.
    pub id: String,
    /// Opaque component label (never validated).
    pub component: String,
    /// Free-form metadata.
    #[serde(default)]
    pub metadata: Metadata,
}

impl Node {
    /// Create a new node.
    #[must_use]
    pub fn new(id: impl Into<String>, component: impl Into<String>, metadata: Metadata) -> Self {
        Self {
            id: id.into(),
            component: component.into(),
            metadata,
        }
    }
}

// =============================================================================
// ENDPOINTS & CONNECTIONS
// =============================================================================

/// One end of a connection: a port on a node, optionally indexed for
/// fan-in/fan-out ports.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Endpoint {
    pub node: String,
    pub port: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,
}

impl Endpoint {
    /// Create an unindexed endpoint.
    #[must_use]
    pub fn new(node: impl Into<String>, port: impl Into<String>) -> Self {
        Self {
            node: node.into(),
            port: port.into(),
            index: None,
        }
    }

    /// Create an endpoint with an optional port index.
    #[must_use]
    pub fn indexed(node: impl Into<String>, port: impl Into<String>, index: Option<u32>) -> Self {
        Self {
            node: node.into(),
            port: port.into(),
            index,
        }
    }

    /// Check whether this endpoint is `port` on `node`, ignoring the index.
    #[must_use]
    pub fn is(&self, node: &str, port: &str) -> bool {
        self.node == node && self.port == port
    }
}

/// A directed connection from an output port to an input port.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub from: Endpoint,
    pub to: Endpoint,
    #[serde(default)]
    pub metadata: Metadata,
}

impl Edge {
    /// Check if this edge touches a node on either side.
    #[must_use]
    pub fn involves_node(&self, node: &str) -> bool {
        self.from.node == node || self.to.node == node
    }

    /// Check if this edge touches `port` on `node` on either side.
    #[must_use]
    pub fn involves_port(&self, node: &str, port: &str) -> bool {
        self.from.is(node, port) || self.to.is(node, port)
    }

    /// Check whether this edge has the given endpoints, indexes included.
    #[must_use]
    pub fn has_key(&self, from: &Endpoint, to: &Endpoint) -> bool {
        self.from == *from && self.to == *to
    }
}

/// The literal carried by an initial value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitialSource {
    pub data: serde_json::Value,
}

/// A literal value pre-bound to a node's input port (an IIP).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Initial {
    pub from: InitialSource,
    pub to: Endpoint,
    #[serde(default)]
    pub metadata: Metadata,
}

// =============================================================================
// EXPORTED PORTS
// =============================================================================

/// A direction-agnostic exported port (legacy form of inports/outports).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Export {
    /// Public name of the port on the graph's own interface.
    pub public: String,
    /// Node the port belongs to.
    pub process: String,
    /// Port on that node.
    pub port: String,
    #[serde(default)]
    pub metadata: Metadata,
}

/// Target of a directional inport/outport, keyed by its public name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicPort {
    pub process: String,
    pub port: String,
    #[serde(default)]
    pub metadata: Metadata,
}

// =============================================================================
// GROUP
// =============================================================================

/// A named, non-exclusive collection of node ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub name: String,
    pub nodes: Vec<String>,
    #[serde(default)]
    pub metadata: Metadata,
}

impl Group {
    /// Check if a node is a member of this group.
    #[must_use]
    pub fn contains(&self, node: &str) -> bool {
        self.nodes.iter().any(|n| n == node)
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors raised by the graph model.
///
/// Every variant is an invalid-state failure: the caller asked for something
/// the current state cannot honor. Lookups of missing nodes, edges, ports or
/// groups are not errors; those operations are silent no-ops.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// A transaction was started while another one is open.
    #[error("Nested transactions are not supported (open transaction: {0})")]
    TransactionAlreadyOpen(String),

    /// A transaction was ended while none is open.
    #[error("Attempted to end non-existing transaction")]
    NoOpenTransaction,

    /// A group rename referenced a group that does not exist.
    #[error("Group not found: {0}")]
    GroupNotFound(String),

    /// A group rename would collide with another existing group.
    #[error("Group already exists: {0}")]
    GroupExists(String),
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_involvement() {
        let edge = Edge {
            from: Endpoint::new("A", "out"),
            to: Endpoint::new("B", "in"),
            metadata: Metadata::new(),
        };

        assert!(edge.involves_node("A"));
        assert!(edge.involves_node("B"));
        assert!(!edge.involves_node("C"));
        assert!(edge.involves_port("B", "in"));
        assert!(!edge.involves_port("B", "out"));
    }

    #[test]
    fn edge_key_includes_index() {
        let edge = Edge {
            from: Endpoint::new("A", "out"),
            to: Endpoint::indexed("B", "in", Some(1)),
            metadata: Metadata::new(),
        };

        assert!(edge.has_key(&Endpoint::new("A", "out"), &Endpoint::indexed("B", "in", Some(1))));
        assert!(!edge.has_key(&Endpoint::new("A", "out"), &Endpoint::new("B", "in")));
    }

    #[test]
    fn endpoint_serializes_without_missing_index() {
        let json = serde_json::to_string(&Endpoint::new("A", "out")).expect("serialize");
        assert_eq!(json, r#"{"node":"A","port":"out"}"#);

        let json = serde_json::to_string(&Endpoint::indexed("A", "out", Some(2))).expect("serialize");
        assert_eq!(json, r#"{"node":"A","port":"out","index":2}"#);
    }

    #[test]
    fn group_membership() {
        let group = Group {
            name: "g".to_string(),
            nodes: vec!["A".to_string(), "B".to_string()],
            metadata: Metadata::new(),
        };
        assert!(group.contains("A"));
        assert!(!group.contains("C"));
    }

    #[test]
    fn error_messages() {
        assert_eq!(
            GraphError::TransactionAlreadyOpen("t1".to_string()).to_string(),
            "Nested transactions are not supported (open transaction: t1)"
        );
        assert_eq!(
            GraphError::GroupNotFound("g".to_string()).to_string(),
            "Group not found: g"
        );
    }
}
