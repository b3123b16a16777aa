//! # Graph Model
//!
//! The `Graph` owns every record of a flow graph and is the only writer of
//! that state. Each mutating operation:
//!
//! 1. looks up what it needs, returning early (a silent no-op) when a
//!    referenced node, edge, port or group is missing,
//! 2. enters the transaction cursor, opening an implicit transaction when
//!    none is open,
//! 3. mutates state and emits its notifications,
//! 4. leaves the cursor, closing the implicit transaction once the outermost
//!    call unwinds.
//!
//! Cascades (node removal, port removal clearing metadata) call other
//! mutating operations inline, so they share the caller's transaction.
//!
//! Edge, initial value, exported port and group operations live in their own
//! modules as further `impl Graph` blocks.

use crate::events::{EventKind, GraphEvent, Notifier, SubscriptionId};
use crate::metadata::{clearing_patch, merge_metadata};
use crate::primitives::{DEFAULT_GRAPH_NAME, IMPLICIT_TRANSACTION};
use crate::transaction::{Step, TransactionCursor};
use crate::types::{Edge, Export, Group, GraphError, Initial, Metadata, Node, PublicPort};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// =============================================================================
// OPTIONS
// =============================================================================

/// Options fixed when a graph is created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GraphOptions {
    /// When false, port names and public port names are lower-cased for
    /// storage and comparison.
    pub case_sensitive: bool,
}

// =============================================================================
// SNAPSHOT
// =============================================================================

/// A plain-data copy of a graph's state, for serializers and inspectors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub name: String,
    pub case_sensitive: bool,
    pub properties: Metadata,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub initials: Vec<Initial>,
    pub exports: Vec<Export>,
    pub inports: BTreeMap<String, PublicPort>,
    pub outports: BTreeMap<String, PublicPort>,
    pub groups: Vec<Group>,
}

// =============================================================================
// GRAPH
// =============================================================================

/// An in-memory flow graph with transactional change notifications.
pub struct Graph {
    name: String,
    case_sensitive: bool,
    properties: Metadata,
    pub(crate) nodes: Vec<Node>,
    pub(crate) edges: Vec<Edge>,
    pub(crate) initials: Vec<Initial>,
    pub(crate) exports: Vec<Export>,
    pub(crate) inports: BTreeMap<String, PublicPort>,
    pub(crate) outports: BTreeMap<String, PublicPort>,
    pub(crate) groups: Vec<Group>,
    transaction: TransactionCursor,
    notifier: Notifier,
}

impl fmt::Debug for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Graph")
            .field("name", &self.name)
            .field("case_sensitive", &self.case_sensitive)
            .field("node_count", &self.nodes.len())
            .field("edge_count", &self.edges.len())
            .field("transaction", &self.transaction)
            .field("notifier", &self.notifier)
            .finish()
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new(DEFAULT_GRAPH_NAME, GraphOptions::default())
    }
}

impl Graph {
    /// Create an empty graph.
    #[must_use]
    pub fn new(name: impl Into<String>, options: GraphOptions) -> Self {
        Self::with_notifier(name, options, Notifier::new())
    }

    /// Create an empty graph that reports to an existing notifier.
    #[must_use]
    pub fn with_notifier(name: impl Into<String>, options: GraphOptions, notifier: Notifier) -> Self {
        Self {
            name: name.into(),
            case_sensitive: options.case_sensitive,
            properties: Metadata::new(),
            nodes: Vec::new(),
            edges: Vec::new(),
            initials: Vec::new(),
            exports: Vec::new(),
            inports: BTreeMap::new(),
            outports: BTreeMap::new(),
            groups: Vec::new(),
            transaction: TransactionCursor::new(),
            notifier,
        }
    }

    /// The graph's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether port names are compared case-sensitively.
    #[must_use]
    pub fn case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    /// Graph-level properties.
    #[must_use]
    pub fn properties(&self) -> &Metadata {
        &self.properties
    }

    /// Copy the current state into plain data.
    #[must_use]
    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot {
            name: self.name.clone(),
            case_sensitive: self.case_sensitive,
            properties: self.properties.clone(),
            nodes: self.nodes.clone(),
            edges: self.edges.clone(),
            initials: self.initials.clone(),
            exports: self.exports.clone(),
            inports: self.inports.clone(),
            outports: self.outports.clone(),
            groups: self.groups.clone(),
        }
    }

    // =========================================================================
    // SUBSCRIPTIONS
    // =========================================================================

    /// Register a handler for one kind of event.
    pub fn subscribe(
        &mut self,
        kind: EventKind,
        handler: impl FnMut(&GraphEvent) + 'static,
    ) -> SubscriptionId {
        self.notifier.subscribe(kind, handler)
    }

    /// Register a handler for every event.
    pub fn subscribe_all(&mut self, handler: impl FnMut(&GraphEvent) + 'static) -> SubscriptionId {
        self.notifier.subscribe_all(handler)
    }

    /// Remove a handler. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.notifier.unsubscribe(id)
    }

    // =========================================================================
    // TRANSACTIONS
    // =========================================================================

    /// The transaction cursor.
    #[must_use]
    pub fn transaction(&self) -> &TransactionCursor {
        &self.transaction
    }

    /// Check if any transaction (explicit or implicit) is open.
    #[must_use]
    pub fn is_in_transaction(&self) -> bool {
        self.transaction.is_open()
    }

    /// Open an explicit transaction.
    ///
    /// While it is open, mutations do not open implicit transactions; the
    /// caller must close it with `end_transaction`.
    pub fn start_transaction(
        &mut self,
        id: impl Into<String>,
        metadata: Metadata,
    ) -> Result<(), GraphError> {
        if let Some(open) = self.transaction.id() {
            return Err(GraphError::TransactionAlreadyOpen(open.to_string()));
        }
        let id = id.into();
        self.transaction.open(id.clone());
        self.emit(GraphEvent::StartTransaction { id, metadata });
        Ok(())
    }

    /// Close the open transaction.
    ///
    /// The id is reported as given; it is not checked against the open one.
    pub fn end_transaction(
        &mut self,
        id: impl Into<String>,
        metadata: Metadata,
    ) -> Result<(), GraphError> {
        if self.transaction.close().is_none() {
            return Err(GraphError::NoOpenTransaction);
        }
        self.emit(GraphEvent::EndTransaction {
            id: id.into(),
            metadata,
        });
        Ok(())
    }

    /// Enter a mutating call.
    pub(crate) fn begin(&mut self) {
        if self.transaction.enter() == Step::Open {
            self.transaction.open(IMPLICIT_TRANSACTION);
            self.emit(GraphEvent::StartTransaction {
                id: IMPLICIT_TRANSACTION.to_string(),
                metadata: Metadata::new(),
            });
        }
    }

    /// Leave a mutating call.
    pub(crate) fn finish(&mut self) {
        if self.transaction.leave() == Step::Close {
            self.transaction.close();
            self.emit(GraphEvent::EndTransaction {
                id: IMPLICIT_TRANSACTION.to_string(),
                metadata: Metadata::new(),
            });
        }
    }

    pub(crate) fn emit(&mut self, event: GraphEvent) {
        self.notifier.emit(&event);
    }

    /// Normalize a port name according to the graph's case sensitivity.
    #[must_use]
    pub fn port_name(&self, port: &str) -> String {
        if self.case_sensitive {
            port.to_string()
        } else {
            port.to_lowercase()
        }
    }

    // =========================================================================
    // PROPERTIES
    // =========================================================================

    /// Overwrite graph properties with the given keys.
    ///
    /// Unlike entity metadata, falsy values are stored, not deleted.
    pub fn set_properties(&mut self, properties: Metadata) {
        self.begin();
        let before = self.properties.clone();
        self.properties.extend(properties);
        self.emit(GraphEvent::ChangeProperties {
            properties: self.properties.clone(),
            before,
        });
        self.finish();
    }

    // =========================================================================
    // NODES
    // =========================================================================

    /// Add a node.
    ///
    /// Returns `None` without emitting anything if the id is already taken.
    pub fn add_node(
        &mut self,
        id: impl Into<String>,
        component: impl Into<String>,
        metadata: Metadata,
    ) -> Option<Node> {
        let id = id.into();
        if self.get_node(&id).is_some() {
            tracing::debug!(node = %id, "add_node: duplicate id rejected");
            return None;
        }

        self.begin();
        let node = Node::new(id, component, metadata);
        self.nodes.push(node.clone());
        self.emit(GraphEvent::AddNode { node: node.clone() });
        self.finish();

        Some(node)
    }

    /// Remove a node together with everything that references it.
    ///
    /// Cascade order: touching edges, initial values, exports, inports,
    /// outports, group membership, node metadata, then the node itself.
    pub fn remove_node(&mut self, id: &str) {
        if self.get_node(id).is_none() {
            tracing::debug!(node = %id, "remove_node: unknown node");
            return;
        }

        self.begin();

        let edges: Vec<(String, String, String, String)> = self
            .edges
            .iter()
            .filter(|e| e.involves_node(id))
            .map(|e| {
                (
                    e.from.node.clone(),
                    e.from.port.clone(),
                    e.to.node.clone(),
                    e.to.port.clone(),
                )
            })
            .collect();
        for (out_node, out_port, in_node, in_port) in edges {
            self.remove_edge(&out_node, &out_port, Some((&in_node, &in_port)));
        }

        let mut initial_ports: Vec<String> = Vec::new();
        for initial in self.initials.iter().filter(|i| i.to.node == id) {
            if !initial_ports.contains(&initial.to.port) {
                initial_ports.push(initial.to.port.clone());
            }
        }
        for port in initial_ports {
            self.remove_initial(id, &port);
        }

        self.remove_exports_of(id);

        let inports: Vec<String> = self
            .inports
            .iter()
            .filter(|(_, p)| p.process == id)
            .map(|(name, _)| name.clone())
            .collect();
        for name in inports {
            self.remove_inport(&name);
        }

        let outports: Vec<String> = self
            .outports
            .iter()
            .filter(|(_, p)| p.process == id)
            .map(|(name, _)| name.clone())
            .collect();
        for name in outports {
            self.remove_outport(&name);
        }

        for group in &mut self.groups {
            group.nodes.retain(|n| n != id);
        }

        if let Some(patch) = self.get_node(id).map(|n| clearing_patch(&n.metadata)) {
            self.set_node_metadata(id, &patch);
        }

        if let Some(index) = self.nodes.iter().position(|n| n.id == id) {
            let node = self.nodes.remove(index);
            self.emit(GraphEvent::RemoveNode { node });
        }

        self.finish();
    }

    /// Look up a node by id.
    #[must_use]
    pub fn get_node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// All nodes, in insertion order.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Rename a node and every reference to it.
    ///
    /// No-op if `old_id` does not exist or `new_id` belongs to another node.
    pub fn rename_node(&mut self, old_id: &str, new_id: &str) {
        let Some(index) = self.nodes.iter().position(|n| n.id == old_id) else {
            tracing::debug!(node = %old_id, "rename_node: unknown node");
            return;
        };
        if old_id != new_id && self.get_node(new_id).is_some() {
            tracing::debug!(node = %new_id, "rename_node: target id already taken");
            return;
        }

        self.begin();

        self.nodes[index].id = new_id.to_string();

        for edge in &mut self.edges {
            if edge.from.node == old_id {
                edge.from.node = new_id.to_string();
            }
            if edge.to.node == old_id {
                edge.to.node = new_id.to_string();
            }
        }
        for initial in &mut self.initials {
            if initial.to.node == old_id {
                initial.to.node = new_id.to_string();
            }
        }
        for export in &mut self.exports {
            if export.process == old_id {
                export.process = new_id.to_string();
            }
        }
        for port in self.inports.values_mut().chain(self.outports.values_mut()) {
            if port.process == old_id {
                port.process = new_id.to_string();
            }
        }
        for group in &mut self.groups {
            if old_id != new_id && group.contains(new_id) {
                group.nodes.retain(|member| member != old_id);
                continue;
            }
            for member in &mut group.nodes {
                if member == old_id {
                    *member = new_id.to_string();
                }
            }
        }

        self.emit(GraphEvent::RenameNode {
            old: old_id.to_string(),
            new: new_id.to_string(),
        });

        self.finish();
    }

    /// Merge a metadata patch into a node.
    pub fn set_node_metadata(&mut self, id: &str, metadata: &Metadata) {
        let Some(index) = self.nodes.iter().position(|n| n.id == id) else {
            tracing::debug!(node = %id, "set_node_metadata: unknown node");
            return;
        };

        self.begin();
        let before = merge_metadata(&mut self.nodes[index].metadata, metadata);
        let node = self.nodes[index].clone();
        self.emit(GraphEvent::ChangeNode { node, before });
        self.finish();
    }
}

// =============================================================================
// TESTS
// =============================================================================
