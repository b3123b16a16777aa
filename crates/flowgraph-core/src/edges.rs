//! # Edge Operations
//!
//! Edges connect an output port of one node to an input port of another.
//! An edge is identified by both endpoints including their indexes, so the
//! same pair of ports may be connected several times through different
//! indexes of a fan-in/fan-out port.

use crate::events::GraphEvent;
use crate::graph::Graph;
use crate::metadata::{clearing_patch, merge_metadata};
use crate::types::{Edge, Endpoint, Metadata};

impl Graph {
    /// Connect `out_node.out_port` to `in_node.in_port`.
    ///
    /// Returns `None` without emitting anything if either node is missing or
    /// an identical edge already exists.
    pub fn add_edge(
        &mut self,
        out_node: &str,
        out_port: &str,
        in_node: &str,
        in_port: &str,
        metadata: Metadata,
    ) -> Option<Edge> {
        self.add_edge_index(out_node, out_port, None, in_node, in_port, None, metadata)
    }

    /// Connect two ports, addressing specific indexes of either side.
    pub fn add_edge_index(
        &mut self,
        out_node: &str,
        out_port: &str,
        out_index: Option<u32>,
        in_node: &str,
        in_port: &str,
        in_index: Option<u32>,
        metadata: Metadata,
    ) -> Option<Edge> {
        let from = Endpoint::indexed(out_node, self.port_name(out_port), out_index);
        let to = Endpoint::indexed(in_node, self.port_name(in_port), in_index);

        if self.edges.iter().any(|e| e.has_key(&from, &to)) {
            tracing::debug!(from = ?from, to = ?to, "add_edge: duplicate edge rejected");
            return None;
        }
        if self.get_node(out_node).is_none() || self.get_node(in_node).is_none() {
            tracing::debug!(from = ?from, to = ?to, "add_edge: unknown node");
            return None;
        }

        self.begin();
        let edge = Edge { from, to, metadata };
        self.edges.push(edge.clone());
        self.emit(GraphEvent::AddEdge { edge: edge.clone() });
        self.finish();

        Some(edge)
    }

    /// Remove edges.
    ///
    /// With a `target`, removes the edges from `node.port` to
    /// `target.0.target.1` (any index). Without one, removes every edge that
    /// touches `node.port` on either side. Each edge has its metadata cleared
    /// (`changeEdge`) before the `removeEdge` notifications fire.
    pub fn remove_edge(&mut self, node: &str, port: &str, target: Option<(&str, &str)>) {
        let port = self.port_name(port);
        let target = target.map(|(n, p)| (n.to_string(), self.port_name(p)));
        let selected = |edge: &Edge| match &target {
            Some((node2, port2)) => edge.from.is(node, &port) && edge.to.is(node2, port2),
            None => edge.involves_port(node, &port),
        };

        let indices: Vec<usize> = self
            .edges
            .iter()
            .enumerate()
            .filter(|(_, e)| selected(e))
            .map(|(i, _)| i)
            .collect();
        if indices.is_empty() {
            tracing::debug!(node = %node, port = %port, "remove_edge: no matching edge");
            return;
        }

        self.begin();

        for index in indices {
            let patch = clearing_patch(&self.edges[index].metadata);
            self.merge_edge_metadata(index, &patch);
        }

        let (removed, kept): (Vec<Edge>, Vec<Edge>) =
            std::mem::take(&mut self.edges).into_iter().partition(&selected);
        self.edges = kept;
        for edge in removed {
            self.emit(GraphEvent::RemoveEdge { edge });
        }

        self.finish();
    }

    /// Look up the first edge from `node.port` to `node2.port2`, any index.
    #[must_use]
    pub fn get_edge(&self, node: &str, port: &str, node2: &str, port2: &str) -> Option<&Edge> {
        self.find_edge(node, port, node2, port2)
            .map(|index| &self.edges[index])
    }

    /// Merge a metadata patch into the edge `get_edge` would return.
    pub fn set_edge_metadata(
        &mut self,
        node: &str,
        port: &str,
        node2: &str,
        port2: &str,
        metadata: &Metadata,
    ) {
        let Some(index) = self.find_edge(node, port, node2, port2) else {
            tracing::debug!(node = %node, port = %port, "set_edge_metadata: unknown edge");
            return;
        };
        self.merge_edge_metadata(index, metadata);
    }

    /// All edges, in insertion order.
    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    fn find_edge(&self, node: &str, port: &str, node2: &str, port2: &str) -> Option<usize> {
        let port = self.port_name(port);
        let port2 = self.port_name(port2);
        self.edges
            .iter()
            .position(|e| e.from.is(node, &port) && e.to.is(node2, &port2))
    }

    fn merge_edge_metadata(&mut self, index: usize, metadata: &Metadata) {
        self.begin();
        let before = merge_metadata(&mut self.edges[index].metadata, metadata);
        let edge = self.edges[index].clone();
        self.emit(GraphEvent::ChangeEdge { edge, before });
        self.finish();
    }
}
