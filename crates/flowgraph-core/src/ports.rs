//! # Exported Ports
//!
//! Graph-level public ports expose an internal node's port as part of the
//! graph's own interface, so the graph can be used as a subgraph.
//!
//! Inports and outports are keyed by their (case-folded) public name. The
//! legacy `Export` list is direction-agnostic and kept for older consumers.

use crate::events::GraphEvent;
use crate::graph::Graph;
use crate::metadata::{clearing_patch, merge_metadata};
use crate::primitives::DEFAULT_EXPORT_POSITION;
use crate::types::{Export, Metadata, PublicPort};
use std::collections::BTreeMap;

/// Which side of the graph interface a public port is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    In,
    Out,
}

impl Direction {
    fn added(self, public: String, port: PublicPort) -> GraphEvent {
        match self {
            Self::In => GraphEvent::AddInport { public, port },
            Self::Out => GraphEvent::AddOutport { public, port },
        }
    }

    fn removed(self, public: String, port: PublicPort) -> GraphEvent {
        match self {
            Self::In => GraphEvent::RemoveInport { public, port },
            Self::Out => GraphEvent::RemoveOutport { public, port },
        }
    }

    fn renamed(self, old: String, new: String) -> GraphEvent {
        match self {
            Self::In => GraphEvent::RenameInport { old, new },
            Self::Out => GraphEvent::RenameOutport { old, new },
        }
    }

    fn changed(self, public: String, port: PublicPort, before: Metadata) -> GraphEvent {
        match self {
            Self::In => GraphEvent::ChangeInport {
                public,
                port,
                before,
            },
            Self::Out => GraphEvent::ChangeOutport {
                public,
                port,
                before,
            },
        }
    }
}

impl Graph {
    // =========================================================================
    // INPORTS
    // =========================================================================

    /// Expose `node.port` as the graph inport `public`.
    ///
    /// An existing inport with the same name is replaced.
    pub fn add_inport(
        &mut self,
        public: &str,
        node: &str,
        port: &str,
        metadata: Metadata,
    ) -> Option<PublicPort> {
        self.add_public_port(Direction::In, public, node, port, metadata)
    }

    /// Remove an inport, clearing its metadata first.
    pub fn remove_inport(&mut self, public: &str) {
        self.remove_public_port(Direction::In, public);
    }

    /// Move an inport to a new public name, replacing any inport there.
    pub fn rename_inport(&mut self, old: &str, new: &str) {
        self.rename_public_port(Direction::In, old, new);
    }

    /// Merge a metadata patch into an inport.
    pub fn set_inport_metadata(&mut self, public: &str, metadata: &Metadata) {
        self.set_public_port_metadata(Direction::In, public, metadata);
    }

    /// Look up an inport by public name.
    #[must_use]
    pub fn inport(&self, public: &str) -> Option<&PublicPort> {
        self.inports.get(&self.port_name(public))
    }

    /// All inports, keyed by public name.
    #[must_use]
    pub fn inports(&self) -> &BTreeMap<String, PublicPort> {
        &self.inports
    }

    // =========================================================================
    // OUTPORTS
    // =========================================================================

    /// Expose `node.port` as the graph outport `public`.
    ///
    /// An existing outport with the same name is replaced.
    pub fn add_outport(
        &mut self,
        public: &str,
        node: &str,
        port: &str,
        metadata: Metadata,
    ) -> Option<PublicPort> {
        self.add_public_port(Direction::Out, public, node, port, metadata)
    }

    /// Remove an outport, clearing its metadata first.
    pub fn remove_outport(&mut self, public: &str) {
        self.remove_public_port(Direction::Out, public);
    }

    /// Move an outport to a new public name, replacing any outport there.
    pub fn rename_outport(&mut self, old: &str, new: &str) {
        self.rename_public_port(Direction::Out, old, new);
    }

    /// Merge a metadata patch into an outport.
    pub fn set_outport_metadata(&mut self, public: &str, metadata: &Metadata) {
        self.set_public_port_metadata(Direction::Out, public, metadata);
    }

    /// Look up an outport by public name.
    #[must_use]
    pub fn outport(&self, public: &str) -> Option<&PublicPort> {
        self.outports.get(&self.port_name(public))
    }

    /// All outports, keyed by public name.
    #[must_use]
    pub fn outports(&self) -> &BTreeMap<String, PublicPort> {
        &self.outports
    }

    // =========================================================================
    // LEGACY EXPORTS
    // =========================================================================

    /// Export `node.port` under `public` without a direction.
    ///
    /// Without metadata the export is placed at `{x: 0, y: 0}`.
    pub fn add_export(
        &mut self,
        public: &str,
        node: &str,
        port: &str,
        metadata: Option<Metadata>,
    ) -> Option<Export> {
        if self.get_node(node).is_none() {
            tracing::debug!(public = %public, node = %node, "add_export: unknown node");
            return None;
        }

        self.begin();
        let metadata = metadata.unwrap_or_else(|| {
            DEFAULT_EXPORT_POSITION
                .iter()
                .map(|key| (key.to_string(), serde_json::Value::from(0)))
                .collect()
        });
        let export = Export {
            public: self.port_name(public),
            process: node.to_string(),
            port: self.port_name(port),
            metadata,
        };
        self.exports.push(export.clone());
        self.emit(GraphEvent::AddExport {
            export: export.clone(),
        });
        self.finish();

        Some(export)
    }

    /// Remove the first export named `public`.
    pub fn remove_export(&mut self, public: &str) {
        let public = self.port_name(public);
        let Some(index) = self.exports.iter().position(|e| e.public == public) else {
            tracing::debug!(public = %public, "remove_export: unknown export");
            return;
        };
        self.remove_export_at(index);
    }

    /// All legacy exports, in insertion order.
    #[must_use]
    pub fn exports(&self) -> &[Export] {
        &self.exports
    }

    /// Remove every export that points at `node`.
    pub(crate) fn remove_exports_of(&mut self, node: &str) {
        while let Some(index) = self.exports.iter().position(|e| e.process == node) {
            self.remove_export_at(index);
        }
    }

    fn remove_export_at(&mut self, index: usize) {
        self.begin();
        let export = self.exports.remove(index);
        self.emit(GraphEvent::RemoveExport { export });
        self.finish();
    }

    // =========================================================================
    // SHARED INPORT/OUTPORT LOGIC
    // =========================================================================

    fn public_ports(&self, direction: Direction) -> &BTreeMap<String, PublicPort> {
        match direction {
            Direction::In => &self.inports,
            Direction::Out => &self.outports,
        }
    }

    fn public_ports_mut(&mut self, direction: Direction) -> &mut BTreeMap<String, PublicPort> {
        match direction {
            Direction::In => &mut self.inports,
            Direction::Out => &mut self.outports,
        }
    }

    fn add_public_port(
        &mut self,
        direction: Direction,
        public: &str,
        node: &str,
        port: &str,
        metadata: Metadata,
    ) -> Option<PublicPort> {
        if self.get_node(node).is_none() {
            tracing::debug!(public = %public, node = %node, ?direction, "add port: unknown node");
            return None;
        }

        let public = self.port_name(public);
        let entry = PublicPort {
            process: node.to_string(),
            port: self.port_name(port),
            metadata,
        };

        self.begin();
        self.public_ports_mut(direction)
            .insert(public.clone(), entry.clone());
        self.emit(direction.added(public, entry.clone()));
        self.finish();

        Some(entry)
    }

    fn remove_public_port(&mut self, direction: Direction, public: &str) {
        let public = self.port_name(public);
        if !self.public_ports(direction).contains_key(&public) {
            tracing::debug!(public = %public, ?direction, "remove port: unknown port");
            return;
        }

        self.begin();
        let patch = self
            .public_ports(direction)
            .get(&public)
            .map(|p| clearing_patch(&p.metadata))
            .unwrap_or_default();
        self.set_public_port_metadata(direction, &public, &patch);
        if let Some(port) = self.public_ports_mut(direction).remove(&public) {
            self.emit(direction.removed(public, port));
        }
        self.finish();
    }

    fn rename_public_port(&mut self, direction: Direction, old: &str, new: &str) {
        let old = self.port_name(old);
        let new = self.port_name(new);
        if !self.public_ports(direction).contains_key(&old) {
            tracing::debug!(public = %old, ?direction, "rename port: unknown port");
            return;
        }

        self.begin();
        let ports = self.public_ports_mut(direction);
        if let Some(port) = ports.remove(&old) {
            ports.insert(new.clone(), port);
        }
        self.emit(direction.renamed(old, new));
        self.finish();
    }

    fn set_public_port_metadata(&mut self, direction: Direction, public: &str, metadata: &Metadata) {
        let public = self.port_name(public);
        if !self.public_ports(direction).contains_key(&public) {
            tracing::debug!(public = %public, ?direction, "set port metadata: unknown port");
            return;
        }

        self.begin();
        if let Some(port) = self.public_ports_mut(direction).get_mut(&public) {
            let before = merge_metadata(&mut port.metadata, metadata);
            let port = port.clone();
            self.emit(direction.changed(public, port, before));
        }
        self.finish();
    }
}

#[cfg(test)]
mod tests {
    use crate::events::GraphEvent;
    use crate::graph::{Graph, GraphOptions};
    use crate::types::Metadata;
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn meta(value: serde_json::Value) -> Metadata {
        serde_json::from_value(value).expect("metadata object")
    }

    fn graph_with_node() -> Graph {
        let mut graph = Graph::default();
        graph.add_node("A", "x", Metadata::new());
        graph
    }

    fn record(graph: &mut Graph) -> Rc<RefCell<Vec<GraphEvent>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        graph.subscribe_all(move |e| sink.borrow_mut().push(e.clone()));
        log
    }

    #[test]
    fn inport_name_is_case_folded() {
        let mut graph = graph_with_node();
        graph.add_inport("Foo", "A", "IN", Metadata::new());
        graph.set_inport_metadata("foo", &meta(json!({"x": 4})));

        let port = graph.inport("FOO").expect("inport");
        assert_eq!(port.port, "in");
        assert_eq!(port.metadata, meta(json!({"x": 4})));
        assert_eq!(graph.inports().len(), 1);
    }

    #[test]
    fn case_sensitive_inports_stay_distinct() {
        let mut graph = Graph::new("g", GraphOptions { case_sensitive: true });
        graph.add_node("A", "x", Metadata::new());
        graph.add_inport("Foo", "A", "in", Metadata::new());
        graph.add_inport("foo", "A", "in", Metadata::new());

        assert_eq!(graph.inports().len(), 2);
    }

    #[test]
    fn inport_for_unknown_node_is_noop() {
        let mut graph = Graph::default();
        assert!(graph.add_inport("in", "missing", "in", Metadata::new()).is_none());
        assert!(graph.inports().is_empty());
    }

    #[test]
    fn remove_inport_clears_metadata_then_removes() {
        let mut graph = graph_with_node();
        graph.add_inport("in", "A", "in", meta(json!({"x": 1})));
        let log = record(&mut graph);

        graph.remove_inport("in");

        let kinds: Vec<_> = log.borrow().iter().map(|e| e.kind().as_str()).collect();
        assert_eq!(
            kinds,
            vec!["startTransaction", "changeInport", "removeInport", "endTransaction"]
        );
        assert!(graph.inport("in").is_none());
    }

    #[test]
    fn rename_outport_overwrites_target() {
        let mut graph = graph_with_node();
        graph.add_node("B", "x", Metadata::new());
        graph.add_outport("result", "A", "out", Metadata::new());
        graph.add_outport("error", "B", "err", Metadata::new());
        let log = record(&mut graph);

        graph.rename_outport("result", "error");

        assert_eq!(graph.outports().len(), 1);
        assert_eq!(graph.outport("error").map(|p| p.process.as_str()), Some("A"));
        assert!(matches!(
            &log.borrow()[1],
            GraphEvent::RenameOutport { old, new } if old == "result" && new == "error"
        ));
    }

    #[test]
    fn rename_missing_outport_is_noop() {
        let mut graph = graph_with_node();
        let log = record(&mut graph);
        graph.rename_outport("nothing", "else");
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn outport_metadata_change_reports_before() {
        let mut graph = graph_with_node();
        graph.add_outport("out", "A", "out", meta(json!({"x": 1})));
        let log = record(&mut graph);

        graph.set_outport_metadata("out", &meta(json!({"x": 2})));

        assert!(matches!(
            &log.borrow()[1],
            GraphEvent::ChangeOutport { public, before, .. }
                if public == "out" && before == &meta(json!({"x": 1}))
        ));
    }

    #[test]
    fn export_defaults_position() {
        let mut graph = graph_with_node();
        let export = graph.add_export("Value", "A", "In", None).expect("export");

        assert_eq!(export.public, "value");
        assert_eq!(export.port, "in");
        assert_eq!(export.metadata, meta(json!({"x": 0, "y": 0})));
    }

    #[test]
    fn remove_export_by_public_name() {
        let mut graph = graph_with_node();
        graph.add_export("value", "A", "in", Some(Metadata::new()));
        let log = record(&mut graph);

        graph.remove_export("VALUE");
        graph.remove_export("value");

        assert!(graph.exports().is_empty());
        let kinds: Vec<_> = log.borrow().iter().map(|e| e.kind().as_str()).collect();
        assert_eq!(kinds, vec!["startTransaction", "removeExport", "endTransaction"]);
    }
}
