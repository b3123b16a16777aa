//! # Initial Values
//!
//! An initial value (IIP) binds a literal to a node's input port in place of
//! an edge.

use crate::events::GraphEvent;
use crate::graph::Graph;
use crate::types::{Endpoint, Initial, InitialSource, Metadata};
use serde_json::Value;

impl Graph {
    /// Bind `data` to `node.port`.
    ///
    /// Returns `None` without emitting anything if the node is missing.
    pub fn add_initial(
        &mut self,
        data: Value,
        node: &str,
        port: &str,
        metadata: Metadata,
    ) -> Option<Initial> {
        self.add_initial_index(data, node, port, None, metadata)
    }

    /// Bind `data` to a specific index of `node.port`.
    pub fn add_initial_index(
        &mut self,
        data: Value,
        node: &str,
        port: &str,
        index: Option<u32>,
        metadata: Metadata,
    ) -> Option<Initial> {
        if self.get_node(node).is_none() {
            tracing::debug!(node = %node, port = %port, "add_initial: unknown node");
            return None;
        }

        self.begin();
        let initial = Initial {
            from: InitialSource { data },
            to: Endpoint::indexed(node, self.port_name(port), index),
            metadata,
        };
        self.initials.push(initial.clone());
        self.emit(GraphEvent::AddInitial {
            initial: initial.clone(),
        });
        self.finish();

        Some(initial)
    }

    /// Remove every initial value bound to `node.port`, any index.
    pub fn remove_initial(&mut self, node: &str, port: &str) {
        let port = self.port_name(port);
        if !self.initials.iter().any(|i| i.to.is(node, &port)) {
            tracing::debug!(node = %node, port = %port, "remove_initial: nothing bound");
            return;
        }

        self.begin();
        let (removed, kept): (Vec<Initial>, Vec<Initial>) = std::mem::take(&mut self.initials)
            .into_iter()
            .partition(|i| i.to.is(node, &port));
        self.initials = kept;
        for initial in removed {
            self.emit(GraphEvent::RemoveInitial { initial });
        }
        self.finish();
    }

    /// All initial values, in insertion order.
    #[must_use]
    pub fn initials(&self) -> &[Initial] {
        &self.initials
    }
}
