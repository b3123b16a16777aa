//! # Groups
//!
//! Named, non-exclusive collections of node ids used for organizational
//! tagging. Group names are unique within a graph: `add_group` rejects a
//! name already in use and `rename_group` refuses to collide.

use crate::events::GraphEvent;
use crate::graph::Graph;
use crate::metadata::{clearing_patch, merge_metadata};
use crate::types::{Group, GraphError, Metadata};

impl Graph {
    /// Add a group.
    ///
    /// Repeated node ids are kept once, in first-seen order. Returns `None`
    /// without emitting anything if the name is taken.
    pub fn add_group(
        &mut self,
        name: impl Into<String>,
        nodes: Vec<String>,
        metadata: Metadata,
    ) -> Option<Group> {
        let name = name.into();
        if self.group(&name).is_some() {
            tracing::debug!(group = %name, "add_group: duplicate name rejected");
            return None;
        }

        let mut members: Vec<String> = Vec::with_capacity(nodes.len());
        for node in nodes {
            if !members.contains(&node) {
                members.push(node);
            }
        }

        self.begin();
        let group = Group {
            name,
            nodes: members,
            metadata,
        };
        self.groups.push(group.clone());
        self.emit(GraphEvent::AddGroup {
            group: group.clone(),
        });
        self.finish();

        Some(group)
    }

    /// Rename a group.
    ///
    /// Fails if `old_name` does not exist or `new_name` belongs to another
    /// group.
    pub fn rename_group(&mut self, old_name: &str, new_name: &str) -> Result<(), GraphError> {
        let Some(index) = self.group_index(old_name) else {
            return Err(GraphError::GroupNotFound(old_name.to_string()));
        };
        if old_name != new_name && self.group(new_name).is_some() {
            return Err(GraphError::GroupExists(new_name.to_string()));
        }

        self.begin();
        self.groups[index].name = new_name.to_string();
        self.emit(GraphEvent::RenameGroup {
            old: old_name.to_string(),
            new: new_name.to_string(),
        });
        self.finish();

        Ok(())
    }

    /// Remove a group, clearing its metadata first.
    pub fn remove_group(&mut self, name: &str) {
        let Some(index) = self.group_index(name) else {
            tracing::debug!(group = %name, "remove_group: unknown group");
            return;
        };

        self.begin();
        let patch = clearing_patch(&self.groups[index].metadata);
        self.merge_group_metadata(index, &patch);
        let group = self.groups.remove(index);
        self.emit(GraphEvent::RemoveGroup { group });
        self.finish();
    }

    /// Merge a metadata patch into a group.
    pub fn set_group_metadata(&mut self, name: &str, metadata: &Metadata) {
        let Some(index) = self.group_index(name) else {
            tracing::debug!(group = %name, "set_group_metadata: unknown group");
            return;
        };
        self.merge_group_metadata(index, metadata);
    }

    /// Look up a group by name.
    #[must_use]
    pub fn group(&self, name: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.name == name)
    }

    /// All groups, in insertion order.
    #[must_use]
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    fn group_index(&self, name: &str) -> Option<usize> {
        self.groups.iter().position(|g| g.name == name)
    }

    fn merge_group_metadata(&mut self, index: usize, metadata: &Metadata) {
        self.begin();
        let before = merge_metadata(&mut self.groups[index].metadata, metadata);
        let group = self.groups[index].clone();
        self.emit(GraphEvent::ChangeGroup { group, before });
        self.finish();
    }
}

#[cfg(test)]
mod tests {
    use crate::events::GraphEvent;
    use crate::graph::Graph;
    use crate::types::{GraphError, Metadata};
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn ids(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn duplicate_group_rejected() {
        let mut graph = Graph::default();
        assert!(graph.add_group("g", ids(&["A"]), Metadata::new()).is_some());
        assert!(graph.add_group("g", ids(&["B"]), Metadata::new()).is_none());

        assert_eq!(graph.groups().len(), 1);
        assert_eq!(graph.group("g").map(|g| g.nodes.clone()), Some(ids(&["A"])));
    }

    #[test]
    fn repeated_members_kept_once() {
        let mut graph = Graph::default();
        let group = graph
            .add_group("g", ids(&["A", "B", "A", "C", "B"]), Metadata::new())
            .expect("add");

        assert_eq!(group.nodes, ids(&["A", "B", "C"]));
        assert_eq!(graph.group("g").map(|g| g.nodes.clone()), Some(ids(&["A", "B", "C"])));
    }

    #[test]
    fn rename_missing_group_fails() {
        let mut graph = Graph::default();
        assert_eq!(
            graph.rename_group("nope", "other"),
            Err(GraphError::GroupNotFound("nope".to_string()))
        );
        assert!(!graph.is_in_transaction());
    }

    #[test]
    fn rename_onto_existing_group_fails() {
        let mut graph = Graph::default();
        graph.add_group("a", Vec::new(), Metadata::new());
        graph.add_group("b", Vec::new(), Metadata::new());

        assert_eq!(
            graph.rename_group("a", "b"),
            Err(GraphError::GroupExists("b".to_string()))
        );
    }

    #[test]
    fn rename_group_emits_event() {
        let mut graph = Graph::default();
        graph.add_group("a", Vec::new(), Metadata::new());
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        graph.subscribe_all(move |e| sink.borrow_mut().push(e.clone()));

        graph.rename_group("a", "renamed").expect("rename");

        assert!(graph.group("renamed").is_some());
        assert!(matches!(
            &log.borrow()[1],
            GraphEvent::RenameGroup { old, new } if old == "a" && new == "renamed"
        ));
    }

    #[test]
    fn remove_group_clears_metadata_then_removes() {
        let mut graph = Graph::default();
        let metadata: Metadata = serde_json::from_value(json!({"color": "blue"})).expect("meta");
        graph.add_group("g", Vec::new(), metadata);
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        graph.subscribe_all(move |e| sink.borrow_mut().push(e.kind().as_str()));

        graph.remove_group("g");
        graph.remove_group("g");

        assert!(graph.groups().is_empty());
        assert_eq!(
            *log.borrow(),
            vec!["startTransaction", "changeGroup", "removeGroup", "endTransaction"]
        );
    }

    #[test]
    fn group_metadata_merge() {
        let mut graph = Graph::default();
        graph.add_group("g", Vec::new(), Metadata::new());

        let patch: Metadata =
            serde_json::from_value(json!({"description": "io", "color": 0})).expect("meta");
        graph.set_group_metadata("g", &patch);

        let group = graph.group("g").expect("group");
        assert_eq!(group.metadata.len(), 1);
        assert_eq!(group.metadata["description"], json!("io"));
    }
}
