//! # Change Notifications
//!
//! The graph reports every structural change as a `GraphEvent`. Consumers
//! (renderers, persistence layers, live runners) register handlers on a
//! `Notifier`, either for one `EventKind` or for everything.
//!
//! Handlers run synchronously, inline with the mutation that triggered them,
//! in registration order.

use crate::types::{Edge, Export, Group, Initial, Metadata, Node, PublicPort};
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// EVENTS
// =============================================================================

/// A change notification with owned snapshots of the affected records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum GraphEvent {
    StartTransaction { id: String, metadata: Metadata },
    EndTransaction { id: String, metadata: Metadata },
    ChangeProperties { properties: Metadata, before: Metadata },
    AddExport { export: Export },
    RemoveExport { export: Export },
    AddInport { public: String, port: PublicPort },
    RemoveInport { public: String, port: PublicPort },
    RenameInport { old: String, new: String },
    ChangeInport { public: String, port: PublicPort, before: Metadata },
    AddOutport { public: String, port: PublicPort },
    RemoveOutport { public: String, port: PublicPort },
    RenameOutport { old: String, new: String },
    ChangeOutport { public: String, port: PublicPort, before: Metadata },
    AddGroup { group: Group },
    RemoveGroup { group: Group },
    RenameGroup { old: String, new: String },
    ChangeGroup { group: Group, before: Metadata },
    AddNode { node: Node },
    RemoveNode { node: Node },
    RenameNode { old: String, new: String },
    ChangeNode { node: Node, before: Metadata },
    AddEdge { edge: Edge },
    RemoveEdge { edge: Edge },
    ChangeEdge { edge: Edge, before: Metadata },
    AddInitial { initial: Initial },
    RemoveInitial { initial: Initial },
}

/// The name of a notification, used as the subscription key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    StartTransaction,
    EndTransaction,
    ChangeProperties,
    AddExport,
    RemoveExport,
    AddInport,
    RemoveInport,
    RenameInport,
    ChangeInport,
    AddOutport,
    RemoveOutport,
    RenameOutport,
    ChangeOutport,
    AddGroup,
    RemoveGroup,
    RenameGroup,
    ChangeGroup,
    AddNode,
    RemoveNode,
    RenameNode,
    ChangeNode,
    AddEdge,
    RemoveEdge,
    ChangeEdge,
    AddInitial,
    RemoveInitial,
}

impl EventKind {
    /// The notification name as consumers know it.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::StartTransaction => "startTransaction",
            Self::EndTransaction => "endTransaction",
            Self::ChangeProperties => "changeProperties",
            Self::AddExport => "addExport",
            Self::RemoveExport => "removeExport",
            Self::AddInport => "addInport",
            Self::RemoveInport => "removeInport",
            Self::RenameInport => "renameInport",
            Self::ChangeInport => "changeInport",
            Self::AddOutport => "addOutport",
            Self::RemoveOutport => "removeOutport",
            Self::RenameOutport => "renameOutport",
            Self::ChangeOutport => "changeOutport",
            Self::AddGroup => "addGroup",
            Self::RemoveGroup => "removeGroup",
            Self::RenameGroup => "renameGroup",
            Self::ChangeGroup => "changeGroup",
            Self::AddNode => "addNode",
            Self::RemoveNode => "removeNode",
            Self::RenameNode => "renameNode",
            Self::ChangeNode => "changeNode",
            Self::AddEdge => "addEdge",
            Self::RemoveEdge => "removeEdge",
            Self::ChangeEdge => "changeEdge",
            Self::AddInitial => "addInitial",
            Self::RemoveInitial => "removeInitial",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl GraphEvent {
    /// The kind of this event.
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Self::StartTransaction { .. } => EventKind::StartTransaction,
            Self::EndTransaction { .. } => EventKind::EndTransaction,
            Self::ChangeProperties { .. } => EventKind::ChangeProperties,
            Self::AddExport { .. } => EventKind::AddExport,
            Self::RemoveExport { .. } => EventKind::RemoveExport,
            Self::AddInport { .. } => EventKind::AddInport,
            Self::RemoveInport { .. } => EventKind::RemoveInport,
            Self::RenameInport { .. } => EventKind::RenameInport,
            Self::ChangeInport { .. } => EventKind::ChangeInport,
            Self::AddOutport { .. } => EventKind::AddOutport,
            Self::RemoveOutport { .. } => EventKind::RemoveOutport,
            Self::RenameOutport { .. } => EventKind::RenameOutport,
            Self::ChangeOutport { .. } => EventKind::ChangeOutport,
            Self::AddGroup { .. } => EventKind::AddGroup,
            Self::RemoveGroup { .. } => EventKind::RemoveGroup,
            Self::RenameGroup { .. } => EventKind::RenameGroup,
            Self::ChangeGroup { .. } => EventKind::ChangeGroup,
            Self::AddNode { .. } => EventKind::AddNode,
            Self::RemoveNode { .. } => EventKind::RemoveNode,
            Self::RenameNode { .. } => EventKind::RenameNode,
            Self::ChangeNode { .. } => EventKind::ChangeNode,
            Self::AddEdge { .. } => EventKind::AddEdge,
            Self::RemoveEdge { .. } => EventKind::RemoveEdge,
            Self::ChangeEdge { .. } => EventKind::ChangeEdge,
            Self::AddInitial { .. } => EventKind::AddInitial,
            Self::RemoveInitial { .. } => EventKind::RemoveInitial,
        }
    }
}

// =============================================================================
// NOTIFIER
// =============================================================================

/// Callback invoked for each matching event.
pub type Handler = Box<dyn FnMut(&GraphEvent)>;

/// Handle returned by `subscribe`, used to unsubscribe later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

struct Subscription {
    id: SubscriptionId,
    /// `None` receives every event.
    kind: Option<EventKind>,
    handler: Handler,
}

/// Publish/subscribe registry for graph events.
#[derive(Default)]
pub struct Notifier {
    subscriptions: Vec<Subscription>,
    next_id: u64,
}

impl fmt::Debug for Notifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifier")
            .field("subscriber_count", &self.subscriptions.len())
            .finish()
    }
}

impl Notifier {
    /// Create a notifier with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for one kind of event.
    pub fn subscribe(
        &mut self,
        kind: EventKind,
        handler: impl FnMut(&GraphEvent) + 'static,
    ) -> SubscriptionId {
        self.register(Some(kind), Box::new(handler))
    }

    /// Register a handler for every event.
    pub fn subscribe_all(&mut self, handler: impl FnMut(&GraphEvent) + 'static) -> SubscriptionId {
        self.register(None, Box::new(handler))
    }

    /// Remove a handler. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| s.id != id);
        self.subscriptions.len() != before
    }

    /// Number of registered handlers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// Invoke every handler registered for this event, in registration order.
    pub fn emit(&mut self, event: &GraphEvent) {
        let kind = event.kind();
        tracing::trace!(event = kind.as_str(), "emit");
        for subscription in &mut self.subscriptions {
            if subscription.kind.is_none_or(|k| k == kind) {
                (subscription.handler)(event);
            }
        }
    }

    fn register(&mut self, kind: Option<EventKind>, handler: Handler) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        self.subscriptions.push(Subscription { id, kind, handler });
        id
    }
}

// =============================================================================
// TESTS
// =============================================================================
