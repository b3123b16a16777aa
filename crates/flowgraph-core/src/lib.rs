//! # flowgraph-core
//!
//! The in-memory model of a directed, port-based flow graph - THE LOGIC.
//!
//! A `Graph` holds nodes (processing units), edges between node ports,
//! initial values bound to input ports, graph-level properties, exported
//! ports (inports, outports and legacy exports) and named groups of nodes.
//!
//! ## Mutation & Notification Engine
//!
//! Every structural change:
//! - runs inside a transaction (implicit unless the caller opened one),
//! - keeps references consistent (removing a node removes everything that
//!   points at it, renaming a node rewrites every reference),
//! - emits an ordered sequence of `GraphEvent`s to the graph's `Notifier`.
//!
//! Operations that reference something missing are silent no-ops. The only
//! errors are invalid transaction usage and group rename conflicts
//! (`GraphError`).
//!
//! ## Architectural Constraints
//!
//! - Single-threaded and synchronous: cascades execute inline
//! - No I/O, no async; serialization is left to consumers of `GraphSnapshot`
//! - No validation of component names, port types or cycles

// =============================================================================
// MODULES
// =============================================================================

pub mod edges;
pub mod events;
pub mod graph;
pub mod groups;
pub mod initials;
pub mod metadata;
pub mod ports;
pub mod primitives;
pub mod transaction;
pub mod types;

// =============================================================================
// RE-EXPORTS
// =============================================================================

pub use events::{EventKind, GraphEvent, Handler, Notifier, SubscriptionId};
pub use graph::{Graph, GraphOptions, GraphSnapshot};
pub use metadata::{is_truthy, merge_metadata};
pub use transaction::TransactionCursor;
pub use types::{
    Edge, Endpoint, Export, Group, GraphError, Initial, InitialSource, Metadata, Node, PublicPort,
};
