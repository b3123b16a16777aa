//! # Primitives
//!
//! Fixed constants shared by the graph model.

/// Transaction id used for transactions the graph opens on its own.
///
/// Any mutating call made while no transaction is open is wrapped in a
/// transaction with this id. Nested calls made by a cascade share it.
pub const IMPLICIT_TRANSACTION: &str = "implicit";

/// Name given to graphs created through `Graph::default()`.
pub const DEFAULT_GRAPH_NAME: &str = "Untitled";

/// Metadata keys given to a legacy export created without metadata.
///
/// Both default to `0`.
pub const DEFAULT_EXPORT_POSITION: [&str; 2] = ["x", "y"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constants_are_correct() {
        assert_eq!(IMPLICIT_TRANSACTION, "implicit");
        assert_eq!(DEFAULT_EXPORT_POSITION, ["x", "y"]);
    }
}
