//! # Metadata Merging
//!
//! Every entity kind (node, edge, group, inport, outport) updates its
//! metadata with the same rule: a patch is merged key by key into the
//! existing mapping. A truthy patch value overwrites the key, a falsy one
//! (`null`, `false`, `0`, `""`, NaN) deletes it.

use crate::types::Metadata;
use serde_json::Value;

/// Returns true if a metadata value counts as set.
///
/// Arrays and objects are always truthy, even when empty.
#[must_use]
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => match n.as_f64() {
            Some(f) => f != 0.0 && !f.is_nan(),
            None => true,
        },
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Merge `patch` into `existing` and return the mapping as it was before.
pub fn merge_metadata(existing: &mut Metadata, patch: &Metadata) -> Metadata {
    let before = existing.clone();
    for (key, value) in patch {
        if is_truthy(value) {
            existing.insert(key.clone(), value.clone());
        } else {
            existing.remove(key);
        }
    }
    before
}

/// Build a patch that deletes every key of `existing` when merged.
#[must_use]
pub fn clearing_patch(existing: &Metadata) -> Metadata {
    existing
        .keys()
        .map(|key| (key.clone(), Value::Null))
        .collect()
}
