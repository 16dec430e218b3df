//! Node identity.
//!
//! The form editor addresses model nodes by their QML `id:`. Scene items,
//! indicator controllers, snap lines and anchor targets all key on
//! [`NodeId`], so it has to be `Copy` and cheap to hash. Ids are interned
//! once and never freed; a removed node's id simply stops being valid in
//! the model (see `DesignModel::is_valid`).

use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;
use std::sync::atomic::{AtomicU64, Ordering};

static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// Suffix source for ids of nodes created by the editor (drops, item
/// creator) that have no QML id yet.
static GENERATED: AtomicU64 = AtomicU64::new(0);

/// Identifier of a node in the QML model.
///
/// Interned, so copying and comparing is O(1). The string form is the QML
/// `id:` of the node, or a generated name for anonymous nodes.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(Spur);

impl NodeId {
    /// The id for a QML `id:` string. Equal strings give equal ids.
    pub fn intern(s: &str) -> Self {
        NodeId(INTERNER.get_or_intern(s))
    }

    pub fn as_str(&self) -> &str {
        INTERNER.resolve(&self.0)
    }

    /// A fresh id for a node of `type_name` (module prefix dropped,
    /// lower-cased), e.g. `QtQuick.Rectangle` → `rectangle_3`.
    pub fn for_type(type_name: &str) -> Self {
        let n = GENERATED.fetch_add(1, Ordering::Relaxed);
        let base = type_name
            .rsplit('.')
            .next()
            .unwrap_or(type_name)
            .to_ascii_lowercase();
        Self::intern(&format!("{base}_{n}"))
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.as_str())
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for NodeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for NodeId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(NodeId::intern(&s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_string_interns_to_same_id() {
        let a = NodeId::intern("loginButton");
        let b = NodeId::intern("loginButton");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "loginButton");
    }

    #[test]
    fn generated_ids_use_short_type_name() {
        let a = NodeId::for_type("QtQuick.Rectangle");
        let b = NodeId::for_type("QtQuick.Rectangle");
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("rectangle_"));
    }
}
