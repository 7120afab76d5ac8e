//! engine::hierarchy
//!
//! Argument hierarchy reconstruction.
//!
//! # Shape
//!
//! The hierarchy seen by a command holds its own values flat, and the
//! hierarchy of its parent nested under the parent's name:
//!
//! ```text
//! app ticket create --key T-1
//!
//! create sees: { key: "T-1", ticket: { filter: "default", app: { verbose: false } } }
//! ticket sees: { filter: "default", app: { verbose: false } }
//! app sees:    { verbose: false }
//! ```
//!
//! Nesting depth equals the command's depth in the chain. Commands that are
//! not ancestors of the current one never appear.
//!
//! # Algorithm
//!
//! [`reconstruct`] walks the chain from the current context up to the root.
//! The current context contributes its own values. An ancestor that
//! declares the current command as a child is instantiated from its own
//! values (to check they still satisfy its contract) and its own hierarchy
//! is reconstructed and nested under its name. The result is a pure
//! function of the chain.

use serde::ser::{Serialize, SerializeMap, Serializer};
use thiserror::Error;

use super::compile::CompiledTree;
use super::context::InvocationChain;
use crate::schema::{FieldValue, FieldValues, ValidationError};

/// Errors from hierarchy reconstruction.
///
/// These indicate an inconsistency between the chain and the compiled tree,
/// which definition checks should have made impossible.
#[derive(Debug, Error)]
pub enum HierarchyReconstructionError {
    #[error("no invocation context at index {index} (chain: {chain})")]
    MissingContext { index: usize, chain: String },

    #[error("invocation context {index} refers to an unknown command (chain: {chain})")]
    UnknownCommand { index: usize, chain: String },

    #[error("command '{child}' is not a child of '{parent}' (chain: {chain})")]
    Inconsistent {
        parent: String,
        child: String,
        chain: String,
    },

    #[error("cannot instantiate ancestor '{ancestor}' (chain: {chain}): {source}")]
    Ancestor {
        ancestor: String,
        chain: String,
        #[source]
        source: ValidationError,
    },
}

/// Nested view of the values along the invoked path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArgumentHierarchy {
    values: FieldValues,
    parent: Option<(String, Box<ArgumentHierarchy>)>,
}

impl ArgumentHierarchy {
    /// Build a hierarchy from explicit parts.
    pub fn new(values: FieldValues) -> Self {
        Self {
            values,
            parent: None,
        }
    }

    /// Attach the parent's hierarchy under `name`.
    pub fn with_parent(mut self, name: impl Into<String>, parent: ArgumentHierarchy) -> Self {
        self.parent = Some((name.into(), Box::new(parent)));
        self
    }

    /// This command's own values.
    pub fn values(&self) -> &FieldValues {
        &self.values
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.values.get(field)
    }

    pub fn bool(&self, field: &str) -> Option<bool> {
        self.get(field).and_then(FieldValue::as_bool)
    }

    pub fn int(&self, field: &str) -> Option<i64> {
        self.get(field).and_then(FieldValue::as_int)
    }

    pub fn float(&self, field: &str) -> Option<f64> {
        self.get(field).and_then(FieldValue::as_float)
    }

    pub fn str(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(FieldValue::as_str)
    }

    /// The parent's hierarchy, if it is named `name`.
    pub fn ancestor(&self, name: &str) -> Option<&ArgumentHierarchy> {
        match &self.parent {
            Some((parent, hierarchy)) if parent == name => Some(hierarchy),
            _ => None,
        }
    }

    /// Follow a path of ancestor names, nearest first.
    ///
    /// `lookup(&["ticket", "app"])` from `create` yields `app`'s hierarchy.
    pub fn lookup(&self, path: &[&str]) -> Option<&ArgumentHierarchy> {
        path.iter()
            .try_fold(self, |hierarchy, name| hierarchy.ancestor(name))
    }

    /// Name of the parent command, if any.
    pub fn parent_name(&self) -> Option<&str> {
        self.parent.as_ref().map(|(name, _)| name.as_str())
    }

    /// Ancestors from nearest to root, with their names.
    pub fn ancestors(&self) -> impl Iterator<Item = (&str, &ArgumentHierarchy)> {
        let mut next = self.parent.as_ref();
        std::iter::from_fn(move || {
            let (name, hierarchy) = next?;
            next = hierarchy.parent.as_ref();
            Some((name.as_str(), hierarchy.as_ref()))
        })
    }

    /// Number of nesting levels below this one.
    pub fn depth(&self) -> usize {
        self.ancestors().count()
    }
}

impl Serialize for ArgumentHierarchy {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = self.values.len() + usize::from(self.parent.is_some());
        let mut map = serializer.serialize_map(Some(len))?;
        for (name, value) in self.values.iter() {
            map.serialize_entry(name, value)?;
        }
        if let Some((name, parent)) = &self.parent {
            map.serialize_entry(name, parent.as_ref())?;
        }
        map.end()
    }
}

/// Reconstruct the hierarchy seen by the context at `current`.
///
/// # Errors
///
/// Returns `HierarchyReconstructionError` if `current` is not in the chain,
/// if the chain does not follow the compiled tree, or if an ancestor cannot
/// be instantiated from its recorded values.
pub fn reconstruct(
    tree: &CompiledTree,
    chain: &InvocationChain,
    current: usize,
) -> Result<ArgumentHierarchy, HierarchyReconstructionError> {
    let origin = chain
        .get(current)
        .ok_or_else(|| HierarchyReconstructionError::MissingContext {
            index: current,
            chain: chain.describe(tree),
        })?;
    let node = tree
        .node(origin.node)
        .ok_or_else(|| HierarchyReconstructionError::UnknownCommand {
            index: current,
            chain: chain.describe(tree),
        })?;

    let mut hierarchy = ArgumentHierarchy::default();
    for (index, context) in chain.walk_up(current) {
        if context.node == node.id {
            hierarchy.values = context.values.clone();
            continue;
        }

        let ancestor =
            tree.node(context.node)
                .ok_or_else(|| HierarchyReconstructionError::UnknownCommand {
                    index,
                    chain: chain.describe(tree),
                })?;

        if !ancestor.has_child(node.id) {
            if Some(index) == origin.parent {
                return Err(HierarchyReconstructionError::Inconsistent {
                    parent: ancestor.name.clone(),
                    child: node.name.clone(),
                    chain: chain.describe(tree),
                });
            }
            continue;
        }

        ancestor
            .definition()
            .instantiate(&context.values)
            .map_err(|source| HierarchyReconstructionError::Ancestor {
                ancestor: ancestor.name.clone(),
                chain: chain.describe(tree),
                source,
            })?;
        let nested = reconstruct(tree, chain, index)?;
        hierarchy.parent = Some((ancestor.name.clone(), Box::new(nested)));
    }

    tracing::trace!(
        command = %node.name,
        depth = hierarchy.depth(),
        "reconstructed argument hierarchy"
    );
    Ok(hierarchy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::compile::compile;
    use crate::engine::context::parse;
    use crate::schema::{CommandDefinition, FieldSpec};

    fn tree() -> CompiledTree {
        compile(
            &CommandDefinition::new("root")
                .field(FieldSpec::new::<i64>("a").default_value(1))
                .child(
                    CommandDefinition::new("mid")
                        .field(FieldSpec::new::<String>("b").default_value("two"))
                        .child(CommandDefinition::new("leaf").field(FieldSpec::new::<bool>("c"))),
                ),
        )
        .unwrap()
    }

    #[test]
    fn leaf_sees_ancestors_nested_by_name() {
        let tree = tree();
        let parsed = parse(&tree, ["root", "--a", "5", "mid", "leaf", "--c"]).unwrap();
        let hierarchy = reconstruct(&tree, &parsed.chain, 2).unwrap();

        assert_eq!(hierarchy.bool("c"), Some(true));
        assert_eq!(hierarchy.depth(), 2);
        let mid = hierarchy.ancestor("mid").unwrap();
        assert_eq!(mid.str("b"), Some("two"));
        assert!(mid.ancestor("leaf").is_none());
        assert_eq!(hierarchy.lookup(&["mid", "root"]).unwrap().int("a"), Some(5));
        assert!(hierarchy.ancestor("root").is_none());
    }

    #[test]
    fn middle_sees_only_its_ancestors() {
        let tree = tree();
        let parsed = parse(&tree, ["root", "mid", "leaf"]).unwrap();
        let hierarchy = reconstruct(&tree, &parsed.chain, 1).unwrap();

        assert_eq!(hierarchy.str("b"), Some("two"));
        assert_eq!(hierarchy.parent_name(), Some("root"));
        assert_eq!(hierarchy.depth(), 1);
        assert!(hierarchy.get("c").is_none());
    }

    #[test]
    fn root_is_flat() {
        let tree = tree();
        let parsed = parse(&tree, ["root", "mid"]).unwrap();
        let hierarchy = reconstruct(&tree, &parsed.chain, 0).unwrap();

        assert_eq!(hierarchy.int("a"), Some(1));
        assert_eq!(hierarchy.depth(), 0);
    }

    #[test]
    fn repeated_calls_are_identical() {
        let tree = tree();
        let parsed = parse(&tree, ["root", "mid", "leaf"]).unwrap();
        let first = reconstruct(&tree, &parsed.chain, 2).unwrap();
        let second = reconstruct(&tree, &parsed.chain, 2).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn serializes_nested() {
        let tree = tree();
        let parsed = parse(&tree, ["root", "mid", "leaf"]).unwrap();
        let hierarchy = reconstruct(&tree, &parsed.chain, 2).unwrap();

        let json = serde_json::to_value(&hierarchy).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "c": false, "mid": { "b": "two", "root": { "a": 1 } } })
        );
    }

    #[test]
    fn missing_context() {
        let tree = tree();
        let chain = InvocationChain::new();
        let err = reconstruct(&tree, &chain, 0).unwrap_err();
        assert!(matches!(err, HierarchyReconstructionError::MissingContext { .. }));
    }

    #[test]
    fn inconsistent_chain() {
        let tree = tree();
        let root = tree.root().id;
        let mid = tree.child_named(root, "mid").unwrap().id;
        let leaf = tree.child_named(mid, "leaf").unwrap().id;

        let mut chain = InvocationChain::new();
        chain.push(&tree, root, FieldValues::new().with("a", 1));
        chain.push(&tree, leaf, FieldValues::new());

        let err = reconstruct(&tree, &chain, 1).unwrap_err();
        assert!(matches!(
            err,
            HierarchyReconstructionError::Inconsistent { ref parent, ref child, .. }
                if parent == "root" && child == "leaf"
        ));
    }

    #[test]
    fn ancestor_that_cannot_be_built() {
        let tree = compile(
            &CommandDefinition::new("root")
                .field(FieldSpec::new::<String>("token"))
                .factory(|values| {
                    values.require_str("token")?;
                    Ok(crate::engine::lifecycle::Passive)
                })
                .child(CommandDefinition::new("leaf")),
        )
        .unwrap();
        let root = tree.root().id;
        let leaf = tree.child_named(root, "leaf").unwrap().id;

        let mut chain = InvocationChain::new();
        chain.push(&tree, root, FieldValues::new());
        chain.push(&tree, leaf, FieldValues::new());

        let err = reconstruct(&tree, &chain, 1).unwrap_err();
        assert!(matches!(
            err,
            HierarchyReconstructionError::Ancestor { ref ancestor, .. } if ancestor == "root"
        ));
    }

    #[test]
    fn built_by_hand() {
        let hierarchy = ArgumentHierarchy::new(FieldValues::new().with("key", "T-1")).with_parent(
            "ticket",
            ArgumentHierarchy::new(FieldValues::new().with("filter", "open")),
        );
        assert_eq!(hierarchy.ancestors().map(|(n, _)| n).collect::<Vec<_>>(), vec!["ticket"]);
    }
}
