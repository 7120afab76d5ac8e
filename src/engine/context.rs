//! engine::context
//!
//! Invocation contexts produced by parsing.
//!
//! Parsing a command line against a [`CompiledTree`] yields an explicit
//! [`InvocationChain`]: one [`InvocationContext`] per command named on the
//! command line, root first. Each context links to its parent by index; the
//! root has no parent. The chain is handed to hierarchy reconstruction and
//! dispatch directly; nothing is looked up from global state.

use std::ffi::OsString;

use clap::ArgMatches;

use super::compile::{CompiledTree, NodeId};
use super::options::OptionDescriptor;
use crate::schema::{FieldKind, FieldValue, FieldValues};

/// Runtime record of one parsed command.
#[derive(Debug, Clone, PartialEq)]
pub struct InvocationContext {
    /// Compiled node this context belongs to
    pub node: NodeId,
    /// This command's own parsed values
    pub values: FieldValues,
    /// Index of the enclosing context in the chain
    pub parent: Option<usize>,
    /// Name of the subcommand that followed, if any
    pub invoked_subcommand: Option<String>,
}

/// Contexts of one invocation, root first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InvocationChain {
    contexts: Vec<InvocationContext>,
}

impl InvocationChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a context below the current last one.
    ///
    /// The previous last context records `name` of the new node as its
    /// invoked subcommand. Returns the index of the new context.
    pub fn push(&mut self, tree: &CompiledTree, node: NodeId, values: FieldValues) -> usize {
        let parent = self.contexts.len().checked_sub(1);
        if let (Some(parent), Some(compiled)) = (parent, tree.node(node)) {
            self.contexts[parent].invoked_subcommand = Some(compiled.name.clone());
        }
        self.contexts.push(InvocationContext {
            node,
            values,
            parent,
            invoked_subcommand: None,
        });
        self.contexts.len() - 1
    }

    /// Build the chain from clap matches of the tree's command.
    pub fn from_matches(tree: &CompiledTree, matches: &ArgMatches) -> Self {
        let mut chain = Self::new();
        let mut node = tree.root();
        let mut current = matches;

        loop {
            chain.push(tree, node.id, extract_values(&node.options, current));
            let Some((name, sub)) = current.subcommand() else {
                break;
            };
            let Some(child) = tree.child_named(node.id, name) else {
                break;
            };
            node = child;
            current = sub;
        }

        chain
    }

    pub fn get(&self, index: usize) -> Option<&InvocationContext> {
        self.contexts.get(index)
    }

    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &InvocationContext> {
        self.contexts.iter()
    }

    /// The last context: the command selected by the user.
    pub fn leaf(&self) -> Option<&InvocationContext> {
        self.contexts.last()
    }

    /// Walk parent links from `index` up to the root, yielding
    /// `(index, context)` pairs, starting with `index` itself.
    pub fn walk_up(&self, index: usize) -> impl Iterator<Item = (usize, &InvocationContext)> {
        let mut next = self.contexts.get(index).map(|_| index);
        std::iter::from_fn(move || {
            let index = next?;
            let context = self.contexts.get(index)?;
            next = context.parent;
            Some((index, context))
        })
    }

    /// Human-readable chain, e.g. `app > ticket > create`.
    pub fn describe(&self, tree: &CompiledTree) -> String {
        self.contexts
            .iter()
            .map(|c| tree.node(c.node).map_or("?", |n| n.name.as_str()))
            .collect::<Vec<_>>()
            .join(" > ")
    }
}

fn extract_values(options: &[OptionDescriptor], matches: &ArgMatches) -> FieldValues {
    let mut values = FieldValues::new();
    for option in options {
        let id = option.id.as_str();
        let value = match option.kind {
            FieldKind::Bool => one::<bool>(matches, id).map(FieldValue::Bool),
            FieldKind::Int => one::<i64>(matches, id).map(FieldValue::Int),
            FieldKind::Float => one::<f64>(matches, id).map(FieldValue::Float),
            FieldKind::Str => one::<String>(matches, id).map(FieldValue::Str),
        };
        if let Some(value) = value {
            values.insert(id, value);
        }
    }
    values
}

/// Typed value of `id`, if present.
///
/// Every argument's parser is derived from its option's kind, so a lookup
/// error is a compiler bug rather than bad input.
fn one<T: Clone + Send + Sync + 'static>(matches: &ArgMatches, id: &str) -> Option<T> {
    match matches.try_get_one::<T>(id) {
        Ok(value) => value.cloned(),
        Err(err) => {
            tracing::error!(option = id, error = %err, "option kind does not match its parser");
            debug_assert!(false, "option '{}' does not match its parser: {}", id, err);
            None
        }
    }
}

/// Result of parsing a command line.
///
/// Holds the chain and the clap command as built by the parse, which is
/// used to render help with full usage paths.
#[derive(Debug, Clone)]
pub struct ParsedInvocation {
    pub chain: InvocationChain,
    command: clap::Command,
}

impl ParsedInvocation {
    /// Render the help text of the command at `node`.
    pub fn render_help(&mut self, tree: &CompiledTree, node: NodeId) -> String {
        let path = tree.path(node);
        let mut command = &mut self.command;
        for name in path.iter().skip(1) {
            command = match command.find_subcommand_mut(name) {
                Some(sub) => sub,
                None => return String::new(),
            };
        }
        command.render_help().to_string()
    }
}

/// Parse `args` (including the program name) against the tree.
///
/// # Errors
///
/// Returns the parser's usage error: missing required fields, unparsable
/// values, unknown flags or subcommands. `--help` is also reported as an
/// error whose kind is `DisplayHelp`.
pub fn parse<I, T>(tree: &CompiledTree, args: I) -> Result<ParsedInvocation, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let mut command = tree.command().clone();
    let matches = command.try_get_matches_from_mut(args)?;
    let chain = InvocationChain::from_matches(tree, &matches);
    tracing::debug!(chain = %chain.describe(tree), "parsed invocation");
    Ok(ParsedInvocation { chain, command })
}
