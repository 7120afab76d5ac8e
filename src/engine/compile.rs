//! engine::compile
//!
//! Command tree compilation.
//!
//! # Architecture
//!
//! [`compile`] walks a [`CommandDefinition`] tree depth-first. Children are
//! compiled before they are attached to their parent, so any definition
//! error deep in the tree surfaces before the parent is finished and before
//! any argument is parsed.
//!
//! The result is a [`CompiledTree`]: an arena of [`CompiledNode`]s (one per
//! definition, ids assigned in post-order, root last) plus the clap command
//! that parses the synthesized surface.
//!
//! # Invariants
//!
//! - Exactly one compiled node per definition
//! - Each node's options are in field declaration order
//! - Sibling names are unique
//! - No field shares its parent command's name
//! - The compiled tree is never mutated after construction

use std::collections::HashSet;

use super::options::{synthesize_options, OptionDescriptor};
use crate::schema::{CommandDefinition, DefinitionError};

/// Index of a node in a [`CompiledTree`].
pub type NodeId = usize;

/// One compiled command.
#[derive(Debug, Clone)]
pub struct CompiledNode {
    pub id: NodeId,
    pub name: String,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub options: Vec<OptionDescriptor>,
    definition: CommandDefinition,
}

impl CompiledNode {
    /// The definition this node was compiled from.
    pub fn definition(&self) -> &CommandDefinition {
        &self.definition
    }

    pub fn is_group(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn has_child(&self, id: NodeId) -> bool {
        self.children.contains(&id)
    }
}

/// A parser-ready command tree.
#[derive(Debug, Clone)]
pub struct CompiledTree {
    nodes: Vec<CompiledNode>,
    root: NodeId,
    command: clap::Command,
}

impl CompiledTree {
    pub fn root(&self) -> &CompiledNode {
        &self.nodes[self.root]
    }

    pub fn node(&self, id: NodeId) -> Option<&CompiledNode> {
        self.nodes.get(id)
    }

    pub fn nodes(&self) -> &[CompiledNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The clap command for the whole tree.
    pub fn command(&self) -> &clap::Command {
        &self.command
    }

    /// Find a child of `parent` by name.
    pub fn child_named(&self, parent: NodeId, name: &str) -> Option<&CompiledNode> {
        self.node(parent)?
            .children
            .iter()
            .filter_map(|&id| self.node(id))
            .find(|child| child.name == name)
    }

    /// Names from the root down to `id`.
    pub fn path(&self, id: NodeId) -> Vec<&str> {
        let mut path = Vec::new();
        let mut current = self.node(id);
        while let Some(node) = current {
            path.push(node.name.as_str());
            current = node.parent.and_then(|p| self.node(p));
        }
        path.reverse();
        path
    }
}

/// Compile a definition tree.
///
/// # Errors
///
/// Returns the first `DefinitionError` found in a depth-first walk. No
/// partial tree is returned.
pub fn compile(root: &CommandDefinition) -> Result<CompiledTree, DefinitionError> {
    let mut nodes = Vec::with_capacity(root.count());
    let (root_id, command) = compile_node(root, &mut nodes)?;
    tracing::debug!(commands = nodes.len(), root = root.name(), "compiled command tree");

    Ok(CompiledTree {
        nodes,
        root: root_id,
        command,
    })
}

fn compile_node(
    definition: &CommandDefinition,
    nodes: &mut Vec<CompiledNode>,
) -> Result<(NodeId, clap::Command), DefinitionError> {
    validate_command_name(definition.name())?;

    let mut child_ids = Vec::with_capacity(definition.children().len());
    let mut child_commands = Vec::with_capacity(definition.children().len());
    let mut seen = HashSet::new();
    for child in definition.children() {
        let (id, command) = compile_node(child, nodes)?;
        if !seen.insert(child.name()) {
            return Err(DefinitionError::DuplicateChild {
                parent: definition.name().to_string(),
                child: child.name().to_string(),
            });
        }
        check_parent_key(definition.name(), &nodes[id])?;
        child_ids.push(id);
        child_commands.push(command);
    }

    let options = synthesize_options(definition)?;

    let mut command = clap::Command::new(definition.name().to_string())
        .args(options.iter().map(OptionDescriptor::to_arg));
    if let Some(about) = definition.description() {
        command = command.about(about.to_string());
    }
    if !child_commands.is_empty() {
        command = command
            .subcommands(child_commands)
            .subcommand_value_name("COMMAND")
            .disable_help_subcommand(true);
    }

    let id = nodes.len();
    for &child in &child_ids {
        nodes[child].parent = Some(id);
    }
    tracing::trace!(command = definition.name(), id, options = options.len(), "compiled command");
    nodes.push(CompiledNode {
        id,
        name: definition.name().to_string(),
        parent: None,
        children: child_ids,
        options,
        definition: definition.clone(),
    });

    Ok((id, command))
}

/// A child's hierarchy nests its parent under the parent's name, so no child
/// field may use that name.
fn check_parent_key(parent: &str, child: &CompiledNode) -> Result<(), DefinitionError> {
    match child.options.iter().find(|option| option.id == parent) {
        Some(option) => Err(DefinitionError::FlagCollision {
            command: child.name.clone(),
            field: option.id.clone(),
            flag: option.long.clone(),
            other: format!("parent command '{}'", parent),
        }),
        None => Ok(()),
    }
}

fn validate_command_name(name: &str) -> Result<(), DefinitionError> {
    let reason = if name.is_empty() {
        Some("command name cannot be empty")
    } else if name.starts_with('-') {
        Some("command name cannot start with '-'")
    } else if name.contains(char::is_whitespace) {
        Some("command name cannot contain whitespace")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(DefinitionError::InvalidCommandName {
            command: name.to_string(),
            reason: reason.to_string(),
        }),
        None => Ok(()),
    }
}
