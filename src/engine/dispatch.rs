//! engine::dispatch
//!
//! Two-phase dispatch along the invoked chain.
//!
//! # Lifecycle
//!
//! Each command in the chain goes through, root first:
//!
//! ```text
//! Constructing -> Initializing -> [Running] -> Done
//! ```
//!
//! - **Constructing**: build the instance from its own values
//! - **Initializing**: reconstruct its hierarchy and call `on_init`
//! - **Running**: call `on_run`, only if no subcommand followed it
//!
//! A node is never revisited. The first failure stops the invocation.

use std::fmt;
use std::io::Write;

use super::compile::CompiledTree;
use super::context::ParsedInvocation;
use super::hierarchy::reconstruct;
use super::lifecycle::RunOutcome;
use super::EngineError;

/// Dispatch state of one command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Constructing,
    Initializing,
    Running,
    Done,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Constructing => "construction",
            Phase::Initializing => "initialization",
            Phase::Running => "run",
            Phase::Done => "completion",
        };
        f.write_str(name)
    }
}

/// What happened to one command of the chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeReport {
    pub command: String,
    /// Whether `on_run` was called
    pub ran: bool,
    /// Whether help was printed after `on_run`
    pub showed_help: bool,
}

/// Summary of one dispatch, in chain order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub nodes: Vec<NodeReport>,
}

impl DispatchReport {
    /// The command whose `on_run` was called, if any.
    pub fn ran(&self) -> Option<&str> {
        self.nodes
            .iter()
            .find(|n| n.ran)
            .map(|n| n.command.as_str())
    }
}

/// Drive the lifecycle for every command in the parsed chain.
///
/// Help requested by a handler is written to `out`.
///
/// # Errors
///
/// - `EngineError::Validation` if a command cannot be constructed
/// - `EngineError::Reconstruction` if its hierarchy cannot be rebuilt
/// - `EngineError::Handler` if `on_init` or `on_run` fails
/// - `EngineError::Output` if help cannot be written
pub fn dispatch(
    tree: &CompiledTree,
    invocation: &mut ParsedInvocation,
    out: &mut dyn Write,
) -> Result<DispatchReport, EngineError> {
    let mut report = DispatchReport::default();

    for index in 0..invocation.chain.len() {
        let Some(context) = invocation.chain.get(index) else {
            break;
        };
        let Some(node) = tree.node(context.node) else {
            return Err(super::hierarchy::HierarchyReconstructionError::UnknownCommand {
                index,
                chain: invocation.chain.describe(tree),
            }
            .into());
        };
        let command = node.name.clone();
        let selected = context.invoked_subcommand.is_none();

        tracing::debug!(command = %command, phase = %Phase::Constructing, "dispatch");
        let mut instance = node
            .definition()
            .instantiate(&context.values)
            .map_err(|source| EngineError::Validation {
                command: command.clone(),
                source,
            })?;

        tracing::debug!(command = %command, phase = %Phase::Initializing, "dispatch");
        let hierarchy = reconstruct(tree, &invocation.chain, index)?;
        instance
            .on_init(&hierarchy)
            .map_err(|source| EngineError::Handler {
                command: command.clone(),
                phase: Phase::Initializing,
                source,
            })?;

        let mut showed_help = false;
        if selected {
            tracing::debug!(command = %command, phase = %Phase::Running, "dispatch");
            let outcome = instance
                .on_run(&hierarchy)
                .map_err(|source| EngineError::Handler {
                    command: command.clone(),
                    phase: Phase::Running,
                    source,
                })?;
            if outcome == RunOutcome::ShowHelp {
                let help = invocation.render_help(tree, node.id);
                writeln!(out, "{}", help.trim_end())?;
                showed_help = true;
            }
        }

        tracing::trace!(command = %command, phase = %Phase::Done, "dispatch");
        report.nodes.push(NodeReport {
            command,
            ran: selected,
            showed_help,
        });
    }

    Ok(report)
}
