//! engine::lifecycle
//!
//! Handler capabilities every command instance implements.
//!
//! # Protocol
//!
//! For each command on the invoked path, root first:
//!
//! ```text
//! construct -> on_init(hierarchy) -> [on_run(hierarchy) if no subcommand followed]
//! ```
//!
//! `on_init` runs for every command in the chain and must not assume a
//! subcommand will run. `on_run` runs at most once per invocation, on the
//! last command named on the command line.
//!
//! # Example
//!
//! ```
//! use vrachos::engine::lifecycle::{Initializable, RunOutcome, Runnable};
//! use vrachos::engine::ArgumentHierarchy;
//!
//! struct Greet {
//!     name: String,
//!     greeting: Option<String>,
//! }
//!
//! impl Initializable for Greet {}
//!
//! impl Runnable for Greet {
//!     fn on_run(&mut self, _args: &ArgumentHierarchy) -> anyhow::Result<RunOutcome> {
//!         self.greeting = Some(format!("hello {}", self.name));
//!         Ok(RunOutcome::Done)
//!     }
//! }
//! ```

use anyhow::Result;

use super::hierarchy::ArgumentHierarchy;

/// What the coordinator should do after `on_run` returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The handler did its work.
    Done,
    /// Print the command's help text.
    ShowHelp,
}

/// Setup hook, called for every command in the invoked chain.
pub trait Initializable {
    fn on_init(&mut self, args: &ArgumentHierarchy) -> Result<()> {
        let _ = args;
        Ok(())
    }
}

/// Main hook, called only on the command selected by the user.
///
/// The default implementation asks for the command's help to be shown,
/// which is what a group invoked without a subcommand does.
pub trait Runnable {
    fn on_run(&mut self, args: &ArgumentHierarchy) -> Result<RunOutcome> {
        let _ = args;
        Ok(RunOutcome::ShowHelp)
    }
}

/// A command bound to its parsed values for one invocation.
pub trait CommandInstance: Initializable + Runnable {}

impl<T: Initializable + Runnable + ?Sized> CommandInstance for T {}

/// Instance used by definitions that declare no factory.
pub(crate) struct Passive;

impl Initializable for Passive {}
impl Runnable for Passive {}
