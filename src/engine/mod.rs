//! engine
//!
//! Compiles command definitions into a CLI and dispatches invocations.
//!
//! # Architecture
//!
//! ```text
//! CommandDefinition tree
//!   -> reflect fields -> synthesize options -> compile tree   (once, at startup)
//!   -> parse argv -> InvocationChain                          (per invocation)
//!   -> reconstruct hierarchy -> on_init / on_run              (per command in chain)
//! ```
//!
//! # Modules
//!
//! - [`options`] - Flag descriptors synthesized from fields
//! - [`compile`] - Command tree compilation
//! - [`context`] - Parsing into an explicit invocation chain
//! - [`hierarchy`] - Nested argument view for each command
//! - [`lifecycle`] - `on_init`/`on_run` capabilities
//! - [`dispatch`] - The two-phase dispatch coordinator
//!
//! # Invariants
//!
//! - Definition errors are reported before any argument is parsed
//! - Usage errors are reported before any `on_init` runs
//! - `on_init` runs root first for every command in the chain
//! - `on_run` runs at most once, on the last command of the chain
//!
//! # Example
//!
//! ```
//! use vrachos::engine::Engine;
//! use vrachos::schema::{CommandDefinition, FieldSpec};
//!
//! let root = CommandDefinition::new("app")
//!     .child(CommandDefinition::new("ticket").field(FieldSpec::new::<String>("key")));
//! let engine = Engine::new(&root).unwrap();
//!
//! let mut out = Vec::new();
//! let report = engine.run_from(["app"], &mut out).unwrap();
//! assert_eq!(report.ran(), Some("app"));
//! assert!(String::from_utf8(out).unwrap().contains("Usage"));
//! ```

pub mod compile;
pub mod context;
pub mod dispatch;
pub mod hierarchy;
pub mod lifecycle;
pub mod options;

pub use compile::{compile, CompiledNode, CompiledTree, NodeId};
pub use context::{parse, InvocationChain, InvocationContext, ParsedInvocation};
pub use dispatch::{dispatch, DispatchReport, NodeReport, Phase};
pub use hierarchy::{reconstruct, ArgumentHierarchy, HierarchyReconstructionError};
pub use lifecycle::{CommandInstance, Initializable, RunOutcome, Runnable};
pub use options::{OptionDescriptor, synthesize_options};

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;

use clap::error::ErrorKind;
use thiserror::Error;

use crate::schema::{CommandDefinition, DefinitionError, ValidationError};
use crate::ui::output;

/// Errors from compiling or running a command tree.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Definition(#[from] DefinitionError),

    /// Parse-time error reported by the parser.
    #[error(transparent)]
    Usage(#[from] clap::Error),

    #[error(transparent)]
    Reconstruction(#[from] HierarchyReconstructionError),

    #[error("command '{command}': {source}")]
    Validation {
        command: String,
        source: ValidationError,
    },

    #[error("command '{command}' failed during {phase}: {source:#}")]
    Handler {
        command: String,
        phase: Phase,
        source: anyhow::Error,
    },

    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

impl EngineError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            EngineError::Usage(err) => err.exit_code(),
            _ => 1,
        }
    }

    /// Whether this is a usage error.
    ///
    /// `--help` and `--version` travel as parser errors but exit with 0 and
    /// are not usage errors.
    pub fn is_usage(&self) -> bool {
        match self {
            EngineError::Usage(err) => !matches!(
                err.kind(),
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion
            ),
            _ => false,
        }
    }
}

/// A compiled command tree, ready to run invocations.
///
/// The tree is read-only; one engine can serve any number of invocations.
#[derive(Debug, Clone)]
pub struct Engine {
    tree: CompiledTree,
}

impl Engine {
    /// Compile `root` into an engine.
    ///
    /// # Errors
    ///
    /// Returns the first `DefinitionError` in the tree.
    pub fn new(root: &CommandDefinition) -> Result<Self, DefinitionError> {
        Ok(Self {
            tree: compile(root)?,
        })
    }

    pub fn tree(&self) -> &CompiledTree {
        &self.tree
    }

    /// Parse `args` (including the program name) and dispatch.
    ///
    /// Help requested by handlers is written to `out`.
    pub fn run_from<I, T>(&self, args: I, out: &mut dyn Write) -> Result<DispatchReport, EngineError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let mut invocation = parse(&self.tree, args)?;
        dispatch(&self.tree, &mut invocation, out)
    }

    /// Run with the process arguments and report errors on standard error.
    pub fn run(&self) -> ExitCode {
        let stdout = std::io::stdout();
        let result = self.run_from(std::env::args_os(), &mut stdout.lock());
        exit_code_for(result)
    }
}

/// Compile and run `root` against the process arguments.
///
/// Definition errors are reported before anything is parsed.
pub fn run_main(root: &CommandDefinition) -> ExitCode {
    match Engine::new(root) {
        Ok(engine) => engine.run(),
        Err(err) => exit_code_for(Err(err.into())),
    }
}

fn exit_code_for(result: Result<DispatchReport, EngineError>) -> ExitCode {
    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(EngineError::Usage(err)) => {
            // Prints help/version to stdout and real errors to stderr.
            let _ = err.print();
            ExitCode::from(clamp_code(err.exit_code()))
        }
        Err(err) => {
            tracing::debug!(error = ?err, "invocation failed");
            output::error(&err);
            ExitCode::from(clamp_code(err.exit_code()))
        }
    }
}

fn clamp_code(code: i32) -> u8 {
    u8::try_from(code).unwrap_or(1)
}
