//! cli
//!
//! Command-line interface of the `vrachos` binary.
//!
//! # Architecture
//!
//! The CLI layer only declares commands. Parsing, hierarchy reconstruction
//! and dispatch are done by the [`crate::engine`] from the tree returned by
//! [`app`].
//!
//! ```text
//! vrachos [-v] [-q] [-d] [--log-file PATH]
//! ├── ticket [-f FILTER]
//! │   └── create -k KEY [-p PRIORITY] [--dry-run]
//! └── config
//!     ├── show [--path]
//!     └── edit
//! ```

pub mod commands;

pub use commands::AppCommand;

use std::process::ExitCode;

use crate::engine;
use crate::schema::CommandDefinition;

/// The full command tree.
pub fn app() -> CommandDefinition {
    CommandDefinition::of::<AppCommand>()
}

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> ExitCode {
    engine::run_main(&app())
}
