//! Vrachos - declarative command hierarchies
//!
//! Commands declare typed fields and child commands. Vrachos turns the
//! declarations into a command-line parser, and for each invocation builds
//! every command on the invoked path, hands each one the values of its
//! ancestors, and runs the selected command.
//!
//! # Architecture
//!
//! - [`schema`] - Field declarations, values and command definitions
//! - [`engine`] - Compilation, parsing, hierarchy reconstruction and dispatch
//! - [`cli`] - The `vrachos` binary's command tree
//! - [`core`] - Configuration files and filesystem helpers
//! - [`logging`] - Structured logging setup
//! - [`ui`] - Output formatting and the text editor
//!
//! # Invariants
//!
//! 1. A malformed definition is rejected before any argument is parsed
//! 2. A usage error is reported before any command is initialized
//! 3. Commands are initialized root first; only the selected one runs
//! 4. Compiled trees are never mutated and can be shared between threads

pub mod cli;
pub mod core;
pub mod engine;
pub mod logging;
pub mod schema;
pub mod ui;
