//! cli::commands
//!
//! Commands of the `vrachos` binary.
//!
//! # Architecture
//!
//! Each command is a [`CommandSpec`](crate::schema::CommandSpec):
//! 1. Declares its fields and children
//! 2. Validates its own values in `from_fields`
//! 3. Reads its ancestors' values from the hierarchy in `on_init`/`on_run`
//!
//! Groups that are invoked without a subcommand fall back to their help.

mod app;
mod config_cmd;
mod ticket;

pub use app::AppCommand;
pub use config_cmd::{ConfigCommand, EditConfigCommand, ShowConfigCommand};
pub use ticket::{TicketCommand, TicketCreateCommand};

use crate::engine::ArgumentHierarchy;
use crate::ui::output::Verbosity;

/// Output verbosity from the root command's `--quiet`/`--debug` flags.
pub(crate) fn verbosity(hierarchy: &ArgumentHierarchy) -> Verbosity {
    let root = hierarchy
        .ancestors()
        .last()
        .map_or(hierarchy, |(_, root)| root);
    Verbosity::from_flags(
        root.bool("quiet").unwrap_or(false),
        root.bool("debug").unwrap_or(false),
    )
}
