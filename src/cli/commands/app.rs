//! app command - Root of the `vrachos` command tree

use std::path::PathBuf;

use anyhow::{Context as _, Result};

use super::{ConfigCommand, TicketCommand};
use crate::engine::{ArgumentHierarchy, Initializable, Runnable};
use crate::logging::{self, LogSettings, LoggingError};
use crate::schema::{CommandDefinition, CommandSpec, FieldSpec, FieldValues, ValidationError};

/// Global flags; installs logging before any subcommand starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppCommand {
    pub verbose: bool,
    pub quiet: bool,
    pub debug: bool,
    pub log_file: Option<PathBuf>,
}

impl CommandSpec for AppCommand {
    const NAME: &'static str = "vrachos";
    const ABOUT: &'static str = "Ticket and configuration tool";

    fn fields() -> Vec<FieldSpec> {
        vec![
            FieldSpec::new::<bool>("verbose")
                .alias("v")
                .describe("Show informational log messages"),
            FieldSpec::new::<bool>("quiet")
                .alias("q")
                .describe("Only print errors"),
            FieldSpec::new::<bool>("debug")
                .alias("d")
                .describe("Show debug log messages"),
            FieldSpec::new::<String>("log-file")
                .default_value("")
                .describe("Also append log messages to this file"),
        ]
    }

    fn children() -> Vec<CommandDefinition> {
        vec![
            CommandDefinition::of::<TicketCommand>(),
            CommandDefinition::of::<ConfigCommand>(),
        ]
    }

    fn from_fields(values: &FieldValues) -> Result<Self, ValidationError> {
        let log_file = values.require_str("log-file")?.trim();
        Ok(Self {
            verbose: values.require_bool("verbose")?,
            quiet: values.require_bool("quiet")?,
            debug: values.require_bool("debug")?,
            log_file: (!log_file.is_empty()).then(|| PathBuf::from(log_file)),
        })
    }
}

impl AppCommand {
    pub fn log_settings(&self) -> LogSettings {
        let settings = LogSettings::from_flags(self.verbose, self.debug);
        match &self.log_file {
            Some(path) => settings.with_file(path),
            None => settings,
        }
    }
}

impl Initializable for AppCommand {
    fn on_init(&mut self, _hierarchy: &ArgumentHierarchy) -> Result<()> {
        match logging::init(&self.log_settings()) {
            // Several invocations may share a process.
            Err(LoggingError::Init(_)) => {
                tracing::debug!("logging already initialized");
                Ok(())
            }
            other => other.context("failed to set up logging"),
        }
    }
}

impl Runnable for AppCommand {}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::filter::LevelFilter;

    fn values(log_file: &str) -> FieldValues {
        FieldValues::new()
            .with("verbose", true)
            .with("quiet", false)
            .with("debug", false)
            .with("log-file", log_file)
    }

    #[test]
    fn blank_log_file_means_none() {
        let app = AppCommand::from_fields(&values("  ")).unwrap();
        assert_eq!(app.log_file, None);
        assert_eq!(app.log_settings().level, LevelFilter::INFO);
    }

    #[test]
    fn log_file_is_passed_through() {
        let app = AppCommand::from_fields(&values("/tmp/vrachos.log")).unwrap();
        assert_eq!(
            app.log_settings().file,
            Some(PathBuf::from("/tmp/vrachos.log"))
        );
    }

    #[test]
    fn definition_lists_children() {
        let def = CommandDefinition::of::<AppCommand>();
        assert!(def.has_child("ticket"));
        assert!(def.has_child("config"));
        assert_eq!(def.count(), 6);
    }
}
