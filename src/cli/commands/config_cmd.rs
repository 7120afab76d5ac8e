//! config commands - Show or edit the configuration file

use anyhow::{Context as _, Result};

use super::verbosity;
use crate::core::config::{AppConfig, ConfigFile};
use crate::engine::{ArgumentHierarchy, Initializable, RunOutcome, Runnable};
use crate::schema::{CommandDefinition, CommandSpec, FieldSpec, FieldValues, ValidationError};
use crate::ui::{editor, output};

/// `vrachos config`: groups the configuration commands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfigCommand;

impl CommandSpec for ConfigCommand {
    const NAME: &'static str = "config";
    const ABOUT: &'static str = "Show or edit the configuration";

    fn children() -> Vec<CommandDefinition> {
        vec![
            CommandDefinition::of::<ShowConfigCommand>(),
            CommandDefinition::of::<EditConfigCommand>(),
        ]
    }

    fn from_fields(_values: &FieldValues) -> Result<Self, ValidationError> {
        Ok(Self)
    }
}

impl Initializable for ConfigCommand {}
impl Runnable for ConfigCommand {}

/// `vrachos config show`: print the configuration or its location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShowConfigCommand {
    pub path_only: bool,
}

impl CommandSpec for ShowConfigCommand {
    const NAME: &'static str = "show";
    const ABOUT: &'static str = "Print the configuration";

    fn fields() -> Vec<FieldSpec> {
        vec![FieldSpec::new::<bool>("path").describe("Print the file location instead")]
    }

    fn from_fields(values: &FieldValues) -> Result<Self, ValidationError> {
        Ok(Self {
            path_only: values.require_bool("path")?,
        })
    }
}

impl Initializable for ShowConfigCommand {}

impl Runnable for ShowConfigCommand {
    fn on_run(&mut self, hierarchy: &ArgumentHierarchy) -> Result<RunOutcome> {
        let path = AppConfig::default_path()?;
        if self.path_only {
            output::print(path.display(), verbosity(hierarchy));
            return Ok(RunOutcome::Done);
        }

        let file = ConfigFile::<AppConfig>::load(&path)?;
        output::print(file.to_json()?.trim_end(), verbosity(hierarchy));
        Ok(RunOutcome::Done)
    }
}

/// `vrachos config edit`: edit the configuration in a text editor.
///
/// The edited text must be a valid configuration; otherwise nothing is saved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EditConfigCommand;

impl CommandSpec for EditConfigCommand {
    const NAME: &'static str = "edit";
    const ABOUT: &'static str = "Edit the configuration in a text editor";

    fn from_fields(_values: &FieldValues) -> Result<Self, ValidationError> {
        Ok(Self)
    }
}

impl Initializable for EditConfigCommand {}

impl Runnable for EditConfigCommand {
    fn on_run(&mut self, hierarchy: &ArgumentHierarchy) -> Result<RunOutcome> {
        let mut file = ConfigFile::<AppConfig>::load(AppConfig::default_path()?)?;
        let current = file.to_json()?;

        let edited = match file.value().editor.as_deref() {
            Some(command) => editor::edit_with(command, &current)?,
            None => editor::open_editor(&current)?,
        };
        if edited.trim() == current.trim() {
            output::print("configuration unchanged", verbosity(hierarchy));
            return Ok(RunOutcome::Done);
        }

        let updated: AppConfig =
            serde_json::from_str(&edited).context("edited configuration is not valid JSON")?;
        file.replace(updated)?;
        file.save()?;

        output::print(
            format!("saved {}", file.path().display()),
            verbosity(hierarchy),
        );
        Ok(RunOutcome::Done)
    }
}
