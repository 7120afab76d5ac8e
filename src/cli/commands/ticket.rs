//! ticket commands - Inspect and create tickets

use anyhow::{Context as _, Result};
use serde::Serialize;

use super::verbosity;
use crate::engine::{ArgumentHierarchy, Initializable, RunOutcome, Runnable};
use crate::schema::{CommandDefinition, CommandSpec, FieldSpec, FieldValues, ValidationError};
use crate::ui::output;

const PRIORITIES: std::ops::RangeInclusive<u8> = 1..=5;

/// `vrachos ticket`: shared ticket options.
///
/// Run on its own, it prints its filter and the values it sees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketCommand {
    pub filter: String,
}

impl CommandSpec for TicketCommand {
    const NAME: &'static str = "ticket";
    const ABOUT: &'static str = "Work with tickets";

    fn fields() -> Vec<FieldSpec> {
        vec![FieldSpec::new::<String>("filter")
            .alias("f")
            .default_value("default")
            .describe("Filter applied to ticket queries")]
    }

    fn children() -> Vec<CommandDefinition> {
        vec![CommandDefinition::of::<TicketCreateCommand>()]
    }

    fn from_fields(values: &FieldValues) -> Result<Self, ValidationError> {
        Ok(Self {
            filter: values.require_str("filter")?.to_string(),
        })
    }
}

impl Initializable for TicketCommand {}

impl Runnable for TicketCommand {
    fn on_run(&mut self, hierarchy: &ArgumentHierarchy) -> Result<RunOutcome> {
        let verbosity = verbosity(hierarchy);
        output::print(format!("filter: {}", self.filter), verbosity);
        output::print_json(hierarchy, verbosity).context("failed to render arguments")?;
        Ok(RunOutcome::Done)
    }
}

/// `vrachos ticket create`: create a ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketCreateCommand {
    pub key: String,
    pub priority: u8,
    pub dry_run: bool,
}

#[derive(Serialize)]
struct CreatedTicket<'a> {
    key: &'a str,
    priority: u8,
    filter: Option<&'a str>,
    created: bool,
    arguments: &'a ArgumentHierarchy,
}

impl CommandSpec for TicketCreateCommand {
    const NAME: &'static str = "create";
    const ABOUT: &'static str = "Create a ticket";

    fn fields() -> Vec<FieldSpec> {
        vec![
            FieldSpec::new::<String>("key")
                .alias("k")
                .describe("The ticket's unique key"),
            FieldSpec::new::<u8>("priority")
                .alias("p")
                .default_value(3)
                .describe("Priority from 1 (highest) to 5"),
            FieldSpec::new::<bool>("dry-run").describe("Validate without creating"),
        ]
    }

    fn from_fields(values: &FieldValues) -> Result<Self, ValidationError> {
        let key = values.require_str("key")?.trim();
        if key.is_empty() {
            return Err(ValidationError::invalid("key", "cannot be empty"));
        }

        let priority: u8 = values.require_int_as("priority")?;
        if !PRIORITIES.contains(&priority) {
            return Err(ValidationError::invalid(
                "priority",
                format!(
                    "must be between {} and {}, got {}",
                    PRIORITIES.start(),
                    PRIORITIES.end(),
                    priority
                ),
            ));
        }

        Ok(Self {
            key: key.to_string(),
            priority,
            dry_run: values.require_bool("dry-run")?,
        })
    }
}

impl Initializable for TicketCreateCommand {
    fn on_init(&mut self, hierarchy: &ArgumentHierarchy) -> Result<()> {
        tracing::info!(key = %self.key, depth = hierarchy.depth(), "preparing ticket");
        Ok(())
    }
}

impl Runnable for TicketCreateCommand {
    fn on_run(&mut self, hierarchy: &ArgumentHierarchy) -> Result<RunOutcome> {
        let ticket = CreatedTicket {
            key: &self.key,
            priority: self.priority,
            filter: hierarchy.ancestor("ticket").and_then(|t| t.str("filter")),
            created: !self.dry_run,
            arguments: hierarchy,
        };
        if self.dry_run {
            tracing::info!(key = %self.key, "dry run, ticket not created");
        }
        output::print_json(&ticket, verbosity(hierarchy)).context("failed to render ticket")?;
        Ok(RunOutcome::Done)
    }
}
