//! engine::options
//!
//! Option synthesis: turns reflected fields into flag descriptors and clap
//! arguments.
//!
//! # Rules
//!
//! - Long flag is always `--<name>`
//! - Short flag is `-<alias>` when an alias distinct from the name exists
//! - Boolean fields are presence flags and are never required
//! - Other fields are optional with their default, or required without one
//! - Help text always ends with a period

use std::collections::HashMap;

use clap::{value_parser, Arg, ArgAction};

use crate::schema::{
    reflect_fields, CommandDefinition, DefinitionError, FieldKind, FieldValue, ReflectedField,
};

/// Long flag reserved by the parser.
const RESERVED_LONG: &str = "help";
/// Short flag reserved by the parser.
const RESERVED_SHORT: char = 'h';

/// Flag representation of one field.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionDescriptor {
    /// Argument id; equal to the field name
    pub id: String,
    /// Long flag, e.g. `--verbose`
    pub long: String,
    /// Short flag, e.g. `-v`
    pub short: Option<String>,
    pub kind: FieldKind,
    pub required: bool,
    pub default: Option<FieldValue>,
    pub help: Option<String>,
}

impl OptionDescriptor {
    /// Synthesize the descriptor of one reflected field.
    pub fn synthesize(field: &ReflectedField) -> Self {
        Self {
            id: field.name.clone(),
            long: format!("--{}", field.name),
            short: field.alias.map(|c| format!("-{}", c)),
            kind: field.kind,
            required: field.is_required(),
            default: field.default.clone(),
            help: field.description.as_deref().and_then(normalize_description),
        }
    }

    /// Whether the flag consumes a value token.
    pub fn takes_value(&self) -> bool {
        self.kind != FieldKind::Bool
    }

    /// All flag strings, long first.
    pub fn flags(&self) -> Vec<&str> {
        std::iter::once(self.long.as_str())
            .chain(self.short.as_deref())
            .collect()
    }

    fn short_char(&self) -> Option<char> {
        self.short.as_deref().and_then(|s| s.chars().nth(1))
    }

    /// Build the clap argument for this option.
    pub fn to_arg(&self) -> Arg {
        let mut arg = Arg::new(self.id.clone()).long(self.id.clone());
        if let Some(short) = self.short_char() {
            arg = arg.short(short);
        }

        arg = match self.kind {
            FieldKind::Bool => arg.action(ArgAction::SetTrue),
            FieldKind::Int => arg
                .action(ArgAction::Set)
                .value_parser(value_parser!(i64))
                .value_name("INT")
                .allow_negative_numbers(true),
            FieldKind::Float => arg
                .action(ArgAction::Set)
                .value_parser(value_parser!(f64))
                .value_name("FLOAT")
                .allow_negative_numbers(true),
            FieldKind::Str => arg
                .action(ArgAction::Set)
                .value_parser(value_parser!(String))
                .value_name("TEXT"),
        };

        if let Some(default) = &self.default {
            let text = default.to_string();
            arg = arg.hide_default_value(text.is_empty()).default_value(text);
        }
        if let Some(help) = &self.help {
            arg = arg.help(help.clone());
        }
        arg.required(self.required)
    }
}

/// Ensure a description ends with a period.
///
/// Returns `None` for empty descriptions.
pub fn normalize_description(description: &str) -> Option<String> {
    let trimmed = description.trim_end();
    if trimmed.is_empty() {
        None
    } else if trimmed.ends_with('.') {
        Some(trimmed.to_string())
    } else {
        Some(format!("{}.", trimmed))
    }
}

/// Reflect and synthesize all options of a definition, in field order.
///
/// # Errors
///
/// Propagates reflection errors, and reports `FlagCollision` when a flag
/// shadows `--help`/`-h` or when two fields share a short flag.
pub fn synthesize_options(
    definition: &CommandDefinition,
) -> Result<Vec<OptionDescriptor>, DefinitionError> {
    let fields = reflect_fields(definition)?;
    let mut shorts: HashMap<char, &str> = HashMap::new();

    for field in &fields {
        if field.name == RESERVED_LONG {
            return Err(collision(definition, field, format!("--{}", field.name), "the help flag"));
        }
        if let Some(alias) = field.alias {
            if alias == RESERVED_SHORT {
                return Err(collision(definition, field, format!("-{}", alias), "the help flag"));
            }
            if let Some(first) = shorts.insert(alias, field.name.as_str()) {
                return Err(collision(
                    definition,
                    field,
                    format!("-{}", alias),
                    &format!("field '{}'", first),
                ));
            }
        }
    }

    Ok(fields.iter().map(OptionDescriptor::synthesize).collect())
}

fn collision(
    definition: &CommandDefinition,
    field: &ReflectedField,
    flag: String,
    other: &str,
) -> DefinitionError {
    DefinitionError::FlagCollision {
        command: definition.name().to_string(),
        field: field.name.clone(),
        flag,
        other: other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldSpec;

    fn options(fields: Vec<FieldSpec>) -> Result<Vec<OptionDescriptor>, DefinitionError> {
        synthesize_options(&CommandDefinition::new("cmd").fields(fields))
    }

    #[test]
    fn long_and_short_flags() {
        let opts = options(vec![
            FieldSpec::new::<bool>("verbose").alias("v"),
            FieldSpec::new::<String>("filter").alias("filter"),
        ])
        .unwrap();

        assert_eq!(opts[0].flags(), vec!["--verbose", "-v"]);
        assert_eq!(opts[1].flags(), vec!["--filter"]);
    }

    #[test]
    fn bool_never_required_and_takes_no_value() {
        let opts = options(vec![FieldSpec::new::<bool>("debug")]).unwrap();
        assert!(!opts[0].required);
        assert!(!opts[0].takes_value());
    }

    #[test]
    fn required_iff_no_default() {
        let opts = options(vec![
            FieldSpec::new::<String>("key"),
            FieldSpec::new::<i64>("timeout").default_value(30),
        ])
        .unwrap();

        assert!(opts[0].required);
        assert!(!opts[1].required);
        assert_eq!(opts[1].default, Some(FieldValue::Int(30)));
    }

    #[test]
    fn description_gets_period() {
        assert_eq!(normalize_description("Verbose output").as_deref(), Some("Verbose output."));
        assert_eq!(normalize_description("Done.").as_deref(), Some("Done."));
        assert_eq!(normalize_description("   "), None);
    }

    #[test]
    fn help_flag_collisions() {
        let err = options(vec![FieldSpec::new::<bool>("help")]).unwrap_err();
        assert!(matches!(err, DefinitionError::FlagCollision { .. }));

        let err = options(vec![FieldSpec::new::<bool>("human").alias("h")]).unwrap_err();
        assert!(matches!(err, DefinitionError::FlagCollision { .. }));
    }

    #[test]
    fn duplicate_short_flag() {
        let err = options(vec![
            FieldSpec::new::<bool>("verbose").alias("v"),
            FieldSpec::new::<bool>("version").alias("v"),
        ])
        .unwrap_err();

        assert_eq!(
            err,
            DefinitionError::FlagCollision {
                command: "cmd".into(),
                field: "version".into(),
                flag: "-v".into(),
                other: "field 'verbose'".into(),
            }
        );
    }

    #[test]
    fn clap_arg_matches_descriptor() {
        let opts = options(vec![
            FieldSpec::new::<i64>("count")
                .alias("c")
                .default_value(3)
                .describe("How many"),
        ])
        .unwrap();
        let arg = opts[0].to_arg();

        assert_eq!(arg.get_id().as_str(), "count");
        assert_eq!(arg.get_long(), Some("count"));
        assert_eq!(arg.get_short(), Some('c'));
        assert!(!arg.is_required_set());
        let defaults = arg.get_default_values();
        assert_eq!(defaults.len(), 1);
        assert_eq!(defaults[0].to_str(), Some("3"));
    }
}
