//! schema::reflect
//!
//! Field reflection: resolves a definition's declared fields into
//! flag-ready scalar fields, in declaration order.
//!
//! # Checks
//!
//! - Every field type must be one of the four scalar kinds
//! - Field names are non-empty flag tokens and unique within the command
//! - An alias equal to the field name is treated as no alias
//! - A remaining alias must be a single character
//! - A default must have the declared kind

use std::collections::HashSet;

use super::definition::CommandDefinition;
use super::field::{FieldKind, FieldSpec, FieldValue};
use super::DefinitionError;

/// A field whose declaration resolved to a scalar kind.
#[derive(Debug, Clone, PartialEq)]
pub struct ReflectedField {
    pub name: String,
    pub kind: FieldKind,
    pub default: Option<FieldValue>,
    pub alias: Option<char>,
    pub description: Option<String>,
}

impl ReflectedField {
    /// Whether the command line must supply this field.
    pub fn is_required(&self) -> bool {
        self.kind != FieldKind::Bool && self.default.is_none()
    }
}

/// Reflect the fields of one command definition.
///
/// The result preserves declaration order; it is deterministic for a given
/// definition.
///
/// # Errors
///
/// Returns the first `DefinitionError` found, in declaration order.
pub fn reflect_fields(definition: &CommandDefinition) -> Result<Vec<ReflectedField>, DefinitionError> {
    let mut seen = HashSet::new();
    definition
        .field_specs()
        .iter()
        .map(|spec| {
            if !seen.insert(spec.name.as_str()) {
                return Err(DefinitionError::DuplicateField {
                    command: definition.name().to_string(),
                    field: spec.name.clone(),
                });
            }
            reflect_field(definition.name(), spec)
        })
        .collect()
}

fn reflect_field(command: &str, spec: &FieldSpec) -> Result<ReflectedField, DefinitionError> {
    validate_field_name(command, &spec.name)?;

    let kind = spec
        .ty
        .scalar()
        .ok_or_else(|| DefinitionError::UnsupportedFieldType {
            command: command.to_string(),
            field: spec.name.clone(),
            ty: spec.ty.to_string(),
        })?;

    let alias = match spec.alias.as_deref() {
        None => None,
        Some(alias) if alias == spec.name => None,
        Some(alias) => Some(single_char_alias(command, &spec.name, alias)?),
    };

    if let Some(default) = &spec.default {
        if default.kind() != kind {
            return Err(DefinitionError::DefaultTypeMismatch {
                command: command.to_string(),
                field: spec.name.clone(),
                expected: kind,
                found: default.kind(),
            });
        }
    }

    Ok(ReflectedField {
        name: spec.name.clone(),
        kind,
        default: spec.default.clone(),
        alias,
        description: spec.description.clone(),
    })
}

fn validate_field_name(command: &str, name: &str) -> Result<(), DefinitionError> {
    let reason = if name.is_empty() {
        Some("field name cannot be empty")
    } else if name.starts_with('-') {
        Some("field name cannot start with '-'")
    } else if name.contains(|c: char| c.is_whitespace() || c == '=') {
        Some("field name cannot contain whitespace or '='")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(DefinitionError::InvalidFieldName {
            command: command.to_string(),
            field: name.to_string(),
            reason: reason.to_string(),
        }),
        None => Ok(()),
    }
}

fn single_char_alias(command: &str, field: &str, alias: &str) -> Result<char, DefinitionError> {
    let mut chars = alias.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_alphanumeric() => Ok(c),
        _ => Err(DefinitionError::InvalidAlias {
            command: command.to_string(),
            field: field.to_string(),
            alias: alias.to_string(),
        }),
    }
}
