//! schema
//!
//! Declarative command schema.
//!
//! # Modules
//!
//! - [`field`] - Field types, values and declarations
//! - [`values`] - Parsed field values and construction-time validation
//! - [`definition`] - Command definitions and the [`CommandSpec`] trait
//! - [`reflect`] - Resolves declared fields into scalar, flag-ready fields
//!
//! # Design
//!
//! Commands describe their parameters explicitly. No runtime type
//! introspection is involved: each field names its type through the
//! [`Declared`] trait, and reflection only inspects those declarations.
//! Definitions are immutable once the tree is compiled.

pub mod definition;
pub mod field;
pub mod reflect;
pub mod values;

pub use definition::{CommandDefinition, CommandSpec, Factory};
pub use field::{Declared, FieldKind, FieldSpec, FieldValue, TypeDecl};
pub use reflect::{reflect_fields, ReflectedField};
pub use values::{FieldValues, ValidationError};

use thiserror::Error;

/// Errors in a command tree declaration.
///
/// These are detected when the tree is compiled, before any argument is
/// parsed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DefinitionError {
    #[error("command '{command}': field '{field}' has unsupported type {ty}")]
    UnsupportedFieldType {
        command: String,
        field: String,
        ty: String,
    },

    #[error("invalid command name '{command}': {reason}")]
    InvalidCommandName { command: String, reason: String },

    #[error("command '{command}': invalid field name '{field}': {reason}")]
    InvalidFieldName {
        command: String,
        field: String,
        reason: String,
    },

    #[error("command '{command}': field '{field}' is declared twice")]
    DuplicateField { command: String, field: String },

    #[error("command '{command}': alias '{alias}' of field '{field}' must be a single character")]
    InvalidAlias {
        command: String,
        field: String,
        alias: String,
    },

    #[error("command '{command}': flag '{flag}' of field '{field}' collides with {other}")]
    FlagCollision {
        command: String,
        field: String,
        flag: String,
        other: String,
    },

    #[error("command '{parent}': child command '{child}' is declared twice")]
    DuplicateChild { parent: String, child: String },

    #[error("command '{command}': default of field '{field}' is {found}, expected {expected}")]
    DefaultTypeMismatch {
        command: String,
        field: String,
        expected: FieldKind,
        found: FieldKind,
    },
}
