//! schema::definition
//!
//! Static command declarations.
//!
//! A [`CommandDefinition`] is one node of the command tree: a name, its
//! ordered fields, its children and a factory that turns parsed field values
//! into a runnable [`CommandInstance`]. Trees are built once at startup, either
//! with the builder methods or from a type implementing [`CommandSpec`].
//!
//! # Example
//!
//! ```
//! use vrachos::schema::{CommandDefinition, FieldSpec};
//!
//! let root = CommandDefinition::new("app")
//!     .about("App command")
//!     .field(FieldSpec::new::<bool>("verbose").alias("v"))
//!     .child(
//!         CommandDefinition::new("ticket")
//!             .field(FieldSpec::new::<String>("filter").default_value("default")),
//!     );
//!
//! assert!(root.has_child("ticket"));
//! assert_eq!(root.field_specs().len(), 1);
//! ```

use std::fmt;
use std::sync::Arc;

use super::field::FieldSpec;
use super::values::{FieldValues, ValidationError};
use crate::engine::lifecycle::{CommandInstance, Passive};

/// Builds a command instance from its parsed field values.
pub type Factory =
    Arc<dyn Fn(&FieldValues) -> Result<Box<dyn CommandInstance>, ValidationError> + Send + Sync>;

/// A command type that declares its own schema.
///
/// Implementors describe their name, help text, fields and children, and
/// how to build themselves from parsed values. Use
/// [`CommandDefinition::of`] to turn one into a tree node.
pub trait CommandSpec: CommandInstance + Sized + 'static {
    /// Command name, unique among siblings.
    const NAME: &'static str;

    /// Help text.
    const ABOUT: &'static str = "";

    /// Field declarations, in the order flags should be listed.
    fn fields() -> Vec<FieldSpec> {
        Vec::new()
    }

    /// Child command definitions.
    fn children() -> Vec<CommandDefinition> {
        Vec::new()
    }

    /// Construct the command from its own parsed values.
    fn from_fields(values: &FieldValues) -> Result<Self, ValidationError>;
}

/// Static declaration of one command.
#[derive(Clone)]
pub struct CommandDefinition {
    name: String,
    description: Option<String>,
    fields: Vec<FieldSpec>,
    children: Vec<CommandDefinition>,
    factory: Factory,
}

impl CommandDefinition {
    /// Create a definition with no fields, no children and default handlers.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            fields: Vec::new(),
            children: Vec::new(),
            factory: Arc::new(passive),
        }
    }

    /// Create a definition from a [`CommandSpec`] type.
    pub fn of<C: CommandSpec>() -> Self {
        let mut definition = Self::new(C::NAME)
            .fields(C::fields())
            .factory(C::from_fields);
        if !C::ABOUT.is_empty() {
            definition.description = Some(C::ABOUT.to_string());
        }
        for child in C::children() {
            definition = definition.child(child);
        }
        definition
    }

    pub fn about(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    pub fn fields(mut self, fields: impl IntoIterator<Item = FieldSpec>) -> Self {
        self.fields.extend(fields);
        self
    }

    pub fn child(mut self, child: CommandDefinition) -> Self {
        self.children.push(child);
        self
    }

    /// Set the constructor for this command's instances.
    pub fn factory<C, F>(mut self, build: F) -> Self
    where
        C: CommandInstance + 'static,
        F: Fn(&FieldValues) -> Result<C, ValidationError> + Send + Sync + 'static,
    {
        self.factory = Arc::new(move |values: &FieldValues| {
            let instance = build(values)?;
            Ok(Box::new(instance) as Box<dyn CommandInstance>)
        });
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn field_specs(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn children(&self) -> &[CommandDefinition] {
        &self.children
    }

    pub fn is_group(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn has_child(&self, name: &str) -> bool {
        self.children.iter().any(|c| c.name == name)
    }

    /// Build an instance of this command from its parsed values.
    pub fn instantiate(
        &self,
        values: &FieldValues,
    ) -> Result<Box<dyn CommandInstance>, ValidationError> {
        (self.factory)(values)
    }

    /// Number of definitions in this subtree, including `self`.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(CommandDefinition::count).sum::<usize>()
    }
}

fn passive(_: &FieldValues) -> Result<Box<dyn CommandInstance>, ValidationError> {
    Ok(Box::new(Passive))
}

impl fmt::Debug for CommandDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDefinition")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("fields", &self.fields)
            .field("children", &self.children)
            .finish_non_exhaustive()
    }
}
