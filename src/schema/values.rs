//! schema::values
//!
//! Parsed field values of one command, and the typed accessors command
//! constructors use to build themselves from them.

use serde::ser::{Serialize, SerializeMap, Serializer};
use thiserror::Error;

use super::field::{FieldKind, FieldValue};

/// Errors raised while building a command from its field values.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValidationError {
    #[error("missing value for field '{field}'")]
    Missing { field: String },

    #[error("field '{field}' expects {expected}, got {found}")]
    WrongKind {
        field: String,
        expected: FieldKind,
        found: FieldKind,
    },

    #[error("invalid value for field '{field}': {reason}")]
    Invalid { field: String, reason: String },
}

impl ValidationError {
    /// Convenience constructor for command-specific checks.
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::Invalid {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Ordered name→value map.
///
/// Insertion order is preserved so that values appear in declaration order
/// when listed or serialized.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldValues {
    entries: Vec<(String, FieldValue)>,
}

impl FieldValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, replacing any previous value for the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn require(&self, name: &str, expected: FieldKind) -> Result<&FieldValue, ValidationError> {
        let value = self.get(name).ok_or_else(|| ValidationError::Missing {
            field: name.to_string(),
        })?;
        if value.kind() != expected {
            return Err(ValidationError::WrongKind {
                field: name.to_string(),
                expected,
                found: value.kind(),
            });
        }
        Ok(value)
    }

    pub fn require_bool(&self, name: &str) -> Result<bool, ValidationError> {
        Ok(self.require(name, FieldKind::Bool)?.as_bool().unwrap_or_default())
    }

    pub fn require_int(&self, name: &str) -> Result<i64, ValidationError> {
        Ok(self.require(name, FieldKind::Int)?.as_int().unwrap_or_default())
    }

    /// Integer value converted to a narrower type.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::Invalid` if the value does not fit in `T`.
    pub fn require_int_as<T: TryFrom<i64>>(&self, name: &str) -> Result<T, ValidationError> {
        let raw = self.require_int(name)?;
        T::try_from(raw).map_err(|_| {
            ValidationError::invalid(
                name,
                format!("{} is out of range for {}", raw, std::any::type_name::<T>()),
            )
        })
    }

    pub fn require_float(&self, name: &str) -> Result<f64, ValidationError> {
        Ok(self
            .require(name, FieldKind::Float)?
            .as_float()
            .unwrap_or_default())
    }

    pub fn require_str(&self, name: &str) -> Result<&str, ValidationError> {
        Ok(self.require(name, FieldKind::Str)?.as_str().unwrap_or_default())
    }
}

impl<N: Into<String>, V: Into<FieldValue>> FromIterator<(N, V)> for FieldValues {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut values = FieldValues::new();
        for (name, value) in iter {
            values.insert(name, value);
        }
        values
    }
}

impl Serialize for FieldValues {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
