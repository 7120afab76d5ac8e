//! schema::field
//!
//! Typed field declarations for command definitions.
//!
//! # Types
//!
//! - [`FieldKind`] - The four scalar kinds a flag can carry
//! - [`TypeDecl`] - A field type as declared by the command author
//! - [`Declared`] - Maps a Rust type to its [`TypeDecl`]
//! - [`FieldValue`] - A parsed scalar value
//! - [`FieldSpec`] - One typed parameter of a command
//!
//! # Example
//!
//! ```
//! use vrachos::schema::{FieldKind, FieldSpec, TypeDecl};
//!
//! let verbose = FieldSpec::new::<bool>("verbose")
//!     .default_value(false)
//!     .alias("v")
//!     .describe("Verbose output");
//! assert_eq!(verbose.ty, TypeDecl::Scalar(FieldKind::Bool));
//!
//! let tags = FieldSpec::new::<Vec<String>>("tags");
//! assert!(tags.ty.scalar().is_none());
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

/// Scalar kinds supported as command-line flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Bool,
    Int,
    Float,
    Str,
}

impl FieldKind {
    /// Short lowercase name used in messages.
    pub fn as_str(self) -> &'static str {
        match self {
            FieldKind::Bool => "bool",
            FieldKind::Int => "int",
            FieldKind::Float => "float",
            FieldKind::Str => "str",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A field type as written in a command declaration.
///
/// Only [`TypeDecl::Scalar`] can become a flag. The other variants exist so
/// that a definition using them can be described and rejected when the
/// command tree is compiled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDecl {
    Scalar(FieldKind),
    Optional(Box<TypeDecl>),
    Sequence(Box<TypeDecl>),
    Mapping(Box<TypeDecl>, Box<TypeDecl>),
    Named(&'static str),
}

impl TypeDecl {
    /// The scalar kind, if this declaration is a plain scalar.
    pub fn scalar(&self) -> Option<FieldKind> {
        match self {
            TypeDecl::Scalar(kind) => Some(*kind),
            _ => None,
        }
    }
}

impl fmt::Display for TypeDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDecl::Scalar(kind) => write!(f, "{}", kind),
            TypeDecl::Optional(inner) => write!(f, "Option<{}>", inner),
            TypeDecl::Sequence(inner) => write!(f, "Vec<{}>", inner),
            TypeDecl::Mapping(key, value) => write!(f, "Map<{}, {}>", key, value),
            TypeDecl::Named(name) => f.write_str(name),
        }
    }
}

/// Rust types that can appear in a field declaration.
pub trait Declared {
    fn type_decl() -> TypeDecl;
}

macro_rules! declare_scalar {
    ($kind:expr => $($ty:ty),+) => {
        $(
            impl Declared for $ty {
                fn type_decl() -> TypeDecl {
                    TypeDecl::Scalar($kind)
                }
            }
        )+
    };
}

declare_scalar!(FieldKind::Bool => bool);
declare_scalar!(FieldKind::Int => i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);
declare_scalar!(FieldKind::Float => f32, f64);
declare_scalar!(FieldKind::Str => String, &'static str);

impl<T: Declared> Declared for Option<T> {
    fn type_decl() -> TypeDecl {
        TypeDecl::Optional(Box::new(T::type_decl()))
    }
}

impl<T: Declared> Declared for Vec<T> {
    fn type_decl() -> TypeDecl {
        TypeDecl::Sequence(Box::new(T::type_decl()))
    }
}

impl<K: Declared, V: Declared> Declared for HashMap<K, V> {
    fn type_decl() -> TypeDecl {
        TypeDecl::Mapping(Box::new(K::type_decl()), Box::new(V::type_decl()))
    }
}

impl<K: Declared, V: Declared> Declared for BTreeMap<K, V> {
    fn type_decl() -> TypeDecl {
        TypeDecl::Mapping(Box::new(K::type_decl()), Box::new(V::type_decl()))
    }
}

impl Declared for PathBuf {
    fn type_decl() -> TypeDecl {
        TypeDecl::Named("PathBuf")
    }
}

/// A parsed scalar value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl FieldValue {
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Bool(_) => FieldKind::Bool,
            FieldValue::Int(_) => FieldKind::Int,
            FieldValue::Float(_) => FieldKind::Float,
            FieldValue::Str(_) => FieldKind::Str,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            FieldValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            FieldValue::Float(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Int(i) => write!(f, "{}", i),
            FieldValue::Float(x) => write!(f, "{}", x),
            FieldValue::Str(s) => f.write_str(s),
        }
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Int(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Int(i64::from(value))
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Str(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Str(value)
    }
}

/// One typed parameter of a command.
///
/// A field without a default is required, except for boolean fields which
/// are presence flags and default to `false`.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    /// Field name; also the long flag (`--<name>`)
    pub name: String,
    /// Declared type
    pub ty: TypeDecl,
    /// Default value; `None` means the field is required
    pub default: Option<FieldValue>,
    /// Optional short alias (`-<alias>`)
    pub alias: Option<String>,
    /// Help text
    pub description: Option<String>,
}

impl FieldSpec {
    /// Declare a field whose type is the Rust type `T`.
    pub fn new<T: Declared>(name: impl Into<String>) -> Self {
        Self::with_type(name, T::type_decl())
    }

    /// Declare a field from an explicit type declaration.
    pub fn with_type(name: impl Into<String>, ty: TypeDecl) -> Self {
        Self {
            name: name.into(),
            ty,
            default: None,
            alias: None,
            description: None,
        }
    }

    pub fn default_value(mut self, value: impl Into<FieldValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Whether the command line must supply this field.
    pub fn is_required(&self) -> bool {
        self.default.is_none() && self.ty != TypeDecl::Scalar(FieldKind::Bool)
    }
}
