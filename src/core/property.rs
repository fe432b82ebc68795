//! Typed operation properties.
//!
//! Every property declares a [`PropertyKind`]; values are stored as a
//! tagged [`PropertyValue`] so that a mismatched read or write surfaces as a
//! [`PropertyError`] rather than a failed cast somewhere downstream.

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Declared kind of a property value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    Bool,
    String,
    Strings,
    Integer,
    Path,
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PropertyKind::Bool => "bool",
            PropertyKind::String => "string",
            PropertyKind::Strings => "string list",
            PropertyKind::Integer => "integer",
            PropertyKind::Path => "path",
        };
        f.write_str(name)
    }
}

/// A property value tagged with its kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValue {
    Bool(bool),
    String(String),
    Strings(Vec<String>),
    Integer(i64),
    Path(PathBuf),
}

impl PropertyValue {
    /// The kind of this value.
    pub fn kind(&self) -> PropertyKind {
        match self {
            PropertyValue::Bool(_) => PropertyKind::Bool,
            PropertyValue::String(_) => PropertyKind::String,
            PropertyValue::Strings(_) => PropertyKind::Strings,
            PropertyValue::Integer(_) => PropertyKind::Integer,
            PropertyValue::Path(_) => PropertyKind::Path,
        }
    }

    /// Parse user input into a value of the given kind.
    pub fn parse(kind: PropertyKind, input: &str) -> Result<Self, PropertyError> {
        let invalid = || PropertyError::InvalidInput {
            input: input.to_string(),
            kind,
        };

        match kind {
            PropertyKind::Bool => match input.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "1" | "on" => Ok(PropertyValue::Bool(true)),
                "false" | "no" | "0" | "off" => Ok(PropertyValue::Bool(false)),
                _ => Err(invalid()),
            },
            PropertyKind::String => Ok(PropertyValue::String(input.to_string())),
            PropertyKind::Strings => Ok(PropertyValue::Strings(
                input
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect(),
            )),
            PropertyKind::Integer => input
                .trim()
                .parse()
                .map(PropertyValue::Integer)
                .map_err(|_| invalid()),
            PropertyKind::Path => Ok(PropertyValue::Path(PathBuf::from(input))),
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Bool(v) => write!(f, "{}", v),
            PropertyValue::String(v) => f.write_str(v),
            PropertyValue::Strings(v) => f.write_str(&v.join(",")),
            PropertyValue::Integer(v) => write!(f, "{}", v),
            PropertyValue::Path(v) => write!(f, "{}", v.display()),
        }
    }
}

impl From<bool> for PropertyValue {
    fn from(v: bool) -> Self {
        PropertyValue::Bool(v)
    }
}

impl From<&str> for PropertyValue {
    fn from(v: &str) -> Self {
        PropertyValue::String(v.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(v: String) -> Self {
        PropertyValue::String(v)
    }
}

impl From<Vec<String>> for PropertyValue {
    fn from(v: Vec<String>) -> Self {
        PropertyValue::Strings(v)
    }
}

impl From<i64> for PropertyValue {
    fn from(v: i64) -> Self {
        PropertyValue::Integer(v)
    }
}

impl From<PathBuf> for PropertyValue {
    fn from(v: PathBuf) -> Self {
        PropertyValue::Path(v)
    }
}

/// Where the current value of a property came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PropertySource {
    #[default]
    Unset,
    /// Injected by the owning handler when the property set was built
    Default,
    /// Set by the caller for this invocation
    Explicit,
}

/// Property errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PropertyError {
    #[error("property `{name}` expects a {expected} value, got {found}")]
    KindMismatch {
        name: String,
        expected: PropertyKind,
        found: PropertyKind,
    },

    #[error("required property `{name}` has no value")]
    Missing { name: String },

    #[error("unknown property `{name}`")]
    Unknown { name: String },

    #[error("`{input}` is not a valid {kind}")]
    InvalidInput { input: String, kind: PropertyKind },

    #[error("expected `key=value`, got `{0}`")]
    MalformedAssignment(String),
}

/// A single named, typed, settable operation parameter.
#[derive(Debug, Clone)]
pub struct Property {
    name: String,
    description: String,
    kind: PropertyKind,
    value: Option<PropertyValue>,
    source: PropertySource,
    required: bool,
}

impl Property {
    /// Create an unset, optional property.
    pub fn new(name: impl Into<String>, kind: PropertyKind) -> Self {
        Property {
            name: name.into(),
            description: String::new(),
            kind,
            value: None,
            source: PropertySource::Unset,
            required: false,
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Mark the property as required for execution.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Inject a default value.
    ///
    /// Panics if the default does not match the declared kind, which is a
    /// programming error in the handler that declares the property.
    pub fn with_default(mut self, value: impl Into<PropertyValue>) -> Self {
        let value = value.into();
        assert_eq!(
            value.kind(),
            self.kind,
            "default for property `{}` has the wrong kind",
            self.name
        );
        self.value = Some(value);
        self.source = PropertySource::Default;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn kind(&self) -> PropertyKind {
        self.kind
    }

    pub fn source(&self) -> PropertySource {
        self.source
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Current value, if any.
    pub fn value(&self) -> Option<&PropertyValue> {
        self.value.as_ref()
    }

    /// Whether the property can be handed to `exec`.
    pub fn is_resolved(&self) -> bool {
        !self.required || self.value.is_some()
    }

    /// Set an explicit value for this invocation.
    pub fn set(&mut self, value: impl Into<PropertyValue>) -> Result<(), PropertyError> {
        let value = value.into();
        if value.kind() != self.kind {
            return Err(PropertyError::KindMismatch {
                name: self.name.clone(),
                expected: self.kind,
                found: value.kind(),
            });
        }
        self.value = Some(value);
        self.source = PropertySource::Explicit;
        Ok(())
    }

    fn value_or_missing(&self) -> Result<&PropertyValue, PropertyError> {
        self.value.as_ref().ok_or_else(|| PropertyError::Missing {
            name: self.name.clone(),
        })
    }

    fn mismatch(&self, found: PropertyKind) -> PropertyError {
        PropertyError::KindMismatch {
            name: self.name.clone(),
            expected: self.kind,
            found,
        }
    }

    pub fn as_bool(&self) -> Result<bool, PropertyError> {
        match self.value_or_missing()? {
            PropertyValue::Bool(v) => Ok(*v),
            other => Err(self.mismatch(other.kind())),
        }
    }

    pub fn as_str(&self) -> Result<&str, PropertyError> {
        match self.value_or_missing()? {
            PropertyValue::String(v) => Ok(v),
            other => Err(self.mismatch(other.kind())),
        }
    }

    pub fn as_strings(&self) -> Result<&[String], PropertyError> {
        match self.value_or_missing()? {
            PropertyValue::Strings(v) => Ok(v),
            other => Err(self.mismatch(other.kind())),
        }
    }

    pub fn as_integer(&self) -> Result<i64, PropertyError> {
        match self.value_or_missing()? {
            PropertyValue::Integer(v) => Ok(*v),
            other => Err(self.mismatch(other.kind())),
        }
    }

    pub fn as_path(&self) -> Result<&Path, PropertyError> {
        match self.value_or_missing()? {
            PropertyValue::Path(v) => Ok(v),
            other => Err(self.mismatch(other.kind())),
        }
    }
}

/// Ordered, name-addressable set of properties.
#[derive(Debug, Clone, Default)]
pub struct Properties {
    items: Vec<Property>,
}

impl Properties {
    pub fn new() -> Self {
        Properties { items: Vec::new() }
    }

    /// Add a property, replacing any existing property with the same name.
    pub fn add(&mut self, property: Property) {
        match self.items.iter_mut().find(|p| p.name == property.name) {
            Some(existing) => *existing = property,
            None => self.items.push(property),
        }
    }

    /// Builder-style [`Properties::add`].
    pub fn with(mut self, property: Property) -> Self {
        self.add(property);
        self
    }

    /// Merge another set into this one; later properties replace earlier ones.
    pub fn merge(&mut self, other: Properties) {
        for property in other.items {
            self.add(property);
        }
    }

    pub fn get(&self, name: &str) -> Option<&Property> {
        self.items.iter().find(|p| p.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Property> {
        self.items.iter_mut().find(|p| p.name == name)
    }

    /// Get a property that the operation itself declared.
    pub fn require(&self, name: &str) -> Result<&Property, PropertyError> {
        self.get(name).ok_or_else(|| PropertyError::Unknown {
            name: name.to_string(),
        })
    }

    /// Set an explicit value on a declared property.
    pub fn set(
        &mut self,
        name: &str,
        value: impl Into<PropertyValue>,
    ) -> Result<(), PropertyError> {
        self.get_mut(name)
            .ok_or_else(|| PropertyError::Unknown {
                name: name.to_string(),
            })?
            .set(value)
    }

    /// Parse and apply a `key=value` assignment using the declared kind.
    pub fn parse_assignment(&mut self, assignment: &str) -> Result<(), PropertyError> {
        let (name, raw) = assignment
            .split_once('=')
            .ok_or_else(|| PropertyError::MalformedAssignment(assignment.to_string()))?;
        let name = name.trim();
        let kind = self.require(name)?.kind();
        let value = PropertyValue::parse(kind, raw)?;
        self.set(name, value)
    }

    /// Names of required properties that have no value.
    pub fn unresolved(&self) -> Vec<&str> {
        self.items
            .iter()
            .filter(|p| !p.is_resolved())
            .map(|p| p.name.as_str())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Property> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_then_explicit() {
        let mut prop = Property::new("detach", PropertyKind::Bool).with_default(true);
        assert_eq!(prop.source(), PropertySource::Default);
        assert!(prop.as_bool().unwrap());

        prop.set(false).unwrap();
        assert_eq!(prop.source(), PropertySource::Explicit);
        assert!(!prop.as_bool().unwrap());
    }

    #[test]
    fn test_kind_mismatch_is_typed() {
        let mut prop = Property::new("key", PropertyKind::String);
        let err = prop.set(true).unwrap_err();
        assert_eq!(
            err,
            PropertyError::KindMismatch {
                name: "key".to_string(),
                expected: PropertyKind::String,
                found: PropertyKind::Bool,
            }
        );

        prop.set("shell").unwrap();
        assert!(matches!(
            prop.as_bool(),
            Err(PropertyError::KindMismatch { .. })
        ));
    }

    #[test]
    fn test_unresolved_only_lists_required() {
        let props = Properties::new()
            .with(Property::new("key", PropertyKind::String).required())
            .with(Property::new("args", PropertyKind::Strings))
            .with(
                Property::new("project", PropertyKind::String)
                    .required()
                    .with_default("demo"),
            );

        assert_eq!(props.unresolved(), vec!["key"]);
    }

    #[test]
    fn test_parse_assignment() {
        let mut props = Properties::new()
            .with(Property::new("follow", PropertyKind::Bool))
            .with(Property::new("services", PropertyKind::Strings))
            .with(Property::new("tail", PropertyKind::Integer));

        props.parse_assignment("follow=yes").unwrap();
        props.parse_assignment("services=web, db").unwrap();
        props.parse_assignment("tail=20").unwrap();

        assert!(props.require("follow").unwrap().as_bool().unwrap());
        assert_eq!(
            props.require("services").unwrap().as_strings().unwrap(),
            ["web".to_string(), "db".to_string()]
        );
        assert_eq!(props.require("tail").unwrap().as_integer().unwrap(), 20);

        assert!(matches!(
            props.parse_assignment("nope"),
            Err(PropertyError::MalformedAssignment(_))
        ));
        assert!(matches!(
            props.parse_assignment("missing=1"),
            Err(PropertyError::Unknown { .. })
        ));
        assert!(matches!(
            props.parse_assignment("tail=many"),
            Err(PropertyError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_add_replaces_same_name() {
        let mut props = Properties::new().with(Property::new("a", PropertyKind::Bool));
        props.add(Property::new("a", PropertyKind::String));
        assert_eq!(props.len(), 1);
        assert_eq!(props.get("a").unwrap().kind(), PropertyKind::String);
    }
}
