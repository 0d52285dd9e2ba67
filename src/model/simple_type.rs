//! Simple type definitions (restrictions, lists and unions)

use serde::Serialize;

/// A schema-level scalar type definition
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SimpleType {
    /// Type name; empty for anonymous inline types
    pub name: String,
    /// Restriction base, or list item type, possibly prefixed
    pub base: String,
    /// Whether the type is a `<list>`
    pub is_list_type: bool,
    /// Member types of a `<union>`
    pub union_members: Vec<String>,
    /// Enumerated values
    pub enumeration_values: Vec<String>,
    /// Whether a `whiteSpace value="collapse"` facet applies
    pub collapse_whitespace: bool,
    /// Text of `<annotation><documentation>`
    pub documentation: String,
}

impl SimpleType {
    /// Create a simple type with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set the restriction base
    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.base = base.into();
        self
    }

    /// Whether the type is a union
    pub fn is_union(&self) -> bool {
        !self.union_members.is_empty()
    }

    /// Whether the type is anonymous
    pub fn is_anonymous(&self) -> bool {
        self.name.is_empty()
    }
}
