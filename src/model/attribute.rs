//! Attribute declarations and attribute groups

use indexmap::IndexMap;
use serde::Serialize;

/// Attribute use mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeUse {
    /// Attribute is optional (default)
    #[default]
    Optional,
    /// Attribute is required
    Required,
    /// Attribute is prohibited
    Prohibited,
}

impl AttributeUse {
    /// Parse from the `use` attribute value, defaulting to optional
    pub fn parse(s: &str) -> Self {
        match s {
            "required" => AttributeUse::Required,
            "prohibited" => AttributeUse::Prohibited,
            _ => AttributeUse::Optional,
        }
    }

    /// Get the use as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            AttributeUse::Optional => "optional",
            AttributeUse::Required => "required",
            AttributeUse::Prohibited => "prohibited",
        }
    }
}

/// An attribute declared on a complex type or in an attribute group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attribute {
    /// Attribute name (after collision repair, see `orig_name`)
    pub name: String,
    /// Name on the wire when `name` was changed to avoid a collision
    pub orig_name: Option<String>,
    /// Identifier used for the generated member
    pub clean_name: String,
    /// Declared data type, possibly prefixed (`xs:string`)
    pub data_type: String,
    /// Whether the declaration used `ref` instead of `name`
    pub is_reference: bool,
    /// Usage mode
    pub use_mode: AttributeUse,
    /// `default` or `fixed` value
    pub default_value: Option<String>,
    /// Whether `default_value` came from `fixed`
    pub fixed: bool,
    /// Enumerated values of an inline restriction
    pub enumeration_values: Vec<String>,
}

impl Attribute {
    /// Create an attribute with the given name and data type
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            clean_name: crate::names::mapped_name(&name),
            name,
            orig_name: None,
            data_type: data_type.into(),
            is_reference: false,
            use_mode: AttributeUse::Optional,
            default_value: None,
            fixed: false,
            enumeration_values: Vec::new(),
        }
    }

    /// Set the usage mode
    pub fn with_use(mut self, use_mode: AttributeUse) -> Self {
        self.use_mode = use_mode;
        self
    }

    /// Name used in instance documents
    pub fn wire_name(&self) -> &str {
        self.orig_name.as_deref().unwrap_or(&self.name)
    }

    /// Whether the attribute must be present
    pub fn is_required(&self) -> bool {
        self.use_mode == AttributeUse::Required
    }
}

/// A named, reusable set of attributes
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AttributeGroup {
    /// Group name
    pub name: String,
    /// Attributes declared directly in the group
    pub attributes: IndexMap<String, Attribute>,
    /// Names of attribute groups referenced from this group
    pub group_refs: Vec<String>,
    /// Whether the group declares `anyAttribute`
    pub any_attribute: bool,
}

impl AttributeGroup {
    /// Create an empty attribute group
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_use_parse() {
        assert_eq!(AttributeUse::parse("required"), AttributeUse::Required);
        assert_eq!(AttributeUse::parse("optional"), AttributeUse::Optional);
        assert_eq!(AttributeUse::parse("bogus"), AttributeUse::Optional);
        assert_eq!(AttributeUse::Prohibited.as_str(), "prohibited");
    }

    #[test]
    fn test_wire_name_prefers_original() {
        let mut attr = Attribute::new("item", "xs:string");
        assert_eq!(attr.wire_name(), "item");
        attr.orig_name = Some("item".to_string());
        attr.name = "item_attr".to_string();
        assert_eq!(attr.wire_name(), "item");
    }

    #[test]
    fn test_clean_name_is_mapped() {
        let attr = Attribute::new("class", "xs:string").with_use(AttributeUse::Required);
        assert_eq!(attr.clean_name, "class_");
        assert!(attr.is_required());
    }
}
