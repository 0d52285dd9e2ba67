//! Generator configuration
//!
//! Options are plain values handed to the generator; the CLI fills them from
//! flags or from a JSON file.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};
use crate::names::capitalize;

/// Accessor naming convention
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GetterSetter {
    /// `get_item`, `set_item`, `add_item`, `insert_item_at`, `replace_item_at`
    #[default]
    New,
    /// `getItem`, `setItem`, `addItem`, `insertItemAt`, `replaceItemAt`
    Old,
}

impl GetterSetter {
    /// Name of an accessor for `member`; `verb` is `get`, `set`, `add`,
    /// `insert` or `replace`
    pub fn accessor(&self, verb: &str, member: &str) -> String {
        let at = matches!(verb, "insert" | "replace");
        match self {
            GetterSetter::New if at => format!("{}_{}_at", verb, member),
            GetterSetter::New => format!("{}_{}", verb, member),
            GetterSetter::Old if at => format!("{}{}At", verb, capitalize(member)),
            GetterSetter::Old => format!("{}{}", verb, capitalize(member)),
        }
    }
}

/// How member specifications are emitted on each class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberSpecs {
    /// No member specifications
    #[default]
    Off,
    /// `member_data_items_ = [MemberSpec_(...), ...]`
    List,
    /// `member_data_items_ = {'name': MemberSpec_(...), ...}`
    Dict,
}

/// Which serialization methods are generated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportModes {
    /// `export` to an XML text stream
    pub write: bool,
    /// `exportLiteral` to source text
    pub literal: bool,
    /// `to_etree` into an element tree
    pub etree: bool,
}

impl Default for ExportModes {
    fn default() -> Self {
        Self {
            write: true,
            literal: true,
            etree: false,
        }
    }
}

impl ExportModes {
    /// Parse a space separated list such as `"write etree"`
    pub fn parse(spec: &str) -> Result<Self> {
        let mut modes = Self {
            write: false,
            literal: false,
            etree: false,
        };
        for word in spec.split(|c: char| c.is_whitespace() || c == ',') {
            match word {
                "" => {}
                "write" => modes.write = true,
                "literal" => modes.literal = true,
                "etree" => modes.etree = true,
                other => {
                    return Err(Error::InvalidOption(format!(
                        "unknown export mode '{}' (expected write, literal or etree)",
                        other
                    )))
                }
            }
        }
        Ok(modes)
    }
}

/// Options of one generation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorOptions {
    /// Prefix prepended to every generated class name
    pub prefix: String,
    /// Accessor naming convention
    pub getter_setter: GetterSetter,
    /// Member specification mode
    pub member_specs: MemberSpecs,
    /// Suffix of the classes in the subclass module
    pub subclass_suffix: String,
    /// Serialization methods to generate
    pub export: ExportModes,
    /// Module name the subclass module imports the generated classes from
    pub super_module: String,
    /// Tag used for the root element when parsing an unknown root
    pub root_element: Option<String>,
    /// Namespace declaration written on exported root elements
    pub namespace_def: Option<String>,
    /// Whether to produce the subclass module
    pub emit_subclasses: bool,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            getter_setter: GetterSetter::New,
            member_specs: MemberSpecs::Off,
            subclass_suffix: "Sub".to_string(),
            export: ExportModes::default(),
            super_module: "generated".to_string(),
            root_element: None,
            namespace_def: None,
            emit_subclasses: false,
        }
    }
}

impl GeneratorOptions {
    /// Create default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Load options from a JSON file; missing fields take their defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::Resource(format!(
                "Failed to read options '{}': {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_json(&text)
    }

    /// Parse options from JSON text
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Set the class name prefix
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Set the accessor naming convention
    pub fn with_getter_setter(mut self, style: GetterSetter) -> Self {
        self.getter_setter = style;
        self
    }

    /// Set the member specification mode
    pub fn with_member_specs(mut self, mode: MemberSpecs) -> Self {
        self.member_specs = mode;
        self
    }

    /// Set the subclass suffix
    pub fn with_subclass_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.subclass_suffix = suffix.into();
        self
    }

    /// Set the serialization modes
    pub fn with_export(mut self, export: ExportModes) -> Self {
        self.export = export;
        self
    }

    /// Produce the subclass module, importing from `super_module`
    pub fn with_subclasses(mut self, super_module: impl Into<String>) -> Self {
        self.emit_subclasses = true;
        self.super_module = super_module.into();
        self
    }

    /// Set the fallback root element tag
    pub fn with_root_element(mut self, root: impl Into<String>) -> Self {
        self.root_element = Some(root.into());
        self
    }

    /// Set the namespace declaration for exported roots
    pub fn with_namespace_def(mut self, namespace_def: impl Into<String>) -> Self {
        self.namespace_def = Some(namespace_def.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessor_styles() {
        let new = GetterSetter::New;
        assert_eq!(new.accessor("get", "item"), "get_item");
        assert_eq!(new.accessor("insert", "item"), "insert_item_at");
        let old = GetterSetter::Old;
        assert_eq!(old.accessor("set", "item"), "setItem");
        assert_eq!(old.accessor("replace", "item"), "replaceItemAt");
    }

    #[test]
    fn test_export_modes_parse() {
        let modes = ExportModes::parse("write etree").unwrap();
        assert!(modes.write && modes.etree && !modes.literal);
        assert!(ExportModes::parse("write,literal").unwrap().literal);
        assert!(ExportModes::parse("yaml").is_err());
    }

    #[test]
    fn test_options_from_partial_json() {
        let options = GeneratorOptions::from_json(
            r#"{"prefix": "po_", "member_specs": "dict", "export": {"etree": true}}"#,
        )
        .unwrap();
        assert_eq!(options.prefix, "po_");
        assert_eq!(options.member_specs, MemberSpecs::Dict);
        assert!(options.export.write && options.export.etree);
        assert_eq!(options.subclass_suffix, "Sub");
    }

    #[test]
    fn test_builder() {
        let options = GeneratorOptions::new()
            .with_prefix("x")
            .with_subclasses("po")
            .with_getter_setter(GetterSetter::Old);
        assert!(options.emit_subclasses);
        assert_eq!(options.super_module, "po");
        assert_eq!(options.getter_setter, GetterSetter::Old);
    }
}
