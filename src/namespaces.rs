//! XML namespace handling
//!
//! The ingestion engine needs to know which prefix a schema document uses
//! for the XSD vocabulary itself (`xs:`, `xsd:`, or none). That is decided
//! once, from the namespace declarations on the root element.

use serde::Serialize;
use std::collections::HashMap;

/// XSD 1.0 namespace
pub const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

/// XSD 1.1 namespace (pre-recommendation drafts)
pub const XSD_1_1_NAMESPACE: &str = "http://www.w3.org/2009/XMLSchema";

/// Qualified name (QName) - combination of namespace and local name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct QName {
    /// Namespace URI (None for no namespace)
    pub namespace: Option<String>,
    /// Local name
    pub local_name: String,
}

impl QName {
    /// Create a new QName
    pub fn new(namespace: Option<impl Into<String>>, local_name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.map(|s| s.into()),
            local_name: local_name.into(),
        }
    }

    /// Get the fully qualified name in Clark notation
    pub fn clark(&self) -> String {
        match &self.namespace {
            Some(ns) => format!("{{{}}}{}", ns, self.local_name),
            None => self.local_name.clone(),
        }
    }
}

/// Namespace context for resolving prefixes
#[derive(Debug, Clone, Default)]
pub struct NamespaceContext {
    /// Mapping from prefix to namespace URI
    prefixes: HashMap<String, String>,
    /// Default namespace (no prefix)
    default_namespace: Option<String>,
}

impl NamespaceContext {
    /// Create a new empty namespace context
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an `xmlns` or `xmlns:p` declaration
    pub fn declare(&mut self, attribute: &str, namespace: &str) -> bool {
        if attribute == "xmlns" {
            self.default_namespace = Some(namespace.to_string());
            true
        } else if let Some(prefix) = attribute.strip_prefix("xmlns:") {
            self.prefixes.insert(prefix.to_string(), namespace.to_string());
            true
        } else {
            false
        }
    }

    /// The prefix bound to the XSD namespace.
    ///
    /// `Some("")` means the XSD namespace is the default namespace; `None`
    /// means no declaration binds it.
    pub fn schema_prefix(&self) -> Option<String> {
        let is_xsd = |ns: &str| ns == XSD_NAMESPACE || ns == XSD_1_1_NAMESPACE;
        let mut bound: Vec<&String> = self
            .prefixes
            .iter()
            .filter(|(_, ns)| is_xsd(ns))
            .map(|(prefix, _)| prefix)
            .collect();
        bound.sort();
        if let Some(prefix) = bound.first() {
            return Some((*prefix).clone());
        }
        match self.default_namespace.as_deref() {
            Some(ns) if is_xsd(ns) => Some(String::new()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qname_clark() {
        let qname = QName::new(Some("http://example.com"), "element");
        assert_eq!(qname.clark(), "{http://example.com}element");
        assert_eq!(QName::new(None::<String>, "element").clark(), "element");
    }

    #[test]
    fn test_schema_prefix_detection() {
        let mut ctx = NamespaceContext::new();
        assert!(ctx.declare("xmlns:xsd", XSD_NAMESPACE));
        assert!(ctx.declare("xmlns:tns", "http://example.com"));
        assert!(!ctx.declare("targetNamespace", "http://example.com"));
        assert_eq!(ctx.schema_prefix(), Some("xsd".to_string()));
    }

    #[test]
    fn test_schema_prefix_default_namespace() {
        let mut ctx = NamespaceContext::new();
        ctx.declare("xmlns", XSD_NAMESPACE);
        assert_eq!(ctx.schema_prefix(), Some(String::new()));

        let empty = NamespaceContext::new();
        assert_eq!(empty.schema_prefix(), None);
    }
}
