//! The compilation session
//!
//! A [`Session`] owns the schema tree and every registry built while
//! ingesting and resolving one schema. It is created by the driver, passed by
//! reference through ingestion, resolution and emission, and dropped (or
//! [`reset`](Session::reset)) before the next schema is processed, so no
//! type information leaks between runs.

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use std::collections::HashSet;
use tracing::warn;

use super::attribute::{Attribute, AttributeGroup};
use super::builtins::BuiltinType;
use super::node::{NodeId, SchemaNode, SchemaTree};
use super::simple_type::SimpleType;
use crate::error::Diagnostic;
use crate::limits::Limits;
use crate::names::{split_qname, strip_prefix};

/// Outcome of following a simple-type restriction chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleResolution {
    /// The built-in the chain ends in (string when it does not terminate)
    pub builtin: BuiltinType,
    /// Whether any type in the chain is a list
    pub is_list: bool,
    /// Whether any type in the chain collapses whitespace
    pub collapse_whitespace: bool,
    /// Whether the chain was cut off by the iteration budget
    pub exceeded_budget: bool,
}

/// Everything known about one schema during a generation run
#[derive(Debug, Clone, Default, Serialize)]
pub struct Session {
    /// Node arena; the root is the `<schema>` node
    pub tree: SchemaTree,
    /// Type name → defining node
    pub types: IndexMap<String, NodeId>,
    /// Simple type name → definition
    pub simple_types: IndexMap<String, SimpleType>,
    /// Attribute group name → definition
    pub attribute_groups: IndexMap<String, AttributeGroup>,
    /// Top-level attribute declarations
    pub global_attributes: IndexMap<String, Attribute>,
    /// `<group>` name → definition node
    pub groups: IndexMap<String, NodeId>,
    /// Substitution group head → member element names, in document order
    pub substitution_groups: IndexMap<String, Vec<String>>,
    /// Clark-notation name → top-level node
    pub qualified: IndexMap<String, NodeId>,
    /// Names of nodes that resolved to scalar content
    pub simple_elements: IndexSet<String>,
    /// Prefix the schema uses for the XSD vocabulary (may be empty)
    pub schema_prefix: String,
    /// `targetNamespace` of the schema
    pub target_namespace: Option<String>,
    /// Recoverable problems, in the order found
    pub diagnostics: Vec<Diagnostic>,
    /// Processing limits
    #[serde(skip)]
    pub limits: Limits,
}

impl Session {
    /// Create an empty session with default limits
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty session with the given limits
    pub fn with_limits(limits: Limits) -> Self {
        Self {
            limits,
            ..Self::default()
        }
    }

    /// Forget everything learned from the previous schema
    pub fn reset(&mut self) {
        let limits = std::mem::take(&mut self.limits);
        *self = Self::with_limits(limits);
    }

    /// Record a recoverable problem; repeats of a recorded one are dropped
    pub fn diagnose(&mut self, diagnostic: Diagnostic) {
        if self.diagnostics.contains(&diagnostic) {
            return;
        }
        warn!(component = %diagnostic.component, "{}", diagnostic.message);
        self.diagnostics.push(diagnostic);
    }

    /// The `<schema>` node
    pub fn root(&self) -> Option<NodeId> {
        self.tree.root()
    }

    /// Node registered under a type name
    pub fn type_node(&self, name: &str) -> Option<&SchemaNode> {
        self.types.get(strip_prefix(name)).map(|id| &self.tree[*id])
    }

    /// Whether a (possibly prefixed) type reference names an XSD built-in
    pub fn is_xsd_reference(&self, reference: &str) -> bool {
        let (prefix, local) = split_qname(reference);
        let in_xsd_namespace = match prefix {
            Some(prefix) => prefix == self.schema_prefix,
            None => self.schema_prefix.is_empty(),
        };
        in_xsd_namespace && (BuiltinType::is_builtin(local) || local == super::ANY_TYPE)
    }

    /// Spell a built-in type name with the schema's own prefix
    pub fn xsd_name(&self, local: &str) -> String {
        if self.schema_prefix.is_empty() {
            local.to_string()
        } else {
            format!("{}:{}", self.schema_prefix, local)
        }
    }

    /// Simple type a (possibly prefixed) reference names, unless the
    /// reference is to an XSD built-in
    pub fn simple_type(&self, reference: &str) -> Option<&SimpleType> {
        if self.is_xsd_reference(reference) {
            return None;
        }
        self.simple_types.get(strip_prefix(reference))
    }

    /// Follow a restriction chain down to its built-in.
    ///
    /// At most `limits.max_restriction_chain` simple types are dereferenced;
    /// a longer (or cyclic) chain resolves to the string family.
    pub fn resolve_simple(&self, reference: &str) -> SimpleResolution {
        let mut current = reference.to_string();
        let mut is_list = false;
        let mut collapse_whitespace = false;

        for _ in 0..=self.limits.max_restriction_chain {
            let simple = match self.simple_type(&current) {
                Some(simple) => simple,
                None => {
                    let builtin = BuiltinType::classify(strip_prefix(&current));
                    return SimpleResolution {
                        is_list: is_list || builtin.is_list(),
                        builtin,
                        collapse_whitespace,
                        exceeded_budget: false,
                    };
                }
            };
            is_list |= simple.is_list_type;
            collapse_whitespace |= simple.collapse_whitespace;
            if simple.is_union() || simple.base.is_empty() {
                return SimpleResolution {
                    builtin: BuiltinType::string(),
                    is_list,
                    collapse_whitespace,
                    exceeded_budget: false,
                };
            }
            current = simple.base.clone();
        }

        SimpleResolution {
            builtin: BuiltinType::string(),
            is_list,
            collapse_whitespace,
            exceeded_budget: true,
        }
    }

    /// Element names that may stand in for `head`, transitively, in
    /// registration order
    pub fn substitution_members(&self, head: &str) -> Vec<String> {
        let mut members = Vec::new();
        let mut seen: HashSet<&str> = HashSet::new();
        let mut pending = vec![strip_prefix(head)];
        seen.insert(strip_prefix(head));
        while let Some(current) = pending.pop() {
            let Some(direct) = self.substitution_groups.get(current) else {
                continue;
            };
            for member in direct {
                if seen.insert(member.as_str()) {
                    members.push(member.clone());
                    pending.push(member.as_str());
                }
            }
        }
        members
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_with_chain(links: usize, terminal: &str) -> Session {
        let mut session = Session::new();
        session.schema_prefix = "xs".to_string();
        for i in 0..links {
            let base = if i + 1 == links {
                terminal.to_string()
            } else {
                format!("t{}", i + 1)
            };
            session
                .simple_types
                .insert(format!("t{}", i), SimpleType::new(format!("t{}", i)).with_base(base));
        }
        session
    }

    #[test]
    fn test_resolve_simple_follows_chain() {
        let session = session_with_chain(3, "xs:int");
        let resolved = session.resolve_simple("t0");
        assert_eq!(resolved.builtin.name, "int");
        assert!(!resolved.exceeded_budget);
    }

    #[test]
    fn test_resolve_simple_budget() {
        let limits = Limits::new().with_max_restriction_chain(5);
        let mut session = session_with_chain(6, "xs:int");
        session.limits = limits.clone();
        let resolved = session.resolve_simple("t0");
        assert_eq!(resolved.builtin, BuiltinType::string());
        assert!(resolved.exceeded_budget);

        let mut session = session_with_chain(5, "xs:int");
        session.limits = limits;
        assert_eq!(session.resolve_simple("t0").builtin.name, "int");
    }

    #[test]
    fn test_resolve_simple_self_reference_terminates() {
        let mut session = Session::new();
        session.schema_prefix = "xs".to_string();
        session
            .simple_types
            .insert("loop".to_string(), SimpleType::new("loop").with_base("loop"));
        let resolved = session.resolve_simple("loop");
        assert!(resolved.exceeded_budget);
        assert_eq!(resolved.builtin, BuiltinType::string());
    }

    #[test]
    fn test_is_xsd_reference() {
        let mut session = Session::new();
        session.schema_prefix = "xs".to_string();
        assert!(session.is_xsd_reference("xs:string"));
        assert!(!session.is_xsd_reference("string"));
        assert!(!session.is_xsd_reference("xs:notBuiltin"));
        session.schema_prefix.clear();
        assert!(session.is_xsd_reference("string"));
    }

    #[test]
    fn test_substitution_members_are_transitive() {
        let mut session = Session::new();
        session
            .substitution_groups
            .insert("shape".to_string(), vec!["circle".to_string(), "polygon".to_string()]);
        session
            .substitution_groups
            .insert("polygon".to_string(), vec!["square".to_string()]);
        let members = session.substitution_members("tns:shape");
        assert_eq!(members.len(), 3);
        assert!(members.contains(&"square".to_string()));
    }

    #[test]
    fn test_reset_keeps_limits() {
        let mut session = Session::with_limits(Limits::strict());
        session.simple_types.insert("a".to_string(), SimpleType::new("a"));
        session.reset();
        assert!(session.simple_types.is_empty());
        assert_eq!(session.limits.max_restriction_chain, Limits::strict().max_restriction_chain);
    }
}
