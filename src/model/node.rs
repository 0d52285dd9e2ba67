//! Schema nodes and the arena that owns them
//!
//! Every `<element>`, named `<complexType>`, `<group>` definition or
//! reference and `<any>` wildcard becomes one [`SchemaNode`]. Nodes live in
//! a [`SchemaTree`] arena and refer to their children by [`NodeId`]; each
//! child id appears under exactly one parent. The global registries on the
//! session refer into the same arena, which is what lets the resolution
//! passes mutate a node in place while looking up others by name.

use indexmap::IndexMap;
use serde::Serialize;
use std::ops::{Index, IndexMut};

use super::attribute::Attribute;
use super::builtins::BuiltinType;

/// Sentinel used for `maxOccurs="unbounded"`
pub const UNBOUNDED: usize = 999_999;

/// Index of a node in its [`SchemaTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(usize);

impl NodeId {
    /// Position in the arena
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Which schema construct produced a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeKind {
    /// The `<schema>` root
    Schema,
    /// `<element>`
    Element,
    /// Named, top-level `<complexType>`
    ComplexType,
    /// `<group name=...>` definition
    Group,
    /// `<group ref=...>` use
    GroupRef,
    /// `<any>` wildcard
    Any,
}

/// Result of type resolution
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "kind", content = "type", rename_all = "lowercase")]
pub enum ResolvedType {
    /// Resolution has not run yet
    #[default]
    Unresolved,
    /// Wildcard content (`<any>`, `xs:anyType`), treated opaquely
    Any,
    /// A built-in scalar
    Simple(BuiltinType),
    /// A structural type, by registry name
    Complex(String),
}

impl ResolvedType {
    /// Whether resolution produced a structural type
    pub fn is_complex(&self) -> bool {
        matches!(self, ResolvedType::Complex(_))
    }

    /// The built-in scalar, if any
    pub fn builtin(&self) -> Option<&BuiltinType> {
        match self {
            ResolvedType::Simple(b) => Some(b),
            _ => None,
        }
    }

    /// The structural type name, if any
    pub fn complex_name(&self) -> Option<&str> {
        match self {
            ResolvedType::Complex(name) => Some(name),
            _ => None,
        }
    }
}

/// One element, complex type or group in the schema tree
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaNode {
    /// Construct that produced the node
    pub kind: NodeKind,
    /// Declared name (or the local part of `ref`)
    pub name: String,
    /// Target namespace of the declaring schema
    pub namespace: Option<String>,
    /// `type` attribute as written
    pub raw_type: Option<String>,
    /// `ref` attribute as written
    pub reference: Option<String>,
    /// Outcome of type resolution
    pub resolved_type: ResolvedType,
    /// Identifier-safe name for generated members
    pub clean_name: String,
    /// `minOccurs` as written (or inherited from an enclosing particle)
    pub min_occurs_raw: Option<String>,
    /// `maxOccurs` as written (or inherited from an enclosing particle)
    pub max_occurs_raw: Option<String>,
    /// Normalized lower bound
    pub min_occurs: usize,
    /// Normalized upper bound, [`UNBOUNDED`] for "unbounded"
    pub max_occurs: usize,
    /// Whether the node may be absent
    pub optional: bool,
    /// Whether the node has structural content
    pub is_complex: bool,
    /// `mixed="true"`
    pub is_mixed: bool,
    /// `abstract="true"`
    pub is_abstract: bool,
    /// Declared directly under `<schema>`
    pub is_top_level: bool,
    /// Content model is `<simpleContent>`
    pub has_simple_content: bool,
    /// Content is given by an inline `<simpleType>`
    pub is_simple_typed: bool,
    /// Values are whitespace separated lists
    pub is_list_type: bool,
    /// Declared inside a `<choice>`
    pub in_choice: bool,
    /// Structural base type (extension)
    pub base: Option<String>,
    /// Base of a `complexContent` restriction
    pub restriction_base: Option<String>,
    /// Children in document order
    pub children: Vec<NodeId>,
    /// Attributes, keyed by name
    pub attribute_definitions: IndexMap<String, Attribute>,
    /// Referenced attribute groups, inlined during annotation
    pub attribute_group_refs: Vec<String>,
    /// Declares `anyAttribute`
    pub any_attribute: bool,
    /// Enumerated values of a simple content restriction
    pub enumeration_values: Vec<String>,
    /// Simple types this node's value derives from, nearest first
    pub simple_base_chain: Vec<String>,
    /// Text of `<annotation><documentation>`
    pub documentation: String,
    /// Whitespace in values collapses
    pub collapse_whitespace: bool,
    /// `default` or `fixed` value of an element
    pub default_value: Option<String>,
    /// Head element named in `substitutionGroup`
    pub substitution_group: Option<String>,
    /// At least one other type extends this one
    pub has_subtypes: bool,
    /// Mixed-content flag disagrees with a base or derived type
    pub mixed_conflict: bool,
    /// Group reference kept in the tree because it cannot be expanded
    pub unexpandable: bool,
}

impl SchemaNode {
    /// Create a node of the given kind and name
    pub fn new(kind: NodeKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            namespace: None,
            raw_type: None,
            reference: None,
            resolved_type: ResolvedType::Unresolved,
            clean_name: String::new(),
            min_occurs_raw: None,
            max_occurs_raw: None,
            min_occurs: 1,
            max_occurs: 1,
            optional: false,
            is_complex: false,
            is_mixed: false,
            is_abstract: false,
            is_top_level: false,
            has_simple_content: false,
            is_simple_typed: false,
            is_list_type: false,
            in_choice: false,
            base: None,
            restriction_base: None,
            children: Vec::new(),
            attribute_definitions: IndexMap::new(),
            attribute_group_refs: Vec::new(),
            any_attribute: false,
            enumeration_values: Vec::new(),
            simple_base_chain: Vec::new(),
            documentation: String::new(),
            collapse_whitespace: false,
            default_value: None,
            substitution_group: None,
            has_subtypes: false,
            mixed_conflict: false,
            unexpandable: false,
        }
    }

    /// Whether the node may occur more than once
    pub fn is_repeated(&self) -> bool {
        self.max_occurs > 1
    }

    /// Name of a referenced `<group>`, for group-reference nodes
    pub fn group_ref(&self) -> Option<&str> {
        match self.kind {
            NodeKind::GroupRef => self.reference.as_deref().map(crate::names::strip_prefix),
            _ => None,
        }
    }

    /// The type name this node points at: `type`, else `ref`, else its name
    pub fn own_type_name(&self) -> &str {
        self.raw_type
            .as_deref()
            .or(self.reference.as_deref())
            .map(crate::names::strip_prefix)
            .unwrap_or(&self.name)
    }

    /// Like [`own_type_name`](Self::own_type_name), keeping any prefix
    pub fn own_type_name_raw(&self) -> &str {
        self.raw_type
            .as_deref()
            .or(self.reference.as_deref())
            .unwrap_or(&self.name)
    }

    /// Whether the node carries information of its own beyond a reference
    pub fn is_defining(&self) -> bool {
        self.is_top_level
            || !self.children.is_empty()
            || !self.attribute_definitions.is_empty()
            || !self.attribute_group_refs.is_empty()
            || self.base.is_some()
    }

    /// Append an enumeration value unless already present
    pub fn add_enumeration(&mut self, value: &str) {
        if !self.enumeration_values.iter().any(|v| v == value) {
            self.enumeration_values.push(value.to_string());
        }
    }

    /// Append to the simple-base chain unless already present
    pub fn add_simple_base(&mut self, name: &str) {
        if !self.simple_base_chain.iter().any(|b| b == name) {
            self.simple_base_chain.push(name.to_string());
        }
    }
}

/// Arena owning every node of one schema
#[derive(Debug, Clone, Default, Serialize)]
pub struct SchemaTree {
    nodes: Vec<SchemaNode>,
    root: Option<NodeId>,
}

impl SchemaTree {
    /// Create an empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a detached node to the arena
    pub fn alloc(&mut self, node: SchemaNode) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    /// Append `child` to the children of `parent`
    pub fn attach(&mut self, parent: NodeId, child: NodeId) {
        self[parent].children.push(child);
    }

    /// The `<schema>` node, once ingestion has finished
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Set the root node
    pub fn set_root(&mut self, root: NodeId) {
        self.root = Some(root);
    }

    /// Number of nodes in the arena
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the arena is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Copy a node and all of its descendants; the copy is detached
    pub fn clone_subtree(&mut self, id: NodeId) -> NodeId {
        let mut copy = self[id].clone();
        let children = std::mem::take(&mut copy.children);
        let new_id = self.alloc(copy);
        for child in children {
            let child_copy = self.clone_subtree(child);
            self.attach(new_id, child_copy);
        }
        new_id
    }

    /// All nodes reachable from the root, parents before children, in
    /// document order
    pub fn preorder(&self) -> Vec<NodeId> {
        match self.root {
            Some(root) => self.preorder_from(root),
            None => Vec::new(),
        }
    }

    /// All nodes reachable from `start`, parents before children
    pub fn preorder_from(&self, start: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self[id].children.iter().rev().copied());
        }
        order
    }
}

impl Index<NodeId> for SchemaTree {
    type Output = SchemaNode;

    fn index(&self, id: NodeId) -> &SchemaNode {
        &self.nodes[id.0]
    }
}

impl IndexMut<NodeId> for SchemaTree {
    fn index_mut(&mut self, id: NodeId) -> &mut SchemaNode {
        &mut self.nodes[id.0]
    }
}
