//! Event handler that turns schema markup into the object model

use tracing::{debug, trace};

use super::frames::{Frame, ParticleKind};
use crate::error::{Diagnostic, DiagnosticKind, ParseError, Result};
use crate::model::{
    Attribute, AttributeGroup, AttributeUse, NodeId, NodeKind, SchemaNode, Session, SimpleType,
};
use crate::names::{is_valid_ncname, split_qname, strip_prefix};
use crate::namespaces::{NamespaceContext, QName};

/// Name given to nodes created for `<any>`
pub const ANY_NODE_NAME: &str = "__ANY__";

/// XSD element local names
mod xsd_elements {
    pub const SCHEMA: &str = "schema";
    pub const ELEMENT: &str = "element";
    pub const COMPLEX_TYPE: &str = "complexType";
    pub const SIMPLE_TYPE: &str = "simpleType";
    pub const SIMPLE_CONTENT: &str = "simpleContent";
    pub const COMPLEX_CONTENT: &str = "complexContent";
    pub const SEQUENCE: &str = "sequence";
    pub const CHOICE: &str = "choice";
    pub const ALL: &str = "all";
    pub const GROUP: &str = "group";
    pub const ATTRIBUTE: &str = "attribute";
    pub const ATTRIBUTE_GROUP: &str = "attributeGroup";
    pub const ANY_ATTRIBUTE: &str = "anyAttribute";
    pub const ANY: &str = "any";
    pub const EXTENSION: &str = "extension";
    pub const RESTRICTION: &str = "restriction";
    pub const UNION: &str = "union";
    pub const LIST: &str = "list";
    pub const ENUMERATION: &str = "enumeration";
    pub const WHITE_SPACE: &str = "whiteSpace";
    pub const ANNOTATION: &str = "annotation";
    pub const DOCUMENTATION: &str = "documentation";
    pub const IMPORT: &str = "import";
    pub const INCLUDE: &str = "include";
    pub const REDEFINE: &str = "redefine";
}

/// XSD attribute names
mod xsd_attrs {
    pub const NAME: &str = "name";
    pub const TYPE: &str = "type";
    pub const REF: &str = "ref";
    pub const BASE: &str = "base";
    pub const VALUE: &str = "value";
    pub const MIXED: &str = "mixed";
    pub const ABSTRACT: &str = "abstract";
    pub const DEFAULT: &str = "default";
    pub const FIXED: &str = "fixed";
    pub const USE: &str = "use";
    pub const MIN_OCCURS: &str = "minOccurs";
    pub const MAX_OCCURS: &str = "maxOccurs";
    pub const SUBSTITUTION_GROUP: &str = "substitutionGroup";
    pub const TARGET_NAMESPACE: &str = "targetNamespace";
    pub const ITEM_TYPE: &str = "itemType";
    pub const MEMBER_TYPES: &str = "memberTypes";
    pub const SCHEMA_LOCATION: &str = "schemaLocation";
}

/// Attributes of one start tag, in document order
#[derive(Debug, Clone, Default)]
pub struct TagAttrs(Vec<(String, String)>);

impl TagAttrs {
    /// Create an empty attribute list
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an attribute
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.push((name.into(), value.into()));
    }

    /// Value of the attribute with this exact name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Whether a boolean attribute is set to true
    pub fn flag(&self, name: &str) -> bool {
        matches!(self.get(name), Some("true") | Some("1"))
    }

    /// Iterate over all attributes
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TagAttrs {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Builds the schema tree and registries from start/end/character events.
///
/// The handler is independent of the XML reader feeding it, so any
/// event source can drive it; [`super::ingest_str`] uses quick-xml.
pub struct SchemaHandler<'s> {
    session: &'s mut Session,
    stack: Vec<Frame>,
    namespaces: NamespaceContext,
    /// Prefix bound to the XSD vocabulary, known after the first tag
    prefix: Option<String>,
}

impl<'s> SchemaHandler<'s> {
    /// Create a handler filling the given session
    pub fn new(session: &'s mut Session) -> Self {
        Self {
            session,
            stack: Vec::new(),
            namespaces: NamespaceContext::new(),
            prefix: None,
        }
    }

    /// Handle a start tag
    pub fn start_element(&mut self, raw_name: &str, attrs: &TagAttrs) -> Result<()> {
        if self.prefix.is_none() {
            self.bind_vocabulary(raw_name, attrs)?;
        }
        let Some(tag) = self.vocabulary(raw_name) else {
            self.stack.push(Frame::Ignored);
            return Ok(());
        };
        trace!(tag, depth = self.stack.len(), "start");

        match tag {
            xsd_elements::SCHEMA if self.stack.is_empty() => self.start_schema(attrs),
            xsd_elements::ELEMENT => self.start_node(NodeKind::Element, attrs),
            xsd_elements::COMPLEX_TYPE => self.start_complex_type(attrs),
            xsd_elements::GROUP => {
                let kind = if attrs.get(xsd_attrs::REF).is_some() {
                    NodeKind::GroupRef
                } else {
                    NodeKind::Group
                };
                self.start_node(kind, attrs)
            }
            xsd_elements::ANY => self.start_node(NodeKind::Any, attrs),
            xsd_elements::SEQUENCE => self.start_particle(ParticleKind::Sequence, attrs),
            xsd_elements::CHOICE => self.start_particle(ParticleKind::Choice, attrs),
            xsd_elements::ALL => self.start_particle(ParticleKind::All, attrs),
            xsd_elements::ATTRIBUTE => self.start_attribute(attrs),
            xsd_elements::ATTRIBUTE_GROUP => self.start_attribute_group(attrs),
            xsd_elements::ANY_ATTRIBUTE => {
                self.mark_any_attribute();
                self.stack.push(Frame::Ignored);
            }
            xsd_elements::SIMPLE_TYPE => self.start_simple_type(attrs),
            xsd_elements::SIMPLE_CONTENT => {
                if let Some(id) = self.nearest_node() {
                    self.session.tree[id].has_simple_content = true;
                }
                self.stack.push(Frame::SimpleContent);
            }
            xsd_elements::COMPLEX_CONTENT => {
                if attrs.flag(xsd_attrs::MIXED) {
                    if let Some(id) = self.nearest_node() {
                        self.session.tree[id].is_mixed = true;
                    }
                }
                self.stack.push(Frame::ComplexContent);
            }
            xsd_elements::RESTRICTION => self.start_restriction(attrs),
            xsd_elements::EXTENSION => self.start_extension(attrs),
            xsd_elements::LIST => self.start_list(attrs),
            xsd_elements::UNION => self.start_union(attrs),
            xsd_elements::ENUMERATION => {
                if let Some(value) = attrs.get(xsd_attrs::VALUE) {
                    self.add_enumeration(value);
                }
                self.stack.push(Frame::Ignored);
            }
            xsd_elements::WHITE_SPACE => {
                if attrs.get(xsd_attrs::VALUE) == Some("collapse") {
                    self.mark_collapse_whitespace();
                }
                self.stack.push(Frame::Ignored);
            }
            xsd_elements::ANNOTATION => self.stack.push(Frame::Annotation),
            xsd_elements::DOCUMENTATION => self.stack.push(Frame::Documentation),
            xsd_elements::IMPORT | xsd_elements::INCLUDE | xsd_elements::REDEFINE => {
                let location = attrs.get(xsd_attrs::SCHEMA_LOCATION).unwrap_or("?");
                self.session.diagnose(Diagnostic::note(
                    DiagnosticKind::Unsupported,
                    format!("{}:{}", tag, location),
                    format!("<{}> is not processed during ingestion", tag),
                ));
                self.stack.push(Frame::Ignored);
            }
            _ => self.stack.push(Frame::Ignored),
        }
        Ok(())
    }

    /// Handle an end tag
    pub fn end_element(&mut self) -> Result<()> {
        let frame = self.stack.pop().ok_or_else(|| {
            ParseError::new("unbalanced schema document: end tag without matching start tag")
        })?;

        match frame {
            Frame::Schema(id) => {
                if !self.stack.is_empty() {
                    return Err(ParseError::new(
                        "unbalanced schema document: schema closed inside another element",
                    )
                    .into());
                }
                self.session.tree.set_root(id);
            }
            Frame::Node(id) => {
                let parent = self.nearest_owner().ok_or_else(|| {
                    ParseError::new(format!(
                        "declaration '{}' closed outside of a schema",
                        self.session.tree[id].name
                    ))
                })?;
                self.session.tree.attach(parent, id);
            }
            Frame::Attribute(attr) => self.finish_attribute(attr),
            Frame::AttributeGroup(group) => {
                debug!(group = %group.name, attributes = group.attributes.len(), "attribute group");
                self.session
                    .attribute_groups
                    .insert(group.name.clone(), group);
            }
            Frame::SimpleType(simple) => self.finish_simple_type(simple),
            _ => {}
        }
        Ok(())
    }

    /// Handle character data
    pub fn characters(&mut self, text: &str) {
        if !self.stack.iter().any(|f| matches!(f, Frame::Documentation)) {
            return;
        }
        for frame in self.stack.iter_mut().rev() {
            match frame {
                Frame::Node(id) => {
                    self.session.tree[*id].documentation.push_str(text);
                    return;
                }
                Frame::SimpleType(simple) => {
                    simple.documentation.push_str(text);
                    return;
                }
                Frame::Attribute(_) | Frame::AttributeGroup(_) | Frame::Schema(_) => return,
                _ => {}
            }
        }
    }

    /// Check the document was complete and balanced
    pub fn finish(self) -> Result<()> {
        if !self.stack.is_empty() {
            return Err(ParseError::new(format!(
                "unbalanced schema document: {} element(s) left open",
                self.stack.len()
            ))
            .into());
        }
        if self.session.root().is_none() {
            return Err(ParseError::new("no schema element found").into());
        }
        Ok(())
    }

    // -- vocabulary --------------------------------------------------------

    fn bind_vocabulary(&mut self, raw_name: &str, attrs: &TagAttrs) -> Result<()> {
        for (key, value) in attrs.iter() {
            self.namespaces.declare(key, value);
        }
        let (tag_prefix, local) = split_qname(raw_name);
        let prefix = self
            .namespaces
            .schema_prefix()
            .unwrap_or_else(|| tag_prefix.unwrap_or("").to_string());
        if local != xsd_elements::SCHEMA || tag_prefix.unwrap_or("") != prefix {
            return Err(ParseError::new(format!(
                "expected a schema element, found <{}>",
                raw_name
            ))
            .into());
        }
        debug!(prefix = %prefix, "schema vocabulary bound");
        self.session.schema_prefix = prefix.clone();
        self.prefix = Some(prefix);
        Ok(())
    }

    fn vocabulary<'n>(&self, raw_name: &'n str) -> Option<&'n str> {
        let prefix = self.prefix.as_deref().unwrap_or("");
        let (tag_prefix, local) = split_qname(raw_name);
        (tag_prefix.unwrap_or("") == prefix).then_some(local)
    }

    fn xsd_name(&self, local: &str) -> String {
        self.session.xsd_name(local)
    }

    // -- stack queries -----------------------------------------------------

    fn nearest_node(&self) -> Option<NodeId> {
        self.stack.iter().rev().find_map(|f| match f {
            Frame::Node(id) => Some(*id),
            _ => None,
        })
    }

    fn nearest_owner(&self) -> Option<NodeId> {
        self.stack.iter().rev().find_map(Frame::node)
    }

    fn directly_in_schema(&self) -> bool {
        matches!(self.stack.last(), Some(Frame::Schema(_)))
    }

    fn inside_attribute(&self) -> bool {
        self.stack.iter().any(|f| matches!(f, Frame::Attribute(_)))
    }

    /// Innermost particle between the top of the stack and the nearest node
    fn enclosing_particle(&self) -> Option<&Frame> {
        self.stack
            .iter()
            .rev()
            .take_while(|f| f.node().is_none())
            .find(|f| matches!(f, Frame::Particle { .. }))
    }

    // -- declarations ------------------------------------------------------

    fn start_schema(&mut self, attrs: &TagAttrs) {
        self.session.target_namespace = attrs.get(xsd_attrs::TARGET_NAMESPACE).map(str::to_string);
        let mut node = SchemaNode::new(NodeKind::Schema, "");
        node.namespace = self.session.target_namespace.clone();
        let id = self.session.tree.alloc(node);
        self.stack.push(Frame::Schema(id));
    }

    fn start_complex_type(&mut self, attrs: &TagAttrs) {
        if self.directly_in_schema() || self.nearest_node().is_none() {
            self.start_node(NodeKind::ComplexType, attrs);
            return;
        }
        // An anonymous type describes the element it is nested in.
        if let Some(id) = self.nearest_node() {
            let node = &mut self.session.tree[id];
            node.is_complex = true;
            node.is_mixed |= attrs.flag(xsd_attrs::MIXED);
            node.is_abstract |= attrs.flag(xsd_attrs::ABSTRACT);
        }
        self.stack.push(Frame::InlineComplexType);
    }

    fn start_node(&mut self, kind: NodeKind, attrs: &TagAttrs) {
        let reference = attrs.get(xsd_attrs::REF);
        let name = match kind {
            NodeKind::Any => ANY_NODE_NAME.to_string(),
            _ => attrs
                .get(xsd_attrs::NAME)
                .or(reference.map(strip_prefix))
                .unwrap_or("")
                .to_string(),
        };
        if kind != NodeKind::Any && !name.is_empty() && !is_valid_ncname(&name) {
            self.session.diagnose(Diagnostic::warning(
                DiagnosticKind::InvalidName,
                name.clone(),
                "declared name is not a valid NCName",
            ));
        }

        let mut node = SchemaNode::new(kind, name);
        node.namespace = self.session.target_namespace.clone();
        node.raw_type = attrs.get(xsd_attrs::TYPE).map(str::to_string);
        node.reference = reference.map(str::to_string);
        node.is_top_level = self.directly_in_schema();
        node.is_complex = kind == NodeKind::ComplexType;
        node.is_mixed = attrs.flag(xsd_attrs::MIXED);
        node.is_abstract = attrs.flag(xsd_attrs::ABSTRACT);
        node.default_value = attrs
            .get(xsd_attrs::DEFAULT)
            .or(attrs.get(xsd_attrs::FIXED))
            .map(str::to_string);

        node.min_occurs_raw = attrs.get(xsd_attrs::MIN_OCCURS).map(str::to_string);
        node.max_occurs_raw = attrs.get(xsd_attrs::MAX_OCCURS).map(str::to_string);
        if let Some(Frame::Particle {
            kind: particle,
            min_occurs,
            max_occurs,
        }) = self.enclosing_particle()
        {
            node.in_choice = *particle == ParticleKind::Choice;
            if node.min_occurs_raw.is_none() {
                node.min_occurs_raw = min_occurs.clone();
            }
            if node.max_occurs_raw.is_none() {
                node.max_occurs_raw = max_occurs.clone();
            }
        }

        if let Some(head) = attrs.get(xsd_attrs::SUBSTITUTION_GROUP) {
            node.substitution_group = Some(strip_prefix(head).to_string());
            if !node.name.is_empty() {
                self.session
                    .substitution_groups
                    .entry(strip_prefix(head).to_string())
                    .or_default()
                    .push(node.name.clone());
            }
        }

        let top_level = node.is_top_level;
        let qualified = QName::new(node.namespace.clone(), node.name.clone()).clark();
        let group_name = (kind == NodeKind::Group).then(|| node.name.clone());
        let id = self.session.tree.alloc(node);
        if top_level {
            self.session.qualified.insert(qualified, id);
            if let Some(group_name) = group_name {
                self.session.groups.insert(group_name, id);
            }
        }
        self.stack.push(Frame::Node(id));
    }

    fn start_particle(&mut self, kind: ParticleKind, attrs: &TagAttrs) {
        let (outer_min, outer_max) = match self.enclosing_particle() {
            Some(Frame::Particle {
                min_occurs,
                max_occurs,
                ..
            }) => (min_occurs.clone(), max_occurs.clone()),
            _ => (None, None),
        };
        self.stack.push(Frame::Particle {
            kind,
            min_occurs: attrs
                .get(xsd_attrs::MIN_OCCURS)
                .map(str::to_string)
                .or(outer_min),
            max_occurs: attrs
                .get(xsd_attrs::MAX_OCCURS)
                .map(str::to_string)
                .or(outer_max),
        });
    }

    fn start_attribute(&mut self, attrs: &TagAttrs) {
        let reference = attrs.get(xsd_attrs::REF);
        let name = match (attrs.get(xsd_attrs::NAME), reference) {
            (Some(name), _) => name.to_string(),
            // xml:lang and friends keep their prefix on the wire
            (None, Some(r)) if r.starts_with("xml:") => r.to_string(),
            (None, Some(r)) => strip_prefix(r).to_string(),
            (None, None) => String::new(),
        };
        let mut attr = Attribute::new(name, attrs.get(xsd_attrs::TYPE).unwrap_or(""));
        attr.is_reference = reference.is_some();
        attr.use_mode = attrs
            .get(xsd_attrs::USE)
            .map(AttributeUse::parse)
            .unwrap_or_default();
        if let Some(default) = attrs.get(xsd_attrs::DEFAULT) {
            attr.default_value = Some(default.to_string());
        } else if let Some(fixed) = attrs.get(xsd_attrs::FIXED) {
            attr.default_value = Some(fixed.to_string());
            attr.fixed = true;
        }
        self.stack.push(Frame::Attribute(attr));
    }

    fn finish_attribute(&mut self, mut attr: Attribute) {
        if attr.data_type.is_empty() && !attr.is_reference {
            attr.data_type = self.xsd_name("string");
        }
        for frame in self.stack.iter_mut().rev() {
            match frame {
                Frame::AttributeGroup(group) => {
                    group.attributes.insert(attr.name.clone(), attr);
                    return;
                }
                Frame::Node(id) => {
                    self.session.tree[*id]
                        .attribute_definitions
                        .insert(attr.name.clone(), attr);
                    return;
                }
                Frame::Schema(_) => {
                    self.session
                        .global_attributes
                        .insert(attr.name.clone(), attr);
                    return;
                }
                _ => {}
            }
        }
    }

    fn start_attribute_group(&mut self, attrs: &TagAttrs) {
        if let Some(reference) = attrs.get(xsd_attrs::REF) {
            let reference = strip_prefix(reference).to_string();
            for frame in self.stack.iter_mut().rev() {
                match frame {
                    Frame::AttributeGroup(group) => {
                        group.group_refs.push(reference);
                        break;
                    }
                    Frame::Node(id) => {
                        self.session.tree[*id].attribute_group_refs.push(reference);
                        break;
                    }
                    Frame::Schema(_) => break,
                    _ => {}
                }
            }
            self.stack.push(Frame::Ignored);
        } else {
            let name = attrs.get(xsd_attrs::NAME).unwrap_or("");
            self.stack
                .push(Frame::AttributeGroup(AttributeGroup::new(name)));
        }
    }

    fn mark_any_attribute(&mut self) {
        for frame in self.stack.iter_mut().rev() {
            match frame {
                Frame::AttributeGroup(group) => {
                    group.any_attribute = true;
                    return;
                }
                Frame::Node(id) => {
                    self.session.tree[*id].any_attribute = true;
                    return;
                }
                _ => {}
            }
        }
    }

    // -- simple types ------------------------------------------------------

    fn start_simple_type(&mut self, attrs: &TagAttrs) {
        if self.inside_attribute() {
            self.stack.push(Frame::AttributeSimpleType);
            return;
        }
        if let Some(Frame::Node(id)) = self.stack.last() {
            self.session.tree[*id].is_simple_typed = true;
        }
        let name = attrs.get(xsd_attrs::NAME).unwrap_or("");
        self.stack.push(Frame::SimpleType(SimpleType::new(name)));
    }

    fn finish_simple_type(&mut self, simple: SimpleType) {
        if !simple.is_anonymous() {
            debug!(simple_type = %simple.name, base = %simple.base, "simple type");
            self.session
                .simple_types
                .insert(simple.name.clone(), simple);
            return;
        }

        let string_type = self.xsd_name("string");
        // The anonymous type's content belongs to whatever encloses it.
        for frame in self.stack.iter_mut().rev() {
            match frame {
                Frame::SimpleType(parent) => {
                    if !parent.union_members.is_empty() || simple.is_union() {
                        parent
                            .union_members
                            .push(if simple.base.is_empty() { string_type } else { simple.base });
                    } else if parent.base.is_empty() {
                        parent.base = simple.base;
                        parent.is_list_type |= simple.is_list_type;
                    }
                    parent.collapse_whitespace |= simple.collapse_whitespace;
                    return;
                }
                Frame::Node(id) => {
                    let node = &mut self.session.tree[*id];
                    if node.raw_type.is_none() {
                        node.raw_type = Some(if simple.is_union() || simple.base.is_empty() {
                            string_type
                        } else {
                            simple.base
                        });
                    }
                    for value in &simple.enumeration_values {
                        node.add_enumeration(value);
                    }
                    node.is_list_type |= simple.is_list_type;
                    node.collapse_whitespace |= simple.collapse_whitespace;
                    return;
                }
                Frame::Schema(_) => return,
                _ => {}
            }
        }
    }

    fn start_restriction(&mut self, attrs: &TagAttrs) {
        if let Some(base) = attrs.get(xsd_attrs::BASE).map(str::to_string) {
            match self.stack.last() {
                Some(Frame::AttributeSimpleType) => self.set_attribute_type(base),
                Some(Frame::SimpleContent) => self.set_content_base(base),
                Some(Frame::SimpleType(_)) => {
                    if let Some(Frame::SimpleType(simple)) = self.stack.last_mut() {
                        simple.base = base;
                    }
                }
                _ => {
                    if let Some(id) = self.nearest_node() {
                        self.session.tree[id].restriction_base = Some(base);
                    }
                }
            }
        }
        self.stack.push(Frame::Restriction);
    }

    fn start_extension(&mut self, attrs: &TagAttrs) {
        if let Some(base) = attrs.get(xsd_attrs::BASE) {
            self.set_content_base(base.to_string());
        }
        self.stack.push(Frame::Extension);
    }

    /// A built-in base feeds the node's value type; anything else is a
    /// structural parent
    fn set_content_base(&mut self, base: String) {
        let Some(id) = self.nearest_node() else {
            return;
        };
        let is_builtin = self.session.is_xsd_reference(&base);
        let node = &mut self.session.tree[id];
        if is_builtin {
            node.add_simple_base(strip_prefix(&base));
        } else {
            node.base = Some(base);
        }
    }

    fn set_attribute_type(&mut self, data_type: String) {
        for frame in self.stack.iter_mut().rev() {
            if let Frame::Attribute(attr) = frame {
                attr.data_type = data_type;
                return;
            }
        }
    }

    fn start_list(&mut self, attrs: &TagAttrs) {
        let item_type = attrs.get(xsd_attrs::ITEM_TYPE).map(str::to_string);
        if matches!(self.stack.last(), Some(Frame::AttributeSimpleType)) {
            if let Some(item_type) = item_type {
                self.set_attribute_type(item_type);
            }
        } else if let Some(Frame::SimpleType(simple)) = self.stack.last_mut() {
            simple.is_list_type = true;
            if let Some(item_type) = item_type {
                simple.base = item_type;
            }
        }
        self.stack.push(Frame::List);
    }

    fn start_union(&mut self, attrs: &TagAttrs) {
        let members: Vec<String> = attrs
            .get(xsd_attrs::MEMBER_TYPES)
            .map(|m| m.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default();
        let string_type = self.xsd_name("string");
        if matches!(self.stack.last(), Some(Frame::AttributeSimpleType)) {
            self.set_attribute_type(string_type);
        } else if let Some(Frame::SimpleType(simple)) = self.stack.last_mut() {
            simple.union_members.extend(members);
            if simple.union_members.is_empty() {
                // Inline members arrive later; keep the union recognizable.
                simple.union_members.push(string_type);
            }
        }
        self.stack.push(Frame::Union);
    }

    fn add_enumeration(&mut self, value: &str) {
        for frame in self.stack.iter_mut().rev() {
            match frame {
                Frame::Attribute(attr) => {
                    attr.enumeration_values.push(value.to_string());
                    return;
                }
                Frame::SimpleType(simple) => {
                    simple.enumeration_values.push(value.to_string());
                    return;
                }
                Frame::Node(id) => {
                    self.session.tree[*id].add_enumeration(value);
                    return;
                }
                _ => {}
            }
        }
    }

    fn mark_collapse_whitespace(&mut self) {
        for frame in self.stack.iter_mut().rev() {
            match frame {
                Frame::Attribute(_) => return,
                Frame::SimpleType(simple) => {
                    simple.collapse_whitespace = true;
                    return;
                }
                Frame::Node(id) => {
                    self.session.tree[*id].collapse_whitespace = true;
                    return;
                }
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn attrs(pairs: &[(&str, &str)]) -> TagAttrs {
        pairs.iter().copied().collect()
    }

    fn open_schema(handler: &mut SchemaHandler<'_>) {
        handler
            .start_element(
                "xs:schema",
                &attrs(&[("xmlns:xs", "http://www.w3.org/2001/XMLSchema")]),
            )
            .unwrap();
    }

    #[test]
    fn test_binds_prefix_from_declarations() {
        let mut session = Session::new();
        let mut handler = SchemaHandler::new(&mut session);
        handler
            .start_element(
                "xsd:schema",
                &attrs(&[("xmlns:xsd", "http://www.w3.org/2001/XMLSchema")]),
            )
            .unwrap();
        handler.end_element().unwrap();
        handler.finish().unwrap();
        assert_eq!(session.schema_prefix, "xsd");
    }

    #[test]
    fn test_rejects_non_schema_root() {
        let mut session = Session::new();
        let mut handler = SchemaHandler::new(&mut session);
        let err = handler
            .start_element("html", &attrs(&[]))
            .unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn test_unbalanced_close_fails() {
        let mut session = Session::new();
        let mut handler = SchemaHandler::new(&mut session);
        open_schema(&mut handler);
        handler.end_element().unwrap();
        assert!(handler.end_element().is_err());
    }

    #[test]
    fn test_unclosed_element_fails_at_finish() {
        let mut session = Session::new();
        let mut handler = SchemaHandler::new(&mut session);
        open_schema(&mut handler);
        handler
            .start_element("xs:element", &attrs(&[("name", "a")]))
            .unwrap();
        assert!(handler.finish().is_err());
    }

    #[test]
    fn test_sequence_bounds_are_inherited() {
        let mut session = Session::new();
        let mut handler = SchemaHandler::new(&mut session);
        open_schema(&mut handler);
        handler
            .start_element("xs:complexType", &attrs(&[("name", "list")]))
            .unwrap();
        handler
            .start_element("xs:sequence", &attrs(&[("maxOccurs", "unbounded")]))
            .unwrap();
        handler
            .start_element("xs:element", &attrs(&[("name", "entry"), ("type", "xs:string")]))
            .unwrap();
        for _ in 0..4 {
            handler.end_element().unwrap();
        }
        handler.finish().unwrap();

        let entry = session.tree.preorder()[2];
        assert_eq!(session.tree[entry].name, "entry");
        assert_eq!(session.tree[entry].max_occurs_raw.as_deref(), Some("unbounded"));
    }

    #[test]
    fn test_documentation_accumulates_verbatim() {
        let mut session = Session::new();
        let mut handler = SchemaHandler::new(&mut session);
        open_schema(&mut handler);
        handler
            .start_element("xs:element", &attrs(&[("name", "doc")]))
            .unwrap();
        handler.start_element("xs:annotation", &attrs(&[])).unwrap();
        handler.start_element("xs:documentation", &attrs(&[])).unwrap();
        handler.characters("  first line\n");
        handler.characters("second  ");
        for _ in 0..4 {
            handler.end_element().unwrap();
        }
        let doc = session.tree.preorder()[1];
        assert_eq!(session.tree[doc].documentation, "  first line\nsecond  ");
    }
}
