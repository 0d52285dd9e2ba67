//! Tree annotation
//!
//! Normalizes each node for emission: identifier names, base references,
//! inlined attribute groups, referenced global attributes and integer
//! occurrence bounds.

use std::collections::HashSet;

use indexmap::IndexMap;
use tracing::trace;

use crate::error::{Diagnostic, DiagnosticKind, Error, Result};
use crate::model::{Attribute, NodeId, NodeKind, Session, UNBOUNDED};
use crate::names::{mapped_name, strip_prefix};

/// Member name used for the contents of `<any>` wildcards
pub const ANY_MEMBER_NAME: &str = "anytypeobjs_";

/// Annotate every node, parents before children
pub fn annotate_tree(session: &mut Session) -> Result<()> {
    for id in session.tree.preorder() {
        if session.tree[id].kind == NodeKind::Schema {
            continue;
        }
        annotate_base(session, id);
        annotate_names(session, id);
        inline_attribute_groups(session, id);
        resolve_attribute_references(session, id);
        annotate_occurrence(session, id)?;
        annotate_whitespace(session, id);
    }
    Ok(())
}

fn annotate_base(session: &mut Session, id: NodeId) {
    let node = &session.tree[id];
    let base = match (&node.base, &node.restriction_base) {
        (Some(base), _) => base.clone(),
        (None, Some(restriction)) if session.types.contains_key(strip_prefix(restriction)) => {
            restriction.clone()
        }
        _ => return,
    };

    let scalar = session.is_xsd_reference(&base) || session.simple_type(&base).is_some();
    let node = &mut session.tree[id];
    if scalar {
        node.add_simple_base(strip_prefix(&base));
        node.base = None;
    } else {
        node.base = Some(strip_prefix(&base).to_string());
    }
}

fn annotate_names(session: &mut Session, id: NodeId) {
    let node = &mut session.tree[id];
    node.clean_name = match node.kind {
        NodeKind::Any => ANY_MEMBER_NAME.to_string(),
        _ => mapped_name(&node.name),
    };
    if node.kind == NodeKind::Element
        && node.raw_type.is_none()
        && node.reference.is_none()
        && !node.name.is_empty()
    {
        node.raw_type = Some(node.name.clone());
    }
    for attr in node.attribute_definitions.values_mut() {
        attr.clean_name = mapped_name(&attr.name);
    }
}

/// Copy the attributes of referenced attribute groups into the node.
///
/// Attributes the node declares itself take precedence.
fn inline_attribute_groups(session: &mut Session, id: NodeId) {
    let refs = session.tree[id].attribute_group_refs.clone();
    if refs.is_empty() {
        return;
    }

    let mut gathered = IndexMap::new();
    let mut any_attribute = false;
    let mut missing = Vec::new();
    let mut visited = HashSet::new();
    for name in &refs {
        gather_group(
            session,
            name,
            &mut visited,
            &mut gathered,
            &mut any_attribute,
            &mut missing,
        );
    }

    let component = session.tree[id].name.clone();
    for name in missing {
        session.diagnose(Diagnostic::warning(
            DiagnosticKind::MissingAttributeGroup,
            component.clone(),
            format!("attribute group '{}' not found", name),
        ));
    }

    let node = &mut session.tree[id];
    node.any_attribute |= any_attribute;
    for (key, attr) in gathered {
        node.attribute_definitions.entry(key).or_insert(attr);
    }
    trace!(node = %component, attributes = node.attribute_definitions.len(), "attribute groups inlined");
}

fn gather_group(
    session: &Session,
    name: &str,
    visited: &mut HashSet<String>,
    gathered: &mut IndexMap<String, Attribute>,
    any_attribute: &mut bool,
    missing: &mut Vec<String>,
) {
    let name = strip_prefix(name);
    if !visited.insert(name.to_string()) {
        return;
    }
    let Some(group) = session.attribute_groups.get(name) else {
        missing.push(name.to_string());
        return;
    };
    *any_attribute |= group.any_attribute;
    for (key, attr) in &group.attributes {
        gathered.entry(key.clone()).or_insert_with(|| attr.clone());
    }
    for nested in &group.group_refs {
        gather_group(session, nested, visited, gathered, any_attribute, missing);
    }
}

/// Fill in attributes declared with `ref` from the global declaration
fn resolve_attribute_references(session: &mut Session, id: NodeId) {
    let string_type = session.xsd_name("string");
    let Session {
        tree,
        global_attributes,
        ..
    } = session;
    for attr in tree[id].attribute_definitions.values_mut() {
        if !attr.is_reference {
            continue;
        }
        if let Some(global) = global_attributes.get(attr.name.as_str()) {
            if attr.data_type.is_empty() {
                attr.data_type = global.data_type.clone();
            }
            if attr.default_value.is_none() {
                attr.default_value = global.default_value.clone();
                attr.fixed = global.fixed;
            }
            if attr.enumeration_values.is_empty() {
                attr.enumeration_values = global.enumeration_values.clone();
            }
        }
        if attr.data_type.is_empty() {
            attr.data_type = string_type.clone();
        }
    }
}

fn annotate_occurrence(session: &mut Session, id: NodeId) -> Result<()> {
    let node = &mut session.tree[id];
    node.min_occurs = parse_occurs(node.min_occurs_raw.as_deref(), "minOccurs", &node.name)?;
    node.max_occurs = parse_occurs(node.max_occurs_raw.as_deref(), "maxOccurs", &node.name)?;
    node.optional = node.min_occurs == 0;
    Ok(())
}

/// Parse an occurrence bound; absent means 1, `unbounded` the sentinel
pub fn parse_occurs(raw: Option<&str>, attribute: &'static str, component: &str) -> Result<usize> {
    match raw.map(str::trim) {
        None => Ok(1),
        Some("unbounded") => Ok(UNBOUNDED),
        Some(value) => value
            .parse::<usize>()
            .map(|n| n.min(UNBOUNDED))
            .map_err(|_| Error::Occurrence {
                attribute,
                value: value.to_string(),
                component: component.to_string(),
            }),
    }
}

fn annotate_whitespace(session: &mut Session, id: NodeId) {
    let collapse = session.tree[id]
        .simple_base_chain
        .iter()
        .any(|base| session.resolve_simple(base).collapse_whitespace);
    session.tree[id].collapse_whitespace |= collapse;
}
