//! Duplicate-name repair
//!
//! An attribute and a child element with the same identifier would become
//! the same member of the generated class. The attribute is renamed; its
//! wire name is kept in `orig_name`.

use std::collections::HashSet;

use tracing::debug;

use super::base_node;
use crate::error::Result;
use crate::model::{NodeId, NodeKind, Session};
use crate::names::mapped_name;

/// Suffix appended to a colliding attribute name
pub const ATTRIBUTE_SUFFIX: &str = "_attr";

/// Rename attributes that collide with child elements, own or inherited
pub fn repair_duplicate_names(session: &mut Session) -> Result<()> {
    for id in session.tree.preorder() {
        let node = &session.tree[id];
        if !matches!(node.kind, NodeKind::Element | NodeKind::ComplexType)
            || node.attribute_definitions.is_empty()
        {
            continue;
        }

        let mut child_names = HashSet::new();
        collect_child_names(session, id, 0, &mut child_names)?;

        let node = &mut session.tree[id];
        for attr in node.attribute_definitions.values_mut() {
            if !child_names.contains(&attr.clean_name) {
                continue;
            }
            if attr.orig_name.is_none() {
                attr.orig_name = Some(attr.name.clone());
            }
            attr.name = format!("{}{}", attr.name, ATTRIBUTE_SUFFIX);
            attr.clean_name = mapped_name(&attr.name);
            debug!(node = %node.name, attribute = %attr.name, "attribute renamed");
        }
    }
    Ok(())
}

/// Member names of the children of `id` and of every type it derives from
fn collect_child_names(
    session: &Session,
    id: NodeId,
    depth: usize,
    names: &mut HashSet<String>,
) -> Result<()> {
    session
        .limits
        .check_inheritance_depth(depth, &session.tree[id].name)?;
    for child in &session.tree[id].children {
        names.insert(session.tree[*child].clean_name.clone());
    }
    if let Some(base) = base_node(session, id) {
        collect_child_names(session, base, depth + 1, names)?;
    }
    Ok(())
}
