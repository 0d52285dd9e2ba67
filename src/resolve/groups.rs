//! Group expansion
//!
//! A `<group ref="g"/>` child is replaced by copies of the children of the
//! group definition `g`, in place and in order. Expansion of a group that
//! (directly or indirectly) refers to itself stops at the repeated name and
//! leaves that reference in the tree, marked so later runs pass over it.

use std::collections::{BTreeSet, HashSet};

use tracing::trace;

use crate::error::{Diagnostic, DiagnosticKind};
use crate::model::{NodeId, NodeKind, Session};

/// Groups currently being expanded, and the cycles already reported
#[derive(Debug, Default)]
struct Expansion {
    chain: Vec<String>,
    reported: HashSet<BTreeSet<String>>,
}

/// Expand every group reference in group definitions and in the tree
pub fn expand_groups(session: &mut Session) {
    let definitions: Vec<(String, NodeId)> = session
        .groups
        .iter()
        .map(|(name, id)| (name.clone(), *id))
        .collect();
    let mut expansion = Expansion::default();
    for (name, id) in definitions {
        expansion.chain.push(name);
        expand_children(session, id, &mut expansion);
        expansion.chain.pop();
    }

    for id in session.tree.preorder() {
        if session.tree[id].kind != NodeKind::Group {
            expand_children(session, id, &mut expansion);
        }
    }
}

/// Replace group references among the children of `id`
fn expand_children(session: &mut Session, id: NodeId, expansion: &mut Expansion) {
    let children = session.tree[id].children.clone();
    if !children
        .iter()
        .any(|child| session.tree[*child].kind == NodeKind::GroupRef)
    {
        return;
    }

    let mut expanded = Vec::with_capacity(children.len());
    for child in children {
        if session.tree[child].unexpandable {
            expanded.push(child);
            continue;
        }
        let Some(name) = session.tree[child].group_ref().map(str::to_string) else {
            expanded.push(child);
            continue;
        };
        let Some(&definition) = session.groups.get(&name) else {
            session.diagnose(Diagnostic::warning(
                DiagnosticKind::MissingGroup,
                session.tree[id].name.clone(),
                format!("group '{}' not found", name),
            ));
            session.tree[child].unexpandable = true;
            expanded.push(child);
            continue;
        };
        if let Some(start) = expansion.chain.iter().position(|g| *g == name) {
            let cycle = &expansion.chain[start..];
            if expansion.reported.insert(cycle.iter().cloned().collect()) {
                session.diagnose(Diagnostic::warning(
                    DiagnosticKind::GroupCycle,
                    name.clone(),
                    format!("group expansion cycle: {} -> {}", cycle.join(" -> "), name),
                ));
            }
            session.tree[child].unexpandable = true;
            expanded.push(child);
            continue;
        }
        if expansion.chain.len() >= session.limits.max_group_depth {
            session.diagnose(Diagnostic::warning(
                DiagnosticKind::GroupCycle,
                name.clone(),
                format!(
                    "group nesting deeper than {}",
                    session.limits.max_group_depth
                ),
            ));
            session.tree[child].unexpandable = true;
            expanded.push(child);
            continue;
        }

        expansion.chain.push(name.clone());
        expand_children(session, definition, expansion);
        expansion.chain.pop();

        let reference = session.tree[child].clone();
        for member in session.tree[definition].children.clone() {
            let copy = session.tree.clone_subtree(member);
            let node = &mut session.tree[copy];
            node.is_top_level = false;
            node.in_choice |= reference.in_choice;
            if node.min_occurs_raw.is_none() {
                node.min_occurs_raw = reference.min_occurs_raw.clone();
            }
            if node.max_occurs_raw.is_none() {
                node.max_occurs_raw = reference.max_occurs_raw.clone();
            }
            expanded.push(copy);
        }
        trace!(group = %name, parent = %session.tree[id].name, "group expanded");
    }
    session.tree[id].children = expanded;
}
