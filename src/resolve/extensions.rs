//! Extension marking

use super::base_node;
use crate::error::{Diagnostic, DiagnosticKind};
use crate::model::Session;

/// Mark every type that another type derives from
pub fn mark_extensions(session: &mut Session) {
    for id in session.tree.preorder() {
        let Some(base) = session.tree[id].base.clone() else {
            continue;
        };
        match base_node(session, id) {
            Some(base_id) => session.tree[base_id].has_subtypes = true,
            None => {
                let component = session.tree[id].name.clone();
                session.diagnose(Diagnostic::note(
                    DiagnosticKind::UnknownBase,
                    component,
                    format!("base type '{}' is not defined", base),
                ));
            }
        }
    }
}
