//! Annotation and resolution
//!
//! Eight passes over the ingested tree, run in a fixed order because each
//! depends on what the previous ones established:
//!
//! 1. [`groups`]: splice `<group ref>` contents into place
//! 2. [`collect`]: register defining nodes by type name
//! 3. [`types`]: resolve every node to a built-in family or a complex type
//! 4. [`annotate`]: names, attribute groups, occurrence bounds
//! 5. [`collisions`]: rename attributes that clash with child elements
//! 6. [`coerce`]: ID/IDREF/IDREFS attributes become strings
//! 7. [`mixed`]: mixed-content consistency along inheritance chains
//! 8. [`extensions`]: mark types that have subtypes
//!
//! Every pass is idempotent, so [`resolve`] may be run again on an already
//! resolved session without changing it.

pub mod annotate;
pub mod coerce;
pub mod collect;
pub mod collisions;
pub mod extensions;
pub mod groups;
pub mod mixed;
pub mod types;

use tracing::{debug, info};

use crate::error::Result;
use crate::model::{NodeId, Session};
use crate::names::strip_prefix;

/// Run all resolution passes in order
pub fn resolve(session: &mut Session) -> Result<()> {
    groups::expand_groups(session);
    debug!("group expansion done");
    collect::collect_types(session);
    debug!(types = session.types.len(), "type dictionary collected");
    types::resolve_types(session);
    debug!(simple = session.simple_elements.len(), "types resolved");
    annotate::annotate_tree(session)?;
    collisions::repair_duplicate_names(session)?;
    coerce::coerce_identity_attributes(session);
    mixed::check_mixed_content(session);
    extensions::mark_extensions(session);

    info!(
        types = session.types.len(),
        diagnostics = session.diagnostics.len(),
        "schema resolved"
    );
    Ok(())
}

/// Node a structural `base` reference points at
pub(crate) fn base_node(session: &Session, id: NodeId) -> Option<NodeId> {
    let base = session.tree[id].base.as_deref()?;
    session
        .types
        .get(strip_prefix(base))
        .copied()
        .filter(|base_id| *base_id != id)
}
