//! Mixed-content consistency
//!
//! A type that mixes text and elements makes every type in its inheritance
//! chain mixed. Types with simple content cannot be mixed; a chain that
//! joins the two is inconsistent and its derived type is flagged so that
//! emission skips it.

use tracing::debug;

use super::base_node;
use crate::error::{Diagnostic, DiagnosticKind};
use crate::model::{NodeId, Session};

/// Propagate mixed content along inheritance chains and flag conflicts
pub fn check_mixed_content(session: &mut Session) {
    let links: Vec<(NodeId, NodeId)> = session
        .tree
        .preorder()
        .into_iter()
        .filter_map(|id| base_node(session, id).map(|base| (id, base)))
        .collect();
    if links.is_empty() {
        return;
    }

    // Flags only ever turn on, so this reaches a fixpoint.
    let mut rounds = 0;
    loop {
        let mut changed = false;
        for &(derived, base) in &links {
            if !(session.tree[derived].is_mixed || session.tree[base].is_mixed) {
                continue;
            }
            for id in [derived, base] {
                let node = &mut session.tree[id];
                if !node.is_mixed && !node.has_simple_content {
                    node.is_mixed = true;
                    changed = true;
                }
            }
        }
        rounds += 1;
        if !changed {
            break;
        }
    }
    debug!(rounds, "mixed content propagated");

    for (derived, base) in links {
        if session.tree[derived].is_mixed == session.tree[base].is_mixed {
            continue;
        }
        session.tree[derived].mixed_conflict = true;
        let component = session.tree[derived].name.clone();
        let base_name = session.tree[base].name.clone();
        session.diagnose(Diagnostic::warning(
            DiagnosticKind::MixedContent,
            component,
            format!(
                "mixed content disagrees with base type '{}'; type is skipped",
                base_name
            ),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::ingest_str;
    use crate::resolve::resolve;

    fn find(session: &Session, name: &str) -> NodeId {
        session
            .tree
            .preorder()
            .into_iter()
            .find(|id| session.tree[*id].name == name)
            .unwrap()
    }

    #[test]
    fn test_mixed_spreads_through_chain() {
        let mut session = Session::new();
        ingest_str(
            &mut session,
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:complexType name="inline">
    <xs:sequence><xs:element name="b" type="xs:string"/></xs:sequence>
  </xs:complexType>
  <xs:complexType name="para" mixed="true">
    <xs:complexContent><xs:extension base="inline"/></xs:complexContent>
  </xs:complexType>
  <xs:complexType name="note">
    <xs:complexContent><xs:extension base="inline"/></xs:complexContent>
  </xs:complexType>
</xs:schema>"#,
        )
        .unwrap();
        resolve(&mut session).unwrap();
        for name in ["inline", "para", "note"] {
            assert!(session.tree[find(&session, name)].is_mixed, "{}", name);
        }
        assert!(session.diagnostics.is_empty());
    }

    #[test]
    fn test_simple_content_conflict_is_flagged() {
        let mut session = Session::new();
        ingest_str(
            &mut session,
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:complexType name="text" mixed="true">
    <xs:sequence><xs:element name="em" type="xs:string" minOccurs="0"/></xs:sequence>
  </xs:complexType>
  <xs:complexType name="code">
    <xs:simpleContent>
      <xs:extension base="text"><xs:attribute name="lang" type="xs:string"/></xs:extension>
    </xs:simpleContent>
  </xs:complexType>
</xs:schema>"#,
        )
        .unwrap();
        resolve(&mut session).unwrap();
        let code = find(&session, "code");
        assert!(session.tree[code].mixed_conflict);
        assert!(session
            .diagnostics
            .iter()
            .any(|d| d.kind == DiagnosticKind::MixedContent));
    }
}
