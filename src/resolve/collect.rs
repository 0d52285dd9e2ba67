//! Type dictionary collection

use crate::model::{NodeKind, SchemaNode, Session};

/// Register every defining node under its own name.
///
/// Nodes that are only references or only name a built-in carry no type
/// information and are skipped. When two nodes share a name, a node with
/// content (children, attributes, a base) is never displaced by a bare one.
pub fn collect_types(session: &mut Session) {
    for id in session.tree.preorder() {
        let node = &session.tree[id];
        if !matches!(node.kind, NodeKind::Element | NodeKind::ComplexType)
            || node.name.is_empty()
            || !node.is_defining()
        {
            continue;
        }
        if let Some(&existing) = session.types.get(&node.name) {
            if existing == id || (has_content(&session.tree[existing]) && !has_content(node)) {
                continue;
            }
        }
        session.types.insert(node.name.clone(), id);
    }
}

fn has_content(node: &SchemaNode) -> bool {
    node.is_complex
        || !node.children.is_empty()
        || !node.attribute_definitions.is_empty()
        || !node.attribute_group_refs.is_empty()
        || node.base.is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::ingest_str;
    use crate::model::NodeKind;

    #[test]
    fn test_complex_type_wins_over_bare_element() {
        let xsd = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:complexType name="person">
    <xs:sequence><xs:element name="name" type="xs:string"/></xs:sequence>
  </xs:complexType>
  <xs:element name="person" type="person"/>
</xs:schema>"#;
        let mut session = Session::new();
        ingest_str(&mut session, xsd).unwrap();
        collect_types(&mut session);

        let person = session.types["person"];
        assert_eq!(session.tree[person].kind, NodeKind::ComplexType);
        assert!(!session.types.contains_key("name"));
    }

    #[test]
    fn test_local_element_with_attributes_is_collected() {
        let xsd = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:element name="root">
    <xs:complexType>
      <xs:sequence>
        <xs:element name="inner">
          <xs:complexType><xs:attribute name="flag" type="xs:boolean"/></xs:complexType>
        </xs:element>
      </xs:sequence>
    </xs:complexType>
  </xs:element>
</xs:schema>"#;
        let mut session = Session::new();
        ingest_str(&mut session, xsd).unwrap();
        collect_types(&mut session);
        assert!(session.types.contains_key("root"));
        assert!(session.types.contains_key("inner"));
    }
}
