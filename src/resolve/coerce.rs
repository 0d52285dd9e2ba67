//! Attribute-type coercion

use crate::model::{BuiltinType, Session};
use crate::names::split_qname;

/// Retype ID, IDREF and IDREFS attributes as plain strings
pub fn coerce_identity_attributes(session: &mut Session) {
    let string_type = session.xsd_name("string");
    let prefix = session.schema_prefix.clone();
    for id in session.tree.preorder() {
        for attr in session.tree[id].attribute_definitions.values_mut() {
            let (type_prefix, local) = split_qname(&attr.data_type);
            if type_prefix.unwrap_or("") == prefix && BuiltinType::is_identity(local) {
                attr.data_type = string_type.clone();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::ingest_str;

    #[test]
    fn test_identity_types_become_string() {
        let mut session = Session::new();
        ingest_str(
            &mut session,
            r#"<xsd:schema xmlns:xsd="http://www.w3.org/2001/XMLSchema">
  <xsd:complexType name="node">
    <xsd:attribute name="id" type="xsd:ID"/>
    <xsd:attribute name="parent" type="xsd:IDREF"/>
    <xsd:attribute name="links" type="xsd:IDREFS"/>
    <xsd:attribute name="weight" type="xsd:int"/>
  </xsd:complexType>
</xsd:schema>"#,
        )
        .unwrap();
        coerce_identity_attributes(&mut session);

        let node = session.qualified["node"];
        let types: Vec<&str> = session.tree[node]
            .attribute_definitions
            .values()
            .map(|a| a.data_type.as_str())
            .collect();
        assert_eq!(types, vec!["xsd:string", "xsd:string", "xsd:string", "xsd:int"]);
    }
}
