//! Type resolution
//!
//! Every element, complex type and wildcard node gets a [`ResolvedType`]:
//! opaque (`Any`), a built-in scalar family, or the name of the complex
//! type that defines its structure.

use std::collections::HashSet;

use tracing::trace;

use crate::error::{Diagnostic, DiagnosticKind};
use crate::model::{BuiltinType, NodeId, NodeKind, ResolvedType, Session, ANY_TYPE};
use crate::names::strip_prefix;

/// Resolve the type of every node, in document order
pub fn resolve_types(session: &mut Session) {
    for id in session.tree.preorder() {
        if matches!(
            session.tree[id].kind,
            NodeKind::Element | NodeKind::ComplexType | NodeKind::Any
        ) {
            resolve_type(session, id);
        }
    }
}

/// Resolve one node
pub fn resolve_type(session: &mut Session, id: NodeId) {
    let mut facts = Facts::default();
    let resolved = if session.tree[id].kind == NodeKind::Any {
        ResolvedType::Any
    } else {
        let candidate = session.tree[id]
            .raw_type
            .as_deref()
            .or(session.tree[id].reference.as_deref())
            .unwrap_or(&session.tree[id].name)
            .to_string();
        let explicit = session.tree[id].raw_type.is_some();
        resolve_candidate(session, id, &candidate, explicit, &mut facts)
    };
    trace!(node = %session.tree[id].name, ?resolved, "resolved");

    let node = &mut session.tree[id];
    for base in &facts.simple_bases {
        node.add_simple_base(base);
    }
    for value in &facts.enumerations {
        node.add_enumeration(value);
    }
    node.is_list_type |= facts.is_list;
    node.collapse_whitespace |= facts.collapse_whitespace;
    node.is_complex |= resolved.is_complex()
        || !node.children.is_empty()
        || !node.attribute_definitions.is_empty()
        || !node.attribute_group_refs.is_empty();
    let scalar = matches!(resolved, ResolvedType::Simple(_));
    let name = node.name.clone();
    node.resolved_type = resolved;
    if scalar && !name.is_empty() {
        session.simple_elements.insert(name);
    }
}

/// What resolution learned along the way
#[derive(Default)]
struct Facts {
    simple_bases: Vec<String>,
    enumerations: Vec<String>,
    is_list: bool,
    collapse_whitespace: bool,
}

fn resolve_candidate(
    session: &mut Session,
    id: NodeId,
    candidate: &str,
    explicit: bool,
    facts: &mut Facts,
) -> ResolvedType {
    if let Some(resolved) = resolve_scalar(session, candidate, facts) {
        return resolved;
    }

    let mut current = strip_prefix(candidate).to_string();
    if !session.types.contains_key(&current) {
        if explicit && !BuiltinType::is_builtin(&current) {
            let component = session.tree[id].name.clone();
            session.diagnose(Diagnostic::note(
                DiagnosticKind::UnknownBase,
                component,
                format!("type '{}' is not defined; treated as string", candidate),
            ));
        }
        return ResolvedType::Simple(BuiltinType::classify(&current));
    }

    // Follow element/type references until they reach a simple type or a
    // node that defines its own structure.
    let mut visited: HashSet<String> = HashSet::new();
    loop {
        if !visited.insert(current.clone()) {
            let component = session.tree[id].name.clone();
            session.diagnose(Diagnostic::warning(
                DiagnosticKind::TypeCycle,
                component,
                format!("type reference cycle through '{}'; treated as string", current),
            ));
            return ResolvedType::Simple(BuiltinType::string());
        }
        let Some(&target) = session.types.get(&current) else {
            return ResolvedType::Simple(BuiltinType::classify(&current));
        };
        let target_node = &session.tree[target];
        facts
            .enumerations
            .extend(target_node.enumeration_values.iter().cloned());

        let next_raw = target_node.own_type_name_raw().to_string();
        let next = strip_prefix(&next_raw).to_string();
        if next == current {
            let structural = target_node.is_complex
                || !target_node.children.is_empty()
                || !target_node.attribute_definitions.is_empty()
                || !target_node.attribute_group_refs.is_empty()
                || target_node.base.is_some();
            return if structural {
                ResolvedType::Complex(current)
            } else {
                ResolvedType::Simple(BuiltinType::string())
            };
        }
        if let Some(resolved) = resolve_scalar(session, &next_raw, facts) {
            return resolved;
        }
        current = next;
    }
}

/// Resolve a reference to an XSD built-in or a named simple type
fn resolve_scalar(session: &mut Session, reference: &str, facts: &mut Facts) -> Option<ResolvedType> {
    if session.is_xsd_reference(reference) {
        let local = strip_prefix(reference);
        if local == ANY_TYPE {
            return Some(ResolvedType::Any);
        }
        let builtin = BuiltinType::classify(local);
        facts.is_list |= builtin.is_list();
        return Some(ResolvedType::Simple(builtin));
    }

    let simple = session.simple_type(reference)?;
    let name = simple.name.clone();
    facts
        .enumerations
        .extend(simple.enumeration_values.iter().cloned());
    let resolution = session.resolve_simple(reference);
    if resolution.exceeded_budget {
        session.diagnose(Diagnostic::warning(
            DiagnosticKind::RestrictionBudget,
            name.clone(),
            format!(
                "restriction chain exceeds {} steps; treated as string",
                session.limits.max_restriction_chain
            ),
        ));
    }
    facts.simple_bases.push(name);
    facts.is_list |= resolution.is_list;
    facts.collapse_whitespace |= resolution.collapse_whitespace;
    Some(ResolvedType::Simple(resolution.builtin))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::ingest_str;
    use crate::model::Family;
    use crate::resolve::{collect::collect_types, groups::expand_groups};

    fn resolved(xsd: &str) -> Session {
        let mut session = Session::new();
        ingest_str(&mut session, xsd).unwrap();
        expand_groups(&mut session);
        collect_types(&mut session);
        resolve_types(&mut session);
        session
    }

    fn find(session: &Session, name: &str) -> NodeId {
        session
            .tree
            .preorder()
            .into_iter()
            .find(|id| session.tree[*id].name == name)
            .unwrap()
    }

    #[test]
    fn test_simple_type_resolves_to_builtin_family() {
        let session = resolved(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:simpleType name="Percent"><xs:restriction base="xs:int"/></xs:simpleType>
  <xs:element name="ratio" type="Percent"/>
</xs:schema>"#,
        );
        let ratio = find(&session, "ratio");
        let builtin = session.tree[ratio].resolved_type.builtin().unwrap();
        assert_eq!(builtin.family, Family::Integer);
        assert_eq!(session.tree[ratio].simple_base_chain, vec!["Percent"]);
        assert!(session.simple_elements.contains("ratio"));
    }

    #[test]
    fn test_element_reference_resolves_through_type() {
        let session = resolved(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:complexType name="orderType">
    <xs:sequence><xs:element name="item" type="xs:string"/></xs:sequence>
  </xs:complexType>
  <xs:element name="order" type="orderType"/>
  <xs:complexType name="batch">
    <xs:sequence><xs:element ref="order" maxOccurs="unbounded"/></xs:sequence>
  </xs:complexType>
</xs:schema>"#,
        );
        let batch = find(&session, "batch");
        let order_ref = session.tree[batch].children[0];
        assert_eq!(
            session.tree[order_ref].resolved_type,
            ResolvedType::Complex("orderType".to_string())
        );
        assert!(session.tree[order_ref].is_complex);
    }

    #[test]
    fn test_unknown_type_defaults_to_string() {
        let session = resolved(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:element name="mystery" type="Missing"/>
</xs:schema>"#,
        );
        let mystery = find(&session, "mystery");
        assert_eq!(
            session.tree[mystery].resolved_type,
            ResolvedType::Simple(BuiltinType::string())
        );
        assert_eq!(session.diagnostics[0].kind, DiagnosticKind::UnknownBase);
    }

    #[test]
    fn test_any_type_is_opaque() {
        let session = resolved(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:complexType name="box">
    <xs:sequence>
      <xs:element name="payload" type="xs:anyType"/>
      <xs:any minOccurs="0"/>
    </xs:sequence>
  </xs:complexType>
</xs:schema>"#,
        );
        let payload = find(&session, "payload");
        assert_eq!(session.tree[payload].resolved_type, ResolvedType::Any);
        let any = find(&session, crate::ingest::ANY_NODE_NAME);
        assert_eq!(session.tree[any].resolved_type, ResolvedType::Any);
    }

    #[test]
    fn test_list_flag_propagates() {
        let session = resolved(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:simpleType name="ints"><xs:list itemType="xs:int"/></xs:simpleType>
  <xs:element name="values" type="ints"/>
</xs:schema>"#,
        );
        let values = find(&session, "values");
        assert!(session.tree[values].is_list_type);
    }
}
