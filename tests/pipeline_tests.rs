//! Pipeline integration tests
//!
//! Ingest and resolve whole schemas through the public entry points and
//! check the resolved model and the emission plan.

use std::path::PathBuf;

use xsdbind::codegen::plan::{plan_module, ModulePlan, ValueKind};
use xsdbind::error::{DiagnosticKind, Error};
use xsdbind::model::{Family, NodeId, NodeKind, ResolvedType, Session, UNBOUNDED};
use xsdbind::{compile_file, compile_str};

fn fixtures_dir() -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path
}

fn element(session: &Session, name: &str) -> NodeId {
    session
        .tree
        .preorder()
        .into_iter()
        .find(|id| session.tree[*id].kind == NodeKind::Element && session.tree[*id].name == name)
        .unwrap_or_else(|| panic!("no element named {}", name))
}

fn planned(xsd: &str) -> (Session, ModulePlan) {
    let mut session = compile_str(xsd).unwrap();
    let plan = plan_module(&mut session, "").unwrap();
    (session, plan)
}

fn has_diagnostic(session: &Session, kind: DiagnosticKind) -> bool {
    session.diagnostics.iter().any(|d| d.kind == kind)
}

// ============================================================================
// Type resolution
// ============================================================================

#[test]
fn test_percent_resolves_to_integer_family() {
    let session = compile_str(
        r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:simpleType name="Percent"><xs:restriction base="xs:int"/></xs:simpleType>
  <xs:complexType name="gauge">
    <xs:sequence><xs:element name="level" type="Percent"/></xs:sequence>
  </xs:complexType>
</xs:schema>"#,
    )
    .unwrap();

    let level = &session.tree[element(&session, "level")];
    assert_eq!(level.resolved_type.builtin().unwrap().family, Family::Integer);
    assert_eq!(level.simple_base_chain, vec!["Percent".to_string()]);
    assert!(session.diagnostics.is_empty());
}

#[test]
fn test_element_reference_takes_structure_of_type() {
    let session = compile_file(fixtures_dir().join("purchase_order.xsd")).unwrap();
    let ship_to = &session.tree[element(&session, "shipTo")];
    assert_eq!(ship_to.resolved_type, ResolvedType::Complex("Address".to_string()));
    let quantity = &session.tree[element(&session, "quantity")];
    assert_eq!(quantity.resolved_type.builtin().unwrap().name, "positiveInteger");
}

#[test]
fn test_union_resolves_to_string() {
    let session = compile_str(
        r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:simpleType name="Size">
    <xs:union memberTypes="xs:int xs:string"/>
  </xs:simpleType>
  <xs:complexType name="box">
    <xs:sequence><xs:element name="width" type="Size"/></xs:sequence>
    <xs:attribute name="size" type="Size"/>
  </xs:complexType>
</xs:schema>"#,
    )
    .unwrap();
    let width = &session.tree[element(&session, "width")];
    assert_eq!(width.resolved_type.builtin().unwrap().family, Family::String);
}

#[test]
fn test_type_reference_cycle_defaults_to_string() {
    let session = compile_str(
        r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:element name="a" type="b"/>
  <xs:element name="b" type="a"/>
  <xs:complexType name="holder">
    <xs:sequence><xs:element name="value" type="a"/></xs:sequence>
  </xs:complexType>
</xs:schema>"#,
    )
    .unwrap();
    let value = &session.tree[element(&session, "value")];
    assert_eq!(value.resolved_type.builtin().unwrap().family, Family::String);
    assert!(has_diagnostic(&session, DiagnosticKind::TypeCycle));
}

// ============================================================================
// Occurrence bounds
// ============================================================================

#[test]
fn test_optional_iff_min_occurs_zero() {
    let session = compile_file(fixtures_dir().join("purchase_order.xsd")).unwrap();
    for id in session.tree.preorder() {
        let node = &session.tree[id];
        if node.kind != NodeKind::Element || node.in_choice {
            continue;
        }
        assert_eq!(node.optional, node.min_occurs == 0, "element {}", node.name);
    }
    let item = &session.tree[element(&session, "item")];
    assert_eq!(item.max_occurs, UNBOUNDED);
    assert!(!item.optional);
    assert!(session.tree[element(&session, "billTo")].optional);
}

#[test]
fn test_invalid_occurrence_aborts() {
    let err = compile_str(
        r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:complexType name="list">
    <xs:sequence><xs:element name="entry" type="xs:string" maxOccurs="many"/></xs:sequence>
  </xs:complexType>
</xs:schema>"#,
    )
    .unwrap_err();
    match err {
        Error::Occurrence { attribute, value, .. } => {
            assert_eq!(attribute, "maxOccurs");
            assert_eq!(value, "many");
        }
        other => panic!("unexpected error: {}", other),
    }
}

// ============================================================================
// Idempotency
// ============================================================================

/// Per node: name, resolved type, optional flag, member name, child names
type Snapshot = Vec<(String, ResolvedType, bool, String, Vec<String>)>;

fn snapshot(session: &Session) -> Snapshot {
    session
        .tree
        .preorder()
        .into_iter()
        .map(|id| {
            let node = &session.tree[id];
            let children = node
                .children
                .iter()
                .map(|c| session.tree[*c].name.clone())
                .collect();
            (
                node.name.clone(),
                node.resolved_type.clone(),
                node.optional,
                node.clean_name.clone(),
                children,
            )
        })
        .collect()
}

#[test]
fn test_resolution_is_idempotent() {
    let mut session = compile_file(fixtures_dir().join("purchase_order.xsd")).unwrap();
    let first = snapshot(&session);
    let diagnostics = session.diagnostics.len();
    xsdbind::resolve::resolve(&mut session).unwrap();
    assert_eq!(snapshot(&session), first);
    assert_eq!(session.diagnostics.len(), diagnostics);
}

#[test]
fn test_resolution_is_idempotent_with_group_cycle() {
    let mut session = compile_str(
        r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:group name="g1">
    <xs:sequence>
      <xs:element name="a" type="xs:string"/>
      <xs:group ref="g2"/>
    </xs:sequence>
  </xs:group>
  <xs:group name="g2">
    <xs:sequence>
      <xs:element name="b" type="xs:string"/>
      <xs:group ref="g1"/>
    </xs:sequence>
  </xs:group>
  <xs:complexType name="top">
    <xs:sequence><xs:group ref="g1"/></xs:sequence>
  </xs:complexType>
</xs:schema>"#,
    )
    .unwrap();
    let first = snapshot(&session);
    let diagnostics = session.diagnostics.len();
    xsdbind::resolve::resolve(&mut session).unwrap();
    assert_eq!(snapshot(&session), first);
    assert_eq!(session.diagnostics.len(), diagnostics);
    assert_eq!(
        session
            .diagnostics
            .iter()
            .filter(|d| d.kind == DiagnosticKind::GroupCycle)
            .count(),
        1
    );
}

// ============================================================================
// Name collisions
// ============================================================================

#[test]
fn test_colliding_attribute_gets_distinct_member() {
    let (_, plan) = planned(
        r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:complexType name="entry">
    <xs:sequence><xs:element name="title" type="xs:string"/></xs:sequence>
    <xs:attribute name="title" type="xs:string"/>
  </xs:complexType>
</xs:schema>"#,
    );
    let entry = &plan.classes[0];
    assert_eq!(entry.children[0].member, "title");
    assert_eq!(entry.attributes[0].member, "title_attr");
    assert_eq!(entry.attributes[0].name, "title");
}

#[test]
fn test_keyword_names_are_mapped() {
    let (_, plan) = planned(
        r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:complexType name="import">
    <xs:sequence><xs:element name="class" type="xs:string"/></xs:sequence>
    <xs:attribute name="from-date" type="xs:date"/>
  </xs:complexType>
</xs:schema>"#,
    );
    let class = &plan.classes[0];
    assert_ne!(class.class_name, "import");
    assert_ne!(class.children[0].member, "class");
    assert_eq!(class.children[0].name, "class");
    assert!(!class.attributes[0].member.contains('-'));
}

// ============================================================================
// Substitution groups
// ============================================================================

#[test]
fn test_substitution_members_route_to_head_slot() {
    let mut session = compile_file(fixtures_dir().join("shapes.xsd")).unwrap();
    assert_eq!(
        session.substitution_members("shape"),
        vec!["circle".to_string(), "square".to_string()]
    );

    let plan = plan_module(&mut session, "").unwrap();
    let drawing = plan.classes.iter().find(|c| c.type_name == "Drawing").unwrap();
    let slot = drawing.children.iter().find(|c| c.name == "shape").unwrap();
    assert!(slot.repeated);
    let names: Vec<&str> = slot.substitutes.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["circle", "square"]);
    assert_eq!(slot.substitutes[0].value, ValueKind::Complex("Circle".to_string()));
}

// ============================================================================
// Inheritance and emission order
// ============================================================================

#[test]
fn test_bases_are_planned_before_derived_types() {
    let mut session = compile_file(fixtures_dir().join("shapes.xsd")).unwrap();
    let plan = plan_module(&mut session, "").unwrap();
    let position = |name: &str| plan.classes.iter().position(|c| c.type_name == name).unwrap();
    assert!(position("Shape") < position("Circle"));
    assert!(position("Shape") < position("Square"));

    let circle = &plan.classes[position("Circle")];
    assert_eq!(circle.superclass.as_deref(), Some("Shape"));
    let inherited: Vec<&str> = circle.inherited_params.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(inherited, vec!["color"]);
    assert!(plan.classes[position("Shape")].has_subtypes);
}

#[test]
fn test_inheritance_cycle_is_fatal() {
    let err = compile_str(
        r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:complexType name="a">
    <xs:complexContent><xs:extension base="b"/></xs:complexContent>
  </xs:complexType>
  <xs:complexType name="b">
    <xs:complexContent><xs:extension base="a"/></xs:complexContent>
  </xs:complexType>
</xs:schema>"#,
    )
    .unwrap_err();
    assert!(matches!(err, Error::InheritanceDepth { .. }));
}

// ============================================================================
// Recoverable problems
// ============================================================================

#[test]
fn test_missing_attribute_group_does_not_stop_generation() {
    let (session, plan) = planned(
        r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:complexType name="tagged">
    <xs:attributeGroup ref="missingAttrs"/>
    <xs:attribute name="tag" type="xs:string"/>
  </xs:complexType>
  <xs:complexType name="plain">
    <xs:attribute name="id" type="xs:string"/>
  </xs:complexType>
</xs:schema>"#,
    );
    assert!(has_diagnostic(&session, DiagnosticKind::MissingAttributeGroup));
    let names: Vec<&str> = plan.classes.iter().map(|c| c.type_name.as_str()).collect();
    assert_eq!(names, vec!["tagged", "plain"]);
}

#[test]
fn test_mixed_conflict_skips_type_and_its_subtypes() {
    let (session, plan) = planned(
        r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:complexType name="para">
    <xs:simpleContent>
      <xs:extension base="xs:string"><xs:attribute name="lang" type="xs:language"/></xs:extension>
    </xs:simpleContent>
  </xs:complexType>
  <xs:complexType name="richPara" mixed="true">
    <xs:complexContent>
      <xs:extension base="para">
        <xs:sequence><xs:element name="b" type="xs:string"/></xs:sequence>
      </xs:extension>
    </xs:complexContent>
  </xs:complexType>
  <xs:complexType name="note">
    <xs:sequence><xs:element name="text" type="xs:string"/></xs:sequence>
  </xs:complexType>
</xs:schema>"#,
    );
    assert!(has_diagnostic(&session, DiagnosticKind::SkippedType));
    assert!(plan.classes.iter().any(|c| c.type_name == "note"));
    assert!(!plan.classes.iter().any(|c| c.type_name == "richPara"));
}

// ============================================================================
// Includes
// ============================================================================

#[test]
fn test_included_types_are_compiled() {
    let session = compile_file(fixtures_dir().join("purchase_order.xsd")).unwrap();
    assert!(session.types.contains_key("Address"));
    assert!(session.types.contains_key("UKAddress"));
    assert_eq!(
        session.type_node("UKAddress").and_then(|n| n.base.as_deref()),
        Some("Address")
    );
    assert!(!has_diagnostic(&session, DiagnosticKind::Unsupported));
    assert_eq!(session.target_namespace.as_deref(), Some("urn:example:po"));
}

#[test]
fn test_compile_str_leaves_includes_alone() {
    let text = std::fs::read_to_string(fixtures_dir().join("purchase_order.xsd")).unwrap();
    let session = compile_str(&text).unwrap();
    assert!(!session.types.contains_key("UKAddress"));
}

#[test]
fn test_missing_schema_file_is_a_resource_error() {
    let err = compile_file(fixtures_dir().join("no_such_schema.xsd")).unwrap_err();
    assert!(matches!(err, Error::Resource(_)));
}
