//! Per-category emitters
//!
//! Each submodule turns a [`ClassPlan`] into the methods of one category:
//! construction, accessors, validator hooks, the content check, the three
//! serializers and the deserializer. [`class_definition`] assembles them.

mod accessors;
mod build;
mod construct;
mod content;
mod etree;
mod literal;
mod validate;
mod write;

use super::ir::{block, text, Fragment, Item};
use super::options::GeneratorOptions;
use super::plan::{ChildPlan, ClassPlan, Scalar, ValueKind};
use super::render::{py_docstring, py_string};
use super::validators::ValidatorBodySource;

/// Namespace of the `xml:` prefix
const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// The complete class block for one plan
pub fn class_definition(
    plan: &ClassPlan,
    options: &GeneratorOptions,
    bodies: &dyn ValidatorBodySource,
) -> Item {
    let mut members: Vec<Item> = Vec::new();
    if !plan.documentation.is_empty() {
        members.push(text(py_docstring(&plan.documentation)));
    }
    members.extend(construct::class_attributes(plan, options.member_specs));
    members.push(construct::constructor(plan));
    members.push(construct::factory(plan));
    members.push(construct::factory_binding());
    members.extend(accessors::accessors(plan, options.getter_setter));
    members.extend(validate::validators(plan, bodies));
    members.push(content::has_content(plan));
    if options.export.write {
        members.extend(write::methods(plan));
    }
    if options.export.literal {
        members.extend(literal::methods(plan));
    }
    if options.export.etree {
        members.push(etree::to_etree(plan));
    }
    members.extend(build::methods(plan));

    let base = plan.superclass.as_deref().unwrap_or("GeneratedsSuper");
    block(
        format!("class {}({})", plan.class_name, base),
        separate_methods(members),
    )
}

/// Put a blank line before every method after the first class statement
fn separate_methods(members: Vec<Item>) -> Vec<Item> {
    let mut out = Vec::with_capacity(members.len() * 2);
    for item in members {
        if matches!(item, Item::Block(_)) && !out.is_empty() {
            out.push(Item::Blank);
        }
        out.push(item);
    }
    out
}

/// `super(Class, self).<call>`
fn super_call(plan: &ClassPlan, call: &str) -> String {
    format!("super({}, self).{}", plan.class_name, call)
}

/// Key of an attribute in a parsed element's attribute map
fn attribute_key(wire_name: &str) -> String {
    match wire_name.strip_prefix("xml:") {
        Some(local) => format!("{{{}}}{}", XML_NAMESPACE, local),
        None => wire_name.to_string(),
    }
}

/// Expression parsing the text in `text_expr` as `scalar`
fn parse_expr(scalar: &Scalar, text_expr: &str, node_expr: &str, input_name: &str) -> String {
    let text_expr = if scalar.collapse_whitespace {
        format!("self.gds_collapse_whitespace({})", text_expr)
    } else {
        text_expr.to_string()
    };
    let name = py_string(input_name);
    let parsed = if scalar.is_list {
        format!(
            "self.gds_parse_list({}, '{}', {}, {})",
            text_expr,
            scalar.codec(),
            node_expr,
            name
        )
    } else {
        format!(
            "self.gds_parse_{}({}, {}, {})",
            scalar.codec(),
            text_expr,
            node_expr,
            name
        )
    };
    if scalar.bounded_integer() {
        format!(
            "self.gds_validate_integer_subtype({}, {}, {}, {})",
            parsed,
            node_expr,
            name,
            py_string(&scalar.builtin.name)
        )
    } else {
        parsed
    }
}

/// Fragments formatting `value` as text
fn format_expr(scalar: &Scalar, value: Fragment, input_name: &str) -> Vec<Fragment> {
    let name = py_string(input_name);
    if scalar.is_list {
        vec![
            "self.gds_format_list(".into(),
            value,
            format!(", '{}', input_name={})", scalar.codec(), name).into(),
        ]
    } else {
        vec![
            format!("self.gds_format_{}(", scalar.codec()).into(),
            value,
            format!(", input_name={})", name).into(),
        ]
    }
}

/// `{class: tag}` of the substitution group members an object slot accepts,
/// `None` for an ordinary slot
fn member_tags(child: &ChildPlan) -> Option<String> {
    let mut entries: Vec<(&str, &str)> = Vec::new();
    for substitute in &child.substitutes {
        if let ValueKind::Complex(class) = &substitute.value {
            if !entries.iter().any(|(c, _)| *c == class.as_str()) {
                entries.push((class, &substitute.name));
            }
        }
    }
    if entries.is_empty() {
        return None;
    }
    let body: Vec<String> = entries
        .iter()
        .map(|(class, tag)| format!("{}: {}", py_string(class), py_string(tag)))
        .collect();
    Some(format!("{{{}}}", body.join(", ")))
}

/// Tag an object child is written under.
///
/// In a substitution slot the tag follows the object: the tag it was read
/// with, else the member element of its class, else the head element.
fn child_tag(child: &ChildPlan, value: Fragment) -> Vec<Fragment> {
    match member_tags(child) {
        Some(tags) => vec![
            "gds_member_tag_(".into(),
            value,
            format!(", {}, {})", py_string(&child.name), tags).into(),
        ],
        None => vec![py_string(&child.name).into()],
    }
}

/// Name of the validator hook of a simple type
fn validator_name(type_name: &str) -> String {
    format!("validate_{}", crate::names::clean_name(type_name))
}

/// `eol_` for the current `pretty_print` setting
fn eol_setup() -> Vec<Item> {
    vec![
        block("if pretty_print", vec![text("eol_ = '\\n'")]),
        block("else", vec![text("eol_ = ''")]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::options::ExportModes;
    use crate::codegen::render::PythonRenderer;
    use crate::codegen::validators::NoValidatorBodies;
    use crate::codegen::plan::{plan_module, ModulePlan};
    use crate::ingest::ingest_str;
    use crate::model::{BuiltinType, Session};
    use crate::resolve::resolve;

    pub(super) fn plan_of(xsd: &str) -> ModulePlan {
        let mut session = Session::new();
        ingest_str(&mut session, xsd).unwrap();
        resolve(&mut session).unwrap();
        plan_module(&mut session, "").unwrap()
    }

    /// A drawing whose `shape` slot takes circles and squares
    pub(super) const SUBSTITUTION: &str = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:element name="shape" type="Shape" abstract="true"/>
  <xs:element name="circle" type="Circle" substitutionGroup="shape"/>
  <xs:element name="square" type="Square" substitutionGroup="shape"/>
  <xs:complexType name="Drawing">
    <xs:sequence><xs:element ref="shape" maxOccurs="unbounded"/></xs:sequence>
  </xs:complexType>
  <xs:complexType name="Shape"><xs:attribute name="color" type="xs:string"/></xs:complexType>
  <xs:complexType name="Circle">
    <xs:complexContent><xs:extension base="Shape"/></xs:complexContent>
  </xs:complexType>
  <xs:complexType name="Square">
    <xs:complexContent><xs:extension base="Shape"/></xs:complexContent>
  </xs:complexType>
</xs:schema>"#;

    pub(super) fn rendered(item: &Item) -> String {
        PythonRenderer::new().render(std::slice::from_ref(item))
    }

    #[test]
    fn test_parse_expr_wraps_bounded_integers() {
        let scalar = Scalar::new(BuiltinType::classify("positiveInteger"));
        assert_eq!(
            parse_expr(&scalar, "value", "node", "count"),
            "self.gds_validate_integer_subtype(self.gds_parse_integer(value, node, 'count'), node, 'count', 'positiveInteger')"
        );
    }

    #[test]
    fn test_parse_expr_lists_and_whitespace() {
        let mut scalar = Scalar::new(BuiltinType::classify("decimal"));
        scalar.is_list = true;
        scalar.collapse_whitespace = true;
        assert_eq!(
            parse_expr(&scalar, "child_.text", "child_", "prices"),
            "self.gds_parse_list(self.gds_collapse_whitespace(child_.text), 'decimal', child_, 'prices')"
        );
    }

    #[test]
    fn test_attribute_key_of_xml_prefix() {
        assert_eq!(attribute_key("xml:lang"), "{http://www.w3.org/XML/1998/namespace}lang");
        assert_eq!(attribute_key("id"), "id");
    }

    #[test]
    fn test_class_definition_sections_follow_options() {
        let plan = plan_of(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:complexType name="point">
    <xs:annotation><xs:documentation>A location.</xs:documentation></xs:annotation>
    <xs:attribute name="x" type="xs:int"/>
  </xs:complexType>
</xs:schema>"#,
        );
        let options = GeneratorOptions::new().with_export(ExportModes::parse("etree").unwrap());
        let text = rendered(&class_definition(&plan.classes[0], &options, &NoValidatorBodies));
        assert!(text.starts_with("class point(GeneratedsSuper):\n    \"\"\"A location.\"\"\"\n"));
        assert!(text.contains("    def to_etree(self, parent_element=None, name_='point', mapping_=None):\n"));
        assert!(!text.contains("def export("));
        assert!(!text.contains("def exportLiteral("));
        assert!(text.contains("    def build(self, node):\n"));
    }
}
