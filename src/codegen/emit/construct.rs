//! Class attributes, constructor and factory

use super::super_call;
use crate::codegen::ir::{block, field, line, text, Item};
use crate::codegen::options::MemberSpecs;
use crate::codegen::plan::{ClassPlan, ValueKind};
use crate::codegen::render::py_string;

/// `model_name_`, the subclass hooks and the member specifications
pub(super) fn class_attributes(plan: &ClassPlan, specs: MemberSpecs) -> Vec<Item> {
    let mut items = vec![
        text(format!("model_name_ = {}", py_string(&plan.class_name))),
        text("subclass = None"),
        text(format!(
            "superclass = {}",
            plan.superclass.as_deref().unwrap_or("None")
        )),
    ];
    items.extend(member_specs(plan, specs));
    items
}

fn member_specs(plan: &ClassPlan, specs: MemberSpecs) -> Vec<Item> {
    let mut entries: Vec<(String, String, bool, bool)> = plan
        .attributes
        .iter()
        .map(|a| (a.member.clone(), a.data_type.clone(), false, !a.required))
        .collect();
    entries.extend(
        plan.children
            .iter()
            .map(|c| (c.member.clone(), c.data_type.clone(), c.repeated, c.optional)),
    );
    if let (true, Some(scalar)) = (plan.owns_simple_content(), &plan.simple_content) {
        let data_type = scalar
            .validator
            .clone()
            .unwrap_or_else(|| scalar.builtin.to_string());
        entries.push(("valueOf_".to_string(), data_type, false, false));
    }

    let spec = |(name, data_type, container, optional): &(String, String, bool, bool)| {
        format!(
            "MemberSpec_({}, {}, {}, {})",
            py_string(name),
            py_string(data_type),
            *container as u8,
            *optional as u8
        )
    };
    match specs {
        MemberSpecs::Off => Vec::new(),
        MemberSpecs::List => {
            let mut items = vec![text("member_data_items_ = [")];
            items.extend(entries.iter().map(|e| text(format!("    {},", spec(e)))));
            items.push(text("]"));
            items
        }
        MemberSpecs::Dict => {
            let mut items = vec![text("member_data_items_ = {")];
            items.extend(
                entries
                    .iter()
                    .map(|e| text(format!("    {}: {},", py_string(&e.0), spec(e)))),
            );
            items.push(text("}"));
            items
        }
    }
}

/// `__init__`: inherited parameters first, then the class's own
pub(super) fn constructor(plan: &ClassPlan) -> Item {
    let mut params: Vec<String> = plan
        .all_params()
        .into_iter()
        .map(|p| format!("{}={}", p.name, p.default))
        .collect();
    if plan.takes_extension_type() {
        params.push("extensiontype_=None".to_string());
    }
    let header = format!(
        "def __init__(self{})",
        params.iter().map(|p| format!(", {}", p)).collect::<String>()
    );

    let mut body = vec![line(vec![field("original_tagname_"), " = None".into()])];
    if plan.superclass.is_some() {
        let mut args: Vec<String> = plan
            .inherited_params
            .iter()
            .map(|p| format!("{0}={0}", p.name))
            .collect();
        args.push("extensiontype_=extensiontype_".to_string());
        body.push(text(super_call(
            plan,
            &format!("__init__({})", args.join(", ")),
        )));
    }
    if plan.owns_extension_type() {
        body.push(assign("extensiontype_", "extensiontype_"));
    }
    for attr in &plan.attributes {
        body.push(assign(&attr.member, &attr.member));
    }
    for child in &plan.children {
        if child.repeated {
            body.extend(default_when_none(&child.member, "[]"));
        } else if let (true, ValueKind::Complex(class)) = (child.instantiate, &child.value) {
            body.extend(default_when_none(&child.member, &format!("{}.factory()", class)));
        } else {
            body.push(assign(&child.member, &child.member));
        }
    }
    if plan.owns_simple_content() {
        body.push(assign("valueOf_", "valueOf_"));
    }
    if plan.owns_any_attribute() {
        body.extend(default_when_none("anyAttributes_", "{}"));
    }
    if plan.owns_mixed() {
        body.extend(default_when_none("mixedclass_", "MixedContainer"));
        body.extend(default_when_none("content_", "[]"));
    }
    block(header, body)
}

/// `factory`: a registered subclass, then the class hook, then the class
pub(super) fn factory(plan: &ClassPlan) -> Item {
    let class = &plan.class_name;
    block(
        "def factory(*args_, **kwargs_)",
        vec![
            text(format!("subclass = lookup_subclass({})", py_string(class))),
            block(
                "if subclass is not None",
                vec![text("return subclass(*args_, **kwargs_)")],
            ),
            block(
                format!("if {}.subclass", class),
                vec![text(format!("return {}.subclass(*args_, **kwargs_)", class))],
            ),
            text(format!("return {}(*args_, **kwargs_)", class)),
        ],
    )
}

/// Placed after `factory` so the name binds to the static method
pub(super) fn factory_binding() -> Item {
    text("factory = staticmethod(factory)")
}

fn assign(member: &str, value: &str) -> Item {
    line(vec![field(member), format!(" = {}", value).into()])
}

fn default_when_none(member: &str, fallback: &str) -> Vec<Item> {
    vec![
        block(
            format!("if {} is None", member),
            vec![assign(member, fallback)],
        ),
        block("else", vec![assign(member, member)]),
    ]
}

#[cfg(test)]
mod tests {
    use super::super::tests::{plan_of, rendered};
    use super::*;
    use pretty_assertions::assert_eq;

    const FOO: &str = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:element name="Foo">
    <xs:complexType>
      <xs:sequence>
        <xs:element name="bar" type="xs:string" maxOccurs="unbounded"/>
      </xs:sequence>
      <xs:attribute name="id" type="xs:string" use="required"/>
    </xs:complexType>
  </xs:element>
</xs:schema>"#;

    #[test]
    fn test_constructor_takes_sequence_and_scalar() {
        let plan = plan_of(FOO);
        let expected = "\
def __init__(self, id=None, bar=None):
    self.original_tagname_ = None
    self.id = id
    if bar is None:
        self.bar = []
    else:
        self.bar = bar
";
        assert_eq!(rendered(&constructor(&plan.classes[0])), expected);
    }

    #[test]
    fn test_factory_consults_registry_first() {
        let plan = plan_of(FOO);
        let text = rendered(&factory(&plan.classes[0]));
        assert!(text.starts_with("def factory(*args_, **kwargs_):\n    subclass = lookup_subclass('Foo')\n"));
        assert!(text.ends_with("    return Foo(*args_, **kwargs_)\n"));
    }

    #[test]
    fn test_member_specs_modes() {
        let plan = plan_of(FOO);
        let list = class_attributes(&plan.classes[0], MemberSpecs::List);
        let text: String = list.iter().map(rendered).collect();
        assert!(text.contains("    MemberSpec_('bar', 'xs:string', 1, 0),\n"));
        assert!(text.contains("    MemberSpec_('id', 'xs:string', 0, 0),\n"));
        let dict = class_attributes(&plan.classes[0], MemberSpecs::Dict);
        let text: String = dict.iter().map(rendered).collect();
        assert!(text.contains("    'bar': MemberSpec_('bar', 'xs:string', 1, 0),\n"));
        assert_eq!(class_attributes(&plan.classes[0], MemberSpecs::Off).len(), 3);
    }

    #[test]
    fn test_derived_constructor_passes_inherited_params() {
        let plan = plan_of(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:complexType name="shape">
    <xs:attribute name="color" type="xs:string"/>
  </xs:complexType>
  <xs:complexType name="circle">
    <xs:complexContent>
      <xs:extension base="shape">
        <xs:attribute name="radius" type="xs:double"/>
      </xs:extension>
    </xs:complexContent>
  </xs:complexType>
</xs:schema>"#,
        );
        let text = rendered(&constructor(&plan.classes[1]));
        assert!(text.starts_with("def __init__(self, color=None, radius=None, extensiontype_=None):\n"));
        assert!(text.contains(
            "    super(circle, self).__init__(color=color, extensiontype_=extensiontype_)\n"
        ));
        let base = rendered(&constructor(&plan.classes[0]));
        assert!(base.contains("    self.extensiontype_ = extensiontype_\n"));
    }
}
