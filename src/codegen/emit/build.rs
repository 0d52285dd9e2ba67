//! Deserializer: `build`, `buildAttributes`, `buildChildren`

use super::{attribute_key, parse_expr, super_call, validator_name};
use crate::codegen::ir::{block, field, line, text, Item, Listing};
use crate::codegen::plan::{ChildPlan, ClassPlan, ValueKind};
use crate::codegen::render::py_string;

pub(super) fn methods(plan: &ClassPlan) -> Vec<Item> {
    vec![build(plan), build_attributes(plan), build_children(plan)]
}

fn build(plan: &ClassPlan) -> Item {
    let mut body = Listing::new();
    body.text("already_processed = set()")
        .text("self.buildAttributes(node, node.attrib, already_processed)");
    if let Some(scalar) = &plan.simple_content {
        body.text(format!(
            "self.valueOf_ = {}",
            parse_expr(scalar, "get_all_text_(node)", "node", "valueOf_")
        ));
        if let Some(validator) = &scalar.validator {
            body.text(format!("self.{}(self.valueOf_)", validator_name(validator)));
        }
    }
    if plan.mixed {
        body.push(block("if node.text is not None", append_text("node.text")));
    }
    let mut per_child = vec![
        text("nodeName_ = Tag_pattern_.match(child.tag).groups()[-1]"),
        text("self.buildChildren(child, node, nodeName_)"),
    ];
    if plan.mixed {
        per_child.push(block("if child.tail is not None", append_text("child.tail")));
    }
    body.push(block("for child in node", per_child));
    body.text("return self");
    block("def build(self, node)", body.into_items())
}

/// Append a text run to `content_`
fn append_text(expr: &str) -> Vec<Item> {
    vec![
        text(format!(
            "obj_ = self.mixedclass_(MixedContainer.CategoryText, '', {})",
            expr
        )),
        line(vec![field("content_"), ".append(obj_)".into()]),
    ]
}

fn build_attributes(plan: &ClassPlan) -> Item {
    let mut body = Listing::new();
    if plan.owns_extension_type() {
        body.text("value = find_attr_value_('xsi:type', node)");
        body.push(block(
            "if value is not None and XSI_TYPE_ not in already_processed",
            vec![
                text("already_processed.add(XSI_TYPE_)"),
                line(vec![field("extensiontype_"), " = value".into()]),
            ],
        ));
    }
    for attr in &plan.attributes {
        let key = py_string(&attribute_key(&attr.name));
        body.text(format!(
            "value = find_attr_value_({}, node)",
            py_string(&attr.name)
        ));
        let mut statements = vec![
            text(format!("already_processed.add({})", key)),
            line(vec![
                field(&attr.member),
                format!(" = {}", parse_expr(&attr.scalar, "value", "node", &attr.name)).into(),
            ]),
        ];
        if let Some(validator) = &attr.scalar.validator {
            statements.push(line(vec![
                format!("self.{}(", validator_name(validator)).into(),
                field(&attr.member),
                ")".into(),
            ]));
        }
        body.push(block(
            format!("if value is not None and {} not in already_processed", key),
            statements,
        ));
    }
    if plan.superclass.is_some() {
        body.text(super_call(
            plan,
            "buildAttributes(node, attrs, already_processed)",
        ));
    }
    if plan.owns_any_attribute() {
        body.push(block(
            "for name, value in attrs.items()",
            vec![block(
                "if name not in already_processed",
                vec![line(vec![field("anyAttributes_"), "[name] = value".into()])],
            )],
        ));
    }
    if body.is_empty() {
        body.text("pass");
    }
    block(
        "def buildAttributes(self, node, attrs, already_processed)",
        body.into_items(),
    )
}

fn build_children(plan: &ClassPlan) -> Item {
    // (tag, member, value) for every branch of the dispatch chain
    let mut branches: Vec<(String, &ChildPlan, ValueKind)> = Vec::new();
    let mut wildcard = None;
    for child in &plan.children {
        if child.wildcard {
            wildcard = Some(child);
            continue;
        }
        branches.push((child.name.clone(), child, child.value.clone()));
        for substitute in &child.substitutes {
            if !branches.iter().any(|(tag, _, _)| *tag == substitute.name) {
                branches.push((substitute.name.clone(), child, substitute.value.clone()));
            }
        }
    }

    let mut chain: Vec<Item> = Vec::new();
    for (tag, child, value) in &branches {
        let keyword = if chain.is_empty() { "if" } else { "elif" };
        chain.push(block(
            format!("{} nodeName_ == {}", keyword, py_string(tag)),
            branch_body(plan, child, tag, value),
        ));
    }
    if plan.superclass.is_some() {
        let keyword = if chain.is_empty() { "if" } else { "elif" };
        chain.push(block(
            format!(
                "{} {}",
                keyword,
                super_call(plan, "buildChildren(child_, node, nodeName_, True)")
            ),
            vec![text("pass")],
        ));
    }

    let fallback = match wildcard {
        Some(child) => branch_body(plan, child, "", &ValueKind::Any),
        None => vec![text("return False")],
    };
    let mut body = Vec::new();
    if chain.is_empty() {
        body.extend(fallback);
        if wildcard.is_some() {
            body.push(text("return True"));
        }
    } else {
        body.extend(chain);
        body.push(block("else", fallback));
        body.push(text("return True"));
    }
    block(
        "def buildChildren(self, child_, node, nodeName_, fromsubclass_=False)",
        body,
    )
}

/// Statements handling one child element
fn branch_body(plan: &ClassPlan, child: &ChildPlan, tag: &str, value: &ValueKind) -> Vec<Item> {
    let mut body = Vec::new();
    match value {
        ValueKind::Scalar(scalar) => {
            if plan.mixed && scalar.is_list {
                body.push(text("value_ = child_.text"));
                body.push(store_mixed(tag, "CategorySimple", "value_", "string"));
                return body;
            }
            body.push(text(format!(
                "value_ = {}",
                parse_expr(scalar, "child_.text", "child_", tag)
            )));
            if let Some(validator) = &scalar.validator {
                body.push(text(format!("self.{}(value_)", validator_name(validator))));
            }
            if plan.mixed {
                body.push(store_mixed(tag, "CategorySimple", "value_", scalar.codec()));
            } else {
                body.push(store(child, "value_"));
            }
        }
        ValueKind::Complex(class) => {
            body.push(text(format!(
                "class_obj_ = self.get_class_obj_(child_, {})",
                class
            )));
            body.push(text("obj_ = class_obj_.factory()"));
            body.push(text("obj_.build(child_)"));
            body.push(text("obj_.original_tagname_ = nodeName_"));
            body.extend(store_object(plan, child, tag));
        }
        ValueKind::Any => {
            // A wildcard hands over the type declaring it.
            let type_name = if child.wildcard {
                &plan.type_name
            } else {
                &child.data_type
            };
            body.push(text(format!(
                "obj_ = self.gds_build_any(child_, {})",
                py_string(type_name)
            )));
            body.extend(store_object(plan, child, tag));
        }
    }
    body
}

fn store(child: &ChildPlan, value: &str) -> Item {
    if child.repeated {
        line(vec![field(&child.member), format!(".append({})", value).into()])
    } else {
        line(vec![field(&child.member), format!(" = {}", value).into()])
    }
}

fn store_object(plan: &ClassPlan, child: &ChildPlan, tag: &str) -> Vec<Item> {
    if !plan.mixed {
        return vec![store(child, "obj_")];
    }
    // Wildcard content keeps the element's own tag.
    let name = if child.wildcard {
        "nodeName_".to_string()
    } else {
        py_string(tag)
    };
    vec![
        text(format!(
            "obj_ = self.mixedclass_(MixedContainer.CategoryComplex, {}, obj_)",
            name
        )),
        line(vec![field("content_"), ".append(obj_)".into()]),
    ]
}

fn store_mixed(tag: &str, category: &str, value: &str, codec: &str) -> Item {
    line(vec![
        field("content_"),
        format!(
            ".append(self.mixedclass_(MixedContainer.{}, {}, {}, '{}'))",
            category,
            py_string(tag),
            value,
            codec
        )
        .into(),
    ])
}

#[cfg(test)]
mod tests {
    use super::super::tests::{plan_of, rendered};
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_attributes_parse_and_validate() {
        let plan = plan_of(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:simpleType name="Percent"><xs:restriction base="xs:int"/></xs:simpleType>
  <xs:complexType name="gauge">
    <xs:attribute name="level" type="Percent"/>
    <xs:attribute ref="xml:lang"/>
  </xs:complexType>
</xs:schema>"#,
        );
        let text = rendered(&build_attributes(&plan.classes[0]));
        assert!(text.contains("    value = find_attr_value_('level', node)\n"));
        assert!(text.contains(
            "        self.level = self.gds_parse_integer(value, node, 'level')\n        self.validate_Percent(self.level)\n"
        ));
    }

    #[test]
    fn test_dispatch_chain_with_wildcard_fallback() {
        let plan = plan_of(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:complexType name="envelope">
    <xs:sequence>
      <xs:element name="id" type="xs:long"/>
      <xs:any processContents="lax" minOccurs="0" maxOccurs="unbounded"/>
    </xs:sequence>
  </xs:complexType>
</xs:schema>"#,
        );
        let expected = "\
def buildChildren(self, child_, node, nodeName_, fromsubclass_=False):
    if nodeName_ == 'id':
        value_ = self.gds_parse_integer(child_.text, child_, 'id')
        self.id = value_
    else:
        obj_ = self.gds_build_any(child_, 'envelope')
        self.anytypeobjs_.append(obj_)
    return True
";
        assert_eq!(rendered(&build_children(&plan.classes[0])), expected);
    }

    #[test]
    fn test_derived_class_defers_to_base() {
        let plan = plan_of(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:complexType name="shape">
    <xs:sequence><xs:element name="label" type="xs:string"/></xs:sequence>
  </xs:complexType>
  <xs:complexType name="circle">
    <xs:complexContent>
      <xs:extension base="shape">
        <xs:sequence><xs:element name="center" type="shape"/></xs:sequence>
      </xs:extension>
    </xs:complexContent>
  </xs:complexType>
</xs:schema>"#,
        );
        let circle = plan.classes.iter().find(|c| c.type_name == "circle").unwrap();
        let text = rendered(&build_children(circle));
        assert!(text.contains("        class_obj_ = self.get_class_obj_(child_, shape)\n"));
        assert!(text.contains("    elif super(circle, self).buildChildren(child_, node, nodeName_, True):\n        pass\n"));
        assert!(text.ends_with("    else:\n        return False\n    return True\n"));
    }

    #[test]
    fn test_mixed_build_keeps_text_runs() {
        let plan = plan_of(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:complexType name="para" mixed="true">
    <xs:sequence><xs:element name="em" type="xs:string" minOccurs="0" maxOccurs="unbounded"/></xs:sequence>
  </xs:complexType>
</xs:schema>"#,
        );
        let class = &plan.classes[0];
        let text = rendered(&build(class));
        assert!(text.contains("            obj_ = self.mixedclass_(MixedContainer.CategoryText, '', child.tail)\n"));
        let children = rendered(&build_children(class));
        assert!(children.contains(
            "        self.content_.append(self.mixedclass_(MixedContainer.CategorySimple, 'em', value_, 'string'))\n"
        ));
    }
}
