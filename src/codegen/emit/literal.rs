//! Literal mode: Python source that reconstructs the object

use super::{attribute_key, member_tags, super_call};
use crate::codegen::ir::{block, field, line, text, Fragment, Item};
use crate::codegen::plan::{ChildPlan, ClassPlan, ValueKind};
use crate::codegen::render::py_string;

pub(super) fn methods(plan: &ClassPlan) -> Vec<Item> {
    vec![
        export_literal(plan),
        export_literal_attributes(plan),
        export_literal_children(plan),
    ]
}

fn export_literal(plan: &ClassPlan) -> Item {
    block(
        format!(
            "def exportLiteral(self, outfile, level, name_={})",
            py_string(&plan.type_name)
        ),
        vec![
            text("level += 1"),
            text("already_processed = set()"),
            text("self.exportLiteralAttributes(outfile, level, already_processed, name_)"),
            block(
                "if self.hasContent_()",
                vec![text("self.exportLiteralChildren(outfile, level, name_)")],
            ),
        ],
    )
}

/// `showIndent` followed by one `outfile.write`
fn write_line(parts: Vec<Fragment>) -> Vec<Item> {
    let mut write: Vec<Fragment> = vec!["outfile.write(".into()];
    write.extend(parts);
    write.push(")".into());
    vec![text("showIndent(outfile, level)"), line(write)]
}

fn export_literal_attributes(plan: &ClassPlan) -> Item {
    let mut body = Vec::new();
    if plan.owns_extension_type() {
        let mut statements = vec![text("already_processed.add(XSI_TYPE_)")];
        statements.extend(write_line(vec![
            "'extensiontype_=%s,\\n' % (quote_python(".into(),
            field("extensiontype_"),
            "), )".into(),
        ]));
        body.push(block(
            vec![
                "if ".into(),
                field("extensiontype_"),
                " is not None and XSI_TYPE_ not in already_processed".into(),
            ],
            statements,
        ));
    }
    for attr in &plan.attributes {
        let key = py_string(&attribute_key(&attr.name));
        let mut statements = vec![text(format!("already_processed.add({})", key))];
        statements.extend(write_line(vec![
            format!("'{}=%s,\\n' % (literal_value_(", attr.member).into(),
            field(&attr.member),
            "), )".into(),
        ]));
        body.push(block(
            vec![
                "if ".into(),
                field(&attr.member),
                format!(" is not None and {} not in already_processed", key).into(),
            ],
            statements,
        ));
    }
    if plan.superclass.is_some() {
        body.push(text(super_call(
            plan,
            "exportLiteralAttributes(outfile, level, already_processed, name_)",
        )));
    }
    if plan.owns_any_attribute() {
        body.push(block(
            vec!["if ".into(), field("anyAttributes_")],
            write_line(vec![
                "'anyAttributes_=%s,\\n' % (literal_value_(".into(),
                field("anyAttributes_"),
                "), )".into(),
            ]),
        ));
    }
    if body.is_empty() {
        body.push(text("pass"));
    }
    block(
        "def exportLiteralAttributes(self, outfile, level, already_processed, name_)",
        body,
    )
}

fn export_literal_children(plan: &ClassPlan) -> Item {
    let mut body = Vec::new();
    if plan.superclass.is_some() {
        body.push(text(super_call(
            plan,
            "exportLiteralChildren(outfile, level, name_)",
        )));
    }
    // Members of a mixed class are only reachable through `content_`, which
    // the class owning it writes.
    if !plan.mixed {
        for child in &plan.children {
            body.push(literal_child(child));
        }
    }
    if plan.owns_simple_content() {
        body.push(block(
            vec!["if ".into(), field("valueOf_"), " is not None".into()],
            write_line(vec![
                "'valueOf_=%s,\\n' % (literal_value_(".into(),
                field("valueOf_"),
                "), )".into(),
            ]),
        ));
    }
    if plan.owns_mixed() {
        let mut items = write_line(vec!["'content_=[\\n'".into()]);
        items.push(block(
            vec!["for item_ in ".into(), field("content_")],
            vec![text("item_.exportLiteral(outfile, level + 1, name_)")],
        ));
        items.extend(write_line(vec!["'],\\n'".into()]));
        body.extend(items);
    }
    if body.is_empty() {
        body.push(text("pass"));
    }
    block("def exportLiteralChildren(self, outfile, level, name_)", body)
}

fn literal_child(child: &ChildPlan) -> Item {
    let member = &child.member;
    let item = format!("{}_", member);
    match (&child.value, child.repeated) {
        (ValueKind::Scalar(_), false) => block(
            vec!["if ".into(), field(member), " is not None".into()],
            write_line(vec![
                format!("'{}=%s,\\n' % (literal_value_(", member).into(),
                field(member),
                "), )".into(),
            ]),
        ),
        (ValueKind::Scalar(_), true) => {
            let mut body = write_line(vec![format!("'{}=[\\n'", member).into()]);
            body.push(text("level += 1"));
            body.push(block(
                vec![format!("for {} in ", item).into(), field(member)],
                write_line(vec![
                    format!("'%s,\\n' % (literal_value_({}), )", item).into()
                ]),
            ));
            body.push(text("level -= 1"));
            body.extend(write_line(vec!["'],\\n'".into()]));
            block(vec!["if ".into(), field(member)], body)
        }
        (ValueKind::Complex(_), false) => {
            let tagged = member_tags(child).is_some();
            let mut body = write_line(vec![
                format!("'{}={}(\\n' % ", member, open_object(tagged)).into(),
                field(member),
                ".model_name_".into(),
            ]);
            body.push(line(vec![
                field(member),
                format!(".exportLiteral(outfile, level, name_='{}')", member).into(),
            ]));
            body.extend(close_object(tagged, field(member)));
            block(vec!["if ".into(), field(member), " is not None".into()], body)
        }
        (ValueKind::Complex(_), true) => {
            let tagged = member_tags(child).is_some();
            let mut each = write_line(vec![format!(
                "'{}(\\n' % {}.model_name_",
                open_object(tagged),
                item
            )
            .into()]);
            each.push(text(format!(
                "{}.exportLiteral(outfile, level, name_='{}')",
                item, member
            )));
            each.extend(close_object(tagged, item.as_str().into()));
            let mut body = write_line(vec![format!("'{}=[\\n'", member).into()]);
            body.push(text("level += 1"));
            body.push(block(
                vec![format!("for {} in ", item).into(), field(member)],
                each,
            ));
            body.push(text("level -= 1"));
            body.extend(write_line(vec!["'],\\n'".into()]));
            block(vec!["if ".into(), field(member)], body)
        }
        (ValueKind::Any, false) => {
            let mut body = write_line(vec![format!("'{}=\\n'", member).into()]);
            body.push(line(vec![
                "gds_literal_any_(".into(),
                field(member),
                format!(", outfile, level, '{}')", member).into(),
            ]));
            block(vec!["if ".into(), field(member), " is not None".into()], body)
        }
        (ValueKind::Any, true) => {
            let mut body = write_line(vec![format!("'{}=[\\n'", member).into()]);
            body.push(text("level += 1"));
            body.push(block(
                vec![format!("for {} in ", item).into(), field(member)],
                vec![text(format!(
                    "gds_literal_any_({}, outfile, level, '{}')",
                    item, member
                ))],
            ));
            body.push(text("level -= 1"));
            body.extend(write_line(vec!["'],\\n'".into()]));
            block(vec!["if ".into(), field(member)], body)
        }
    }
}

/// Opening of a constructor call; objects in substitution slots are wrapped
/// so the rebuilt object keeps the tag it was read with
fn open_object(tagged: bool) -> &'static str {
    if tagged {
        "model_.gds_tagged_(model_.%s"
    } else {
        "model_.%s"
    }
}

fn close_object(tagged: bool, object: Fragment) -> Vec<Item> {
    if tagged {
        write_line(vec![
            "'), %s),\\n' % (quote_python(".into(),
            object,
            ".original_tagname_), )".into(),
        ])
    } else {
        write_line(vec!["'),\\n'".into()])
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{plan_of, rendered, SUBSTITUTION};
    use super::*;

    #[test]
    fn test_complex_child_names_its_class() {
        let plan = plan_of(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:complexType name="point"><xs:attribute name="x" type="xs:int"/></xs:complexType>
  <xs:complexType name="segment">
    <xs:sequence>
      <xs:element name="start" type="point"/>
      <xs:element name="via" type="point" minOccurs="0" maxOccurs="unbounded"/>
    </xs:sequence>
  </xs:complexType>
</xs:schema>"#,
        );
        let segment = plan.classes.iter().find(|c| c.type_name == "segment").unwrap();
        let text = rendered(&export_literal_children(segment));
        assert!(text.contains("        outfile.write('start=model_.%s(\\n' % self.start.model_name_)\n"));
        assert!(text.contains("        self.start.exportLiteral(outfile, level, name_='start')\n"));
        assert!(text.contains("        for via_ in self.via:\n"));
        assert!(text.contains("            via_.exportLiteral(outfile, level, name_='via')\n"));
    }

    #[test]
    fn test_scalar_attribute_written_as_literal() {
        let plan = plan_of(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:complexType name="point"><xs:attribute name="x" type="xs:int"/></xs:complexType>
</xs:schema>"#,
        );
        let text = rendered(&export_literal_attributes(&plan.classes[0]));
        assert!(text.contains("if self.x is not None and 'x' not in already_processed:"));
        assert!(text.contains("outfile.write('x=%s,\\n' % (literal_value_(self.x), ))"));
    }

    #[test]
    fn test_empty_type_writes_nothing() {
        let plan = plan_of(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:complexType name="marker"/>
</xs:schema>"#,
        );
        assert_eq!(
            rendered(&export_literal_children(&plan.classes[0])),
            "def exportLiteralChildren(self, outfile, level, name_):\n    pass\n"
        );
    }

    #[test]
    fn test_substitution_slot_keeps_read_tag() {
        let plan = plan_of(SUBSTITUTION);
        let drawing = plan.classes.iter().find(|c| c.type_name == "Drawing").unwrap();
        let text = rendered(&export_literal_children(drawing));
        assert!(text.contains(
            "outfile.write('model_.gds_tagged_(model_.%s(\\n' % shape_.model_name_)"
        ));
        assert!(text.contains(
            "outfile.write('), %s),\\n' % (quote_python(shape_.original_tagname_), ))"
        ));
    }

    #[test]
    fn test_any_attributes_written_as_mapping() {
        let plan = plan_of(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:complexType name="open">
    <xs:attribute name="id" type="xs:string"/>
    <xs:anyAttribute processContents="skip"/>
  </xs:complexType>
</xs:schema>"#,
        );
        let text = rendered(&export_literal_attributes(&plan.classes[0]));
        assert!(text.contains(
            "outfile.write('anyAttributes_=%s,\\n' % (literal_value_(self.anyAttributes_), ))"
        ));
        assert!(!text.contains("repr("));
    }
}
