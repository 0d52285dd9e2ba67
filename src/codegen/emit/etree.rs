//! Element-tree mode: `to_etree`

use super::{attribute_key, child_tag, format_expr, super_call};
use crate::codegen::ir::{block, field, line, text, Fragment, Item};
use crate::codegen::plan::{ChildPlan, ClassPlan, ValueKind};
use crate::codegen::render::py_string;

pub(super) fn to_etree(plan: &ClassPlan) -> Item {
    let mut body = Vec::new();
    if plan.superclass.is_some() {
        body.push(text(format!(
            "element = {}",
            super_call(plan, "to_etree(parent_element, name_, mapping_)")
        )));
    } else {
        body.push(block(
            vec!["if ".into(), field("original_tagname_"), " is not None".into()],
            vec![line(vec!["name_ = ".into(), field("original_tagname_")])],
        ));
        body.push(block(
            "if parent_element is None",
            vec![text("element = etree_.Element(name_)")],
        ));
        body.push(block(
            "else",
            vec![text("element = etree_.SubElement(parent_element, name_)")],
        ));
    }
    if plan.owns_extension_type() {
        body.push(block(
            vec!["if ".into(), field("extensiontype_"), " is not None".into()],
            vec![line(vec![
                "element.set(XSI_TYPE_, ".into(),
                field("extensiontype_"),
                ")".into(),
            ])],
        ));
    }
    for attr in &plan.attributes {
        let mut set: Vec<Fragment> = vec![format!(
            "element.set({}, ",
            py_string(&attribute_key(&attr.name))
        )
        .into()];
        set.extend(format_expr(&attr.scalar, field(&attr.member), &attr.name));
        set.push(")".into());
        body.push(block(
            vec!["if ".into(), field(&attr.member), " is not None".into()],
            vec![line(set)],
        ));
    }
    if plan.owns_any_attribute() {
        body.push(block(
            vec!["if ".into(), field("anyAttributes_"), " is not None".into()],
            vec![block(
                vec![
                    "for name, value in ".into(),
                    field("anyAttributes_"),
                    ".items()".into(),
                ],
                vec![text("element.set(name, value)")],
            )],
        ));
    }
    if plan.owns_mixed() {
        body.push(block(
            vec!["for item_ in ".into(), field("content_")],
            vec![text("item_.to_etree(element, mapping_)")],
        ));
    } else if !plan.mixed {
        for child in &plan.children {
            body.push(etree_child(child));
        }
    }
    if plan.owns_simple_content() {
        if let Some(scalar) = &plan.simple_content {
            let mut assign: Vec<Fragment> = vec!["element.text = ".into()];
            assign.extend(format_expr(scalar, field("valueOf_"), "valueOf_"));
            body.push(block(
                vec!["if ".into(), field("valueOf_"), " is not None".into()],
                vec![line(assign)],
            ));
        }
    }
    body.push(block(
        "if mapping_ is not None",
        vec![text("mapping_[id(self)] = element")],
    ));
    body.push(text("return element"));
    block(
        format!(
            "def to_etree(self, parent_element=None, name_={}, mapping_=None)",
            py_string(&plan.type_name)
        ),
        body,
    )
}

fn etree_child(child: &ChildPlan) -> Item {
    let item = format!("{}_", child.member);
    let value: Fragment = if child.repeated {
        item.as_str().into()
    } else {
        field(&child.member)
    };
    let statement = match &child.value {
        ValueKind::Scalar(scalar) => {
            let mut assign: Vec<Fragment> = vec![format!(
                "etree_.SubElement(element, {}).text = ",
                py_string(&child.name)
            )
            .into()];
            assign.extend(format_expr(scalar, value, &child.name));
            line(assign)
        }
        ValueKind::Complex(_) => {
            let mut call = vec![value.clone(), ".to_etree(element, name_=".into()];
            call.extend(child_tag(child, value));
            call.push(", mapping_=mapping_)".into());
            line(call)
        }
        ValueKind::Any => line(vec![
            "gds_etree_any_(".into(),
            value,
            ", element, mapping_)".into(),
        ]),
    };
    if child.repeated {
        block(
            vec![format!("for {} in ", item).into(), field(&child.member)],
            vec![statement],
        )
    } else {
        block(
            vec!["if ".into(), field(&child.member), " is not None".into()],
            vec![statement],
        )
    }
}
