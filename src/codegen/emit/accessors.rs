//! Get/set pairs, plus list operations for repeated members

use crate::codegen::ir::{block, field, line, Item};
use crate::codegen::options::GetterSetter;
use crate::codegen::plan::ClassPlan;

pub(super) fn accessors(plan: &ClassPlan, style: GetterSetter) -> Vec<Item> {
    let mut items = Vec::new();
    for attr in &plan.attributes {
        items.extend(pair(&attr.member, style));
    }
    for child in &plan.children {
        items.extend(pair(&child.member, style));
        if child.repeated {
            items.extend(list_operations(&child.member, style));
        }
    }
    if plan.owns_simple_content() {
        items.extend(pair("valueOf_", style));
    }
    if plan.owns_any_attribute() {
        items.extend(pair("anyAttributes_", style));
    }
    if plan.owns_extension_type() {
        items.extend(pair("extensiontype_", style));
    }
    items
}

fn pair(member: &str, style: GetterSetter) -> Vec<Item> {
    vec![
        block(
            format!("def {}(self)", style.accessor("get", member)),
            vec![line(vec!["return ".into(), field(member)])],
        ),
        block(
            format!("def {}(self, {})", style.accessor("set", member), member),
            vec![line(vec![field(member), format!(" = {}", member).into()])],
        ),
    ]
}

fn list_operations(member: &str, style: GetterSetter) -> Vec<Item> {
    vec![
        block(
            format!("def {}(self, value)", style.accessor("add", member)),
            vec![line(vec![field(member), ".append(value)".into()])],
        ),
        block(
            format!("def {}(self, index, value)", style.accessor("insert", member)),
            vec![line(vec![field(member), ".insert(index, value)".into()])],
        ),
        block(
            format!("def {}(self, index, value)", style.accessor("replace", member)),
            vec![line(vec![field(member), "[index] = value".into()])],
        ),
    ]
}
