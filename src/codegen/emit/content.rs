//! `hasContent_`: whether an element has anything between its tags

use super::super_call;
use crate::codegen::ir::{block, field, text, Fragment, Item};
use crate::codegen::plan::ClassPlan;

pub(super) fn has_content(plan: &ClassPlan) -> Item {
    let mut checks: Vec<Vec<Fragment>> = Vec::new();
    for child in &plan.children {
        if child.repeated {
            checks.push(vec![field(&child.member)]);
        } else {
            checks.push(vec![field(&child.member), " is not None".into()]);
        }
    }
    if plan.owns_simple_content() {
        checks.push(vec![field("valueOf_"), " is not None".into()]);
    }
    if plan.owns_mixed() {
        checks.push(vec![field("content_")]);
    }
    if plan.superclass.is_some() {
        checks.push(vec![super_call(plan, "hasContent_()").into()]);
    }

    if checks.is_empty() {
        return block("def hasContent_(self)", vec![text("return False")]);
    }
    let mut condition: Vec<Fragment> = vec!["if (".into()];
    for (index, check) in checks.into_iter().enumerate() {
        if index > 0 {
            condition.push(" or ".into());
        }
        condition.extend(check);
    }
    condition.push(")".into());
    block(
        "def hasContent_(self)",
        vec![
            block(condition, vec![text("return True")]),
            block("else", vec![text("return False")]),
        ],
    )
}
