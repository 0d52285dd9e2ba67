//! Validator hooks, one per simple type the class uses

use super::validator_name;
use crate::codegen::ir::{block, text, Item};
use crate::codegen::plan::ClassPlan;
use crate::codegen::validators::{dedent, ValidatorBodySource};

pub(super) fn validators(plan: &ClassPlan, bodies: &dyn ValidatorBodySource) -> Vec<Item> {
    plan.validators
        .iter()
        .map(|(type_name, builtin)| {
            let mut body = vec![text(format!(
                "# Validate type {}, a restriction on {}.",
                type_name, builtin
            ))];
            match bodies.body(type_name) {
                Some(source) if !source.trim().is_empty() => {
                    body.push(Item::Verbatim(dedent(&source)));
                }
                _ => body.push(text("pass")),
            }
            block(
                format!("def {}(self, value)", validator_name(type_name)),
                body,
            )
        })
        .collect()
}
