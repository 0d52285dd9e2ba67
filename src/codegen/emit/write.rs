//! Write mode: `export`, `exportAttributes`, `exportChildren`

use super::{attribute_key, child_tag, eol_setup, format_expr, super_call};
use crate::codegen::ir::{block, field, line, text, Fragment, Item};
use crate::codegen::plan::{ChildPlan, ClassPlan, ValueKind};
use crate::codegen::render::py_string;

pub(super) fn methods(plan: &ClassPlan) -> Vec<Item> {
    vec![export(plan), export_attributes(plan), export_children(plan)]
}

fn export(plan: &ClassPlan) -> Item {
    let default_name = py_string(&plan.type_name);
    let inline = plan.simple_content.is_some() || plan.mixed;

    let mut with_content = vec![];
    if inline {
        with_content.push(text("outfile.write('>')"));
        if let Some(scalar) = &plan.simple_content {
            let mut write = vec!["outfile.write(quote_xml(".into()];
            write.extend(format_expr(scalar, field("valueOf_"), "valueOf_"));
            write.push("))".into());
            with_content.push(block(
                vec!["if ".into(), field("valueOf_"), " is not None".into()],
                vec![line(write)],
            ));
        }
        if plan.mixed {
            with_content.push(text(
                "self.exportChildren(outfile, level + 1, namespace_, name_, pretty_print=False)",
            ));
        }
    } else {
        with_content.push(text("outfile.write('>%s' % (eol_, ))"));
        with_content.push(text(
            "self.exportChildren(outfile, level + 1, namespace_, name_, pretty_print=pretty_print)",
        ));
        with_content.push(text("showIndent(outfile, level, pretty_print)"));
    }
    with_content.push(text("outfile.write('</%s%s>%s' % (namespace_, name_, eol_))"));

    let mut body = eol_setup();
    body.extend([
        block(
            vec!["if ".into(), field("original_tagname_"), " is not None".into()],
            vec![line(vec!["name_ = ".into(), field("original_tagname_")])],
        ),
        text("showIndent(outfile, level, pretty_print)"),
        text("outfile.write('<%s%s%s' % (namespace_, name_, namespacedef_ and ' ' + namespacedef_ or ''))"),
        text("already_processed = set()"),
        text(format!(
            "self.exportAttributes(outfile, level, already_processed, namespace_, name_={})",
            default_name
        )),
        block("if self.hasContent_()", with_content),
        block("else", vec![text("outfile.write('/>%s' % (eol_, ))")]),
    ]);
    block(
        format!(
            "def export(self, outfile, level, namespace_='', name_={}, namespacedef_='', pretty_print=True)",
            default_name
        ),
        body,
    )
}

fn export_attributes(plan: &ClassPlan) -> Item {
    let default_name = py_string(&plan.type_name);
    let mut body = Vec::new();

    if plan.owns_extension_type() {
        body.push(block(
            vec![
                "if ".into(),
                field("extensiontype_"),
                " is not None and XSI_TYPE_ not in already_processed".into(),
            ],
            vec![
                text("already_processed.add(XSI_TYPE_)"),
                text("outfile.write(' xmlns:xsi=\"%s\"' % XSI_NAMESPACE_)"),
                line(vec![
                    "outfile.write(' xsi:type=\"%s\"' % ".into(),
                    field("extensiontype_"),
                    ")".into(),
                ]),
            ],
        ));
    }
    for attr in &plan.attributes {
        let key = py_string(&attribute_key(&attr.name));
        let mut write = vec![format!(
            "outfile.write(' {}=%s' % (quote_attrib(",
            attr.name
        )
        .into()];
        write.extend(format_expr(&attr.scalar, field(&attr.member), &attr.name));
        write.push("), ))".into());
        body.push(block(
            vec![
                "if ".into(),
                field(&attr.member),
                format!(" is not None and {} not in already_processed", key).into(),
            ],
            vec![text(format!("already_processed.add({})", key)), line(write)],
        ));
    }
    if plan.superclass.is_some() {
        body.push(text(super_call(
            plan,
            "exportAttributes(outfile, level, already_processed, namespace_, name_=name_)",
        )));
    }
    if plan.owns_any_attribute() {
        body.push(block(
            vec!["if ".into(), field("anyAttributes_"), " is not None".into()],
            vec![block(
                vec![
                    "for index_, (name, value) in enumerate(".into(),
                    field("anyAttributes_"),
                    ".items())".into(),
                ],
                vec![block(
                    "if name not in already_processed",
                    vec![
                        text("already_processed.add(name)"),
                        block(
                            "if name.startswith('{')",
                            vec![
                                text("uri, local = name[1:].split('}', 1)"),
                                block(
                                    "if uri == XML_NAMESPACE_",
                                    vec![text(
                                        "outfile.write(' xml:%s=%s' % (local, quote_attrib(value)))",
                                    )],
                                ),
                                block(
                                    "else",
                                    vec![text(
                                        "outfile.write(' xmlns:anyns%d=\"%s\" anyns%d:%s=%s' % (index_, uri, index_, local, quote_attrib(value)))",
                                    )],
                                ),
                            ],
                        ),
                        block(
                            "else",
                            vec![text("outfile.write(' %s=%s' % (name, quote_attrib(value)))")],
                        ),
                    ],
                )],
            )],
        ));
    }
    block(
        format!(
            "def exportAttributes(self, outfile, level, already_processed, namespace_='', name_={})",
            default_name
        ),
        body,
    )
}

fn export_children(plan: &ClassPlan) -> Item {
    let header = format!(
        "def exportChildren(self, outfile, level, namespace_='', name_={}, fromsubclass_=False, pretty_print=True)",
        py_string(&plan.type_name)
    );
    if plan.mixed {
        // Mixed content lives in `content_` in document order, inherited
        // members included.
        return block(
            header,
            vec![block(
                vec!["for item_ in ".into(), field("content_")],
                vec![text(
                    "item_.export(outfile, level, item_.name, namespace_, pretty_print=pretty_print)",
                )],
            )],
        );
    }

    let mut body = Vec::new();
    if plan.superclass.is_some() {
        body.push(text(super_call(
            plan,
            "exportChildren(outfile, level, namespace_, name_, True, pretty_print=pretty_print)",
        )));
    }
    if plan
        .children
        .iter()
        .any(|c| matches!(c.value, ValueKind::Scalar(_)))
    {
        body.extend(eol_setup());
    }
    for child in &plan.children {
        body.push(export_child(child));
    }
    block(header, body)
}

fn export_child(child: &ChildPlan) -> Item {
    let item = format!("{}_", child.member);
    let value: Fragment = if child.repeated {
        item.as_str().into()
    } else {
        field(&child.member)
    };
    let statements = match &child.value {
        ValueKind::Scalar(scalar) => {
            let mut write = vec![format!(
                "outfile.write('<%s{0}>%s</%s{0}>%s' % (namespace_, quote_xml(",
                child.name
            )
            .into()];
            write.extend(format_expr(scalar, value.clone(), &child.name));
            write.push("), namespace_, eol_))".into());
            vec![text("showIndent(outfile, level, pretty_print)"), line(write)]
        }
        ValueKind::Complex(_) => {
            let mut call = vec![
                value.clone(),
                ".export(outfile, level, namespace_, name_=".into(),
            ];
            call.extend(child_tag(child, value.clone()));
            call.push(", pretty_print=pretty_print)".into());
            vec![line(call)]
        }
        ValueKind::Any => {
            let name = if child.wildcard {
                "None".to_string()
            } else {
                py_string(&child.name)
            };
            vec![line(vec![
                "gds_export_any_(".into(),
                value.clone(),
                format!(
                    ", outfile, level, namespace_, {}, pretty_print=pretty_print)",
                    name
                )
                .into(),
            ])]
        }
    };
    if child.repeated {
        block(
            vec![format!("for {} in ", item).into(), field(&child.member)],
            statements,
        )
    } else {
        block(
            vec!["if ".into(), field(&child.member), " is not None".into()],
            statements,
        )
    }
}
