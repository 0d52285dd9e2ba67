//! The subclass module
//!
//! One empty subclass per generated class, registered with the primary
//! module's subclass registry so its `factory` builds the subclass instead.
//! Users edit this module; the primary module is regenerated freely.

use super::ir::{block, text, Item, Listing};
use super::options::GeneratorOptions;
use super::plan::{ClassPlan, ModulePlan};
use super::render::py_string;

/// Header comment and imports of the subclass module
pub fn header(source_name: &str, options: &GeneratorOptions) -> String {
    let mut out = String::new();
    out.push_str("#!/usr/bin/env python\n");
    out.push_str("# -*- coding: utf-8 -*-\n\n");
    out.push_str("#\n");
    out.push_str(&format!(
        "# Generated by xsdbind {} from {}\n",
        env!("CARGO_PKG_VERSION"),
        source_name
    ));
    out.push_str("#\n\n");
    out.push_str("import sys\n\n");
    out.push_str(&format!("import {} as supermod\n\n", options.super_module));
    out.push_str("etree_ = supermod.etree_\n\n\n");
    out
}

/// Subclass definitions, registrations and parse entry points
pub fn body(plan: &ModulePlan, options: &GeneratorOptions) -> Vec<Item> {
    let mut listing = Listing::new();
    for class in &plan.classes {
        let name = subclass_name(class, options);
        listing.push(subclass(class, &name));
        listing.push(Item::Blank);
        listing.push(Item::Blank);
        listing.text(format!(
            "supermod.register_subclass({}, {})",
            py_string(&class.class_name),
            name
        ));
        listing.push(Item::Blank);
        listing.push(Item::Blank);
    }

    for signature in ["parse", "parseString"] {
        listing.push(block(
            format!("def {}(source, silence=False)", signature),
            vec![text(format!("return supermod.{}(source, silence)", signature))],
        ));
        listing.push(Item::Blank);
        listing.push(Item::Blank);
    }
    if options.export.etree {
        listing.push(block(
            "def parseEtree(source, silence=False)",
            vec![text("return supermod.parseEtree(source, silence)")],
        ));
        listing.push(Item::Blank);
        listing.push(Item::Blank);
    }
    if options.export.literal {
        listing.push(block(
            "def parseLiteral(source, silence=False)",
            vec![text("return supermod.parseLiteral(source, silence)")],
        ));
        listing.push(Item::Blank);
        listing.push(Item::Blank);
    }

    listing.push(block(
        "def main()",
        vec![
            text("args = sys.argv[1:]"),
            block("if len(args) != 1", vec![text("supermod.usage()")]),
            text("parse(args[0])"),
        ],
    ));
    listing.push(Item::Blank);
    listing.push(Item::Blank);
    listing.push(block("if __name__ == '__main__'", vec![text("main()")]));
    listing.into_items()
}

/// Name of the subclass of `class`
pub fn subclass_name(class: &ClassPlan, options: &GeneratorOptions) -> String {
    format!("{}{}", class.class_name, options.subclass_suffix)
}

fn subclass(class: &ClassPlan, name: &str) -> Item {
    let mut params: Vec<String> = class
        .all_params()
        .into_iter()
        .map(|p| format!("{}={}", p.name, p.default))
        .collect();
    let mut args: Vec<String> = class
        .all_params()
        .into_iter()
        .map(|p| format!("{0}={0}", p.name))
        .collect();
    if class.takes_extension_type() {
        params.push("extensiontype_=None".to_string());
        args.push("extensiontype_=extensiontype_".to_string());
    }
    let header = format!(
        "def __init__(self{})",
        params.iter().map(|p| format!(", {}", p)).collect::<String>()
    );
    block(
        format!("class {}(supermod.{})", name, class.class_name),
        vec![block(
            header,
            vec![text(format!(
                "super({}, self).__init__({})",
                name,
                args.join(", ")
            ))],
        )],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::plan::plan_module;
    use crate::codegen::render::PythonRenderer;
    use crate::ingest::ingest_str;
    use crate::model::Session;
    use crate::resolve::resolve;
    use pretty_assertions::assert_eq;

    fn plan_of(xsd: &str) -> ModulePlan {
        let mut session = Session::new();
        ingest_str(&mut session, xsd).unwrap();
        resolve(&mut session).unwrap();
        plan_module(&mut session, "").unwrap()
    }

    const SHAPES: &str = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:complexType name="shape">
    <xs:attribute name="color" type="xs:string" default="black"/>
  </xs:complexType>
  <xs:complexType name="circle">
    <xs:complexContent>
      <xs:extension base="shape">
        <xs:attribute name="radius" type="xs:double"/>
      </xs:extension>
    </xs:complexContent>
  </xs:complexType>
</xs:schema>"#;

    #[test]
    fn test_subclass_forwards_every_parameter() {
        let plan = plan_of(SHAPES);
        let circle = plan.classes.iter().find(|c| c.type_name == "circle").unwrap();
        let expected = "\
class circleSub(supermod.circle):
    def __init__(self, color='black', radius=None, extensiontype_=None):
        super(circleSub, self).__init__(color=color, radius=radius, extensiontype_=extensiontype_)
";
        assert_eq!(
            PythonRenderer::new().render(&[subclass(circle, "circleSub")]),
            expected
        );
    }

    #[test]
    fn test_every_class_is_registered() {
        let plan = plan_of(SHAPES);
        let options = GeneratorOptions::new().with_subclasses("shapes");
        let text = PythonRenderer::new().render(&body(&plan, &options));
        assert!(text.contains("supermod.register_subclass('shape', shapeSub)"));
        assert!(text.contains("supermod.register_subclass('circle', circleSub)"));
        assert!(header("shapes.xsd", &options).contains("import shapes as supermod\n"));
    }

    #[test]
    fn test_suffix_is_configurable() {
        let plan = plan_of(SHAPES);
        let options = GeneratorOptions::new().with_subclass_suffix("Impl");
        assert_eq!(subclass_name(&plan.classes[0], &options), "shapeImpl");
    }
}
