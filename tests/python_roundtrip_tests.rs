//! Round trips through generated modules
//!
//! Generates a module, then runs it with `python3`: an instance document is
//! built, serialized in each mode, rebuilt and compared field by field.
//! Skipped when `python3` is not on the PATH.

use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;
use xsdbind::codegen::{ExportModes, Generator, GeneratorOptions};
use xsdbind::{generate_from_file, generate_from_str, GeneratedOutput};

/// Builds `argv[3]` with module `argv[2]` from directory `argv[1]`, then
/// checks the write, etree and literal round trips
const ROUND_TRIP: &str = r#"
import datetime
import importlib
import io
import sys
import xml.etree.ElementTree as etree
from decimal import Decimal

sys.path.insert(0, sys.argv[1])
model = importlib.import_module(sys.argv[2])


def snapshot(value):
    if isinstance(value, model.GeneratedsSuper):
        fields = {}
        for key, item in vars(value).items():
            if key in ('original_tagname_', 'mixedclass_'):
                continue
            fields[key] = snapshot(item)
        return (type(value).__name__, fields)
    if isinstance(value, model.MixedContainer):
        return ('MixedContainer', value.category, value.name,
                snapshot(value.value), value.codec)
    if isinstance(value, list):
        return [snapshot(item) for item in value]
    if isinstance(value, dict):
        return dict((key, snapshot(item)) for key, item in value.items())
    if etree.iselement(value):
        return model._element_text(value)
    return value


def build(node):
    tag, root_class = model.get_root_tag(node)
    obj = root_class.factory()
    obj.build(node)
    return tag, obj


def write_text(obj, tag):
    out = io.StringIO()
    obj.export(out, 0, name_=tag)
    return out.getvalue()


def literal_text(obj, tag):
    out = io.StringIO()
    out.write('rootObj = model_.%s(\n' % obj.model_name_)
    obj.exportLiteral(out, 0, name_=tag)
    out.write(')\n')
    return out.getvalue()


def check(label, expected, actual):
    if expected != actual:
        sys.stderr.write('%s mismatch\nexpected: %r\nactual:   %r\n' % (label, expected, actual))
        sys.exit(1)


tag, original = build(etree.parse(sys.argv[3]).getroot())
expected = snapshot(original)

text = write_text(original, tag)
check('write', expected, snapshot(build(etree.fromstring(text))[1]))

element = original.to_etree(None, name_=tag)
check('etree', expected, snapshot(build(element)[1]))

scope = {
    'model_': model,
    'datetime_': datetime,
    'Decimal_': Decimal,
    'etree_': etree,
    'FixedOffsetTZ_': model.FixedOffsetTZ_,
}
exec(literal_text(original, tag), scope)
rebuilt = scope['rootObj']
check('literal', expected, snapshot(rebuilt))
check('literal then write', text, write_text(rebuilt, tag))

print('round trips ok')
"#;

/// Shapes built in code, written, and read back
const HAND_BUILT_SHAPES: &str = r#"
import importlib
import io
import sys
import xml.etree.ElementTree as etree

sys.path.insert(0, sys.argv[1])
model = importlib.import_module(sys.argv[2])

drawing = model.Drawing(shape=[model.Circle(radius=2.0), model.Square(side=1.5)])
out = io.StringIO()
drawing.export(out, 0, name_='drawing')
rebuilt = model.Drawing.factory()
rebuilt.build(etree.fromstring(out.getvalue()))
for shape in rebuilt.shape:
    print('%s %r' % (type(shape).__name__, vars(shape).get('radius', vars(shape).get('side'))))
"#;

fn python() -> Option<&'static str> {
    let found = Command::new("python3")
        .arg("--version")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false);
    found.then_some("python3")
}

fn fixtures_dir() -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path
}

fn all_modes() -> Generator {
    let export = ExportModes::parse("write literal etree").unwrap();
    Generator::new(GeneratorOptions::new().with_export(export))
}

/// Write `output` as `<module>.py` and `script` into `dir`, then run it
fn run_script(
    python: &str,
    dir: &Path,
    module: &str,
    output: &GeneratedOutput,
    script: &str,
    document: Option<&Path>,
) -> String {
    std::fs::write(dir.join(format!("{}.py", module)), &output.module).unwrap();
    let script_path = dir.join("check_module.py");
    std::fs::write(&script_path, script).unwrap();

    let mut command = Command::new(python);
    command.arg(&script_path).arg(dir).arg(module);
    if let Some(document) = document {
        command.arg(document);
    }
    let result = command.output().expect("Failed to run python3");
    let stdout = String::from_utf8_lossy(&result.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(result.status.success(), "script failed:\n{}\n{}", stdout, stderr);
    stdout
}

fn round_trip(module: &str, output: &GeneratedOutput, document: &Path) {
    let Some(python) = python() else {
        eprintln!("python3 not found, skipping");
        return;
    };
    let dir = TempDir::new().unwrap();
    let stdout = run_script(python, dir.path(), module, output, ROUND_TRIP, Some(document));
    assert!(stdout.contains("round trips ok"), "unexpected output: {}", stdout);
}

#[test]
fn test_purchase_order_round_trips() {
    let output = generate_from_file(fixtures_dir().join("purchase_order.xsd"), &all_modes()).unwrap();
    round_trip(
        "po_binding",
        &output,
        &fixtures_dir().join("documents").join("purchase_order.xml"),
    );
}

#[test]
fn test_shapes_round_trip_through_substitution_and_mixed_content() {
    let output = generate_from_file(fixtures_dir().join("shapes.xsd"), &all_modes()).unwrap();
    round_trip(
        "shapes_binding",
        &output,
        &fixtures_dir().join("documents").join("shapes.xml"),
    );
}

#[test]
fn test_open_attributes_survive_literal_mode() {
    let output = generate_from_str(
        r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:element name="root">
    <xs:complexType>
      <xs:sequence><xs:element name="label" type="xs:string"/></xs:sequence>
      <xs:attribute name="id" type="xs:string"/>
      <xs:anyAttribute processContents="skip"/>
    </xs:complexType>
  </xs:element>
</xs:schema>"#,
        "open.xsd",
        &all_modes(),
    )
    .unwrap();
    let dir = TempDir::new().unwrap();
    let document = dir.path().join("open.xml");
    std::fs::write(&document, r#"<root id="r1" extra="e" other="o"><label>x</label></root>"#).unwrap();
    round_trip("open_binding", &output, &document);
}

#[test]
fn test_hand_built_substitutes_keep_their_element() {
    let Some(python) = python() else {
        eprintln!("python3 not found, skipping");
        return;
    };
    let output = generate_from_file(fixtures_dir().join("shapes.xsd"), &all_modes()).unwrap();
    let dir = TempDir::new().unwrap();
    let stdout = run_script(
        python,
        dir.path(),
        "shapes_binding",
        &output,
        HAND_BUILT_SHAPES,
        None,
    );
    assert_eq!(stdout.lines().collect::<Vec<_>>(), vec!["Circle 2.0", "Square 1.5"]);
}
