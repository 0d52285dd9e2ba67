//! Fixed support code of the generated module
//!
//! The prologue is the same for every schema apart from its header and the
//! integer range table: the base class with the parse/format helpers, the
//! mixed-content container, the subclass registry and the build-any hook.
//! The epilogue wires the root tags of the schema to the generated classes
//! and provides the parse entry points.

use super::ir::{block, text, Item, Listing};
use super::options::GeneratorOptions;
use super::plan::ModulePlan;
use super::render::py_string;
use crate::model::BuiltinType;

const PROLOGUE: &str = r##"import base64
import datetime as datetime_
import re as re_
import sys
from decimal import Decimal as Decimal_
import xml.etree.ElementTree as etree_

Tag_pattern_ = re_.compile(r'({.*})?(.*)')
XSI_NAMESPACE_ = 'http://www.w3.org/2001/XMLSchema-instance'
XSI_TYPE_ = '{%s}type' % XSI_NAMESPACE_
XML_NAMESPACE_ = 'http://www.w3.org/XML/1998/namespace'


class GDSParseError(Exception):
    pass


def raise_parse_error(node, msg):
    if node is not None:
        msg = '%s (element %s)' % (msg, node.tag)
    raise GDSParseError(msg)


class FixedOffsetTZ_(datetime_.tzinfo):
    def __init__(self, minutes, name):
        self.__offset = datetime_.timedelta(minutes=minutes)
        self.__name = name

    def utcoffset(self, dt):
        return self.__offset

    def tzname(self, dt):
        return self.__name

    def dst(self, dt):
        return None


def _parse_tz(text):
    if text.endswith('Z'):
        return text[:-1], FixedOffsetTZ_(0, 'Z')
    if len(text) > 6 and text[-6] in '+-' and text[-3] == ':':
        minutes = int(text[-5:-3]) * 60 + int(text[-2:])
        if text[-6] == '-':
            minutes = -minutes
        return text[:-6], FixedOffsetTZ_(minutes, text[-6:])
    return text, None


def _format_tz(value):
    offset = value.utcoffset()
    if offset is None:
        return ''
    minutes = int(offset.total_seconds()) // 60
    if minutes == 0:
        return 'Z'
    sign = '+'
    if minutes < 0:
        sign = '-'
        minutes = -minutes
    return '%s%02d:%02d' % (sign, minutes // 60, minutes % 60)


def _split_fraction(text):
    if '.' in text:
        body, fraction = text.split('.', 1)
        return body, int((fraction + '000000')[:6])
    return text, 0


class SubclassRegistry_(object):
    classes = {}


def register_subclass(type_name, cls):
    SubclassRegistry_.classes[type_name] = cls


def lookup_subclass(type_name):
    return SubclassRegistry_.classes.get(type_name)


class BuildAnyHook_(object):
    hook = None


def set_build_any_hook(hook):
    BuildAnyHook_.hook = hook


class GeneratedsSuper(object):
    def gds_parse_string(self, text, node=None, input_name=''):
        return text

    def gds_format_string(self, value, input_name=''):
        return value

    def gds_parse_integer(self, text, node=None, input_name=''):
        try:
            return int(text)
        except (TypeError, ValueError):
            raise_parse_error(node, '%s: requires integer, got %r' % (input_name, text))

    def gds_format_integer(self, value, input_name=''):
        return '%d' % value

    def gds_parse_decimal(self, text, node=None, input_name=''):
        try:
            return Decimal_(text.strip())
        except (AttributeError, ArithmeticError, ValueError):
            raise_parse_error(node, '%s: requires decimal, got %r' % (input_name, text))

    def gds_format_decimal(self, value, input_name=''):
        return '{0:f}'.format(value)

    def gds_parse_float(self, text, node=None, input_name=''):
        try:
            return float(text)
        except (TypeError, ValueError):
            raise_parse_error(node, '%s: requires float, got %r' % (input_name, text))

    def gds_format_float(self, value, input_name=''):
        if value != value:
            return 'NaN'
        if value == float('inf'):
            return 'INF'
        if value == float('-inf'):
            return '-INF'
        return repr(float(value))

    gds_parse_double = gds_parse_float
    gds_format_double = gds_format_float

    def gds_parse_boolean(self, text, node=None, input_name=''):
        if text is not None:
            text = text.strip()
        if text in ('true', '1'):
            return True
        if text in ('false', '0'):
            return False
        raise_parse_error(node, '%s: requires boolean, got %r' % (input_name, text))

    def gds_format_boolean(self, value, input_name=''):
        if value:
            return 'true'
        return 'false'

    def gds_parse_datetime(self, text, node=None, input_name=''):
        try:
            body, tz = _parse_tz(text.strip())
            body, microsecond = _split_fraction(body)
            value = datetime_.datetime.strptime(body, '%Y-%m-%dT%H:%M:%S')
        except (AttributeError, TypeError, ValueError):
            raise_parse_error(node, '%s: requires dateTime, got %r' % (input_name, text))
        return value.replace(microsecond=microsecond, tzinfo=tz)

    def gds_format_datetime(self, value, input_name=''):
        text = '%04d-%02d-%02dT%02d:%02d:%02d' % (
            value.year, value.month, value.day,
            value.hour, value.minute, value.second)
        if value.microsecond:
            text += '.%06d' % value.microsecond
        return text + _format_tz(value)

    def gds_parse_date(self, text, node=None, input_name=''):
        try:
            body, tz = _parse_tz(text.strip())
            return datetime_.datetime.strptime(body, '%Y-%m-%d').date()
        except (AttributeError, TypeError, ValueError):
            raise_parse_error(node, '%s: requires date, got %r' % (input_name, text))

    def gds_format_date(self, value, input_name=''):
        return '%04d-%02d-%02d' % (value.year, value.month, value.day)

    def gds_parse_time(self, text, node=None, input_name=''):
        try:
            body, tz = _parse_tz(text.strip())
            body, microsecond = _split_fraction(body)
            value = datetime_.datetime.strptime(body, '%H:%M:%S').time()
        except (AttributeError, TypeError, ValueError):
            raise_parse_error(node, '%s: requires time, got %r' % (input_name, text))
        return value.replace(microsecond=microsecond, tzinfo=tz)

    def gds_format_time(self, value, input_name=''):
        text = '%02d:%02d:%02d' % (value.hour, value.minute, value.second)
        if value.microsecond:
            text += '.%06d' % value.microsecond
        return text + _format_tz(value)

    def gds_parse_base64(self, text, node=None, input_name=''):
        try:
            return base64.b64decode(text)
        except (TypeError, ValueError):
            raise_parse_error(node, '%s: requires base64, got %r' % (input_name, text))

    def gds_format_base64(self, value, input_name=''):
        return base64.b64encode(value).decode('ascii')

    def gds_parse_list(self, text, codec, node=None, input_name=''):
        if text is None:
            return []
        parse = getattr(self, 'gds_parse_' + codec)
        return [parse(item, node, input_name) for item in text.split()]

    def gds_format_list(self, values, codec, input_name=''):
        format_ = getattr(self, 'gds_format_' + codec)
        return ' '.join(format_(value, input_name) for value in values)

    def gds_collapse_whitespace(self, text):
        if text is None:
            return None
        return ' '.join(text.split())

    def gds_validate_integer_subtype(self, value, node, input_name, type_name):
        bounds = INTEGER_BOUNDS_.get(type_name)
        if bounds is None or value is None:
            return value
        low, high = bounds
        values = value if isinstance(value, list) else [value]
        for item in values:
            if low is not None and item < low:
                raise_parse_error(node, '%s: %s value %d is less than %d' % (
                    input_name, type_name, item, low))
            if high is not None and item > high:
                raise_parse_error(node, '%s: %s value %d is greater than %d' % (
                    input_name, type_name, item, high))
        return value

    def gds_build_any(self, node, type_name=None):
        hook = BuildAnyHook_.hook
        if hook is not None:
            obj_ = hook(node, type_name)
            if obj_ is not None:
                return obj_
        return node

    def get_class_obj_(self, node, default_class=None):
        type_name = node.get(XSI_TYPE_)
        if type_name is not None:
            cls = CLASS_BY_TYPE_.get(type_name.split(':')[-1])
            if cls is not None:
                return cls
        return default_class


def showIndent(outfile, level, pretty_print=True):
    if pretty_print:
        outfile.write('    ' * level)


def quote_xml(inStr):
    if inStr is None:
        return ''
    s1 = inStr if isinstance(inStr, str) else '%s' % inStr
    return s1.replace('&', '&amp;').replace('<', '&lt;').replace('>', '&gt;')


def quote_attrib(inStr):
    s1 = quote_xml(inStr).replace('"', '&quot;')
    s1 = s1.replace('\n', '&#10;').replace('\r', '&#13;').replace('\t', '&#9;')
    return '"%s"' % s1


def quote_python(inStr):
    return repr(inStr)


def find_attr_value_(attr_name, node):
    attrs = node.attrib
    if ':' not in attr_name:
        return attrs.get(attr_name)
    prefix, name = attr_name.split(':', 1)
    if prefix == 'xml':
        return attrs.get('{%s}%s' % (XML_NAMESPACE_, name))
    if prefix == 'xsi':
        return attrs.get('{%s}%s' % (XSI_NAMESPACE_, name))
    for key, value in attrs.items():
        if key.endswith('}' + name):
            return value
    return None


def get_all_text_(node):
    text = node.text or ''
    for child in node:
        if child.tail is not None:
            text += child.tail
    return text


def _tz_literal(tz):
    if tz is None:
        return ''
    minutes = int(tz.utcoffset(None).total_seconds()) // 60
    return ', tzinfo=FixedOffsetTZ_(%d, %r)' % (minutes, tz.tzname(None))


def literal_value_(value):
    if isinstance(value, list):
        return '[%s]' % ', '.join(literal_value_(item) for item in value)
    if isinstance(value, datetime_.datetime):
        return 'datetime_.datetime(%d, %d, %d, %d, %d, %d, %d%s)' % (
            value.year, value.month, value.day, value.hour, value.minute,
            value.second, value.microsecond, _tz_literal(value.tzinfo))
    if isinstance(value, datetime_.date):
        return 'datetime_.date(%d, %d, %d)' % (value.year, value.month, value.day)
    if isinstance(value, datetime_.time):
        return 'datetime_.time(%d, %d, %d, %d%s)' % (
            value.hour, value.minute, value.second, value.microsecond,
            _tz_literal(value.tzinfo))
    if isinstance(value, Decimal_):
        return 'Decimal_(%r)' % str(value)
    if isinstance(value, float):
        if value != value:
            return "float('nan')"
        if value in (float('inf'), float('-inf')):
            return "float('%s')" % value
    return repr(value)


def _element_text(element):
    tail = element.tail
    element.tail = None
    try:
        return etree_.tostring(element, encoding='unicode')
    finally:
        element.tail = tail


def gds_export_any_(obj, outfile, level, namespace_='', name_=None, pretty_print=True):
    if hasattr(obj, 'export'):
        if name_ is None:
            obj.export(outfile, level, namespace_, pretty_print=pretty_print)
        else:
            obj.export(outfile, level, namespace_, name_=name_, pretty_print=pretty_print)
        return
    showIndent(outfile, level, pretty_print)
    outfile.write(_element_text(obj))
    if pretty_print:
        outfile.write('\n')


def gds_literal_any_(obj, outfile, level, name_):
    showIndent(outfile, level)
    if hasattr(obj, 'exportLiteral'):
        outfile.write('model_.%s(\n' % obj.model_name_)
        obj.exportLiteral(outfile, level, name_)
        showIndent(outfile, level)
        outfile.write('),\n')
    else:
        outfile.write('etree_.fromstring(%r),\n' % _element_text(obj))


def gds_etree_any_(obj, element, mapping_=None):
    if hasattr(obj, 'to_etree'):
        obj.to_etree(element, mapping_=mapping_)
    else:
        element.append(obj)


def gds_member_tag_(obj, default_name, member_tags):
    if obj.original_tagname_ is not None:
        return obj.original_tagname_
    for cls in type(obj).__mro__:
        tag = member_tags.get(cls.__name__)
        if tag is not None:
            return tag
    return default_name


def gds_tagged_(obj, tagname):
    obj.original_tagname_ = tagname
    return obj


class MixedContainer(object):
    CategoryNone = 0
    CategoryText = 1
    CategorySimple = 2
    CategoryComplex = 3

    def __init__(self, category, name, value, codec='string'):
        self.category = category
        self.name = name
        self.value = value
        self.codec = codec

    def getCategory(self):
        return self.category

    def getName(self):
        return self.name

    def getValue(self):
        return self.value

    def export(self, outfile, level, name, namespace_='', pretty_print=True):
        if self.category == MixedContainer.CategoryText:
            outfile.write(quote_xml(self.value))
        elif self.category == MixedContainer.CategorySimple:
            text = getattr(GeneratedsSuper(), 'gds_format_' + self.codec)(self.value)
            outfile.write('<%s%s>%s</%s%s>' % (
                namespace_, self.name, quote_xml(text), namespace_, self.name))
        else:
            gds_export_any_(self.value, outfile, level, namespace_, self.name, pretty_print=False)

    def exportLiteral(self, outfile, level, name):
        showIndent(outfile, level)
        if self.category == MixedContainer.CategoryComplex:
            outfile.write('model_.MixedContainer(%d, %s,\n' % (
                self.category, quote_python(self.name)))
            gds_literal_any_(self.value, outfile, level + 1, self.name)
            showIndent(outfile, level + 1)
            outfile.write('%s),\n' % quote_python(self.codec))
        else:
            outfile.write('model_.MixedContainer(%d, %s, %s, %s),\n' % (
                self.category, quote_python(self.name), literal_value_(self.value),
                quote_python(self.codec)))

    def to_etree(self, element, mapping_=None):
        if self.category == MixedContainer.CategoryText:
            if len(element):
                element[-1].tail = (element[-1].tail or '') + self.value
            else:
                element.text = (element.text or '') + self.value
        elif self.category == MixedContainer.CategorySimple:
            sub = etree_.SubElement(element, self.name)
            sub.text = getattr(GeneratedsSuper(), 'gds_format_' + self.codec)(self.value)
        else:
            gds_etree_any_(self.value, element, mapping_)


class MemberSpec_(object):
    def __init__(self, name='', data_type='', container=0, optional=0):
        self.name = name
        self.data_type = data_type
        self.container = container
        self.optional = optional

    def get_name(self):
        return self.name

    def get_data_type(self):
        return self.data_type

    def get_container(self):
        return self.container

    def get_optional(self):
        return self.optional
"##;

/// Header, imports and support code
pub fn prologue(source_name: &str) -> String {
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
    out.push_str(PROLOGUE);
    out.push_str("\n\n");
    out.push_str(&integer_bounds_table());
    out.push_str("\n\n");
    out
}

/// `INTEGER_BOUNDS_`: built-in name → `(low, high)`, `None` for open ends
fn integer_bounds_table() -> String {
    let bound = |b: Option<i128>| b.map_or_else(|| "None".to_string(), |v| v.to_string());
    let mut out = String::from("INTEGER_BOUNDS_ = {\n");
    for (builtin, bounds) in BuiltinType::bounded_integers() {
        out.push_str(&format!(
            "    {}: ({}, {}),\n",
            py_string(&builtin.name),
            bound(bounds.min),
            bound(bounds.max)
        ));
    }
    out.push_str("}\n");
    out
}

/// Root-tag mapping, parse entry points and `__all__`
pub fn epilogue(plan: &ModulePlan, options: &GeneratorOptions) -> Vec<Item> {
    let mut listing = Listing::new();

    listing.text("GDSClassesMapping = {");
    for (tag, class) in &plan.root_tags {
        listing.text(format!("    {}: {},", py_string(tag), class));
    }
    listing.text("}").push(Item::Blank);

    listing.text("CLASS_BY_TYPE_ = {");
    for (type_name, class) in &plan.type_classes {
        listing.text(format!("    {}: {},", py_string(type_name), class));
    }
    listing.text("}").push(Item::Blank);

    listing.text(format!("MODULE_NAME_ = {}", py_string(&options.super_module)));
    listing.text(format!(
        "NAMESPACE_DEF_ = {}",
        py_string(options.namespace_def.as_deref().unwrap_or(""))
    ));
    listing.push(Item::Blank);
    listing.text("USAGE_TEXT = \"\"\"");
    listing.text("Usage: python <Parser>.py <in_xml_file>");
    listing.text("\"\"\"");
    listing.push(Item::Blank).push(Item::Blank);

    listing.push(block(
        "def usage()",
        vec![text("print(USAGE_TEXT)"), text("sys.exit(1)")],
    ));
    listing.push(Item::Blank).push(Item::Blank);

    listing.push(block("def get_root_tag(node)", root_lookup(plan, options)));
    listing.push(Item::Blank).push(Item::Blank);

    listing.push(parse_function(
        "parse(inFileName, silence=False)",
        "rootNode = etree_.parse(inFileName).getroot()",
        options.export.write.then(write_output),
        "return rootObj",
    ));
    listing.push(Item::Blank).push(Item::Blank);

    listing.push(parse_function(
        "parseString(inString, silence=False)",
        "rootNode = etree_.fromstring(inString)",
        options.export.write.then(write_output),
        "return rootObj",
    ));
    listing.push(Item::Blank).push(Item::Blank);

    if options.export.etree {
        listing.push(parse_function(
            "parseEtree(inFileName, silence=False)",
            "rootNode = etree_.parse(inFileName).getroot()",
            Some(etree_output()),
            "return rootObj, rootElement, mapping",
        ));
        listing.push(Item::Blank).push(Item::Blank);
    }

    if options.export.literal {
        listing.push(parse_function(
            "parseLiteral(inFileName, silence=False)",
            "rootNode = etree_.parse(inFileName).getroot()",
            Some(literal_output()),
            "return rootObj",
        ));
        listing.push(Item::Blank).push(Item::Blank);
    }

    listing.push(block(
        "def main()",
        vec![
            text("args = sys.argv[1:]"),
            block("if len(args) == 1", vec![text("parse(args[0])")]),
            block("else", vec![text("usage()")]),
        ],
    ));
    listing.push(Item::Blank).push(Item::Blank);
    listing.push(block("if __name__ == '__main__'", vec![text("main()")]));
    listing.push(Item::Blank).push(Item::Blank);

    listing.text("__all__ = [");
    for class in &plan.classes {
        listing.text(format!("    \"{}\",", class.class_name));
    }
    listing.text("]");
    listing.into_items()
}

/// Body of `get_root_tag`, falling back to a configured or the first root
fn root_lookup(plan: &ModulePlan, options: &GeneratorOptions) -> Vec<Item> {
    let fallback = options
        .root_element
        .as_ref()
        .and_then(|tag| plan.root_tags.get_key_value(tag))
        .or_else(|| plan.root_tags.first());

    let mut body = vec![
        text("tag = Tag_pattern_.match(node.tag).groups()[-1]"),
        text("rootClass = GDSClassesMapping.get(tag)"),
    ];
    match fallback {
        Some((tag, class)) => body.push(block(
            "if rootClass is None",
            vec![
                text(format!("tag = {}", py_string(tag))),
                text(format!("rootClass = {}", class)),
            ],
        )),
        None => body.push(block(
            "if rootClass is None",
            vec![text("raise_parse_error(node, 'unknown root element %s' % tag)")],
        )),
    }
    body.push(text("return tag, rootClass"));
    body
}

fn parse_function(signature: &str, load: &str, output: Option<Vec<Item>>, result: &str) -> Item {
    let mut body = vec![
        text(load),
        text("rootTag, rootClass = get_root_tag(rootNode)"),
        text("rootObj = rootClass.factory()"),
        text("rootObj.build(rootNode)"),
    ];
    if let Some(output) = output {
        body.extend(output);
    }
    body.push(text(result));
    block(format!("def {}", signature), body)
}

fn write_output() -> Vec<Item> {
    vec![block(
        "if not silence",
        vec![
            text("sys.stdout.write('<?xml version=\"1.0\" ?>\\n')"),
            text("rootObj.export(sys.stdout, 0, name_=rootTag, namespacedef_=NAMESPACE_DEF_, pretty_print=True)"),
        ],
    )]
}

fn etree_output() -> Vec<Item> {
    vec![
        text("mapping = {}"),
        text("rootElement = rootObj.to_etree(None, name_=rootTag, mapping_=mapping)"),
        block(
            "if not silence",
            vec![text("sys.stdout.write(etree_.tostring(rootElement, encoding='unicode'))")],
        ),
    ]
}

fn literal_output() -> Vec<Item> {
    vec![block(
        "if not silence",
        vec![
            text("sys.stdout.write('import datetime as datetime_\\n')"),
            text("sys.stdout.write('from decimal import Decimal as Decimal_\\n')"),
            text("sys.stdout.write('import xml.etree.ElementTree as etree_\\n\\n')"),
            text("sys.stdout.write('import %s as model_\\n' % MODULE_NAME_)"),
            text("sys.stdout.write('from %s import FixedOffsetTZ_\\n\\n' % MODULE_NAME_)"),
            text("sys.stdout.write('rootObj = model_.%s(\\n' % rootObj.model_name_)"),
            text("rootObj.exportLiteral(sys.stdout, 0, name_=rootTag)"),
            text("sys.stdout.write(')\\n')"),
        ],
    )]
}
