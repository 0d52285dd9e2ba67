//! Name mapping
//!
//! Schema names are NCNames and may contain characters (`-`, `.`) or spell
//! words that are not usable as identifiers in the generated module. These
//! pure functions turn them into safe identifiers.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static NON_IDENTIFIER_CHAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9_]").expect("static regex"));

/// Keywords and builtins of the generated language that would shadow or
/// break the generated code when used as member or class names.
static RESERVED_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
        "continue", "def", "del", "elif", "else", "except", "exec", "finally", "for", "from",
        "global", "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass",
        "print", "raise", "return", "try", "while", "with", "yield", "bool", "dict", "file",
        "float", "int", "list", "object", "property", "range", "self", "set", "str",
        "super", "type", "format", "open", "filter", "map", "input", "hash",
    ]
    .into_iter()
    .collect()
});

/// Check if a string is a valid XML Name
pub fn is_valid_name(name: &str) -> bool {
    name.chars()
        .next()
        .map(|c| c.is_alphabetic() || c == '_')
        .unwrap_or(false)
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-' || c == '.')
}

/// Check if a string is a valid NCName (non-colonized name)
pub fn is_valid_ncname(name: &str) -> bool {
    !name.contains(':') && is_valid_name(name)
}

/// Split a QName into prefix and local name
pub fn split_qname(qname: &str) -> (Option<&str>, &str) {
    if let Some((prefix, local)) = qname.split_once(':') {
        (Some(prefix), local)
    } else {
        (None, qname)
    }
}

/// Drop the namespace prefix of a (possibly) prefixed name
pub fn strip_prefix(qname: &str) -> &str {
    split_qname(qname).1
}

/// Replace every character that cannot appear in an identifier with `_`.
///
/// A leading digit is guarded by an underscore.
pub fn clean_name(name: &str) -> String {
    let cleaned = NON_IDENTIFIER_CHAR.replace_all(name, "_");
    if cleaned.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{}", cleaned)
    } else {
        cleaned.into_owned()
    }
}

/// Clean a name and remap reserved words to an alternate spelling
pub fn mapped_name(name: &str) -> String {
    let cleaned = clean_name(name);
    if is_reserved(&cleaned) {
        format!("{}_", cleaned)
    } else {
        cleaned
    }
}

/// Whether a name collides with a reserved word of the generated language
pub fn is_reserved(name: &str) -> bool {
    RESERVED_WORDS.contains(name)
}

/// Name of the generated class for a schema type
pub fn class_name(prefix: &str, type_name: &str) -> String {
    mapped_name(&format!("{}{}", prefix, strip_prefix(type_name)))
}

/// Upper-case the first character
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
