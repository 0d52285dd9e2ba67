//! Rendering of the intermediate representation as Python source

use super::ir::{Block, Fragment, Item, Line};

/// Renders [`Item`]s as Python 3 source text
#[derive(Debug, Clone)]
pub struct PythonRenderer {
    indent: String,
}

impl Default for PythonRenderer {
    fn default() -> Self {
        Self {
            indent: "    ".to_string(),
        }
    }
}

impl PythonRenderer {
    /// Create a renderer indenting with four spaces
    pub fn new() -> Self {
        Self::default()
    }

    /// Render a listing starting at column zero
    pub fn render(&self, items: &[Item]) -> String {
        let mut out = String::new();
        self.render_items(items, 0, &mut out);
        out
    }

    fn render_items(&self, items: &[Item], level: usize, out: &mut String) {
        for item in items {
            match item {
                Item::Line(line) => {
                    self.push_indent(level, out);
                    self.render_line(line, out);
                    out.push('\n');
                }
                Item::Block(block) => self.render_block(block, level, out),
                Item::Blank => out.push('\n'),
                Item::Verbatim(text) => {
                    for raw in text.lines() {
                        if !raw.trim().is_empty() {
                            self.push_indent(level, out);
                            out.push_str(raw);
                        }
                        out.push('\n');
                    }
                }
            }
        }
    }

    fn render_block(&self, block: &Block, level: usize, out: &mut String) {
        self.push_indent(level, out);
        self.render_line(&block.header, out);
        out.push_str(":\n");
        let has_statement = block
            .body
            .iter()
            .any(|item| !matches!(item, Item::Blank) && !is_blank_verbatim(item));
        if has_statement {
            self.render_items(&block.body, level + 1, out);
        } else {
            self.push_indent(level + 1, out);
            out.push_str("pass\n");
        }
    }

    fn render_line(&self, line: &Line, out: &mut String) {
        for fragment in &line.0 {
            match fragment {
                Fragment::Text(text) => out.push_str(text),
                Fragment::Field(name) => {
                    out.push_str("self.");
                    out.push_str(name);
                }
            }
        }
    }

    fn push_indent(&self, level: usize, out: &mut String) {
        for _ in 0..level {
            out.push_str(&self.indent);
        }
    }
}

fn is_blank_verbatim(item: &Item) -> bool {
    matches!(item, Item::Verbatim(text) if text.trim().is_empty())
}

/// Quote text as a single-quoted Python string literal
pub fn py_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('\'');
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\x{:02x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

/// Quote documentation as a triple-quoted docstring body
pub fn py_docstring(text: &str) -> String {
    let escaped = text.trim().replace('\\', "\\\\").replace("\"\"\"", "\\\"\\\"\\\"");
    format!("\"\"\"{}\"\"\"", escaped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::ir::{block, field, line, text};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_block_renders_pass() {
        let items = vec![block("class Empty(object)", vec![])];
        assert_eq!(PythonRenderer::new().render(&items), "class Empty(object):\n    pass\n");
    }

    #[test]
    fn test_nested_blocks_and_fields() {
        let items = vec![block(
            "def get_item(self)",
            vec![
                block("if self.flag", vec![line(vec!["return ".into(), field("item")])]),
                text("return None"),
            ],
        )];
        let expected = "def get_item(self):\n    if self.flag:\n        return self.item\n    return None\n";
        assert_eq!(PythonRenderer::new().render(&items), expected);
    }

    #[test]
    fn test_verbatim_is_reindented() {
        let items = vec![block(
            "def validate_Percent(self, value)",
            vec![Item::Verbatim("if value > 100:\n    raise ValueError(value)\n".to_string())],
        )];
        let expected = "def validate_Percent(self, value):\n    if value > 100:\n        raise ValueError(value)\n";
        assert_eq!(PythonRenderer::new().render(&items), expected);
    }

    #[test]
    fn test_py_string_escapes() {
        assert_eq!(py_string("it's"), "'it\\'s'");
        assert_eq!(py_string("a\nb"), "'a\\nb'");
        assert_eq!(py_string("c:\\x"), "'c:\\\\x'");
    }
}
