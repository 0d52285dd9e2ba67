//! `xs:include` inlining
//!
//! Ingestion reads a single document. Before it runs, every `<include>` at
//! the top of the schema is replaced by the top-level declarations of the
//! included document, recursively, so the handler sees one flat schema.
//!
//! Each document is inlined at most once. Included documents must bind the
//! XSD vocabulary to the same prefix as the including one, since their
//! declarations are copied as text. Includes that cannot be inlined are
//! dropped with a diagnostic; `xs:import` is left to ingestion.

use std::collections::HashSet;
use std::ops::Range;

use roxmltree::{Document, Node};
use tracing::debug;

use crate::catalog::XmlCatalog;
use crate::error::{Diagnostic, DiagnosticKind, Error, Result};
use crate::loaders::Loader;
use crate::locations::Location;
use crate::namespaces::XSD_NAMESPACE;

/// A schema with its includes inlined
#[derive(Debug, Clone)]
pub struct Inlined {
    /// Flattened schema text
    pub schema: String,
    /// Documents that were inlined, in the order they were read
    pub included: Vec<Location>,
    /// Includes that were dropped, and why
    pub diagnostics: Vec<Diagnostic>,
}

/// Inlines includes, reading documents through a [`Loader`]
#[derive(Debug)]
pub struct IncludeResolver<'a> {
    loader: &'a Loader,
    catalog: Option<&'a XmlCatalog>,
    seen: HashSet<Location>,
    included: Vec<Location>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> IncludeResolver<'a> {
    /// Create a resolver
    pub fn new(loader: &'a Loader) -> Self {
        Self {
            loader,
            catalog: None,
            seen: HashSet::new(),
            included: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Look locations up in `catalog` first
    pub fn with_catalog(mut self, catalog: &'a XmlCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Inline the includes of `schema`, read from `location` if known
    pub fn inline(mut self, schema: &str, location: Option<&Location>) -> Result<Inlined> {
        if let Some(location) = location {
            self.seen.insert(location.clone());
        }
        let schema = self.expand(schema, location)?;
        Ok(Inlined {
            schema,
            included: self.included,
            diagnostics: self.diagnostics,
        })
    }

    fn expand(&mut self, text: &str, location: Option<&Location>) -> Result<String> {
        let doc = Document::parse(text).map_err(|e| Error::Xml(e.to_string()))?;
        let root = doc.root_element();
        let prefix = xsd_prefix(root);

        let mut splices: Vec<(Range<usize>, String)> = Vec::new();
        for include in root.children().filter(|n| is_xsd(n, "include")) {
            let replacement = match include.attribute("schemaLocation") {
                Some(reference) => self.include(reference, location, prefix)?,
                None => {
                    self.drop_include("?", "<include> without schemaLocation");
                    String::new()
                }
            };
            splices.push((include.range(), replacement));
        }
        if splices.is_empty() {
            return Ok(text.to_string());
        }

        let mut out = String::with_capacity(text.len());
        let mut cursor = 0;
        for (range, replacement) in splices {
            out.push_str(&text[cursor..range.start]);
            out.push_str(&replacement);
            cursor = range.end;
        }
        out.push_str(&text[cursor..]);
        Ok(out)
    }

    /// Top-level declarations of one included document, as text
    fn include(&mut self, reference: &str, from: Option<&Location>, prefix: Option<&str>) -> Result<String> {
        let target = match self.catalog.and_then(|c| c.resolve(reference)) {
            Some(mapped) => Location::parse(mapped)?,
            None => match from {
                Some(base) => base.join(reference)?,
                None => Location::parse(reference)?,
            },
        };
        if target.is_remote() {
            self.drop_include(reference, "remote includes are not fetched");
            return Ok(String::new());
        }
        if !self.seen.insert(target.clone()) {
            debug!(location = %target, "already included");
            return Ok(String::new());
        }
        self.loader.limits().check_includes(self.seen.len())?;

        let text = self.loader.load(&target)?;
        self.included.push(target.clone());
        debug!(location = %target, "inlining include");
        let text = self.expand(&text, Some(&target))?;

        let doc = Document::parse(&text).map_err(|e| Error::Xml(e.to_string()))?;
        let root = doc.root_element();
        if !is_xsd(&root, "schema") {
            self.drop_include(reference, "included document is not a schema");
            return Ok(String::new());
        }
        if xsd_prefix(root) != prefix {
            self.drop_include(
                reference,
                "included document binds the XSD namespace to a different prefix",
            );
            return Ok(String::new());
        }
        let declarations: Vec<&str> = root
            .children()
            .filter(Node::is_element)
            .map(|n| &text[n.range()])
            .collect();
        Ok(declarations.join("\n"))
    }

    fn drop_include(&mut self, reference: &str, reason: &str) {
        self.diagnostics.push(Diagnostic::warning(
            DiagnosticKind::Unsupported,
            format!("include:{}", reference),
            reason,
        ));
    }
}

fn is_xsd(node: &Node, local: &str) -> bool {
    node.is_element()
        && node.tag_name().name() == local
        && node.tag_name().namespace() == Some(XSD_NAMESPACE)
}

/// Prefix bound to the XSD namespace on `root` (`Some("")` for the default)
fn xsd_prefix<'a>(root: Node<'a, '_>) -> Option<&'a str> {
    root.namespaces()
        .find(|ns| ns.uri() == XSD_NAMESPACE)
        .map(|ns| ns.name().unwrap_or(""))
}
