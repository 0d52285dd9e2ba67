//! XML catalogs for `schemaLocation` lookup
//!
//! An OASIS XML catalog maps the system identifiers and URNs that schemas use
//! in `schemaLocation` to local files. Include inlining consults the catalog
//! before resolving a location relative to the including document.
//!
//! Recognized entries:
//!
//! - `<system systemId uri>` and `<uri name uri>`
//! - `<group>`, honouring `xml:base`
//! - `<nextCatalog catalog>`, loaded once each
//!
//! ```xml
//! <catalog xmlns="urn:oasis:names:tc:entity:xmlns:xml:catalog">
//!   <system systemId="urn:example:order.xsd" uri="xsd/order.xsd"/>
//!   <nextCatalog catalog="vendor/catalog.xml"/>
//! </catalog>
//! ```

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use roxmltree::{Document, Node};
use tracing::{debug, warn};

use crate::error::{Error, ParseError, Result};

const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// Location mappings read from one or more catalog files
#[derive(Debug, Clone, Default)]
pub struct XmlCatalog {
    /// systemId → file
    system_mappings: HashMap<String, String>,
    /// URI name → file
    uri_mappings: HashMap<String, String>,
}

impl XmlCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a catalog file and every catalog it chains to
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let mut catalog = Self::new();
        let mut seen = HashSet::new();
        catalog.load(path.as_ref(), &mut seen)?;
        Ok(catalog)
    }

    /// Parse catalog text; relative entries resolve against `base_dir`
    pub fn from_str(xml: &str, base_dir: Option<&Path>) -> Result<Self> {
        let mut catalog = Self::new();
        let mut seen = HashSet::new();
        catalog.parse(xml, base_dir, &mut seen)?;
        Ok(catalog)
    }

    fn load(&mut self, path: &Path, seen: &mut HashSet<PathBuf>) -> Result<()> {
        let key = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        if !seen.insert(key) {
            return Ok(());
        }
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Resource(format!("Failed to read catalog '{}': {}", path.display(), e))
        })?;
        debug!(path = %path.display(), "catalog loaded");
        self.parse(&content, path.parent(), seen)
    }

    fn parse(&mut self, xml: &str, base_dir: Option<&Path>, seen: &mut HashSet<PathBuf>) -> Result<()> {
        let doc = Document::parse(xml).map_err(|e| Error::Xml(format!("catalog: {}", e)))?;
        let root = doc.root_element();
        if root.tag_name().name() != "catalog" {
            return Err(ParseError::new(format!(
                "expected a catalog root element, found <{}>",
                root.tag_name().name()
            ))
            .into());
        }
        let base = base_dir.map(Path::to_path_buf).unwrap_or_default();
        self.entries(root, &base, seen)
    }

    fn entries(&mut self, parent: Node, base: &Path, seen: &mut HashSet<PathBuf>) -> Result<()> {
        for child in parent.children().filter(Node::is_element) {
            match child.tag_name().name() {
                "system" => {
                    if let (Some(id), Some(uri)) = (child.attribute("systemId"), child.attribute("uri")) {
                        self.system_mappings.insert(id.to_string(), resolve(base, uri));
                    }
                }
                "uri" => {
                    if let (Some(name), Some(uri)) = (child.attribute("name"), child.attribute("uri")) {
                        self.uri_mappings.insert(name.to_string(), resolve(base, uri));
                    }
                }
                "group" => {
                    let group_base = match child.attribute((XML_NAMESPACE, "base")) {
                        Some(xml_base) => base.join(xml_base),
                        None => base.to_path_buf(),
                    };
                    self.entries(child, &group_base, seen)?;
                }
                "nextCatalog" => {
                    if let Some(next) = child.attribute("catalog") {
                        let path = base.join(next);
                        // A broken chained catalog does not invalidate this one
                        if let Err(e) = self.load(&path, seen) {
                            warn!(catalog = %path.display(), error = %e, "chained catalog skipped");
                        }
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// File a `schemaLocation` maps to, system identifiers first
    pub fn resolve(&self, location: &str) -> Option<&str> {
        self.system_mappings
            .get(location)
            .or_else(|| self.uri_mappings.get(location))
            .map(String::as_str)
    }

    /// Whether the catalog has no mappings
    pub fn is_empty(&self) -> bool {
        self.system_mappings.is_empty() && self.uri_mappings.is_empty()
    }

    /// Number of mappings
    pub fn len(&self) -> usize {
        self.system_mappings.len() + self.uri_mappings.len()
    }
}

fn resolve(base: &Path, uri: &str) -> String {
    base.join(uri).to_string_lossy().into_owned()
}
