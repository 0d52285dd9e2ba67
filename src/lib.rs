//! # xsdbind
//!
//! Generates Python data-binding modules from XML Schema (XSD) documents.
//!
//! A run goes through three stages, all sharing one [`Session`]:
//!
//! 1. [`ingest`]: stream the schema markup into a tree of schema nodes and
//!    global registries
//! 2. [`resolve`]: eight annotation passes resolving types, names, occurrence
//!    bounds, collisions and inheritance
//! 3. [`codegen`]: plan and emit one Python class per complex type, plus an
//!    optional subclass module
//!
//! ## Example
//!
//! ```rust,ignore
//! use xsdbind::codegen::{Generator, GeneratorOptions};
//!
//! let generator = Generator::new(GeneratorOptions::new().with_prefix("po_"));
//! let output = xsdbind::generate_from_file("purchase-order.xsd", &generator)?;
//! std::fs::write("po.py", &output.module)?;
//! for diagnostic in &output.diagnostics {
//!     eprintln!("{}", diagnostic);
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Foundation
pub mod error;
pub mod limits;

// Utilities
pub mod names;
pub mod namespaces;

// Schema loading
pub mod catalog;
pub mod includes;
pub mod loaders;
pub mod locations;

// Pipeline
pub mod codegen;
pub mod ingest;
pub mod model;
pub mod resolve;

use std::path::Path;

use tracing::info;

pub use codegen::{GeneratedOutput, Generator, GeneratorOptions};
pub use error::{Diagnostic, Error, Result};
pub use model::Session;

use catalog::XmlCatalog;
use includes::IncludeResolver;
use limits::Limits;
use loaders::Loader;
use locations::Location;

/// Version of the xsdbind library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Ingest and resolve schema text.
///
/// `xs:include` directives are not followed; use [`compile_file`] for
/// schemas split over several documents.
pub fn compile_str(xsd: &str) -> Result<Session> {
    compile_str_with_limits(xsd, Limits::default())
}

/// Ingest and resolve schema text under the given limits
pub fn compile_str_with_limits(xsd: &str, limits: Limits) -> Result<Session> {
    let mut session = Session::with_limits(limits);
    ingest::ingest_str(&mut session, xsd)?;
    resolve::resolve(&mut session)?;
    Ok(session)
}

/// Load a schema file, inline its includes, then ingest and resolve it
pub fn compile_file(path: impl AsRef<Path>) -> Result<Session> {
    let location = Location::Path(path.as_ref().to_path_buf());
    compile_location(&location, &Loader::new(), None)
}

/// Load a schema from `location` through `loader`, consulting `catalog`
/// for included documents
pub fn compile_location(
    location: &Location,
    loader: &Loader,
    catalog: Option<&XmlCatalog>,
) -> Result<Session> {
    let text = loader.load(location)?;
    let mut resolver = IncludeResolver::new(loader);
    if let Some(catalog) = catalog {
        resolver = resolver.with_catalog(catalog);
    }
    let inlined = resolver.inline(&text, Some(location))?;
    if !inlined.included.is_empty() {
        info!(
            schema = %location,
            included = inlined.included.len(),
            "includes inlined"
        );
    }

    let mut session = Session::with_limits(loader.limits().clone());
    for diagnostic in inlined.diagnostics {
        session.diagnose(diagnostic);
    }
    ingest::ingest_str(&mut session, &inlined.schema)?;
    resolve::resolve(&mut session)?;
    Ok(session)
}

/// Generate modules from schema text
pub fn generate_from_str(
    xsd: &str,
    source_name: &str,
    generator: &Generator,
) -> Result<GeneratedOutput> {
    let mut session = compile_str(xsd)?;
    generator.generate(&mut session, source_name)
}

/// Generate modules from a schema file
pub fn generate_from_file(path: impl AsRef<Path>, generator: &Generator) -> Result<GeneratedOutput> {
    let location = Location::Path(path.as_ref().to_path_buf());
    let mut session = compile_location(&location, &Loader::new(), None)?;
    generator.generate(&mut session, &location.file_name())
}
