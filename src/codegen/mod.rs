//! Code emission
//!
//! Turns a resolved [`Session`] into Python source: a primary module with one
//! class per complex type, and optionally a subclass module. Emission goes
//! through a small IR ([`ir`]) rendered by [`render::PythonRenderer`].
//!
//! ```rust,ignore
//! use xsdbind::codegen::{Generator, GeneratorOptions};
//!
//! let output = Generator::new(GeneratorOptions::new()).generate(&mut session, "order.xsd")?;
//! std::fs::write("order.py", output.module)?;
//! ```

pub mod defaults;
pub mod emit;
pub mod ir;
pub mod options;
pub mod order;
pub mod plan;
pub mod render;
pub mod runtime;
pub mod subclass;
pub mod validators;

pub use options::{ExportModes, GeneratorOptions, GetterSetter, MemberSpecs};
pub use validators::{DirectoryValidatorBodies, NoValidatorBodies, ValidatorBodySource};

use tracing::{debug, info};

use crate::error::{Diagnostic, Result};
use crate::model::Session;
use ir::Item;
use render::PythonRenderer;

/// Source text produced by one generation run
#[derive(Debug, Clone)]
pub struct GeneratedOutput {
    /// The primary module
    pub module: String,
    /// The subclass module, when requested
    pub subclass_module: Option<String>,
    /// Names of the emitted classes, in emission order
    pub emitted: Vec<String>,
    /// Recoverable problems found while resolving and emitting
    pub diagnostics: Vec<Diagnostic>,
}

/// Python module generator
pub struct Generator {
    options: GeneratorOptions,
    bodies: Box<dyn ValidatorBodySource>,
}

impl Generator {
    /// Generator with no validator bodies
    pub fn new(options: GeneratorOptions) -> Self {
        Self {
            options,
            bodies: Box::new(NoValidatorBodies),
        }
    }

    /// Take validator hook bodies from `bodies`
    pub fn with_validator_bodies(mut self, bodies: impl ValidatorBodySource + 'static) -> Self {
        self.bodies = Box::new(bodies);
        self
    }

    /// The options in use
    pub fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    /// Generate the modules for a resolved session
    pub fn generate(&self, session: &mut Session, source_name: &str) -> Result<GeneratedOutput> {
        let plan = plan::plan_module(session, &self.options.prefix)?;
        let renderer = PythonRenderer::new();

        let mut items: Vec<Item> = Vec::new();
        for class in &plan.classes {
            debug!(
                class = %class.class_name,
                base = class.superclass.as_deref().unwrap_or("-"),
                "emitting class"
            );
            items.push(emit::class_definition(class, &self.options, self.bodies.as_ref()));
            items.push(Item::Blank);
            items.push(Item::Blank);
        }
        items.extend(runtime::epilogue(&plan, &self.options));

        let mut module = runtime::prologue(source_name);
        module.push_str(&renderer.render(&items));

        let subclass_module = self.options.emit_subclasses.then(|| {
            let mut text = subclass::header(source_name, &self.options);
            text.push_str(&renderer.render(&subclass::body(&plan, &self.options)));
            text
        });

        let emitted: Vec<String> = plan.classes.iter().map(|c| c.class_name.clone()).collect();
        info!(
            classes = emitted.len(),
            diagnostics = session.diagnostics.len(),
            "module generated"
        );
        Ok(GeneratedOutput {
            module,
            subclass_module,
            emitted,
            diagnostics: session.diagnostics.clone(),
        })
    }
}

impl std::fmt::Debug for Generator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Generator")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
