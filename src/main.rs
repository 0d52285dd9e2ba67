//! Command-line interface for xsdbind

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};

#[cfg(feature = "cli")]
use std::fs;
#[cfg(feature = "cli")]
use std::path::{Path, PathBuf};

#[cfg(feature = "cli")]
use xsdbind::catalog::XmlCatalog;
#[cfg(feature = "cli")]
use xsdbind::codegen::{
    DirectoryValidatorBodies, ExportModes, Generator, GeneratorOptions, GetterSetter, MemberSpecs,
};
#[cfg(feature = "cli")]
use xsdbind::error::Severity;
#[cfg(feature = "cli")]
use xsdbind::loaders::Loader;
#[cfg(feature = "cli")]
use xsdbind::locations::Location;
#[cfg(feature = "cli")]
use xsdbind::Session;

#[cfg(feature = "cli")]
#[derive(Parser, Debug)]
#[command(name = "xsdbind")]
#[command(author, version, about = "Generate Python data-binding classes from XML Schema", long_about = None)]
struct Cli {
    /// Log pipeline progress (repeat for more detail)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate the binding module for a schema
    Generate {
        /// Path to the XSD schema file
        #[arg(value_name = "SCHEMA")]
        schema: PathBuf,

        /// Output module (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also write a subclass module to this file
        #[arg(short, long)]
        subclass_output: Option<PathBuf>,

        /// Module the subclass module imports (defaults to the output file stem)
        #[arg(long)]
        super_module: Option<String>,

        /// JSON options file; flags override its values
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Prefix for generated class names
        #[arg(short, long)]
        prefix: Option<String>,

        /// Accessor naming: new (get_x) or old (getX)
        #[arg(long, value_parser = ["new", "old"])]
        getter_setter: Option<String>,

        /// Member specifications: off, list or dict
        #[arg(long, value_parser = ["off", "list", "dict"])]
        member_specs: Option<String>,

        /// Suffix of the subclass names
        #[arg(long)]
        subclass_suffix: Option<String>,

        /// Serialization modes, e.g. "write literal etree"
        #[arg(short, long)]
        export: Option<String>,

        /// Root element used when a document's root tag is unknown
        #[arg(long)]
        root_element: Option<String>,

        /// Namespace declaration written on exported root elements
        #[arg(long)]
        namespace_def: Option<String>,

        /// Directory of validator bodies, one <Type>.py per simple type
        #[arg(long, value_name = "DIR")]
        validator_bodies: Option<PathBuf>,

        /// XML catalog for include locations
        #[arg(long)]
        catalog: Option<PathBuf>,
    },

    /// Inspect the resolved schema model
    Inspect {
        /// Path to the XSD schema file
        #[arg(value_name = "SCHEMA")]
        schema: PathBuf,

        /// XML catalog for include locations
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },
}

#[cfg(feature = "cli")]
fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Generate {
            schema,
            output,
            subclass_output,
            super_module,
            config,
            prefix,
            getter_setter,
            member_specs,
            subclass_suffix,
            export,
            root_element,
            namespace_def,
            validator_bodies,
            catalog,
        } => {
            let flags = GenerateFlags {
                prefix,
                getter_setter,
                member_specs,
                subclass_suffix,
                export,
                root_element,
                namespace_def,
                super_module,
            };
            cmd_generate(
                &schema,
                output.as_deref(),
                subclass_output.as_deref(),
                config.as_deref(),
                flags,
                validator_bodies,
                catalog.as_deref(),
            )
        }
        Commands::Inspect {
            schema,
            catalog,
            json,
        } => cmd_inspect(&schema, catalog.as_deref(), json),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(feature = "cli")]
fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default)),
        )
        .init();
}

/// Option overrides given on the command line
#[cfg(feature = "cli")]
struct GenerateFlags {
    prefix: Option<String>,
    getter_setter: Option<String>,
    member_specs: Option<String>,
    subclass_suffix: Option<String>,
    export: Option<String>,
    root_element: Option<String>,
    namespace_def: Option<String>,
    super_module: Option<String>,
}

#[cfg(feature = "cli")]
impl GenerateFlags {
    fn apply(self, mut options: GeneratorOptions) -> xsdbind::Result<GeneratorOptions> {
        if let Some(prefix) = self.prefix {
            options.prefix = prefix;
        }
        match self.getter_setter.as_deref() {
            Some("old") => options.getter_setter = GetterSetter::Old,
            Some(_) => options.getter_setter = GetterSetter::New,
            None => {}
        }
        match self.member_specs.as_deref() {
            Some("list") => options.member_specs = MemberSpecs::List,
            Some("dict") => options.member_specs = MemberSpecs::Dict,
            Some(_) => options.member_specs = MemberSpecs::Off,
            None => {}
        }
        if let Some(suffix) = self.subclass_suffix {
            options.subclass_suffix = suffix;
        }
        if let Some(export) = self.export {
            options.export = ExportModes::parse(&export)?;
        }
        if let Some(root) = self.root_element {
            options.root_element = Some(root);
        }
        if let Some(namespace_def) = self.namespace_def {
            options.namespace_def = Some(namespace_def);
        }
        if let Some(super_module) = self.super_module {
            options.super_module = super_module;
        }
        Ok(options)
    }
}

#[cfg(feature = "cli")]
fn compile(schema: &Path, catalog: Option<&Path>) -> Result<Session, Box<dyn std::error::Error>> {
    let catalog = catalog.map(XmlCatalog::from_file).transpose()?;
    let location = Location::Path(schema.to_path_buf());
    Ok(xsdbind::compile_location(
        &location,
        &Loader::new(),
        catalog.as_ref(),
    )?)
}

#[cfg(feature = "cli")]
fn cmd_generate(
    schema: &Path,
    output: Option<&Path>,
    subclass_output: Option<&Path>,
    config: Option<&Path>,
    flags: GenerateFlags,
    validator_bodies: Option<PathBuf>,
    catalog: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut options = match config {
        Some(path) => GeneratorOptions::from_file(path)?,
        None => GeneratorOptions::new(),
    };
    if let Some(stem) = output.and_then(Path::file_stem) {
        options.super_module = stem.to_string_lossy().into_owned();
    }
    let mut options = flags.apply(options)?;
    options.emit_subclasses = subclass_output.is_some();

    let mut generator = Generator::new(options);
    if let Some(dir) = validator_bodies {
        generator = generator.with_validator_bodies(DirectoryValidatorBodies::new(dir));
    }

    let mut session = compile(schema, catalog)?;
    let source_name = Location::Path(schema.to_path_buf()).file_name();
    let generated = generator.generate(&mut session, &source_name)?;

    for diagnostic in &generated.diagnostics {
        eprintln!("{}", diagnostic);
    }

    match output {
        Some(path) => fs::write(path, &generated.module)?,
        None => print!("{}", generated.module),
    }
    if let (Some(path), Some(text)) = (subclass_output, &generated.subclass_module) {
        fs::write(path, text)?;
    }
    eprintln!("{} classes generated", generated.emitted.len());
    Ok(())
}

#[cfg(feature = "cli")]
fn cmd_inspect(
    schema: &Path,
    catalog: Option<&Path>,
    json_output: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let session = compile(schema, catalog)?;
    if json_output {
        println!("{}", serde_json::to_string_pretty(&session)?);
        return Ok(());
    }

    println!("Schema: {}", schema.display());
    if let Some(ns) = &session.target_namespace {
        println!("Target namespace: {}", ns);
    }
    println!("XSD prefix: {:?}", session.schema_prefix);

    println!("\n=== Types ===");
    for (name, id) in &session.types {
        let node = &session.tree[*id];
        let kind = if node.is_complex { "complex" } else { "simple" };
        match &node.base {
            Some(base) => println!("  {} ({}, extends {})", name, kind, base),
            None => println!("  {} ({})", name, kind),
        }
    }

    println!("\n=== Simple Types ===");
    for name in session.simple_types.keys() {
        println!("  {} -> {}", name, session.resolve_simple(name).builtin);
    }

    if !session.substitution_groups.is_empty() {
        println!("\n=== Substitution Groups ===");
        for (head, members) in &session.substitution_groups {
            println!("  {}: {}", head, members.join(", "));
        }
    }

    let warnings = session
        .diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Warning)
        .count();
    println!(
        "\n=== Diagnostics ({} warnings, {} notes) ===",
        warnings,
        session.diagnostics.len() - warnings
    );
    for diagnostic in &session.diagnostics {
        println!("  {}", diagnostic);
    }
    Ok(())
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Rebuild with --features cli");
    std::process::exit(1);
}
