//! Validator-body collaborator
//!
//! Each simple type used by a generated class gets a `validate_<Type>` hook.
//! Its body comes from a [`ValidatorBodySource`]; when the source has nothing
//! for a type the hook is a no-op.

use std::collections::HashMap;
use std::path::PathBuf;

use tracing::debug;

/// Supplies validator bodies by simple-type name
pub trait ValidatorBodySource {
    /// Body of the validator for `type_name`, if one is provided
    fn body(&self, type_name: &str) -> Option<String>;
}

/// A source that never supplies a body
#[derive(Debug, Clone, Copy, Default)]
pub struct NoValidatorBodies;

impl ValidatorBodySource for NoValidatorBodies {
    fn body(&self, _type_name: &str) -> Option<String> {
        None
    }
}

impl ValidatorBodySource for HashMap<String, String> {
    fn body(&self, type_name: &str) -> Option<String> {
        self.get(type_name).cloned()
    }
}

/// Reads bodies from `<dir>/<Type>.py`
#[derive(Debug, Clone)]
pub struct DirectoryValidatorBodies {
    dir: PathBuf,
}

impl DirectoryValidatorBodies {
    /// Look up bodies in `dir`
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl ValidatorBodySource for DirectoryValidatorBodies {
    fn body(&self, type_name: &str) -> Option<String> {
        let path = self.dir.join(format!("{}.py", type_name));
        match std::fs::read_to_string(&path) {
            Ok(text) => {
                debug!(path = %path.display(), "validator body loaded");
                Some(text)
            }
            Err(_) => None,
        }
    }
}

/// Remove the indentation shared by every non-empty line
pub fn dedent(text: &str) -> String {
    let common = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);
    text.lines()
        .map(|line| if line.len() >= common { &line[common..] } else { line.trim_start() })
        .collect::<Vec<_>>()
        .join("\n")
}
