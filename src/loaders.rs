//! Schema document loading

use std::fs;

use tracing::debug;

use crate::error::{Error, Result};
use crate::limits::Limits;
use crate::locations::Location;

/// Reads schema documents from their locations
#[derive(Debug, Clone, Default)]
pub struct Loader {
    /// Resource limits
    limits: Limits,
}

impl Loader {
    /// Create a new loader with default limits
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the limits
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// The limits in use
    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Load a schema document as text
    pub fn load(&self, location: &Location) -> Result<String> {
        match location {
            Location::Path(path) => {
                let content = fs::read_to_string(path).map_err(|e| {
                    Error::Resource(format!("Failed to read file '{}': {}", path.display(), e))
                })?;
                self.limits.check_schema_size(content.len())?;
                debug!(path = %path.display(), bytes = content.len(), "schema loaded");
                Ok(content)
            }
            Location::Url(url) => Err(Error::Resource(format!(
                "remote schema locations are not supported: {}",
                url
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "<xs:schema/>").unwrap();

        let location = Location::Path(file.path().to_path_buf());
        let content = Loader::new().load(&location).unwrap();
        assert!(content.contains("<xs:schema/>"));
    }

    #[test]
    fn test_missing_file() {
        let location = Location::parse("/nonexistent/dir/schema.xsd").unwrap();
        let err = Loader::new().load(&location).unwrap_err();
        assert!(matches!(err, Error::Resource(_)));
    }

    #[test]
    fn test_remote_is_refused() {
        let location = Location::parse("https://example.com/schema.xsd").unwrap();
        assert!(Loader::new().load(&location).is_err());
    }

    #[test]
    fn test_size_limit() {
        let mut file = NamedTempFile::new().unwrap();
        let large_content = "x".repeat(11 * 1024 * 1024); // 11 MB
        write!(file, "{}", large_content).unwrap();

        let location = Location::Path(file.path().to_path_buf());
        let loader = Loader::new().with_limits(Limits::strict());

        // Strict limits (10 MB max) should reject 11MB file
        assert!(matches!(loader.load(&location), Err(Error::LimitExceeded(_))));
    }
}
