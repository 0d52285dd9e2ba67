//! Schema locations
//!
//! A `schemaLocation` is either a local path or a URL. Relative references are
//! resolved against the location of the document that contains them.

use std::fmt;
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::{Error, Result};

/// Where a schema document lives
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Location {
    /// File system path
    Path(PathBuf),
    /// Non-file URL (http, https, ftp, ...)
    Url(Url),
}

impl Location {
    /// Classify a location string
    pub fn parse(s: &str) -> Result<Self> {
        // A one-letter scheme is a Windows drive, not a URL
        match Url::parse(s) {
            Ok(url) if url.scheme() == "file" => url
                .to_file_path()
                .map(Location::Path)
                .map_err(|_| Error::Resource(format!("Invalid file URL '{}'", s))),
            Ok(url) if url.scheme().len() > 1 => Ok(Location::Url(url)),
            _ => Ok(Location::Path(PathBuf::from(s))),
        }
    }

    /// Resolve `reference` relative to this location
    pub fn join(&self, reference: &str) -> Result<Self> {
        match Location::parse(reference)? {
            Location::Path(path) if path.is_relative() => match self {
                Location::Path(base) => Ok(Location::Path(
                    base.parent().unwrap_or_else(|| Path::new("")).join(path),
                )),
                Location::Url(base) => Ok(Location::Url(base.join(reference)?)),
            },
            absolute => Ok(absolute),
        }
    }

    /// Whether this is a remote location
    pub fn is_remote(&self) -> bool {
        matches!(self, Location::Url(_))
    }

    /// Last path segment, used in generated headers
    pub fn file_name(&self) -> String {
        match self {
            Location::Path(path) => path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
            Location::Url(url) => url
                .path_segments()
                .and_then(|mut segments| segments.next_back())
                .filter(|segment| !segment.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| url.to_string()),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Path(path) => write!(f, "{}", path.display()),
            Location::Url(url) => write!(f, "{}", url),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_from_url() {
        let loc = Location::parse("http://example.com/schema.xsd").unwrap();
        assert!(matches!(loc, Location::Url(_)));
        assert!(loc.is_remote());
    }

    #[test]
    fn test_location_from_path() {
        let loc = Location::parse("/tmp/schema.xsd").unwrap();
        assert_eq!(loc, Location::Path(PathBuf::from("/tmp/schema.xsd")));
        assert!(!loc.is_remote());
    }

    #[test]
    fn test_file_url_becomes_path() {
        let loc = Location::parse("file:///tmp/schema.xsd").unwrap();
        assert_eq!(loc, Location::Path(PathBuf::from("/tmp/schema.xsd")));
    }

    #[test]
    fn test_join_relative_path() {
        let base = Location::parse("/schemas/main.xsd").unwrap();
        assert_eq!(
            base.join("common/types.xsd").unwrap(),
            Location::Path(PathBuf::from("/schemas/common/types.xsd"))
        );
        assert_eq!(
            base.join("/other/abs.xsd").unwrap(),
            Location::Path(PathBuf::from("/other/abs.xsd"))
        );
    }

    #[test]
    fn test_join_against_url() {
        let base = Location::parse("http://example.com/xsd/main.xsd").unwrap();
        assert_eq!(
            base.join("types.xsd").unwrap().to_string(),
            "http://example.com/xsd/types.xsd"
        );
    }

    #[test]
    fn test_file_name() {
        assert_eq!(Location::parse("/a/b/order.xsd").unwrap().file_name(), "order.xsd");
        assert_eq!(
            Location::parse("http://example.com/x/po.xsd").unwrap().file_name(),
            "po.xsd"
        );
    }
}
