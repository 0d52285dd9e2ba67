//! Error types for xsdbind
//!
//! Fatal problems abort a generation run and surface as [`Error`]. Everything
//! recoverable is recorded as a [`Diagnostic`] on the session instead, so that
//! unrelated types can still be generated.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Result type alias using xsdbind Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for xsdbind operations
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed schema document (bad nesting, no schema tag, XML syntax)
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// An occurrence bound that is neither an integer nor "unbounded"
    #[error("invalid {attribute} value '{value}' on '{component}'")]
    Occurrence {
        /// Either `minOccurs` or `maxOccurs`
        attribute: &'static str,
        /// The offending literal
        value: String,
        /// Name of the declaring component
        component: String,
    },

    /// An inheritance chain deeper than the configured ceiling
    #[error("inheritance chain of '{component}' exceeds depth {limit} (cycle in base types?)")]
    InheritanceDepth {
        /// Name of the type whose chain was being walked
        component: String,
        /// The configured ceiling
        limit: usize,
    },

    /// Emission stalled with types whose bases can never be generated
    #[error("cannot order generated types, still waiting on bases: {}", .0.join(", "))]
    EmissionDeadlock(Vec<String>),

    /// Resource loading error
    #[error("resource error: {0}")]
    Resource(String),

    /// Limit exceeded error
    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    /// An option value that is not recognized
    #[error("invalid option: {0}")]
    InvalidOption(String),

    /// Options file could not be read
    #[error("configuration error: {0}")]
    Config(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// XML parsing error
    #[error("XML error: {0}")]
    Xml(String),

    /// URL parsing error
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
}

/// Schema document parsing error
#[derive(Debug, Clone)]
pub struct ParseError {
    /// Error message
    pub message: String,
    /// Location in the schema file
    pub location: Option<String>,
}

impl ParseError {
    /// Create a new parse error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            location: None,
        }
    }

    /// Set the location
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        if let Some(ref loc) = self.location {
            write!(f, "\n\nLocation: {}", loc)?;
        }

        Ok(())
    }
}

impl std::error::Error for ParseError {}

/// How serious a diagnostic is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Something was skipped or defaulted
    Warning,
    /// Informational only
    Note,
}

/// What kind of recoverable problem a diagnostic reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticKind {
    /// `attributeGroup ref` naming an unknown group
    MissingAttributeGroup,
    /// `group ref` naming an unknown group
    MissingGroup,
    /// `group ref` that would expand into itself
    GroupCycle,
    /// Mixed and non-mixed types in one inheritance chain
    MixedContent,
    /// Simple-type restriction chain longer than the iteration budget
    RestrictionBudget,
    /// Element/type references that loop back on themselves
    TypeCycle,
    /// A `base` that names no known type
    UnknownBase,
    /// Schema constructs that are recognized but not processed
    Unsupported,
    /// A declared name that is not a valid NCName
    InvalidName,
    /// A default value that does not parse as its declared type
    InvalidDefault,
    /// A type left out of the generated module
    SkippedType,
}

/// A recoverable problem found while processing a schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Severity
    pub severity: Severity,
    /// Category
    pub kind: DiagnosticKind,
    /// Schema component the diagnostic is about
    pub component: String,
    /// Human readable explanation
    pub message: String,
}

impl Diagnostic {
    /// Create a warning
    pub fn warning(
        kind: DiagnosticKind,
        component: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity: Severity::Warning,
            kind,
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create a note
    pub fn note(
        kind: DiagnosticKind,
        component: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity: Severity::Note,
            ..Self::warning(kind, component, message)
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Warning => "warning",
            Severity::Note => "note",
        };
        write!(f, "{}: {}: {}", level, self.component, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display() {
        let err = ParseError::new("Unbalanced schema document")
            .with_location("byte 42");

        let msg = format!("{}", err);
        assert!(msg.contains("Unbalanced schema document"));
        assert!(msg.contains("Location:"));
        assert!(msg.ends_with("byte 42"));
    }

    #[test]
    fn test_error_conversion() {
        let err: Error = ParseError::new("test").into();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn test_occurrence_error_message() {
        let err = Error::Occurrence {
            attribute: "maxOccurs",
            value: "many".to_string(),
            component: "item".to_string(),
        };
        assert_eq!(err.to_string(), "invalid maxOccurs value 'many' on 'item'");
    }

    #[test]
    fn test_deadlock_lists_types() {
        let err = Error::EmissionDeadlock(vec!["a".to_string(), "b".to_string()]);
        assert!(err.to_string().ends_with("a, b"));
    }

    #[test]
    fn test_diagnostic_display() {
        let diag = Diagnostic::warning(
            DiagnosticKind::MissingAttributeGroup,
            "person",
            "attribute group 'common' not found",
        );
        assert_eq!(
            diag.to_string(),
            "warning: person: attribute group 'common' not found"
        );
        let note = Diagnostic::note(DiagnosticKind::Unsupported, "schema", "import skipped");
        assert_eq!(note.severity, Severity::Note);
    }
}
