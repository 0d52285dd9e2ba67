//! XSD built-in scalar types
//!
//! Generated code only distinguishes a handful of scalar families. Every
//! built-in XSD type name maps onto one of them; anything unrecognized falls
//! back to the string family.

use serde::Serialize;
use std::fmt;

/// The scalar families the generated code knows how to parse and format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Family {
    /// Text (string, token, anyURI, QName, ...)
    String,
    /// Arbitrary-precision integers and their range-restricted subtypes
    Integer,
    /// xs:decimal
    Decimal,
    /// xs:float
    Float,
    /// xs:double
    Double,
    /// xs:boolean
    Boolean,
    /// xs:dateTime
    DateTime,
    /// xs:date
    Date,
    /// xs:time
    Time,
    /// xs:base64Binary
    Base64,
}

impl Family {
    /// Lower-case family name
    pub fn as_str(&self) -> &'static str {
        match self {
            Family::String => "string",
            Family::Integer => "integer",
            Family::Decimal => "decimal",
            Family::Float => "float",
            Family::Double => "double",
            Family::Boolean => "boolean",
            Family::DateTime => "datetime",
            Family::Date => "date",
            Family::Time => "time",
            Family::Base64 => "base64",
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inclusive value range of an integer subtype; `None` is unbounded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IntegerBounds {
    /// Smallest allowed value
    pub min: Option<i128>,
    /// Largest allowed value
    pub max: Option<i128>,
}

/// A built-in XSD type, by local name, with its family
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct BuiltinType {
    /// XSD local name, e.g. `positiveInteger`
    pub name: String,
    /// Scalar family
    pub family: Family,
}

/// Built-in local names and their families
const BUILTINS: &[(&str, Family)] = &[
    ("string", Family::String),
    ("normalizedString", Family::String),
    ("token", Family::String),
    ("language", Family::String),
    ("Name", Family::String),
    ("NCName", Family::String),
    ("ID", Family::String),
    ("IDREF", Family::String),
    ("IDREFS", Family::String),
    ("ENTITY", Family::String),
    ("ENTITIES", Family::String),
    ("NMTOKEN", Family::String),
    ("NMTOKENS", Family::String),
    ("anyURI", Family::String),
    ("QName", Family::String),
    ("NOTATION", Family::String),
    ("duration", Family::String),
    ("gYear", Family::String),
    ("gYearMonth", Family::String),
    ("gMonth", Family::String),
    ("gMonthDay", Family::String),
    ("gDay", Family::String),
    ("hexBinary", Family::String),
    ("anySimpleType", Family::String),
    ("integer", Family::Integer),
    ("int", Family::Integer),
    ("long", Family::Integer),
    ("short", Family::Integer),
    ("byte", Family::Integer),
    ("nonNegativeInteger", Family::Integer),
    ("positiveInteger", Family::Integer),
    ("nonPositiveInteger", Family::Integer),
    ("negativeInteger", Family::Integer),
    ("unsignedLong", Family::Integer),
    ("unsignedInt", Family::Integer),
    ("unsignedShort", Family::Integer),
    ("unsignedByte", Family::Integer),
    ("decimal", Family::Decimal),
    ("float", Family::Float),
    ("double", Family::Double),
    ("boolean", Family::Boolean),
    ("dateTime", Family::DateTime),
    ("date", Family::Date),
    ("time", Family::Time),
    ("base64Binary", Family::Base64),
];

/// Built-ins whose values are whitespace separated lists
const LIST_BUILTINS: &[&str] = &["IDREFS", "ENTITIES", "NMTOKENS"];

/// Built-ins that carry no special runtime meaning and are treated as text
const IDENTITY_BUILTINS: &[&str] = &["ID", "IDREF", "IDREFS"];

/// Local name of the wildcard type
pub const ANY_TYPE: &str = "anyType";

impl BuiltinType {
    /// Look up a recognized built-in by local name
    pub fn lookup(local_name: &str) -> Option<Self> {
        BUILTINS
            .iter()
            .find(|(name, _)| *name == local_name)
            .map(|(name, family)| Self {
                name: (*name).to_string(),
                family: *family,
            })
    }

    /// Classify a name, defaulting unrecognized names to `string`
    pub fn classify(local_name: &str) -> Self {
        Self::lookup(local_name).unwrap_or_else(Self::string)
    }

    /// The plain string type
    pub fn string() -> Self {
        Self {
            name: "string".to_string(),
            family: Family::String,
        }
    }

    /// Whether a local name is a recognized built-in
    pub fn is_builtin(local_name: &str) -> bool {
        Self::lookup(local_name).is_some()
    }

    /// Whether values of this built-in are space separated lists
    pub fn is_list(&self) -> bool {
        LIST_BUILTINS.contains(&self.name.as_str())
    }

    /// Whether this is one of the ID/IDREF/IDREFS kinds
    pub fn is_identity(local_name: &str) -> bool {
        IDENTITY_BUILTINS.contains(&local_name)
    }

    /// Value range enforced by generated parsers for integer subtypes
    pub fn integer_bounds(&self) -> Option<IntegerBounds> {
        let (min, max) = match self.name.as_str() {
            "positiveInteger" => (Some(1), None),
            "nonNegativeInteger" => (Some(0), None),
            "negativeInteger" => (None, Some(-1)),
            "nonPositiveInteger" => (None, Some(0)),
            "byte" => (Some(i8::MIN as i128), Some(i8::MAX as i128)),
            "short" => (Some(i16::MIN as i128), Some(i16::MAX as i128)),
            "int" => (Some(i32::MIN as i128), Some(i32::MAX as i128)),
            "long" => (Some(i64::MIN as i128), Some(i64::MAX as i128)),
            "unsignedByte" => (Some(0), Some(u8::MAX as i128)),
            "unsignedShort" => (Some(0), Some(u16::MAX as i128)),
            "unsignedInt" => (Some(0), Some(u32::MAX as i128)),
            "unsignedLong" => (Some(0), Some(u64::MAX as i128)),
            _ => return None,
        };
        Some(IntegerBounds { min, max })
    }

    /// All integer subtypes that carry a range
    pub fn bounded_integers() -> impl Iterator<Item = (BuiltinType, IntegerBounds)> {
        BUILTINS
            .iter()
            .filter(|(_, family)| *family == Family::Integer)
            .filter_map(|(name, _)| {
                let builtin = Self::classify(name);
                builtin.integer_bounds().map(|bounds| (builtin, bounds))
            })
    }
}

impl fmt::Display for BuiltinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "xs:{}", self.name)
    }
}
