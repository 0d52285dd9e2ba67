//! Schema object model
//!
//! The in-memory form of an ingested schema: nodes for elements and complex
//! types, simple types, attributes and attribute groups, and the
//! [`Session`] that owns them together with the global lookup tables.

pub mod attribute;
pub mod builtins;
pub mod node;
pub mod session;
pub mod simple_type;

pub use attribute::{Attribute, AttributeGroup, AttributeUse};
pub use builtins::{BuiltinType, Family, IntegerBounds, ANY_TYPE};
pub use node::{NodeId, NodeKind, ResolvedType, SchemaNode, SchemaTree, UNBOUNDED};
pub use session::{Session, SimpleResolution};
pub use simple_type::SimpleType;
