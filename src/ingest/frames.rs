//! Ingestion context frames
//!
//! Every start tag pushes exactly one frame and every end tag pops one, so
//! the frame stack mirrors the open-tag stack of the document. What a tag
//! means depends on the frames below it (an `<enumeration>` inside an
//! `<attribute>` belongs to the attribute, not to the element).

use crate::model::{Attribute, AttributeGroup, NodeId, SimpleType};

/// Kind of model-group particle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ParticleKind {
    Sequence,
    Choice,
    All,
}

/// One open tag and the state it carries
#[derive(Debug)]
pub(crate) enum Frame {
    /// `<schema>`, holding the root node
    Schema(NodeId),
    /// A node under construction (element, complexType, group, any)
    Node(NodeId),
    /// `<complexType>` nested inside an element; its node is the element
    InlineComplexType,
    /// `<sequence>`, `<choice>` or `<all>` with the occurrence bounds it
    /// hands down to its elements
    Particle {
        kind: ParticleKind,
        min_occurs: Option<String>,
        max_occurs: Option<String>,
    },
    /// `<attribute>` being declared
    Attribute(Attribute),
    /// `<attributeGroup name=...>` being declared
    AttributeGroup(AttributeGroup),
    /// `<simpleType>` being declared
    SimpleType(SimpleType),
    /// `<simpleType>` inside an `<attribute>`; facets go to the attribute
    AttributeSimpleType,
    /// `<simpleContent>`
    SimpleContent,
    /// `<complexContent>`
    ComplexContent,
    /// `<restriction>`
    Restriction,
    /// `<extension>`
    Extension,
    /// `<list>`
    List,
    /// `<union>`
    Union,
    /// `<annotation>`
    Annotation,
    /// `<documentation>`; character data below it is kept
    Documentation,
    /// Vocabulary that carries nothing the model needs, or foreign markup
    Ignored,
}

impl Frame {
    /// The node this frame builds, if it builds one
    pub(crate) fn node(&self) -> Option<NodeId> {
        match self {
            Frame::Schema(id) | Frame::Node(id) => Some(*id),
            _ => None,
        }
    }
}
