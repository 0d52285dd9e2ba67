//! Emission plan
//!
//! Condenses the resolved schema tree into one [`ClassPlan`] per generated
//! class: its members with their value kinds, its base class, the validator
//! hooks it needs. Emitters only read plans, never the tree.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use tracing::debug;

use super::defaults::render_default;
use super::order::emission_order;
use crate::error::{Diagnostic, DiagnosticKind, Result};
use crate::model::{BuiltinType, NodeId, NodeKind, ResolvedType, SchemaNode, Session};
use crate::names::{class_name, clean_name, strip_prefix};

/// A scalar value and how it is parsed, formatted and validated
#[derive(Debug, Clone, PartialEq)]
pub struct Scalar {
    /// Built-in the value is stored as
    pub builtin: BuiltinType,
    /// Whitespace separated list of values
    pub is_list: bool,
    /// Collapse whitespace before parsing
    pub collapse_whitespace: bool,
    /// Named simple type whose validator hook is called
    pub validator: Option<String>,
}

impl Scalar {
    /// A plain value of a built-in type
    pub fn new(builtin: BuiltinType) -> Self {
        Self {
            builtin,
            is_list: false,
            collapse_whitespace: false,
            validator: None,
        }
    }

    /// Suffix of the runtime parse/format helpers (`gds_parse_<codec>`)
    pub fn codec(&self) -> &'static str {
        self.builtin.family.as_str()
    }

    /// Whether the value needs a range check after parsing
    pub fn bounded_integer(&self) -> bool {
        self.builtin.integer_bounds().is_some()
    }
}

/// What a member holds
#[derive(Debug, Clone, PartialEq)]
pub enum ValueKind {
    /// Text parsed into a scalar
    Scalar(Scalar),
    /// An instance of a generated class
    Complex(String),
    /// Anything; built by the build-any hook
    Any,
}

/// An element that may stand in for a member
#[derive(Debug, Clone, PartialEq)]
pub struct Substitute {
    /// Tag of the substituting element
    pub name: String,
    /// What it holds
    pub value: ValueKind,
}

/// A child element member
#[derive(Debug, Clone, PartialEq)]
pub struct ChildPlan {
    /// Tag in instance documents
    pub name: String,
    /// Identifier of the member
    pub member: String,
    /// What the member holds
    pub value: ValueKind,
    /// Whether the member is a list
    pub repeated: bool,
    /// An `<any>` wildcard rather than a named element
    pub wildcard: bool,
    /// Whether the member may be absent
    pub optional: bool,
    /// Constructor creates an empty instance when none is passed
    pub instantiate: bool,
    /// Constructor default, as a literal
    pub default: Option<String>,
    /// Substitution group members routed to this member
    pub substitutes: Vec<Substitute>,
    /// Type name recorded in member specifications
    pub data_type: String,
}

/// An attribute member
#[derive(Debug, Clone, PartialEq)]
pub struct AttributePlan {
    /// Attribute name in instance documents
    pub name: String,
    /// Identifier of the member
    pub member: String,
    /// Value type
    pub scalar: Scalar,
    /// Whether the attribute is required
    pub required: bool,
    /// Constructor default, as a literal
    pub default: Option<String>,
    /// Type name recorded in member specifications
    pub data_type: String,
}

/// A constructor parameter
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    /// Parameter (and member) name
    pub name: String,
    /// Default literal
    pub default: String,
}

/// Everything needed to emit one class
#[derive(Debug, Clone, PartialEq)]
pub struct ClassPlan {
    /// Schema type name (also the default tag when exporting)
    pub type_name: String,
    /// Generated class name
    pub class_name: String,
    /// Schema name of the base type
    pub base_type: Option<String>,
    /// Generated class name of the base type
    pub superclass: Option<String>,
    /// Attribute members, in declaration order
    pub attributes: Vec<AttributePlan>,
    /// Child members, in document order
    pub children: Vec<ChildPlan>,
    /// Text content of a simple-content type, unless inherited
    pub simple_content: Option<Scalar>,
    /// Whether a base class already holds the text content
    pub inherits_simple_content: bool,
    /// Mixed content kept as an ordered `content_` list
    pub mixed: bool,
    /// Whether a base class already holds `content_`
    pub inherits_mixed: bool,
    /// Unknown attributes kept in `anyAttributes_`
    pub any_attribute: bool,
    /// Whether a base class already keeps `anyAttributes_`
    pub inherits_any_attribute: bool,
    /// Other classes derive from this one
    pub has_subtypes: bool,
    /// Declared abstract
    pub is_abstract: bool,
    /// Schema documentation
    pub documentation: String,
    /// Simple types with a validator hook on this class
    pub validators: Vec<(String, BuiltinType)>,
    /// Constructor parameters of the base classes, outermost base first
    pub inherited_params: Vec<Param>,
}

impl ClassPlan {
    /// Whether the class passes an `xsi:type` discriminator around
    pub fn takes_extension_type(&self) -> bool {
        self.has_subtypes || self.superclass.is_some()
    }

    /// Constructor parameters declared by this class itself
    pub fn own_params(&self) -> Vec<Param> {
        let mut params: Vec<Param> = self
            .attributes
            .iter()
            .map(|attr| Param {
                name: attr.member.clone(),
                default: attr.default.clone().unwrap_or_else(|| "None".to_string()),
            })
            .collect();
        for child in &self.children {
            params.push(Param {
                name: child.member.clone(),
                default: match (&child.default, child.repeated) {
                    (Some(default), false) => default.clone(),
                    _ => "None".to_string(),
                },
            });
        }
        if self.owns_simple_content() {
            params.push(Param {
                name: "valueOf_".to_string(),
                default: "None".to_string(),
            });
        }
        if self.owns_any_attribute() {
            params.push(Param {
                name: "anyAttributes_".to_string(),
                default: "None".to_string(),
            });
        }
        if self.owns_mixed() {
            params.push(Param {
                name: "mixedclass_".to_string(),
                default: "None".to_string(),
            });
            params.push(Param {
                name: "content_".to_string(),
                default: "None".to_string(),
            });
        }
        params
    }

    /// Every constructor parameter, inherited ones first
    pub fn all_params(&self) -> Vec<Param> {
        let mut params = self.inherited_params.clone();
        for param in self.own_params() {
            if !params.iter().any(|p| p.name == param.name) {
                params.push(param);
            }
        }
        params
    }

    /// Whether this class, rather than a base, keeps `extensiontype_`
    pub fn owns_extension_type(&self) -> bool {
        self.takes_extension_type() && self.superclass.is_none()
    }

    /// Whether this class, rather than a base, keeps `valueOf_`
    pub fn owns_simple_content(&self) -> bool {
        self.simple_content.is_some() && !self.inherits_simple_content
    }

    /// Whether this class, rather than a base, keeps `content_`
    pub fn owns_mixed(&self) -> bool {
        self.mixed && !self.inherits_mixed
    }

    /// Whether this class, rather than a base, keeps `anyAttributes_`
    pub fn owns_any_attribute(&self) -> bool {
        self.any_attribute && !self.inherits_any_attribute
    }
}

/// The classes of one module, in emission order
#[derive(Debug, Clone, Default)]
pub struct ModulePlan {
    /// Classes, every base before the classes deriving from it
    pub classes: Vec<ClassPlan>,
    /// Root tag → class name, for top-level elements
    pub root_tags: IndexMap<String, String>,
    /// Schema type name → class name
    pub type_classes: IndexMap<String, String>,
}

/// Build the module plan from a resolved session
pub fn plan_module(session: &mut Session, prefix: &str) -> Result<ModulePlan> {
    let candidates = candidate_types(session);
    let skipped = skipped_types(session, &candidates);

    let mut type_classes = IndexMap::new();
    for (name, _) in candidates.iter().filter(|(name, _)| !skipped.contains(name)) {
        type_classes.insert(name.clone(), class_name(prefix, name));
    }
    let planner = Planner {
        type_classes: &type_classes,
        top_level: top_level_elements(session),
    };

    let mut classes = Vec::new();
    for (name, id) in &candidates {
        if skipped.contains(name) {
            continue;
        }
        classes.push(planner.class(session, name, *id));
    }

    let mut classes = emission_order(classes, |c| c.type_name.as_str(), |c| c.base_type.as_deref())?;
    link_inheritance(&mut classes);
    mark_instantiated(&mut classes);

    let root_tags = root_tags(session, &type_classes);
    debug!(classes = classes.len(), skipped = skipped.len(), "emission planned");
    Ok(ModulePlan {
        classes,
        root_tags,
        type_classes,
    })
}

/// Registered types that define their own structure
fn candidate_types(session: &Session) -> Vec<(String, NodeId)> {
    session
        .types
        .iter()
        .filter(|(name, id)| {
            let node = &session.tree[**id];
            matches!(node.kind, NodeKind::Element | NodeKind::ComplexType)
                && node.is_complex
                && node.resolved_type.complex_name() == Some(name.as_str())
        })
        .map(|(name, id)| (name.clone(), *id))
        .collect()
}

/// Types left out: mixed-content conflicts and everything derived from them
fn skipped_types(session: &mut Session, candidates: &[(String, NodeId)]) -> HashSet<String> {
    let mut skipped: HashSet<String> = HashSet::new();
    for (name, id) in candidates {
        if session.tree[*id].mixed_conflict {
            skipped.insert(name.clone());
            session.diagnose(Diagnostic::warning(
                DiagnosticKind::SkippedType,
                name.clone(),
                "not generated: inconsistent mixed content",
            ));
        }
    }
    loop {
        let mut grew = false;
        for (name, id) in candidates {
            if skipped.contains(name) {
                continue;
            }
            let base = session.tree[*id].base.clone();
            if let Some(base) = base.filter(|b| skipped.contains(b)) {
                skipped.insert(name.clone());
                grew = true;
                session.diagnose(Diagnostic::warning(
                    DiagnosticKind::SkippedType,
                    name.clone(),
                    format!("not generated: base type '{}' was skipped", base),
                ));
            }
        }
        if !grew {
            return skipped;
        }
    }
}

fn top_level_elements(session: &Session) -> HashMap<String, NodeId> {
    session
        .qualified
        .values()
        .filter(|id| session.tree[**id].kind == NodeKind::Element)
        .map(|id| (session.tree[*id].name.clone(), *id))
        .collect()
}

fn root_tags(session: &Session, type_classes: &IndexMap<String, String>) -> IndexMap<String, String> {
    session
        .qualified
        .values()
        .map(|id| &session.tree[*id])
        .filter(|node| node.kind == NodeKind::Element)
        .filter_map(|node| {
            let type_name = node.resolved_type.complex_name()?;
            let class = type_classes.get(type_name)?;
            Some((node.name.clone(), class.clone()))
        })
        .collect()
}

/// Fill in what each class inherits from its bases
fn link_inheritance(classes: &mut [ClassPlan]) {
    let mut by_type: HashMap<String, usize> = HashMap::new();
    for index in 0..classes.len() {
        if let Some(base) = classes[index]
            .base_type
            .as_ref()
            .and_then(|base| by_type.get(base))
            .copied()
        {
            let parent = classes[base].clone();
            let plan = &mut classes[index];
            plan.superclass = Some(parent.class_name.clone());
            plan.inherited_params = parent.all_params();
            plan.inherits_simple_content =
                parent.simple_content.is_some() || parent.inherits_simple_content;
            plan.inherits_mixed = parent.mixed || parent.inherits_mixed;
            plan.inherits_any_attribute = parent.any_attribute || parent.inherits_any_attribute;
            if plan.inherits_simple_content && plan.simple_content.is_none() {
                plan.simple_content = parent.simple_content.clone();
            }
        }
        by_type.insert(classes[index].type_name.clone(), index);
    }
}

/// Required singular complex children are created by the constructor,
/// unless creating them would recurse
fn mark_instantiated(classes: &mut [ClassPlan]) {
    let mut edges: HashMap<String, Vec<String>> = HashMap::new();
    let abstract_classes: HashSet<String> = classes
        .iter()
        .filter(|c| c.is_abstract)
        .map(|c| c.class_name.clone())
        .collect();
    // Bases come first, so a base's edges are complete when a derived class
    // copies them.
    for plan in classes.iter() {
        let mut targets: Vec<String> = plan
            .superclass
            .as_ref()
            .and_then(|base| edges.get(base))
            .cloned()
            .unwrap_or_default();
        targets.extend(plan.children.iter().filter_map(required_class));
        edges.insert(plan.class_name.clone(), targets);
    }
    for plan in classes.iter_mut() {
        let owner = plan.class_name.clone();
        for child in plan.children.iter_mut() {
            if let Some(target) = required_class(child) {
                child.instantiate =
                    !abstract_classes.contains(&target) && !reaches(&edges, &target, &owner);
            }
        }
    }
}

fn required_class(child: &ChildPlan) -> Option<String> {
    match &child.value {
        ValueKind::Complex(class) if !child.repeated && !child.optional => Some(class.clone()),
        _ => None,
    }
}

fn reaches(edges: &HashMap<String, Vec<String>>, from: &str, to: &str) -> bool {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut pending = vec![from];
    while let Some(current) = pending.pop() {
        if current == to {
            return true;
        }
        if !seen.insert(current) {
            continue;
        }
        if let Some(targets) = edges.get(current) {
            pending.extend(targets.iter().map(String::as_str));
        }
    }
    false
}

struct Planner<'p> {
    type_classes: &'p IndexMap<String, String>,
    top_level: HashMap<String, NodeId>,
}

impl Planner<'_> {
    fn class(&self, session: &mut Session, type_name: &str, id: NodeId) -> ClassPlan {
        let node = session.tree[id].clone();

        let attributes = node
            .attribute_definitions
            .values()
            .map(|attr| {
                let scalar = attribute_scalar(session, &attr.data_type);
                let default = attr
                    .default_value
                    .as_deref()
                    .and_then(|value| self.default(session, &node.name, &attr.name, value, &scalar));
                AttributePlan {
                    name: attr.wire_name().to_string(),
                    member: attr.clean_name.clone(),
                    data_type: scalar_type_name(&scalar),
                    scalar,
                    required: attr.is_required(),
                    default,
                }
            })
            .collect::<Vec<_>>();

        let mut children: Vec<ChildPlan> = Vec::new();
        for child_id in &node.children {
            let child = session.tree[*child_id].clone();
            if !matches!(child.kind, NodeKind::Element | NodeKind::Any) {
                continue;
            }
            let plan = self.child(session, &node.name, &child);
            // A name seen twice (repeated choice branches) is one list member.
            if let Some(existing) = children.iter_mut().find(|c| c.member == plan.member) {
                existing.repeated = true;
                continue;
            }
            children.push(plan);
        }

        let simple_content = node.has_simple_content.then(|| simple_content_scalar(session, &node));
        let base_type = node
            .base
            .as_ref()
            .filter(|base| self.type_classes.contains_key(base.as_str()))
            .cloned();

        let mut validators: Vec<(String, BuiltinType)> = Vec::new();
        let scalars = attributes
            .iter()
            .map(|a| &a.scalar)
            .chain(children.iter().filter_map(|c| match &c.value {
                ValueKind::Scalar(s) => Some(s),
                _ => None,
            }))
            .chain(simple_content.iter());
        for scalar in scalars {
            if let Some(name) = &scalar.validator {
                if !validators.iter().any(|(n, _)| n == name) {
                    validators.push((name.clone(), scalar.builtin.clone()));
                }
            }
        }

        ClassPlan {
            type_name: type_name.to_string(),
            class_name: self
                .type_classes
                .get(type_name)
                .cloned()
                .unwrap_or_else(|| clean_name(type_name)),
            superclass: None,
            base_type,
            attributes,
            children,
            simple_content,
            inherits_simple_content: false,
            mixed: node.is_mixed,
            inherits_mixed: false,
            any_attribute: node.any_attribute,
            inherits_any_attribute: false,
            has_subtypes: node.has_subtypes,
            is_abstract: node.is_abstract,
            documentation: node.documentation.trim().to_string(),
            validators,
            inherited_params: Vec::new(),
        }
    }

    fn child(&self, session: &mut Session, owner: &str, child: &SchemaNode) -> ChildPlan {
        let value = self.value_kind(session, child);
        let default = match (&value, child.default_value.as_deref()) {
            (ValueKind::Scalar(scalar), Some(text)) => {
                self.default(session, owner, &child.name, text, scalar)
            }
            _ => None,
        };
        let data_type = match &value {
            ValueKind::Scalar(scalar) => scalar_type_name(scalar),
            ValueKind::Complex(class) => class.clone(),
            ValueKind::Any => "anyType".to_string(),
        };
        let substitutes = if child.kind == NodeKind::Element {
            session
                .substitution_members(&child.name)
                .into_iter()
                .filter_map(|member| {
                    let id = self.top_level.get(&member)?;
                    let node = session.tree[*id].clone();
                    Some(Substitute {
                        value: self.value_kind(session, &node),
                        name: member,
                    })
                })
                .collect()
        } else {
            Vec::new()
        };

        ChildPlan {
            name: child.name.clone(),
            member: child.clean_name.clone(),
            value,
            repeated: child.is_repeated(),
            wildcard: child.kind == NodeKind::Any,
            optional: child.optional || child.in_choice,
            instantiate: false,
            default,
            substitutes,
            data_type,
        }
    }

    fn value_kind(&self, session: &Session, node: &SchemaNode) -> ValueKind {
        match &node.resolved_type {
            ResolvedType::Any => ValueKind::Any,
            ResolvedType::Complex(type_name) => match self.type_classes.get(type_name) {
                Some(class) => ValueKind::Complex(class.clone()),
                None => ValueKind::Any,
            },
            ResolvedType::Simple(builtin) => ValueKind::Scalar(Scalar {
                builtin: builtin.clone(),
                is_list: node.is_list_type || builtin.is_list(),
                collapse_whitespace: node.collapse_whitespace,
                validator: node
                    .simple_base_chain
                    .iter()
                    .find(|name| session.simple_types.contains_key(name.as_str()))
                    .cloned(),
            }),
            ResolvedType::Unresolved => ValueKind::Scalar(Scalar::new(BuiltinType::string())),
        }
    }

    fn default(
        &self,
        session: &mut Session,
        owner: &str,
        member: &str,
        value: &str,
        scalar: &Scalar,
    ) -> Option<String> {
        match render_default(value, scalar) {
            Ok(literal) => Some(literal),
            Err(reason) => {
                session.diagnose(Diagnostic::warning(
                    DiagnosticKind::InvalidDefault,
                    format!("{}.{}", owner, member),
                    format!("{}; kept as a string", reason),
                ));
                Some(super::render::py_string(value))
            }
        }
    }
}

/// Scalar of an attribute declared with `data_type`
fn attribute_scalar(session: &Session, data_type: &str) -> Scalar {
    if let Some(simple) = session.simple_type(data_type) {
        let validator = Some(simple.name.clone());
        let resolution = session.resolve_simple(data_type);
        return Scalar {
            builtin: resolution.builtin,
            is_list: resolution.is_list,
            collapse_whitespace: resolution.collapse_whitespace,
            validator,
        };
    }
    let builtin = BuiltinType::classify(strip_prefix(data_type));
    Scalar {
        is_list: builtin.is_list(),
        ..Scalar::new(builtin)
    }
}

/// Scalar of the text content of a simple-content type
fn simple_content_scalar(session: &Session, node: &SchemaNode) -> Scalar {
    let Some(first) = node.simple_base_chain.first() else {
        return Scalar {
            collapse_whitespace: node.collapse_whitespace,
            ..Scalar::new(BuiltinType::string())
        };
    };
    let mut scalar = attribute_scalar(session, first);
    scalar.collapse_whitespace |= node.collapse_whitespace;
    scalar
}

fn scalar_type_name(scalar: &Scalar) -> String {
    scalar
        .validator
        .clone()
        .unwrap_or_else(|| scalar.builtin.to_string())
}
