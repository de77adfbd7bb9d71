//! Attribute catalog.
//!
//! The engine never owns template data; it consumes it through the
//! [`AttributeCatalog`] trait, treating it as an immutable lookup service.
//! [`StaticCatalog`] is the bundled in-memory implementation, loadable
//! from a JSON dump, used by tests and tooling.

use crate::effect::EffectDef;
use crate::ident::{AttrId, GroupId, SkillId, TypeId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

fn default_stackable() -> bool {
    true
}

/// Metadata of an attribute definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttrDef {
    pub id: AttrId,
    /// When false, penalizable modifier contributions to this attribute
    /// are subject to the stacking penalty.
    #[serde(default = "default_stackable")]
    pub stackable: bool,
}

/// An item template: base attribute values plus declared effects.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeDef {
    pub id: TypeId,
    /// Template group, used by group-filtered modifiers.
    #[serde(default)]
    pub group: Option<GroupId>,
    /// Base attribute values.
    #[serde(default)]
    pub attrs: HashMap<AttrId, f64>,
    /// Effects carried by instances of this template.
    #[serde(default)]
    pub effects: Vec<EffectDef>,
    /// Skill requirements, as skill id to required level.
    #[serde(default)]
    pub skill_reqs: HashMap<SkillId, u32>,
}

/// Read-only lookup of template data.
///
/// All lookups are total: unknown ids yield `None` or an empty slice,
/// never an error. Implementations must be immutable for as long as any
/// fit reads from them; swapping data means swapping the catalog object.
pub trait AttributeCatalog: Send + Sync {
    /// Metadata for an attribute definition.
    fn attr_def(&self, attr: AttrId) -> Option<&AttrDef>;

    /// Base value of an attribute on a template, if the template declares it.
    fn base_attr(&self, type_id: TypeId, attr: AttrId) -> Option<f64>;

    /// Effects declared by a template, in declaration order.
    fn effects(&self, type_id: TypeId) -> &[EffectDef];

    /// Group of a template.
    fn group(&self, type_id: TypeId) -> Option<GroupId>;

    /// Skill requirements of a template.
    fn skill_requirements(&self, type_id: TypeId) -> Option<&HashMap<SkillId, u32>>;

    /// Whether a template requires the given skill.
    fn has_skill_requirement(&self, type_id: TypeId, skill: SkillId) -> bool {
        self.skill_requirements(type_id)
            .is_some_and(|reqs| reqs.contains_key(&skill))
    }
}

/// In-memory catalog backed by hash maps.
///
/// # Examples
///
/// ```rust
/// use fitcalc::{AttrDef, AttrId, AttributeCatalog, StaticCatalog, TypeDef, TypeId};
///
/// let mut catalog = StaticCatalog::new();
/// catalog.add_attr(AttrDef { id: AttrId(1), stackable: true });
/// catalog.add_type(TypeDef {
///     id: TypeId(10),
///     attrs: [(AttrId(1), 100.0)].into(),
///     ..Default::default()
/// });
///
/// assert_eq!(catalog.base_attr(TypeId(10), AttrId(1)), Some(100.0));
/// assert_eq!(catalog.base_attr(TypeId(10), AttrId(2)), None);
/// assert_eq!(catalog.base_attr(TypeId(99), AttrId(1)), None);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaticCatalog {
    #[serde(default)]
    attrs: HashMap<AttrId, AttrDef>,
    #[serde(default)]
    types: HashMap<TypeId, TypeDef>,
}

impl StaticCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a catalog from a JSON dump.
    ///
    /// The dump format mirrors the in-memory layout: a map of attribute
    /// definitions and a map of type definitions, keyed by id.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Register an attribute definition, replacing any previous one.
    pub fn add_attr(&mut self, def: AttrDef) -> &mut Self {
        self.attrs.insert(def.id, def);
        self
    }

    /// Register a type definition, replacing any previous one.
    pub fn add_type(&mut self, def: TypeDef) -> &mut Self {
        self.types.insert(def.id, def);
        self
    }
}

impl AttributeCatalog for StaticCatalog {
    fn attr_def(&self, attr: AttrId) -> Option<&AttrDef> {
        self.attrs.get(&attr)
    }

    fn base_attr(&self, type_id: TypeId, attr: AttrId) -> Option<f64> {
        self.types.get(&type_id)?.attrs.get(&attr).copied()
    }

    fn effects(&self, type_id: TypeId) -> &[EffectDef] {
        self.types
            .get(&type_id)
            .map(|t| t.effects.as_slice())
            .unwrap_or(&[])
    }

    fn group(&self, type_id: TypeId) -> Option<GroupId> {
        self.types.get(&type_id)?.group
    }

    fn skill_requirements(&self, type_id: TypeId) -> Option<&HashMap<SkillId, u32>> {
        Some(&self.types.get(&type_id)?.skill_reqs)
    }
}
