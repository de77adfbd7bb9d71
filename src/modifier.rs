//! Modifier definitions.
//!
//! A modifier is a declarative rule carried by an effect: it takes the
//! value of a source attribute on the item carrying the effect and applies
//! it to a target attribute on one or more target items, selected by a
//! target filter. Modifiers are immutable once constructed; all of their
//! dynamics come from which items carry them and which items they resolve
//! to at a given moment.

use crate::ident::{AttrId, GroupId, ModifierId, SkillId};
use serde::{Deserialize, Serialize};

/// Operator applied by a modifier, in application order.
///
/// The derived ordering follows declaration order, which is the order the
/// evaluator applies operators in: assignments first, then the pre
/// multiplication/division pair, the additive pair, and finally the post
/// chain.
///
/// # Examples
///
/// ```rust
/// use fitcalc::Operator;
///
/// assert!(Operator::PreAssign < Operator::ModAdd);
/// assert!(Operator::PostMul.penalizable());
/// assert!(!Operator::PostDiv.penalizable());
/// ```
#[derive(
    Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Operator {
    /// Replace the base value before anything else; last write wins.
    PreAssign,
    /// Multiply before the additive phase.
    PreMul,
    /// Divide before the additive phase.
    PreDiv,
    /// Add the source value.
    ModAdd,
    /// Subtract the source value.
    ModSub,
    /// Multiply after the additive phase.
    PostMul,
    /// Divide after the additive phase.
    PostDiv,
    /// Increase by the source value interpreted as a percentage.
    PostPercent,
    /// Replace the final value; last write wins.
    PostAssign,
}

impl Operator {
    /// Position of this operator in the application order.
    pub fn order(self) -> u8 {
        self as u8
    }

    /// Whether contributions through this operator are subject to the
    /// stacking penalty when the target attribute is not stackable.
    pub fn penalizable(self) -> bool {
        matches!(self, Operator::PostMul | Operator::PostPercent)
    }
}

/// Structural role used to anchor a modifier's target resolution.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub enum Domain {
    /// The item carrying the modifier, or the domain it is the root of.
    Itself,
    /// The character sheet and everything fitted to it.
    Character,
    /// The ship hull and everything fitted to it.
    Ship,
    /// The companion item: a module's loaded charge, or a charge's module.
    Other,
    /// The currently projected target. Resolves to nothing in this engine;
    /// accepted in data for compatibility.
    Target,
}

/// Selects which items a modifier applies to.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub enum TgtFilter {
    /// The single item the domain resolves to.
    Item { domain: Domain },
    /// Every item placed in the domain.
    Domain { domain: Domain },
    /// Items placed in the domain whose template belongs to the group.
    DomainGroup { domain: Domain, group: GroupId },
    /// Items placed in the domain whose template requires the skill.
    DomainSkill { domain: Domain, skill: SkillId },
    /// Owner-modifiable items (drones, charges) requiring the skill.
    OwnerSkill { domain: Domain, skill: SkillId },
}

/// A single attribute modification rule.
///
/// # Examples
///
/// ```rust
/// use fitcalc::{AttrId, Domain, Modifier, ModifierId, Operator, TgtFilter};
///
/// // +N% to an attribute of the ship hull, N taken from the carrier.
/// let modifier = Modifier {
///     id: ModifierId(1),
///     src_attr: AttrId(2),
///     op: Operator::PostPercent,
///     tgt_attr: AttrId(1),
///     filter: TgtFilter::Item { domain: Domain::Ship },
/// };
/// assert_eq!(modifier.tgt_attr, AttrId(1));
/// ```
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifier {
    /// Stable id from the catalog data; also the assignment tie-breaker.
    pub id: ModifierId,
    /// Attribute read on the item carrying the effect.
    pub src_attr: AttrId,
    /// How the source value is applied.
    pub op: Operator,
    /// Attribute written on each target item.
    pub tgt_attr: AttrId,
    /// Which items are targeted.
    pub filter: TgtFilter,
}
