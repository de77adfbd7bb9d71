//! Effect definitions and run-state rules.
//!
//! An effect is a named bundle of modifiers with an activation category.
//! Whether an effect is actually running on a given item depends on the
//! item's state, the per-item activability toggle, an optional chance
//! roll, and an optional force override. Only running effects contribute
//! modifiers.

use crate::ident::{AttrId, EffectId};
use crate::modifier::Modifier;
use crate::state::State;
use serde::{Deserialize, Serialize};

/// Activation category of an effect.
///
/// The category determines the minimum item state required for the effect
/// to run under full compliance.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectCategory {
    /// Always running while the item is fitted.
    Passive,
    /// Requires the item to be powered up.
    Online,
    /// Requires the item to be cycling.
    Active,
    /// Applied to a projected target; requires the item to be cycling.
    Target,
    /// Requires the item to be overloaded.
    Overload,
    /// System-wide environment effect; runs while fitted.
    System,
}

impl EffectCategory {
    /// Minimum item state at which effects of this category run.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use fitcalc::{EffectCategory, State};
    ///
    /// assert_eq!(EffectCategory::Passive.required_state(), State::Offline);
    /// assert_eq!(EffectCategory::Active.required_state(), State::Active);
    /// ```
    pub fn required_state(self) -> State {
        match self {
            EffectCategory::Passive | EffectCategory::System => State::Offline,
            EffectCategory::Online => State::Online,
            EffectCategory::Active | EffectCategory::Target => State::Active,
            EffectCategory::Overload => State::Overload,
        }
    }
}

/// An effect as declared by an item template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectDef {
    pub id: EffectId,
    pub category: EffectCategory,
    /// Modifiers applied while the effect runs.
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
    /// Attribute whose computed value on the carrying item is the
    /// activation probability. `None` for unconditional effects.
    #[serde(default)]
    pub chance_attr: Option<AttrId>,
}

/// Per-item override of an effect's run decision.
#[derive(Debug, Clone, Copy, Default, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectMode {
    /// Run iff unblocked, state-permitted and chance-accepted.
    #[default]
    FullCompliance,
    /// Run regardless of state, activability and chance.
    ForceRun,
    /// Never run.
    ForceStop,
}

/// Why an effect is or is not running on an item.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum RunState {
    /// Blocked via the activability toggle or force-stopped.
    Blocked,
    /// Item state is below the category's required state.
    StateGated,
    /// The last activation roll failed.
    ChanceRejected,
    /// Contributing modifiers.
    Running,
}
