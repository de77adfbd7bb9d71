//! Items and their placement.
//!
//! An item is an instance of a template attached to a fit at a slot. It
//! carries the mutable per-instance data the calculator needs: activation
//! state and the per-effect records (activability, force override, chance
//! outcome). Capabilities are plain fields, not behavior inherited from
//! anywhere: the placement record and the effect-state record together
//! describe everything an item can do.

use crate::effect::{EffectDef, EffectMode, RunState};
use crate::ident::{EffectId, ItemId, TypeId};
use crate::modifier::Domain;
use crate::state::State;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Placement of an item inside a fit.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub enum Slot {
    /// The ship hull; root of the ship domain. At most one per fit.
    Ship,
    /// The character sheet; root of the character domain. At most one.
    Character,
    ModuleHigh,
    ModuleMid,
    ModuleLow,
    Rig,
    /// In space, owned by the character.
    Drone,
    Implant,
    Skill,
    /// Loaded into the given module.
    Charge(ItemId),
}

impl Slot {
    /// Domain the occupant belongs to for domain-filtered modifiers.
    ///
    /// Roots and drones belong to no domain: the hull and character sheet
    /// are reached through the item filter, drones through the
    /// owner-modifiable filter.
    pub fn parent_domain(self) -> Option<Domain> {
        match self {
            Slot::ModuleHigh
            | Slot::ModuleMid
            | Slot::ModuleLow
            | Slot::Rig
            | Slot::Charge(_) => Some(Domain::Ship),
            Slot::Implant | Slot::Skill => Some(Domain::Character),
            Slot::Ship | Slot::Character | Slot::Drone => None,
        }
    }

    /// Whether the occupant's attributes belong to the character rather
    /// than the hull, making it a target for owner-skill modifiers.
    pub fn owner_modifiable(self) -> bool {
        matches!(self, Slot::Drone | Slot::Charge(_))
    }

    /// Whether this slot can hold a loaded charge.
    pub fn is_module(self) -> bool {
        matches!(self, Slot::ModuleHigh | Slot::ModuleMid | Slot::ModuleLow)
    }
}

/// Mutable per-(item, effect) record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectState {
    /// Set through the activability toggle; a blocked effect never runs
    /// under full compliance.
    pub blocked: bool,
    /// Force override.
    pub mode: EffectMode,
    /// Outcome of the last activation roll. Chance-based effects start
    /// accepted and only change through an explicit re-roll.
    pub chance_accepted: bool,
}

impl Default for EffectState {
    fn default() -> Self {
        Self {
            blocked: false,
            mode: EffectMode::FullCompliance,
            chance_accepted: true,
        }
    }
}

/// An item instance attached to a fit.
#[derive(Debug, Clone)]
pub struct Item {
    pub id: ItemId,
    pub type_id: TypeId,
    pub slot: Slot,
    pub state: State,
    /// Records for effects whose state has diverged from the default;
    /// untouched effects behave per [`EffectState::default`].
    pub effect_states: HashMap<EffectId, EffectState>,
    /// Charge currently loaded into this module, if any.
    pub charge: Option<ItemId>,
}

impl Item {
    pub fn new(id: ItemId, type_id: TypeId, slot: Slot) -> Self {
        Self {
            id,
            type_id,
            slot,
            state: State::Offline,
            effect_states: HashMap::new(),
            charge: None,
        }
    }

    /// Current record for an effect, defaulted if never touched.
    pub fn effect_state(&self, effect: EffectId) -> EffectState {
        self.effect_states.get(&effect).copied().unwrap_or_default()
    }

    /// Run-state of an effect on this item.
    pub fn effect_run_state(&self, effect: &EffectDef) -> RunState {
        let record = self.effect_state(effect.id);
        match record.mode {
            EffectMode::ForceStop => return RunState::Blocked,
            EffectMode::ForceRun => return RunState::Running,
            EffectMode::FullCompliance => {}
        }
        if record.blocked {
            RunState::Blocked
        } else if self.state < effect.category.required_state() {
            RunState::StateGated
        } else if effect.chance_attr.is_some() && !record.chance_accepted {
            RunState::ChanceRejected
        } else {
            RunState::Running
        }
    }

    /// Whether an effect currently contributes its modifiers.
    pub fn effect_runs(&self, effect: &EffectDef) -> bool {
        self.effect_run_state(effect) == RunState::Running
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::EffectCategory;

    fn effect(category: EffectCategory) -> EffectDef {
        EffectDef {
            id: EffectId(1),
            category,
            modifiers: Vec::new(),
            chance_attr: None,
        }
    }

    #[test]
    fn test_slot_parent_domain() {
        assert_eq!(Slot::ModuleHigh.parent_domain(), Some(Domain::Ship));
        assert_eq!(Slot::Rig.parent_domain(), Some(Domain::Ship));
        assert_eq!(Slot::Charge(ItemId(3)).parent_domain(), Some(Domain::Ship));
        assert_eq!(Slot::Implant.parent_domain(), Some(Domain::Character));
        assert_eq!(Slot::Ship.parent_domain(), None);
        assert_eq!(Slot::Drone.parent_domain(), None);
    }

    #[test]
    fn test_slot_owner_modifiable() {
        assert!(Slot::Drone.owner_modifiable());
        assert!(Slot::Charge(ItemId(3)).owner_modifiable());
        assert!(!Slot::ModuleHigh.owner_modifiable());
        assert!(!Slot::Ship.owner_modifiable());
    }

    #[test]
    fn test_state_gating() {
        let mut item = Item::new(ItemId(1), TypeId(1), Slot::ModuleHigh);
        let active_effect = effect(EffectCategory::Active);

        assert_eq!(item.effect_run_state(&active_effect), RunState::StateGated);
        item.state = State::Online;
        assert_eq!(item.effect_run_state(&active_effect), RunState::StateGated);
        item.state = State::Active;
        assert!(item.effect_runs(&active_effect));
        assert!(item.effect_runs(&effect(EffectCategory::Passive)));
    }

    #[test]
    fn test_blocked_effect() {
        let mut item = Item::new(ItemId(1), TypeId(1), Slot::ModuleHigh);
        let passive = effect(EffectCategory::Passive);
        assert!(item.effect_runs(&passive));

        item.effect_states.insert(
            passive.id,
            EffectState {
                blocked: true,
                ..Default::default()
            },
        );
        assert_eq!(item.effect_run_state(&passive), RunState::Blocked);
    }

    #[test]
    fn test_force_overrides() {
        let mut item = Item::new(ItemId(1), TypeId(1), Slot::ModuleHigh);
        let active_effect = effect(EffectCategory::Active);

        item.effect_states.insert(
            active_effect.id,
            EffectState {
                mode: EffectMode::ForceRun,
                ..Default::default()
            },
        );
        // Forced to run even though the item is offline.
        assert!(item.effect_runs(&active_effect));

        item.state = State::Active;
        item.effect_states.insert(
            active_effect.id,
            EffectState {
                mode: EffectMode::ForceStop,
                ..Default::default()
            },
        );
        assert_eq!(item.effect_run_state(&active_effect), RunState::Blocked);
    }

    #[test]
    fn test_chance_rejection() {
        let mut item = Item::new(ItemId(1), TypeId(1), Slot::ModuleHigh);
        let mut chance_effect = effect(EffectCategory::Passive);
        chance_effect.chance_attr = Some(crate::ident::AttrId(9));

        // Accepted until a roll says otherwise.
        assert!(item.effect_runs(&chance_effect));

        item.effect_states.insert(
            chance_effect.id,
            EffectState {
                chance_accepted: false,
                ..Default::default()
            },
        );
        assert_eq!(
            item.effect_run_state(&chance_effect),
            RunState::ChanceRejected
        );
    }
}
