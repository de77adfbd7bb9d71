//! The fit: a composition of items.
//!
//! [`Fit`] owns every item attached to it, the calculation service and
//! the chance-roll source. Its membership methods are the only entry
//! points that mutate calculator state, and each one publishes exactly
//! one event, delivered synchronously before the call returns. There is
//! no ambient global state: everything a computation needs travels
//! through the fit or the view it hands out.

use crate::affection::Affector;
use crate::calc::CalculationService;
use crate::catalog::AttributeCatalog;
use crate::effect::EffectMode;
use crate::error::{CalcError, FitError};
use crate::event::Event;
use crate::ident::{AttrId, EffectId, ItemId, TypeId};
use crate::item::{EffectState, Item, Slot};
use crate::modifier::Domain;
use crate::state::State;
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::sync::Arc;

/// Read-only view over fit contents, handed to services during event
/// delivery and evaluation.
#[derive(Clone, Copy)]
pub struct FitView<'a> {
    pub catalog: &'a dyn AttributeCatalog,
    pub items: &'a HashMap<ItemId, Item>,
    pub ship: Option<ItemId>,
    pub character: Option<ItemId>,
}

impl<'a> FitView<'a> {
    pub fn item(&self, id: ItemId) -> Option<&'a Item> {
        self.items.get(&id)
    }

    pub fn items(&self) -> impl Iterator<Item = &'a Item> + 'a {
        self.items.values()
    }

    /// Items placed in a domain. Roots are not members of their own
    /// domain; they are reached through the item filter.
    pub fn domain_members(&self, domain: Domain) -> impl Iterator<Item = &'a Item> + 'a {
        self.items
            .values()
            .filter(move |it| it.slot.parent_domain() == Some(domain))
    }

    /// The companion item: a module's loaded charge or a charge's module.
    pub fn companion_of(&self, item: ItemId) -> Option<ItemId> {
        let it = self.item(item)?;
        match it.slot {
            Slot::Charge(parent) => Some(parent),
            _ => it.charge,
        }
    }

    /// Whether the given effect currently runs on the given item.
    pub fn effect_running(&self, item: ItemId, effect: EffectId) -> bool {
        let Some(it) = self.item(item) else {
            return false;
        };
        self.catalog
            .effects(it.type_id)
            .iter()
            .find(|e| e.id == effect)
            .is_some_and(|def| it.effect_runs(def))
    }
}

/// A composition of items with calculated attributes.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use fitcalc::*;
///
/// let mut catalog = StaticCatalog::new();
/// catalog.add_attr(AttrDef { id: AttrId(1), stackable: true });
/// catalog.add_type(TypeDef {
///     id: TypeId(10),
///     attrs: [(AttrId(1), 100.0)].into(),
///     ..Default::default()
/// });
///
/// let mut fit = Fit::new(Arc::new(catalog));
/// let ship = fit.attach(TypeId(10), Slot::Ship).unwrap();
///
/// // No modifiers: the computed value is the base value.
/// assert_eq!(fit.value_of(ship, AttrId(1)).unwrap(), 100.0);
///
/// // Undefined attributes are absent, not zero.
/// assert!(matches!(
///     fit.value_of(ship, AttrId(2)),
///     Err(CalcError::NoValue { .. })
/// ));
/// ```
pub struct Fit {
    catalog: Arc<dyn AttributeCatalog>,
    items: HashMap<ItemId, Item>,
    ship: Option<ItemId>,
    character: Option<ItemId>,
    next_item: u32,
    rng: StdRng,
    calc: CalculationService,
}

impl Fit {
    /// Create an empty fit reading from the given catalog.
    pub fn new(catalog: Arc<dyn AttributeCatalog>) -> Self {
        Self::with_rng(catalog, StdRng::from_os_rng())
    }

    /// Create an empty fit with a deterministic chance-roll source.
    pub fn with_seed(catalog: Arc<dyn AttributeCatalog>, seed: u64) -> Self {
        Self::with_rng(catalog, StdRng::seed_from_u64(seed))
    }

    fn with_rng(catalog: Arc<dyn AttributeCatalog>, rng: StdRng) -> Self {
        Self {
            catalog,
            items: HashMap::new(),
            ship: None,
            character: None,
            next_item: 1,
            rng,
            calc: CalculationService::new(),
        }
    }

    fn publish(&mut self, event: Event) {
        let view = FitView {
            catalog: self.catalog.as_ref(),
            items: &self.items,
            ship: self.ship,
            character: self.character,
        };
        self.calc.notify(&view, &event);
    }

    /// Attach a new item at the given slot.
    ///
    /// Structural misuse (occupied hull slot, charge into a non-module)
    /// is rejected before any mutation.
    pub fn attach(&mut self, type_id: TypeId, slot: Slot) -> Result<ItemId, FitError> {
        match slot {
            Slot::Ship => {
                if let Some(existing) = self.ship {
                    return Err(FitError::SlotOccupied(existing));
                }
            }
            Slot::Character => {
                if let Some(existing) = self.character {
                    return Err(FitError::SlotOccupied(existing));
                }
            }
            Slot::Charge(parent) => {
                let Some(parent_item) = self.items.get(&parent) else {
                    return Err(FitError::ItemNotFound(parent));
                };
                if !parent_item.slot.is_module() {
                    return Err(FitError::InvalidChargeParent(parent));
                }
                if let Some(loaded) = parent_item.charge {
                    return Err(FitError::SlotOccupied(loaded));
                }
            }
            _ => {}
        }
        let id = ItemId(self.next_item);
        self.next_item += 1;
        self.items.insert(id, Item::new(id, type_id, slot));
        match slot {
            Slot::Ship => self.ship = Some(id),
            Slot::Character => self.character = Some(id),
            Slot::Charge(parent) => {
                if let Some(module) = self.items.get_mut(&parent) {
                    module.charge = Some(id);
                }
            }
            _ => {}
        }
        self.publish(Event::ItemAdded(id));
        Ok(id)
    }

    /// Detach an item, destroying it. A module takes its loaded charge
    /// with it.
    pub fn detach(&mut self, item: ItemId) -> Result<(), FitError> {
        let Some(it) = self.items.get(&item) else {
            return Err(FitError::ItemNotFound(item));
        };
        let slot = it.slot;
        if let Some(charge) = it.charge {
            self.remove_item(charge);
            if let Some(module) = self.items.get_mut(&item) {
                module.charge = None;
            }
        }
        self.remove_item(item);
        match slot {
            Slot::Ship => self.ship = None,
            Slot::Character => self.character = None,
            Slot::Charge(parent) => {
                if let Some(module) = self.items.get_mut(&parent) {
                    module.charge = None;
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Publish the removal while the item is still resolvable, then drop
    /// it from the store.
    fn remove_item(&mut self, item: ItemId) {
        self.publish(Event::ItemRemoved(item));
        self.items.remove(&item);
    }

    /// Change an item's activation state.
    pub fn set_state(&mut self, item: ItemId, state: State) -> Result<(), FitError> {
        let Some(it) = self.items.get_mut(&item) else {
            return Err(FitError::ItemNotFound(item));
        };
        let old = it.state;
        if old == state {
            return Ok(());
        }
        it.state = state;
        self.publish(Event::StateChanged {
            item,
            old,
            new: state,
        });
        Ok(())
    }

    /// Block or unblock one of the item's effects.
    pub fn set_effect_activability(
        &mut self,
        item: ItemId,
        effect: EffectId,
        activable: bool,
    ) -> Result<(), FitError> {
        self.update_effect_state(item, effect, |record| {
            if record.blocked != !activable {
                record.blocked = !activable;
                true
            } else {
                false
            }
        })
    }

    /// Force-run, force-stop or restore full compliance for an effect.
    pub fn set_effect_mode(
        &mut self,
        item: ItemId,
        effect: EffectId,
        mode: EffectMode,
    ) -> Result<(), FitError> {
        self.update_effect_state(item, effect, |record| {
            if record.mode != mode {
                record.mode = mode;
                true
            } else {
                false
            }
        })
    }

    fn update_effect_state(
        &mut self,
        item: ItemId,
        effect: EffectId,
        update: impl FnOnce(&mut EffectState) -> bool,
    ) -> Result<(), FitError> {
        let type_id = match self.items.get(&item) {
            Some(it) => it.type_id,
            None => return Err(FitError::ItemNotFound(item)),
        };
        if !self.catalog.effects(type_id).iter().any(|e| e.id == effect) {
            return Err(FitError::UnknownEffect { item, effect });
        }
        let Some(it) = self.items.get_mut(&item) else {
            return Err(FitError::ItemNotFound(item));
        };
        let record = it.effect_states.entry(effect).or_default();
        if update(record) {
            self.publish(Event::EffectsChanged(item));
        }
        Ok(())
    }

    /// Re-roll the activation outcome of the item's chance-based effects.
    ///
    /// Outcomes are stable between calls; attribute reads never roll.
    /// The activation probability is the computed value of the effect's
    /// chance attribute on the item itself.
    pub fn randomize_effects(&mut self, item: ItemId) -> Result<(), FitError> {
        if !self.items.contains_key(&item) {
            return Err(FitError::ItemNotFound(item));
        }
        let catalog = Arc::clone(&self.catalog);
        let type_id = match self.items.get(&item) {
            Some(it) => it.type_id,
            None => return Err(FitError::ItemNotFound(item)),
        };
        let chance_effects: Vec<(EffectId, AttrId)> = catalog
            .effects(type_id)
            .iter()
            .filter_map(|e| e.chance_attr.map(|attr| (e.id, attr)))
            .collect();
        let mut changed = false;
        for (effect, chance_attr) in chance_effects {
            let chance = match self.value_of(item, chance_attr) {
                Ok(value) => value,
                Err(_) => {
                    debug!(
                        "chance attribute {} undefined on item {}; effect {} stays accepted",
                        chance_attr, item, effect
                    );
                    continue;
                }
            };
            let accepted = self.rng.random::<f64>() < chance;
            if let Some(it) = self.items.get_mut(&item) {
                let record = it.effect_states.entry(effect).or_default();
                if record.chance_accepted != accepted {
                    record.chance_accepted = accepted;
                    changed = true;
                }
            }
        }
        if changed {
            self.publish(Event::EffectsChanged(item));
        }
        Ok(())
    }

    /// Swap the backing catalog. Template identities may have changed
    /// entirely, so the index and cache are rebuilt from scratch.
    pub fn set_catalog(&mut self, catalog: Arc<dyn AttributeCatalog>) {
        self.catalog = catalog;
        self.publish(Event::SourceChanged);
    }

    /// Computed value of an attribute on an item.
    ///
    /// The only externally visible effect of a read is memoization.
    pub fn value_of(&mut self, item: ItemId, attr: AttrId) -> Result<f64, CalcError> {
        let view = FitView {
            catalog: self.catalog.as_ref(),
            items: &self.items,
            ship: self.ship,
            character: self.character,
        };
        self.calc.value_of(&view, item, attr)
    }

    /// Affectors currently reaching an (item, attribute) pair.
    pub fn affectors_of(&self, item: ItemId, attr: AttrId) -> Vec<Affector> {
        let view = FitView {
            catalog: self.catalog.as_ref(),
            items: &self.items,
            ship: self.ship,
            character: self.character,
        };
        self.calc.affectors_of(&view, item, attr)
    }

    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.items.get(&id)
    }

    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.items.values()
    }

    pub fn ship(&self) -> Option<ItemId> {
        self.ship
    }

    pub fn character(&self) -> Option<ItemId> {
        self.character
    }

    pub fn state_of(&self, item: ItemId) -> Option<State> {
        self.items.get(&item).map(|it| it.state)
    }

    pub fn type_of(&self, item: ItemId) -> Option<TypeId> {
        self.items.get(&item).map(|it| it.type_id)
    }

    /// Read access to the calculation service, mostly for diagnostics.
    pub fn calc(&self) -> &CalculationService {
        &self.calc
    }
}
