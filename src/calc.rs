//! Attribute evaluation and invalidation control.
//!
//! [`CalculationService`] is the single subscriber to fit events. It owns
//! the affection index, the value cache and the dependency graph, keeps
//! the set of registered (item, effect) pairs in sync with the running
//! effects of the composition, and computes attribute values on demand.
//!
//! Evaluation follows a fixed operator order: pre-assign, pre-multiply,
//! pre-divide, additive, subtractive, post-multiply, post-divide,
//! post-percent, post-assign. Assignments are last-write-wins over a
//! deterministic ordering by (modifier id, source item id). Penalizable
//! contributions to non-stackable attributes pass through the stacking
//! penalty before being folded in.

use crate::affection::{AffectionIndex, Affector};
use crate::cache::ValueCache;
use crate::effect::EffectDef;
use crate::error::CalcError;
use crate::event::Event;
use crate::fit::FitView;
use crate::graph::{AttrNode, DependencyGraph};
use crate::ident::{AttrId, EffectId, ItemId};
use crate::modifier::Operator;
use crate::resolver;
use log::{debug, warn};
use std::collections::HashSet;

/// Denominator of the stacking penalty exponent: the n-th largest
/// contribution is attenuated by `exp(-(n / 2.67)^2)`.
const PENALTY_BASE: f64 = 2.67;

/// Fold a chain of penalized multipliers into a single multiplier.
///
/// Bonuses (multiplier above 1) and penalties (below 1) are ranked
/// independently, strongest deviation from neutral first; the multiplier
/// at rank `n` keeps only `exp(-(n / 2.67)^2)` of its deviation. Rank 0
/// is unattenuated, so a chain of one is applied in full.
///
/// # Examples
///
/// ```rust
/// use fitcalc::calc::stacked_product;
///
/// // A single +35% multiplier passes through unchanged.
/// assert!((stacked_product(&[1.35]) - 1.35).abs() < 1e-12);
///
/// // Three +10% multipliers are worth less than (1.1)^3.
/// let stacked = stacked_product(&[1.1, 1.1, 1.1]);
/// assert!(stacked < 1.1f64.powi(3));
/// assert!(stacked > 1.1);
/// ```
pub fn stacked_product(multipliers: &[f64]) -> f64 {
    let mut bonuses: Vec<f64> = Vec::new();
    let mut penalties: Vec<f64> = Vec::new();
    for &m in multipliers {
        if m > 1.0 {
            bonuses.push(m);
        } else if m < 1.0 {
            penalties.push(m);
        }
    }
    bonuses.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
    penalties.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mut product = 1.0;
    for chain in [&bonuses, &penalties] {
        for (rank, &m) in chain.iter().enumerate() {
            let attenuation = (-((rank as f64 / PENALTY_BASE).powi(2))).exp();
            product *= 1.0 + (m - 1.0) * attenuation;
        }
    }
    product
}

/// Event-driven owner of the affection index, value cache and dependency
/// graph for one fit.
#[derive(Debug, Default)]
pub struct CalculationService {
    index: AffectionIndex,
    cache: ValueCache,
    deps: DependencyGraph,
    /// (item, effect) pairs whose modifiers are currently registered.
    active: HashSet<(ItemId, EffectId)>,
}

impl CalculationService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read access to the affection index.
    pub fn index(&self) -> &AffectionIndex {
        &self.index
    }

    /// Read access to the value cache.
    pub fn cache(&self) -> &ValueCache {
        &self.cache
    }

    /// Synchronous event handler; called by the fit during publication.
    pub fn notify(&mut self, view: &FitView<'_>, event: &Event) {
        match event {
            Event::ItemAdded(item) => self.sync_item_effects(view, *item),
            Event::ItemRemoved(item) => self.handle_removal(view, *item),
            Event::StateChanged { item, .. } => self.sync_item_effects(view, *item),
            Event::EffectsChanged(item) => self.sync_item_effects(view, *item),
            Event::SourceChanged => self.rebuild(view),
        }
    }

    /// Diff the item's running-effect set against what is registered and
    /// apply the delta, invalidating every pair touched either way.
    fn sync_item_effects(&mut self, view: &FitView<'_>, item: ItemId) {
        let Some(it) = view.item(item) else { return };
        let effects = view.catalog.effects(it.type_id);
        let running: Vec<EffectId> = effects
            .iter()
            .filter(|e| it.effect_runs(e))
            .map(|e| e.id)
            .collect();
        let registered: Vec<EffectId> = self
            .active
            .iter()
            .filter(|(i, _)| *i == item)
            .map(|(_, e)| *e)
            .collect();
        for effect in registered {
            if !running.contains(&effect) {
                self.unregister_effect(view, item, effect);
            }
        }
        for effect in effects {
            if running.contains(&effect.id) && !self.active.contains(&(item, effect.id)) {
                self.register_effect(view, item, effect);
            }
        }
    }

    fn register_effect(&mut self, view: &FitView<'_>, item: ItemId, effect: &EffectDef) {
        for modifier in &effect.modifiers {
            let affector = Affector {
                src: item,
                effect: effect.id,
                modifier: *modifier,
            };
            self.index.register(view, affector);
            for target in resolver::resolve_targets(view, item, modifier) {
                self.invalidate(target, modifier.tgt_attr);
            }
        }
        self.active.insert((item, effect.id));
    }

    fn unregister_effect(&mut self, view: &FitView<'_>, item: ItemId, effect: EffectId) {
        let affectors: Vec<Affector> = self
            .index
            .affectors_from(item)
            .into_iter()
            .filter(|a| a.effect == effect)
            .collect();
        for affector in affectors {
            self.index.unregister(view, &affector);
            for target in resolver::resolve_targets(view, item, &affector.modifier) {
                self.invalidate(target, affector.modifier.tgt_attr);
            }
        }
        self.active.remove(&(item, effect));
    }

    /// Contributed modifiers are unregistered before anything else, while
    /// the item is still resolvable, then its own cached values go.
    fn handle_removal(&mut self, view: &FitView<'_>, item: ItemId) {
        let registered: Vec<EffectId> = self
            .active
            .iter()
            .filter(|(i, _)| *i == item)
            .map(|(_, e)| *e)
            .collect();
        for effect in registered {
            self.unregister_effect(view, item, effect);
        }
        for attr in self.cache.cached_attrs(item) {
            self.invalidate(item, attr);
        }
    }

    /// Full rebuild after a catalog swap.
    fn rebuild(&mut self, view: &FitView<'_>) {
        self.index.clear();
        self.cache.clear();
        self.deps.clear();
        self.active.clear();
        let items: Vec<ItemId> = view.items().map(|it| it.id).collect();
        for item in items {
            self.sync_item_effects(view, item);
        }
    }

    /// Drop a pair and everything that was computed from it.
    fn invalidate(&mut self, item: ItemId, attr: AttrId) {
        self.cache.invalidate(item, attr);
        for (dep_item, dep_attr) in self.deps.take_dependents((item, attr)) {
            self.cache.invalidate(dep_item, dep_attr);
        }
    }

    /// Affectors of a pair, in deterministic evaluation order.
    pub fn affectors_of(
        &self,
        view: &FitView<'_>,
        item: ItemId,
        attr: AttrId,
    ) -> Vec<Affector> {
        let mut affectors = self.index.affectors_of(view, item, attr);
        affectors.sort_by_key(|a| (a.modifier.id, a.src));
        affectors
    }

    /// Computed value of an attribute on an item.
    pub fn value_of(
        &mut self,
        view: &FitView<'_>,
        item: ItemId,
        attr: AttrId,
    ) -> Result<f64, CalcError> {
        if view.item(item).is_none() {
            return Err(CalcError::ItemNotFound(item));
        }
        let mut stack = Vec::new();
        match self.evaluate(view, item, attr, &mut stack)? {
            Some(value) => Ok(value),
            None => Err(CalcError::NoValue { item, attr }),
        }
    }

    /// Memoized evaluation with cycle detection over the call stack.
    fn evaluate(
        &mut self,
        view: &FitView<'_>,
        item: ItemId,
        attr: AttrId,
        stack: &mut Vec<AttrNode>,
    ) -> Result<Option<f64>, CalcError> {
        if let Some(value) = self.cache.get(item, attr) {
            return Ok(Some(value));
        }
        let node = (item, attr);
        if let Some(position) = stack.iter().position(|n| *n == node) {
            let mut path = stack[position..].to_vec();
            path.push(node);
            warn!(
                "dependency cycle while evaluating attribute {} on item {}",
                attr, item
            );
            return Err(CalcError::Cycle { path });
        }
        stack.push(node);
        let result = self.evaluate_uncached(view, item, attr, stack);
        stack.pop();
        if let Ok(Some(value)) = &result {
            self.cache.set(item, attr, *value);
        }
        result
    }

    fn evaluate_uncached(
        &mut self,
        view: &FitView<'_>,
        item: ItemId,
        attr: AttrId,
        stack: &mut Vec<AttrNode>,
    ) -> Result<Option<f64>, CalcError> {
        let Some(it) = view.item(item) else {
            return Ok(None);
        };
        let base = view.catalog.base_attr(it.type_id, attr);
        let stackable = view
            .catalog
            .attr_def(attr)
            .map_or(true, |def| def.stackable);

        let mut affectors = self.index.affectors_of(view, item, attr);
        affectors.retain(|a| view.effect_running(a.src, a.effect));
        affectors.sort_by_key(|a| (a.modifier.id, a.src));

        let mut pre_assign: Option<f64> = None;
        let mut pre_mul: Vec<f64> = Vec::new();
        let mut pre_div: Vec<f64> = Vec::new();
        let mut add_sum = 0.0;
        let mut sub_sum = 0.0;
        let mut post_mul_plain: Vec<f64> = Vec::new();
        let mut post_mul_penalized: Vec<f64> = Vec::new();
        let mut post_div: Vec<f64> = Vec::new();
        let mut post_percent_plain: Vec<f64> = Vec::new();
        let mut post_percent_penalized: Vec<f64> = Vec::new();
        let mut post_assign: Option<f64> = None;

        for affector in &affectors {
            let source = (affector.src, affector.modifier.src_attr);
            let operand = self.evaluate(view, source.0, source.1, stack)?;
            // The edge is recorded even for absent sources: the pair must
            // be recomputed should the source gain a value later.
            self.deps.record_read(source, (item, attr));
            let Some(operand) = operand else {
                debug!(
                    "modifier {} on item {}: source attribute {} undefined, skipped",
                    affector.modifier.id, affector.src, affector.modifier.src_attr
                );
                continue;
            };
            let penalized = affector.modifier.op.penalizable() && !stackable;
            match affector.modifier.op {
                Operator::PreAssign => pre_assign = Some(operand),
                Operator::PreMul => pre_mul.push(operand),
                Operator::PreDiv => pre_div.push(operand),
                Operator::ModAdd => add_sum += operand,
                Operator::ModSub => sub_sum += operand,
                Operator::PostMul => {
                    if penalized {
                        post_mul_penalized.push(operand);
                    } else {
                        post_mul_plain.push(operand);
                    }
                }
                Operator::PostDiv => post_div.push(operand),
                Operator::PostPercent => {
                    let multiplier = 1.0 + operand / 100.0;
                    if penalized {
                        post_percent_penalized.push(multiplier);
                    } else {
                        post_percent_plain.push(multiplier);
                    }
                }
                Operator::PostAssign => post_assign = Some(operand),
            }
        }

        let mut value = pre_assign.or(base);
        if let Some(v) = value.as_mut() {
            for m in &pre_mul {
                *v *= m;
            }
            for d in &pre_div {
                *v /= d;
            }
            *v += add_sum;
            *v -= sub_sum;
            for m in &post_mul_plain {
                *v *= m;
            }
            *v *= stacked_product(&post_mul_penalized);
            for d in &post_div {
                *v /= d;
            }
            for m in &post_percent_plain {
                *v *= m;
            }
            *v *= stacked_product(&post_percent_penalized);
        }
        if let Some(assigned) = post_assign {
            value = Some(assigned);
        }
        Ok(value)
    }
}
