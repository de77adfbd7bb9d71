//! Affection index.
//!
//! Bidirectional index between modifier carriers and the (item, attribute)
//! pairs they affect. Affectors are stored in buckets keyed by how their
//! filter selects targets, so membership changes never require
//! re-resolution: an item joining a domain immediately matches every
//! domain-bucketed affector, and `affectors_of` always answers from the
//! live composition.

use crate::fit::FitView;
use crate::ident::{AttrId, EffectId, GroupId, ItemId, SkillId};
use crate::modifier::{Domain, Modifier, TgtFilter};
use crate::resolver;
use std::collections::{HashMap, HashSet};

/// A modifier together with the item and effect carrying it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Affector {
    /// Item carrying the effect; source attribute values are read off it.
    pub src: ItemId,
    /// Effect the modifier belongs to; gates whether it contributes.
    pub effect: EffectId,
    pub modifier: Modifier,
}

/// Storage bucket an affector lands in, derived from its target filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Bucket {
    /// Single resolved target known at registration time.
    Direct(ItemId, AttrId),
    /// Whatever item is the root of the domain, now or later.
    Rooted(Domain),
    /// The companion of the source item, keyed by source.
    Other(ItemId),
    Domain(Domain),
    DomainGroup(Domain, GroupId),
    DomainSkill(Domain, SkillId),
    OwnerSkill(SkillId),
}

/// Index of active affectors, bucketed by targeting mode.
#[derive(Debug, Default)]
pub struct AffectionIndex {
    direct: HashMap<(ItemId, AttrId), HashSet<Affector>>,
    rooted: HashMap<Domain, HashSet<Affector>>,
    by_other: HashMap<ItemId, HashSet<Affector>>,
    by_domain: HashMap<Domain, HashSet<Affector>>,
    by_domain_group: HashMap<(Domain, GroupId), HashSet<Affector>>,
    by_domain_skill: HashMap<(Domain, SkillId), HashSet<Affector>>,
    by_owner_skill: HashMap<SkillId, HashSet<Affector>>,
    /// Everything registered, per source item, for teardown and fan-out.
    by_source: HashMap<ItemId, HashSet<Affector>>,
}

impl AffectionIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bucket for an affector, or `None` when the filter cannot match
    /// anything (target-domain filters and malformed combinations; the
    /// latter are logged on the resolution path).
    fn bucket(&self, view: &FitView<'_>, affector: &Affector) -> Option<Bucket> {
        match affector.modifier.filter {
            TgtFilter::Item { domain } => match domain {
                Domain::Itself => Some(Bucket::Direct(
                    affector.src,
                    affector.modifier.tgt_attr,
                )),
                Domain::Ship => Some(Bucket::Rooted(Domain::Ship)),
                Domain::Character => Some(Bucket::Rooted(Domain::Character)),
                Domain::Other => Some(Bucket::Other(affector.src)),
                Domain::Target => None,
            },
            TgtFilter::Domain { domain } => self
                .silent_concrete(view, affector.src, domain)
                .map(Bucket::Domain),
            TgtFilter::DomainGroup { domain, group } => self
                .silent_concrete(view, affector.src, domain)
                .map(|d| Bucket::DomainGroup(d, group)),
            TgtFilter::DomainSkill { domain, skill } => self
                .silent_concrete(view, affector.src, domain)
                .map(|d| Bucket::DomainSkill(d, skill)),
            TgtFilter::OwnerSkill { domain, skill } => match domain {
                Domain::Ship => Some(Bucket::OwnerSkill(skill)),
                _ => None,
            },
        }
    }

    fn silent_concrete(
        &self,
        view: &FitView<'_>,
        src: ItemId,
        domain: Domain,
    ) -> Option<Domain> {
        match domain {
            Domain::Other | Domain::Target => None,
            _ => resolver::concrete_domain(view.item(src)?, domain),
        }
    }

    /// Record an affector. Idempotent for identical affectors.
    pub fn register(&mut self, view: &FitView<'_>, affector: Affector) {
        if let Some(bucket) = self.bucket(view, &affector) {
            match bucket {
                Bucket::Direct(item, attr) => {
                    self.direct.entry((item, attr)).or_default().insert(affector);
                }
                Bucket::Rooted(domain) => {
                    self.rooted.entry(domain).or_default().insert(affector);
                }
                Bucket::Other(src) => {
                    self.by_other.entry(src).or_default().insert(affector);
                }
                Bucket::Domain(domain) => {
                    self.by_domain.entry(domain).or_default().insert(affector);
                }
                Bucket::DomainGroup(domain, group) => {
                    self.by_domain_group
                        .entry((domain, group))
                        .or_default()
                        .insert(affector);
                }
                Bucket::DomainSkill(domain, skill) => {
                    self.by_domain_skill
                        .entry((domain, skill))
                        .or_default()
                        .insert(affector);
                }
                Bucket::OwnerSkill(skill) => {
                    self.by_owner_skill.entry(skill).or_default().insert(affector);
                }
            }
        }
        self.by_source
            .entry(affector.src)
            .or_default()
            .insert(affector);
    }

    /// Exact inverse of [`register`](Self::register).
    pub fn unregister(&mut self, view: &FitView<'_>, affector: &Affector) {
        if let Some(bucket) = self.bucket(view, affector) {
            match bucket {
                Bucket::Direct(item, attr) => {
                    Self::remove_from(&mut self.direct, (item, attr), affector);
                }
                Bucket::Rooted(domain) => {
                    Self::remove_from(&mut self.rooted, domain, affector);
                }
                Bucket::Other(src) => {
                    Self::remove_from(&mut self.by_other, src, affector);
                }
                Bucket::Domain(domain) => {
                    Self::remove_from(&mut self.by_domain, domain, affector);
                }
                Bucket::DomainGroup(domain, group) => {
                    Self::remove_from(&mut self.by_domain_group, (domain, group), affector);
                }
                Bucket::DomainSkill(domain, skill) => {
                    Self::remove_from(&mut self.by_domain_skill, (domain, skill), affector);
                }
                Bucket::OwnerSkill(skill) => {
                    Self::remove_from(&mut self.by_owner_skill, skill, affector);
                }
            }
        }
        if let Some(set) = self.by_source.get_mut(&affector.src) {
            set.remove(affector);
            if set.is_empty() {
                self.by_source.remove(&affector.src);
            }
        }
    }

    fn remove_from<K: std::hash::Hash + Eq>(
        map: &mut HashMap<K, HashSet<Affector>>,
        key: K,
        affector: &Affector,
    ) {
        if let Some(set) = map.get_mut(&key) {
            set.remove(affector);
            if set.is_empty() {
                map.remove(&key);
            }
        }
    }

    /// All affectors currently reaching an (item, attribute) pair.
    ///
    /// Answers from the live composition: the item's placement, template
    /// group and skill requirements are matched against the filtered
    /// buckets at call time. The returned order is unspecified.
    pub fn affectors_of(
        &self,
        view: &FitView<'_>,
        item: ItemId,
        attr: AttrId,
    ) -> Vec<Affector> {
        let mut out: Vec<Affector> = Vec::new();
        if let Some(set) = self.direct.get(&(item, attr)) {
            out.extend(set.iter().copied());
        }
        let Some(it) = view.item(item) else {
            return out;
        };
        let matches_attr = |a: &&Affector| a.modifier.tgt_attr == attr;
        if view.ship == Some(item) {
            if let Some(set) = self.rooted.get(&Domain::Ship) {
                out.extend(set.iter().filter(matches_attr).copied());
            }
        }
        if view.character == Some(item) {
            if let Some(set) = self.rooted.get(&Domain::Character) {
                out.extend(set.iter().filter(matches_attr).copied());
            }
        }
        if let Some(companion) = view.companion_of(item) {
            if let Some(set) = self.by_other.get(&companion) {
                out.extend(set.iter().filter(matches_attr).copied());
            }
        }
        if let Some(domain) = it.slot.parent_domain() {
            if let Some(set) = self.by_domain.get(&domain) {
                out.extend(set.iter().filter(matches_attr).copied());
            }
            if let Some(group) = view.catalog.group(it.type_id) {
                if let Some(set) = self.by_domain_group.get(&(domain, group)) {
                    out.extend(set.iter().filter(matches_attr).copied());
                }
            }
            if let Some(reqs) = view.catalog.skill_requirements(it.type_id) {
                for &skill in reqs.keys() {
                    if let Some(set) = self.by_domain_skill.get(&(domain, skill)) {
                        out.extend(set.iter().filter(matches_attr).copied());
                    }
                }
            }
        }
        if it.slot.owner_modifiable() {
            if let Some(reqs) = view.catalog.skill_requirements(it.type_id) {
                for &skill in reqs.keys() {
                    if let Some(set) = self.by_owner_skill.get(&skill) {
                        out.extend(set.iter().filter(matches_attr).copied());
                    }
                }
            }
        }
        out
    }

    /// All registered affectors carried by a source item.
    pub fn affectors_from(&self, src: ItemId) -> Vec<Affector> {
        self.by_source
            .get(&src)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Every (item, attribute) pair a source item currently contributes
    /// to, resolved against the live composition.
    pub fn affectees_of(&self, view: &FitView<'_>, src: ItemId) -> Vec<(ItemId, AttrId)> {
        let mut out = Vec::new();
        for affector in self.affectors_from(src) {
            for target in resolver::resolve_targets(view, src, &affector.modifier) {
                out.push((target, affector.modifier.tgt_attr));
            }
        }
        out
    }

    /// Drop everything. Used on catalog swaps.
    pub fn clear(&mut self) {
        self.direct.clear();
        self.rooted.clear();
        self.by_other.clear();
        self.by_domain.clear();
        self.by_domain_group.clear();
        self.by_domain_skill.clear();
        self.by_owner_skill.clear();
        self.by_source.clear();
    }

    /// Whether no affector is registered at all.
    pub fn is_empty(&self) -> bool {
        self.by_source.is_empty()
    }
}
