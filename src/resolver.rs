//! Modifier target resolution.
//!
//! Given a modifier and the item carrying it, computes the concrete set
//! of items it currently applies to. Resolution always runs against the
//! live composition; filters that depend on composition contents (domain,
//! group, skill requirement) therefore never need a stale snapshot.
//!
//! A malformed or unresolvable filter yields an empty target set and a
//! log entry. It is never an error to the caller: one bad modifier must
//! not take down the rest of its effect.

use crate::fit::FitView;
use crate::ident::{ItemId, SkillId};
use crate::item::{Item, Slot};
use crate::modifier::{Domain, Modifier, TgtFilter};
use log::warn;

/// Concrete domain a filtered modifier's domain enumerator denotes for
/// the given source item.
///
/// `Itself` is only meaningful on domain roots: a hull's "own domain" is
/// the ship, a character sheet's is the character. For any other item the
/// combination is malformed and resolves to `None`.
pub fn concrete_domain(src: &Item, domain: Domain) -> Option<Domain> {
    match domain {
        Domain::Ship => Some(Domain::Ship),
        Domain::Character => Some(Domain::Character),
        Domain::Itself => match src.slot {
            Slot::Ship => Some(Domain::Ship),
            Slot::Character => Some(Domain::Character),
            _ => None,
        },
        Domain::Other | Domain::Target => None,
    }
}

fn filtered_domain(view: &FitView<'_>, src: ItemId, domain: Domain) -> Option<Domain> {
    let item = view.item(src)?;
    match domain {
        // No projection support: target-domain filters match nothing.
        Domain::Target => None,
        Domain::Other => {
            warn!(
                "modifier on item {} uses a domain filter with the Other domain; \
                 skipping",
                src
            );
            None
        }
        _ => {
            let concrete = concrete_domain(item, domain);
            if concrete.is_none() {
                warn!(
                    "modifier on item {} uses the Itself domain but the item is \
                     not a domain root; skipping",
                    src
                );
            }
            concrete
        }
    }
}

fn owner_modifiable_targets(view: &FitView<'_>, skill: SkillId) -> Vec<ItemId> {
    view.items()
        .filter(|it| it.slot.owner_modifiable())
        .filter(|it| view.catalog.has_skill_requirement(it.type_id, skill))
        .map(|it| it.id)
        .collect()
}

/// Resolve the items a modifier carried by `src` currently applies to.
pub fn resolve_targets(view: &FitView<'_>, src: ItemId, modifier: &Modifier) -> Vec<ItemId> {
    match modifier.filter {
        TgtFilter::Item { domain } => match domain {
            Domain::Itself => vec![src],
            Domain::Ship => view.ship.into_iter().collect(),
            Domain::Character => view.character.into_iter().collect(),
            Domain::Other => view.companion_of(src).into_iter().collect(),
            Domain::Target => Vec::new(),
        },
        TgtFilter::Domain { domain } => match filtered_domain(view, src, domain) {
            Some(concrete) => view.domain_members(concrete).map(|it| it.id).collect(),
            None => Vec::new(),
        },
        TgtFilter::DomainGroup { domain, group } => {
            match filtered_domain(view, src, domain) {
                Some(concrete) => view
                    .domain_members(concrete)
                    .filter(|it| view.catalog.group(it.type_id) == Some(group))
                    .map(|it| it.id)
                    .collect(),
                None => Vec::new(),
            }
        }
        TgtFilter::DomainSkill { domain, skill } => {
            match filtered_domain(view, src, domain) {
                Some(concrete) => view
                    .domain_members(concrete)
                    .filter(|it| view.catalog.has_skill_requirement(it.type_id, skill))
                    .map(|it| it.id)
                    .collect(),
                None => Vec::new(),
            }
        }
        TgtFilter::OwnerSkill { domain, skill } => match domain {
            Domain::Ship => owner_modifiable_targets(view, skill),
            Domain::Target => Vec::new(),
            _ => {
                warn!(
                    "owner-skill modifier on item {} uses domain {:?}; only ship \
                     and target are valid, skipping",
                    src, domain
                );
                Vec::new()
            }
        },
    }
}
