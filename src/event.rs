//! Structural and state-change events.
//!
//! Every mutation of a fit publishes exactly one event. Delivery is
//! synchronous and in publication order: all subscribed services have
//! processed the event before the mutating call returns. There is no
//! deferred or batched delivery.

use crate::ident::ItemId;
use crate::state::State;

/// A structural or state change within a fit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// An item joined the fit. The item is already in the store when the
    /// event is delivered.
    ItemAdded(ItemId),
    /// An item is about to leave the fit. The item is still in the store
    /// while the event is delivered, so services can resolve what it was
    /// affecting.
    ItemRemoved(ItemId),
    /// An item's activation state changed.
    StateChanged { item: ItemId, old: State, new: State },
    /// Activability, force mode or chance outcome changed for one or more
    /// of the item's effects.
    EffectsChanged(ItemId),
    /// The backing catalog was swapped; template identities may have
    /// changed entirely.
    SourceChanged,
}

/// Discriminant of [`Event`], used for subscription bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    ItemAdded,
    ItemRemoved,
    StateChanged,
    EffectsChanged,
    SourceChanged,
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::ItemAdded(_) => EventKind::ItemAdded,
            Event::ItemRemoved(_) => EventKind::ItemRemoved,
            Event::StateChanged { .. } => EventKind::StateChanged,
            Event::EffectsChanged(_) => EventKind::EffectsChanged,
            Event::SourceChanged => EventKind::SourceChanged,
        }
    }
}
