//! Error types.
//!
//! The read path and the mutation path fail differently: attribute reads
//! report why a value is not available, membership operations reject
//! invalid structural changes before any state is touched.

use crate::ident::{AttrId, EffectId, ItemId};
use thiserror::Error;

/// Format a cycle path as a readable string.
fn format_cycle_path(path: &[(ItemId, AttrId)]) -> String {
    if path.is_empty() {
        return String::from("(empty cycle)");
    }
    path.iter()
        .map(|(item, attr)| format!("item {} attr {}", item, attr))
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Errors reported by the attribute read path.
///
/// `NoValue` is not a failure of the engine: it means the attribute is
/// legitimately undefined for that item. Callers must treat it as "no
/// value", distinct from zero.
///
/// # Examples
///
/// ```rust
/// use fitcalc::{AttrId, CalcError, ItemId};
///
/// let err = CalcError::NoValue { item: ItemId(3), attr: AttrId(9) };
/// assert!(err.to_string().contains("attribute 9"));
/// ```
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CalcError {
    /// The attribute has no base value and no assignment modifier supplies
    /// one; the value is undefined for this item.
    #[error("no value defined for attribute {attr} on item {item}")]
    NoValue { item: ItemId, attr: AttrId },

    /// Evaluating the pair required its own value, directly or through a
    /// chain of modifiers. Contains the offending path.
    #[error("dependency cycle: {}", format_cycle_path(.path))]
    Cycle { path: Vec<(ItemId, AttrId)> },

    /// The item is not attached to this fit.
    #[error("item {0} is not attached to this fit")]
    ItemNotFound(ItemId),
}

/// Errors reported by the membership API.
///
/// Every variant is rejected synchronously, before any mutation or event
/// publication happens.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FitError {
    /// The referenced item is not attached to this fit.
    #[error("item {0} is not attached to this fit")]
    ItemNotFound(ItemId),

    /// A single-occupant slot already holds an item.
    #[error("slot is already occupied by item {0}")]
    SlotOccupied(ItemId),

    /// A charge can only be loaded into a module.
    #[error("item {0} cannot hold a charge")]
    InvalidChargeParent(ItemId),

    /// The item's template does not declare this effect.
    #[error("item {item} has no effect {effect}")]
    UnknownEffect { item: ItemId, effect: EffectId },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_value_display() {
        let err = CalcError::NoValue {
            item: ItemId(1),
            attr: AttrId(7),
        };
        assert!(err.to_string().contains("attribute 7"));
        assert!(err.to_string().contains("item 1"));
    }

    #[test]
    fn test_cycle_display() {
        let err = CalcError::Cycle {
            path: vec![
                (ItemId(1), AttrId(10)),
                (ItemId(2), AttrId(20)),
                (ItemId(1), AttrId(10)),
            ],
        };
        let display = err.to_string();
        assert!(display.contains("dependency cycle"));
        assert!(display.contains("item 1 attr 10"));
        assert!(display.contains(" -> "));
    }

    #[test]
    fn test_fit_error_display() {
        let err = FitError::UnknownEffect {
            item: ItemId(4),
            effect: EffectId(8),
        };
        assert!(err.to_string().contains("effect 8"));
    }
}
