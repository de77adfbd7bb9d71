//! Item activation states.
//!
//! Every attached item is in exactly one state from an ordered set. Each
//! state implies the activation level of all states below it, so an item
//! in `Active` also counts as `Online` and `Offline` for the purpose of
//! effect gating. Detached items have no state at all.

use serde::{Deserialize, Serialize};

/// Activation state of an attached item.
///
/// The derived ordering follows declaration order, which is the activation
/// order: `Offline < Online < Active < Overload`.
///
/// # Examples
///
/// ```rust
/// use fitcalc::State;
///
/// assert!(State::Offline < State::Online);
/// assert!(State::Active >= State::Online);
/// assert_eq!(State::Overload.rank(), 3);
/// ```
#[derive(
    Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum State {
    /// Fitted but powered down. Passive effects still apply.
    Offline,
    /// Powered up, but not cycling.
    Online,
    /// Cycling its active effects.
    Active,
    /// Overloaded on top of being active.
    Overload,
}

impl State {
    /// Numeric rank of this state for ordering.
    pub fn rank(self) -> u8 {
        self as u8
    }
}
