//! Identifier types.
//!
//! All engine entities are keyed by small integer identifiers matching the
//! template data they are loaded from. Each identifier kind gets its own
//! newtype so that an attribute id can never be passed where an effect id
//! is expected.

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, Default, Hash, PartialEq, Eq, PartialOrd, Ord,
            Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl $name {
            /// Raw numeric value of this identifier.
            pub fn value(self) -> u32 {
                self.0
            }
        }

        impl From<u32> for $name {
            fn from(raw: u32) -> Self {
                Self(raw)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id! {
    /// Identifier of an attribute definition.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use fitcalc::AttrId;
    ///
    /// let hp: AttrId = 9u32.into();
    /// assert_eq!(hp, AttrId(9));
    /// assert_eq!(hp.value(), 9);
    /// ```
    AttrId
}

define_id! {
    /// Identifier of an item template in the catalog.
    TypeId
}

define_id! {
    /// Identifier of an item instance within a fit.
    ///
    /// Assigned by the fit when the item is attached; never reused within
    /// the lifetime of that fit.
    ItemId
}

define_id! {
    /// Identifier of an effect definition.
    EffectId
}

define_id! {
    /// Identifier of a modifier within the catalog data.
    ///
    /// Also serves as the deterministic tie-breaker when several
    /// assignment modifiers compete for the same attribute.
    ModifierId
}

define_id! {
    /// Identifier of a template group.
    GroupId
}

define_id! {
    /// Identifier of a skill, as referenced by skill requirements.
    SkillId
}
