//! # fitcalc - Deterministic Fitting Attribute Engine
//!
//! A calculation engine for composite item fittings: items placed into a
//! composition carry effects whose modifiers change attribute values of
//! other items, and the engine maintains correct, lazily computed, cached
//! values as the composition mutates.
//!
//! ## Core Concepts
//!
//! ### Calculation Pipeline
//!
//! ```text
//! [AttributeCatalog] → [AffectionIndex] → [Evaluator] → [ValueCache]
//! ```
//!
//! 1. The **catalog** supplies base values and declared effects
//! 2. The **affection index** tracks which modifiers reach which pairs
//! 3. The **evaluator** folds modifiers in fixed operator order
//! 4. The **cache** memoizes results until an event invalidates them
//!
//! ### Key Features
//!
//! - **Deterministic** evaluation (same composition → same values)
//! - **Event-driven** invalidation: attach, detach, state changes and
//!   catalog swaps clear exactly the values they touch, transitively
//! - **Order-sensitive** operator folding with stacking penalties for
//!   non-stackable attributes
//! - **Cycle detection**: circular modifier chains are reported, never
//!   looped over
//! - **Absence-aware**: an undefined attribute is absent, not zero
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use fitcalc::*;
//!
//! // Template data normally comes from a JSON dump.
//! let mut catalog = StaticCatalog::new();
//! catalog.add_attr(AttrDef { id: AttrId(1), stackable: true });
//! catalog.add_attr(AttrDef { id: AttrId(2), stackable: true });
//! catalog.add_type(TypeDef {
//!     id: TypeId(10),
//!     attrs: [(AttrId(1), 100.0)].into(),
//!     ..Default::default()
//! });
//! catalog.add_type(TypeDef {
//!     id: TypeId(20),
//!     attrs: [(AttrId(2), 20.0)].into(),
//!     effects: vec![EffectDef {
//!         id: EffectId(1),
//!         category: EffectCategory::Passive,
//!         modifiers: vec![Modifier {
//!             id: ModifierId(1),
//!             src_attr: AttrId(2),
//!             op: Operator::PostPercent,
//!             tgt_attr: AttrId(1),
//!             filter: TgtFilter::Item { domain: Domain::Ship },
//!         }],
//!         chance_attr: None,
//!     }],
//!     ..Default::default()
//! });
//!
//! let mut fit = Fit::new(Arc::new(catalog));
//! let ship = fit.attach(TypeId(10), Slot::Ship).unwrap();
//! assert_eq!(fit.value_of(ship, AttrId(1)).unwrap(), 100.0);
//!
//! // Attaching the module applies its +20% bonus; detaching restores
//! // the base value. No manual cache management anywhere.
//! let module = fit.attach(TypeId(20), Slot::ModuleLow).unwrap();
//! assert_eq!(fit.value_of(ship, AttrId(1)).unwrap(), 120.0);
//! fit.detach(module).unwrap();
//! assert_eq!(fit.value_of(ship, AttrId(1)).unwrap(), 100.0);
//! ```
//!
//! ## Modules
//!
//! - [`ident`] - Identifier newtypes
//! - [`state`] - Item activation states
//! - [`catalog`] - Template data access
//! - [`modifier`] - Modifier, operator and filter definitions
//! - [`effect`] - Effects and run-state rules
//! - [`item`] - Items and placement
//! - [`event`] - Structural change events
//! - [`affection`] - Affector index
//! - [`resolver`] - Modifier target resolution
//! - [`cache`] - Computed value cache
//! - [`graph`] - Evaluation dependency graph
//! - [`calc`] - Evaluator and invalidation control
//! - [`fit`] - The composition and its public API
//! - [`error`] - Error types

pub mod affection;
pub mod cache;
pub mod calc;
pub mod catalog;
pub mod effect;
pub mod error;
pub mod event;
pub mod fit;
pub mod graph;
pub mod ident;
pub mod item;
pub mod modifier;
pub mod resolver;
pub mod state;

// Re-export main types for convenience
pub use affection::{AffectionIndex, Affector};
pub use cache::ValueCache;
pub use calc::CalculationService;
pub use catalog::{AttrDef, AttributeCatalog, StaticCatalog, TypeDef};
pub use effect::{EffectCategory, EffectDef, EffectMode, RunState};
pub use error::{CalcError, FitError};
pub use event::{Event, EventKind};
pub use fit::{Fit, FitView};
pub use ident::{AttrId, EffectId, GroupId, ItemId, ModifierId, SkillId, TypeId};
pub use item::{EffectState, Item, Slot};
pub use modifier::{Domain, Modifier, Operator, TgtFilter};
pub use state::State;
