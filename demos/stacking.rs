//! Stacking penalty demo: identical speed modules give diminishing
//! returns on a non-stackable attribute.

use fitcalc::*;
use std::sync::Arc;

const VELOCITY: AttrId = AttrId(37);
const SPEED_BOOST: AttrId = AttrId(20);

fn main() {
    let mut catalog = StaticCatalog::new();
    catalog.add_attr(AttrDef { id: VELOCITY, stackable: false });
    catalog.add_attr(AttrDef { id: SPEED_BOOST, stackable: true });
    catalog.add_type(TypeDef {
        id: TypeId(587),
        attrs: [(VELOCITY, 325.0)].into(),
        ..Default::default()
    });
    // +10% velocity while online.
    catalog.add_type(TypeDef {
        id: TypeId(1244),
        attrs: [(SPEED_BOOST, 10.0)].into(),
        effects: vec![EffectDef {
            id: EffectId(1),
            category: EffectCategory::Online,
            modifiers: vec![Modifier {
                id: ModifierId(1),
                src_attr: SPEED_BOOST,
                op: Operator::PostPercent,
                tgt_attr: VELOCITY,
                filter: TgtFilter::Item { domain: Domain::Ship },
            }],
            chance_attr: None,
        }],
        ..Default::default()
    });

    let mut fit = Fit::new(Arc::new(catalog));
    let ship = fit.attach(TypeId(587), Slot::Ship).unwrap();
    println!("bare hull:        {:.2} m/s", fit.value_of(ship, VELOCITY).unwrap());

    // Each additional module is worth less than the one before.
    for n in 1..=3 {
        let module = fit.attach(TypeId(1244), Slot::ModuleLow).unwrap();
        fit.set_state(module, State::Online).unwrap();
        println!(
            "{n} modules online: {:.2} m/s",
            fit.value_of(ship, VELOCITY).unwrap()
        );
    }
}
