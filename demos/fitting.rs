//! Basic demo: a hull bonus reaching skill-requiring modules, reacting to
//! membership changes.

use fitcalc::*;
use std::sync::Arc;

const DAMAGE: AttrId = AttrId(64);
const HULL_BONUS: AttrId = AttrId(292);

fn main() {
    let mut catalog = StaticCatalog::new();
    catalog.add_attr(AttrDef { id: DAMAGE, stackable: true });
    catalog.add_attr(AttrDef { id: HULL_BONUS, stackable: true });

    // Hull granting +25% damage to turrets requiring skill 3300.
    catalog.add_type(TypeDef {
        id: TypeId(587),
        attrs: [(HULL_BONUS, 25.0)].into(),
        effects: vec![EffectDef {
            id: EffectId(1),
            category: EffectCategory::Passive,
            modifiers: vec![Modifier {
                id: ModifierId(1),
                src_attr: HULL_BONUS,
                op: Operator::PostPercent,
                tgt_attr: DAMAGE,
                filter: TgtFilter::DomainSkill {
                    domain: Domain::Itself,
                    skill: SkillId(3300),
                },
            }],
            chance_attr: None,
        }],
        ..Default::default()
    });
    // A turret requiring the boosted skill, and a weapon that does not.
    catalog.add_type(TypeDef {
        id: TypeId(2873),
        attrs: [(DAMAGE, 46.0)].into(),
        skill_reqs: [(SkillId(3300), 1)].into(),
        ..Default::default()
    });
    catalog.add_type(TypeDef {
        id: TypeId(2881),
        attrs: [(DAMAGE, 46.0)].into(),
        ..Default::default()
    });

    let mut fit = Fit::new(Arc::new(catalog));
    let ship = fit.attach(TypeId(587), Slot::Ship).unwrap();
    let turret = fit.attach(TypeId(2873), Slot::ModuleHigh).unwrap();
    let launcher = fit.attach(TypeId(2881), Slot::ModuleHigh).unwrap();

    println!("boosted turret damage:   {:.1}", fit.value_of(turret, DAMAGE).unwrap());
    println!("unboosted weapon damage: {:.1}", fit.value_of(launcher, DAMAGE).unwrap());

    // Losing the hull takes its bonus with it.
    fit.detach(ship).unwrap();
    println!("turret without the hull: {:.1}", fit.value_of(turret, DAMAGE).unwrap());
}
