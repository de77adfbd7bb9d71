use fitcalc::*;
use std::sync::Arc;

const TGT: AttrId = AttrId(1);
const SRC: AttrId = AttrId(2);

fn modifier(id: u32, op: Operator, filter: TgtFilter) -> Modifier {
    Modifier {
        id: ModifierId(id),
        src_attr: SRC,
        op,
        tgt_attr: TGT,
        filter,
    }
}

fn passive_effect(id: u32, modifiers: Vec<Modifier>) -> EffectDef {
    EffectDef {
        id: EffectId(id),
        category: EffectCategory::Passive,
        modifiers,
        chance_attr: None,
    }
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

fn attenuation(rank: u32) -> f64 {
    (-((rank as f64 / 2.67).powi(2))).exp()
}

/// With no modifiers attached, the computed value is the base value, and
/// an attribute the template does not declare is absent.
#[test]
fn test_unmodified_value_is_base() {
    let mut catalog = StaticCatalog::new();
    catalog.add_attr(AttrDef { id: TGT, stackable: true });
    catalog.add_type(TypeDef {
        id: TypeId(10),
        attrs: [(TGT, 100.0)].into(),
        ..Default::default()
    });

    let mut fit = Fit::with_seed(Arc::new(catalog), 0);
    let ship = fit.attach(TypeId(10), Slot::Ship).unwrap();

    assert_eq!(fit.value_of(ship, TGT).unwrap(), 100.0);
    assert_eq!(
        fit.value_of(ship, AttrId(99)),
        Err(CalcError::NoValue { item: ship, attr: AttrId(99) })
    );
}

/// All operators interacting on one attribute, in fixed application
/// order. One contribution per operator, so nothing is penalized even
/// though the attribute is not stackable.
#[test]
fn test_operator_ordering_all_in() {
    let mut catalog = StaticCatalog::new();
    catalog.add_attr(AttrDef { id: TGT, stackable: false });
    catalog.add_attr(AttrDef { id: SRC, stackable: true });
    catalog.add_type(TypeDef {
        id: TypeId(10),
        attrs: [(TGT, 100.0)].into(),
        ..Default::default()
    });

    let contributions = [
        (Operator::PreAssign, 5.0),
        (Operator::PreMul, 50.0),
        (Operator::PreDiv, 0.5),
        (Operator::ModAdd, 10.0),
        (Operator::ModSub, 63.0),
        (Operator::PostMul, 1.35),
        (Operator::PostDiv, 2.7),
        (Operator::PostPercent, 15.0),
    ];
    for (index, (op, value)) in contributions.iter().enumerate() {
        let id = index as u32 + 1;
        catalog.add_type(TypeDef {
            id: TypeId(200 + id),
            attrs: [(SRC, *value)].into(),
            effects: vec![passive_effect(
                id,
                vec![modifier(id, *op, TgtFilter::Domain { domain: Domain::Ship })],
            )],
            ..Default::default()
        });
    }

    let mut fit = Fit::with_seed(Arc::new(catalog), 0);
    let rig = fit.attach(TypeId(10), Slot::Rig).unwrap();
    for id in 1..=contributions.len() as u32 {
        fit.attach(TypeId(200 + id), Slot::Implant).unwrap();
    }

    let expected = ((5.0 * 50.0 / 0.5 + 10.0 - 63.0) * 1.35 / 2.7) * (1.0 + 15.0 / 100.0);
    assert_close(fit.value_of(rig, TGT).unwrap(), expected);
}

/// Three identical percentage bonuses on a non-stackable attribute are
/// penalized at ranks 0, 1 and 2, combining multiplicatively.
#[test]
fn test_stacking_penalty_three_percent() {
    let mut catalog = StaticCatalog::new();
    catalog.add_attr(AttrDef { id: TGT, stackable: false });
    catalog.add_type(TypeDef {
        id: TypeId(10),
        attrs: [(TGT, 100.0)].into(),
        ..Default::default()
    });
    for id in 1..=3u32 {
        catalog.add_type(TypeDef {
            id: TypeId(200 + id),
            attrs: [(SRC, 10.0)].into(),
            effects: vec![passive_effect(
                id,
                vec![modifier(
                    id,
                    Operator::PostPercent,
                    TgtFilter::Domain { domain: Domain::Ship },
                )],
            )],
            ..Default::default()
        });
    }

    let mut fit = Fit::with_seed(Arc::new(catalog), 0);
    let module = fit.attach(TypeId(10), Slot::ModuleLow).unwrap();
    for id in 1..=3u32 {
        fit.attach(TypeId(200 + id), Slot::Implant).unwrap();
    }

    let expected = 100.0
        * 1.1
        * (1.0 + 0.1 * attenuation(1))
        * (1.0 + 0.1 * attenuation(2));
    assert_close(fit.value_of(module, TGT).unwrap(), expected);
}

/// The same three bonuses on a stackable attribute combine in full.
#[test]
fn test_stackable_attribute_not_penalized() {
    let mut catalog = StaticCatalog::new();
    catalog.add_attr(AttrDef { id: TGT, stackable: true });
    catalog.add_type(TypeDef {
        id: TypeId(10),
        attrs: [(TGT, 100.0)].into(),
        ..Default::default()
    });
    for id in 1..=3u32 {
        catalog.add_type(TypeDef {
            id: TypeId(200 + id),
            attrs: [(SRC, 10.0)].into(),
            effects: vec![passive_effect(
                id,
                vec![modifier(
                    id,
                    Operator::PostPercent,
                    TgtFilter::Domain { domain: Domain::Ship },
                )],
            )],
            ..Default::default()
        });
    }

    let mut fit = Fit::with_seed(Arc::new(catalog), 0);
    let module = fit.attach(TypeId(10), Slot::ModuleLow).unwrap();
    for id in 1..=3u32 {
        fit.attach(TypeId(200 + id), Slot::Implant).unwrap();
    }

    assert_close(fit.value_of(module, TGT).unwrap(), 100.0 * 1.1 * 1.1 * 1.1);
}

/// Penalty chains are ranked per operator: a lone post-multiplier and a
/// lone percentage bonus are both rank 0 and pass through unattenuated.
#[test]
fn test_penalty_chains_per_operator() {
    let mut catalog = StaticCatalog::new();
    catalog.add_attr(AttrDef { id: TGT, stackable: false });
    catalog.add_type(TypeDef {
        id: TypeId(10),
        attrs: [(TGT, 100.0)].into(),
        ..Default::default()
    });
    catalog.add_type(TypeDef {
        id: TypeId(201),
        attrs: [(SRC, 1.35)].into(),
        effects: vec![passive_effect(
            1,
            vec![modifier(1, Operator::PostMul, TgtFilter::Domain { domain: Domain::Ship })],
        )],
        ..Default::default()
    });
    catalog.add_type(TypeDef {
        id: TypeId(202),
        attrs: [(SRC, 15.0)].into(),
        effects: vec![passive_effect(
            2,
            vec![modifier(
                2,
                Operator::PostPercent,
                TgtFilter::Domain { domain: Domain::Ship },
            )],
        )],
        ..Default::default()
    });

    let mut fit = Fit::with_seed(Arc::new(catalog), 0);
    let module = fit.attach(TypeId(10), Slot::ModuleLow).unwrap();
    fit.attach(TypeId(201), Slot::Implant).unwrap();
    fit.attach(TypeId(202), Slot::Implant).unwrap();

    assert_close(fit.value_of(module, TGT).unwrap(), 100.0 * 1.35 * 1.15);
}

/// An item modifying its own attribute through the self filter.
#[test]
fn test_item_filter_self() {
    let mut catalog = StaticCatalog::new();
    catalog.add_type(TypeDef {
        id: TypeId(10),
        attrs: [(TGT, 100.0), (SRC, 10.0)].into(),
        effects: vec![passive_effect(
            1,
            vec![modifier(1, Operator::ModAdd, TgtFilter::Item { domain: Domain::Itself })],
        )],
        ..Default::default()
    });

    let mut fit = Fit::with_seed(Arc::new(catalog), 0);
    let module = fit.attach(TypeId(10), Slot::ModuleHigh).unwrap();
    assert_close(fit.value_of(module, TGT).unwrap(), 110.0);
}

/// Group-filtered modifiers only reach members of the filtered group.
#[test]
fn test_domain_group_filter() {
    let mut catalog = StaticCatalog::new();
    catalog.add_type(TypeDef {
        id: TypeId(201),
        attrs: [(SRC, 50.0)].into(),
        effects: vec![passive_effect(
            1,
            vec![modifier(
                1,
                Operator::PostPercent,
                TgtFilter::DomainGroup { domain: Domain::Ship, group: GroupId(7) },
            )],
        )],
        ..Default::default()
    });
    catalog.add_type(TypeDef {
        id: TypeId(10),
        group: Some(GroupId(7)),
        attrs: [(TGT, 100.0)].into(),
        ..Default::default()
    });
    catalog.add_type(TypeDef {
        id: TypeId(11),
        group: Some(GroupId(8)),
        attrs: [(TGT, 100.0)].into(),
        ..Default::default()
    });

    let mut fit = Fit::with_seed(Arc::new(catalog), 0);
    let in_group = fit.attach(TypeId(10), Slot::ModuleLow).unwrap();
    let out_of_group = fit.attach(TypeId(11), Slot::ModuleLow).unwrap();
    fit.attach(TypeId(201), Slot::Implant).unwrap();

    assert_close(fit.value_of(in_group, TGT).unwrap(), 150.0);
    assert_close(fit.value_of(out_of_group, TGT).unwrap(), 100.0);
}

/// Skill-requirement-filtered modifiers reach items requiring the skill
/// in the filtered domain, and nothing else.
#[test]
fn test_domain_skill_filter() {
    let mut catalog = StaticCatalog::new();
    catalog.add_type(TypeDef {
        id: TypeId(201),
        attrs: [(SRC, 20.0)].into(),
        effects: vec![passive_effect(
            1,
            vec![modifier(
                1,
                Operator::PostPercent,
                TgtFilter::DomainSkill { domain: Domain::Ship, skill: SkillId(56) },
            )],
        )],
        ..Default::default()
    });
    catalog.add_type(TypeDef {
        id: TypeId(10),
        attrs: [(TGT, 100.0)].into(),
        skill_reqs: [(SkillId(56), 1)].into(),
        ..Default::default()
    });
    catalog.add_type(TypeDef {
        id: TypeId(11),
        attrs: [(TGT, 100.0)].into(),
        skill_reqs: [(SkillId(87), 1)].into(),
        ..Default::default()
    });

    let mut fit = Fit::with_seed(Arc::new(catalog), 0);
    let with_skill = fit.attach(TypeId(10), Slot::ModuleLow).unwrap();
    let other_skill = fit.attach(TypeId(11), Slot::ModuleLow).unwrap();
    // Same template outside the ship domain.
    let drone = fit.attach(TypeId(10), Slot::Drone).unwrap();
    let implant = fit.attach(TypeId(201), Slot::Implant).unwrap();

    assert_close(fit.value_of(with_skill, TGT).unwrap(), 120.0);
    assert_close(fit.value_of(other_skill, TGT).unwrap(), 100.0);
    assert_close(fit.value_of(drone, TGT).unwrap(), 100.0);

    // Removing the source restores the filtered target exactly.
    fit.detach(implant).unwrap();
    assert_eq!(fit.value_of(with_skill, TGT).unwrap(), 100.0);
}

/// Owner-skill modifiers reach owner-modifiable items only.
#[test]
fn test_owner_skill_filter() {
    let mut catalog = StaticCatalog::new();
    catalog.add_type(TypeDef {
        id: TypeId(201),
        attrs: [(SRC, 25.0)].into(),
        effects: vec![passive_effect(
            1,
            vec![modifier(
                1,
                Operator::PostPercent,
                TgtFilter::OwnerSkill { domain: Domain::Ship, skill: SkillId(56) },
            )],
        )],
        ..Default::default()
    });
    catalog.add_type(TypeDef {
        id: TypeId(10),
        attrs: [(TGT, 100.0)].into(),
        skill_reqs: [(SkillId(56), 1)].into(),
        ..Default::default()
    });

    let mut fit = Fit::with_seed(Arc::new(catalog), 0);
    let drone = fit.attach(TypeId(10), Slot::Drone).unwrap();
    // Same template, but fitted as a module: not owner-modifiable.
    let module = fit.attach(TypeId(10), Slot::ModuleHigh).unwrap();
    fit.attach(TypeId(201), Slot::Skill).unwrap();

    assert_close(fit.value_of(drone, TGT).unwrap(), 125.0);
    assert_close(fit.value_of(module, TGT).unwrap(), 100.0);
}

/// Detaching an influence source clears its affection entries and
/// restores the pre-attachment value exactly; re-attaching reproduces
/// the modified value exactly.
#[test]
fn test_detach_round_trip() {
    let mut catalog = StaticCatalog::new();
    catalog.add_type(TypeDef {
        id: TypeId(10),
        attrs: [(TGT, 100.0)].into(),
        ..Default::default()
    });
    catalog.add_type(TypeDef {
        id: TypeId(201),
        attrs: [(SRC, 17.5)].into(),
        effects: vec![passive_effect(
            1,
            vec![modifier(
                1,
                Operator::PostPercent,
                TgtFilter::Domain { domain: Domain::Ship },
            )],
        )],
        ..Default::default()
    });

    let mut fit = Fit::with_seed(Arc::new(catalog), 0);
    let module = fit.attach(TypeId(10), Slot::ModuleLow).unwrap();
    let before = fit.value_of(module, TGT).unwrap();

    let implant = fit.attach(TypeId(201), Slot::Implant).unwrap();
    let modified = fit.value_of(module, TGT).unwrap();
    assert!(modified > before);
    assert_eq!(fit.affectors_of(module, TGT).len(), 1);

    fit.detach(implant).unwrap();
    assert!(fit.affectors_of(module, TGT).is_empty());
    assert_eq!(fit.value_of(module, TGT).unwrap(), before);

    // Idempotence under attach → detach → attach.
    fit.attach(TypeId(201), Slot::Implant).unwrap();
    assert_eq!(fit.value_of(module, TGT).unwrap(), modified);
}

/// Competing assignments are resolved deterministically: the candidate
/// with the highest (modifier id, source item id) wins, regardless of
/// attachment order.
#[test]
fn test_pre_assign_tie_break() {
    let mut catalog = StaticCatalog::new();
    catalog.add_type(TypeDef {
        id: TypeId(10),
        attrs: [(TGT, 100.0)].into(),
        ..Default::default()
    });
    catalog.add_type(TypeDef {
        id: TypeId(201),
        attrs: [(SRC, 5.0)].into(),
        effects: vec![passive_effect(
            1,
            vec![modifier(1, Operator::PreAssign, TgtFilter::Domain { domain: Domain::Ship })],
        )],
        ..Default::default()
    });
    catalog.add_type(TypeDef {
        id: TypeId(202),
        attrs: [(SRC, 7.0)].into(),
        effects: vec![passive_effect(
            2,
            vec![modifier(2, Operator::PreAssign, TgtFilter::Domain { domain: Domain::Ship })],
        )],
        ..Default::default()
    });
    let catalog: Arc<dyn AttributeCatalog> = Arc::new(catalog);

    for attach_order in [[201u32, 202], [202, 201]] {
        let mut fit = Fit::with_seed(Arc::clone(&catalog), 0);
        let module = fit.attach(TypeId(10), Slot::ModuleLow).unwrap();
        for type_id in attach_order {
            fit.attach(TypeId(type_id), Slot::Implant).unwrap();
        }
        assert_eq!(fit.value_of(module, TGT).unwrap(), 7.0);
    }
}

/// An absent base with an assignment modifier still yields a value; an
/// absent base without one stays absent even under additive modifiers.
#[test]
fn test_absent_base_handling() {
    let mut catalog = StaticCatalog::new();
    // Target template declares no TGT base at all.
    catalog.add_type(TypeDef { id: TypeId(10), ..Default::default() });
    catalog.add_type(TypeDef {
        id: TypeId(201),
        attrs: [(SRC, 5.0)].into(),
        effects: vec![passive_effect(
            1,
            vec![modifier(1, Operator::PreAssign, TgtFilter::Domain { domain: Domain::Ship })],
        )],
        ..Default::default()
    });
    catalog.add_type(TypeDef {
        id: TypeId(202),
        attrs: [(SRC, 50.0)].into(),
        effects: vec![passive_effect(
            2,
            vec![modifier(2, Operator::ModAdd, TgtFilter::Domain { domain: Domain::Ship })],
        )],
        ..Default::default()
    });
    let catalog: Arc<dyn AttributeCatalog> = Arc::new(catalog);

    // Additive modifier alone: still absent, not zero plus fifty.
    let mut fit = Fit::with_seed(Arc::clone(&catalog), 0);
    let module = fit.attach(TypeId(10), Slot::ModuleLow).unwrap();
    fit.attach(TypeId(202), Slot::Implant).unwrap();
    assert!(matches!(
        fit.value_of(module, TGT),
        Err(CalcError::NoValue { .. })
    ));

    // A pre-assignment supplies the missing base.
    let mut fit = Fit::with_seed(catalog, 0);
    let module = fit.attach(TypeId(10), Slot::ModuleLow).unwrap();
    fit.attach(TypeId(201), Slot::Implant).unwrap();
    fit.attach(TypeId(202), Slot::Implant).unwrap();
    assert_close(fit.value_of(module, TGT).unwrap(), 55.0);
}

/// A modifier whose source attribute is undefined is skipped, never
/// treated as zero; its siblings still apply.
#[test]
fn test_absent_source_operand_skipped() {
    let mut catalog = StaticCatalog::new();
    catalog.add_type(TypeDef {
        id: TypeId(10),
        attrs: [(TGT, 100.0)].into(),
        ..Default::default()
    });
    catalog.add_type(TypeDef {
        id: TypeId(201),
        // SRC is present, AttrId(3) is not.
        attrs: [(SRC, 1.5)].into(),
        effects: vec![passive_effect(
            1,
            vec![
                modifier(1, Operator::PostMul, TgtFilter::Domain { domain: Domain::Ship }),
                Modifier {
                    id: ModifierId(2),
                    src_attr: AttrId(3),
                    op: Operator::PostMul,
                    tgt_attr: TGT,
                    filter: TgtFilter::Domain { domain: Domain::Ship },
                },
            ],
        )],
        ..Default::default()
    });

    let mut fit = Fit::with_seed(Arc::new(catalog), 0);
    let module = fit.attach(TypeId(10), Slot::ModuleLow).unwrap();
    fit.attach(TypeId(201), Slot::Implant).unwrap();

    assert_close(fit.value_of(module, TGT).unwrap(), 150.0);
}

/// A self-referencing modifier is reported as a cycle, not evaluated
/// forever and not silently dropped into a wrong value.
#[test]
fn test_self_reference_cycle() {
    let mut catalog = StaticCatalog::new();
    catalog.add_type(TypeDef {
        id: TypeId(10),
        attrs: [(TGT, 100.0)].into(),
        effects: vec![passive_effect(
            1,
            vec![Modifier {
                id: ModifierId(1),
                src_attr: TGT,
                op: Operator::PostMul,
                tgt_attr: TGT,
                filter: TgtFilter::Item { domain: Domain::Itself },
            }],
        )],
        ..Default::default()
    });

    let mut fit = Fit::with_seed(Arc::new(catalog), 0);
    let module = fit.attach(TypeId(10), Slot::ModuleHigh).unwrap();

    assert!(matches!(
        fit.value_of(module, TGT),
        Err(CalcError::Cycle { .. })
    ));
}

/// A cycle spanning two items and two attributes is detected and the
/// offending path reported.
#[test]
fn test_cross_item_cycle() {
    let attr_x = AttrId(5);
    let attr_y = AttrId(6);
    let mut catalog = StaticCatalog::new();
    catalog.add_type(TypeDef {
        id: TypeId(201),
        attrs: [(attr_x, 1.0)].into(),
        effects: vec![EffectDef {
            id: EffectId(1),
            category: EffectCategory::Passive,
            modifiers: vec![Modifier {
                id: ModifierId(1),
                src_attr: attr_x,
                op: Operator::PostMul,
                tgt_attr: attr_y,
                filter: TgtFilter::Domain { domain: Domain::Character },
            }],
            chance_attr: None,
        }],
        ..Default::default()
    });
    catalog.add_type(TypeDef {
        id: TypeId(202),
        attrs: [(attr_y, 1.0)].into(),
        effects: vec![EffectDef {
            id: EffectId(2),
            category: EffectCategory::Passive,
            modifiers: vec![Modifier {
                id: ModifierId(2),
                src_attr: attr_y,
                op: Operator::PostMul,
                tgt_attr: attr_x,
                filter: TgtFilter::Domain { domain: Domain::Character },
            }],
            chance_attr: None,
        }],
        ..Default::default()
    });

    let mut fit = Fit::with_seed(Arc::new(catalog), 0);
    let a = fit.attach(TypeId(201), Slot::Implant).unwrap();
    let b = fit.attach(TypeId(202), Slot::Implant).unwrap();

    let result = fit.value_of(a, attr_y);
    match result {
        Err(CalcError::Cycle { path }) => {
            assert!(path.len() >= 3);
            assert_eq!(path.first(), path.last());
        }
        other => panic!("expected cycle, got {other:?}"),
    }
    let _ = b;
}

/// One structurally invalid modifier inside an effect does not prevent
/// its valid sibling from applying.
#[test]
fn test_malformed_modifier_isolation() {
    let mut catalog = StaticCatalog::new();
    catalog.add_type(TypeDef {
        id: TypeId(10),
        attrs: [(SRC, 20.0), (TGT, 100.0)].into(),
        effects: vec![passive_effect(
            1,
            vec![
                // Domain filter anchored on the companion: malformed.
                modifier(1, Operator::PostPercent, TgtFilter::Domain { domain: Domain::Other }),
                modifier(2, Operator::PostPercent, TgtFilter::Item { domain: Domain::Itself }),
            ],
        )],
        ..Default::default()
    });

    let mut fit = Fit::with_seed(Arc::new(catalog), 0);
    let ship = fit.attach(TypeId(10), Slot::Ship).unwrap();

    assert_close(fit.value_of(ship, TGT).unwrap(), 120.0);
}

/// Modifier chains propagate through intermediate attributes: an
/// implant boosting a hull attribute that in turn drives a rig bonus.
#[test]
fn test_chained_modification() {
    let attr1 = AttrId(11);
    let attr2 = AttrId(12);
    let attr3 = AttrId(13);
    let mut catalog = StaticCatalog::new();
    catalog.add_type(TypeDef {
        id: TypeId(201),
        attrs: [(attr1, 5.0)].into(),
        effects: vec![EffectDef {
            id: EffectId(1),
            category: EffectCategory::Passive,
            modifiers: vec![Modifier {
                id: ModifierId(1),
                src_attr: attr1,
                op: Operator::PostMul,
                tgt_attr: attr2,
                filter: TgtFilter::Item { domain: Domain::Ship },
            }],
            chance_attr: None,
        }],
        ..Default::default()
    });
    catalog.add_type(TypeDef {
        id: TypeId(20),
        attrs: [(attr2, 7.5)].into(),
        effects: vec![EffectDef {
            id: EffectId(2),
            category: EffectCategory::Passive,
            modifiers: vec![Modifier {
                id: ModifierId(2),
                src_attr: attr2,
                op: Operator::PostPercent,
                tgt_attr: attr3,
                filter: TgtFilter::Domain { domain: Domain::Itself },
            }],
            chance_attr: None,
        }],
        ..Default::default()
    });
    catalog.add_type(TypeDef {
        id: TypeId(30),
        attrs: [(attr3, 0.5)].into(),
        ..Default::default()
    });

    let mut fit = Fit::with_seed(Arc::new(catalog), 0);
    let ship = fit.attach(TypeId(20), Slot::Ship).unwrap();
    let rig = fit.attach(TypeId(30), Slot::Rig).unwrap();
    fit.attach(TypeId(201), Slot::Implant).unwrap();

    assert_close(fit.value_of(ship, attr2).unwrap(), 37.5);
    assert_close(fit.value_of(rig, attr3).unwrap(), 0.5 * 1.375);
}
