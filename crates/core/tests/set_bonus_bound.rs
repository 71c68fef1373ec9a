//! Exhaustive checks of the set-bonus bound and of constraint monotonicity
//! over every multiset of topping flavors.

use std::str::FromStr;

use rust_decimal::Decimal;
use topping_core::{
    best_possible_set_effect, compile_document, EmptyDirectory, RequirementsDocument, StatKind,
    Topping, ToppingSet, TOPPING_STATS,
};

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

/// One plain topping per flavor.
fn pool() -> Vec<Topping> {
    TOPPING_STATS
        .iter()
        .map(|s| Topping::new((*s, dec("1")), vec![], None))
        .collect()
}

/// Every non-decreasing index sequence of length 5 over `n` flavors.
fn multisets(n: usize) -> Vec<[usize; 5]> {
    let mut out = Vec::new();
    for a in 0..n {
        for b in a..n {
            for c in b..n {
                for d in c..n {
                    for e in d..n {
                        out.push([a, b, c, d, e]);
                    }
                }
            }
        }
    }
    out
}

#[test]
fn bound_is_admissible_for_every_completion() {
    let pool = pool();
    let stat_lists: Vec<Vec<StatKind>> = vec![
        TOPPING_STATS.to_vec(),
        vec![StatKind::Atk, StatKind::Crit],
        vec![StatKind::Hp, StatKind::Def, StatKind::DmgResist, StatKind::Crit],
        vec![StatKind::AmplifyBuff, StatKind::DebuffResist],
        vec![StatKind::CritResist],
    ];

    let sets = multisets(pool.len());
    assert_eq!(sets.len(), 2002);

    for idx in &sets {
        let members: Vec<&Topping> = idx.iter().map(|i| &pool[*i]).collect();
        let set = ToppingSet::from_slice(&members).unwrap();
        for stats in &stat_lists {
            let actual: Decimal = stats.iter().map(|s| set.set_effect(*s).1).sum();
            for placed in 0..=members.len() {
                let bound = best_possible_set_effect(
                    &members[..placed],
                    stats,
                    members.len() - placed,
                );
                assert!(
                    bound >= actual,
                    "bound {} < actual {} for {:?} with {} placed over {:?}",
                    bound,
                    actual,
                    idx,
                    placed,
                    stats
                );
            }
        }
    }
}

#[test]
fn bound_is_exact_for_a_complete_two_three_split() {
    let pool = pool();
    let hp = &pool[5];
    let def = &pool[7];
    assert_eq!(hp.flavor(), StatKind::Hp);
    assert_eq!(def.flavor(), StatKind::Def);
    let members = [hp, hp, hp, def, def];
    let stats = [StatKind::Hp, StatKind::Def];
    // HP 3-piece 10 + DEF 2-piece 10
    assert_eq!(best_possible_set_effect(&members, &stats, 0), dec("20"));
}

#[test]
fn adding_constraints_never_admits_more_sets() {
    let loose = RequirementsDocument::from_yaml_str(
        r#"
cookies:
  - name: A
    requirements: ["ATK >= 5", { max: HP }]
"#,
    )
    .unwrap();
    let tight = RequirementsDocument::from_yaml_str(
        r#"
cookies:
  - name: A
    requirements: ["ATK >= 5", "CRIT% >= 4", "DEF <= 12", "Cooldown <= 0", { max: HP }]
"#,
    )
    .unwrap();
    let loose = compile_document(&loose, &EmptyDirectory).unwrap();
    let tight = compile_document(&tight, &EmptyDirectory).unwrap();
    let (loose, tight) = (&loose.cookies[0], &tight.cookies[0]);

    let pool: Vec<Topping> = TOPPING_STATS
        .iter()
        .map(|s| Topping::new((*s, dec("3")), vec![], None))
        .collect();
    let mut tight_count = 0;
    let mut loose_count = 0;
    for idx in multisets(pool.len()) {
        let members: Vec<&Topping> = idx.iter().map(|i| &pool[*i]).collect();
        let set = ToppingSet::from_slice(&members).unwrap();
        let in_tight = tight.is_satisfied_by(&set);
        if in_tight {
            assert!(loose.is_satisfied_by(&set), "{:?}", idx);
            tight_count += 1;
        }
        if loose.is_satisfied_by(&set) {
            loose_count += 1;
        }
    }
    assert!(tight_count > 0);
    assert!(tight_count < loose_count);
}
