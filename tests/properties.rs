use buildorder::analyze::build_order;
use buildorder::{Language, Origin, SourceUnit, SymbolName};
use proptest::prelude::*;
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Units `u0..un` listed in `listing` order; `u{i}` defines `m{i}` and
/// requires `m{j}` for every `j` in `requires[i]`.
fn make_units(requires: &[Vec<usize>], listing: &[usize]) -> Vec<SourceUnit> {
    listing
        .iter()
        .map(|&i| SourceUnit {
            path: PathBuf::from(format!("/src/u{}.f90", i)),
            relative_path: format!("u{}.f90", i),
            language: Language::FortranFree,
            origin: Origin::Primary,
            defines: vec![SymbolName::new(&format!("M{}", i))],
            requires: requires[i]
                .iter()
                .map(|j| SymbolName::new(&format!("m{}", j)))
                .collect::<BTreeSet<_>>(),
        })
        .collect()
}

/// Requirements that only point at lower-numbered units, so no cycles.
fn acyclic_case() -> impl Strategy<Value = (Vec<Vec<usize>>, Vec<usize>)> {
    (1usize..24).prop_flat_map(|n| {
        let requires = (0..n)
            .map(|i| {
                if i == 0 {
                    Just(Vec::new()).boxed()
                } else {
                    prop::collection::vec(0..i, 0..4).boxed()
                }
            })
            .collect::<Vec<_>>();
        let listing = Just((0..n).collect::<Vec<_>>()).prop_shuffle();
        (requires, listing)
    })
}

fn any_case() -> impl Strategy<Value = (Vec<Vec<usize>>, Vec<usize>)> {
    (1usize..24).prop_flat_map(|n| {
        let requires = prop::collection::vec(prop::collection::vec(0..n, 0..4), n);
        let listing = Just((0..n).collect::<Vec<_>>()).prop_shuffle();
        (requires, listing)
    })
}

proptest! {
    #[test]
    fn acyclic_graphs_order_providers_first((requires, listing) in acyclic_case()) {
        let resolution = build_order(make_units(&requires, &listing));

        prop_assert!(resolution.cycles.is_empty());
        prop_assert!(resolution.unresolved.is_empty());
        for (consumer, provider) in resolution.graph.edges() {
            prop_assert!(resolution.position(provider) < resolution.position(consumer));
        }
    }

    #[test]
    fn every_unit_appears_exactly_once((requires, listing) in any_case()) {
        let n = listing.len();
        let resolution = build_order(make_units(&requires, &listing));

        let mut flat = resolution.order.flatten();
        prop_assert_eq!(flat.len(), n);
        flat.sort_unstable();
        flat.dedup();
        prop_assert_eq!(flat, (0..n).collect::<Vec<_>>());
    }

    #[test]
    fn ordering_is_deterministic((requires, listing) in any_case()) {
        let first = build_order(make_units(&requires, &listing));
        let second = build_order(make_units(&requires, &listing));
        prop_assert_eq!(first.order, second.order);
        prop_assert_eq!(first.cycles, second.cycles);
    }

    #[test]
    fn cycles_are_contained_in_one_group((requires, listing) in any_case()) {
        let resolution = build_order(make_units(&requires, &listing));

        for (index, cycle) in resolution.cycles.iter().enumerate() {
            let group = resolution
                .order
                .stages
                .iter()
                .flat_map(|s| s.groups.iter())
                .find(|g| g.cycle == Some(index));
            prop_assert!(group.is_some());
            prop_assert_eq!(&group.unwrap().units, &cycle.members);
        }

        let cycle_of = |id: usize| resolution.cycles.iter().position(|c| c.members.contains(&id));
        for (consumer, provider) in resolution.graph.edges() {
            let (c, p) = (
                resolution.order.stage_of(consumer).unwrap(),
                resolution.order.stage_of(provider).unwrap(),
            );
            if cycle_of(consumer).is_some() && cycle_of(consumer) == cycle_of(provider) {
                prop_assert_eq!(c, p);
            } else {
                prop_assert!(p < c);
            }
        }
    }
}
