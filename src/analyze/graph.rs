//! Dependency resolution and staged topological ordering.
//!
//! Units are identified by their index in the input slice, which is also the
//! stable listing order every tie-break falls back to. An edge `U -> V` means
//! `U` is compiled after `V`.

use crate::types::{Origin, SourceUnit, SymbolName};
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// Index of a unit in the resolved unit list.
pub type UnitId = usize;

/// A symbol defined by more than one unit, and which one won.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AmbiguousDefinition {
    pub symbol: SymbolName,
    pub chosen: PathBuf,
    pub rejected: Vec<PathBuf>,
}

/// A requirement no scanned unit provides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unresolved {
    pub unit: UnitId,
    pub symbol: SymbolName,
}

/// Units that depend on each other in a loop and are compiled together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cycle {
    pub name: String,
    /// Input order.
    pub members: Vec<UnitId>,
}

/// One schedulable item: a single unit, or every member of a cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileGroup {
    pub units: Vec<UnitId>,
    /// Index into [`Resolution::cycles`] when this group is a cycle.
    pub cycle: Option<usize>,
}

/// Groups with no dependencies on each other.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Stage {
    pub groups: Vec<CompileGroup>,
}

impl Stage {
    pub fn units(&self) -> impl Iterator<Item = UnitId> + '_ {
        self.groups.iter().flat_map(|g| g.units.iter().copied())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompileOrder {
    pub stages: Vec<Stage>,
}

impl CompileOrder {
    /// The total order: stages concatenated, groups kept contiguous.
    pub fn flatten(&self) -> Vec<UnitId> {
        self.stages.iter().flat_map(|s| s.units()).collect()
    }

    pub fn stage_of(&self, unit: UnitId) -> Option<usize> {
        self.stages
            .iter()
            .position(|s| s.units().any(|u| u == unit))
    }

    pub fn len(&self) -> usize {
        self.stages.iter().map(|s| s.units().count()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Symbol name to defining unit, built once from every unit's defines.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    providers: BTreeMap<SymbolName, UnitId>,
    ambiguous: Vec<AmbiguousDefinition>,
}

impl SymbolTable {
    pub fn build(units: &[SourceUnit]) -> Self {
        let mut candidates: BTreeMap<SymbolName, Vec<UnitId>> = BTreeMap::new();
        for (id, unit) in units.iter().enumerate() {
            for name in &unit.defines {
                candidates.entry(name.clone()).or_default().push(id);
            }
        }

        let mut table = SymbolTable::default();
        for (name, ids) in candidates {
            let Some(chosen) = choose_provider(&name, &ids, units) else {
                continue;
            };
            if ids.len() > 1 {
                let rejected: Vec<PathBuf> = ids
                    .iter()
                    .filter(|&&id| id != chosen)
                    .map(|&id| units[id].path.clone())
                    .collect();
                log::warn!(
                    "{} is defined by {} units, using {}",
                    name,
                    ids.len(),
                    units[chosen].relative_path
                );
                table.ambiguous.push(AmbiguousDefinition {
                    symbol: name.clone(),
                    chosen: units[chosen].path.clone(),
                    rejected,
                });
            }
            table.providers.insert(name, chosen);
        }
        table
    }

    pub fn provider(&self, name: &SymbolName) -> Option<UnitId> {
        self.providers.get(name).copied()
    }

    pub fn ambiguous(&self) -> &[AmbiguousDefinition] {
        &self.ambiguous
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

/// Tie-break for a symbol with several definitions: units outside the
/// secondary directory first, then a file stem equal to the symbol, then
/// listing order.
fn choose_provider(name: &SymbolName, ids: &[UnitId], units: &[SourceUnit]) -> Option<UnitId> {
    ids.iter().copied().min_by_key(|&id| {
        let unit = &units[id];
        (
            unit.origin == Origin::Secondary,
            !name.matches_stem(unit.file_stem()),
            id,
        )
    })
}

/// Resolved consumer -> provider edges over all units.
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    graph: DiGraph<UnitId, ()>,
    unresolved: Vec<Unresolved>,
}

impl DependencyGraph {
    pub fn build(units: &[SourceUnit], table: &SymbolTable) -> Self {
        let mut graph = DiGraph::with_capacity(units.len(), units.len());
        for id in 0..units.len() {
            graph.add_node(id);
        }

        let mut unresolved = Vec::new();
        for (id, unit) in units.iter().enumerate() {
            for name in &unit.requires {
                if unit.defines_symbol(name) {
                    continue;
                }
                match table.provider(name) {
                    Some(provider) => {
                        graph.update_edge(NodeIndex::new(id), NodeIndex::new(provider), ());
                    }
                    None => unresolved.push(Unresolved {
                        unit: id,
                        symbol: name.clone(),
                    }),
                }
            }
        }

        Self { graph, unresolved }
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Every `(consumer, provider)` pair, sorted.
    pub fn edges(&self) -> Vec<(UnitId, UnitId)> {
        let mut edges: Vec<(UnitId, UnitId)> = self
            .graph
            .edge_indices()
            .filter_map(|e| self.graph.edge_endpoints(e))
            .map(|(a, b)| (a.index(), b.index()))
            .collect();
        edges.sort_unstable();
        edges
    }

    pub fn has_edge(&self, consumer: UnitId, provider: UnitId) -> bool {
        self.graph
            .contains_edge(NodeIndex::new(consumer), NodeIndex::new(provider))
    }

    /// Units `unit` is compiled after.
    pub fn dependencies(&self, unit: UnitId) -> Vec<UnitId> {
        self.neighbors(unit, Direction::Outgoing)
    }

    /// Units compiled after `unit` because of it.
    pub fn dependents(&self, unit: UnitId) -> Vec<UnitId> {
        self.neighbors(unit, Direction::Incoming)
    }

    fn neighbors(&self, unit: UnitId, dir: Direction) -> Vec<UnitId> {
        let mut ids: Vec<UnitId> = self
            .graph
            .neighbors_directed(NodeIndex::new(unit), dir)
            .map(|n| n.index())
            .collect();
        ids.sort_unstable();
        ids
    }

    pub fn unresolved(&self) -> &[Unresolved] {
        &self.unresolved
    }
}

/// Everything the sorter produces for one run.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub units: Vec<SourceUnit>,
    pub symbols: SymbolTable,
    pub graph: DependencyGraph,
    pub order: CompileOrder,
    pub cycles: Vec<Cycle>,
    pub unresolved: Vec<Unresolved>,
    pub ambiguous: Vec<AmbiguousDefinition>,
}

impl Resolution {
    pub fn unit(&self, id: UnitId) -> &SourceUnit {
        &self.units[id]
    }

    pub fn ordered_units(&self) -> Vec<&SourceUnit> {
        self.order.flatten().into_iter().map(|id| &self.units[id]).collect()
    }

    pub fn ordered_paths(&self) -> Vec<&Path> {
        self.ordered_units().into_iter().map(|u| u.path.as_path()).collect()
    }

    pub fn stage_paths(&self) -> Vec<Vec<&Path>> {
        self.order
            .stages
            .iter()
            .map(|s| s.units().map(|id| self.units[id].path.as_path()).collect())
            .collect()
    }

    /// Position of `id` in the flat order.
    pub fn position(&self, id: UnitId) -> Option<usize> {
        self.order.flatten().iter().position(|&u| u == id)
    }

    /// Unit that satisfies `name` for `consumer`, if any.
    pub fn provider_of(&self, consumer: UnitId, name: &SymbolName) -> Option<UnitId> {
        if self.units[consumer].defines_symbol(name) {
            return Some(consumer);
        }
        self.symbols.provider(name)
    }

    pub fn find(&self, relative_path: &str) -> Option<UnitId> {
        self.units
            .iter()
            .position(|u| u.relative_path == relative_path)
    }

    /// No cycles and no unresolved requirements.
    pub fn is_clean(&self) -> bool {
        self.cycles.is_empty() && self.unresolved.is_empty()
    }
}

/// Resolves requirements, groups cycles and orders `units` into stages.
///
/// `units` must already be in stable listing order. Never fails: problems
/// come back as cycles, unresolved requirements and ambiguities.
pub fn build_order(units: Vec<SourceUnit>) -> Resolution {
    let table = SymbolTable::build(&units);
    let graph = DependencyGraph::build(&units, &table);
    let (order, cycles) = stage_units(&units, &graph);

    for cycle in &cycles {
        let names: Vec<&str> = cycle
            .members
            .iter()
            .map(|&id| units[id].relative_path.as_str())
            .collect();
        log::warn!("{}: {} compiled as one group", cycle.name, names.join(", "));
    }
    for missing in graph.unresolved() {
        log::debug!(
            "{} requires {} which no scanned unit defines",
            units[missing.unit].relative_path,
            missing.symbol
        );
    }

    Resolution {
        unresolved: graph.unresolved().to_vec(),
        ambiguous: table.ambiguous().to_vec(),
        units,
        symbols: table,
        graph,
        order,
        cycles,
    }
}

/// Kahn's algorithm over the condensation of the ordering graph.
///
/// Secondary-directory units are staged on their own after everything else,
/// so edges between the two sets are not ordering constraints.
fn stage_units(units: &[SourceUnit], graph: &DependencyGraph) -> (CompileOrder, Vec<Cycle>) {
    let is_secondary = |id: UnitId| units[id].origin == Origin::Secondary;

    let mut ordering: DiGraph<UnitId, ()> = DiGraph::with_capacity(units.len(), 0);
    for id in 0..units.len() {
        ordering.add_node(id);
    }
    for (consumer, provider) in graph.edges() {
        if is_secondary(consumer) == is_secondary(provider) {
            ordering.add_edge(NodeIndex::new(consumer), NodeIndex::new(provider), ());
        }
    }

    let mut groups: Vec<Vec<UnitId>> = tarjan_scc(&ordering)
        .into_iter()
        .map(|scc| {
            let mut members: Vec<UnitId> = scc.into_iter().map(|n| n.index()).collect();
            members.sort_unstable();
            members
        })
        .collect();
    groups.sort_by_key(|members| members[0]);

    let mut group_of = vec![0usize; units.len()];
    for (gid, members) in groups.iter().enumerate() {
        for &id in members {
            group_of[id] = gid;
        }
    }

    let mut cycles = Vec::new();
    let mut cycle_of: Vec<Option<usize>> = vec![None; groups.len()];
    for (gid, members) in groups.iter().enumerate() {
        let looped = members.len() == 1
            && ordering.contains_edge(NodeIndex::new(members[0]), NodeIndex::new(members[0]));
        if members.len() > 1 || looped {
            cycle_of[gid] = Some(cycles.len());
            cycles.push(Cycle {
                name: format!("cycle-{}", cycles.len() + 1),
                members: members.clone(),
            });
        }
    }

    // pending[g]: providers of g not yet staged; waiting[g]: groups blocked on g
    let mut pending = vec![0usize; groups.len()];
    let mut waiting: Vec<BTreeSet<usize>> = vec![BTreeSet::new(); groups.len()];
    for edge in ordering.edge_indices() {
        let Some((consumer, provider)) = ordering.edge_endpoints(edge) else {
            continue;
        };
        let (gc, gp) = (group_of[consumer.index()], group_of[provider.index()]);
        if gc != gp && waiting[gp].insert(gc) {
            pending[gc] += 1;
        }
    }

    let mut order = CompileOrder::default();
    for secondary in [false, true] {
        let mut ready: Vec<usize> = (0..groups.len())
            .filter(|&g| pending[g] == 0 && is_secondary(groups[g][0]) == secondary)
            .collect();

        while !ready.is_empty() {
            let mut next = BTreeSet::new();
            for &g in &ready {
                for &blocked in &waiting[g] {
                    pending[blocked] -= 1;
                    if pending[blocked] == 0 {
                        next.insert(blocked);
                    }
                }
            }

            order.stages.push(Stage {
                groups: ready
                    .iter()
                    .map(|&g| CompileGroup {
                        units: groups[g].clone(),
                        cycle: cycle_of[g],
                    })
                    .collect(),
            });
            ready = next.into_iter().collect();
        }
    }

    (order, cycles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Language;

    fn make_unit(path: &str, defines: &[&str], requires: &[&str]) -> SourceUnit {
        make_unit_from(path, Origin::Primary, defines, requires)
    }

    fn make_unit_from(
        path: &str,
        origin: Origin,
        defines: &[&str],
        requires: &[&str],
    ) -> SourceUnit {
        SourceUnit {
            path: PathBuf::from("/project").join(path),
            relative_path: path.to_string(),
            language: Language::FortranFixed,
            origin,
            defines: defines.iter().map(|d| SymbolName::new(d)).collect(),
            requires: requires.iter().map(|r| SymbolName::new(r)).collect(),
        }
    }

    fn order_names(resolution: &Resolution) -> Vec<&str> {
        resolution
            .ordered_units()
            .into_iter()
            .map(|u| u.relative_path.as_str())
            .collect()
    }

    fn stage_names(resolution: &Resolution) -> Vec<Vec<&str>> {
        resolution
            .order
            .stages
            .iter()
            .map(|s| s.units().map(|id| resolution.units[id].relative_path.as_str()).collect())
            .collect()
    }

    #[test]
    fn test_linear_chain() {
        let units = vec![
            make_unit("C.f", &[], &["CORE"]),
            make_unit("B.f", &["CORE"], &["UTIL"]),
            make_unit("A.f", &["UTIL"], &[]),
        ];
        let resolution = build_order(units);
        assert_eq!(order_names(&resolution), vec!["A.f", "B.f", "C.f"]);
        assert_eq!(
            stage_names(&resolution),
            vec![vec!["A.f"], vec!["B.f"], vec!["C.f"]]
        );
        assert!(resolution.is_clean());
    }

    #[test]
    fn test_two_unit_cycle_is_one_stage() {
        let units = vec![
            make_unit("X.f", &["M1"], &["M2"]),
            make_unit("Y.f", &["M2"], &["M1"]),
        ];
        let resolution = build_order(units);
        assert_eq!(resolution.cycles.len(), 1);
        assert_eq!(resolution.cycles[0].members, vec![0, 1]);
        assert_eq!(resolution.cycles[0].name, "cycle-1");
        assert_eq!(stage_names(&resolution), vec![vec!["X.f", "Y.f"]]);
        assert_eq!(resolution.order.stages[0].groups.len(), 1);
        assert_eq!(resolution.order.stages[0].groups[0].cycle, Some(0));
    }

    #[test]
    fn test_unresolved_requirement_is_reported() {
        let resolution = build_order(vec![make_unit("Z.f", &[], &["MISSING"])]);
        assert_eq!(order_names(&resolution), vec!["Z.f"]);
        assert_eq!(
            resolution.unresolved,
            vec![Unresolved {
                unit: 0,
                symbol: SymbolName::new("missing"),
            }]
        );
        assert!(!resolution.is_clean());
    }

    #[test]
    fn test_case_insensitive_resolution() {
        let units = vec![
            make_unit("user.f90", &[], &["moda"]),
            make_unit("moda.f90", &["MODA"], &[]),
        ];
        let resolution = build_order(units);
        let user = resolution.find("user.f90").unwrap();
        let moda = resolution.find("moda.f90").unwrap();
        assert!(resolution.graph.has_edge(user, moda));
        assert_eq!(resolution.find("MODA.f90"), None);
        assert_eq!(order_names(&resolution), vec!["moda.f90", "user.f90"]);
    }

    #[test]
    fn test_self_requirement_adds_no_edge() {
        let units = vec![make_unit("self.f90", &["alpha", "beta"], &["alpha"])];
        let resolution = build_order(units);
        assert_eq!(resolution.graph.edge_count(), 0);
        assert!(resolution.cycles.is_empty());
        assert!(resolution.unresolved.is_empty());
    }

    #[test]
    fn test_duplicate_edges_collapse() {
        let units = vec![
            make_unit("lib.f90", &["one", "two"], &[]),
            make_unit("app.f90", &[], &["one", "two"]),
        ];
        let resolution = build_order(units);
        assert_eq!(resolution.graph.edge_count(), 1);
        assert_eq!(resolution.graph.dependencies(1), vec![0]);
        assert_eq!(resolution.graph.dependents(0), vec![1]);
    }

    #[test]
    fn test_independent_units_share_a_stage() {
        let units = vec![
            make_unit("base.f", &["base"], &[]),
            make_unit("left.f", &["left"], &["base"]),
            make_unit("right.f", &["right"], &["base"]),
            make_unit("top.f", &[], &["left", "right"]),
        ];
        let resolution = build_order(units);
        assert_eq!(
            stage_names(&resolution),
            vec![vec!["base.f"], vec!["left.f", "right.f"], vec!["top.f"]]
        );
    }

    #[test]
    fn test_cycle_containment() {
        let units = vec![
            make_unit("a.f90", &["ma"], &["mb"]),
            make_unit("b.f90", &["mb"], &["mc"]),
            make_unit("c.f90", &["mc"], &["ma", "base"]),
            make_unit("d.f90", &[], &["mb"]),
            make_unit("base.f90", &["base"], &[]),
        ];
        let resolution = build_order(units);
        assert_eq!(resolution.cycles.len(), 1);
        assert_eq!(resolution.cycles[0].members, vec![0, 1, 2]);

        let order = order_names(&resolution);
        assert_eq!(order, vec!["base.f90", "a.f90", "b.f90", "c.f90", "d.f90"]);

        let cycle_stage = resolution.order.stage_of(0).unwrap();
        assert_eq!(resolution.order.stage_of(1), Some(cycle_stage));
        assert_eq!(resolution.order.stage_of(2), Some(cycle_stage));
        assert!(resolution.order.stage_of(3).unwrap() > cycle_stage);
    }

    #[test]
    fn test_ambiguous_definition_prefers_matching_stem() {
        let units = vec![
            make_unit("aaa.f90", &["grid"], &[]),
            make_unit("GRID.f90", &["grid"], &[]),
            make_unit("user.f90", &[], &["grid"]),
        ];
        let resolution = build_order(units);
        assert!(resolution.graph.has_edge(2, 1));
        assert!(!resolution.graph.has_edge(2, 0));
        assert_eq!(resolution.ambiguous.len(), 1);
        assert_eq!(resolution.ambiguous[0].chosen, PathBuf::from("/project/GRID.f90"));
        assert_eq!(
            resolution.ambiguous[0].rejected,
            vec![PathBuf::from("/project/aaa.f90")]
        );
    }

    #[test]
    fn test_ambiguous_definition_falls_back_to_listing_order() {
        let units = vec![
            make_unit("first.f90", &["shared"], &[]),
            make_unit("second.f90", &["shared"], &[]),
            make_unit("user.f90", &[], &["shared"]),
        ];
        let resolution = build_order(units);
        assert!(resolution.graph.has_edge(2, 0));
        assert_eq!(resolution.ambiguous[0].symbol, SymbolName::new("shared"));
    }

    #[test]
    fn test_ambiguous_definition_prefers_primary_over_secondary() {
        let units = vec![
            make_unit("user.f90", &[], &["shared"]),
            make_unit("other.f90", &["shared"], &[]),
            make_unit_from("shared.f90", Origin::Secondary, &["shared"], &[]),
        ];
        let resolution = build_order(units);
        assert!(resolution.graph.has_edge(0, 1));
    }

    #[test]
    fn test_ambiguous_header_uses_listing_order() {
        let header = |path: &str, defines: &[&str], requires: &[&str]| SourceUnit {
            language: Language::Header,
            ..make_unit(path, defines, requires)
        };
        let units = vec![
            header("lib/util.h", &["util.h"], &[]),
            header("vendor/util.h", &["util.h"], &[]),
            SourceUnit {
                language: Language::C,
                ..make_unit("main.c", &[], &["util.h"])
            },
        ];
        let resolution = build_order(units);

        assert!(resolution.graph.has_edge(2, 0));
        assert!(!resolution.graph.has_edge(2, 1));
        assert_eq!(resolution.ambiguous.len(), 1);
        assert_eq!(resolution.ambiguous[0].symbol, SymbolName::new("util.h"));
        assert_eq!(
            resolution.ambiguous[0].chosen,
            PathBuf::from("/project/lib/util.h")
        );
        assert_eq!(
            resolution.ambiguous[0].rejected,
            vec![PathBuf::from("/project/vendor/util.h")]
        );
    }

    #[test]
    fn test_own_definition_wins_over_ambiguity() {
        let units = vec![
            make_unit("one.f90", &["dup"], &[]),
            make_unit("two.f90", &["dup"], &["dup"]),
        ];
        let resolution = build_order(units);
        assert_eq!(resolution.graph.edge_count(), 0);
    }

    #[test]
    fn test_secondary_units_follow_primary_units() {
        let units = vec![
            make_unit("main.c", &["main.c"], &["util.h"]),
            make_unit_from("util.h", Origin::Secondary, &["util.h"], &[]),
            make_unit_from("extra.h", Origin::Secondary, &["extra.h"], &["util.h"]),
        ];
        let resolution = build_order(units);
        assert!(resolution.unresolved.is_empty());
        assert_eq!(
            stage_names(&resolution),
            vec![vec!["main.c"], vec!["util.h"], vec!["extra.h"]]
        );
    }

    #[test]
    fn test_completeness_and_determinism() {
        let make = || {
            vec![
                make_unit("p.f", &["p"], &["q", "missing"]),
                make_unit("q.f", &["q"], &["r"]),
                make_unit("r.f", &["r"], &["q"]),
                make_unit("s.f", &[], &[]),
                make_unit("t.f", &["t"], &["p"]),
            ]
        };
        let first = build_order(make());
        let second = build_order(make());

        let mut flat = first.order.flatten();
        assert_eq!(flat, second.order.flatten());
        assert_eq!(first.cycles, second.cycles);
        assert_eq!(first.unresolved, second.unresolved);

        flat.sort_unstable();
        assert_eq!(flat, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_every_edge_points_backwards() {
        let units = vec![
            make_unit("top.f90", &[], &["mid", "leaf"]),
            make_unit("mid.f90", &["mid"], &["leaf"]),
            make_unit("leaf.f90", &["leaf"], &[]),
            make_unit("side.f90", &["side"], &["leaf"]),
        ];
        let resolution = build_order(units);
        for (consumer, provider) in resolution.graph.edges() {
            assert!(
                resolution.order.stage_of(provider) < resolution.order.stage_of(consumer),
                "{} must precede {}",
                provider,
                consumer
            );
        }
    }

    #[test]
    fn test_empty_input() {
        let resolution = build_order(Vec::new());
        assert!(resolution.order.is_empty());
        assert!(resolution.order.stages.is_empty());
    }

    #[test]
    fn test_symbol_table_lookup() {
        let units = vec![make_unit("a.f", &["Alpha"], &[])];
        let table = SymbolTable::build(&units);
        assert_eq!(table.provider(&SymbolName::new("ALPHA")), Some(0));
        assert_eq!(table.provider(&SymbolName::new("beta")), None);
        assert_eq!(table.len(), 1);
    }
}
