//! Connectivity queries over a topology snapshot.
//!
//! The solver detects islanding numerically (a singular reduced
//! susceptance matrix), but collapse reports are more useful when they say
//! *how many* electrical islands the outage state produced. These helpers
//! answer that from the graph structure alone.

use crate::{OutageSet, Snapshot};
use petgraph::algo::connected_components;
use petgraph::prelude::*;

/// Number of electrical islands given the current outage state.
///
/// Buses are graph nodes; every in-service, non-outaged branch with both
/// endpoints present contributes an edge. An empty snapshot has zero
/// islands.
pub fn island_count(snapshot: &Snapshot, outages: &OutageSet) -> usize {
    let mut graph: Graph<(), (), Undirected> = Graph::new_undirected();
    for _ in snapshot.buses() {
        graph.add_node(());
    }
    for branch in snapshot.branches() {
        if !branch.in_service || outages.branch_out(branch.name()) {
            continue;
        }
        if let (Some(i), Some(j)) = (
            snapshot.ordinal(branch.from_bus),
            snapshot.ordinal(branch.to_bus),
        ) {
            graph.add_edge(NodeIndex::new(i), NodeIndex::new(j), ());
        }
    }
    connected_components(&graph)
}

/// True when every bus can reach every other bus under the outage state.
pub fn is_connected(snapshot: &Snapshot, outages: &OutageSet) -> bool {
    snapshot.bus_count() <= 1 || island_count(snapshot, outages) == 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Branch, Bus, BusId};

    fn chain() -> (Vec<Bus>, Vec<Branch>) {
        let buses = vec![
            Bus::new(BusId::new(1)),
            Bus::new(BusId::new(2)),
            Bus::new(BusId::new(3)),
        ];
        let branches = vec![
            Branch::new(BusId::new(1), BusId::new(2), 0.1),
            Branch::new(BusId::new(2), BusId::new(3), 0.1),
        ];
        (buses, branches)
    }

    #[test]
    fn test_connected_chain() {
        let (buses, branches) = chain();
        let snapshot = Snapshot::new(&buses, &branches);
        assert_eq!(island_count(&snapshot, &OutageSet::new()), 1);
        assert!(is_connected(&snapshot, &OutageSet::new()));
    }

    #[test]
    fn test_branch_outage_splits_chain() {
        let (buses, branches) = chain();
        let snapshot = Snapshot::new(&buses, &branches);
        let outages = OutageSet::parse("l2-3");
        assert_eq!(island_count(&snapshot, &outages), 2);
        assert!(!is_connected(&snapshot, &outages));
    }

    #[test]
    fn test_out_of_service_branch_is_ignored() {
        let (buses, mut branches) = chain();
        branches[0].in_service = false;
        let snapshot = Snapshot::new(&buses, &branches);
        assert_eq!(island_count(&snapshot, &OutageSet::new()), 2);
    }

    #[test]
    fn test_dangling_branch_contributes_nothing() {
        let (buses, mut branches) = chain();
        branches.push(Branch::new(BusId::new(3), BusId::new(99), 0.1));
        let snapshot = Snapshot::new(&buses, &branches);
        assert_eq!(island_count(&snapshot, &OutageSet::new()), 1);
    }
}
