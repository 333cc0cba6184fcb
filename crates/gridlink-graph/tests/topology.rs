//! Integration test: grid membership under random edge removal and
//! insertion.
//!
//! Removing a tree edge must leave exactly two grids whose members are
//! the two sides of the cut; removing one edge of a ring must leave the
//! grid intact; linking two chains must produce one grid holding both.

use gridlink_core::NodeId;
use gridlink_graph::{Network, NetworkConfig};
use gridlink_test_utils::RecordingOwner;
use gridlink_tick::{SchedulerConfig, TickScheduler};
use proptest::prelude::*;
use proptest::sample::Index;

fn setup() -> (Network, TickScheduler) {
    (
        Network::new(NetworkConfig::default()),
        TickScheduler::new(SchedulerConfig::default()).unwrap(),
    )
}

fn cables(net: &mut Network, n: usize) -> Vec<NodeId> {
    (0..n)
        .map(|_| net.create_node(RecordingOwner::cable().shared()))
        .collect()
}

fn total_members(net: &Network) -> usize {
    net.grids().map(|(_, g)| g.len()).sum()
}

proptest! {
    #[test]
    fn cutting_a_tree_edge_partitions_membership(
        (n, parents, cut) in (2usize..24).prop_flat_map(|n| {
            (Just(n), prop::collection::vec(any::<Index>(), n - 1), any::<Index>())
        })
    ) {
        let (mut net, mut sched) = setup();
        let nodes = cables(&mut net, n);
        let parent: Vec<usize> = std::iter::once(0)
            .chain((1..n).map(|i| parents[i - 1].index(i)))
            .collect();
        let edges: Vec<_> = (1..n)
            .map(|i| net.connect(nodes[i], nodes[parent[i]], None, &mut sched).unwrap())
            .collect();
        prop_assert_eq!(net.grid_count(), 1);

        let k = cut.index(n - 1);
        let child = k + 1;
        net.disconnect(nodes[child], edges[k], &mut sched).unwrap();

        let mut below = vec![false; n];
        below[child] = true;
        for i in child + 1..n {
            below[i] = below[parent[i]];
        }

        prop_assert_eq!(net.grid_count(), 2);
        prop_assert_eq!(total_members(&net), n);
        let cut_grid = net.grid_of(nodes[child]);
        for i in 0..n {
            prop_assert_eq!(net.grid_of(nodes[i]) == cut_grid, below[i]);
        }
        for (_, grid) in net.grids() {
            prop_assert!(grid.contains(grid.pivot()));
        }
    }

    #[test]
    fn cutting_a_ring_edge_keeps_one_grid(n in 3usize..20, cut in any::<Index>()) {
        let (mut net, mut sched) = setup();
        let nodes = cables(&mut net, n);
        let edges: Vec<_> = (0..n)
            .map(|i| net.connect(nodes[i], nodes[(i + 1) % n], None, &mut sched).unwrap())
            .collect();
        let grid = net.grid_of(nodes[0]);

        let k = cut.index(n);
        net.disconnect(nodes[k], edges[k], &mut sched).unwrap();

        prop_assert_eq!(net.grid_count(), 1);
        prop_assert_eq!(net.metrics().grid_splits, 0);
        for node in &nodes {
            prop_assert_eq!(net.grid_of(*node), grid);
        }
    }

    #[test]
    fn linking_two_chains_unions_them(p in 1usize..12, q in 1usize..12) {
        let (mut net, mut sched) = setup();
        let left = cables(&mut net, p);
        let right = cables(&mut net, q);
        for side in [&left, &right] {
            net.internal_grid(side[0], &mut sched).unwrap();
            for pair in side.windows(2) {
                net.connect(pair[0], pair[1], None, &mut sched).unwrap();
            }
        }
        prop_assert_eq!(net.grid_count(), 2);

        net.connect(left[p - 1], right[q - 1], None, &mut sched).unwrap();
        prop_assert_eq!(net.grid_count(), 1);
        prop_assert_eq!(total_members(&net), p + q);
        let grid = net.grid_of(left[0]);
        for node in left.iter().chain(right.iter()) {
            prop_assert_eq!(net.grid_of(*node), grid);
        }
    }
}

#[test]
fn destroying_every_node_retires_every_grid() {
    let (mut net, mut sched) = setup();
    let nodes = cables(&mut net, 6);
    for pair in nodes.windows(2) {
        net.connect(pair[0], pair[1], None, &mut sched).unwrap();
    }
    net.connect(nodes[5], nodes[0], None, &mut sched).unwrap();

    for node in [nodes[2], nodes[0], nodes[4], nodes[1], nodes[5], nodes[3]] {
        net.destroy_node(node, &mut sched).unwrap();
    }
    assert_eq!(net.node_count(), 0);
    assert_eq!(net.connection_count(), 0);
    assert_eq!(net.grid_count(), 0);

    sched.server_tick_end(&mut net);
    assert_eq!(sched.grids().live_len(), 0);
    assert_eq!(net.metrics().grids_created, net.metrics().grids_retired);
}
