use super::line_of;
use crate::SimError;
use crate::net::{RoutingTable, SpanningTree, Topology};
use crate::topo::grid::{GridOpts, build_grid};

#[test]
fn spanning_tree_reaches_every_connected_router() {
    let topo = line_of(&["A", "B", "C", "D"]);
    let tree = SpanningTree::new(&topo, "A").unwrap();

    assert_eq!(tree.root(), "A");
    assert_eq!(tree.len(), 4);
    assert_eq!(tree.path_to("D").unwrap(), vec!["A", "B", "C", "D"]);
    assert_eq!(tree.next_hop("A"), Some("A"));
    assert_eq!(tree.next_hop("B"), Some("B"));
    assert_eq!(tree.next_hop("C"), Some("B"));
    assert_eq!(tree.next_hop("D"), Some("B"));
}

#[test]
fn routing_table_on_line_points_towards_destination() {
    let topo = line_of(&["A", "B", "C", "D"]);

    let at_a = RoutingTable::build(&topo, "A").unwrap();
    assert_eq!(at_a.len(), 4);
    assert_eq!(at_a.next_hop("A"), Some("A"));
    assert_eq!(at_a.next_hop("D"), Some("B"));

    let at_c = RoutingTable::build(&topo, "C").unwrap();
    assert_eq!(at_c.next_hop("A"), Some("B"));
    assert_eq!(at_c.next_hop("B"), Some("B"));
    assert_eq!(at_c.next_hop("D"), Some("D"));
}

#[test]
fn unreachable_destination_has_no_next_hop() {
    let mut topo = line_of(&["A", "B"]);
    topo.add_router("C").unwrap();

    let tree = SpanningTree::new(&topo, "A").unwrap();
    assert!(!tree.contains("C"));
    assert_eq!(tree.next_hop("C"), None);

    let table = RoutingTable::build(&topo, "A").unwrap();
    assert_eq!(table.next_hop("C"), None);
    assert_eq!(table.len(), 2);
}

#[test]
fn unknown_root_is_an_error() {
    let topo = Topology::new();
    assert_eq!(
        SpanningTree::new(&topo, "X").unwrap_err(),
        SimError::UnknownRouter("X".to_string())
    );
}

#[test]
fn following_next_hops_across_grid_takes_manhattan_distance() {
    let mut topo = Topology::new();
    let grid = build_grid(
        &mut topo,
        &GridOpts {
            width: 4,
            height: 3,
        },
    )
    .unwrap();

    let tables: Vec<(String, RoutingTable)> = grid
        .routers
        .iter()
        .map(|r| (r.clone(), RoutingTable::build(&topo, r).unwrap()))
        .collect();
    let table_of = |name: &str| &tables.iter().find(|(n, _)| n == name).unwrap().1;

    let src = grid.at(0, 0).unwrap();
    let dst = grid.at(2, 3).unwrap();
    let mut cur = src.to_string();
    let mut hops = 0;
    while cur != dst {
        let next = table_of(&cur).next_hop(dst).unwrap().to_string();
        assert!(topo.router(&cur).unwrap().is_connected_to(&next));
        cur = next;
        hops += 1;
    }
    assert_eq!(hops, 2 + 3);
}
