use rand::SeedableRng;
use rand::rngs::StdRng;

use super::line_of;
use crate::SimError;
use crate::net::{Edge, PacketId, Topology, TopologyEvent};
use crate::sim::Notification;

#[test]
fn add_router_reports_duplicates_and_empty_names() {
    let mut topo = Topology::new();
    assert_eq!(topo.add_router("A"), Ok(true));
    assert_eq!(topo.add_router("A"), Ok(false));
    assert_eq!(topo.add_router(""), Err(SimError::EmptyRouterName));
    assert_eq!(topo.len(), 1);
}

#[test]
fn add_edge_validates_endpoints() {
    let mut topo = line_of(&["A", "B"]);
    assert_eq!(topo.edge_count(), 1);
    assert_eq!(topo.add_edge("B", "A"), Ok(false));
    assert_eq!(
        topo.add_edge("A", "Z"),
        Err(SimError::UnknownRouter("Z".to_string()))
    );
    assert_eq!(topo.add_edge("A", "A"), Err(SimError::SelfLoop("A".to_string())));
    assert_eq!(topo.edge_count(), 1);

    assert_eq!(topo.remove_edge("A", "B"), Ok(true));
    assert_eq!(topo.remove_edge("A", "B"), Ok(false));
    assert!(!topo.has_edges());
    assert!(topo.neighbors("A").unwrap().is_empty());
}

#[test]
fn removing_router_severs_its_edges() {
    let mut topo = line_of(&["A", "B", "C"]);
    assert!(topo.is_valid());

    assert!(topo.remove_router("B"));
    assert!(!topo.remove_router("B"));
    assert_eq!(topo.edge_count(), 0);
    assert!(topo.neighbors("A").unwrap().is_empty());
    assert!(topo.neighbors("C").unwrap().is_empty());
    assert!(!topo.is_valid());
}

#[test]
fn validity_needs_two_connected_routers() {
    let mut topo = Topology::new();
    assert!(!topo.is_valid());
    topo.add_router("A").unwrap();
    assert!(!topo.is_valid());
    topo.add_router("B").unwrap();
    assert!(!topo.is_valid());
    topo.add_edge("A", "B").unwrap();
    assert!(topo.is_valid());
    topo.add_router("C").unwrap();
    assert!(!topo.is_valid());
}

#[test]
fn edges_are_listed_once_in_name_order() {
    let mut topo = line_of(&["C", "A", "B"]);
    topo.add_edge("A", "B").unwrap();
    let edges = topo.edges();
    assert_eq!(
        edges,
        vec![
            Edge {
                a: "A".into(),
                b: "B".into()
            },
            Edge {
                a: "A".into(),
                b: "C".into()
            },
        ]
    );
    assert_eq!(edges.len(), topo.edge_count());
}

#[test]
fn inject_packet_picks_distinct_endpoints() {
    let mut rng = StdRng::seed_from_u64(42);

    let mut lonely = line_of(&["A"]);
    assert_eq!(
        lonely.inject_packet(PacketId(0), &mut rng),
        Err(SimError::TooFewRouters { count: 1 })
    );

    let mut topo = line_of(&["A", "B", "C"]);
    for i in 0..50 {
        let p = topo.inject_packet(PacketId(i), &mut rng).unwrap();
        assert_ne!(p.source(), p.destination());
        assert_eq!(p.hops(), 0);
        assert!(p.is_stale());
        assert!(
            topo.router(p.source())
                .unwrap()
                .packets()
                .iter()
                .any(|q| q.id() == p.id())
        );
    }
    assert_eq!(topo.packet_count(), 50);

    topo.reset_packets();
    assert_eq!(topo.packet_count(), 0);
}

#[test]
fn subscribers_see_structural_and_packet_events() {
    let mut topo = Topology::new();
    let (_, rx) = topo.subscribe();

    topo.add_router("A").unwrap();
    topo.add_router("B").unwrap();
    topo.add_edge("A", "B").unwrap();
    topo.inject_packet(PacketId(0), &mut StdRng::seed_from_u64(1))
        .unwrap();
    topo.remove_router("A");

    let events: Vec<TopologyEvent> = rx
        .try_iter()
        .filter_map(|n| match n {
            Notification::Topology(ev) => Some(ev),
            Notification::Simulation(_) => None,
        })
        .collect();

    assert_eq!(
        events[0],
        TopologyEvent::RouterAdded {
            router: "A".into(),
            router_count: 1
        }
    );
    assert_eq!(
        events[2],
        TopologyEvent::EdgeAdded {
            routers: ("A".into(), "B".into()),
            edge_count: 1
        }
    );
    assert!(matches!(events[3], TopologyEvent::PacketInjected { .. }));
    assert_eq!(
        events[4],
        TopologyEvent::EdgeRemoved {
            routers: ("A".into(), "B".into()),
            edge_count: 0
        }
    );
    assert_eq!(
        events[5],
        TopologyEvent::RouterRemoved {
            router: "A".into(),
            router_count: 1
        }
    );
    assert_eq!(events.iter().filter(|e| e.is_structural()).count(), 5);
}

#[test]
fn dropped_receiver_unsubscribes_silently() {
    let mut topo = Topology::new();
    let (id, rx) = topo.subscribe();
    drop(rx);
    topo.add_router("A").unwrap();
    assert!(!topo.unsubscribe(id));
}
