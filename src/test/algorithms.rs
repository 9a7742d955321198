use rand::SeedableRng;
use rand::rngs::StdRng;

use super::line_of;
use crate::SimError;
use crate::algorithm::{RoutingAlgorithm, choose_neighbor};
use crate::net::{Packet, PacketId, Topology};
use crate::sim::{DropReason, StepEvent, StepResult};
use crate::topo::ring::{RingOpts, build_ring};
use crate::topo::star::{StarOpts, build_star};

type Snapshot = (Vec<(String, u64, Vec<String>, bool)>, Vec<(String, Vec<u64>)>);

fn snapshot(topo: &Topology) -> Snapshot {
    let mut packets: Vec<_> = topo
        .packets()
        .map(|(r, p)| (r.to_string(), p.id().0, p.history().to_vec(), p.is_stale()))
        .collect();
    packets.sort();
    let seen = topo
        .routers()
        .map(|r| {
            let mut ids: Vec<u64> = r.seen_packet_ids().iter().map(|id| id.0).collect();
            ids.sort();
            (r.name().to_string(), ids)
        })
        .collect();
    (packets, seen)
}

fn place(topo: &mut Topology, id: u64, src: &str, dst: &str) {
    topo.inject_packet_copy(Packet::new(PacketId(id), src, dst), src)
        .unwrap();
}

fn run(alg: RoutingAlgorithm, topo: &mut Topology, step: u64, rng: &mut StdRng) -> StepResult {
    alg.step(step, topo, rng).unwrap()
}

fn drops(result: &StepResult, reason: DropReason) -> usize {
    result
        .dropped()
        .filter(|ev| matches!(ev, StepEvent::Dropped { reason: r, .. } if *r == reason))
        .count()
}

#[test]
fn flooding_between_two_routers_makes_no_copies() {
    let mut topo = line_of(&["A", "B"]);
    let mut rng = StdRng::seed_from_u64(0);
    place(&mut topo, 0, "A", "B");

    let s1 = run(RoutingAlgorithm::Flooding, &mut topo, 1, &mut rng);
    assert_eq!(s1.transmitted(), 1);
    assert_eq!(s1.messages(), vec!["A sent P0 to B".to_string()]);
    assert_eq!(topo.packet_count(), 1);

    let s2 = run(RoutingAlgorithm::Flooding, &mut topo, 2, &mut rng);
    assert_eq!(s2.transmitted(), 0);
    assert_eq!(
        s2.messages(),
        vec!["P0 reached its destination B.".to_string()]
    );
    assert_eq!(topo.packet_count(), 0);
}

#[test]
fn flooding_branches_at_hub_and_dead_ends_at_spokes() {
    let mut topo = Topology::new();
    build_star(&mut topo, &StarOpts { routers: 5 }).unwrap();
    let mut rng = StdRng::seed_from_u64(0);
    place(&mut topo, 0, "R1", "R4");

    let s1 = run(RoutingAlgorithm::Flooding, &mut topo, 1, &mut rng);
    assert_eq!(s1.transmitted(), 1);

    // 中心节点向其余三个未访问的叶子各发一份
    let s2 = run(RoutingAlgorithm::Flooding, &mut topo, 2, &mut rng);
    assert_eq!(s2.transmitted(), 3);
    assert_eq!(topo.packet_count(), 3);
    assert!(topo.packets().all(|(_, p)| p.id() == PacketId(0)));

    let s3 = run(RoutingAlgorithm::Flooding, &mut topo, 3, &mut rng);
    assert_eq!(s3.received().count(), 1);
    assert_eq!(drops(&s3, DropReason::DeadEnd), 2);
    assert!(s3.messages().contains(&"R2 dropped P0".to_string()));
    assert_eq!(topo.packet_count(), 0);
}

#[test]
fn flooding_drops_second_arrival_at_destination() {
    let mut topo = Topology::new();
    build_ring(&mut topo, &RingOpts { routers: 4 }).unwrap();
    let mut rng = StdRng::seed_from_u64(0);
    place(&mut topo, 0, "R0", "R2");

    assert_eq!(run(RoutingAlgorithm::Flooding, &mut topo, 1, &mut rng).transmitted(), 2);
    assert_eq!(run(RoutingAlgorithm::Flooding, &mut topo, 2, &mut rng).transmitted(), 2);

    let s3 = run(RoutingAlgorithm::Flooding, &mut topo, 3, &mut rng);
    assert_eq!(s3.received().count(), 1);
    assert_eq!(drops(&s3, DropReason::DuplicateDelivery), 1);
    assert_eq!(topo.packet_count(), 0);
}

#[test]
fn flooding_drops_branches_revisiting_a_router() {
    // A - B - C - D，外加 A - C
    let mut topo = line_of(&["A", "B", "C", "D"]);
    topo.add_edge("A", "C").unwrap();
    let mut rng = StdRng::seed_from_u64(0);
    place(&mut topo, 0, "A", "D");

    run(RoutingAlgorithm::Flooding, &mut topo, 1, &mut rng);
    run(RoutingAlgorithm::Flooding, &mut topo, 2, &mut rng);
    let s3 = run(RoutingAlgorithm::Flooding, &mut topo, 3, &mut rng);

    assert_eq!(drops(&s3, DropReason::Repeated), 2);
    assert_eq!(s3.received().count(), 1);
    match s3.received().next() {
        Some(StepEvent::Received { hops, .. }) => assert_eq!(*hops, 2),
        other => panic!("unexpected event {other:?}"),
    }
    assert_eq!(topo.packet_count(), 0);
}

#[test]
fn only_flooding_suppresses_duplicates() {
    assert!(RoutingAlgorithm::Flooding.suppresses_duplicates());
    assert!(!RoutingAlgorithm::RandomPath.suppresses_duplicates());
    assert!(!RoutingAlgorithm::ShortestPath.suppresses_duplicates());
}

#[test]
fn choose_neighbor_is_roughly_uniform() {
    let mut topo = Topology::new();
    build_star(&mut topo, &StarOpts { routers: 5 }).unwrap();
    let hub = topo.router("R0").unwrap();
    let mut rng = StdRng::seed_from_u64(7);

    let mut counts = std::collections::BTreeMap::new();
    for _ in 0..4000 {
        let n = choose_neighbor(hub, &mut rng).unwrap();
        *counts.entry(n.to_string()).or_insert(0u32) += 1;
    }
    assert_eq!(counts.len(), 4);
    for (name, c) in &counts {
        assert!((800..1200).contains(c), "{name} chosen {c} times");
    }

    let mut lonely = Topology::new();
    lonely.add_router("X").unwrap();
    assert_eq!(choose_neighbor(lonely.router("X").unwrap(), &mut rng), None);
}

#[test]
fn random_path_with_single_neighbor_is_deterministic() {
    let mut topo = line_of(&["A", "B"]);
    let mut rng = StdRng::seed_from_u64(3);
    place(&mut topo, 0, "A", "B");

    let s1 = run(RoutingAlgorithm::RandomPath, &mut topo, 1, &mut rng);
    assert_eq!(s1.messages(), vec!["A sent P0 to B".to_string()]);
    let s2 = run(RoutingAlgorithm::RandomPath, &mut topo, 2, &mut rng);
    assert_eq!(s2.received().count(), 1);
}

#[test]
fn shortest_path_delivers_along_the_line() {
    let mut topo = line_of(&["A", "B", "C", "D"]);
    let mut rng = StdRng::seed_from_u64(0);
    let alg = RoutingAlgorithm::ShortestPath;
    alg.build_routing_tables(&mut topo).unwrap();
    assert_eq!(topo.router("A").unwrap().next_hop("D"), Some("B"));
    place(&mut topo, 0, "A", "D");

    for step in 1..=3 {
        let r = run(alg, &mut topo, step, &mut rng);
        assert_eq!(r.transmitted(), 1);
        assert_eq!(r.received().count(), 0);
    }
    let r = run(alg, &mut topo, 4, &mut rng);
    assert_eq!(
        r.events(),
        &[StepEvent::Received {
            packet: PacketId(0),
            source: "A".into(),
            destination: "D".into(),
            hops: 3,
        }]
    );
}

#[test]
fn shortest_path_without_tables_reports_missing_route() {
    let mut topo = line_of(&["A", "B"]);
    place(&mut topo, 0, "A", "B");
    let err = RoutingAlgorithm::ShortestPath
        .step(1, &mut topo, &mut StdRng::seed_from_u64(0))
        .unwrap_err();
    assert_eq!(
        err,
        SimError::NoRoute {
            from: "A".into(),
            to: "B".into()
        }
    );
}

#[test]
fn undo_reverses_flooding_branches_exactly() {
    let mut topo = line_of(&["A", "B", "C", "D"]);
    topo.add_edge("A", "C").unwrap();
    let mut rng = StdRng::seed_from_u64(0);
    place(&mut topo, 0, "A", "D");

    let mut history = vec![snapshot(&topo)];
    for step in 1..=3 {
        run(RoutingAlgorithm::Flooding, &mut topo, step, &mut rng);
        history.push(snapshot(&topo));
    }
    history.pop();
    while let Some(expected) = history.pop() {
        RoutingAlgorithm::Flooding.undo_step(&mut topo);
        assert_eq!(snapshot(&topo), expected);
    }
}

#[test]
fn algorithm_names_parse_and_display() {
    for alg in RoutingAlgorithm::ALL {
        assert_eq!(alg.to_string().parse::<RoutingAlgorithm>(), Ok(alg));
    }
    assert_eq!("Random Path".parse::<RoutingAlgorithm>(), Ok(RoutingAlgorithm::RandomPath));
    assert_eq!("shortest-path".parse::<RoutingAlgorithm>(), Ok(RoutingAlgorithm::ShortestPath));
    assert_eq!(
        "dijkstra".parse::<RoutingAlgorithm>(),
        Err(SimError::UnknownAlgorithm("dijkstra".into()))
    );
}
