use crate::algorithm::RoutingAlgorithm;
use crate::sim::{SimOpts, Simulation};
use crate::viz::{VizEventKind, VizLogger};

use super::line_of;

#[test]
fn viz_records_meta_steps_and_undo() {
    let mut sim = Simulation::new(&SimOpts {
        seed: 2,
        ..SimOpts::default()
    }).unwrap();
    sim.set_topology(line_of(&["A", "B", "C"]));
    sim.set_routing_algorithm(RoutingAlgorithm::Flooding);

    let mut viz = VizLogger::default();
    viz.emit_meta(&sim);
    let (_, rx) = sim.subscribe();

    sim.step().unwrap();
    sim.step().unwrap();
    sim.undo_step();
    for n in rx.try_iter() {
        viz.observe(&n);
    }

    assert_eq!(viz.events.len(), 4);
    match &viz.events[0].kind {
        VizEventKind::Meta {
            routers,
            edges,
            algorithm,
            rate,
        } => {
            assert_eq!(routers, &vec!["A", "B", "C"]);
            assert_eq!(edges.len(), 2);
            assert_eq!(*algorithm, Some(RoutingAlgorithm::Flooding));
            assert_eq!(*rate, 1);
        }
        other => panic!("expected meta first, got {other:?}"),
    }
    assert!(matches!(viz.events[1].kind, VizEventKind::Step { .. }));
    assert_eq!(viz.events[2].step, 2);
    assert!(matches!(viz.events[3].kind, VizEventKind::Undo));
    assert_eq!(viz.events[3].step, 2);

    let json = serde_json::to_value(&viz.events).unwrap();
    assert_eq!(json[0]["kind"], "meta");
    assert_eq!(json[0]["algorithm"], "flooding");
    assert_eq!(json[1]["kind"], "step");
    assert_eq!(json[1]["step"], 1);
    assert_eq!(json[1]["events"][0]["kind"], "injected");
    assert_eq!(json[3]["kind"], "undo");
}
