use super::*;

#[test]
fn single_source_in_a_single_node() {
    let mut graph = CorridorGraph::new();
    graph.add_node(0.0, 1000.0, 0.0, 1000.0).unwrap();

    let track = compute(
        graph,
        vec![source("s1", 100.0, 500.0, 50)],
        destination("stack", 900.0, 500.0, 100),
    )
    .unwrap();

    // One lead-in segment from the source point to its entry point (zero
    // length here, the source lies inside the corridor) and one run to the
    // destination center.
    assert_eq!(track.len(), 2);
    assert_segment(&track, 0, (100.0, 500.0), (100.0, 500.0));
    assert_segment(&track, 1, (100.0, 500.0), (900.0, 500.0));
    assert_eq!(track.nodes()[1].diameter, 50);
}

#[test]
fn trace_cost_sums_segment_lengths() {
    let mut graph = CorridorGraph::new();
    graph.add_node(0.0, 1000.0, 0.0, 1000.0).unwrap();

    let track = compute(
        graph,
        vec![source("s1", 100.0, 500.0, 50)],
        destination("stack", 900.0, 500.0, 100),
    )
    .unwrap();

    // 800 mm of 50 mm pipe at 0.5 per mm; the zero-length lead-in is free.
    assert_eq!(track.cost(&catalog()), 400.0);
}

#[test]
fn source_outside_the_corridor_gets_a_lead_in() {
    let mut graph = CorridorGraph::new();
    graph.add_node(0.0, 1000.0, 0.0, 1000.0).unwrap();

    let track = compute(
        graph,
        vec![source("s1", -40.0, 500.0, 50)],
        destination("stack", 900.0, 500.0, 100),
    )
    .unwrap();

    // The entry point is snapped 30 mm inside the left edge; the lead-in
    // spans from the source point to it.
    assert_eq!(track.len(), 2);
    assert_segment(&track, 0, (-40.0, 500.0), (30.0, 500.0));
    assert_segment(&track, 1, (30.0, 500.0), (900.0, 500.0));
}

#[test]
fn right_angle_corridor_bends_at_the_shared_edge() {
    let mut graph = CorridorGraph::new();
    graph.add_node(0.0, 500.0, 0.0, 500.0).unwrap();
    graph.add_node(0.0, 500.0, 500.0, 1000.0).unwrap();
    graph.auto_connect().unwrap();

    let track = compute(
        graph,
        vec![source("s1", 100.0, 100.0, 50)],
        destination("stack", 250.0, 900.0, 50),
    )
    .unwrap();

    // The crossing point sits one clearance radius past the shared edge
    // (y = 500 + 30), keeping the feasible x of the entry point.
    assert_eq!(track.len(), 3);
    assert_segment(&track, 0, (100.0, 100.0), (100.0, 100.0));
    assert_segment(&track, 1, (100.0, 100.0), (100.0, 530.0));
    assert_segment(&track, 2, (100.0, 530.0), (250.0, 900.0));
}

#[test]
fn crossing_clamps_to_the_shared_range() {
    let mut graph = CorridorGraph::new();
    graph.add_node(0.0, 500.0, 0.0, 500.0).unwrap();
    // The upper node only covers x in [400, 500].
    graph.add_node(400.0, 500.0, 500.0, 1000.0).unwrap();
    graph.auto_connect().unwrap();

    let track = compute(
        graph,
        vec![source("s1", 100.0, 100.0, 50)],
        destination("stack", 450.0, 900.0, 40),
    )
    .unwrap();

    // Shared x range is [400, 500]; the entry x = 100 clamps to 400 + 30.
    assert_eq!(track.len(), 3);
    assert_segment(&track, 1, (100.0, 100.0), (430.0, 530.0));
    assert_segment(&track, 2, (430.0, 530.0), (450.0, 900.0));
}

#[test]
fn source_z_is_ignored_in_the_plan() {
    let mut graph = CorridorGraph::new();
    graph.add_node(0.0, 1000.0, 0.0, 1000.0).unwrap();

    let mut s = source("s1", 100.0, 500.0, 50);
    s.point = Point::new(100.0, 500.0, 300.0);
    let track = compute(graph, vec![s], destination("stack", 900.0, 500.0, 100)).unwrap();

    for node in track.nodes() {
        assert_eq!(node.start.z, 0.0);
        assert_eq!(node.end.z, 0.0);
    }
}
