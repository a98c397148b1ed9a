use chrono::{Duration, NaiveDate, NaiveDateTime};
use hydrostreamer_common::structures::{Point2D, Polygon, Polyline};
use hydrostreamer_routing::metrics::stream_orders;
use hydrostreamer_routing::{
    accumulate_runoff, build_topology, read_network, transplant_topology, upstream, write_network,
    ConstantVelocity, ErrorKind, LagPolicy, NetworkError, RiverId, RiverNetwork, RoutingMethod,
    Segment, SegmentLinks, TimeSeries, TopologyOptions,
};
use std::collections::HashMap;

fn t0() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2001, 3, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

fn hourly(values: &[f64]) -> TimeSeries {
    TimeSeries::regular(t0(), Duration::hours(1), values.to_vec()).unwrap()
}

fn line(id: &str, coords: &[(f64, f64)]) -> Segment {
    Segment::line(id, Polyline::from_coords(coords))
}

fn id(s: &str) -> RiverId {
    RiverId::from(s)
}

fn names(ids: Vec<&RiverId>) -> Vec<&str> {
    ids.into_iter().map(|id| id.as_str()).collect()
}

fn close(a: &[f64], b: &[f64]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| (x - y).abs() < 1e-9)
}

/// A -> B -> C with tributary D -> B. Every reach is 3600 m long.
fn confluence() -> Vec<Segment> {
    vec![
        line("A", &[(0.0, 7200.0), (0.0, 3600.0)]).with_runoff("era5", hourly(&[1.0, 0.0, 0.0, 0.0])),
        line("B", &[(0.0, 3600.0), (0.0, 0.0)]).with_runoff("era5", hourly(&[0.5, 0.5, 0.5, 0.5])),
        line("C", &[(0.0, 0.0), (0.0, -3600.0)]).with_runoff("era5", hourly(&[0.0, 0.0, 0.0, 0.0])),
        line("D", &[(3600.0, 3600.0), (0.0, 3600.0)]).with_runoff("era5", hourly(&[2.0, 2.0, 0.0, 0.0])),
    ]
}

fn discharge<'a>(network: &'a RiverNetwork, s: &str) -> &'a [f64] {
    network.get(&id(s)).unwrap().discharge["era5"].values()
}

#[test]
fn test_confluence_topology() {
    let network = build_topology(confluence(), &TopologyOptions::default()).unwrap();
    assert_eq!(names(network.previous(&id("B")).unwrap()), vec!["A", "D"]);
    assert_eq!(names(network.upstream_segments(&id("C")).unwrap()), vec!["A", "B", "D"]);
    assert_eq!(network.next(&id("C")).unwrap(), None);

    // no segment is its own ancestor; every non-outlet has one successor
    for seg in network.iter() {
        let up = network.upstream_segments(&seg.id).unwrap();
        assert!(!up.contains(&&seg.id));
        let is_outlet = network.next(&seg.id).unwrap().is_none();
        assert_eq!(is_outlet, seg.id == id("C"));
    }
}

#[test]
fn test_topology_is_idempotent() {
    let once = build_topology(confluence(), &TopologyOptions::default()).unwrap();
    let twice = once.build_topology(&TopologyOptions::default()).unwrap();
    assert_eq!(once.topology(), twice.topology());
}

#[test]
fn test_instant_routing_conserves_runoff() {
    let network = build_topology(confluence(), &TopologyOptions::default()).unwrap();
    let routed = accumulate_runoff(&network, &RoutingMethod::Instant).unwrap();
    assert!(close(discharge(&routed, "B"), &[3.5, 2.5, 0.5, 0.5]));
    assert!(close(discharge(&routed, "C"), &[3.5, 2.5, 0.5, 0.5]));

    let runoff_total: f64 = routed
        .iter()
        .map(|s| s.runoff["era5"].sum())
        .sum();
    let outlet_total: f64 = discharge(&routed, "C").iter().sum();
    assert!((runoff_total - outlet_total).abs() < 1e-9);
}

#[test]
fn test_constant_velocity_lags_one_step_per_reach() {
    let network = build_topology(confluence(), &TopologyOptions::default()).unwrap();
    let method = RoutingMethod::Constant(ConstantVelocity::new(1.0));
    let routed = accumulate_runoff(&network, &method).unwrap();
    // Q_B[t] = r_B[t] + Q_A[t-1] + Q_D[t-1]
    assert!(close(discharge(&routed, "B"), &[0.5, 3.5, 2.5, 0.5]));
    assert!(close(discharge(&routed, "C"), &[0.0, 0.5, 3.5, 2.5]));
}

#[test]
fn test_fractional_lag_policies() {
    let segments = vec![
        line("A", &[(0.0, 0.0), (5400.0, 0.0)]).with_runoff("era5", hourly(&[4.0, 0.0, 0.0, 0.0])),
        line("B", &[(5400.0, 0.0), (9000.0, 0.0)]).with_runoff("era5", hourly(&[0.0; 4])),
    ];
    let network = build_topology(segments, &TopologyOptions::default()).unwrap();

    // 5400 m at 1 m/s is 1.5 hourly steps
    let linear = RoutingMethod::Constant(ConstantVelocity::new(1.0));
    let routed = accumulate_runoff(&network, &linear).unwrap();
    assert!(close(discharge(&routed, "B"), &[0.0, 2.0, 2.0, 0.0]));

    let floor = RoutingMethod::Constant(ConstantVelocity::new(1.0).with_lag(LagPolicy::Floor));
    let routed = accumulate_runoff(&network, &floor).unwrap();
    assert!(close(discharge(&routed, "B"), &[0.0, 4.0, 0.0, 0.0]));

    let nearest = RoutingMethod::Constant(ConstantVelocity::new(1.0).with_lag(LagPolicy::Nearest));
    let routed = accumulate_runoff(&network, &nearest).unwrap();
    assert!(close(discharge(&routed, "B"), &[0.0, 0.0, 4.0, 0.0]));
}

#[test]
fn test_routing_builds_missing_topology() {
    let network = RiverNetwork::new(confluence()).unwrap();
    let routed = accumulate_runoff(&network, &RoutingMethod::Instant).unwrap();
    assert!(routed.has_topology());
    assert!(close(discharge(&routed, "C"), &[3.5, 2.5, 0.5, 0.5]));
}

#[test]
fn test_series_length_mismatch_fails() {
    let twelve = TimeSeries::regular(t0(), Duration::hours(1), vec![1.0; 12]).unwrap();
    let ten = TimeSeries::regular(t0(), Duration::hours(1), vec![1.0; 10]).unwrap();
    let network = RiverNetwork::new(vec![
        line("A", &[(0.0, 0.0), (1.0, 0.0)]).with_runoff("era5", twelve),
        line("B", &[(1.0, 0.0), (2.0, 0.0)]).with_runoff("era5", ten),
    ])
    .unwrap();
    match accumulate_runoff(&network, &RoutingMethod::Instant) {
        Err(e @ NetworkError::SeriesMismatch { .. }) => {
            assert_eq!(e.kind(), ErrorKind::Schema);
            assert!(e.to_string().contains("expected 12 timesteps, found 10"));
        }
        other => panic!("unexpected result {:?}", other),
    }
}

#[test]
fn test_upstream_subnetwork() {
    let mut segments = confluence();
    segments.push(line("E", &[(0.0, -3600.0), (0.0, -7200.0)]).with_runoff("era5", hourly(&[0.0; 4])));
    let network = build_topology(segments, &TopologyOptions::default()).unwrap();
    let sub = upstream(&network, &id("C")).unwrap();
    assert_eq!(names(sub.ids().collect()), vec!["A", "B", "C", "D"]);
    assert_eq!(names(sub.outlets().unwrap()), vec!["C"]);
    for seg in sub.iter() {
        if let Some(next) = sub.next(&seg.id).unwrap() {
            assert!(sub.contains(next));
        }
    }
    // the input network is untouched
    assert_eq!(network.next(&id("C")).unwrap(), Some(&id("E")));
}

#[test]
fn test_geometric_cycle_is_topology_error() {
    let segments = vec![
        line("A", &[(0.0, 0.0), (1.0, 0.0)]),
        line("B", &[(1.0, 0.0), (0.0, 0.0)]),
    ];
    let err = build_topology(segments, &TopologyOptions::default()).unwrap_err();
    assert!(matches!(err, NetworkError::CyclicTopology { .. }));
    assert_eq!(err.kind(), ErrorKind::Topology);
}

#[test]
fn test_linked_cycle_is_topology_error() {
    let segments = vec![line("A", &[(0.0, 0.0), (1.0, 0.0)]), line("B", &[(5.0, 5.0), (6.0, 6.0)])];
    let mut links = HashMap::new();
    links.insert(id("A"), SegmentLinks::draining_to("B").with_previous(["B"]));
    links.insert(id("B"), SegmentLinks::draining_to("A").with_previous(["A"]));
    let err = RiverNetwork::with_links(segments, &links).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Topology);
}

fn catchments() -> Vec<Segment> {
    let square = |x0: f64| {
        Polygon::new(&[
            Point2D::new(x0, 0.0),
            Point2D::new(x0 + 10.0, 0.0),
            Point2D::new(x0 + 10.0, 10.0),
            Point2D::new(x0, 10.0),
        ])
    };
    // deliberately in a different order from the river lines
    vec![
        Segment::polygon("D", square(30.0)).with_runoff("era5", hourly(&[2.0, 2.0, 0.0, 0.0])),
        Segment::polygon("C", square(20.0)).with_runoff("era5", hourly(&[0.0; 4])),
        Segment::polygon("B", square(10.0)).with_runoff("era5", hourly(&[0.5; 4])),
        Segment::polygon("A", square(0.0)).with_runoff("era5", hourly(&[1.0, 0.0, 0.0, 0.0])),
    ]
}

#[test]
fn test_catchments_need_borrowed_topology() {
    let network = RiverNetwork::new(catchments()).unwrap();
    let err = accumulate_runoff(&network, &RoutingMethod::Instant).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingAttribute);

    let rivers = build_topology(confluence(), &TopologyOptions::default()).unwrap();
    let network = transplant_topology(&rivers, catchments()).unwrap();
    let method = RoutingMethod::Constant(ConstantVelocity::new(1.0));
    let routed = accumulate_runoff(&network, &method).unwrap();
    assert!(close(discharge(&routed, "C"), &[0.0, 0.5, 3.5, 2.5]));
}

#[test]
fn test_stream_orders_on_confluence() {
    let network = build_topology(confluence(), &TopologyOptions::default()).unwrap();
    let orders = stream_orders(&network).unwrap();
    let strahler: Vec<usize> = orders.iter().map(|o| o.strahler).collect();
    let shreve: Vec<usize> = orders.iter().map(|o| o.shreve).collect();
    assert_eq!(strahler, vec![1, 2, 2, 1]);
    assert_eq!(shreve, vec![1, 2, 2, 1]);
}

#[test]
fn test_write_and_read_network() {
    let network = build_topology(confluence(), &TopologyOptions::default()).unwrap();
    let routed = accumulate_runoff(&network, &RoutingMethod::Instant).unwrap();

    let path = std::env::temp_dir().join(format!("hydrostreamer_routing_{}.json", std::process::id()));
    write_network(&routed, &path).unwrap();
    let reread = read_network(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert!(reread.has_topology());
    assert_eq!(reread.topology(), routed.topology());
    assert!(close(discharge(&reread, "C"), discharge(&routed, "C")));
}

#[test]
fn test_read_missing_file() {
    let err = read_network("/nonexistent/rivers.json").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
}

#[test]
fn test_constant_velocity_needs_reach_lengths() {
    // linked catchments without a length have nothing to travel along
    let mut links = HashMap::new();
    links.insert(id("D"), SegmentLinks::draining_to("B"));
    links.insert(id("C"), SegmentLinks::outlet().with_previous(["B"]));
    links.insert(id("B"), SegmentLinks::draining_to("C").with_previous(["A", "D"]));
    links.insert(id("A"), SegmentLinks::draining_to("B"));
    let network = RiverNetwork::with_links(catchments(), &links).unwrap();

    let method = RoutingMethod::Constant(ConstantVelocity::new(1.0));
    match accumulate_runoff(&network, &method) {
        Err(e @ NetworkError::MissingAttribute { .. }) => {
            assert_eq!(e.kind(), ErrorKind::MissingAttribute);
            assert!(e.to_string().contains("length"));
        }
        other => panic!("unexpected result {:?}", other),
    }
    // instant routing has no use for lengths
    let routed = accumulate_runoff(&network, &RoutingMethod::Instant).unwrap();
    assert!(close(discharge(&routed, "C"), &[3.5, 2.5, 0.5, 0.5]));
}

#[test]
fn test_disconnected_basins_route_independently() {
    let mut segments = confluence();
    segments.push(line("X", &[(9000.0, 3600.0), (9000.0, 0.0)]).with_runoff("era5", hourly(&[1.0, 1.0, 0.0, 0.0])));
    segments.push(line("Y", &[(9000.0, 0.0), (9000.0, -3600.0)]).with_runoff("era5", hourly(&[0.0, 0.0, 0.0, 1.0])));
    let network = build_topology(segments, &TopologyOptions::default()).unwrap();
    assert_eq!(names(network.outlets().unwrap()), vec!["C", "Y"]);
    assert_eq!(names(network.upstream_segments(&id("Y")).unwrap()), vec!["X"]);

    let method = RoutingMethod::Constant(ConstantVelocity::new(1.0));
    let routed = accumulate_runoff(&network, &method).unwrap();
    assert!(close(discharge(&routed, "C"), &[0.0, 0.5, 3.5, 2.5]));
    assert!(close(discharge(&routed, "Y"), &[0.0, 1.0, 1.0, 1.0]));
}
