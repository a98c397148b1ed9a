/*
This code is part of the HydroStreamer river routing library.
Authors: HydroStreamer developers
Created: 16/10/2026
Last Modified: 16/10/2026
License: MIT
*/

//! Downstream accumulation of segment runoff into discharge.
//!
//! Segments are visited level by level (see [`Topology::levels`]): every
//! segment of a level only depends on segments of lower levels, so each
//! level is computed in parallel and its results are stored before the next
//! level starts. Each discharge series is therefore written exactly once,
//! after all of its inputs are final.

mod lag;

pub use self::lag::LagPolicy;

use crate::error::{NetworkError, Result};
use crate::network::{RiverNetwork, Topology, TopologyOptions};
use crate::segment::Segment;
use crate::timeseries::TimeSeries;
use log::{debug, info};
use rayon::prelude::*;
use std::fmt;

/// Parameters of constant-velocity routing.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ConstantVelocity {
    /// Flow velocity (m/s) for segments that carry none of their own.
    pub velocity: Option<f64>,
    /// Placement of fractional travel times on the timestep grid.
    pub lag: LagPolicy,
}

impl ConstantVelocity {
    pub fn new(velocity: f64) -> ConstantVelocity {
        ConstantVelocity {
            velocity: Some(velocity),
            lag: LagPolicy::default(),
        }
    }

    pub fn with_lag(mut self, lag: LagPolicy) -> ConstantVelocity {
        self.lag = lag;
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RoutingMethod {
    /// All upstream flow reaches the segment within the same timestep.
    Instant,
    /// Upstream flow is delayed by the travel time through each reach.
    Constant(ConstantVelocity),
}

impl fmt::Display for RoutingMethod {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RoutingMethod::Instant => write!(f, "instant"),
            RoutingMethod::Constant(_) => write!(f, "constant"),
        }
    }
}

/// Routes every runoff series of `network` downstream and returns a new
/// network whose segments also carry a discharge series of the same name.
///
/// The topology is derived from line geometry first if the network has none.
/// All segments must carry the same runoff series names on identical
/// timestamps. Nothing is returned on failure.
pub fn accumulate_runoff(network: &RiverNetwork, method: &RoutingMethod) -> Result<RiverNetwork> {
    let built;
    let network = if network.has_topology() {
        network
    } else {
        built = network.build_topology(&TopologyOptions::default())?;
        &built
    };
    let topology = network.require_topology()?;

    let series_names = check_series(network.segments())?;
    if series_names.is_empty() {
        return network.map_segments(|seg| {
            let mut seg = seg.clone();
            seg.discharge.clear();
            Ok(seg)
        });
    }

    // lags[s][p]: delay through segment p, in timesteps of series s
    let (lags, policy) = match method {
        RoutingMethod::Instant => (
            vec![vec![0f64; network.len()]; series_names.len()],
            LagPolicy::default(),
        ),
        RoutingMethod::Constant(params) => (travel_lags(network, params, &series_names)?, params.lag),
    };

    let mut discharge: Vec<Option<Vec<Vec<f64>>>> = vec![None; network.len()];
    for level in topology.levels() {
        let computed: Vec<(usize, Vec<Vec<f64>>)> = level
            .par_iter()
            .map(|&i| {
                (
                    i,
                    route_segment(i, network.segments(), topology, &discharge, &lags, policy, &series_names),
                )
            })
            .collect();
        for (i, q) in computed {
            discharge[i] = Some(q);
        }
    }

    let mut segments = Vec::with_capacity(network.len());
    for (seg, q) in network.iter().zip(discharge) {
        let q = q.ok_or_else(|| {
            NetworkError::InconsistentTopology(format!("segment {} was never routed", seg.id))
        })?;
        let mut seg = seg.clone();
        seg.discharge.clear();
        for (name, values) in series_names.iter().zip(q) {
            let series = seg.runoff[name].with_values(values)?;
            seg.discharge.insert(name.clone(), series);
        }
        segments.push(seg);
    }

    info!(
        "Routed {} series through {} segments ({} routing, {} dependency levels)",
        series_names.len(),
        network.len(),
        method,
        topology.levels().len()
    );

    Ok(network.with_segments(segments))
}

/// Discharge of segment `i` for every series: its own runoff plus the lagged
/// discharge of each immediate predecessor.
fn route_segment(
    i: usize,
    segments: &[Segment],
    topology: &Topology,
    discharge: &[Option<Vec<Vec<f64>>>],
    lags: &[Vec<f64>],
    policy: LagPolicy,
    series_names: &[String],
) -> Vec<Vec<f64>> {
    let mut ret = Vec::with_capacity(series_names.len());
    for (s, name) in series_names.iter().enumerate() {
        let mut q = segments[i].runoff[name].values().to_vec();
        for &p in topology.previous(i) {
            if let Some(upstream_q) = &discharge[p] {
                lag::add_lagged(&mut q, &upstream_q[s], lags[s][p], policy);
            }
        }
        ret.push(q);
    }
    ret
}

/// Checks that every segment carries the same runoff series names, each on
/// the timestamps of the first segment, and returns the names.
fn check_series(segments: &[Segment]) -> Result<Vec<String>> {
    let reference = match segments.first() {
        Some(seg) => seg,
        None => return Ok(vec![]),
    };
    let names: Vec<String> = reference.runoff.keys().cloned().collect();
    for seg in segments {
        for name in &names {
            let series = seg.runoff.get(name).ok_or_else(|| NetworkError::MissingSeries {
                id: seg.id.clone(),
                series: name.clone(),
            })?;
            let expected = &reference.runoff[name];
            if !series.is_aligned_with(expected) {
                return Err(NetworkError::SeriesMismatch {
                    id: seg.id.clone(),
                    series: name.clone(),
                    expected: expected.len(),
                    found: series.len(),
                });
            }
        }
        if let Some(extra) = seg.runoff.keys().find(|k| !reference.runoff.contains_key(*k)) {
            return Err(NetworkError::MissingSeries {
                id: reference.id.clone(),
                series: extra.clone(),
            });
        }
    }
    Ok(names)
}

/// Travel time through each segment, in timesteps of each series. Series
/// may differ in timestep, so every series gets its own lags.
fn travel_lags(
    network: &RiverNetwork,
    params: &ConstantVelocity,
    series_names: &[String],
) -> Result<Vec<Vec<f64>>> {
    let reference = &network.segments()[0];
    let mut timesteps = Vec::with_capacity(series_names.len());
    for name in series_names {
        let timestep = timestep_seconds(&reference.runoff[name]).ok_or_else(|| {
            NetworkError::InvalidTimeSeries(format!(
                "constant-velocity routing needs at least two evenly spaced timestamps in series '{}'",
                name
            ))
        })?;
        timesteps.push(timestep);
    }

    // seconds
    let mut travel_times = Vec::with_capacity(network.len());
    for seg in network.iter() {
        let length = seg
            .reach_length()
            .ok_or_else(|| NetworkError::missing_attribute(&seg.id, "length"))?;
        if !length.is_finite() || length < 0f64 {
            return Err(NetworkError::invalid_attribute(
                &seg.id,
                "length",
                format!("{} is not a non-negative length", length),
            ));
        }
        let velocity = seg
            .velocity
            .or(params.velocity)
            .ok_or_else(|| NetworkError::missing_attribute(&seg.id, "velocity"))?;
        if !velocity.is_finite() || velocity <= 0f64 {
            return Err(NetworkError::invalid_attribute(
                &seg.id,
                "velocity",
                format!("{} is not a positive velocity", velocity),
            ));
        }
        travel_times.push(length / velocity);
    }
    debug!(
        "Travel times range from {:.1} to {:.1} seconds",
        travel_times.iter().cloned().fold(f64::INFINITY, f64::min),
        travel_times.iter().cloned().fold(0f64, f64::max)
    );

    Ok(timesteps
        .iter()
        .map(|dt| travel_times.iter().map(|t| t / dt).collect())
        .collect())
}

fn timestep_seconds(series: &TimeSeries) -> Option<f64> {
    let step = series.timestep()?;
    let millis = step.num_milliseconds();
    if millis <= 0 {
        return None;
    }
    Some(millis as f64 / 1000f64)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::segment::RiverId;
    use chrono::{Duration, NaiveDate, NaiveDateTime};
    use hydrostreamer_common::structures::Polyline;

    fn t0() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2020, 6, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn hourly(values: &[f64]) -> TimeSeries {
        TimeSeries::regular(t0(), Duration::hours(1), values.to_vec()).unwrap()
    }

    fn reach(id: &str, coords: &[(f64, f64)], runoff: &[f64]) -> Segment {
        Segment::line(id, Polyline::from_coords(coords)).with_runoff("runoff", hourly(runoff))
    }

    fn discharge(network: &RiverNetwork, id: &str) -> Vec<f64> {
        network.get(&RiverId::from(id)).unwrap().discharge["runoff"]
            .values()
            .to_vec()
    }

    #[test]
    fn test_instant_chain() {
        let network = RiverNetwork::new(vec![
            reach("A", &[(0.0, 0.0), (3600.0, 0.0)], &[1.0, 2.0, 3.0]),
            reach("B", &[(3600.0, 0.0), (7200.0, 0.0)], &[0.5, 0.5, 0.5]),
        ])
        .unwrap();
        let routed = accumulate_runoff(&network, &RoutingMethod::Instant).unwrap();
        assert!(routed.has_topology());
        assert_eq!(discharge(&routed, "A"), vec![1.0, 2.0, 3.0]);
        assert_eq!(discharge(&routed, "B"), vec![1.5, 2.5, 3.5]);
        // input runoff is left alone
        let b = routed.get(&RiverId::from("B")).unwrap();
        assert_eq!(b.runoff["runoff"].values(), &[0.5, 0.5, 0.5]);
        assert!(network.get(&RiverId::from("B")).unwrap().discharge.is_empty());
    }

    #[test]
    fn test_constant_one_step_lag() {
        // 3600 m at 1 m/s is one hourly timestep
        let network = RiverNetwork::new(vec![
            reach("A", &[(0.0, 0.0), (3600.0, 0.0)], &[1.0, 2.0, 3.0]),
            reach("B", &[(3600.0, 0.0), (7200.0, 0.0)], &[0.5, 0.5, 0.5]),
        ])
        .unwrap();
        let method = RoutingMethod::Constant(ConstantVelocity::new(1.0));
        let routed = accumulate_runoff(&network, &method).unwrap();
        assert_eq!(discharge(&routed, "B"), vec![0.5, 1.5, 2.5]);
    }

    #[test]
    fn test_segment_velocity_overrides_default() {
        let network = RiverNetwork::new(vec![
            reach("A", &[(0.0, 0.0), (3600.0, 0.0)], &[1.0, 0.0, 0.0]).with_velocity(0.5),
            reach("B", &[(3600.0, 0.0), (7200.0, 0.0)], &[0.0, 0.0, 0.0]),
        ])
        .unwrap();
        let method = RoutingMethod::Constant(ConstantVelocity::new(1.0));
        let routed = accumulate_runoff(&network, &method).unwrap();
        assert_eq!(discharge(&routed, "B"), vec![0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_lags_follow_each_series_timestep() {
        // one hour of travel is one hourly step but 1/24 of a daily step
        let daily = |values: &[f64]| TimeSeries::regular(t0(), Duration::days(1), values.to_vec()).unwrap();
        let network = RiverNetwork::new(vec![
            Segment::line("A", Polyline::from_coords(&[(0.0, 0.0), (3600.0, 0.0)]))
                .with_runoff("a_hourly", hourly(&[1.0, 0.0, 0.0]))
                .with_runoff("b_daily", daily(&[24.0, 0.0, 0.0])),
            Segment::line("B", Polyline::from_coords(&[(3600.0, 0.0), (7200.0, 0.0)]))
                .with_runoff("a_hourly", hourly(&[0.0, 0.0, 0.0]))
                .with_runoff("b_daily", daily(&[0.0, 0.0, 0.0])),
        ])
        .unwrap();
        let method = RoutingMethod::Constant(ConstantVelocity::new(1.0));
        let routed = accumulate_runoff(&network, &method).unwrap();
        let b = routed.get(&RiverId::from("B")).unwrap();
        assert_eq!(b.discharge["a_hourly"].values(), &[0.0, 1.0, 0.0]);
        let expected = [23.0, 1.0, 0.0];
        for (q, e) in b.discharge["b_daily"].values().iter().zip(&expected) {
            assert!((q - e).abs() < 1e-9, "{} != {}", q, e);
        }
    }

    #[test]
    fn test_stale_discharge_replaced() {
        let mut a = reach("A", &[(0.0, 0.0), (1.0, 0.0)], &[1.0, 0.0]);
        a.discharge.insert("old".to_string(), hourly(&[9.0, 9.0]));
        let network = RiverNetwork::new(vec![a]).unwrap();
        let routed = accumulate_runoff(&network, &RoutingMethod::Instant).unwrap();
        let keys: Vec<&String> = routed.get(&RiverId::from("A")).unwrap().discharge.keys().collect();
        assert_eq!(keys, vec!["runoff"]);

        // without runoff there is nothing left to report
        let mut bare = Segment::line("A", Polyline::from_coords(&[(0.0, 0.0), (1.0, 0.0)]));
        bare.discharge.insert("old".to_string(), hourly(&[9.0, 9.0]));
        let routed = accumulate_runoff(&RiverNetwork::new(vec![bare]).unwrap(), &RoutingMethod::Instant).unwrap();
        assert!(routed.get(&RiverId::from("A")).unwrap().discharge.is_empty());
    }

    #[test]
    fn test_missing_velocity() {
        let network = RiverNetwork::new(vec![
            reach("A", &[(0.0, 0.0), (3600.0, 0.0)], &[1.0, 0.0]),
            reach("B", &[(3600.0, 0.0), (7200.0, 0.0)], &[0.0, 0.0]),
        ])
        .unwrap();
        let method = RoutingMethod::Constant(ConstantVelocity::default());
        match accumulate_runoff(&network, &method) {
            Err(NetworkError::MissingAttribute { attribute, .. }) => assert_eq!(attribute, "velocity"),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_invalid_velocity() {
        let network = RiverNetwork::new(vec![reach("A", &[(0.0, 0.0), (1.0, 0.0)], &[1.0, 0.0])]).unwrap();
        let method = RoutingMethod::Constant(ConstantVelocity::new(0.0));
        let err = accumulate_runoff(&network, &method).unwrap_err();
        assert!(matches!(err, NetworkError::InvalidAttribute { .. }));
    }

    #[test]
    fn test_constant_needs_timestep() {
        let network = RiverNetwork::new(vec![reach("A", &[(0.0, 0.0), (1.0, 0.0)], &[1.0])]).unwrap();
        let method = RoutingMethod::Constant(ConstantVelocity::new(1.0));
        let err = accumulate_runoff(&network, &method).unwrap_err();
        assert!(matches!(err, NetworkError::InvalidTimeSeries(_)));
        // instant routing has no such need
        assert!(accumulate_runoff(&network, &RoutingMethod::Instant).is_ok());
    }

    #[test]
    fn test_mismatched_series_names() {
        let network = RiverNetwork::new(vec![
            reach("A", &[(0.0, 0.0), (1.0, 0.0)], &[1.0, 0.0]),
            reach("B", &[(1.0, 0.0), (2.0, 0.0)], &[0.0, 0.0]).with_runoff("other", hourly(&[1.0, 1.0])),
        ])
        .unwrap();
        let err = accumulate_runoff(&network, &RoutingMethod::Instant).unwrap_err();
        assert!(matches!(err, NetworkError::MissingSeries { .. }));
    }

    #[test]
    fn test_shifted_timestamps_rejected() {
        let shifted = TimeSeries::regular(t0() + Duration::hours(1), Duration::hours(1), vec![0.0, 0.0]).unwrap();
        let network = RiverNetwork::new(vec![
            reach("A", &[(0.0, 0.0), (1.0, 0.0)], &[1.0, 0.0]),
            Segment::line("B", Polyline::from_coords(&[(1.0, 0.0), (2.0, 0.0)])).with_runoff("runoff", shifted),
        ])
        .unwrap();
        let err = accumulate_runoff(&network, &RoutingMethod::Instant).unwrap_err();
        assert!(matches!(err, NetworkError::SeriesMismatch { expected: 2, found: 2, .. }));
    }

    #[test]
    fn test_without_runoff_series() {
        let network = RiverNetwork::new(vec![Segment::line(
            "A",
            Polyline::from_coords(&[(0.0, 0.0), (1.0, 0.0)]),
        )])
        .unwrap();
        let routed = accumulate_runoff(&network, &RoutingMethod::Instant).unwrap();
        assert!(routed.get(&RiverId::from("A")).unwrap().discharge.is_empty());
    }

    #[test]
    fn test_empty_network() {
        let network = RiverNetwork::new(vec![]).unwrap();
        let routed = accumulate_runoff(&network, &RoutingMethod::Instant).unwrap();
        assert!(routed.is_empty());
    }
}
