/*
This code is part of the HydroStreamer river routing library.
Authors: HydroStreamer developers
Created: 16/10/2026
Last Modified: 16/10/2026
License: MIT
*/

use crate::error::{NetworkError, Result};
use crate::segment::Segment;
use hydrostreamer_common::structures::Point2D;
use kdtree::distance::squared_euclidean;
use kdtree::KdTree;
use log::{debug, warn};

/// Squared distance below which two end-nodes always coincide, whatever the
/// snap distance.
const MIN_SQUARED_RADIUS: f64 = f64::EPSILON * 10f64;

/// Options for deriving topology from line geometry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TopologyOptions {
    /// Maximum distance, in map units, between the downstream end-node of one
    /// line and the upstream end-node of another for the two to connect. End
    /// nodes that differ only by floating-point noise connect even at zero.
    pub snap_distance: f64,
}

impl Default for TopologyOptions {
    fn default() -> TopologyOptions {
        TopologyOptions {
            snap_distance: 0f64,
        }
    }
}

impl TopologyOptions {
    pub fn with_snap_distance(snap_distance: f64) -> TopologyOptions {
        TopologyOptions { snap_distance }
    }
}

/// Finds the downstream successor of every segment from its line end-nodes.
///
/// Lines are taken to be digitized in the direction of flow: the first vertex
/// is the upstream end-node and the last vertex the downstream end-node. A
/// segment drains into the segment whose upstream end-node lies within the
/// snap distance of its own downstream end-node. Lines with fewer than two
/// vertices cannot connect to anything and become isolated headwater-outlets.
pub(crate) fn derive_successors(
    segments: &[Segment],
    options: &TopologyOptions,
) -> Result<Vec<Option<usize>>> {
    let radius = (options.snap_distance * options.snap_distance).max(MIN_SQUARED_RADIUS);

    let mut end_nodes: Vec<Option<(Point2D, Point2D)>> = Vec::with_capacity(segments.len());
    for seg in segments {
        let line = seg.as_line().ok_or_else(|| {
            NetworkError::missing_attribute(
                &seg.id,
                "line geometry; catchment polygons need NEXT/PREVIOUS links or a \
                 topology transplanted from a line network",
            )
        })?;
        if !line.is_finite() {
            return Err(NetworkError::invalid_geometry(&seg.id, "non-finite coordinate"));
        }
        let nodes = line.end_nodes();
        if nodes.is_none() {
            debug!(
                "Segment {} has {} vertices; treating it as an isolated reach",
                seg.id,
                line.len()
            );
        }
        end_nodes.push(nodes);
    }

    // Enter the upstream end-nodes into a kd-tree.
    let mut start_tree = KdTree::with_capacity(2, 64);
    for (i, nodes) in end_nodes.iter().enumerate() {
        if let Some((start, _)) = nodes {
            start_tree
                .add(start.to_array(), i)
                .map_err(|e| NetworkError::invalid_geometry(&segments[i].id, format!("{:?}", e)))?;
        }
    }

    let mut next = vec![None; segments.len()];
    for (i, nodes) in end_nodes.iter().enumerate() {
        let (_, end) = match nodes {
            Some(n) => n,
            None => continue,
        };
        let ret = start_tree
            .within(&end.to_array(), radius, &squared_euclidean)
            .map_err(|e| NetworkError::invalid_geometry(&segments[i].id, format!("{:?}", e)))?;
        let mut candidates: Vec<usize> = ret.iter().map(|r| *r.1).filter(|&j| j != i).collect();
        if candidates.is_empty() {
            continue;
        }
        candidates.sort_unstable();
        if candidates.len() > 1 {
            warn!(
                "Segment {} drains into {} segments; keeping {}",
                segments[i].id,
                candidates.len(),
                segments[candidates[0]].id
            );
        }
        next[i] = Some(candidates[0]);
    }

    debug!(
        "Connected {} of {} segments to a downstream successor",
        next.iter().filter(|n| n.is_some()).count(),
        segments.len()
    );

    Ok(next)
}
