/*
This code is part of the HydroStreamer river routing library.
Authors: HydroStreamer developers
Created: 16/10/2026
Last Modified: 16/10/2026
License: MIT
*/

use super::{RiverNetwork, Topology};
use crate::error::{NetworkError, Result};
use crate::segment::{RiverId, Segment};
use log::debug;
use std::collections::HashSet;

/// Gives `target` the topology of `source`. The two collections must hold
/// exactly the same identifiers, typically river lines (`source`) and the
/// catchment polygons draining into them (`target`).
///
/// Target segments that have neither an explicit length nor line geometry
/// borrow the reach length of their source line, so that the catchments can
/// be routed with constant velocity.
pub fn transplant_topology(source: &RiverNetwork, target: Vec<Segment>) -> Result<RiverNetwork> {
    let topology = source.require_topology()?;

    let target_ids: HashSet<&RiverId> = target.iter().map(|s| &s.id).collect();
    let mut missing: Vec<RiverId> = source
        .ids()
        .filter(|id| !target_ids.contains(id))
        .cloned()
        .collect();
    let mut unexpected: Vec<RiverId> = target
        .iter()
        .filter(|s| !source.contains(&s.id))
        .map(|s| s.id.clone())
        .collect();
    if !missing.is_empty() || !unexpected.is_empty() || target.len() != source.len() {
        missing.sort();
        unexpected.sort();
        return Err(NetworkError::IdSetMismatch {
            missing,
            unexpected,
        });
    }

    let mut target = RiverNetwork::new(target)?.into_segments();

    // source position of each target segment
    let mut source_pos = Vec::with_capacity(target.len());
    for seg in &target {
        let i = source
            .position(&seg.id)
            .ok_or_else(|| NetworkError::UnknownSegment(seg.id.clone()))?;
        source_pos.push(i);
    }
    let mut target_pos = vec![0usize; source.len()];
    for (k, &i) in source_pos.iter().enumerate() {
        target_pos[i] = k;
    }

    let next: Vec<Option<usize>> = source_pos
        .iter()
        .map(|&i| topology.next(i).map(|j| target_pos[j]))
        .collect();

    let mut borrowed = 0;
    for (seg, &i) in target.iter_mut().zip(source_pos.iter()) {
        if seg.reach_length().is_none() {
            seg.length = source.segments()[i].reach_length();
            if seg.length.is_some() {
                borrowed += 1;
            }
        }
    }
    if borrowed > 0 {
        debug!("Borrowed reach lengths for {} segments", borrowed);
    }

    let ids: Vec<RiverId> = target.iter().map(|s| s.id.clone()).collect();
    let topology = Topology::from_successors(next, &ids)?;
    RiverNetwork::from_parts(target, topology)
}
