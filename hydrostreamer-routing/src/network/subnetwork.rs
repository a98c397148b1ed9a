/*
This code is part of the HydroStreamer river routing library.
Authors: HydroStreamer developers
Created: 16/10/2026
Last Modified: 16/10/2026
License: MIT
*/

use super::{RiverNetwork, Topology};
use crate::error::{NetworkError, Result};
use crate::segment::RiverId;

/// Extracts the sub-network draining through `id`: the segment itself and
/// every segment upstream of it, in their original order. Within the result
/// `id` is the only outlet; all other links are kept as they were.
pub fn upstream(network: &RiverNetwork, id: &RiverId) -> Result<RiverNetwork> {
    let topology = network.require_topology()?;
    let root = network
        .position(id)
        .ok_or_else(|| NetworkError::UnknownSegment(id.clone()))?;

    let mut members: Vec<usize> = topology.upstream(root).to_vec();
    members.push(root);
    members.sort_unstable();

    let mut new_index = vec![usize::MAX; network.len()];
    for (k, &i) in members.iter().enumerate() {
        new_index[i] = k;
    }

    let next: Vec<Option<usize>> = members
        .iter()
        .map(|&i| {
            if i == root {
                None
            } else {
                topology.next(i).map(|j| new_index[j])
            }
        })
        .collect();

    let segments: Vec<_> = members.iter().map(|&i| network.segments()[i].clone()).collect();
    let ids: Vec<RiverId> = segments.iter().map(|s| s.id.clone()).collect();
    let sub_topology = Topology::from_successors(next, &ids)?;
    RiverNetwork::from_parts(segments, sub_topology)
}
