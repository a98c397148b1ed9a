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
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

/// Explicit topology of one segment: the `NEXT`, `PREVIOUS` and
/// `UP_SEGMENTS` fields of a segment collection.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SegmentLinks {
    #[serde(rename = "NEXT")]
    pub next: Option<RiverId>,
    #[serde(rename = "PREVIOUS", default)]
    pub previous: Vec<RiverId>,
    #[serde(rename = "UP_SEGMENTS", default, skip_serializing_if = "Option::is_none")]
    pub up_segments: Option<Vec<RiverId>>,
}

impl SegmentLinks {
    pub fn outlet() -> SegmentLinks {
        SegmentLinks::default()
    }

    pub fn draining_to(next: impl Into<RiverId>) -> SegmentLinks {
        SegmentLinks {
            next: Some(next.into()),
            ..SegmentLinks::default()
        }
    }

    pub fn with_previous<I, T>(mut self, previous: I) -> SegmentLinks
    where
        I: IntoIterator<Item = T>,
        T: Into<RiverId>,
    {
        self.previous = previous.into_iter().map(Into::into).collect();
        self
    }
}

impl RiverNetwork {
    /// Builds a network whose topology is supplied explicitly rather than
    /// derived from geometry, e.g. catchment polygons that reuse the links of
    /// the river lines they drain into.
    ///
    /// Every segment needs a links entry. `PREVIOUS` must list exactly the
    /// segments whose `NEXT` names the segment, and `UP_SEGMENTS`, when
    /// present, must equal the upstream set computed from those links.
    pub fn with_links(
        segments: Vec<Segment>,
        links: &HashMap<RiverId, SegmentLinks>,
    ) -> Result<RiverNetwork> {
        let network = RiverNetwork::new(segments)?;

        let mut next = Vec::with_capacity(network.len());
        for seg in network.iter() {
            let l = links
                .get(&seg.id)
                .ok_or_else(|| NetworkError::missing_attribute(&seg.id, "NEXT"))?;
            let dsn = match &l.next {
                Some(r) => Some(network.resolve(&seg.id, r)?),
                None => None,
            };
            next.push(dsn);
        }

        // PREVIOUS must mirror NEXT
        let mut expected_previous: Vec<BTreeSet<usize>> = vec![BTreeSet::new(); network.len()];
        for (i, dsn) in next.iter().enumerate() {
            if let Some(j) = *dsn {
                expected_previous[j].insert(i);
            }
        }
        for (i, seg) in network.iter().enumerate() {
            let l = &links[&seg.id];
            let mut previous = BTreeSet::new();
            for r in &l.previous {
                previous.insert(network.resolve(&seg.id, r)?);
            }
            if previous != expected_previous[i] {
                return Err(NetworkError::InconsistentTopology(format!(
                    "PREVIOUS of segment {} does not match the segments whose NEXT is {}",
                    seg.id, seg.id
                )));
            }
        }

        let topology = Topology::from_successors(next, &network.owned_ids())?;

        for (i, seg) in network.iter().enumerate() {
            if let Some(up) = &links[&seg.id].up_segments {
                let mut given = BTreeSet::new();
                for r in up {
                    given.insert(network.resolve(&seg.id, r)?);
                }
                if !given.iter().copied().eq(topology.upstream(i).iter().copied()) {
                    return Err(NetworkError::InconsistentTopology(format!(
                        "UP_SEGMENTS of segment {} does not match its upstream segments",
                        seg.id
                    )));
                }
            }
        }

        Ok(RiverNetwork {
            topology: Some(Arc::new(topology)),
            ..network
        })
    }

    fn resolve(&self, from: &RiverId, reference: &RiverId) -> Result<usize> {
        self.position(reference)
            .ok_or_else(|| NetworkError::UnresolvedReference {
                id: from.clone(),
                reference: reference.clone(),
            })
    }
}
