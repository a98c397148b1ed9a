/*
This code is part of the HydroStreamer river routing library.
Authors: HydroStreamer developers
Created: 16/10/2026
Last Modified: 16/10/2026
License: MIT
*/

//! The in-memory river network: segments in insertion order plus the
//! downstream topology connecting them.

mod builder;
mod links;
mod subnetwork;
mod topology;
mod transplant;

pub use self::builder::TopologyOptions;
pub use self::links::SegmentLinks;
pub use self::subnetwork::upstream;
pub use self::topology::Topology;
pub use self::transplant::transplant_topology;

use crate::error::{NetworkError, Result};
use crate::segment::{RiverId, Segment};
use log::debug;
use std::collections::HashMap;
use std::sync::Arc;

/// A collection of segments keyed by `riverID`, optionally carrying its
/// topology. Iteration always follows the order the segments were supplied
/// in. Topology is only ever attached by constructing a new network; it is
/// never recomputed on read.
#[derive(Clone, Debug)]
pub struct RiverNetwork {
    segments: Vec<Segment>,
    index: HashMap<RiverId, usize>,
    topology: Option<Arc<Topology>>,
}

/// Derives the topology of `segments` from their line geometry.
pub fn build_topology(segments: Vec<Segment>, options: &TopologyOptions) -> Result<RiverNetwork> {
    RiverNetwork::new(segments)?.into_built(options)
}

impl RiverNetwork {
    /// Creates a network without topology. Identifiers must be non-empty and
    /// unique.
    pub fn new(segments: Vec<Segment>) -> Result<RiverNetwork> {
        let mut index = HashMap::with_capacity(segments.len());
        for (i, seg) in segments.iter().enumerate() {
            if seg.id.as_str().is_empty() {
                return Err(NetworkError::EmptyId(i));
            }
            if index.insert(seg.id.clone(), i).is_some() {
                return Err(NetworkError::DuplicateId(seg.id.clone()));
            }
        }
        Ok(RiverNetwork {
            segments,
            index,
            topology: None,
        })
    }

    /// Returns a copy of this network with topology derived from line
    /// geometry. Any topology already attached is ignored; the result only
    /// depends on the geometry.
    pub fn build_topology(&self, options: &TopologyOptions) -> Result<RiverNetwork> {
        self.clone().into_built(options)
    }

    fn into_built(self, options: &TopologyOptions) -> Result<RiverNetwork> {
        let next = builder::derive_successors(&self.segments, options)?;
        let topology = Topology::from_successors(next, &self.owned_ids())?;
        debug!(
            "Built topology for {} segments: {} outlets, {} dependency levels",
            topology.len(),
            (0..topology.len()).filter(|&i| topology.is_outlet(i)).count(),
            topology.levels().len()
        );
        Ok(RiverNetwork {
            topology: Some(Arc::new(topology)),
            ..self
        })
    }

    pub(crate) fn from_parts(segments: Vec<Segment>, topology: Topology) -> Result<RiverNetwork> {
        let network = RiverNetwork::new(segments)?;
        Ok(RiverNetwork {
            topology: Some(Arc::new(topology)),
            ..network
        })
    }

    /// Same topology, different segment payloads (positions must match).
    pub(crate) fn with_segments(&self, segments: Vec<Segment>) -> RiverNetwork {
        RiverNetwork {
            segments,
            index: self.index.clone(),
            topology: self.topology.clone(),
        }
    }

    /// Applies `f` to every segment, keeping the topology. `f` must not
    /// change segment identifiers.
    pub fn map_segments<F>(&self, mut f: F) -> Result<RiverNetwork>
    where
        F: FnMut(&Segment) -> Result<Segment>,
    {
        let mut segments = Vec::with_capacity(self.len());
        for seg in &self.segments {
            let mapped = f(seg)?;
            if mapped.id != seg.id {
                return Err(NetworkError::InconsistentTopology(format!(
                    "segment {} was renamed to {}",
                    seg.id, mapped.id
                )));
            }
            segments.push(mapped);
        }
        Ok(self.with_segments(segments))
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Segment> {
        self.segments.iter()
    }

    pub fn into_segments(self) -> Vec<Segment> {
        self.segments
    }

    pub fn ids(&self) -> impl Iterator<Item = &RiverId> {
        self.segments.iter().map(|s| &s.id)
    }

    pub(crate) fn owned_ids(&self) -> Vec<RiverId> {
        self.ids().cloned().collect()
    }

    pub fn contains(&self, id: &RiverId) -> bool {
        self.index.contains_key(id)
    }

    pub fn position(&self, id: &RiverId) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn get(&self, id: &RiverId) -> Option<&Segment> {
        self.position(id).map(|i| &self.segments[i])
    }

    pub fn topology(&self) -> Option<&Topology> {
        self.topology.as_deref()
    }

    pub fn has_topology(&self) -> bool {
        self.topology.is_some()
    }

    pub(crate) fn require_topology(&self) -> Result<&Topology> {
        self.topology().ok_or(NetworkError::TopologyNotBuilt)
    }

    fn require_position(&self, id: &RiverId) -> Result<usize> {
        self.position(id)
            .ok_or_else(|| NetworkError::UnknownSegment(id.clone()))
    }

    fn id_at(&self, index: usize) -> &RiverId {
        &self.segments[index].id
    }

    /// The downstream successor of `id`, `None` for an outlet.
    pub fn next(&self, id: &RiverId) -> Result<Option<&RiverId>> {
        let topology = self.require_topology()?;
        let i = self.require_position(id)?;
        Ok(topology.next(i).map(|j| self.id_at(j)))
    }

    /// The immediate upstream predecessors of `id`, in network order.
    pub fn previous(&self, id: &RiverId) -> Result<Vec<&RiverId>> {
        let topology = self.require_topology()?;
        let i = self.require_position(id)?;
        Ok(topology.previous(i).iter().map(|&j| self.id_at(j)).collect())
    }

    /// Every segment upstream of `id`, in network order.
    pub fn upstream_segments(&self, id: &RiverId) -> Result<Vec<&RiverId>> {
        let topology = self.require_topology()?;
        let i = self.require_position(id)?;
        Ok(topology.upstream(i).iter().map(|&j| self.id_at(j)).collect())
    }

    /// The successors of `id`, nearest first, ending at its outlet.
    pub fn downstream_path(&self, id: &RiverId) -> Result<Vec<&RiverId>> {
        let topology = self.require_topology()?;
        let mut i = self.require_position(id)?;
        let mut path = vec![];
        while let Some(j) = topology.next(i) {
            path.push(self.id_at(j));
            i = j;
        }
        Ok(path)
    }

    /// The `NEXT`/`PREVIOUS`/`UP_SEGMENTS` view of one segment's topology.
    pub fn links(&self, id: &RiverId) -> Result<SegmentLinks> {
        Ok(SegmentLinks {
            next: self.next(id)?.cloned(),
            previous: self.previous(id)?.into_iter().cloned().collect(),
            up_segments: Some(self.upstream_segments(id)?.into_iter().cloned().collect()),
        })
    }

    pub fn outlets(&self) -> Result<Vec<&RiverId>> {
        let topology = self.require_topology()?;
        Ok((0..self.len())
            .filter(|&i| topology.is_outlet(i))
            .map(|i| self.id_at(i))
            .collect())
    }

    pub fn headwaters(&self) -> Result<Vec<&RiverId>> {
        let topology = self.require_topology()?;
        Ok((0..self.len())
            .filter(|&i| topology.is_headwater(i))
            .map(|i| self.id_at(i))
            .collect())
    }
}
