/*
This code is part of the HydroStreamer river routing library.
Authors: HydroStreamer developers
Created: 16/10/2026
Last Modified: 16/10/2026
License: MIT
*/

//! JSON segment collections.
//!
//! ```json
//! { "segments": [ {
//!     "riverID": "A",
//!     "geometry": { "type": "LineString", "coordinates": [[0, 0], [1, 0]] },
//!     "velocity": 1.0,
//!     "NEXT": "B", "PREVIOUS": [],
//!     "runoff": { "era5": { "timestamps": ["2000-01-01T00:00:00"], "values": [1.0] } }
//! } ] }
//! ```
//!
//! `NEXT` is `null` for an outlet. A collection in which every record carries
//! `NEXT` is read with its topology; otherwise the topology is left to be
//! built from geometry.

use crate::error::Result;
use crate::network::{RiverNetwork, SegmentLinks};
use crate::segment::{Geometry, RiverId, Segment};
use crate::timeseries::TimeSeries;
use log::debug;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SegmentRecord {
    #[serde(rename = "riverID")]
    pub id: RiverId,
    pub geometry: Geometry,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub velocity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<f64>,
    /// `None` when the field is absent, `Some(None)` for an explicit outlet.
    #[serde(
        rename = "NEXT",
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub next: Option<Option<RiverId>>,
    #[serde(rename = "PREVIOUS", default, skip_serializing_if = "Option::is_none")]
    pub previous: Option<Vec<RiverId>>,
    #[serde(rename = "UP_SEGMENTS", default, skip_serializing_if = "Option::is_none")]
    pub up_segments: Option<Vec<RiverId>>,
    #[serde(default)]
    pub runoff: BTreeMap<String, TimeSeries>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub discharge: BTreeMap<String, TimeSeries>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SegmentCollection {
    pub segments: Vec<SegmentRecord>,
}

fn present<'de, D, T>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl SegmentRecord {
    fn links(&self) -> Option<SegmentLinks> {
        self.next.as_ref().map(|next| SegmentLinks {
            next: next.clone(),
            previous: self.previous.clone().unwrap_or_default(),
            up_segments: self.up_segments.clone(),
        })
    }

    fn into_segment(self) -> Segment {
        Segment {
            id: self.id,
            geometry: self.geometry,
            runoff: self.runoff,
            discharge: self.discharge,
            velocity: self.velocity,
            length: self.length,
        }
    }
}

/// Converts a collection into a network. When every record carries `NEXT`
/// the links are validated and become the network topology.
pub fn network_from_collection(collection: SegmentCollection) -> Result<RiverNetwork> {
    let links: Option<HashMap<RiverId, SegmentLinks>> = collection
        .segments
        .iter()
        .map(|r| r.links().map(|l| (r.id.clone(), l)))
        .collect();
    let has_links = !collection.segments.is_empty() && links.is_some();
    let segments: Vec<Segment> = collection
        .segments
        .into_iter()
        .map(SegmentRecord::into_segment)
        .collect();
    match links {
        Some(links) if has_links => RiverNetwork::with_links(segments, &links),
        _ => RiverNetwork::new(segments),
    }
}

/// Converts a network into a collection, writing `NEXT`, `PREVIOUS` and
/// `UP_SEGMENTS` when the network has topology.
pub fn network_to_collection(network: &RiverNetwork) -> Result<SegmentCollection> {
    let mut records = Vec::with_capacity(network.len());
    for seg in network.iter() {
        let links = if network.has_topology() {
            Some(network.links(&seg.id)?)
        } else {
            None
        };
        records.push(SegmentRecord {
            id: seg.id.clone(),
            geometry: seg.geometry.clone(),
            velocity: seg.velocity,
            length: seg.length,
            next: links.as_ref().map(|l| l.next.clone()),
            previous: links.as_ref().map(|l| l.previous.clone()),
            up_segments: links.and_then(|l| l.up_segments),
            runoff: seg.runoff.clone(),
            discharge: seg.discharge.clone(),
        });
    }
    Ok(SegmentCollection { segments: records })
}

pub fn read_network<P: AsRef<Path>>(path: P) -> Result<RiverNetwork> {
    let f = File::open(path.as_ref())?;
    let collection: SegmentCollection = serde_json::from_reader(BufReader::new(f))?;
    debug!(
        "Read {} segments from {}",
        collection.segments.len(),
        path.as_ref().display()
    );
    network_from_collection(collection)
}

pub fn write_network<P: AsRef<Path>>(network: &RiverNetwork, path: P) -> Result<()> {
    let collection = network_to_collection(network)?;
    let f = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(f);
    serde_json::to_writer_pretty(&mut writer, &collection)?;
    writer.flush()?;
    Ok(())
}
