/*
This code is part of the HydroStreamer river routing library.
Authors: HydroStreamer developers
Created: 16/10/2026
Last Modified: 16/10/2026
License: MIT
*/

use crate::timeseries::TimeSeries;
use hydrostreamer_common::structures::{Polygon, Polyline};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Caller-supplied identifier of a river segment (`riverID`).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RiverId(String);

impl RiverId {
    pub fn new(id: impl Into<String>) -> RiverId {
        RiverId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RiverId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RiverId {
    fn from(id: &str) -> RiverId {
        RiverId(id.to_string())
    }
}

impl From<String> for RiverId {
    fn from(id: String) -> RiverId {
        RiverId(id)
    }
}

/// Segment geometry, GeoJSON-tagged. Routing only looks at line end-nodes and
/// line length; polygons are catchments and carry no routing information.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum Geometry {
    #[serde(rename = "LineString")]
    Line(Polyline),
    #[serde(rename = "Polygon")]
    Polygon(Polygon),
}

/// One reach of a river network.
#[derive(Clone, Debug, PartialEq)]
pub struct Segment {
    pub id: RiverId,
    pub geometry: Geometry,
    /// Locally generated runoff (m3/s), one series per data source.
    pub runoff: BTreeMap<String, TimeSeries>,
    /// Routed discharge (m3/s), keyed like `runoff`. Filled in by routing.
    pub discharge: BTreeMap<String, TimeSeries>,
    /// Flow velocity (m/s) for constant-velocity routing.
    pub velocity: Option<f64>,
    /// Reach length (m); takes precedence over the line geometry length.
    pub length: Option<f64>,
}

impl Segment {
    pub fn new(id: impl Into<RiverId>, geometry: Geometry) -> Segment {
        Segment {
            id: id.into(),
            geometry,
            runoff: BTreeMap::new(),
            discharge: BTreeMap::new(),
            velocity: None,
            length: None,
        }
    }

    pub fn line(id: impl Into<RiverId>, line: Polyline) -> Segment {
        Segment::new(id, Geometry::Line(line))
    }

    pub fn polygon(id: impl Into<RiverId>, polygon: Polygon) -> Segment {
        Segment::new(id, Geometry::Polygon(polygon))
    }

    pub fn with_runoff(mut self, name: impl Into<String>, series: TimeSeries) -> Segment {
        self.runoff.insert(name.into(), series);
        self
    }

    pub fn with_velocity(mut self, velocity: f64) -> Segment {
        self.velocity = Some(velocity);
        self
    }

    pub fn with_length(mut self, length: f64) -> Segment {
        self.length = Some(length);
        self
    }

    pub fn as_line(&self) -> Option<&Polyline> {
        match &self.geometry {
            Geometry::Line(line) => Some(line),
            Geometry::Polygon(_) => None,
        }
    }

    /// Reach length: the explicit `length` if set, otherwise the length of
    /// the line geometry. Catchment polygons without an explicit length have
    /// none.
    pub fn reach_length(&self) -> Option<f64> {
        self.length.or_else(|| self.as_line().map(|line| line.length()))
    }

    /// Planar area of a catchment polygon, in squared map units.
    pub fn catchment_area(&self) -> Option<f64> {
        match &self.geometry {
            Geometry::Polygon(polygon) => Some(polygon.area()),
            Geometry::Line(_) => None,
        }
    }
}
