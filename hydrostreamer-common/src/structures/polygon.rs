/*
This code is part of the HydroStreamer river routing library.
Authors: HydroStreamer developers
Created: 16/10/2026
Last Modified: 16/10/2026
License: MIT
*/

use super::Point2D;
use serde::{Deserialize, Serialize};

/// A polygon with a single exterior ring, e.g. the catchment draining into
/// one river reach. Holes are not represented; catchment areas are computed
/// from the exterior ring only.
#[derive(Default, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Polygon {
    pub exterior: Vec<Point2D>,
}

impl Polygon {
    pub fn new(exterior: &[Point2D]) -> Polygon {
        Polygon {
            exterior: exterior.to_vec(),
        }
    }

    pub fn len(&self) -> usize {
        self.exterior.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exterior.is_empty()
    }

    /// Planar area of the ring (shoelace formula). The ring may be open or
    /// closed and either winding order; fewer than three vertices enclose
    /// no area.
    pub fn area(&self) -> f64 {
        let n = self.exterior.len();
        if n < 3 {
            return 0f64;
        }
        let mut twice_area = 0f64;
        for i in 0..n {
            let p1 = self.exterior[i];
            let p2 = self.exterior[(i + 1) % n];
            twice_area += p1.x * p2.y - p2.x * p1.y;
        }
        twice_area.abs() / 2f64
    }

    pub fn is_finite(&self) -> bool {
        self.exterior.iter().all(|p| p.is_finite())
    }
}
