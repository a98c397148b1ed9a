/*
This code is part of the HydroStreamer river routing library.
Authors: HydroStreamer developers
Created: 16/10/2026
Last Modified: 16/10/2026
License: MIT
*/
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Sub;

/// A 2-D point, with x and y fields.
///
/// Serialized as a GeoJSON-style `[x, y]` coordinate pair.
#[derive(Default, Copy, Clone, Debug, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl fmt::Display for Point2D {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "(x: {}, y: {})", self.x, self.y)
    }
}

impl Point2D {
    /// Creates a new Point2D,
    pub fn new(x: f64, y: f64) -> Point2D {
        Point2D { x, y }
    }

    /// Calculate Euclidean distance between the point and another.
    pub fn distance(&self, other: &Self) -> f64 {
        self.distance_squared(other).sqrt()
    }

    /// Squared Euclidean distance; cheaper when only comparisons are needed.
    pub fn distance_squared(&self, other: &Self) -> f64 {
        (self.x - other.x) * (self.x - other.x) + (self.y - other.y) * (self.y - other.y)
    }

    /// Returns true when the two points lie within `precision` of one another.
    pub fn nearly_equals(&self, other: &Self, precision: f64) -> bool {
        self.distance_squared(other) <= precision * precision
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// The point as a coordinate array, the key type of the endpoint kd-trees.
    pub fn to_array(&self) -> [f64; 2] {
        [self.x, self.y]
    }
}

impl Eq for Point2D {}

impl PartialEq for Point2D {
    fn eq(&self, other: &Self) -> bool {
        self.x == other.x && self.y == other.y
    }
}

impl From<[f64; 2]> for Point2D {
    fn from(coords: [f64; 2]) -> Point2D {
        Point2D::new(coords[0], coords[1])
    }
}

impl From<Point2D> for [f64; 2] {
    fn from(p: Point2D) -> [f64; 2] {
        p.to_array()
    }
}

impl Sub for Point2D {
    type Output = Point2D;
    fn sub(self, rhs: Self) -> Point2D {
        Point2D {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}
