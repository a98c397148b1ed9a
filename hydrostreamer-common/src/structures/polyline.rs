/*
This code is part of the HydroStreamer river routing library.
Authors: HydroStreamer developers
Created: 16/10/2026
Last Modified: 16/10/2026
License: MIT
*/

use super::Point2D;
use serde::{Deserialize, Serialize};
use std::ops::Index;

/// An ordered run of vertices. For river reaches the vertex order is the
/// digitizing direction, i.e. the first vertex is the upstream end.
#[derive(Default, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Polyline {
    pub vertices: Vec<Point2D>,
}

impl Index<usize> for Polyline {
    type Output = Point2D;

    fn index<'a>(&'a self, index: usize) -> &'a Point2D {
        &self.vertices[index]
    }
}

impl Polyline {
    /// Creates a new Polyline from vertices
    pub fn new(vertices: &[Point2D]) -> Polyline {
        Polyline {
            vertices: vertices.to_vec(),
        }
    }

    /// Creates a new Polyline from raw (x, y) coordinate pairs.
    pub fn from_coords(coords: &[(f64, f64)]) -> Polyline {
        Polyline {
            vertices: coords.iter().map(|&(x, y)| Point2D::new(x, y)).collect(),
        }
    }

    /// returns the number of vertices
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Returns the feature geometric length.
    pub fn length(&self) -> f64 {
        let mut ret = 0f64;
        for a in 1..self.len() {
            ret += self[a - 1].distance(&self[a]);
        }
        ret
    }

    pub fn first_vertex(&self) -> Option<Point2D> {
        self.vertices.first().copied()
    }

    pub fn last_vertex(&self) -> Option<Point2D> {
        self.vertices.last().copied()
    }

    /// The (start, end) end-nodes of the line. Lines with fewer than two
    /// vertices have no distinct end-nodes and return `None`.
    pub fn end_nodes(&self) -> Option<(Point2D, Point2D)> {
        if self.len() < 2 {
            return None;
        }
        Some((self.vertices[0], self.vertices[self.len() - 1]))
    }

    /// Inserts a point vertex at the end of the line.
    pub fn push(&mut self, v: Point2D) {
        self.vertices.push(v);
    }

    pub fn is_finite(&self) -> bool {
        self.vertices.iter().all(|p| p.is_finite())
    }
}
