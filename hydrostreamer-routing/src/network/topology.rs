/*
This code is part of the HydroStreamer river routing library.
Authors: HydroStreamer developers
Created: 16/10/2026
Last Modified: 16/10/2026
License: MIT
*/

use crate::error::{NetworkError, Result};
use crate::segment::RiverId;
use std::collections::{BTreeSet, VecDeque};

/// Downstream topology of a network, indexed by segment position.
///
/// Built once from the successor of every segment; the predecessor lists,
/// the upstream (ancestor) sets, a headwaters-first processing order and the
/// dependency levels are all derived at construction and never change.
#[derive(Clone, Debug, PartialEq)]
pub struct Topology {
    next: Vec<Option<usize>>,
    previous: Vec<Vec<usize>>,
    upstream: Vec<Vec<usize>>,
    order: Vec<usize>,
    levels: Vec<Vec<usize>>,
}

impl Topology {
    /// Derives the full topology from per-segment successors. `ids` is used
    /// only for error reporting and must be aligned with `next`.
    pub(crate) fn from_successors(next: Vec<Option<usize>>, ids: &[RiverId]) -> Result<Topology> {
        let n = next.len();
        let mut previous = vec![vec![]; n];
        for (i, dsn) in next.iter().enumerate() {
            if let Some(j) = *dsn {
                if j >= n {
                    return Err(NetworkError::InconsistentTopology(format!(
                        "segment {} points past the end of the network",
                        ids[i]
                    )));
                }
                previous[j].push(i);
            }
        }

        // Kahn's algorithm over the predecessor counts; headwaters first.
        let mut num_inflowing: Vec<usize> = previous.iter().map(|p| p.len()).collect();
        let mut level = vec![0usize; n];
        let mut queue: VecDeque<usize> = (0..n).filter(|&i| num_inflowing[i] == 0).collect();
        let mut order = Vec::with_capacity(n);
        while let Some(i) = queue.pop_front() {
            order.push(i);
            if let Some(j) = next[i] {
                level[j] = level[j].max(level[i] + 1);
                num_inflowing[j] -= 1;
                if num_inflowing[j] == 0 {
                    queue.push_back(j);
                }
            }
        }
        if order.len() < n {
            // whatever is left is on, or drains into, a cycle
            let stuck = (0..n)
                .find(|&i| num_inflowing[i] > 0)
                .unwrap_or_default();
            return Err(NetworkError::CyclicTopology {
                id: ids[stuck].clone(),
            });
        }

        let mut upstream: Vec<Vec<usize>> = vec![vec![]; n];
        for &i in &order {
            if previous[i].is_empty() {
                continue;
            }
            let mut set = BTreeSet::new();
            for &p in &previous[i] {
                set.insert(p);
                set.extend(upstream[p].iter().copied());
            }
            upstream[i] = set.into_iter().collect();
        }

        let num_levels = level.iter().max().map_or(0, |m| m + 1);
        let mut levels = vec![vec![]; num_levels];
        for &i in &order {
            levels[level[i]].push(i);
        }

        Ok(Topology {
            next,
            previous,
            upstream,
            order,
            levels,
        })
    }

    pub fn len(&self) -> usize {
        self.next.len()
    }

    pub fn is_empty(&self) -> bool {
        self.next.is_empty()
    }

    /// Position of the downstream successor, `None` for an outlet.
    pub fn next(&self, index: usize) -> Option<usize> {
        self.next[index]
    }

    /// Positions of the immediate upstream predecessors, ascending.
    pub fn previous(&self, index: usize) -> &[usize] {
        &self.previous[index]
    }

    /// Positions of every segment upstream of `index`, ascending.
    pub fn upstream(&self, index: usize) -> &[usize] {
        &self.upstream[index]
    }

    pub fn successors(&self) -> &[Option<usize>] {
        &self.next
    }

    /// Every position, each after all of its predecessors.
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    /// Positions grouped by dependency level. Level 0 holds the headwaters;
    /// every other segment sits one level above its deepest predecessor, so
    /// the segments within a level never depend on one another.
    pub fn levels(&self) -> &[Vec<usize>] {
        &self.levels
    }

    pub fn is_outlet(&self, index: usize) -> bool {
        self.next[index].is_none()
    }

    pub fn is_headwater(&self, index: usize) -> bool {
        self.previous[index].is_empty()
    }
}
