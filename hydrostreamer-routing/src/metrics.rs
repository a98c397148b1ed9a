/*
This code is part of the HydroStreamer river routing library.
Authors: HydroStreamer developers
Created: 16/10/2026
Last Modified: 16/10/2026
License: MIT
*/

//! Stream network indices computed over the network topology.
//!
//! | Index | Description |
//! | :- | :- |
//! | OUTLET | riverID of the outlet the segment drains to, used as basin identifier |
//! | TRIB_ID | Unique tributary identifying value |
//! | DIST2MOUTH | Distance from the segment's upstream end to the mouth |
//! | DS_NODES | Number of segments downstream |
//! | TUCL | Total upstream channel length, including the segment itself |
//! | MAXUPSDIST | Maximum upstream distance |
//! | HORTON | Horton stream order |
//! | STRAHLER | Strahler stream order |
//! | SHREVE | Shreve stream magnitude |
//! | HACK | Hack stream order |
//! | MAINSTREAM | Whether the segment is on the main stem of its basin |
//! | IS_OUTLET | Whether the segment is an outlet |

use crate::error::{NetworkError, Result};
use crate::network::{RiverNetwork, Topology};
use crate::segment::RiverId;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamOrder {
    #[serde(rename = "riverID")]
    pub id: RiverId,
    #[serde(rename = "STRAHLER")]
    pub strahler: usize,
    #[serde(rename = "SHREVE")]
    pub shreve: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinkMetrics {
    #[serde(rename = "riverID")]
    pub id: RiverId,
    #[serde(rename = "OUTLET")]
    pub outlet: RiverId,
    #[serde(rename = "TRIB_ID")]
    pub tributary_id: usize,
    #[serde(rename = "DIST2MOUTH")]
    pub distance_to_mouth: f64,
    #[serde(rename = "DS_NODES")]
    pub downstream_nodes: usize,
    #[serde(rename = "TUCL")]
    pub tucl: f64,
    #[serde(rename = "MAXUPSDIST")]
    pub max_upstream_distance: f64,
    #[serde(rename = "HORTON")]
    pub horton: usize,
    #[serde(rename = "STRAHLER")]
    pub strahler: usize,
    #[serde(rename = "SHREVE")]
    pub shreve: usize,
    #[serde(rename = "HACK")]
    pub hack: usize,
    #[serde(rename = "MAINSTREAM")]
    pub main_stem: bool,
    #[serde(rename = "IS_OUTLET")]
    pub is_outlet: bool,
}

/// Strahler order and Shreve magnitude of every segment, in network order.
pub fn stream_orders(network: &RiverNetwork) -> Result<Vec<StreamOrder>> {
    let topology = network.require_topology()?;
    let (strahler, shreve) = accumulate_orders(topology);
    Ok(network
        .ids()
        .enumerate()
        .map(|(i, id)| StreamOrder {
            id: id.clone(),
            strahler: strahler[i],
            shreve: shreve[i],
        })
        .collect())
}

/// The full set of network indices, in network order. Every segment needs a
/// reach length.
pub fn network_metrics(network: &RiverNetwork) -> Result<Vec<LinkMetrics>> {
    let topology = network.require_topology()?;
    let n = network.len();

    let mut link_lengths = Vec::with_capacity(n);
    for seg in network.iter() {
        let length = seg
            .reach_length()
            .ok_or_else(|| NetworkError::missing_attribute(&seg.id, "length"))?;
        link_lengths.push(length);
    }

    let (strahler_order, shreve_order) = accumulate_orders(topology);

    // headwater-to-outlet accumulation
    let mut tucl = vec![0f64; n];
    let mut max_upstream_length = vec![0f64; n];
    for &i in topology.order() {
        tucl[i] += link_lengths[i];
        max_upstream_length[i] += link_lengths[i];
        if let Some(dsn) = topology.next(i) {
            tucl[dsn] += tucl[i];
            if max_upstream_length[i] > max_upstream_length[dsn] {
                max_upstream_length[dsn] = max_upstream_length[i];
            }
        }
    }

    // outlet-to-headwater accumulation
    let mut outlet = vec![0usize; n];
    let mut dist_to_outlet = vec![0f64; n];
    let mut num_downstream_nodes = vec![0usize; n];
    for &i in topology.order().iter().rev() {
        match topology.next(i) {
            Some(dsn) => {
                outlet[i] = outlet[dsn];
                dist_to_outlet[i] = link_lengths[i] + dist_to_outlet[dsn];
                num_downstream_nodes[i] = num_downstream_nodes[dsn] + 1;
            }
            None => {
                outlet[i] = i;
                dist_to_outlet[i] = link_lengths[i];
            }
        }
    }

    // main stems, tributary numbers and the Horton and Hack orders
    let mut is_main_stem = vec![false; n];
    let mut horton_order = vec![0usize; n];
    let mut hack_order = vec![0usize; n];
    let mut trib_num = vec![0usize; n];
    let mut current_trib_num = 0;
    let mut stack = vec![];
    for i in 0..n {
        if topology.is_outlet(i) {
            is_main_stem[i] = true;
            horton_order[i] = strahler_order[i];
            hack_order[i] = 1;
            current_trib_num += 1;
            trib_num[i] = current_trib_num;
            stack.push(i);
        }
    }
    while let Some(i) = stack.pop() {
        let neighbours = topology.previous(i);
        let mut main_link: Option<usize> = None;
        for &id in neighbours {
            if main_link.map_or(true, |m| max_upstream_length[id] > max_upstream_length[m]) {
                main_link = Some(id);
            }
        }
        for &link in neighbours {
            stack.push(link);
            if Some(link) == main_link {
                trib_num[link] = trib_num[i];
                horton_order[link] = horton_order[i];
                hack_order[link] = hack_order[i];
                is_main_stem[link] = is_main_stem[i];
            } else {
                current_trib_num += 1;
                trib_num[link] = current_trib_num;
                horton_order[link] = strahler_order[link];
                hack_order[link] = hack_order[i] + 1;
            }
        }
    }

    let ids = network.owned_ids();
    Ok((0..n)
        .map(|i| LinkMetrics {
            id: ids[i].clone(),
            outlet: ids[outlet[i]].clone(),
            tributary_id: trib_num[i],
            distance_to_mouth: dist_to_outlet[i],
            downstream_nodes: num_downstream_nodes[i],
            tucl: tucl[i],
            max_upstream_distance: max_upstream_length[i],
            horton: horton_order[i],
            strahler: strahler_order[i],
            shreve: shreve_order[i],
            hack: hack_order[i],
            main_stem: is_main_stem[i],
            is_outlet: topology.is_outlet(i),
        })
        .collect())
}

fn accumulate_orders(topology: &Topology) -> (Vec<usize>, Vec<usize>) {
    let n = topology.len();
    let mut strahler_order = vec![0usize; n];
    let mut shreve_order = vec![0usize; n];
    for &i in topology.order() {
        let previous = topology.previous(i);
        if previous.is_empty() {
            strahler_order[i] = 1;
            shreve_order[i] = 1;
            continue;
        }
        let highest = previous.iter().map(|&p| strahler_order[p]).max().unwrap_or(1);
        let num_highest = previous.iter().filter(|&&p| strahler_order[p] == highest).count();
        strahler_order[i] = if num_highest > 1 { highest + 1 } else { highest };
        shreve_order[i] = previous.iter().map(|&p| shreve_order[p]).sum();
    }
    (strahler_order, shreve_order)
}
