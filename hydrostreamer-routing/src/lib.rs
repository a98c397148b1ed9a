/*
This code is part of the HydroStreamer river routing library.
Authors: HydroStreamer developers
Created: 16/10/2026
Last Modified: 16/10/2026
License: MIT
*/

//! River network topology and downstream routing of segment runoff.
//!
//! A typical run builds the topology of a set of river lines, then routes
//! the runoff attached to each segment down the network:
//!
//! ```no_run
//! use hydrostreamer_routing::{accumulate_runoff, build_topology, read_network};
//! use hydrostreamer_routing::{ConstantVelocity, RoutingMethod, TopologyOptions};
//!
//! let network = read_network("rivers.json").unwrap();
//! let network = build_topology(network.into_segments(), &TopologyOptions::default()).unwrap();
//! let method = RoutingMethod::Constant(ConstantVelocity::new(1.0));
//! let routed = accumulate_runoff(&network, &method).unwrap();
//! ```

pub mod error;
pub mod io;
pub mod metrics;
pub mod network;
pub mod routing;
pub mod segment;
pub mod timeseries;
pub mod units;

pub use crate::error::{ErrorKind, NetworkError, Result};
pub use crate::io::{read_network, write_network};
pub use crate::network::{
    build_topology, transplant_topology, upstream, RiverNetwork, SegmentLinks, Topology,
    TopologyOptions,
};
pub use crate::routing::{accumulate_runoff, ConstantVelocity, LagPolicy, RoutingMethod};
pub use crate::segment::{Geometry, RiverId, Segment};
pub use crate::timeseries::TimeSeries;
