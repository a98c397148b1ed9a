/*
This code is part of the HydroStreamer river routing library.
Authors: HydroStreamer developers
Created: 16/10/2026
Last Modified: 16/10/2026
License: MIT
*/

use crate::error::{NetworkError, Result};
use crate::segment::Segment;
use crate::timeseries::TimeSeries;

/// Converts runoff depth in millimetres per timestep over a catchment of
/// `area_m2` square metres into volumetric flow in m3/s. The series needs a
/// uniform timestep.
pub fn depth_to_flow(series: &TimeSeries, area_m2: f64) -> Result<TimeSeries> {
    if !area_m2.is_finite() || area_m2 <= 0f64 {
        return Err(NetworkError::InvalidArea(area_m2));
    }
    let step = series
        .timestep()
        .ok_or_else(|| {
            NetworkError::InvalidTimeSeries(
                "depth conversion needs at least two evenly spaced timestamps".to_string(),
            )
        })?
        .num_milliseconds() as f64
        / 1000f64;
    let factor = area_m2 / 1000f64 / step;
    series.with_values(series.values().iter().map(|d| d * factor).collect())
}

/// Converts every runoff series of a catchment polygon from depth to flow,
/// using the polygon area. Coordinates must be in metres.
pub fn catchment_depth_to_flow(segment: &Segment) -> Result<Segment> {
    let area = segment
        .catchment_area()
        .ok_or_else(|| NetworkError::missing_attribute(&segment.id, "catchment polygon"))?;
    let mut ret = segment.clone();
    for (name, series) in &segment.runoff {
        ret.runoff.insert(name.clone(), depth_to_flow(series, area)?);
    }
    Ok(ret)
}
