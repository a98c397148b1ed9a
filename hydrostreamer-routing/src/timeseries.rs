/*
This code is part of the HydroStreamer river routing library.
Authors: HydroStreamer developers
Created: 16/10/2026
Last Modified: 16/10/2026
License: MIT
*/

use crate::error::{NetworkError, Result};
use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// An ordered sequence of (timestamp, value) pairs. Timestamps are strictly
/// increasing and there is exactly one value per timestamp.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTimeSeries")]
pub struct TimeSeries {
    timestamps: Vec<NaiveDateTime>,
    values: Vec<f64>,
}

#[derive(Deserialize)]
struct RawTimeSeries {
    timestamps: Vec<NaiveDateTime>,
    values: Vec<f64>,
}

impl TryFrom<RawTimeSeries> for TimeSeries {
    type Error = NetworkError;

    fn try_from(raw: RawTimeSeries) -> Result<TimeSeries> {
        TimeSeries::new(raw.timestamps, raw.values)
    }
}

impl TimeSeries {
    pub fn new(timestamps: Vec<NaiveDateTime>, values: Vec<f64>) -> Result<TimeSeries> {
        if timestamps.len() != values.len() {
            return Err(NetworkError::InvalidTimeSeries(format!(
                "{} timestamps but {} values",
                timestamps.len(),
                values.len()
            )));
        }
        for w in timestamps.windows(2) {
            if w[1] <= w[0] {
                return Err(NetworkError::InvalidTimeSeries(format!(
                    "timestamps not strictly increasing at {}",
                    w[1]
                )));
            }
        }
        Ok(TimeSeries { timestamps, values })
    }

    /// Builds a series of `values.len()` samples, `step` apart, starting at `start`.
    pub fn regular(start: NaiveDateTime, step: Duration, values: Vec<f64>) -> Result<TimeSeries> {
        if step <= Duration::zero() {
            return Err(NetworkError::InvalidTimeSeries(format!(
                "timestep must be positive, got {}",
                step
            )));
        }
        let timestamps = (0..values.len() as i32).map(|i| start + step * i).collect();
        TimeSeries::new(timestamps, values)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn timestamps(&self) -> &[NaiveDateTime] {
        &self.timestamps
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDateTime, f64)> + '_ {
        self.timestamps.iter().copied().zip(self.values.iter().copied())
    }

    /// True when both series share the identical timestamp sequence.
    pub fn is_aligned_with(&self, other: &TimeSeries) -> bool {
        self.timestamps == other.timestamps
    }

    /// The common spacing of the timestamps. `None` when the series has fewer
    /// than two samples or the spacing is irregular.
    ///
    /// Gaps are compared as exact durations, so calendar-monthly series
    /// (28 to 31 days apart) have no timestep. Such series can be routed
    /// instantly but not with a constant velocity, and `depth_to_flow`
    /// rejects them.
    pub fn timestep(&self) -> Option<Duration> {
        if self.timestamps.len() < 2 {
            return None;
        }
        let step = self.timestamps[1] - self.timestamps[0];
        if self.timestamps.windows(2).all(|w| w[1] - w[0] == step) {
            Some(step)
        } else {
            None
        }
    }

    /// A new series on the same timestamps carrying `values`.
    pub fn with_values(&self, values: Vec<f64>) -> Result<TimeSeries> {
        if values.len() != self.timestamps.len() {
            return Err(NetworkError::InvalidTimeSeries(format!(
                "{} timestamps but {} values",
                self.timestamps.len(),
                values.len()
            )));
        }
        Ok(TimeSeries {
            timestamps: self.timestamps.clone(),
            values,
        })
    }

    pub fn sum(&self) -> f64 {
        self.values.iter().sum()
    }
}
