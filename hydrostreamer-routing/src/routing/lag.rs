/*
This code is part of the HydroStreamer river routing library.
Authors: HydroStreamer developers
Created: 16/10/2026
Last Modified: 16/10/2026
License: MIT
*/

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How a travel time that is not a whole number of timesteps is placed on
/// the timestep grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LagPolicy {
    /// Split the flow between the two bracketing timesteps, weighted by
    /// proximity. A lag of 1.25 steps sends 75% of the flow one step later and
    /// 25% two steps later.
    #[default]
    Linear,
    /// Round to the nearest whole timestep (halves round away from zero).
    Nearest,
    /// Truncate to the whole timestep below.
    Floor,
}

impl FromStr for LagPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<LagPolicy, String> {
        match s.trim().to_lowercase().as_str() {
            "linear" => Ok(LagPolicy::Linear),
            "nearest" => Ok(LagPolicy::Nearest),
            "floor" => Ok(LagPolicy::Floor),
            other => Err(format!("unknown lag policy '{}'", other)),
        }
    }
}

/// Adds `source`, delayed by `lag` timesteps, onto `target`. Samples that
/// would come from before the start of `source` are zero, and flow delayed
/// past the end of the series leaves the window.
pub(crate) fn add_lagged(target: &mut [f64], source: &[f64], lag: f64, policy: LagPolicy) {
    let lag = lag.max(0f64);
    let (whole, frac) = match policy {
        LagPolicy::Linear => (lag.floor(), lag - lag.floor()),
        LagPolicy::Nearest => (lag.round(), 0f64),
        LagPolicy::Floor => (lag.floor(), 0f64),
    };
    let k = whole as usize;
    let n = target.len().min(source.len());
    for t in k..n {
        target[t] += (1f64 - frac) * source[t - k];
        if frac > 0f64 && t > k {
            target[t] += frac * source[t - k - 1];
        }
    }
}
