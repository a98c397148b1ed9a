/*
This code is part of the HydroStreamer river routing library.
Authors: HydroStreamer developers
Created: 16/10/2026
Last Modified: 16/10/2026
License: MIT
*/

//! Errors raised while building, querying and routing river networks.

use crate::segment::RiverId;
use thiserror::Error;

/// Coarse classification of a [`NetworkError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Cyclic or unresolvable successor/predecessor references.
    Topology,
    /// Identifiers, time series or geometry that do not fit together.
    Schema,
    /// An attribute an operation depends on is absent.
    MissingAttribute,
    /// Reading or writing an interchange file failed.
    Io,
}

#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("Topology error: segment {id} lies on a downstream cycle")]
    CyclicTopology { id: RiverId },

    #[error("Topology error: segment {id} references unknown segment {reference}")]
    UnresolvedReference { id: RiverId, reference: RiverId },

    #[error("Topology error: {0}")]
    InconsistentTopology(String),

    #[error("Topology error: the network topology has not been built")]
    TopologyNotBuilt,

    #[error("Schema error: duplicate riverID {0}")]
    DuplicateId(RiverId),

    #[error("Schema error: empty riverID at position {0}")]
    EmptyId(usize),

    #[error("Schema error: no segment with riverID {0}")]
    UnknownSegment(RiverId),

    #[error("Schema error: segment {id} has no runoff series named '{series}'")]
    MissingSeries { id: RiverId, series: String },

    #[error(
        "Schema error: runoff series '{series}' of segment {id} does not match the network \
         timestamps (expected {expected} timesteps, found {found})"
    )]
    SeriesMismatch {
        id: RiverId,
        series: String,
        expected: usize,
        found: usize,
    },

    #[error("Schema error: invalid time series: {0}")]
    InvalidTimeSeries(String),

    #[error("Schema error: invalid geometry for segment {id}: {reason}")]
    InvalidGeometry { id: RiverId, reason: String },

    #[error("Schema error: catchment area must be positive and finite, got {0}")]
    InvalidArea(f64),

    #[error("Schema error: invalid {attribute} for segment {id}: {reason}")]
    InvalidAttribute {
        id: RiverId,
        attribute: String,
        reason: String,
    },

    #[error("Schema error: identifier sets differ (missing: {missing:?}, unexpected: {unexpected:?})")]
    IdSetMismatch {
        missing: Vec<RiverId>,
        unexpected: Vec<RiverId>,
    },

    #[error("Missing attribute: segment {id} has no {attribute}")]
    MissingAttribute { id: RiverId, attribute: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("I/O error: malformed segment collection: {0}")]
    Json(#[from] serde_json::Error),
}

impl NetworkError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            NetworkError::CyclicTopology { .. }
            | NetworkError::UnresolvedReference { .. }
            | NetworkError::InconsistentTopology(_)
            | NetworkError::TopologyNotBuilt => ErrorKind::Topology,
            NetworkError::MissingAttribute { .. } => ErrorKind::MissingAttribute,
            NetworkError::Io(_) | NetworkError::Json(_) => ErrorKind::Io,
            _ => ErrorKind::Schema,
        }
    }

    pub fn missing_attribute(id: &RiverId, attribute: impl Into<String>) -> Self {
        NetworkError::MissingAttribute {
            id: id.clone(),
            attribute: attribute.into(),
        }
    }

    pub fn invalid_attribute(
        id: &RiverId,
        attribute: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        NetworkError::InvalidAttribute {
            id: id.clone(),
            attribute: attribute.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_geometry(id: &RiverId, reason: impl Into<String>) -> Self {
        NetworkError::InvalidGeometry {
            id: id.clone(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for network operations
pub type Result<T> = std::result::Result<T, NetworkError>;

impl From<NetworkError> for std::io::Error {
    fn from(e: NetworkError) -> std::io::Error {
        use std::io::ErrorKind as IoKind;
        match e {
            NetworkError::Io(e) => e,
            NetworkError::Json(e) => std::io::Error::new(IoKind::InvalidData, e),
            other => std::io::Error::new(IoKind::InvalidInput, other.to_string()),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_error_kinds() {
        let id = RiverId::from("A");
        assert_eq!(
            NetworkError::CyclicTopology { id: id.clone() }.kind(),
            ErrorKind::Topology
        );
        assert_eq!(NetworkError::TopologyNotBuilt.kind(), ErrorKind::Topology);
        assert_eq!(NetworkError::DuplicateId(id.clone()).kind(), ErrorKind::Schema);
        assert_eq!(
            NetworkError::missing_attribute(&id, "velocity").kind(),
            ErrorKind::MissingAttribute
        );
    }

    #[test]
    fn test_series_mismatch_message() {
        let err = NetworkError::SeriesMismatch {
            id: RiverId::from("B"),
            series: "era5".to_string(),
            expected: 12,
            found: 10,
        };
        let msg = err.to_string();
        assert!(msg.starts_with("Schema error"));
        assert!(msg.contains("12"));
        assert!(msg.contains("10"));
    }

    #[test]
    fn test_into_io_error() {
        let err: std::io::Error = NetworkError::TopologyNotBuilt.into();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidInput);
        assert!(err.to_string().starts_with("Topology error"));
        let not_found = std::io::Error::new(std::io::ErrorKind::NotFound, "rivers.json");
        let err: std::io::Error = NetworkError::from(not_found).into();
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    }

    #[test]
    fn test_missing_attribute_names_attribute() {
        let err = NetworkError::missing_attribute(&RiverId::from("C"), "velocity");
        assert_eq!(err.to_string(), "Missing attribute: segment C has no velocity");
    }
}
