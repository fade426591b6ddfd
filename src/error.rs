//! Error types for polyloop.
//!
//! This module defines all error types used throughout the library.

use thiserror::Error;

/// Result type alias using [`MeshError`].
pub type Result<T> = std::result::Result<T, MeshError>;

/// Errors that can occur while building or editing a polyhedron.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeshError {
    /// The polyhedron has no faces.
    #[error("polyhedron has no faces")]
    EmptyMesh,

    /// A face loop references a point outside the point array.
    #[error("face {face} references invalid point index {point}")]
    InvalidPointIndex {
        /// The face index.
        face: usize,
        /// The invalid point index.
        point: usize,
    },

    /// A face loop is too short or repeats a point on consecutive corners.
    #[error("face {face} is degenerate (loop too short or repeated consecutive point)")]
    DegenerateFace {
        /// The face index.
        face: usize,
    },

    /// An edge list entry is out of range.
    #[error("edge index {edge} is out of range (polyhedron has {edge_count} edges)")]
    InvalidEdgeIndex {
        /// The offending edge index.
        edge: usize,
        /// Number of edges in the polyhedron.
        edge_count: usize,
    },

    /// An input array or attribute table does not match the polyhedron.
    #[error("{what} has length {actual}, expected {expected}")]
    LengthMismatch {
        /// Which array disagrees.
        what: &'static str,
        /// Length implied by the polyhedron.
        expected: usize,
        /// Length actually supplied.
        actual: usize,
    },

    /// Invalid polyhedron state (a topological invariant does not hold).
    #[error("invalid polyhedron state: {0}")]
    InvalidState(String),

    /// A defensive check failed while an operator was running.
    ///
    /// The batch is abandoned and the input is left untouched.
    #[error("{operation}: contract violation: {details}")]
    ContractViolation {
        /// The operator that detected the violation.
        operation: &'static str,
        /// What went wrong.
        details: String,
    },

    /// The requested edit joins two hole loops of different faces.
    #[error("edge {edge} and companion {companion} join holes of two different faces")]
    UnsupportedTopology {
        /// The requested edge.
        edge: usize,
        /// Its companion.
        companion: usize,
    },

    /// Invalid parameter value.
    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The invalid value (as string).
        value: String,
        /// Reason the value is invalid.
        reason: &'static str,
    },
}

impl MeshError {
    /// Create an invalid parameter error.
    pub fn invalid_param<T: std::fmt::Display>(
        name: &'static str,
        value: T,
        reason: &'static str,
    ) -> Self {
        MeshError::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }

    /// Create a contract violation error.
    pub fn contract(operation: &'static str, details: impl Into<String>) -> Self {
        MeshError::ContractViolation {
            operation,
            details: details.into(),
        }
    }

    /// Check that a supplied array has the expected length.
    pub(crate) fn check_len(what: &'static str, expected: usize, actual: usize) -> Result<()> {
        if expected == actual {
            Ok(())
        } else {
            Err(MeshError::LengthMismatch {
                what,
                expected,
                actual,
            })
        }
    }
}
