//! Error types for opt-in validation.
//!
//! The simulation itself never fails; degenerate input produces degenerate
//! numbers. These errors are only returned by the explicit `validate` and
//! `try_*` entry points.

use thiserror::Error;

/// Errors reported when validating shapes, bodies or configuration.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PhysicsError {
    /// A shape dimension is negative or not finite.
    #[error("invalid {dimension} for {shape}: {value} (must be finite and non-negative)")]
    InvalidDimension {
        /// Shape kind name.
        shape: &'static str,
        /// Which dimension was rejected.
        dimension: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// Mass is not finite.
    #[error("invalid mass: {0} (must be finite)")]
    InvalidMass(f64),

    /// Time step is not positive and finite.
    #[error("invalid timestep: {0} (must be positive and finite)")]
    InvalidTimestep(f64),

    /// Configuration rejected.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Why the configuration was rejected.
        reason: String,
    },
}

impl PhysicsError {
    /// Create an invalid configuration error.
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }
}

/// Result alias for validation entry points.
pub type Result<T> = std::result::Result<T, PhysicsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PhysicsError::InvalidDimension {
            shape: "box",
            dimension: "width",
            value: -1.0,
        };
        assert!(err.to_string().contains("width"));
        assert!(err.to_string().contains("box"));

        let err = PhysicsError::invalid_config("bad slop");
        assert_eq!(err.to_string(), "invalid configuration: bad slop");
    }
}
