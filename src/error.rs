//! Unified error type for trip clustering.

use thiserror::Error;

/// Errors raised by parameter validation.
///
/// Clustering itself never fails on well-formed input: an empty photo list
/// yields no trips rather than an error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TripClusterError {
    /// Distance weights that would divide by zero or produce NaN.
    #[error(
        "degenerate distance weights: time={time_weight}, location={location_weight} \
         (both must be finite and non-negative, with a positive sum)"
    )]
    DegenerateWeights {
        time_weight: f64,
        location_weight: f64,
    },

    /// A numeric parameter outside its accepted range.
    #[error("invalid parameter {name}={value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    /// Algorithm name that is neither "timegap" nor "hdbscan".
    #[error("unknown clustering algorithm: {0}")]
    UnknownAlgorithm(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TripClusterError>;

/// Reject NaN/infinite values and values below `min`.
pub(crate) fn ensure_at_least(name: &'static str, value: f64, min: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(TripClusterError::InvalidParameter {
            name,
            value,
            reason: "must be finite",
        });
    }
    if value < min {
        return Err(TripClusterError::InvalidParameter {
            name,
            value,
            reason: "below minimum",
        });
    }
    Ok(())
}
