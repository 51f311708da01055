use thiserror::Error;

use crate::coordinate::CoordinateSystem;

pub type Result<T> = std::result::Result<T, ConversionError>;

/// Caller-contract violations reported by the converter and calculation layers.
///
/// Geodesic search non-convergence is not an error; it is reported through
/// [`crate::search::NumericalSearchType`] next to a best-effort result.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConversionError {
    #[error("reference origin has not been set")]
    NoReferenceOrigin,

    #[error("reference origin is at or near a pole, scaled flat earth systems are degenerate")]
    DegenerateOrigin,

    #[error("conversion from {from} to {to} is not supported")]
    UnsupportedConversion {
        from: CoordinateSystem,
        to: CoordinateSystem,
    },

    #[error("expected a {expected} coordinate, found {found}")]
    InvalidSystem {
        expected: &'static str,
        found: CoordinateSystem,
    },

    #[error("elapsed ECI time {0} is not finite")]
    NonFiniteEciTime(f64),

    #[error("{0}: no output was requested")]
    NoOutputRequested(&'static str),

    #[error("{0}: flat earth model requires a converter with a reference origin")]
    MissingConverter(&'static str),

    #[error("{operation} is not defined for the {model} earth model")]
    UnsupportedModel {
        operation: &'static str,
        model: &'static str,
    },
}
