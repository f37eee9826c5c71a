use geodis_tensor::TensorError;
use thiserror::Error;

use crate::parallel::ParallelError;

/// An error type for the geodesic transforms.
///
/// Every variant except [`GeodesicError::Parallel`] is produced by input
/// validation, before any relaxation pass runs.
#[derive(Error, Debug, PartialEq)]
pub enum GeodesicError {
    /// The image and the seed mask do not describe the same grid.
    #[error("Invalid shape: {message}. Expected: {expected}, got: {actual}")]
    InvalidShape {
        /// Human-readable description of the mismatch
        message: String,
        /// Expected shape description
        expected: String,
        /// Actual shape description
        actual: String,
    },

    /// A scalar parameter is out of its valid range.
    #[error("Invalid parameter `{name}` = {value}: {reason}")]
    InvalidParameter {
        /// Name of the parameter
        name: &'static str,
        /// The rejected value
        value: f32,
        /// Which range the parameter must lie in
        reason: &'static str,
    },

    /// The image has no channels.
    #[error("Image must have at least one channel")]
    InvalidChannelCount,

    /// The worker pool could not be set up.
    #[error(transparent)]
    Parallel(#[from] ParallelError),

    /// A tensor operation failed.
    #[error(transparent)]
    Tensor(#[from] TensorError),
}

impl GeodesicError {
    /// Creates an InvalidShape error with formatted shapes.
    pub fn invalid_shape(
        message: impl Into<String>,
        expected: &[usize],
        actual: &[usize],
    ) -> Self {
        Self::InvalidShape {
            message: message.into(),
            expected: format!("{:?}", expected),
            actual: format!("{:?}", actual),
        }
    }

    /// Creates an InvalidParameter error.
    pub fn invalid_parameter(name: &'static str, value: f32, reason: &'static str) -> Self {
        Self::InvalidParameter {
            name,
            value,
            reason,
        }
    }
}

/// Reject negative, infinite and NaN values.
pub(crate) fn ensure_non_negative(name: &'static str, value: f32) -> Result<(), GeodesicError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(GeodesicError::invalid_parameter(
            name,
            value,
            "must be finite and non-negative",
        ))
    }
}

/// Reject zero, negative, infinite and NaN values.
pub(crate) fn ensure_positive(name: &'static str, value: f32) -> Result<(), GeodesicError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(GeodesicError::invalid_parameter(
            name,
            value,
            "must be finite and positive",
        ))
    }
}
