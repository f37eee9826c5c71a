#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]
//!
//! The distance of a cell to a seed set is the minimum, over paths, of the
//! accumulated step costs `lambda_eucl * spatial + lambda_grad * |feature step|`.
//! It is approximated by raster-scan relaxation: every cycle sweeps each spatial
//! axis forward and backward, and more cycles only tighten the result.
//!
//! ```
//! use geodis_imgproc::{generalised_geodesic2d, GeodesicParams};
//! use geodis_tensor::Tensor;
//!
//! let image = Tensor::<f32, 3>::zeros([1, 4, 4]);
//! let mut mask = Tensor::<f32, 3>::from_shape_val([1, 4, 4], 1.0);
//! *mask.get_mut([0, 0, 0]).unwrap() = 0.0;
//!
//! let distance = generalised_geodesic2d(&image, &mask, &GeodesicParams::default()).unwrap();
//! assert_eq!(distance.get([0, 0, 3]), Some(&3.0));
//! ```

/// axis re-presentation and the per-cycle sweep driver.
pub mod axis;

/// error types for the geodesic transforms.
pub mod error;

/// signed geodesic distances and geodesic symmetric filtering.
pub mod filter;

/// generalised geodesic distance transforms.
pub mod geodesic;

/// feature dissimilarity between image cells.
pub mod metric;

/// module containing parallization utilities.
pub mod parallel;

/// transform and filter parameters.
pub mod params;

mod sweep;

pub use crate::axis::Spacing3;
pub use crate::error::GeodesicError;
pub use crate::filter::{
    geodesic_symmetric_filter2d, geodesic_symmetric_filter3d, signed_generalised_geodesic2d,
    signed_generalised_geodesic3d,
};
pub use crate::geodesic::{generalised_geodesic2d, generalised_geodesic3d, GeodesicSolver};
pub use crate::parallel::ExecutionStrategy;
pub use crate::params::{GeodesicParams, SymmetricFilterParams};
