#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]
//!
//! # Overview
//!
//! `geodis-tensor` provides the owned, row-major [`Tensor`] used to hold images,
//! seed masks and distance fields, together with borrowed views whose strides can
//! be permuted. Permuting a view re-presents the same buffer with a different
//! axis order, which lets the geodesic sweeps traverse any spatial axis of a grid
//! without transposing or copying it.
//!
//! # Quick Start
//!
//! ```rust
//! use geodis_tensor::Tensor;
//!
//! // a single channel 2x3 image stored as [C, H, W]
//! let image = Tensor::<f32, 3>::from_shape_vec([1, 2, 3], vec![0.0; 6]).unwrap();
//!
//! // present the width as the leading spatial axis
//! let view = image.permute_axes([0, 2, 1]).unwrap();
//! assert_eq!(view.shape, [1, 3, 2]);
//! ```

/// Tensor module containing the owned tensor and error types.
pub mod tensor;

/// View module containing non-owning, stride-permutable views.
pub mod view;

pub use crate::tensor::{get_strides_from_shape, Tensor, TensorError};
pub use crate::view::{TensorView, TensorViewMut};

/// Type alias for a 3-dimensional tensor, e.g. a `[C, H, W]` image.
pub type Tensor3<T> = Tensor<T, 3>;

/// Type alias for a 4-dimensional tensor, e.g. a `[C, D, H, W]` volume.
pub type Tensor4<T> = Tensor<T, 4>;
