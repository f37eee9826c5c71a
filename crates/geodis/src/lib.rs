//! Fast generalised geodesic distance transforms for 2D and 3D images.
//!
//! This crate re-exports the workspace crates under short module names.

#[doc(inline)]
pub use geodis_tensor as tensor;

#[doc(inline)]
pub use geodis_imgproc as imgproc;
