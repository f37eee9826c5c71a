use geodis_tensor::Tensor;

use crate::{
    error::{ensure_positive, GeodesicError},
    parallel::{ExecutionStrategy, LayerExecutor},
    sweep::{sweep, SweepKernel, SweepLayout},
};

/// Physical voxel size along the (depth, height, width) axes of a volume.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Spacing3 {
    /// Voxel size along the depth axis.
    pub depth: f32,
    /// Voxel size along the height axis.
    pub height: f32,
    /// Voxel size along the width axis.
    pub width: f32,
}

impl Spacing3 {
    /// Create a spacing from `(depth, height, width)` sizes.
    pub fn new(depth: f32, height: f32, width: f32) -> Self {
        Self {
            depth,
            height,
            width,
        }
    }

    /// Same voxel size along every axis.
    pub fn uniform(value: f32) -> Self {
        Self::new(value, value, value)
    }

    /// Check that every component is finite and strictly positive.
    pub fn validate(&self) -> Result<(), GeodesicError> {
        ensure_positive("spacing.depth", self.depth)?;
        ensure_positive("spacing.height", self.height)?;
        ensure_positive("spacing.width", self.width)?;
        Ok(())
    }

    /// Spacing ordered as (primary, secondary1, secondary2) for a sweep along `axis`.
    ///
    /// # Example
    ///
    /// ```
    /// use geodis_imgproc::axis::{Spacing3, VolumetricAxis};
    ///
    /// let spacing = Spacing3::new(3.0, 2.0, 1.0);
    /// assert_eq!(spacing.permuted(VolumetricAxis::Height), [2.0, 3.0, 1.0]);
    /// assert_eq!(spacing.permuted(VolumetricAxis::Width), [1.0, 2.0, 3.0]);
    /// ```
    pub fn permuted(&self, axis: VolumetricAxis) -> [f32; 3] {
        match axis {
            VolumetricAxis::Depth => [self.depth, self.height, self.width],
            VolumetricAxis::Height => [self.height, self.depth, self.width],
            VolumetricAxis::Width => [self.width, self.height, self.depth],
        }
    }
}

impl Default for Spacing3 {
    fn default() -> Self {
        Self::uniform(1.0)
    }
}

impl From<[f32; 3]> for Spacing3 {
    fn from([depth, height, width]: [f32; 3]) -> Self {
        Self::new(depth, height, width)
    }
}

/// Spatial axes of a `[C, H, W]` image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanarAxis {
    /// Rows, swept top to bottom and back.
    Height,
    /// Columns, swept left to right and back.
    Width,
}

impl PlanarAxis {
    /// Order in which one cycle sweeps the axes.
    pub const SWEEP_ORDER: [PlanarAxis; 2] = [PlanarAxis::Height, PlanarAxis::Width];

    /// Axes permutation presenting this axis as the primary (second) one.
    pub fn permutation(self) -> [usize; 3] {
        match self {
            PlanarAxis::Height => [0, 1, 2],
            PlanarAxis::Width => [0, 2, 1],
        }
    }
}

/// Spatial axes of a `[C, D, H, W]` volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumetricAxis {
    /// Slices, swept front to back and back.
    Depth,
    /// Rows, swept top to bottom and back.
    Height,
    /// Columns, swept left to right and back.
    Width,
}

impl VolumetricAxis {
    /// Order in which one cycle sweeps the axes.
    pub const SWEEP_ORDER: [VolumetricAxis; 3] = [
        VolumetricAxis::Depth,
        VolumetricAxis::Height,
        VolumetricAxis::Width,
    ];

    /// Axes permutation presenting this axis as the primary (second) one.
    ///
    /// The secondary axes keep the order that matches [`Spacing3::permuted`].
    pub fn permutation(self) -> [usize; 4] {
        match self {
            VolumetricAxis::Depth => [0, 1, 2, 3],
            VolumetricAxis::Height => [0, 2, 1, 3],
            VolumetricAxis::Width => [0, 3, 2, 1],
        }
    }
}

/// Runs one full cycle of directional sweeps over every spatial axis of a grid.
///
/// Each axis is made primary by permuting the strides of borrowed views of the
/// image and the distance field, so the caller's buffers never change layout and
/// image and distance cells stay in elementwise correspondence. The scratch
/// layer and the worker pool are reused across axes and cycles.
pub struct AxisDriver {
    executor: LayerExecutor,
    scratch: Vec<f32>,
}

impl AxisDriver {
    /// Create a driver running the cells of each layer with `strategy`.
    pub fn new(strategy: ExecutionStrategy) -> Result<Self, GeodesicError> {
        Ok(Self {
            executor: LayerExecutor::new(strategy)?,
            scratch: Vec::new(),
        })
    }

    /// Sweep a `[1, H, W]` distance field along height, then width, using a `[C, H, W]` image.
    pub fn cycle_2d(
        &mut self,
        image: &Tensor<f32, 3>,
        distance: &mut Tensor<f32, 3>,
        lambda_grad: f32,
        lambda_eucl: f32,
    ) -> Result<(), GeodesicError> {
        let kernel = SweepKernel::planar(lambda_grad, lambda_eucl);
        for axis in PlanarAxis::SWEEP_ORDER {
            let axes = axis.permutation();
            let image_view = image.permute_axes(axes)?;
            let mut distance_view = distance.permute_axes_mut(axes)?;
            let layout = SweepLayout::planar(&image_view, &distance_view);
            log::trace!("sweeping {:?} axis with layout {:?}", axis, layout);
            sweep(
                image_view.as_slice(),
                distance_view.as_slice_mut(),
                &layout,
                &kernel,
                &self.executor,
                &mut self.scratch,
            );
        }
        Ok(())
    }

    /// Sweep a `[1, D, H, W]` distance field along depth, height, then width.
    pub fn cycle_3d(
        &mut self,
        image: &Tensor<f32, 4>,
        distance: &mut Tensor<f32, 4>,
        spacing: &Spacing3,
        lambda_grad: f32,
        lambda_eucl: f32,
    ) -> Result<(), GeodesicError> {
        for axis in VolumetricAxis::SWEEP_ORDER {
            let kernel = SweepKernel::volumetric(spacing.permuted(axis), lambda_grad, lambda_eucl);
            let axes = axis.permutation();
            let image_view = image.permute_axes(axes)?;
            let mut distance_view = distance.permute_axes_mut(axes)?;
            let layout = SweepLayout::volumetric(&image_view, &distance_view);
            log::trace!("sweeping {:?} axis with layout {:?}", axis, layout);
            sweep(
                image_view.as_slice(),
                distance_view.as_slice_mut(),
                &layout,
                &kernel,
                &self.executor,
                &mut self.scratch,
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn permutations_match_spacing_order() {
        // the secondary axes of each permutation must carry the secondary spacings
        let spacing = Spacing3::new(3.0, 2.0, 1.0);
        let by_axis = [spacing.depth, spacing.height, spacing.width];
        for axis in VolumetricAxis::SWEEP_ORDER {
            let perm = axis.permutation();
            let expected: Vec<f32> = perm[1..].iter().map(|&a| by_axis[a - 1]).collect();
            assert_eq!(spacing.permuted(axis).to_vec(), expected);
        }
    }

    #[test]
    fn spacing_validation() {
        assert!(Spacing3::default().validate().is_ok());
        assert!(Spacing3::new(1.0, 0.0, 1.0).validate().is_err());
        assert!(Spacing3::new(1.0, 1.0, f32::NAN).validate().is_err());
        assert_eq!(Spacing3::from([2.0, 1.0, 1.0]), Spacing3::new(2.0, 1.0, 1.0));
    }

    #[test]
    fn cycle_2d_reaches_corners() -> Result<(), GeodesicError> {
        let image = Tensor::<f32, 3>::zeros([1, 3, 3]);
        let mut distance = Tensor::<f32, 3>::from_shape_val([1, 3, 3], 1e10);
        *distance.get_mut([0, 1, 1]).unwrap() = 0.0;

        let mut driver = AxisDriver::new(ExecutionStrategy::Serial)?;
        driver.cycle_2d(&image, &mut distance, 0.0, 1.0)?;

        let s = std::f32::consts::SQRT_2;
        let expected = [s, 1.0, s, 1.0, 0.0, 1.0, s, 1.0, s];
        for (got, want) in distance.as_slice().iter().zip(expected) {
            assert_relative_eq!(*got, want, epsilon = 1e-6);
        }
        Ok(())
    }

    #[test]
    fn cycle_3d_anisotropic_axes() -> Result<(), GeodesicError> {
        let image = Tensor::<f32, 4>::zeros([1, 3, 3, 3]);
        let mut distance = Tensor::<f32, 4>::from_shape_val([1, 3, 3, 3], 1e10);
        *distance.get_mut([0, 0, 0, 0]).unwrap() = 0.0;

        let mut driver = AxisDriver::new(ExecutionStrategy::Serial)?;
        driver.cycle_3d(&image, &mut distance, &Spacing3::new(2.0, 1.0, 1.0), 0.0, 1.0)?;

        assert_eq!(distance.get([0, 2, 0, 0]), Some(&4.0));
        assert_eq!(distance.get([0, 0, 2, 0]), Some(&2.0));
        assert_eq!(distance.get([0, 0, 0, 2]), Some(&2.0));
        Ok(())
    }

    #[test]
    fn cycle_leaves_image_untouched() -> Result<(), GeodesicError> {
        let image = Tensor::<f32, 3>::from_shape_fn([2, 4, 5], |[c, h, w]| (c + h * w) as f32);
        let before = image.clone();
        let mut distance = Tensor::<f32, 3>::from_shape_val([1, 4, 5], 1e10);
        *distance.get_mut([0, 0, 0]).unwrap() = 0.0;

        let mut driver = AxisDriver::new(ExecutionStrategy::ParallelElements)?;
        driver.cycle_2d(&image, &mut distance, 1.0, 1.0)?;
        assert_eq!(image, before);
        assert_eq!(image.strides, [20, 5, 1]);
        Ok(())
    }
}
