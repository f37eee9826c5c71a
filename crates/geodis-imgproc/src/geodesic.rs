use std::time::Instant;

use geodis_tensor::Tensor;

use crate::{
    axis::{AxisDriver, Spacing3},
    error::GeodesicError,
    params::GeodesicParams,
};

/// Check that `image` is `[C, ...]` with `C > 0` and `mask` is `[1, ...]` over the same grid.
fn validate_grids<const N: usize>(
    image: &Tensor<f32, N>,
    mask: &Tensor<f32, N>,
) -> Result<(), GeodesicError> {
    if image.shape[0] == 0 {
        return Err(GeodesicError::InvalidChannelCount);
    }

    let mut expected = image.shape;
    expected[0] = 1;
    if mask.shape != expected {
        let message = if mask.shape[0] != 1 {
            "seed mask must have a single channel"
        } else {
            "image and seed mask spatial dimensions differ"
        };
        return Err(GeodesicError::invalid_shape(message, &expected, &mask.shape));
    }
    Ok(())
}

/// Iteratively relaxes distance fields with a reusable axis driver.
///
/// Parameters are validated once at construction; grids are validated on every
/// call, before any pass runs.
///
/// # Example
///
/// ```
/// use geodis_imgproc::{geodesic::GeodesicSolver, params::GeodesicParams};
/// use geodis_tensor::Tensor;
///
/// let image = Tensor::<f32, 3>::zeros([1, 1, 5]);
/// let mask = Tensor::<f32, 3>::from_shape_vec([1, 1, 5], vec![0.0, 1.0, 1.0, 1.0, 1.0]).unwrap();
///
/// let params = GeodesicParams::default().with_lambda_grad(0.0).with_iterations(1);
/// let mut solver = GeodesicSolver::new(params).unwrap();
/// let distance = solver.solve_2d(&image, &mask).unwrap();
/// assert_eq!(distance.as_slice(), &[0.0, 1.0, 2.0, 3.0, 4.0]);
/// ```
pub struct GeodesicSolver {
    params: GeodesicParams,
    driver: AxisDriver,
}

impl GeodesicSolver {
    /// Validate `params` and set up the worker pool.
    pub fn new(params: GeodesicParams) -> Result<Self, GeodesicError> {
        params.validate()?;
        Ok(Self {
            params,
            driver: AxisDriver::new(params.strategy)?,
        })
    }

    /// The parameters this solver runs with.
    pub fn params(&self) -> &GeodesicParams {
        &self.params
    }

    /// Geodesic distance of every cell of a `[C, H, W]` image to the seeds of a `[1, H, W]` mask.
    pub fn solve_2d(
        &mut self,
        image: &Tensor<f32, 3>,
        mask: &Tensor<f32, 3>,
    ) -> Result<Tensor<f32, 3>, GeodesicError> {
        validate_grids(image, mask)?;

        let GeodesicParams {
            v,
            lambda_grad,
            lambda_eucl,
            iterations,
            ..
        } = self.params;
        let mut distance = mask.map(|m| v * m);

        let start = Instant::now();
        for i in 0..iterations {
            let now = Instant::now();
            self.driver
                .cycle_2d(image, &mut distance, lambda_grad, lambda_eucl)?;
            log::debug!("geodesic 2d iteration {} took {:?}", i, now.elapsed());
        }
        log::debug!(
            "geodesic 2d on {:?} finished {} iterations in {:?}",
            image.shape,
            iterations,
            start.elapsed()
        );

        Ok(distance)
    }

    /// Geodesic distance of every cell of a `[C, D, H, W]` volume to the seeds of a
    /// `[1, D, H, W]` mask.
    pub fn solve_3d(
        &mut self,
        image: &Tensor<f32, 4>,
        mask: &Tensor<f32, 4>,
        spacing: Spacing3,
    ) -> Result<Tensor<f32, 4>, GeodesicError> {
        validate_grids(image, mask)?;
        spacing.validate()?;

        let GeodesicParams {
            v,
            lambda_grad,
            lambda_eucl,
            iterations,
            ..
        } = self.params;
        let mut distance = mask.map(|m| v * m);

        let start = Instant::now();
        for i in 0..iterations {
            let now = Instant::now();
            self.driver
                .cycle_3d(image, &mut distance, &spacing, lambda_grad, lambda_eucl)?;
            log::debug!("geodesic 3d iteration {} took {:?}", i, now.elapsed());
        }
        log::debug!(
            "geodesic 3d on {:?} with {:?} finished {} iterations in {:?}",
            image.shape,
            spacing,
            iterations,
            start.elapsed()
        );

        Ok(distance)
    }
}

/// Compute the generalised geodesic distance transform of a 2D image.
///
/// # Arguments
///
/// * `image` - The input image with shape (C, H, W).
/// * `mask` - The seed mask with shape (1, H, W); cells where `v * mask` is zero are seeds.
/// * `params` - Initial value, term weights, iterations and execution strategy.
///
/// # Returns
///
/// The distance field with shape (1, H, W).
///
/// # Errors
///
/// Returns an error if the grids disagree, the image has no channels, or a parameter is invalid.
pub fn generalised_geodesic2d(
    image: &Tensor<f32, 3>,
    mask: &Tensor<f32, 3>,
    params: &GeodesicParams,
) -> Result<Tensor<f32, 3>, GeodesicError> {
    GeodesicSolver::new(*params)?.solve_2d(image, mask)
}

/// Compute the generalised geodesic distance transform of a 3D volume.
///
/// # Arguments
///
/// * `image` - The input volume with shape (C, D, H, W).
/// * `mask` - The seed mask with shape (1, D, H, W).
/// * `spacing` - Physical voxel size along depth, height and width.
/// * `params` - Initial value, term weights, iterations and execution strategy.
///
/// # Returns
///
/// The distance field with shape (1, D, H, W).
pub fn generalised_geodesic3d(
    image: &Tensor<f32, 4>,
    mask: &Tensor<f32, 4>,
    spacing: Spacing3,
    params: &GeodesicParams,
) -> Result<Tensor<f32, 4>, GeodesicError> {
    GeodesicSolver::new(*params)?.solve_3d(image, mask, spacing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parallel::ExecutionStrategy;

    #[test]
    fn line_scenario() -> Result<(), GeodesicError> {
        let image = Tensor::<f32, 3>::zeros([1, 1, 5]);
        let mask = Tensor::<f32, 3>::from_shape_vec([1, 1, 5], vec![0.0, 1.0, 1.0, 1.0, 1.0])?;
        let params = GeodesicParams::default()
            .with_lambda_grad(0.0)
            .with_iterations(1);
        let distance = generalised_geodesic2d(&image, &mask, &params)?;
        assert_eq!(distance.shape, [1, 1, 5]);
        assert_eq!(distance.as_slice(), &[0.0, 1.0, 2.0, 3.0, 4.0]);
        Ok(())
    }

    #[test]
    fn zero_iterations_returns_initial_field() -> Result<(), GeodesicError> {
        let image = Tensor::<f32, 3>::zeros([1, 2, 2]);
        let mask = Tensor::<f32, 3>::from_shape_vec([1, 2, 2], vec![0.0, 0.5, 1.0, 1.0])?;
        let params = GeodesicParams::default().with_v(4.0).with_iterations(0);
        let distance = generalised_geodesic2d(&image, &mask, &params)?;
        assert_eq!(distance.as_slice(), &[0.0, 2.0, 4.0, 4.0]);
        Ok(())
    }

    #[test]
    fn mask_shape_rejected() {
        let image = Tensor::<f32, 3>::zeros([1, 4, 4]);
        let params = GeodesicParams::default();

        let mask = Tensor::<f32, 3>::zeros([2, 4, 4]);
        let err = generalised_geodesic2d(&image, &mask, &params).unwrap_err();
        assert_eq!(
            err,
            GeodesicError::invalid_shape(
                "seed mask must have a single channel",
                &[1, 4, 4],
                &[2, 4, 4]
            )
        );

        let mask = Tensor::<f32, 3>::zeros([1, 4, 3]);
        assert!(matches!(
            generalised_geodesic2d(&image, &mask, &params),
            Err(GeodesicError::InvalidShape { .. })
        ));
    }

    #[test]
    fn empty_channels_rejected() {
        let image = Tensor::<f32, 4>::zeros([0, 2, 2, 2]);
        let mask = Tensor::<f32, 4>::zeros([1, 2, 2, 2]);
        assert_eq!(
            generalised_geodesic3d(&image, &mask, Spacing3::default(), &GeodesicParams::default())
                .unwrap_err(),
            GeodesicError::InvalidChannelCount
        );
    }

    #[test]
    fn invalid_strategy_rejected() {
        let params = GeodesicParams::default().with_strategy(ExecutionStrategy::Fixed(0));
        assert!(matches!(
            GeodesicSolver::new(params),
            Err(GeodesicError::Parallel(_))
        ));
    }

    #[test]
    fn solver_is_reusable() -> Result<(), GeodesicError> {
        let image = Tensor::<f32, 3>::from_shape_fn([1, 6, 6], |[_, h, w]| (h * w) as f32);
        let mut mask = Tensor::<f32, 3>::from_shape_val([1, 6, 6], 1.0);
        *mask.get_mut([0, 3, 3]).unwrap() = 0.0;

        let mut solver = GeodesicSolver::new(GeodesicParams::default())?;
        let first = solver.solve_2d(&image, &mask)?;
        let second = solver.solve_2d(&image, &mask)?;
        assert_eq!(first, second);
        Ok(())
    }
}
