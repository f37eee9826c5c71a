use geodis_tensor::Tensor;

use crate::{
    axis::Spacing3,
    error::GeodesicError,
    geodesic::GeodesicSolver,
    params::{GeodesicParams, SymmetricFilterParams},
};

/// `D(mask) - D(1 - mask)` for any transform `solve`.
fn signed_with<const N: usize, F>(
    mask: &Tensor<f32, N>,
    mut solve: F,
) -> Result<Tensor<f32, N>, GeodesicError>
where
    F: FnMut(&Tensor<f32, N>) -> Result<Tensor<f32, N>, GeodesicError>,
{
    let to_seeds = solve(mask)?;
    let to_complement = solve(&mask.map(|m| 1.0 - m))?;
    Ok(to_seeds.element_wise_op(&to_complement, |a, b| a - b)?)
}

/// Geodesic closing followed by opening, both thresholded at `theta`.
fn symmetric_filter_with<const N: usize, F>(
    mask: &Tensor<f32, N>,
    theta: f32,
    mut solve: F,
) -> Result<Tensor<f32, N>, GeodesicError>
where
    F: FnMut(&Tensor<f32, N>) -> Result<Tensor<f32, N>, GeodesicError>,
{
    let signed = signed_with(mask, &mut solve)?;

    let dilated = signed.map(|&d| if d > theta { 1.0 } else { 0.0 });
    let eroded = signed.map(|&d| if d > -theta { 1.0 } else { 0.0 });

    let dilated_distance = signed_with(&dilated.map(|m| 1.0 - m), &mut solve)?;
    let eroded_distance = signed_with(&eroded, &mut solve)?;

    Ok(eroded_distance.element_wise_op(&dilated_distance, |e, d| e - d)?)
}

/// Compute the signed generalised geodesic distance of a 2D image.
///
/// The result is `D(mask) - D(1 - mask)`: positive where the mask is set,
/// negative where it is not, and crossing zero at the mask boundary.
///
/// # Arguments
///
/// * `image` - The input image with shape (C, H, W).
/// * `mask` - The (soft) mask with shape (1, H, W).
/// * `params` - Parameters shared by both underlying transforms.
pub fn signed_generalised_geodesic2d(
    image: &Tensor<f32, 3>,
    mask: &Tensor<f32, 3>,
    params: &GeodesicParams,
) -> Result<Tensor<f32, 3>, GeodesicError> {
    let mut solver = GeodesicSolver::new(*params)?;
    signed_with(mask, |m| solver.solve_2d(image, m))
}

/// Compute the signed generalised geodesic distance of a 3D volume.
///
/// See [`signed_generalised_geodesic2d`].
pub fn signed_generalised_geodesic3d(
    image: &Tensor<f32, 4>,
    mask: &Tensor<f32, 4>,
    spacing: Spacing3,
    params: &GeodesicParams,
) -> Result<Tensor<f32, 4>, GeodesicError> {
    let mut solver = GeodesicSolver::new(*params)?;
    signed_with(mask, |m| solver.solve_3d(image, m, spacing))
}

/// Geodesic symmetric filtering (GSF) of a 2D mask guided by an image.
///
/// The signed distance of `mask` is thresholded at `theta` and `-theta` to obtain
/// a dilated and an eroded mask; the output sums the signed distance of the
/// eroded mask and the negated signed distance of the dilated mask's complement.
/// Thresholding the output at zero yields the smoothed segmentation.
///
/// # Arguments
///
/// * `image` - The guiding image with shape (C, H, W).
/// * `mask` - The mask to filter with shape (1, H, W).
/// * `params` - Threshold, blend factor and transform parameters.
pub fn geodesic_symmetric_filter2d(
    image: &Tensor<f32, 3>,
    mask: &Tensor<f32, 3>,
    params: &SymmetricFilterParams,
) -> Result<Tensor<f32, 3>, GeodesicError> {
    params.validate()?;
    let mut solver = GeodesicSolver::new(params.geodesic_params())?;
    symmetric_filter_with(mask, params.theta, |m| solver.solve_2d(image, m))
}

/// Geodesic symmetric filtering (GSF) of a 3D mask guided by a volume.
///
/// See [`geodesic_symmetric_filter2d`].
pub fn geodesic_symmetric_filter3d(
    image: &Tensor<f32, 4>,
    mask: &Tensor<f32, 4>,
    spacing: Spacing3,
    params: &SymmetricFilterParams,
) -> Result<Tensor<f32, 4>, GeodesicError> {
    params.validate()?;
    let mut solver = GeodesicSolver::new(params.geodesic_params())?;
    symmetric_filter_with(mask, params.theta, |m| solver.solve_3d(image, m, spacing))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(values: Vec<f32>) -> Result<Tensor<f32, 3>, GeodesicError> {
        Ok(Tensor::from_shape_vec([1, 1, values.len()], values)?)
    }

    fn spatial_filter(theta: f32) -> SymmetricFilterParams {
        SymmetricFilterParams {
            theta,
            lambda: 0.0,
            iterations: 1,
            ..Default::default()
        }
    }

    #[test]
    fn signed_line() -> Result<(), GeodesicError> {
        let image = Tensor::<f32, 3>::zeros([1, 1, 5]);
        let mask = line(vec![0.0, 0.0, 1.0, 1.0, 1.0])?;
        let params = GeodesicParams::default()
            .with_lambda_grad(0.0)
            .with_iterations(1);
        let signed = signed_generalised_geodesic2d(&image, &mask, &params)?;
        assert_eq!(signed.as_slice(), &[-2.0, -1.0, 1.0, 2.0, 3.0]);
        Ok(())
    }

    #[test]
    fn symmetric_filter_zero_theta() -> Result<(), GeodesicError> {
        let image = Tensor::<f32, 3>::zeros([1, 1, 5]);
        let mask = line(vec![0.0, 0.0, 1.0, 1.0, 1.0])?;
        let filtered = geodesic_symmetric_filter2d(&image, &mask, &spatial_filter(0.0))?;
        assert_eq!(filtered.as_slice(), &[-4.0, -2.0, 2.0, 4.0, 6.0]);
        Ok(())
    }

    #[test]
    fn symmetric_filter_threshold() -> Result<(), GeodesicError> {
        let image = Tensor::<f32, 3>::zeros([1, 1, 5]);
        let mask = line(vec![0.0, 0.0, 1.0, 1.0, 1.0])?;
        let filtered = geodesic_symmetric_filter2d(&image, &mask, &spatial_filter(1.5))?;
        assert_eq!(filtered.as_slice(), &[-4.0, -1.0, 1.0, 4.0, 6.0]);
        Ok(())
    }

    #[test]
    fn symmetric_filter_3d_shape() -> Result<(), GeodesicError> {
        let image = Tensor::<f32, 4>::from_shape_fn([2, 3, 4, 5], |[c, d, h, w]| {
            (c + d * h + w) as f32 * 0.1
        });
        let mask = Tensor::<f32, 4>::from_shape_fn([1, 3, 4, 5], |[_, d, h, w]| {
            if d + h + w > 5 {
                1.0
            } else {
                0.0
            }
        });
        let params = SymmetricFilterParams {
            lambda: 0.5,
            ..Default::default()
        };
        let filtered =
            geodesic_symmetric_filter3d(&image, &mask, Spacing3::new(1.0, 0.5, 0.5), &params)?;
        assert_eq!(filtered.shape, [1, 3, 4, 5]);
        assert!(filtered.as_slice().iter().all(|d| d.is_finite()));
        Ok(())
    }

    #[test]
    fn symmetric_filter_rejects_lambda() {
        let image = Tensor::<f32, 3>::zeros([1, 2, 2]);
        let mask = Tensor::<f32, 3>::zeros([1, 2, 2]);
        let params = SymmetricFilterParams {
            lambda: -0.1,
            ..Default::default()
        };
        assert!(matches!(
            geodesic_symmetric_filter2d(&image, &mask, &params),
            Err(GeodesicError::InvalidParameter { name: "lambda", .. })
        ));
    }
}
