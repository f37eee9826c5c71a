use crate::{
    error::{ensure_non_negative, GeodesicError},
    parallel::ExecutionStrategy,
};

/// Parameters of the generalised geodesic distance transform.
///
/// The initial distance field is `v * mask`, so `v` is the value non-seed cells
/// start from and should exceed any reachable distance.
///
/// # Example
///
/// ```
/// use geodis_imgproc::params::GeodesicParams;
///
/// let params = GeodesicParams::default()
///     .with_lambda_grad(0.0)
///     .with_iterations(4);
/// assert!(params.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeodesicParams {
    /// Initial distance of non-seed cells.
    pub v: f32,
    /// Weight of the image gradient (feature) term.
    pub lambda_grad: f32,
    /// Weight of the spatial (euclidean) term.
    pub lambda_eucl: f32,
    /// Number of full sweep cycles.
    pub iterations: usize,
    /// How the cells of each layer are scheduled.
    pub strategy: ExecutionStrategy,
}

impl Default for GeodesicParams {
    fn default() -> Self {
        Self {
            v: 1e10,
            lambda_grad: 1.0,
            lambda_eucl: 1.0,
            iterations: 2,
            strategy: ExecutionStrategy::default(),
        }
    }
}

impl GeodesicParams {
    /// Set the initial distance of non-seed cells.
    pub fn with_v(mut self, v: f32) -> Self {
        self.v = v;
        self
    }

    /// Set the weight of the feature term.
    pub fn with_lambda_grad(mut self, lambda_grad: f32) -> Self {
        self.lambda_grad = lambda_grad;
        self
    }

    /// Set the weight of the spatial term.
    pub fn with_lambda_eucl(mut self, lambda_eucl: f32) -> Self {
        self.lambda_eucl = lambda_eucl;
        self
    }

    /// Set the number of sweep cycles.
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Set the execution strategy.
    pub fn with_strategy(mut self, strategy: ExecutionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Check that `v` and both weights are finite and non-negative.
    pub fn validate(&self) -> Result<(), GeodesicError> {
        ensure_non_negative("v", self.v)?;
        ensure_non_negative("lambda_grad", self.lambda_grad)?;
        ensure_non_negative("lambda_eucl", self.lambda_eucl)?;
        Ok(())
    }
}

/// Parameters of the geodesic symmetric filter.
///
/// `lambda` blends the two terms of the underlying transforms: the feature term
/// is weighted by `lambda` and the spatial term by `1 - lambda`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SymmetricFilterParams {
    /// Signed distance threshold used for the dilation and erosion masks.
    pub theta: f32,
    /// Initial distance of non-seed cells.
    pub v: f32,
    /// Blend between feature (`1.0`) and spatial (`0.0`) distance.
    pub lambda: f32,
    /// Number of full sweep cycles per transform.
    pub iterations: usize,
    /// How the cells of each layer are scheduled.
    pub strategy: ExecutionStrategy,
}

impl Default for SymmetricFilterParams {
    fn default() -> Self {
        Self {
            theta: 0.0,
            v: 1e10,
            lambda: 1.0,
            iterations: 2,
            strategy: ExecutionStrategy::default(),
        }
    }
}

impl SymmetricFilterParams {
    /// Check that `lambda` lies in `[0, 1]`, `theta` is finite and `v` is valid.
    pub fn validate(&self) -> Result<(), GeodesicError> {
        if !(0.0..=1.0).contains(&self.lambda) {
            return Err(GeodesicError::invalid_parameter(
                "lambda",
                self.lambda,
                "must lie in [0, 1]",
            ));
        }
        if !self.theta.is_finite() {
            return Err(GeodesicError::invalid_parameter(
                "theta",
                self.theta,
                "must be finite",
            ));
        }
        self.geodesic_params().validate()
    }

    /// Parameters of the geodesic transforms the filter is built from.
    pub fn geodesic_params(&self) -> GeodesicParams {
        GeodesicParams {
            v: self.v,
            lambda_grad: self.lambda,
            lambda_eucl: 1.0 - self.lambda,
            iterations: self.iterations,
            strategy: self.strategy,
        }
    }
}
