use rayon::prelude::*;
use thiserror::Error;

/// Errors that can occur during parallel execution.
#[derive(Error, Debug, PartialEq)]
pub enum ParallelError {
    /// The thread pool failed to build.
    #[error("failed to build thread pool: {0}")]
    BuildError(String),

    /// The requested thread count is invalid.
    #[error("thread count must be > 0, got {0}")]
    InvalidThreadCount(usize),
}

/// Controls how the cells of one sweep layer are relaxed.
///
/// Layers along the swept axis are always processed one after another; the
/// strategy only decides how the independent cells inside a layer are spread
/// over threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExecutionStrategy {
    /// Use the global Rayon thread pool to relax the cells of a layer in parallel.
    #[default]
    ParallelElements,

    /// Run sequentially on the current thread.
    ///
    /// Useful for small grids, debugging, or when the overhead of parallelization
    /// outweighs the benefits.
    Serial,

    /// Run on a local thread pool with `n` threads.
    ///
    /// The pool is built once per solver and reused for every layer.
    Fixed(usize),
}

/// Minimum number of cells handed to one Rayon task.
const MIN_CELLS_PER_TASK: usize = 64;

/// Runs the per-cell work of a layer according to an [`ExecutionStrategy`].
pub struct LayerExecutor {
    strategy: ExecutionStrategy,
    pool: Option<rayon::ThreadPool>,
}

impl LayerExecutor {
    /// Create an executor, building a local thread pool for [`ExecutionStrategy::Fixed`].
    ///
    /// # Errors
    ///
    /// Returns an error if the thread count is zero or the pool cannot be built.
    pub fn new(strategy: ExecutionStrategy) -> Result<Self, ParallelError> {
        let pool = match strategy {
            ExecutionStrategy::Fixed(0) => return Err(ParallelError::InvalidThreadCount(0)),
            ExecutionStrategy::Fixed(n) => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .build()
                    .map_err(|e| ParallelError::BuildError(e.to_string()))?,
            ),
            ExecutionStrategy::ParallelElements | ExecutionStrategy::Serial => None,
        };
        Ok(Self { strategy, pool })
    }

    /// Fill `dst` by evaluating `op` on every cell index.
    ///
    /// Returns only once every cell has been written, which makes each call a
    /// barrier between consecutive layers.
    pub fn fill_indexed<T, F>(&self, dst: &mut [T], op: F)
    where
        T: Send,
        F: Fn(usize) -> T + Sync + Send,
    {
        let par_fill = |dst: &mut [T]| {
            dst.par_iter_mut()
                .with_min_len(MIN_CELLS_PER_TASK)
                .enumerate()
                .for_each(|(k, out)| *out = op(k));
        };

        match (self.strategy, &self.pool) {
            (ExecutionStrategy::Serial, _) => {
                dst.iter_mut().enumerate().for_each(|(k, out)| *out = op(k));
            }
            (_, Some(pool)) => pool.install(|| par_fill(dst)),
            (_, None) => par_fill(dst),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn squares(strategy: ExecutionStrategy) -> Result<Vec<usize>, ParallelError> {
        let executor = LayerExecutor::new(strategy)?;
        let mut dst = vec![0; 1000];
        executor.fill_indexed(&mut dst, |k| k * k);
        Ok(dst)
    }

    #[test]
    fn test_fill_serial() -> Result<(), ParallelError> {
        let dst = squares(ExecutionStrategy::Serial)?;
        assert_eq!(dst[0], 0);
        assert_eq!(dst[999], 999 * 999);
        Ok(())
    }

    #[test]
    fn test_fill_strategies_agree() -> Result<(), ParallelError> {
        let serial = squares(ExecutionStrategy::Serial)?;
        assert_eq!(squares(ExecutionStrategy::ParallelElements)?, serial);
        assert_eq!(squares(ExecutionStrategy::Fixed(2))?, serial);
        Ok(())
    }

    #[test]
    fn test_fixed_error() {
        assert!(matches!(
            LayerExecutor::new(ExecutionStrategy::Fixed(0)),
            Err(ParallelError::InvalidThreadCount(0))
        ));
    }

    #[test]
    fn test_default_strategy() {
        assert_eq!(
            ExecutionStrategy::default(),
            ExecutionStrategy::ParallelElements
        );
    }
}
