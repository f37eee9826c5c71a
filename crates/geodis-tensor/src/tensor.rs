use thiserror::Error;

use crate::view::{TensorView, TensorViewMut};

/// An error type for tensor operations.
#[derive(Error, Debug, PartialEq)]
pub enum TensorError {
    /// Tensor shape does not match the provided data.
    ///
    /// The product of the shape dimensions must equal the number of elements.
    #[error(
        "Shape mismatch: expected {expected} elements for shape, but got {actual} elements in data"
    )]
    InvalidShape {
        /// Expected number of elements based on shape
        expected: usize,
        /// Actual number of elements in the data
        actual: usize,
    },

    /// Index exceeds tensor bounds.
    #[error("Index {index} out of bounds for dimension of size {size}")]
    IndexOutOfBounds {
        /// The invalid index that was attempted
        index: usize,
        /// The size of the dimension being indexed
        size: usize,
    },

    /// Tensor dimensions incompatible for the requested operation.
    #[error("Dimension mismatch: {message}. Expected shape: {expected}, got: {actual}")]
    DimensionMismatch {
        /// Human-readable description of the mismatch
        message: String,
        /// Expected shape description
        expected: String,
        /// Actual shape description
        actual: String,
    },

    /// The axes passed to a permutation are not a permutation of `0..N`.
    #[error("Invalid axes permutation: {0:?}")]
    InvalidPermutation(Vec<usize>),
}

impl TensorError {
    /// Creates an InvalidShape error with clear context.
    pub fn invalid_shape(expected: usize, actual: usize) -> Self {
        Self::InvalidShape { expected, actual }
    }

    /// Creates a DimensionMismatch error with formatted shapes.
    pub fn dimension_mismatch(
        message: impl Into<String>,
        expected: &[usize],
        actual: &[usize],
    ) -> Self {
        Self::DimensionMismatch {
            message: message.into(),
            expected: format!("{:?}", expected),
            actual: format!("{:?}", actual),
        }
    }
}

/// Compute the row-major strides of a tensor from its shape.
///
/// # Examples
///
/// ```rust
/// use geodis_tensor::get_strides_from_shape;
///
/// let strides = get_strides_from_shape([2, 3, 4]);
/// assert_eq!(strides, [12, 4, 1]);
/// ```
pub fn get_strides_from_shape<const N: usize>(shape: [usize; N]) -> [usize; N] {
    let mut strides: [usize; N] = [0; N];
    let mut stride = 1;
    for i in (0..shape.len()).rev() {
        strides[i] = stride;
        stride *= shape[i];
    }
    strides
}

/// Check that `axes` is a permutation of `0..N` and apply it to `shape` and `strides`.
pub(crate) fn permute_layout<const N: usize>(
    shape: [usize; N],
    strides: [usize; N],
    axes: [usize; N],
) -> Result<([usize; N], [usize; N]), TensorError> {
    let mut seen = [false; N];
    for &axis in axes.iter() {
        if axis >= N || seen[axis] {
            return Err(TensorError::InvalidPermutation(axes.to_vec()));
        }
        seen[axis] = true;
    }

    let mut new_shape = [0; N];
    let mut new_strides = [0; N];
    for (i, &axis) in axes.iter().enumerate() {
        new_shape[i] = shape[axis];
        new_strides[i] = strides[axis];
    }
    Ok((new_shape, new_strides))
}

/// A multi-dimensional array with owned, row-major data.
///
/// The grids consumed by the geodesic transforms are stored channel-first,
/// e.g. `[C, H, W]` for planar images and `[C, D, H, W]` for volumes.
///
/// # Examples
///
/// ```rust
/// use geodis_tensor::Tensor;
///
/// let t = Tensor::<f32, 3>::from_shape_vec([1, 2, 2], vec![0.0, 1.0, 2.0, 3.0]).unwrap();
/// assert_eq!(t.shape, [1, 2, 2]);
/// assert_eq!(t.strides, [4, 2, 1]);
/// assert_eq!(t.get([0, 1, 0]), Some(&2.0));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor<T, const N: usize> {
    storage: Vec<T>,
    /// The shape of the tensor.
    pub shape: [usize; N],
    /// The strides of the tensor data in memory.
    pub strides: [usize; N],
}

impl<T, const N: usize> Tensor<T, N> {
    /// Creates a new tensor with the given shape and data.
    ///
    /// # Errors
    ///
    /// If the number of elements in the data does not match the shape of the tensor, an error is returned.
    pub fn from_shape_vec(shape: [usize; N], data: Vec<T>) -> Result<Self, TensorError> {
        let numel = shape.iter().product::<usize>();
        if numel != data.len() {
            return Err(TensorError::invalid_shape(numel, data.len()));
        }
        Ok(Self {
            storage: data,
            shape,
            strides: get_strides_from_shape(shape),
        })
    }

    /// Creates a new tensor with the given shape by copying a slice of data.
    pub fn from_shape_slice(shape: [usize; N], data: &[T]) -> Result<Self, TensorError>
    where
        T: Clone,
    {
        Self::from_shape_vec(shape, data.to_vec())
    }

    /// Creates a new tensor with the given shape, filled with `value`.
    pub fn from_shape_val(shape: [usize; N], value: T) -> Self
    where
        T: Clone,
    {
        let numel = shape.iter().product::<usize>();
        Self {
            storage: vec![value; numel],
            shape,
            strides: get_strides_from_shape(shape),
        }
    }

    /// Creates a new tensor with the given shape, computing each element from its index.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use geodis_tensor::Tensor;
    ///
    /// let t = Tensor::<usize, 2>::from_shape_fn([2, 3], |[r, c]| r * 10 + c);
    /// assert_eq!(t.as_slice(), &[0, 1, 2, 10, 11, 12]);
    /// ```
    pub fn from_shape_fn<F>(shape: [usize; N], f: F) -> Self
    where
        F: Fn([usize; N]) -> T,
    {
        let numel = shape.iter().product::<usize>();
        let strides = get_strides_from_shape(shape);
        let storage = (0..numel)
            .map(|offset| f(index_from_offset(offset, strides)))
            .collect();
        Self {
            storage,
            shape,
            strides,
        }
    }

    /// Creates a new tensor filled with zeros.
    pub fn zeros(shape: [usize; N]) -> Self
    where
        T: Clone + num_traits::Zero,
    {
        Self::from_shape_val(shape, T::zero())
    }

    /// Returns the tensor data as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.storage
    }

    /// Returns the tensor data as a mutable slice.
    #[inline]
    pub fn as_slice_mut(&mut self) -> &mut [T] {
        &mut self.storage
    }

    /// Consumes the tensor and returns the underlying data.
    pub fn into_vec(self) -> Vec<T> {
        self.storage
    }

    /// Returns the number of elements in the tensor.
    #[inline]
    pub fn numel(&self) -> usize {
        self.storage.len()
    }

    /// Get the offset of the element at the given index, or `None` if out of bounds.
    pub fn get_iter_offset(&self, index: [usize; N]) -> Option<usize> {
        let mut offset = 0;
        for ((&idx, dim_size), stride) in index.iter().zip(self.shape).zip(self.strides) {
            if idx >= dim_size {
                return None;
            }
            offset += idx * stride;
        }
        Some(offset)
    }

    /// Get a reference to the element at the given index.
    pub fn get(&self, index: [usize; N]) -> Option<&T> {
        self.get_iter_offset(index).map(|o| &self.storage[o])
    }

    /// Get a mutable reference to the element at the given index.
    pub fn get_mut(&mut self, index: [usize; N]) -> Option<&mut T> {
        match self.get_iter_offset(index) {
            Some(offset) => self.storage.get_mut(offset),
            None => None,
        }
    }

    /// Apply a function to each element of the tensor.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use geodis_tensor::Tensor;
    ///
    /// let mask = Tensor::<f32, 1>::from_shape_vec([3], vec![0.0, 1.0, 1.0]).unwrap();
    /// let dist = mask.map(|m| 5.0 * m);
    /// assert_eq!(dist.as_slice(), &[0.0, 5.0, 5.0]);
    /// ```
    pub fn map<U, F>(&self, f: F) -> Tensor<U, N>
    where
        F: Fn(&T) -> U,
    {
        Tensor {
            storage: self.storage.iter().map(f).collect(),
            shape: self.shape,
            strides: self.strides,
        }
    }

    /// Combine two tensors of identical shape element by element.
    ///
    /// # Errors
    ///
    /// Returns [`TensorError::DimensionMismatch`] if the shapes differ.
    pub fn element_wise_op<U, F>(
        &self,
        other: &Tensor<T, N>,
        op: F,
    ) -> Result<Tensor<U, N>, TensorError>
    where
        F: Fn(&T, &T) -> U,
    {
        if self.shape != other.shape {
            return Err(TensorError::dimension_mismatch(
                "Element-wise operations require identical shapes",
                &self.shape,
                &other.shape,
            ));
        }

        let storage = self
            .storage
            .iter()
            .zip(other.storage.iter())
            .map(|(a, b)| op(a, b))
            .collect();

        Ok(Tensor {
            storage,
            shape: self.shape,
            strides: self.strides,
        })
    }

    /// Return a view of the tensor.
    pub fn view(&self) -> TensorView<'_, T, N> {
        TensorView {
            data: &self.storage,
            shape: self.shape,
            strides: self.strides,
        }
    }

    /// Return a mutable view of the tensor.
    pub fn view_mut(&mut self) -> TensorViewMut<'_, T, N> {
        TensorViewMut {
            data: &mut self.storage,
            shape: self.shape,
            strides: self.strides,
        }
    }

    /// Permutes the dimensions of the tensor without moving any data.
    ///
    /// `axes[i]` names the source dimension that becomes the i-th dimension of the view.
    ///
    /// # Errors
    ///
    /// Returns [`TensorError::InvalidPermutation`] if `axes` is not a permutation of `0..N`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use geodis_tensor::Tensor;
    ///
    /// let t = Tensor::<i32, 2>::from_shape_vec([2, 3], vec![1, 2, 3, 4, 5, 6]).unwrap();
    /// let v = t.permute_axes([1, 0]).unwrap();
    /// assert_eq!(v.shape, [3, 2]);
    /// assert_eq!(v.get([2, 1]), Some(&6));
    /// ```
    pub fn permute_axes(&self, axes: [usize; N]) -> Result<TensorView<'_, T, N>, TensorError> {
        let (shape, strides) = permute_layout(self.shape, self.strides, axes)?;
        Ok(TensorView {
            data: &self.storage,
            shape,
            strides,
        })
    }

    /// Mutable counterpart of [`Tensor::permute_axes`].
    pub fn permute_axes_mut(
        &mut self,
        axes: [usize; N],
    ) -> Result<TensorViewMut<'_, T, N>, TensorError> {
        let (shape, strides) = permute_layout(self.shape, self.strides, axes)?;
        Ok(TensorViewMut {
            data: &mut self.storage,
            shape,
            strides,
        })
    }
}

/// Inverse of the row-major offset computation.
fn index_from_offset<const N: usize>(mut offset: usize, strides: [usize; N]) -> [usize; N] {
    let mut index = [0; N];
    for (idx, &stride) in index.iter_mut().zip(strides.iter()) {
        *idx = offset / stride;
        offset %= stride;
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructor_3d() -> Result<(), TensorError> {
        let t = Tensor::<u8, 3>::from_shape_vec([2, 1, 3], vec![1, 2, 3, 4, 5, 6])?;
        assert_eq!(t.shape, [2, 1, 3]);
        assert_eq!(t.strides, [3, 3, 1]);
        assert_eq!(t.numel(), 6);
        assert_eq!(t.get([1, 0, 2]), Some(&6));
        assert!(t.get([2, 0, 0]).is_none());
        assert!(t.get([0, 1, 0]).is_none());
        Ok(())
    }

    #[test]
    fn constructor_wrong_len() {
        let res = Tensor::<u8, 2>::from_shape_vec([2, 2], vec![1, 2, 3]);
        assert_eq!(res, Err(TensorError::invalid_shape(4, 3)));
    }

    #[test]
    fn from_shape_fn_4d() {
        let t = Tensor::<usize, 4>::from_shape_fn([1, 2, 3, 4], |[c, d, h, w]| {
            c * 1000 + d * 100 + h * 10 + w
        });
        assert_eq!(t.get([0, 1, 2, 3]), Some(&123));
        assert_eq!(t.get([0, 0, 1, 0]), Some(&10));
        assert_eq!(t.as_slice()[t.numel() - 1], 123);
    }

    #[test]
    fn from_shape_fn_empty() {
        let t = Tensor::<f32, 3>::from_shape_fn([0, 4, 4], |_| 1.0);
        assert_eq!(t.numel(), 0);
    }

    #[test]
    fn element_wise_sub() -> Result<(), TensorError> {
        let a = Tensor::<f32, 1>::from_shape_vec([3], vec![3.0, 2.0, 1.0])?;
        let b = Tensor::<f32, 1>::from_shape_vec([3], vec![1.0, 1.0, 1.0])?;
        let c = a.element_wise_op(&b, |x, y| x - y)?;
        assert_eq!(c.as_slice(), &[2.0, 1.0, 0.0]);

        let d = Tensor::<f32, 1>::from_shape_vec([2], vec![1.0, 1.0])?;
        assert!(matches!(
            a.element_wise_op(&d, |x, y| x - y),
            Err(TensorError::DimensionMismatch { .. })
        ));
        Ok(())
    }

    #[test]
    fn permute_axes_rejects_duplicates() -> Result<(), TensorError> {
        let t = Tensor::<u8, 3>::zeros([1, 2, 2]);
        assert_eq!(
            t.permute_axes([0, 1, 1]).err(),
            Some(TensorError::InvalidPermutation(vec![0, 1, 1]))
        );
        assert!(t.permute_axes([0, 3, 1]).is_err());
        assert!(t.permute_axes([0, 2, 1]).is_ok());
        Ok(())
    }

    #[test]
    fn permute_axes_mut_writes_through() -> Result<(), TensorError> {
        let mut t = Tensor::<u8, 2>::from_shape_vec([2, 3], vec![0; 6])?;
        {
            let mut v = t.permute_axes_mut([1, 0])?;
            assert_eq!(v.shape, [3, 2]);
            if let Some(x) = v.get_mut([2, 0]) {
                *x = 7;
            }
        }
        assert_eq!(t.get([0, 2]), Some(&7));
        Ok(())
    }
}
