use crate::tensor::{permute_layout, Tensor, TensorError};

/// Offset of `index` into a strided buffer, or an error naming the first out-of-range axis.
fn strided_offset<const N: usize>(
    index: [usize; N],
    shape: [usize; N],
    strides: [usize; N],
) -> Result<usize, TensorError> {
    let mut offset = 0;
    for ((&idx, size), stride) in index.iter().zip(shape).zip(strides) {
        if idx >= size {
            return Err(TensorError::IndexOutOfBounds { index: idx, size });
        }
        offset += idx * stride;
    }
    Ok(offset)
}

/// A non-owning view into tensor data.
///
/// A view carries its own shape and strides, so permuting its axes re-presents
/// the same buffer in a different logical order without copying it. The
/// geodesic sweeps use this to make any spatial axis the swept one.
///
/// # Examples
///
/// ```rust
/// use geodis_tensor::Tensor;
///
/// let t = Tensor::<i32, 2>::from_shape_vec([2, 2], vec![1, 2, 3, 4]).unwrap();
/// let view = t.permute_axes([1, 0]).unwrap();
///
/// let contiguous = view.to_contiguous();
/// assert_eq!(contiguous.as_slice(), &[1, 3, 2, 4]);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct TensorView<'a, T, const N: usize> {
    pub(crate) data: &'a [T],
    /// The shape of the tensor view.
    pub shape: [usize; N],
    /// The strides for accessing elements in the view.
    pub strides: [usize; N],
}

impl<'a, T, const N: usize> TensorView<'a, T, N> {
    /// Returns the whole underlying buffer, ignoring the view's layout.
    #[inline]
    pub fn as_slice(&self) -> &'a [T] {
        self.data
    }

    /// Returns the number of elements addressed by the view.
    pub fn numel(&self) -> usize {
        self.shape.iter().product()
    }

    /// Get a reference to the element at the given index.
    pub fn get(&self, index: [usize; N]) -> Option<&'a T> {
        let data = self.data;
        strided_offset(index, self.shape, self.strides)
            .ok()
            .map(|o| &data[o])
    }

    /// Get a reference to the element at the given index, reporting the offending axis on failure.
    pub fn try_get(&self, index: [usize; N]) -> Result<&'a T, TensorError> {
        let data = self.data;
        strided_offset(index, self.shape, self.strides).map(|o| &data[o])
    }

    /// Permute the axes of the view.
    pub fn permute_axes(&self, axes: [usize; N]) -> Result<TensorView<'a, T, N>, TensorError> {
        let (shape, strides) = permute_layout(self.shape, self.strides, axes)?;
        Ok(TensorView {
            data: self.data,
            shape,
            strides,
        })
    }

    /// Copy the elements of the view into a new row-major tensor.
    pub fn to_contiguous(&self) -> Tensor<T, N>
    where
        T: Clone,
    {
        let strides = self.strides;
        let data = self.data;
        Tensor::from_shape_fn(self.shape, |index| {
            let offset: usize = index.iter().zip(strides).map(|(i, s)| i * s).sum();
            data[offset].clone()
        })
    }
}

/// A mutable, non-owning view into tensor data.
#[derive(Debug)]
pub struct TensorViewMut<'a, T, const N: usize> {
    pub(crate) data: &'a mut [T],
    /// The shape of the tensor view.
    pub shape: [usize; N],
    /// The strides for accessing elements in the view.
    pub strides: [usize; N],
}

impl<T, const N: usize> TensorViewMut<'_, T, N> {
    /// Returns the whole underlying buffer, ignoring the view's layout.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &*self.data
    }

    /// Returns the whole underlying buffer mutably, ignoring the view's layout.
    #[inline]
    pub fn as_slice_mut(&mut self) -> &mut [T] {
        &mut *self.data
    }

    /// Reborrow as an immutable view with the same layout.
    pub fn as_view(&self) -> TensorView<'_, T, N> {
        TensorView {
            data: &*self.data,
            shape: self.shape,
            strides: self.strides,
        }
    }

    /// Get a reference to the element at the given index.
    pub fn get(&self, index: [usize; N]) -> Option<&T> {
        strided_offset(index, self.shape, self.strides)
            .ok()
            .map(|o| &self.data[o])
    }

    /// Get a mutable reference to the element at the given index.
    pub fn get_mut(&mut self, index: [usize; N]) -> Option<&mut T> {
        match strided_offset(index, self.shape, self.strides) {
            Ok(offset) => self.data.get_mut(offset),
            Err(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{Tensor, TensorError};

    #[test]
    fn view_permute_3d() -> Result<(), TensorError> {
        // [C=1, H=2, W=3]
        let t = Tensor::<u8, 3>::from_shape_vec([1, 2, 3], vec![0, 1, 2, 3, 4, 5])?;
        let v = t.permute_axes([0, 2, 1])?;
        assert_eq!(v.shape, [1, 3, 2]);
        assert_eq!(v.strides, [6, 1, 3]);
        assert_eq!(v.get([0, 2, 1]), Some(&5));
        assert_eq!(v.get([0, 1, 0]), Some(&1));
        assert_eq!(
            v.try_get([0, 3, 0]),
            Err(TensorError::IndexOutOfBounds { index: 3, size: 3 })
        );
        assert_eq!(v.to_contiguous().as_slice(), &[0, 3, 1, 4, 2, 5]);
        Ok(())
    }

    #[test]
    fn view_permute_roundtrip_is_identity() -> Result<(), TensorError> {
        let t = Tensor::<u16, 4>::from_shape_fn([2, 2, 3, 4], |[c, d, h, w]| {
            (c * 1000 + d * 100 + h * 10 + w) as u16
        });
        let v = t.permute_axes([0, 3, 2, 1])?.permute_axes([0, 3, 2, 1])?;
        assert_eq!(v.shape, t.shape);
        assert_eq!(v.to_contiguous(), t);
        Ok(())
    }

    #[test]
    fn view_mut_shares_storage() -> Result<(), TensorError> {
        let mut t = Tensor::<f32, 3>::zeros([1, 2, 2]);
        let mut v = t.view_mut();
        v.as_slice_mut()[3] = 1.5;
        assert_eq!(v.as_view().get([0, 1, 1]), Some(&1.5));
        assert_eq!(t.as_slice(), &[0.0, 0.0, 0.0, 1.5]);
        Ok(())
    }
}
