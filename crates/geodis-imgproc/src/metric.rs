/// Compute the L1 (Manhattan) distance between two feature vectors.
///
/// With a single channel this reduces to the absolute difference `|a - b|`.
///
/// # Arguments
///
/// * `a` - The first feature vector.
/// * `b` - The second feature vector, with the same length as `a`.
///
/// # Example
///
/// ```
/// use geodis_imgproc::metric::l1_distance;
///
/// assert_eq!(l1_distance(&[1.0], &[4.0]), 3.0);
/// assert_eq!(l1_distance(&[1.0, 2.0, 3.0], &[0.0, 4.0, 3.0]), 3.0);
/// ```
pub fn l1_distance(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());
    match (a, b) {
        ([a], [b]) => (a - b).abs(),
        _ => a
            .iter()
            .zip(b.iter())
            .fold(0f32, |acc, (&x, &y)| acc + (x - y).abs()),
    }
}

/// Channel-first feature storage: channel `c` of the cell at offset `o` lives at `o + c * stride`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ChannelStrided<'a> {
    data: &'a [f32],
    channels: usize,
    stride: usize,
}

impl<'a> ChannelStrided<'a> {
    pub(crate) fn new(data: &'a [f32], channels: usize, stride: usize) -> Self {
        Self {
            data,
            channels,
            stride,
        }
    }

    /// L1 distance between the feature vectors of the cells at offsets `p` and `q`.
    #[inline]
    pub(crate) fn l1_distance(&self, p: usize, q: usize) -> f32 {
        if self.channels == 1 {
            return (self.data[p] - self.data[q]).abs();
        }
        (0..self.channels).fold(0f32, |acc, c| {
            let o = c * self.stride;
            acc + (self.data[p + o] - self.data[q + o]).abs()
        })
    }
}
