use geodis_tensor::{TensorView, TensorViewMut};

use crate::{metric::ChannelStrided, parallel::LayerExecutor};

/// Extent of one axis together with its stride in the image and in the distance buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct AxisLayout {
    pub len: usize,
    pub image_stride: usize,
    pub distance_stride: usize,
}

impl AxisLayout {
    /// A singleton axis, used to run planar grids through the volumetric relaxation.
    const UNIT: Self = Self {
        len: 1,
        image_stride: 0,
        distance_stride: 0,
    };

    fn from_views<const N: usize>(
        axis: usize,
        image: &TensorView<'_, f32, N>,
        distance: &TensorViewMut<'_, f32, N>,
    ) -> Self {
        debug_assert_eq!(image.shape[axis], distance.shape[axis]);
        Self {
            len: image.shape[axis],
            image_stride: image.strides[axis],
            distance_stride: distance.strides[axis],
        }
    }
}

/// Memory layout of one sweep: a swept (primary) axis and two secondary axes.
///
/// Built from views whose axes were permuted so that the primary axis comes
/// right after the channel axis; the buffers themselves keep their layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SweepLayout {
    pub channels: usize,
    pub channel_stride: usize,
    pub primary: AxisLayout,
    pub secondary: [AxisLayout; 2],
}

impl SweepLayout {
    /// Layout of a `[C, P, S]` image view and its `[1, P, S]` distance view.
    pub(crate) fn planar(
        image: &TensorView<'_, f32, 3>,
        distance: &TensorViewMut<'_, f32, 3>,
    ) -> Self {
        Self {
            channels: image.shape[0],
            channel_stride: image.strides[0],
            primary: AxisLayout::from_views(1, image, distance),
            secondary: [AxisLayout::from_views(2, image, distance), AxisLayout::UNIT],
        }
    }

    /// Layout of a `[C, P, S1, S2]` image view and its `[1, P, S1, S2]` distance view.
    pub(crate) fn volumetric(
        image: &TensorView<'_, f32, 4>,
        distance: &TensorViewMut<'_, f32, 4>,
    ) -> Self {
        Self {
            channels: image.shape[0],
            channel_stride: image.strides[0],
            primary: AxisLayout::from_views(1, image, distance),
            secondary: [
                AxisLayout::from_views(2, image, distance),
                AxisLayout::from_views(3, image, distance),
            ],
        }
    }

    /// Number of cells in one layer orthogonal to the primary axis.
    pub(crate) fn layer_len(&self) -> usize {
        self.secondary[0].len * self.secondary[1].len
    }
}

/// A cell of the neighbouring layer, addressed relative to the current cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Neighbour {
    pub d1: isize,
    pub d2: isize,
    /// Spatial step cost, already scaled by the euclidean weight.
    pub step_cost: f32,
}

/// Neighbourhood and weights applied to every cell during a sweep.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SweepKernel {
    neighbours: Vec<Neighbour>,
    lambda_grad: f32,
}

impl SweepKernel {
    /// Three neighbours along the single secondary axis with costs `{sqrt(2), 1, sqrt(2)}`.
    pub(crate) fn planar(lambda_grad: f32, lambda_eucl: f32) -> Self {
        let local_dist = [2f32.sqrt(), 1.0, 2f32.sqrt()];
        let neighbours = (-1..=1)
            .zip(local_dist)
            .map(|(d1, cost)| Neighbour {
                d1,
                d2: 0,
                step_cost: lambda_eucl * cost,
            })
            .collect();
        Self {
            neighbours,
            lambda_grad,
        }
    }

    /// 3x3 neighbours over both secondary axes with cost `s0 + |d1| * s1 + |d2| * s2`.
    ///
    /// `spacing` is ordered as (primary, secondary1, secondary2).
    pub(crate) fn volumetric(spacing: [f32; 3], lambda_grad: f32, lambda_eucl: f32) -> Self {
        let [s0, s1, s2] = spacing;
        let mut neighbours = Vec::with_capacity(9);
        for d1 in -1isize..=1 {
            for d2 in -1isize..=1 {
                let mut cost = s0;
                cost += d1.unsigned_abs() as f32 * s1;
                cost += d2.unsigned_abs() as f32 * s2;
                neighbours.push(Neighbour {
                    d1,
                    d2,
                    step_cost: lambda_eucl * cost,
                });
            }
        }
        Self {
            neighbours,
            lambda_grad,
        }
    }

    #[cfg(test)]
    pub(crate) fn neighbours(&self) -> &[Neighbour] {
        &self.neighbours
    }
}

#[inline]
fn offset_index(i: usize, d: isize, len: usize) -> Option<usize> {
    i.checked_add_signed(d).filter(|&n| n < len)
}

/// Relax `distance` along the primary axis of `layout`, first forward then backward.
///
/// Each position along the primary axis reads the layer before it in the current
/// direction, so positions are strictly ordered while the cells inside a layer are
/// independent and handed to `executor`.
pub(crate) fn sweep(
    image: &[f32],
    distance: &mut [f32],
    layout: &SweepLayout,
    kernel: &SweepKernel,
    executor: &LayerExecutor,
    scratch: &mut Vec<f32>,
) {
    scratch.clear();
    scratch.resize(layout.layer_len(), 0.0);

    let len = layout.primary.len;

    // forward
    for p in 1..len {
        relax_layer(image, distance, layout, kernel, executor, scratch, p, p - 1);
    }

    // backward
    for p in (0..len.saturating_sub(1)).rev() {
        relax_layer(image, distance, layout, kernel, executor, scratch, p, p + 1);
    }
}

/// Relax the layer at primary index `p` from the finalized layer at `q`.
#[allow(clippy::too_many_arguments)]
fn relax_layer(
    image: &[f32],
    distance: &mut [f32],
    layout: &SweepLayout,
    kernel: &SweepKernel,
    executor: &LayerExecutor,
    scratch: &mut [f32],
    p: usize,
    q: usize,
) {
    let features = ChannelStrided::new(image, layout.channels, layout.channel_stride);
    let [s1, s2] = layout.secondary;
    let primary = layout.primary;

    let cell_offsets = |layer: usize, i: usize, j: usize| {
        (
            layer * primary.image_stride + i * s1.image_stride + j * s2.image_stride,
            layer * primary.distance_stride + i * s1.distance_stride + j * s2.distance_stride,
        )
    };

    // compute: the whole layer reads `distance` immutably
    let current: &[f32] = &*distance;
    executor.fill_indexed(scratch, |k| {
        let (i, j) = (k / s2.len, k % s2.len);
        let (cell_img, cell_dst) = cell_offsets(p, i, j);

        let mut best = current[cell_dst];
        for n in kernel.neighbours.iter() {
            let ni = offset_index(i, n.d1, s1.len);
            let nj = offset_index(j, n.d2, s2.len);
            let (Some(ni), Some(nj)) = (ni, nj) else {
                continue;
            };
            let (nb_img, nb_dst) = cell_offsets(q, ni, nj);
            let candidate = current[nb_dst]
                + n.step_cost
                + kernel.lambda_grad * features.l1_distance(cell_img, nb_img);
            if candidate < best {
                best = candidate;
            }
        }
        best
    });

    // commit
    for (k, &value) in scratch.iter().enumerate() {
        let (_, cell_dst) = cell_offsets(p, k / s2.len, k % s2.len);
        distance[cell_dst] = value;
    }
}
