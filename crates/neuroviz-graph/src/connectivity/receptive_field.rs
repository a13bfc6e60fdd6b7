// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Receptive-field wiring for the convolution/pooling family.

Each output unit reads a `kernel_h x kernel_w` window of the previous visible
layer, across all of its channels for full convolution or within the unit's
own channel for the depthwise variant (depthwise convolution and pooling).
The enumeration order - depth fastest, then kernel width, then kernel height -
is the order consumers pair input ids with shared filter weights.
*/

use neuroviz_structures::{to_index3d, Index3D, NeuronId, TensorShape};
use tracing::warn;

/// Input ids for one unit of a receptive-field layer.
///
/// `kernel` is the kernel size for convolutions and the pool size for pooling;
/// a missing kernel is a degenerate legacy configuration and yields no
/// connections rather than an error. Strides default to (1, 1) upstream.
///
/// Enumerated coordinates that fall outside the previous layer's bounds are
/// dropped, so padded output shapes never produce dangling ids; for
/// valid-padding shapes nothing is dropped and the output length is exactly
/// `kernel_h * kernel_w * prev_depth` (or `kernel_h * kernel_w` depthwise).
pub fn receptive_field_inputs(
    unit_index: u32,
    output_shape: &TensorShape,
    kernel: Option<(u32, u32)>,
    strides: (u32, u32),
    prev_shape: &TensorShape,
    prev_layer_index: u16,
    depthwise: bool,
) -> Vec<NeuronId> {
    let Some((kernel_h, kernel_w)) = kernel else {
        warn!(
            target: "neuroviz-graph",
            "Receptive-field layer has no kernel/pool size configured; emitting no connections"
        );
        return Vec::new();
    };

    let this = to_index3d(unit_index, output_shape);
    let (prev_h, prev_w, depth) = prev_shape.hwd();
    let (stride_h, stride_w) = strides;

    let mut inputs = Vec::with_capacity(if depthwise {
        (kernel_h * kernel_w) as usize
    } else {
        (kernel_h * kernel_w * depth) as usize
    });

    for k in 0..kernel_h * kernel_w * depth {
        let depth_index = k % depth;
        if depthwise && depth_index != this.depth as u32 {
            continue;
        }
        let width_index = this.width as u32 * stride_w + (k / depth) % kernel_w;
        let height_index = this.height as u32 * stride_h + k / (depth * kernel_w);
        if height_index >= prev_h || width_index >= prev_w {
            continue;
        }
        inputs.push(NeuronId::new(
            prev_layer_index,
            Index3D::new(height_index as u16, width_index as u16, depth_index as u16),
        ));
    }
    inputs
}

#[cfg(test)]
mod tests {
    use super::*;
    use neuroviz_structures::to_flat_index;

    #[test]
    fn test_full_convolution_window() {
        // 5x5x2 input, 3x3 kernel, stride 1 -> 3x3x4 output
        let prev = TensorShape::new(&[5, 5, 2]).unwrap();
        let out = TensorShape::new(&[3, 3, 4]).unwrap();

        for unit in 0..out.unit_count() {
            let inputs =
                receptive_field_inputs(unit, &out, Some((3, 3)), (1, 1), &prev, 0, false);
            assert_eq!(inputs.len(), 3 * 3 * 2);
        }

        // Unit at output (1, 1, 0) reads the window anchored at (1, 1)
        let unit = to_flat_index(Index3D::new(1, 1, 0), &out);
        let inputs = receptive_field_inputs(unit, &out, Some((3, 3)), (1, 1), &prev, 0, false);
        assert_eq!(inputs[0].position, Index3D::new(1, 1, 0));
        assert_eq!(inputs[1].position, Index3D::new(1, 1, 1));
        assert_eq!(inputs[2].position, Index3D::new(1, 2, 0));
        assert_eq!(inputs.last().unwrap().position, Index3D::new(3, 3, 1));
    }

    #[test]
    fn test_depthwise_stays_in_channel() {
        // Pooling: 4x4x3 input, 2x2 pool, stride 2 -> 2x2x3 output
        let prev = TensorShape::new(&[4, 4, 3]).unwrap();
        let out = TensorShape::new(&[2, 2, 3]).unwrap();

        for unit in 0..out.unit_count() {
            let this = to_index3d(unit, &out);
            let inputs =
                receptive_field_inputs(unit, &out, Some((2, 2)), (2, 2), &prev, 2, true);
            assert_eq!(inputs.len(), 2 * 2);
            for id in &inputs {
                assert_eq!(id.position.depth, this.depth);
            }
        }
    }

    #[test]
    fn test_stride_offsets_window() {
        let prev = TensorShape::new(&[6, 6, 1]).unwrap();
        let out = TensorShape::new(&[2, 2, 1]).unwrap();
        let unit = to_flat_index(Index3D::new(1, 1, 0), &out);
        let inputs = receptive_field_inputs(unit, &out, Some((2, 2)), (3, 3), &prev, 0, true);
        assert_eq!(inputs[0].position, Index3D::new(3, 3, 0));
        assert_eq!(inputs[3].position, Index3D::new(4, 4, 0));
    }

    #[test]
    fn test_missing_kernel_yields_no_connections() {
        let prev = TensorShape::new(&[5, 5, 1]).unwrap();
        let out = TensorShape::new(&[3, 3, 1]).unwrap();
        assert!(receptive_field_inputs(0, &out, None, (1, 1), &prev, 0, false).is_empty());
    }

    #[test]
    fn test_out_of_bounds_window_entries_dropped() {
        // Same-padded shape: output as tall as the input, so edge units would
        // read past the bottom/right borders
        let prev = TensorShape::new(&[4, 4, 1]).unwrap();
        let out = TensorShape::new(&[4, 4, 1]).unwrap();
        let corner = to_flat_index(Index3D::new(3, 3, 0), &out);
        let inputs = receptive_field_inputs(corner, &out, Some((3, 3)), (1, 1), &prev, 0, false);
        assert_eq!(inputs.len(), 1);
        assert_eq!(inputs[0].position, Index3D::new(3, 3, 0));
    }
}
