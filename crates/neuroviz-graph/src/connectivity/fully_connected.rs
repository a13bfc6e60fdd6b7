// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Fully-connected wiring: every unit reads every unit of the previous visible
layer, in that layer's natural flat order.
*/

use neuroviz_structures::{to_index3d, NeuronId, TensorShape};

/// Input ids for one unit of a fully-connected layer.
///
/// Identical for every unit of the layer; the output length equals the
/// previous layer's unit count.
pub fn fully_connected_inputs(prev_shape: &TensorShape, prev_layer_index: u16) -> Vec<NeuronId> {
    (0..prev_shape.unit_count())
        .map(|i| NeuronId::new(prev_layer_index, to_index3d(i, prev_shape)))
        .collect()
}
