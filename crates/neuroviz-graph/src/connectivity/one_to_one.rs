// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
One-to-one wiring for shape-preserving layers (normalization, dropout,
activation-only): unit `i` reads only unit `i` of the previous visible layer.
*/

use neuroviz_structures::{to_index3d, NeuronId, TensorShape};

/// The single input id for one unit of a shape-preserving layer.
pub fn one_to_one_inputs(
    unit_index: u32,
    prev_shape: &TensorShape,
    prev_layer_index: u16,
) -> Vec<NeuronId> {
    vec![NeuronId::new(
        prev_layer_index,
        to_index3d(unit_index, prev_shape),
    )]
}
