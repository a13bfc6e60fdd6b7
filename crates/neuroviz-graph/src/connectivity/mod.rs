// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Connectivity rules.

One pure function per wiring strategy. Each rule produces the ordered list of
previous-visible-layer neuron ids feeding one unit; the ordering is the
contract consumers rely on to pair input ids with shared weight vectors.
*/

mod fully_connected;
mod one_to_one;
mod receptive_field;

pub use fully_connected::fully_connected_inputs;
pub use one_to_one::one_to_one_inputs;
pub use receptive_field::receptive_field_inputs;
