// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Core types for graph derivation operations.
*/

use neuroviz_structures::NeurovizDataError;

/// Result type for graph operations
pub type GraphResult<T> = Result<T, GraphError>;

/// Errors that can occur while deriving or binding a neuron graph
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("Invalid layer stack: {0}")]
    InvalidStack(String),

    #[error("Layer {layer} ({category}) requires spatial input, but the previous visible layer has shape {prev_shape:?}")]
    NeedsSpatialInput {
        layer: u16,
        category: String,
        prev_shape: Vec<u32>,
    },

    #[error("Layer count mismatch: graph has {graph} layers, model state has {state}")]
    LayerCountMismatch { graph: usize, state: usize },

    #[error("Activation length mismatch at layer {layer}: expected {expected} units, got {actual}")]
    ActivationLengthMismatch {
        layer: u16,
        expected: u32,
        actual: usize,
    },

    #[error("Parameter shape mismatch at layer {layer}: expected {expected} bias slots, got {actual}")]
    ParameterShapeMismatch {
        layer: u16,
        expected: u32,
        actual: usize,
    },

    #[error("Raw sample length mismatch: input layer has {expected} units, sample has {actual}")]
    SampleLengthMismatch { expected: u32, actual: usize },

    #[error("Data error: {0}")]
    Data(#[from] NeurovizDataError),
}
