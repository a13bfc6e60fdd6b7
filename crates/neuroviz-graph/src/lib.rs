// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Neuron graph derivation.

Turns an ordered stack of heterogeneous layer descriptors into a neuron-level
graph for 3D visualization: one node per scalar unit, grouped by output
channel, wired to the specific previous-layer units feeding it, and annotated
with shared weight/bias slots.

Two stages, matching the two cadences the host rebinds at:

1. [`build_stateless_graph`] runs once per model identity and derives pure
   structure (ids, connectivity, groups).
2. [`bind`] runs on every activation/weight/sample change and projects the
   current model state onto that shared structure.

Single-threaded and synchronous throughout; both stages complete within one
scheduling turn of the host's reactive layer.
*/

mod binder;
mod builder;
pub mod connectivity;
mod registry;
mod types;

pub use binder::{
    bind, BoundLayer, BoundNeuron, LayerActivations, LayerParameters, ModelState, StatefulGraph,
};
pub use builder::{
    build_stateless_graph, Group, GraphSummary, LayerNode, LayerPlacement, NeuronDescriptor,
    StatelessGraph, UnitLabels,
};
pub use registry::{
    ActivationConfig, BatchNormConfig, ConnectivityRule, Conv2dConfig, DenseConfig,
    DepthwiseConv2dConfig, DropoutConfig, LayerKind, Pooling2dConfig,
};
pub use types::{GraphError, GraphResult};
