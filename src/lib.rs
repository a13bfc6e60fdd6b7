//! # NeuroViz - Neuron-Level Graph Derivation
//!
//! NeuroViz derives, from an ordered stack of heterogeneous computational
//! layers (fully-connected, convolutional, pooling, normalization, ...), the
//! neuron-level graph a 3D renderer needs: one node per scalar unit, grouped
//! by output channel, wired to the specific previous-layer units feeding it,
//! and annotated with shared weight/bias slots.
//!
//! The derivation runs in two stages, matching the two cadences a host
//! rebinds at:
//!
//! 1. **Stateless**: [`graph::build_stateless_graph`] walks the layer stack
//!    once per model identity and produces pure structure - ids, groups,
//!    connectivity. Cache it in an `Arc` for the model's lifetime.
//! 2. **Stateful**: [`graph::bind`] projects per-sample activations, trained
//!    weights/biases, and the raw input sample onto that shared structure.
//!    Re-run it on every activation/weight/sample change; ids stay stable, so
//!    consumers can diff by id and update only changed neurons.
//!
//! ## Quick Start
//!
//! ```rust
//! use neuroviz::prelude::*;
//! use std::sync::Arc;
//!
//! let stack = vec![
//!     LayerDescriptor::new("Input", TensorShape::new(&[28, 28, 1])?),
//!     LayerDescriptor::new("Conv2D", TensorShape::new(&[26, 26, 2])?)
//!         .with_config("filters", serde_json::json!(2))
//!         .with_config("kernel_size", serde_json::json!([3, 3])),
//!     LayerDescriptor::new("Dense", TensorShape::new(&[10])?),
//! ];
//!
//! let graph = Arc::new(build_stateless_graph(&stack, &UnitLabels::default())?);
//! assert_eq!(graph.summary().neurons, 784 + 26 * 26 * 2 + 10);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Rendering, UI state, datasets, and training live in collaborator
//! applications; this crate is the structural core they all share.

pub use neuroviz_graph as graph;
pub use neuroviz_structures as structures;

/// The most commonly used types, importable in one line.
pub mod prelude {
    pub use neuroviz_graph::{
        bind, build_stateless_graph, BoundLayer, BoundNeuron, ConnectivityRule, GraphError,
        GraphResult, GraphSummary, LayerActivations, LayerKind, LayerNode, LayerParameters,
        LayerPlacement, ModelState, NeuronDescriptor, StatefulGraph, StatelessGraph, UnitLabels,
    };
    pub use neuroviz_structures::{
        layer_stack_from_json, to_flat_index, to_index3d, Index3D, LayerDescriptor, NeuronId,
        NeurovizDataError, TensorShape,
    };
}
