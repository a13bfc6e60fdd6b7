// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Stateful binding.

Projects a shared stateless graph plus the current model state (per-layer
activations, per-filter weights and biases, the raw input sample) into a
stateful graph carrying bound values per neuron. The projection is pure: it
allocates a fresh stateful graph on every call and never mutates the shared
structure, so the host re-runs it on every activation/weight/sample change
and discards the previous result.

Per-filter weight vectors are materialized once per layer and shared by
reference among the units of that filter, so convolutional parameter sharing
costs one allocation per filter, not one per unit.
*/

use crate::builder::{LayerPlacement, NeuronDescriptor, StatelessGraph};
use crate::types::{GraphError, GraphResult};
use ndarray::{Array1, Array2};
use neuroviz_structures::NeuronId;
use std::sync::Arc;

/// Per-layer activations with their normalization statistic.
///
/// `values` holds one scalar per unit (empty for invisible layers);
/// `max_abs` is the layer-local max-abs statistic supplied by the
/// activation-stats collaborator.
#[derive(Debug, Clone)]
pub struct LayerActivations {
    pub values: Array1<f32>,
    pub max_abs: f32,
}

impl LayerActivations {
    pub fn new(values: Array1<f32>, max_abs: f32) -> Self {
        Self { values, max_abs }
    }

    /// An empty entry for a layer that contributes no neurons.
    pub fn empty() -> Self {
        Self {
            values: Array1::zeros(0),
            max_abs: 0.0,
        }
    }
}

/// Per-layer trained parameters keyed by filter index.
///
/// Row `f` of `weights` is the shared weight vector of filter `f`, ordered
/// exactly as the connectivity rule enumerated that filter's input ids.
#[derive(Debug, Clone)]
pub struct LayerParameters {
    pub weights: Array2<f32>,
    pub biases: Array1<f32>,
    pub max_abs_weight: f32,
}

/// Everything the binder needs for one model + sample: one activations entry
/// per layer, one (optional) parameters entry per layer, and the unprocessed
/// input sample indexed like the input layer's flat units.
#[derive(Debug, Clone)]
pub struct ModelState {
    pub activations: Vec<LayerActivations>,
    pub parameters: Vec<Option<LayerParameters>>,
    pub raw_input: Array1<f32>,
}

/// A neuron with its bound per-sample values.
#[derive(Debug, Clone)]
pub struct BoundNeuron {
    pub id: NeuronId,
    pub activation: f32,
    /// Layer-local max-abs scaled activation; raw for the output layer
    pub normalized_activation: f32,
    /// Which shared bias/weight slot this unit resolves to
    pub filter_index: u32,
    pub bias: Option<f32>,
    /// The full shared weight vector of this unit's filter; index `k`
    /// corresponds to the `k`-th entry of the descriptor's input list
    pub weights: Option<Arc<[f32]>>,
    /// Unprocessed sample value, input-layer neurons only
    pub raw_input: Option<f32>,
}

/// One layer of the stateful graph.
#[derive(Debug, Clone)]
pub struct BoundLayer {
    pub layer_index: u16,
    pub max_abs_weight: Option<f32>,
    pub neurons: Vec<BoundNeuron>,
}

/// The stateless graph augmented with bound values.
///
/// Holds the structure it was bound against, so ids resolve without the
/// caller juggling two objects; ids are stable across successive bindings
/// of the same structure, so consumers may diff by id.
#[derive(Debug)]
pub struct StatefulGraph {
    structure: Arc<StatelessGraph>,
    layers: Vec<BoundLayer>,
}

impl StatefulGraph {
    pub fn structure(&self) -> &StatelessGraph {
        &self.structure
    }

    pub fn layers(&self) -> &[BoundLayer] {
        &self.layers
    }

    pub fn layer(&self, index: u16) -> Option<&BoundLayer> {
        self.layers.get(index as usize)
    }

    /// Global lookup pairing a neuron's structure with its bound values.
    pub fn neuron(
        &self,
        id: NeuronId,
    ) -> Option<(&NeuronDescriptor, &BoundNeuron)> {
        let descriptor = self.structure.neuron(id)?;
        let bound = &self.layers[id.layer as usize].neurons[descriptor.unit_index as usize];
        Some((descriptor, bound))
    }
}

/// Bind the current model state onto a shared stateless graph.
///
/// # Errors
///
/// A graph/state mismatch (layer counts, per-layer lengths, bias slot
/// counts, sample length) is a caller contract violation and fails loudly;
/// silently truncating would render incorrect visuals without any signal.
pub fn bind(structure: Arc<StatelessGraph>, state: &ModelState) -> GraphResult<StatefulGraph> {
    let layer_count = structure.layers().len();
    if state.activations.len() != layer_count {
        return Err(GraphError::LayerCountMismatch {
            graph: layer_count,
            state: state.activations.len(),
        });
    }
    if state.parameters.len() != layer_count {
        return Err(GraphError::LayerCountMismatch {
            graph: layer_count,
            state: state.parameters.len(),
        });
    }

    let mut layers = Vec::with_capacity(layer_count);
    for node in structure.layers() {
        let activations = &state.activations[node.layer_index as usize];
        if activations.values.len() != node.unit_count as usize {
            return Err(GraphError::ActivationLengthMismatch {
                layer: node.layer_index,
                expected: node.unit_count,
                actual: activations.values.len(),
            });
        }

        let parameters = state.parameters[node.layer_index as usize].as_ref();
        let weights_by_filter: Vec<Arc<[f32]>> = match parameters {
            Some(params) => {
                if params.biases.len() != node.num_biases as usize {
                    return Err(GraphError::ParameterShapeMismatch {
                        layer: node.layer_index,
                        expected: node.num_biases,
                        actual: params.biases.len(),
                    });
                }
                if params.weights.nrows() != node.num_biases as usize {
                    return Err(GraphError::ParameterShapeMismatch {
                        layer: node.layer_index,
                        expected: node.num_biases,
                        actual: params.weights.nrows(),
                    });
                }
                params
                    .weights
                    .rows()
                    .into_iter()
                    .map(|row| Arc::from(row.to_vec().into_boxed_slice()))
                    .collect()
            }
            None => Vec::new(),
        };

        let is_input = node.placement == LayerPlacement::Input;
        if is_input && node.unit_count > 0 && state.raw_input.len() != node.unit_count as usize {
            return Err(GraphError::SampleLengthMismatch {
                expected: node.unit_count,
                actual: state.raw_input.len(),
            });
        }

        let mut neurons = Vec::with_capacity(node.neurons.len());
        for descriptor in &node.neurons {
            let unit = descriptor.unit_index;
            let filter_index = unit % node.num_biases;
            let activation = activations.values[unit as usize];
            let normalized_activation = match node.placement {
                LayerPlacement::Output => activation,
                _ => {
                    if activations.max_abs != 0.0 {
                        activation / activations.max_abs
                    } else {
                        0.0
                    }
                }
            };
            neurons.push(BoundNeuron {
                id: descriptor.id,
                activation,
                normalized_activation,
                filter_index,
                bias: parameters.map(|p| p.biases[filter_index as usize]),
                weights: weights_by_filter.get(filter_index as usize).cloned(),
                raw_input: is_input.then(|| state.raw_input[unit as usize]),
            });
        }

        layers.push(BoundLayer {
            layer_index: node.layer_index,
            max_abs_weight: parameters.map(|p| p.max_abs_weight),
            neurons,
        });
    }

    Ok(StatefulGraph { structure, layers })
}
