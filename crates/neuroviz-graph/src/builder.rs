// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Stateless graph construction.

Walks the ordered layer stack once per model identity and derives the full
neuron-level structure: per-layer neuron descriptors with resolved input ids,
channel groups, and id lookup maps. The result is a pure function of the
layer stack - no activations, no weights - and is meant to be built once,
wrapped in an `Arc`, and shared across successive stateful bindings.

Cross-layer references are `(layer, position)` ids, never pointers; the graph
owns every layer node and neuron descriptor in one arena ordered by layer
index.
*/

use crate::connectivity::{fully_connected_inputs, one_to_one_inputs, receptive_field_inputs};
use crate::registry::{ConnectivityRule, LayerKind};
use crate::types::{GraphError, GraphResult};
use ahash::AHashMap;
use neuroviz_structures::{to_index3d, Index3D, LayerDescriptor, NeuronId, TensorShape};
use tracing::info;

/// Where a layer sits in the stack, for layout and normalization policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerPlacement {
    Input,
    Hidden,
    Output,
}

/// Optional per-unit labels for the input and output layers, supplied by the
/// dataset collaborator (e.g. class names for the output units).
#[derive(Debug, Clone, Default)]
pub struct UnitLabels {
    pub input: Option<Vec<String>>,
    pub output: Option<Vec<String>>,
}

/// One scalar unit of a layer's output tensor.
#[derive(Debug, Clone)]
pub struct NeuronDescriptor {
    /// Flat index within the owning layer
    pub unit_index: u32,
    /// Packed identifier (owning layer + 3-axis position)
    pub id: NeuronId,
    /// Channel partition this unit belongs to
    pub group_index: u32,
    /// Ordered ids of the previous-visible-layer units feeding this one
    pub inputs: Vec<NeuronId>,
    /// Per-unit label, input/output layers only
    pub label: Option<String>,
}

impl NeuronDescriptor {
    /// 3-axis position within the owning layer.
    pub fn position(&self) -> Index3D {
        self.id.position
    }

    /// Index of the owning layer.
    pub fn layer_index(&self) -> u16 {
        self.id.layer
    }
}

/// A channel partition of a layer's neurons.
#[derive(Debug, Clone)]
pub struct Group {
    pub group_index: u32,
    /// Member ids in unit order
    pub neuron_ids: Vec<NeuronId>,
    /// Concatenated id key, used by consumers for change detection
    pub key: String,
}

/// One layer of the stateless graph.
#[derive(Debug, Clone)]
pub struct LayerNode {
    pub layer_index: u16,
    /// Resolved category with typed configuration
    pub kind: LayerKind,
    /// Original category tag as the provider spelled it
    pub category: String,
    pub name: Option<String>,
    pub output_shape: TensorShape,
    pub placement: LayerPlacement,
    /// Whether the layer contributes neurons to the visualization
    pub visible: bool,
    /// Ordinal among visible layers, used for spatial layout
    pub visible_index: Option<u16>,
    /// Index of the immediately preceding layer
    pub prev_layer: Option<u16>,
    /// Index of the nearest preceding visible layer; connectivity and layout
    /// always reference this, skipping through invisible layers
    pub prev_visible_layer: Option<u16>,
    pub unit_count: u32,
    /// Independent bias slots: the filter count for convolutional parameter
    /// sharing, otherwise the unit count
    pub num_biases: u32,
    pub neurons: Vec<NeuronDescriptor>,
    pub groups: Vec<Group>,
    id_to_unit: AHashMap<NeuronId, u32>,
}

impl LayerNode {
    /// Look up a neuron descriptor by id.
    pub fn neuron_by_id(&self, id: NeuronId) -> Option<&NeuronDescriptor> {
        self.id_to_unit
            .get(&id)
            .map(|&unit| &self.neurons[unit as usize])
    }

    pub fn group_count(&self) -> u32 {
        self.groups.len() as u32
    }
}

/// Aggregate counts of a built graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphSummary {
    pub layers: usize,
    pub visible_layers: usize,
    pub neurons: usize,
    pub connections: usize,
}

/// Connectivity and structure derived purely from the layer stack.
///
/// Immutable after construction; safe to share (e.g. via `Arc`) across
/// simultaneous layout and inspection readers.
#[derive(Debug)]
pub struct StatelessGraph {
    layers: Vec<LayerNode>,
}

impl StatelessGraph {
    pub fn layers(&self) -> &[LayerNode] {
        &self.layers
    }

    pub fn layer(&self, index: u16) -> Option<&LayerNode> {
        self.layers.get(index as usize)
    }

    /// Layers that contribute neurons, in stack order.
    pub fn visible_layers(&self) -> impl Iterator<Item = &LayerNode> {
        self.layers.iter().filter(|layer| layer.visible)
    }

    /// Global neuron lookup across all layers.
    pub fn neuron(&self, id: NeuronId) -> Option<&NeuronDescriptor> {
        self.layer(id.layer)?.neuron_by_id(id)
    }

    pub fn summary(&self) -> GraphSummary {
        GraphSummary {
            layers: self.layers.len(),
            visible_layers: self.layers.iter().filter(|l| l.visible).count(),
            neurons: self.layers.iter().map(|l| l.neurons.len()).sum(),
            connections: self
                .layers
                .iter()
                .flat_map(|l| &l.neurons)
                .map(|n| n.inputs.len())
                .sum(),
        }
    }
}

/// Derive the stateless graph from an ordered layer stack.
///
/// Deterministic: rebuilding from an identical stack yields identical ids and
/// identical per-neuron input orderings.
///
/// # Errors
///
/// Fails if the stack is structurally malformed (a receptive-field layer
/// whose previous visible layer has no spatial axes). Unknown layer
/// categories are not an error; they are warned about and contribute nothing.
pub fn build_stateless_graph(
    stack: &[LayerDescriptor],
    labels: &UnitLabels,
) -> GraphResult<StatelessGraph> {
    if stack.len() > u16::MAX as usize {
        return Err(GraphError::InvalidStack(format!(
            "layer stack has {} layers, limit is {}",
            stack.len(),
            u16::MAX
        )));
    }

    let mut layers: Vec<LayerNode> = Vec::with_capacity(stack.len());
    let mut last_visible: Option<u16> = None;
    let mut next_visible_index: u16 = 0;

    for (i, descriptor) in stack.iter().enumerate() {
        let layer_index = i as u16;
        let kind = LayerKind::resolve(descriptor);
        let placement = if i == 0 {
            LayerPlacement::Input
        } else if i == stack.len() - 1 {
            LayerPlacement::Output
        } else {
            LayerPlacement::Hidden
        };
        let visible = !kind.is_invisible();
        let unit_count = if visible {
            descriptor.output_shape.unit_count()
        } else {
            0
        };
        let prev_visible_layer = last_visible;

        if kind.requires_spatial_input() {
            if let Some(pv) = prev_visible_layer {
                let prev_shape = &layers[pv as usize].output_shape;
                if !prev_shape.is_spatial() {
                    return Err(GraphError::NeedsSpatialInput {
                        layer: layer_index,
                        category: descriptor.category.clone(),
                        prev_shape: prev_shape.dims().to_vec(),
                    });
                }
            }
        }

        let rule = kind.connectivity_rule();
        let group_count = if unit_count > 0 {
            descriptor.output_shape.channel_count()
        } else {
            0
        };
        let num_biases = if unit_count > 0 {
            kind.filters().filter(|f| *f > 0).unwrap_or(unit_count)
        } else {
            0
        };
        // Sharing is 1:1 or filters-to-units, never partial
        debug_assert!(num_biases == 0 || unit_count % num_biases == 0);

        let mut neurons = Vec::with_capacity(unit_count as usize);
        let mut id_to_unit = AHashMap::with_capacity(unit_count as usize);
        for unit in 0..unit_count {
            let id = NeuronId::new(layer_index, to_index3d(unit, &descriptor.output_shape));
            let inputs = match (rule, prev_visible_layer) {
                (Some(rule), Some(pv)) => {
                    let prev_shape = &layers[pv as usize].output_shape;
                    match rule {
                        ConnectivityRule::FullyConnected => fully_connected_inputs(prev_shape, pv),
                        ConnectivityRule::OneToOne => one_to_one_inputs(unit, prev_shape, pv),
                        ConnectivityRule::ReceptiveField { depthwise } => receptive_field_inputs(
                            unit,
                            &descriptor.output_shape,
                            kind.kernel(),
                            kind.strides(),
                            prev_shape,
                            pv,
                            depthwise,
                        ),
                    }
                }
                _ => Vec::new(),
            };
            let label = match placement {
                LayerPlacement::Input => labels
                    .input
                    .as_ref()
                    .and_then(|l| l.get(unit as usize))
                    .cloned(),
                LayerPlacement::Output => labels
                    .output
                    .as_ref()
                    .and_then(|l| l.get(unit as usize))
                    .cloned(),
                LayerPlacement::Hidden => None,
            };
            id_to_unit.insert(id, unit);
            neurons.push(NeuronDescriptor {
                unit_index: unit,
                id,
                group_index: unit % group_count.max(1),
                inputs,
                label,
            });
        }

        let mut groups: Vec<Group> = (0..group_count)
            .map(|g| Group {
                group_index: g,
                neuron_ids: Vec::with_capacity((unit_count / group_count.max(1)) as usize),
                key: String::new(),
            })
            .collect();
        for neuron in &neurons {
            groups[neuron.group_index as usize].neuron_ids.push(neuron.id);
        }
        for group in &mut groups {
            group.key = group
                .neuron_ids
                .iter()
                .map(|id| id.to_string())
                .collect::<Vec<_>>()
                .join("/");
        }

        let visible_index = if visible {
            let v = next_visible_index;
            next_visible_index += 1;
            Some(v)
        } else {
            None
        };

        layers.push(LayerNode {
            layer_index,
            kind,
            category: descriptor.category.clone(),
            name: descriptor.name.clone(),
            output_shape: descriptor.output_shape.clone(),
            placement,
            visible,
            visible_index,
            prev_layer: (i > 0).then(|| layer_index - 1),
            prev_visible_layer,
            unit_count,
            num_biases,
            neurons,
            groups,
            id_to_unit,
        });

        if visible {
            last_visible = Some(layer_index);
        }
    }

    let graph = StatelessGraph { layers };
    let summary = graph.summary();
    info!(
        target: "neuroviz-graph",
        "Built stateless graph: {} layers ({} visible), {} neurons, {} connections",
        summary.layers,
        summary.visible_layers,
        summary.neurons,
        summary.connections
    );
    Ok(graph)
}
