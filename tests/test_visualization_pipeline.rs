// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! End-to-end pipeline test: JSON layer stack -> stateless graph -> stateful
//! binding -> cross-layer inspection, the way a rendering host drives the core.

use ndarray::{Array1, Array2};
use neuroviz::prelude::*;
use std::sync::Arc;

const MODEL_JSON: &str = r#"[
    {"category": "Input", "output_shape": [8, 8, 1], "name": "pixels"},
    {"category": "Conv2D",
     "config": {"filters": 2, "kernel_size": [3, 3], "strides": [1, 1]},
     "output_shape": [6, 6, 2]},
    {"category": "MaxPooling2D",
     "config": {"pool_size": [2, 2], "strides": [2, 2]},
     "output_shape": [3, 3, 2]},
    {"category": "Flatten", "output_shape": [18]},
    {"category": "Dropout", "config": {"rate": 0.25}, "output_shape": [18]},
    {"category": "Dense", "config": {"units": 4}, "output_shape": [4], "name": "logits"}
]"#;

fn digits_labels() -> UnitLabels {
    UnitLabels {
        input: None,
        output: Some(vec!["0".into(), "1".into(), "2".into(), "3".into()]),
    }
}

fn model_state(graph: &StatelessGraph) -> ModelState {
    let activations = graph
        .layers()
        .iter()
        .map(|layer| {
            if layer.unit_count == 0 {
                LayerActivations::empty()
            } else {
                LayerActivations::new(
                    Array1::from_shape_fn(layer.unit_count as usize, |v| v as f32 * 0.01),
                    (layer.unit_count - 1) as f32 * 0.01,
                )
            }
        })
        .collect();
    let parameters = graph
        .layers()
        .iter()
        .map(|layer| match layer.category.as_str() {
            "Conv2D" => Some(LayerParameters {
                weights: Array2::from_elem((2, 9), 0.5),
                biases: Array1::from_vec(vec![0.1, -0.1]),
                max_abs_weight: 0.5,
            }),
            "Dense" => Some(LayerParameters {
                weights: Array2::from_elem((4, 18), 0.25),
                biases: Array1::zeros(4),
                max_abs_weight: 0.25,
            }),
            _ => None,
        })
        .collect();
    ModelState {
        activations,
        parameters,
        raw_input: Array1::from_elem(64, 0.8),
    }
}

#[test]
fn test_pipeline_from_json_to_bound_graph() {
    let stack = layer_stack_from_json(MODEL_JSON).unwrap();
    let graph = Arc::new(build_stateless_graph(&stack, &digits_labels()).unwrap());

    let summary = graph.summary();
    assert_eq!(summary.layers, 6);
    // Flatten and Dropout contribute no neurons
    assert_eq!(summary.visible_layers, 4);
    assert_eq!(summary.neurons, 64 + 72 + 18 + 4);

    // Pooling preserves channels: 2x2 window within the unit's own channel
    let pool = graph.layer(2).unwrap();
    assert_eq!(pool.num_biases, pool.unit_count);
    for neuron in &pool.neurons {
        assert_eq!(neuron.inputs.len(), 4);
        assert!(neuron
            .inputs
            .iter()
            .all(|id| id.position.depth == neuron.position().depth));
    }

    // Dense skips through Flatten and Dropout back to the pooling layer
    let dense = graph.layer(5).unwrap();
    assert_eq!(dense.prev_visible_layer, Some(2));
    assert!(dense.neurons.iter().all(|n| n.inputs.len() == 18));
    assert_eq!(dense.neurons[3].label.as_deref(), Some("3"));

    let stateful = bind(graph.clone(), &model_state(&graph)).unwrap();

    // "What feeds this neuron": resolve a logit's inputs through the global lookup
    let (descriptor, bound) = stateful.neuron(dense.neurons[0].id).unwrap();
    assert_eq!(bound.filter_index, 0);
    assert_eq!(bound.weights.as_ref().unwrap().len(), descriptor.inputs.len());
    for (k, input_id) in descriptor.inputs.iter().enumerate() {
        let (input_descriptor, input_bound) = stateful.neuron(*input_id).unwrap();
        assert_eq!(input_descriptor.layer_index(), 2);
        // Weight k pairs with input k; both resolve for inspection
        assert_eq!(bound.weights.as_ref().unwrap()[k], 0.25);
        assert!(input_bound.normalized_activation.abs() <= 1.0);
    }

    // Output layer keeps raw activations; input layer carries the raw sample
    let logits = stateful.layer(5).unwrap();
    for neuron in &logits.neurons {
        assert_eq!(neuron.normalized_activation, neuron.activation);
    }
    let pixels = stateful.layer(0).unwrap();
    assert!(pixels.neurons.iter().all(|n| n.raw_input == Some(0.8)));
}

#[test]
fn test_model_swap_discards_cleanly() {
    // Rebinding against a rebuilt graph of a different model is a fresh start;
    // the superseded graph needs no teardown beyond dropping its Arc.
    let stack = layer_stack_from_json(MODEL_JSON).unwrap();
    let first = Arc::new(build_stateless_graph(&stack, &digits_labels()).unwrap());
    let _bound = bind(first.clone(), &model_state(&first)).unwrap();

    let smaller = vec![
        LayerDescriptor::new("Input", TensorShape::new(&[4]).unwrap()),
        LayerDescriptor::new("Dense", TensorShape::new(&[2]).unwrap()),
    ];
    let second = Arc::new(build_stateless_graph(&smaller, &UnitLabels::default()).unwrap());
    let state = ModelState {
        activations: vec![
            LayerActivations::new(Array1::zeros(4), 0.0),
            LayerActivations::new(Array1::zeros(2), 0.0),
        ],
        parameters: vec![
            None,
            Some(LayerParameters {
                weights: Array2::zeros((2, 4)),
                biases: Array1::zeros(2),
                max_abs_weight: 0.0,
            }),
        ],
        raw_input: Array1::zeros(4),
    };
    let rebound = bind(second, &state).unwrap();
    assert_eq!(rebound.layers().len(), 2);

    // Binding the old state against the new graph is the mismatch the host
    // must never allow; it fails loudly instead of rendering garbage
    let stale = model_state(&first);
    let third = Arc::new(build_stateless_graph(&smaller, &UnitLabels::default()).unwrap());
    assert!(matches!(
        bind(third, &stale),
        Err(GraphError::LayerCountMismatch { .. })
    ));
}
