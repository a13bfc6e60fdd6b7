// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Layer category registry.

Every supported layer category is a variant of [`LayerKind`], carrying its
typed configuration. Resolution from a raw [`LayerDescriptor`] applies the
per-category defaults and accepts common tag aliases; a category nobody here
recognizes resolves to [`LayerKind::Unknown`], which contributes no neurons
and no connectivity, so a model using a novel layer type still renders.
*/

use neuroviz_structures::LayerDescriptor;
use serde_json::Value;
use std::collections::HashMap;
use tracing::warn;

/// Which wiring strategy a layer category uses against its previous visible layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityRule {
    /// Every unit connects to all previous units
    FullyConnected,
    /// Unit `i` connects to previous unit `i`
    OneToOne,
    /// Units connect to a kernel-shaped window of previous units; the
    /// depthwise variant stays within the unit's own channel
    ReceptiveField { depthwise: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DenseConfig {
    pub units: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conv2dConfig {
    pub filters: Option<u32>,
    pub kernel_size: Option<(u32, u32)>,
    pub strides: (u32, u32),
}

impl Default for Conv2dConfig {
    fn default() -> Self {
        Self {
            filters: None,
            kernel_size: None,
            strides: (1, 1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthwiseConv2dConfig {
    pub kernel_size: Option<(u32, u32)>,
    pub strides: (u32, u32),
    pub depth_multiplier: u32,
}

impl Default for DepthwiseConv2dConfig {
    fn default() -> Self {
        Self {
            kernel_size: None,
            strides: (1, 1),
            depth_multiplier: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pooling2dConfig {
    pub pool_size: Option<(u32, u32)>,
    pub strides: (u32, u32),
}

impl Default for Pooling2dConfig {
    fn default() -> Self {
        Self {
            pool_size: None,
            strides: (1, 1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DropoutConfig {
    pub rate: f32,
}

impl Default for DropoutConfig {
    fn default() -> Self {
        Self { rate: 0.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ActivationConfig {
    pub activation: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchNormConfig {
    pub axis: i32,
}

impl Default for BatchNormConfig {
    fn default() -> Self {
        Self { axis: -1 }
    }
}

/// Resolved layer category with its typed configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum LayerKind {
    Input,
    Dense(DenseConfig),
    Conv2d(Conv2dConfig),
    DepthwiseConv2d(DepthwiseConv2dConfig),
    MaxPooling2d(Pooling2dConfig),
    AveragePooling2d(Pooling2dConfig),
    Flatten,
    Dropout(DropoutConfig),
    Activation(ActivationConfig),
    BatchNormalization(BatchNormConfig),
    /// Unrecognized category tag; contributes no neurons and no connectivity
    Unknown(String),
}

impl LayerKind {
    /// Resolve a raw descriptor into its typed category.
    ///
    /// Tags are matched case-insensitively with separators stripped, so
    /// "Conv2D", "conv2d" and "conv_2d" all resolve. Unrecognized tags are
    /// logged and resolve to [`LayerKind::Unknown`].
    pub fn resolve(descriptor: &LayerDescriptor) -> LayerKind {
        let normalized: String = descriptor
            .category
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .map(|c| c.to_ascii_lowercase())
            .collect();
        let config = &descriptor.config;

        match normalized.as_str() {
            "input" | "input1d" | "input2d" | "input3d" => LayerKind::Input,
            "dense" | "fullyconnected" => LayerKind::Dense(DenseConfig {
                units: config_u32(config, "units"),
            }),
            "conv2d" | "convolution2d" => LayerKind::Conv2d(Conv2dConfig {
                filters: config_u32(config, "filters"),
                kernel_size: config_pair(config, "kernel_size", "kernelSize"),
                strides: config_pair(config, "strides", "strides").unwrap_or((1, 1)),
            }),
            "depthwiseconv2d" => LayerKind::DepthwiseConv2d(DepthwiseConv2dConfig {
                kernel_size: config_pair(config, "kernel_size", "kernelSize"),
                strides: config_pair(config, "strides", "strides").unwrap_or((1, 1)),
                depth_multiplier: config_u32(config, "depth_multiplier")
                    .or_else(|| config_u32(config, "depthMultiplier"))
                    .unwrap_or(1),
            }),
            "maxpooling2d" | "maxpool2d" => LayerKind::MaxPooling2d(Pooling2dConfig {
                pool_size: config_pair(config, "pool_size", "poolSize"),
                strides: config_pair(config, "strides", "strides").unwrap_or((1, 1)),
            }),
            "averagepooling2d" | "avgpooling2d" | "avgpool2d" => {
                LayerKind::AveragePooling2d(Pooling2dConfig {
                    pool_size: config_pair(config, "pool_size", "poolSize"),
                    strides: config_pair(config, "strides", "strides").unwrap_or((1, 1)),
                })
            }
            "flatten" => LayerKind::Flatten,
            "dropout" => LayerKind::Dropout(DropoutConfig {
                rate: config_f32(config, "rate").unwrap_or(0.0),
            }),
            "activation" => LayerKind::Activation(ActivationConfig {
                activation: config_string(config, "activation"),
            }),
            "batchnormalization" | "batchnorm" => {
                LayerKind::BatchNormalization(BatchNormConfig {
                    axis: config_i32(config, "axis").unwrap_or(-1),
                })
            }
            _ => {
                warn!(
                    target: "neuroviz-graph",
                    "Unknown layer category '{}'; layer will contribute no neurons",
                    descriptor.category
                );
                LayerKind::Unknown(descriptor.category.clone())
            }
        }
    }

    /// Whether the layer contributes no neurons to the visualization.
    ///
    /// Invisible layers still occupy a slot in the layer sequence; the graph
    /// builder wires connectivity through them to the previous visible layer.
    pub fn is_invisible(&self) -> bool {
        matches!(
            self,
            LayerKind::Flatten
                | LayerKind::Dropout(_)
                | LayerKind::Activation(_)
                | LayerKind::BatchNormalization(_)
                | LayerKind::Unknown(_)
        )
    }

    /// Whether the category needs height/width axes on its previous visible layer.
    pub fn requires_spatial_input(&self) -> bool {
        matches!(
            self,
            LayerKind::Conv2d(_)
                | LayerKind::DepthwiseConv2d(_)
                | LayerKind::MaxPooling2d(_)
                | LayerKind::AveragePooling2d(_)
        )
    }

    /// The wiring strategy for this category, if any.
    ///
    /// Input and purely structural layers have none. Shape-preserving
    /// invisible layers register one-to-one pass-through; since they emit no
    /// neurons the rule only documents how they relate to their neighbors.
    pub fn connectivity_rule(&self) -> Option<ConnectivityRule> {
        match self {
            LayerKind::Input | LayerKind::Flatten | LayerKind::Unknown(_) => None,
            LayerKind::Dense(_) => Some(ConnectivityRule::FullyConnected),
            LayerKind::Conv2d(_) => Some(ConnectivityRule::ReceptiveField { depthwise: false }),
            LayerKind::DepthwiseConv2d(_)
            | LayerKind::MaxPooling2d(_)
            | LayerKind::AveragePooling2d(_) => {
                Some(ConnectivityRule::ReceptiveField { depthwise: true })
            }
            LayerKind::Dropout(_)
            | LayerKind::Activation(_)
            | LayerKind::BatchNormalization(_) => Some(ConnectivityRule::OneToOne),
        }
    }

    /// Number of shared filters, for categories with parameter sharing.
    pub fn filters(&self) -> Option<u32> {
        match self {
            LayerKind::Conv2d(c) => c.filters,
            _ => None,
        }
    }

    /// Kernel window extents (kernel size for convolutions, pool size for pooling).
    pub fn kernel(&self) -> Option<(u32, u32)> {
        match self {
            LayerKind::Conv2d(c) => c.kernel_size,
            LayerKind::DepthwiseConv2d(c) => c.kernel_size,
            LayerKind::MaxPooling2d(c) | LayerKind::AveragePooling2d(c) => c.pool_size,
            _ => None,
        }
    }

    /// Stride extents; (1, 1) where the category has no stride concept.
    pub fn strides(&self) -> (u32, u32) {
        match self {
            LayerKind::Conv2d(c) => c.strides,
            LayerKind::DepthwiseConv2d(c) => c.strides,
            LayerKind::MaxPooling2d(c) | LayerKind::AveragePooling2d(c) => c.strides,
            _ => (1, 1),
        }
    }

    /// Canonical category tag for logging and inspection.
    pub fn category_name(&self) -> &str {
        match self {
            LayerKind::Input => "Input",
            LayerKind::Dense(_) => "Dense",
            LayerKind::Conv2d(_) => "Conv2D",
            LayerKind::DepthwiseConv2d(_) => "DepthwiseConv2D",
            LayerKind::MaxPooling2d(_) => "MaxPooling2D",
            LayerKind::AveragePooling2d(_) => "AveragePooling2D",
            LayerKind::Flatten => "Flatten",
            LayerKind::Dropout(_) => "Dropout",
            LayerKind::Activation(_) => "Activation",
            LayerKind::BatchNormalization(_) => "BatchNormalization",
            LayerKind::Unknown(tag) => tag,
        }
    }
}

fn config_value<'a>(
    config: &'a HashMap<String, Value>,
    snake: &str,
    camel: &str,
) -> Option<&'a Value> {
    config.get(snake).or_else(|| config.get(camel))
}

fn config_u32(config: &HashMap<String, Value>, key: &str) -> Option<u32> {
    config.get(key).and_then(Value::as_u64).map(|v| v as u32)
}

fn config_i32(config: &HashMap<String, Value>, key: &str) -> Option<i32> {
    config.get(key).and_then(Value::as_i64).map(|v| v as i32)
}

fn config_f32(config: &HashMap<String, Value>, key: &str) -> Option<f32> {
    config.get(key).and_then(Value::as_f64).map(|v| v as f32)
}

fn config_string(config: &HashMap<String, Value>, key: &str) -> Option<String> {
    config
        .get(key)
        .and_then(Value::as_str)
        .map(|s| s.to_string())
}

/// Extents may be written as a scalar (`3`), a one-element list (`[3]`), or a
/// height/width pair (`[3, 3]`); legacy model configs use all three forms.
fn config_pair(
    config: &HashMap<String, Value>,
    snake: &str,
    camel: &str,
) -> Option<(u32, u32)> {
    let value = config_value(config, snake, camel)?;
    match value {
        Value::Number(n) => {
            let v = n.as_u64()? as u32;
            Some((v, v))
        }
        Value::Array(items) => match items.len() {
            1 => {
                let v = items[0].as_u64()? as u32;
                Some((v, v))
            }
            2 => Some((items[0].as_u64()? as u32, items[1].as_u64()? as u32)),
            _ => None,
        },
        _ => None,
    }
}
